// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dancer identity handles.
//!
//! A dancer carries no data of its own: formations map dancers to positions.
//! Real dancers are the eight members of a square. Phantoms are minted on
//! demand and never compare equal to one another.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PHANTOM: AtomicU64 = AtomicU64::new(1);

/// One of the eight dancers in a square, in couple order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardDancer {
    /// Couple 1 boy.
    Couple1Boy,
    /// Couple 1 girl.
    Couple1Girl,
    /// Couple 2 boy.
    Couple2Boy,
    /// Couple 2 girl.
    Couple2Girl,
    /// Couple 3 boy.
    Couple3Boy,
    /// Couple 3 girl.
    Couple3Girl,
    /// Couple 4 boy.
    Couple4Boy,
    /// Couple 4 girl.
    Couple4Girl,
}

impl StandardDancer {
    /// All eight, in couple order.
    pub const ALL: [Self; 8] = [
        Self::Couple1Boy,
        Self::Couple1Girl,
        Self::Couple2Boy,
        Self::Couple2Girl,
        Self::Couple3Boy,
        Self::Couple3Girl,
        Self::Couple4Boy,
        Self::Couple4Girl,
    ];

    fn index(self) -> u8 {
        match self {
            Self::Couple1Boy => 0,
            Self::Couple1Girl => 1,
            Self::Couple2Boy => 2,
            Self::Couple2Girl => 3,
            Self::Couple3Boy => 4,
            Self::Couple3Girl => 5,
            Self::Couple4Boy => 6,
            Self::Couple4Girl => 7,
        }
    }

    /// Couple number, 1 through 4.
    pub fn couple_number(self) -> u8 {
        self.index() / 2 + 1
    }

    /// Dancer number 1 through 8 (boys odd, girls even).
    pub fn number(self) -> u8 {
        self.index() + 1
    }

    /// `true` for the four boys.
    pub fn is_boy(self) -> bool {
        self.index() % 2 == 0
    }

    /// `true` for the four girls.
    pub fn is_girl(self) -> bool {
        !self.is_boy()
    }

    /// `true` for couples 1 and 3.
    pub fn is_head(self) -> bool {
        self.couple_number() % 2 == 1
    }

    /// `true` for couples 2 and 4.
    pub fn is_side(self) -> bool {
        !self.is_head()
    }

    /// Short diagram name such as `1B` or `3G`.
    pub fn name(self) -> String {
        format!("{}{}", self.couple_number(), if self.is_boy() { 'B' } else { 'G' })
    }
}

/// Opaque identity of a phantom dancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhantomId(u64);

impl PhantomId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A dancer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dancer {
    /// One of the eight real dancers.
    Standard(StandardDancer),
    /// A placeholder created for one computation.
    Phantom(PhantomId),
}

impl Dancer {
    /// Mints a phantom distinct from every other dancer in the process.
    pub fn phantom() -> Self {
        Self::Phantom(PhantomId(NEXT_PHANTOM.fetch_add(1, Ordering::Relaxed)))
    }

    /// Mints `n` fresh phantoms.
    pub fn phantoms(n: usize) -> Vec<Self> {
        (0..n).map(|_| Self::phantom()).collect()
    }

    /// `true` for phantoms.
    pub fn is_phantom(self) -> bool {
        matches!(self, Self::Phantom(_))
    }

    /// The real dancer, if any.
    pub fn standard(self) -> Option<StandardDancer> {
        match self {
            Self::Standard(s) => Some(s),
            Self::Phantom(_) => None,
        }
    }

    /// Diagram name: `1B` for real dancers, empty for phantoms.
    pub fn name(self) -> String {
        self.standard().map(StandardDancer::name).unwrap_or_default()
    }
}

impl From<StandardDancer> for Dancer {
    fn from(s: StandardDancer) -> Self {
        Self::Standard(s)
    }
}

impl fmt::Display for Dancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(s) => f.write_str(&s.name()),
            Self::Phantom(p) => write!(f, "<phantom@{}>", p.0),
        }
    }
}
