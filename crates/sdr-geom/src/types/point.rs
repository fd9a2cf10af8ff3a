// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt;

use num_traits::Zero;

use crate::fraction::{proper_string, Fraction};

/// A location on the floor, in grid units (one dancer is two units wide).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Horizontal coordinate; positive is toward the caller's right.
    pub x: Fraction,
    /// Vertical coordinate; positive is away from the caller.
    pub y: Fraction,
}

impl Point {
    /// Creates a point.
    pub fn new(x: Fraction, y: Fraction) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self { x: Fraction::zero(), y: Fraction::zero() }
    }

    /// Returns `true` if this is the origin.
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        Self { x: &self.x + &other.x, y: &self.y + &other.y }
    }

    /// Component-wise difference.
    pub fn sub(&self, other: &Self) -> Self {
        Self { x: &self.x - &other.x, y: &self.y - &other.y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", proper_string(&self.x), proper_string(&self.y))
    }
}
