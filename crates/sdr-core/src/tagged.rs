// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Formations whose dancers carry role tags.

use core::fmt;
use core::ops::Deref;
use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use sdr_geom::Position;

use crate::dancer::{Dancer, StandardDancer};
use crate::formation::Formation;

/// Role and identity labels.
///
/// Primitive tags (`Dancer1`..`All`) are answered from dancer identity;
/// the rest are attached explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Tag {
    Dancer1,
    Dancer2,
    Dancer3,
    Dancer4,
    Dancer5,
    Dancer6,
    Dancer7,
    Dancer8,
    Couple1,
    Couple2,
    Couple3,
    Couple4,
    Boy,
    Girl,
    Head,
    Side,
    All,
    Beau,
    Belle,
    Leader,
    Trailer,
    Point,
    Center,
    VeryCenter,
    End,
    Outside4,
    Center6,
    Outside6,
    Number1,
    Number2,
    Number3,
    Number4,
    /// Marks a phantom materialized to fill out a goal shape.
    Noncorporeal,
}

impl Tag {
    /// Whether this tag is decided by dancer identity alone.
    pub fn is_primitive(self) -> bool {
        self <= Self::All
    }

    /// Identity test for primitive tags; `None` for role tags.
    pub fn matches_identity(self, d: Dancer) -> Option<bool> {
        if !self.is_primitive() {
            return None;
        }
        if self == Self::All {
            return Some(true);
        }
        let Some(s) = d.standard() else {
            return Some(false);
        };
        Some(match self {
            Self::Dancer1 => s == StandardDancer::Couple1Boy,
            Self::Dancer2 => s == StandardDancer::Couple1Girl,
            Self::Dancer3 => s == StandardDancer::Couple2Boy,
            Self::Dancer4 => s == StandardDancer::Couple2Girl,
            Self::Dancer5 => s == StandardDancer::Couple3Boy,
            Self::Dancer6 => s == StandardDancer::Couple3Girl,
            Self::Dancer7 => s == StandardDancer::Couple4Boy,
            Self::Dancer8 => s == StandardDancer::Couple4Girl,
            Self::Couple1 => s.couple_number() == 1,
            Self::Couple2 => s.couple_number() == 2,
            Self::Couple3 => s.couple_number() == 3,
            Self::Couple4 => s.couple_number() == 4,
            Self::Boy => s.is_boy(),
            Self::Girl => s.is_girl(),
            Self::Head => s.is_head(),
            Self::Side => s.is_side(),
            _ => false,
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{self:?}");
        let mut out = String::with_capacity(s.len() + 4);
        for (i, c) in s.chars().enumerate() {
            if i > 0 && (c.is_ascii_uppercase() || (c.is_ascii_digit() && !s[..i].ends_with(|p: char| p.is_ascii_digit()))) {
                out.push('_');
            }
            out.push(c.to_ascii_uppercase());
        }
        f.write_str(&out)
    }
}

/// A formation plus per-dancer role tags and an optional name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedFormation {
    name: Option<String>,
    formation: Formation,
    tags: FxHashMap<Dancer, BTreeSet<Tag>>,
}

impl TaggedFormation {
    /// Wraps `formation` with `tags`; tags for absent dancers are dropped.
    pub fn new(formation: Formation, tags: FxHashMap<Dancer, BTreeSet<Tag>>) -> Self {
        let tags = tags.into_iter().filter(|(d, _)| formation.contains(*d)).collect();
        Self { name: None, formation, tags }
    }

    /// Builds from `(dancer, position, tags)` triples, all selected.
    pub fn from_tagged<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Dancer, Position, T)>,
        T: IntoIterator<Item = Tag>,
    {
        let mut positions = Vec::new();
        let mut tags = FxHashMap::default();
        for (d, p, t) in entries {
            positions.push((d, p));
            tags.insert(d, t.into_iter().collect());
        }
        Self::new(Formation::new(positions), tags)
    }

    /// Untagged wrapper.
    pub fn untagged(formation: Formation) -> Self {
        Self::new(formation, FxHashMap::default())
    }

    /// Same formation with a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The underlying formation.
    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    /// Explicit role tags of `d`.
    pub fn role_tags(&self, d: Dancer) -> BTreeSet<Tag> {
        self.tags.get(&d).cloned().unwrap_or_default()
    }

    /// Whether `d` carries `tag`, either by identity or explicitly.
    pub fn is(&self, d: Dancer, tag: Tag) -> bool {
        if !self.formation.contains(d) {
            return false;
        }
        match tag.matches_identity(d) {
            Some(b) => b,
            None => self.tags.get(&d).is_some_and(|t| t.contains(&tag)),
        }
    }

    /// Dancers carrying `tag`, in insertion order.
    pub fn tagged_dancers(&self, tag: Tag) -> Vec<Dancer> {
        self.formation.dancers().filter(|d| self.is(*d, tag)).collect()
    }
}

impl Deref for TaggedFormation {
    type Target = Formation;

    fn deref(&self) -> &Formation {
        &self.formation
    }
}

impl fmt::Display for TaggedFormation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(n) => f.write_str(n),
            None => fmt::Display::fmt(&self.formation, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdr_geom::Rotation;

    #[test]
    fn primitive_tags_follow_identity() {
        let boy = Dancer::Standard(StandardDancer::Couple3Boy);
        let ph = Dancer::phantom();
        let tf = TaggedFormation::from_tagged([
            (boy, Position::grid(-1, 0, Rotation::north()), vec![Tag::Beau]),
            (ph, Position::grid(1, 0, Rotation::north()), vec![Tag::Belle]),
        ]);
        assert!(tf.is(boy, Tag::Head));
        assert!(tf.is(boy, Tag::Dancer5));
        assert!(tf.is(boy, Tag::Beau));
        assert!(!tf.is(ph, Tag::Boy));
        assert!(tf.is(ph, Tag::All));
        assert_eq!(tf.tagged_dancers(Tag::Belle), vec![ph]);
    }

    #[test]
    fn tag_display_is_screaming_snake() {
        assert_eq!(Tag::VeryCenter.to_string(), "VERY_CENTER");
        assert_eq!(Tag::Outside4.to_string(), "OUTSIDE_4");
        assert_eq!(Tag::Noncorporeal.to_string(), "NONCORPOREAL");
    }
}
