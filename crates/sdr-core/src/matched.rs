// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::dancer::Dancer;
use crate::formation::Formation;
use crate::tagged::TaggedFormation;

/// Outcome of a formation match.
///
/// `meta` places one meta dancer per occurrence (and per unmatched
/// dancer). Each meta dancer keys the occurrence it stands for in
/// `matches`, expressed in goal coordinates with the input dancers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationMatch {
    /// One dancer per occurrence, breathed into a compact formation.
    pub meta: Formation,
    /// Occurrence formation for each meta dancer.
    pub matches: BTreeMap<Dancer, TaggedFormation>,
    /// Meta dancers that stand for a single dancer no goal covered.
    pub unmatched: BTreeSet<Dancer>,
    /// Phantoms the matcher created to fill goal spots.
    pub inserted: BTreeSet<Dancer>,
}

impl FormationMatch {
    /// Relabels meta dancers through `rename`; unnamed ones keep their
    /// identity.
    pub fn map(&self, rename: &FxHashMap<Dancer, Dancer>) -> Self {
        let name = |d: &Dancer| rename.get(d).copied().unwrap_or(*d);
        Self {
            meta: self.meta.map(rename),
            matches: self.matches.iter().map(|(d, tf)| (name(d), tf.clone())).collect(),
            unmatched: self.unmatched.iter().map(name).collect(),
            inserted: self.inserted.clone(),
        }
    }

    fn dancer_tags(&self, tf: &TaggedFormation) -> Option<String> {
        let mut parts = Vec::new();
        for d in tf.sorted_dancers() {
            let tags = tf.role_tags(d);
            let inserted = self.inserted.contains(&d);
            if tags.is_empty() && !inserted {
                continue;
            }
            let mut part = match d.standard() {
                Some(s) => s.name(),
                None => "ph".to_owned(),
            };
            if inserted {
                part.push_str(" inserted");
            }
            if !tags.is_empty() {
                let names: Vec<String> = tags.iter().map(ToString::to_string).collect();
                part.push_str(": ");
                part.push_str(&names.join(","));
            }
            parts.push(part);
        }
        (!parts.is_empty()).then(|| format!(" [{}]", parts.join("; ")))
    }
}

/// Names meta dancers `AA`, `BB`, ... in reading order, then lists each
/// occurrence below the meta diagram.
impl fmt::Display for FormationMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.meta.sorted_dancers();
        let names: FxHashMap<Dancer, String> = order
            .iter()
            .zip((b'A'..=b'Z').map(char::from))
            .map(|(d, c)| (*d, [c, c].iter().collect()))
            .collect();
        let label = |d: Dancer| names.get(&d).cloned().unwrap_or_default();
        let mut lines = vec![self.meta.to_diagram_with("", label)];
        for d in &order {
            let mut head = format!("{}:", label(*d));
            if self.unmatched.contains(d) {
                head.push_str(" (unmatched)");
            }
            lines.push(head);
            if let Some(tf) = self.matches.get(d) {
                lines.push(tf.to_diagram("   "));
                if let Some(tags) = self.dancer_tags(tf) {
                    lines.push(tags);
                }
            }
        }
        f.write_str(&lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::dancer::StandardDancer;
    use crate::tagged::Tag;
    use sdr_geom::{Position, Rotation};

    #[test]
    fn display_lists_occurrences_in_reading_order() {
        let top = Dancer::phantom();
        let bottom = Dancer::phantom();
        let meta = Formation::new([
            (bottom, Position::grid(0, -1, Rotation::north())),
            (top, Position::grid(0, 1, Rotation::south())),
        ]);
        let b = Dancer::Standard(StandardDancer::Couple1Boy);
        let g = Dancer::Standard(StandardDancer::Couple1Girl);
        let couple = TaggedFormation::from_tagged([
            (b, Position::grid(-1, 0, Rotation::north()), vec![Tag::Beau]),
            (g, Position::grid(1, 0, Rotation::north()), vec![Tag::Belle]),
        ]);
        let solo = TaggedFormation::from_tagged([(
            Dancer::Standard(StandardDancer::Couple3Boy),
            Position::grid(0, 0, Rotation::north()),
            Vec::new(),
        )]);
        let mut matches = BTreeMap::new();
        matches.insert(bottom, couple);
        matches.insert(top, solo);
        let fm = FormationMatch {
            meta,
            matches,
            unmatched: [top].into_iter().collect(),
            inserted: BTreeSet::new(),
        };
        let want = "AAv\n\nBB^\nAA: (unmatched)\n   3B^\nBB:\n   1B^  1G^\n [1B: BEAU; 1G: BELLE]";
        assert_eq!(fm.to_string(), want);
    }

    #[test]
    fn map_relabels_meta() {
        let m = Dancer::phantom();
        let n = Dancer::phantom();
        let meta = Formation::single_dancer_at(m, Position::grid(0, 0, Rotation::north()));
        let mut matches = BTreeMap::new();
        matches.insert(m, TaggedFormation::untagged(meta.clone()));
        let fm = FormationMatch {
            meta,
            matches,
            unmatched: [m].into_iter().collect(),
            inserted: BTreeSet::new(),
        };
        let mut rename = FxHashMap::default();
        rename.insert(m, n);
        let out = fm.map(&rename);
        assert!(out.meta.contains(n));
        assert!(out.matches.contains_key(&n));
        assert!(out.unmatched.contains(&n));
    }
}
