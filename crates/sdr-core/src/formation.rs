// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Formations: ordered dancer-to-position maps with a selected subset.
//!
//! Determinism notes:
//! - Insertion order is preserved and drives [`Formation::dancers`].
//! - [`Formation::sorted_dancers`] orders by position (top row first, then
//!   left to right), falling back to insertion order for ties.
//! - Equality ignores insertion order.

use core::fmt;
use std::collections::BTreeSet;

use num_traits::{ToPrimitive, Zero};
use rustc_hash::FxHashMap;
use sdr_geom::{frac, int, Aabb, Fraction, GeomError, Point, Position, Rotation};

use crate::dancer::Dancer;

/// Edge length of the square each dancer occupies.
pub const DANCER_EXTENT: i64 = 2;

/// An immutable mapping from dancers to positions.
#[derive(Debug, Clone, Default)]
pub struct Formation {
    entries: Vec<(Dancer, Position)>,
    index: FxHashMap<Dancer, usize>,
    selected: BTreeSet<Dancer>,
}

impl Formation {
    /// Builds a formation with every dancer selected. A repeated dancer keeps
    /// its first slot and its last position.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Dancer, Position)>,
    {
        let mut f = Self::default();
        for (d, p) in entries {
            f.put(d, p);
        }
        f.selected = f.index.keys().copied().collect();
        f
    }

    /// Builds a formation selecting only the dancers in `selected` that are
    /// present.
    pub fn with_selection<I, S>(entries: I, selected: S) -> Self
    where
        I: IntoIterator<Item = (Dancer, Position)>,
        S: IntoIterator<Item = Dancer>,
    {
        let mut f = Self::new(entries);
        f.selected = selected.into_iter().filter(|d| f.index.contains_key(d)).collect();
        f
    }

    /// One dancer at `pos`.
    pub fn single_dancer_at(d: Dancer, pos: Position) -> Self {
        Self::new([(d, pos)])
    }

    fn put(&mut self, d: Dancer, p: Position) {
        if let Some(&i) = self.index.get(&d) {
            self.entries[i].1 = p;
        } else {
            self.index.insert(d, self.entries.len());
            self.entries.push((d, p));
        }
    }

    /// Number of dancers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when there are no dancers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dancers in insertion order.
    pub fn dancers(&self) -> impl Iterator<Item = Dancer> + '_ {
        self.entries.iter().map(|(d, _)| *d)
    }

    /// `(dancer, position)` pairs in insertion order.
    pub fn entries(&self) -> &[(Dancer, Position)] {
        &self.entries
    }

    /// Whether `d` is present.
    pub fn contains(&self, d: Dancer) -> bool {
        self.index.contains_key(&d)
    }

    /// Position of `d`, if present.
    pub fn location(&self, d: Dancer) -> Option<&Position> {
        self.index.get(&d).map(|&i| &self.entries[i].1)
    }

    /// Whether `d` is selected.
    pub fn is_selected(&self, d: Dancer) -> bool {
        self.selected.contains(&d)
    }

    /// Selected dancers in insertion order.
    pub fn selected(&self) -> impl Iterator<Item = Dancer> + '_ {
        self.dancers().filter(|d| self.selected.contains(d))
    }

    /// Same dancers with the selection replaced by `ds` (absent dancers are
    /// ignored).
    pub fn select<S>(&self, ds: S) -> Self
    where
        S: IntoIterator<Item = Dancer>,
    {
        let selected = ds.into_iter().filter(|d| self.contains(*d)).collect();
        Self { selected, ..self.clone() }
    }

    /// Drops every unselected dancer.
    pub fn only_selected(&self) -> Self {
        Self::new(self.entries.iter().filter(|(d, _)| self.is_selected(*d)).cloned())
    }

    /// Moves `d` to `pos`, appending it (selected) if absent.
    pub fn move_dancer(&self, d: Dancer, pos: Position) -> Self {
        let mut f = self.clone();
        if !f.contains(d) {
            f.selected.insert(d);
        }
        f.put(d, pos);
        f
    }

    /// Renames dancers through `rename`; dancers without an entry keep their
    /// identity. Selection follows the rename.
    pub fn map(&self, rename: &FxHashMap<Dancer, Dancer>) -> Self {
        let name = |d: Dancer| rename.get(&d).copied().unwrap_or(d);
        let mut f = Self::new(self.entries.iter().map(|(d, p)| (name(*d), p.clone())));
        f.selected = self.selected.iter().map(|d| name(*d)).collect();
        f
    }

    fn map_positions(&self, op: impl Fn(&Position) -> Position) -> Self {
        let entries = self.entries.iter().map(|(d, p)| (*d, op(p))).collect();
        Self { entries, index: self.index.clone(), selected: self.selected.clone() }
    }

    /// Rotates every dancer about the origin. `rot` must be exact.
    pub fn rotate(&self, rot: &Rotation) -> Result<Self, GeomError> {
        rot.require_exact()?;
        Ok(self.map_positions(|p| p.rotate_around_origin(rot)))
    }

    /// Shifts every dancer by `(dx, dy)`.
    pub fn translated(&self, dx: &Fraction, dy: &Fraction) -> Self {
        self.map_positions(|p| p.translated(dx, dy))
    }

    /// Shifts so the bounding box is centered on the origin.
    pub fn recenter(&self) -> Self {
        let c = self.bounds().center();
        self.translated(&-&c.x, &-&c.y)
    }

    /// Union of each dancer's footprint; a zero box when empty.
    pub fn bounds(&self) -> Aabb {
        let half = int(DANCER_EXTENT / 2);
        self.entries
            .iter()
            .map(|(_, p)| Aabb::from_center_half_extents(&p.to_point(), &half, &half))
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Aabb::from_center_half_extents(&Point::zero(), &Fraction::zero(), &Fraction::zero()))
    }

    /// Whether the bounding box is centered on the origin.
    pub fn is_centered(&self) -> bool {
        self.bounds().center().is_zero()
    }

    /// Dancers in diagram reading order.
    pub fn sorted_dancers(&self) -> Vec<Dancer> {
        let mut v: Vec<&(Dancer, Position)> = self.entries.iter().collect();
        v.sort_by(|a, b| a.1.cmp(&b.1));
        v.into_iter().map(|(d, _)| *d).collect()
    }

    /// The most exact facing consistent with every dancer, re-expressed at
    /// `modulus`. `None` when the formation is empty, too vague, or
    /// inconsistent.
    pub fn common_facing(&self, modulus: &Fraction) -> Option<Rotation> {
        let best = self
            .entries
            .iter()
            .map(|(_, p)| p.facing())
            .reduce(|a, b| if a.modulus() < b.modulus() { b } else { a })?;
        if best.modulus() < modulus {
            return None;
        }
        let r = Rotation::create(best.amount().clone(), modulus.clone());
        self.entries.iter().all(|(_, p)| r.includes(p.facing())).then_some(r)
    }

    /// Renders a text diagram, one line per grid unit of height and five
    /// columns per dancer width. Each cell is the dancer's name followed by
    /// its facing glyph.
    pub fn to_diagram(&self, prefix: &str) -> String {
        self.to_diagram_with(prefix, Dancer::name)
    }

    /// Like [`Formation::to_diagram`] with custom dancer names.
    pub fn to_diagram_with(&self, prefix: &str, names: impl Fn(Dancer) -> String) -> String {
        let Some(max_y) = self.entries.iter().map(|(_, p)| p.y()).max().cloned() else {
            return String::new();
        };
        let min_y = self.entries.iter().map(|(_, p)| p.y()).min().cloned().unwrap_or_else(|| max_y.clone());
        let min_x = self.entries.iter().map(|(_, p)| p.x()).min().cloned().unwrap_or_else(Fraction::zero);
        let rows = fraction_to_usize(&(&max_y - &min_y)) + 1;
        let mut lines: Vec<Vec<char>> = vec![Vec::new(); rows];
        for d in self.sorted_dancers() {
            let Some(p) = self.location(d) else { continue };
            let row = fraction_to_usize(&(&max_y - p.y()));
            let col = fraction_to_usize(&((p.x() - &min_x) * frac(5, 2)));
            let line = &mut lines[row];
            if line.len() < col {
                line.resize(col, ' ');
            } else if !line.is_empty() {
                line.push(' ');
            }
            line.extend(names(d).chars());
            line.push(p.facing().to_diagram_char());
        }
        lines
            .into_iter()
            .map(|l| {
                let s: String = l.into_iter().collect();
                format!("{prefix}{s}").trim_end().to_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn fraction_to_usize(f: &Fraction) -> usize {
    f.floor().to_integer().to_usize().unwrap_or(0)
}

impl PartialEq for Formation {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.selected == other.selected
            && self.entries.iter().all(|(d, p)| other.location(*d) == Some(p))
    }
}

impl Eq for Formation {}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_diagram(""))
    }
}
