// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Formation builders and call-like movement helpers.

use rustc_hash::FxHashMap;
use sdr_core::{Dancer, Formation, StandardDancer};
use sdr_geom::{Fraction, GeomError, Position, PositionFlags, Rotation};

/// Builder for test formations laid out on the grid.
///
/// # Example
///
/// ```
/// use sdr_core::StandardDancer::{Couple1Boy, Couple1Girl};
/// use sdr_dry_tests::FormationBuilder;
/// use sdr_geom::Rotation;
///
/// let f = FormationBuilder::new()
///     .at(Couple1Boy, -1, 0, Rotation::north())
///     .at(Couple1Girl, 1, 0, Rotation::north())
///     .build();
/// assert_eq!(f.to_diagram(""), "1B^  1G^");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormationBuilder {
    entries: Vec<(Dancer, Position)>,
    selected: Option<Vec<Dancer>>,
}

impl FormationBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `d` at grid spot `(x, y)`.
    pub fn at(mut self, d: impl Into<Dancer>, x: i64, y: i64, facing: Rotation) -> Self {
        self.entries.push((d.into(), Position::grid(x, y, facing)));
        self
    }

    /// Place `d` at an arbitrary position.
    pub fn position(mut self, d: impl Into<Dancer>, pos: Position) -> Self {
        self.entries.push((d.into(), pos));
        self
    }

    /// Place a fresh phantom at grid spot `(x, y)`.
    pub fn phantom(self, x: i64, y: i64, facing: Rotation) -> Self {
        self.at(Dancer::phantom(), x, y, facing)
    }

    /// Narrow the selection to `ds`. Without this every dancer is selected.
    pub fn select<I, D>(mut self, ds: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dancer>,
    {
        self.selected = Some(ds.into_iter().map(Into::into).collect());
        self
    }

    /// Finish the formation.
    pub fn build(self) -> Formation {
        match self.selected {
            Some(sel) => Formation::with_selection(self.entries, sel),
            None => Formation::new(self.entries),
        }
    }
}

fn move_selected(
    f: &Formation,
    pass_left: bool,
    step: impl Fn(&Position) -> Result<Position, GeomError>,
) -> Result<Formation, GeomError> {
    let mut out = f.clone();
    for d in f.selected() {
        let Some(p) = f.location(d) else { continue };
        let mut moved = step(p)?;
        if pass_left {
            moved = moved.add_flags(PositionFlags::PASS_LEFT)?;
        }
        out = out.move_dancer(d, moved);
    }
    Ok(out)
}

/// Moves every selected dancer `distance` along its facing, optionally
/// marking them to pass left shoulders when they meet.
pub fn step_forward(f: &Formation, distance: &Fraction, pass_left: bool) -> Result<Formation, GeomError> {
    move_selected(f, pass_left, |p| p.forward_step(distance, false))
}

/// Moves every selected dancer `distance` to its own right.
pub fn side_step(f: &Formation, distance: &Fraction) -> Result<Formation, GeomError> {
    move_selected(f, false, |p| p.side_step(distance, false))
}

/// Asserts that `f` draws as `want`, diffing line by line on failure.
#[track_caller]
pub fn assert_diagram(f: &Formation, want: &str) {
    pretty_assertions::assert_eq!(f.to_diagram(""), want);
}

/// Renames the dancers of `f`, in reading order, to the standard dancers
/// 1B, 1G, 2B, ... so phantom-based results print readably. Dancers past
/// the eighth keep their identity.
pub fn standard_names(f: &Formation) -> FxHashMap<Dancer, Dancer> {
    f.sorted_dancers()
        .into_iter()
        .zip(StandardDancer::ALL)
        .map(|(d, s)| (d, Dancer::from(s)))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sdr_core::StandardDancer::{Couple1Boy, Couple1Girl, Couple3Boy};
    use sdr_geom::int;

    #[test]
    fn builder_honors_selection() {
        let f = FormationBuilder::new()
            .at(Couple1Boy, -1, 0, Rotation::north())
            .at(Couple1Girl, 1, 0, Rotation::north())
            .select([Couple1Girl])
            .build();
        assert!(!f.is_selected(Couple1Boy.into()));
        assert!(f.is_selected(Couple1Girl.into()));
    }

    #[test]
    fn step_forward_moves_only_selected() {
        let f = FormationBuilder::new()
            .at(Couple1Boy, 0, -1, Rotation::north())
            .at(Couple3Boy, 0, 1, Rotation::south())
            .select([Couple1Boy])
            .build();
        let out = step_forward(&f, &int(1), true).unwrap();
        let b = out.location(Couple1Boy.into()).unwrap();
        assert_eq!(b.y(), &int(0));
        assert!(b.flags().contains(PositionFlags::PASS_LEFT));
        assert_eq!(out.location(Couple3Boy.into()).unwrap().y(), &int(1));
    }

    #[test]
    fn side_step_goes_right() {
        let f = FormationBuilder::new().at(Couple1Boy, 0, 0, Rotation::north()).build();
        let out = side_step(&f, &int(2)).unwrap();
        assert_eq!(out.location(Couple1Boy.into()).unwrap().x(), &int(2));
    }

    #[test]
    fn standard_names_follow_reading_order() {
        let f = FormationBuilder::new()
            .phantom(-1, 0, Rotation::north())
            .phantom(1, 0, Rotation::north())
            .build();
        let named = f.map(&standard_names(&f));
        assert_eq!(named.to_diagram(""), "1B^  1G^");
    }
}
