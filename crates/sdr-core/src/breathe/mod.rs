// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reassembling and re-spacing formations.
//!
//! [`Breather::breathe_pieces`] runs four phases over a list of
//! [`FormationPiece`]s:
//! 1. Pieces whose input boxes share a center are merged into a miniwave.
//! 2. Every output is recentered on its own bounding box.
//! 3. Overlapping input boxes are trimmed apart or joined into stars
//!    (branch and bound over per-pair cut options, each node an exact LP).
//! 4. Box boundaries are re-spaced per axis by an LP so that every output
//!    fits, then each output is moved to the center of its new box.
//!
//! Determinism notes:
//! - Collision groups are visited in order of first appearance.
//! - Trimming keeps every optimal assignment. Pairs they disagree on only
//!   by split axis are split on both axes; otherwise the lowest option wins.
//! - The result lists each piece's output dancers in piece order.

mod collide;
mod gaps;
mod trim;

use num_traits::Zero;
use rustc_hash::FxHashMap;
use sdr_geom::{Fraction, GeomError, Rotation};
use tracing::{debug, instrument};

use crate::dancer::Dancer;
use crate::error::BreatheError;
use crate::formation::Formation;
use crate::settings::EngineSettings;

/// A located sub-group (`input`) and the formation that replaces it
/// (`output`), already oriented like the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationPiece {
    /// Where the sub-group currently stands.
    pub input: Formation,
    /// What to put there, in coordinates relative to the input's center.
    pub output: Formation,
}

impl FormationPiece {
    /// Pairs `input` with `output` as given.
    pub fn new(input: Formation, output: Formation) -> Self {
        Self { input, output }
    }

    /// Pairs `input` with `output` rotated by the exact rotation `r`.
    pub fn rotated(input: Formation, output: &Formation, r: &Rotation) -> Result<Self, GeomError> {
        Ok(Self { input, output: output.rotate(r)? })
    }
}

/// The breathing engine, parameterized by search limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Breather {
    settings: EngineSettings,
}

impl Breather {
    /// Engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit settings.
    pub fn with_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Inserts each component into the spot of its meta dancer, rotated to
    /// that dancer's (exact) facing, then breathes the result.
    pub fn insert(
        &self,
        meta: &Formation,
        components: &FxHashMap<Dancer, Formation>,
    ) -> Result<Formation, BreatheError> {
        let mut pieces = Vec::with_capacity(meta.len());
        for (d, p) in meta.entries() {
            if !p.facing().is_exact() {
                return Err(BreatheError::VagueMetaFacing(d.to_string()));
            }
            let component =
                components.get(d).ok_or_else(|| BreatheError::MissingComponent(d.to_string()))?;
            let input = meta.select([*d]).only_selected();
            pieces.push(FormationPiece::rotated(input, component, p.facing())?);
        }
        self.breathe_pieces(pieces)
    }

    /// Re-spaces `f`, treating every dancer as its own piece.
    pub fn breathe(&self, f: &Formation) -> Result<Formation, BreatheError> {
        let pieces = f
            .entries()
            .iter()
            .map(|(d, p)| {
                let input = f.select([*d]).only_selected();
                let at_origin = p.relocate(Fraction::zero(), Fraction::zero(), p.facing().clone());
                FormationPiece::new(input, Formation::single_dancer_at(*d, at_origin))
            })
            .collect();
        self.breathe_pieces(pieces)
    }

    /// Collides, trims, and re-spaces `pieces` into one formation.
    #[instrument(skip_all, fields(pieces = pieces.len()))]
    pub fn breathe_pieces(&self, pieces: Vec<FormationPiece>) -> Result<Formation, BreatheError> {
        let pieces = collide::resolve_collisions(self, pieces)?;
        let pieces: Vec<FormationPiece> = pieces
            .into_iter()
            .map(|p| FormationPiece { output: p.output.recenter(), input: p.input })
            .collect();
        let boxes = trim::trim_overlap(&pieces, &self.settings)?;
        let placed = gaps::allocate(&pieces, &boxes)?;
        debug!(dancers = placed.len(), "breathed");
        Ok(placed)
    }
}

/// [`Breather::insert`] with default settings.
pub fn insert(meta: &Formation, components: &FxHashMap<Dancer, Formation>) -> Result<Formation, BreatheError> {
    Breather::new().insert(meta, components)
}

/// [`Breather::breathe`] with default settings.
pub fn breathe(f: &Formation) -> Result<Formation, BreatheError> {
    Breather::new().breathe(f)
}

/// [`Breather::breathe_pieces`] with default settings.
pub fn breathe_pieces(pieces: Vec<FormationPiece>) -> Result<Formation, BreatheError> {
    Breather::new().breathe_pieces(pieces)
}
