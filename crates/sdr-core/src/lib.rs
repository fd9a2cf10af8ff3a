// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate
)]
#![doc = r"Square-dance formations and the engines that reshape them.

This crate provides:
- The formation data model (`Dancer`, `Formation`, `TaggedFormation`, `Tag`).
- The breathing engine (`Breather`, `insert`, `breathe`, `breathe_pieces`),
  which merges collided pieces, trims overlaps, and re-spaces the result.
- The general formation matcher (`Matcher`, `do_match`, `do_phantom_match`).
- A library of named goal shapes (`library`).
- The exact lexicographic linear-program solver used by breathing (`solver`).

Design notes:
- Values are immutable; every operation returns a new formation.
- Arithmetic is exact rational throughout, so results are reproducible
  bit for bit.
- Search limits come from `EngineSettings` and are never process globals.
"]

pub mod library;
pub mod solver;

mod breathe;
mod dancer;
mod error;
mod formation;
mod matched;
mod matcher;
mod settings;
mod tagged;

pub use breathe::{breathe, breathe_pieces, insert, Breather, FormationPiece};
pub use dancer::{Dancer, PhantomId, StandardDancer};
pub use error::{BreatheError, MatchError, SolveError};
pub use formation::{Formation, DANCER_EXTENT};
pub use matched::FormationMatch;
pub use matcher::{do_match, do_match_one, do_phantom_match, make_selector, Matcher};
pub use settings::EngineSettings;
pub use tagged::{Tag, TaggedFormation};
