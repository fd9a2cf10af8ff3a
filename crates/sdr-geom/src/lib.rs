// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    rust_2018_idioms,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![doc = r"Dance-floor geometry for the formation engine.

This crate provides:
- Exact rational scalars (`Fraction`).
- Points and axis-aligned boxes (`Point`, `Aabb`).
- Headings with a precision modulus (`Rotation`).
- Dancer positions with transient flags (`Position`, `PositionFlags`).
- Rigid transforms between positions (`Transform`).

Design notes:
- Exact: every coordinate is a `BigRational`; nothing rounds.
- The floor grid is two units per dancer width. North is away from the caller,
  and headings grow clockwise in fractions of a full turn.
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Error type shared by the geometry primitives.
pub mod error;
/// Exact rational helpers.
pub mod fraction;
/// Foundational geometric types.
pub mod types;

pub use error::GeomError;
pub use fraction::{frac, half, int, Fraction};
pub use types::aabb::Aabb;
pub use types::point::Point;
pub use types::position::{Position, PositionFlags};
pub use types::rotation::Rotation;
pub use types::transform::Transform;
