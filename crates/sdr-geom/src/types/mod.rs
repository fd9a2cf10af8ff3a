// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types (point, box, rotation, position, transform).
//!
//! Determinism notes:
//! - All arithmetic is exact; equality and ordering never depend on rounding.
//! - Box overlap is strict on faces: boxes that merely touch do not overlap.
//!   Dancers standing shoulder to shoulder share a face.
//! - Rotations compare by normalized amount, so `5/4` and `1/4` are equal.

#[doc = "Axis-aligned boxes over exact rationals."]
pub mod aabb;
#[doc = "Two-dimensional exact points."]
pub mod point;
#[doc = "Dancer positions: location, facing, and transient flags."]
pub mod position;
#[doc = "Headings with a precision modulus."]
pub mod rotation;
#[doc = "Rigid transforms between exact positions."]
pub mod transform;
