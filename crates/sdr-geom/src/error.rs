// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Geometry error taxonomy.

use thiserror::Error;

/// Failures raised by geometry primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeomError {
    /// A box was built with its lower-left corner above or right of its upper-right.
    #[error("invalid box: lower-left {ll} exceeds upper-right {ur}")]
    InvalidBox {
        /// Rendered lower-left corner.
        ll: String,
        /// Rendered upper-right corner.
        ur: String,
    },
    /// An operation needing an exact heading received a vague one.
    #[error("rotation {0} is not exact")]
    InexactRotation(String),
    /// Stepping or turning "in" was requested where in and out are equidistant.
    #[error("no clear 'in' direction")]
    NoClearInDirection,
    /// Mutually exclusive flags (left and right roll, or left and right sweep) were combined.
    #[error("conflicting position flags: {0}")]
    ConflictingFlags(String),
    /// A heading was requested for the zero vector.
    #[error("zero vector has no heading")]
    ZeroVector,
    /// A direction name was not recognised.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),
}
