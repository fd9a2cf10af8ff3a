// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for solving, breathing, and matching.

use sdr_geom::GeomError;
use thiserror::Error;

/// Failures of the linear-program solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The required constraints admit no solution.
    #[error("required constraints are infeasible")]
    Infeasible,
    /// An objective term can decrease without bound.
    #[error("objective is unbounded")]
    Unbounded,
}

/// Failures while breathing or inserting formations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreatheError {
    /// Three or more pieces share one center point.
    #[error("more than two dancers colliding")]
    MoreThanTwoColliding,
    /// Colliding pieces disagree on which shoulder to pass.
    #[error("inconsistent passing shoulder")]
    InconsistentShoulder,
    /// A colliding piece has no single exact facing direction.
    #[error("inconsistent facing direction")]
    InconsistentFacing,
    /// Two pieces collide without facing opposite directions.
    #[error("collision but not facing opposite")]
    NotFacingOpposite,
    /// Overlap trimming found no feasible set of boxes.
    #[error("cannot trim overlapping formations")]
    CannotTrim,
    /// Overlap trimming hit its configured node limit before finishing.
    #[error("overlap trimming exceeded its {0}-node limit")]
    TrimLimitExceeded(usize),
    /// Gap allocation found no feasible spacing.
    #[error("cannot breathe formation")]
    CannotBreathe,
    /// `insert` was given a meta dancer without a component formation.
    #[error("no component formation for meta dancer {0}")]
    MissingComponent(String),
    /// `insert` was given a meta dancer whose facing is not exact.
    #[error("meta dancer {0} has a vague facing")]
    VagueMetaFacing(String),
    /// A geometry primitive rejected its input.
    #[error(transparent)]
    Geometry(#[from] GeomError),
}

/// Failures of the formation matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// No acceptable match exists.
    #[error("no match for {}: {reason}", .targets.join(", "))]
    NoMatch {
        /// Names of the goal formations tried.
        targets: Vec<String>,
        /// Why the match failed.
        reason: String,
    },
    /// The search hit its configured node limit before finishing.
    #[error("search for {} exceeded its {limit}-node limit", .targets.join(", "))]
    SearchLimitExceeded {
        /// Names of the goal formations tried.
        targets: Vec<String>,
        /// The configured node limit.
        limit: usize,
    },
    /// Reassembling the matched pieces failed.
    #[error(transparent)]
    Breathe(#[from] BreatheError),
    /// A geometry primitive rejected its input.
    #[error(transparent)]
    Geometry(#[from] GeomError),
}

impl MatchError {
    pub(crate) fn no_match(targets: &[String], reason: &str) -> Self {
        Self::NoMatch { targets: targets.to_vec(), reason: reason.to_owned() }
    }

    /// Whether this is a `NoMatch` with the given reason.
    pub fn is_no_match(&self, reason: &str) -> bool {
        matches!(self, Self::NoMatch { reason: r, .. } if r == reason)
    }
}
