// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Exact linear programming with strength tiers.
//!
//! Programs are built from [`Expr`] constraints tagged with a [`Strength`].
//! Required constraints must hold; each soft constraint gets non-negative
//! error variables, and the errors are minimized tier by tier: strong first,
//! then medium with the strong optimum held, then weak. A tier may also carry
//! a linear objective ([`LinearProgram::minimize`]) that is minimized along
//! with its errors.
//!
//! Determinism notes:
//! - Arithmetic is exact (`BigRational`); there is no tolerance anywhere.
//! - Pivoting follows Bland's rule, so the result is a function of the
//!   program as written, including constraint and variable order.

mod program;
mod simplex;

pub use program::{Expr, LinearProgram, Penalty, Solution, Strength, Var};
