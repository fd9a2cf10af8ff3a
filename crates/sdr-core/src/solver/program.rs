// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::ops::{Add, Mul, Neg, Sub};
use std::collections::BTreeMap;

use num_traits::Zero;
use sdr_geom::Fraction;
use tracing::debug;

use super::simplex::{self, Column, Row, TIERS};
use crate::error::SolveError;

/// Handle to a program variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(usize);

/// Affine expression `sum(coef * var) + constant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    terms: BTreeMap<Var, Fraction>,
    constant: Fraction,
}

impl Default for Expr {
    fn default() -> Self {
        Self::constant(Fraction::zero())
    }
}

impl Expr {
    /// The constant `c`.
    pub fn constant(c: Fraction) -> Self {
        Self { terms: BTreeMap::new(), constant: c }
    }

    /// `coef * v`.
    pub fn term(v: Var, coef: Fraction) -> Self {
        let mut e = Self::default();
        e.add_term(v, coef);
        e
    }

    fn add_term(&mut self, v: Var, coef: Fraction) {
        let sum = self.terms.remove(&v).unwrap_or_else(Fraction::zero) + coef;
        if !sum.is_zero() {
            self.terms.insert(v, sum);
        }
    }
}

impl From<Var> for Expr {
    fn from(v: Var) -> Self {
        Self::term(v, Fraction::from_integer(1.into()))
    }
}

impl From<Fraction> for Expr {
    fn from(c: Fraction) -> Self {
        Self::constant(c)
    }
}

impl<T: Into<Expr>> Add<T> for Expr {
    type Output = Self;

    fn add(mut self, rhs: T) -> Self {
        let rhs = rhs.into();
        for (v, c) in rhs.terms {
            self.add_term(v, c);
        }
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<Expr>> Sub<T> for Expr {
    type Output = Self;

    fn sub(self, rhs: T) -> Self {
        self + (-rhs.into())
    }
}

impl<T: Into<Expr>> Add<T> for Var {
    type Output = Expr;

    fn add(self, rhs: T) -> Expr {
        Expr::from(self) + rhs
    }
}

impl<T: Into<Expr>> Sub<T> for Var {
    type Output = Expr;

    fn sub(self, rhs: T) -> Expr {
        Expr::from(self) - rhs
    }
}

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        self * Fraction::from_integer((-1).into())
    }
}

impl Mul<Fraction> for Expr {
    type Output = Self;

    fn mul(self, k: Fraction) -> Self {
        if k.is_zero() {
            return Self::default();
        }
        Self {
            terms: self.terms.into_iter().map(|(v, c)| (v, c * &k)).collect(),
            constant: self.constant * k,
        }
    }
}

/// How firmly a constraint must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strength {
    /// Must hold; otherwise the program is infeasible.
    Required,
    /// Violation minimized first.
    Strong,
    /// Violation minimized once strong is optimal.
    Medium,
    /// Violation minimized last.
    Weak,
}

impl Strength {
    pub(super) fn tier(self) -> Option<usize> {
        match self {
            Self::Required => None,
            Self::Strong => Some(0),
            Self::Medium => Some(1),
            Self::Weak => Some(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Eq,
    Le,
    Ge,
}

#[derive(Debug, Clone)]
struct Constraint {
    expr: Expr,
    relation: Relation,
    strength: Strength,
}

/// Total soft-constraint violation plus objective per tier, compared
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Penalty {
    /// Strong-tier violation.
    pub strong: Fraction,
    /// Medium-tier violation.
    pub medium: Fraction,
    /// Weak-tier violation.
    pub weak: Fraction,
}

/// Optimal variable values plus the achieved penalty.
#[derive(Debug, Clone)]
pub struct Solution {
    values: Vec<Fraction>,
    penalty: Penalty,
}

impl Solution {
    /// Value assigned to `v`.
    pub fn value(&self, v: Var) -> &Fraction {
        &self.values[v.0]
    }

    /// Evaluates `e` at this solution.
    pub fn eval(&self, e: &Expr) -> Fraction {
        e.terms.iter().fold(e.constant.clone(), |acc, (v, c)| acc + c * self.value(*v))
    }

    /// Soft-constraint violation per tier.
    pub fn penalty(&self) -> &Penalty {
        &self.penalty
    }
}

/// A linear program over free and non-negative real variables.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    nonneg: Vec<bool>,
    constraints: Vec<Constraint>,
    objective: Vec<(Expr, Strength)>,
}

impl LinearProgram {
    /// An empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unrestricted variable.
    pub fn free_var(&mut self) -> Var {
        self.nonneg.push(false);
        Var(self.nonneg.len() - 1)
    }

    /// Adds a variable restricted to `>= 0`.
    pub fn nonneg_var(&mut self) -> Var {
        self.nonneg.push(true);
        Var(self.nonneg.len() - 1)
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.nonneg.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    fn push(&mut self, lhs: impl Into<Expr>, rhs: impl Into<Expr>, relation: Relation, strength: Strength) {
        let expr = lhs.into() - rhs;
        self.constraints.push(Constraint { expr, relation, strength });
    }

    /// `lhs == rhs`.
    pub fn eq(&mut self, lhs: impl Into<Expr>, rhs: impl Into<Expr>, strength: Strength) {
        self.push(lhs, rhs, Relation::Eq, strength);
    }

    /// `lhs <= rhs`.
    pub fn le(&mut self, lhs: impl Into<Expr>, rhs: impl Into<Expr>, strength: Strength) {
        self.push(lhs, rhs, Relation::Le, strength);
    }

    /// `lhs >= rhs`.
    pub fn ge(&mut self, lhs: impl Into<Expr>, rhs: impl Into<Expr>, strength: Strength) {
        self.push(lhs, rhs, Relation::Ge, strength);
    }

    /// Adds `e` to the cost minimized in `strength`'s tier (`Required` counts
    /// as strong).
    ///
    /// Unlike a soft `eq(e, 0)` this costs no rows, but `e` must be bounded
    /// below by the required constraints or solving fails with
    /// [`SolveError::Unbounded`].
    pub fn minimize(&mut self, e: impl Into<Expr>, strength: Strength) {
        self.objective.push((e.into(), strength));
    }

    /// Solves lexicographically: required feasibility, then strong, medium,
    /// and weak cost in turn.
    pub fn solve(&self) -> Result<Solution, SolveError> {
        let mut columns: Vec<Column> = Vec::new();
        let mut var_cols = Vec::with_capacity(self.nonneg.len());
        for &nonneg in &self.nonneg {
            let pos = columns.len();
            columns.push(Column::Structural);
            let neg = if nonneg {
                None
            } else {
                columns.push(Column::Structural);
                Some(columns.len() - 1)
            };
            var_cols.push((pos, neg));
        }
        let one = Fraction::from_integer(1.into());
        let mut rows = Vec::with_capacity(self.constraints.len());
        for c in &self.constraints {
            let mut coefs: Vec<(usize, Fraction)> = Vec::new();
            for (v, k) in &c.expr.terms {
                let (pos, neg) = var_cols[v.0];
                coefs.push((pos, k.clone()));
                if let Some(neg) = neg {
                    coefs.push((neg, -k));
                }
            }
            let mut add_col = |kind: Column, coef: Fraction| {
                columns.push(kind);
                coefs.push((columns.len() - 1, coef));
            };
            let tier = c.strength.tier();
            match (c.relation, tier) {
                (Relation::Eq, None) => {}
                (Relation::Eq, Some(t)) => {
                    add_col(Column::Error(t), one.clone());
                    add_col(Column::Error(t), -&one);
                }
                (Relation::Le, _) => {
                    add_col(Column::Slack, one.clone());
                    if let Some(t) = tier {
                        add_col(Column::Error(t), -&one);
                    }
                }
                (Relation::Ge, _) => {
                    add_col(Column::Slack, -&one);
                    if let Some(t) = tier {
                        add_col(Column::Error(t), one.clone());
                    }
                }
            }
            rows.push(Row { coefs, rhs: -&c.expr.constant });
        }
        let mut costs: [Vec<(usize, Fraction)>; TIERS] = Default::default();
        let mut offsets: [Fraction; TIERS] = Default::default();
        for (e, strength) in &self.objective {
            let tier = strength.tier().unwrap_or(0);
            for (v, k) in &e.terms {
                let (pos, neg) = var_cols[v.0];
                costs[tier].push((pos, k.clone()));
                if let Some(neg) = neg {
                    costs[tier].push((neg, -k));
                }
            }
            offsets[tier] += &e.constant;
        }
        debug!(
            vars = self.nonneg.len(),
            constraints = self.constraints.len(),
            columns = columns.len(),
            "solving linear program"
        );
        let (col_values, tiers) = simplex::solve(&columns, rows, &costs)?;
        let values = var_cols
            .iter()
            .map(|(pos, neg)| match neg {
                Some(n) => &col_values[*pos] - &col_values[*n],
                None => col_values[*pos].clone(),
            })
            .collect();
        let [strong, medium, weak] = [0, 1, 2].map(|t| &tiers[t] + &offsets[t]);
        Ok(Solution { values, penalty: Penalty { strong, medium, weak } })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sdr_geom::{frac, int};

    #[test]
    fn required_infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.free_var();
        lp.ge(x, int(2), Strength::Required);
        lp.le(x, int(1), Strength::Required);
        assert_eq!(lp.solve().unwrap_err(), SolveError::Infeasible);
    }

    #[test]
    fn strong_beats_weak() {
        let mut lp = LinearProgram::new();
        let x = lp.free_var();
        lp.eq(x, int(3), Strength::Strong);
        lp.eq(x, int(0), Strength::Weak);
        let s = lp.solve().unwrap();
        assert_eq!(s.value(x), &int(3));
        assert_eq!(s.penalty().weak, int(3));
        assert!(s.penalty().strong.is_zero());
    }

    #[test]
    fn weak_pull_respects_required_bound() {
        let mut lp = LinearProgram::new();
        let x = lp.free_var();
        lp.le(x, int(-2), Strength::Required);
        lp.eq(x, int(0), Strength::Weak);
        let s = lp.solve().unwrap();
        assert_eq!(s.value(x), &int(-2));
    }

    #[test]
    fn equal_gap_chain() {
        // d >= a+2, g >= d+2, e >= b+2, f >= c+2 with equal neighbouring gaps.
        let mut lp = LinearProgram::new();
        let v: Vec<Var> = (0..7).map(|_| lp.free_var()).collect();
        let (a, b, c, d, e, f, g) = (v[0], v[1], v[2], v[3], v[4], v[5], v[6]);
        for w in v.windows(2) {
            lp.le(w[0], w[1], Strength::Required);
        }
        lp.eq(a, int(0), Strength::Required);
        lp.ge(d, a + int(2), Strength::Required);
        lp.ge(g, d + int(2), Strength::Required);
        lp.ge(e, b + int(2), Strength::Required);
        lp.ge(f, c + int(2), Strength::Required);
        for w in v.windows(3) {
            lp.eq(w[1] - w[0], w[2] - w[1], Strength::Strong);
        }
        for x in &v {
            lp.eq(*x, int(0), Strength::Weak);
        }
        let s = lp.solve().unwrap();
        let got: Vec<Fraction> = v.iter().map(|x| s.value(*x).clone()).collect();
        let want: Vec<Fraction> = (0..7).map(|i| frac(2 * i, 3)).collect();
        assert_eq!(got, want);
        assert!(s.penalty().strong.is_zero());
    }

    #[test]
    fn objective_matches_soft_pull_on_nonneg_vars() {
        let build = |objective: bool| {
            let mut lp = LinearProgram::new();
            let x = lp.nonneg_var();
            let y = lp.nonneg_var();
            lp.ge(x + y, int(3), Strength::Required);
            lp.le(x, int(1), Strength::Required);
            if objective {
                lp.minimize(x + Expr::from(y) * int(2), Strength::Weak);
            } else {
                lp.eq(x, int(0), Strength::Weak);
                lp.eq(Expr::from(y) * int(2), int(0), Strength::Weak);
            }
            let s = lp.solve().unwrap();
            (s.value(x).clone(), s.value(y).clone(), s.penalty().weak.clone())
        };
        assert_eq!(build(true), build(false));
        assert_eq!(build(true), (int(1), int(2), int(5)));
    }

    #[test]
    fn objective_constant_lands_in_its_tier() {
        let mut lp = LinearProgram::new();
        let x = lp.nonneg_var();
        lp.minimize(Expr::from(x) + frac(3, 2), Strength::Medium);
        let s = lp.solve().unwrap();
        assert_eq!(s.penalty().medium, frac(3, 2));
        assert!(s.value(x).is_zero());
    }

    #[test]
    fn unbounded_objective_is_reported() {
        let mut lp = LinearProgram::new();
        let x = lp.free_var();
        lp.le(x, int(4), Strength::Required);
        lp.minimize(x, Strength::Weak);
        assert_eq!(lp.solve().unwrap_err(), SolveError::Unbounded);
    }
}
