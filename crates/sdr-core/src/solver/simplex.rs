// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dense two-phase tableau over `BigRational`.

use num_traits::{One, Signed, Zero};
use sdr_geom::Fraction;
use tracing::trace;

use crate::error::SolveError;

pub(super) const TIERS: usize = 3;

/// Column kinds. Slack and error columns each appear in exactly one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Column {
    Structural,
    Slack,
    Error(usize),
    Artificial,
}

/// Sparse row `sum(coef * column) = rhs`.
#[derive(Debug, Clone)]
pub(super) struct Row {
    pub(super) coefs: Vec<(usize, Fraction)>,
    pub(super) rhs: Fraction,
}

struct Tableau {
    a: Vec<Vec<Fraction>>,
    b: Vec<Fraction>,
    basis: Vec<usize>,
    in_basis: Vec<bool>,
    blocked: Vec<bool>,
}

impl Tableau {
    fn pivot(&mut self, r: usize, c: usize) {
        let p = self.a[r][c].clone();
        for v in &mut self.a[r] {
            if !v.is_zero() {
                *v /= &p;
            }
        }
        self.b[r] /= &p;
        let pivot_row = self.a[r].clone();
        let pivot_rhs = self.b[r].clone();
        for i in 0..self.a.len() {
            if i == r || self.a[i][c].is_zero() {
                continue;
            }
            let k = self.a[i][c].clone();
            for (v, pv) in self.a[i].iter_mut().zip(&pivot_row) {
                if !pv.is_zero() {
                    *v -= &k * pv;
                }
            }
            self.b[i] -= &k * &pivot_rhs;
        }
        self.in_basis[self.basis[r]] = false;
        self.in_basis[c] = true;
        self.basis[r] = c;
    }

    fn reduced_costs(&self, cost: &[Fraction]) -> Vec<Fraction> {
        let mut d = cost.to_vec();
        for (i, &bc) in self.basis.iter().enumerate() {
            if cost[bc].is_zero() {
                continue;
            }
            for (dj, aij) in d.iter_mut().zip(&self.a[i]) {
                if !aij.is_zero() {
                    *dj -= &cost[bc] * aij;
                }
            }
        }
        d
    }

    fn objective(&self, cost: &[Fraction]) -> Fraction {
        self.basis.iter().zip(&self.b).fold(Fraction::zero(), |acc, (&j, bj)| acc + &cost[j] * bj)
    }

    /// Minimizes `cost` with Bland's rule.
    fn optimize(&mut self, cost: &[Fraction]) -> Result<(), SolveError> {
        loop {
            let d = self.reduced_costs(cost);
            let entering =
                (0..d.len()).find(|&j| !self.blocked[j] && !self.in_basis[j] && d[j].is_negative());
            let Some(c) = entering else {
                return Ok(());
            };
            let mut leave: Option<(usize, Fraction)> = None;
            for i in 0..self.a.len() {
                if !self.a[i][c].is_positive() {
                    continue;
                }
                let ratio = &self.b[i] / &self.a[i][c];
                let better = match &leave {
                    None => true,
                    Some((r, best)) => ratio < *best || (ratio == *best && self.basis[i] < self.basis[*r]),
                };
                if better {
                    leave = Some((i, ratio));
                }
            }
            let Some((r, _)) = leave else {
                return Err(SolveError::Unbounded);
            };
            trace!(row = r, column = c, "pivot");
            self.pivot(r, c);
        }
    }

    /// Blocks every non-basic column whose reduced cost is positive, pinning
    /// the current optimum of `cost` for later tiers.
    fn freeze(&mut self, cost: &[Fraction]) {
        let d = self.reduced_costs(cost);
        for (j, dj) in d.iter().enumerate() {
            if dj.is_positive() && !self.in_basis[j] {
                self.blocked[j] = true;
            }
        }
    }
}

/// Solves `rows` (all columns non-negative) lexicographically over the
/// tiers. Tier `t` minimizes its error columns plus `objectives[t]`.
/// Returns the column values and the per-tier optimum.
pub(super) fn solve(
    columns: &[Column],
    rows: Vec<Row>,
    objectives: &[Vec<(usize, Fraction)>; TIERS],
) -> Result<(Vec<Fraction>, [Fraction; TIERS]), SolveError> {
    let n = columns.len();
    let mut kinds = columns.to_vec();
    let mut a = Vec::with_capacity(rows.len());
    let mut b = Vec::with_capacity(rows.len());
    let mut starts = Vec::with_capacity(rows.len());
    for row in rows {
        let flip = row.rhs.is_negative();
        let mut dense = vec![Fraction::zero(); n];
        for (j, k) in row.coefs {
            dense[j] += if flip { -k } else { k };
        }
        // A unit slack or error column is already a basis column for its row.
        starts.push((0..n).find(|&j| kinds[j] != Column::Structural && dense[j].is_one()));
        a.push(dense);
        b.push(if flip { -row.rhs } else { row.rhs });
    }
    let mut basis = Vec::with_capacity(starts.len());
    for start in starts {
        basis.push(start.unwrap_or_else(|| {
            kinds.push(Column::Artificial);
            kinds.len() - 1
        }));
    }
    let total = kinds.len();
    for (i, row) in a.iter_mut().enumerate() {
        row.resize(total, Fraction::zero());
        if basis[i] >= n {
            row[basis[i]] = Fraction::one();
        }
    }
    let mut in_basis = vec![false; total];
    for &j in &basis {
        in_basis[j] = true;
    }
    let mut t = Tableau { a, b, basis, in_basis, blocked: vec![false; total] };

    if total > n {
        let phase1: Vec<Fraction> =
            kinds.iter().map(|k| if *k == Column::Artificial { Fraction::one() } else { Fraction::zero() }).collect();
        t.optimize(&phase1)?;
        if t.objective(&phase1).is_positive() {
            return Err(SolveError::Infeasible);
        }
        // Drive artificials out of the basis; rows that cannot be pivoted are
        // redundant.
        let mut redundant = Vec::new();
        for r in 0..t.basis.len() {
            if kinds[t.basis[r]] != Column::Artificial {
                continue;
            }
            match (0..n).find(|&j| !t.a[r][j].is_zero()) {
                Some(c) => t.pivot(r, c),
                None => redundant.push(r),
            }
        }
        for r in redundant.into_iter().rev() {
            t.in_basis[t.basis[r]] = false;
            t.a.remove(r);
            t.b.remove(r);
            t.basis.remove(r);
        }
        for (j, k) in kinds.iter().enumerate() {
            if *k == Column::Artificial {
                t.blocked[j] = true;
            }
        }
    }

    let mut optima: [Fraction; TIERS] = [Fraction::zero(), Fraction::zero(), Fraction::zero()];
    for (tier, optimum) in optima.iter_mut().enumerate() {
        let mut cost: Vec<Fraction> =
            kinds.iter().map(|k| if *k == Column::Error(tier) { Fraction::one() } else { Fraction::zero() }).collect();
        for (j, k) in &objectives[tier] {
            cost[*j] += k;
        }
        if cost.iter().all(Zero::is_zero) {
            continue;
        }
        t.optimize(&cost)?;
        *optimum = t.objective(&cost);
        t.freeze(&cost);
    }

    let mut values = vec![Fraction::zero(); n];
    for (i, &j) in t.basis.iter().enumerate() {
        if j < n {
            values[j] = t.b[i].clone();
        }
    }
    Ok((values, optima))
}
