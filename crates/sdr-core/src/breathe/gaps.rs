// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Gap allocation: re-spacing trimmed box boundaries so every output fits.

use std::collections::{BTreeMap, BTreeSet};

use num_traits::{Signed, Zero};
use sdr_geom::{half, Aabb, Fraction};
use tracing::{debug, warn};

use super::FormationPiece;
use crate::error::BreatheError;
use crate::formation::Formation;
use crate::solver::{Expr, LinearProgram, Strength, Var};

/// An interval on one axis that must stretch to at least `size`.
#[derive(Debug, Clone)]
struct Bit {
    start: Fraction,
    end: Fraction,
    size: Fraction,
}

fn push_bit(bits: &mut Vec<Bit>, start: Fraction, end: Fraction, size: Fraction) {
    if start.is_negative() && end.is_positive() {
        let halved = half(&size);
        bits.push(Bit { start, end: Fraction::zero(), size: halved.clone() });
        bits.push(Bit { start: Fraction::zero(), end, size: halved });
    } else {
        bits.push(Bit { start, end, size });
    }
}

/// Solves one axis; returns the new coordinate of every old boundary.
fn solve_axis(spans: &[(Fraction, Fraction, Fraction)]) -> Result<BTreeMap<Fraction, Fraction>, BreatheError> {
    let mut keys: BTreeSet<Fraction> = BTreeSet::new();
    keys.insert(Fraction::zero());
    let mut bits = Vec::with_capacity(spans.len() * 2);
    for (start, end, size) in spans {
        keys.insert(start.clone());
        keys.insert(end.clone());
        push_bit(&mut bits, start.clone(), end.clone(), size.clone());
    }
    let ordered: Vec<Fraction> = keys.into_iter().collect();
    let mut lp = LinearProgram::new();
    let vars: BTreeMap<Fraction, Var> = ordered.iter().map(|k| (k.clone(), lp.free_var())).collect();
    let v = |k: &Fraction| vars[k];
    lp.eq(v(&Fraction::zero()), Fraction::zero(), Strength::Required);
    for w in ordered.windows(2) {
        lp.le(v(&w[0]), v(&w[1]), Strength::Required);
    }
    let rank: BTreeMap<&Fraction, usize> = ordered.iter().enumerate().map(|(i, k)| (k, i)).collect();
    for b in &bits {
        lp.ge(v(&b.end) - v(&b.start), b.size.clone(), Strength::Required);
        // Keep the boundaries nested inside a bit evenly spread toward its
        // outer edge.
        if b.end.is_positive() {
            let (mut inner, mut outer) = (rank[&b.start], rank[&b.end]);
            while inner + 2 < outer {
                let (ni, no) = (inner + 1, outer - 1);
                lp.eq(
                    v(&ordered[ni]) - v(&ordered[inner]),
                    v(&ordered[outer]) - v(&ordered[no]),
                    Strength::Strong,
                );
                inner = ni;
                outer = no;
            }
        } else if b.start.is_negative() {
            let (mut inner, mut outer) = (rank[&b.end], rank[&b.start]);
            while outer + 2 < inner {
                let (ni, no) = (inner - 1, outer + 1);
                lp.eq(
                    v(&ordered[inner]) - v(&ordered[ni]),
                    v(&ordered[no]) - v(&ordered[outer]),
                    Strength::Strong,
                );
                inner = ni;
                outer = no;
            }
        }
    }
    // Keys are monotone around the pinned zero, so the pull toward the
    // center is linear on each side.
    for k in &ordered {
        if k.is_positive() {
            lp.minimize(v(k), Strength::Weak);
        } else if k.is_negative() {
            lp.minimize(-Expr::from(v(k)), Strength::Weak);
        }
    }
    let sol = lp.solve().map_err(|e| {
        warn!(error = %e, bits = bits.len(), "gap allocation infeasible");
        BreatheError::CannotBreathe
    })?;
    Ok(ordered.iter().map(|k| (k.clone(), sol.value(v(k)).clone())).collect())
}

/// Moves each piece's output to the center of its re-spaced box.
pub(super) fn allocate(pieces: &[FormationPiece], boxes: &[Aabb]) -> Result<Formation, BreatheError> {
    let sizes: Vec<Aabb> = pieces.iter().map(|p| p.output.bounds()).collect();
    let x_spans: Vec<_> = boxes
        .iter()
        .zip(&sizes)
        .map(|(b, s)| (b.ll().x.clone(), b.ur().x.clone(), s.width()))
        .collect();
    let y_spans: Vec<_> = boxes
        .iter()
        .zip(&sizes)
        .map(|(b, s)| (b.ll().y.clone(), b.ur().y.clone(), s.height()))
        .collect();
    let xs = solve_axis(&x_spans)?;
    let ys = solve_axis(&y_spans)?;
    debug!(x_keys = xs.len(), y_keys = ys.len(), "gaps allocated");
    let mut entries = Vec::new();
    for (p, b) in pieces.iter().zip(boxes) {
        let cx = half(&(&xs[&b.ll().x] + &xs[&b.ur().x]));
        let cy = half(&(&ys[&b.ll().y] + &ys[&b.ur().y]));
        let moved = p.output.translated(&cx, &cy);
        entries.extend(moved.entries().iter().cloned());
    }
    Ok(Formation::new(entries))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sdr_geom::int;

    fn span(s: i64, e: i64, size: i64) -> (Fraction, Fraction, Fraction) {
        (int(s), int(e), int(size))
    }

    #[test]
    fn straddling_bit_splits_evenly() {
        let got = solve_axis(&[span(-1, 1, 4)]).unwrap();
        assert_eq!(got[&int(-1)], int(-2));
        assert_eq!(got[&int(1)], int(2));
        assert_eq!(got[&int(0)], int(0));
    }

    #[test]
    fn distant_boxes_close_in() {
        let got = solve_axis(&[span(4, 6, 2), span(-6, -4, 2)]).unwrap();
        assert_eq!(got[&int(4)], int(0));
        assert_eq!(got[&int(6)], int(2));
        assert_eq!(got[&int(-6)], int(-2));
    }

    #[test]
    fn touching_centerline_does_not_float() {
        // A box that touches 0 from one side stays on that side.
        let got = solve_axis(&[span(0, 2, 2)]).unwrap();
        assert_eq!(got[&int(0)], int(0));
        assert_eq!(got[&int(2)], int(2));
    }

    #[test]
    fn nested_boundaries_spread_evenly() {
        let got = solve_axis(&[span(0, 6, 6), span(0, 2, 0), span(2, 4, 0), span(4, 6, 0)]).unwrap();
        assert_eq!(got[&int(6)], int(6));
        assert_eq!(&got[&int(2)] - &got[&int(0)], &got[&int(6)] - &got[&int(4)]);
    }
}
