// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Overlap trimming.
//!
//! Each overlapping pair of input boxes offers exclusive cut options: join a
//! pair of hands into a star, split along x, or split along y. Pieces linked
//! by overlaps or existing handholds form independent components. Within a
//! component, branch and bound walks the pairs from the smallest overlap up;
//! every node is an exact LP over inward edge offsets whose lexicographic
//! penalty bounds the subtree, and children are expanded cheapest first. A
//! child whose cut the parent's optimum already meets reuses that optimum.
//!
//! When optimal assignments disagree only on which axis splits a pair, that
//! pair is split on both axes. A rotated input then trims the same way.

use std::collections::{BTreeMap, BTreeSet};

use num_traits::{One, Signed, Zero};
use sdr_geom::{frac, half, Aabb, Fraction, Point, Rotation};
use tracing::{debug, trace, warn};

use super::FormationPiece;
use crate::error::BreatheError;
use crate::settings::EngineSettings;
use crate::solver::{Expr, LinearProgram, Penalty, Solution, Strength, Var};

/// Inward offsets of one box's edges.
#[derive(Debug, Clone, Copy)]
struct EdgeVars {
    left: Var,
    bottom: Var,
    right: Var,
    top: Var,
}

impl EdgeVars {
    fn left(&self, b: &Aabb) -> Expr {
        Expr::from(self.left) + b.ll().x.clone()
    }

    fn right(&self, b: &Aabb) -> Expr {
        Expr::constant(b.ur().x.clone()) - self.right
    }

    fn bottom(&self, b: &Aabb) -> Expr {
        Expr::from(self.bottom) + b.ll().y.clone()
    }

    fn top(&self, b: &Aabb) -> Expr {
        Expr::constant(b.ur().y.clone()) - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// One piece's hand, as a direction out of its box center.
#[derive(Debug, Clone)]
struct Hand {
    piece: usize,
    dir: Rotation,
}

#[derive(Debug, Clone)]
enum Cut {
    /// These two hands meet at one point; the boxes may keep overlapping.
    Star(Hand, Hand),
    /// `lo`'s far edge meets `hi`'s near edge along `axis`.
    Split { axis: Axis, lo: usize, hi: usize },
}

/// Point on the boundary of `b` along `dir` from its center.
fn hand_point(b: &Aabb, dir: &Rotation) -> Point {
    let c = b.center();
    Point::new(
        c.x + half(&(dir.to_x() * b.width())),
        c.y + half(&(dir.to_y() * b.height())),
    )
}

/// The same point as affine expressions in the trimmed edges.
fn hand_exprs(vars: &EdgeVars, b: &Aabb, dir: &Rotation) -> (Expr, Expr) {
    let one = Fraction::one();
    let lo_w = |t: Fraction| (&one - &t) * frac(1, 2);
    let hi_w = |t: Fraction| (&one + &t) * frac(1, 2);
    let x = vars.left(b) * lo_w(dir.to_x()) + vars.right(b) * hi_w(dir.to_x());
    let y = vars.bottom(b) * lo_w(dir.to_y()) + vars.top(b) * hi_w(dir.to_y());
    (x, y)
}

fn hands(piece: usize, handhold: Option<&Rotation>) -> Vec<Hand> {
    handhold
        .map(|h| {
            let er = Rotation::exact(h.normalize().amount().clone());
            let back = er.add(&frac(1, 2));
            vec![Hand { piece, dir: er }, Hand { piece, dir: back }]
        })
        .unwrap_or_default()
}

fn touching_hands(boxes: &[Aabb], a: &[Hand], b: &[Hand]) -> Vec<(Hand, Hand)> {
    let mut out = Vec::new();
    for ha in a {
        for hb in b {
            if hand_point(&boxes[ha.piece], &ha.dir) == hand_point(&boxes[hb.piece], &hb.dir) {
                out.push((ha.clone(), hb.clone()));
            }
        }
    }
    out
}

/// Whether `hand` points from its box center toward `other`'s center.
fn reaches(boxes: &[Aabb], hand: &Hand, other: usize) -> bool {
    let from = boxes[hand.piece].center();
    let to = boxes[other].center();
    (hand.dir.to_x() * (to.x - from.x) + hand.dir.to_y() * (to.y - from.y)).is_positive()
}

fn interval(b: &Aabb, axis: Axis) -> (&Fraction, &Fraction) {
    match axis {
        Axis::X => (&b.ll().x, &b.ur().x),
        Axis::Y => (&b.ll().y, &b.ur().y),
    }
}

fn overlap_len(a: &Aabb, b: &Aabb, axis: Axis) -> Fraction {
    let (sa, ea) = interval(a, axis);
    let (sb, eb) = interval(b, axis);
    ea.min(eb) - sa.max(sb)
}

fn split_option(boxes: &[Aabb], i: usize, j: usize, axis: Axis) -> Option<Cut> {
    let (si, ei) = interval(&boxes[i], axis);
    let (sj, ej) = interval(&boxes[j], axis);
    if si == sj && ei == ej {
        return None;
    }
    let (lo, hi) = if (si, ei) <= (sj, ej) { (i, j) } else { (j, i) };
    Some(Cut::Split { axis, lo, hi })
}

/// Union-find over piece indices; each root is its group's smallest index.
struct Components {
    parent: Vec<usize>,
}

impl Components {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut at = i;
        while self.parent[at] != root {
            let next = self.parent[at];
            self.parent[at] = root;
            at = next;
        }
        root
    }

    fn join(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }

    /// Groups in order of their smallest member.
    fn groups(mut self) -> Vec<Vec<usize>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            by_root.entry(root).or_default().push(i);
        }
        by_root.into_values().collect()
    }
}

/// One component's trimming problem, indexed locally.
struct Problem {
    boxes: Vec<Aabb>,
    /// Medium-strength hand pairs that already touch.
    handshakes: Vec<(Hand, Hand)>,
    /// Options per overlapping pair, in search order.
    options: Vec<Vec<Cut>>,
}

impl Problem {
    fn new(boxes: Vec<Aabb>, handholds: &[Option<Rotation>]) -> Result<Self, BreatheError> {
        let all_hands: Vec<Vec<Hand>> =
            handholds.iter().enumerate().map(|(i, h)| hands(i, h.as_ref())).collect();
        let mut handshakes = Vec::new();
        let mut pairs = Vec::new();
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                handshakes.extend(touching_hands(&boxes, &all_hands[i], &all_hands[j]));
                if boxes[i].overlaps(&boxes[j]) {
                    let (a, b) = (&boxes[i], &boxes[j]);
                    let depth = overlap_len(a, b, Axis::X).min(overlap_len(a, b, Axis::Y));
                    pairs.push((depth, i, j));
                }
            }
        }
        pairs.sort();

        let mut options = Vec::with_capacity(pairs.len());
        for (_, i, j) in pairs {
            let mut opts = Vec::new();
            if let (Some(hi), Some(hj)) = (&handholds[i], &handholds[j]) {
                if hi.add(&frac(1, 4)) == *hj {
                    let touching = touching_hands(&boxes, &all_hands[i], &all_hands[j]);
                    for a in &all_hands[i] {
                        for b in &all_hands[j] {
                            let joined = touching.iter().any(|(ta, tb)| ta.dir == a.dir && tb.dir == b.dir);
                            if joined || (reaches(&boxes, a, j) && reaches(&boxes, b, i)) {
                                opts.push(Cut::Star(a.clone(), b.clone()));
                            }
                        }
                    }
                }
            }
            opts.extend(split_option(&boxes, i, j, Axis::X));
            opts.extend(split_option(&boxes, i, j, Axis::Y));
            if opts.is_empty() {
                warn!(i, j, "overlapping boxes admit no cut");
                return Err(BreatheError::CannotTrim);
            }
            options.push(opts);
        }
        Ok(Self { boxes, handshakes, options })
    }

    fn chosen_cuts<'a>(&'a self, chosen: &'a [usize]) -> impl Iterator<Item = &'a Cut> {
        chosen.iter().zip(&self.options).map(|(&k, opts)| &opts[k])
    }

    fn program<'a>(&self, cuts: impl IntoIterator<Item = &'a Cut>) -> (LinearProgram, Vec<EdgeVars>) {
        let mut lp = LinearProgram::new();
        let vars: Vec<EdgeVars> = self
            .boxes
            .iter()
            .map(|_| EdgeVars {
                left: lp.nonneg_var(),
                bottom: lp.nonneg_var(),
                right: lp.nonneg_var(),
                top: lp.nonneg_var(),
            })
            .collect();
        for (v, b) in vars.iter().zip(&self.boxes) {
            lp.le(v.left(b), v.right(b), Strength::Required);
            lp.le(v.bottom(b), v.top(b), Strength::Required);
            for edge in [v.left, v.bottom, v.right, v.top] {
                lp.minimize(edge, Strength::Weak);
            }
        }
        let hand_eq = |lp: &mut LinearProgram, a: &Hand, b: &Hand, strength: Strength| {
            let (ax, ay) = hand_exprs(&vars[a.piece], &self.boxes[a.piece], &a.dir);
            let (bx, by) = hand_exprs(&vars[b.piece], &self.boxes[b.piece], &b.dir);
            lp.eq(ax, bx, strength);
            lp.eq(ay, by, strength);
        };
        for (a, b) in &self.handshakes {
            hand_eq(&mut lp, a, b, Strength::Medium);
        }
        for cut in cuts {
            match cut {
                Cut::Star(a, b) => hand_eq(&mut lp, a, b, Strength::Required),
                Cut::Split { axis, lo, hi } => {
                    let (lo_end, hi_start, shift) = self.split_exprs(&vars, *axis, *lo, *hi);
                    lp.le(lo_end, hi_start, Strength::Required);
                    lp.eq(shift, Fraction::zero(), Strength::Weak);
                }
            }
        }
        (lp, vars)
    }

    /// `lo`'s far edge, `hi`'s near edge, and how far the meeting point
    /// drifts from the middle of the overlap.
    fn split_exprs(&self, vars: &[EdgeVars], axis: Axis, lo: usize, hi: usize) -> (Expr, Expr, Expr) {
        let (lv, lb, hv, hb) = (&vars[lo], &self.boxes[lo], &vars[hi], &self.boxes[hi]);
        let (lo_end, hi_start, lo_end0, hi_start0) = match axis {
            Axis::X => (lv.right(lb), hv.left(hb), lb.ur().x.clone(), hb.ll().x.clone()),
            Axis::Y => (lv.top(lb), hv.bottom(hb), lb.ur().y.clone(), hb.ll().y.clone()),
        };
        let shift = (lo_end.clone() - lo_end0) + (hi_start.clone() - hi_start0);
        (lo_end, hi_start, shift)
    }

    /// Whether `sol` already meets `cut` at no extra cost, so adding it
    /// leaves the optimum unchanged.
    fn holds(&self, cut: &Cut, vars: &[EdgeVars], sol: &Solution) -> bool {
        match cut {
            Cut::Star(a, b) => {
                let (ax, ay) = hand_exprs(&vars[a.piece], &self.boxes[a.piece], &a.dir);
                let (bx, by) = hand_exprs(&vars[b.piece], &self.boxes[b.piece], &b.dir);
                sol.eval(&ax) == sol.eval(&bx) && sol.eval(&ay) == sol.eval(&by)
            }
            Cut::Split { axis, lo, hi } => {
                let (lo_end, hi_start, shift) = self.split_exprs(vars, *axis, *lo, *hi);
                sol.eval(&lo_end) <= sol.eval(&hi_start) && sol.eval(&shift).is_zero()
            }
        }
    }

    fn read_boxes(&self, vars: &[EdgeVars], sol: &Solution) -> Result<Vec<Aabb>, BreatheError> {
        vars.iter()
            .zip(&self.boxes)
            .map(|(v, b)| {
                let ll = Point::new(sol.eval(&v.left(b)), sol.eval(&v.bottom(b)));
                let ur = Point::new(sol.eval(&v.right(b)), sol.eval(&v.top(b)));
                Aabb::new(ll, ur).map_err(|_| BreatheError::CannotTrim)
            })
            .collect()
    }

    /// Cuts for every pair: the lowest optimal choice, or both splits where
    /// the optimal assignments disagree only on the split axis.
    fn settle_ties<'a>(&'a self, optimal: &[(Vec<usize>, Vec<Aabb>)], first: &[usize]) -> (Vec<&'a Cut>, bool) {
        let mut cuts = Vec::with_capacity(self.options.len());
        let mut widened = false;
        for (k, opts) in self.options.iter().enumerate() {
            let picked: BTreeSet<usize> = optimal.iter().map(|(chosen, _)| chosen[k]).collect();
            let both_splits = picked.len() == 2 && picked.iter().all(|&o| matches!(opts[o], Cut::Split { .. }));
            if both_splits {
                cuts.extend(picked.iter().map(|&o| &opts[o]));
                widened = true;
            } else {
                cuts.push(&opts[first[k]]);
            }
        }
        (cuts, widened)
    }

    fn solve(&self, node_limit: Option<usize>, nodes: &mut usize) -> Result<Vec<Aabb>, BreatheError> {
        let mut search = Search { problem: self, node_limit, nodes: *nodes, best: None, optimal: Vec::new() };
        let mut chosen = Vec::with_capacity(self.options.len());
        if let Some((sol, vars)) = search.evaluate(&chosen)? {
            search.visit(&mut chosen, &sol, &vars)?;
        }
        *nodes = search.nodes;
        let Some(penalty) = search.best else {
            warn!(pairs = self.options.len(), "no feasible trim");
            return Err(BreatheError::CannotTrim);
        };
        let mut optimal = search.optimal;
        optimal.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(weak = %penalty.weak, ties = optimal.len(), "component trimmed");
        let (first, boxes) = &optimal[0];
        let (cuts, widened) = self.settle_ties(&optimal, first);
        if !widened {
            return Ok(boxes.clone());
        }
        let (lp, vars) = self.program(cuts);
        match lp.solve() {
            Ok(sol) => {
                debug!("tied pairs split on both axes");
                self.read_boxes(&vars, &sol)
            }
            Err(e) => {
                trace!(error = %e, "both-axis split infeasible");
                Ok(boxes.clone())
            }
        }
    }
}

struct Search<'a> {
    problem: &'a Problem,
    node_limit: Option<usize>,
    nodes: usize,
    best: Option<Penalty>,
    /// Every leaf reaching `best`, with its trimmed boxes.
    optimal: Vec<(Vec<usize>, Vec<Aabb>)>,
}

impl Search<'_> {
    fn count_node(&mut self) -> Result<(), BreatheError> {
        self.nodes += 1;
        if let Some(limit) = self.node_limit.filter(|&l| self.nodes > l) {
            warn!(limit, "trim node limit reached");
            return Err(BreatheError::TrimLimitExceeded(limit));
        }
        Ok(())
    }

    /// Solves the node for `chosen`; `None` when it is infeasible.
    fn evaluate(&mut self, chosen: &[usize]) -> Result<Option<(Solution, Vec<EdgeVars>)>, BreatheError> {
        self.count_node()?;
        let (lp, vars) = self.problem.program(self.problem.chosen_cuts(chosen));
        match lp.solve() {
            Ok(sol) => Ok(Some((sol, vars))),
            Err(e) => {
                trace!(depth = chosen.len(), error = %e, "trim branch infeasible");
                Ok(None)
            }
        }
    }

    fn visit(&mut self, chosen: &mut Vec<usize>, sol: &Solution, vars: &[EdgeVars]) -> Result<(), BreatheError> {
        if self.best.as_ref().is_some_and(|b| sol.penalty() > b) {
            return Ok(());
        }
        let depth = chosen.len();
        if depth == self.problem.options.len() {
            let boxes = self.problem.read_boxes(vars, sol)?;
            if self.best.as_ref() != Some(sol.penalty()) {
                self.best = Some(sol.penalty().clone());
                self.optimal.clear();
            }
            self.optimal.push((chosen.clone(), boxes));
            return Ok(());
        }
        let problem = self.problem;
        let mut children = Vec::with_capacity(problem.options[depth].len());
        for (k, cut) in problem.options[depth].iter().enumerate() {
            chosen.push(k);
            let child = if problem.holds(cut, vars, sol) {
                self.count_node()?;
                Some((sol.clone(), vars.to_vec()))
            } else {
                self.evaluate(chosen)?
            };
            chosen.pop();
            children.extend(child.map(|c| (k, c)));
        }
        children.sort_by(|a, b| a.1 .0.penalty().cmp(b.1 .0.penalty()));
        for (k, (child_sol, child_vars)) in children {
            chosen.push(k);
            self.visit(chosen, &child_sol, &child_vars)?;
            chosen.pop();
        }
        Ok(())
    }
}

/// Shrinks input boxes until no two overlap, except where a pair of hands
/// is joined into a star. Prefers keeping handholds and cutting as little
/// as possible.
pub(super) fn trim_overlap(
    pieces: &[FormationPiece],
    settings: &EngineSettings,
) -> Result<Vec<Aabb>, BreatheError> {
    let boxes: Vec<Aabb> = pieces.iter().map(|p| p.input.bounds()).collect();
    let handholds: Vec<Option<Rotation>> = pieces
        .iter()
        .map(|p| p.input.common_facing(&frac(1, 2)).map(|r| r.add(&frac(1, 4))))
        .collect();
    let all_hands: Vec<Vec<Hand>> =
        handholds.iter().enumerate().map(|(i, h)| hands(i, h.as_ref())).collect();

    let mut links = Components::new(boxes.len());
    let mut overlapping = vec![false; boxes.len()];
    for i in 0..boxes.len() {
        for j in i + 1..boxes.len() {
            if boxes[i].overlaps(&boxes[j]) {
                overlapping[i] = true;
                overlapping[j] = true;
                links.join(i, j);
            } else if !touching_hands(&boxes, &all_hands[i], &all_hands[j]).is_empty() {
                links.join(i, j);
            }
        }
    }
    if !overlapping.contains(&true) {
        return Ok(boxes);
    }

    let mut out = boxes.clone();
    let mut nodes = 0;
    for members in links.groups() {
        if !members.iter().any(|&i| overlapping[i]) {
            continue;
        }
        let local: Vec<Aabb> = members.iter().map(|&i| boxes[i].clone()).collect();
        let holds: Vec<Option<Rotation>> = members.iter().map(|&i| handholds[i].clone()).collect();
        let problem = Problem::new(local, &holds)?;
        trace!(pieces = members.len(), pairs = problem.options.len(), "trimming component");
        let trimmed = problem.solve(settings.trim_node_limit, &mut nodes)?;
        for (&i, b) in members.iter().zip(trimmed) {
            out[i] = b;
        }
    }
    debug!(nodes, "trim complete");
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::dancer::Dancer;
    use crate::formation::Formation;
    use sdr_geom::{int, Position};

    fn piece(spots: &[(i64, i64, Rotation)]) -> FormationPiece {
        let f = Formation::new(spots.iter().map(|(x, y, r)| (Dancer::phantom(), Position::grid(*x, *y, r.clone()))));
        FormationPiece::new(f.clone(), f.recenter())
    }

    fn at(x: Fraction, y: Fraction, r: Rotation) -> FormationPiece {
        let f = Formation::new([(Dancer::phantom(), Position::new(x, y, r))]);
        FormationPiece::new(f.clone(), f.recenter())
    }

    #[test]
    fn disjoint_boxes_pass_through() {
        let pieces = vec![piece(&[(-1, 0, Rotation::north())]), piece(&[(1, 0, Rotation::north())])];
        let boxes = trim_overlap(&pieces, &EngineSettings::default()).unwrap();
        assert_eq!(boxes[0], pieces[0].input.bounds());
        assert_eq!(boxes[1], pieces[1].input.bounds());
    }

    #[test]
    fn overlap_is_split_at_midpoint() {
        let pieces = vec![piece(&[(0, 0, Rotation::north())]), piece(&[(1, 0, Rotation::north())])];
        let boxes = trim_overlap(&pieces, &EngineSettings::default()).unwrap();
        assert_eq!(boxes[0].ur().x, frac(1, 2));
        assert_eq!(boxes[1].ll().x, frac(1, 2));
        assert_eq!(boxes[0].ll().x, int(-1));
        assert_eq!(boxes[0].height(), int(2));
        assert!(!boxes[0].overlaps(&boxes[1]));
    }

    #[test]
    fn shorter_axis_is_cut() {
        // Overlap is 1 in y and 2 in x, so the y cut is cheaper.
        let wide = piece(&[(0, 0, Rotation::north()), (2, 0, Rotation::north())]);
        let pieces = vec![wide, piece(&[(1, 1, Rotation::north())])];
        let boxes = trim_overlap(&pieces, &EngineSettings::default()).unwrap();
        assert_eq!(boxes[0].ur().y, frac(1, 2));
        assert_eq!(boxes[1].ll().y, frac(1, 2));
        assert_eq!(boxes[0].width(), int(4));
    }

    #[test]
    fn equal_diagonal_overlap_is_cut_on_both_axes() {
        let pieces = vec![piece(&[(0, 0, Rotation::north())]), piece(&[(1, 1, Rotation::north())])];
        let boxes = trim_overlap(&pieces, &EngineSettings::default()).unwrap();
        assert_eq!(boxes[0].ur(), &Point::new(frac(1, 2), frac(1, 2)));
        assert_eq!(boxes[1].ll(), &Point::new(frac(1, 2), frac(1, 2)));
    }

    #[test]
    fn quarter_turned_neighbours_join_hands_in_a_star() {
        // A center facing north and a point facing east, half a step apart
        // from sharing a hand point.
        let center = at(int(-1), int(0), Rotation::north());
        let point = at(int(0), frac(1, 2), Rotation::east());
        let boxes = trim_overlap(&[center, point], &EngineSettings::default()).unwrap();
        let center_hand = hand_point(&boxes[0], &Rotation::east());
        let point_hand = hand_point(&boxes[1], &Rotation::south());
        assert_eq!(center_hand, point_hand);
        assert!(boxes[0].overlaps(&boxes[1]));
    }

    #[test]
    fn separate_clusters_are_trimmed_independently() {
        let near = vec![piece(&[(0, 0, Rotation::north())]), piece(&[(1, 0, Rotation::north())])];
        let mut both = near.clone();
        both.push(piece(&[(20, 0, Rotation::north())]));
        both.push(piece(&[(21, 0, Rotation::north())]));
        let alone = trim_overlap(&near, &EngineSettings::default()).unwrap();
        let together = trim_overlap(&both, &EngineSettings::default()).unwrap();
        assert_eq!(&together[..2], &alone[..]);
        assert_eq!(together[3].ll().x, frac(41, 2));
    }

    #[test]
    fn node_limit_is_an_error_not_a_guess() {
        let pieces = vec![piece(&[(0, 0, Rotation::north())]), piece(&[(1, 0, Rotation::north())])];
        let settings = EngineSettings::default().with_trim_node_limit(1);
        assert_eq!(trim_overlap(&pieces, &settings), Err(BreatheError::TrimLimitExceeded(1)));
        let roomy = EngineSettings::default().with_trim_node_limit(2);
        assert_eq!(trim_overlap(&pieces, &roomy), trim_overlap(&pieces, &EngineSettings::default()));
    }

    #[test]
    fn hand_point_follows_direction() {
        let b = Aabb::new(Point::new(int(-2), int(-1)), Point::new(int(2), int(1))).unwrap();
        assert_eq!(hand_point(&b, &Rotation::east()), Point::new(int(2), int(0)));
        assert_eq!(hand_point(&b, &Rotation::west()), Point::new(int(-2), int(0)));
    }
}
