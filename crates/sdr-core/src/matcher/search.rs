// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use sdr_geom::{Fraction, Point, Position, Transform};
use tracing::{debug, trace};

use super::{GoalShape, AMBIGUOUS, NO_MATCHES};
use crate::dancer::Dancer;

/// One placed copy of a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Occurrence {
    /// Index into the goal list.
    pub(super) goal: usize,
    /// Canonical index of the input dancer standing on goal dancer 0.
    pub(super) anchor: usize,
    /// Turn added to goal dancer 0's facing to make it exact.
    pub(super) extra: Fraction,
    /// Canonical input index per goal dancer, in goal order.
    pub(super) members: Vec<usize>,
}

/// Why [`find_best`] produced no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Failure {
    /// The search finished; the reason is a no-match string.
    NoMatch(&'static str),
    /// The configured node limit was reached first.
    LimitExceeded(usize),
}

struct Search<'a> {
    order: &'a [(Dancer, Position)],
    shapes: &'a [GoalShape<'a>],
    at: FxHashMap<Point, usize>,
    allow_unmatched: bool,
    min_size: usize,
    node_limit: Option<usize>,
    nodes: usize,
    assigned: Vec<bool>,
    assigned_count: usize,
    current: Vec<Occurrence>,
    best_count: usize,
    best: Vec<Vec<Occurrence>>,
}

impl Search<'_> {
    /// Members of goal `g` anchored on input `k`, if every spot is covered.
    fn validate(&self, k: usize, g: usize, extra: &Fraction) -> Option<Vec<usize>> {
        let shape = &self.shapes[g];
        let anchor = shape.exact_anchor(extra)?;
        let warp = Transform::between(&anchor, &self.order[k].1).ok()?;
        let mut members = Vec::with_capacity(shape.len());
        for (gi, gp) in shape.positions.iter().enumerate() {
            let wp = warp.apply(gp);
            let &ii = self.at.get(&wp.to_point())?;
            if self.assigned[ii] || members.contains(&ii) {
                return None;
            }
            // Symmetric copies anchored on an earlier dancer were already tried.
            if shape.eq0[gi] && ii < k {
                return None;
            }
            if !wp.facing().includes(self.order[ii].1.facing()) {
                return None;
            }
            members.push(ii);
        }
        Some(members)
    }

    fn set_assigned(&mut self, members: &[usize], value: bool) {
        for &i in members {
            self.assigned[i] = value;
        }
        if value {
            self.assigned_count += members.len();
        } else {
            self.assigned_count -= members.len();
        }
    }

    fn record(&mut self) {
        if self.current.is_empty() {
            return;
        }
        if !self.allow_unmatched && self.assigned_count != self.order.len() {
            return;
        }
        match self.current.len().cmp(&self.best_count) {
            Ordering::Greater => {
                self.best_count = self.current.len();
                self.best = vec![self.current.clone()];
            }
            Ordering::Equal => self.best.push(self.current.clone()),
            Ordering::Less => {}
        }
    }

    fn visit(&mut self, k: usize) -> Result<(), Failure> {
        self.nodes += 1;
        if let Some(limit) = self.node_limit.filter(|&l| self.nodes > l) {
            return Err(Failure::LimitExceeded(limit));
        }
        let n = self.order.len();
        let free = n - self.assigned_count;
        let free_anchors = (k..n).filter(|&i| !self.assigned[i]).count();
        if self.current.len() + free_anchors.min(free / self.min_size) < self.best_count {
            return Ok(());
        }
        if k == n {
            self.record();
            return Ok(());
        }
        if !self.assigned[k] && self.order[k].1.facing().is_exact() {
            let shapes = self.shapes;
            for (g, shape) in shapes.iter().enumerate() {
                for extra in &shape.extra_turns {
                    let Some(members) = self.validate(k, g, extra) else { continue };
                    trace!(anchor = k, goal = g, "occurrence");
                    self.set_assigned(&members, true);
                    self.current.push(Occurrence { goal: g, anchor: k, extra: extra.clone(), members });
                    let res = self.visit(k + 1);
                    if let Some(occ) = self.current.pop() {
                        self.set_assigned(&occ.members, false);
                    }
                    res?;
                }
            }
        }
        self.visit(k + 1)
    }
}

/// Exhaustive search for the unique assignment with the most occurrences.
///
/// Without a node limit the search always runs to completion.
pub(super) fn find_best(
    order: &[(Dancer, Position)],
    shapes: &[GoalShape<'_>],
    allow_unmatched: bool,
    node_limit: Option<usize>,
) -> Result<Vec<Occurrence>, Failure> {
    let at = order.iter().enumerate().map(|(i, (_, p))| (p.to_point(), i)).collect();
    let min_size = shapes.iter().map(GoalShape::len).min().unwrap_or(1).max(1);
    let mut search = Search {
        order,
        shapes,
        at,
        allow_unmatched,
        min_size,
        node_limit,
        nodes: 0,
        assigned: vec![false; order.len()],
        assigned_count: 0,
        current: Vec::new(),
        best_count: 0,
        best: Vec::new(),
    };
    search.visit(0)?;
    debug!(nodes = search.nodes, best = search.best_count, ties = search.best.len(), "match search done");
    let mut best = search.best.into_iter();
    match (best.next(), best.next()) {
        (None, _) => Err(Failure::NoMatch(NO_MATCHES)),
        (Some(_), Some(_)) => Err(Failure::NoMatch(AMBIGUOUS)),
        (Some(only), None) => Ok(only),
    }
}
