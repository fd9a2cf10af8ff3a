// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Finding occurrences of goal shapes in a formation.
//!
//! [`Matcher::do_match`] looks for the largest set of disjoint occurrences
//! of the goals among the selected input dancers. Each occurrence is a rigid
//! copy of a goal (any rotation, any translation) whose spots all land on
//! dancers with compatible facings. The unique best assignment becomes a
//! [`FormationMatch`]; ties are reported as ambiguous.
//!
//! [`Matcher::do_phantom_match`] instead aligns the whole input with one
//! goal and fills the goal's empty spots with fresh phantoms.

mod phantom;
mod search;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use num_traits::{ToPrimitive, Zero};
use rustc_hash::FxHashMap;
use sdr_geom::{frac, Fraction, Position, Rotation, Transform};
use tracing::{debug, instrument};

use crate::breathe::{Breather, FormationPiece};
use crate::dancer::Dancer;
use crate::error::MatchError;
use crate::formation::Formation;
use crate::matched::FormationMatch;
use crate::settings::EngineSettings;
use crate::tagged::TaggedFormation;

pub(crate) const NO_GOALS: &str = "no goals";
pub(crate) const GOAL_TOO_LARGE: &str = "goal is too large";
pub(crate) const NO_MATCHES: &str = "no matches";
pub(crate) const AMBIGUOUS: &str = "ambiguous";
pub(crate) const EXCLUSIVE_OPTIONS: &str = "unmatched and phantoms are exclusive";
pub(crate) const NO_PHANTOM_ALIGNMENT: &str = "no phantom alignment";

/// Orders by facing precision first, then by position.
fn precision_first(a: &Position, b: &Position) -> Ordering {
    b.facing().modulus().cmp(a.facing().modulus()).then_with(|| a.cmp(b))
}

fn quarter_turns(p: &Position) -> [Position; 4] {
    let q = Rotation::east();
    let p1 = p.rotate_around_origin(&q);
    let p2 = p1.rotate_around_origin(&q);
    let p3 = p2.rotate_around_origin(&q);
    [p.clone(), p1, p2, p3]
}

fn min_by_precision<'a>(ps: impl IntoIterator<Item = &'a Position>) -> Option<&'a Position> {
    ps.into_iter().min_by(|a, b| precision_first(a, b))
}

/// Orders input dancers so that rotationally symmetric dancers sit next to
/// each other: by the least of their quarter-turn images, then of their
/// half-turn images, then by position.
fn canonical_order(f: &Formation) -> Vec<(Dancer, Position)> {
    let mut keyed: Vec<(Dancer, Position, Position, Position)> = f
        .entries()
        .iter()
        .filter(|(d, _)| f.is_selected(*d))
        .map(|(d, p)| {
            let turns = quarter_turns(p);
            let qtr = min_by_precision(&turns).cloned().unwrap_or_else(|| p.clone());
            let half = min_by_precision([&turns[0], &turns[2]]).cloned().unwrap_or_else(|| p.clone());
            (*d, p.clone(), qtr, half)
        })
        .collect();
    keyed.sort_by(|a, b| {
        precision_first(&a.2, &b.2)
            .then_with(|| precision_first(&a.3, &b.3))
            .then_with(|| precision_first(&a.1, &b.1))
    });
    keyed.into_iter().map(|(d, p, _, _)| (d, p)).collect()
}

/// `input` seen from the goal spot `spot` it occupies, with its own facing
/// turned back by `rot`.
pub(crate) fn goal_frame(spot: &Position, input: &Position, rot: &Rotation) -> Position {
    Position::new(spot.x().clone(), spot.y().clone(), input.facing().subtract(rot.amount()).normalize())
}

fn target_name(goal: &TaggedFormation) -> String {
    goal.name().map_or_else(|| goal.formation().to_diagram(""), str::to_owned)
}

/// Goal dancers in search order plus the facts the search needs about them.
#[derive(Debug, Clone)]
pub(crate) struct GoalShape<'g> {
    pub(crate) goal: &'g TaggedFormation,
    pub(crate) dancers: Vec<Dancer>,
    pub(crate) positions: Vec<Position>,
    /// Which goal dancers are images of dancer 0 under a quarter turn.
    pub(crate) eq0: Vec<bool>,
    /// Extra headings tried for dancer 0, as turns added to its facing.
    pub(crate) extra_turns: Vec<Fraction>,
}

impl<'g> GoalShape<'g> {
    fn new(goal: &'g TaggedFormation) -> Self {
        let mut entries: Vec<(Dancer, Position)> = goal.entries().to_vec();
        entries.sort_by(|a, b| precision_first(&a.1, &b.1));
        let (dancers, positions): (Vec<Dancer>, Vec<Position>) = entries.into_iter().unzip();
        let (eq0, extra_turns) = match positions.first() {
            Some(p0) => {
                let p0n = p0.normalize();
                let eq0 = positions
                    .iter()
                    .map(|p| {
                        quarter_turns(p).iter().any(|rp| {
                            rp.x() == p0n.x() && rp.y() == p0n.y() && rp.facing().includes(p0n.facing())
                        })
                    })
                    .collect();
                (eq0, extra_turns(p0.facing()))
            }
            None => (Vec::new(), Vec::new()),
        };
        Self { goal, dancers, positions, eq0, extra_turns }
    }

    fn len(&self) -> usize {
        self.dancers.len()
    }

    /// Dancer 0's position made exact by adding `extra`.
    fn exact_anchor(&self, extra: &Fraction) -> Option<Position> {
        self.positions.first().map(|p| {
            let facing = Rotation::exact(p.facing().amount() + extra);
            Position::new(p.x().clone(), p.y().clone(), facing)
        })
    }
}

fn extra_turns(facing: &Rotation) -> Vec<Fraction> {
    let n = if facing.is_any() { 8 } else { facing.modulus().denom().to_i64().unwrap_or(1) };
    (0..n).map(|i| frac(i, n)).collect()
}

/// The formation matcher, parameterized by search limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    settings: EngineSettings,
}

impl Matcher {
    /// Matcher with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher with explicit settings.
    pub fn with_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }

    fn breather(&self) -> Breather {
        Breather::with_settings(self.settings)
    }

    /// Finds the unique largest set of goal occurrences in `input`.
    ///
    /// With `allow_unmatched`, selected dancers outside every occurrence are
    /// kept as single-dancer pieces. `use_phantoms` delegates to
    /// [`Matcher::do_phantom_match`] and cannot be combined with
    /// `allow_unmatched`.
    #[instrument(skip_all, fields(dancers = input.len(), goals = goals.len()))]
    pub fn do_match(
        &self,
        input: &Formation,
        goals: &[&TaggedFormation],
        allow_unmatched: bool,
        use_phantoms: bool,
    ) -> Result<FormationMatch, MatchError> {
        let targets: Vec<String> = goals.iter().map(|g| target_name(g)).collect();
        if goals.is_empty() {
            return Err(MatchError::no_match(&targets, NO_GOALS));
        }
        if use_phantoms {
            if allow_unmatched {
                return Err(MatchError::no_match(&targets, EXCLUSIVE_OPTIONS));
            }
            return self.do_phantom_match(input, goals, false);
        }
        let order = canonical_order(input);
        let shapes: Vec<GoalShape<'_>> = goals.iter().map(|g| GoalShape::new(g)).collect();
        let smallest = shapes.iter().map(GoalShape::len).min().unwrap_or(0);
        if smallest > order.len() {
            return Err(MatchError::no_match(&targets, GOAL_TOO_LARGE));
        }
        if smallest == 0 {
            return Err(MatchError::no_match(&targets, NO_MATCHES));
        }
        let best = search::find_best(&order, &shapes, allow_unmatched, self.settings.search_node_limit)
            .map_err(|failure| match failure {
                search::Failure::NoMatch(reason) => MatchError::no_match(&targets, reason),
                search::Failure::LimitExceeded(limit) => MatchError::SearchLimitExceeded { targets: targets.clone(), limit },
            })?;
        debug!(occurrences = best.len(), "match found");

        let mut pieces = Vec::new();
        let mut matches = BTreeMap::new();
        let mut unmatched = BTreeSet::new();
        let mut covered: BTreeSet<Dancer> = BTreeSet::new();
        for occ in &best {
            let shape = &shapes[occ.goal];
            let anchor = &order[occ.anchor].1;
            let goal_anchor = shape
                .exact_anchor(&occ.extra)
                .ok_or_else(|| MatchError::no_match(&targets, NO_MATCHES))?;
            let warp = Transform::between(&goal_anchor, anchor)?;
            let mut positions = Vec::with_capacity(shape.len());
            let mut tags = FxHashMap::default();
            for (gi, &ii) in occ.members.iter().enumerate() {
                let (d, p) = &order[ii];
                positions.push((*d, goal_frame(&shape.positions[gi], p, warp.rotation())));
                tags.insert(*d, shape.goal.role_tags(shape.dancers[gi]));
                covered.insert(*d);
            }
            let tf = TaggedFormation::new(Formation::new(positions), tags);
            let meta_dancer = Dancer::phantom();
            let piece_in = input.select(tf.dancers()).only_selected();
            let piece_out = Formation::single_dancer_at(
                meta_dancer,
                Position::new(Fraction::zero(), Fraction::zero(), warp.rotation().clone()),
            );
            pieces.push(FormationPiece::new(piece_in, piece_out));
            matches.insert(meta_dancer, tf);
        }
        for (d, p) in input.entries() {
            if covered.contains(d) {
                continue;
            }
            let meta_dancer = Dancer::phantom();
            let tf = TaggedFormation::untagged(Formation::single_dancer_at(
                *d,
                Position::new(Fraction::zero(), Fraction::zero(), Rotation::north()),
            ));
            pieces.push(FormationPiece::new(
                input.select([*d]).only_selected(),
                Formation::single_dancer_at(meta_dancer, Position::new(Fraction::zero(), Fraction::zero(), p.facing().clone())),
            ));
            matches.insert(meta_dancer, tf);
            unmatched.insert(meta_dancer);
        }
        let meta = self.breather().breathe_pieces(pieces)?;
        Ok(FormationMatch { meta, matches, unmatched, inserted: BTreeSet::new() })
    }

    /// [`Matcher::do_match`] with a single goal.
    pub fn do_match_one(
        &self,
        input: &Formation,
        goal: &TaggedFormation,
        allow_unmatched: bool,
        use_phantoms: bool,
    ) -> Result<FormationMatch, MatchError> {
        self.do_match(input, &[goal], allow_unmatched, use_phantoms)
    }

    /// Aligns every selected input dancer with a spot of some goal and fills
    /// the remaining spots with new phantoms. The first alignment found wins.
    ///
    /// With `align_centers`, only alignments that keep the goal centered on
    /// the origin are accepted.
    #[instrument(skip_all, fields(dancers = input.len(), goals = goals.len(), align_centers))]
    pub fn do_phantom_match(
        &self,
        input: &Formation,
        goals: &[&TaggedFormation],
        align_centers: bool,
    ) -> Result<FormationMatch, MatchError> {
        let targets: Vec<String> = goals.iter().map(|g| target_name(g)).collect();
        if goals.is_empty() {
            return Err(MatchError::no_match(&targets, NO_GOALS));
        }
        let order = canonical_order(input);
        let shapes: Vec<GoalShape<'_>> = goals.iter().map(|g| GoalShape::new(g)).collect();
        let found = phantom::align(&order, &shapes, align_centers)?
            .ok_or_else(|| MatchError::no_match(&targets, NO_PHANTOM_ALIGNMENT))?;
        debug!(inserted = found.inserted.len(), "phantom alignment found");

        let meta_dancer = Dancer::phantom();
        let piece_in = input.only_selected();
        let piece_out = Formation::single_dancer_at(
            meta_dancer,
            Position::new(Fraction::zero(), Fraction::zero(), found.rotation),
        );
        let mut pieces = vec![FormationPiece::new(piece_in, piece_out)];
        let mut matches = BTreeMap::new();
        matches.insert(meta_dancer, found.occurrence);
        let mut unmatched = BTreeSet::new();
        for (d, p) in input.entries().iter().filter(|(d, _)| !input.is_selected(*d)) {
            let solo = Dancer::phantom();
            matches.insert(
                solo,
                TaggedFormation::untagged(Formation::single_dancer_at(
                    *d,
                    Position::new(Fraction::zero(), Fraction::zero(), Rotation::north()),
                )),
            );
            pieces.push(FormationPiece::new(
                input.select([*d]).only_selected(),
                Formation::single_dancer_at(solo, Position::new(Fraction::zero(), Fraction::zero(), p.facing().clone())),
            ));
            unmatched.insert(solo);
        }
        let meta = self.breather().breathe_pieces(pieces)?;
        Ok(FormationMatch { meta, matches, unmatched, inserted: found.inserted })
    }
}

/// [`Matcher::do_match`] with default settings.
pub fn do_match(
    input: &Formation,
    goals: &[&TaggedFormation],
    allow_unmatched: bool,
    use_phantoms: bool,
) -> Result<FormationMatch, MatchError> {
    Matcher::new().do_match(input, goals, allow_unmatched, use_phantoms)
}

/// [`Matcher::do_match_one`] with default settings.
pub fn do_match_one(
    input: &Formation,
    goal: &TaggedFormation,
    allow_unmatched: bool,
    use_phantoms: bool,
) -> Result<FormationMatch, MatchError> {
    Matcher::new().do_match_one(input, goal, allow_unmatched, use_phantoms)
}

/// [`Matcher::do_phantom_match`] with default settings.
pub fn do_phantom_match(
    input: &Formation,
    goals: &[&TaggedFormation],
    align_centers: bool,
) -> Result<FormationMatch, MatchError> {
    Matcher::new().do_phantom_match(input, goals, align_centers)
}

/// A reusable selector matching `goal` exactly (no unmatched dancers, no
/// phantoms).
pub fn make_selector(goal: TaggedFormation) -> impl Fn(&Formation) -> Result<FormationMatch, MatchError> + Send + Sync {
    let matcher = Matcher::new();
    move |f: &Formation| matcher.do_match_one(f, &goal, false, false)
}
