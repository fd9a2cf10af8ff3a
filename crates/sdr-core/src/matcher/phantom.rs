// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use sdr_geom::{Point, Position, Rotation, Transform};
use tracing::trace;

use super::{goal_frame, GoalShape};
use crate::dancer::Dancer;
use crate::error::MatchError;
use crate::formation::Formation;
use crate::tagged::{Tag, TaggedFormation};

/// A goal laid over the whole input.
#[derive(Debug, Clone)]
pub(super) struct Alignment {
    /// The goal in its own coordinates, holding input dancers and phantoms.
    pub(super) occurrence: TaggedFormation,
    /// Turn carrying the goal onto the input.
    pub(super) rotation: Rotation,
    /// Phantoms created for empty goal spots.
    pub(super) inserted: BTreeSet<Dancer>,
}

fn exact_headings(r: &Rotation) -> Vec<Rotation> {
    if r.is_exact() {
        vec![r.clone()]
    } else {
        r.included()
    }
}

/// Tries the first canonical input dancer on every spot and heading of every
/// goal; the first transform that covers all input dancers wins.
pub(super) fn align(
    order: &[(Dancer, Position)],
    shapes: &[GoalShape<'_>],
    align_centers: bool,
) -> Result<Option<Alignment>, MatchError> {
    let Some((_, anchor)) = order.first() else {
        return Ok(None);
    };
    for shape in shapes {
        for anchor_facing in exact_headings(anchor.facing()) {
            let to = anchor.with_facing(anchor_facing);
            for spot in &shape.positions {
                for spot_facing in exact_headings(spot.facing()) {
                    let warp = Transform::between(&spot.with_facing(spot_facing), &to)?;
                    if align_centers && !warp.is_centered() {
                        continue;
                    }
                    if let Some(found) = cover(order, shape, &warp) {
                        return Ok(Some(found));
                    }
                }
            }
        }
    }
    Ok(None)
}

fn cover(order: &[(Dancer, Position)], shape: &GoalShape<'_>, warp: &Transform) -> Option<Alignment> {
    let warped: Vec<Position> = shape.positions.iter().map(|p| warp.apply(p)).collect();
    let spot_at: FxHashMap<Point, usize> = warped.iter().enumerate().map(|(i, p)| (p.to_point(), i)).collect();
    let mut taken: BTreeMap<usize, Dancer> = BTreeMap::new();
    let mut entries = Vec::with_capacity(shape.len());
    let mut tags = FxHashMap::default();
    for (d, p) in order {
        let &gi = spot_at.get(&p.to_point())?;
        if taken.contains_key(&gi) || !warped[gi].facing().includes(p.facing()) {
            return None;
        }
        taken.insert(gi, *d);
        entries.push((*d, goal_frame(&shape.positions[gi], p, warp.rotation())));
        tags.insert(*d, shape.goal.role_tags(shape.dancers[gi]));
    }
    let mut inserted = BTreeSet::new();
    for (gi, spot) in shape.positions.iter().enumerate() {
        if taken.contains_key(&gi) {
            continue;
        }
        let ph = Dancer::phantom();
        let mut t = shape.goal.role_tags(shape.dancers[gi]);
        t.insert(Tag::Noncorporeal);
        entries.push((ph, spot.clone()));
        tags.insert(ph, t);
        inserted.insert(ph);
    }
    trace!(inserted = inserted.len(), %warp, "goal covers input");
    Some(Alignment {
        occurrence: TaggedFormation::new(Formation::new(entries), tags),
        rotation: warp.rotation().clone(),
        inserted,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::library;

    #[test]
    fn lone_dancer_fills_a_couple() {
        let d = Dancer::phantom();
        let order = vec![(d, Position::grid(0, 0, Rotation::north()))];
        let shapes = [GoalShape::new(&library::COUPLE)];
        let found = align(&order, &shapes, false).unwrap().unwrap();
        assert_eq!(found.inserted.len(), 1);
        assert_eq!(found.occurrence.len(), 2);
        let ph = found.inserted.iter().next().copied().unwrap();
        assert!(found.occurrence.is(ph, Tag::Noncorporeal));
        assert!(found.occurrence.is(d, Tag::Beau));
    }

    #[test]
    fn centered_alignment_can_fail() {
        let d = Dancer::phantom();
        let order = vec![(d, Position::grid(0, 0, Rotation::north()))];
        let shapes = [GoalShape::new(&library::COUPLE)];
        assert!(align(&order, &shapes, true).unwrap().is_none());
    }
}
