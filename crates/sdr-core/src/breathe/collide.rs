// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use sdr_geom::{frac, Fraction, Point, PositionFlags, Rotation};
use tracing::debug;

use super::{Breather, FormationPiece};
use crate::error::BreatheError;
use crate::formation::Formation;
use crate::library::{LH_MINIWAVE, RH_MINIWAVE};

/// Groups pieces by input-box center and merges each colliding pair into a
/// single miniwave piece.
pub(super) fn resolve_collisions(
    breather: &Breather,
    pieces: Vec<FormationPiece>,
) -> Result<Vec<FormationPiece>, BreatheError> {
    let mut groups: Vec<Vec<FormationPiece>> = Vec::new();
    let mut by_center: FxHashMap<Point, usize> = FxHashMap::default();
    for p in pieces {
        let c = p.input.bounds().center();
        match by_center.get(&c) {
            Some(&i) => groups[i].push(p),
            None => {
                by_center.insert(c, groups.len());
                groups.push(vec![p]);
            }
        }
    }
    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let mut it = group.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(a), None, _) => out.push(a),
            (Some(a), Some(b), None) => out.push(collide(breather, a, b)?),
            _ => return Err(BreatheError::MoreThanTwoColliding),
        }
    }
    Ok(out)
}

fn passes_left(f: &Formation) -> Result<bool, BreatheError> {
    let mut left = f.entries().iter().map(|(_, p)| p.flags().contains(PositionFlags::PASS_LEFT));
    let first = left.next().unwrap_or(false);
    if left.all(|l| l == first) {
        Ok(first)
    } else {
        Err(BreatheError::InconsistentShoulder)
    }
}

fn collide(breather: &Breather, a: FormationPiece, b: FormationPiece) -> Result<FormationPiece, BreatheError> {
    let pass_left = passes_left(&a.input)?;
    if pass_left != passes_left(&b.input)? {
        return Err(BreatheError::InconsistentShoulder);
    }
    let template = if pass_left { &*LH_MINIWAVE } else { &*RH_MINIWAVE };
    let sorted = template.sorted_dancers();
    let (&dd0, &dd1) = match sorted.as_slice() {
        [d0, d1] => (d0, d1),
        _ => return Err(BreatheError::MoreThanTwoColliding),
    };
    let exact = Fraction::one();
    let rr_a = a.input.common_facing(&exact).ok_or(BreatheError::InconsistentFacing)?;
    let rr_b = b.input.common_facing(&exact).ok_or(BreatheError::InconsistentFacing)?;
    if rr_a.add(&frac(1, 2)) != rr_b {
        return Err(BreatheError::NotFacingOpposite);
    }
    let dd0_facing = template.location(dd0).map(|p| p.facing().amount().clone()).unwrap_or_else(Fraction::zero);
    let meta = template.formation().rotate(&Rotation::exact(rr_a.amount() - dd0_facing))?;
    let meta = Formation::new(meta.entries().iter().map(|(d, p)| (*d, p.with_facing(Rotation::north()))));
    debug!(at = %a.input.bounds().center(), pass_left, "merging colliding pieces");
    let mut components = FxHashMap::default();
    components.insert(dd0, a.output);
    components.insert(dd1, b.output);
    let merged = breather.insert(&meta, &components)?;
    Ok(FormationPiece::new(a.input, merged))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::dancer::{Dancer, StandardDancer};
    use sdr_geom::{int, Position};

    fn lone(d: Dancer, x: i64, y: i64, facing: Rotation) -> FormationPiece {
        let at = Position::grid(x, y, facing.clone());
        FormationPiece::new(Formation::single_dancer_at(d, at), super::super::tests::single_at_origin(d, facing))
    }

    #[test]
    fn facing_pair_becomes_right_hand_miniwave() {
        let a = Dancer::Standard(StandardDancer::Couple1Boy);
        let b = Dancer::Standard(StandardDancer::Couple1Girl);
        let pieces = vec![lone(a, 0, 0, Rotation::north()), lone(b, 0, 0, Rotation::south())];
        let out = resolve_collisions(&Breather::new(), pieces).unwrap();
        assert_eq!(out.len(), 1);
        let merged = &out[0].output;
        assert_eq!(merged.location(a).unwrap().x(), &int(-1));
        assert_eq!(merged.location(b).unwrap().x(), &int(1));
    }

    #[test]
    fn same_facing_is_rejected() {
        let a = Dancer::Standard(StandardDancer::Couple1Boy);
        let b = Dancer::Standard(StandardDancer::Couple1Girl);
        let pieces = vec![lone(a, 0, 0, Rotation::north()), lone(b, 0, 0, Rotation::north())];
        assert_eq!(resolve_collisions(&Breather::new(), pieces), Err(BreatheError::NotFacingOpposite));
    }

    #[test]
    fn three_at_one_spot_is_rejected() {
        let ds = [StandardDancer::Couple1Boy, StandardDancer::Couple1Girl, StandardDancer::Couple2Boy];
        let pieces = ds.iter().map(|d| lone((*d).into(), 2, 2, Rotation::north())).collect();
        assert_eq!(resolve_collisions(&Breather::new(), pieces), Err(BreatheError::MoreThanTwoColliding));
    }

    #[test]
    fn mixed_shoulders_are_rejected() {
        let a = Dancer::Standard(StandardDancer::Couple1Boy);
        let b = Dancer::Standard(StandardDancer::Couple1Girl);
        let left = Position::grid(0, 0, Rotation::north()).with_flags(PositionFlags::PASS_LEFT).unwrap();
        let pa = FormationPiece::new(
            Formation::single_dancer_at(a, left),
            super::super::tests::single_at_origin(a, Rotation::north()),
        );
        let pieces = vec![pa, lone(b, 0, 0, Rotation::south())];
        assert_eq!(resolve_collisions(&Breather::new(), pieces), Err(BreatheError::InconsistentShoulder));
    }
}
