// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Breathing whole formations the way calls leave them.

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use sdr_core::library::{FOUR_SQUARE, SQUARED_SET};
use sdr_core::StandardDancer::{
    Couple1Boy, Couple1Girl, Couple2Boy, Couple2Girl, Couple3Boy, Couple3Girl, Couple4Boy, Couple4Girl,
};
use sdr_core::{breathe, insert, BreatheError, Breather, Dancer, EngineSettings, Formation, StandardDancer};
use sdr_dry_tests::{assert_diagram, side_step, step_forward, FormationBuilder};
use sdr_geom::{frac, int, Position, PositionFlags, Rotation};

fn facing_pair() -> Formation {
    FormationBuilder::new()
        .at(Couple1Boy, 0, -1, Rotation::north())
        .at(Couple3Girl, 0, 1, Rotation::south())
        .build()
}

#[test]
fn squared_set_is_already_breathed() {
    let out = breathe(&SQUARED_SET).unwrap();
    assert_eq!(out, *SQUARED_SET);
}

#[test]
fn back_to_back_couples_keep_their_spacing() {
    let f = FormationBuilder::new()
        .at(Couple3Girl, -1, 1, Rotation::north())
        .at(Couple3Boy, 1, 1, Rotation::north())
        .at(Couple1Boy, -1, -1, Rotation::south())
        .at(Couple1Girl, 1, -1, Rotation::south())
        .build();
    assert_eq!(breathe(&f).unwrap(), f);
}

#[test]
fn facing_dancers_meet_in_a_right_hand_miniwave() {
    let stepped = step_forward(&facing_pair(), &int(1), false).unwrap();
    assert_diagram(&breathe(&stepped).unwrap(), "1B^  3Gv");
}

#[test]
fn pass_left_gives_a_left_hand_miniwave() {
    let stepped = step_forward(&facing_pair(), &int(1), true).unwrap();
    assert_diagram(&breathe(&stepped).unwrap(), "3Gv  1B^");
}

#[test]
fn mixed_shoulders_cannot_breathe() {
    let stepped = step_forward(&facing_pair(), &int(1), false).unwrap();
    let b: Dancer = Couple1Boy.into();
    let left = stepped.location(b).unwrap().add_flags(PositionFlags::PASS_LEFT).unwrap();
    let mixed = stepped.move_dancer(b, left);
    assert_eq!(breathe(&mixed), Err(BreatheError::InconsistentShoulder));
}

#[test]
fn facing_couples_pass_thru_into_a_wave() {
    let stepped = step_forward(&FOUR_SQUARE, &int(1), false).unwrap();
    let out = breathe(&stepped).unwrap();
    assert_diagram(&out, "1B^  3Gv  1G^  3Bv");
    assert_eq!(out.location(Couple1Boy.into()).unwrap().x(), &int(-3));
}

#[test]
fn half_step_overlap_is_trimmed_back_apart() {
    let stepped = step_forward(&FOUR_SQUARE, &frac(1, 2), false).unwrap();
    assert_diagram(&breathe(&stepped).unwrap(), "3Gv  3Bv\n\n1B^  1G^");
}

#[test]
fn distant_dancers_close_in() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, -9, 0, Rotation::north())
        .at(Couple1Girl, 9, 0, Rotation::north())
        .build();
    let out = breathe(&f).unwrap();
    assert_eq!(out.location(Couple1Boy.into()).unwrap(), &Position::grid(-1, 0, Rotation::north()));
    assert_eq!(out.location(Couple1Girl.into()).unwrap(), &Position::grid(1, 0, Rotation::north()));
}

#[test]
fn three_way_collision_fails() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, 0, -1, Rotation::north())
        .at(Couple1Girl, 0, -1, Rotation::north())
        .at(Couple3Girl, 0, -1, Rotation::south())
        .build();
    assert_eq!(breathe(&f), Err(BreatheError::MoreThanTwoColliding));
}

#[test]
fn inserting_single_dancers_reproduces_the_meta() {
    let comps: FxHashMap<Dancer, Formation> = SQUARED_SET
        .dancers()
        .map(|d| (d, Formation::single_dancer_at(d, Position::grid(0, 0, Rotation::north()))))
        .collect();
    assert_eq!(insert(&SQUARED_SET, &comps).unwrap(), *SQUARED_SET);
}

#[test]
fn insert_couples_into_facing_meta_dancers() {
    let bottom = Dancer::phantom();
    let top = Dancer::phantom();
    let meta = Formation::new([
        (bottom, Position::grid(0, -1, Rotation::north())),
        (top, Position::grid(0, 1, Rotation::south())),
    ]);
    let couple = |b: StandardDancer, g: StandardDancer| {
        FormationBuilder::new().at(b, -1, 0, Rotation::north()).at(g, 1, 0, Rotation::north()).build()
    };
    let mut comps = FxHashMap::default();
    comps.insert(bottom, couple(Couple1Boy, Couple1Girl));
    comps.insert(top, couple(Couple3Boy, Couple3Girl));
    assert_diagram(&insert(&meta, &comps).unwrap(), "3Gv  3Bv\n\n1B^  1G^");
}

#[test]
fn tiny_trim_limit_still_breathes_disjoint_pieces() {
    let breather = Breather::with_settings(EngineSettings::default().with_trim_node_limit(1));
    assert_eq!(breather.breathe(&FOUR_SQUARE).unwrap(), *FOUR_SQUARE);
}

#[test]
fn tiny_trim_limit_fails_on_real_overlap() {
    let stepped = step_forward(&FOUR_SQUARE, &frac(1, 2), false).unwrap();
    let breather = Breather::with_settings(EngineSettings::default().with_trim_node_limit(1));
    assert_eq!(breather.breathe(&stepped), Err(BreatheError::TrimLimitExceeded(1)));
}

#[test]
fn back_to_back_couples_stepped_apart_close_back_in() {
    let f = FormationBuilder::new()
        .at(Couple3Girl, -1, 1, Rotation::north())
        .at(Couple3Boy, 1, 1, Rotation::north())
        .at(Couple1Boy, -1, -1, Rotation::south())
        .at(Couple1Girl, 1, -1, Rotation::south())
        .build();
    let stepped = step_forward(&f, &int(1), false).unwrap();
    assert_eq!(breathe(&stepped).unwrap(), f);
}

#[test]
fn squared_set_half_step_in_returns_to_square() {
    let stepped = step_forward(&SQUARED_SET, &frac(1, 2), false).unwrap();
    let out = breathe(&stepped).unwrap();
    assert_eq!(out, *SQUARED_SET, "\n{}", out.to_diagram(""));
}

#[test]
fn quarter_turned_input_trims_the_same_way() {
    let stepped = step_forward(&SQUARED_SET, &frac(1, 2), false).unwrap();
    let turned = stepped.rotate(&Rotation::east()).unwrap();
    let want = breathe(&stepped).unwrap().rotate(&Rotation::east()).unwrap();
    assert_eq!(breathe(&turned).unwrap(), want);
}

fn diamond() -> FormationBuilder {
    FormationBuilder::new()
        .at(Couple1Boy, 0, 3, Rotation::east())
        .at(Couple2Boy, -1, 0, Rotation::north())
        .at(Couple2Girl, 1, 0, Rotation::south())
        .at(Couple1Girl, 0, -3, Rotation::west())
}

#[test]
fn diamond_points_sliding_in_form_a_star() {
    let f = diamond().select([Couple1Boy, Couple1Girl]).build();
    let slid = side_step(&f, &frac(5, 2)).unwrap();
    assert_diagram(&breathe(&slid).unwrap(), "  1B>\n2B^  2Gv\n  1G<");
}

#[test]
fn diamond_points_barely_overlapping_are_split_off() {
    let f = diamond().select([Couple1Boy, Couple1Girl]).build();
    let slid = side_step(&f, &frac(3, 2)).unwrap();
    assert_diagram(&breathe(&slid).unwrap(), "  1B>\n\n2B^  2Gv\n\n  1G<");
}

#[test]
fn quarter_tag_ends_stepping_in_are_pushed_back_out() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, 0, 2, Rotation::south())
        .at(Couple2Boy, -1, 0, Rotation::north())
        .at(Couple2Girl, 1, 0, Rotation::south())
        .at(Couple1Girl, 0, -2, Rotation::north())
        .select([Couple1Boy, Couple1Girl])
        .build();
    let stepped = step_forward(&f, &int(1), false).unwrap();
    assert_diagram(&breathe(&stepped).unwrap(), "  1Bv\n\n2B^  2Gv\n\n  1G^");
}

#[test]
fn three_quarter_tag_ends_stepping_out_close_back_in() {
    let f = FormationBuilder::new()
        .position(Couple1Boy, Position::grid_named(0, 2, "n").unwrap())
        .position(Couple2Boy, Position::grid_named(-1, 0, "n").unwrap())
        .position(Couple2Girl, Position::grid_named(1, 0, "s").unwrap())
        .position(Couple1Girl, Position::grid_named(0, -2, "s").unwrap())
        .select([Couple1Boy, Couple1Girl])
        .build();
    let stepped = step_forward(&f, &int(1), false).unwrap();
    assert_diagram(&breathe(&stepped).unwrap(), "  1B^\n\n2B^  2Gv\n\n  1Gv");
}

/// Meta dancers at the spots of a right-hand ocean wave, left to right.
fn wave_meta() -> (Formation, [Dancer; 4]) {
    let ds = [Dancer::phantom(), Dancer::phantom(), Dancer::phantom(), Dancer::phantom()];
    let meta = Formation::new([
        (ds[0], Position::grid(-3, 0, Rotation::north())),
        (ds[1], Position::grid(-1, 0, Rotation::south())),
        (ds[2], Position::grid(1, 0, Rotation::north())),
        (ds[3], Position::grid(3, 0, Rotation::south())),
    ]);
    (meta, ds)
}

const COUPLES: [(StandardDancer, StandardDancer); 4] = [
    (Couple1Boy, Couple1Girl),
    (Couple2Boy, Couple2Girl),
    (Couple3Boy, Couple3Girl),
    (Couple4Boy, Couple4Girl),
];

fn couple_of(b: StandardDancer, g: StandardDancer) -> Formation {
    FormationBuilder::new().at(b, -1, 0, Rotation::north()).at(g, 1, 0, Rotation::north()).build()
}

/// Boy leads, girl trails.
fn tandem_of(b: StandardDancer, g: StandardDancer) -> Formation {
    FormationBuilder::new().at(b, 0, 1, Rotation::north()).at(g, 0, -1, Rotation::north()).build()
}

#[test]
fn couples_inserted_into_a_wave_line_up() {
    let (meta, ds) = wave_meta();
    let comps: FxHashMap<Dancer, Formation> =
        ds.iter().zip(COUPLES).map(|(d, (b, g))| (*d, couple_of(b, g))).collect();
    assert_diagram(&insert(&meta, &comps).unwrap(), "1B^  1G^  2Gv  2Bv  3B^  3G^  4Gv  4Bv");
}

#[test]
fn tandems_inserted_into_a_wave_make_two_waves() {
    let (meta, ds) = wave_meta();
    let comps: FxHashMap<Dancer, Formation> =
        ds.iter().zip(COUPLES).map(|(d, (b, g))| (*d, tandem_of(b, g))).collect();
    assert_diagram(&insert(&meta, &comps).unwrap(), "1B^  2Gv  3B^  4Gv\n\n1G^  2Bv  3G^  4Bv");
}

#[test]
fn tandems_inserted_into_a_diamond_stretch_it() {
    let ds = [Dancer::phantom(), Dancer::phantom(), Dancer::phantom(), Dancer::phantom()];
    let meta = Formation::new([
        (ds[0], Position::grid(0, 3, Rotation::east())),
        (ds[1], Position::grid(-1, 0, Rotation::north())),
        (ds[2], Position::grid(1, 0, Rotation::south())),
        (ds[3], Position::grid(0, -3, Rotation::west())),
    ]);
    let comps: FxHashMap<Dancer, Formation> =
        ds.iter().zip(COUPLES).map(|(d, (b, g))| (*d, tandem_of(b, g))).collect();
    assert_diagram(&insert(&meta, &comps).unwrap(), "1G>  1B>\n\n2B^  3Gv\n\n2G^  3Bv\n\n4B<  4G<");
}

#[test]
fn squeezed_parallel_waves_spread_back_out() {
    let spots = [
        (Couple1Boy, -3, 1, Rotation::north()),
        (Couple1Girl, -1, 1, Rotation::south()),
        (Couple2Boy, 1, 1, Rotation::north()),
        (Couple2Girl, 3, 1, Rotation::south()),
        (Couple3Boy, -3, -1, Rotation::north()),
        (Couple3Girl, -1, -1, Rotation::south()),
        (Couple4Boy, 1, -1, Rotation::north()),
        (Couple4Girl, 3, -1, Rotation::south()),
    ];
    let squeezed = spots
        .iter()
        .fold(FormationBuilder::new(), |b, (d, x, y, r)| {
            b.position(*d, Position::new(frac(*x, 2), frac(*y, 2), r.clone()))
        })
        .build();
    assert_diagram(&breathe(&squeezed).unwrap(), "1B^  1Gv  2B^  2Gv\n\n3B^  3Gv  4B^  4Gv");
}
