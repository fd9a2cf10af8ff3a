// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Matching goal shapes against whole formations.

use pretty_assertions::assert_eq;
use sdr_core::library::{
    COUPLE, FACING_COUPLES, FOUR_SQUARE, RH_MINIWAVE, RH_OCEAN_WAVE, RH_TWIN_DIAMONDS, SQUARED_SET, _1X2,
    _2X2,
};
use sdr_core::StandardDancer::{Couple1Boy, Couple1Girl, Couple2Boy, Couple2Girl};
use sdr_core::{
    do_match, do_match_one, do_phantom_match, make_selector, Dancer, EngineSettings, MatchError, Matcher, Tag,
};
use sdr_dry_tests::{standard_names, FormationBuilder};
use sdr_geom::{Position, Rotation};

fn match_for(fm: &sdr_core::FormationMatch, d: Dancer) -> Option<(Dancer, &sdr_core::TaggedFormation)> {
    fm.matches.iter().find(|(_, tf)| tf.contains(d)).map(|(m, tf)| (*m, tf))
}

#[test]
fn squared_set_holds_four_couples() {
    let fm = do_match_one(&SQUARED_SET, &COUPLE, false, false).unwrap();
    assert_eq!(fm.meta.len(), 4);
    assert!(fm.unmatched.is_empty());
    for tf in fm.matches.values() {
        let boy = tf.dancers().find(|d| d.standard().is_some_and(|s| s.is_boy())).unwrap();
        assert!(tf.is(boy, Tag::Beau), "boys stand on the left:\n{}", tf.to_diagram(""));
    }
    let (meta_d, tf) = match_for(&fm, Couple1Boy.into()).unwrap();
    assert_eq!(tf.location(Couple1Boy.into()).unwrap(), &Position::grid(-1, 0, Rotation::north()));
    assert_eq!(fm.meta.location(meta_d).unwrap(), &Position::grid(0, -2, Rotation::north()));
}

#[test]
fn wave_splits_into_right_hand_miniwaves() {
    let wave = RH_OCEAN_WAVE.map(&standard_names(&RH_OCEAN_WAVE));
    let fm = do_match_one(&wave, &RH_MINIWAVE, false, false).unwrap();
    // The second miniwave is anchored on its south-facing end, so it reads
    // back to front in goal coordinates.
    let want = "AA^  BBv\nAA:\n   1B^  1Gv\n [1B: BEAU; 1G: BEAU]\nBB:\n   2G^  2Bv\n [2G: BEAU; 2B: BEAU]";
    assert_eq!(fm.to_string(), want);
}

#[test]
fn twin_diamonds_leave_points_unmatched() {
    let fm = do_match_one(&RH_TWIN_DIAMONDS, &RH_MINIWAVE, true, false).unwrap();
    assert_eq!(fm.matches.len(), 6);
    assert_eq!(fm.unmatched.len(), 4);
    assert_eq!(fm.meta.len(), 6);
    for m in &fm.unmatched {
        assert_eq!(fm.matches[m].len(), 1);
    }
}

#[test]
fn leftover_dancers_need_allow_unmatched() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, -1, 0, Rotation::north())
        .at(Couple1Girl, 1, 0, Rotation::north())
        .at(Couple2Boy, 5, 0, Rotation::east())
        .build();
    let err = do_match_one(&f, &COUPLE, false, false).unwrap_err();
    assert!(err.is_no_match("no matches"), "{err}");
    let fm = do_match_one(&f, &COUPLE, true, false).unwrap();
    assert_eq!(fm.matches.len(), 2);
    assert_eq!(fm.unmatched.len(), 1);
}

#[test]
fn unselected_dancers_ride_along_unmatched() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, -1, 0, Rotation::north())
        .at(Couple1Girl, 1, 0, Rotation::north())
        .at(Couple2Boy, 0, 3, Rotation::south())
        .select([Couple1Boy, Couple1Girl])
        .build();
    let fm = do_match_one(&f, &COUPLE, false, false).unwrap();
    assert_eq!(fm.meta.len(), 2);
    assert_eq!(fm.unmatched.len(), 1);
    let (solo, _) = match_for(&fm, Couple2Boy.into()).unwrap();
    assert!(fm.unmatched.contains(&solo));
}

#[test]
fn box_of_partners_is_ambiguous() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, -1, 1, Rotation::north())
        .at(Couple1Girl, 1, 1, Rotation::north())
        .at(Couple2Boy, -1, -1, Rotation::north())
        .at(Couple2Girl, 1, -1, Rotation::north())
        .build();
    let err = do_match_one(&f, &_1X2, false, false).unwrap_err();
    assert!(err.is_no_match("ambiguous"), "{err}");
    let msg = err.to_string();
    assert!(msg.contains("1x2"), "{msg}");
}

#[test]
fn most_occurrences_win_across_goals() {
    let fm = do_match(&FOUR_SQUARE, &[&COUPLE, &FACING_COUPLES], false, false).unwrap();
    assert_eq!(fm.matches.len(), 2);
    let fm = do_match(&FOUR_SQUARE, &[&FACING_COUPLES], false, false).unwrap();
    assert_eq!(fm.matches.len(), 1);
    assert_eq!(fm.meta.len(), 1);
}

#[test]
fn selector_reuses_one_goal() {
    let couples = make_selector((*COUPLE).clone());
    assert_eq!(couples(&*FOUR_SQUARE).unwrap().matches.len(), 2);
    assert!(couples(RH_OCEAN_WAVE.formation()).is_err());
}

#[test]
fn tiny_search_limit_is_reported() {
    let matcher = Matcher::with_settings(EngineSettings::default().with_search_node_limit(2));
    let err = matcher.do_match_one(&SQUARED_SET, &COUPLE, false, false).unwrap_err();
    assert!(matches!(err, MatchError::SearchLimitExceeded { limit: 2, .. }), "{err}");
    assert!(err.to_string().contains("COUPLE"), "{err}");
}

#[test]
fn roomy_search_limit_gives_the_unlimited_answer() {
    let limited = Matcher::with_settings(EngineSettings::default().with_search_node_limit(10_000));
    let fm = limited.do_match_one(&SQUARED_SET, &COUPLE, false, false).unwrap();
    assert_eq!(fm.matches.len(), do_match_one(&SQUARED_SET, &COUPLE, false, false).unwrap().matches.len());
}

#[test]
fn squared_set_meta_is_a_compact_square() {
    let fm = do_match_one(&SQUARED_SET, &COUPLE, false, false).unwrap();
    let shown = fm.to_string();
    let meta: Vec<&str> = shown.lines().take(5).collect();
    assert_eq!(meta.join("\n"), "     AAv\n\nBB>       CC<\n\n     DD^");
}

#[test]
fn phantom_match_fills_the_box() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, -1, 1, Rotation::north())
        .at(Couple1Girl, 1, 1, Rotation::north())
        .at(Couple2Boy, -1, -1, Rotation::north())
        .build();
    let fm = do_phantom_match(&f, &[&_2X2], true).unwrap();
    assert_eq!(fm.inserted.len(), 1);
    assert_eq!(fm.meta.len(), 1);
    let tf = fm.matches.values().next().unwrap();
    assert_eq!(tf.len(), 4);
    let ph = fm.inserted.iter().next().copied().unwrap();
    assert!(tf.is(ph, Tag::Noncorporeal));
    assert!(fm.to_string().contains("ph inserted"));
}

#[test]
fn phantom_match_through_do_match() {
    let f = FormationBuilder::new().at(Couple1Boy, 0, 0, Rotation::north()).build();
    let fm = do_match_one(&f, &COUPLE, false, true).unwrap();
    assert_eq!(fm.inserted.len(), 1);
}

#[test]
fn far_apart_dancers_cannot_share_a_phantom_couple() {
    let f = FormationBuilder::new()
        .at(Couple1Boy, 0, 0, Rotation::north())
        .at(Couple1Girl, 4, 0, Rotation::north())
        .build();
    let err = do_phantom_match(&f, &[&COUPLE], false).unwrap_err();
    assert!(matches!(err, MatchError::NoMatch { .. }));
    assert!(err.is_no_match("no phantom alignment"));
}

#[test]
fn relaxing_unmatched_never_loses_occurrences() {
    let strict = do_match_one(&SQUARED_SET, &COUPLE, false, false).unwrap();
    let relaxed = do_match_one(&SQUARED_SET, &COUPLE, true, false).unwrap();
    assert_eq!(strict.matches.len(), 4);
    assert_eq!(relaxed.matches.len() - relaxed.unmatched.len(), 4);
    let err = do_match_one(&RH_TWIN_DIAMONDS, &RH_MINIWAVE, false, false).unwrap_err();
    assert!(err.is_no_match("no matches"), "{err}");
}
