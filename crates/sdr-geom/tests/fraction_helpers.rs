// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Root-level fraction helpers as seen by downstream crates.

use sdr_geom::{frac, half, int, Aabb, Point};

#[test]
fn half_is_reachable_from_the_crate_root() {
    assert_eq!(half(&int(3)), frac(3, 2));
    assert_eq!(half(&frac(-1, 2)), frac(-1, 4));
}

#[test]
fn half_width_matches_box_center() {
    let b = Aabb::new(Point::new(int(-1), int(0)), Point::new(int(2), int(4))).unwrap();
    let c = b.center();
    assert_eq!(c.x, int(-1) + half(&b.width()));
    assert_eq!(c.y, half(&b.height()));
}
