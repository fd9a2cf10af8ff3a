// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named goal shapes and the standard starting setups.
//!
//! Shapes are built once per process on first use. Goal shapes use phantom
//! dancers and are centered on the origin.

use once_cell::sync::Lazy;
use sdr_geom::{Position, Rotation};

use crate::dancer::{Dancer, StandardDancer};
use crate::formation::Formation;
use crate::tagged::Tag::{Beau, Belle, Center, End, Leader, Point, Trailer};
use crate::tagged::{Tag, TaggedFormation};

fn shape(name: &str, spots: &[(i64, i64, &str, &[Tag])]) -> TaggedFormation {
    TaggedFormation::from_tagged(spots.iter().map(|(x, y, dir, tags)| {
        let facing = Rotation::from_absolute_str(dir).unwrap_or_else(|_| Rotation::any());
        (Dancer::phantom(), Position::grid(*x, *y, facing), tags.to_vec())
    }))
    .with_name(name)
}

/// One dancer facing north.
pub static SINGLE_DANCER: Lazy<TaggedFormation> =
    Lazy::new(|| shape("SINGLE DANCER", &[(0, 0, "n", &[])]));
/// Two dancers side by side, both facing north.
pub static COUPLE: Lazy<TaggedFormation> =
    Lazy::new(|| shape("COUPLE", &[(-1, 0, "n", &[Beau]), (1, 0, "n", &[Belle])]));
/// Two dancers facing each other.
pub static FACING_DANCERS: Lazy<TaggedFormation> = Lazy::new(|| {
    shape("FACING DANCERS", &[(0, 1, "s", &[Trailer]), (0, -1, "n", &[Trailer])])
});
/// Two dancers back to back.
pub static BACK_TO_BACK_DANCERS: Lazy<TaggedFormation> = Lazy::new(|| {
    shape("BACK TO BACK DANCERS", &[(0, 1, "n", &[Leader]), (0, -1, "s", &[Leader])])
});
/// One dancer behind another, both facing north.
pub static TANDEM: Lazy<TaggedFormation> =
    Lazy::new(|| shape("TANDEM", &[(0, 1, "n", &[Leader]), (0, -1, "n", &[Trailer])]));
/// Right-hand miniwave.
pub static RH_MINIWAVE: Lazy<TaggedFormation> =
    Lazy::new(|| shape("RH MINIWAVE", &[(-1, 0, "n", &[Beau]), (1, 0, "s", &[Beau])]));
/// Left-hand miniwave.
pub static LH_MINIWAVE: Lazy<TaggedFormation> =
    Lazy::new(|| shape("LH MINIWAVE", &[(-1, 0, "s", &[Belle]), (1, 0, "n", &[Belle])]));
/// Two dancers side by side facing any orthogonal direction.
pub static _1X2: Lazy<TaggedFormation> =
    Lazy::new(|| shape("1x2", &[(-1, 0, "+", &[]), (1, 0, "+", &[])]));
/// Four dancers in a line facing any orthogonal direction.
pub static _1X4: Lazy<TaggedFormation> = Lazy::new(|| {
    shape("1x4", &[(-3, 0, "+", &[]), (-1, 0, "+", &[]), (1, 0, "+", &[]), (3, 0, "+", &[])])
});
/// Two dancers side by side facing north or south.
pub static GENERAL_PARTNERS: Lazy<TaggedFormation> =
    Lazy::new(|| shape("GENERAL PARTNERS", &[(-1, 0, "|", &[]), (1, 0, "|", &[])]));
/// A two by two box facing any orthogonal direction.
pub static _2X2: Lazy<TaggedFormation> = Lazy::new(|| {
    shape("2x2", &[(-1, 1, "+", &[]), (1, 1, "+", &[]), (-1, -1, "+", &[]), (1, -1, "+", &[])])
});
/// Two couples facing each other.
pub static FACING_COUPLES: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "FACING COUPLES",
        &[
            (-1, 1, "s", &[Belle, Trailer]),
            (1, 1, "s", &[Beau, Trailer]),
            (-1, -1, "n", &[Beau, Trailer]),
            (1, -1, "n", &[Belle, Trailer]),
        ],
    )
});
/// Two couples back to back.
pub static BACK_TO_BACK_COUPLES: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "BACK TO BACK COUPLES",
        &[
            (-1, 1, "n", &[Beau, Leader]),
            (1, 1, "n", &[Belle, Leader]),
            (-1, -1, "s", &[Belle, Leader]),
            (1, -1, "s", &[Beau, Leader]),
        ],
    )
});
/// Right-hand ocean wave.
pub static RH_OCEAN_WAVE: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "RH OCEAN WAVE",
        &[
            (-3, 0, "n", &[Beau, End]),
            (-1, 0, "s", &[Beau, Center]),
            (1, 0, "n", &[Beau, Center]),
            (3, 0, "s", &[Beau, End]),
        ],
    )
});
/// Left-hand ocean wave.
pub static LH_OCEAN_WAVE: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "LH OCEAN WAVE",
        &[
            (-3, 0, "s", &[Belle, End]),
            (-1, 0, "n", &[Belle, Center]),
            (1, 0, "s", &[Belle, Center]),
            (3, 0, "n", &[Belle, End]),
        ],
    )
});
/// Right-hand box (two right-hand miniwaves in tandem).
pub static RH_BOX: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "RH BOX",
        &[
            (-1, 1, "n", &[Beau, Leader]),
            (1, 1, "s", &[Beau, Trailer]),
            (-1, -1, "n", &[Beau, Trailer]),
            (1, -1, "s", &[Beau, Leader]),
        ],
    )
});
/// Left-hand box.
pub static LH_BOX: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "LH BOX",
        &[
            (-1, 1, "s", &[Belle, Trailer]),
            (1, 1, "n", &[Belle, Leader]),
            (-1, -1, "s", &[Belle, Leader]),
            (1, -1, "n", &[Belle, Trailer]),
        ],
    )
});
/// Right-hand diamond.
pub static RH_DIAMOND: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "RH DIAMOND",
        &[
            (0, 3, "e", &[Point]),
            (-1, 0, "n", &[Beau, Center]),
            (1, 0, "s", &[Beau, Center]),
            (0, -3, "w", &[Point]),
        ],
    )
});
/// Right-hand single quarter tag.
pub static RH_SINGLE_QUARTER_TAG: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "RH SINGLE 1/4 TAG",
        &[
            (0, 2, "s", &[End]),
            (-1, 0, "n", &[Beau, Center]),
            (1, 0, "s", &[Beau, Center]),
            (0, -2, "n", &[End]),
        ],
    )
});
/// Right-hand single three-quarter tag.
pub static RH_SINGLE_THREE_QUARTER_TAG: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "RH SINGLE 3/4 TAG",
        &[
            (0, 2, "n", &[End]),
            (-1, 0, "n", &[Beau, Center]),
            (1, 0, "s", &[Beau, Center]),
            (0, -2, "s", &[End]),
        ],
    )
});
/// Eight dancers in a static square.
pub static STATIC_SQUARE: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "STATIC SQUARE",
        &[
            (-1, 3, "s", &[Belle]),
            (1, 3, "s", &[Beau]),
            (-3, 1, "e", &[Beau]),
            (3, 1, "w", &[Belle]),
            (-3, -1, "e", &[Belle]),
            (3, -1, "w", &[Beau]),
            (-1, -3, "n", &[Beau]),
            (1, -3, "n", &[Belle]),
        ],
    )
});
/// Two right-hand ocean waves, one behind the other.
pub static PARALLEL_RH_WAVES: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "PARALLEL RH WAVES",
        &[
            (-3, 1, "n", &[Beau, Leader, End]),
            (-1, 1, "s", &[Beau, Trailer, Center]),
            (1, 1, "n", &[Beau, Leader, Center]),
            (3, 1, "s", &[Beau, Trailer, End]),
            (-3, -1, "n", &[Beau, Trailer, End]),
            (-1, -1, "s", &[Beau, Leader, Center]),
            (1, -1, "n", &[Beau, Trailer, Center]),
            (3, -1, "s", &[Beau, Leader, End]),
        ],
    )
});
/// Two right-hand diamonds side by side.
pub static RH_TWIN_DIAMONDS: Lazy<TaggedFormation> = Lazy::new(|| {
    shape(
        "RH TWIN DIAMONDS",
        &[
            (-2, 3, "e", &[Point]),
            (2, 3, "e", &[Point]),
            (-3, 0, "n", &[Beau, Center]),
            (-1, 0, "s", &[Beau, Center]),
            (1, 0, "n", &[Beau, Center]),
            (3, 0, "s", &[Beau, Center]),
            (-2, -3, "w", &[Point]),
            (2, -3, "w", &[Point]),
        ],
    )
});

fn standard(spots: &[(StandardDancer, i64, i64, &str)]) -> Formation {
    Formation::new(spots.iter().map(|(d, x, y, dir)| {
        let facing = Rotation::from_absolute_str(dir).unwrap_or_else(|_| Rotation::any());
        (Dancer::Standard(*d), Position::grid(*x, *y, facing))
    }))
}

/// The eight real dancers in a squared set, couple 1 facing north.
pub static SQUARED_SET: Lazy<Formation> = Lazy::new(|| {
    use StandardDancer::{
        Couple1Boy, Couple1Girl, Couple2Boy, Couple2Girl, Couple3Boy, Couple3Girl, Couple4Boy,
        Couple4Girl,
    };
    standard(&[
        (Couple1Boy, -1, -3, "n"),
        (Couple1Girl, 1, -3, "n"),
        (Couple2Boy, 3, -1, "w"),
        (Couple2Girl, 3, 1, "w"),
        (Couple3Boy, 1, 3, "s"),
        (Couple3Girl, -1, 3, "s"),
        (Couple4Boy, -3, 1, "e"),
        (Couple4Girl, -3, -1, "e"),
    ])
});

/// Two couples squared up, for two-couple dancing.
pub static FOUR_SQUARE: Lazy<Formation> = Lazy::new(|| {
    use StandardDancer::{Couple1Boy, Couple1Girl, Couple3Boy, Couple3Girl};
    standard(&[
        (Couple1Boy, -1, -1, "n"),
        (Couple1Girl, 1, -1, "n"),
        (Couple3Boy, 1, 1, "s"),
        (Couple3Girl, -1, 1, "s"),
    ])
});

/// Every named goal shape.
pub fn all() -> [&'static TaggedFormation; 21] {
    [
        &SINGLE_DANCER,
        &COUPLE,
        &FACING_DANCERS,
        &BACK_TO_BACK_DANCERS,
        &TANDEM,
        &RH_MINIWAVE,
        &LH_MINIWAVE,
        &_1X2,
        &_1X4,
        &GENERAL_PARTNERS,
        &_2X2,
        &FACING_COUPLES,
        &BACK_TO_BACK_COUPLES,
        &RH_OCEAN_WAVE,
        &LH_OCEAN_WAVE,
        &RH_BOX,
        &LH_BOX,
        &RH_DIAMOND,
        &RH_SINGLE_QUARTER_TAG,
        &RH_SINGLE_THREE_QUARTER_TAG,
        &STATIC_SQUARE,
    ]
    .map(|s| &**s)
}

/// Looks up a goal shape by name, ignoring case and treating `_` as a space.
pub fn by_name(name: &str) -> Option<&'static TaggedFormation> {
    let wanted = name.replace('_', " ");
    all()
        .into_iter()
        .chain([&*PARALLEL_RH_WAVES, &*RH_TWIN_DIAMONDS])
        .find(|s| s.name().is_some_and(|n| n.eq_ignore_ascii_case(&wanted)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn shapes_are_centered() {
        for s in all().into_iter().chain([&*PARALLEL_RH_WAVES, &*RH_TWIN_DIAMONDS]) {
            assert!(s.is_centered(), "{s} is off center");
        }
        assert!(SQUARED_SET.is_centered());
        assert!(FOUR_SQUARE.is_centered());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(by_name("rh_ocean_wave").unwrap().name(), Some("RH OCEAN WAVE"));
        assert_eq!(by_name("Rh Twin Diamonds").unwrap().len(), 8);
        assert!(by_name("hexagon").is_none());
    }

    #[test]
    fn ocean_wave_diagram() {
        assert_eq!(RH_OCEAN_WAVE.to_diagram(""), "^    v    ^    v");
    }
}
