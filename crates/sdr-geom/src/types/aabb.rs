// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt;

use num_traits::Signed;

use crate::error::GeomError;
use crate::fraction::{half, Fraction};
use crate::types::point::Point;

/// Axis-aligned box in floor coordinates.
///
/// Invariants:
/// - `ll` components are less than or equal to `ur` components.
/// - Values are exact rationals in grid units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Aabb {
    ll: Point,
    ur: Point,
}

impl Aabb {
    /// Constructs a box from its lower-left and upper-right corners.
    pub fn new(ll: Point, ur: Point) -> Result<Self, GeomError> {
        if ll.x > ur.x || ll.y > ur.y {
            return Err(GeomError::InvalidBox { ll: ll.to_string(), ur: ur.to_string() });
        }
        Ok(Self { ll, ur })
    }

    /// Builds a box centered at `center` with half-extents `hx, hy`.
    ///
    /// Negative extents are folded to their absolute value.
    pub fn from_center_half_extents(center: &Point, hx: &Fraction, hy: &Fraction) -> Self {
        let hx = hx.abs();
        let hy = hy.abs();
        Self {
            ll: Point::new(&center.x - &hx, &center.y - &hy),
            ur: Point::new(&center.x + &hx, &center.y + &hy),
        }
    }

    /// Builds the minimal box containing all `points`, or `None` if empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut ll = first.clone();
        let mut ur = first.clone();
        for p in it {
            if p.x < ll.x {
                ll.x = p.x.clone();
            }
            if p.y < ll.y {
                ll.y = p.y.clone();
            }
            if p.x > ur.x {
                ur.x = p.x.clone();
            }
            if p.y > ur.y {
                ur.y = p.y.clone();
            }
        }
        Some(Self { ll, ur })
    }

    /// Lower-left corner.
    pub fn ll(&self) -> &Point {
        &self.ll
    }

    /// Upper-right corner.
    pub fn ur(&self) -> &Point {
        &self.ur
    }

    /// Horizontal extent.
    pub fn width(&self) -> Fraction {
        &self.ur.x - &self.ll.x
    }

    /// Vertical extent.
    pub fn height(&self) -> Fraction {
        &self.ur.y - &self.ll.y
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(half(&(&self.ll.x + &self.ur.x)), half(&(&self.ll.y + &self.ur.y)))
    }

    /// Returns `true` if the interiors intersect. Touching faces do not count.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.ll.x < other.ur.x
            && other.ll.x < self.ur.x
            && self.ll.y < other.ur.y
            && other.ll.y < self.ur.y
    }

    /// Returns `true` if `p` lies inside or on the boundary.
    pub fn includes(&self, p: &Point) -> bool {
        self.ll.x <= p.x && self.ll.y <= p.y && self.ur.x >= p.x && self.ur.y >= p.y
    }

    /// Returns the smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            ll: Point::new(
                self.ll.x.clone().min(other.ll.x.clone()),
                self.ll.y.clone().min(other.ll.y.clone()),
            ),
            ur: Point::new(
                self.ur.x.clone().max(other.ur.x.clone()),
                self.ur.y.clone().max(other.ur.y.clone()),
            ),
        }
    }

    /// Translates the box by `delta`.
    pub fn translated(&self, delta: &Point) -> Self {
        Self { ll: self.ll.add(delta), ur: self.ur.add(delta) }
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({};{})", self.ll, self.ur)
    }
}
