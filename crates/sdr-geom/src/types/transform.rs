// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt;

use crate::error::GeomError;
use crate::types::point::Point;
use crate::types::position::Position;
use crate::types::rotation::Rotation;

/// Rotation about the origin followed by a translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transform {
    rotate: Rotation,
    translate: Point,
}

impl Transform {
    /// The transform leaving every position unchanged.
    pub fn identity() -> Self {
        Self { rotate: Rotation::north(), translate: Point::zero() }
    }

    /// The transform carrying `from` onto `to`. Both facings must be exact.
    pub fn between(from: &Position, to: &Position) -> Result<Self, GeomError> {
        from.facing().require_exact()?;
        to.facing().require_exact()?;
        let rotate = to.facing().subtract(from.facing().amount()).normalize();
        let rotated = from.rotate_around_origin(&rotate);
        let translate = Point::new(to.x() - rotated.x(), to.y() - rotated.y());
        Ok(Self { rotate, translate })
    }

    /// Rotation component.
    pub fn rotation(&self) -> &Rotation {
        &self.rotate
    }

    /// Translation component.
    pub fn translation(&self) -> &Point {
        &self.translate
    }

    /// Applies the transform, keeping flags.
    pub fn apply(&self, p: &Position) -> Position {
        p.rotate_around_origin(&self.rotate).translated(&self.translate.x, &self.translate.y)
    }

    /// Inverse of [`Transform::apply`] for quarter-turn rotations.
    pub fn unapply(&self, p: &Position) -> Position {
        p.translated(&-&self.translate.x, &-&self.translate.y)
            .rotate_around_origin(&self.rotate.negate())
    }

    /// `true` when the translation is zero.
    pub fn is_centered(&self) -> bool {
        self.translate.is_zero()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rotate {} then translate {}", self.rotate, self.translate)
    }
}
