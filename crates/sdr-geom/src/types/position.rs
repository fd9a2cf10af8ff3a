// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::cmp::Ordering;
use core::fmt;

use bitflags::bitflags;
use num_traits::{One, Signed, Zero};

use crate::error::GeomError;
use crate::fraction::{frac, int, proper_string, Fraction};
use crate::types::point::Point;
use crate::types::rotation::Rotation;

bitflags! {
    /// Transient markers a dancer carries between calls.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PositionFlags: u8 {
        /// Pass left shoulders when meeting another dancer.
        const PASS_LEFT = 1 << 0;
        /// Last turn was to the left (counter-clockwise).
        const ROLL_LEFT = 1 << 1;
        /// Last turn was to the right (clockwise).
        const ROLL_RIGHT = 1 << 2;
        /// Last sweep was to the left.
        const SWEEP_LEFT = 1 << 3;
        /// Last sweep was to the right.
        const SWEEP_RIGHT = 1 << 4;
    }
}

impl PositionFlags {
    const ORDERED: [Self; 5] =
        [Self::PASS_LEFT, Self::ROLL_LEFT, Self::ROLL_RIGHT, Self::SWEEP_LEFT, Self::SWEEP_RIGHT];

    /// Rejects left/right pairs that cannot hold together.
    pub fn validate(self) -> Result<Self, GeomError> {
        if self.contains(Self::ROLL_LEFT | Self::ROLL_RIGHT) {
            return Err(GeomError::ConflictingFlags("ROLL_LEFT | ROLL_RIGHT".into()));
        }
        if self.contains(Self::SWEEP_LEFT | Self::SWEEP_RIGHT) {
            return Err(GeomError::ConflictingFlags("SWEEP_LEFT | SWEEP_RIGHT".into()));
        }
        Ok(self)
    }

    fn cmp_flagwise(self, other: Self) -> Ordering {
        Self::ORDERED
            .iter()
            .map(|f| self.contains(*f).cmp(&other.contains(*f)))
            .find(|c| c.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// A dancer's location, facing, and flags.
///
/// Ordering runs top to bottom, then left to right, then most exact facing
/// first, then by normalized heading, then by flags. This is the reading
/// order of a formation diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    x: Fraction,
    y: Fraction,
    facing: Rotation,
    flags: PositionFlags,
}

impl Position {
    /// Creates an unflagged position.
    pub fn new(x: Fraction, y: Fraction, facing: Rotation) -> Self {
        Self { x, y, facing, flags: PositionFlags::empty() }
    }

    /// Creates an unflagged position on integer grid coordinates.
    pub fn grid(x: i64, y: i64, facing: Rotation) -> Self {
        Self::new(int(x), int(y), facing)
    }

    /// Grid position with a facing named as in [`Rotation::from_absolute_str`].
    pub fn grid_named(x: i64, y: i64, facing: &str) -> Result<Self, GeomError> {
        Ok(Self::grid(x, y, Rotation::from_absolute_str(facing)?))
    }

    /// Horizontal coordinate.
    pub fn x(&self) -> &Fraction {
        &self.x
    }

    /// Vertical coordinate.
    pub fn y(&self) -> &Fraction {
        &self.y
    }

    /// Facing direction.
    pub fn facing(&self) -> &Rotation {
        &self.facing
    }

    /// Current flags.
    pub fn flags(&self) -> PositionFlags {
        self.flags
    }

    /// Replaces the flag set.
    pub fn with_flags(&self, flags: PositionFlags) -> Result<Self, GeomError> {
        Ok(Self { flags: flags.validate()?, ..self.clone() })
    }

    /// Adds to the flag set.
    pub fn add_flags(&self, flags: PositionFlags) -> Result<Self, GeomError> {
        self.with_flags(self.flags | flags)
    }

    /// Moves to `(x, y)` with `facing`, keeping flags.
    pub fn relocate(&self, x: Fraction, y: Fraction, facing: Rotation) -> Self {
        Self { x, y, facing, flags: self.flags }
    }

    /// Same spot and flags, new facing.
    pub fn with_facing(&self, facing: Rotation) -> Self {
        Self { facing, ..self.clone() }
    }

    /// Shifted by `(dx, dy)`, keeping facing and flags.
    pub fn translated(&self, dx: &Fraction, dy: &Fraction) -> Self {
        Self { x: &self.x + dx, y: &self.y + dy, ..self.clone() }
    }

    /// Location without facing.
    pub fn to_point(&self) -> Point {
        Point::new(self.x.clone(), self.y.clone())
    }

    /// Squared distance to `other`.
    pub fn dist2(&self, other: &Self) -> Fraction {
        let dx = &self.x - &other.x;
        let dy = &self.y - &other.y;
        &dx * &dx + &dy * &dy
    }

    fn step_along(&self, dir: &Rotation, distance: &Fraction, step_in: bool) -> Result<Self, GeomError> {
        let dx = dir.to_x() * distance;
        let dy = dir.to_y() * distance;
        let p1 = Self::new(&self.x + &dx, &self.y + &dy, self.facing.clone());
        if !step_in {
            return Ok(p1);
        }
        let p2 = Self::new(&self.x - &dx, &self.y - &dy, self.facing.clone());
        let origin = Self::new(Fraction::zero(), Fraction::zero(), Rotation::north());
        match p1.dist2(&origin).cmp(&p2.dist2(&origin)) {
            Ordering::Equal => Err(GeomError::NoClearInDirection),
            Ordering::Greater if distance.is_positive() => Ok(p2),
            Ordering::Greater => Ok(p1),
            Ordering::Less if distance.is_positive() => Ok(p1),
            Ordering::Less => Ok(p2),
        }
    }

    /// Steps `distance` along the facing direction; flags are cleared.
    ///
    /// With `step_in`, a positive distance moves toward the origin and a
    /// negative one away from it, whichever way the dancer faces.
    pub fn forward_step(&self, distance: &Fraction, step_in: bool) -> Result<Self, GeomError> {
        if distance.is_zero() && self.flags.is_empty() {
            return Ok(self.clone());
        }
        let dir = self.facing.require_exact()?.clone();
        self.step_along(&dir, distance, step_in)
    }

    /// Steps `distance` to the dancer's right; flags are cleared.
    ///
    /// `step_in` behaves as in [`Position::forward_step`].
    pub fn side_step(&self, distance: &Fraction, step_in: bool) -> Result<Self, GeomError> {
        if distance.is_zero() && self.flags.is_empty() {
            return Ok(self.clone());
        }
        let dir = self.facing.require_exact()?.add(&frac(1, 4));
        self.step_along(&dir, distance, step_in)
    }

    /// Turns clockwise by `amount`; flags are cleared.
    ///
    /// With `face_in`, the turn goes toward the origin as seen from the
    /// dancer's own location.
    pub fn turn(&self, amount: &Fraction, face_in: bool) -> Result<Self, GeomError> {
        self.turn_relative_to(amount, face_in, &self.to_point())
    }

    /// Like [`Position::turn`], with "in" judged from `reference`.
    pub fn turn_relative_to(
        &self,
        amount: &Fraction,
        face_in: bool,
        reference: &Point,
    ) -> Result<Self, GeomError> {
        if amount.is_zero() && self.flags.is_empty() {
            return Ok(self.clone());
        }
        let p1 = Self::new(self.x.clone(), self.y.clone(), self.facing.add(amount));
        if !face_in {
            return Ok(p1);
        }
        if !self.facing.is_exact() {
            if self.facing.is_any() {
                return Ok(self.clone());
            }
            let mut turned = Vec::new();
            for er in self.facing.included() {
                let p = Self::new(self.x.clone(), self.y.clone(), er);
                turned.push(p.turn_relative_to(amount, face_in, reference)?.facing);
            }
            let facing = Rotation::union_all(&turned).unwrap_or_else(Rotation::any);
            return Ok(Self::new(self.x.clone(), self.y.clone(), facing));
        }
        let away = Rotation::from_xy(&reference.x, &reference.y)
            .map_err(|_| GeomError::NoClearInDirection)?;
        let f = self.facing.subtract(away.amount()).normalize().amount().clone();
        if f.is_zero() || f == frac(1, 2) {
            return Err(GeomError::NoClearInDirection);
        }
        if f > frac(1, 2) {
            Ok(Self::new(self.x.clone(), self.y.clone(), self.facing.subtract(amount)))
        } else {
            Ok(p1)
        }
    }

    /// Rotates location and facing about the origin by `rot`, keeping flags.
    pub fn rotate_around_origin(&self, rot: &Rotation) -> Self {
        let cos = rot.to_y();
        let sin = rot.to_x();
        let nx = &self.x * &cos + &self.y * &sin;
        let ny = &self.y * &cos - &self.x * &sin;
        Self { x: nx, y: ny, facing: self.facing.add(rot.amount()), flags: self.flags }
    }

    /// Mirror image across the y axis.
    ///
    /// Roll and sweep directions swap. `PASS_LEFT` toggles only when
    /// `mirror_shoulder_pass` is set.
    pub fn mirror(&self, mirror_shoulder_pass: bool) -> Self {
        let mut flags = PositionFlags::empty();
        for (from, to) in [
            (PositionFlags::ROLL_LEFT, PositionFlags::ROLL_RIGHT),
            (PositionFlags::ROLL_RIGHT, PositionFlags::ROLL_LEFT),
            (PositionFlags::SWEEP_LEFT, PositionFlags::SWEEP_RIGHT),
            (PositionFlags::SWEEP_RIGHT, PositionFlags::SWEEP_LEFT),
        ] {
            if self.flags.contains(from) {
                flags |= to;
            }
        }
        if mirror_shoulder_pass ^ self.flags.contains(PositionFlags::PASS_LEFT) {
            flags |= PositionFlags::PASS_LEFT;
        }
        Self {
            x: -&self.x,
            y: self.y.clone(),
            facing: self.facing.negate().add(&Fraction::one()),
            flags,
        }
    }

    /// Same position with its facing normalized.
    pub fn normalize(&self) -> Self {
        Self { facing: self.facing.normalize(), ..self.clone() }
    }

    /// `1/4` for a right roll, `-1/4` for a left roll, else `0`.
    pub fn roll(&self) -> Fraction {
        signed_quarter(self.flags, PositionFlags::ROLL_RIGHT, PositionFlags::ROLL_LEFT)
    }

    /// `1/4` for a right sweep, `-1/4` for a left sweep, else `0`.
    pub fn sweep(&self) -> Fraction {
        signed_quarter(self.flags, PositionFlags::SWEEP_RIGHT, PositionFlags::SWEEP_LEFT)
    }
}

fn signed_quarter(flags: PositionFlags, right: PositionFlags, left: PositionFlags) -> Fraction {
    if flags.contains(right) {
        frac(1, 4)
    } else if flags.contains(left) {
        frac(-1, 4)
    } else {
        Fraction::zero()
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .y
            .cmp(&self.y)
            .then_with(|| self.x.cmp(&other.x))
            .then_with(|| self.facing.cmp_precision_first(&other.facing))
            .then_with(|| self.flags.cmp_flagwise(other.flags))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            proper_string(&self.x),
            proper_string(&self.y),
            self.facing.to_absolute_string()
        )?;
        if !self.flags.is_empty() {
            write!(f, ",{:?}", self.flags)?;
        }
        Ok(())
    }
}
