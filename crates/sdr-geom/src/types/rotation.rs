// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::GeomError;
use crate::fraction::{frac, fract_floor, int, is_integer, proper_string, Fraction};

const EIGHTH_NAMES: [&str; 8] = ["n", "ne", "e", "se", "s", "sw", "w", "nw"];
const EIGHTH_GLYPHS: [char; 8] = ['^', '7', '>', 'Q', 'v', 'L', '<', '`'];

/// A heading, measured clockwise in full turns from north, plus a precision
/// modulus.
///
/// The true heading is `amount + k * modulus` for some integer `k`:
/// - modulus `1`: an exact heading,
/// - modulus `1/n`: one of `n` equally spaced headings,
/// - modulus `0`: any heading at all (the amount is then always `0`).
///
/// Moduli are kept as `1/n`; a requested modulus of `2/3` becomes `1/3`,
/// since its multiples cover the same headings.
#[derive(Debug, Clone)]
pub struct Rotation {
    amount: Fraction,
    modulus: Fraction,
}

impl Rotation {
    /// Creates a rotation, reducing the modulus to `1/denominator`.
    pub fn create(amount: Fraction, modulus: Fraction) -> Self {
        if modulus.is_zero() {
            return Self::any();
        }
        let modulus = Fraction::new(BigInt::one(), modulus.denom().clone());
        Self { amount, modulus }
    }

    /// An exact heading.
    pub fn exact(amount: Fraction) -> Self {
        Self { amount, modulus: Fraction::one() }
    }

    /// The heading `n / 8` of a full turn.
    pub fn eighths(n: i64) -> Self {
        Self::exact(frac(n, 8))
    }

    /// Facing the caller's back wall.
    pub fn north() -> Self {
        Self::eighths(0)
    }

    /// A quarter turn clockwise from north.
    pub fn east() -> Self {
        Self::eighths(2)
    }

    /// Facing the caller.
    pub fn south() -> Self {
        Self::eighths(4)
    }

    /// Three quarters clockwise from north.
    pub fn west() -> Self {
        Self::eighths(6)
    }

    /// A heading about which nothing is known.
    pub fn any() -> Self {
        Self { amount: Fraction::zero(), modulus: Fraction::zero() }
    }

    /// The representative heading.
    pub fn amount(&self) -> &Fraction {
        &self.amount
    }

    /// The precision modulus.
    pub fn modulus(&self) -> &Fraction {
        &self.modulus
    }

    /// `true` for an exact heading (modulus `1`).
    pub fn is_exact(&self) -> bool {
        self.modulus.is_one()
    }

    /// `true` for the "any heading" rotation (modulus `0`).
    pub fn is_any(&self) -> bool {
        self.modulus.is_zero()
    }

    /// Returns this rotation if exact, else an error.
    pub fn require_exact(&self) -> Result<&Self, GeomError> {
        if self.is_exact() {
            Ok(self)
        } else {
            Err(GeomError::InexactRotation(self.to_string()))
        }
    }

    /// Turns clockwise by `f`, keeping the modulus.
    pub fn add(&self, f: &Fraction) -> Self {
        Self::create(&self.amount + f, self.modulus.clone())
    }

    /// Turns counter-clockwise by `f`, keeping the modulus.
    pub fn subtract(&self, f: &Fraction) -> Self {
        Self::create(&self.amount - f, self.modulus.clone())
    }

    /// Mirror image about the north-south axis of the heading set.
    pub fn negate(&self) -> Self {
        Self::create(-&self.amount, self.modulus.clone())
    }

    /// Reduces the amount into `[0, modulus)`.
    pub fn normalize(&self) -> Self {
        if self.modulus.is_zero() {
            return Self::any();
        }
        let turns = &self.amount / &self.modulus;
        Self { amount: fract_floor(&turns) * &self.modulus, modulus: self.modulus.clone() }
    }

    /// Returns `true` if every heading `other` may denote is also denoted by
    /// `self`.
    pub fn includes(&self, other: &Self) -> bool {
        let r1 = self.normalize();
        let r2 = other.normalize();
        if r1 == r2 {
            return true;
        }
        if r1.is_any() {
            return true;
        }
        if r2.is_any() {
            return false;
        }
        if !is_integer(&(&r2.modulus / &r1.modulus)) {
            return false;
        }
        Self::create(r2.amount, r1.modulus.clone()).normalize() == r1
    }

    /// Lists the exact headings this rotation denotes, in increasing order.
    ///
    /// The "any heading" rotation lists the eight eighth-turn headings.
    pub fn included(&self) -> Vec<Self> {
        if self.is_any() {
            return (0..8).map(Self::eighths).collect();
        }
        let one = Fraction::one();
        let mut next = self.normalize().amount;
        let mut out = Vec::new();
        while next < one {
            out.push(Self::exact(next.clone()));
            next += &self.modulus;
        }
        out
    }

    /// Smallest rotation including both `self` and `other`.
    ///
    /// The result's modulus is `1/m`, with `m` the least common multiple of
    /// both moduli's denominators and that of the gap between the amounts.
    pub fn union(&self, other: &Self) -> Self {
        if self.includes(other) {
            return self.clone();
        }
        if other.includes(self) {
            return other.clone();
        }
        if self.is_any() || other.is_any() {
            return Self::any();
        }
        let gap = &self.amount - &other.amount;
        let m = self.modulus.denom().lcm(other.modulus.denom()).lcm(gap.denom());
        Self::create(self.amount.clone(), Fraction::new(BigInt::one(), m)).normalize()
    }

    /// Folds [`Rotation::union`] over `rots`; `None` when empty.
    pub fn union_all<'a, I>(rots: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        rots.into_iter().fold(None, |acc: Option<Self>, r| match acc {
            None => Some(r.clone()),
            Some(a) => Some(a.union(r)),
        })
    }

    /// X component of the unit step along this heading.
    ///
    /// Uses an octagonal approximation so that every eighth-turn heading
    /// projects onto the exact grid: north is `0`, northeast and east `1`.
    pub fn to_x(&self) -> Fraction {
        let r = fract_floor(&self.amount);
        let eight = int(8);
        if r < frac(1, 8) {
            r * eight
        } else if r < frac(3, 8) {
            Fraction::one()
        } else if r < frac(5, 8) {
            (frac(1, 2) - r) * eight
        } else if r < frac(7, 8) {
            -Fraction::one()
        } else {
            (r - Fraction::one()) * eight
        }
    }

    /// Y component of the unit step along this heading; see [`Rotation::to_x`].
    pub fn to_y(&self) -> Fraction {
        let r = fract_floor(&self.amount);
        let eight = int(8);
        if r < frac(1, 8) {
            Fraction::one()
        } else if r < frac(3, 8) {
            (frac(1, 4) - r) * eight
        } else if r < frac(5, 8) {
            -Fraction::one()
        } else if r < frac(7, 8) {
            (r - frac(3, 4)) * eight
        } else {
            Fraction::one()
        }
    }

    /// Inverse of the octagonal projection: the exact heading pointing along
    /// `(x, y)`.
    pub fn from_xy(x: &Fraction, y: &Fraction) -> Result<Self, GeomError> {
        if x.is_zero() && y.is_zero() {
            return Err(GeomError::ZeroVector);
        }
        if x.abs() >= y.abs() {
            let mut r = frac(1, 4) - (y / x) * frac(1, 8);
            if x.is_negative() {
                r += frac(1, 2);
            }
            Ok(Self::exact(r).normalize())
        } else {
            let er = Self::from_xy(y, &-x)?;
            Ok(er.subtract(&frac(1, 4)).normalize())
        }
    }

    /// Signed smallest turn from `self` to `other` (both treated as exact);
    /// positive is clockwise.
    pub fn min_sweep(&self, other: &Self) -> Fraction {
        let aa = fract_floor(&self.amount);
        let bb = fract_floor(&other.amount);
        let aa_smaller = aa < bb;
        let s1 = if aa_smaller { &bb - &aa } else { &aa - &bb };
        let s2 = Fraction::one() - &s1;
        let s1_smaller = s1 < s2;
        let cw = aa_smaller == s1_smaller;
        let sweep = if s1_smaller { s1 } else { s2 };
        if cw {
            sweep
        } else {
            -sweep
        }
    }

    fn eighth_index(&self) -> Option<usize> {
        let n = self.normalize();
        if !n.is_exact() {
            return None;
        }
        let f = &n.amount * int(8);
        if is_integer(&f) {
            f.to_integer().to_usize()
        } else {
            None
        }
    }

    fn vague_glyph(&self) -> Option<char> {
        let n = self.normalize();
        if n.is_any() {
            return Some('o');
        }
        let m = &n.modulus;
        let a = &n.amount;
        if *m == frac(1, 8) && a.is_zero() {
            Some('*')
        } else if *m == frac(1, 4) && a.is_zero() {
            Some('+')
        } else if *m == frac(1, 4) && *a == frac(1, 8) {
            Some('x')
        } else if *m == frac(1, 2) && a.is_zero() {
            Some('|')
        } else if *m == frac(1, 2) && *a == frac(1, 4) {
            Some('-')
        } else {
            None
        }
    }

    /// Single-character glyph used in formation diagrams; `.` when the
    /// heading has no glyph.
    pub fn to_diagram_char(&self) -> char {
        if let Some(i) = self.eighth_index() {
            return EIGHTH_GLYPHS[i];
        }
        self.vague_glyph().unwrap_or('.')
    }

    /// Compass name (`n`, `se`, ...) or vague glyph, else the numeric form.
    pub fn to_absolute_string(&self) -> String {
        if let Some(i) = self.eighth_index() {
            return EIGHTH_NAMES[i].to_owned();
        }
        self.vague_glyph().map_or_else(|| self.to_string(), |c| c.to_string())
    }

    /// Parses a compass name, a vague glyph, or a fraction of a turn.
    pub fn from_absolute_str(s: &str) -> Result<Self, GeomError> {
        match s {
            "|" => return Ok(Self::create(Fraction::zero(), frac(1, 2))),
            "-" => return Ok(Self::create(frac(1, 4), frac(1, 2))),
            "+" => return Ok(Self::create(Fraction::zero(), frac(1, 4))),
            "x" => return Ok(Self::create(frac(1, 8), frac(1, 4))),
            "*" => return Ok(Self::create(Fraction::zero(), frac(1, 8))),
            "o" | "O" => return Ok(Self::any()),
            _ => {}
        }
        for (n, name) in (0_i64..).zip(EIGHTH_NAMES) {
            if name.eq_ignore_ascii_case(s) {
                return Ok(Self::eighths(n));
            }
        }
        s.parse::<Fraction>()
            .map(Self::exact)
            .map_err(|_| GeomError::UnknownDirection(s.to_owned()))
    }

    /// Orders by decreasing modulus (most exact first), then by normalized
    /// amount.
    pub fn cmp_precision_first(&self, other: &Self) -> Ordering {
        other
            .modulus
            .cmp(&self.modulus)
            .then_with(|| self.normalize().amount.cmp(&other.normalize().amount))
    }
}

impl PartialEq for Rotation {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus && self.normalize().amount == other.normalize().amount
    }
}

impl Eq for Rotation {}

impl Hash for Rotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalize();
        n.amount.hash(state);
        n.modulus.hash(state);
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            f.write_str(&proper_string(&self.amount))
        } else {
            write!(f, "{} mod {}", proper_string(&self.amount), proper_string(&self.modulus))
        }
    }
}
