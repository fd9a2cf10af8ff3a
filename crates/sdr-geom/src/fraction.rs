// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Exact rational scalar used for every coordinate and heading.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Arbitrary-precision rational number.
pub type Fraction = BigRational;

/// Builds `n / d`. `d` must be non-zero.
#[must_use]
pub fn frac(n: i64, d: i64) -> Fraction {
    Fraction::new(BigInt::from(n), BigInt::from(d))
}

/// Builds the integer `n` as a fraction.
#[must_use]
pub fn int(n: i64) -> Fraction {
    Fraction::from_integer(BigInt::from(n))
}

/// Returns `x / 2`.
#[must_use]
pub fn half(x: &Fraction) -> Fraction {
    x / int(2)
}

/// Fractional part of `x`, always in `[0, 1)`.
#[must_use]
pub fn fract_floor(x: &Fraction) -> Fraction {
    x - x.floor()
}

/// Returns `true` when `x` is a whole number.
#[must_use]
pub fn is_integer(x: &Fraction) -> bool {
    x.denom().is_one()
}

/// Renders `x` as a proper fraction: `3/2` becomes `1 1/2`, `-3/4` stays `-3/4`.
#[must_use]
pub fn proper_string(x: &Fraction) -> String {
    if is_integer(x) {
        return x.numer().to_string();
    }
    let whole = x.trunc();
    let rest = (x - &whole).abs();
    if whole.is_zero() {
        let sign = if x.is_negative() { "-" } else { "" };
        format!("{sign}{}/{}", rest.numer(), rest.denom())
    } else {
        format!("{} {}/{}", whole.numer(), rest.numer(), rest.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proper_string_forms() {
        assert_eq!(proper_string(&int(3)), "3");
        assert_eq!(proper_string(&frac(3, 2)), "1 1/2");
        assert_eq!(proper_string(&frac(-3, 4)), "-3/4");
        assert_eq!(proper_string(&frac(-7, 4)), "-1 3/4");
    }

    #[test]
    fn fract_floor_is_non_negative() {
        assert_eq!(fract_floor(&frac(-1, 4)), frac(3, 4));
        assert_eq!(fract_floor(&frac(9, 4)), frac(1, 4));
        assert!(fract_floor(&int(-2)).is_zero());
    }
}
