//! Numeric literals.
//!
//! A [`Number`] is either an exact arbitrary precision rational or an
//! `f64`. Exact arithmetic is preserved for as long as both operands are
//! exact; any float operand turns the result into a float.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

use dashu::base::{Abs, Inverse, Signed as DashuSigned};
use dashu::integer::{IBig, UBig};
use dashu::rational::RBig;
use num_traits::{One, Zero};

/// Largest magnitude for which exact roots and divisor searches are attempted.
const EXACT_SEARCH_LIMIT: i64 = 1 << 40;

/// A numeric literal.
#[derive(Clone)]
pub enum Number {
    /// Exact rational, always in lowest terms.
    Rational(RBig),
    /// Floating point approximation. Negative zero is normalised to zero.
    Float(f64),
}

impl Number {
    /// Creates an exact integer.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Number::Rational(RBig::from(IBig::from(value)))
    }

    /// Creates the exact rational `num / den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    #[must_use]
    pub fn ratio(num: i64, den: i64) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Number::Rational(RBig::from_parts(IBig::from(num), UBig::from(den as u64)))
    }

    /// Creates a float literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        if value == 0.0 {
            Number::Float(0.0)
        } else {
            Number::Float(value)
        }
    }

    /// Returns true for exact rationals.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Rational(_))
    }

    /// Returns true if the value is an exact integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        match self {
            Number::Rational(r) => r.denominator().is_one(),
            Number::Float(_) => false,
        }
    }

    /// Returns the value as an `i64` when it is an exact integer that fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Rational(r) if r.denominator().is_one() => r.numerator().clone().try_into().ok(),
            _ => None,
        }
    }

    /// Returns numerator and denominator of an exact rational when both fit in `i64`.
    #[must_use]
    pub fn to_ratio(&self) -> Option<(i64, i64)> {
        match self {
            Number::Rational(r) => {
                let num: i64 = r.numerator().clone().try_into().ok()?;
                let den: i64 = IBig::from(r.denominator().clone()).try_into().ok()?;
                Some((num, den))
            }
            Number::Float(_) => None,
        }
    }

    /// Converts to the nearest `f64`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Float(f) => *f,
            Number::Rational(r) => {
                if let Some((n, d)) = self.to_ratio() {
                    return n as f64 / d as f64;
                }
                let num = r.numerator().to_string().parse::<f64>().unwrap_or(f64::NAN);
                let den = r.denominator().to_string().parse::<f64>().unwrap_or(f64::NAN);
                num / den
            }
        }
    }

    /// Returns -1, 0 or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        match self {
            Number::Rational(r) => {
                if r.is_zero() {
                    0
                } else if DashuSigned::is_positive(r) {
                    1
                } else {
                    -1
                }
            }
            Number::Float(f) => {
                if *f == 0.0 {
                    0
                } else if *f > 0.0 {
                    1
                } else {
                    -1
                }
            }
        }
    }

    /// Returns true if strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.signum() < 0
    }

    /// Returns true if strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.signum() > 0
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        match self {
            Number::Rational(r) => Number::Rational(r.clone().abs()),
            Number::Float(f) => Number::float(f.abs()),
        }
    }

    /// Multiplicative inverse, `None` for zero.
    #[must_use]
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(match self {
            Number::Rational(r) => Number::Rational(r.clone().inv()),
            Number::Float(f) => Number::float(1.0 / f),
        })
    }

    /// Division returning `None` when dividing by zero.
    #[must_use]
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        other.recip().map(|inv| self * &inv)
    }

    /// Raises to an integer power, `None` for `0^-k`.
    #[must_use]
    pub fn powi(&self, exp: i64) -> Option<Self> {
        match self {
            Number::Float(f) => {
                if *f == 0.0 && exp < 0 {
                    None
                } else {
                    Some(Number::float(f.powi(i32::try_from(exp).ok()?)))
                }
            }
            Number::Rational(r) => {
                let magnitude = usize::try_from(exp.unsigned_abs()).ok()?;
                if exp >= 0 {
                    Some(Number::Rational(r.pow(magnitude)))
                } else if r.is_zero() {
                    None
                } else {
                    Some(Number::Rational(r.clone().inv().pow(magnitude)))
                }
            }
        }
    }

    /// Exact `q`-th root of a non-negative rational, if it is itself rational.
    #[must_use]
    pub fn exact_root(&self, q: u32) -> Option<Self> {
        let (num, den) = self.to_ratio()?;
        if num < 0 || q == 0 {
            return None;
        }
        let n = integer_root(num, q)?;
        let d = integer_root(den, q)?;
        Some(Number::ratio(n, d))
    }

    /// Raises to a numeric power when the result is representable.
    ///
    /// Negative bases with fractional exponents are left to the caller,
    /// which expresses them through the imaginary unit.
    #[must_use]
    pub fn pow_number(&self, exp: &Number) -> Option<Self> {
        if let Some(e) = exp.to_i64() {
            return self.powi(e);
        }
        match (self, exp) {
            (Number::Rational(_), Number::Rational(_)) => {
                let (p, q) = exp.to_ratio()?;
                if self.is_negative() {
                    return None;
                }
                let root = self.exact_root(u32::try_from(q).ok()?)?;
                root.powi(p)
            }
            _ => {
                let base = self.to_f64();
                let e = exp.to_f64();
                if base >= 0.0 {
                    Some(Number::float(base.powf(e)))
                } else if e.fract() == 0.0 {
                    Some(Number::float(base.powf(e)))
                } else {
                    None
                }
            }
        }
    }

    /// Integer divisors of an exact integer, used by rational root searches.
    #[must_use]
    pub fn positive_divisors(&self) -> Option<Vec<i64>> {
        let n = self.to_i64()?.checked_abs()?;
        if n == 0 || n > EXACT_SEARCH_LIMIT {
            return None;
        }
        let mut small = Vec::new();
        let mut large = Vec::new();
        let mut d = 1i64;
        while d * d <= n {
            if n % d == 0 {
                small.push(d);
                if d != n / d {
                    large.push(n / d);
                }
            }
            d += 1;
            if d > 2_000_000 {
                return None;
            }
        }
        small.extend(large.into_iter().rev());
        Some(small)
    }
}

fn integer_root(n: i64, q: u32) -> Option<i64> {
    if n < 0 || n > EXACT_SEARCH_LIMIT {
        return None;
    }
    if q == 1 {
        return Some(n);
    }
    let guess = (n as f64).powf(1.0 / f64::from(q)).round() as i64;
    (guess.saturating_sub(1)..=guess + 1)
        .filter(|c| *c >= 0)
        .find(|c| c.checked_pow(q) == Some(n))
}

impl Default for Number {
    fn default() -> Self {
        Number::integer(0)
    }
}

impl Zero for Number {
    fn zero() -> Self {
        Number::Rational(RBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }
}

impl One for Number {
    fn one() -> Self {
        Number::Rational(RBig::ONE)
    }

    fn is_one(&self) -> bool {
        match self {
            Number::Rational(r) => *r == RBig::ONE,
            Number::Float(f) => *f == 1.0,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Rational(r) => {
                0u8.hash(state);
                r.hash(state);
            }
            Number::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => a.cmp(b),
            (Number::Float(a), Number::Float(b)) => a.total_cmp(b),
            (Number::Rational(_), Number::Float(b)) => {
                self.to_f64().total_cmp(b).then(Ordering::Less)
            }
            (Number::Float(a), Number::Rational(_)) => {
                a.total_cmp(&other.to_f64()).then(Ordering::Greater)
            }
        }
    }
}

fn combine(a: &Number, b: &Number, exact: fn(&RBig, &RBig) -> RBig, float: fn(f64, f64) -> f64) -> Number {
    match (a, b) {
        (Number::Rational(x), Number::Rational(y)) => Number::Rational(exact(x, y)),
        _ => Number::float(float(a.to_f64(), b.to_f64())),
    }
}

impl Add for &Number {
    type Output = Number;

    fn add(self, rhs: Self) -> Number {
        combine(self, rhs, |x, y| x + y, |x, y| x + y)
    }
}

impl Sub for &Number {
    type Output = Number;

    fn sub(self, rhs: Self) -> Number {
        combine(self, rhs, |x, y| x - y, |x, y| x - y)
    }
}

impl Mul for &Number {
    type Output = Number;

    fn mul(self, rhs: Self) -> Number {
        combine(self, rhs, |x, y| x * y, |x, y| x * y)
    }
}

impl Div for &Number {
    type Output = Number;

    /// # Panics
    ///
    /// Panics when dividing an exact rational by exact zero.
    fn div(self, rhs: Self) -> Number {
        assert!(!(rhs.is_exact() && rhs.is_zero()), "division by zero");
        combine(self, rhs, |x, y| x / y, |x, y| x / y)
    }
}

impl Neg for &Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(-r),
            Number::Float(f) => Number::float(-f),
        }
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident $method:ident),*) => {$(
        impl $trait for Number {
            type Output = Number;

            fn $method(self, rhs: Number) -> Number {
                (&self).$method(&rhs)
            }
        }
    )*};
}

forward_owned_binop!(Add add, Sub sub, Mul mul, Div div);

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        -&self
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::float(value)
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Rational(r) => {
                if r.denominator().is_one() {
                    write!(f, "{}", r.numerator())
                } else {
                    write!(f, "{}/{}", r.numerator(), r.denominator())
                }
            }
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_arithmetic() {
        let a = Number::ratio(1, 2);
        let b = Number::ratio(1, 3);
        assert_eq!(&a + &b, Number::ratio(5, 6));
        assert_eq!(&a * &b, Number::ratio(1, 6));
        assert_eq!(Number::ratio(4, -6), Number::ratio(-2, 3));
    }

    #[test]
    fn test_float_contagion() {
        let sum = &Number::ratio(1, 2) + &Number::float(0.25);
        assert_eq!(sum, Number::float(0.75));
        assert!(!sum.is_exact());
    }

    #[test]
    fn test_exact_roots() {
        assert_eq!(Number::integer(16).exact_root(2), Some(Number::integer(4)));
        assert_eq!(Number::ratio(8, 27).exact_root(3), Some(Number::ratio(2, 3)));
        assert_eq!(Number::integer(2).exact_root(2), None);
        assert_eq!(
            Number::integer(4).pow_number(&Number::ratio(3, 2)),
            Some(Number::integer(8))
        );
    }

    #[test]
    fn test_powi_and_recip() {
        assert_eq!(Number::integer(2).powi(-2), Some(Number::ratio(1, 4)));
        assert_eq!(Number::integer(0).powi(-1), None);
        assert_eq!(Number::integer(0).recip(), None);
    }

    #[test]
    fn test_divisors() {
        assert_eq!(Number::integer(12).positive_divisors(), Some(vec![1, 2, 3, 4, 6, 12]));
        assert_eq!(Number::integer(-7).positive_divisors(), Some(vec![1, 7]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::ratio(3, 1).to_string(), "3");
        assert_eq!(Number::ratio(-2, 3).to_string(), "-2/3");
        assert_eq!(Number::float(0.5).to_string(), "0.5");
    }
}
