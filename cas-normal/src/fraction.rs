//! Exact rational arithmetic over arbitrary-precision integers.
//!
//! A [`Fraction`] stores its numerator and denominator as non-negative [`Integer`]s, with the sign
//! kept separately. Arithmetic always returns reduced fractions. [`Fraction::new`] keeps the
//! given terms as they are, so an unreduced fraction only exists until [`Fraction::reduce`] is
//! called on it.

use crate::primitive::int;
use rug::{ops::Pow, Integer, Rational};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
};

/// The sign of a [`Fraction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    /// Returns the opposite sign.
    pub fn flip(self) -> Self {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }

    /// Returns the sign of a product of two values with these signs.
    pub fn mul(self, other: Self) -> Self {
        if self == other {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// An exact fraction `sign * n / d`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fraction {
    n: Integer,
    d: Integer,
    sign: Sign,
}

impl Fraction {
    /// Creates the fraction `n / d`, without reducing it. The signs of `n` and `d` are moved onto
    /// the fraction.
    ///
    /// # Panics
    ///
    /// Panics if `d` is zero.
    pub fn new(n: impl Into<Integer>, d: impl Into<Integer>) -> Self {
        let (n, d) = (n.into(), d.into());
        assert!(d != 0, "fraction with a zero denominator");
        let sign = if n == 0 || (n < 0) == (d < 0) {
            Sign::Positive
        } else {
            Sign::Negative
        };
        Self { n: n.abs(), d: d.abs(), sign }
    }

    /// Creates the fraction representing the given integer.
    pub fn from_integer(n: impl Into<Integer>) -> Self {
        Self::new(n, 1)
    }

    /// The fraction `0`.
    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    /// The fraction `1`.
    pub fn one() -> Self {
        Self::from_integer(1)
    }

    /// Returns the (non-negative) numerator.
    pub fn numerator(&self) -> &Integer {
        &self.n
    }

    /// Returns the (positive) denominator.
    pub fn denominator(&self) -> &Integer {
        &self.d
    }

    /// Returns the sign.
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// Returns the numerator with the sign of the fraction applied.
    pub fn signed_numerator(&self) -> Integer {
        match self.sign {
            Sign::Positive => self.n.clone(),
            Sign::Negative => -self.n.clone(),
        }
    }

    /// Returns the fraction divided through by the gcd of its terms.
    pub fn reduce(&self) -> Self {
        let gcd = int(self.n.gcd_ref(&self.d));
        if gcd == 0 || gcd == 1 {
            return self.clone();
        }
        Self {
            n: int(self.n.div_exact_ref(&gcd)),
            d: int(self.d.div_exact_ref(&gcd)),
            sign: self.sign,
        }
    }

    /// Returns true if the fraction is zero.
    pub fn is_zero(&self) -> bool {
        self.n == 0
    }

    /// Returns true if the fraction is one.
    pub fn is_one(&self) -> bool {
        self.sign == Sign::Positive && self.n == self.d
    }

    /// Returns true if the fraction is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Negative && self.n != 0
    }

    /// Returns true if the fraction is an integer.
    pub fn is_integer(&self) -> bool {
        self.n.is_divisible(&self.d)
    }

    /// Returns the value as an [`Integer`] if it is one.
    pub fn to_integer(&self) -> Option<Integer> {
        self.is_integer().then(|| {
            let n = int(self.n.div_exact_ref(&self.d));
            match self.sign {
                Sign::Positive => n,
                Sign::Negative => -n,
            }
        })
    }

    /// Returns the value as an [`i64`] if it is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_integer()?.to_i64()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self { sign: Sign::Positive, ..self.clone() }
    }

    /// Returns the reciprocal, or [`None`] if the fraction is zero.
    pub fn invert(&self) -> Option<Self> {
        (!self.is_zero()).then(|| Self {
            n: self.d.clone(),
            d: self.n.clone(),
            sign: self.sign,
        })
    }

    /// Divides `self` by `other`, returning [`None`] if `other` is zero.
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        Some(self * &other.invert()?)
    }

    /// Raises the fraction to an integer power. Returns [`None`] for a negative power of zero.
    pub fn pow(&self, exponent: i64) -> Option<Self> {
        let base = if exponent < 0 { self.invert()? } else { self.clone() };
        let power = u32::try_from(exponent.unsigned_abs()).ok()?;
        let sign = if self.sign == Sign::Negative && power % 2 == 1 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        Some(Self::from_parts(
            int((&base.n).pow(power)),
            int((&base.d).pow(power)),
            sign,
        ))
    }

    /// Returns the largest integer lower than or equal to the fraction.
    pub fn floor(&self) -> Integer {
        let (quotient, _) = self.signed_numerator().div_rem_floor(self.d.clone());
        quotient
    }

    /// Returns true if `self < other`, comparing by cross-multiplication.
    pub fn is_lower_than(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// Returns true if `self > other`, comparing by cross-multiplication.
    pub fn is_greater_than(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Greater
    }

    /// Returns the value as a [`Rational`].
    pub fn to_rational(&self) -> Rational {
        Rational::from((self.signed_numerator(), self.d.clone()))
    }

    /// Builds a reduced fraction from non-negative terms and a sign.
    fn from_parts(n: Integer, d: Integer, sign: Sign) -> Self {
        let sign = if n == 0 { Sign::Positive } else { sign };
        Self { n, d, sign }.reduce()
    }
}

impl From<&Rational> for Fraction {
    fn from(value: &Rational) -> Self {
        Fraction::new(value.numer().clone(), value.denom().clone())
    }
}

impl From<Integer> for Fraction {
    fn from(value: Integer) -> Self {
        Fraction::from_integer(value)
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Self {
        Fraction::from_integer(value)
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.signed_numerator() * &other.d;
        let right = other.signed_numerator() * &self.d;
        left.cmp(&right)
    }
}

impl Add for &Fraction {
    type Output = Fraction;

    fn add(self, other: &Fraction) -> Fraction {
        let n = self.signed_numerator() * &other.d + other.signed_numerator() * &self.d;
        let d = int(&self.d * &other.d);
        let sign = if n < 0 { Sign::Negative } else { Sign::Positive };
        Fraction::from_parts(n.abs(), d, sign)
    }
}

impl Sub for &Fraction {
    type Output = Fraction;

    fn sub(self, other: &Fraction) -> Fraction {
        self + &-other
    }
}

impl Mul for &Fraction {
    type Output = Fraction;

    fn mul(self, other: &Fraction) -> Fraction {
        Fraction::from_parts(
            int(&self.n * &other.n),
            int(&self.d * &other.d),
            self.sign.mul(other.sign),
        )
    }
}

impl Neg for &Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        let sign = if self.is_zero() { Sign::Positive } else { self.sign.flip() };
        Fraction { sign, ..self.clone() }
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        -&self
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.sign == Sign::Negative && !self.is_zero() {
            write!(f, "-")?;
        }
        if self.d == 1 {
            write!(f, "{}", self.n)
        } else {
            write!(f, "{}/{}", self.n, self.d)
        }
    }
}

/// Returns the greatest common divisor of two integers.
pub fn gcd(a: &Integer, b: &Integer) -> Integer {
    int(a.gcd_ref(b))
}

/// Returns the prime factorization of the given positive integer, as a map from each prime to
/// its multiplicity.
///
/// Returns [`None`] if `n` is not positive or is greater than `limit`, since trial division of
/// such integers is not attempted.
pub fn prime_factorization(n: &Integer, limit: &Integer) -> Option<BTreeMap<Integer, u32>> {
    if *n <= 0 || n > limit {
        return None;
    }

    let mut factors = BTreeMap::new();
    let mut n = n.clone();
    let mut i = int(2);
    while int(&i * &i) <= n {
        while n.is_divisible(&i) {
            *factors.entry(i.clone()).or_insert(0) += 1;
            n /= &i;
        }
        i += 1;
    }
    if n > 1 {
        *factors.entry(n).or_insert(0) += 1;
    }

    Some(factors)
}

/// Splits the positive integer `n` into `(outside, inside)` such that `n = outside^root * inside`
/// and `inside` has no factor that is a perfect `root`-th power.
///
/// Returns [`None`] if `n` cannot be factored (see [`prime_factorization`]).
pub fn extract_power(n: &Integer, root: u32, limit: &Integer) -> Option<(Integer, Integer)> {
    let factors = prime_factorization(n, limit)?;
    let mut outside = int(1);
    let mut inside = int(1);
    for (prime, count) in factors {
        outside *= int((&prime).pow(count / root));
        inside *= int((&prime).pow(count % root));
    }
    Some((outside, inside))
}
