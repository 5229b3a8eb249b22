//! Numeric literals: the exact value of a decimal together with the text it was written as.

use crate::{fraction::Fraction, primitive::rational_from_decimal_str};
use rug::{ops::Pow, Integer, Rational};
use std::{fmt::{self, Display, Formatter}, str::FromStr};

/// A non-negative number literal.
///
/// The exact value is kept alongside the text the number was written with, so that `0.50` is
/// displayed as written while comparing equal to `0.5`.
#[derive(Clone, Debug)]
pub struct Number {
    value: Rational,
    input: String,
}

/// Error returned if a string is not a valid number literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNumber(pub String);

impl Display for InvalidNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid number: `{}`", self.0)
    }
}

impl std::error::Error for InvalidNumber {}

impl FromStr for Number {
    type Err = InvalidNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = rational_from_decimal_str(s).ok_or_else(|| InvalidNumber(s.to_owned()))?;
        Ok(Self { value, input: s.to_owned() })
    }
}

impl Number {
    /// Creates the number literal for the absolute value of the given integer.
    pub fn from_integer(n: &Integer) -> Self {
        let n = n.clone().abs();
        Self { input: n.to_string(), value: Rational::from(n) }
    }

    /// Creates the number literal for the absolute value of a rational whose denominator divides
    /// `10^places`, written with at most `places` decimals and no trailing zero.
    pub(crate) fn from_decimal(value: &Rational, places: u32) -> Self {
        let value = value.clone().abs();
        let scale = Integer::from(10).pow(places);
        let scaled = Integer::from(value.numer() * &scale) / value.denom();
        let (whole, fractional) = scaled.div_rem(scale);

        let mut input = whole.to_string();
        let digits = format!("{:0>width$}", fractional.to_string(), width = places as usize);
        let digits = digits.trim_end_matches('0');
        if !digits.is_empty() {
            input.push('.');
            input.push_str(digits);
        }
        Self { value, input }
    }

    /// Returns the exact value.
    pub fn value(&self) -> &Rational {
        &self.value
    }

    /// Returns the text the number was written with.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns true if the number is an integer.
    pub fn is_integer(&self) -> bool {
        *self.value.denom() == 1
    }

    /// Returns the value as an integer, if it is one.
    pub fn to_integer(&self) -> Option<&Integer> {
        self.is_integer().then(|| self.value.numer())
    }

    /// Returns the value as an exact fraction.
    pub fn to_fraction(&self) -> Fraction {
        Fraction::from(&self.value)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Number {}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.input)
    }
}
