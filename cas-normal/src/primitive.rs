//! Functions to construct [`Integer`]s, [`Float`]s and [`Rational`]s from various types.

use rug::{ops::Pow, Assign, Float, Integer, Rational};

/// The number of bits of precision to use when computing decimal values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Float`] with the given value, using the default [`PRECISION`].
pub fn float<T>(n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(PRECISION, n)
}

/// Creates a [`Float`] with the given value and precision.
pub fn float_with<T>(precision: u32, n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(precision, n)
}

/// Parses a decimal literal such as `12`, `0.25` or `3,5` (decimal comma) into an exact
/// [`Rational`].
///
/// Returns [`None`] if the string is not a non-empty sequence of digits with at most one
/// decimal separator. Signs are not part of a literal.
pub fn rational_from_decimal_str(s: &str) -> Option<Rational> {
    let (whole, fractional) = match s.find(['.', ',']) {
        Some(index) => (&s[..index], &s[index + 1..]),
        None => (s, ""),
    };

    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() && fractional.is_empty()
        || !all_digits(whole)
        || !all_digits(fractional)
    {
        return None;
    }

    let digits = format!("{}{}", whole, fractional);
    let numerator = Integer::from_str_radix(&digits, 10).ok()?;
    let denominator = int(10).pow(fractional.len() as u32);
    Some(Rational::from((numerator, denominator)))
}

/// Rounds the given [`Float`] to `places` decimal places, returning the exact [`Rational`]
/// value of the rounded number.
pub fn round_to_places(n: &Float, places: u32) -> Option<Rational> {
    let scale = int(10).pow(places);
    let scaled = Float::with_val(n.prec(), n * &scale).round();
    let integer = scaled.to_integer()?;
    Some(Rational::from((integer, scale)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn decimal_literals() {
        assert_eq!(rational_from_decimal_str("12"), Some(Rational::from(12)));
        assert_eq!(rational_from_decimal_str("0.25"), Some(Rational::from((1, 4))));
        assert_eq!(rational_from_decimal_str("3,5"), Some(Rational::from((7, 2))));
        assert_eq!(rational_from_decimal_str(".5"), Some(Rational::from((1, 2))));
        assert_eq!(rational_from_decimal_str("1.500"), Some(Rational::from((3, 2))));
    }

    #[test]
    fn invalid_literals() {
        assert_eq!(rational_from_decimal_str(""), None);
        assert_eq!(rational_from_decimal_str("."), None);
        assert_eq!(rational_from_decimal_str("-1"), None);
        assert_eq!(rational_from_decimal_str("1.2.3"), None);
        assert_eq!(rational_from_decimal_str("x"), None);
    }

    #[test]
    fn rounding() {
        let third = float(1) / float(3);
        assert_eq!(round_to_places(&third, 3), Some(Rational::from((333, 1000))));
        assert_eq!(round_to_places(&float(2.5), 0), Some(Rational::from(3)));
    }
}
