//! Integer functions and comparisons: `floor`, `abs`, `pgcd`, `mod`, and the minimum and maximum.

use cas_error::Error;
use crate::{
    error::DivisionByZero,
    expr::{Context, ExprId, Func, Kind},
    fraction::{gcd, Fraction},
    normal::Normal,
};
use std::cmp::Ordering;
use super::{opaque_of, sign_of};

/// Builds the normal form of `floor` or `abs` applied to the given node.
pub(super) fn unary(ctx: &mut Context, func: Func, arg: ExprId) -> Result<Normal, Error> {
    let value = ctx.normal(arg)?;
    let unit = value.unit().cloned();
    let scalar = value.without_unit();

    let result = match func {
        Func::Floor => match scalar.to_fraction() {
            Some(f) => Some(Normal::from_fraction(Fraction::from_integer(f.floor()))),
            None if scalar.is_numeric(ctx) => {
                let decimal = scalar.to_decimal(ctx)?.floor();
                decimal.to_integer()
                    .map(|n| Normal::from_fraction(Fraction::from_integer(n)))
            },
            None => None,
        },
        _ => match sign_of(ctx, &scalar)? {
            Some(Ordering::Less) => Some(scalar.oppose()),
            Some(_) => Some(scalar),
            None => None,
        },
    };

    match result {
        Some(result) => Ok(result.with_unit(unit)),
        None => Ok(opaque_of(ctx, Kind::Function(func), &[value])),
    }
}

/// Builds the normal form of a binary integer function or of a minimum or maximum.
pub(super) fn binary(ctx: &mut Context, kind: &Kind, a: ExprId, b: ExprId) -> Result<Normal, Error> {
    let x = ctx.normal(a)?;
    let y = ctx.normal(b)?;

    let result = match kind {
        Kind::Gcd => match (integer(&x), integer(&y)) {
            (Some(m), Some(n)) => Some(Normal::from_fraction(Fraction::from_integer(gcd(&m, &n)))),
            _ => None,
        },
        Kind::Mod => match (x.to_fraction(), y.to_fraction()) {
            (Some(m), Some(n)) => {
                let quotient = m.checked_div(&n)
                    .ok_or_else(|| Error::new(Vec::new(), DivisionByZero))?;
                let multiple = &n * &Fraction::from_integer(quotient.floor());
                Some(Normal::from_fraction(&m - &multiple))
            },
            _ => None,
        },
        Kind::Min | Kind::MinPreserve => {
            let difference = x.sub(ctx, &y)?;
            sign_of(ctx, &difference)?
                .map(|sign| if sign.is_le() { x.clone() } else { y.clone() })
        },
        _ => {
            let difference = x.sub(ctx, &y)?;
            sign_of(ctx, &difference)?
                .map(|sign| if sign.is_ge() { x.clone() } else { y.clone() })
        },
    };

    match result {
        Some(result) => Ok(result),
        None => Ok(opaque_of(ctx, kind.clone(), &[x, y])),
    }
}

/// Returns the value if it is an integer without a unit.
fn integer(value: &Normal) -> Option<rug::Integer> {
    if value.unit().is_some() {
        return None;
    }
    value.to_fraction()?.to_integer()
}

#[cfg(test)]
mod tests {
    use crate::{
        error::DivisionByZero,
        expr::{Context, ExprId, Func, Kind},
    };
    use pretty_assertions::assert_eq;

    fn normal_string(ctx: &mut Context, id: ExprId) -> String {
        let normal = ctx.normal(id).unwrap();
        normal.string(ctx)
    }

    fn binary(ctx: &mut Context, kind: Kind, a: i64, b: i64) -> ExprId {
        let a = ctx.int(a);
        let b = ctx.int(b);
        ctx.binary(kind, a, b)
    }

    #[test]
    fn floor_and_abs() {
        let mut ctx = Context::new();
        let seven = ctx.int(-7);
        let two = ctx.int(2);
        let q = ctx.quotient(seven, two);
        let floor = ctx.func(Func::Floor, q);
        assert_eq!(normal_string(&mut ctx, floor), "-4");

        let three = ctx.int(-3);
        let abs = ctx.func(Func::Abs, three);
        assert_eq!(normal_string(&mut ctx, abs), "3");

        let two = ctx.int(2);
        let root = ctx.radical(two);
        let floor = ctx.func(Func::Floor, root);
        assert_eq!(normal_string(&mut ctx, floor), "1");

        let x = ctx.symbol("x");
        let abs = ctx.func(Func::Abs, x);
        assert_eq!(normal_string(&mut ctx, abs), "abs(x)");
    }

    #[test]
    fn gcd_and_mod() {
        let mut ctx = Context::new();
        let gcd = binary(&mut ctx, Kind::Gcd, 12, 18);
        assert_eq!(normal_string(&mut ctx, gcd), "6");

        let m = binary(&mut ctx, Kind::Mod, 17, 5);
        assert_eq!(normal_string(&mut ctx, m), "2");

        let m = binary(&mut ctx, Kind::Mod, -7, 3);
        assert_eq!(normal_string(&mut ctx, m), "2");

        let m = binary(&mut ctx, Kind::Mod, 4, 0);
        assert!(ctx.normal(m).unwrap_err().is::<DivisionByZero>());
    }

    #[test]
    fn min_and_max() {
        let mut ctx = Context::new();
        let min = binary(&mut ctx, Kind::Min, 3, 5);
        assert_eq!(normal_string(&mut ctx, min), "3");

        let max = binary(&mut ctx, Kind::MaxPreserve, 3, 5);
        assert_eq!(normal_string(&mut ctx, max), "5");

        let two = ctx.int(2);
        let root = ctx.radical(two);
        let one = ctx.int(1);
        let max = ctx.binary(Kind::Max, root, one);
        assert_eq!(normal_string(&mut ctx, max), "sqrt(2)");
    }
}
