//! Exact values of the trigonometric functions at rational multiples of `pi`.

use cas_error::Error;
use cas_unit_convert::{Angle, Convert};
use crate::{
    consts::PI_SYMBOL,
    error::UndefinedValue,
    expr::{Context, ExprId, Func, Kind},
    fraction::Fraction,
    normal::{
        nlist::{Base, Coef, NProduct, NSum},
        Normal,
    },
};
use super::{opaque_of, single_base};

/// Builds the normal form of `cos`, `sin` or `tan` applied to the given node.
pub(super) fn normalize(ctx: &mut Context, func: Func, arg: ExprId) -> Result<Normal, Error> {
    let value = ctx.normal(arg)?;
    let exact = match pi_multiple(ctx, &value) {
        Some(turns) => match func {
            Func::Cos => cos(ctx, &turns),
            Func::Sin => sin(ctx, &turns),
            _ => match (sin(ctx, &turns), cos(ctx, &turns)) {
                (Some(_), Some(c)) if c.is_zero() => {
                    let argument = value.string(ctx);
                    return Err(Error::new(Vec::new(), UndefinedValue { function: "tan", argument }));
                },
                (Some(s), Some(c)) => Some(s.div(ctx, &c)?),
                _ => None,
            },
        },
        None => None,
    };

    match exact {
        Some(normal) => Ok(normal),
        None => Ok(opaque_of(ctx, Kind::Function(func), &[value])),
    }
}

/// Returns `q` if the value is `q * pi`, or `q * 180` degrees.
fn pi_multiple(ctx: &Context, value: &Normal) -> Option<Fraction> {
    if let Some(unit) = value.unit() {
        let (coef, base) = single_base(unit.numerator())?;
        let is_degree = coef.is_one()
            && matches!(ctx.kind(base), Kind::Symbol(name) if name == Angle::BASE.abbreviation());
        if !is_degree || !unit.denominator().is_one() {
            return None;
        }
        let degrees = value.without_unit().to_fraction()?;
        return degrees.checked_div(&Fraction::from(180));
    }

    if value.is_zero() {
        return Some(Fraction::zero());
    }
    if !value.denominator().is_one() {
        return None;
    }
    let (coef, base) = single_base(value.numerator())?;
    match ctx.kind(base) {
        Kind::Symbol(name) if name == PI_SYMBOL => Some(coef),
        _ => None,
    }
}

/// Reduces `q` into `[0, 2)`.
fn modulo_two(q: &Fraction) -> Fraction {
    let two = Fraction::from(2);
    let turns = q.checked_div(&two).map(|t| t.floor()).unwrap_or_default();
    q - &(&two * &Fraction::from_integer(turns))
}

/// `k^(1/2) / 2`
fn half_root(ctx: &mut Context, k: i64) -> Normal {
    let radicand = ctx.int(k);
    let mut product = NProduct::one();
    product.insert(ctx, Coef::Frac(Fraction::new(1, 2)), Base::Expr(radicand));
    Normal::from_sum(NSum::term(Coef::Frac(Fraction::new(1, 2)), product))
}

/// Returns `cos(q * pi)` if it is in the table of exact values.
fn cos(ctx: &mut Context, q: &Fraction) -> Option<Normal> {
    let mut r = modulo_two(q);
    if r > Fraction::one() {
        r = &Fraction::from(2) - &r;
    }
    let mut negate = false;
    if r > Fraction::new(1, 2) {
        r = &Fraction::one() - &r;
        negate = true;
    }

    let r = r.reduce();
    let value = match (r.numerator().to_i64()?, r.denominator().to_i64()?) {
        (0, _) => Normal::one(),
        (1, 6) => half_root(ctx, 3),
        (1, 4) => half_root(ctx, 2),
        (1, 3) => Normal::from_fraction(Fraction::new(1, 2)),
        (1, 2) => Normal::zero(),
        _ => return None,
    };

    Some(if negate { value.oppose() } else { value })
}

/// `sin(q * pi) = cos((1/2 - q) * pi)`
fn sin(ctx: &mut Context, q: &Fraction) -> Option<Normal> {
    cos(ctx, &(&Fraction::new(1, 2) - q))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::UndefinedValue,
        expr::{Context, ExprId, Func},
        unit::Unit,
    };
    use pretty_assertions::assert_eq;

    /// Builds `func(num * pi / den)`.
    fn at_pi(ctx: &mut Context, func: Func, num: i64, den: i64) -> ExprId {
        let num = ctx.int(num);
        let pi = ctx.symbol("pi");
        let angle = ctx.product(num, pi);
        let den = ctx.int(den);
        let arg = ctx.quotient(angle, den);
        ctx.func(func, arg)
    }

    fn normal_string(ctx: &mut Context, id: ExprId) -> String {
        let normal = ctx.normal(id).unwrap();
        normal.string(ctx)
    }

    #[test]
    fn table_values() {
        let mut ctx = Context::new();
        let cases = [
            (Func::Cos, 1, 3, "1/2"),
            (Func::Sin, 1, 4, "sqrt(2)/2"),
            (Func::Cos, 1, 6, "sqrt(3)/2"),
            (Func::Cos, 2, 3, "-1/2"),
            (Func::Sin, 3, 2, "-1"),
            (Func::Cos, 7, 1, "-1"),
            (Func::Tan, 1, 4, "1"),
            (Func::Sin, 0, 1, "0"),
        ];
        for (func, num, den, expected) in cases {
            let id = at_pi(&mut ctx, func, num, den);
            assert_eq!(normal_string(&mut ctx, id), expected, "{}({}pi/{})", func.name(), num, den);
        }
    }

    #[test]
    fn degrees() {
        let mut ctx = Context::new();
        let sixty = ctx.int(60);
        let deg = Unit::parse(&mut ctx, "°").unwrap();
        let angle = ctx.with_unit(sixty, deg);
        let cos = ctx.func(Func::Cos, angle);
        assert_eq!(normal_string(&mut ctx, cos), "1/2");
    }

    #[test]
    fn tan_is_undefined_at_half_pi() {
        let mut ctx = Context::new();
        let id = at_pi(&mut ctx, Func::Tan, 1, 2);
        let err = ctx.normal(id).unwrap_err();
        assert!(err.is::<UndefinedValue>());
    }

    #[test]
    fn other_arguments_are_opaque() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let zero = ctx.int(0);
        let sum = ctx.sum(vec![x, zero]);
        let cos = ctx.func(Func::Cos, sum);
        assert_eq!(normal_string(&mut ctx, cos), "cos(x)");

        let one = ctx.int(1);
        let sin = ctx.func(Func::Sin, one);
        assert_eq!(normal_string(&mut ctx, sin), "sin(1)");
    }
}
