//! Logarithms and the exponential function.
//!
//! Logarithms of rationals are expanded over the prime factors of the numerator and denominator,
//! so that `ln(8)` and `3*ln(2)` share a normal form.

use cas_error::Error;
use crate::{
    consts::E_SYMBOL,
    error::UndefinedValue,
    expr::{Context, ExprId, Func, Kind},
    fraction::{prime_factorization, Fraction},
    normal::{nlist::{Base, Coef}, Normal},
};
use rug::Integer;
use super::{opaque_of, single_base};
use tracing::warn;

/// Builds the normal form of `ln`, `log` or `exp` applied to the given node.
pub(super) fn normalize(ctx: &mut Context, func: Func, arg: ExprId) -> Result<Normal, Error> {
    let value = ctx.normal(arg)?;
    match func {
        Func::Exp => exp(ctx, value),
        _ => log(ctx, func, value),
    }
}

fn exp(ctx: &mut Context, value: Normal) -> Result<Normal, Error> {
    if value.is_zero() {
        return Ok(Normal::one());
    }
    if let Some(inner) = call_argument(ctx, &value, Func::Ln) {
        return ctx.normal(inner);
    }
    Ok(opaque_of(ctx, Kind::Function(Func::Exp), &[value]))
}

fn log(ctx: &mut Context, func: Func, value: Normal) -> Result<Normal, Error> {
    if value.is_one() {
        return Ok(Normal::zero());
    }

    if func == Func::Ln {
        if let Some(exponent) = power_of_e(ctx, &value) {
            return Ok(exponent);
        }
        if let Some(inner) = call_argument(ctx, &value, Func::Exp) {
            return ctx.normal(inner);
        }
    }

    if let Some(f) = value.to_fraction().filter(|_| value.unit().is_none()) {
        if f <= Fraction::zero() {
            let argument = value.string(ctx);
            return Err(Error::new(Vec::new(), UndefinedValue { function: func.name(), argument }));
        }
        let f = f.reduce();
        let n = log_of_integer(ctx, func, f.numerator())?;
        let d = log_of_integer(ctx, func, f.denominator())?;
        if let (Some(n), Some(d)) = (n, d) {
            return n.sub(ctx, &d);
        }
    }

    Ok(opaque_of(ctx, Kind::Function(func), &[value]))
}

/// Expands the logarithm of a positive integer over its prime factors. `log` takes out the
/// powers of ten first.
///
/// Returns [`None`] if the integer cannot be factored within the factorization limit.
fn log_of_integer(ctx: &mut Context, func: Func, n: &Integer) -> Result<Option<Normal>, Error> {
    let mut rest = n.clone();
    let mut tens = 0i64;
    if func == Func::Log {
        while rest != 0 && rest.is_divisible_u(10) {
            rest /= 10u32;
            tens += 1;
        }
    }

    let limit = ctx.options().factor_limit.clone();
    let Some(primes) = prime_factorization(&rest, &limit) else {
        warn!(%n, "integer too large to factor, keeping its logarithm opaque");
        return Ok(None);
    };

    let mut result = Normal::from_fraction(Fraction::from(tens));
    for (prime, count) in primes {
        let prime = ctx.int(prime);
        let call = ctx.func(func, prime);
        let term = Normal::from_base(call).scale(&Fraction::from(i64::from(count)));
        result = result.add(ctx, &term)?;
    }
    Ok(Some(result))
}

/// Returns the argument of the call if the value is exactly `func(x)`.
fn call_argument(ctx: &Context, value: &Normal, func: Func) -> Option<ExprId> {
    if value.unit().is_some() || !value.denominator().is_one() {
        return None;
    }
    let (coef, base) = single_base(value.numerator())?;
    match ctx.kind(base) {
        Kind::Function(f) if *f == func && coef.is_one() => ctx.children(base).first().copied(),
        _ => None,
    }
}

/// Returns `k` if the value is exactly `e^k`.
fn power_of_e(ctx: &Context, value: &Normal) -> Option<Normal> {
    if value.unit().is_some() || !value.denominator().is_one() {
        return None;
    }
    let [(Coef::Frac(coef), product)] = value.numerator().items() else {
        return None;
    };
    let [(exponent, Base::Expr(base))] = product.items() else {
        return None;
    };
    if !coef.is_one() || !matches!(ctx.kind(*base), Kind::Symbol(name) if name == E_SYMBOL) {
        return None;
    }
    Some(match exponent {
        Coef::Frac(k) => Normal::from_fraction(k.clone()),
        Coef::Sum(k) => Normal::from_sum(k.clone()),
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        error::UndefinedValue,
        expr::{Context, ExprId, Func},
    };
    use pretty_assertions::assert_eq;

    fn normal_string(ctx: &mut Context, id: ExprId) -> String {
        let normal = ctx.normal(id).unwrap();
        normal.string(ctx)
    }

    fn call(ctx: &mut Context, func: Func, n: i64) -> ExprId {
        let n = ctx.int(n);
        ctx.func(func, n)
    }

    #[test]
    fn expands_over_primes() {
        let mut ctx = Context::new();
        let ln8 = call(&mut ctx, Func::Ln, 8);
        assert_eq!(normal_string(&mut ctx, ln8), "3*ln(2)");

        let log1000 = call(&mut ctx, Func::Log, 1000);
        assert_eq!(normal_string(&mut ctx, log1000), "3");

        let log20 = call(&mut ctx, Func::Log, 20);
        assert_eq!(normal_string(&mut ctx, log20), "1+log(2)");

        let two = ctx.int(2);
        let three = ctx.int(3);
        let q = ctx.quotient(two, three);
        let ln = ctx.func(Func::Ln, q);
        assert_eq!(normal_string(&mut ctx, ln), "ln(2)-ln(3)");
    }

    #[test]
    fn equivalent_logarithms() {
        let mut ctx = Context::new();
        let ln8 = call(&mut ctx, Func::Ln, 8);
        let three = ctx.int(3);
        let ln2 = call(&mut ctx, Func::Ln, 2);
        let product = ctx.product(three, ln2);
        assert!(ctx.equals(ln8, product).unwrap());
    }

    #[test]
    fn special_values() {
        let mut ctx = Context::new();
        let ln1 = call(&mut ctx, Func::Ln, 1);
        assert_eq!(normal_string(&mut ctx, ln1), "0");

        let exp0 = call(&mut ctx, Func::Exp, 0);
        assert_eq!(normal_string(&mut ctx, exp0), "1");

        let e = ctx.symbol("e");
        let two = ctx.int(2);
        let e2 = ctx.power(e, two);
        let ln = ctx.func(Func::Ln, e2);
        assert_eq!(normal_string(&mut ctx, ln), "2");

        let x = ctx.symbol("x");
        let exp = ctx.func(Func::Exp, x);
        let ln = ctx.func(Func::Ln, exp);
        assert_eq!(normal_string(&mut ctx, ln), "x");

        let x = ctx.symbol("x");
        let ln = ctx.func(Func::Ln, x);
        let exp = ctx.func(Func::Exp, ln);
        assert_eq!(normal_string(&mut ctx, exp), "x");
    }

    #[test]
    fn non_positive_arguments() {
        let mut ctx = Context::new();
        let ln0 = call(&mut ctx, Func::Ln, 0);
        assert!(ctx.normal(ln0).unwrap_err().is::<UndefinedValue>());

        let log = call(&mut ctx, Func::Log, -5);
        assert!(ctx.normal(log).unwrap_err().is::<UndefinedValue>());
    }
}
