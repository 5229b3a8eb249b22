//! Decimal evaluation of expressions, used to decide relations and to approximate values that
//! have no exact form.

use cas_error::Error;
use crate::{
    consts::constant,
    error::{DivisionByZero, ErrorNode, NotEvaluable, UndefinedValue, UnresolvedSymbol},
    expr::{Context, ExprId, Func, Kind},
    normal::Normal,
    primitive::float_with,
};
use rug::{ops::Pow, Float};

impl Context {
    /// Evaluates the given node to a [`Float`] at the precision of the context options.
    ///
    /// Values with units are measured in their base units. Only the constants (`pi` and `e`) can
    /// be evaluated among the symbols.
    pub fn decimal_value(&self, id: ExprId) -> Result<Float, Error> {
        let prec = self.options().precision;
        let span = || vec![self.span(id)];
        let children = self.children(id);
        let child = |i: usize| self.decimal_value(children[i]);

        let value = match self.kind(id) {
            Kind::Number(n) => float_with(prec, n.value()),
            Kind::Symbol(name) => constant(name, prec)
                .ok_or_else(|| Error::new(span(), UnresolvedSymbol { name: name.clone() }))?,
            Kind::Error(message) => return Err(Error::new(span(), ErrorNode { message: message.clone() })),
            kind @ (Kind::Identifier(_)
                | Kind::Hole
                | Kind::Boolean(_)
                | Kind::Template(_)
                | Kind::SegmentLength { .. }
                | Kind::Limit(_)
                | Kind::Relation(_)
                | Kind::Relations(_)) => {
                return Err(Error::new(span(), NotEvaluable { what: kind.name() }));
            },
            Kind::Positive | Kind::Bracket => child(0)?,
            Kind::Opposite => -child(0)?,
            Kind::Percentage => child(0)? / 100,
            Kind::Function(func) => {
                let x = child(0)?;
                let value = match func {
                    Func::Cos => x.cos(),
                    Func::Sin => x.sin(),
                    Func::Tan => x.tan(),
                    Func::Ln => x.ln(),
                    Func::Log => x.log10(),
                    Func::Exp => x.exp(),
                    Func::Radical => x.sqrt(),
                    Func::Floor => x.floor(),
                    Func::Abs => x.abs(),
                };
                if value.is_nan() {
                    let argument = self.string(children[0]);
                    return Err(Error::new(span(), UndefinedValue { function: func.name(), argument }));
                }
                value
            },
            Kind::Gcd => {
                let (a, b) = (child(0)?, child(1)?);
                match (a.to_integer().filter(|_| a.is_integer()), b.to_integer().filter(|_| b.is_integer())) {
                    (Some(a), Some(b)) => float_with(prec, a.gcd(&b)),
                    _ => return Err(Error::new(span(), NotEvaluable { what: "the gcd of non-integers" })),
                }
            },
            Kind::Mod => {
                let (a, b) = (child(0)?, child(1)?);
                if b.is_zero() {
                    return Err(Error::new(span(), DivisionByZero));
                }
                let quotient = float_with(prec, &a / &b).floor();
                a - b * quotient
            },
            Kind::Min | Kind::MinPreserve => child(0)?.min(&child(1)?),
            Kind::Max | Kind::MaxPreserve => child(0)?.max(&child(1)?),
            Kind::Sum | Kind::Time => {
                let mut total = float_with(prec, 0);
                for i in 0..children.len() {
                    total += child(i)?;
                }
                total
            },
            Kind::Difference => child(0)? - child(1)?,
            Kind::Product(_) => {
                let mut total = float_with(prec, 1);
                for i in 0..children.len() {
                    total *= child(i)?;
                }
                total
            },
            Kind::Division | Kind::Quotient => {
                let (n, d) = (child(0)?, child(1)?);
                if d.is_zero() {
                    return Err(Error::new(span(), DivisionByZero));
                }
                n / d
            },
            Kind::Power => {
                let (base, exponent) = (child(0)?, child(1)?);
                if base.is_zero() && exponent.is_sign_negative() {
                    return Err(Error::new(span(), DivisionByZero));
                }
                let value = base.pow(&exponent);
                if value.is_nan() {
                    let argument = self.string(children[0]);
                    return Err(Error::new(span(), UndefinedValue { function: "pow", argument }));
                }
                value
            },
        };

        Ok(match self.unit(id) {
            Some(unit) => value * float_with(prec, &unit.coefficient().to_rational()),
            None => value,
        })
    }
}

impl Normal {
    /// Evaluates the normal form to a [`Float`]. See [`Context::decimal_value`].
    pub fn to_decimal(&self, ctx: &mut Context) -> Result<Float, Error> {
        let node = self.to_node(ctx);
        ctx.decimal_value(node)
    }
}
