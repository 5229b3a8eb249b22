//! Evaluation of an expression to its exact value, its value in a target unit, or its rounded
//! decimal value.

use cas_error::Error;
use crate::{
    error::{IncompatibleUnit, NotEvaluable},
    expr::{Context, ExprId, Kind, Number},
    normal::{rules::sign_of, unit_string},
    options::EvalOptions,
    primitive::round_to_places,
    unit::{self, Unit},
};
use tracing::debug;

impl Context {
    /// Evaluates the given expression.
    ///
    /// The values are substituted first. The result is the exact value rendered from the normal
    /// form, converted to the target unit if there is one, or its decimal approximation if
    /// [`EvalOptions::decimal`] is set. A numeric `minip` or `maxip` evaluates to the chosen
    /// operand as it is written.
    pub fn eval(&mut self, id: ExprId, options: &EvalOptions) -> Result<ExprId, Error> {
        let substituted = self.substitute(id, &options.values);
        let exact = match self.preserved_operand(substituted)? {
            Some(operand) => self.copy(operand),
            None => self.exact_value(substituted, options.unit.as_ref())?,
        };
        if !options.decimal {
            return Ok(exact);
        }

        let unit = self.unit(exact).cloned();
        let value = self.without_unit(exact);
        let decimal = self.decimal_value(value)?;
        let rounded = round_to_places(&decimal, options.precision)
            .ok_or_else(|| Error::new(vec![self.span(id)], NotEvaluable { what: "an infinite value" }))?;
        debug!(%rounded, places = options.precision, "decimal value");

        let number = self.number(Number::from_decimal(&rounded, options.precision));
        let number = if rounded < 0 { self.opposite(number) } else { number };
        Ok(match unit {
            Some(unit) => self.with_unit(number, unit),
            None => number,
        })
    }

    /// Returns the operand chosen by a numeric `minip` or `maxip`.
    fn preserved_operand(&mut self, id: ExprId) -> Result<Option<ExprId>, Error> {
        let min = match self.kind(id) {
            Kind::MinPreserve => true,
            Kind::MaxPreserve => false,
            _ => return Ok(None),
        };
        if !self.is_numeric(id) {
            return Ok(None);
        }

        let (a, b) = (self.first(id), self.last(id));
        let x = self.normal(a)?;
        let y = self.normal(b)?;
        let difference = x.sub(self, &y)?;
        Ok(sign_of(self, &difference)?.map(|sign| {
            let first = if min { sign.is_le() } else { sign.is_ge() };
            if first { a } else { b }
        }))
    }

    /// Renders the normal form of the expression, measured in the target unit if there is one.
    fn exact_value(&mut self, id: ExprId, target: Option<&Unit>) -> Result<ExprId, Error> {
        let normal = self.normal(id)?;
        let Some(target) = target else {
            return Ok(normal.to_node(self));
        };

        let converted = match normal.unit() {
            Some(from) if unit::convertible(self, from, target.normal()) => {
                let factor = unit::factor(self, from, target.normal());
                normal.without_unit().scale(&factor)
            },
            from => {
                let unit = unit_string(self, from);
                let target = target.string(self);
                return Err(Error::new(vec![self.span(id)], IncompatibleUnit { unit, target }));
            },
        };
        let node = converted.to_node(self);
        Ok(self.with_unit(node, target.clone()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::IncompatibleUnit,
        expr::{Context, ExprId, Kind},
        options::EvalOptions,
        unit::Unit,
    };
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn measure(ctx: &mut Context, value: i64, unit: &str) -> ExprId {
        let value = ctx.int(value);
        let unit = Unit::parse(ctx, unit).unwrap();
        ctx.with_unit(value, unit)
    }

    fn eval_string(ctx: &mut Context, id: ExprId, options: &EvalOptions) -> String {
        let result = ctx.eval(id, options).unwrap();
        ctx.string(result)
    }

    #[test]
    fn exact_values() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let two = ctx.int(2);
        let square = ctx.power(x, two);
        let one = ctx.int(1);
        let sum = ctx.sum(vec![square, one]);

        let value = ctx.int(2);
        let options = EvalOptions {
            values: HashMap::from([("x".to_string(), value)]),
            ..Default::default()
        };
        assert_eq!(eval_string(&mut ctx, sum, &options), "5");
        assert_eq!(eval_string(&mut ctx, sum, &EvalOptions::default()), "1+x^2");
    }

    #[test]
    fn decimal_values() {
        let mut ctx = Context::new();
        let one = ctx.int(1);
        let three = ctx.int(3);
        let third = ctx.quotient(one, three);
        let options = EvalOptions { decimal: true, precision: 3, ..Default::default() };
        assert_eq!(eval_string(&mut ctx, third, &options), "0.333");

        let two = ctx.int(-2);
        let three = ctx.int(3);
        let q = ctx.quotient(two, three);
        let options = EvalOptions { decimal: true, precision: 2, ..Default::default() };
        assert_eq!(eval_string(&mut ctx, q, &options), "-0.67");

        let two = ctx.int(2);
        let root = ctx.radical(two);
        let options = EvalOptions { decimal: true, precision: 5, ..Default::default() };
        assert_eq!(eval_string(&mut ctx, root, &options), "1.41421");
    }

    #[test]
    fn target_units() {
        let mut ctx = Context::new();
        let length = measure(&mut ctx, 1500, "m");
        let km = Unit::parse(&mut ctx, "km").unwrap();
        let options = EvalOptions { unit: Some(km.clone()), ..Default::default() };
        assert_eq!(eval_string(&mut ctx, length, &options), "{3/2} km");

        let options = EvalOptions { unit: Some(km), decimal: true, ..Default::default() };
        assert_eq!(eval_string(&mut ctx, length, &options), "1.5 km");

        let volume = measure(&mut ctx, 1000, "cm^3");
        let liter = Unit::parse(&mut ctx, "L").unwrap();
        let options = EvalOptions { unit: Some(liter), ..Default::default() };
        assert_eq!(eval_string(&mut ctx, volume, &options), "1 L");

        let mass = measure(&mut ctx, 3, "g");
        let meter = Unit::parse(&mut ctx, "m").unwrap();
        let options = EvalOptions { unit: Some(meter), ..Default::default() };
        let err = ctx.eval(mass, &options).unwrap_err();
        let mismatch = err.downcast_ref::<IncompatibleUnit>().unwrap();
        assert_eq!(mismatch.unit, "g");
        assert_eq!(mismatch.target, "m");
    }

    #[test]
    fn preserving_minimum() {
        let mut ctx = Context::new();
        let two = ctx.int(2);
        let four = ctx.int(4);
        let half = ctx.quotient(two, four);
        let three = ctx.int(3);
        let four = ctx.int(4);
        let three_quarters = ctx.quotient(three, four);
        let min = ctx.binary(Kind::MinPreserve, half, three_quarters);
        assert_eq!(eval_string(&mut ctx, min, &EvalOptions::default()), "2/4");

        let two = ctx.int(2);
        let four = ctx.int(4);
        let half = ctx.quotient(two, four);
        let three = ctx.int(3);
        let four = ctx.int(4);
        let three_quarters = ctx.quotient(three, four);
        let min = ctx.binary(Kind::Min, half, three_quarters);
        assert_eq!(eval_string(&mut ctx, min, &EvalOptions::default()), "1/2");
    }
}
