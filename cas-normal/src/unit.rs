//! Units attached to expressions and normal forms.
//!
//! A [`Unit`] pairs the expression it is written as (such as `km/h`) with its normal form: the
//! conversion coefficient to the base units times a product of base unit symbols. `km/h` is
//! `1/3600 · m · ms^-1`. Compound units are only built by parsing or by multiplying, dividing and
//! raising existing units, so the normal form of a unit always matches its expression.
//!
//! Two units are convertible if they have the same base units. Capacities are the exception:
//! `L^a` is treated as `(1/1000)^a · m^(3a)` when comparing units.

use cas_error::Error;
use cas_unit_convert::{Capacity, CompoundUnit, Convert, Length, Quantity};
use crate::{
    error::{IncompatibleUnit, UnknownUnit},
    expr::{Context, ExprId, Kind, ProductKind},
    fraction::Fraction,
    normal::{
        nlist::{Base, Coef, NProduct, NSum, Renderer},
        Normal,
    },
};
use levenshtein::levenshtein;
use std::collections::BTreeMap;
use tracing::debug;

/// A unit of measurement.
#[derive(Clone, Debug)]
pub struct Unit {
    expr: ExprId,
    normal: Normal,
}

/// Returns the units whose abbreviation is close to the given name, closest first.
fn suggestions(name: &str) -> Vec<&'static str> {
    let mut close = cas_unit_convert::Base::all_abbreviations()
        .map(|abbr| (levenshtein(name, abbr), abbr))
        .filter(|(distance, _)| *distance <= 2)
        .collect::<Vec<_>>();
    close.sort();
    close.into_iter().map(|(_, abbr)| abbr).take(3).collect()
}

impl Unit {
    /// Parses a unit such as `km`, `cm^3` or `kg.m/s^2`.
    ///
    /// Returns an [`UnknownUnit`] error if an abbreviation is not in the unit table.
    pub fn parse(ctx: &mut Context, s: &str) -> Result<Self, Error> {
        let compound: CompoundUnit = s.parse()
            .map_err(|err: cas_unit_convert::InvalidUnit| {
                let name = err.unit().to_owned();
                let suggestions = suggestions(&name);
                Error::new(Vec::new(), UnknownUnit { name, suggestions })
            })?;

        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        let mut coef = Fraction::one();
        let mut product = NProduct::one();
        for unit in compound.units() {
            let power = i64::from(unit.power());
            let factor = Fraction::from(&unit.base().conversion_factor());
            if let Some(factor) = factor.pow(power) {
                coef = &coef * &factor;
            }

            let base_symbol = ctx.symbol(unit.base().quantity().base_abbreviation());
            product.insert(ctx, Coef::Frac(Fraction::from(power)), Base::Expr(base_symbol));

            let symbol = ctx.symbol(unit.base().abbreviation());
            let factor = match power.abs() {
                1 => symbol,
                p => {
                    let p = ctx.int(p);
                    ctx.power(symbol, p)
                },
            };
            if power > 0 {
                numerator.push(factor);
            } else {
                denominator.push(factor);
            }
        }

        let join = |ctx: &mut Context, factors: Vec<ExprId>| {
            factors.into_iter().reduce(|acc, f| ctx.product_of(ProductKind::Point, acc, f))
        };
        let numerator = match join(ctx, numerator) {
            Some(id) => id,
            None => ctx.int(1),
        };
        let expr = match join(ctx, denominator) {
            Some(den) => ctx.quotient(numerator, den),
            None => numerator,
        };

        debug!(unit = s, %coef, "parsed unit");
        let normal = Normal::from_sum(NSum::term(Coef::Frac(coef), product));
        Ok(Self { expr, normal })
    }

    /// Builds the unit written as the given normal form of base units.
    pub fn from_normal(ctx: &mut Context, normal: Normal) -> Self {
        let expr = Renderer { product: ProductKind::Point }.sum(ctx, normal.numerator());
        Self { expr, normal }
    }

    /// Returns the expression of the unit.
    pub fn expr(&self) -> ExprId {
        self.expr
    }

    /// Returns the normal form of the unit, including its conversion coefficient.
    pub fn normal(&self) -> &Normal {
        &self.normal
    }

    /// Returns the conversion coefficient to the base units.
    pub fn coefficient(&self) -> Fraction {
        self.normal.numerator().leading_coef().cloned().unwrap_or_else(Fraction::one)
    }

    /// Returns the normal form of the base units, with coefficient 1.
    pub fn base_normal(&self) -> Normal {
        let product = self.normal.numerator()
            .items()
            .first()
            .map(|(_, product)| product.clone())
            .unwrap_or_default();
        Normal::from_sum(NSum::term(Coef::one(), product))
    }

    /// Returns the normal form of one of this unit: its coefficient, measured in its base units.
    pub fn value(&self) -> Normal {
        Normal::from_fraction(self.coefficient()).with_unit(Some(self.base_normal()))
    }

    pub fn mult(&self, ctx: &mut Context, other: &Unit) -> Result<Self, Error> {
        let normal = self.normal.mult(ctx, &other.normal)?;
        let expr = ctx.product_of(ProductKind::Point, self.expr, other.expr);
        Ok(Self { expr, normal })
    }

    pub fn div(&self, ctx: &mut Context, other: &Unit) -> Result<Self, Error> {
        let normal = self.normal.div(ctx, &other.normal)?;
        let expr = ctx.quotient(self.expr, other.expr);
        Ok(Self { expr, normal })
    }

    pub fn pow(&self, ctx: &mut Context, exponent: i64) -> Result<Self, Error> {
        let e = Normal::from_fraction(Fraction::from(exponent));
        let normal = self.normal.pow(ctx, &e)?;
        let base = match ctx.kind(self.expr) {
            Kind::Symbol(_) => self.expr,
            _ => ctx.bracket(self.expr),
        };
        let e = ctx.int(exponent);
        let expr = ctx.power(base, e);
        Ok(Self { expr, normal })
    }

    /// Returns the quantity measured by this unit, if it is a power-one unit of a quantity.
    pub fn quantity(&self, ctx: &Context) -> Option<Quantity> {
        let (_, dims) = dimensions(ctx, &self.normal, false);
        match dims.into_iter().collect::<Vec<_>>().as_slice() {
            [(abbr, 1)] => Quantity::from_base_abbreviation(abbr),
            _ => None,
        }
    }

    /// Returns true if this unit measures a volume: a capacity or a length cubed.
    pub fn is_volume(&self, ctx: &Context) -> bool {
        self.is_capacity(ctx) || self.is_metrical_volume(ctx)
    }

    /// Returns true if this unit is a length cubed, such as `cm^3`.
    pub fn is_metrical_volume(&self, ctx: &Context) -> bool {
        let (_, dims) = dimensions(ctx, &self.normal, false);
        dims.len() == 1 && dims.get(Length::BASE.abbreviation()) == Some(&3)
    }

    pub fn is_capacity(&self, ctx: &Context) -> bool {
        self.quantity(ctx) == Some(Quantity::Capacity)
    }

    pub fn is_length(&self, ctx: &Context) -> bool {
        self.quantity(ctx) == Some(Quantity::Length)
    }

    pub fn is_mass(&self, ctx: &Context) -> bool {
        self.quantity(ctx) == Some(Quantity::Mass)
    }

    pub fn is_duration(&self, ctx: &Context) -> bool {
        self.quantity(ctx) == Some(Quantity::Duration)
    }

    pub fn is_currency(&self, ctx: &Context) -> bool {
        self.quantity(ctx) == Some(Quantity::Currency)
    }

    /// Returns true if both units measure the same quantity.
    pub fn is_convertible_to(&self, ctx: &Context, other: &Unit) -> bool {
        convertible(ctx, &self.normal, &other.normal)
    }

    /// Alias of [`Unit::is_convertible_to`].
    pub fn is_same_quantity_type(&self, ctx: &Context, other: &Unit) -> bool {
        self.is_convertible_to(ctx, other)
    }

    /// Returns the factor `k` such that `1 self = k other`.
    ///
    /// Returns an [`IncompatibleUnit`] error if the units do not measure the same quantity.
    pub fn coef_to(&self, ctx: &Context, other: &Unit) -> Result<Fraction, Error> {
        if !self.is_convertible_to(ctx, other) {
            return Err(Error::new(Vec::new(), IncompatibleUnit {
                unit: self.string(ctx),
                target: other.string(ctx),
            }));
        }
        Ok(factor(ctx, &self.normal, &other.normal))
    }

    /// Returns the text of the unit.
    pub fn string(&self, ctx: &Context) -> String {
        ctx.display_unit(self.expr).to_string()
    }
}

/// Returns the coefficient of a unit normal form and the power of each base unit in it.
///
/// With `metric` set, capacities are rewritten as cubic meters and the coefficient is adjusted.
fn dimensions(ctx: &Context, normal: &Normal, metric: bool) -> (Fraction, BTreeMap<String, i64>) {
    let mut coef = Fraction::one();
    let mut dims = BTreeMap::new();
    let Some((c, product)) = normal.numerator().items().first() else {
        return (coef, dims);
    };
    if let Coef::Frac(c) = c {
        coef = c.clone();
    }

    let liter = Capacity::BASE.abbreviation();
    let meter = Length::BASE.abbreviation();
    for (exponent, base) in product.items() {
        let (Coef::Frac(e), Base::Expr(id)) = (exponent, base) else {
            continue;
        };
        let (Kind::Symbol(name), Some(e)) = (ctx.kind(*id), e.to_i64()) else {
            continue;
        };
        if metric && name == liter {
            let to_cubic = Capacity::BASE.conversion_factor_to(Length::BASE.cubed())
                .expect("the unit table converts capacities to cubic lengths");
            let to_cubic = Fraction::from(&to_cubic);
            if let Some(adjust) = to_cubic.pow(e) {
                coef = &coef * &adjust;
            }
            *dims.entry(meter.to_owned()).or_insert(0) += 3 * e;
        } else {
            *dims.entry(name.clone()).or_insert(0) += e;
        }
    }
    dims.retain(|_, e| *e != 0);
    (coef, dims)
}

/// Returns true if both unit normal forms measure the same quantity.
pub(crate) fn convertible(ctx: &Context, from: &Normal, to: &Normal) -> bool {
    dimensions(ctx, from, true).1 == dimensions(ctx, to, true).1
}

/// Returns the factor that converts a value measured in `from` to `to`. Both must be
/// [`convertible`].
///
/// # Panics
///
/// Panics if the coefficient of `to` is zero, which no unit of the table has.
pub(crate) fn factor(ctx: &Context, from: &Normal, to: &Normal) -> Fraction {
    let (a, _) = dimensions(ctx, from, true);
    let (b, _) = dimensions(ctx, to, true);
    let factor = a.checked_div(&b).expect("unit coefficients are never zero");
    debug!(%factor, "unit conversion factor");
    factor
}

#[cfg(test)]
mod tests {
    use crate::error::UnknownUnit;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn parse_units() {
        let mut ctx = Context::new();
        let km = Unit::parse(&mut ctx, "km").unwrap();
        assert_eq!(km.coefficient(), Fraction::from(1000));
        assert!(km.is_length(&ctx));
        assert_eq!(km.string(&ctx), "km");

        let speed = Unit::parse(&mut ctx, "km/h").unwrap();
        assert_eq!(speed.coefficient(), Fraction::new(1, 3600));
        assert_eq!(speed.string(&ctx), "km/h");
        assert_eq!(speed.quantity(&ctx), None);
    }

    #[test]
    fn unknown_unit_suggests_close_names() {
        let mut ctx = Context::new();
        let err = Unit::parse(&mut ctx, "kmm").unwrap_err();
        let unknown = err.downcast_ref::<UnknownUnit>().unwrap();
        assert_eq!(unknown.name, "kmm");
        assert!(unknown.suggestions.contains(&"km"));
    }

    #[test]
    fn liters_are_cubic_lengths() {
        let mut ctx = Context::new();
        let liter = Unit::parse(&mut ctx, "L").unwrap();
        let cubic_cm = Unit::parse(&mut ctx, "cm^3").unwrap();
        assert!(liter.is_capacity(&ctx));
        assert!(cubic_cm.is_metrical_volume(&ctx));
        assert!(liter.is_volume(&ctx) && cubic_cm.is_volume(&ctx));
        assert!(liter.is_convertible_to(&ctx, &cubic_cm));
        assert_eq!(liter.coef_to(&ctx, &cubic_cm).unwrap(), Fraction::from(1000));
        assert_eq!(cubic_cm.coef_to(&ctx, &liter).unwrap(), Fraction::new(1, 1000));
    }

    #[test]
    fn capacity_powers_convert() {
        let mut ctx = Context::new();
        let pairs = [("mL", "cm^3", Fraction::from(1)), ("L^-1", "m^-3", Fraction::from(1000))];
        for (from, to, expected) in pairs {
            let from = Unit::parse(&mut ctx, from).unwrap();
            let to = Unit::parse(&mut ctx, to).unwrap();
            assert_eq!(from.coef_to(&ctx, &to).unwrap(), expected);
        }

        let per_liter = Unit::parse(&mut ctx, "km/L").unwrap();
        let inverse_area = Unit::parse(&mut ctx, "m^-2").unwrap();
        assert_eq!(per_liter.coef_to(&ctx, &inverse_area).unwrap(), Fraction::from(1000000));
    }

    #[test]
    fn durations() {
        let mut ctx = Context::new();
        let hour = Unit::parse(&mut ctx, "h").unwrap();
        let minute = Unit::parse(&mut ctx, "min").unwrap();
        assert!(hour.is_duration(&ctx));
        assert_eq!(hour.coef_to(&ctx, &minute).unwrap(), Fraction::from(60));
    }

    #[test]
    fn unrelated_quantities() {
        let mut ctx = Context::new();
        let meter = Unit::parse(&mut ctx, "m").unwrap();
        let gram = Unit::parse(&mut ctx, "g").unwrap();
        assert!(!meter.is_convertible_to(&ctx, &gram));
        assert!(meter.coef_to(&ctx, &gram).is_err());
    }

    #[test]
    fn unit_arithmetic() {
        let mut ctx = Context::new();
        let meter = Unit::parse(&mut ctx, "m").unwrap();
        let second = Unit::parse(&mut ctx, "s").unwrap();
        let speed = meter.div(&mut ctx, &second).unwrap();
        assert_eq!(speed.coefficient(), Fraction::new(1, 1000));
        assert_eq!(speed.string(&ctx), "m/s");

        let area = meter.pow(&mut ctx, 2).unwrap();
        let square_cm = Unit::parse(&mut ctx, "cm^2").unwrap();
        assert_eq!(square_cm.coef_to(&ctx, &area).unwrap(), Fraction::new(1, 10000));
    }
}
