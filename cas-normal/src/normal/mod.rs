//! The normal form of an expression.
//!
//! A [`Normal`] is a fraction `n / d` of two canonical sums, with an optional unit. Each node
//! kind has a rule (see [`rules`]) that builds its normal form out of the normal forms of its
//! children. Two expressions are equivalent if their normal forms compare equal with
//! [`Normal::compare`].
//!
//! A normal form is canonicalized every time it is built:
//!
//! - a zero numerator leaves `0 / 1`;
//! - a single-term denominator is inverted into the numerator, so `x / (2y)` is held as
//!   `1/2 · x · y^-1`;
//! - otherwise, the leading coefficient of the denominator is scaled to 1, and a numerator that
//!   is a constant multiple of the denominator collapses to that constant.
//!
//! Values carrying a unit are held in the base unit of each quantity, so `3 km` is `3000` with
//! the unit `m`. The unit itself is a normal form of base unit symbols, with coefficient 1.

pub mod nlist;
pub mod rules;

use cas_error::Error;
use crate::{
    compare::CanonicalOrd,
    error::{DivisionByZero, UnitMismatch},
    expr::{Context, ExprId, Kind, ProductKind},
    fraction::{Fraction, Sign},
    unit::{self, Unit},
};
use nlist::{normalize_term, Base, Coef, NProduct, NSum, Renderer};
use std::cmp::Ordering;
use tracing::{trace, warn};

/// The most sums raised to a negative power that are cleared when building a normal form.
const MAX_CLEARED_SUMS: usize = 16;

/// The canonical fraction `n / d` of an expression, with its unit.
#[derive(Clone, Debug)]
pub struct Normal {
    n: NSum,
    d: NSum,
    unit: Option<Box<Normal>>,
}

impl Normal {
    /// The normal form of zero.
    pub fn zero() -> Self {
        Self::from_fraction(Fraction::zero())
    }

    /// The normal form of one.
    pub fn one() -> Self {
        Self::from_fraction(Fraction::one())
    }

    /// The normal form of an exact number.
    pub fn from_fraction(value: Fraction) -> Self {
        Self { n: NSum::constant(value.reduce()), d: NSum::one(), unit: None }
    }

    /// The normal form of an opaque base: `1 · base`.
    pub fn from_base(base: ExprId) -> Self {
        let product = NProduct::base(Base::Expr(base));
        Self { n: NSum::term(Coef::one(), product), d: NSum::one(), unit: None }
    }

    /// The normal form of a sum, without denominator.
    pub fn from_sum(n: NSum) -> Self {
        Self { n, d: NSum::one(), unit: None }
    }

    /// Builds the canonical normal form of `n / d` measured in `unit`.
    ///
    /// Returns a [`DivisionByZero`] error if `d` is zero.
    pub fn new(
        ctx: &mut Context,
        mut n: NSum,
        mut d: NSum,
        unit: Option<Normal>,
    ) -> Result<Self, Error> {
        if d.is_zero() {
            return Err(Error::new(Vec::new(), DivisionByZero));
        }
        let unit = unit.filter(|u| !u.n.is_one()).map(Box::new);
        if n.is_zero() {
            return Ok(Self { n, d: NSum::one(), unit });
        }

        // sums raised to a negative integer power, such as (x+1)^-1, move to the other side
        let mut cleared = 0;
        while let Some(factor) = negative_sum_power(&n).or_else(|| negative_sum_power(&d)) {
            if cleared == MAX_CLEARED_SUMS {
                warn!(cleared, "sums raised to a negative power are left in the normal form");
                break;
            }
            n = n.mult(ctx, &factor);
            d = d.mult(ctx, &factor);
            cleared += 1;
        }

        if d.is_monomial() {
            if let Some(inverse) = invert_monomial(&d) {
                n = n.mult(ctx, &inverse);
                d = NSum::one();
            }
        } else if let Some(lead) = d.leading_coef().cloned() {
            if let Some(scale) = lead.invert() {
                if !lead.is_one() {
                    n = n.scale(&scale);
                    d = d.scale(&scale);
                }
            }

            // n = k · d
            if n.len() == d.len() {
                let k = match (n.leading_coef(), d.leading_coef()) {
                    (Some(a), Some(b)) => a.checked_div(b),
                    _ => None,
                };
                if let Some(k) = k {
                    if n.sub(ctx, &d.scale(&k)).is_zero() {
                        n = NSum::constant(k);
                        d = NSum::one();
                    }
                }
            }
        }

        Ok(Self { n, d, unit })
    }

    /// Returns the numerator.
    pub fn numerator(&self) -> &NSum {
        &self.n
    }

    /// Returns the denominator.
    pub fn denominator(&self) -> &NSum {
        &self.d
    }

    /// Returns the unit, as a normal form of base units.
    pub fn unit(&self) -> Option<&Normal> {
        self.unit.as_deref()
    }

    /// Returns this normal form measured in another unit, without converting the value.
    pub fn with_unit(mut self, unit: Option<Normal>) -> Self {
        self.unit = unit.filter(|u| !u.n.is_one()).map(Box::new);
        self
    }

    /// Returns this normal form without its unit.
    pub fn without_unit(&self) -> Self {
        Self { n: self.n.clone(), d: self.d.clone(), unit: None }
    }

    pub fn is_zero(&self) -> bool {
        self.n.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.n.is_one() && self.d.is_one() && self.unit.is_none()
    }

    /// Returns the exact value, if this normal form is a rational number.
    pub fn to_fraction(&self) -> Option<Fraction> {
        let n = self.n.to_fraction()?;
        let d = self.d.to_fraction()?;
        n.checked_div(&d)
    }

    /// Returns the value reduced to lowest terms, if this normal form is a rational number.
    pub fn reduce(&self) -> Option<Fraction> {
        self.to_fraction().map(|f| f.reduce())
    }

    /// Returns true if the value does not depend on any symbol other than the constants.
    pub fn is_numeric(&self, ctx: &Context) -> bool {
        sum_is_numeric(ctx, &self.n) && sum_is_numeric(ctx, &self.d)
    }

    pub fn add(&self, ctx: &mut Context, other: &Normal) -> Result<Self, Error> {
        let other = self.align_unit(ctx, other)?;
        let unit = self.unit().cloned();
        if self.d.is_one() && other.d.is_one() {
            let n = self.n.add(ctx, &other.n);
            return Normal::new(ctx, n, NSum::one(), unit);
        }
        let left = self.n.mult(ctx, &other.d);
        let right = other.n.mult(ctx, &self.d);
        let n = left.add(ctx, &right);
        let d = self.d.mult(ctx, &other.d);
        Normal::new(ctx, n, d, unit)
    }

    pub fn sub(&self, ctx: &mut Context, other: &Normal) -> Result<Self, Error> {
        self.add(ctx, &other.oppose())
    }

    pub fn mult(&self, ctx: &mut Context, other: &Normal) -> Result<Self, Error> {
        let unit = match (self.unit(), other.unit()) {
            (Some(a), Some(b)) => Some(a.mult(ctx, b)?),
            (Some(u), None) | (None, Some(u)) => Some(u.clone()),
            (None, None) => None,
        };
        let n = self.n.mult(ctx, &other.n);
        let d = self.d.mult(ctx, &other.d);
        Normal::new(ctx, n, d, unit)
    }

    pub fn div(&self, ctx: &mut Context, other: &Normal) -> Result<Self, Error> {
        let inverse = other.invert(ctx)?;
        self.mult(ctx, &inverse)
    }

    /// Returns the opposite value. The opposite of zero is zero.
    pub fn oppose(&self) -> Self {
        Self { n: self.n.oppose(), d: self.d.clone(), unit: self.unit.clone() }
    }

    /// Returns the reciprocal, or a [`DivisionByZero`] error if the value is zero.
    pub fn invert(&self, ctx: &mut Context) -> Result<Self, Error> {
        let unit = match self.unit() {
            Some(u) => Some(u.invert(ctx)?),
            None => None,
        };
        Normal::new(ctx, self.d.clone(), self.n.clone(), unit)
    }

    /// Multiplies the value by an exact factor, keeping the unit.
    pub fn scale(&self, factor: &Fraction) -> Self {
        Self { n: self.n.scale(factor), d: self.d.clone(), unit: self.unit.clone() }
    }

    /// Raises the value to the given power.
    ///
    /// - Integer exponents are computed by repeated multiplication, with `0^0 = 1`.
    /// - Fractional exponents distribute over a single-term value, reducing radicals of
    ///   integers. An odd root of a negative value is negative, and an even root of a negative
    ///   value is kept as an opaque power.
    /// - A sum with a fractional exponent, or any base with an algebraic exponent, becomes a
    ///   power base.
    pub fn pow(&self, ctx: &mut Context, exponent: &Normal) -> Result<Self, Error> {
        match exponent.to_fraction() {
            Some(q) if q.is_integer() => match q.to_i64() {
                Some(k) => self.pow_int(ctx, k),
                None => self.opaque_pow(ctx, exponent),
            },
            Some(q) => self.pow_frac(ctx, &q, exponent),
            None => self.pow_symbolic(ctx, exponent),
        }
    }

    fn pow_int(&self, ctx: &mut Context, k: i64) -> Result<Self, Error> {
        if k == 0 {
            return Ok(Normal::one());
        }
        if k < 0 {
            return self.invert(ctx)?.pow_int(ctx, -k);
        }

        let Ok(k32) = u32::try_from(k) else {
            let exponent = Normal::from_fraction(Fraction::from(k));
            return self.opaque_pow(ctx, &exponent);
        };
        let unit = match self.unit() {
            Some(u) => Some(u.pow_int(ctx, k)?),
            None => None,
        };
        let n = self.n.pow_int(ctx, k32);
        let d = self.d.pow_int(ctx, k32);
        Normal::new(ctx, n, d, unit)
    }

    fn pow_frac(&self, ctx: &mut Context, q: &Fraction, exponent: &Normal) -> Result<Self, Error> {
        if self.is_zero() {
            return if q.is_negative() {
                Err(Error::new(Vec::new(), DivisionByZero))
            } else {
                Ok(Normal::zero())
            };
        }

        let numerator = root(ctx, &self.n, q);
        let denominator = root(ctx, &self.d, &-q);
        let (Some(numerator), Some(denominator)) = (numerator, denominator) else {
            return self.opaque_pow(ctx, exponent);
        };
        let unit = match self.unit() {
            Some(u) => Some(u.pow_frac(ctx, q, exponent)?),
            None => None,
        };
        let n = numerator.mult(ctx, &denominator);
        Normal::new(ctx, n, NSum::one(), unit)
    }

    fn pow_symbolic(&self, ctx: &mut Context, exponent: &Normal) -> Result<Self, Error> {
        if !exponent.d.is_one() || !self.d.is_one() || self.unit.is_some() {
            return self.opaque_pow(ctx, exponent);
        }

        let e = Coef::from_sum(exponent.n.clone());
        let term = match self.n.items() {
            [(Coef::Frac(c), product)] if !c.is_negative() => {
                let mut product = product.pow(ctx, &e);
                if *c.numerator() != 1 {
                    let n = ctx.int(c.numerator().clone());
                    product.insert(ctx, e.clone(), Base::Expr(n));
                }
                if *c.denominator() != 1 {
                    let d = ctx.int(c.denominator().clone());
                    product.insert(ctx, e.neg(), Base::Expr(d));
                }
                normalize_term(ctx, Coef::one(), product)
            },
            [_] => return self.opaque_pow(ctx, exponent),
            _ => {
                let mut product = NProduct::one();
                product.insert(ctx, e, Base::Sum(self.n.clone()));
                NSum::term(Coef::one(), product)
            },
        };
        Normal::new(ctx, term, NSum::one(), None)
    }

    /// Keeps `self^exponent` as an opaque power base.
    fn opaque_pow(&self, ctx: &mut Context, exponent: &Normal) -> Result<Self, Error> {
        let base = self.without_unit().to_node(ctx);
        let base = ctx.bracket(base);
        let exp = exponent.without_unit().to_node(ctx);
        let exp = ctx.bracket(exp);
        let power = ctx.power(base, exp);
        Ok(Normal::from_base(power))
    }

    /// Compares the values of both normal forms by cross-multiplication. Values measured in
    /// convertible units are compared in the unit of `self`.
    ///
    /// Values with incompatible units are not an error here: they keep their own units, and the
    /// units break the tie, so they never compare equal. Use [`Normal::sub`] to get a
    /// [`UnitMismatch`] instead.
    pub fn compare(&self, ctx: &mut Context, other: &Normal) -> Ordering {
        let other = match self.align_unit(ctx, other) {
            Ok(other) => other,
            Err(err) => {
                trace!(?err, "comparing values with incompatible units");
                other.clone()
            },
        };
        let left = self.n.mult(ctx, &other.d);
        let right = other.n.mult(ctx, &self.d);
        left.canonical_cmp(&right, ctx)
            .then_with(|| cmp_unit(ctx, self.unit(), other.unit()))
    }

    /// Compares the lists of both normal forms without cross-multiplying.
    pub fn structural_cmp(&self, other: &Normal, ctx: &Context) -> Ordering {
        self.n.canonical_cmp(&other.n, ctx)
            .then_with(|| self.d.canonical_cmp(&other.d, ctx))
            .then_with(|| cmp_unit(ctx, self.unit(), other.unit()))
    }

    /// Returns `other` expressed in the unit of `self`, or a [`UnitMismatch`] error if the units
    /// are not convertible.
    fn align_unit(&self, ctx: &mut Context, other: &Normal) -> Result<Normal, Error> {
        match (self.unit(), other.unit()) {
            (None, None) => Ok(other.clone()),
            (Some(a), Some(b)) if a.structural_cmp(b, ctx).is_eq() => Ok(other.clone()),
            (Some(a), Some(b)) if unit::convertible(ctx, b, a) => {
                let factor = unit::factor(ctx, b, a);
                Ok(other.scale(&factor).with_unit(Some(a.clone())))
            },
            (a, b) => {
                let left = unit_string(ctx, a);
                let right = unit_string(ctx, b);
                Err(Error::new(Vec::new(), UnitMismatch { left, right }))
            },
        }
    }

    /// Returns true if the units of both normal forms measure the same quantity.
    pub fn is_convertible_to(&self, ctx: &Context, other: &Normal) -> bool {
        match (self.unit(), other.unit()) {
            (None, None) => true,
            (Some(a), Some(b)) => unit::convertible(ctx, a, b),
            _ => false,
        }
    }

    /// Returns the factor that converts a value in the unit of `self` to the unit of `other`.
    pub fn coef_to(&self, ctx: &mut Context, other: &Normal) -> Result<Fraction, Error> {
        match (self.unit(), other.unit()) {
            (None, None) => Ok(Fraction::one()),
            (Some(a), Some(b)) if unit::convertible(ctx, a, b) => Ok(unit::factor(ctx, a, b)),
            (a, b) => {
                let left = unit_string(ctx, a);
                let right = unit_string(ctx, b);
                Err(Error::new(Vec::new(), UnitMismatch { left, right }))
            },
        }
    }

    /// Renders the normal form as an expression.
    pub fn to_node(&self, ctx: &mut Context) -> ExprId {
        let renderer = Renderer { product: ProductKind::Explicit };
        let node = if self.d.is_one() {
            renderer.sum(ctx, &self.n)
        } else {
            let n = renderer.sum(ctx, &self.n);
            let n = bracket_operand(ctx, n);
            let d = renderer.sum(ctx, &self.d);
            let d = bracket_operand(ctx, d);
            ctx.quotient(n, d)
        };

        match self.unit() {
            Some(u) => {
                let unit = Unit::from_normal(ctx, u.clone());
                ctx.with_unit(node, unit)
            },
            None => node,
        }
    }

    /// Returns the canonical text of the normal form.
    pub fn string(&self, ctx: &mut Context) -> String {
        let node = self.to_node(ctx);
        ctx.display(node).to_string()
    }
}

/// Returns the factor that clears the first sum raised to a negative integer power.
fn negative_sum_power(sum: &NSum) -> Option<NSum> {
    sum.items().iter().find_map(|(_, product)| {
        product.items().iter().find_map(|(exponent, base)| match (exponent, base) {
            (Coef::Frac(e), Base::Sum(s)) if e.is_integer() && e.is_negative() => {
                let k = e.to_i64()?.checked_neg()?;
                let factor = NProduct::single(Coef::Frac(Fraction::from(k)), Base::Sum(s.clone()));
                Some(NSum::term(Coef::one(), factor))
            },
            _ => None,
        })
    })
}

/// Returns `1 / (c · p)` for a single-term sum `c · p` with an exact coefficient.
fn invert_monomial(sum: &NSum) -> Option<NSum> {
    let [(Coef::Frac(c), product)] = sum.items() else {
        return None;
    };
    Some(NSum::term(Coef::Frac(c.invert()?), product.invert()))
}

/// Returns `sum^q` for a fractional `q`, or [`None`] if it must stay an opaque power.
fn root(ctx: &mut Context, sum: &NSum, q: &Fraction) -> Option<NSum> {
    if sum.is_one() {
        return Some(NSum::one());
    }

    match sum.items() {
        [(Coef::Frac(c), product)] => {
            let odd_root = q.denominator().is_odd();
            let sign = match c.sign() {
                Sign::Negative if !odd_root => return None,
                Sign::Negative if q.numerator().is_odd() => Fraction::from(-1),
                _ => Fraction::one(),
            };
            let exponent = Coef::Frac(q.clone());
            let mut product = product.pow(ctx, &exponent);
            if *c.numerator() != 1 {
                let n = ctx.int(c.numerator().clone());
                product.insert(ctx, exponent.clone(), Base::Expr(n));
            }
            if *c.denominator() != 1 {
                let d = ctx.int(c.denominator().clone());
                product.insert(ctx, exponent.neg(), Base::Expr(d));
            }
            Some(normalize_term(ctx, Coef::Frac(sign), product))
        },
        [(Coef::Sum(_), _)] => None,
        _ => {
            let mut product = NProduct::one();
            product.insert(ctx, Coef::Frac(q.clone()), Base::Sum(sum.clone()));
            Some(NSum::term(Coef::one(), product))
        },
    }
}

fn sum_is_numeric(ctx: &Context, sum: &NSum) -> bool {
    sum.items().iter().all(|(coef, product)| {
        let coef_numeric = match coef {
            Coef::Frac(_) => true,
            Coef::Sum(s) => sum_is_numeric(ctx, s),
        };
        coef_numeric && product.items().iter().all(|(exponent, base)| {
            let exponent_numeric = match exponent {
                Coef::Frac(_) => true,
                Coef::Sum(s) => sum_is_numeric(ctx, s),
            };
            let base_numeric = match base {
                Base::Expr(id) => ctx.is_numeric(*id),
                Base::Sum(s) => sum_is_numeric(ctx, s),
            };
            exponent_numeric && base_numeric
        })
    })
}

fn cmp_unit(ctx: &Context, a: Option<&Normal>, b: Option<&Normal>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.structural_cmp(b, ctx),
    }
}

/// Displays a unit normal form, or `none` without a unit.
pub(crate) fn unit_string(ctx: &mut Context, unit: Option<&Normal>) -> String {
    match unit {
        Some(u) => Unit::from_normal(ctx, u.clone()).string(ctx),
        None => "none".to_string(),
    }
}

/// Brackets the numerator or denominator of a quotient if it is a sum or a sign.
fn bracket_operand(ctx: &mut Context, id: ExprId) -> ExprId {
    match ctx.kind(id) {
        Kind::Sum | Kind::Difference | Kind::Opposite => ctx.bracket(id),
        _ => id,
    }
}

impl Context {
    /// Returns the normal form of the given node, computing it on first use.
    pub fn normal(&mut self, id: ExprId) -> Result<Normal, Error> {
        if let Some(normal) = self.memoized(id) {
            return Ok(normal.clone());
        }
        let normal = rules::normalize(self, id)?;
        self.memoize(id, normal.clone());
        Ok(normal)
    }

    /// Returns the expression of the normal form of the given node.
    pub fn normalize(&mut self, id: ExprId) -> Result<ExprId, Error> {
        let normal = self.normal(id)?;
        Ok(normal.to_node(self))
    }

    /// Returns the reduced value of the given node as an expression: `0`, an integer or a
    /// quotient, wrapped in an opposite when negative. Returns [`None`] if the node is not a
    /// rational number.
    pub fn reduce(&mut self, id: ExprId) -> Result<Option<ExprId>, Error> {
        let Some(value) = self.normal(id)?.reduce() else {
            return Ok(None);
        };
        let n = self.int(value.numerator().clone());
        let node = if value.is_integer() {
            n
        } else {
            let d = self.int(value.denominator().clone());
            self.quotient(n, d)
        };
        Ok(Some(if value.is_negative() { self.opposite(node) } else { node }))
    }

    /// Returns true if both expressions are mathematically equivalent.
    ///
    /// Equalities are symmetric: `a = b` is equivalent to `b = a`. An inequality is equivalent
    /// to its mirror: `a < b` is equivalent to `b > a`.
    pub fn equals(&mut self, a: ExprId, b: ExprId) -> Result<bool, Error> {
        match (self.kind(a).clone(), self.kind(b).clone()) {
            (Kind::Relation(r1), Kind::Relation(r2)) => {
                let (a1, b1) = (self.first(a), self.last(a));
                let (a2, b2) = (self.first(b), self.last(b));
                let same = r1 == r2 && self.equals(a1, a2)? && self.equals(b1, b2)?;
                if same {
                    return Ok(true);
                }
                let mirrored = r2 == r1.mirror();
                Ok(mirrored && self.equals(a1, b2)? && self.equals(b1, a2)?)
            },
            (Kind::Relations(ops1), Kind::Relations(ops2)) => {
                if ops1 != ops2 {
                    return Ok(false);
                }
                let children = self.children(a).iter()
                    .copied()
                    .zip(self.children(b).iter().copied())
                    .collect::<Vec<_>>();
                for (x, y) in children {
                    if !self.equals(x, y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            },
            (Kind::Relation(_) | Kind::Relations(_), _) | (_, Kind::Relation(_) | Kind::Relations(_)) => {
                Ok(false)
            },
            _ => {
                let left = self.normal(a)?;
                let right = self.normal(b)?;
                Ok(left.compare(self, &right).is_eq())
            },
        }
    }
}
