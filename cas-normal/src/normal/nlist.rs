//! Canonical lists: sorted sums of terms and sorted products of powers.
//!
//! A [`NSum`] is a list of `(coefficient, product)` pairs representing `Σ coefficient·product`,
//! and a [`NProduct`] is a list of `(exponent, base)` pairs representing `Π base^exponent`. Both
//! are kept sorted by [`CanonicalOrd`], without two items sharing a base and without zero
//! coefficients. The empty sum is zero and the empty product is one.

use crate::{
    compare::CanonicalOrd,
    expr::{Context, ExprId, Kind, ProductKind},
    fraction::{prime_factorization, Fraction, Sign},
};
use rug::Integer;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// A coefficient of a sum, or an exponent of a product.
#[derive(Clone, Debug)]
pub enum Coef {
    /// An exact number.
    Frac(Fraction),

    /// An algebraic value, such as the `n` in `x^n`. It never holds a constant.
    Sum(NSum),
}

impl Coef {
    pub fn zero() -> Self {
        Coef::Frac(Fraction::zero())
    }

    pub fn one() -> Self {
        Coef::Frac(Fraction::one())
    }

    /// Wraps a sum, collapsing it to an exact number if it is constant.
    pub fn from_sum(sum: NSum) -> Self {
        match sum.to_fraction() {
            Some(frac) => Coef::Frac(frac),
            None => Coef::Sum(sum),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Coef::Frac(f) if f.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Coef::Frac(f) if f.is_one())
    }

    /// Returns the exact value of the coefficient, if it is a number.
    pub fn as_frac(&self) -> Option<&Fraction> {
        match self {
            Coef::Frac(f) => Some(f),
            Coef::Sum(_) => None,
        }
    }

    fn to_sum(&self) -> NSum {
        match self {
            Coef::Frac(f) => NSum::constant(f.clone()),
            Coef::Sum(s) => s.clone(),
        }
    }

    pub fn add(&self, other: &Self, ctx: &Context) -> Self {
        match (self, other) {
            (Coef::Frac(a), Coef::Frac(b)) => Coef::Frac(a + b),
            _ => Coef::from_sum(self.to_sum().merge(ctx, &other.to_sum())),
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            Coef::Frac(f) => Coef::Frac(-f),
            Coef::Sum(s) => Coef::Sum(s.oppose()),
        }
    }

    pub fn mul(&self, other: &Self, ctx: &mut Context) -> Self {
        match (self, other) {
            (Coef::Frac(a), Coef::Frac(b)) => Coef::Frac(a * b),
            (Coef::Frac(f), Coef::Sum(s)) | (Coef::Sum(s), Coef::Frac(f)) => {
                Coef::from_sum(s.scale(f))
            },
            (Coef::Sum(a), Coef::Sum(b)) => Coef::from_sum(a.mult(ctx, b)),
        }
    }
}

/// The base of a power in a product.
#[derive(Clone, Debug)]
pub enum Base {
    /// An opaque expression, such as a symbol, a prime or `cos(x)`.
    Expr(ExprId),

    /// A sum that cannot be expanded, such as the base of `(x+1)^(1/2)`.
    Sum(NSum),
}

/// A sorted list of `(coefficient, item)` pairs.
#[derive(Clone, Debug)]
pub struct Nlist<T> {
    items: Vec<(Coef, T)>,
}

/// A sum of products.
pub type NSum = Nlist<NProduct>;

/// A product of powers.
pub type NProduct = Nlist<Base>;

impl<T> Default for Nlist<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Nlist<T> {
    /// Returns the items, sorted by item.
    pub fn items(&self) -> &[(Coef, T)] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: CanonicalOrd + Clone> Nlist<T> {
    /// The list holding a single item, or the empty list if `coef` is zero.
    pub fn single(coef: Coef, item: T) -> Self {
        if coef.is_zero() {
            Self::default()
        } else {
            Self { items: vec![(coef, item)] }
        }
    }

    /// Adds `coef` to the coefficient of `item`, inserting it at its sorted position if it is
    /// new. An item whose coefficient becomes zero is removed.
    pub fn insert(&mut self, ctx: &Context, coef: Coef, item: T) {
        match self.items.binary_search_by(|(_, existing)| existing.canonical_cmp(&item, ctx)) {
            Ok(index) => {
                let sum = self.items[index].0.add(&coef, ctx);
                if sum.is_zero() {
                    self.items.remove(index);
                } else {
                    self.items[index].0 = sum;
                }
            },
            Err(index) => {
                if !coef.is_zero() {
                    self.items.insert(index, (coef, item));
                }
            },
        }
    }

    /// Returns the union of both lists, adding the coefficients of shared items.
    pub fn merge(&self, ctx: &Context, other: &Self) -> Self {
        trace!(left = self.len(), right = other.len(), "merging lists");
        let mut merged = self.clone();
        for (coef, item) in &other.items {
            merged.insert(ctx, coef.clone(), item.clone());
        }
        merged
    }

    /// Negates every coefficient.
    pub fn oppose(&self) -> Self {
        Self {
            items: self.items.iter()
                .map(|(coef, item)| (coef.neg(), item.clone()))
                .collect(),
        }
    }
}

impl NProduct {
    /// The empty product.
    pub fn one() -> Self {
        Self::default()
    }

    /// The product holding the single base with exponent one.
    pub fn base(base: Base) -> Self {
        Self::single(Coef::one(), base)
    }

    pub fn is_one(&self) -> bool {
        self.is_empty()
    }

    /// Negates every exponent.
    pub fn invert(&self) -> Self {
        self.oppose()
    }

    /// Multiplies every exponent by `exponent`.
    pub fn pow(&self, ctx: &mut Context, exponent: &Coef) -> Self {
        let mut items = Vec::with_capacity(self.len());
        for (coef, base) in &self.items {
            let coef = coef.mul(exponent, ctx);
            if !coef.is_zero() {
                items.push((coef, base.clone()));
            }
        }
        Self { items }
    }
}

impl NSum {
    /// The empty sum.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The sum holding the single term `1`.
    pub fn one() -> Self {
        Self::constant(Fraction::one())
    }

    /// The sum holding a single constant term.
    pub fn constant(value: Fraction) -> Self {
        Self::term(Coef::Frac(value), NProduct::one())
    }

    /// The sum holding a single term, without normalizing it.
    pub fn term(coef: Coef, product: NProduct) -> Self {
        Self::single(coef, product)
    }

    pub fn is_zero(&self) -> bool {
        self.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.to_fraction().is_some_and(|f| f.is_one())
    }

    /// Returns true if the sum has a single term.
    pub fn is_monomial(&self) -> bool {
        self.len() == 1
    }

    /// Returns the value of the sum if it is a constant.
    pub fn to_fraction(&self) -> Option<Fraction> {
        match self.items.as_slice() {
            [] => Some(Fraction::zero()),
            [(Coef::Frac(f), product)] if product.is_one() => Some(f.clone()),
            _ => None,
        }
    }

    /// Returns the exact coefficient of the first term, if it has one.
    pub fn leading_coef(&self) -> Option<&Fraction> {
        self.items.first().and_then(|(coef, _)| coef.as_frac())
    }

    pub fn add(&self, ctx: &Context, other: &Self) -> Self {
        self.merge(ctx, other)
    }

    pub fn sub(&self, ctx: &Context, other: &Self) -> Self {
        self.merge(ctx, &other.oppose())
    }

    /// Multiplies every coefficient by `factor`.
    pub fn scale(&self, factor: &Fraction) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            items: self.items.iter()
                .map(|(coef, product)| {
                    let coef = match coef {
                        Coef::Frac(f) => Coef::Frac(f * factor),
                        Coef::Sum(s) => Coef::Sum(s.scale(factor)),
                    };
                    (coef, product.clone())
                })
                .collect(),
        }
    }

    /// Multiplies the two sums, distributing every term of `self` over every term of `other`.
    pub fn mult(&self, ctx: &mut Context, other: &Self) -> Self {
        let mut result = Self::zero();
        for (c1, p1) in &self.items {
            for (c2, p2) in &other.items {
                let coef = c1.mul(c2, ctx);
                let product = p1.merge(ctx, p2);
                let term = normalize_term(ctx, coef, product);
                result = result.merge(ctx, &term);
            }
        }
        result
    }

    /// Raises the sum to a non-negative integer power by repeated squaring.
    pub fn pow_int(&self, ctx: &mut Context, exponent: u32) -> Self {
        let mut result = Self::one();
        let mut square = self.clone();
        let mut exponent = exponent;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.mult(ctx, &square);
            }
            exponent >>= 1;
            if exponent > 0 {
                square = square.mult(ctx, &square);
            }
        }
        result
    }
}

/// Returns the value of an integer literal.
fn integer_literal(ctx: &Context, id: ExprId) -> Option<Integer> {
    match ctx.kind(id) {
        Kind::Number(n) => n.to_integer().cloned(),
        _ => None,
    }
}

/// Simplifies the term `coef · product`.
///
/// - Integer bases with exact exponents are factored into primes. The integer part of each
///   prime's exponent moves into the coefficient, and only the part in `(0, 1)` stays in the
///   product. This reduces `8^(1/2)` to `2·2^(1/2)`.
/// - Sum bases raised to a positive integer are expanded.
/// - An algebraic coefficient is distributed over the product.
pub fn normalize_term(ctx: &mut Context, coef: Coef, product: NProduct) -> NSum {
    let mut coef = match coef {
        Coef::Frac(f) => f,
        Coef::Sum(sum) => {
            let term = NSum::term(Coef::one(), product);
            return sum.mult(ctx, &term);
        },
    };
    if coef.is_zero() {
        return NSum::zero();
    }

    let limit = ctx.options().factor_limit.clone();
    let mut primes: BTreeMap<Integer, Fraction> = BTreeMap::new();
    let mut kept = NProduct::one();
    let mut expansions = Vec::new();

    for (exponent, base) in product.items {
        let literal = match (&exponent, &base) {
            (Coef::Frac(e), Base::Expr(id)) => integer_literal(ctx, *id).map(|n| (e.clone(), n)),
            _ => None,
        };
        let expansion = match (&exponent, &base) {
            (Coef::Frac(e), Base::Sum(sum)) if e.is_integer() && !e.is_negative() => e.to_i64()
                .and_then(|k| u32::try_from(k).ok())
                .map(|k| (sum.clone(), k)),
            _ => None,
        };

        if let Some((e, n)) = literal {
            if n == 0 {
                return NSum::zero();
            }
            if n == 1 {
                continue;
            }
            match prime_factorization(&n, &limit) {
                Some(factors) => {
                    for (prime, count) in factors {
                        let add = &e * &Fraction::from_integer(count);
                        let entry = primes.entry(prime).or_insert_with(Fraction::zero);
                        *entry = &*entry + &add;
                    }
                },
                None => {
                    warn!(%n, "integer exceeds the factorization limit, keeping it opaque");
                    kept.insert(ctx, exponent, base);
                },
            }
        } else if let Some(expansion) = expansion {
            expansions.push(expansion);
        } else {
            kept.insert(ctx, exponent, base);
        }
    }

    for (prime, exponent) in primes {
        let whole = Fraction::from_integer(exponent.floor());
        let fractional = &exponent - &whole;
        match whole.to_i64().and_then(|w| Fraction::from_integer(prime.clone()).pow(w)) {
            Some(factor) => {
                coef = &coef * &factor;
                if !fractional.is_zero() {
                    let node = ctx.int(prime);
                    kept.insert(ctx, Coef::Frac(fractional), Base::Expr(node));
                }
            },
            None => {
                let node = ctx.int(prime);
                kept.insert(ctx, Coef::Frac(exponent), Base::Expr(node));
            },
        }
    }

    let mut result = NSum::term(Coef::Frac(coef), kept);
    for (sum, k) in expansions {
        let power = sum.pow_int(ctx, k);
        result = result.mult(ctx, &power);
    }
    result
}

/// Renders canonical lists back to expressions.
pub(crate) struct Renderer {
    /// The kind of product to join factors with.
    pub product: ProductKind,
}

impl Renderer {
    /// Builds the expression of a sum. Each term after the first is joined with a sum or a
    /// difference depending on its sign.
    pub fn sum(&self, ctx: &mut Context, sum: &NSum) -> ExprId {
        let mut result: Option<ExprId> = None;
        for (coef, product) in sum.items() {
            let (sign, term) = self.term(ctx, coef, product);
            result = Some(match (result, sign) {
                (None, Sign::Positive) => term,
                (None, Sign::Negative) => ctx.opposite(term),
                (Some(acc), Sign::Positive) => ctx.sum(vec![acc, term]),
                (Some(acc), Sign::Negative) => ctx.difference(acc, term),
            });
        }
        match result {
            Some(id) => id,
            None => ctx.int(0),
        }
    }

    /// Builds the magnitude of a term, and returns it with the sign of the coefficient.
    fn term(&self, ctx: &mut Context, coef: &Coef, product: &NProduct) -> (Sign, ExprId) {
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();

        let sign = match coef {
            Coef::Frac(f) => {
                if *f.numerator() != 1 {
                    numerator.push(ctx.int(f.numerator().clone()));
                }
                if *f.denominator() != 1 {
                    denominator.push(ctx.int(f.denominator().clone()));
                }
                f.sign()
            },
            Coef::Sum(s) => {
                let inner = self.sum(ctx, s);
                numerator.push(ctx.bracket(inner));
                Sign::Positive
            },
        };

        // numeric bases sharing an exponent are written as a single power, `2^(1/2)·3^(1/2)`
        // becomes `sqrt(6)`
        let mut grouped: Vec<(Fraction, Integer)> = Vec::new();
        for (exponent, base) in product.items() {
            let numeric = match (exponent, base) {
                (Coef::Frac(e), Base::Expr(id)) => integer_literal(ctx, *id).map(|n| (e, n)),
                _ => None,
            };
            match numeric {
                Some((e, n)) => match grouped.iter_mut().find(|(g, _)| g == e) {
                    Some((_, acc)) => *acc *= n,
                    None => grouped.push((e.clone(), n)),
                },
                None => {
                    let (inverted, factor) = self.power(ctx, exponent, base);
                    if inverted {
                        denominator.push(factor);
                    } else {
                        numerator.push(factor);
                    }
                },
            }
        }
        let mut numeric_factors = Vec::new();
        let mut numeric_denominators = Vec::new();
        for (exponent, n) in grouped {
            let node = ctx.int(n);
            let (inverted, factor) = self.power(ctx, &Coef::Frac(exponent), &Base::Expr(node));
            if inverted {
                numeric_denominators.push(factor);
            } else {
                numeric_factors.push(factor);
            }
        }
        // numbers and radicals of numbers come first, like `2*sqrt(3)*x`
        let coef_count = usize::from(numerator.first().is_some_and(|&id| ctx.is_int(id)));
        numerator.splice(coef_count..coef_count, numeric_factors);
        let den_count = usize::from(denominator.first().is_some_and(|&id| ctx.is_int(id)));
        denominator.splice(den_count..den_count, numeric_denominators);

        let numerator = match self.join(ctx, numerator) {
            Some(id) => id,
            None => ctx.int(1),
        };
        let term = match self.join(ctx, denominator) {
            Some(den) => ctx.quotient(numerator, den),
            None => numerator,
        };
        (sign, term)
    }

    /// Joins factors into a chain of products.
    fn join(&self, ctx: &mut Context, factors: Vec<ExprId>) -> Option<ExprId> {
        factors.into_iter().reduce(|acc, factor| {
            let factor = if matches!(self.product, ProductKind::Point) {
                factor
            } else {
                bracket_factor(ctx, factor)
            };
            ctx.product_of(self.product, acc, factor)
        })
    }

    /// Builds `base^|exponent|`, and returns whether the exponent was negative.
    fn power(&self, ctx: &mut Context, exponent: &Coef, base: &Base) -> (bool, ExprId) {
        let base_node = match base {
            Base::Expr(id) => *id,
            Base::Sum(sum) => self.sum(ctx, sum),
        };

        match exponent {
            Coef::Frac(e) => {
                let e_abs = e.abs();
                let node = if e_abs.is_one() {
                    bracket_factor(ctx, base_node)
                } else if e_abs == Fraction::new(1, 2) {
                    ctx.radical(base_node)
                } else {
                    let base_node = bracket_base(ctx, base_node);
                    let exponent = if e_abs.is_integer() {
                        ctx.int(e_abs.numerator().clone())
                    } else {
                        let n = ctx.int(e_abs.numerator().clone());
                        let d = ctx.int(e_abs.denominator().clone());
                        let q = ctx.quotient(n, d);
                        ctx.bracket(q)
                    };
                    ctx.power(base_node, exponent)
                };
                (e.is_negative(), node)
            },
            Coef::Sum(s) => {
                let base_node = bracket_base(ctx, base_node);
                let exponent = self.sum(ctx, s);
                let exponent = match ctx.kind(exponent) {
                    Kind::Number(_) | Kind::Symbol(_) => exponent,
                    _ => ctx.bracket(exponent),
                };
                (false, ctx.power(base_node, exponent))
            },
        }
    }
}

/// Brackets a factor of a product if it is a sum or a sign.
fn bracket_factor(ctx: &mut Context, id: ExprId) -> ExprId {
    match ctx.kind(id) {
        Kind::Sum | Kind::Difference | Kind::Opposite | Kind::Positive => ctx.bracket(id),
        _ => id,
    }
}

/// Brackets the base of a power unless it is atomic.
fn bracket_base(ctx: &mut Context, id: ExprId) -> ExprId {
    match ctx.kind(id) {
        Kind::Number(n) if n.is_integer() => id,
        Kind::Symbol(_) | Kind::Identifier(_) | Kind::Bracket | Kind::Function(_) => id,
        _ => ctx.bracket(id),
    }
}
