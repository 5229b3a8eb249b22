//! The rule that builds the normal form of each kind of node.

mod integer;
mod logarithm;
mod relation;
mod trigonometry;

use cas_error::Error;
use crate::{
    error::ErrorNode,
    expr::{Context, ExprId, Func, Kind},
    fraction::Fraction,
};
use std::cmp::Ordering;
use super::{nlist::{Base, Coef, NSum}, Normal};
use tracing::debug;

/// Builds the normal form of the given node from the normal forms of its children.
///
/// Errors raised without a source location are given the span of the node.
pub(crate) fn normalize(ctx: &mut Context, id: ExprId) -> Result<Normal, Error> {
    let node = ctx.node(id).clone();
    debug!(kind = node.kind.name(), id = id.0, "normalizing");

    let normal = apply(ctx, id, &node.kind, &node.children).map_err(|mut err| {
        if err.spans.is_empty() {
            err.spans.push(node.span.clone());
        }
        err
    })?;

    match node.unit {
        Some(unit) => normal.mult(ctx, &unit.value()),
        None => Ok(normal),
    }
}

/// Returns the normal forms of every child.
fn children(ctx: &mut Context, children: &[ExprId]) -> Result<Vec<Normal>, Error> {
    children.iter().map(|&child| ctx.normal(child)).collect()
}

/// The node without its unit, used as an opaque base.
fn opaque(ctx: &mut Context, id: ExprId) -> Normal {
    let base = ctx.without_unit(id);
    Normal::from_base(base)
}

/// Rebuilds the node out of the rendered normal forms of its children, and uses it as an
/// opaque base.
pub(super) fn opaque_of(ctx: &mut Context, kind: Kind, args: &[Normal]) -> Normal {
    let children = args.iter()
        .map(|arg| arg.to_node(ctx))
        .collect();
    let node = ctx.add(kind, children);
    Normal::from_base(node)
}

/// Returns `(c, b)` if the sum is the single term `c * b`.
pub(super) fn single_base(sum: &NSum) -> Option<(Fraction, ExprId)> {
    let [(Coef::Frac(coef), product)] = sum.items() else {
        return None;
    };
    match product.items() {
        [(Coef::Frac(e), Base::Expr(base))] if e.is_one() => Some((coef.clone(), *base)),
        _ => None,
    }
}

/// Returns the sign of a value: exactly if it is rational, otherwise from its decimal value.
/// Returns [`None`] if the value depends on a symbol.
pub(crate) fn sign_of(ctx: &mut Context, value: &Normal) -> Result<Option<Ordering>, Error> {
    if let Some(f) = value.to_fraction() {
        return Ok(Some(f.cmp(&Fraction::zero())));
    }
    if !value.is_numeric(ctx) {
        return Ok(None);
    }
    let decimal = value.to_decimal(ctx)?;
    Ok(decimal.cmp0())
}

fn apply(ctx: &mut Context, id: ExprId, kind: &Kind, args: &[ExprId]) -> Result<Normal, Error> {
    match kind {
        Kind::Number(n) => Ok(Normal::from_fraction(n.to_fraction())),
        Kind::Symbol(_)
            | Kind::Identifier(_)
            | Kind::Hole
            | Kind::Boolean(_)
            | Kind::Template(_)
            | Kind::SegmentLength { .. }
            | Kind::Limit(_) => Ok(opaque(ctx, id)),
        Kind::Error(message) => Err(Error::new(Vec::new(), ErrorNode { message: message.clone() })),
        Kind::Positive | Kind::Bracket => ctx.normal(args[0]),
        Kind::Opposite => Ok(ctx.normal(args[0])?.oppose()),
        Kind::Percentage => {
            let value = ctx.normal(args[0])?;
            Ok(value.scale(&Fraction::new(1, 100)))
        },
        Kind::Function(func @ (Func::Cos | Func::Sin | Func::Tan)) => {
            trigonometry::normalize(ctx, *func, args[0])
        },
        Kind::Function(func @ (Func::Ln | Func::Log | Func::Exp)) => {
            logarithm::normalize(ctx, *func, args[0])
        },
        Kind::Function(Func::Radical) => {
            let base = ctx.normal(args[0])?;
            base.pow(ctx, &Normal::from_fraction(Fraction::new(1, 2)))
        },
        Kind::Function(func @ (Func::Floor | Func::Abs)) => integer::unary(ctx, *func, args[0]),
        Kind::Gcd
            | Kind::Mod
            | Kind::Min
            | Kind::MinPreserve
            | Kind::Max
            | Kind::MaxPreserve => integer::binary(ctx, kind, args[0], args[1]),
        Kind::Sum | Kind::Time => {
            let mut terms = children(ctx, args)?.into_iter();
            let Some(first) = terms.next() else {
                return Ok(Normal::zero());
            };
            terms.try_fold(first, |acc, term| acc.add(ctx, &term))
        },
        Kind::Difference => {
            let a = ctx.normal(args[0])?;
            let b = ctx.normal(args[1])?;
            a.sub(ctx, &b)
        },
        Kind::Product(_) => {
            let factors = children(ctx, args)?;
            factors.into_iter().try_fold(Normal::one(), |acc, factor| acc.mult(ctx, &factor))
        },
        Kind::Division | Kind::Quotient => {
            let n = ctx.normal(args[0])?;
            let d = ctx.normal(args[1])?;
            n.div(ctx, &d)
        },
        Kind::Power => {
            let base = ctx.normal(args[0])?;
            let exponent = ctx.normal(args[1])?;
            base.pow(ctx, &exponent)
        },
        Kind::Relation(op) => relation::normalize(ctx, id, &[*op], args),
        Kind::Relations(ops) => relation::normalize(ctx, id, ops, args),
    }
}
