//! Folding of equalities, inequalities and chains of relations to a boolean.

use cas_error::Error;
use crate::{
    error::NonNumericRelation,
    expr::{Context, ExprId, Relation},
    normal::Normal,
};
use std::cmp::Ordering;
use super::{children, sign_of};

/// Decides a relation or a chain of relations between numeric values, and returns the boolean
/// node of the result.
///
/// The relation is decided from the sign of the difference between each pair of neighboring
/// operands. Returns a [`NonNumericRelation`] error if a difference depends on a symbol.
pub(super) fn normalize(
    ctx: &mut Context,
    id: ExprId,
    ops: &[Relation],
    args: &[ExprId],
) -> Result<Normal, Error> {
    let values = children(ctx, args)?;
    let mut holds = true;
    for (op, pair) in ops.iter().zip(values.windows(2)) {
        let difference = pair[0].sub(ctx, &pair[1])?;
        let Some(sign) = sign_of(ctx, &difference)? else {
            let relation = ctx.string(id);
            return Err(Error::new(Vec::new(), NonNumericRelation { relation }));
        };
        holds &= relation_holds(*op, sign);
    }

    let value = ctx.boolean(holds);
    Ok(Normal::from_base(value))
}

/// Returns true if `a op b` holds, given the ordering of `a` and `b`.
fn relation_holds(op: Relation, ordering: Ordering) -> bool {
    match op {
        Relation::Equal => ordering.is_eq(),
        Relation::Unequal => ordering.is_ne(),
        Relation::Less => ordering.is_lt(),
        Relation::LessOrEqual => ordering.is_le(),
        Relation::More => ordering.is_gt(),
        Relation::MoreOrEqual => ordering.is_ge(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::NonNumericRelation,
        expr::{Context, Relation},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_relations() {
        let mut ctx = Context::new();
        let two = ctx.int(2);
        let root = ctx.radical(two);
        let three = ctx.int(3);
        let half = ctx.int(2);
        let q = ctx.quotient(three, half);
        let rel = ctx.relation(Relation::Less, root, q);
        let normal = ctx.normal(rel).unwrap();
        assert_eq!(normal.string(&mut ctx), "true");

        let one = ctx.int(1);
        let x = ctx.symbol("x");
        let three = ctx.int(3);
        let chain = ctx.relations(vec![Relation::Less, Relation::Less], vec![one, x, three]);
        assert!(ctx.normal(chain).unwrap_err().is::<NonNumericRelation>());
    }

    #[test]
    fn chains() {
        let mut ctx = Context::new();
        let one = ctx.int(1);
        let two = ctx.int(2);
        let two_again = ctx.int(2);
        let chain = ctx.relations(
            vec![Relation::Less, Relation::MoreOrEqual],
            vec![one, two, two_again],
        );
        let normal = ctx.normal(chain).unwrap();
        assert_eq!(normal.string(&mut ctx), "true");

        let x = ctx.symbol("x");
        let same = ctx.symbol("x");
        let rel = ctx.relation(Relation::Unequal, x, same);
        let normal = ctx.normal(rel).unwrap();
        assert_eq!(normal.string(&mut ctx), "false");
    }
}
