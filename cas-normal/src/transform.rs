//! Structural rewrites of expressions: substitution, reordering and sign cleanup. These never
//! change the value of an expression, only how it is written.

use crate::{
    compare::CanonicalOrd,
    expr::{Context, ExprId, Kind},
    fraction::Sign,
};
use rand::seq::SliceRandom;
use std::collections::HashMap;

impl Context {
    /// Rebuilds the tree bottom-up, applying `f` to every rebuilt node. Nodes whose children
    /// are unchanged are reused.
    fn map_post_order(&mut self, id: ExprId, f: &mut dyn FnMut(&mut Context, ExprId) -> ExprId) -> ExprId {
        let node = self.node(id).clone();
        let children = node.children.iter()
            .map(|&child| self.map_post_order(child, f))
            .collect::<Vec<_>>();
        let rebuilt = if children == node.children {
            id
        } else {
            self.add_node(node.kind, children, node.unit, node.span)
        };
        f(self, rebuilt)
    }

    /// Replaces the symbols by the given expressions.
    ///
    /// Replacements are substituted in turn, so a value can refer to another symbol of the map.
    /// A symbol met again while its own value is being substituted is left as is.
    pub fn substitute(&mut self, id: ExprId, values: &HashMap<String, ExprId>) -> ExprId {
        if values.is_empty() {
            return id;
        }
        self.substitute_with(id, values, &mut Vec::new())
    }

    fn substitute_with(
        &mut self,
        id: ExprId,
        values: &HashMap<String, ExprId>,
        expanding: &mut Vec<String>,
    ) -> ExprId {
        let node = self.node(id).clone();
        if let Kind::Symbol(name) = &node.kind {
            let Some(&value) = values.get(name).filter(|_| !expanding.contains(name)) else {
                return id;
            };
            expanding.push(name.clone());
            let replaced = self.substitute_with(value, values, expanding);
            expanding.pop();

            let replaced = match self.kind(replaced) {
                Kind::Number(_) | Kind::Symbol(_) | Kind::Bracket | Kind::Function(_) => self.copy(replaced),
                _ => self.bracket(replaced),
            };
            return match node.unit {
                Some(unit) => self.with_unit(replaced, unit),
                None => replaced,
            };
        }

        let children = node.children.iter()
            .map(|&child| self.substitute_with(child, values, expanding))
            .collect::<Vec<_>>();
        if children == node.children {
            return id;
        }
        self.add_node(node.kind, children, node.unit, node.span)
    }

    /// Sorts the terms of every sum and difference by the canonical order.
    pub fn sort_terms(&mut self, id: ExprId) -> ExprId {
        self.map_post_order(id, &mut |ctx, id| {
            ctx.reorder_terms(id, |ctx, terms| terms.sort_by(|a, b| a.1.canonical_cmp(&b.1, ctx)))
        })
    }

    /// Sorts the factors of every product by the canonical order.
    pub fn sort_factors(&mut self, id: ExprId) -> ExprId {
        self.map_post_order(id, &mut |ctx, id| {
            ctx.reorder_factors(id, |ctx, factors| factors.sort_by(|a, b| a.canonical_cmp(b, ctx)))
        })
    }

    /// Shuffles the terms of every sum and difference.
    pub fn shuffle_terms(&mut self, id: ExprId) -> ExprId {
        let mut rng = rand::thread_rng();
        self.map_post_order(id, &mut |ctx, id| {
            ctx.reorder_terms(id, |_, terms| terms.shuffle(&mut rng))
        })
    }

    /// Shuffles the factors of every product.
    pub fn shuffle_factors(&mut self, id: ExprId) -> ExprId {
        let mut rng = rand::thread_rng();
        self.map_post_order(id, &mut |ctx, id| {
            ctx.reorder_factors(id, |_, factors| factors.shuffle(&mut rng))
        })
    }

    /// Removes the positive signs and the double opposites.
    pub fn remove_signs(&mut self, id: ExprId) -> ExprId {
        self.map_post_order(id, &mut |ctx, id| {
            if ctx.unit(id).is_some() {
                return id;
            }
            match ctx.kind(id) {
                Kind::Positive => ctx.copy(ctx.first(id)),
                Kind::Opposite if matches!(ctx.kind(ctx.first(id)), Kind::Opposite) => {
                    let inner = ctx.first(ctx.first(id));
                    ctx.copy(inner)
                },
                _ => id,
            }
        })
    }

    /// Rebuilds a chain of sums and differences with its terms reordered by `reorder`.
    fn reorder_terms(
        &mut self,
        id: ExprId,
        reorder: impl FnOnce(&Context, &mut Vec<(Sign, ExprId)>),
    ) -> ExprId {
        if !matches!(self.kind(id), Kind::Sum | Kind::Difference) {
            return id;
        }
        let mut terms = self.terms(id);
        reorder(self, &mut terms);

        let mut terms = terms.into_iter();
        let Some((sign, first)) = terms.next() else {
            return id;
        };
        let first = match sign {
            Sign::Positive => first,
            Sign::Negative => self.opposite(first),
        };
        let chain = terms.fold(first, |acc, (sign, term)| match sign {
            Sign::Positive => self.sum(vec![acc, term]),
            Sign::Negative => self.difference(acc, term),
        });
        self.keep_unit(id, chain)
    }

    /// Rebuilds a chain of products with its factors reordered by `reorder`.
    fn reorder_factors(&mut self, id: ExprId, reorder: impl FnOnce(&Context, &mut Vec<ExprId>)) -> ExprId {
        let Kind::Product(kind) = *self.kind(id) else {
            return id;
        };
        let mut factors = self.factors(id);
        reorder(self, &mut factors);

        let Some(chain) = factors.into_iter().reduce(|acc, factor| self.product_of(kind, acc, factor)) else {
            return id;
        };
        self.keep_unit(id, chain)
    }

    /// Attaches the unit of `original` to its rebuilt version.
    fn keep_unit(&mut self, original: ExprId, rebuilt: ExprId) -> ExprId {
        match self.unit(original).cloned() {
            Some(unit) => self.with_unit(rebuilt, unit),
            None => rebuilt,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::Context;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn substitution() {
        let mut ctx = Context::new();
        let a = ctx.symbol("a");
        let one = ctx.int(1);
        let sum = ctx.sum(vec![a, one]);

        let two = ctx.int(2);
        let b = ctx.symbol("b");
        let two_b = ctx.product(two, b);
        let three = ctx.int(3);
        let values = HashMap::from([("a".to_string(), two_b), ("b".to_string(), three)]);

        let substituted = ctx.substitute(sum, &values);
        assert_eq!(ctx.string(substituted), "(2*3)+1");
        let normal = ctx.normal(substituted).unwrap();
        assert_eq!(normal.string(&mut ctx), "7");
        assert_eq!(ctx.string(sum), "a+1");
    }

    #[test]
    fn cyclic_substitution() {
        let mut ctx = Context::new();
        let a = ctx.symbol("a");
        let b = ctx.symbol("b");
        let a_again = ctx.symbol("a");
        let values = HashMap::from([("a".to_string(), b), ("b".to_string(), a_again)]);
        let substituted = ctx.substitute(a, &values);
        assert_eq!(ctx.string(substituted), "a");
    }

    #[test]
    fn sorting() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let two = ctx.int(2);
        let sum = ctx.sum(vec![x, two]);
        let sorted = ctx.sort_terms(sum);
        assert_eq!(ctx.string(sorted), "2+x");

        let y = ctx.symbol("y");
        let three = ctx.int(3);
        let product = ctx.product(y, three);
        let sorted = ctx.sort_factors(product);
        assert_eq!(ctx.string(sorted), "3*y");
    }

    #[test]
    fn shuffling_keeps_the_value() {
        let mut ctx = Context::new();
        let terms = (1..=5).map(|n| ctx.int(n)).collect();
        let sum = ctx.sum(terms);
        let shuffled = ctx.shuffle_terms(sum);
        assert!(ctx.equals(sum, shuffled).unwrap());

        let x = ctx.symbol("x");
        let two = ctx.int(2);
        let y = ctx.symbol("y");
        let xy = ctx.product(x, y);
        let product = ctx.product(two, xy);
        let shuffled = ctx.shuffle_factors(product);
        assert!(ctx.equals(product, shuffled).unwrap());
    }

    #[test]
    fn signs() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let inner = ctx.opposite(x);
        let outer = ctx.opposite(inner);
        let positive = ctx.positive(outer);
        let cleaned = ctx.remove_signs(positive);
        assert_eq!(ctx.string(cleaned), "x");
        assert_eq!(ctx.parent(cleaned), None);
    }
}
