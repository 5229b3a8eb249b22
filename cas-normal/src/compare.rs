//! The canonical order over expressions and canonical lists.
//!
//! Every canonical list is kept sorted by this order, so it decides which bases are merged and in
//! which order terms are rendered. It is total: two values compare [`Ordering::Equal`] only if
//! they represent the same base.
//!
//! Expressions of different kinds are ordered by the rank of their kind (see [`rank`]). Within a
//! kind, leaves compare by value and compound nodes compare their children pairwise. Units are
//! compared last, and an expression with a unit is greater than the same expression without one.

use crate::{
    expr::{Context, ExprId, Func, Kind, Node, ProductKind, Relation},
    normal::nlist::{Base, Coef, Nlist},
    unit::Unit,
};
use std::cmp::Ordering;

/// A total order that needs the [`Context`] owning the compared values.
pub trait CanonicalOrd {
    /// Compares `self` with `other`.
    fn canonical_cmp(&self, other: &Self, ctx: &Context) -> Ordering;
}

/// Returns the position of the kind in the canonical order of kinds.
pub fn rank(kind: &Kind) -> u8 {
    match kind {
        Kind::Number(_) => 0,
        Kind::Symbol(_) => 1,
        Kind::Identifier(_) => 2,
        Kind::Hole => 3,
        Kind::Boolean(_) => 4,
        Kind::Template(_) => 5,
        Kind::Positive => 6,
        Kind::Opposite => 7,
        Kind::Percentage => 8,
        Kind::SegmentLength { .. } => 9,
        Kind::Limit(_) => 10,
        Kind::Bracket => 11,
        Kind::Function(func) => match func {
            Func::Cos => 12,
            Func::Sin => 13,
            Func::Tan => 14,
            Func::Ln => 15,
            Func::Log => 16,
            Func::Exp => 17,
            Func::Radical => 18,
            Func::Floor => 19,
            Func::Abs => 20,
        },
        Kind::Gcd => 21,
        Kind::Mod => 22,
        Kind::Min => 23,
        Kind::MinPreserve => 24,
        Kind::Max => 25,
        Kind::MaxPreserve => 26,
        Kind::Sum => 27,
        Kind::Difference => 28,
        Kind::Product(ProductKind::Explicit) => 29,
        Kind::Product(ProductKind::Implicit) => 30,
        Kind::Product(ProductKind::Point) => 31,
        Kind::Division => 32,
        Kind::Quotient => 33,
        Kind::Power => 34,
        Kind::Time => 35,
        Kind::Relation(relation) => match relation {
            Relation::Equal => 36,
            Relation::Unequal => 37,
            Relation::Less => 38,
            Relation::LessOrEqual => 39,
            Relation::More => 40,
            Relation::MoreOrEqual => 41,
        },
        Kind::Relations(_) => 42,
        Kind::Error(_) => 43,
    }
}

/// Compares two sequences element by element. A sequence that is a prefix of the other is
/// smaller.
fn cmp_seq<T>(
    a: &[T],
    b: &[T],
    mut cmp: impl FnMut(&T, &T) -> Ordering,
) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| cmp(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn cmp_children(ctx: &Context, a: &Node, b: &Node) -> Ordering {
    cmp_seq(&a.children, &b.children, |x, y| x.canonical_cmp(y, ctx))
}

/// Compares two nodes of the same rank.
fn cmp_same_kind(ctx: &Context, a: &Node, b: &Node) -> Ordering {
    match (&a.kind, &b.kind) {
        (Kind::Number(x), Kind::Number(y)) => x.value().cmp(y.value()),
        (Kind::Symbol(x), Kind::Symbol(y))
            | (Kind::Identifier(x), Kind::Identifier(y))
            | (Kind::Error(x), Kind::Error(y)) => x.cmp(y),
        (Kind::Boolean(x), Kind::Boolean(y)) => x.cmp(y),
        (Kind::Template(x), Kind::Template(y)) => x.cmp(y)
            .then_with(|| cmp_children(ctx, a, b)),
        (
            Kind::SegmentLength { begin: b1, end: e1 },
            Kind::SegmentLength { begin: b2, end: e2 },
        ) => b1.cmp(b2).then_with(|| e1.cmp(e2)),
        (Kind::Limit(s1), Kind::Limit(s2)) => {
            let (f1, f2) = (a.children[0], b.children[0]);
            let is_symbol = |id: ExprId| matches!(ctx.kind(id), Kind::Symbol(_));
            match (is_symbol(f1), is_symbol(f2)) {
                (true, true) => s1.cmp(s2).then_with(|| f1.canonical_cmp(&f2, ctx)),
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => match f1.canonical_cmp(&f2, ctx) {
                    Ordering::Equal => s1.cmp(s2),
                    ordering => ordering,
                },
            }
        },
        (Kind::Relations(x), Kind::Relations(y)) => x.cmp(y)
            .then_with(|| cmp_children(ctx, a, b)),
        _ => cmp_children(ctx, a, b),
    }
}

fn cmp_units(ctx: &Context, a: Option<&Unit>, b: Option<&Unit>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.normal().structural_cmp(b.normal(), ctx),
    }
}

impl CanonicalOrd for ExprId {
    fn canonical_cmp(&self, other: &Self, ctx: &Context) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }

        let (a, b) = (ctx.node(*self), ctx.node(*other));
        rank(&a.kind).cmp(&rank(&b.kind))
            .then_with(|| cmp_same_kind(ctx, a, b))
            .then_with(|| cmp_units(ctx, a.unit.as_ref(), b.unit.as_ref()))
    }
}

impl CanonicalOrd for Coef {
    fn canonical_cmp(&self, other: &Self, ctx: &Context) -> Ordering {
        match (self, other) {
            (Coef::Frac(a), Coef::Frac(b)) => a.cmp(b),
            (Coef::Frac(_), Coef::Sum(_)) => Ordering::Less,
            (Coef::Sum(_), Coef::Frac(_)) => Ordering::Greater,
            (Coef::Sum(a), Coef::Sum(b)) => a.canonical_cmp(b, ctx),
        }
    }
}

/// Expression bases come before list bases.
impl CanonicalOrd for Base {
    fn canonical_cmp(&self, other: &Self, ctx: &Context) -> Ordering {
        match (self, other) {
            (Base::Expr(a), Base::Expr(b)) => a.canonical_cmp(b, ctx),
            (Base::Expr(_), Base::Sum(_)) => Ordering::Less,
            (Base::Sum(_), Base::Expr(_)) => Ordering::Greater,
            (Base::Sum(a), Base::Sum(b)) => a.canonical_cmp(b, ctx),
        }
    }
}

/// Lists compare element by element, bases first and coefficients on a tie.
impl<T: CanonicalOrd> CanonicalOrd for Nlist<T> {
    fn canonical_cmp(&self, other: &Self, ctx: &Context) -> Ordering {
        cmp_seq(self.items(), other.items(), |(c1, t1), (c2, t2)| {
            t1.canonical_cmp(t2, ctx).then_with(|| c1.canonical_cmp(c2, ctx))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::LimitSide;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use super::*;

    #[test]
    fn integers() {
        let mut ctx = Context::new();
        let two = ctx.int(2);
        let three = ctx.int(3);
        assert_eq!(two.canonical_cmp(&three, &ctx), Ordering::Less);
        assert_eq!(three.canonical_cmp(&two, &ctx), Ordering::Greater);
    }

    #[test]
    fn decimals_compare_by_value() {
        let mut ctx = Context::new();
        let a = ctx.decimal("0.50").unwrap();
        let b = ctx.decimal("0.5").unwrap();
        assert_eq!(a.canonical_cmp(&b, &ctx), Ordering::Equal);
    }

    #[test]
    fn ranks_order_kinds() {
        let mut ctx = Context::new();
        let big = ctx.int(1000);
        let x = ctx.symbol("x");
        let y = ctx.symbol("y");
        let sum = ctx.sum(vec![x, y]);
        let a = ctx.symbol("a");
        let cos = ctx.func(Func::Cos, a);

        assert_eq!(big.canonical_cmp(&x, &ctx), Ordering::Less);
        assert_eq!(cos.canonical_cmp(&sum, &ctx), Ordering::Less);
        assert_eq!(x.canonical_cmp(&y, &ctx), Ordering::Less);
    }

    #[test]
    fn children_compare_pairwise() {
        let mut ctx = Context::new();
        let x1 = ctx.symbol("x");
        let one = ctx.int(1);
        let a = ctx.sum(vec![x1, one]);
        let x2 = ctx.symbol("x");
        let two = ctx.int(2);
        let b = ctx.sum(vec![x2, two]);
        assert_eq!(a.canonical_cmp(&b, &ctx), Ordering::Less);

        let x3 = ctx.symbol("x");
        let one = ctx.int(1);
        let z = ctx.int(0);
        let c = ctx.sum(vec![x3, one, z]);
        assert_eq!(a.canonical_cmp(&c, &ctx), Ordering::Less);
    }

    #[test]
    fn limits() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let x_plus = ctx.limit(LimitSide::Plus, x);
        let zero = ctx.int(0);
        let zero_minus = ctx.limit(LimitSide::Minus, zero);
        let zero = ctx.int(0);
        let zero_plus = ctx.limit(LimitSide::Plus, zero);

        assert_eq!(x_plus.canonical_cmp(&zero_plus, &ctx), Ordering::Greater);
        assert_eq!(zero_plus.canonical_cmp(&zero_minus, &ctx), Ordering::Less);
    }

    #[test]
    fn units_compare_last() {
        let mut ctx = Context::new();
        let bare = ctx.int(3);
        let three = ctx.int(3);
        let unit = Unit::parse(&mut ctx, "m").unwrap();
        let meters = ctx.with_unit(three, unit);
        assert_eq!(bare.canonical_cmp(&meters, &ctx), Ordering::Less);

        let three = ctx.int(3);
        let unit = Unit::parse(&mut ctx, "km").unwrap();
        let kilometers = ctx.with_unit(three, unit);
        assert_eq!(kilometers.canonical_cmp(&meters, &ctx), Ordering::Greater);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn order_is_antisymmetric(a in shapes::statement(), b in shapes::statement()) {
            let mut ctx = Context::new();
            let a = a.build(&mut ctx);
            let b = b.build(&mut ctx);
            prop_assert_eq!(a.canonical_cmp(&b, &ctx), b.canonical_cmp(&a, &ctx).reverse());

            let copy = ctx.copy(a);
            prop_assert_eq!(a.canonical_cmp(&copy, &ctx), Ordering::Equal);
        }

        #[test]
        fn order_is_transitive(
            a in shapes::statement(),
            b in shapes::statement(),
            c in shapes::statement(),
        ) {
            let mut ctx = Context::new();
            let mut ids = [a.build(&mut ctx), b.build(&mut ctx), c.build(&mut ctx)];
            ids.sort_by(|x, y| x.canonical_cmp(y, &ctx));
            prop_assert!(ids[0].canonical_cmp(&ids[1], &ctx).is_le());
            prop_assert!(ids[1].canonical_cmp(&ids[2], &ctx).is_le());
            prop_assert!(ids[0].canonical_cmp(&ids[2], &ctx).is_le());
        }

        #[test]
        fn normalized_order_is_antisymmetric(
            a in shapes::normalizable(),
            b in shapes::normalizable(),
        ) {
            let mut ctx = Context::new();
            let a = a.build(&mut ctx);
            let a = ctx.normalize(a).unwrap();
            let b = b.build(&mut ctx);
            let b = ctx.normalize(b).unwrap();
            prop_assert_eq!(a.canonical_cmp(&b, &ctx), b.canonical_cmp(&a, &ctx).reverse());
        }

        #[test]
        fn normalized_order_is_transitive(
            a in shapes::normalizable(),
            b in shapes::normalizable(),
            c in shapes::normalizable(),
        ) {
            let mut ctx = Context::new();
            let mut ids = Vec::new();
            for shape in [a, b, c] {
                let id = shape.build(&mut ctx);
                ids.push(ctx.normalize(id).unwrap());
            }
            ids.sort_by(|x, y| x.canonical_cmp(y, &ctx));
            prop_assert!(ids[0].canonical_cmp(&ids[1], &ctx).is_le());
            prop_assert!(ids[1].canonical_cmp(&ids[2], &ctx).is_le());
            prop_assert!(ids[0].canonical_cmp(&ids[2], &ctx).is_le());
        }
    }
}

/// Random expression trees for property tests.
#[cfg(test)]
pub(crate) mod shapes {
    use crate::{
        expr::{Context, ExprId, Func, LimitSide, Relation},
        unit::Unit,
    };
    use proptest::prelude::*;

    const SYMBOLS: [&str; 3] = ["x", "y", "z"];

    const RELATIONS: [Relation; 6] = [
        Relation::Equal,
        Relation::Unequal,
        Relation::Less,
        Relation::LessOrEqual,
        Relation::More,
        Relation::MoreOrEqual,
    ];

    /// Units of the same quantity, so that any two of them can be added.
    const FAMILIES: [[&str; 3]; 2] = [["m", "cm", "km"], ["L", "mL", "cm^3"]];

    #[derive(Clone, Debug)]
    pub enum Shape {
        Int(i64),
        Symbol(u8),
        Limit(u8, bool),
        Sum(Box<Shape>, Box<Shape>),
        Difference(Box<Shape>, Box<Shape>),
        Product(Box<Shape>, Box<Shape>),
        Quotient(Box<Shape>, Box<Shape>),
        Power(Box<Shape>, i64),
        SymbolicPower(Box<Shape>, u8),
        Opposite(Box<Shape>),
        Radical(Box<Shape>),
        Cos(Box<Shape>),
        Ln(Box<Shape>),
        Log(Box<Shape>),
        /// An integer in the unit at the given index of its family.
        Measure(i64, usize, usize),
        Relation(usize, Box<Shape>, Box<Shape>),
        Relations(Vec<usize>, Vec<Shape>),
    }

    fn symbol(i: u8) -> &'static str {
        SYMBOLS[usize::from(i) % SYMBOLS.len()]
    }

    fn pair(ctx: &mut Context, a: &Shape, b: &Shape) -> (ExprId, ExprId) {
        (a.build(ctx), b.build(ctx))
    }

    impl Shape {
        pub fn build(&self, ctx: &mut Context) -> ExprId {
            match self {
                Shape::Int(n) => ctx.int(*n),
                Shape::Symbol(i) => ctx.symbol(symbol(*i)),
                Shape::Limit(i, plus) => {
                    let x = ctx.symbol(symbol(*i));
                    let side = if *plus { LimitSide::Plus } else { LimitSide::Minus };
                    ctx.limit(side, x)
                },
                Shape::Sum(a, b) => {
                    let (a, b) = pair(ctx, a, b);
                    ctx.sum(vec![a, b])
                },
                Shape::Difference(a, b) => {
                    let (a, b) = pair(ctx, a, b);
                    ctx.difference(a, b)
                },
                Shape::Product(a, b) => {
                    let (a, b) = pair(ctx, a, b);
                    ctx.product(a, b)
                },
                Shape::Quotient(a, b) => {
                    let (a, b) = pair(ctx, a, b);
                    ctx.quotient(a, b)
                },
                Shape::Power(a, k) => {
                    let a = a.build(ctx);
                    let k = ctx.int(*k);
                    ctx.power(a, k)
                },
                Shape::SymbolicPower(a, i) => {
                    let a = a.build(ctx);
                    let k = ctx.symbol(symbol(*i));
                    ctx.power(a, k)
                },
                Shape::Opposite(a) => {
                    let a = a.build(ctx);
                    ctx.opposite(a)
                },
                Shape::Radical(a) => {
                    let a = a.build(ctx);
                    ctx.radical(a)
                },
                Shape::Cos(a) => {
                    let a = a.build(ctx);
                    ctx.func(Func::Cos, a)
                },
                Shape::Ln(a) => {
                    let a = a.build(ctx);
                    ctx.func(Func::Ln, a)
                },
                Shape::Log(a) => {
                    let a = a.build(ctx);
                    ctx.func(Func::Log, a)
                },
                Shape::Measure(n, family, index) => {
                    let value = ctx.int(*n);
                    let name = FAMILIES[*family % FAMILIES.len()][*index % 3];
                    match Unit::parse(ctx, name) {
                        Ok(unit) => ctx.with_unit(value, unit),
                        Err(_) => value,
                    }
                },
                Shape::Relation(op, a, b) => {
                    let (a, b) = pair(ctx, a, b);
                    ctx.relation(RELATIONS[*op % RELATIONS.len()], a, b)
                },
                Shape::Relations(ops, operands) => {
                    let ops = ops.iter().map(|op| RELATIONS[*op % RELATIONS.len()]).collect();
                    let operands = operands.iter().map(|shape| shape.build(ctx)).collect();
                    ctx.relations(ops, operands)
                },
            }
        }
    }

    fn boxed(shape: Shape) -> Box<Shape> {
        Box::new(shape)
    }

    /// Values that never vanish: positive integers, symbols and `x + k` with `k` positive.
    fn factor() -> impl Strategy<Value = Shape> {
        prop_oneof![
            (1i64..=9).prop_map(Shape::Int),
            (0u8..3).prop_map(Shape::Symbol),
            (0u8..3, 1i64..=9)
                .prop_map(|(i, k)| Shape::Sum(boxed(Shape::Symbol(i)), boxed(Shape::Int(k)))),
        ]
    }

    /// Small trees of integers, symbols, limits, the arithmetic operators, radicals, `cos`, `ln`
    /// and `log`. Divisors, negative powers and logarithms only apply to values that never
    /// vanish, so every tree has a normal form.
    pub fn shape() -> impl Strategy<Value = Shape> {
        let leaf = prop_oneof![
            4 => (-12i64..=12).prop_map(Shape::Int),
            4 => (0u8..3).prop_map(Shape::Symbol),
            1 => (0u8..3, any::<bool>()).prop_map(|(i, plus)| Shape::Limit(i, plus)),
        ];
        leaf.prop_recursive(3, 12, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Sum(boxed(a), boxed(b))),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| Shape::Difference(boxed(a), boxed(b))),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| Shape::Product(boxed(a), boxed(b))),
                (inner.clone(), factor()).prop_map(|(a, b)| Shape::Quotient(boxed(a), boxed(b))),
                (inner.clone(), 0i64..=3).prop_map(|(a, k)| Shape::Power(boxed(a), k)),
                (factor(), -2i64..=-1).prop_map(|(a, k)| Shape::Power(boxed(a), k)),
                (factor(), 0u8..3).prop_map(|(a, i)| Shape::SymbolicPower(boxed(a), i)),
                inner.clone().prop_map(|a| Shape::Opposite(boxed(a))),
                inner.clone().prop_map(|a| Shape::Radical(boxed(a))),
                inner.prop_map(|a| Shape::Cos(boxed(a))),
                factor().prop_map(|a| Shape::Ln(boxed(a))),
                factor().prop_map(|a| Shape::Log(boxed(a))),
            ]
        })
    }

    /// Small trees without symbols, whose comparisons can always be decided.
    pub fn numeric() -> impl Strategy<Value = Shape> {
        (-12i64..=12).prop_map(Shape::Int).prop_recursive(3, 12, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Sum(boxed(a), boxed(b))),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| Shape::Difference(boxed(a), boxed(b))),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| Shape::Product(boxed(a), boxed(b))),
                (inner.clone(), 1i64..=9)
                    .prop_map(|(a, k)| Shape::Quotient(boxed(a), boxed(Shape::Int(k)))),
                (inner.clone(), 0i64..=3).prop_map(|(a, k)| Shape::Power(boxed(a), k)),
                inner.clone().prop_map(|a| Shape::Opposite(boxed(a))),
                inner.prop_map(|a| Shape::Cos(boxed(a))),
            ]
        })
    }

    /// Sums, differences and integer multiples of quantities of one kind, in mixed units.
    pub fn measure() -> impl Strategy<Value = Shape> {
        (0usize..FAMILIES.len()).prop_flat_map(|family| {
            let leaf = (1i64..=20, 0usize..3)
                .prop_map(move |(n, index)| Shape::Measure(n, family, index));
            leaf.prop_recursive(3, 8, 2, |inner| {
                prop_oneof![
                    (inner.clone(), inner.clone())
                        .prop_map(|(a, b)| Shape::Sum(boxed(a), boxed(b))),
                    (inner.clone(), inner.clone())
                        .prop_map(|(a, b)| Shape::Difference(boxed(a), boxed(b))),
                    (inner, 1i64..=5)
                        .prop_map(|(a, k)| Shape::Product(boxed(a), boxed(Shape::Int(k)))),
                ]
            })
        })
    }

    /// Relations and chains of relations between numeric operands.
    pub fn numeric_relation() -> impl Strategy<Value = Shape> {
        prop_oneof![
            (0..RELATIONS.len(), numeric(), numeric())
                .prop_map(|(op, a, b)| Shape::Relation(op, boxed(a), boxed(b))),
            relations(numeric().boxed()),
        ]
    }

    fn relations(operand: BoxedStrategy<Shape>) -> impl Strategy<Value = Shape> {
        (2usize..=4).prop_flat_map(move |count| {
            (
                prop::collection::vec(0..RELATIONS.len(), count - 1),
                prop::collection::vec(operand.clone(), count),
            )
                .prop_map(|(ops, operands)| Shape::Relations(ops, operands))
        })
    }

    /// Any tree the orderings must handle: expressions, quantities with units and relations
    /// between arbitrary expressions.
    pub fn statement() -> impl Strategy<Value = Shape> {
        prop_oneof![
            4 => shape(),
            2 => measure(),
            1 => (0..RELATIONS.len(), shape(), shape())
                .prop_map(|(op, a, b)| Shape::Relation(op, boxed(a), boxed(b))),
            1 => relations(shape().boxed()),
        ]
    }

    /// Any tree with a normal form.
    pub fn normalizable() -> impl Strategy<Value = Shape> {
        prop_oneof![
            4 => shape(),
            2 => measure(),
            1 => numeric_relation(),
        ]
    }
}
