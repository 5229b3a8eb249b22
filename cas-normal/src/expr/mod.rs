//! The expression tree.
//!
//! Expressions are stored in an arena owned by a [`Context`] and referred to by [`ExprId`]
//! handles. Nodes are never mutated after they are added. Every operation that transforms an
//! expression allocates new nodes and returns the handle of the new root.
//!
//! Each node records its parent, so that context queries such as [`Context::is_first`] can navigate
//! upwards without the tree owning its ancestors. A node has at most one parent. Building a node
//! out of a child that already belongs to another tree attaches a copy of that child instead.
//!
//! The [`Normal`] form of a node is computed on demand by [`Context::normal`] and memoized in a
//! table keyed by handle.

pub mod fmt;
pub mod iter;
mod number;

pub use number::{InvalidNumber, Number};

use crate::{
    consts::is_constant,
    fraction::Sign,
    normal::Normal,
    options::Options,
    unit::Unit,
};
use cas_unit_convert::Quantity;
use iter::ExprIter;
use rug::Integer;
use std::{collections::HashMap, ops::Range};

/// A handle to a node stored in a [`Context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(pub u32);

impl ExprId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A function of one argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Func {
    Cos,
    Sin,
    Tan,
    Ln,
    Log,
    Exp,
    Radical,
    Floor,
    Abs,
}

impl Func {
    /// The name the function is written with.
    pub fn name(self) -> &'static str {
        match self {
            Func::Cos => "cos",
            Func::Sin => "sin",
            Func::Tan => "tan",
            Func::Ln => "ln",
            Func::Log => "log",
            Func::Exp => "exp",
            Func::Radical => "sqrt",
            Func::Floor => "floor",
            Func::Abs => "abs",
        }
    }
}

/// The way a product is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductKind {
    /// `a*b`
    Explicit,

    /// `ab`
    Implicit,

    /// `a.b`, used between units.
    Point,
}

/// A comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    Equal,
    Unequal,
    Less,
    LessOrEqual,
    More,
    MoreOrEqual,
}

impl Relation {
    /// The symbol the operator is written with.
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::Unequal => "!=",
            Relation::Less => "<",
            Relation::LessOrEqual => "<=",
            Relation::More => ">",
            Relation::MoreOrEqual => ">=",
        }
    }

    /// The operator obtained by swapping the operands: `a < b` is `b > a`.
    pub fn mirror(self) -> Self {
        match self {
            Relation::Less => Relation::More,
            Relation::LessOrEqual => Relation::MoreOrEqual,
            Relation::More => Relation::Less,
            Relation::MoreOrEqual => Relation::LessOrEqual,
            other => other,
        }
    }
}

/// The side a limit is approached from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LimitSide {
    Plus,
    Minus,
}

/// The kind of a node, with the data of leaf nodes.
///
/// Children live in [`Node::children`]. The number of children is fixed by the kind:
///
/// - none for leaves;
/// - one for signs, brackets, percentages, functions and limits;
/// - two for the binary operators and relations;
/// - any number for [`Kind::Sum`], [`Kind::Relations`] and [`Kind::Time`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Number(Number),
    Symbol(String),
    Identifier(String),
    Hole,
    Boolean(bool),
    Template(String),
    Positive,
    Opposite,
    Percentage,
    SegmentLength { begin: String, end: String },
    Limit(LimitSide),
    Bracket,
    Function(Func),
    Gcd,
    Mod,
    Min,
    MinPreserve,
    Max,
    MaxPreserve,
    Sum,
    Difference,
    Product(ProductKind),
    Division,
    Quotient,
    Power,
    Time,
    Relation(Relation),

    /// A chain such as `a < b <= c`, with one operator between each pair of children.
    Relations(Vec<Relation>),
    Error(String),
}

impl Kind {
    /// Returns a short name of this kind, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Number(_) => "number",
            Kind::Symbol(_) => "symbol",
            Kind::Identifier(_) => "identifier",
            Kind::Hole => "hole",
            Kind::Boolean(_) => "boolean",
            Kind::Template(_) => "template",
            Kind::Positive => "positive",
            Kind::Opposite => "opposite",
            Kind::Percentage => "percentage",
            Kind::SegmentLength { .. } => "segment length",
            Kind::Limit(_) => "limit",
            Kind::Bracket => "bracket",
            Kind::Function(func) => func.name(),
            Kind::Gcd => "gcd",
            Kind::Mod => "mod",
            Kind::Min => "mini",
            Kind::MinPreserve => "minip",
            Kind::Max => "maxi",
            Kind::MaxPreserve => "maxip",
            Kind::Sum => "sum",
            Kind::Difference => "difference",
            Kind::Product(_) => "product",
            Kind::Division => "division",
            Kind::Quotient => "quotient",
            Kind::Power => "power",
            Kind::Time => "time",
            Kind::Relation(_) => "relation",
            Kind::Relations(_) => "relations",
            Kind::Error(_) => "error",
        }
    }

    /// Returns true if this kind is a function call, written `name(arguments)`.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Kind::Function(_)
                | Kind::Gcd
                | Kind::Mod
                | Kind::Min
                | Kind::MinPreserve
                | Kind::Max
                | Kind::MaxPreserve
        )
    }

    /// Returns true if this kind is one of the product variants.
    pub fn is_product(&self) -> bool {
        matches!(self, Kind::Product(_))
    }
}

/// A node of the expression tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// The kind of the node.
    pub kind: Kind,

    /// The children, in order.
    pub children: Vec<ExprId>,

    /// The unit the value is measured in.
    pub unit: Option<Unit>,

    /// The region of the source the node was parsed from. Nodes built by the engine span `0..0`.
    pub span: Range<usize>,
}

/// The arena that owns expression nodes, their parent links and their memoized normal forms.
#[derive(Debug, Default)]
pub struct Context {
    nodes: Vec<Node>,
    parents: Vec<Option<ExprId>>,
    normals: HashMap<ExprId, Normal>,
    options: Options,
}

impl Context {
    /// Creates an empty context with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context with the given options.
    pub fn with_options(options: Options) -> Self {
        Self { options, ..Self::default() }
    }

    /// Returns the options of this context.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node with the given kind, children, unit and span.
    ///
    /// The children must match the arity of `kind`. Children that already have a parent are
    /// copied, so that every node keeps a single parent.
    pub fn add_node(
        &mut self,
        kind: Kind,
        children: Vec<ExprId>,
        unit: Option<Unit>,
        span: Range<usize>,
    ) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);

        // reserve the slot, so that the children can already point at it
        self.nodes.push(Node { kind, children: Vec::new(), unit, span });
        self.parents.push(None);

        let children = children.into_iter()
            .map(|child| {
                let child = if self.parents[child.index()].is_some() {
                    self.copy(child)
                } else {
                    child
                };
                self.parents[child.index()] = Some(id);
                child
            })
            .collect();
        self.nodes[id.index()].children = children;
        id
    }

    /// Adds a node with the given kind and children, without unit and with an empty span.
    pub fn add(&mut self, kind: Kind, children: Vec<ExprId>) -> ExprId {
        self.add_node(kind, children, None, 0..0)
    }

    /// Deep-copies the subtree rooted at `id`. The copy has no parent, and shares the memoized
    /// normal forms of the original.
    pub fn copy(&mut self, id: ExprId) -> ExprId {
        let node = self.nodes[id.index()].clone();
        let children = node.children.iter().map(|&child| self.copy(child)).collect();
        let copy = self.add_node(node.kind, children, node.unit, node.span);
        if let Some(normal) = self.normals.get(&id).cloned() {
            self.normals.insert(copy, normal);
        }
        copy
    }

    /// Returns the node with the given handle.
    pub fn node(&self, id: ExprId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the kind of the given node.
    pub fn kind(&self, id: ExprId) -> &Kind {
        &self.node(id).kind
    }

    /// Returns the children of the given node.
    pub fn children(&self, id: ExprId) -> &[ExprId] {
        &self.node(id).children
    }

    /// Returns the first child of the given node.
    ///
    /// # Panics
    ///
    /// Panics if the node is a leaf.
    pub fn first(&self, id: ExprId) -> ExprId {
        self.children(id)[0]
    }

    /// Returns the last child of the given node.
    ///
    /// # Panics
    ///
    /// Panics if the node is a leaf.
    pub fn last(&self, id: ExprId) -> ExprId {
        self.children(id)[self.children(id).len() - 1]
    }

    /// Returns the unit attached to the given node.
    pub fn unit(&self, id: ExprId) -> Option<&Unit> {
        self.node(id).unit.as_ref()
    }

    /// Returns the span of the given node.
    pub fn span(&self, id: ExprId) -> Range<usize> {
        self.node(id).span.clone()
    }

    /// Returns the parent of the given node.
    pub fn parent(&self, id: ExprId) -> Option<ExprId> {
        self.parents[id.index()]
    }

    /// Returns the root of the tree the given node belongs to.
    pub fn root(&self, mut id: ExprId) -> ExprId {
        while let Some(parent) = self.parent(id) {
            id = parent;
        }
        id
    }

    /// Returns the position of the given node among the children of its parent.
    pub fn pos(&self, id: ExprId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Returns true if the given node is the first child of its parent.
    pub fn is_first(&self, id: ExprId) -> bool {
        self.pos(id) == Some(0)
    }

    /// Returns true if the given node is the last child of its parent.
    pub fn is_last(&self, id: ExprId) -> bool {
        match self.parent(id) {
            Some(parent) => self.pos(id) == Some(self.children(parent).len() - 1),
            None => false,
        }
    }

    /// Returns an iterator over the subtree rooted at `id`, in post-order.
    pub fn post_order_iter(&self, id: ExprId) -> ExprIter<'_> {
        ExprIter::new(self, id)
    }

    /// Returns the memoized normal form of `id`, if it has been computed.
    pub(crate) fn memoized(&self, id: ExprId) -> Option<&Normal> {
        self.normals.get(&id)
    }

    /// Memoizes the normal form of `id`.
    pub(crate) fn memoize(&mut self, id: ExprId, normal: Normal) {
        self.normals.insert(id, normal);
    }

    // builders

    /// Adds a number literal.
    pub fn number(&mut self, number: Number) -> ExprId {
        self.add(Kind::Number(number), Vec::new())
    }

    /// Parses and adds a decimal number literal, such as `3.25`.
    pub fn decimal(&mut self, s: &str) -> Result<ExprId, InvalidNumber> {
        let number = s.parse()?;
        Ok(self.number(number))
    }

    /// Adds the given integer. Negative integers are built as the opposite of a literal.
    pub fn int(&mut self, n: impl Into<Integer>) -> ExprId {
        let n = n.into();
        let literal = self.number(Number::from_integer(&n));
        if n < 0 {
            self.opposite(literal)
        } else {
            literal
        }
    }

    /// Adds a symbol.
    pub fn symbol(&mut self, name: &str) -> ExprId {
        self.add(Kind::Symbol(name.to_owned()), Vec::new())
    }

    /// Adds an identifier.
    pub fn identifier(&mut self, name: &str) -> ExprId {
        self.add(Kind::Identifier(name.to_owned()), Vec::new())
    }

    /// Adds a hole, a placeholder for a missing expression.
    pub fn hole(&mut self) -> ExprId {
        self.add(Kind::Hole, Vec::new())
    }

    /// Adds a boolean.
    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.add(Kind::Boolean(value), Vec::new())
    }

    /// Adds an exercise template of the given nature, such as `$e`.
    pub fn template(&mut self, nature: &str, children: Vec<ExprId>) -> ExprId {
        self.add(Kind::Template(nature.to_owned()), children)
    }

    /// Adds the length of the segment between two named points.
    pub fn segment_length(&mut self, begin: &str, end: &str) -> ExprId {
        self.add(
            Kind::SegmentLength { begin: begin.to_owned(), end: end.to_owned() },
            Vec::new(),
        )
    }

    /// Adds an error leaf, left by a failed parse.
    pub fn error(&mut self, message: &str) -> ExprId {
        self.add(Kind::Error(message.to_owned()), Vec::new())
    }

    pub fn positive(&mut self, child: ExprId) -> ExprId {
        self.add(Kind::Positive, vec![child])
    }

    pub fn opposite(&mut self, child: ExprId) -> ExprId {
        self.add(Kind::Opposite, vec![child])
    }

    pub fn bracket(&mut self, child: ExprId) -> ExprId {
        self.add(Kind::Bracket, vec![child])
    }

    pub fn percentage(&mut self, child: ExprId) -> ExprId {
        self.add(Kind::Percentage, vec![child])
    }

    /// Adds a call to a function of one argument.
    pub fn func(&mut self, func: Func, child: ExprId) -> ExprId {
        self.add(Kind::Function(func), vec![child])
    }

    pub fn radical(&mut self, child: ExprId) -> ExprId {
        self.func(Func::Radical, child)
    }

    /// Adds a limit, such as `0+`.
    pub fn limit(&mut self, side: LimitSide, child: ExprId) -> ExprId {
        self.add(Kind::Limit(side), vec![child])
    }

    pub fn sum(&mut self, children: Vec<ExprId>) -> ExprId {
        self.add(Kind::Sum, children)
    }

    pub fn difference(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.add(Kind::Difference, vec![left, right])
    }

    /// Adds an explicit product `left*right`.
    pub fn product(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.product_of(ProductKind::Explicit, left, right)
    }

    pub fn product_of(&mut self, kind: ProductKind, left: ExprId, right: ExprId) -> ExprId {
        self.add(Kind::Product(kind), vec![left, right])
    }

    /// Adds a division `left:right`.
    pub fn division(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.add(Kind::Division, vec![left, right])
    }

    /// Adds a quotient `left/right`.
    pub fn quotient(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.add(Kind::Quotient, vec![left, right])
    }

    pub fn power(&mut self, base: ExprId, exponent: ExprId) -> ExprId {
        self.add(Kind::Power, vec![base, exponent])
    }

    /// Adds a binary function such as [`Kind::Gcd`] or [`Kind::Max`].
    pub fn binary(&mut self, kind: Kind, left: ExprId, right: ExprId) -> ExprId {
        self.add(kind, vec![left, right])
    }

    /// Adds a duration written as a sequence of components, like `1 h 30 min`.
    pub fn time(&mut self, components: Vec<ExprId>) -> ExprId {
        self.add(Kind::Time, components)
    }

    pub fn relation(&mut self, relation: Relation, left: ExprId, right: ExprId) -> ExprId {
        self.add(Kind::Relation(relation), vec![left, right])
    }

    /// Adds a chain of comparisons, with `ops[i]` between `children[i]` and `children[i + 1]`.
    pub fn relations(&mut self, ops: Vec<Relation>, children: Vec<ExprId>) -> ExprId {
        self.add(Kind::Relations(ops), children)
    }

    /// Returns a copy of the given node with the unit attached.
    pub fn with_unit(&mut self, id: ExprId, unit: Unit) -> ExprId {
        let node = self.node(id).clone();
        let children = node.children.iter().map(|&child| self.copy(child)).collect();
        self.add_node(node.kind, children, Some(unit), node.span)
    }

    /// Returns a copy of the given node with the unit removed.
    pub fn without_unit(&mut self, id: ExprId) -> ExprId {
        if self.unit(id).is_none() {
            return id;
        }
        let node = self.node(id).clone();
        let children = node.children.iter().map(|&child| self.copy(child)).collect();
        self.add_node(node.kind, children, None, node.span)
    }

    // predicates

    /// Returns the integer value of a literal, looking through signs and brackets.
    pub fn integer_value(&self, id: ExprId) -> Option<Integer> {
        match self.kind(id) {
            Kind::Number(n) => n.to_integer().cloned(),
            Kind::Opposite => self.integer_value(self.first(id)).map(|n| -n),
            Kind::Positive | Kind::Bracket => self.integer_value(self.first(id)),
            _ => None,
        }
    }

    /// Returns true if the node is an integer literal, possibly signed or bracketed.
    pub fn is_int(&self, id: ExprId) -> bool {
        self.integer_value(id).is_some()
    }

    pub fn is_even(&self, id: ExprId) -> bool {
        self.integer_value(id).is_some_and(|n| n.is_even())
    }

    pub fn is_odd(&self, id: ExprId) -> bool {
        self.integer_value(id).is_some_and(|n| n.is_odd())
    }

    /// Returns true if the node is a literal zero, possibly signed or bracketed.
    pub fn is_zero(&self, id: ExprId) -> bool {
        match self.kind(id) {
            Kind::Number(n) => n.value().cmp0().is_eq(),
            Kind::Opposite | Kind::Positive | Kind::Bracket => self.is_zero(self.first(id)),
            _ => false,
        }
    }

    /// Returns true if the node is a literal one, possibly bracketed.
    pub fn is_one(&self, id: ExprId) -> bool {
        match self.kind(id) {
            Kind::Number(n) => *n.value() == 1,
            Kind::Positive | Kind::Bracket => self.is_one(self.first(id)),
            _ => false,
        }
    }

    /// Returns true if the node is a function call.
    pub fn is_function(&self, id: ExprId) -> bool {
        self.kind(id).is_function()
    }

    /// Returns true if the subtree has a value without substitution: it contains no symbol
    /// other than the constants, and no placeholder.
    pub fn is_numeric(&self, id: ExprId) -> bool {
        self.post_order_iter(id).all(|node| match self.kind(node) {
            Kind::Symbol(name) => is_constant(name),
            Kind::Identifier(_)
                | Kind::Hole
                | Kind::Template(_)
                | Kind::SegmentLength { .. }
                | Kind::Limit(_)
                | Kind::Error(_) => false,
            _ => true,
        })
    }

    /// Returns the symbols of the subtree that are not constants, in order of first appearance.
    pub fn symbols(&self, id: ExprId) -> Vec<String> {
        let mut symbols = Vec::new();
        for node in self.post_order_iter(id) {
            if let Kind::Symbol(name) = self.kind(node) {
                if !is_constant(name) && !symbols.contains(name) {
                    symbols.push(name.clone());
                }
            }
        }
        symbols
    }

    fn has_quantity(&self, id: ExprId, quantity: Quantity) -> bool {
        self.unit(id).is_some_and(|unit| unit.quantity(self) == Some(quantity))
    }

    /// Returns true if the node is measured in a duration unit.
    pub fn is_duration(&self, id: ExprId) -> bool {
        self.has_quantity(id, Quantity::Duration)
    }

    /// Returns true if the node is measured in a length unit.
    pub fn is_length(&self, id: ExprId) -> bool {
        self.has_quantity(id, Quantity::Length)
    }

    /// Returns true if the node is measured in a mass unit.
    pub fn is_mass(&self, id: ExprId) -> bool {
        self.has_quantity(id, Quantity::Mass)
    }

    /// Returns true if the node is measured in a currency.
    pub fn is_currency(&self, id: ExprId) -> bool {
        self.has_quantity(id, Quantity::Currency)
    }

    /// Returns true if the node is measured in a capacity unit, such as `L`.
    pub fn is_capacity(&self, id: ExprId) -> bool {
        self.has_quantity(id, Quantity::Capacity)
    }

    /// Returns true if the node is measured in a volume unit: a capacity or a length cubed.
    pub fn is_volume(&self, id: ExprId) -> bool {
        self.unit(id).is_some_and(|unit| unit.is_volume(self))
    }

    // accessors

    /// Returns the signed terms of a chain of sums and differences. A node that is not a sum
    /// or a difference is its own single positive term.
    pub fn terms(&self, id: ExprId) -> Vec<(Sign, ExprId)> {
        match self.kind(id) {
            Kind::Sum => self.children(id).iter().flat_map(|&child| self.terms(child)).collect(),
            Kind::Difference => {
                let mut terms = self.terms(self.first(id));
                terms.extend(
                    self.terms(self.last(id))
                        .into_iter()
                        .map(|(sign, term)| (sign.flip(), term)),
                );
                terms
            },
            _ => vec![(Sign::Positive, id)],
        }
    }

    /// Returns the factors of a chain of products. A node that is not a product is its own
    /// single factor.
    pub fn factors(&self, id: ExprId) -> Vec<ExprId> {
        match self.kind(id) {
            Kind::Product(_) => {
                self.children(id).iter().flat_map(|&child| self.factors(child)).collect()
            },
            _ => vec![id],
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn parent_links() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let two = ctx.int(2);
        let product = ctx.product(two, x);
        let one = ctx.int(1);
        let sum = ctx.sum(vec![product, one]);

        assert_eq!(ctx.parent(x), Some(product));
        assert_eq!(ctx.parent(product), Some(sum));
        assert_eq!(ctx.root(x), sum);
        assert!(ctx.is_first(two));
        assert!(ctx.is_last(x));
        assert!(!ctx.is_first(x));
        assert_eq!(ctx.parent(sum), None);
    }

    #[test]
    fn shared_child_is_copied() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let first = ctx.opposite(x);
        let second = ctx.bracket(x);

        assert_eq!(ctx.first(first), x);
        let copy = ctx.first(second);
        assert_ne!(copy, x);
        assert_eq!(ctx.kind(copy), &Kind::Symbol("x".to_string()));
        assert_eq!(ctx.parent(copy), Some(second));
        assert_eq!(ctx.parent(x), Some(first));
    }

    #[test]
    fn repeated_child_is_copied() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let sum = ctx.sum(vec![x, x]);
        let children = ctx.children(sum).to_vec();
        assert_ne!(children[0], children[1]);
        assert!(ctx.is_first(children[0]));
        assert!(ctx.is_last(children[1]));
    }

    #[test]
    fn negative_integers() {
        let mut ctx = Context::new();
        let n = ctx.int(-3);
        assert_eq!(ctx.kind(n), &Kind::Opposite);
        assert_eq!(ctx.integer_value(n), Some(Integer::from(-3)));
        assert!(ctx.is_odd(n));
        assert!(!ctx.is_even(n));
    }

    #[test]
    fn predicates() {
        let mut ctx = Context::new();
        let zero = ctx.int(0);
        let minus_zero = ctx.opposite(zero);
        assert!(ctx.is_zero(minus_zero));

        let one = ctx.decimal("1.0").unwrap();
        assert!(ctx.is_one(one));

        let pi = ctx.symbol("pi");
        let cos = ctx.func(Func::Cos, pi);
        assert!(ctx.is_numeric(cos));
        assert!(ctx.is_function(cos));

        let x = ctx.symbol("x");
        let y = ctx.symbol("y");
        let two = ctx.int(2);
        let xy = ctx.product(x, y);
        let sum = ctx.sum(vec![xy, two]);
        assert!(!ctx.is_numeric(sum));
        assert_eq!(ctx.symbols(sum), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn terms_and_factors() {
        let mut ctx = Context::new();
        let a = ctx.symbol("a");
        let b = ctx.symbol("b");
        let c = ctx.symbol("c");
        let d = ctx.symbol("d");
        let diff = ctx.difference(b, c);
        let inner = ctx.sum(vec![a, diff]);
        let expr = ctx.difference(inner, d);

        let terms = ctx.terms(expr)
            .into_iter()
            .map(|(sign, term)| (sign, ctx.kind(term).clone()))
            .collect::<Vec<_>>();
        assert_eq!(terms, vec![
            (Sign::Positive, Kind::Symbol("a".to_string())),
            (Sign::Positive, Kind::Symbol("b".to_string())),
            (Sign::Negative, Kind::Symbol("c".to_string())),
            (Sign::Negative, Kind::Symbol("d".to_string())),
        ]);

        let x = ctx.symbol("x");
        let y = ctx.symbol("y");
        let z = ctx.symbol("z");
        let xy = ctx.product(x, y);
        let xyz = ctx.product_of(ProductKind::Implicit, xy, z);
        assert_eq!(ctx.factors(xyz).len(), 3);
    }
}
