//! Text rendering of expressions.
//!
//! The renderer makes no semantic decision: it writes the tree as it is, adding grouping
//! parentheses only where a node would otherwise be read differently, such as the sum in the
//! numerator of a quotient.

use crate::options::FormatOptions;
use std::fmt::{self, Display, Formatter};
use super::{Context, ExprId, Kind, LimitSide, Number, ProductKind};

/// Displays an expression with the given [`FormatOptions`].
#[derive(Clone, Copy, Debug)]
pub struct ExprDisplay<'a> {
    ctx: &'a Context,
    id: ExprId,
    options: FormatOptions,

    /// Set while writing a unit, where products are written `a.b`.
    unit: bool,
}

impl Context {
    /// Returns a value that displays the given expression with the default options.
    pub fn display(&self, id: ExprId) -> ExprDisplay<'_> {
        self.display_with(id, FormatOptions::default())
    }

    /// Returns a value that displays the given expression with the given options.
    pub fn display_with(&self, id: ExprId, options: FormatOptions) -> ExprDisplay<'_> {
        ExprDisplay { ctx: self, id, options, unit: false }
    }

    /// Returns a value that displays the given unit expression.
    pub(crate) fn display_unit(&self, id: ExprId) -> ExprDisplay<'_> {
        ExprDisplay { ctx: self, id, options: FormatOptions::default(), unit: true }
    }

    /// Returns the text of the given expression, with the default options.
    pub fn string(&self, id: ExprId) -> String {
        self.display(id).to_string()
    }
}

/// Returns true if a value of this kind is written without braces before its unit.
fn is_atomic(kind: &Kind) -> bool {
    matches!(
        kind,
        Kind::Symbol(_) | Kind::Number(_) | Kind::Bracket | Kind::Hole | Kind::Template(_)
    )
}

/// Inserts a space between groups of three digits in the integer part of a number.
fn group_thousands(s: &str) -> String {
    let (whole, rest) = match s.find(['.', ',']) {
        Some(index) => s.split_at(index),
        None => (s, ""),
    };
    if whole.len() <= 3 {
        return s.to_owned();
    }

    let mut grouped = String::with_capacity(s.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped.push_str(rest);
    grouped
}

impl ExprDisplay<'_> {
    fn with(&self, id: ExprId) -> Self {
        Self { id, ..*self }
    }

    fn kind(&self, id: ExprId) -> &Kind {
        self.ctx.kind(id)
    }

    fn write_number(&self, f: &mut Formatter<'_>, n: &Number) -> fmt::Result {
        let mut s = n.input().to_owned();
        if self.options.add_spaces {
            s = group_thousands(&s);
        }
        if self.options.comma {
            s = s.replace('.', ",");
        }
        write!(f, "{}", s)
    }

    /// Writes a child, in parentheses if `group` is true.
    fn write_grouped(&self, f: &mut Formatter<'_>, id: ExprId, group: bool) -> fmt::Result {
        if group {
            write!(f, "({})", self.with(id))
        } else {
            write!(f, "{}", self.with(id))
        }
    }

    /// Writes a function call with its arguments separated by `;`.
    fn write_call(&self, f: &mut Formatter<'_>, name: &str, args: &[ExprId]) -> fmt::Result {
        write!(f, "{}(", name)?;
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{}", self.with(arg))?;
        }
        write!(f, ")")
    }

    /// Returns true if an explicit product can be written as juxtaposition before `right`.
    fn can_use_implicit(&self, right: ExprId) -> bool {
        match self.kind(right) {
            Kind::Bracket | Kind::Function(_) | Kind::Symbol(_) => true,
            Kind::Power => matches!(self.kind(self.ctx.first(right)), Kind::Symbol(_)),
            _ => false,
        }
    }

    fn write_value(&self, f: &mut Formatter<'_>, id: ExprId) -> fmt::Result {
        let children = self.ctx.children(id);
        match self.kind(id) {
            Kind::Number(n) => self.write_number(f, n),
            Kind::Symbol(name) | Kind::Identifier(name) => write!(f, "{}", name),
            Kind::Hole => write!(f, "?"),
            Kind::Boolean(value) => write!(f, "{}", value),
            Kind::Template(nature) => {
                write!(f, "{}", nature)?;
                if children.is_empty() {
                    Ok(())
                } else {
                    self.write_call(f, "", children)
                }
            },
            Kind::SegmentLength { begin, end } => write!(f, "{}{}", begin, end),
            Kind::Error(message) => write!(f, "{}", message),
            Kind::Positive | Kind::Opposite => {
                let sign = if matches!(self.kind(id), Kind::Positive) { "+" } else { "-" };
                let child = children[0];
                let group = self.options.add_brackets
                    && matches!(self.kind(child), Kind::Opposite | Kind::Positive);
                write!(f, "{}", sign)?;
                self.write_grouped(f, child, group)
            },
            Kind::Percentage => write!(f, "{}%", self.with(children[0])),
            Kind::Limit(side) => {
                let sign = match side {
                    LimitSide::Plus => "+",
                    LimitSide::Minus => "-",
                };
                write!(f, "{}{}", self.with(children[0]), sign)
            },
            Kind::Bracket => write!(f, "({})", self.with(children[0])),
            Kind::Function(func) => self.write_call(f, func.name(), children),
            Kind::Gcd => self.write_call(f, "pgcd", children),
            Kind::Mod => self.write_call(f, "mod", children),
            Kind::Min => self.write_call(f, "mini", children),
            Kind::MinPreserve => self.write_call(f, "minip", children),
            Kind::Max => self.write_call(f, "maxi", children),
            Kind::MaxPreserve => self.write_call(f, "maxip", children),
            Kind::Sum => {
                for (i, &child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "+")?;
                    }
                    write!(f, "{}", self.with(child))?;
                }
                Ok(())
            },
            Kind::Difference => {
                write!(f, "{}-{}", self.with(children[0]), self.with(children[1]))
            },
            Kind::Product(kind) => {
                let op = match kind {
                    _ if self.unit => ".",
                    ProductKind::Explicit if self.options.implicit
                        && self.can_use_implicit(children[1]) => "",
                    ProductKind::Explicit => "*",
                    ProductKind::Implicit => "",
                    ProductKind::Point => ".",
                };
                write!(f, "{}{}{}", self.with(children[0]), op, self.with(children[1]))
            },
            Kind::Division => {
                write!(f, "{}:{}", self.with(children[0]), self.with(children[1]))
            },
            Kind::Quotient => {
                let (n, d) = (children[0], children[1]);
                let group_n = matches!(
                    self.kind(n),
                    Kind::Opposite | Kind::Sum | Kind::Difference
                );
                let group_d = matches!(
                    self.kind(d),
                    Kind::Product(_) | Kind::Division | Kind::Quotient
                        | Kind::Opposite | Kind::Sum | Kind::Difference
                );
                self.write_grouped(f, n, group_n)?;
                write!(f, "/")?;
                self.write_grouped(f, d, group_d)
            },
            Kind::Power => {
                let (base, exponent) = (children[0], children[1]);
                write!(f, "{}^", self.with(base))?;
                match self.kind(exponent) {
                    Kind::Symbol(_) | Kind::Number(_) | Kind::Hole | Kind::Bracket => {
                        write!(f, "{}", self.with(exponent))
                    },
                    _ => write!(f, "{{{}}}", self.with(exponent)),
                }
            },
            Kind::Time => {
                let mut first = true;
                for &child in children.iter().filter(|&&child| !self.ctx.is_zero(child)) {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", self.with(child))?;
                    first = false;
                }
                Ok(())
            },
            Kind::Relation(relation) => {
                write!(
                    f,
                    "{}{}{}",
                    self.with(children[0]),
                    relation.symbol(),
                    self.with(children[1])
                )
            },
            Kind::Relations(ops) => {
                write!(f, "{}", self.with(children[0]))?;
                for (op, &child) in ops.iter().zip(&children[1..]) {
                    write!(f, "{}{}", op.symbol(), self.with(child))?;
                }
                Ok(())
            },
        }
    }
}

impl Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let node = self.ctx.node(self.id);
        let unit = node.unit.as_ref().filter(|_| self.options.show_unit && !self.unit);
        let Some(unit) = unit else {
            return self.write_value(f, self.id);
        };

        if is_atomic(&node.kind) {
            self.write_value(f, self.id)?;
        } else {
            write!(f, "{{")?;
            self.write_value(f, self.id)?;
            write!(f, "}}")?;
        }
        write!(f, " {}", ExprDisplay { id: unit.expr(), unit: true, ..*self })
    }
}

#[cfg(test)]
mod tests {
    use crate::{expr::{Func, Relation}, unit::Unit};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn products() {
        let mut ctx = Context::new();
        let two = ctx.int(2);
        let x = ctx.symbol("x");
        let product = ctx.product(two, x);
        assert_eq!(ctx.string(product), "2*x");

        let options = FormatOptions { implicit: true, ..FormatOptions::default() };
        assert_eq!(ctx.display_with(product, options).to_string(), "2x");

        let a = ctx.symbol("a");
        let b = ctx.symbol("b");
        let point = ctx.product_of(ProductKind::Point, a, b);
        assert_eq!(ctx.string(point), "a.b");
    }

    #[test]
    fn quotients_group_compound_operands() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let one = ctx.int(1);
        let sum = ctx.sum(vec![x, one]);
        let two = ctx.int(2);
        let y = ctx.symbol("y");
        let product = ctx.product(two, y);
        let quotient = ctx.quotient(sum, product);
        assert_eq!(ctx.string(quotient), "(x+1)/(2*y)");
    }

    #[test]
    fn power_exponents() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let n = ctx.symbol("n");
        let one = ctx.int(1);
        let exponent = ctx.sum(vec![n, one]);
        let power = ctx.power(x, exponent);
        assert_eq!(ctx.string(power), "x^{n+1}");

        let y = ctx.symbol("y");
        let two = ctx.int(2);
        let square = ctx.power(y, two);
        assert_eq!(ctx.string(square), "y^2");
    }

    #[test]
    fn numbers() {
        let mut ctx = Context::new();
        let n = ctx.decimal("12345.5").unwrap();
        let options = FormatOptions { comma: true, add_spaces: true, ..FormatOptions::default() };
        assert_eq!(ctx.display_with(n, options).to_string(), "12 345,5");
        assert_eq!(ctx.string(n), "12345.5");
    }

    #[test]
    fn functions_and_relations() {
        let mut ctx = Context::new();
        let four = ctx.int(4);
        let six = ctx.int(6);
        let gcd = ctx.binary(Kind::Gcd, four, six);
        assert_eq!(ctx.string(gcd), "pgcd(4;6)");

        let x = ctx.symbol("x");
        let sqrt = ctx.func(Func::Radical, x);
        assert_eq!(ctx.string(sqrt), "sqrt(x)");

        let y = ctx.symbol("y");
        let two = ctx.int(2);
        let relation = ctx.relation(Relation::LessOrEqual, y, two);
        assert_eq!(ctx.string(relation), "y<=2");

        let a = ctx.int(1);
        let b = ctx.symbol("b");
        let c = ctx.int(3);
        let chain = ctx.relations(vec![Relation::Less, Relation::Less], vec![a, b, c]);
        assert_eq!(ctx.string(chain), "1<b<3");
    }

    #[test]
    fn signs() {
        let mut ctx = Context::new();
        let x = ctx.symbol("x");
        let inner = ctx.opposite(x);
        let outer = ctx.opposite(inner);
        assert_eq!(ctx.string(outer), "--x");
        let options = FormatOptions { add_brackets: true, ..FormatOptions::default() };
        assert_eq!(ctx.display_with(outer, options).to_string(), "-(-x)");
    }

    #[test]
    fn units() {
        let mut ctx = Context::new();
        let three = ctx.int(3);
        let km = Unit::parse(&mut ctx, "km").unwrap();
        let distance = ctx.with_unit(three, km);
        assert_eq!(ctx.string(distance), "3 km");

        let options = FormatOptions { show_unit: false, ..FormatOptions::default() };
        assert_eq!(ctx.display_with(distance, options).to_string(), "3");

        let x = ctx.symbol("x");
        let one = ctx.int(1);
        let sum = ctx.sum(vec![x, one]);
        let m = Unit::parse(&mut ctx, "m").unwrap();
        let length = ctx.with_unit(sum, m);
        assert_eq!(ctx.string(length), "{x+1} m");
    }

    #[test]
    fn time() {
        let mut ctx = Context::new();
        let one = ctx.int(1);
        let h = Unit::parse(&mut ctx, "h").unwrap();
        let hours = ctx.with_unit(one, h);
        let zero = ctx.int(0);
        let min = Unit::parse(&mut ctx, "min").unwrap();
        let no_minutes = ctx.with_unit(zero, min);
        let thirty = ctx.int(30);
        let s = Unit::parse(&mut ctx, "s").unwrap();
        let seconds = ctx.with_unit(thirty, s);
        let time = ctx.time(vec![hours, no_minutes, seconds]);
        assert_eq!(ctx.string(time), "1 h 30 s");
    }
}
