//! Canonical normal forms of symbolic expressions, and the equivalence checks built on them.
//!
//! Expressions are stored in a [`Context`], an arena of nodes addressed by [`ExprId`]. Every
//! node has a [`Normal`] form: a quotient of two sums of products, where sums and products are
//! canonical lists kept sorted by a total order on expressions ([`compare`]). Two expressions
//! are equivalent if their normal forms are equal:
//!
//! ```
//! use cas_normal::Context;
//!
//! let mut ctx = Context::new();
//! let x = ctx.symbol("x");
//! let one = ctx.int(1);
//! let sum = ctx.sum(vec![x, one]);
//! let two = ctx.int(2);
//! let square = ctx.power(sum, two);
//!
//! let expanded = ctx.normalize(square).unwrap();
//! assert_eq!(ctx.string(expanded), "1+2*x+x^2");
//! ```
//!
//! Numbers are exact [`Fraction`]s. Radicals of integers are reduced over the prime factors
//! of the radicand, and quantities with a [`Unit`] are measured in the base unit of their
//! quantity, so that `1 km + 50 m` is `1050 m`.
//!
//! Errors are reported as [`cas_error::Error`]s; the kinds of errors are in [`error`].

pub mod compare;
pub mod consts;
pub mod decimal;
pub mod error;
pub mod eval;
pub mod expr;
pub mod fraction;
pub mod normal;
pub mod options;
pub mod primitive;
pub mod transform;
pub mod unit;

pub use cas_error::Error;
pub use expr::{Context, ExprId, Kind};
pub use fraction::Fraction;
pub use normal::Normal;
pub use options::{EvalOptions, FormatOptions, Options};
pub use unit::Unit;
