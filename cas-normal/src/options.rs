//! Options that configure normalization, formatting and evaluation.

use crate::{expr::ExprId, primitive::{int, PRECISION}, unit::Unit};
use rug::{ops::Pow, Integer};
use std::collections::HashMap;

/// Options used by every operation of a [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// The largest integer that will be factored into primes, when expanding logarithms and
    /// reducing radicals. Larger integers are kept as opaque bases.
    pub factor_limit: Integer,

    /// The number of bits of precision used by the decimal evaluator.
    pub precision: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            factor_limit: int(10).pow(12),
            precision: PRECISION,
        }
    }
}

/// Formatting options for the text renderer.
///
/// Every option is a flag that only changes how the text looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatOptions {
    /// Display the unit attached to an expression.
    pub show_unit: bool,

    /// Use a decimal comma instead of a decimal point.
    pub comma: bool,

    /// Surround the operand of an opposite or positive sign with brackets when it is itself
    /// signed, and group every compound operand of a product.
    pub add_brackets: bool,

    /// Render explicit products as juxtaposition when the right operand allows it, like `2x`.
    pub implicit: bool,

    /// Separate groups of thousands in numbers with a space.
    pub add_spaces: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_unit: true,
            comma: false,
            add_brackets: false,
            implicit: false,
            add_spaces: false,
        }
    }
}

/// Options for [`Context::eval`](crate::Context::eval).
#[derive(Clone, Debug)]
pub struct EvalOptions {
    /// Return a decimal approximation instead of the exact value.
    pub decimal: bool,

    /// The number of decimal places of a decimal approximation.
    pub precision: u32,

    /// The unit the result should be expressed in.
    pub unit: Option<Unit>,

    /// Values substituted for symbols before evaluating.
    pub values: HashMap<String, ExprId>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            decimal: false,
            precision: 20,
            unit: None,
            values: HashMap::new(),
        }
    }
}
