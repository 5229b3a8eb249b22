//! Errors that can occur while normalizing or evaluating an expression.

use ariadne::Fmt;
use cas_attrs::ErrorKind;
use cas_error::{ErrorKind, EXPR};

/// Two operands of an addition, subtraction or comparison carry units of different quantities.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot combine quantities in `{}` and `{}`", self.left, self.right),
    labels = ["these operands have incompatible units"],
    help = "both operands must be measured in units of the same quantity",
)]
pub struct UnitMismatch {
    /// The unit of the left operand, or `none`.
    pub left: String,

    /// The unit of the right operand, or `none`.
    pub right: String,
}

/// The value cannot be expressed in the requested unit.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot convert `{}` to `{}`", self.unit, self.target),
    labels = ["this value"],
)]
pub struct IncompatibleUnit {
    /// The unit of the value.
    pub unit: String,

    /// The requested unit.
    pub target: String,
}

/// A value was divided by zero.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "division by zero",
    labels = ["this denominator is zero"],
)]
pub struct DivisionByZero;

/// The unit abbreviation is not in the unit table.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not a known unit", self.name),
    labels = ["this unit"],
    help = if self.suggestions.is_empty() {
        "known units include `m`, `g`, `L`, `ms` and `€`".to_string()
    } else {
        format!(
            "did you mean {}?",
            self.suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    },
)]
pub struct UnknownUnit {
    /// The unit that was not found.
    pub name: String,

    /// Units with a similar abbreviation.
    pub suggestions: Vec<&'static str>,
}

/// The function has no value at the given argument.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is undefined at `{}`", self.function, self.argument),
    labels = ["this call"],
)]
pub struct UndefinedValue {
    /// The name of the function.
    pub function: &'static str,

    /// The argument the function was called with.
    pub argument: String,
}

/// An expression that failed to parse cannot be normalized.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot normalize an invalid expression: {}", self.message),
    labels = ["this expression"],
)]
pub struct ErrorNode {
    /// The message of the parse error.
    pub message: String,
}

/// A relation cannot be decided because one of its sides is not a number.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot decide `{}` because it is not numeric", self.relation),
    labels = ["this relation"],
    help = "substitute a value for every symbol first",
)]
pub struct NonNumericRelation {
    /// The relation that could not be decided.
    pub relation: String,
}

/// The decimal evaluator met a symbol without a value.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` must be substituted before evaluation", self.name),
    labels = ["this symbol"],
    help = format!("give `{}` a value in the evaluation options", (&self.name).fg(EXPR)),
)]
pub struct UnresolvedSymbol {
    /// The name of the symbol.
    pub name: String,
}

/// The decimal evaluator cannot compute this kind of expression.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot compute the decimal value of {}", self.what),
    labels = ["this expression"],
)]
pub struct NotEvaluable {
    /// A description of the expression.
    pub what: &'static str,
}
