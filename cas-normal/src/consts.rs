//! Constants resolved by the decimal evaluator without a substituted value.
//!
//! The statics hold the constants at the default [`PRECISION`]. Other precisions are computed on
//! demand.

use once_cell::sync::Lazy;
use rug::{float::Constant, Float};
use super::primitive::{float, float_with, PRECISION};

/// The symbol name of the circle constant.
pub const PI_SYMBOL: &str = "pi";

/// The symbol name of Euler's number.
pub const E_SYMBOL: &str = "e";

pub static PI: Lazy<Float> = Lazy::new(|| float(Constant::Pi));

/// Euler's number.
pub static E: Lazy<Float> = Lazy::new(|| float(1).exp());

/// Returns the value of the named constant at the given precision, or [`None`] if the symbol is
/// not a constant.
pub fn constant(name: &str, precision: u32) -> Option<Float> {
    match name {
        PI_SYMBOL if precision == PRECISION => Some(PI.clone()),
        E_SYMBOL if precision == PRECISION => Some(E.clone()),
        PI_SYMBOL => Some(float_with(precision, Constant::Pi)),
        E_SYMBOL => Some(float_with(precision, 1).exp()),
        _ => None,
    }
}

/// Returns true if the given symbol name is a constant.
pub fn is_constant(name: &str) -> bool {
    matches!(name, PI_SYMBOL | E_SYMBOL)
}
