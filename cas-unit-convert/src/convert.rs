//! Provides the [`Convert`] trait, which is implemented by every primitive unit enum.

use rug::Rational;
use super::unit::Unit;

/// A trait implemented by all primitive units, providing the information needed to convert
/// between them.
pub trait Convert {
    /// The base unit of this unit.
    ///
    /// The base unit is the unit in which conversions to other units of the same quantity are
    /// defined. For example, the base unit of length is the meter, and the base unit of duration
    /// is the millisecond. Every factor in the table is exact, so the choice of base unit never
    /// affects the precision of conversions.
    const BASE: Self;

    /// Returns the conversion factor from `&self` to [`Convert::BASE`], i.e. the value to multiply
    /// a quantity in this unit by, in order to get a quantity in [`Convert::BASE`]. If the `self`
    /// unit is the base unit, then this function returns `1`.
    ///
    /// For example, if [`Convert::BASE`] is the meter, the conversion factor for a centimeter
    /// is `1/100`.
    fn conversion_factor(&self) -> Rational;

    /// Defines the conversion factor from `&self` to a power of another quantity's base unit.
    /// Returns [`None`] if there is no conversion factor, meaning the two units are unrelated.
    ///
    /// Only [`Capacity`] implements this: capacities are measurements of length cubed, and
    /// `1 L = 1/1000 m^3`.
    ///
    /// [`Capacity`]: super::Capacity
    fn conversion_factor_to(&self, _: impl Into<Unit>) -> Option<Rational> {
        None
    }
}
