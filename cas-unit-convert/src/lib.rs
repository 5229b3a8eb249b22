//! The primitive unit table used by the canonicalization engine.
//!
//! Every primitive unit belongs to a [`Quantity`] and converts exactly to the base unit of that
//! quantity (`m`, `g`, `ms`, `L`, `€` and `°`). Conversion factors are [`rug::Rational`]s, so no
//! precision is lost when converting between units of the same quantity.
//!
//! Units are parsed with [`FromStr`](std::str::FromStr):
//!
//! ```
//! use cas_unit_convert::{CompoundUnit, Length, Unit};
//!
//! let unit: Unit = "cm^3".parse().unwrap();
//! assert_eq!(unit, Length::Centimeter.cubed());
//!
//! let speed: CompoundUnit = "km/h".parse().unwrap();
//! assert_eq!(speed.units().len(), 2);
//! ```
//!
//! Capacities are the only units that convert across quantities: a capacity is a length cubed,
//! with `1 L = 1/1000 m^3`.

pub mod convert;
pub mod unit;

pub use convert::Convert;
pub use unit::{
    Angle,
    Base,
    Capacity,
    CompoundUnit,
    ConversionError,
    Currency,
    Duration,
    InvalidUnit,
    Length,
    Mass,
    Quantity,
    Unit,
};
