use rug::{ops::Pow, Rational};
use std::{error::Error, fmt::{self, Display, Formatter}, str::FromStr};
use super::convert::Convert;

/// Builds an exact conversion factor.
fn ratio(n: u64, d: u64) -> Rational {
    Rational::from((n, d))
}

/// A compound unit, created by combining multiple [`Unit`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct CompoundUnit {
    /// The units that make up this compound unit.
    units: Vec<Unit>,
}

impl Display for CompoundUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.units.split_first() else {
            return Ok(());
        };

        // there is no `/` or `.` preceding the first unit, so we format it separately
        write!(f, "{}", first)?;

        for unit in rest {
            if unit.power > 0 {
                write!(f, ".{}", unit.base)?;
            } else {
                write!(f, "/{}", unit.base)?;
            }
            if unit.power.abs() > 1 {
                write!(f, "^{}", unit.power.abs())?;
            }
        }

        Ok(())
    }
}

impl FromStr for CompoundUnit {
    type Err = InvalidUnit;

    /// Parses units separated by `*`, `.` or `/`. A unit following a `/` has its power negated;
    /// `kg.m^2/s^2` is `kg * m^2 * s^-2`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut units = Vec::new();
        let mut rest = value;
        let mut sign = 1;
        loop {
            let separator = rest.find(|c: char| matches!(c, '*' | '.' | '/'));
            let text = separator.map_or(rest, |i| &rest[..i]);
            let mut unit: Unit = text.parse()?;
            unit.power *= sign;
            units.push(unit);

            let Some(i) = separator else {
                break;
            };
            sign = if rest[i..].starts_with('/') { -1 } else { 1 };
            rest = &rest[i + 1..];
        }
        Ok(Self { units })
    }
}

impl CompoundUnit {
    /// Returns the units that make up this compound unit, in the order they were written.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// If this compound unit can be converted to the target unit, returns the conversion factor
    /// between them.
    ///
    /// Each unit of `self` is matched against the first unit of `target` it can be converted to.
    pub fn conversion_factor(&self, target: &CompoundUnit) -> Result<Rational, ConversionError> {
        let mut factor = Rational::from(1);
        for unit in &self.units {
            let target_unit_factor = target.units.iter()
                .find_map(|u| unit.conversion_factor(*u).ok())
                .ok_or_else(|| ConversionError {
                    unit: *unit,
                    target: target.units.first().copied().unwrap_or(*unit),
                })?;
            factor *= target_unit_factor;
        }
        Ok(factor)
    }
}

/// Generates a primitive unit enum from its table of abbreviations and factors.
macro_rules! unit_impl {
    (@den) => { 1 };
    (@den $den:literal) => { $den };
    (
        $doc:literal,
        $enum_name:ident, $base_variant:ident: $base_abbr:literal $(=> $to_base_num:literal $(/ $to_base_den:literal)? $base_quantity:ident^$base_power:literal)?,
        $(
            $($variant_doc:literal,)? $variant:ident: $main_abbr:literal $(, $alt_abbr:literal)* => $num:literal $(/ $den:literal)?
        ),*
        $(,)?
    ) => {
        #[doc = $doc]
        ///
        /// The listed abbreviations are the abbreviations used to parse the unit with
        /// [`FromStr`]. The main abbreviation comes first, followed by any alternate
        /// abbreviations that can be used.
        ///
        /// The conversions are listed in terms of the [base unit]. The base unit for
        #[doc = concat!("[`", stringify!($enum_name), "`] is [`", stringify!($enum_name), "::", stringify!($base_variant), "`].")]
        ///
        /// [base unit]: Convert::BASE
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum $enum_name {
            $(
                $(
                    #[doc = $variant_doc]
                    ///
                )?
                #[doc = concat!("- Abbreviation: `", $main_abbr, "`", $(", `", $alt_abbr, "`",)*)]
                ///
                #[doc = concat!("- `1 ", $main_abbr, " = ", $num, $("/", $den,)? " ", $base_abbr, "`")]
                $variant,
            )*
        }

        impl FromStr for $enum_name {
            type Err = InvalidUnit;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $(
                        $main_abbr $(| $alt_abbr)* => Ok($enum_name::$variant),
                    )*
                    _ => Err(InvalidUnit { unit: value.to_owned() }),
                }
            }
        }

        impl Display for $enum_name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.abbreviation())
            }
        }

        impl Convert for $enum_name {
            const BASE: Self = $enum_name::$base_variant;

            fn conversion_factor(&self) -> Rational {
                match self {
                    $(
                        $enum_name::$variant => ratio($num, unit_impl!(@den $($den)?)),
                    )*
                }
            }

            $(
                fn conversion_factor_to(&self, target: impl Into<Unit>) -> Option<Rational> {
                    let target = target.into();
                    if matches!(target.base, Base::$base_quantity(_)) && target.power == $base_power {
                        // convert from self to the base unit, then to base quantity^base power,
                        // then to the target
                        let to_base = ratio($to_base_num, unit_impl!(@den $($to_base_den)?));
                        let to_target = Unit::with_power($base_quantity::BASE, $base_power)
                            .conversion_factor(target)
                            .ok()?;
                        Some(self.conversion_factor() * to_base * to_target)
                    } else {
                        None
                    }
                }
            )?
        }

        impl From<$enum_name> for CompoundUnit {
            fn from(u: $enum_name) -> Self {
                Self { units: vec![Unit::from(u)] }
            }
        }

        impl From<$enum_name> for Unit {
            fn from(u: $enum_name) -> Self {
                Self::new(Base::$enum_name(u))
            }
        }

        impl From<$enum_name> for Base {
            fn from(u: $enum_name) -> Self {
                Self::$enum_name(u)
            }
        }

        impl $enum_name {
            /// Every unit of this quantity, in table order.
            pub const ALL: &'static [$enum_name] = &[$($enum_name::$variant),*];

            /// Returns the main abbreviation of this unit.
            pub const fn abbreviation(&self) -> &'static str {
                match self {
                    $(
                        $enum_name::$variant => $main_abbr,
                    )*
                }
            }

            /// Returns every abbreviation this unit can be parsed from.
            pub fn abbreviations(&self) -> &'static [&'static str] {
                match self {
                    $(
                        $enum_name::$variant => &[$main_abbr $(, $alt_abbr)*],
                    )*
                }
            }

            /// Creates a [`Unit`] with this quantity type and specified power.
            pub fn pow(&self, power: i8) -> Unit {
                Unit::with_power(Base::$enum_name(*self), power)
            }

            /// Creates a [`Unit`] with this quantity type and power 2.
            pub fn squared(&self) -> Unit {
                self.pow(2)
            }

            /// Creates a [`Unit`] with this quantity type and power 3.
            pub fn cubed(&self) -> Unit {
                self.pow(3)
            }
        }
    }
}

/// A unit of measurement that includes a power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Unit {
    /// The base unit.
    base: Base,

    /// The power of the base unit.
    power: i8,
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if self.power != 1 {
            write!(f, "^{}", self.power)?;
        }
        Ok(())
    }
}

/// Parses `<abbreviation>[^<power>]`, where the power is a signed integer defaulting to 1.
impl FromStr for Unit {
    type Err = InvalidUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut iter = value.split('^');
        let (a, b) = (iter.next(), iter.next());
        if iter.next().is_some() {
            return Err(InvalidUnit { unit: value.to_owned() });
        }

        match (a, b) {
            (Some(a), Some(b)) => {
                let quantity: Base = a.parse()?;
                let power = b.parse().map_err(|_| InvalidUnit { unit: value.to_owned() })?;
                Ok(Unit::with_power(quantity, power))
            },
            (Some(a), None) => Ok(a.parse::<Base>()?.into()),
            _ => Err(InvalidUnit { unit: value.to_owned() }),
        }
    }
}

impl From<Unit> for CompoundUnit {
    fn from(u: Unit) -> Self {
        Self { units: vec![u] }
    }
}

impl Unit {
    /// Creates a new unit with the given quantity, with power 1.
    pub fn new(quantity: impl Into<Base>) -> Self {
        Self { base: quantity.into(), power: 1 }
    }

    /// Creates a new unit with the given quantity and power.
    pub fn with_power(quantity: impl Into<Base>, power: i8) -> Self {
        Self { base: quantity.into(), power }
    }

    /// Returns the base unit, without its power.
    pub fn base(&self) -> Base {
        self.base
    }

    /// Returns the power of the base unit.
    pub fn power(&self) -> i8 {
        self.power
    }

    /// If this unit can be converted to the target unit, returns the conversion factor between
    /// them.
    pub fn conversion_factor(&self, target: Unit) -> Result<Rational, ConversionError> {
        if self.power != target.power {
            return self.base.conversion_factor_to(target)
                .or_else(|| target.base.conversion_factor_to(*self).map(Rational::recip))
                .ok_or(ConversionError { unit: *self, target });
        }

        if self.base.quantity() != target.base.quantity() {
            return Err(ConversionError { unit: *self, target });
        }

        let factor = self.base.conversion_factor() / target.base.conversion_factor();
        Ok(factor.pow(i32::from(self.power)))
    }
}

/// Error returned if a unit cannot be converted to another.
#[derive(Debug)]
pub struct ConversionError {
    /// The unit that could not be converted.
    unit: Unit,

    /// The target unit.
    target: Unit,
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f,
            "cannot convert from `{}` to `{}`",
            self.unit, self.target
        )
    }
}

impl Error for ConversionError {}

/// Error returned if the given unit abbreviation is invalid.
#[derive(Debug)]
pub struct InvalidUnit {
    /// The invalid unit abbreviation.
    unit: String,
}

impl InvalidUnit {
    /// Returns the text that could not be parsed.
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl Display for InvalidUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid unit: `{}`", self.unit)
    }
}

impl Error for InvalidUnit {}

/// The dimensional category of a unit, independent of the specific unit used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    Currency,
    Capacity,
    Length,
    Mass,
    Duration,
    Angle,
}

impl Quantity {
    /// Every quantity, in table order.
    pub const ALL: [Quantity; 6] = [
        Quantity::Currency,
        Quantity::Capacity,
        Quantity::Length,
        Quantity::Mass,
        Quantity::Duration,
        Quantity::Angle,
    ];

    /// Returns the abbreviation of the base unit of this quantity.
    pub const fn base_abbreviation(&self) -> &'static str {
        match self {
            Quantity::Currency => Currency::BASE.abbreviation(),
            Quantity::Capacity => Capacity::BASE.abbreviation(),
            Quantity::Length => Length::BASE.abbreviation(),
            Quantity::Mass => Mass::BASE.abbreviation(),
            Quantity::Duration => Duration::BASE.abbreviation(),
            Quantity::Angle => Angle::BASE.abbreviation(),
        }
    }

    /// Returns the quantity whose base unit has the given abbreviation.
    pub fn from_base_abbreviation(abbreviation: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.base_abbreviation() == abbreviation)
    }
}

/// A base unit with no power.
///
/// See the corresponding enum variants for the available units and their abbreviations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Base {
    Currency(Currency),
    Capacity(Capacity),
    Length(Length),
    Mass(Mass),
    Duration(Duration),
    Angle(Angle),
}

impl Display for Base {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Parses a bare abbreviation. Powers are parsed by [`Unit`].
impl FromStr for Base {
    type Err = InvalidUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse().map(Base::Currency)
            .or_else(|_| value.parse().map(Base::Capacity))
            .or_else(|_| value.parse().map(Base::Length))
            .or_else(|_| value.parse().map(Base::Mass))
            .or_else(|_| value.parse().map(Base::Duration))
            .or_else(|_| value.parse().map(Base::Angle))
    }
}

impl From<Base> for Unit {
    fn from(q: Base) -> Self {
        Self::new(q)
    }
}

impl Base {
    /// Returns every abbreviation in the unit table.
    pub fn all_abbreviations() -> impl Iterator<Item = &'static str> {
        Currency::ALL.iter().flat_map(|u| u.abbreviations())
            .chain(Capacity::ALL.iter().flat_map(|u| u.abbreviations()))
            .chain(Length::ALL.iter().flat_map(|u| u.abbreviations()))
            .chain(Mass::ALL.iter().flat_map(|u| u.abbreviations()))
            .chain(Duration::ALL.iter().flat_map(|u| u.abbreviations()))
            .chain(Angle::ALL.iter().flat_map(|u| u.abbreviations()))
            .copied()
    }

    /// Returns the quantity type of this unit.
    pub fn quantity(&self) -> Quantity {
        match self {
            Base::Currency(_) => Quantity::Currency,
            Base::Capacity(_) => Quantity::Capacity,
            Base::Length(_) => Quantity::Length,
            Base::Mass(_) => Quantity::Mass,
            Base::Duration(_) => Quantity::Duration,
            Base::Angle(_) => Quantity::Angle,
        }
    }

    /// Returns the main abbreviation of this unit.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Base::Currency(u) => u.abbreviation(),
            Base::Capacity(u) => u.abbreviation(),
            Base::Length(u) => u.abbreviation(),
            Base::Mass(u) => u.abbreviation(),
            Base::Duration(u) => u.abbreviation(),
            Base::Angle(u) => u.abbreviation(),
        }
    }

    /// Returns the exact conversion factor from this unit to the base unit of its quantity.
    pub fn conversion_factor(&self) -> Rational {
        match self {
            Base::Currency(u) => u.conversion_factor(),
            Base::Capacity(u) => u.conversion_factor(),
            Base::Length(u) => u.conversion_factor(),
            Base::Mass(u) => u.conversion_factor(),
            Base::Duration(u) => u.conversion_factor(),
            Base::Angle(u) => u.conversion_factor(),
        }
    }

    fn conversion_factor_to(&self, target: impl Into<Unit>) -> Option<Rational> {
        let target = target.into();
        match self {
            Base::Currency(u) => u.conversion_factor_to(target),
            Base::Capacity(u) => u.conversion_factor_to(target),
            Base::Length(u) => u.conversion_factor_to(target),
            Base::Mass(u) => u.conversion_factor_to(target),
            Base::Duration(u) => u.conversion_factor_to(target),
            Base::Angle(u) => u.conversion_factor_to(target),
        }
    }
}

unit_impl!("A unit of currency.",
    Currency, Euro: "€",
    Kiloeuro: "k€" => 1000,
    Euro: "€" => 1,
);

unit_impl!("A unit of capacity.\n\nMeasurements of capacity are of the same kind as measurements of length with power 3. Thus, any measurement created with a capacity unit can be converted to a length unit cubed, and vice versa.",
    Capacity, Liter: "L" => 1 / 1000 Length^3, // 1 L = 1/1000 m^3
    Kiloliter: "kL" => 1000,
    Hectoliter: "hL" => 100,
    Decaliter: "daL" => 10,
    Liter: "L" => 1,
    Deciliter: "dL" => 1 / 10,
    Centiliter: "cL" => 1 / 100,
    Milliliter: "mL" => 1 / 1000,
);

unit_impl!("A unit of length.",
    Length, Meter: "m",
    Kilometer: "km" => 1000,
    Hectometer: "hm" => 100,
    Decameter: "dam" => 10,
    Meter: "m" => 1,
    Decimeter: "dm" => 1 / 10,
    Centimeter: "cm" => 1 / 100,
    Millimeter: "mm" => 1 / 1000,
);

unit_impl!("A unit of mass.",
    Mass, Gram: "g",
    "A metric tonne (1000 kilograms).", Tonne: "t" => 1000000,
    "A quintal (100 kilograms).", Quintal: "q" => 100000,
    Kilogram: "kg" => 1000,
    Hectogram: "hg" => 100,
    Decagram: "dag" => 10,
    Gram: "g" => 1,
    Decigram: "dg" => 1 / 10,
    Centigram: "cg" => 1 / 100,
    Milligram: "mg" => 1 / 1000,
);

unit_impl!("A unit of duration.",
    Duration, Millisecond: "ms",
    "A calendar year of 365 days.", Year: "an", "ans" => 31536000000,
    "A month of 30 days.", Month: "mois" => 2592000000,
    Week: "semaine", "semaines" => 604800000,
    Day: "jour", "jours" => 86400000,
    Hour: "h" => 3600000,
    Minute: "min", "mins" => 60000,
    Second: "s" => 1000,
    Millisecond: "ms" => 1,
);

unit_impl!("A unit of angle.",
    Angle, Degree: "°",
    Degree: "°" => 1,
);
