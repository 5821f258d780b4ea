#![forbid(unsafe_code)]

//! Display units and fixed-point unit values.
//!
//! Every unit-valued width inside the sizer is a [`UnitValue`]: an integer
//! count of `10^-precision` steps. Sums of unit values are therefore exact,
//! which is what lets a stretched row add up to the container width with no
//! drift at all, and what makes `"30.0000%"` parse back to the same value it
//! was printed from.

use core::fmt;
use core::ops::{Add, Sub};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Largest supported number of decimals (keeps `10^precision` well inside `i64`).
pub const MAX_PRECISION: u32 = 9;

/// `10^precision`, clamped to [`MAX_PRECISION`].
#[inline]
#[must_use]
pub const fn scale_factor(precision: u32) -> i64 {
    let precision = if precision > MAX_PRECISION {
        MAX_PRECISION
    } else {
        precision
    };
    10_i64.pow(precision)
}

/// Unit used for cell widths written back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    /// Percentage of the container's outer width.
    #[default]
    Percent,
    /// Multiples of the container's font size.
    Em,
    /// Multiples of the root font size.
    Rem,
    /// Raw pixels.
    Px,
}

impl Unit {
    /// CSS suffix for the unit.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Percent => "%",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Px => "px",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "%" => Ok(Self::Percent),
            "em" => Ok(Self::Em),
            "rem" => Ok(Self::Rem),
            "px" | "" => Ok(Self::Px),
            _ => Err(UnitParseError {
                input: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.suffix().to_owned()
    }
}

/// Failure to parse a unit or a length literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitParseError {
    pub input: String,
}

impl fmt::Display for UnitParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse unit or length from '{}'", self.input)
    }
}

impl std::error::Error for UnitParseError {}

/// Fixed-point decimal: `scaled / 10^precision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitValue {
    scaled: i64,
    precision: u32,
}

impl UnitValue {
    /// Zero at the given precision.
    #[must_use]
    pub const fn zero(precision: u32) -> Self {
        Self::from_scaled(0, precision)
    }

    /// Build from an already-scaled integer.
    #[must_use]
    pub const fn from_scaled(scaled: i64, precision: u32) -> Self {
        let precision = if precision > MAX_PRECISION {
            MAX_PRECISION
        } else {
            precision
        };
        Self { scaled, precision }
    }

    /// Round `value` half away from zero onto the `precision` grid.
    ///
    /// Non-finite input maps to zero.
    #[must_use]
    pub fn from_f64(value: f64, precision: u32) -> Self {
        let precision = precision.min(MAX_PRECISION);
        let scaled = if value.is_finite() {
            (value * scale_factor(precision) as f64).round() as i64
        } else {
            0
        };
        Self { scaled, precision }
    }

    #[inline]
    #[must_use]
    pub const fn scaled(self) -> i64 {
        self.scaled
    }

    #[inline]
    #[must_use]
    pub const fn precision(self) -> u32 {
        self.precision
    }

    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.scaled as f64 / scale_factor(self.precision) as f64
    }

    /// Same value on another precision grid (rounds when narrowing).
    #[must_use]
    pub fn rescale(self, precision: u32) -> Self {
        let precision = precision.min(MAX_PRECISION);
        if precision == self.precision {
            return self;
        }
        if precision > self.precision {
            let factor = scale_factor(precision - self.precision);
            return Self::from_scaled(self.scaled.saturating_mul(factor), precision);
        }
        let factor = i128::from(scale_factor(self.precision - precision));
        let scaled = div_round(i128::from(self.scaled), factor);
        Self::from_scaled(saturate_i64(scaled), precision)
    }
}

impl Add for UnitValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let rhs = rhs.rescale(self.precision);
        Self::from_scaled(self.scaled.saturating_add(rhs.scaled), self.precision)
    }
}

impl Sub for UnitValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let rhs = rhs.rescale(self.precision);
        Self::from_scaled(self.scaled.saturating_sub(rhs.scaled), self.precision)
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = scale_factor(self.precision).unsigned_abs();
        let magnitude = self.scaled.unsigned_abs();
        if self.scaled < 0 {
            f.write_str("-")?;
        }
        if self.precision == 0 {
            return write!(f, "{magnitude}");
        }
        write!(
            f,
            "{}.{:0width$}",
            magnitude / scale,
            magnitude % scale,
            width = self.precision as usize
        )
    }
}

/// Integer division rounding half away from zero.
#[must_use]
pub fn div_round(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let negative = (numerator < 0) != (denominator < 0);
    let (n, d) = (numerator.abs(), denominator.abs());
    let quotient = (n + d / 2) / d;
    if negative { -quotient } else { quotient }
}

/// Clamp an `i128` into `i64`.
#[must_use]
pub fn saturate_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// A unit value tagged with its unit, e.g. `30.0000%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Length {
    pub value: UnitValue,
    pub unit: Unit,
}

impl Length {
    #[must_use]
    pub const fn new(value: UnitValue, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Pixel literal at the given precision.
    #[must_use]
    pub fn px(pixels: f64, precision: u32) -> Self {
        Self::new(UnitValue::from_f64(pixels, precision), Unit::Px)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Length {
    type Err = UnitParseError;

    /// Parse CSS-like literals: `30.0000%`, `12em`, `1.5rem`, `300px`, `300`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(trimmed.len());
        let (number, suffix) = trimmed.split_at(split);
        let error = || UnitParseError {
            input: s.to_owned(),
        };
        let parsed: f64 = number.parse().map_err(|_| error())?;
        let decimals = number
            .split_once('.')
            .map_or(0, |(_, frac)| frac.len() as u32);
        let unit = suffix.parse().map_err(|_| error())?;
        Ok(Self::new(UnitValue::from_f64(parsed, decimals), unit))
    }
}

impl TryFrom<String> for Length {
    type Error = UnitParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// Measured container attributes the conversions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Container outer width in pixels (may include a scrollbar).
    pub outer_width: f64,
    /// Container font size in pixels (`em`).
    pub font_size: f64,
    /// Root font size in pixels (`rem`).
    pub root_font_size: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            outer_width: 0.0,
            font_size: 16.0,
            root_font_size: 16.0,
        }
    }
}

impl Metrics {
    /// Pixels per one unit of `unit`.
    #[must_use]
    pub fn pixels_per(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Percent => self.outer_width / 100.0,
            Unit::Em => self.font_size,
            Unit::Rem => self.root_font_size,
            Unit::Px => 1.0,
        }
    }

    /// Convert a pixel measurement into `unit`.
    #[must_use]
    pub fn from_pixels(&self, pixels: f64, unit: Unit) -> f64 {
        let per = self.pixels_per(unit);
        if per.is_finite() && per != 0.0 {
            pixels / per
        } else {
            0.0
        }
    }

    /// Convert a value expressed in `unit` into pixels.
    #[must_use]
    pub fn to_pixels(&self, value: f64, unit: Unit) -> f64 {
        let per = self.pixels_per(unit);
        if per.is_finite() { value * per } else { 0.0 }
    }

    #[must_use]
    pub fn length_to_pixels(&self, length: Length) -> f64 {
        self.to_pixels(length.value.to_f64(), length.unit)
    }
}

/// Converts between pixels and the configured unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    unit: Unit,
    metrics: Metrics,
    display_unit: bool,
}

impl UnitConverter {
    #[must_use]
    pub const fn new(unit: Unit, metrics: Metrics, display_unit: bool) -> Self {
        Self {
            unit,
            metrics,
            display_unit,
        }
    }

    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub const fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Pixel width expressed in the configured unit, rounded to `precision`.
    #[must_use]
    pub fn to_value(&self, pixels: f64, precision: u32) -> UnitValue {
        UnitValue::from_f64(self.metrics.from_pixels(pixels, self.unit), precision)
    }

    #[must_use]
    pub fn to_length(&self, pixels: f64, precision: u32) -> Length {
        Length::new(self.to_value(pixels, precision), self.unit)
    }

    /// Inverse of [`Self::to_value`] for an arbitrary unit.
    #[must_use]
    pub fn to_pixels(&self, value: f64, unit: Unit) -> f64 {
        self.metrics.to_pixels(value, unit)
    }

    /// Container width in the configured unit (`100%`, `1000px`, ...).
    #[must_use]
    pub fn nominal_width(&self, precision: u32) -> UnitValue {
        self.to_value(self.metrics.outer_width, precision)
    }

    /// Text shown on resize handles.
    ///
    /// The suffix is only appended when the display-unit toggle is on.
    #[must_use]
    pub fn display(&self, pixels: f64, precision: u32) -> String {
        let value = self.to_value(pixels, precision);
        if self.display_unit {
            format!("{value}{}", self.unit.suffix())
        } else {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Metrics {
        Metrics {
            outer_width: 1000.0,
            font_size: 20.0,
            root_font_size: 16.0,
        }
    }

    #[test]
    fn unit_parses_known_suffixes() {
        assert_eq!("%".parse::<Unit>(), Ok(Unit::Percent));
        assert_eq!("EM".parse::<Unit>(), Ok(Unit::Em));
        assert_eq!("rem".parse::<Unit>(), Ok(Unit::Rem));
        assert_eq!("px".parse::<Unit>(), Ok(Unit::Px));
        assert_eq!("".parse::<Unit>(), Ok(Unit::Px));
        assert!("vw".parse::<Unit>().is_err());
    }

    #[test]
    fn unit_value_formats_fixed_decimals() {
        assert_eq!(UnitValue::from_f64(30.0, 4).to_string(), "30.0000");
        assert_eq!(UnitValue::from_f64(-0.25, 2).to_string(), "-0.25");
        assert_eq!(UnitValue::from_f64(12.345, 0).to_string(), "12");
        assert_eq!(UnitValue::from_f64(0.05, 1).to_string(), "0.1");
    }

    #[test]
    fn unit_value_rescale_rounds_half_away() {
        let value = UnitValue::from_scaled(12_345, 3);
        assert_eq!(value.rescale(2), UnitValue::from_scaled(1_235, 2));
        assert_eq!(value.rescale(5), UnitValue::from_scaled(1_234_500, 5));
        let negative = UnitValue::from_scaled(-15, 1);
        assert_eq!(negative.rescale(0), UnitValue::from_scaled(-2, 0));
    }

    #[test]
    fn arithmetic_is_exact() {
        let a = UnitValue::from_f64(33.3333, 4);
        let b = UnitValue::from_f64(66.6667, 4);
        assert_eq!((a + b).to_string(), "100.0000");
        assert_eq!((a + b - a), b);
    }

    #[test]
    fn length_parses_back_what_it_prints() {
        let length = Length::new(UnitValue::from_f64(30.0, 4), Unit::Percent);
        assert_eq!(length.to_string(), "30.0000%");
        assert_eq!("30.0000%".parse::<Length>(), Ok(length));
        let px: Length = "120px".parse().expect("pixel literal");
        assert_eq!(px.unit, Unit::Px);
        assert_eq!(px.value.to_f64(), 120.0);
        assert!("wide".parse::<Length>().is_err());
    }

    #[test]
    fn display_follows_unit_and_toggle() {
        let percent = UnitConverter::new(Unit::Percent, metrics(), true);
        assert_eq!(percent.display(300.0, 1), "30.0%");
        let bare = UnitConverter::new(Unit::Percent, metrics(), false);
        assert_eq!(bare.display(300.0, 1), "30.0");
        let em = UnitConverter::new(Unit::Em, metrics(), true);
        assert_eq!(em.display(300.0, 2), "15.00em");
        let rem = UnitConverter::new(Unit::Rem, metrics(), true);
        assert_eq!(rem.display(300.0, 3), "18.750rem");
        let px = UnitConverter::new(Unit::Px, metrics(), true);
        assert_eq!(px.display(300.0, 0), "300px");
    }

    #[test]
    fn zero_width_container_converts_to_zero() {
        let converter = UnitConverter::new(
            Unit::Percent,
            Metrics {
                outer_width: 0.0,
                ..Metrics::default()
            },
            true,
        );
        assert_eq!(converter.to_value(50.0, 4), UnitValue::zero(4));
        assert_eq!(converter.nominal_width(4), UnitValue::zero(4));
    }

    #[test]
    fn nominal_width_per_unit() {
        let m = metrics();
        assert_eq!(
            UnitConverter::new(Unit::Percent, m, true).nominal_width(4),
            UnitValue::from_f64(100.0, 4)
        );
        assert_eq!(
            UnitConverter::new(Unit::Em, m, true).nominal_width(2),
            UnitValue::from_f64(50.0, 2)
        );
        assert_eq!(
            UnitConverter::new(Unit::Px, m, true).nominal_width(0),
            UnitValue::from_f64(1000.0, 0)
        );
    }
}
