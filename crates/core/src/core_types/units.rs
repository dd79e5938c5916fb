//! Semantic unit types for the weather inputs of a run
//!
//! Newtype wrappers keep temperature, humidity, wind speed and headings from
//! being swapped by accident when they travel through the engine as bare
//! floats.
//!
//! # Design Philosophy
//! - All quantities use f64 so the risk and spread formulas run at one precision
//! - Values are not range-checked: out-of-range weather (negative humidity,
//!   sub-zero wind) produces out-of-spec but finite results
//! - Serde serializes every unit as a bare number, which keeps run records
//!   compatible with plain JSON consumers
//!
//! # Usage
//! ```
//! use wildfire_spread_core::core_types::units::{Celsius, Degrees, Percent};
//!
//! let temp = Celsius::new(25.0);
//! assert_eq!(*temp, 25.0);
//!
//! let humidity = Percent::new(50.0);
//! assert!((humidity.to_fraction() - 0.5).abs() < 1e-12);
//!
//! let heading = Degrees::new(-90.0).normalized();
//! assert_eq!(*heading, 270.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Deref, Sub};

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Air temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Create a new Celsius temperature.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Celsius {
    fn from(v: f64) -> Self {
        Celsius(v)
    }
}

impl From<Celsius> for f64 {
    fn from(c: Celsius) -> f64 {
        c.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// HUMIDITY
// ============================================================================

/// Relative humidity in percent (nominally 0-100)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f64);

impl Deref for Percent {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Percent {
    /// Create a new percentage
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Percent(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to fraction (0-1)
    #[inline]
    #[must_use]
    pub fn to_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl From<f64> for Percent {
    fn from(v: f64) -> Self {
        Percent(v)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> f64 {
        p.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

// ============================================================================
// WIND SPEED
// ============================================================================

/// Wind speed in kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilometersPerHour(f64);

impl Deref for KilometersPerHour {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl KilometersPerHour {
    /// Create a new `KilometersPerHour` value.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        KilometersPerHour(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for KilometersPerHour {
    fn from(v: f64) -> Self {
        KilometersPerHour(v)
    }
}

impl From<KilometersPerHour> for f64 {
    fn from(k: KilometersPerHour) -> f64 {
        k.0
    }
}

impl fmt::Display for KilometersPerHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km/h", self.0)
    }
}

// ============================================================================
// ANGLES
// ============================================================================

/// Heading in degrees (0 = north, 90 = east)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

impl Deref for Degrees {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Degrees {
    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Wrap into `[0, 360)`
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Self {
        Degrees(self.0.rem_euclid(360.0))
    }
}

impl From<f64> for Degrees {
    fn from(v: f64) -> Self {
        Degrees(v)
    }
}

impl From<Degrees> for f64 {
    fn from(d: Degrees) -> f64 {
        d.0
    }
}

impl Add for Degrees {
    type Output = Degrees;
    fn add(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Degrees;
    fn sub(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 - rhs.0)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}
