//! Semantic unit types for the dashboard's environmental inputs
//!
//! Newtype wrappers keep wind speed, temperature and humidity from being mixed
//! up when they flow from the UI fields into the spread heuristic and the ML
//! request body.
//!
//! # Usage
//! ```
//! use firewatch_core::core_types::units::{Celsius, KilometersPerHour, Percent};
//!
//! let temp = Celsius::new(32.0);
//! let wind = KilometersPerHour::new(15.0);
//! let humidity = Percent::new(45.0);
//! assert_eq!(*temp, 32.0);
//! assert!(humidity.dryness() > 0.4);
//! assert_eq!(format!("{wind}"), "15 km/h");
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Generates a transparent `f64` newtype with total ordering, `Deref` and a
/// unit-suffixed `Display`.
macro_rules! unit_newtype {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Wrap a raw value
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Raw value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", self.0, $suffix)
            }
        }
    };
}

unit_newtype!(
    /// Air temperature in degrees Celsius
    Celsius,
    "°C"
);

unit_newtype!(
    /// Relative humidity in percent (0-100)
    Percent,
    "%"
);

unit_newtype!(
    /// Wind speed in kilometres per hour
    KilometersPerHour,
    " km/h"
);

impl Percent {
    /// Dryness term used by the spread heuristic: `(100 - RH) / 120`
    ///
    /// Goes negative above 100% humidity; the heuristic does not clamp it.
    #[inline]
    #[must_use]
    pub fn dryness(self) -> f64 {
        (100.0 - self.0) / 120.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_total() {
        let mut temps = [Celsius::new(40.0), Celsius::new(f64::NAN), Celsius::new(-5.0)];
        temps.sort();
        assert_eq!(temps[0], Celsius::new(-5.0));
        assert_eq!(temps[1], Celsius::new(40.0));
        assert!(temps[2].is_nan());
    }

    #[test]
    fn test_display_suffixes() {
        assert_eq!(Celsius::new(32.0).to_string(), "32°C");
        assert_eq!(Percent::new(45.0).to_string(), "45%");
        assert_eq!(KilometersPerHour::new(15.0).to_string(), "15 km/h");
    }

    #[test]
    fn test_dryness() {
        assert!((Percent::new(40.0).dryness() - 0.5).abs() < 1e-12);
        assert_eq!(Percent::new(100.0).dryness(), 0.0);
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&KilometersPerHour::new(22.5)).unwrap();
        assert_eq!(json, "22.5");
        let back: KilometersPerHour = serde_json::from_str(&json).unwrap();
        assert_eq!(back, KilometersPerHour::new(22.5));
    }
}
