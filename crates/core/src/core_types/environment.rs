//! Environmental inputs for the spread animation
//!
//! The dashboard shows wind speed, wind direction, temperature and humidity as
//! plain text. The UI layer hands those strings over as [`EnvironmentFields`];
//! [`EnvironmentalReader`] turns them into a typed [`EnvironmentalSnapshot`],
//! falling back to per-field defaults whenever a value is missing or not a
//! number. Reading never fails.

use crate::core_types::units::{Celsius, KilometersPerHour, Percent};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Eight-point compass direction the wind blows toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl WindDirection {
    /// All directions, clockwise from north
    pub const ALL: [WindDirection; 8] = [
        WindDirection::N,
        WindDirection::NE,
        WindDirection::E,
        WindDirection::SE,
        WindDirection::S,
        WindDirection::SW,
        WindDirection::W,
        WindDirection::NW,
    ];

    /// Compass bearing in degrees (N = 0, clockwise in 45° steps)
    #[must_use]
    pub fn degrees(self) -> f64 {
        let index = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        index as f64 * 45.0
    }

    /// Compass bearing in radians
    #[must_use]
    pub fn radians(self) -> f64 {
        self.degrees() * PI / 180.0
    }

    /// Short label as shown on the dashboard ("N", "NE", ...)
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::NE => "NE",
            WindDirection::E => "E",
            WindDirection::SE => "SE",
            WindDirection::S => "S",
            WindDirection::SW => "SW",
            WindDirection::W => "W",
            WindDirection::NW => "NW",
        }
    }

    /// Parse a dashboard label. Surrounding whitespace and case are ignored.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Environmental conditions for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSnapshot {
    pub wind_speed: KilometersPerHour,
    pub wind_direction: WindDirection,
    pub temperature: Celsius,
    pub humidity: Percent,
}

impl EnvironmentalSnapshot {
    /// Create a snapshot from raw values
    pub fn new(
        wind_speed_kmh: f64,
        wind_direction: WindDirection,
        temperature_c: f64,
        humidity_pct: f64,
    ) -> Self {
        Self {
            wind_speed: KilometersPerHour::new(wind_speed_kmh),
            wind_direction,
            temperature: Celsius::new(temperature_c),
            humidity: Percent::new(humidity_pct),
        }
    }
}

impl Default for EnvironmentalSnapshot {
    /// Dashboard defaults: 15 km/h from the NE, 32°C, 45% humidity
    fn default() -> Self {
        Self::new(15.0, WindDirection::NE, 32.0, 45.0)
    }
}

/// Raw text of the four environmental fields, as displayed by the UI
///
/// `None` means the field is not on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentFields {
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
}

impl EnvironmentFields {
    /// Fields mirroring a snapshot (useful for driving the simulation headless)
    pub fn from_snapshot(snapshot: &EnvironmentalSnapshot) -> Self {
        Self {
            wind_speed: Some(format!("{} km/h", *snapshot.wind_speed)),
            wind_direction: Some(snapshot.wind_direction.label().to_string()),
            temperature: Some(format!("{}°C", *snapshot.temperature)),
            humidity: Some(format!("{}%", *snapshot.humidity)),
        }
    }

    pub fn with_wind_speed(mut self, text: impl Into<String>) -> Self {
        self.wind_speed = Some(text.into());
        self
    }

    pub fn with_wind_direction(mut self, text: impl Into<String>) -> Self {
        self.wind_direction = Some(text.into());
        self
    }

    pub fn with_temperature(mut self, text: impl Into<String>) -> Self {
        self.temperature = Some(text.into());
        self
    }

    pub fn with_humidity(mut self, text: impl Into<String>) -> Self {
        self.humidity = Some(text.into());
        self
    }
}

/// Converts [`EnvironmentFields`] into an [`EnvironmentalSnapshot`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentalReader {
    defaults: EnvironmentalSnapshot,
}

impl EnvironmentalReader {
    /// Reader with custom per-field defaults
    pub fn new(defaults: EnvironmentalSnapshot) -> Self {
        Self { defaults }
    }

    /// Defaults used for missing or non-numeric fields
    pub fn defaults(&self) -> &EnvironmentalSnapshot {
        &self.defaults
    }

    /// Read a snapshot, substituting defaults field by field
    ///
    /// A present but unrecognised direction label resolves to north, matching
    /// the dashboard's compass lookup; only a missing label uses the default.
    pub fn read(&self, fields: &EnvironmentFields) -> EnvironmentalSnapshot {
        let numeric = |text: Option<&str>, default: f64| {
            text.and_then(parse_leading_integer)
                .map_or(default, |v| v as f64)
        };

        let wind_direction = match fields.wind_direction.as_deref() {
            Some(label) => WindDirection::from_label(label).unwrap_or(WindDirection::N),
            None => self.defaults.wind_direction,
        };

        EnvironmentalSnapshot {
            wind_speed: KilometersPerHour::new(numeric(
                fields.wind_speed.as_deref(),
                *self.defaults.wind_speed,
            )),
            wind_direction,
            temperature: Celsius::new(numeric(
                fields.temperature.as_deref(),
                *self.defaults.temperature,
            )),
            humidity: Percent::new(numeric(fields.humidity.as_deref(), *self.defaults.humidity)),
        }
    }
}

/// Parse the integer prefix of a display string ("32°C" -> 32, " -4 km" -> -4)
///
/// Returns `None` when no digits lead the string or the value overflows.
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
