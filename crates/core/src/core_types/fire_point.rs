//! Fire points on the simulation map

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// How a fire point came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointGeneration {
    /// Placed by the user (map click)
    Origin,
    /// Grown from an existing point by the spread model
    Spread,
}

/// A burning location in latitude/longitude degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub generation: PointGeneration,
}

impl FirePoint {
    /// User-placed ignition
    pub fn origin(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            generation: PointGeneration::Origin,
        }
    }

    /// Point produced by the spread model
    pub fn spread(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            generation: PointGeneration::Spread,
        }
    }

    /// Position as a (lat, lng) vector
    #[inline]
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.latitude, self.longitude)
    }

    pub fn is_origin(&self) -> bool {
        self.generation == PointGeneration::Origin
    }

    /// Finite and within ±90° latitude, ±180° longitude
    pub fn is_valid_location(latitude: f64, longitude: f64) -> bool {
        latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
    }
}
