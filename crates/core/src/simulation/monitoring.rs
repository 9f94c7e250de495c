//! Monitoring statistics for the running animation
//!
//! Burned area follows a closed-form growth curve in elapsed simulated time
//! with a little uniform noise on top:
//!
//! ```text
//! t         = elapsed_minutes / 60
//! area      = max(0, 25 × t^1.5 + U(-10, 10))      [ha]
//! perimeter = sqrt(area × 4π)                       [km]
//! rate      = area / t  (0 at t = 0)                [ha/hr]
//! sources   = min(floor(area / 50) + 1, 15)
//! ```
//!
//! The curve deliberately ignores where the spread model has put its points.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Derived monitoring figures for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    pub burned_area_ha: f64,
    pub perimeter_km: f64,
    pub spread_rate_ha_per_hr: f64,
    pub active_source_count: u32,
}

impl MonitoringSnapshot {
    /// All-zero snapshot shown while the clock is stopped
    pub const ZERO: MonitoringSnapshot = MonitoringSnapshot {
        burned_area_ha: 0.0,
        perimeter_km: 0.0,
        spread_rate_ha_per_hr: 0.0,
        active_source_count: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Growth-curve constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitoringParams {
    /// Area after one hour, before noise (ha)
    pub area_coefficient: f64,
    pub growth_exponent: f64,
    /// Half-width of the uniform area noise (ha)
    pub area_noise_ha: f64,
    pub hectares_per_source: f64,
    pub max_active_sources: u32,
}

impl Default for MonitoringParams {
    fn default() -> Self {
        Self {
            area_coefficient: 25.0,
            growth_exponent: 1.5,
            area_noise_ha: 10.0,
            hectares_per_source: 50.0,
            max_active_sources: 15,
        }
    }
}

/// Closed-form monitoring estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitoringEstimator {
    params: MonitoringParams,
}

impl MonitoringEstimator {
    pub fn new(params: MonitoringParams) -> Self {
        Self { params }
    }

    /// Noise-free burned area after `elapsed_minutes`
    pub fn base_area(&self, elapsed_minutes: u32) -> f64 {
        let hours = f64::from(elapsed_minutes) / 60.0;
        hours.powf(self.params.growth_exponent) * self.params.area_coefficient
    }

    /// Estimate the monitoring figures; all zero when not running
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        elapsed_minutes: u32,
        running: bool,
        rng: &mut R,
    ) -> MonitoringSnapshot {
        if !running {
            return MonitoringSnapshot::ZERO;
        }

        let hours = f64::from(elapsed_minutes) / 60.0;
        let noise = (rng.random::<f64>() * 2.0 - 1.0) * self.params.area_noise_ha;
        let burned_area_ha = (self.base_area(elapsed_minutes) + noise).max(0.0);
        let perimeter_km = (burned_area_ha * 4.0 * PI).sqrt();
        let spread_rate_ha_per_hr = if hours > 0.0 {
            burned_area_ha / hours
        } else {
            0.0
        };
        let sources = (burned_area_ha / self.params.hectares_per_source).floor() as u32 + 1;

        MonitoringSnapshot {
            burned_area_ha,
            perimeter_km,
            spread_rate_ha_per_hr,
            active_source_count: sources.min(self.params.max_active_sources),
        }
    }
}
