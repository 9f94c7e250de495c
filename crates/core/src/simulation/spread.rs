//! Procedural downwind spread
//!
//! Each step picks the most recent fire points as candidates and, with a fixed
//! probability per candidate, drops a new point a short distance downwind. The
//! distance is a unitless heuristic in degrees of latitude/longitude:
//!
//! ```text
//! d = base_spread × (wind / 20) × (temperature / 35) × ((100 - RH) / 120)
//! ```
//!
//! It is an animation rule, not a rate-of-spread model, and there is no
//! correction for the shrinking length of a degree of longitude away from the
//! equator.

use crate::core_types::{EnvironmentalSnapshot, FirePoint};
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tuning for [`SpreadModel`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadParams {
    /// Most recent points considered per step
    pub candidate_limit: usize,
    /// Chance that a candidate spreads this step (0-1)
    pub spread_probability: f64,
    /// Hard cap on new points per step
    pub max_new_points: usize,
    /// Base distance in degrees before weather scaling
    pub base_spread_deg: f64,
    /// Half-width of the uniform heading perturbation in radians
    pub heading_jitter_rad: f64,
    /// Minimum companion burn-circle radius in metres
    pub burn_radius_min_m: f64,
    /// Random extra burn-circle radius in metres
    pub burn_radius_jitter_m: f64,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            candidate_limit: 10,
            spread_probability: 0.4,
            max_new_points: 3,
            base_spread_deg: 0.005,
            heading_jitter_rad: PI / 6.0,
            burn_radius_min_m: 100.0,
            burn_radius_jitter_m: 50.0,
        }
    }
}

/// A point produced by one spread step, with its render-only burn circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadOutcome {
    pub point: FirePoint,
    pub burn_radius_m: f64,
}

/// Downwind point generator
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadModel {
    params: SpreadParams,
}

impl SpreadModel {
    pub fn new(params: SpreadParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SpreadParams {
        &self.params
    }

    /// Spread distance in degrees for the given conditions
    pub fn spread_distance(&self, snapshot: &EnvironmentalSnapshot) -> f64 {
        let wind_factor = *snapshot.wind_speed / 20.0;
        let temp_factor = *snapshot.temperature / 35.0;
        let humidity_factor = snapshot.humidity.dryness();
        self.params.base_spread_deg * wind_factor * temp_factor * humidity_factor
    }

    /// Run one spread step over `points` (oldest first)
    ///
    /// Returns the new points in candidate order; never more than
    /// `max_new_points`. The input is left untouched.
    pub fn step<'a, I, R>(
        &self,
        snapshot: &EnvironmentalSnapshot,
        points: I,
        rng: &mut R,
    ) -> Vec<SpreadOutcome>
    where
        I: IntoIterator<Item = &'a FirePoint>,
        I::IntoIter: DoubleEndedIterator,
        R: Rng + ?Sized,
    {
        let mut candidates: Vec<&FirePoint> = points
            .into_iter()
            .rev()
            .take(self.params.candidate_limit)
            .collect();
        candidates.reverse();

        let distance = self.spread_distance(snapshot);
        let heading = snapshot.wind_direction.radians();
        let mut spawned = Vec::with_capacity(self.params.max_new_points);

        for source in candidates {
            if spawned.len() >= self.params.max_new_points {
                break;
            }
            if rng.random::<f64>() >= self.params.spread_probability {
                continue;
            }

            let jitter = (rng.random::<f64>() - 0.5) * 2.0 * self.params.heading_jitter_rad;
            let angle = heading + jitter;
            let landing = source.position() + Vector2::new(angle.cos(), angle.sin()) * distance;
            let burn_radius_m =
                self.params.burn_radius_min_m + rng.random::<f64>() * self.params.burn_radius_jitter_m;

            spawned.push(SpreadOutcome {
                point: FirePoint::spread(landing.x, landing.y),
                burn_radius_m,
            });
        }

        spawned
    }
}
