//! Local risk prediction used whenever the service is unavailable
//!
//! ```text
//! temp_f = min(T / 40, 1)
//! hum_f  = max(0, (100 - H) / 100)
//! wind_f = min(W / 30, 1)
//! score  = min(0.4 temp_f + 0.4 hum_f + 0.2 wind_f + U(0, 0.1), 1)
//! ```
//!
//! Confidence is fixed at 0.85 with a ±0.1 interval clamped to 0-1.

use crate::prediction::error::MlError;
use crate::prediction::risk::{analyze_risk_factors, fire_weather_index, recommendations};
use crate::prediction::types::{
    ConfidenceInterval, EnvironmentalData, MlPrediction, PredictionSource, RiskCategory,
    RiskPrediction,
};
use rand::Rng;

/// Confidence reported for every fallback prediction
pub const FALLBACK_CONFIDENCE: f64 = 0.85;

/// A locally computed prediction standing in for a failed service call
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub prediction: RiskPrediction,
    pub reason: MlError,
}

impl Fallback {
    pub fn into_prediction(self) -> RiskPrediction {
        self.prediction
    }
}

/// Heuristic risk prediction from the weather alone
pub fn generate_fallback_predictions<R: Rng + ?Sized>(
    env: &EnvironmentalData,
    rng: &mut R,
) -> RiskPrediction {
    let temp_factor = (env.temperature / 40.0).min(1.0);
    let humidity_factor = ((100.0 - env.humidity) / 100.0).max(0.0);
    let wind_factor = (env.wind_speed / 30.0).min(1.0);

    let base_risk = temp_factor * 0.4 + humidity_factor * 0.4 + wind_factor * 0.2;
    // Cold, calm or saturated inputs can push the weighted sum below zero
    let score = (base_risk + rng.random::<f64>() * 0.1).clamp(0.0, 1.0);

    RiskPrediction {
        ensemble_risk_score: score,
        ml_prediction: MlPrediction {
            overall_risk: score,
            confidence: FALLBACK_CONFIDENCE,
            risk_category: RiskCategory::from_fallback_score(score),
        },
        confidence_interval: ConfidenceInterval {
            confidence_level: FALLBACK_CONFIDENCE,
            lower_bound: (score - 0.1).max(0.0),
            upper_bound: (score + 0.1).min(1.0),
        },
        fire_weather_index: Some(fire_weather_index(env.temperature, env.humidity, env.wind_speed)),
        risk_factors: Some(analyze_risk_factors(env)),
        recommendations: recommendations(score, env),
        source: PredictionSource::Fallback,
    }
}
