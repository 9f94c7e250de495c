//! Fire-risk prediction
//!
//! The dashboard asks an external ML service for risk scores and server-side
//! spread runs. The service is optional: every failure is replaced by a local
//! heuristic prediction so the dashboard always has something to show.
//!
//! - [`client`]: HTTP calls (`ml` feature)
//! - [`fallback`]: weather-only risk score
//! - [`risk`]: fire weather index, per-factor grades, recommendations
//! - [`integration`]: cache plus the notify-on-degrade flows

pub mod client;
pub mod error;
pub mod fallback;
pub mod integration;
pub mod risk;
pub mod types;

pub use client::{MlClientConfig, PredictionClient};
pub use error::MlError;
pub use fallback::{generate_fallback_predictions, Fallback, FALLBACK_CONFIDENCE};
pub use integration::{initialize_ml, refresh_predictions, simulate_with_ml, PredictionCache};
pub use risk::{analyze_risk_factors, fire_weather_index, recommendations};
pub use types::{
    ConfidenceInterval, EnvironmentalData, HourlyMetrics, MlPrediction, MlSimulation, ModelInfo,
    PredictionSource, RiskCategory, RiskFactors, RiskLevel, RiskPrediction, SimulateRequest,
};
