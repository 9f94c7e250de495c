//! Wire types for the ML prediction service

use crate::core_types::{EnvironmentalSnapshot, WindDirection};
use crate::prediction::error::MlError;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for `/api/ml/predict`
///
/// The dashboard has no live NDVI or terrain feed, so those fields are
/// sampled around typical values for the mapped region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
    pub ndvi: f64,
    pub elevation: f64,
    pub slope: f64,
    pub vegetation_density: String,
}

impl EnvironmentalData {
    /// Request body with fixed terrain values (deterministic; tests and replays)
    pub fn from_snapshot(snapshot: &EnvironmentalSnapshot, ndvi: f64, elevation: f64, slope: f64) -> Self {
        Self {
            temperature: *snapshot.temperature,
            humidity: *snapshot.humidity,
            wind_speed: *snapshot.wind_speed,
            wind_direction: snapshot.wind_direction,
            ndvi,
            elevation,
            slope,
            vegetation_density: "moderate".to_string(),
        }
    }

    /// Request body with NDVI 0.6 ± 0.1, elevation 1500-2000 m, slope 10-30°
    pub fn sample<R: Rng + ?Sized>(snapshot: &EnvironmentalSnapshot, rng: &mut R) -> Self {
        let ndvi = 0.6 + (rng.random::<f64>() - 0.5) * 0.2;
        let elevation = 1500.0 + rng.random::<f64>() * 500.0;
        let slope = 10.0 + rng.random::<f64>() * 20.0;
        Self::from_snapshot(snapshot, ndvi, elevation, slope)
    }
}

/// Request body for `/api/ml/simulate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulateRequest<'a> {
    pub lat: f64,
    pub lng: f64,
    /// Hours to simulate
    pub duration: u32,
    #[serde(flatten)]
    pub environment: &'a EnvironmentalData,
}

/// Risk category labels
///
/// The service grades on five levels; the local fallback only ever produces
/// `Low`, `Moderate` or `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskCategory {
    /// Five-level grading used by the service (inclusive lower bounds)
    pub fn from_model_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskCategory::VeryHigh
        } else if score >= 0.6 {
            RiskCategory::High
        } else if score >= 0.4 {
            RiskCategory::Moderate
        } else if score >= 0.2 {
            RiskCategory::Low
        } else {
            RiskCategory::VeryLow
        }
    }

    /// Three-level grading used by the local fallback (>0.7 high, >0.4 moderate)
    pub fn from_fallback_score(score: f64) -> Self {
        if score > 0.7 {
            RiskCategory::High
        } else if score > 0.4 {
            RiskCategory::Moderate
        } else {
            RiskCategory::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::VeryLow => "very-low",
            RiskCategory::Low => "low",
            RiskCategory::Moderate => "moderate",
            RiskCategory::High => "high",
            RiskCategory::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-factor risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub temperature: RiskLevel,
    pub humidity: RiskLevel,
    pub wind: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub overall_risk: f64,
    pub confidence: f64,
    pub risk_category: RiskCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub confidence_level: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Where a prediction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    #[default]
    Service,
    Fallback,
}

/// Fire-risk prediction, from the service or the local heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub ensemble_risk_score: f64,
    pub ml_prediction: MlPrediction,
    pub confidence_interval: ConfidenceInterval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_weather_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<RiskFactors>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(skip)]
    pub source: PredictionSource,
}

impl RiskPrediction {
    /// Confidence as the dashboard displays it ("85.0%")
    pub fn confidence_display(&self) -> String {
        format!("{:.1}%", self.confidence_interval.confidence_level * 100.0)
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PredictionSource::Fallback
    }
}

/// `{success, predictions}` envelope from `/api/ml/predict`
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(not(feature = "ml"), allow(dead_code))]
pub(crate) struct PredictEnvelope {
    pub success: bool,
    #[serde(default)]
    pub predictions: Option<RiskPrediction>,
}

/// Metrics for one simulated hour
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyMetrics {
    pub hour: u32,
    pub burned_area_hectares: f64,
    pub fire_perimeter_km: f64,
    pub fire_intensity: f64,
    pub spread_rate: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

/// Server-side cellular-automaton run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MlSimulation {
    pub hourly_progression: Vec<HourlyMetrics>,
    pub final_state: HourlyMetrics,
    pub fire_map: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(not(feature = "ml"), allow(dead_code))]
pub(crate) struct SimulateEnvelope {
    pub success: bool,
    #[serde(default)]
    pub simulation: Option<MlSimulation>,
}

/// Model metadata from `/api/ml/model-info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub models: serde_json::Value,
}

impl ModelInfo {
    /// Reported accuracy of the `convlstm_unet` model, if any
    pub fn headline_accuracy(&self) -> Option<String> {
        match self.models.get("convlstm_unet")?.get("accuracy")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(not(feature = "ml"), allow(dead_code))]
pub(crate) struct ModelInfoEnvelope {
    pub success: bool,
    #[serde(default)]
    pub models: Option<serde_json::Value>,
}

/// Unwraps a `{success, <payload>}` response envelope
#[cfg_attr(not(feature = "ml"), allow(dead_code))]
pub(crate) trait ServiceEnvelope: DeserializeOwned {
    type Payload;

    fn into_payload(self) -> Result<Self::Payload, MlError>;
}

#[cfg_attr(not(feature = "ml"), allow(dead_code))]
fn missing(field: &str) -> MlError {
    MlError::MalformedBody(format!("missing field `{field}`"))
}

impl ServiceEnvelope for PredictEnvelope {
    type Payload = RiskPrediction;

    fn into_payload(self) -> Result<RiskPrediction, MlError> {
        if !self.success {
            return Err(MlError::Unsuccessful);
        }
        self.predictions.ok_or_else(|| missing("predictions"))
    }
}

impl ServiceEnvelope for SimulateEnvelope {
    type Payload = MlSimulation;

    fn into_payload(self) -> Result<MlSimulation, MlError> {
        if !self.success {
            return Err(MlError::Unsuccessful);
        }
        self.simulation.ok_or_else(|| missing("simulation"))
    }
}

impl ServiceEnvelope for ModelInfoEnvelope {
    type Payload = ModelInfo;

    fn into_payload(self) -> Result<ModelInfo, MlError> {
        if !self.success {
            return Err(MlError::Unsuccessful);
        }
        self.models
            .map(|models| ModelInfo { models })
            .ok_or_else(|| missing("models"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sampled_terrain_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let data = EnvironmentalData::sample(&EnvironmentalSnapshot::default(), &mut rng);
            assert!((0.5..=0.7).contains(&data.ndvi));
            assert!((1500.0..=2000.0).contains(&data.elevation));
            assert!((10.0..=30.0).contains(&data.slope));
            assert_eq!(data.vegetation_density, "moderate");
        }
    }

    #[test]
    fn test_request_body_field_names() {
        let data = EnvironmentalData::from_snapshot(&EnvironmentalSnapshot::default(), 0.6, 1500.0, 15.0);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["wind_speed"], 15.0);
        assert_eq!(json["wind_direction"], "NE");
        assert_eq!(json["vegetation_density"], "moderate");

        let sim = SimulateRequest {
            lat: 30.1,
            lng: 79.2,
            duration: 6,
            environment: &data,
        };
        let json = serde_json::to_value(&sim).unwrap();
        assert_eq!(json["duration"], 6);
        assert_eq!(json["temperature"], 32.0);
        assert_eq!(json["lat"], 30.1);
    }

    #[test]
    fn test_category_thresholds() {
        assert_eq!(RiskCategory::from_model_score(0.8), RiskCategory::VeryHigh);
        assert_eq!(RiskCategory::from_model_score(0.65), RiskCategory::High);
        assert_eq!(RiskCategory::from_model_score(0.4), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_model_score(0.2), RiskCategory::Low);
        assert_eq!(RiskCategory::from_model_score(0.05), RiskCategory::VeryLow);

        assert_eq!(RiskCategory::from_fallback_score(0.71), RiskCategory::High);
        assert_eq!(RiskCategory::from_fallback_score(0.7), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_fallback_score(0.4), RiskCategory::Low);
    }

    #[test]
    fn test_parse_service_prediction() {
        let body = r#"{
            "success": true,
            "predictions": {
                "ensemble_risk_score": 0.62,
                "ml_prediction": {"overall_risk": 0.6, "confidence": 0.6, "risk_category": "very-high", "spatial_risk_map": []},
                "confidence_interval": {"confidence_level": 0.6, "lower_bound": 0.52, "upper_bound": 0.68},
                "fire_weather_index": 0.41,
                "risk_factors": {"temperature": "moderate", "humidity": "high", "wind": "low"},
                "recommendations": ["Increase fire patrol frequency"]
            }
        }"#;
        let envelope: PredictEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let prediction = envelope.predictions.unwrap();
        assert_eq!(prediction.ml_prediction.risk_category, RiskCategory::VeryHigh);
        assert_eq!(prediction.risk_factors.unwrap().humidity, RiskLevel::High);
        assert_eq!(prediction.source, PredictionSource::Service);
        assert_eq!(prediction.confidence_display(), "60.0%");
    }

    #[test]
    fn test_parse_simulation_with_empty_final_state() {
        let body = r#"{"success": true, "simulation": {"hourly_progression": [], "final_state": {}, "fire_map": []}}"#;
        let envelope: SimulateEnvelope = serde_json::from_str(body).unwrap();
        let sim = envelope.simulation.unwrap();
        assert!(sim.hourly_progression.is_empty());
        assert_eq!(sim.final_state, HourlyMetrics::default());
    }

    #[test]
    fn test_model_info_accuracy() {
        let info = ModelInfo {
            models: serde_json::json!({"convlstm_unet": {"accuracy": "94.2%"}}),
        };
        assert_eq!(info.headline_accuracy().as_deref(), Some("94.2%"));
        let empty = ModelInfo {
            models: serde_json::json!({}),
        };
        assert_eq!(empty.headline_accuracy(), None);
    }

    #[test]
    fn test_envelope_unwrapping() {
        let failed: ModelInfoEnvelope = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(failed.into_payload().unwrap_err(), MlError::Unsuccessful);

        let empty: PredictEnvelope = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(empty.into_payload(), Err(MlError::MalformedBody(_))));

        let ok: ModelInfoEnvelope =
            serde_json::from_str(r#"{"success": true, "models": {"convlstm_unet": {}}}"#).unwrap();
        assert!(ok.into_payload().is_ok());
    }
}
