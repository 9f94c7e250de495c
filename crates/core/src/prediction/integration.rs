//! Wiring between the prediction client and the running dashboard
//!
//! Results land in a [`PredictionCache`] held by the
//! [`SimulationContext`](crate::SimulationContext). Calls are independent and
//! may finish in any order; whatever is applied last wins.

use crate::context::SimulationContext;
use crate::core_types::EnvironmentalSnapshot;
use crate::notify::Notification;
use crate::prediction::client::PredictionClient;
use crate::prediction::types::{EnvironmentalData, MlSimulation, ModelInfo, PredictionSource, RiskPrediction};
use rand::Rng;
use tracing::{debug, info, warn};

/// Latest prediction-service results
#[derive(Debug, Clone, Default)]
pub struct PredictionCache {
    latest: Option<RiskPrediction>,
    degraded: bool,
    realtime_active: bool,
    model_info: Option<ModelInfo>,
    last_simulation: Option<MlSimulation>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&RiskPrediction> {
        self.latest.as_ref()
    }

    /// True while the most recent prediction came from the local fallback
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn realtime_active(&self) -> bool {
        self.realtime_active
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model_info.as_ref()
    }

    pub fn last_simulation(&self) -> Option<&MlSimulation> {
        self.last_simulation.as_ref()
    }

    /// Accuracy figure for the dashboard: the latest prediction's confidence,
    /// else the model's advertised accuracy
    pub fn accuracy_display(&self) -> Option<String> {
        self.latest
            .as_ref()
            .map(RiskPrediction::confidence_display)
            .or_else(|| self.model_info.as_ref().and_then(ModelInfo::headline_accuracy))
    }

    /// Store a prediction; returns true when this switches the cache into
    /// degraded mode
    pub fn apply(&mut self, prediction: RiskPrediction) -> bool {
        let was_degraded = self.degraded;
        self.degraded = prediction.source == PredictionSource::Fallback;
        self.latest = Some(prediction);
        self.degraded && !was_degraded
    }

    pub fn set_model_info(&mut self, info: ModelInfo) {
        self.model_info = Some(info);
    }

    pub fn set_realtime_active(&mut self, active: bool) {
        self.realtime_active = active;
    }

    pub fn set_last_simulation(&mut self, simulation: MlSimulation) {
        self.last_simulation = Some(simulation);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Start real-time updates and fetch model metadata
///
/// Never fails; an unreachable service leaves the cache in its defaults and
/// the user is told predictions are local.
pub async fn initialize_ml(client: &PredictionClient, ctx: &mut SimulationContext) {
    match client.start_realtime().await {
        Ok(()) => {
            ctx.predictions.set_realtime_active(true);
            ctx.notifier.notify(Notification::success("Real-time AI predictions activated"));
        }
        Err(e) => {
            warn!("ML API not available ({}), using fallback predictions", e);
            ctx.notifier.notify(Notification::warning("Using local AI predictions"));
        }
    }

    match client.model_info().await {
        Ok(info) => {
            if let Some(accuracy) = info.headline_accuracy() {
                info!("ML model accuracy: {}", accuracy);
            }
            ctx.predictions.set_model_info(info);
        }
        Err(e) => warn!("ML model info unavailable: {}", e),
    }

    ctx.notifier.notify(Notification::success("AI/ML models initialized successfully"));
}

/// Fetch a fresh risk prediction, falling back to the local heuristic
pub async fn refresh_predictions<R: Rng + ?Sized>(
    client: &PredictionClient,
    ctx: &mut SimulationContext,
    snapshot: &EnvironmentalSnapshot,
    rng: &mut R,
) -> PredictionSource {
    let env = EnvironmentalData::sample(snapshot, rng);
    let prediction = match client.predict(&env, rng).await {
        Ok(prediction) => prediction,
        Err(fallback) => fallback.into_prediction(),
    };
    let source = prediction.source;
    debug!(
        "Risk {:.3} ({:?}, confidence {})",
        prediction.ensemble_risk_score,
        source,
        prediction.confidence_display()
    );

    if ctx.predictions.apply(prediction) {
        ctx.notifier.notify(Notification::warning("Using local AI predictions"));
    }
    source
}

/// Ask the service for a spread simulation of an ignition at (lat, lng)
///
/// `None` means the caller continues with the local animation only.
pub async fn simulate_with_ml<R: Rng + ?Sized>(
    client: &PredictionClient,
    ctx: &mut SimulationContext,
    latitude: f64,
    longitude: f64,
    snapshot: &EnvironmentalSnapshot,
    rng: &mut R,
) -> Option<MlSimulation> {
    let env = EnvironmentalData::sample(snapshot, rng);
    match client.simulate(latitude, longitude, &env).await {
        Ok(simulation) => {
            info!(
                "ML simulation: {} hours, final area {:.1} ha",
                simulation.hourly_progression.len(),
                simulation.final_state.burned_area_hectares
            );
            ctx.notifier.notify(Notification::success("AI-powered fire simulation completed"));
            ctx.predictions.set_last_simulation(simulation.clone());
            Some(simulation)
        }
        Err(e) => {
            warn!("ML simulation failed ({}), using fallback", e);
            ctx.notifier.notify(Notification::warning("Using simplified fire simulation"));
            None
        }
    }
}
