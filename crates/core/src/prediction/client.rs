//! HTTP client for the ML prediction service
//!
//! Every call is best-effort: one attempt, no retries. Any failure is
//! reported as an [`MlError`] and callers substitute local results.
//!
//! # Feature Flags
//!
//! - `ml` (default): real HTTP transport via reqwest. Without it every call
//!   returns [`MlError::ServiceDisabled`].

use crate::prediction::error::MlError;
use crate::prediction::fallback::{generate_fallback_predictions, Fallback};
use crate::prediction::types::{
    EnvironmentalData, MlSimulation, ModelInfo, ModelInfoEnvelope, PredictEnvelope,
    PredictionSource, RiskPrediction, SimulateEnvelope, SimulateRequest,
};
#[cfg(not(feature = "ml"))]
use crate::prediction::types::ServiceEnvelope;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Prediction service endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlClientConfig {
    /// Service origin, e.g. `http://localhost:5001`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Hours requested from `/api/ml/simulate`
    pub simulation_hours: u32,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout: Duration::from_secs(10),
            simulation_hours: 6,
        }
    }
}

impl MlClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg_attr(not(feature = "ml"), allow(dead_code))]
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Client for `/api/ml/*`
#[derive(Debug, Clone)]
pub struct PredictionClient {
    config: MlClientConfig,
    #[cfg(feature = "ml")]
    http: Option<reqwest::Client>,
}

impl PredictionClient {
    /// Build a client; if the HTTP transport cannot be created the client
    /// stays in fallback mode for its whole lifetime
    pub fn new(config: MlClientConfig) -> Self {
        #[cfg(feature = "ml")]
        {
            let http = match reqwest::Client::builder().timeout(config.timeout).build() {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("HTTP client init failed, predictions will use fallback: {}", e);
                    None
                }
            };
            Self { config, http }
        }

        #[cfg(not(feature = "ml"))]
        {
            debug!("ML feature disabled, predictions will use fallback");
            Self { config }
        }
    }

    /// Client that never contacts the service; every call reports
    /// [`MlError::ServiceDisabled`] and predictions come from the local
    /// heuristic
    pub fn offline(config: MlClientConfig) -> Self {
        debug!("Prediction client created offline");
        Self {
            config,
            #[cfg(feature = "ml")]
            http: None,
        }
    }

    pub fn config(&self) -> &MlClientConfig {
        &self.config
    }

    /// Risk prediction, or the local fallback together with the reason the
    /// service result was discarded
    pub async fn predict<R: Rng + ?Sized>(
        &self,
        env: &EnvironmentalData,
        rng: &mut R,
    ) -> Result<RiskPrediction, Fallback> {
        match self.predict_remote(env).await {
            Ok(prediction) => Ok(prediction),
            Err(reason) => {
                if reason == MlError::ServiceDisabled {
                    debug!("ML service disabled, using local heuristic");
                } else {
                    warn!("ML prediction unavailable ({}), using local heuristic", reason);
                }
                Err(Fallback {
                    prediction: generate_fallback_predictions(env, rng),
                    reason,
                })
            }
        }
    }

    /// Service prediction only
    pub async fn predict_remote(&self, env: &EnvironmentalData) -> Result<RiskPrediction, MlError> {
        let mut prediction = self.post_json::<_, PredictEnvelope>("/api/ml/predict", env).await?;
        prediction.source = PredictionSource::Service;
        debug!(
            "ML prediction: score {:.3} ({})",
            prediction.ensemble_risk_score, prediction.ml_prediction.risk_category
        );
        Ok(prediction)
    }

    /// Server-side spread simulation for an ignition at (lat, lng)
    pub async fn simulate(
        &self,
        latitude: f64,
        longitude: f64,
        env: &EnvironmentalData,
    ) -> Result<MlSimulation, MlError> {
        let request = SimulateRequest {
            lat: latitude,
            lng: longitude,
            duration: self.config.simulation_hours,
            environment: env,
        };
        self.post_json::<_, SimulateEnvelope>("/api/ml/simulate", &request)
            .await
    }

    pub async fn model_info(&self) -> Result<ModelInfo, MlError> {
        self.get_json::<ModelInfoEnvelope>("/api/ml/model-info").await
    }

    /// Ask the service to start pushing real-time updates
    pub async fn start_realtime(&self) -> Result<(), MlError> {
        self.post_empty("/api/ml/start-realtime").await
    }
}

#[cfg(feature = "ml")]
mod transport {
    use super::PredictionClient;
    use crate::prediction::error::MlError;
    use crate::prediction::types::ServiceEnvelope;
    use serde::Serialize;

    fn map_reqwest(e: &reqwest::Error) -> MlError {
        if e.is_timeout() {
            MlError::Timeout
        } else {
            MlError::Network(e.to_string())
        }
    }

    fn decode<E: ServiceEnvelope>(body: &str) -> Result<E::Payload, MlError> {
        let envelope: E =
            serde_json::from_str(body).map_err(|e| MlError::MalformedBody(e.to_string()))?;
        envelope.into_payload()
    }

    impl PredictionClient {
        fn http(&self) -> Result<&reqwest::Client, MlError> {
            self.http.as_ref().ok_or(MlError::ServiceDisabled)
        }

        /// Send a request and return the body of a 2xx response
        async fn send(request: reqwest::RequestBuilder) -> Result<String, MlError> {
            let response = request.send().await.map_err(|e| map_reqwest(&e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(MlError::Status(status.as_u16()));
            }
            response.text().await.map_err(|e| map_reqwest(&e))
        }

        pub(super) async fn post_json<B, E>(&self, path: &str, body: &B) -> Result<E::Payload, MlError>
        where
            B: Serialize + ?Sized,
            E: ServiceEnvelope,
        {
            let request = self.http()?.post(self.config.endpoint(path)).json(body);
            decode::<E>(&Self::send(request).await?)
        }

        pub(super) async fn get_json<E: ServiceEnvelope>(&self, path: &str) -> Result<E::Payload, MlError> {
            let request = self.http()?.get(self.config.endpoint(path));
            decode::<E>(&Self::send(request).await?)
        }

        pub(super) async fn post_empty(&self, path: &str) -> Result<(), MlError> {
            let request = self
                .http()?
                .post(self.config.endpoint(path))
                .header(reqwest::header::CONTENT_TYPE, "application/json");
            Self::send(request).await.map(|_| ())
        }
    }

}

#[cfg(not(feature = "ml"))]
#[allow(clippy::unused_async, clippy::unused_self)]
impl PredictionClient {
    async fn post_json<B, E>(&self, _path: &str, _body: &B) -> Result<E::Payload, MlError>
    where
        B: Serialize + ?Sized,
        E: ServiceEnvelope,
    {
        Err(MlError::ServiceDisabled)
    }

    async fn get_json<E: ServiceEnvelope>(&self, _path: &str) -> Result<E::Payload, MlError> {
        Err(MlError::ServiceDisabled)
    }

    async fn post_empty(&self, _path: &str) -> Result<(), MlError> {
        Err(MlError::ServiceDisabled)
    }
}
