//! Fire Watch Core Library
//!
//! Simulation core for a wildfire-risk dashboard: a procedural fire-spread
//! animation on a map, monitoring statistics derived from elapsed simulated
//! time, and risk predictions from an optional ML service with a local
//! fallback.
//!
//! ## Spread Animation
//!
//! The animation is a visual aid, not a fire-behaviour model:
//! - Fire points spread downwind with probability, scaled by wind, temperature
//!   and humidity
//! - Monitoring figures follow a closed-form growth curve in elapsed time
//! - Ticks come from a pluggable scheduler (virtual clock for tests and fast
//!   runs, wall clock for live use)
//!
//! ## Risk Prediction
//!
//! Calls to the prediction service are best-effort. Any failure is replaced
//! by a weather-only heuristic and the user is told the dashboard is running
//! on local predictions.

// Core types and utilities
pub mod core_types;

// Collaborator seams
pub mod context;
pub mod notify;
pub mod render;

// Spread animation and prediction
pub mod prediction;
pub mod simulation;

// Re-export core types
pub use core_types::{Celsius, KilometersPerHour, Percent};
pub use core_types::{EnvironmentFields, EnvironmentalReader, EnvironmentalSnapshot, WindDirection};
pub use core_types::{FirePoint, PointGeneration};

// Re-export collaborator types
pub use context::SimulationContext;
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use render::{ChartRenderer, LayerHandle, MapRenderer, RecordingRenderer, RenderError};

// Re-export simulation and prediction types
pub use prediction::{MlClientConfig, MlError, PredictionClient, PredictionSource, RiskPrediction};
pub use simulation::{
    MonitoringSnapshot, SimulationConfig, SimulationState, SpreadSimulation, TickScheduler,
    VirtualClock, VirtualScheduler, WallClockScheduler,
};
