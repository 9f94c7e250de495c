//! Collaborators shared by the simulation and the prediction flows

use crate::core_types::{FirePoint, PointGeneration};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::prediction::PredictionCache;
use crate::render::{ChartRenderer, CircleStyle, LayerHandle, MapRenderer, MarkerStyle};
use crate::simulation::SeriesPoint;
use tracing::{debug, info};

/// Explicit application context
///
/// Renderers are optional: with no map attached the simulation still tracks
/// fire points, it just draws nothing. Notifications default to the log.
pub struct SimulationContext {
    pub map: Option<Box<dyn MapRenderer>>,
    pub charts: Option<Box<dyn ChartRenderer>>,
    pub notifier: Box<dyn Notifier>,
    pub predictions: PredictionCache,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationContext {
    /// Context with no renderers and a log-only notifier
    pub fn new() -> Self {
        Self {
            map: None,
            charts: None,
            notifier: Box::new(TracingNotifier),
            predictions: PredictionCache::new(),
        }
    }

    #[must_use]
    pub fn with_map(mut self, map: impl MapRenderer + 'static) -> Self {
        self.map = Some(Box::new(map));
        self
    }

    #[must_use]
    pub fn with_charts(mut self, charts: impl ChartRenderer + 'static) -> Self {
        self.charts = Some(Box::new(charts));
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Draw a fire point's marker and burn circle; returns the layers drawn
    pub fn draw_fire(&mut self, point: &FirePoint, burn_radius_m: f64) -> Vec<LayerHandle> {
        let Some(map) = self.map.as_mut() else {
            return Vec::new();
        };
        let (marker, circle) = match point.generation {
            PointGeneration::Origin => (MarkerStyle::OriginFire, CircleStyle::INITIAL_BURN),
            PointGeneration::Spread => (MarkerStyle::SpreadFire, CircleStyle::SPREAD_BURN),
        };
        vec![
            map.add_marker(point.latitude, point.longitude, marker),
            map.add_circle(point.latitude, point.longitude, burn_radius_m, circle),
        ]
    }

    /// Remove layers, ignoring any the renderer no longer knows about
    pub fn erase(&mut self, layers: &[LayerHandle]) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        for &handle in layers {
            if let Err(e) = map.remove_layer(handle) {
                debug!("Ignoring layer removal failure: {}", e);
            }
        }
    }

    /// Push a chart series if a chart renderer is attached
    pub fn update_chart(&mut self, chart_id: &str, points: &[SeriesPoint]) {
        if let Some(charts) = self.charts.as_mut() {
            charts.update_series(chart_id, points);
        }
    }

    /// Detach every collaborator and forget cached predictions
    pub fn teardown(&mut self) {
        info!("Tearing down simulation context");
        self.map = None;
        self.charts = None;
        self.notifier = Box::new(TracingNotifier);
        self.predictions.clear();
    }
}

impl std::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("map", &self.map.is_some())
            .field("charts", &self.charts.is_some())
            .field("predictions", &self.predictions)
            .finish_non_exhaustive()
    }
}
