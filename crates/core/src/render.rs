//! Map and chart renderer seams
//!
//! The dashboard draws with third-party tile-map and charting widgets. The
//! simulation only needs a handful of calls from them, captured here as
//! traits. Rendering is best-effort: the simulation never waits on it and the
//! only error it looks at is a failed layer removal, which it ignores.

use crate::simulation::SeriesPoint;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Opaque handle to a drawn map layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerHandle(u64);

impl LayerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Fire marker icon variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    /// Large animated icon at a user ignition
    OriginFire,
    /// Small flame at a spread point
    SpreadFire,
}

/// Burn-circle styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleStyle {
    pub stroke_color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
    pub stroke_weight: Option<f32>,
}

impl CircleStyle {
    /// Circle drawn under a user ignition
    pub const INITIAL_BURN: CircleStyle = CircleStyle {
        stroke_color: "#ff6b35",
        fill_color: "#ff4444",
        fill_opacity: 0.7,
        stroke_weight: None,
    };

    /// Circle drawn under a spread point
    pub const SPREAD_BURN: CircleStyle = CircleStyle {
        stroke_color: "#ff4444",
        fill_color: "#cc0000",
        fill_opacity: 0.3,
        stroke_weight: Some(1.0),
    };
}

/// Errors reported by a map renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Layer was never drawn or was already removed
    UnknownLayer(LayerHandle),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownLayer(handle) => write!(f, "Unknown map layer {}", handle.raw()),
        }
    }
}

impl std::error::Error for RenderError {}

/// Tile-map drawing calls used by the simulation
pub trait MapRenderer {
    fn add_marker(&mut self, latitude: f64, longitude: f64, style: MarkerStyle) -> LayerHandle;

    fn add_circle(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        style: CircleStyle,
    ) -> LayerHandle;

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<(), RenderError>;
}

/// Chart update calls used by the simulation
pub trait ChartRenderer {
    /// Replace the series shown on `chart_id`
    fn update_series(&mut self, chart_id: &str, points: &[SeriesPoint]);
}

/// A layer as recorded by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker {
        latitude: f64,
        longitude: f64,
        style: MarkerStyle,
    },
    Circle {
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        style: CircleStyle,
    },
}

#[derive(Debug, Default)]
struct RecordingState {
    next_handle: u64,
    layers: FxHashMap<LayerHandle, Layer>,
    series: FxHashMap<String, Vec<SeriesPoint>>,
    removed: u64,
}

/// In-memory renderer that records what would be drawn
///
/// Clones share state, so a test can keep one clone and hand another to the
/// simulation context.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers currently on the map
    pub fn layer_count(&self) -> usize {
        self.state.borrow().layers.len()
    }

    pub fn marker_count(&self) -> usize {
        self.state
            .borrow()
            .layers
            .values()
            .filter(|l| matches!(l, Layer::Marker { .. }))
            .count()
    }

    pub fn circle_count(&self) -> usize {
        self.state
            .borrow()
            .layers
            .values()
            .filter(|l| matches!(l, Layer::Circle { .. }))
            .count()
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<Layer> {
        self.state.borrow().layers.get(&handle).cloned()
    }

    /// Total successful removals so far
    pub fn removed_count(&self) -> u64 {
        self.state.borrow().removed
    }

    /// Last series published for `chart_id`
    pub fn series(&self, chart_id: &str) -> Option<Vec<SeriesPoint>> {
        self.state.borrow().series.get(chart_id).cloned()
    }

    fn insert(&self, layer: Layer) -> LayerHandle {
        let mut state = self.state.borrow_mut();
        let handle = LayerHandle::new(state.next_handle);
        state.next_handle += 1;
        state.layers.insert(handle, layer);
        handle
    }
}

impl MapRenderer for RecordingRenderer {
    fn add_marker(&mut self, latitude: f64, longitude: f64, style: MarkerStyle) -> LayerHandle {
        self.insert(Layer::Marker {
            latitude,
            longitude,
            style,
        })
    }

    fn add_circle(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        style: CircleStyle,
    ) -> LayerHandle {
        self.insert(Layer::Circle {
            latitude,
            longitude,
            radius_m,
            style,
        })
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        if state.layers.remove(&handle).is_some() {
            state.removed += 1;
            Ok(())
        } else {
            Err(RenderError::UnknownLayer(handle))
        }
    }
}

impl ChartRenderer for RecordingRenderer {
    fn update_series(&mut self, chart_id: &str, points: &[SeriesPoint]) {
        self.state
            .borrow_mut()
            .series
            .insert(chart_id.to_string(), points.to_vec());
    }
}
