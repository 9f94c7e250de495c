//! Fire-spread animation driven by a tick scheduler
//!
//! `SpreadSimulation` combines:
//! - Environmental reader (UI fields → snapshot, read fresh every tick)
//! - Spread model (new points downwind of the most recent ones)
//! - Monitoring estimator and its rolling chart series
//! - A [`TickScheduler`] that decides when ticks are due
//!
//! Each tick advances simulated time by exactly one minute, whatever the
//! wall-clock interval. The interval only controls how fast minutes go by.

pub mod clock;
pub mod monitoring;
pub mod series;
pub mod spread;

pub use clock::{tick_interval, TickScheduler, VirtualClock, VirtualScheduler, WallClockScheduler};
pub use monitoring::{MonitoringEstimator, MonitoringParams, MonitoringSnapshot};
pub use series::{chart_label, format_elapsed, MonitoringSeries, SeriesPoint, MONITORING_CHART_ID};
pub use spread::{SpreadModel, SpreadOutcome, SpreadParams};

use crate::context::SimulationContext;
use crate::core_types::{EnvironmentFields, EnvironmentalReader, EnvironmentalSnapshot, FirePoint};
use crate::notify::Notification;
use crate::prediction::{self, MlSimulation, PredictionClient, PredictionSource};
use crate::render::LayerHandle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Simulation tuning; every constant the animation uses lives here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Tick interval at 1× speed
    pub base_interval: Duration,
    /// Floor for the tick interval at high speeds
    pub min_interval: Duration,
    /// Fire points kept before eviction kicks in
    pub max_points: usize,
    /// Oldest points dropped per eviction pass
    pub evict_count: usize,
    /// Burn circle drawn around a user ignition (m)
    pub origin_burn_radius_m: f64,
    pub spread: SpreadParams,
    pub monitoring: MonitoringParams,
    /// Chart points retained before the oldest is shifted out
    pub series_window: usize,
    /// Values used for absent or unparseable UI fields
    pub defaults: EnvironmentalSnapshot,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(2000),
            min_interval: Duration::from_millis(500),
            max_points: 100,
            evict_count: 20,
            origin_burn_radius_m: 200.0,
            spread: SpreadParams::default(),
            monitoring: MonitoringParams::default(),
            series_window: 20,
            defaults: EnvironmentalSnapshot::default(),
        }
    }
}

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub running: bool,
    pub elapsed_minutes: u32,
    pub speed_multiplier: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            running: false,
            elapsed_minutes: 0,
            speed_multiplier: 1.0,
        }
    }
}

/// A fire point plus the map layers drawn for it
#[derive(Debug, Clone)]
struct TrackedPoint {
    point: FirePoint,
    layers: Vec<LayerHandle>,
}

/// Play/pause/reset fire-spread animation
pub struct SpreadSimulation {
    config: SimulationConfig,
    state: SimulationState,

    // Oldest first
    points: Vec<TrackedPoint>,

    spread: SpreadModel,
    monitoring: MonitoringEstimator,
    series: MonitoringSeries,
    latest_monitoring: MonitoringSnapshot,

    scheduler: Box<dyn TickScheduler>,
    reader: EnvironmentalReader,
    fields: EnvironmentFields,
    rng: StdRng,
}

impl SpreadSimulation {
    /// Create a stopped simulation seeded from the OS
    pub fn new(config: SimulationConfig, scheduler: impl TickScheduler + 'static) -> Self {
        Self::with_rng(config, scheduler, StdRng::from_os_rng())
    }

    /// Create a stopped simulation with a reproducible random stream
    pub fn with_seed(config: SimulationConfig, scheduler: impl TickScheduler + 'static, seed: u64) -> Self {
        Self::with_rng(config, scheduler, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulationConfig, scheduler: impl TickScheduler + 'static, rng: StdRng) -> Self {
        info!(
            "Creating spread simulation: base interval {:?}, cap {} points",
            config.base_interval, config.max_points
        );
        Self {
            spread: SpreadModel::new(config.spread),
            monitoring: MonitoringEstimator::new(config.monitoring),
            series: MonitoringSeries::new(config.series_window),
            latest_monitoring: MonitoringSnapshot::ZERO,
            reader: EnvironmentalReader::new(config.defaults),
            fields: EnvironmentFields::default(),
            scheduler: Box::new(scheduler),
            state: SimulationState::default(),
            points: Vec::new(),
            rng,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------

    /// Replace the raw UI field values; read again on every tick
    pub fn set_environment(&mut self, fields: EnvironmentFields) {
        self.fields = fields;
    }

    pub fn environment_fields(&self) -> &EnvironmentFields {
        &self.fields
    }

    /// Current conditions as the next tick will see them
    pub fn environment(&self) -> EnvironmentalSnapshot {
        self.reader.read(&self.fields)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Place an origin point with its marker and initial burn circle
    ///
    /// Allowed whether or not the clock is running. Coordinates off the globe
    /// are rejected with an error notification and `false`.
    pub fn ignite(&mut self, ctx: &mut SimulationContext, latitude: f64, longitude: f64) -> bool {
        if !FirePoint::is_valid_location(latitude, longitude) {
            warn!("Rejected ignition at ({}, {})", latitude, longitude);
            ctx.notify(Notification::error("Invalid fire location"));
            return false;
        }
        let point = FirePoint::origin(latitude, longitude);
        let layers = ctx.draw_fire(&point, self.config.origin_burn_radius_m);
        self.points.push(TrackedPoint { point, layers });
        info!("Ignition at ({:.5}, {:.5}), {} points", latitude, longitude, self.points.len());
        true
    }

    /// Start ticking; no-op when already running
    pub fn play(&mut self, ctx: &mut SimulationContext) {
        if self.state.running {
            return;
        }
        self.state.running = true;

        let interval = self.current_interval();
        self.scheduler.start(interval);
        info!(
            "Simulation playing at {}× ({:?} per tick)",
            self.state.speed_multiplier, interval
        );

        self.publish_monitoring(ctx);
    }

    /// Stop ticking; elapsed time is kept
    pub fn pause(&mut self) {
        if self.state.running {
            info!("Simulation paused at {}", self.elapsed_label());
        }
        self.state.running = false;
        self.scheduler.stop();
    }

    /// Stop, zero the clock and remove every fire point
    pub fn reset(&mut self, ctx: &mut SimulationContext) {
        self.pause();
        self.state.elapsed_minutes = 0;

        self.publish_monitoring(ctx);

        let removed = self.points.len();
        for tracked in self.points.drain(..) {
            ctx.erase(&tracked.layers);
        }
        info!("Simulation reset, {} points cleared", removed);
    }

    /// Change the speed multiplier; a running clock restarts with the new
    /// interval
    pub fn set_speed(&mut self, ctx: &mut SimulationContext, speed_multiplier: f64) {
        let speed = if speed_multiplier.is_finite() && speed_multiplier > 0.0 {
            speed_multiplier
        } else {
            warn!("Ignoring invalid speed multiplier {}, using 1×", speed_multiplier);
            1.0
        };
        self.state.speed_multiplier = speed;

        if self.state.running {
            self.pause();
            self.play(ctx);
        }
    }

    // ------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------

    /// Run every tick the scheduler reports as due; returns how many ran
    pub fn update(&mut self, ctx: &mut SimulationContext) -> u32 {
        let due = self.scheduler.poll();
        for _ in 0..due {
            self.tick(ctx);
        }
        due
    }

    /// Advance one simulated minute; does nothing while paused
    pub fn tick(&mut self, ctx: &mut SimulationContext) {
        if !self.state.running {
            return;
        }
        self.state.elapsed_minutes += 1;

        self.publish_monitoring(ctx);

        if self.points.is_empty() {
            return;
        }

        if self.points.len() > self.config.max_points {
            let evict = self.config.evict_count.min(self.points.len());
            for tracked in self.points.drain(..evict) {
                ctx.erase(&tracked.layers);
            }
            debug!("Evicted {} oldest fire points", evict);
        }

        let snapshot = self.environment();
        let outcomes = self.spread.step(
            &snapshot,
            self.points.iter().map(|tracked| &tracked.point),
            &mut self.rng,
        );

        for outcome in &outcomes {
            let layers = ctx.draw_fire(&outcome.point, outcome.burn_radius_m);
            self.points.push(TrackedPoint {
                point: outcome.point,
                layers,
            });
        }

        debug!(
            "Tick {}: +{} points ({} total), {:.0} ha",
            self.state.elapsed_minutes,
            outcomes.len(),
            self.points.len(),
            self.latest_monitoring.burned_area_ha
        );
    }

    /// Recompute monitoring and push it to the chart; a stopped clock shows
    /// zeros and a cleared chart
    fn publish_monitoring(&mut self, ctx: &mut SimulationContext) {
        let snapshot = self
            .monitoring
            .estimate(self.state.elapsed_minutes, self.state.running, &mut self.rng);

        if self.state.running {
            self.series.push(self.state.elapsed_minutes, &snapshot);
        } else {
            self.series.reset();
        }
        ctx.update_chart(MONITORING_CHART_ID, self.series.points());
        self.latest_monitoring = snapshot;
    }

    fn current_interval(&self) -> Duration {
        tick_interval(
            self.state.speed_multiplier,
            self.config.base_interval,
            self.config.min_interval,
        )
    }

    // ------------------------------------------------------------------
    // Prediction service
    // ------------------------------------------------------------------

    /// Ignite and ask the prediction service for a server-side run
    ///
    /// The local animation starts whether or not the service answers.
    pub async fn ignite_with_ml(
        &mut self,
        ctx: &mut SimulationContext,
        client: &PredictionClient,
        latitude: f64,
        longitude: f64,
    ) -> Option<MlSimulation> {
        if !self.ignite(ctx, latitude, longitude) {
            return None;
        }
        let snapshot = self.environment();
        let simulation =
            prediction::simulate_with_ml(client, ctx, latitude, longitude, &snapshot, &mut self.rng).await;

        if simulation.is_some() {
            ctx.notify(Notification::success("AI-powered simulation active"));
        }
        simulation
    }

    /// Refresh the cached risk prediction for the current conditions
    pub async fn refresh_predictions(
        &mut self,
        ctx: &mut SimulationContext,
        client: &PredictionClient,
    ) -> PredictionSource {
        let snapshot = self.environment();
        prediction::refresh_predictions(client, ctx, &snapshot, &mut self.rng).await
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn elapsed_minutes(&self) -> u32 {
        self.state.elapsed_minutes
    }

    /// "1h 5m" / "42 minutes"
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.state.elapsed_minutes)
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.state.speed_multiplier
    }

    /// Active scheduler interval, `None` while stopped
    pub fn interval(&self) -> Option<Duration> {
        self.scheduler.interval()
    }

    /// Fire points, oldest first
    pub fn points(&self) -> impl Iterator<Item = &FirePoint> + '_ {
        self.points.iter().map(|tracked| &tracked.point)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn monitoring(&self) -> MonitoringSnapshot {
        self.latest_monitoring
    }

    pub fn series(&self) -> &MonitoringSeries {
        &self.series
    }
}

impl std::fmt::Debug for SpreadSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpreadSimulation")
            .field("state", &self.state)
            .field("points", &self.points.len())
            .field("monitoring", &self.latest_monitoring)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationLevel, NotificationLog};
    use crate::render::RecordingRenderer;

    fn setup() -> (SpreadSimulation, SimulationContext, RecordingRenderer, VirtualClock) {
        let clock = VirtualClock::new();
        let sim = SpreadSimulation::with_seed(
            SimulationConfig::default(),
            VirtualScheduler::new(clock.clone()),
            42,
        );
        let renderer = RecordingRenderer::new();
        let ctx = SimulationContext::new()
            .with_map(renderer.clone())
            .with_charts(renderer.clone());
        (sim, ctx, renderer, clock)
    }

    #[test]
    fn test_ignite_draws_origin() {
        let (mut sim, mut ctx, renderer, _) = setup();
        sim.ignite(&mut ctx, 30.0668, 79.0193);

        assert_eq!(sim.point_count(), 1);
        assert!(sim.points().all(FirePoint::is_origin));
        assert_eq!(renderer.marker_count(), 1);
        assert_eq!(renderer.circle_count(), 1);
        assert!(!sim.is_running());
    }

    #[test]
    fn test_ignite_rejects_invalid_location() {
        let (mut sim, _, renderer, _) = setup();
        let log = NotificationLog::new();
        let mut ctx = SimulationContext::new()
            .with_map(renderer.clone())
            .with_notifier(log.clone());

        assert!(!sim.ignite(&mut ctx, f64::NAN, 79.0));
        assert!(!sim.ignite(&mut ctx, 30.0, 200.0));
        assert_eq!(sim.point_count(), 0);
        assert_eq!(renderer.layer_count(), 0);
        assert_eq!(log.count(NotificationLevel::Error), 2);
        assert_eq!(log.entries()[0].message, "Invalid fire location");
    }

    #[test]
    fn test_tick_while_stopped_changes_nothing() {
        let (mut sim, mut ctx, renderer, _) = setup();
        sim.ignite(&mut ctx, 30.0668, 79.0193);
        for _ in 0..5 {
            sim.tick(&mut ctx);
        }
        assert!(!sim.is_running());
        assert_eq!(sim.elapsed_minutes(), 0);
        assert_eq!(sim.point_count(), 1);
        assert_eq!(renderer.layer_count(), 2);

        // Paused after running: elapsed and points stay where they were
        sim.play(&mut ctx);
        sim.tick(&mut ctx);
        sim.pause();
        let points = sim.point_count();
        for _ in 0..5 {
            sim.tick(&mut ctx);
        }
        assert_eq!(sim.elapsed_minutes(), 1);
        assert_eq!(sim.point_count(), points);
    }

    #[test]
    fn test_play_publishes_initial_point() {
        let (mut sim, mut ctx, renderer, _) = setup();
        sim.play(&mut ctx);

        let series = renderer.series(MONITORING_CHART_ID).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].label, "0m");
        assert_eq!(sim.interval(), Some(Duration::from_millis(2000)));

        // Second play is a no-op
        sim.play(&mut ctx);
        assert_eq!(renderer.series(MONITORING_CHART_ID).unwrap().len(), 2);
    }

    #[test]
    fn test_tick_without_fire_only_advances_time() {
        let (mut sim, mut ctx, renderer, _) = setup();
        sim.play(&mut ctx);
        sim.tick(&mut ctx);
        sim.tick(&mut ctx);

        assert_eq!(sim.elapsed_minutes(), 2);
        assert_eq!(sim.point_count(), 0);
        assert_eq!(renderer.layer_count(), 0);
    }

    #[test]
    fn test_invalid_speed_falls_back_to_normal() {
        let (mut sim, mut ctx, _, _) = setup();
        sim.play(&mut ctx);
        sim.set_speed(&mut ctx, 4.0);
        assert_eq!(sim.interval(), Some(Duration::from_millis(500)));

        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            sim.set_speed(&mut ctx, bad);
            assert_eq!(sim.speed_multiplier(), 1.0);
            assert_eq!(sim.interval(), Some(Duration::from_millis(2000)));
        }
    }

    #[test]
    fn test_speed_change_while_paused_applies_on_play() {
        let (mut sim, mut ctx, _, _) = setup();
        sim.set_speed(&mut ctx, 2.0);
        assert_eq!(sim.interval(), None);
        sim.play(&mut ctx);
        assert_eq!(sim.interval(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_reset_zeroes_monitoring() {
        let (mut sim, mut ctx, renderer, _) = setup();
        sim.ignite(&mut ctx, 30.0, 79.0);
        sim.play(&mut ctx);
        for _ in 0..90 {
            sim.tick(&mut ctx);
        }
        assert!(sim.monitoring().burned_area_ha > 0.0);

        sim.reset(&mut ctx);
        assert!(sim.monitoring().is_zero());
        assert_eq!(sim.elapsed_label(), "0 minutes");
        assert_eq!(sim.series().len(), 1);
        assert_eq!(renderer.series(MONITORING_CHART_ID).unwrap().len(), 1);
        assert_eq!(renderer.layer_count(), 0);
    }
}
