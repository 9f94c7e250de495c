//! Rolling monitoring chart series and elapsed-time labels

use crate::simulation::MonitoringSnapshot;
use serde::{Deserialize, Serialize};

/// Chart id the simulation publishes its monitoring series under
pub const MONITORING_CHART_ID: &str = "simulationMonitoring";

/// One x-position on the monitoring chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub burned_area_ha: f64,
    pub perimeter_km: f64,
}

impl SeriesPoint {
    fn origin() -> Self {
        Self {
            label: "0m".to_string(),
            burned_area_ha: 0.0,
            perimeter_km: 0.0,
        }
    }
}

/// Burned area / perimeter history shown beside the map
///
/// Holds at most `window + 1` points: once more than `window` are held the
/// oldest is dropped before the next push.
#[derive(Debug, Clone)]
pub struct MonitoringSeries {
    points: Vec<SeriesPoint>,
    window: usize,
}

impl Default for MonitoringSeries {
    fn default() -> Self {
        Self::new(20)
    }
}

impl MonitoringSeries {
    pub fn new(window: usize) -> Self {
        Self {
            points: vec![SeriesPoint::origin()],
            window,
        }
    }

    /// Append the snapshot for `elapsed_minutes`
    pub fn push(&mut self, elapsed_minutes: u32, snapshot: &MonitoringSnapshot) {
        if self.points.len() > self.window {
            self.points.remove(0);
        }
        self.points.push(SeriesPoint {
            label: chart_label(elapsed_minutes),
            burned_area_ha: snapshot.burned_area_ha.max(0.0),
            perimeter_km: snapshot.perimeter_km.max(0.0),
        });
    }

    /// Back to the single "0m" point
    pub fn reset(&mut self) {
        self.points.clear();
        self.points.push(SeriesPoint::origin());
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Elapsed time as shown in the simulation header ("1h 5m", "42 minutes")
pub fn format_elapsed(elapsed_minutes: u32) -> String {
    let hours = elapsed_minutes / 60;
    let minutes = elapsed_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes} minutes")
    }
}

/// Compact chart axis label ("45m", "60m", "1h1m", "2h")
pub fn chart_label(elapsed_minutes: u32) -> String {
    if elapsed_minutes > 60 {
        let hours = elapsed_minutes / 60;
        let minutes = elapsed_minutes % 60;
        if minutes > 0 {
            format!("{hours}h{minutes}m")
        } else {
            format!("{hours}h")
        }
    } else {
        format!("{elapsed_minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_labels() {
        assert_eq!(format_elapsed(0), "0 minutes");
        assert_eq!(format_elapsed(59), "59 minutes");
        assert_eq!(format_elapsed(60), "1h 0m");
        assert_eq!(format_elapsed(125), "2h 5m");
    }

    #[test]
    fn test_chart_labels() {
        assert_eq!(chart_label(0), "0m");
        assert_eq!(chart_label(60), "60m");
        assert_eq!(chart_label(61), "1h1m");
        assert_eq!(chart_label(120), "2h");
    }

    #[test]
    fn test_window_caps_length() {
        let mut series = MonitoringSeries::default();
        let snap = MonitoringSnapshot {
            burned_area_ha: 12.0,
            perimeter_km: 3.0,
            spread_rate_ha_per_hr: 1.0,
            active_source_count: 1,
        };
        for minute in 1..=100 {
            series.push(minute, &snap);
            assert!(series.len() <= 21);
        }
        assert_eq!(series.len(), 21);
        assert_eq!(series.points().last().map(|p| p.label.as_str()), Some("1h40m"));
        assert_eq!(series.points()[0].label, "1h20m");
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut series = MonitoringSeries::default();
        series.push(1, &MonitoringSnapshot::ZERO);
        series.reset();
        assert_eq!(series.points(), &[SeriesPoint::origin()]);
    }
}
