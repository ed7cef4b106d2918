//! Route timing and congestion models

use serde::{Deserialize, Serialize};

/// Driving time for the probe route plus the derived congestion figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEstimate {
    /// Reported travel time in seconds
    pub duration_s: f64,
    /// Route length in meters
    pub distance_m: f64,
    /// Travel time at the free-flow speed, in seconds
    pub expected_duration_s: f64,
    /// Excess of actual over expected time as a percentage of expected time.
    /// `None` when the expected time is zero.
    pub congestion_pct: Option<f64>,
}

impl TrafficEstimate {
    /// Derive the expected duration and congestion from raw route figures
    #[must_use]
    pub fn derive(duration_s: f64, distance_m: f64, expected_speed_kmh: f64) -> Self {
        let expected_duration_s = expected_duration(distance_m, expected_speed_kmh);
        Self {
            duration_s,
            distance_m,
            expected_duration_s,
            congestion_pct: congestion(duration_s, expected_duration_s),
        }
    }

    /// Format the congestion percentage for display
    #[must_use]
    pub fn format_congestion(&self) -> String {
        self.congestion_pct
            .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:.2}%"))
    }
}

/// Seconds needed to cover `distance_m` at `speed_kmh`
#[must_use]
pub fn expected_duration(distance_m: f64, speed_kmh: f64) -> f64 {
    (distance_m / 1000.0) / speed_kmh * 3600.0
}

#[must_use]
pub fn congestion(duration_s: f64, expected_duration_s: f64) -> Option<f64> {
    if expected_duration_s == 0.0 || !expected_duration_s.is_finite() {
        return None;
    }
    Some((duration_s - expected_duration_s) / expected_duration_s * 100.0)
}
