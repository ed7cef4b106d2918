//! `smartcity` - Traffic and pollution monitoring for major Indian cities
//!
//! This library fetches current pollution, congestion and air quality
//! history for a city from public web APIs and assembles them into a
//! dashboard snapshot for the terminal report and the JSON API.

pub mod air_quality;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod pollution;
pub mod report;
pub mod traffic;
pub mod web;

// Re-export core types for public API
pub use air_quality::AirQualityHistory;
pub use api::{ApiClient, ApiRequest, Endpoint, JsonSource};
pub use crate::config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardSnapshot, ErrorReport, Outcome};
pub use error::{DashboardError, ErrorCode};
pub use models::{
    AqiCategory, AqiHistory, AqiSample, City, Coordinates, MarkerColor, PollutantReading,
    PollutionReport, TrafficEstimate,
};
pub use pollution::PollutionLookup;
pub use report::TerminalReport;
pub use traffic::TrafficEstimator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
