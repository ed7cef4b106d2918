//! Data models for the dashboard
//!
//! This module contains the transient records produced on every render,
//! organized by concern:
//! - Location: Geographic coordinates and the supported city set
//! - Pollution: Pollutant concentrations for a resolved city
//! - Traffic: Route timings and the derived congestion estimate
//! - Air quality: Current AQI, daily PM2.5 history and AQI bands

pub mod air_quality;
pub mod location;
pub mod pollution;
pub mod traffic;

// Re-export all public types for convenient access
pub use air_quality::{AqiCategory, AqiHistory, AqiSample, MarkerColor};
pub use location::{City, Coordinates};
pub use pollution::{PollutantReading, PollutionReport};
pub use traffic::TrafficEstimate;
