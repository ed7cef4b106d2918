//! One render cycle of the dashboard
//!
//! Pollution and AQI history are fetched concurrently; traffic is estimated
//! afterwards from the coordinates the pollution lookup resolved. Every
//! failure is folded into an [`Outcome`] so a single bad upstream never
//! aborts the snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::air_quality::AirQualityHistory;
use crate::api::JsonSource;
use crate::config::DashboardConfig;
use crate::error::ErrorCode;
use crate::models::{AqiCategory, AqiHistory, MarkerColor, PollutionReport, TrafficEstimate};
use crate::pollution::PollutionLookup;
use crate::traffic::TrafficEstimator;
use crate::{DashboardError, Result};

/// Failure as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&DashboardError> for ErrorReport {
    fn from(error: &DashboardError) -> Self {
        Self {
            code: error.code(),
            message: error.user_message(),
        }
    }
}

/// Result of one component, ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    Failed(ErrorReport),
}

impl<T> Outcome<T> {
    fn from_result(section: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(error) => {
                warn!("{} unavailable: {}", section, error);
                Outcome::Failed(ErrorReport::from(&error))
            }
        }
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Failed(report) => Some(report),
        }
    }
}

/// Everything one render shows for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub city: String,
    pub air_quality: Outcome<AqiHistory>,
    pub pollution: Outcome<PollutionReport>,
    /// `None` when no coordinates were resolved to route from
    pub traffic: Option<Outcome<TrafficEstimate>>,
    pub category: Option<AqiCategory>,
    pub marker: Option<MarkerColor>,
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// PM2.5 concentration from the pollution reading, if any
    #[must_use]
    pub fn pm2_5(&self) -> Option<f64> {
        self.pollution.ready().and_then(|report| report.reading.pm2_5())
    }
}

/// Wires the three components to a shared source and configuration
pub struct Dashboard {
    pollution: PollutionLookup,
    traffic: TrafficEstimator,
    air_quality: AirQualityHistory,
}

impl Dashboard {
    pub fn new(source: Arc<dyn JsonSource>, config: Arc<DashboardConfig>) -> Self {
        Self {
            pollution: PollutionLookup::new(source.clone(), config.clone()),
            traffic: TrafficEstimator::new(source.clone(), config.clone()),
            air_quality: AirQualityHistory::new(source, config),
        }
    }

    #[must_use]
    pub fn pollution(&self) -> &PollutionLookup {
        &self.pollution
    }

    #[must_use]
    pub fn traffic(&self) -> &TrafficEstimator {
        &self.traffic
    }

    #[must_use]
    pub fn air_quality(&self) -> &AirQualityHistory {
        &self.air_quality
    }

    /// Run every fetch once for `city`
    #[instrument(skip(self))]
    pub async fn snapshot(&self, city: &str) -> DashboardSnapshot {
        let (air_quality, pollution) = futures::join!(
            self.air_quality.history(city),
            self.pollution.lookup(city)
        );

        let traffic = match &pollution {
            Ok(report) => Some(Outcome::from_result(
                "Traffic",
                self.traffic.estimate(report.coordinates).await,
            )),
            Err(_) => None,
        };

        let air_quality = Outcome::from_result("AQI history", air_quality);
        let pollution = Outcome::from_result("Pollution", pollution);
        let history = air_quality.ready();
        let category = history.and_then(AqiHistory::category);
        let marker = history.and_then(AqiHistory::marker);

        info!(
            "Snapshot for {} ready (aqi: {}, pollution: {}, traffic: {})",
            city,
            air_quality.ready().is_some(),
            pollution.ready().is_some(),
            traffic.as_ref().is_some_and(|t| t.ready().is_some())
        );

        DashboardSnapshot {
            city: city.to_string(),
            air_quality,
            pollution,
            traffic,
            category,
            marker,
            fetched_at: Utc::now(),
        }
    }
}
