use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiRequest, Endpoint, JsonSource};
use crate::config::DashboardConfig;
use crate::models::{Coordinates, TrafficEstimate};
use crate::{DashboardError, Result};

/// Estimates congestion around a point by routing to a nearby probe destination
pub struct TrafficEstimator {
    source: Arc<dyn JsonSource>,
    config: Arc<DashboardConfig>,
}

impl TrafficEstimator {
    pub fn new(source: Arc<dyn JsonSource>, config: Arc<DashboardConfig>) -> Self {
        Self { source, config }
    }

    /// The probe destination: `origin` shifted by the configured offset on both axes
    #[must_use]
    pub fn destination_for(&self, origin: Coordinates) -> Coordinates {
        origin.offset(self.config.traffic.destination_offset_deg)
    }

    #[instrument(skip(self))]
    pub async fn estimate(&self, origin: Coordinates) -> Result<TrafficEstimate> {
        let destination = self.destination_for(origin);

        let request = ApiRequest::new(
            Endpoint::Directions,
            format!(
                "{}/v2/directions/driving-car",
                self.config.endpoints.routing_base_url
            ),
        )
        .param("api_key", self.config.api_keys.openrouteservice())
        .param("start", origin.to_lon_lat())
        .param("end", destination.to_lon_lat());

        let response = self.source.get_json(&request).await?;
        let (duration_s, distance_m) = parse_route_summary(&response)?;
        debug!("Route summary: {duration_s}s over {distance_m}m");

        let estimate =
            TrafficEstimate::derive(duration_s, distance_m, self.config.traffic.expected_speed_kmh);
        info!(
            "Estimated congestion {} ({:.0}s vs {:.0}s expected)",
            estimate.format_congestion(),
            estimate.duration_s,
            estimate.expected_duration_s
        );
        Ok(estimate)
    }
}

/// Route totals; the routing service leaves zero-valued fields out
#[derive(Debug, Deserialize)]
struct RouteSummary {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct RouteProperties {
    summary: Option<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    properties: Option<RouteProperties>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<RouteFeature>,
    error: Option<Value>,
}

/// `(duration, distance)` of the first route feature
pub fn parse_route_summary(response: &Value) -> Result<(f64, f64)> {
    let directions = DirectionsResponse::deserialize(response)
        .map_err(|e| DashboardError::invalid_response(Endpoint::Directions, e.to_string()))?;

    let Some(feature) = directions.features.into_iter().next() else {
        if let Some(error) = directions.error {
            warn!("Routing service reported: {}", error);
        }
        return Err(DashboardError::NoRouteFound);
    };

    let summary = feature
        .properties
        .and_then(|properties| properties.summary)
        .ok_or_else(|| {
            DashboardError::invalid_response(Endpoint::Directions, "route feature has no summary")
        })?;

    Ok((summary.duration, summary.distance))
}
