//! Pollution lookup
//!
//! Resolves a city name to coordinates through the OpenWeatherMap weather
//! endpoint, then reads the current pollutant concentrations at that point.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiRequest, Endpoint, JsonSource};
use crate::config::DashboardConfig;
use crate::models::{Coordinates, PollutantReading, PollutionReport};
use crate::{DashboardError, Result};

pub struct PollutionLookup {
    source: Arc<dyn JsonSource>,
    config: Arc<DashboardConfig>,
}

impl PollutionLookup {
    pub fn new(source: Arc<dyn JsonSource>, config: Arc<DashboardConfig>) -> Self {
        Self { source, config }
    }

    /// Coordinates and current pollutant readings for `city`.
    ///
    /// Either both halves of the report are present or an error explains
    /// which step came back empty.
    #[instrument(skip(self))]
    pub async fn lookup(&self, city: &str) -> Result<PollutionReport> {
        let coordinates = self.geocode(city).await?;
        debug!("Resolved {} to {}", city, coordinates.format_coordinates());

        let request = ApiRequest::new(
            Endpoint::AirPollution,
            format!("{}/air_pollution", self.config.endpoints.weather_base_url),
        )
        .param("lat", coordinates.latitude)
        .param("lon", coordinates.longitude)
        .param("appid", self.config.api_keys.openweathermap());

        let response = self.source.get_json(&request).await?;
        let reading = parse_components(city, &response)?;

        info!("Found {} pollutant readings for {}", reading.len(), city);
        Ok(PollutionReport {
            reading,
            coordinates,
        })
    }

    async fn geocode(&self, city: &str) -> Result<Coordinates> {
        let request = ApiRequest::new(
            Endpoint::Weather,
            format!("{}/weather", self.config.endpoints.weather_base_url),
        )
        .param("q", city)
        .param("appid", self.config.api_keys.openweathermap());

        let response = self.source.get_json(&request).await?;
        parse_coordinates(city, &response)
    }
}

#[derive(Debug, Deserialize)]
struct Coord {
    lat: f64,
    lon: f64,
}

/// The parts of an OpenWeatherMap weather response used for geocoding
#[derive(Debug, Default, Deserialize)]
struct WeatherResponse {
    coord: Option<Coord>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    components: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<PollutionEntry>,
}

/// `coord.{lat,lon}` from a weather response; both must be numeric
pub fn parse_coordinates(city: &str, response: &Value) -> Result<Coordinates> {
    let weather = WeatherResponse::deserialize(response).unwrap_or_else(|e| {
        debug!("Unexpected weather response shape: {}", e);
        WeatherResponse::default()
    });

    match weather.coord {
        Some(Coord { lat, lon }) => Ok(Coordinates::new(lat, lon)),
        None => {
            let reason = weather.message.as_deref().unwrap_or("no coord field");
            warn!("Geocoding '{}' failed: {}", city, reason);
            Err(DashboardError::city_not_found(city))
        }
    }
}

/// Components of the first (current) entry of an air pollution response
pub fn parse_components(city: &str, response: &Value) -> Result<PollutantReading> {
    let components = PollutionResponse::deserialize(response)
        .ok()
        .and_then(|pollution| pollution.list.into_iter().next())
        .and_then(|current| current.components)
        .ok_or_else(|| {
            warn!("No pollution list for {}", city);
            DashboardError::pollution_unavailable(city)
        })?;

    Ok(components
        .into_iter()
        .filter_map(|(name, value)| match value.as_f64() {
            Some(concentration) => Some((name, concentration)),
            None => {
                warn!("Skipping non-numeric concentration for {}: {}", name, value);
                None
            }
        })
        .collect())
}
