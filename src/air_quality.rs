//! Air quality history from the WAQI city feed

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::api::{ApiRequest, Endpoint, JsonSource};
use crate::config::DashboardConfig;
use crate::models::{AqiHistory, AqiSample};
use crate::{DashboardError, Result};

pub struct AirQualityHistory {
    source: Arc<dyn JsonSource>,
    config: Arc<DashboardConfig>,
}

impl AirQualityHistory {
    pub fn new(source: Arc<dyn JsonSource>, config: Arc<DashboardConfig>) -> Self {
        Self { source, config }
    }

    /// Current AQI and the daily PM2.5 averages for `city`
    #[instrument(skip(self))]
    pub async fn history(&self, city: &str) -> Result<AqiHistory> {
        let request = ApiRequest::new(
            Endpoint::AqiFeed,
            format!(
                "{}/feed/{}/",
                self.config.endpoints.aqi_base_url,
                urlencoding::encode(city)
            ),
        )
        .param("token", self.config.api_keys.waqi());

        let response = self.source.get_json(&request).await?;
        let history = parse_feed(&response)?;

        info!(
            "AQI for {}: current {:?}, {} daily samples",
            city,
            history.current,
            history.samples.len()
        );
        Ok(history)
    }
}

/// Top level of a WAQI response; `data` is an error string unless `status` is "ok"
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct FeedData {
    aqi: Option<Reading>,
    forecast: Option<Forecast>,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    daily: Option<DailyForecast>,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
    #[serde(default)]
    pm25: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    day: Option<String>,
    avg: Option<Reading>,
}

/// WAQI sends numbers, numeric strings, or "-" when a station has no reading
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    fn value(&self) -> Option<f64> {
        match self {
            Reading::Number(n) => Some(*n),
            Reading::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Validate a WAQI feed document and pull out the current value and PM2.5 series
pub fn parse_feed(response: &Value) -> Result<AqiHistory> {
    let invalid =
        |e: serde_json::Error| DashboardError::invalid_response(Endpoint::AqiFeed, e.to_string());

    let envelope = FeedEnvelope::deserialize(response).map_err(invalid)?;
    let status = envelope.status.as_deref().unwrap_or("missing");
    if status != "ok" {
        if envelope.data.is_null() {
            warn!("AQI feed answered '{}'", status);
        } else {
            warn!("AQI feed answered '{}': {}", status, envelope.data);
        }
        return Err(DashboardError::aqi_unavailable(status));
    }

    let data = Option::<FeedData>::deserialize(&envelope.data)
        .map_err(invalid)?
        .unwrap_or_default();
    let current = data.aqi.as_ref().and_then(Reading::value);

    let samples = data
        .forecast
        .and_then(|forecast| forecast.daily)
        .map(|daily| daily.pm25.iter().filter_map(parse_sample).collect())
        .unwrap_or_default();

    Ok(AqiHistory { current, samples })
}

fn parse_sample(entry: &DailyEntry) -> Option<AqiSample> {
    let date = entry
        .day
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    let aqi = entry.avg.as_ref().and_then(Reading::value);

    match (date, aqi) {
        (Some(date), Some(aqi)) => Some(AqiSample { date, aqi }),
        _ => {
            warn!("Skipping malformed PM2.5 forecast entry: {:?}", entry);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_feed_keeps_provider_order() {
        let response = json!({
            "status": "ok",
            "data": {
                "aqi": 162,
                "forecast": { "daily": { "pm25": [
                    { "avg": 154, "day": "2024-03-02", "max": 170, "min": 138 },
                    { "avg": 140, "day": "2024-03-01", "max": 158, "min": 120 },
                    { "avg": 171, "day": "2024-03-03", "max": 190, "min": 150 }
                ] } }
            }
        });

        let history = parse_feed(&response).unwrap();
        assert_eq!(history.current, Some(162.0));
        let days: Vec<String> = history.samples.iter().map(|s| s.date.to_string()).collect();
        assert_eq!(days, vec!["2024-03-02", "2024-03-01", "2024-03-03"]);
        assert_eq!(history.samples[2].aqi, 171.0);
    }

    #[test]
    fn test_status_not_ok() {
        let response = json!({ "status": "error", "data": "Unknown station" });
        match parse_feed(&response) {
            Err(DashboardError::AqiUnavailable { status }) => assert_eq!(status, "error"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_status() {
        assert!(matches!(
            parse_feed(&json!({ "data": { "aqi": 10 } })),
            Err(DashboardError::AqiUnavailable { .. })
        ));
    }

    #[test]
    fn test_placeholder_aqi_and_missing_forecast() {
        let history = parse_feed(&json!({ "status": "ok", "data": { "aqi": "-" } })).unwrap();
        assert_eq!(history.current, None);
        assert!(history.samples.is_empty());
    }

    #[test]
    fn test_ok_status_with_unreadable_data() {
        let history = parse_feed(&json!({ "status": "ok" })).unwrap();
        assert_eq!(history, AqiHistory::default());

        assert!(matches!(
            parse_feed(&json!({ "status": "ok", "data": "maintenance" })),
            Err(DashboardError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let response = json!({
            "status": "ok",
            "data": {
                "aqi": "87",
                "forecast": { "daily": { "pm25": [
                    { "avg": 80, "day": "yesterday" },
                    { "day": "2024-03-02" },
                    { "avg": 91, "day": "2024-03-03" }
                ] } }
            }
        });
        let history = parse_feed(&response).unwrap();
        assert_eq!(history.current, Some(87.0));
        assert_eq!(history.samples.len(), 1);
        assert_eq!(history.samples[0].aqi, 91.0);
    }
}
