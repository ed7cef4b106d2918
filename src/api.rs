//! HTTP access to the upstream data providers
//!
//! Every outbound call goes through [`JsonSource`], which hands back the raw
//! JSON body as an open [`Value`]. Shape validation happens in the component
//! that issued the request, never here.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::HttpConfig;
use crate::{DashboardError, Result};

/// Upstream endpoints the dashboard talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// OpenWeatherMap current weather, used for geocoding by city name
    Weather,
    /// OpenWeatherMap air pollution by coordinates
    AirPollution,
    /// OpenRouteService driving directions
    Directions,
    /// WAQI city feed
    AqiFeed,
}

impl Endpoint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Weather => "weather",
            Endpoint::AirPollution => "air_pollution",
            Endpoint::Directions => "directions",
            Endpoint::AqiFeed => "aqi_feed",
        }
    }

    /// Human-readable provider name used in user-facing messages
    #[must_use]
    pub fn service_name(self) -> &'static str {
        match self {
            Endpoint::Weather | Endpoint::AirPollution => "OpenWeatherMap",
            Endpoint::Directions => "OpenRouteService",
            Endpoint::AqiFeed => "WAQI",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single GET request against one of the upstream endpoints
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    /// Base URL including path, without query string
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(endpoint: Endpoint, url: impl Into<String>) -> Self {
        Self {
            endpoint,
            url: url.into(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Look up a query parameter by name
    #[must_use]
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full URL with percent-encoded query parameters
    pub fn to_url(&self) -> Result<Url> {
        Url::parse_with_params(&self.url, self.query.iter().map(|(k, v)| (*k, v.as_str())))
            .map_err(|e| {
                DashboardError::config(format!(
                    "Invalid {} URL '{}': {e}",
                    self.endpoint, self.url
                ))
            })
    }
}

/// Source of upstream JSON documents
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Issue the request and return the decoded body.
    ///
    /// Non-2xx statuses are not errors on their own: providers put their
    /// error details into a JSON body, which callers classify.
    async fn get_json(&self, request: &ApiRequest) -> Result<Value>;
}

/// Production [`JsonSource`] backed by reqwest
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonSource for ApiClient {
    // The query carries credentials, so only the bare URL is recorded.
    #[instrument(skip(self, request), fields(endpoint = %request.endpoint, url = %request.url))]
    async fn get_json(&self, request: &ApiRequest) -> Result<Value> {
        let url = request.to_url()?;
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::transport(request.endpoint, e.without_url().to_string()))?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );
        if !status.is_success() {
            warn!("{} answered with HTTP {}", request.endpoint, status);
        }

        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::transport(request.endpoint, e.without_url().to_string()))?;

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            DashboardError::invalid_response(request.endpoint, format!("body is not JSON: {e}"))
        })?;

        info!(
            "Fetched {} in {:.3}s",
            request.endpoint,
            start_time.elapsed().as_secs_f64()
        );

        Ok(value)
    }
}
