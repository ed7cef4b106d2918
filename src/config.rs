//! Configuration management for the dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DashboardError;
use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const OPENWEATHERMAP_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
pub const OPENROUTESERVICE_KEY_VAR: &str = "OPENROUTESERVICE_API_KEY";
pub const WAQI_TOKEN_VAR: &str = "WAQI_API_TOKEN";

/// Root configuration structure for the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// API credentials (the `[api_keys]` table doubles as the secrets store)
    #[serde(default)]
    pub api_keys: ApiKeys,
    /// Upstream base URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    /// Congestion derivation constants
    #[serde(default)]
    pub traffic: TrafficConfig,
    /// Presentation settings
    #[serde(default)]
    pub dashboard: DisplayConfig,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// JSON API server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Credentials for the three providers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(rename = "openweathermap_api_key")]
    pub openweathermap: Option<String>,
    #[serde(rename = "openrouteservice_api_key")]
    pub openrouteservice: Option<String>,
    #[serde(rename = "waqi_api_token")]
    pub waqi: Option<String>,
}

/// Upstream base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// OpenWeatherMap data API, serves `/weather` and `/air_pollution`
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    /// OpenRouteService API root
    #[serde(default = "default_routing_base_url")]
    pub routing_base_url: String,
    /// WAQI API root
    #[serde(default = "default_aqi_base_url")]
    pub aqi_base_url: String,
}

/// Constants behind the congestion estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// Free-flow speed used for the expected travel time, in km/h
    #[serde(default = "default_expected_speed")]
    pub expected_speed_kmh: f64,
    /// Offset applied to both latitude and longitude to pick the probe destination
    #[serde(default = "default_destination_offset")]
    pub destination_offset_deg: f64,
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of trailing AQI samples shown in the compact trend
    #[serde(default = "default_trend_days")]
    pub trend_days: usize,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds; the client default applies when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// JSON API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_routing_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_aqi_base_url() -> String {
    "https://api.waqi.info".to_string()
}

fn default_expected_speed() -> f64 {
    50.0
}

fn default_destination_offset() -> f64 {
    0.01
}

fn default_trend_days() -> usize {
    7
}

fn default_user_agent() -> String {
    concat!("smartcity/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            weather_base_url: default_weather_base_url(),
            routing_base_url: default_routing_base_url(),
            aqi_base_url: default_aqi_base_url(),
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            expected_speed_kmh: default_expected_speed(),
            destination_offset_deg: default_destination_offset(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl ApiKeys {
    /// Resolve every key from the process environment first, then from `self`
    #[must_use]
    pub fn resolve(&self) -> Self {
        self.resolve_with(|name| env::var(name).ok())
    }

    /// Same as [`ApiKeys::resolve`] with an injectable environment lookup
    #[must_use]
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |name: &str, stored: &Option<String>| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .or_else(|| stored.clone().filter(|value| !value.is_empty()))
        };

        Self {
            openweathermap: pick(OPENWEATHERMAP_KEY_VAR, &self.openweathermap),
            openrouteservice: pick(OPENROUTESERVICE_KEY_VAR, &self.openrouteservice),
            waqi: pick(WAQI_TOKEN_VAR, &self.waqi),
        }
    }

    /// Names of the credentials that could not be resolved
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (OPENWEATHERMAP_KEY_VAR, &self.openweathermap),
            (OPENROUTESERVICE_KEY_VAR, &self.openrouteservice),
            (WAQI_TOKEN_VAR, &self.waqi),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub(crate) fn openweathermap(&self) -> &str {
        self.openweathermap.as_deref().unwrap_or_default()
    }

    pub(crate) fn openrouteservice(&self) -> &str {
        self.openrouteservice.as_deref().unwrap_or_default()
    }

    pub(crate) fn waqi(&self) -> &str {
        self.waqi.as_deref().unwrap_or_default()
    }
}

impl DashboardConfig {
    /// Load configuration from `config_path`, or from the per-user config
    /// file when none is given, then overlay `SMARTCITY__*` variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // SMARTCITY__TRAFFIC__EXPECTED_SPEED_KMH=40 and friends
        builder = builder.add_source(
            Environment::with_prefix("SMARTCITY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DashboardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.api_keys = config.api_keys.resolve();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("smartcity").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.endpoints.weather_base_url.is_empty() {
            self.endpoints.weather_base_url = default_weather_base_url();
        }
        if self.endpoints.routing_base_url.is_empty() {
            self.endpoints.routing_base_url = default_routing_base_url();
        }
        if self.endpoints.aqi_base_url.is_empty() {
            self.endpoints.aqi_base_url = default_aqi_base_url();
        }
        if self.dashboard.trend_days == 0 {
            self.dashboard.trend_days = default_trend_days();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // Trailing slashes would double up when joining paths
        for url in [
            &mut self.endpoints.weather_base_url,
            &mut self.endpoints.routing_base_url,
            &mut self.endpoints.aqi_base_url,
        ] {
            while url.ends_with('/') {
                url.pop();
            }
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let speed = self.traffic.expected_speed_kmh;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(DashboardError::config(format!(
                "Expected speed must be a positive number of km/h, got: {speed}"
            ))
            .into());
        }

        let offset = self.traffic.destination_offset_deg;
        if !offset.is_finite() || offset.abs() > 1.0 {
            return Err(DashboardError::config(format!(
                "Destination offset must be within ±1 degree, got: {offset}"
            ))
            .into());
        }

        if self.dashboard.trend_days > 30 {
            return Err(DashboardError::config("Trend window cannot exceed 30 days").into());
        }

        if let Some(timeout) = self.http.timeout_seconds {
            if timeout == 0 || timeout > 300 {
                return Err(DashboardError::config(
                    "HTTP timeout must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("weather", &self.endpoints.weather_base_url),
            ("routing", &self.endpoints.routing_base_url),
            ("aqi", &self.endpoints.aqi_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DashboardError::config(format!(
                    "The {name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
