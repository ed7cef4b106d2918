//! Error types and handling for the dashboard pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::Endpoint;
use crate::models::City;

/// Stable machine-readable codes for every failure the dashboard can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnsupportedCity,
    CityNotFound,
    PollutionUnavailable,
    NoRouteFound,
    AqiUnavailable,
    Transport,
    InvalidResponse,
    Config,
}

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Name outside the fixed set of cities the dashboard offers
    #[error("Unsupported city: {city}")]
    UnsupportedCity { city: String },

    /// Geocoding returned no usable `coord` object
    #[error("City not found: {city}")]
    CityNotFound { city: String },

    /// Pollution endpoint returned no component list
    #[error("Pollution data not available for {city}")]
    PollutionUnavailable { city: String },

    /// Routing endpoint returned no route feature
    #[error("No route found in the routing response")]
    NoRouteFound,

    /// AQI feed answered with a status other than "ok"
    #[error("AQI feed returned status '{status}'")]
    AqiUnavailable { status: String },

    /// DNS, connection, TLS or timeout failure
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },

    /// Body was not JSON or had an unexpected shape
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: Endpoint, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DashboardError {
    pub fn unsupported_city<S: Into<String>>(city: S) -> Self {
        Self::UnsupportedCity { city: city.into() }
    }

    pub fn city_not_found<S: Into<String>>(city: S) -> Self {
        Self::CityNotFound { city: city.into() }
    }

    pub fn pollution_unavailable<S: Into<String>>(city: S) -> Self {
        Self::PollutionUnavailable { city: city.into() }
    }

    pub fn aqi_unavailable<S: Into<String>>(status: S) -> Self {
        Self::AqiUnavailable {
            status: status.into(),
        }
    }

    pub fn transport<S: Into<String>>(endpoint: Endpoint, message: S) -> Self {
        Self::Transport {
            endpoint,
            message: message.into(),
        }
    }

    pub fn invalid_response<S: Into<String>>(endpoint: Endpoint, message: S) -> Self {
        Self::InvalidResponse {
            endpoint,
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            DashboardError::UnsupportedCity { .. } => ErrorCode::UnsupportedCity,
            DashboardError::CityNotFound { .. } => ErrorCode::CityNotFound,
            DashboardError::PollutionUnavailable { .. } => ErrorCode::PollutionUnavailable,
            DashboardError::NoRouteFound => ErrorCode::NoRouteFound,
            DashboardError::AqiUnavailable { .. } => ErrorCode::AqiUnavailable,
            DashboardError::Transport { .. } => ErrorCode::Transport,
            DashboardError::InvalidResponse { .. } => ErrorCode::InvalidResponse,
            DashboardError::Config { .. } => ErrorCode::Config,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::UnsupportedCity { city } => {
                let supported: Vec<&str> = City::ALL.iter().map(|city| city.name()).collect();
                format!(
                    "'{city}' is not a supported city. Choose one of: {}.",
                    supported.join(", ")
                )
            }
            DashboardError::CityNotFound { .. } => "City not found or invalid API key.".to_string(),
            DashboardError::PollutionUnavailable { .. } => {
                "Pollution data not available for the selected city.".to_string()
            }
            DashboardError::NoRouteFound => "No route found in the API response.".to_string(),
            DashboardError::AqiUnavailable { .. } => {
                "Failed to fetch historical AQI data.".to_string()
            }
            DashboardError::Transport {
                endpoint: Endpoint::Directions,
                message,
            } => format!("Failed to retrieve traffic data: {message}"),
            DashboardError::Transport { endpoint, .. } => format!(
                "Unable to reach the {} service. Please check your internet connection.",
                endpoint.service_name()
            ),
            DashboardError::InvalidResponse { endpoint, .. } => format!(
                "The {} service returned data that could not be read.",
                endpoint.service_name()
            ),
            DashboardError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}
