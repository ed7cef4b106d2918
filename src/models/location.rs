//! Location models: coordinates and the supported city set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DashboardError;

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Shift both latitude and longitude by `delta` degrees
    #[must_use]
    pub fn offset(&self, delta: f64) -> Self {
        Self::new(self.latitude + delta, self.longitude + delta)
    }

    /// `"lon,lat"` pair as expected by the routing API
    #[must_use]
    pub fn to_lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Cities offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Delhi,
    Mumbai,
    Bangalore,
    Kolkata,
    Chennai,
    Hyderabad,
    Ahmedabad,
    Pune,
    Jaipur,
    Lucknow,
}

impl City {
    pub const ALL: [City; 10] = [
        City::Delhi,
        City::Mumbai,
        City::Bangalore,
        City::Kolkata,
        City::Chennai,
        City::Hyderabad,
        City::Ahmedabad,
        City::Pune,
        City::Jaipur,
        City::Lucknow,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            City::Delhi => "Delhi",
            City::Mumbai => "Mumbai",
            City::Bangalore => "Bangalore",
            City::Kolkata => "Kolkata",
            City::Chennai => "Chennai",
            City::Hyderabad => "Hyderabad",
            City::Ahmedabad => "Ahmedabad",
            City::Pune => "Pune",
            City::Jaipur => "Jaipur",
            City::Lucknow => "Lucknow",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = DashboardError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        City::ALL
            .into_iter()
            .find(|city| city.name().eq_ignore_ascii_case(input))
            .ok_or_else(|| DashboardError::unsupported_city(input))
    }
}
