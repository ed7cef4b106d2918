//! Air quality index models

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of the PM2.5 series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AqiSample {
    pub date: NaiveDate,
    pub aqi: f64,
}

/// Current AQI plus the daily series, in provider order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AqiHistory {
    /// Current AQI; `None` when the station reports no value
    pub current: Option<f64>,
    pub samples: Vec<AqiSample>,
}

impl AqiHistory {
    /// The last `days` samples in their original order
    #[must_use]
    pub fn trend(&self, days: usize) -> &[AqiSample] {
        let start = self.samples.len().saturating_sub(days);
        &self.samples[start..]
    }

    #[must_use]
    pub fn category(&self) -> Option<AqiCategory> {
        self.current.map(AqiCategory::from_aqi)
    }

    #[must_use]
    pub fn marker(&self) -> Option<MarkerColor> {
        self.current.map(MarkerColor::for_aqi)
    }
}

/// AQI severity bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Band for an AQI value; fractional values round up into the next band
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => AqiCategory::Good,
            a if a <= 100.0 => AqiCategory::Moderate,
            a if a <= 150.0 => AqiCategory::UnhealthyForSensitiveGroups,
            a if a <= 200.0 => AqiCategory::Unhealthy,
            a if a <= 300.0 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good (0-50)",
            AqiCategory::Moderate => "Moderate (51-100)",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups (101-150)",
            AqiCategory::Unhealthy => "Unhealthy (151-200)",
            AqiCategory::VeryUnhealthy => "Very Unhealthy (201-300)",
            AqiCategory::Hazardous => "Hazardous (301+)",
        }
    }

    #[must_use]
    pub fn advisory(self) -> &'static str {
        match self {
            AqiCategory::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            AqiCategory::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people."
            }
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects."
            }
            AqiCategory::Unhealthy => "Everyone may begin to experience health effects.",
            AqiCategory::VeryUnhealthy => {
                "Health alert: The risk of health effects is increased for everyone."
            }
            AqiCategory::Hazardous => {
                "Health warning of emergency conditions. The entire population is likely to be affected."
            }
        }
    }
}

/// Map marker and headline metric colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Green,
    Red,
}

impl MarkerColor {
    #[must_use]
    pub fn for_aqi(aqi: f64) -> Self {
        if aqi > 100.0 {
            MarkerColor::Red
        } else {
            MarkerColor::Green
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerColor::Green => "green",
            MarkerColor::Red => "red",
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
