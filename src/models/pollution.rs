//! Pollutant concentration models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Pollutant name to concentration in µg/m³, in the order the provider sent them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollutantReading(IndexMap<String, f64>);

impl PollutantReading {
    pub const PM2_5: &'static str = "pm2_5";

    #[must_use]
    pub fn get(&self, pollutant: &str) -> Option<f64> {
        self.0.get(pollutant).copied()
    }

    #[must_use]
    pub fn pm2_5(&self) -> Option<f64> {
        self.get(Self::PM2_5)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest concentration, used to scale charts
    #[must_use]
    pub fn max_concentration(&self) -> Option<f64> {
        self.0.values().copied().reduce(f64::max)
    }
}

impl FromIterator<(String, f64)> for PollutantReading {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Current pollution for a city together with where it was measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionReport {
    pub reading: PollutantReading,
    pub coordinates: Coordinates,
}
