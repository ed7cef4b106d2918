//! Plain-text rendering of a dashboard snapshot

use std::fmt::{self, Write};

use crate::dashboard::{DashboardSnapshot, Outcome};
use crate::models::{AqiCategory, AqiSample, PollutantReading};

const BAR_WIDTH: usize = 40;

/// Terminal view of a [`DashboardSnapshot`]
pub struct TerminalReport<'a> {
    snapshot: &'a DashboardSnapshot,
    trend_days: usize,
}

impl<'a> TerminalReport<'a> {
    #[must_use]
    pub fn new(snapshot: &'a DashboardSnapshot, trend_days: usize) -> Self {
        Self {
            snapshot,
            trend_days,
        }
    }

    fn key_statistics(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "Key Statistics")?;
        match &self.snapshot.air_quality {
            Outcome::Ready(history) => match history.current {
                Some(aqi) => {
                    let category = AqiCategory::from_aqi(aqi);
                    writeln!(out, "  Current AQI:  {aqi} ({})", category.label())?;
                    writeln!(out, "                {}", category.advisory())?;
                }
                None => writeln!(out, "  Current AQI:  n/a")?,
            },
            Outcome::Failed(error) => writeln!(out, "  Current AQI:  {}", error.message)?,
        }
        if let Some(pm25) = self.snapshot.pm2_5() {
            writeln!(out, "  PM2.5 Level:  {pm25} μg/m³")?;
        }
        Ok(())
    }

    fn traffic(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "Traffic Information")?;
        match &self.snapshot.traffic {
            Some(Outcome::Ready(estimate)) => {
                writeln!(out, "  Traffic Duration:               {:.2} s", estimate.duration_s)?;
                writeln!(
                    out,
                    "  Expected Duration (no traffic): {:.2} s",
                    estimate.expected_duration_s
                )?;
                writeln!(
                    out,
                    "  Estimated Congestion:           {}",
                    estimate.format_congestion()
                )?;
            }
            Some(Outcome::Failed(error)) => writeln!(out, "  {}", error.message)?,
            None => writeln!(out, "  Traffic data not available.")?,
        }
        Ok(())
    }

    fn pollutants(reading: &PollutantReading, out: &mut String) -> fmt::Result {
        writeln!(out, "Pollutants Concentration (μg/m³)")?;
        let max = reading.max_concentration().unwrap_or(0.0);
        let label_width = reading.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, value) in reading.iter() {
            writeln!(
                out,
                "  {name:<label_width$} {} {value:.2}",
                bar(value, max)
            )?;
        }
        Ok(())
    }

    fn series(title: &str, samples: &[AqiSample], out: &mut String) -> fmt::Result {
        writeln!(out, "{title}")?;
        let max = samples.iter().map(|s| s.aqi).fold(0.0, f64::max);
        for sample in samples {
            writeln!(out, "  {} {} {}", sample.date, bar(sample.aqi, max), sample.aqi)?;
        }
        Ok(())
    }

    fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(
            out,
            "Smart City Traffic and Pollution Monitoring: {}",
            self.snapshot.city
        )?;
        writeln!(out)?;
        self.key_statistics(&mut out)?;
        writeln!(out)?;

        let report = match &self.snapshot.pollution {
            Outcome::Ready(report) => report,
            Outcome::Failed(error) => {
                writeln!(out, "{}", error.message)?;
                writeln!(
                    out,
                    "Unable to fetch data for the selected city. Please try again later."
                )?;
                return Ok(out);
            }
        };

        write!(out, "City Map: {}", report.coordinates.format_coordinates())?;
        if let Some(marker) = self.snapshot.marker {
            write!(out, " (marker: {marker})")?;
        }
        writeln!(out)?;
        writeln!(out)?;

        self.traffic(&mut out)?;
        writeln!(out)?;

        if !report.reading.is_empty() {
            Self::pollutants(&report.reading, &mut out)?;
            writeln!(out)?;
        }

        match &self.snapshot.air_quality {
            Outcome::Ready(history) if !history.samples.is_empty() => {
                let window = format!("AQI Trend (Last {} Days)", self.trend_days);
                Self::series(&window, history.trend(self.trend_days), &mut out)?;
                writeln!(out)?;
                Self::series("Historical AQI Trend", &history.samples, &mut out)?;
            }
            _ => writeln!(out, "Historical AQI data not available.")?,
        }

        Ok(out)
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.clamp(1, BAR_WIDTH))
}

impl fmt::Display for TerminalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render()?)
    }
}
