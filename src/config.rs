//! Run configuration: periodicity and forecast parameters

use crate::error::{PipelineError, Result};
use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Smallest accepted forecast horizon, in periods.
pub const MIN_HORIZON: usize = 1;

/// Largest accepted forecast horizon, in periods.
pub const MAX_HORIZON: usize = 36;

/// Periodicity of the revenue series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periodicity {
    /// One observation per calendar day
    Daily,
    /// One observation per calendar month
    Monthly,
}

impl Default for Periodicity {
    fn default() -> Self {
        Periodicity::Monthly
    }
}

impl Periodicity {
    /// Season length used by the seasonal model: a week of days or a year of months.
    pub fn season_length(&self) -> usize {
        match self {
            Periodicity::Daily => 7,
            Periodicity::Monthly => 12,
        }
    }

    /// Default forecast horizon in periods.
    pub fn default_horizon(&self) -> usize {
        match self {
            Periodicity::Daily => 30,
            Periodicity::Monthly => 12,
        }
    }

    /// Default number of merged rows handed to the commentary composer.
    pub fn default_window(&self) -> usize {
        match self {
            Periodicity::Daily => 60,
            Periodicity::Monthly => 24,
        }
    }

    /// Step a date forward by `steps` periods.
    ///
    /// Monthly stepping clamps to the end of shorter months
    /// (Jan 31 + 1 month = Feb 28).
    pub fn advance(&self, date: NaiveDate, steps: u32) -> NaiveDate {
        match self {
            Periodicity::Daily => date + Days::new(steps as u64),
            Periodicity::Monthly => date + Months::new(steps),
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Periodicity::Daily => write!(f, "daily"),
            Periodicity::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Periodicity {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Periodicity::Daily),
            "monthly" | "month" | "m" => Ok(Periodicity::Monthly),
            other => Err(PipelineError::Validation(format!(
                "Unsupported periodicity: {}",
                other
            ))),
        }
    }
}

/// Parameters for one forecast-and-commentary run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of future periods to forecast
    pub horizon: usize,
    /// Spacing of the observations
    pub periodicity: Periodicity,
    /// Number of merged rows serialized for the commentary prompt
    pub commentary_window: usize,
    /// Confidence level for the prediction intervals
    pub confidence_level: f64,
}

impl PipelineConfig {
    /// Create a configuration with an explicit horizon.
    pub fn new(periodicity: Periodicity, horizon: usize) -> Result<Self> {
        if !(MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
            return Err(PipelineError::Validation(format!(
                "Forecast horizon must be between {} and {} periods, got {}",
                MIN_HORIZON, MAX_HORIZON, horizon
            )));
        }

        Ok(Self {
            horizon,
            periodicity,
            commentary_window: periodicity.default_window(),
            confidence_level: 0.95,
        })
    }

    /// Create a configuration with the periodicity's default horizon.
    pub fn with_defaults(periodicity: Periodicity) -> Self {
        Self {
            horizon: periodicity.default_horizon(),
            periodicity,
            commentary_window: periodicity.default_window(),
            confidence_level: 0.95,
        }
    }

    /// Override the commentary lookback window.
    pub fn with_commentary_window(mut self, window: usize) -> Result<Self> {
        if window == 0 {
            return Err(PipelineError::Validation(
                "Commentary window must be at least 1 row".to_string(),
            ));
        }
        self.commentary_window = window;
        Ok(self)
    }

    /// Override the prediction-interval confidence level.
    pub fn with_confidence_level(mut self, level: f64) -> Result<Self> {
        if level <= 0.0 || level >= 1.0 {
            return Err(PipelineError::Validation(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }
        self.confidence_level = level;
        Ok(self)
    }
}
