//! Forecasting models for revenue series

pub mod holt;
pub mod seasonal;

use crate::data::RevenueSeries;
use crate::error::{PipelineError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

pub use holt::{HoltLinear, TrainedHoltLinear};
pub use seasonal::{HoltWinters, TrainedHoltWinters};

/// Minimum number of observations required to fit any model.
pub const MIN_OBSERVATIONS: usize = 4;

/// Point forecasts with their prediction intervals
#[derive(Debug, Clone)]
pub struct ForecastResult {
    values: Vec<f64>,
    intervals: Vec<(f64, f64)>,
}

impl ForecastResult {
    /// Create a forecast result, validating interval shape and ordering.
    pub fn new(values: Vec<f64>, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(PipelineError::Validation(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        for (value, (lower, upper)) in values.iter().zip(&intervals) {
            if !(lower <= value && value <= upper) {
                return Err(PipelineError::Validation(format!(
                    "Interval ({}, {}) does not contain point forecast {}",
                    lower, upper, value
                )));
            }
        }

        Ok(Self { values, intervals })
    }

    /// The point forecasts.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The (lower, upper) prediction intervals.
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Returns the number of forecast points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the result holds no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A forecasting model that can be fit to a revenue series
pub trait ForecastModel {
    /// The trained counterpart produced by `train`.
    type Trained: TrainedForecastModel;

    /// Fit the model to a series.
    fn train(&self, series: &RevenueSeries) -> Result<Self::Trained>;

    /// Get the model name.
    fn name(&self) -> &str;
}

/// A fitted model ready to produce forecasts
pub trait TrainedForecastModel {
    /// Forecast `horizon` future periods with intervals at `confidence_level`.
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult>;

    /// One-step-ahead in-sample fits over the training span.
    fn fitted(&self, confidence_level: f64) -> Result<ForecastResult>;

    /// Mean absolute error of the in-sample fit.
    fn mae(&self) -> f64;

    /// Smoothed trend component over the training span.
    fn trend_component(&self) -> Vec<f64>;

    /// Seasonal component over the training span; all zeros for
    /// non-seasonal models.
    fn seasonal_component(&self) -> Vec<f64>;

    /// Get the model name.
    fn name(&self) -> &str;
}

/// Two-sided z multiplier for prediction intervals at `confidence_level`.
pub(crate) fn interval_z(confidence_level: f64) -> Result<f64> {
    if confidence_level <= 0.0 || confidence_level >= 1.0 {
        return Err(PipelineError::Validation(
            "Confidence level must be between 0 and 1".to_string(),
        ));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| PipelineError::Forecast(format!("Normal distribution error: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Mean absolute error between two equally long slices.
pub(crate) fn mean_absolute_error(actual: &[f64], fitted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| (a - f).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Sample standard deviation of residuals.
pub(crate) fn std_dev(residuals: &[f64]) -> f64 {
    if residuals.len() < 2 {
        return 0.0;
    }
    let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
    let variance = residuals
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / (residuals.len() - 1) as f64;
    variance.sqrt()
}

/// Guard shared by every model's `train`.
pub(crate) fn check_min_observations(series: &RevenueSeries) -> Result<()> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(PipelineError::Forecast(format!(
            "Need at least {} observations to fit a forecast, got {}",
            MIN_OBSERVATIONS,
            series.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn interval_z_matches_common_levels() {
        assert_approx_eq!(interval_z(0.95).unwrap(), 1.96, 1e-2);
        assert_approx_eq!(interval_z(0.80).unwrap(), 1.28, 1e-2);
    }

    #[test]
    fn interval_z_rejects_out_of_range() {
        assert!(interval_z(0.0).is_err());
        assert!(interval_z(1.0).is_err());
    }

    #[test]
    fn forecast_result_rejects_inverted_interval() {
        let result = ForecastResult::new(vec![10.0], vec![(11.0, 12.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn std_dev_of_constant_residuals_is_zero() {
        assert_eq!(std_dev(&[0.5, 0.5, 0.5]), 0.0);
    }
}
