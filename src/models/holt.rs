//! Holt linear trend smoothing

use crate::data::RevenueSeries;
use crate::error::{PipelineError, Result};
use crate::models::{
    check_min_observations, interval_z, mean_absolute_error, std_dev, ForecastModel,
    ForecastResult, TrainedForecastModel,
};

/// Grid of smoothing-parameter candidates searched during training.
const PARAM_GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Double exponential smoothing with level and trend
#[derive(Debug, Clone)]
pub struct HoltLinear {
    /// Name of the model
    name: String,
    /// Fixed (alpha, beta); None selects them by grid search
    params: Option<(f64, f64)>,
}

impl HoltLinear {
    /// Create a model that grid-searches its smoothing parameters.
    pub fn new() -> Self {
        Self {
            name: "Holt linear".to_string(),
            params: None,
        }
    }

    /// Create a model with fixed smoothing parameters.
    pub fn with_params(alpha: f64, beta: f64) -> Result<Self> {
        for (label, value) in [("Alpha", alpha), ("Beta", beta)] {
            if value <= 0.0 || value >= 1.0 {
                return Err(PipelineError::Validation(format!(
                    "{} must be between 0 and 1",
                    label
                )));
            }
        }

        Ok(Self {
            name: format!("Holt linear (alpha={}, beta={})", alpha, beta),
            params: Some((alpha, beta)),
        })
    }
}

impl Default for HoltLinear {
    fn default() -> Self {
        Self::new()
    }
}

/// Trained Holt linear model
#[derive(Debug, Clone)]
pub struct TrainedHoltLinear {
    name: String,
    /// Final smoothed level
    level: f64,
    /// Final smoothed trend
    trend: f64,
    /// Level path over the training span
    levels: Vec<f64>,
    /// One-step-ahead fitted values
    fitted: Vec<f64>,
    residual_std: f64,
    mae: f64,
}

/// One smoothing pass; returns the level path, trend path and one-step fits.
fn smooth(values: &[f64], alpha: f64, beta: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = values.len();
    let mut levels = vec![0.0; n];
    let mut trends = vec![0.0; n];
    let mut fitted = vec![0.0; n];

    levels[0] = values[0];
    trends[0] = if n > 1 { values[1] - values[0] } else { 0.0 };
    fitted[0] = values[0];

    for t in 1..n {
        let prev_level = levels[t - 1];
        let prev_trend = trends[t - 1];
        fitted[t] = prev_level + prev_trend;
        levels[t] = alpha * values[t] + (1.0 - alpha) * (prev_level + prev_trend);
        trends[t] = beta * (levels[t] - prev_level) + (1.0 - beta) * prev_trend;
    }

    (levels, trends, fitted)
}

/// Grid search over alpha/beta minimizing one-step MAE.
fn best_params(values: &[f64]) -> (f64, f64) {
    let mut best = (PARAM_GRID[2], PARAM_GRID[0]);
    let mut best_mae = f64::MAX;

    for &alpha in &PARAM_GRID {
        for &beta in &PARAM_GRID {
            let (_, _, fitted) = smooth(values, alpha, beta);
            let mae = mean_absolute_error(&values[1..], &fitted[1..]);
            if mae < best_mae {
                best_mae = mae;
                best = (alpha, beta);
            }
        }
    }

    best
}

impl ForecastModel for HoltLinear {
    type Trained = TrainedHoltLinear;

    fn train(&self, series: &RevenueSeries) -> Result<Self::Trained> {
        check_min_observations(series)?;
        let values = series.values();

        let (alpha, beta) = match self.params {
            Some(params) => params,
            None => best_params(&values),
        };

        let (levels, trends, fitted) = smooth(&values, alpha, beta);
        let residuals: Vec<f64> = values[1..]
            .iter()
            .zip(&fitted[1..])
            .map(|(actual, fit)| actual - fit)
            .collect();

        Ok(TrainedHoltLinear {
            name: format!("Holt linear (alpha={:.1}, beta={:.1})", alpha, beta),
            level: *levels.last().unwrap(),
            trend: *trends.last().unwrap(),
            levels,
            mae: mean_absolute_error(&values[1..], &fitted[1..]),
            residual_std: std_dev(&residuals),
            fitted,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedHoltLinear {
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult> {
        let z = interval_z(confidence_level)?;

        let mut values = Vec::with_capacity(horizon);
        let mut intervals = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            // Revenue cannot go negative; uncertainty widens with the horizon.
            let point = (self.level + h as f64 * self.trend).max(0.0);
            let margin = z * self.residual_std * (h as f64).sqrt();
            values.push(point);
            intervals.push(((point - margin).max(0.0), point + margin));
        }

        ForecastResult::new(values, intervals)
    }

    fn fitted(&self, confidence_level: f64) -> Result<ForecastResult> {
        let z = interval_z(confidence_level)?;
        let margin = z * self.residual_std;

        let intervals = self
            .fitted
            .iter()
            .map(|fit| (fit - margin, fit + margin))
            .collect();

        ForecastResult::new(self.fitted.clone(), intervals)
    }

    fn mae(&self) -> f64 {
        self.mae
    }

    fn trend_component(&self) -> Vec<f64> {
        self.levels.clone()
    }

    fn seasonal_component(&self) -> Vec<f64> {
        vec![0.0; self.levels.len()]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn linear_series(n: usize) -> RevenueSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let observations = (0..n)
            .map(|i| {
                (
                    start + chrono::Duration::days(i as i64),
                    100.0 + 10.0 * i as f64,
                )
            })
            .collect();
        RevenueSeries::new(None, observations).unwrap()
    }

    #[test]
    fn tracks_a_linear_trend() {
        let series = linear_series(20);
        let trained = HoltLinear::new().train(&series).unwrap();
        let forecast = trained.forecast(3, 0.95).unwrap();

        // Last observation is 290; a linear trend of +10 should continue.
        assert!(forecast.values()[0] > 290.0);
        assert!(forecast.values()[2] > forecast.values()[0]);
    }

    #[test]
    fn rejects_short_series() {
        let series = linear_series(3);
        assert!(HoltLinear::new().train(&series).is_err());
    }

    #[test]
    fn with_params_validates_range() {
        assert!(HoltLinear::with_params(0.0, 0.5).is_err());
        assert!(HoltLinear::with_params(0.5, 1.0).is_err());
        assert!(HoltLinear::with_params(0.5, 0.5).is_ok());
    }

    #[test]
    fn constant_series_has_degenerate_intervals() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let observations = (0..10)
            .map(|i| (start + chrono::Duration::days(i as i64), 500.0))
            .collect();
        let series = RevenueSeries::new(None, observations).unwrap();

        let trained = HoltLinear::new().train(&series).unwrap();
        let forecast = trained.forecast(2, 0.95).unwrap();
        for (value, (lower, upper)) in forecast.values().iter().zip(forecast.intervals()) {
            assert!(lower <= value && value <= upper);
        }
    }
}
