//! Holt-Winters additive seasonal smoothing

use crate::data::RevenueSeries;
use crate::error::{PipelineError, Result};
use crate::models::{
    check_min_observations, interval_z, mean_absolute_error, std_dev, ForecastModel,
    ForecastResult, TrainedForecastModel,
};

/// Coarser grid than the linear model; three parameters are searched.
const PARAM_GRID: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

/// Triple exponential smoothing with level, trend and additive seasonality
#[derive(Debug, Clone)]
pub struct HoltWinters {
    /// Name of the model
    name: String,
    /// Season length in periods
    period: usize,
}

impl HoltWinters {
    /// Create a seasonal model with the given season length.
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(PipelineError::Validation(
                "Season length must be at least 2 periods".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Holt-Winters additive (period={})", period),
            period,
        })
    }

    /// The season length in periods.
    pub fn period(&self) -> usize {
        self.period
    }
}

/// Trained Holt-Winters model
#[derive(Debug, Clone)]
pub struct TrainedHoltWinters {
    name: String,
    period: usize,
    /// Number of training observations, fixes the forecast's seasonal phase
    n_obs: usize,
    /// Final smoothed level
    level: f64,
    /// Final smoothed trend
    trend: f64,
    /// Final seasonal state, one entry per position in the season
    seasonal: Vec<f64>,
    /// Level path over the training span
    levels: Vec<f64>,
    /// Seasonal component applied at each training step
    seasonal_path: Vec<f64>,
    /// One-step-ahead fitted values
    fitted: Vec<f64>,
    residual_std: f64,
    mae: f64,
}

struct SeasonalFit {
    levels: Vec<f64>,
    seasonal_path: Vec<f64>,
    fitted: Vec<f64>,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// One smoothing pass over the series.
///
/// The level starts at the first season's mean, the trend at the average
/// season-over-season change, and the seasonal state at the first season's
/// deviations from its mean.
fn smooth_seasonal(values: &[f64], period: usize, alpha: f64, beta: f64, gamma: f64) -> SeasonalFit {
    let n = values.len();
    let first_season = mean(&values[..period]);
    let second_season = mean(&values[period..2 * period]);

    let mut level = first_season;
    let mut trend = (second_season - first_season) / period as f64;
    let mut seasonal: Vec<f64> = values[..period].iter().map(|v| v - first_season).collect();

    let mut levels = vec![0.0; n];
    let mut seasonal_path = vec![0.0; n];
    let mut fitted = vec![0.0; n];

    for t in 0..n {
        let idx = t % period;
        let season = seasonal[idx];
        fitted[t] = level + trend + season;
        seasonal_path[t] = season;

        let prev_level = level;
        level = alpha * (values[t] - season) + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        seasonal[idx] = gamma * (values[t] - level) + (1.0 - gamma) * season;
        levels[t] = level;
    }

    SeasonalFit {
        levels,
        seasonal_path,
        fitted,
        level,
        trend,
        seasonal,
    }
}

impl ForecastModel for HoltWinters {
    type Trained = TrainedHoltWinters;

    fn train(&self, series: &RevenueSeries) -> Result<Self::Trained> {
        check_min_observations(series)?;
        if series.len() < 2 * self.period {
            return Err(PipelineError::Forecast(format!(
                "Need at least two full seasons ({} observations) for a seasonal fit, got {}",
                2 * self.period,
                series.len()
            )));
        }

        let values = series.values();
        let mut best: Option<(f64, SeasonalFit, (f64, f64, f64))> = None;

        for &alpha in &PARAM_GRID {
            for &beta in &PARAM_GRID {
                for &gamma in &PARAM_GRID {
                    let fit = smooth_seasonal(&values, self.period, alpha, beta, gamma);
                    // Skip the first season: its fits come straight from the
                    // initial state.
                    let mae =
                        mean_absolute_error(&values[self.period..], &fit.fitted[self.period..]);
                    if best.as_ref().map_or(true, |(m, _, _)| mae < *m) {
                        best = Some((mae, fit, (alpha, beta, gamma)));
                    }
                }
            }
        }

        let (mae, fit, (alpha, beta, gamma)) = best.unwrap();
        let residuals: Vec<f64> = values[self.period..]
            .iter()
            .zip(&fit.fitted[self.period..])
            .map(|(actual, fitted)| actual - fitted)
            .collect();

        Ok(TrainedHoltWinters {
            name: format!(
                "Holt-Winters additive (period={}, alpha={:.1}, beta={:.1}, gamma={:.1})",
                self.period, alpha, beta, gamma
            ),
            period: self.period,
            n_obs: values.len(),
            level: fit.level,
            trend: fit.trend,
            seasonal: fit.seasonal,
            levels: fit.levels,
            seasonal_path: fit.seasonal_path,
            fitted: fit.fitted,
            residual_std: std_dev(&residuals),
            mae,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedHoltWinters {
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult> {
        let z = interval_z(confidence_level)?;

        let mut values = Vec::with_capacity(horizon);
        let mut intervals = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let idx = (self.n_obs + h - 1) % self.period;
            let point = (self.level + h as f64 * self.trend + self.seasonal[idx]).max(0.0);
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
        self.seasonal_path.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Quarterly-shaped series: rising base with a repeating 4-period bump.
    fn seasonal_series(seasons: usize) -> RevenueSeries {
        let pattern = [20.0, -10.0, 5.0, -15.0];
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let observations = (0..seasons * pattern.len())
            .map(|i| {
                let base = 200.0 + 2.0 * i as f64;
                (
                    start + chrono::Months::new(i as u32),
                    base + pattern[i % pattern.len()],
                )
            })
            .collect();
        RevenueSeries::new(None, observations).unwrap()
    }

    #[test]
    fn rejects_less_than_two_seasons() {
        let series = seasonal_series(1);
        let model = HoltWinters::new(4).unwrap();
        assert!(model.train(&series).is_err());
    }

    #[test]
    fn forecast_continues_seasonal_shape() {
        let series = seasonal_series(4);
        let model = HoltWinters::new(4).unwrap();
        let trained = model.train(&series).unwrap();

        let forecast = trained.forecast(4, 0.95).unwrap();
        let values = forecast.values();

        // The pattern peaks at season position 0 and dips at position 3; one
        // forecast season should preserve that ordering.
        assert!(values[0] > values[1]);
        assert!(values[2] > values[3]);
    }

    #[test]
    fn seasonal_component_repeats_with_period() {
        let series = seasonal_series(3);
        let model = HoltWinters::new(4).unwrap();
        let trained = model.train(&series).unwrap();

        let component = trained.seasonal_component();
        assert_eq!(component.len(), series.len());
        // First season's component is exactly the initial deviations.
        assert!(component[0] > component[1]);
    }

    #[test]
    fn period_must_be_at_least_two() {
        assert!(HoltWinters::new(1).is_err());
        assert!(HoltWinters::new(12).is_ok());
    }
}
