//! Per-category forecast and commentary orchestration
//!
//! Each category runs the same linear sequence: reshape, fit, merge, compose,
//! narrate. A failure aborts the remaining stages for that category only;
//! sibling categories always run to completion.

use crate::commentary;
use crate::config::PipelineConfig;
use crate::data::{RevenueSeries, RevenueTable};
use crate::error::{PipelineError, Result};
use crate::models::{ForecastModel, HoltLinear, HoltWinters, TrainedForecastModel};
use crate::narrative::CommentaryGenerator;
use chrono::NaiveDate;
use std::fmt;
use tracing::{info, warn};

/// One merged row covering a historical or future period
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    /// Period date
    pub date: NaiveDate,
    /// Observed revenue; None for future periods
    pub actual: Option<f64>,
    /// Point forecast
    pub forecast: f64,
    /// Lower prediction bound
    pub lower: f64,
    /// Upper prediction bound
    pub upper: f64,
}

/// Forecast output for one category
#[derive(Debug, Clone)]
pub struct CategoryForecast {
    /// Name of the fitted model, including selected parameters
    pub model: String,
    /// Merged history + future rows, in date order
    pub rows: Vec<ForecastRow>,
    /// Smoothed trend component over the historical span
    pub trend: Vec<f64>,
    /// Seasonal component over the historical span
    pub seasonal: Vec<f64>,
    /// In-sample mean absolute error
    pub mae: f64,
}

/// Stage at which a category's run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Model fitting or merged-table construction
    Forecast,
    /// Prompt composition or the chat-completion call
    Narrative,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Forecast => write!(f, "forecast"),
            Stage::Narrative => write!(f, "narrative"),
        }
    }
}

/// A stage-scoped failure for one category
#[derive(Debug)]
pub struct CategoryFailure {
    /// Stage that failed
    pub stage: Stage,
    /// The underlying error
    pub error: PipelineError,
}

/// Everything one category's run produced
#[derive(Debug)]
pub struct CategoryOutcome {
    /// Category label; None for the implicit single series
    pub label: Option<String>,
    /// Forecast results, present whenever the forecast stage succeeded
    pub forecast: Option<CategoryForecast>,
    /// Narrative commentary, present when the whole run succeeded
    pub commentary: Option<String>,
    /// The failure that stopped this category, if any
    pub failure: Option<CategoryFailure>,
}

impl CategoryOutcome {
    /// Label used in reports for this category.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("All Data")
    }

    /// True when every stage completed.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// User-facing message naming the category and failed stage.
    pub fn failure_message(&self) -> Option<String> {
        self.failure.as_ref().map(|failure| {
            format!(
                "{} stage failed for '{}': {}",
                failure.stage,
                self.display_label(),
                failure.error
            )
        })
    }
}

/// Fit a model to one series and build its merged forecast table.
///
/// The seasonal model is used whenever two full seasons of history exist;
/// shorter series fall back to the linear model.
pub fn forecast_series(series: &RevenueSeries, config: &PipelineConfig) -> Result<CategoryForecast> {
    let season = config.periodicity.season_length();

    if series.len() >= 2 * season {
        let trained = HoltWinters::new(season)?.train(series)?;
        build_forecast(series, config, &trained)
    } else {
        let trained = HoltLinear::new().train(series)?;
        build_forecast(series, config, &trained)
    }
}

fn build_forecast<M: TrainedForecastModel>(
    series: &RevenueSeries,
    config: &PipelineConfig,
    trained: &M,
) -> Result<CategoryForecast> {
    let fitted = trained.fitted(config.confidence_level)?;
    let future = trained.forecast(config.horizon, config.confidence_level)?;

    let observations = series.observations();
    let mut rows = Vec::with_capacity(observations.len() + config.horizon);

    for (idx, &(date, actual)) in observations.iter().enumerate() {
        let (lower, upper) = fitted.intervals()[idx];
        rows.push(ForecastRow {
            date,
            actual: Some(actual),
            forecast: fitted.values()[idx],
            lower,
            upper,
        });
    }

    let last_date = series
        .last_date()
        .ok_or_else(|| PipelineError::Data("Series has no observations".to_string()))?;
    for (idx, &point) in future.values().iter().enumerate() {
        let (lower, upper) = future.intervals()[idx];
        rows.push(ForecastRow {
            date: config.periodicity.advance(last_date, (idx + 1) as u32),
            actual: None,
            forecast: point,
            lower,
            upper,
        });
    }

    Ok(CategoryForecast {
        model: trained.name().to_string(),
        rows,
        trend: trained.trend_component(),
        seasonal: trained.seasonal_component(),
        mae: trained.mae(),
    })
}

/// Run forecasts for every category without requesting commentary.
pub fn run_forecasts(table: &RevenueTable, config: &PipelineConfig) -> Result<Vec<CategoryOutcome>> {
    let series_list = table.split_by_category()?;

    Ok(series_list
        .iter()
        .map(|series| {
            let label = series.label().map(str::to_string);
            match forecast_series(series, config) {
                Ok(forecast) => CategoryOutcome {
                    label,
                    forecast: Some(forecast),
                    commentary: None,
                    failure: None,
                },
                Err(error) => {
                    warn!(category = series.display_label(), %error, "forecast stage failed");
                    CategoryOutcome {
                        label,
                        forecast: None,
                        commentary: None,
                        failure: Some(CategoryFailure {
                            stage: Stage::Forecast,
                            error,
                        }),
                    }
                }
            }
        })
        .collect())
}

/// Run the full forecast-and-commentary pipeline over every category.
///
/// Categories are processed sequentially in first-seen order. Errors before
/// the per-category loop (missing columns, malformed rows) fail the whole
/// run; inside the loop every failure stays scoped to its category.
pub async fn run_pipeline(
    table: &RevenueTable,
    config: &PipelineConfig,
    generator: &dyn CommentaryGenerator,
) -> Result<Vec<CategoryOutcome>> {
    let series_list = table.split_by_category()?;

    let mut outcomes = Vec::with_capacity(series_list.len());
    for series in &series_list {
        outcomes.push(run_category(series, config, generator).await);
    }
    Ok(outcomes)
}

async fn run_category(
    series: &RevenueSeries,
    config: &PipelineConfig,
    generator: &dyn CommentaryGenerator,
) -> CategoryOutcome {
    let label = series.label().map(str::to_string);
    info!(
        category = series.display_label(),
        observations = series.len(),
        horizon = config.horizon,
        "forecasting category"
    );

    let forecast = match forecast_series(series, config) {
        Ok(forecast) => forecast,
        Err(error) => {
            warn!(category = series.display_label(), %error, "forecast stage failed");
            return CategoryOutcome {
                label,
                forecast: None,
                commentary: None,
                failure: Some(CategoryFailure {
                    stage: Stage::Forecast,
                    error,
                }),
            };
        }
    };

    let window = commentary::recent_window(&forecast.rows, config.commentary_window);
    let narrated = match commentary::compose_prompt(series.display_label(), &window) {
        Ok(prompt) => generator.generate(commentary::SYSTEM_INSTRUCTION, &prompt).await,
        Err(error) => Err(error),
    };

    match narrated {
        Ok(text) => CategoryOutcome {
            label,
            forecast: Some(forecast),
            commentary: Some(text),
            failure: None,
        },
        Err(error) => {
            warn!(category = series.display_label(), %error, "narrative stage failed");
            CategoryOutcome {
                label,
                forecast: Some(forecast),
                commentary: None,
                failure: Some(CategoryFailure {
                    stage: Stage::Narrative,
                    error,
                }),
            }
        }
    }
}
