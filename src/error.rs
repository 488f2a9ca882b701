//! Error types for the revenue_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the revenue_forecast crate
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing credential or invalid client setup; fatal before any run
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Uploaded table lacks a required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error from invalid parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// The forecasting engine could not fit or predict the series
    #[error("Forecast failure: {0}")]
    Forecast(String),

    /// The narrative API call failed (auth, network, rate limit, timeout)
    #[error("Narrative failure: {0}")]
    Narrative(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing the commentary payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        PipelineError::Polars(err.to_string())
    }
}
