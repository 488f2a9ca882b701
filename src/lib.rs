//! # Revenue Forecast
//!
//! A Rust library for SaaS revenue forecasting with AI-generated FP&A
//! commentary.
//!
//! ## Features
//!
//! - CSV revenue loading with `Date`/`Revenue` validation and optional
//!   per-`Category` series
//! - Forecasting models (Holt linear trend, Holt-Winters additive seasonal)
//!   with prediction intervals and trend/seasonal decomposition
//! - Deterministic commentary prompt composition over the merged
//!   actual/forecast window
//! - Narrative commentary via the Groq chat-completions API
//! - Per-category failure isolation: one bad series never blocks the rest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use revenue_forecast::config::{Periodicity, PipelineConfig};
//! use revenue_forecast::data::RevenueTable;
//! use revenue_forecast::narrative::{NarrativeClient, NarrativeConfig};
//! use revenue_forecast::pipeline::run_pipeline;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let table = RevenueTable::from_csv("revenue.csv")?;
//! let config = PipelineConfig::new(Periodicity::Monthly, 12)?;
//! let client = NarrativeClient::new(NarrativeConfig::from_env()?);
//!
//! for outcome in run_pipeline(&table, &config, &client).await? {
//!     println!("== {} ==", outcome.display_label());
//!     match &outcome.commentary {
//!         Some(commentary) => println!("{}", commentary),
//!         None => {
//!             if let Some(message) = outcome.failure_message() {
//!                 eprintln!("{}", message);
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod commentary;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod narrative;
pub mod pipeline;

// Re-export commonly used types
pub use crate::config::{Periodicity, PipelineConfig};
pub use crate::data::{RevenueRecord, RevenueSeries, RevenueTable};
pub use crate::error::{PipelineError, Result};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::pipeline::{
    run_forecasts, run_pipeline, CategoryForecast, CategoryOutcome, ForecastRow,
};
pub use crate::narrative::{CommentaryGenerator, NarrativeClient, NarrativeConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
