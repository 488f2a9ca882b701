//! Commentary prompt composition from merged actual/forecast rows
//!
//! Everything here is pure string construction: the same merged table and
//! category label always produce byte-identical prompt text, so the prompt
//! can be tested without any network access.

use crate::error::Result;
use crate::pipeline::ForecastRow;
use serde::Serialize;

/// System-role instruction sent with every commentary request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a senior FP&A expert specializing in SaaS forecasting.";

/// One serialized row of the commentary payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentaryRow {
    /// ISO-8601 calendar date
    pub date: String,
    /// Observed revenue; absent for future periods
    pub actual: Option<f64>,
    /// Point forecast
    pub forecast: f64,
    /// Lower prediction bound
    pub lower: f64,
    /// Upper prediction bound
    pub upper: f64,
}

impl From<&ForecastRow> for CommentaryRow {
    fn from(row: &ForecastRow) -> Self {
        Self {
            date: row.date.format("%Y-%m-%d").to_string(),
            actual: row.actual,
            forecast: row.forecast,
            lower: row.lower,
            upper: row.upper,
        }
    }
}

/// Take the most recent `window` merged rows, oldest first.
pub fn recent_window(rows: &[ForecastRow], window: usize) -> Vec<CommentaryRow> {
    let start = rows.len().saturating_sub(window);
    rows[start..].iter().map(CommentaryRow::from).collect()
}

/// Build the full commentary prompt for one category.
///
/// The template asks for trend/seasonality observations, revenue risks, a
/// conclusion-first executive summary and recommendations, with the recent
/// merged window embedded as pretty-printed JSON.
pub fn compose_prompt(category: &str, rows: &[CommentaryRow]) -> Result<String> {
    let payload = serde_json::to_string_pretty(rows)?;

    Ok(format!(
        "You are the Head of FP&A at a SaaS company. Based on the revenue forecast \
and recent trends for the category '{category}', provide:\n\
- Key trends, seasonality, and growth/decline patterns.\n\
- Risks or concerns around revenue.\n\
- A concise CFO-level summary using the Pyramid Principle: lead with the \
conclusion, then the supporting points.\n\
- Strategic recommendations to improve financial performance.\n\
\n\
Dataset (last {count} records, actuals merged with forecast) in JSON:\n\
{payload}",
        category = category,
        count = rows.len(),
        payload = payload,
    ))
}
