//! Forecast a synthetic monthly revenue series without any network calls.
//!
//! Run with: cargo run --example basic_forecast

use chrono::NaiveDate;
use revenue_forecast::config::{Periodicity, PipelineConfig};
use revenue_forecast::data::{RevenueRecord, RevenueTable};
use revenue_forecast::pipeline::run_forecasts;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let seasonal_bump = [0.0, -50.0, 30.0, 80.0, 20.0, -20.0, -60.0, 10.0, 90.0, 40.0, -30.0, 150.0];

    // Three years of growing, seasonal monthly revenue.
    let records: Vec<RevenueRecord> = (0..36)
        .map(|i| RevenueRecord {
            date: start + chrono::Months::new(i as u32),
            revenue: 10_000.0 + 120.0 * i as f64 + seasonal_bump[i as usize % 12],
            category: None,
        })
        .collect();

    let table = RevenueTable::from_records(records)?;
    let config = PipelineConfig::with_defaults(Periodicity::Monthly);

    for outcome in run_forecasts(&table, &config)? {
        println!("== {} ==", outcome.display_label());
        match &outcome.forecast {
            Some(forecast) => {
                println!("Model: {} (MAE {:.2})", forecast.model, forecast.mae);
                for row in forecast.rows.iter().filter(|r| r.actual.is_none()) {
                    println!(
                        "{}  forecast {:>10.2}  [{:>10.2}, {:>10.2}]",
                        row.date, row.forecast, row.lower, row.upper
                    );
                }
            }
            None => {
                if let Some(message) = outcome.failure_message() {
                    eprintln!("{}", message);
                }
            }
        }
    }

    Ok(())
}
