//! Full forecast-and-commentary run over a CSV file.
//!
//! Requires GROQ_API_KEY in the environment or a .env file.
//! Run with: cargo run --example full_report -- revenue.csv

use dotenv::dotenv;
use revenue_forecast::config::{Periodicity, PipelineConfig};
use revenue_forecast::data::RevenueTable;
use revenue_forecast::narrative::{NarrativeClient, NarrativeConfig};
use revenue_forecast::pipeline::run_pipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: full_report <CSV_PATH>")?;

    let client = NarrativeClient::new(NarrativeConfig::from_env()?);
    let table = RevenueTable::from_csv(&path)?;
    let config = PipelineConfig::with_defaults(Periodicity::Monthly);

    for outcome in run_pipeline(&table, &config, &client).await? {
        println!("\n== {} ==", outcome.display_label());
        if let Some(forecast) = &outcome.forecast {
            println!("Model: {}", forecast.model);
        }
        match &outcome.commentary {
            Some(commentary) => println!("{}", commentary),
            None => {
                if let Some(message) = outcome.failure_message() {
                    eprintln!("{}", message);
                }
            }
        }
    }

    Ok(())
}
