//! CLI entry point: forecast a revenue CSV and print per-category reports.

use dotenv::dotenv;
use revenue_forecast::config::{Periodicity, PipelineConfig};
use revenue_forecast::data::RevenueTable;
use revenue_forecast::narrative::{NarrativeClient, NarrativeConfig};
use revenue_forecast::pipeline::{run_forecasts, run_pipeline, CategoryOutcome};
use std::env;
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "\
Usage: revenue_report <CSV_PATH> [options]

Options:
  --periodicity daily|monthly   Spacing of the observations (default: monthly)
  --horizon N                   Future periods to forecast, 1-36
                                (default: 30 daily, 12 monthly)
  --window N                    Merged rows sent to the commentary model
                                (default: 60 daily, 24 monthly)
  --confidence F                Prediction-interval confidence level (default: 0.95)
  --model ID                    Chat model identifier (default: llama3-8b-8192)
  --no-commentary               Skip the narrative stage entirely

The CSV must carry 'Date' and 'Revenue' columns; an optional 'Category'
column forecasts each category independently. Narrative commentary requires
GROQ_API_KEY in the environment or a .env file.";

struct Options {
    path: String,
    periodicity: Periodicity,
    horizon: Option<usize>,
    window: Option<usize>,
    confidence: Option<f64>,
    model: Option<String>,
    commentary: bool,
}

fn parse_args(args: Vec<String>) -> Result<Options, String> {
    let mut path = None;
    let mut periodicity = Periodicity::Monthly;
    let mut horizon = None;
    let mut window = None;
    let mut confidence = None;
    let mut model = None;
    let mut commentary = true;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--periodicity" => {
                let value = iter.next().ok_or("--periodicity needs a value")?;
                periodicity = value.parse().map_err(|e| format!("{}", e))?;
            }
            "--horizon" => {
                let value = iter.next().ok_or("--horizon needs a value")?;
                horizon = Some(value.parse().map_err(|_| "--horizon must be an integer")?);
            }
            "--window" => {
                let value = iter.next().ok_or("--window needs a value")?;
                window = Some(value.parse().map_err(|_| "--window must be an integer")?);
            }
            "--confidence" => {
                let value = iter.next().ok_or("--confidence needs a value")?;
                confidence = Some(value.parse().map_err(|_| "--confidence must be a number")?);
            }
            "--model" => {
                model = Some(iter.next().ok_or("--model needs a value")?);
            }
            "--no-commentary" => commentary = false,
            "--help" | "-h" => return Err(String::new()),
            other if other.starts_with("--") => {
                return Err(format!("Unknown option: {}", other));
            }
            other => {
                if path.replace(other.to_string()).is_some() {
                    return Err("Only one CSV path is accepted".to_string());
                }
            }
        }
    }

    Ok(Options {
        path: path.ok_or("A CSV path is required")?,
        periodicity,
        horizon,
        window,
        confidence,
        model,
        commentary,
    })
}

fn build_config(options: &Options) -> revenue_forecast::Result<PipelineConfig> {
    let mut config = match options.horizon {
        Some(horizon) => PipelineConfig::new(options.periodicity, horizon)?,
        None => PipelineConfig::with_defaults(options.periodicity),
    };
    if let Some(window) = options.window {
        config = config.with_commentary_window(window)?;
    }
    if let Some(level) = options.confidence {
        config = config.with_confidence_level(level)?;
    }
    Ok(config)
}

fn print_outcome(outcome: &CategoryOutcome) {
    println!("\n== {} ==", outcome.display_label());

    if let Some(forecast) = &outcome.forecast {
        println!("Model: {} (in-sample MAE {:.2})", forecast.model, forecast.mae);

        let history = forecast.rows.iter().filter(|r| r.actual.is_some()).count();
        let start = history.saturating_sub(6);
        println!(
            "{:<12} {:>12} {:>12} {:>12} {:>12}",
            "Date", "Actual", "Forecast", "Lower", "Upper"
        );
        for row in &forecast.rows[start..] {
            let actual = row
                .actual
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:>12} {:>12.2} {:>12.2} {:>12.2}",
                row.date, actual, row.forecast, row.lower, row.upper
            );
        }

        if let (Some(first), Some(last)) = (forecast.trend.first(), forecast.trend.last()) {
            println!(
                "Trend: {:.2} -> {:.2} over {} periods",
                first,
                last,
                forecast.trend.len()
            );
        }
        let peak = forecast.seasonal.iter().cloned().fold(f64::MIN, f64::max);
        let trough = forecast.seasonal.iter().cloned().fold(f64::MAX, f64::min);
        if peak > trough {
            println!("Seasonal swing: {:+.2} to {:+.2}", trough, peak);
        }
    }

    match (&outcome.commentary, outcome.failure_message()) {
        (Some(text), _) => println!("\n--- Commentary ---\n{}", text),
        (None, Some(message)) => println!("\n{}", message),
        _ => {}
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let options = match parse_args(env::args().skip(1).collect()) {
        Ok(options) => options,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{}\n", message);
            }
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    let config = match build_config(&options) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(2);
        }
    };

    // The credential check happens before any input is read: a missing key
    // is a startup failure, not a per-run one.
    let client = if options.commentary {
        match NarrativeConfig::from_env() {
            Ok(mut narrative_config) => {
                if let Some(model) = &options.model {
                    narrative_config = narrative_config.with_model(model.clone());
                }
                Some(NarrativeClient::new(narrative_config))
            }
            Err(error) => {
                eprintln!("{}", error);
                process::exit(1);
            }
        }
    } else {
        None
    };

    let table = match RevenueTable::from_csv(&options.path) {
        Ok(table) => table,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    };

    let outcomes = match &client {
        Some(client) => run_pipeline(&table, &config, client).await,
        None => run_forecasts(&table, &config),
    };

    match outcomes {
        Ok(outcomes) => {
            for outcome in &outcomes {
                print_outcome(outcome);
            }
        }
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}
