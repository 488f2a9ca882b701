use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use revenue_forecast::commentary::{compose_prompt, recent_window, SYSTEM_INSTRUCTION};
use revenue_forecast::pipeline::ForecastRow;

fn merged_rows(n: usize) -> Vec<ForecastRow> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let forecast = 100.0 + i as f64;
            ForecastRow {
                date: start + chrono::Months::new(i as u32),
                // The last two rows are future periods.
                actual: if i < n.saturating_sub(2) {
                    Some(forecast + 0.5)
                } else {
                    None
                },
                forecast,
                lower: forecast - 10.0,
                upper: forecast + 10.0,
            }
        })
        .collect()
}

#[test]
fn test_recent_window_keeps_the_tail_in_order() {
    let rows = merged_rows(10);
    let window = recent_window(&rows, 4);

    assert_eq!(window.len(), 4);
    assert_eq!(window[0].date, "2023-07-01");
    assert_eq!(window[3].date, "2023-10-01");
}

#[test]
fn test_recent_window_with_short_input() {
    let rows = merged_rows(3);
    assert_eq!(recent_window(&rows, 24).len(), 3);
}

#[test]
fn test_prompt_is_deterministic() {
    let rows = merged_rows(8);
    let window = recent_window(&rows, 6);

    let first = compose_prompt("Subscriptions", &window).unwrap();
    let second = compose_prompt("Subscriptions", &window).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_prompt_carries_category_window_and_sections() {
    let rows = merged_rows(8);
    let window = recent_window(&rows, 6);
    let prompt = compose_prompt("Services", &window).unwrap();

    assert!(prompt.contains("the category 'Services'"));
    assert!(prompt.contains("last 6 records"));
    assert!(prompt.contains("Key trends, seasonality"));
    assert!(prompt.contains("Risks or concerns"));
    assert!(prompt.contains("Pyramid Principle"));
    assert!(prompt.contains("Strategic recommendations"));
}

#[test]
fn test_prompt_serializes_iso_dates_and_null_actuals() {
    let rows = merged_rows(4);
    let window = recent_window(&rows, 4);
    let prompt = compose_prompt("All Data", &window).unwrap();

    assert!(prompt.contains("\"date\": \"2023-01-01\""));
    // Future periods have no actual.
    assert!(prompt.contains("\"actual\": null"));
}

#[test]
fn test_system_instruction_is_fixed() {
    assert!(SYSTEM_INSTRUCTION.contains("FP&A"));
}
