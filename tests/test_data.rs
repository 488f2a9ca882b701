use revenue_forecast::data::{RevenueRecord, RevenueSeries, RevenueTable};
use revenue_forecast::error::PipelineError;
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_loader_from_csv() {
    let file = write_csv(&[
        "Date,Revenue",
        "2023-01-01,100.0",
        "2023-02-01,120.5",
        "2023-03-01,140.0",
    ]);

    let table = RevenueTable::from_csv(file.path()).unwrap();
    assert_eq!(table.len(), 3);
    assert!(!table.has_category());
    assert_eq!(table.records()[0].date, date(2023, 1, 1));
    assert_eq!(table.records()[1].revenue, 120.5);
}

#[test]
fn test_loader_accepts_slash_dates() {
    let file = write_csv(&["Date,Revenue", "2023/01/05,100.0", "2023/02/05,110.0"]);

    let table = RevenueTable::from_csv(file.path()).unwrap();
    assert_eq!(table.records()[0].date, date(2023, 1, 5));
}

#[test]
fn test_missing_required_column() {
    let file = write_csv(&["Date,Amount", "2023-01-01,100.0"]);

    let result = RevenueTable::from_csv(file.path());
    match result {
        Err(PipelineError::MissingColumn(column)) => assert_eq!(column, "Revenue"),
        other => panic!("Expected MissingColumn, got {:?}", other),
    }

    let file = write_csv(&["Day,Revenue", "2023-01-01,100.0"]);
    assert!(matches!(
        RevenueTable::from_csv(file.path()),
        Err(PipelineError::MissingColumn(_))
    ));
}

#[test]
fn test_malformed_date_is_rejected() {
    let file = write_csv(&["Date,Revenue", "2023-01-01,100.0", "not-a-date,120.0"]);

    let result = RevenueTable::from_csv(file.path());
    match result {
        Err(PipelineError::Data(message)) => {
            assert!(message.contains("Row 2"), "message was: {}", message)
        }
        other => panic!("Expected Data error, got {:?}", other),
    }
}

#[test]
fn test_non_numeric_revenue_is_rejected() {
    let file = write_csv(&["Date,Revenue", "2023-01-01,abc", "2023-02-01,100.0"]);

    assert!(matches!(
        RevenueTable::from_csv(file.path()),
        Err(PipelineError::Data(_))
    ));
}

#[test]
fn test_missing_revenue_cell_is_rejected() {
    let file = write_csv(&["Date,Revenue", "2023-01-01,100.0", "2023-02-01,"]);

    let result = RevenueTable::from_csv(file.path());
    match result {
        Err(PipelineError::Data(message)) => {
            assert!(message.contains("Row 2"), "message was: {}", message)
        }
        other => panic!("Expected Data error, got {:?}", other),
    }
}

#[test]
fn test_table_without_category_becomes_one_series() {
    let file = write_csv(&[
        "Date,Revenue",
        "2023-03-01,140.0",
        "2023-01-01,100.0",
        "2023-02-01,120.0",
    ]);

    let table = RevenueTable::from_csv(file.path()).unwrap();
    let series = table.split_by_category().unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].label(), None);
    assert_eq!(series[0].display_label(), "All Data");
    assert_eq!(series[0].len(), table.len());
    // Sorted by date regardless of file order.
    assert_eq!(series[0].dates(), vec![
        date(2023, 1, 1),
        date(2023, 2, 1),
        date(2023, 3, 1)
    ]);
}

#[test]
fn test_category_partition_preserves_rows_and_order() {
    let file = write_csv(&[
        "Date,Revenue,Category",
        "2023-01-01,10.0,Subscriptions",
        "2023-01-01,20.0,Services",
        "2023-02-01,11.0,Subscriptions",
        "2023-02-01,21.0,Services",
        "2023-03-01,12.0,Subscriptions",
    ]);

    let table = RevenueTable::from_csv(file.path()).unwrap();
    assert!(table.has_category());

    let series = table.split_by_category().unwrap();
    assert_eq!(series.len(), 2);

    // First-seen order.
    assert_eq!(series[0].label(), Some("Subscriptions"));
    assert_eq!(series[1].label(), Some("Services"));

    // Union of rows equals the table; each series is homogeneous.
    assert_eq!(series[0].len() + series[1].len(), table.len());
    assert_eq!(series[0].values(), vec![10.0, 11.0, 12.0]);
    assert_eq!(series[1].values(), vec![20.0, 21.0]);
}

#[test]
fn test_duplicate_dates_in_one_series_are_rejected() {
    let observations = vec![(date(2023, 1, 1), 10.0), (date(2023, 1, 1), 12.0)];
    let result = RevenueSeries::new(Some("Subscriptions".to_string()), observations);

    match result {
        Err(PipelineError::Data(message)) => {
            assert!(message.contains("Subscriptions"));
            assert!(message.contains("2023-01-01"));
        }
        other => panic!("Expected Data error, got {:?}", other),
    }
}

#[test]
fn test_same_date_in_different_categories_is_fine() {
    let records = vec![
        RevenueRecord {
            date: date(2023, 1, 1),
            revenue: 10.0,
            category: Some("A".to_string()),
        },
        RevenueRecord {
            date: date(2023, 1, 1),
            revenue: 20.0,
            category: Some("B".to_string()),
        },
    ];

    let table = RevenueTable::from_records(records).unwrap();
    assert_eq!(table.split_by_category().unwrap().len(), 2);
}

#[test]
fn test_from_records_rejects_mixed_category_presence() {
    let records = vec![
        RevenueRecord {
            date: date(2023, 1, 1),
            revenue: 10.0,
            category: Some("A".to_string()),
        },
        RevenueRecord {
            date: date(2023, 2, 1),
            revenue: 11.0,
            category: None,
        },
    ];

    assert!(matches!(
        RevenueTable::from_records(records),
        Err(PipelineError::Data(_))
    ));
}

#[test]
fn test_empty_table_cannot_be_split() {
    let table = RevenueTable::from_records(Vec::new()).unwrap();
    assert!(table.split_by_category().is_err());
}

#[test]
fn test_loader_missing_file() {
    assert!(matches!(
        RevenueTable::from_csv("nonexistent_file.csv"),
        Err(PipelineError::Io(_))
    ));
}
