//! Revenue table loading and per-category series reshaping

use crate::error::{PipelineError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Required column holding the observation date.
pub const DATE_COLUMN: &str = "Date";

/// Required column holding the revenue value.
pub const REVENUE_COLUMN: &str = "Revenue";

/// Optional column splitting the table into independent series.
pub const CATEGORY_COLUMN: &str = "Category";

/// Date string formats accepted for a text `Date` column.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// One validated input row
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRecord {
    /// Observation date, normalized to a calendar date
    pub date: NaiveDate,
    /// Revenue for the period
    pub revenue: f64,
    /// Optional category label
    pub category: Option<String>,
}

/// A validated table of revenue records
#[derive(Debug, Clone)]
pub struct RevenueTable {
    records: Vec<RevenueRecord>,
    has_category: bool,
}

impl RevenueTable {
    /// Load a revenue table from a CSV file.
    ///
    /// The file must carry `Date` and `Revenue` columns; `Category` is
    /// optional. A row whose date cannot be parsed or whose revenue is
    /// missing or non-numeric fails the whole load.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build a revenue table from an already loaded DataFrame.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let names = df.get_column_names();
        for required in [DATE_COLUMN, REVENUE_COLUMN] {
            if !names.iter().any(|n| *n == required) {
                return Err(PipelineError::MissingColumn(required.to_string()));
            }
        }
        let has_category = names.iter().any(|n| *n == CATEGORY_COLUMN);

        let dates = extract_dates(&df)?;
        let revenues = extract_revenues(&df)?;
        let categories = if has_category {
            extract_categories(&df)?
        } else {
            vec![None; dates.len()]
        };

        let records = dates
            .into_iter()
            .zip(revenues)
            .zip(categories)
            .map(|((date, revenue), category)| RevenueRecord {
                date,
                revenue,
                category,
            })
            .collect();

        Ok(Self {
            records,
            has_category,
        })
    }

    /// Build a revenue table directly from records.
    ///
    /// Either every record carries a category or none does.
    pub fn from_records(records: Vec<RevenueRecord>) -> Result<Self> {
        let with_category = records.iter().filter(|r| r.category.is_some()).count();
        if with_category != 0 && with_category != records.len() {
            return Err(PipelineError::Data(
                "Either all records or no records must carry a category".to_string(),
            ));
        }

        let has_category = with_category != 0;
        Ok(Self {
            records,
            has_category,
        })
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if the table carries a category column.
    pub fn has_category(&self) -> bool {
        self.has_category
    }

    /// The validated rows, in file order.
    pub fn records(&self) -> &[RevenueRecord] {
        &self.records
    }

    /// Partition the table into one series per category.
    ///
    /// Categories keep the order in which they first appear; without a
    /// category column the whole table becomes a single unlabeled series.
    pub fn split_by_category(&self) -> Result<Vec<RevenueSeries>> {
        if self.records.is_empty() {
            return Err(PipelineError::Data(
                "Revenue table has no rows".to_string(),
            ));
        }

        if !self.has_category {
            let observations = self.records.iter().map(|r| (r.date, r.revenue)).collect();
            return Ok(vec![RevenueSeries::new(None, observations)?]);
        }

        // First-seen category order; category counts are small enough that a
        // linear scan beats pulling in an ordered map.
        let mut groups: Vec<(String, Vec<(NaiveDate, f64)>)> = Vec::new();
        for record in &self.records {
            let label = record.category.as_deref().unwrap_or_default();
            match groups.iter_mut().find(|(key, _)| key == label) {
                Some((_, observations)) => observations.push((record.date, record.revenue)),
                None => groups.push((label.to_string(), vec![(record.date, record.revenue)])),
            }
        }

        groups
            .into_iter()
            .map(|(label, observations)| RevenueSeries::new(Some(label), observations))
            .collect()
    }
}

/// An ordered-by-date revenue series for one category
#[derive(Debug, Clone)]
pub struct RevenueSeries {
    label: Option<String>,
    observations: Vec<(NaiveDate, f64)>,
}

impl RevenueSeries {
    /// Create a series, sorting by date and rejecting duplicate dates.
    pub fn new(label: Option<String>, mut observations: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if observations.is_empty() {
            return Err(PipelineError::Data(format!(
                "Series '{}' has no observations",
                label.as_deref().unwrap_or("All Data")
            )));
        }

        observations.sort_by_key(|(date, _)| *date);
        for pair in observations.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(PipelineError::Data(format!(
                    "Series '{}' has duplicate date {}",
                    label.as_deref().unwrap_or("All Data"),
                    pair[0].0
                )));
            }
        }

        Ok(Self {
            label,
            observations,
        })
    }

    /// The category label, if the table carried one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label used in reports and prompts for the implicit single series.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("All Data")
    }

    /// The sorted (date, revenue) observations.
    pub fn observations(&self) -> &[(NaiveDate, f64)] {
        &self.observations
    }

    /// The revenue values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|(_, v)| *v).collect()
    }

    /// The observation dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|(d, _)| *d).collect()
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The last observation date, or None if empty.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|(d, _)| *d)
    }
}

fn parse_date_str(raw: &str, row: usize) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(PipelineError::Data(format!(
        "Row {}: '{}' is not a parseable date",
        row, trimmed
    )))
}

fn extract_dates(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    let col = df.column(DATE_COLUMN)?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

    match col.dtype() {
        DataType::Utf8 => col
            .utf8()
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(i, opt)| match opt {
                Some(raw) => parse_date_str(raw, i + 1),
                None => Err(PipelineError::Data(format!("Row {}: Date is missing", i + 1))),
            })
            .collect(),
        DataType::Date => col
            .date()
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(i, opt)| {
                opt.map(|days| epoch + Duration::days(days as i64))
                    .ok_or_else(|| {
                        PipelineError::Data(format!("Row {}: Date is missing", i + 1))
                    })
            })
            .collect(),
        DataType::Datetime(unit, _) => {
            let divisor = match unit {
                TimeUnit::Nanoseconds => 1_000_000_000,
                TimeUnit::Microseconds => 1_000_000,
                TimeUnit::Milliseconds => 1_000,
            };
            col.datetime()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(i, opt)| {
                    opt.and_then(|ts| NaiveDateTime::from_timestamp_opt(ts / divisor, 0))
                        .map(|dt| dt.date())
                        .ok_or_else(|| {
                            PipelineError::Data(format!("Row {}: Date is missing", i + 1))
                        })
                })
                .collect()
        }
        other => Err(PipelineError::Data(format!(
            "Date column has unsupported type {}",
            other
        ))),
    }
}

fn extract_revenues(df: &DataFrame) -> Result<Vec<f64>> {
    let col = df.column(REVENUE_COLUMN)?;

    let values: Vec<Option<f64>> = match col.dtype() {
        DataType::Float64 => col.f64().unwrap().into_iter().collect(),
        DataType::Float32 => col
            .f32()
            .unwrap()
            .into_iter()
            .map(|opt| opt.map(|v| v as f64))
            .collect(),
        DataType::Int64 => col
            .i64()
            .unwrap()
            .into_iter()
            .map(|opt| opt.map(|v| v as f64))
            .collect(),
        DataType::Int32 => col
            .i32()
            .unwrap()
            .into_iter()
            .map(|opt| opt.map(|v| v as f64))
            .collect(),
        other => {
            return Err(PipelineError::Data(format!(
                "Revenue column must be numeric, got {}",
                other
            )))
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, opt)| {
            opt.ok_or_else(|| {
                PipelineError::Data(format!("Row {}: Revenue is missing or not numeric", i + 1))
            })
        })
        .collect()
}

fn extract_categories(df: &DataFrame) -> Result<Vec<Option<String>>> {
    let col = df.column(CATEGORY_COLUMN)?;

    match col.dtype() {
        DataType::Utf8 => col
            .utf8()
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(i, opt)| match opt {
                Some(label) => Ok(Some(label.to_string())),
                None => Err(PipelineError::Data(format!(
                    "Row {}: Category is missing",
                    i + 1
                ))),
            })
            .collect(),
        other => Err(PipelineError::Data(format!(
            "Category column must be text, got {}",
            other
        ))),
    }
}
