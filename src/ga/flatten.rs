//! Response flattening.
//!
//! Converts the nested dimension/metric shape of a `reports:batchGet`
//! response into one polars DataFrame: dimension columns first, metric
//! columns after, `ga:` prefixes stripped. Every value arrives as a string;
//! columns whose values all parse as numbers are coerced post-hoc, and a
//! column literally named `date` is parsed from YYYYMMDD into a Date column.

use super::error::{AnalyticsError, Result};
use super::query::{MetricType, RawResponse, Report};
use chrono::NaiveDate;
use polars::functions::concat_df_diagonal;
use polars::prelude::*;
use std::collections::HashMap;

/// Flatten an accumulated response into a single DataFrame.
///
/// Reports are folded in arrival order. Reports with differing column sets
/// widen the table to the union of columns, with nulls where a report has
/// no value. An empty response yields an empty frame with no columns.
pub fn flatten(resp: &RawResponse) -> Result<DataFrame> {
    let mut acc: Option<DataFrame> = None;
    let mut declared_types: HashMap<String, DataType> = HashMap::new();

    for report in &resp.reports {
        let df = report_to_frame(report, &mut declared_types)?;
        acc = Some(match acc {
            None => df,
            Some(prev) => concat_df_diagonal(&[prev, df])?,
        });
    }

    let mut df = match acc {
        Some(df) => df,
        None => return Ok(DataFrame::empty()),
    };

    coerce_numeric(&mut df)?;
    flag_declared_type_mismatches(&df, &declared_types);
    parse_date_column(&mut df)?;

    Ok(df)
}

/// Build one all-string DataFrame for a single report.
///
/// Records the declared metric types into `declared_types` as a side
/// channel; they are compared against the inferred dtypes afterwards but
/// never used to force casts.
fn report_to_frame(
    report: &Report,
    declared_types: &mut HashMap<String, DataType>,
) -> Result<DataFrame> {
    let header = &report.column_header;

    let mut cols: Vec<String> = header
        .dimensions
        .iter()
        .map(|d| strip_namespace(d))
        .collect();

    if let Some(metric_header) = &header.metric_header {
        for entry in &metric_header.metric_header_entries {
            let name = strip_namespace(&entry.name);
            declared_types.insert(name.clone(), declared_dtype(entry.metric_type));
            cols.push(name);
        }
    }

    // Flatten each row positionally: dimension values, then every metric
    // value group in API order. The value count must match the column
    // count; the API contract is made explicit here rather than trusting a
    // positional zip.
    let mut values: Vec<Vec<&str>> = vec![Vec::with_capacity(report.data.rows.len()); cols.len()];

    for (row_idx, row) in report.data.rows.iter().enumerate() {
        let row_len = row.dimensions.len()
            + row.metrics.iter().map(|m| m.values.len()).sum::<usize>();
        if row_len != cols.len() {
            return Err(AnalyticsError::ColumnMismatch {
                row: row_idx,
                expected: cols.len(),
                got: row_len,
            });
        }

        let flat = row
            .dimensions
            .iter()
            .chain(row.metrics.iter().flat_map(|m| m.values.iter()));
        for (col, value) in values.iter_mut().zip(flat) {
            col.push(value.as_str());
        }
    }

    let columns: Vec<Column> = cols
        .iter()
        .zip(values)
        .map(|(name, col)| Column::new(name.as_str().into(), col))
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn strip_namespace(name: &str) -> String {
    name.strip_prefix("ga:").unwrap_or(name).to_string()
}

/// Dtype the API declares for a metric. Computed for diagnostics only;
/// best-effort inference is the source of truth for the output schema.
fn declared_dtype(metric_type: MetricType) -> DataType {
    match metric_type {
        MetricType::Integer => DataType::Int32,
        MetricType::Float | MetricType::Currency | MetricType::Percent => DataType::Float32,
        MetricType::Time | MetricType::Unspecified => DataType::String,
    }
}

/// Best-effort numeric coercion of every string column.
///
/// A column becomes Int64 if every non-null value parses as an integer,
/// else Float64 if every non-null value parses as a float, else it stays a
/// string column. Non-string columns are left untouched, which makes the
/// pass idempotent.
pub fn coerce_numeric(df: &mut DataFrame) -> Result<()> {
    if df.height() == 0 {
        return Ok(());
    }

    let names = df.get_column_names_owned();
    for name in names {
        let col = df.column(name.as_str())?;
        if col.dtype() != &DataType::String {
            continue;
        }
        let series = col.as_materialized_series().clone();
        let nulls = series.null_count();

        // Non-strict casts null out unparseable values; a clean parse
        // introduces no new nulls.
        if let Ok(ints) = series.cast(&DataType::Int64) {
            if ints.null_count() == nulls {
                df.replace(name.as_str(), ints)?;
                continue;
            }
        }
        if let Ok(floats) = series.cast(&DataType::Float64) {
            if floats.null_count() == nulls {
                df.replace(name.as_str(), floats)?;
            }
        }
    }
    Ok(())
}

/// Log metric columns whose inferred dtype disagrees with the declared one.
fn flag_declared_type_mismatches(df: &DataFrame, declared_types: &HashMap<String, DataType>) {
    for (name, declared) in declared_types {
        if let Ok(col) = df.column(name.as_str()) {
            let actual = col.dtype();
            let agrees = match declared {
                DataType::Int32 => actual.is_integer(),
                DataType::Float32 => actual.is_float(),
                other => actual == other,
            };
            if !agrees {
                log::debug!(
                    "metric '{}' declared as {} but inferred as {}",
                    name,
                    declared,
                    actual
                );
            }
        }
    }
}

/// Parse a column literally named `date` from YYYYMMDD into a Date column.
///
/// Applied unconditionally when the column exists; a malformed value is a
/// fatal error. Nulls introduced by a column-set union stay null.
pub fn parse_date_column(df: &mut DataFrame) -> Result<()> {
    let col = match df.column("date") {
        Ok(col) => col,
        Err(_) => return Ok(()),
    };
    if col.dtype() == &DataType::Date {
        return Ok(());
    }

    // Numeric coercion may already have turned "20230115" into an integer;
    // go through a string view either way.
    let strings = col.as_materialized_series().cast(&DataType::String)?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");

    let mut days: Vec<Option<i32>> = Vec::with_capacity(strings.len());
    for value in strings.str()?.into_iter() {
        match value {
            None => days.push(None),
            Some(v) => {
                let parsed = NaiveDate::parse_from_str(v, "%Y%m%d")
                    .map_err(|_| AnalyticsError::DateParse(v.to_string()))?;
                days.push(Some((parsed - epoch).num_days() as i32));
            }
        }
    }

    let ca: Int32Chunked = days.into_iter().collect();
    let dates = ca.with_name("date".into()).into_date().into_series();
    df.replace("date", dates)?;
    Ok(())
}
