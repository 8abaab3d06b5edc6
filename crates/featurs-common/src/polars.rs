//! Polars value helpers.
//!
//! Conversion helpers for reading collected columns back into plain Rust
//! values, plus the numeric formatting used when parameters are embedded in
//! generated column names.

use polars::prelude::*;

/// Formats a floating-point number without trailing zeros.
///
/// Used to embed float parameters (log bases, quantiles) in column names, so
/// equal parameters always render to equal names.
///
/// # Examples
///
/// ```
/// use featurs_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(10.0), "10");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
///
/// Booleans map to `0.0` / `1.0`.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        _ => None,
    }
}

/// Reads a column as `f64` values.
///
/// Nulls stay `None`, NaN stays NaN. The pipeline itself never calls this;
/// it is for callers and tests inspecting a collected frame.
///
/// # Errors
///
/// Fails when the column is missing or cannot be read as numbers.
pub fn column_to_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let values = (0..column.len())
        .map(|idx| column.get(idx).map(any_to_f64))
        .collect::<PolarsResult<Vec<_>>>()?;
    Ok(values)
}

/// Reads a column as strings, for callers and tests inspecting a collected
/// frame.
///
/// # Errors
///
/// Fails when the column is missing or is not a string column.
pub fn column_to_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    let values = column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}
