//! Aggregating transformers.
//!
//! Aggregations compute one value per partition (the whole frame unless
//! wrapped by [`Over`](crate::Over) or [`Rolling`](crate::Rolling)) and
//! broadcast it to every row. Most of them also run cumulatively in row order
//! and accept a [`RowFilter`] restricting which rows contribute.

mod arithmetic;
mod basic;
mod information;

pub use arithmetic::{
    ArithmeticAggregationTransformer, MeanTransformer, QuantileTransformer, StdTransformer,
    SumTransformer, ZScoreTransformer,
};
pub use basic::{
    CountTransformer, FirstValueTransformer, LaggedTransformer, ModeTransformer,
    NumUniqueTransformer,
};
pub use information::{EntityEntropyTransformer, PointwiseMutualInformationTransformer};

use polars::prelude::{DataType, Expr, lit, when};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an aggregation runs along row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CumulativeMode {
    /// One value for the whole partition.
    #[default]
    None,
    /// Running aggregate over strictly earlier rows.
    Exclusive,
    /// Running aggregate including the current row.
    Inclusive,
}

impl CumulativeMode {
    /// Prefix inserted before the aggregation name.
    pub fn prefix(&self) -> &'static str {
        match self {
            CumulativeMode::None => "",
            CumulativeMode::Exclusive => "exclusive_cum_",
            CumulativeMode::Inclusive => "inclusive_cum_",
        }
    }

    pub fn is_cumulative(&self) -> bool {
        !matches!(self, CumulativeMode::None)
    }
}

impl fmt::Display for CumulativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A boolean row predicate with the label it gets in column names.
///
/// ```
/// use featurs_transform::RowFilter;
/// use polars::prelude::*;
///
/// let filter = RowFilter::new("NOT_BOOL", col("BOOL_FEATURE").not());
/// assert_eq!(filter.suffix(), "_where_NOT_BOOL");
/// ```
#[derive(Debug, Clone)]
pub struct RowFilter {
    label: String,
    predicate: Expr,
}

impl RowFilter {
    pub fn new(label: impl Into<String>, predicate: Expr) -> Self {
        Self {
            label: label.into(),
            predicate,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn predicate(&self) -> Expr {
        self.predicate.clone()
    }

    pub fn suffix(&self) -> String {
        format!("_where_{}", self.label)
    }
}

fn filter_suffix(filter: Option<&RowFilter>) -> String {
    filter.map(RowFilter::suffix).unwrap_or_default()
}

/// Keeps rows passing the filter and replaces the others with `neutral`,
/// so running aggregates stay aligned with the frame.
fn masked(values: Expr, filter: Option<&RowFilter>, neutral: Expr) -> Expr {
    match filter {
        Some(filter) => when(filter.predicate())
            .then(values)
            .otherwise(neutral),
        None => values,
    }
}

/// Drops rows failing the filter; only valid for whole-partition aggregates.
fn filtered(values: Expr, filter: Option<&RowFilter>) -> Expr {
    match filter {
        Some(filter) => values.filter(filter.predicate()),
        None => values,
    }
}

/// Running value over earlier rows only, `fill` at the first row.
fn exclusive(running: Expr, fill: Expr) -> Expr {
    running.shift_and_fill(lit(1), fill)
}

fn as_float(expr: Expr) -> Expr {
    expr.cast(DataType::Float64)
}
