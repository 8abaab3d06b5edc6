use polars::prelude::{
    DataType, Expr, FillNullStrategy, NULL, SortOptions, col, int_range, len, lit, when,
};

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use super::{CumulativeMode, RowFilter, exclusive, filter_suffix, filtered};
use crate::kind::TransformerKind;
use crate::transformer::LeafTransformer;

/// 1-based position of each row within its partition.
fn running_position() -> Expr {
    int_range(lit(1), len() + lit(1), 1, DataType::Int64)
}

/// Number of rows: `<cum>count<where>`.
#[derive(Debug, Clone)]
pub struct CountTransformer {
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
}

impl CountTransformer {
    pub fn new(cumulative: CumulativeMode, filter: Option<RowFilter>) -> Self {
        Self { cumulative, filter }
    }
}

impl Default for CountTransformer {
    fn default() -> Self {
        Self::new(CumulativeMode::None, None)
    }
}

impl LeafTransformer for CountTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Count
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        Vec::new()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}count{}",
            self.cumulative.prefix(),
            filter_suffix(self.filter.as_ref())
        )
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        match &self.filter {
            Some(filter) => {
                let passing = filter.predicate().cast(DataType::Int64);
                match self.cumulative {
                    CumulativeMode::None => passing.sum(),
                    CumulativeMode::Exclusive => exclusive(passing.cum_sum(false), lit(0i64)),
                    CumulativeMode::Inclusive => passing.cum_sum(false),
                }
            }
            None => match self.cumulative {
                CumulativeMode::None => len(),
                CumulativeMode::Exclusive => int_range(lit(0), len(), 1, DataType::Int64),
                CumulativeMode::Inclusive => running_position(),
            },
        }
    }
}

/// Value of a column `lag` rows earlier: `<c>_lagged_<lag>`.
///
/// The fill value for the first rows is not part of the name.
#[derive(Debug, Clone)]
pub struct LaggedTransformer {
    column: ColumnSpecification,
    lag: i64,
    fill_value: Option<Expr>,
}

impl LaggedTransformer {
    pub fn new(column: ColumnSpecification, lag: i64, fill_value: Option<Expr>) -> Self {
        Self {
            column,
            lag,
            fill_value,
        }
    }
}

impl LeafTransformer for LaggedTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Lagged
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnTypeSet::any()]
    }

    fn return_type(&self) -> ColumnType {
        self.column.column_type
    }

    fn name(&self) -> String {
        format!("{}_lagged_{}", self.column.name, self.lag)
    }

    fn expression(&self) -> Expr {
        let column = col(self.column.name.as_str());
        match &self.fill_value {
            Some(fill) => column.shift_and_fill(lit(self.lag), fill.clone()),
            None => column.shift(lit(self.lag)),
        }
    }
}

/// First value of a column among rows passing the filter: `<c>_first_value<where>`.
#[derive(Debug, Clone)]
pub struct FirstValueTransformer {
    column: ColumnSpecification,
    filter: Option<RowFilter>,
}

impl FirstValueTransformer {
    pub fn new(column: ColumnSpecification, filter: Option<RowFilter>) -> Self {
        Self { column, filter }
    }
}

impl LeafTransformer for FirstValueTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::FirstValue
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnTypeSet::any()]
    }

    fn return_type(&self) -> ColumnType {
        self.column.column_type
    }

    fn name(&self) -> String {
        format!(
            "{}_first_value{}",
            self.column.name,
            filter_suffix(self.filter.as_ref())
        )
    }

    fn returns_scalar(&self) -> bool {
        true
    }

    fn expression(&self) -> Expr {
        filtered(col(self.column.name.as_str()), self.filter.as_ref()).first()
    }
}

/// Most frequent value: `<c>_<cum>mode<where>`.
///
/// Ties resolve to the largest value for whole-partition modes and to the
/// value that reached the top count most recently for running modes.
#[derive(Debug, Clone)]
pub struct ModeTransformer {
    column: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
}

impl ModeTransformer {
    pub fn new(
        column: ColumnSpecification,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Self {
        Self {
            column,
            cumulative,
            filter,
        }
    }
}

impl LeafTransformer for ModeTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Mode
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnTypeSet::any()]
    }

    fn return_type(&self) -> ColumnType {
        self.column.column_type
    }

    fn name(&self) -> String {
        format!(
            "{}_{}mode{}",
            self.column.name,
            self.cumulative.prefix(),
            filter_suffix(self.filter.as_ref())
        )
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        let column = col(self.column.name.as_str());
        if !self.cumulative.is_cumulative() {
            return filtered(column, self.filter.as_ref())
                .mode()
                .sort(SortOptions::default().with_order_descending(true))
                .first();
        }

        // Occurrences of the current row's value so far.
        let value_counts = match &self.filter {
            Some(filter) => filter
                .predicate()
                .cast(DataType::Int64)
                .cum_sum(false)
                .over([column.clone()]),
            None => running_position().over([column.clone()]),
        };
        let top_count = value_counts.clone().cum_max(false);
        let running_mode = when(
            value_counts
                .clone()
                .eq(top_count)
                .and(value_counts.gt(lit(0))),
        )
        .then(column)
        .otherwise(lit(NULL))
        .fill_null_with_strategy(FillNullStrategy::Forward(None));

        match self.cumulative {
            CumulativeMode::Exclusive => running_mode.shift(lit(1)),
            _ => running_mode,
        }
    }
}

/// Number of distinct values: `<c>_<cum>num_unique<where>`.
#[derive(Debug, Clone)]
pub struct NumUniqueTransformer {
    column: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
}

impl NumUniqueTransformer {
    pub fn new(
        column: ColumnSpecification,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Self {
        Self {
            column,
            cumulative,
            filter,
        }
    }
}

impl LeafTransformer for NumUniqueTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::NumUnique
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnTypeSet::any()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}_{}num_unique{}",
            self.column.name,
            self.cumulative.prefix(),
            filter_suffix(self.filter.as_ref())
        )
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        let column = col(self.column.name.as_str());
        if !self.cumulative.is_cumulative() {
            return filtered(column, self.filter.as_ref()).n_unique();
        }

        // A row is new when it is the first passing row of its value.
        let first_seen = match &self.filter {
            Some(filter) => {
                let passing = filter.predicate();
                passing.clone().and(
                    passing
                        .cast(DataType::Int64)
                        .cum_sum(false)
                        .over([column])
                        .eq(lit(1)),
                )
            }
            None => column.is_first_distinct(),
        };
        let running = first_seen.cast(DataType::Int64).cum_sum(false);

        match self.cumulative {
            CumulativeMode::Exclusive => exclusive(running, lit(0i64)),
            _ => running,
        }
    }
}
