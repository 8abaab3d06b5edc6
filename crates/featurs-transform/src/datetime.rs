//! Datetime transformers.

use polars::prelude::{DataType, Expr, TimeUnit, col, lit};

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use crate::kind::{SeasonalOperation, TimeDiffUnit, TransformerKind};
use crate::transformer::{LeafTransformer, true_div};

/// Extracts a calendar component as an ordinal column.
#[derive(Debug, Clone)]
pub struct SeasonalTransformer {
    column: ColumnSpecification,
    operation: SeasonalOperation,
}

impl SeasonalTransformer {
    pub fn new(column: ColumnSpecification, operation: SeasonalOperation) -> Self {
        Self { column, operation }
    }
}

impl LeafTransformer for SeasonalTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Seasonal(self.operation)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnType::Datetime.into()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Ordinal
    }

    fn name(&self) -> String {
        format!("{}_{}", self.column.name, self.operation.as_str())
    }

    fn expression(&self) -> Expr {
        let dt = col(self.column.name.as_str()).dt();
        match self.operation {
            SeasonalOperation::HourOfDay => dt.hour(),
            SeasonalOperation::DayOfWeek => dt.weekday(),
            SeasonalOperation::MonthOfYear => dt.month(),
        }
    }
}

/// Difference between two datetime columns in a fixed unit:
/// `<l>_minus_<r>_in_<unit>`.
#[derive(Debug, Clone)]
pub struct TimeDiffTransformer {
    left: ColumnSpecification,
    right: ColumnSpecification,
    unit: TimeDiffUnit,
}

impl TimeDiffTransformer {
    pub fn new(left: ColumnSpecification, right: ColumnSpecification, unit: TimeDiffUnit) -> Self {
        Self { left, right, unit }
    }
}

impl LeafTransformer for TimeDiffTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::TimeDiff
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnType::Datetime.into(), ColumnType::Datetime.into()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}_minus_{}_in_{}",
            self.left.name,
            self.right.name,
            self.unit.as_str()
        )
    }

    fn expression(&self) -> Expr {
        let left = col(self.left.name.as_str())
            .dt()
            .timestamp(TimeUnit::Milliseconds);
        let right = col(self.right.name.as_str())
            .dt()
            .timestamp(TimeUnit::Milliseconds);
        true_div(
            (left - right).cast(DataType::Float64),
            lit(self.unit.milliseconds()),
        )
    }
}
