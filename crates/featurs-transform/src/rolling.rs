//! Trailing time-window aggregation.

use polars::prelude::{ClosedWindow, Expr, RollingGroupOptions};

use featurs_model::{ColumnSpecification, ColumnType};

use crate::error::{Result, TransformError};
use crate::transformer::Transformer;
use crate::window::TimeWindow;

/// Evaluates an aggregating transformer over the rows whose index lies in
/// the `window` ending at the current row: `<inner>_in_the_last_<window>`.
///
/// The frame must be sorted by the index column. Inner expressions that
/// partition with `over` themselves (entropy, PMI, the running mode) are
/// rejected by Polars inside a rolling window when collected.
#[derive(Debug, Clone)]
pub struct Rolling {
    inner: Transformer,
    index_column: ColumnSpecification,
    window: TimeWindow,
}

impl Rolling {
    /// # Errors
    ///
    /// Fails when the index column is not a datetime or `inner` is row-wise.
    pub fn new(
        inner: Transformer,
        index_column: ColumnSpecification,
        window: TimeWindow,
    ) -> Result<Self> {
        if index_column.column_type != ColumnType::Datetime {
            return Err(TransformError::Configuration {
                message: format!(
                    "rolling index column {index_column} must be a datetime column"
                ),
            });
        }
        if !inner.is_aggregating() {
            return Err(TransformError::NotAggregating {
                transformer: inner.name(),
            });
        }
        Ok(Self {
            inner,
            index_column,
            window,
        })
    }

    pub fn inner(&self) -> &Transformer {
        &self.inner
    }

    pub fn index_column(&self) -> &ColumnSpecification {
        &self.index_column
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn name(&self) -> String {
        format!("{}_in_the_last_{}", self.inner.name(), self.window)
    }

    /// Row-aligned inner expressions are reduced to the value at the window's
    /// last row; whole-partition aggregates already yield one value.
    pub fn expression(&self) -> Expr {
        let period = self.window.duration();
        let aggregated = if self.inner.returns_scalar() {
            self.inner.expression()
        } else {
            self.inner.expression().last()
        };
        aggregated.rolling(RollingGroupOptions {
            index_column: self.index_column.name.as_str().into(),
            period,
            offset: -period,
            closed_window: ClosedWindow::Right,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregating::CountTransformer;
    use crate::over::Over;

    fn ts() -> ColumnSpecification {
        ColumnSpecification::datetime("TS")
    }

    #[test]
    fn test_rolling_name() {
        let rolling = Rolling::new(
            Transformer::leaf(CountTransformer::default()),
            ts(),
            TimeWindow::parse("2d1h").unwrap(),
        )
        .unwrap();
        assert_eq!(rolling.name(), "count_in_the_last_2d1h");
    }

    #[test]
    fn test_rolling_requires_datetime_index() {
        let err = Rolling::new(
            Transformer::leaf(CountTransformer::default()),
            ColumnSpecification::numeric("N"),
            TimeWindow::parse("2d").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Configuration { .. }));
    }

    #[test]
    fn test_wrappers_nest() {
        let rolling: Transformer = Rolling::new(
            Transformer::leaf(CountTransformer::default()),
            ts(),
            TimeWindow::parse("2d").unwrap(),
        )
        .unwrap()
        .into();
        let over = Over::new(rolling, vec![ColumnSpecification::nominal("G")]).unwrap();
        assert_eq!(over.name(), "count_in_the_last_2d_over_G");
        let nested: Transformer = over.into();
        assert!(nested.is_aggregating());
        assert!(!nested.returns_scalar());
        assert_eq!(nested.kind(), crate::kind::TransformerKind::Count);
    }
}
