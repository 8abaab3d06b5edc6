use polars::prelude::{Expr, NULL, QuantileMethod, col, lit, when};

use featurs_common::format_numeric;
use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use super::{CountTransformer, CumulativeMode, RowFilter, as_float, exclusive, filter_suffix, filtered, masked};
use crate::error::{Result, TransformError};
use crate::kind::{ArithmeticAggregation, TransformerKind};
use crate::transformer::{LeafTransformer, Transformer, true_div};

const MEDIAN: f64 = 0.5;

fn numeric_input() -> Vec<ColumnTypeSet> {
    vec![ColumnType::Numeric | ColumnType::Boolean]
}

fn aggregation_name(
    column: &ColumnSpecification,
    cumulative: CumulativeMode,
    aggregation: &str,
    filter: Option<&RowFilter>,
) -> String {
    format!(
        "{}_{}{}{}",
        column.name,
        cumulative.prefix(),
        aggregation,
        filter_suffix(filter)
    )
}

fn values(column: &ColumnSpecification) -> Expr {
    as_float(col(column.name.as_str()))
}

/// Factory for the [`ArithmeticAggregation`] family.
pub struct ArithmeticAggregationTransformer;

impl ArithmeticAggregationTransformer {
    /// Builds the transformer for one arithmetic aggregation.
    ///
    /// `quantile` is required for [`ArithmeticAggregation::Quantile`] and
    /// ignored otherwise.
    ///
    /// # Errors
    ///
    /// Fails when a quantile is missing or outside `[0, 1]`.
    pub fn build(
        aggregation: ArithmeticAggregation,
        column: ColumnSpecification,
        quantile: Option<f64>,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Result<Transformer> {
        let transformer = match aggregation {
            ArithmeticAggregation::Sum => {
                Transformer::leaf(SumTransformer::new(column, cumulative, filter))
            }
            ArithmeticAggregation::Quantile => {
                let quantile = quantile.ok_or_else(|| TransformError::Construction {
                    transformer: aggregation_name(&column, cumulative, "quantile", filter.as_ref()),
                    message: "no quantile level given".to_string(),
                })?;
                Transformer::leaf(QuantileTransformer::new(column, quantile, cumulative, filter)?)
            }
            ArithmeticAggregation::Median => {
                Transformer::leaf(QuantileTransformer::new(column, MEDIAN, cumulative, filter)?)
            }
            ArithmeticAggregation::Mean => {
                Transformer::leaf(MeanTransformer::new(column, cumulative, filter))
            }
            ArithmeticAggregation::Std => {
                Transformer::leaf(StdTransformer::new(column, cumulative, filter))
            }
            ArithmeticAggregation::ZScore => {
                Transformer::leaf(ZScoreTransformer::new(column, cumulative, filter))
            }
        };
        Ok(transformer)
    }
}

/// Sum of a numeric or boolean column: `<c>_<cum>sum<where>`.
#[derive(Debug, Clone)]
pub struct SumTransformer {
    column: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
}

impl SumTransformer {
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

impl LeafTransformer for SumTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Sum)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        aggregation_name(&self.column, self.cumulative, "sum", self.filter.as_ref())
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        let values = values(&self.column);
        match self.cumulative {
            CumulativeMode::None => filtered(values, self.filter.as_ref()).sum(),
            CumulativeMode::Exclusive => exclusive(
                masked(values, self.filter.as_ref(), lit(0.0)).cum_sum(false),
                lit(0.0),
            ),
            CumulativeMode::Inclusive => {
                masked(values, self.filter.as_ref(), lit(0.0)).cum_sum(false)
            }
        }
    }
}

/// Linear-interpolated quantile: `<c>_<cum>quantile_<pct><where>`, or
/// `<c>_<cum>median<where>` at 0.5.
#[derive(Debug, Clone)]
pub struct QuantileTransformer {
    column: ColumnSpecification,
    quantile: f64,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
}

impl QuantileTransformer {
    /// # Errors
    ///
    /// Fails when `quantile` is outside `[0, 1]`.
    pub fn new(
        column: ColumnSpecification,
        quantile: f64,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(TransformError::Construction {
                transformer: aggregation_name(&column, cumulative, "quantile", filter.as_ref()),
                message: format!("quantile {quantile} is outside [0, 1]"),
            });
        }
        Ok(Self {
            column,
            quantile,
            cumulative,
            filter,
        })
    }

    fn is_median(&self) -> bool {
        self.quantile == MEDIAN
    }
}

impl LeafTransformer for QuantileTransformer {
    fn kind(&self) -> TransformerKind {
        if self.is_median() {
            TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Median)
        } else {
            TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Quantile)
        }
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        let aggregation = if self.is_median() {
            "median".to_string()
        } else {
            // Percent, trimmed of float noise such as 0.07 * 100.
            let percent = (self.quantile * 1e10).round() / 1e8;
            format!("quantile_{}", format_numeric(percent))
        };
        aggregation_name(&self.column, self.cumulative, &aggregation, self.filter.as_ref())
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        let values = values(&self.column);
        if !self.cumulative.is_cumulative() {
            return filtered(values, self.filter.as_ref())
                .quantile(lit(self.quantile), QuantileMethod::Linear);
        }
        // Nulls are skipped by the quantile, so they stand in for filtered rows.
        let running = masked(values, self.filter.as_ref(), lit(NULL)).cumulative_eval(
            col("").quantile(lit(self.quantile), QuantileMethod::Linear),
            1,
        );
        match self.cumulative {
            CumulativeMode::Exclusive => running.shift(lit(1)),
            _ => running,
        }
    }
}

/// Arithmetic mean, built from a sum and a count: `<c>_<cum>mean<where>`.
#[derive(Debug, Clone)]
pub struct MeanTransformer {
    column: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
    sum: SumTransformer,
    count: CountTransformer,
}

impl MeanTransformer {
    pub fn new(
        column: ColumnSpecification,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Self {
        Self {
            sum: SumTransformer::new(column.clone(), cumulative, filter.clone()),
            count: CountTransformer::new(cumulative, filter.clone()),
            column,
            cumulative,
            filter,
        }
    }
}

impl LeafTransformer for MeanTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Mean)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        aggregation_name(&self.column, self.cumulative, "mean", self.filter.as_ref())
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        true_div(self.sum.expression(), self.count.expression())
    }
}

/// Sample standard deviation (one delta degree of freedom):
/// `<c>_<cum>std<where>`.
///
/// Running variants derive the variance from running sums of values and
/// squared values, reusing the running mean. Rounding below zero is clamped,
/// and fewer than two rows give null like the whole-partition `std`.
#[derive(Debug, Clone)]
pub struct StdTransformer {
    column: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
    mean: MeanTransformer,
}

impl StdTransformer {
    pub fn new(
        column: ColumnSpecification,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Self {
        Self {
            mean: MeanTransformer::new(column.clone(), cumulative, filter.clone()),
            column,
            cumulative,
            filter,
        }
    }
}

impl LeafTransformer for StdTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Std)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        aggregation_name(&self.column, self.cumulative, "std", self.filter.as_ref())
    }

    fn returns_scalar(&self) -> bool {
        !self.cumulative.is_cumulative()
    }

    fn expression(&self) -> Expr {
        let values = values(&self.column);
        if !self.cumulative.is_cumulative() {
            return filtered(values, self.filter.as_ref()).std(1);
        }

        let masked_values = masked(values, self.filter.as_ref(), lit(0.0));
        let squares = (masked_values.clone() * masked_values).cum_sum(false);
        let sum_of_squares = match self.cumulative {
            CumulativeMode::Exclusive => exclusive(squares, lit(0.0)),
            _ => squares,
        };
        let n = as_float(self.mean.count.expression());
        let mean = self.mean.expression();
        let variance = true_div(
            sum_of_squares - n.clone() * mean.clone() * mean,
            n.clone() - lit(1.0),
        );
        let clamped = when(variance.clone().lt(lit(0.0)))
            .then(lit(0.0))
            .otherwise(variance);
        when(n.gt(lit(1.0)))
            .then(clamped.sqrt())
            .otherwise(lit(NULL))
    }
}

/// Distance from the mean in standard deviations: `<c>_<cum>z_score<where>`.
#[derive(Debug, Clone)]
pub struct ZScoreTransformer {
    column: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
    mean: MeanTransformer,
    std: StdTransformer,
}

impl ZScoreTransformer {
    pub fn new(
        column: ColumnSpecification,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Self {
        Self {
            mean: MeanTransformer::new(column.clone(), cumulative, filter.clone()),
            std: StdTransformer::new(column.clone(), cumulative, filter.clone()),
            column,
            cumulative,
            filter,
        }
    }
}

impl LeafTransformer for ZScoreTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::ArithmeticAggregation(ArithmeticAggregation::ZScore)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        aggregation_name(&self.column, self.cumulative, "z_score", self.filter.as_ref())
    }

    fn expression(&self) -> Expr {
        true_div(
            values(&self.column) - self.mean.expression(),
            self.std.expression(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> ColumnSpecification {
        ColumnSpecification::numeric("X")
    }

    #[test]
    fn test_quantile_names() {
        let q = QuantileTransformer::new(x(), 0.25, CumulativeMode::None, None).unwrap();
        assert_eq!(q.name(), "X_quantile_25");
        let q = QuantileTransformer::new(x(), 0.07, CumulativeMode::None, None).unwrap();
        assert_eq!(q.name(), "X_quantile_7");
        let median = QuantileTransformer::new(x(), 0.5, CumulativeMode::Inclusive, None).unwrap();
        assert_eq!(median.name(), "X_inclusive_cum_median");
        assert_eq!(
            median.kind(),
            TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Median)
        );
    }

    #[test]
    fn test_close_quantile_levels_keep_distinct_names() {
        let names: Vec<String> = [0.251, 0.254, 0.25]
            .into_iter()
            .map(|q| QuantileTransformer::new(x(), q, CumulativeMode::None, None).unwrap().name())
            .collect();
        assert_eq!(names, ["X_quantile_25.1", "X_quantile_25.4", "X_quantile_25"]);
    }

    #[test]
    fn test_quantile_range_checked() {
        assert!(QuantileTransformer::new(x(), 1.5, CumulativeMode::None, None).is_err());
        assert!(QuantileTransformer::new(x(), -0.1, CumulativeMode::None, None).is_err());
    }

    #[test]
    fn test_build_requires_quantile_level() {
        let err = ArithmeticAggregationTransformer::build(
            ArithmeticAggregation::Quantile,
            x(),
            None,
            CumulativeMode::None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Construction { .. }));
    }

    #[test]
    fn test_median_equals_half_quantile() {
        let median = ArithmeticAggregationTransformer::build(
            ArithmeticAggregation::Median,
            x(),
            None,
            CumulativeMode::None,
            None,
        )
        .unwrap();
        let half = ArithmeticAggregationTransformer::build(
            ArithmeticAggregation::Quantile,
            x(),
            Some(0.5),
            CumulativeMode::None,
            None,
        )
        .unwrap();
        assert_eq!(
            median.output_column_specification(),
            half.output_column_specification()
        );
    }

    #[test]
    fn test_aggregation_names() {
        let filter = RowFilter::new("POSITIVE", col("X").gt(lit(0)));
        assert_eq!(
            SumTransformer::new(x(), CumulativeMode::Exclusive, Some(filter.clone())).name(),
            "X_exclusive_cum_sum_where_POSITIVE"
        );
        assert_eq!(MeanTransformer::new(x(), CumulativeMode::None, None).name(), "X_mean");
        assert_eq!(StdTransformer::new(x(), CumulativeMode::None, None).name(), "X_std");
        assert_eq!(
            ZScoreTransformer::new(x(), CumulativeMode::None, Some(filter)).name(),
            "X_z_score_where_POSITIVE"
        );
    }
}
