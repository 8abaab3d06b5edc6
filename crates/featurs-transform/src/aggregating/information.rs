use polars::prelude::{DataType, Expr, col, lit};

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use super::{CountTransformer, CumulativeMode, RowFilter, filter_suffix};
use crate::kind::TransformerKind;
use crate::transformer::{LeafTransformer, true_div};

const MISSING_CATEGORY: &str = "N/A";

fn categorical_input() -> ColumnTypeSet {
    ColumnTypeSet::exclude([ColumnType::Numeric, ColumnType::Datetime])
}

/// Normalized base-2 entropy of the value distribution of `values`.
fn entropy(values: Expr) -> Expr {
    values.unique_counts().entropy(2.0, true)
}

/// Entropy of the target's values among rows sharing the source's value:
/// `<t>_by_<s>_<cum>entropy`.
///
/// Missing target values count as their own category.
#[derive(Debug, Clone)]
pub struct EntityEntropyTransformer {
    source: ColumnSpecification,
    target: ColumnSpecification,
    cumulative: CumulativeMode,
}

impl EntityEntropyTransformer {
    pub fn new(
        source: ColumnSpecification,
        target: ColumnSpecification,
        cumulative: CumulativeMode,
    ) -> Self {
        Self {
            source,
            target,
            cumulative,
        }
    }
}

impl LeafTransformer for EntityEntropyTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::EntityEntropy
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![categorical_input(), categorical_input()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}_by_{}_{}entropy",
            self.target.name,
            self.source.name,
            self.cumulative.prefix()
        )
    }

    fn expression(&self) -> Expr {
        let target = col(self.target.name.as_str())
            .cast(DataType::String)
            .fill_null(lit(MISSING_CATEGORY));
        // The element of a cumulative evaluation is the unnamed column.
        let running = || target.clone().cumulative_eval(entropy(col("")), 1);
        let per_source = match self.cumulative {
            CumulativeMode::None => entropy(target.clone()),
            CumulativeMode::Exclusive => running().shift(lit(1)),
            CumulativeMode::Inclusive => running(),
        };
        per_source.over([col(self.source.name.as_str())])
    }
}

/// Pointwise mutual information of the value pair on each row, in bits:
/// `<a>_<b>_<cum>pmi<where>`.
#[derive(Debug, Clone)]
pub struct PointwiseMutualInformationTransformer {
    column_a: ColumnSpecification,
    column_b: ColumnSpecification,
    cumulative: CumulativeMode,
    filter: Option<RowFilter>,
    count: CountTransformer,
}

impl PointwiseMutualInformationTransformer {
    pub fn new(
        column_a: ColumnSpecification,
        column_b: ColumnSpecification,
        cumulative: CumulativeMode,
        filter: Option<RowFilter>,
    ) -> Self {
        let count = CountTransformer::new(cumulative, filter.clone());
        Self {
            column_a,
            column_b,
            cumulative,
            filter,
            count,
        }
    }

    fn probability(&self, partition: Vec<Expr>) -> Expr {
        true_div(self.count.expression().over(partition), self.count.expression())
    }
}

impl LeafTransformer for PointwiseMutualInformationTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::PointwiseMutualInformation
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![categorical_input(), categorical_input()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}_{}_{}pmi{}",
            self.column_a.name,
            self.column_b.name,
            self.cumulative.prefix(),
            filter_suffix(self.filter.as_ref())
        )
    }

    fn expression(&self) -> Expr {
        let a = col(self.column_a.name.as_str());
        let b = col(self.column_b.name.as_str());
        let p_a = self.probability(vec![a.clone()]);
        let p_b = self.probability(vec![b.clone()]);
        let p_ab = self.probability(vec![a, b]);
        true_div(p_ab, p_a * p_b).log(lit(2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_name_and_direction() {
        let t = EntityEntropyTransformer::new(
            ColumnSpecification::nominal("USER"),
            ColumnSpecification::nominal("DEVICE"),
            CumulativeMode::Exclusive,
        );
        assert_eq!(t.name(), "DEVICE_by_USER_exclusive_cum_entropy");
        assert!(!t.kind().is_commutative());
    }

    #[test]
    fn test_categorical_inputs() {
        let t = PointwiseMutualInformationTransformer::new(
            ColumnSpecification::nominal("A"),
            ColumnSpecification::boolean("B"),
            CumulativeMode::None,
            None,
        );
        assert_eq!(t.name(), "A_B_pmi");
        let input = t.input_type();
        assert!(input[0].contains(ColumnType::Text));
        assert!(input[1].contains(ColumnType::Boolean));
        assert!(!input[0].contains(ColumnType::Numeric));
        assert!(!input[1].contains(ColumnType::Datetime));
    }
}
