//! Row-wise comparisons between two columns.

use polars::prelude::{Expr, col};

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use crate::kind::{Comparison, TransformerKind};
use crate::transformer::LeafTransformer;

/// Compares two columns of any type: `<l>_<comparison>_<r>`.
#[derive(Debug, Clone)]
pub struct ComparisonTransformer {
    left: ColumnSpecification,
    right: ColumnSpecification,
    comparison: Comparison,
}

impl ComparisonTransformer {
    pub fn new(left: ColumnSpecification, right: ColumnSpecification, comparison: Comparison) -> Self {
        Self {
            left,
            right,
            comparison,
        }
    }
}

impl LeafTransformer for ComparisonTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Comparison(self.comparison)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnTypeSet::any(), ColumnTypeSet::any()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Boolean
    }

    fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.left.name,
            self.comparison.as_str(),
            self.right.name
        )
    }

    fn expression(&self) -> Expr {
        let left = col(self.left.name.as_str());
        let right = col(self.right.name.as_str());
        match self.comparison {
            Comparison::Equal => left.eq(right),
            Comparison::GreaterThan => left.gt(right),
            Comparison::GreaterOrEqual => left.gt_eq(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_types() {
        let t = ComparisonTransformer::new(
            ColumnSpecification::numeric("A"),
            ColumnSpecification::text("B"),
            Comparison::GreaterOrEqual,
        );
        assert_eq!(t.name(), "A_greater_or_equal_B");
        assert_eq!(t.return_type(), ColumnType::Boolean);
        assert!(!t.kind().is_commutative());
    }
}
