//! Pruning of redundant column combinations and transformers.

use std::collections::HashSet;

use tracing::debug;

use featurs_model::{ColumnSpecification, OptimizationLevel};
use featurs_transform::{Transformer, TransformerKind};

/// Prunes input-column combinations according to an [`OptimizationLevel`].
///
/// Levels form a ladder: each level applies every pass of the levels below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Optimizer {
    level: OptimizationLevel,
}

impl Optimizer {
    pub fn new(level: OptimizationLevel) -> Self {
        Self { level }
    }

    pub fn optimization_level(&self) -> OptimizationLevel {
        self.level
    }

    /// Applies the passes enabled by the level, keeping encounter order.
    pub fn optimize_input_columns(
        &self,
        kind: TransformerKind,
        combinations: Vec<Vec<ColumnSpecification>>,
    ) -> Vec<Vec<ColumnSpecification>> {
        let before = combinations.len();
        let mut optimized = combinations;
        if self.level >= OptimizationLevel::SkipSelf {
            optimized = skip_self(optimized);
        }
        if self.level >= OptimizationLevel::DeduplicateCommutative && kind.is_commutative() {
            optimized = deduplicate_commutative(optimized);
        }
        if optimized.len() != before {
            debug!(
                %kind,
                level = %self.level,
                before,
                after = optimized.len(),
                "pruned column combinations"
            );
        }
        optimized
    }

    /// Drops transformers whose output already exists or repeats an earlier
    /// transformer of the batch.
    pub fn deduplicate_transformers_against_layers<'a>(
        existing_columns: impl IntoIterator<Item = &'a ColumnSpecification>,
        new_transformers: Vec<Transformer>,
    ) -> Vec<Transformer> {
        let mut present: HashSet<ColumnSpecification> =
            existing_columns.into_iter().cloned().collect();
        let before = new_transformers.len();
        let kept: Vec<Transformer> = new_transformers
            .into_iter()
            .filter(|transformer| present.insert(transformer.output_column_specification()))
            .collect();
        if kept.len() != before {
            debug!(
                dropped = before - kept.len(),
                kept = kept.len(),
                "dropped transformers with existing outputs"
            );
        }
        kept
    }
}

/// Removes combinations that use one column in two positions.
pub fn skip_self(combinations: Vec<Vec<ColumnSpecification>>) -> Vec<Vec<ColumnSpecification>> {
    combinations
        .into_iter()
        .filter(|combination| {
            let distinct: HashSet<&ColumnSpecification> = combination.iter().collect();
            distinct.len() == combination.len()
        })
        .collect()
}

/// Keeps the first combination of every set of permutations.
pub fn deduplicate_commutative(
    combinations: Vec<Vec<ColumnSpecification>>,
) -> Vec<Vec<ColumnSpecification>> {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    combinations
        .into_iter()
        .filter(|combination| {
            let mut canonical: Vec<String> =
                combination.iter().map(|c| c.name.clone()).collect();
            canonical.sort();
            seen.insert(canonical)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurs_transform::{ArithmeticOperation, CountTransformer, PolynomialTransformer};

    fn a() -> ColumnSpecification {
        ColumnSpecification::numeric("a")
    }

    fn b() -> ColumnSpecification {
        ColumnSpecification::numeric("b")
    }

    fn pairs() -> Vec<Vec<ColumnSpecification>> {
        vec![vec![a(), a()], vec![a(), b()], vec![b(), a()], vec![b(), b()]]
    }

    #[test]
    fn test_skip_self() {
        assert_eq!(skip_self(pairs()), vec![vec![a(), b()], vec![b(), a()]]);
    }

    #[test]
    fn test_ladder() {
        let add = TransformerKind::Arithmetic(ArithmeticOperation::Add);
        let subtract = TransformerKind::Arithmetic(ArithmeticOperation::Subtract);

        let none = Optimizer::new(OptimizationLevel::None);
        assert_eq!(none.optimize_input_columns(add, pairs()).len(), 4);

        let skip = Optimizer::new(OptimizationLevel::SkipSelf);
        assert_eq!(skip.optimize_input_columns(add, pairs()).len(), 2);

        let dedup = Optimizer::new(OptimizationLevel::DeduplicateCommutative);
        assert_eq!(dedup.optimize_input_columns(add, pairs()), vec![vec![a(), b()]]);
        assert_eq!(
            dedup.optimize_input_columns(subtract, pairs()),
            vec![vec![a(), b()], vec![b(), a()]]
        );
    }

    #[test]
    fn test_deduplicate_against_layers() {
        let square = Transformer::leaf(PolynomialTransformer::new(a(), 2));
        let count = Transformer::leaf(CountTransformer::default());
        let existing = [square.output_column_specification()];

        let kept = Optimizer::deduplicate_transformers_against_layers(
            existing.iter(),
            vec![square, count.clone(), count],
        );
        let names: Vec<String> = kept.iter().map(Transformer::name).collect();
        assert_eq!(names, vec!["count"]);
    }
}
