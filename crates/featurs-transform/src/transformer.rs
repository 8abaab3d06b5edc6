//! The transformer capability contract.
//!
//! Every derived column is produced by a [`Transformer`]: either a leaf that
//! builds one expression from its input columns, or a wrapper ([`Over`],
//! [`Rolling`]) that re-scopes an aggregating transformer. Transformers only
//! describe computations; evaluation happens when the lazy frame is collected.

use polars::prelude::{Expr, Operator, binary_expr};
use std::fmt;
use std::sync::Arc;

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use crate::kind::TransformerKind;
use crate::over::Over;
use crate::rolling::Rolling;

/// A transformer that builds its expression directly from input columns.
pub trait LeafTransformer: fmt::Debug + Send + Sync {
    fn kind(&self) -> TransformerKind;

    /// Accepted types per positional argument. The length is the arity.
    fn input_type(&self) -> Vec<ColumnTypeSet>;

    fn return_type(&self) -> ColumnType;

    /// Output column name, a deterministic function of inputs and parameters.
    fn name(&self) -> String;

    /// The unnamed expression computing the feature.
    fn expression(&self) -> Expr;

    /// Whether the expression yields one value per partition rather than
    /// one per row.
    fn returns_scalar(&self) -> bool {
        false
    }
}

/// A leaf transformer or a wrapper around an aggregating transformer.
///
/// Cloning is cheap; the underlying transformers are shared.
#[derive(Debug, Clone)]
pub enum Transformer {
    Leaf(Arc<dyn LeafTransformer>),
    Over(Arc<Over>),
    Rolling(Arc<Rolling>),
}

impl Transformer {
    pub fn leaf<T: LeafTransformer + 'static>(transformer: T) -> Self {
        Transformer::Leaf(Arc::new(transformer))
    }

    /// Kind of the innermost leaf.
    pub fn kind(&self) -> TransformerKind {
        match self {
            Transformer::Leaf(leaf) => leaf.kind(),
            Transformer::Over(over) => over.inner().kind(),
            Transformer::Rolling(rolling) => rolling.inner().kind(),
        }
    }

    pub fn input_type(&self) -> Vec<ColumnTypeSet> {
        match self {
            Transformer::Leaf(leaf) => leaf.input_type(),
            Transformer::Over(over) => over.inner().input_type(),
            Transformer::Rolling(rolling) => rolling.inner().input_type(),
        }
    }

    pub fn is_commutative(&self) -> bool {
        self.kind().is_commutative()
    }

    pub fn is_aggregating(&self) -> bool {
        match self {
            Transformer::Leaf(leaf) => leaf.kind().is_aggregating(),
            Transformer::Over(_) | Transformer::Rolling(_) => true,
        }
    }

    pub fn is_wrapper(&self) -> bool {
        !matches!(self, Transformer::Leaf(_))
    }

    /// Wrappers always broadcast back to one value per row.
    pub fn returns_scalar(&self) -> bool {
        match self {
            Transformer::Leaf(leaf) => leaf.returns_scalar(),
            Transformer::Over(_) | Transformer::Rolling(_) => false,
        }
    }

    pub fn return_type(&self) -> ColumnType {
        match self {
            Transformer::Leaf(leaf) => leaf.return_type(),
            Transformer::Over(over) => over.inner().return_type(),
            Transformer::Rolling(rolling) => rolling.inner().return_type(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Transformer::Leaf(leaf) => leaf.name(),
            Transformer::Over(over) => over.name(),
            Transformer::Rolling(rolling) => rolling.name(),
        }
    }

    pub fn expression(&self) -> Expr {
        match self {
            Transformer::Leaf(leaf) => leaf.expression(),
            Transformer::Over(over) => over.expression(),
            Transformer::Rolling(rolling) => rolling.expression(),
        }
    }

    /// The named expression: `expression()` aliased to `name()`.
    pub fn transform(&self) -> Expr {
        self.expression().alias(self.name())
    }

    pub fn output_column_specification(&self) -> ColumnSpecification {
        ColumnSpecification::new(self.name(), self.return_type())
    }
}

impl fmt::Display for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.kind(), self.name())
    }
}

impl From<Over> for Transformer {
    fn from(over: Over) -> Self {
        Transformer::Over(Arc::new(over))
    }
}

impl From<Rolling> for Transformer {
    fn from(rolling: Rolling) -> Self {
        Transformer::Rolling(Arc::new(rolling))
    }
}

/// Floating-point division, also for integer operands.
pub(crate) fn true_div(numerator: Expr, denominator: Expr) -> Expr {
    binary_expr(numerator, Operator::TrueDivide, denominator)
}
