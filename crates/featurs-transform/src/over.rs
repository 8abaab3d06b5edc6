//! Partitioned aggregation.

use polars::prelude::{Expr, col};

use featurs_model::ColumnSpecification;

use crate::error::{Result, TransformError};
use crate::transformer::Transformer;

/// Evaluates an aggregating transformer separately within each group of
/// equal key values: `<inner>_over_<k1>_and_<k2>`.
#[derive(Debug, Clone)]
pub struct Over {
    inner: Transformer,
    group_keys: Vec<ColumnSpecification>,
}

impl Over {
    /// # Errors
    ///
    /// Fails when `inner` is row-wise or no group key is given.
    pub fn new(inner: Transformer, group_keys: Vec<ColumnSpecification>) -> Result<Self> {
        if !inner.is_aggregating() {
            return Err(TransformError::NotAggregating {
                transformer: inner.name(),
            });
        }
        if group_keys.is_empty() {
            return Err(TransformError::Construction {
                transformer: inner.name(),
                message: "over needs at least one group key".to_string(),
            });
        }
        Ok(Self { inner, group_keys })
    }

    pub fn inner(&self) -> &Transformer {
        &self.inner
    }

    pub fn group_keys(&self) -> &[ColumnSpecification] {
        &self.group_keys
    }

    pub fn name(&self) -> String {
        let keys: Vec<&str> = self.group_keys.iter().map(|k| k.name.as_str()).collect();
        format!("{}_over_{}", self.inner.name(), keys.join("_and_"))
    }

    pub fn expression(&self) -> Expr {
        let keys: Vec<Expr> = self
            .group_keys
            .iter()
            .map(|k| col(k.name.as_str()))
            .collect();
        self.inner.expression().over(keys)
    }
}
