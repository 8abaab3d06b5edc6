//! Type and arity contracts between transformers and their input columns.

use tracing::warn;

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet, ValidationMode};
use featurs_transform::{TimeWindow, Transformer};

use crate::error::{PipelineError, Result};

/// Checks transformers against the columns chosen for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    mode: ValidationMode,
}

impl Validator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Returns whether the transformer may be kept.
    ///
    /// Wrappers are always accepted; their inner transformer was checked when
    /// it was built.
    ///
    /// # Errors
    ///
    /// In strict mode, fails on an arity or type mismatch. In warn mode the
    /// mismatch is logged and `Ok(false)` is returned.
    pub fn validate(
        &self,
        transformer: &Transformer,
        input_columns: &[ColumnSpecification],
    ) -> Result<bool> {
        if transformer.is_wrapper() {
            return Ok(true);
        }
        match check_contract(transformer, input_columns) {
            Ok(()) => Ok(true),
            Err(error) => match self.mode {
                ValidationMode::Strict => Err(error),
                ValidationMode::Warn => {
                    warn!(transformer = %transformer.name(), "{error}");
                    Ok(false)
                }
            },
        }
    }

    /// Checks that requested time windows come with a datetime index column.
    ///
    /// # Errors
    ///
    /// Fails when a window is requested without an index column, or when the
    /// index column is not a datetime.
    pub fn validate_time_window_index_column(
        time_windows: &[Option<TimeWindow>],
        index_column: Option<&ColumnSpecification>,
    ) -> Result<()> {
        let has_window = time_windows.iter().any(Option::is_some);
        match index_column {
            None if has_window => Err(PipelineError::Configuration {
                message: "time window specified without index column".to_string(),
            }),
            Some(index) if index.column_type != ColumnType::Datetime => {
                Err(PipelineError::Configuration {
                    message: format!(
                        "only datetime columns can index rolling aggregations, got {index}"
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

fn check_contract(transformer: &Transformer, input_columns: &[ColumnSpecification]) -> Result<()> {
    let expected: Vec<ColumnTypeSet> = transformer
        .input_type()
        .into_iter()
        .filter(|types| !types.is_empty())
        .collect();

    if expected.len() != input_columns.len() {
        return Err(PipelineError::Arity {
            transformer: transformer.name(),
            expected: expected.len(),
            actual: input_columns.len(),
        });
    }

    for (column, types) in input_columns.iter().zip(&expected) {
        if !types.contains(column.column_type) {
            return Err(PipelineError::TypeContract {
                transformer: transformer.name(),
                column: column.name.clone(),
                column_type: column.column_type,
                expected: *types,
            });
        }
    }
    Ok(())
}
