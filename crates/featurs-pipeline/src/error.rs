//! Error types for pipeline construction and evaluation.

use polars::prelude::PolarsError;
use thiserror::Error;

use featurs_model::{ColumnType, ColumnTypeSet, SelectionError};
use featurs_transform::TransformError;

/// Errors raised by pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A column selection did not resolve.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A transformer or wrapper rejected its arguments.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A transformer received the wrong number of input columns.
    #[error("{transformer} expects {expected} input columns, but received {actual}")]
    Arity {
        transformer: String,
        expected: usize,
        actual: usize,
    },

    /// An input column has a type the transformer does not accept.
    #[error("column '{column}' has type {column_type}, but {transformer} expects one of {expected}")]
    TypeContract {
        transformer: String,
        column: String,
        column_type: ColumnType,
        expected: ColumnTypeSet,
    },

    /// Operation options are inconsistent.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// An operation was called with nothing to build.
    #[error("cannot build {operation}: {message}")]
    Construction { operation: String, message: String },

    /// The compute engine failed while planning or collecting.
    #[error("polars error: {0}")]
    Engine(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
