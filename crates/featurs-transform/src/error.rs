//! Error types for transformer construction.

use thiserror::Error;

/// Errors raised while constructing transformers.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A transformer was configured with an unusable column or parameter.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// A transformer could not be built from its arguments.
    #[error("cannot construct {transformer}: {message}")]
    Construction {
        transformer: String,
        message: String,
    },

    /// A wrapper was asked to wrap a row-wise transformer.
    #[error("{transformer} is not an aggregating transformer and cannot be wrapped")]
    NotAggregating { transformer: String },

    /// A time window string did not parse to a positive duration.
    #[error("invalid time window '{window}': {message}")]
    InvalidTimeWindow { window: String, message: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
