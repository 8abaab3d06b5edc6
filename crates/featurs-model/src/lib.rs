//! Column model for the feature pipeline.
//!
//! This crate defines the typed vocabulary shared by transformers and the
//! pipeline: column types and roles, column specifications, selectors, the
//! schema they resolve against, and pipeline options.

pub mod column;
pub mod enums;
pub mod error;
pub mod options;
pub mod schema;
pub mod selection;
pub mod selector;

pub use column::ColumnSpecification;
pub use enums::{ColumnRole, ColumnType, ColumnTypeSet};
pub use error::{Result, SelectionError};
pub use options::{OptimizationLevel, PipelineOptions, ValidationMode};
pub use schema::Schema;
pub use selection::Selection;
pub use selector::ColumnSelector;
