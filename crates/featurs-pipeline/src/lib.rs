//! Declarative, layered feature-engineering pipeline.
//!
//! A [`Pipeline`] expands column selections and parameter lists into
//! transformers, prunes redundant combinations with the [`Optimizer`], checks
//! input contracts with the [`Validator`], and stacks the surviving
//! expressions on the lazy frame of a [`Dataset`].
//!
//! ```no_run
//! use featurs_model::{ColumnSpecification, ColumnType, Schema};
//! use featurs_pipeline::{Dataset, Pipeline};
//! use polars::prelude::*;
//!
//! let frame = df! { "x" => &[1.0, 2.0, 3.0] }.unwrap();
//! let schema = Schema::new(vec![ColumnSpecification::numeric("x")]).unwrap();
//! let result = Pipeline::new(Dataset::from_frame(frame, schema))
//!     .with_polynomial(ColumnType::Numeric, &[2, 3], false)
//!     .unwrap()
//!     .collect()
//!     .unwrap();
//! assert!(result.column("x_pow_3").is_ok());
//! ```

pub mod dataset;
pub mod error;
pub mod optimizer;
pub mod pipeline;
pub mod validator;

pub use dataset::Dataset;
pub use error::{PipelineError, Result};
pub use optimizer::{Optimizer, deduplicate_commutative, skip_self};
pub use pipeline::{AggregationOptions, Layer, Pipeline};
pub use validator::Validator;
