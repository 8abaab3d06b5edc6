//! Shared utilities for the feature pipeline crates.
//!
//! This crate provides small helpers used across the workspace:
//! combinatorics over parameter lists and Polars value helpers.

pub mod combinations;
pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use combinations::{cartesian_product, order_preserving_unique, valid_param_options};
pub use polars::{any_to_f64, column_to_f64, column_to_strings, format_numeric};
