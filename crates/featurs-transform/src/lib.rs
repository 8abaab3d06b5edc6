//! Transformers for the feature pipeline.
//!
//! A transformer turns concrete input columns plus parameters into one
//! derived column: a deterministic name, a return type and a lazy Polars
//! expression. Row-wise families live in [`numeric`], [`comparison`],
//! [`datetime`] and [`text`]; aggregations live in [`aggregating`] and can be
//! scoped with the [`Over`] and [`Rolling`] wrappers.

pub mod aggregating;
pub mod comparison;
pub mod datetime;
pub mod error;
pub mod kind;
pub mod numeric;
pub mod over;
pub mod rolling;
pub mod text;
pub mod transformer;
pub mod window;

pub use aggregating::{
    ArithmeticAggregationTransformer, CountTransformer, CumulativeMode, EntityEntropyTransformer,
    FirstValueTransformer, LaggedTransformer, MeanTransformer, ModeTransformer,
    NumUniqueTransformer, PointwiseMutualInformationTransformer, QuantileTransformer, RowFilter,
    StdTransformer, SumTransformer, ZScoreTransformer,
};
pub use comparison::ComparisonTransformer;
pub use datetime::{SeasonalTransformer, TimeDiffTransformer};
pub use error::{Result, TransformError};
pub use kind::{
    ArithmeticAggregation, ArithmeticOperation, Comparison, GoniometricFunction, Scaling,
    SeasonalOperation, TextExtraction, TextSimilarity, TimeDiffUnit, TransformerKind,
};
pub use numeric::{
    ArithmeticTransformer, GoniometricTransformer, LogTransformer, PolynomialTransformer,
    ScalingTransformer,
};
pub use over::Over;
pub use rolling::Rolling;
pub use text::{
    CommonPattern, TextCountMatchesTransformer, TextExtractionTransformer, TextPattern,
    TextSimilarityTransformer,
};
pub use transformer::{LeafTransformer, Transformer};
pub use window::{TimeWindow, format_timedelta};
