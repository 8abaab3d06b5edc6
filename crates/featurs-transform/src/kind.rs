//! Transformer kinds and per-family operation tags.
//!
//! A [`TransformerKind`] identifies what a leaf transformer computes. Static
//! capabilities such as commutativity are answered by the kind, so the
//! optimizer can prune column combinations before any transformer exists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Goniometric functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoniometricFunction {
    Sin,
    Cos,
}

impl GoniometricFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoniometricFunction::Sin => "sin",
            GoniometricFunction::Cos => "cos",
        }
    }
}

/// Column scaling methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// Zero mean, unit variance.
    Standard,
    /// Rescaled to `[0, 1]`.
    MinMax,
}

impl Scaling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scaling::Standard => "standard",
            Scaling::MinMax => "minmax",
        }
    }
}

/// Binary arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "add",
            ArithmeticOperation::Subtract => "subtract",
            ArithmeticOperation::Multiply => "multiply",
            ArithmeticOperation::Divide => "divide",
        }
    }

    pub fn is_commutative(&self) -> bool {
        matches!(self, ArithmeticOperation::Add | ArithmeticOperation::Multiply)
    }
}

/// Binary comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    GreaterThan,
    GreaterOrEqual,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Equal => "equal",
            Comparison::GreaterThan => "greater_than",
            Comparison::GreaterOrEqual => "greater_or_equal",
        }
    }

    pub fn is_commutative(&self) -> bool {
        matches!(self, Comparison::Equal)
    }
}

/// Calendar components extracted from datetime columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalOperation {
    HourOfDay,
    /// ISO weekday, Monday = 1.
    DayOfWeek,
    MonthOfYear,
}

impl SeasonalOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonalOperation::HourOfDay => "hour_of_day",
            SeasonalOperation::DayOfWeek => "day_of_week",
            SeasonalOperation::MonthOfYear => "month_of_year",
        }
    }
}

/// Unit of a datetime difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeDiffUnit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "h")]
    Hours,
    #[default]
    #[serde(rename = "d")]
    Days,
}

impl TimeDiffUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeDiffUnit::Seconds => "s",
            TimeDiffUnit::Hours => "h",
            TimeDiffUnit::Days => "d",
        }
    }

    /// Milliseconds in one unit.
    pub fn milliseconds(&self) -> f64 {
        match self {
            TimeDiffUnit::Seconds => 1_000.0,
            TimeDiffUnit::Hours => 3_600_000.0,
            TimeDiffUnit::Days => 86_400_000.0,
        }
    }
}

/// Text similarity measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSimilarity {
    DamerauLevenshtein,
}

impl TextSimilarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSimilarity::DamerauLevenshtein => "damerau_levenshtein",
        }
    }
}

/// Values extracted from a single text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextExtraction {
    /// Number of characters.
    Length,
    /// Everything after the `@` of an email address.
    EmailDomain,
}

impl TextExtraction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextExtraction::Length => "length_chars",
            TextExtraction::EmailDomain => "email_domain",
        }
    }
}

/// Numeric aggregations over a partition or a running window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticAggregation {
    Sum,
    /// Linear-interpolated quantile; levels are supplied separately.
    Quantile,
    Median,
    Mean,
    Std,
    ZScore,
}

impl ArithmeticAggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticAggregation::Sum => "sum",
            ArithmeticAggregation::Quantile => "quantile",
            ArithmeticAggregation::Median => "median",
            ArithmeticAggregation::Mean => "mean",
            ArithmeticAggregation::Std => "std",
            ArithmeticAggregation::ZScore => "z_score",
        }
    }
}

/// Closed list of leaf transformer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformerKind {
    Polynomial,
    Log,
    Goniometric(GoniometricFunction),
    Scaling(Scaling),
    Arithmetic(ArithmeticOperation),
    Comparison(Comparison),
    Seasonal(SeasonalOperation),
    TimeDiff,
    TextSimilarity(TextSimilarity),
    TextExtraction(TextExtraction),
    TextCountMatches,
    Count,
    Lagged,
    FirstValue,
    Mode,
    NumUnique,
    EntityEntropy,
    PointwiseMutualInformation,
    ArithmeticAggregation(ArithmeticAggregation),
}

impl TransformerKind {
    /// Whether swapping the input columns yields the same feature.
    pub fn is_commutative(&self) -> bool {
        match self {
            TransformerKind::Arithmetic(op) => op.is_commutative(),
            TransformerKind::Comparison(op) => op.is_commutative(),
            TransformerKind::TimeDiff | TransformerKind::EntityEntropy => false,
            _ => true,
        }
    }

    /// Whether the kind aggregates rows and can be wrapped by `Over` or `Rolling`.
    pub fn is_aggregating(&self) -> bool {
        matches!(
            self,
            TransformerKind::Count
                | TransformerKind::Lagged
                | TransformerKind::FirstValue
                | TransformerKind::Mode
                | TransformerKind::NumUnique
                | TransformerKind::EntityEntropy
                | TransformerKind::PointwiseMutualInformation
                | TransformerKind::ArithmeticAggregation(_)
        )
    }
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformerKind::Polynomial => write!(f, "polynomial"),
            TransformerKind::Log => write!(f, "log"),
            TransformerKind::Goniometric(op) => write!(f, "goniometric({})", op.as_str()),
            TransformerKind::Scaling(op) => write!(f, "scaling({})", op.as_str()),
            TransformerKind::Arithmetic(op) => write!(f, "arithmetic({})", op.as_str()),
            TransformerKind::Comparison(op) => write!(f, "comparison({})", op.as_str()),
            TransformerKind::Seasonal(op) => write!(f, "seasonal({})", op.as_str()),
            TransformerKind::TimeDiff => write!(f, "time_diff"),
            TransformerKind::TextSimilarity(op) => write!(f, "text_similarity({})", op.as_str()),
            TransformerKind::TextExtraction(op) => write!(f, "text_extraction({})", op.as_str()),
            TransformerKind::TextCountMatches => write!(f, "text_count_matches"),
            TransformerKind::Count => write!(f, "count"),
            TransformerKind::Lagged => write!(f, "lagged"),
            TransformerKind::FirstValue => write!(f, "first_value"),
            TransformerKind::Mode => write!(f, "mode"),
            TransformerKind::NumUnique => write!(f, "num_unique"),
            TransformerKind::EntityEntropy => write!(f, "entity_entropy"),
            TransformerKind::PointwiseMutualInformation => write!(f, "pointwise_mutual_information"),
            TransformerKind::ArithmeticAggregation(op) => {
                write!(f, "arithmetic_aggregation({})", op.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commutativity() {
        assert!(TransformerKind::Arithmetic(ArithmeticOperation::Add).is_commutative());
        assert!(!TransformerKind::Arithmetic(ArithmeticOperation::Divide).is_commutative());
        assert!(TransformerKind::Comparison(Comparison::Equal).is_commutative());
        assert!(!TransformerKind::Comparison(Comparison::GreaterThan).is_commutative());
        assert!(!TransformerKind::EntityEntropy.is_commutative());
        assert!(TransformerKind::PointwiseMutualInformation.is_commutative());
    }

    #[test]
    fn test_aggregating() {
        assert!(TransformerKind::Count.is_aggregating());
        assert!(
            TransformerKind::ArithmeticAggregation(ArithmeticAggregation::Mean).is_aggregating()
        );
        assert!(!TransformerKind::Polynomial.is_aggregating());
        assert!(!TransformerKind::Seasonal(SeasonalOperation::DayOfWeek).is_aggregating());
    }

    #[test]
    fn test_time_diff_unit_parse() {
        let unit: TimeDiffUnit = serde_json::from_str("\"h\"").unwrap();
        assert_eq!(unit, TimeDiffUnit::Hours);
        assert_eq!(TimeDiffUnit::default().as_str(), "d");
    }
}
