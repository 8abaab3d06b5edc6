//! Configuration options for pipeline construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How aggressively column combinations are pruned before instantiation.
///
/// Levels form a ladder: every level applies all passes of the levels below it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationLevel {
    /// Keep every combination.
    #[default]
    None,
    /// Drop combinations that use the same column twice.
    SkipSelf,
    /// Additionally keep one ordering of each column set for commutative kinds.
    DeduplicateCommutative,
}

impl OptimizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::None => "none",
            OptimizationLevel::SkipSelf => "skip_self",
            OptimizationLevel::DeduplicateCommutative => "deduplicate_commutative",
        }
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(OptimizationLevel::None),
            "skip_self" => Ok(OptimizationLevel::SkipSelf),
            "deduplicate_commutative" => Ok(OptimizationLevel::DeduplicateCommutative),
            _ => Err(format!("Unknown optimization level: {s}")),
        }
    }
}

/// What happens when a transformer violates its input contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Abort the operation with an error.
    #[default]
    Strict,
    /// Log a warning and skip the offending transformer.
    Warn,
}

/// Options controlling pipeline construction.
///
/// ```
/// use featurs_model::{OptimizationLevel, PipelineOptions, ValidationMode};
///
/// let options = PipelineOptions::from_toml_str(
///     "optimization_level = \"skip_self\"\nvalidation_mode = \"warn\"",
/// )
/// .unwrap();
/// assert_eq!(options.optimization_level, OptimizationLevel::SkipSelf);
/// assert_eq!(options.validation_mode, ValidationMode::Warn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub optimization_level: OptimizationLevel,
    pub validation_mode: ValidationMode,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimization_level(mut self, level: OptimizationLevel) -> Self {
        self.optimization_level = level;
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Parses options from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}
