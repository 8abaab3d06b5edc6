//! Column specifications.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{ColumnRole, ColumnType};

/// Name, type and role of one column.
///
/// Transformers describe their output with a specification whose name is a
/// deterministic function of their inputs and parameters, so two equal
/// specifications always denote the same computed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpecification {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub column_role: ColumnRole,
}

impl ColumnSpecification {
    /// Creates a feature column of the given type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            column_role: ColumnRole::Feature,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Numeric)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    pub fn nominal(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Nominal)
    }

    pub fn ordinal(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Ordinal)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Datetime)
    }

    pub fn with_role(mut self, role: ColumnRole) -> Self {
        self.column_role = role;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ColumnSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.column_type, self.column_role)
    }
}
