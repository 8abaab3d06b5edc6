//! Column selectors.
//!
//! A [`ColumnSelector`] is a predicate over column specifications. Leaves test
//! the name, type or role of a column; `&`, `|` and `!` compose them.
//!
//! ```
//! use featurs_model::{ColumnRole, ColumnSelector, ColumnSpecification, ColumnType};
//!
//! let selector = ColumnSelector::name_starts_with("NUM") & !ColumnRole::Label;
//! assert!(selector.matches(&ColumnSpecification::numeric("NUMERIC_FEATURE")));
//! assert!(!selector.matches(&ColumnSpecification::numeric("NUM").with_role(ColumnRole::Label)));
//!
//! let typed = ColumnType::Numeric | ColumnSelector::name_contains("FLAG");
//! assert!(typed.matches(&ColumnSpecification::boolean("IS_FLAG")));
//! ```

use regex::Regex;
use std::ops::{BitAnd, BitOr, Not};

use crate::column::ColumnSpecification;
use crate::enums::{ColumnRole, ColumnType, ColumnTypeSet};
use crate::error::{Result, SelectionError};

/// Immutable predicate tree over column specifications.
#[derive(Debug, Clone)]
pub enum ColumnSelector {
    NameContains(String),
    NameStartsWith(String),
    NameEndsWith(String),
    /// Regex search on the column name, compiled once at construction.
    NameRegex { pattern: String, regex: Regex },
    Types(ColumnTypeSet),
    Roles(Vec<ColumnRole>),
    And(Box<ColumnSelector>, Box<ColumnSelector>),
    Or(Box<ColumnSelector>, Box<ColumnSelector>),
    Not(Box<ColumnSelector>),
}

impl ColumnSelector {
    pub fn name_contains(fragment: impl Into<String>) -> Self {
        Self::NameContains(fragment.into())
    }

    pub fn name_starts_with(prefix: impl Into<String>) -> Self {
        Self::NameStartsWith(prefix.into())
    }

    pub fn name_ends_with(suffix: impl Into<String>) -> Self {
        Self::NameEndsWith(suffix.into())
    }

    /// Selects columns whose name contains a match of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidPattern`] when the pattern does not compile.
    pub fn name_matches(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern).map_err(|source| SelectionError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self::NameRegex { pattern, regex })
    }

    pub fn types(types: impl Into<ColumnTypeSet>) -> Self {
        Self::Types(types.into())
    }

    pub fn roles(roles: impl IntoIterator<Item = ColumnRole>) -> Self {
        Self::Roles(roles.into_iter().collect())
    }

    /// Matches every column.
    pub fn all() -> Self {
        Self::Types(ColumnTypeSet::any())
    }

    pub fn matches(&self, column: &ColumnSpecification) -> bool {
        match self {
            Self::NameContains(fragment) => column.name.contains(fragment.as_str()),
            Self::NameStartsWith(prefix) => column.name.starts_with(prefix.as_str()),
            Self::NameEndsWith(suffix) => column.name.ends_with(suffix.as_str()),
            Self::NameRegex { regex, .. } => regex.is_match(&column.name),
            Self::Types(types) => types.contains(column.column_type),
            Self::Roles(roles) => roles.contains(&column.column_role),
            Self::And(left, right) => left.matches(column) && right.matches(column),
            Self::Or(left, right) => left.matches(column) || right.matches(column),
            Self::Not(inner) => !inner.matches(column),
        }
    }
}

impl From<ColumnType> for ColumnSelector {
    fn from(column_type: ColumnType) -> Self {
        Self::Types(column_type.into())
    }
}

impl From<ColumnTypeSet> for ColumnSelector {
    fn from(types: ColumnTypeSet) -> Self {
        Self::Types(types)
    }
}

impl From<ColumnRole> for ColumnSelector {
    fn from(role: ColumnRole) -> Self {
        Self::Roles(vec![role])
    }
}

impl<T: Into<ColumnSelector>> BitAnd<T> for ColumnSelector {
    type Output = ColumnSelector;

    fn bitand(self, rhs: T) -> ColumnSelector {
        ColumnSelector::And(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<ColumnSelector>> BitOr<T> for ColumnSelector {
    type Output = ColumnSelector;

    fn bitor(self, rhs: T) -> ColumnSelector {
        ColumnSelector::Or(Box::new(self), Box::new(rhs.into()))
    }
}

impl Not for ColumnSelector {
    type Output = ColumnSelector;

    fn not(self) -> ColumnSelector {
        ColumnSelector::Not(Box::new(self))
    }
}

impl<T: Into<ColumnSelector>> BitAnd<T> for ColumnType {
    type Output = ColumnSelector;

    fn bitand(self, rhs: T) -> ColumnSelector {
        ColumnSelector::from(self) & rhs
    }
}

impl BitOr<ColumnSelector> for ColumnType {
    type Output = ColumnSelector;

    fn bitor(self, rhs: ColumnSelector) -> ColumnSelector {
        ColumnSelector::from(self) | rhs
    }
}

impl BitOr<ColumnRole> for ColumnType {
    type Output = ColumnSelector;

    fn bitor(self, rhs: ColumnRole) -> ColumnSelector {
        ColumnSelector::from(self) | rhs
    }
}

impl Not for ColumnType {
    type Output = ColumnSelector;

    fn not(self) -> ColumnSelector {
        ColumnSelector::Types(ColumnTypeSet::exclude([self]))
    }
}

impl<T: Into<ColumnSelector>> BitAnd<T> for ColumnRole {
    type Output = ColumnSelector;

    fn bitand(self, rhs: T) -> ColumnSelector {
        ColumnSelector::from(self) & rhs
    }
}

impl<T: Into<ColumnSelector>> BitOr<T> for ColumnRole {
    type Output = ColumnSelector;

    fn bitor(self, rhs: T) -> ColumnSelector {
        ColumnSelector::from(self) | rhs
    }
}

impl Not for ColumnRole {
    type Output = ColumnSelector;

    fn not(self) -> ColumnSelector {
        !ColumnSelector::from(self)
    }
}
