//! Column types and roles.
//!
//! Every column in a schema carries exactly one [`ColumnType`] and one
//! [`ColumnRole`]. Transformer arguments declare the types they accept as a
//! [`ColumnTypeSet`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Boolean,
    /// Unordered categories.
    Nominal,
    /// Ordered categories, e.g. day of week.
    Ordinal,
    /// Free text.
    Text,
    Datetime,
}

impl ColumnType {
    /// Every column type, in declaration order.
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Numeric,
        ColumnType::Boolean,
        ColumnType::Nominal,
        ColumnType::Ordinal,
        ColumnType::Text,
        ColumnType::Datetime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Boolean => "boolean",
            ColumnType::Nominal => "nominal",
            ColumnType::Ordinal => "ordinal",
            ColumnType::Text => "text",
            ColumnType::Datetime => "datetime",
        }
    }

    /// Returns true for nominal and ordinal columns.
    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnType::Nominal | ColumnType::Ordinal)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" => Ok(ColumnType::Numeric),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "nominal" => Ok(ColumnType::Nominal),
            "ordinal" => Ok(ColumnType::Ordinal),
            "text" => Ok(ColumnType::Text),
            "datetime" => Ok(ColumnType::Datetime),
            _ => Err(format!("Unknown column type: {s}")),
        }
    }
}

/// Role a column plays in the dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Prediction target.
    Label,
    /// Entity key, e.g. a customer id.
    Identifier,
    /// Event timestamp used to order rows.
    TimeInfo,
    #[default]
    Feature,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Label => "label",
            ColumnRole::Identifier => "identifier",
            ColumnRole::TimeInfo => "time_info",
            ColumnRole::Feature => "feature",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "label" => Ok(ColumnRole::Label),
            "identifier" | "id" => Ok(ColumnRole::Identifier),
            "time_info" | "timeinfo" => Ok(ColumnRole::TimeInfo),
            "feature" => Ok(ColumnRole::Feature),
            _ => Err(format!("Unknown column role: {s}")),
        }
    }
}

/// A set of column types accepted by one transformer argument.
///
/// # Examples
///
/// ```
/// use featurs_model::{ColumnType, ColumnTypeSet};
///
/// let accepted = ColumnType::Numeric | ColumnType::Boolean;
/// assert!(accepted.contains(ColumnType::Boolean));
/// assert!(!accepted.contains(ColumnType::Text));
/// assert!(ColumnTypeSet::exclude([ColumnType::Text]).contains(ColumnType::Numeric));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnTypeSet(u8);

impl ColumnTypeSet {
    /// Accepts every column type.
    pub fn any() -> Self {
        Self::of(ColumnType::ALL)
    }

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn of(types: impl IntoIterator<Item = ColumnType>) -> Self {
        Self(types.into_iter().fold(0, |bits, t| bits | t.bit()))
    }

    /// Every type except the given ones.
    pub fn exclude(types: impl IntoIterator<Item = ColumnType>) -> Self {
        Self(Self::any().0 & !Self::of(types).0)
    }

    pub fn contains(&self, column_type: ColumnType) -> bool {
        self.0 & column_type.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: ColumnTypeSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = ColumnType> + '_ {
        ColumnType::ALL.into_iter().filter(|t| self.contains(*t))
    }
}

impl From<ColumnType> for ColumnTypeSet {
    fn from(column_type: ColumnType) -> Self {
        Self(column_type.bit())
    }
}

impl BitOr for ColumnType {
    type Output = ColumnTypeSet;

    fn bitor(self, rhs: ColumnType) -> ColumnTypeSet {
        ColumnTypeSet::from(self).union(rhs.into())
    }
}

impl BitOr<ColumnType> for ColumnTypeSet {
    type Output = ColumnTypeSet;

    fn bitor(self, rhs: ColumnType) -> ColumnTypeSet {
        self.union(rhs.into())
    }
}

impl BitOr for ColumnTypeSet {
    type Output = ColumnTypeSet;

    fn bitor(self, rhs: ColumnTypeSet) -> ColumnTypeSet {
        self.union(rhs)
    }
}

impl fmt::Display for ColumnTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::any() {
            return write!(f, "any");
        }
        let names: Vec<&str> = self.iter().map(|t| t.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
