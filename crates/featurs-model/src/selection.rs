//! User-facing column selection shapes.

use crate::column::ColumnSpecification;
use crate::enums::{ColumnRole, ColumnType, ColumnTypeSet};
use crate::selector::ColumnSelector;

/// What a pipeline operation should run on.
///
/// Built from names, types, roles, selectors or lists of those:
///
/// ```
/// use featurs_model::{ColumnRole, ColumnType, Selection};
///
/// let by_name: Selection = "AGE".into();
/// let by_type: Selection = ColumnType::Numeric.into();
/// let mixed: Selection = vec![Selection::from("AGE"), ColumnRole::Identifier.into()].into();
/// assert!(matches!(mixed, Selection::Many(ref items) if items.len() == 2));
/// # let _ = (by_name, by_type);
/// ```
#[derive(Debug, Clone)]
pub enum Selection {
    Name(String),
    Type(ColumnType),
    TypeSet(ColumnTypeSet),
    Role(ColumnRole),
    Selector(ColumnSelector),
    Many(Vec<Selection>),
}

impl Selection {
    /// Selects nothing.
    pub fn none() -> Self {
        Selection::Many(Vec::new())
    }
}

impl From<&str> for Selection {
    fn from(name: &str) -> Self {
        Selection::Name(name.to_string())
    }
}

impl From<String> for Selection {
    fn from(name: String) -> Self {
        Selection::Name(name)
    }
}

impl From<&String> for Selection {
    fn from(name: &String) -> Self {
        Selection::Name(name.clone())
    }
}

impl From<&ColumnSpecification> for Selection {
    fn from(column: &ColumnSpecification) -> Self {
        Selection::Name(column.name.clone())
    }
}

impl From<ColumnType> for Selection {
    fn from(column_type: ColumnType) -> Self {
        Selection::Type(column_type)
    }
}

impl From<ColumnTypeSet> for Selection {
    fn from(types: ColumnTypeSet) -> Self {
        Selection::TypeSet(types)
    }
}

impl From<ColumnRole> for Selection {
    fn from(role: ColumnRole) -> Self {
        Selection::Role(role)
    }
}

impl From<ColumnSelector> for Selection {
    fn from(selector: ColumnSelector) -> Self {
        Selection::Selector(selector)
    }
}

impl<T: Into<Selection>> From<Vec<T>> for Selection {
    fn from(items: Vec<T>) -> Self {
        Selection::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Selection>, const N: usize> From<[T; N]> for Selection {
    fn from(items: [T; N]) -> Self {
        Selection::Many(items.into_iter().map(Into::into).collect())
    }
}
