//! Ordered, duplicate-free collections of column specifications.

use std::collections::HashSet;

use crate::column::ColumnSpecification;
use crate::enums::{ColumnRole, ColumnTypeSet};
use crate::error::{Result, SelectionError};
use crate::selection::Selection;
use crate::selector::ColumnSelector;

/// Ordered list of columns with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnSpecification>,
}

impl Schema {
    /// Builds a schema, rejecting duplicate column names.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::DuplicateColumn`] for the first repeated name.
    pub fn new(columns: Vec<ColumnSpecification>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SelectionError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnSpecification] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpecification> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpecification> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, column: &ColumnSpecification) -> bool {
        self.columns.contains(column)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns_of_type(&self, types: impl Into<ColumnTypeSet>) -> Vec<ColumnSpecification> {
        let types = types.into();
        self.filtered(|c| types.contains(c.column_type))
    }

    pub fn columns_of_role(&self, role: ColumnRole) -> Vec<ColumnSpecification> {
        self.filtered(|c| c.column_role == role)
    }

    pub fn columns_matching(&self, selector: &ColumnSelector) -> Vec<ColumnSpecification> {
        self.filtered(|c| selector.matches(c))
    }

    /// Returns the single label column.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoLabelColumn`] when no column has the label role.
    pub fn label_column(&self) -> Result<&ColumnSpecification> {
        self.columns
            .iter()
            .find(|c| c.column_role == ColumnRole::Label)
            .ok_or(SelectionError::NoLabelColumn)
    }

    /// Returns a new schema with `other` appended.
    ///
    /// # Errors
    ///
    /// Fails when both schemas share a column name.
    pub fn concat(&self, other: &Schema) -> Result<Schema> {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema::new(columns)
    }

    /// Returns a new schema without the named columns.
    pub fn without<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Schema {
        let names: HashSet<&str> = names.into_iter().collect();
        Schema {
            columns: self.filtered(|c| !names.contains(c.name.as_str())),
        }
    }

    /// Resolves a selection to concrete columns.
    ///
    /// Preserves schema order for predicate selections and selection order for
    /// lists; duplicates keep their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownColumn`] for a name not in the schema.
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<ColumnSpecification>> {
        let resolved = match selection {
            Selection::Name(name) => vec![
                self.column(name)
                    .cloned()
                    .ok_or_else(|| SelectionError::UnknownColumn { name: name.clone() })?,
            ],
            Selection::Type(column_type) => self.columns_of_type(*column_type),
            Selection::TypeSet(types) => self.columns_of_type(*types),
            Selection::Role(role) => self.columns_of_role(*role),
            Selection::Selector(selector) => self.columns_matching(selector),
            Selection::Many(items) => {
                let mut resolved = Vec::new();
                for item in items {
                    resolved.extend(self.resolve(item)?);
                }
                resolved
            }
        };
        Ok(unique_by_name(resolved))
    }

    fn filtered(&self, predicate: impl Fn(&ColumnSpecification) -> bool) -> Vec<ColumnSpecification> {
        self.columns.iter().filter(|c| predicate(c)).cloned().collect()
    }
}

fn unique_by_name(columns: Vec<ColumnSpecification>) -> Vec<ColumnSpecification> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .collect()
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a ColumnSpecification;
    type IntoIter = std::slice::Iter<'a, ColumnSpecification>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ColumnType;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnSpecification::numeric("a"),
            ColumnSpecification::numeric("b"),
            ColumnSpecification::text("c"),
            ColumnSpecification::boolean("y").with_role(ColumnRole::Label),
        ])
        .unwrap()
    }

    fn names(columns: &[ColumnSpecification]) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Schema::new(vec![
            ColumnSpecification::numeric("a"),
            ColumnSpecification::text("a"),
        ])
        .unwrap_err();
        assert!(matches!(err, SelectionError::DuplicateColumn { name } if name == "a"));
    }

    #[test]
    fn test_resolve_list_dedups_in_order() {
        let resolved = schema().resolve(&["a", "b", "a"].into()).unwrap();
        assert_eq!(names(&resolved), vec!["a", "b"]);
    }

    #[test]
    fn test_resolve_type_keeps_schema_order() {
        let resolved = schema()
            .resolve(&vec![Selection::from("b"), ColumnType::Numeric.into()].into())
            .unwrap();
        assert_eq!(names(&resolved), vec!["b", "a"]);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let err = schema().resolve(&"missing".into()).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownColumn { name } if name == "missing"));
    }

    #[test]
    fn test_resolve_empty_selection() {
        assert!(schema().resolve(&Selection::none()).unwrap().is_empty());
        assert!(schema().resolve(&ColumnType::Datetime.into()).unwrap().is_empty());
    }

    #[test]
    fn test_label_column() {
        assert_eq!(schema().label_column().unwrap().name, "y");
        assert!(matches!(
            Schema::empty().label_column(),
            Err(SelectionError::NoLabelColumn)
        ));
    }

    #[test]
    fn test_concat() {
        let extra = Schema::new(vec![ColumnSpecification::numeric("d")]).unwrap();
        let joined = schema().concat(&extra).unwrap();
        assert_eq!(joined.column_names(), vec!["a", "b", "c", "y", "d"]);
        assert!(schema().concat(&schema()).is_err());
    }

    #[test]
    fn test_without() {
        let reduced = schema().without(["b", "missing"]);
        assert_eq!(reduced.column_names(), vec!["a", "c", "y"]);
    }
}
