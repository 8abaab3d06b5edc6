//! A lazy frame paired with the schema describing its columns.

use std::fmt;

use polars::prelude::{DataFrame, Expr, IntoLazy, LazyFrame, by_name};
use tracing::warn;

use featurs_model::{ColumnSpecification, ColumnType, Schema, Selection, SelectionError};

use crate::error::Result;

/// Input data of a pipeline.
///
/// The schema is the source of truth for column types and roles; the frame
/// may hold extra columns until [`Dataset::restricted_to_schema`] is applied.
#[derive(Clone)]
pub struct Dataset {
    frame: LazyFrame,
    schema: Schema,
}

impl Dataset {
    pub fn new(frame: LazyFrame, schema: Schema) -> Self {
        Self { frame, schema }
    }

    pub fn from_frame(frame: DataFrame, schema: Schema) -> Self {
        Self::new(frame.lazy(), schema)
    }

    /// Drops frame columns that the schema does not describe.
    ///
    /// # Errors
    ///
    /// Fails when the frame schema cannot be resolved.
    pub fn restricted_to_schema(mut self) -> Result<Self> {
        let frame_schema = self.frame.collect_schema()?;
        let mut outside: Vec<String> = frame_schema
            .iter_names()
            .filter(|name| self.schema.column(name.as_str()).is_none())
            .map(|name| name.to_string())
            .collect();
        if outside.is_empty() {
            return Ok(self);
        }
        outside.sort();
        warn!(
            columns = %outside.join(", "),
            "dropping columns not present in schema"
        );
        Ok(Self {
            frame: self.frame.drop(by_name(outside, false)),
            schema: self.schema,
        })
    }

    pub fn frame(&self) -> &LazyFrame {
        &self.frame
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    /// Appends `schema` to the dataset schema.
    ///
    /// # Errors
    ///
    /// Fails when a column name is already taken.
    pub fn with_schema(&self, schema: &Schema) -> Result<Self> {
        Ok(Self {
            frame: self.frame.clone(),
            schema: self.schema.concat(schema)?,
        })
    }

    pub fn with_columns(&self, columns: Vec<Expr>) -> Self {
        if columns.is_empty() {
            return self.clone();
        }
        Self {
            frame: self.frame.clone().with_columns(columns),
            schema: self.schema.clone(),
        }
    }

    /// Removes columns from both the frame and the schema.
    pub fn without_columns(&self, columns: &[ColumnSpecification]) -> Self {
        if columns.is_empty() {
            return self.clone();
        }
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        Self {
            frame: self.frame.clone().drop(by_name(names.clone(), false)),
            schema: self.schema.without(names),
        }
    }

    pub fn cached(&self) -> Self {
        Self {
            frame: self.frame.clone().cache(),
            schema: self.schema.clone(),
        }
    }

    /// Materializes the frame.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the compute engine.
    pub fn collect(&self) -> Result<DataFrame> {
        Ok(self.frame.clone().collect()?)
    }

    /// # Errors
    ///
    /// Fails when a selected name is not in the schema.
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<ColumnSpecification>> {
        Ok(self.schema.resolve(selection)?)
    }

    /// Resolves each selection to its own column list.
    ///
    /// # Errors
    ///
    /// Fails when a selected name is not in the schema.
    pub fn resolve_all(&self, selections: &[Selection]) -> Result<Vec<Vec<ColumnSpecification>>> {
        selections.iter().map(|s| self.resolve(s)).collect()
    }

    /// # Errors
    ///
    /// Fails when the column is not in the schema.
    pub fn column(&self, name: &str) -> Result<ColumnSpecification> {
        self.schema
            .column(name)
            .cloned()
            .ok_or_else(|| {
                SelectionError::UnknownColumn {
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn columns_of_type(&self, column_type: ColumnType) -> Vec<ColumnSpecification> {
        self.schema.columns_of_type(column_type)
    }

    /// # Errors
    ///
    /// Fails when no column has the label role.
    pub fn label_column(&self) -> Result<&ColumnSpecification> {
        Ok(self.schema.label_column()?)
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{col, df, lit};

    fn dataset() -> Dataset {
        let frame = df! {
            "A" => &[1i64, 2, 3],
            "B" => &["x", "y", "z"],
            "EXTRA" => &[true, false, true],
        }
        .unwrap();
        let schema = Schema::new(vec![
            ColumnSpecification::numeric("A"),
            ColumnSpecification::text("B"),
        ])
        .unwrap();
        Dataset::from_frame(frame, schema)
    }

    #[test]
    fn test_restricted_to_schema_drops_extra_columns() {
        let df = dataset().restricted_to_schema().unwrap().collect().unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_with_columns_and_schema() {
        let extra = Schema::new(vec![ColumnSpecification::numeric("A2")]).unwrap();
        let dataset = dataset()
            .with_columns(vec![(col("A") * lit(2)).alias("A2")])
            .with_schema(&extra)
            .unwrap();
        assert_eq!(dataset.num_columns(), 3);
        let df = dataset.without_columns(&[ColumnSpecification::text("B")]).collect().unwrap();
        assert!(df.column("A2").is_ok());
        assert!(df.column("B").is_err());
    }

    #[test]
    fn test_column_lookup() {
        assert_eq!(dataset().column("B").unwrap(), ColumnSpecification::text("B"));
        assert!(dataset().column("EXTRA").is_err());
    }
}
