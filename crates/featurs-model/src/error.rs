use thiserror::Error;

/// Errors raised while resolving column selections against a schema.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A column was selected by name but is not part of the schema.
    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    /// Two columns with the same name were put into one schema.
    #[error("duplicate column: {name}")]
    DuplicateColumn { name: String },

    /// The schema has no column with the label role.
    #[error("schema has no label column")]
    NoLabelColumn,

    /// A name pattern failed to compile.
    #[error("invalid column name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, SelectionError>;
