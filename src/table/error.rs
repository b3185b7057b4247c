use thiserror::Error;

use crate::driver::DriverError;
use crate::index::{IndexError, IndexKind};
use crate::record::RecordError;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("No file location given for table {0}")]
    MissingLocation(String),

    #[error("Invalid file location for table {table}: {source}")]
    InvalidLocation {
        table: String,
        #[source]
        source: RecordError,
    },

    #[error("Cannot read the structure of table {table}: {reason}")]
    StructuralParse { table: String, reason: String },

    #[error("Table {table} is read-only: {operation} is not supported on linked files")]
    UnsupportedWrite {
        table: String,
        operation: &'static str,
    },

    #[error("Column {0} not found")]
    ColumnNotFound(String),

    #[error("Column {0} must not be nullable")]
    NullableKeyColumn(String),

    #[error("Index {0} has no columns")]
    EmptyIndex(String),

    #[error("Cannot create an index of kind {0:?}")]
    InvalidIndexKind(IndexKind),

    #[error("Index {0} already exists")]
    IndexExists(String),

    #[error("Index {0} not found")]
    IndexNotFound(String),

    #[error("Index {0} belongs to the table and cannot be dropped")]
    BuiltInIndex(String),

    #[error("Table {0} already has a primary key")]
    PrimaryKeyExists(String),

    #[error("Table {0} is closed")]
    Closed(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

pub type TableResult<T> = Result<T, TableError>;
