use thiserror::Error;

use crate::btree::BPlusTreeError;
use crate::driver::DriverError;
use crate::record::{RecordError, RowKey};

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index {index} is read-only: {operation} is not supported on linked files")]
    UnsupportedWrite {
        index: String,
        operation: &'static str,
    },

    #[error("Cannot convert value of column {column}: {source}")]
    TypeCoercion { column: String, source: RecordError },

    #[error("Row {0} not found")]
    RowNotFound(RowKey),

    #[error("Duplicate key {key} in unique index {index}")]
    DuplicateKey { index: String, key: String },

    #[error(
        "Rebuild of index {index} on table {table} streamed an unexpected row count ({remaining} remaining)"
    )]
    RebuildConsistency {
        table: String,
        index: String,
        remaining: i64,
    },

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("B+ tree error: {0}")]
    BPlusTree(#[from] BPlusTreeError),
}
