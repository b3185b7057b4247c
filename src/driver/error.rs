use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Cannot read file structure: {0}")]
    StructuralParse(String),

    #[error("Row {row_id} out of range: row count is {row_count}")]
    RowOutOfRange { row_id: u64, row_count: u64 },

    #[error("Field {column_id} out of range: field count is {field_count}")]
    FieldOutOfRange { column_id: u32, field_count: u32 },

    #[error("Driver is closed")]
    Closed,

    #[error("Unsupported driver operation: {0}")]
    Unsupported(String),
}

pub type DriverResult<T> = Result<T, DriverError>;
