use thiserror::Error;

use super::value::DataType;

/// Conversion failures between raw driver values and declared column types,
/// and unusable file locations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DataType, actual: String },

    #[error("Value {value} is out of range for {expected}")]
    OutOfRange { expected: DataType, value: String },

    #[error("Invalid {expected} literal: '{value}'")]
    InvalidLiteral { expected: DataType, value: String },

    #[error("Invalid file location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },
}

pub type RecordResult<T> = Result<T, RecordError>;
