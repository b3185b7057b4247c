use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{RecordError, RecordResult};

/// Declared semantic type of a linked-table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Boolean,
    Int,
    BigInt,
    Double,
    Varchar,
    Date,
    /// Well-known binary geometry
    Geometry,
    Blob,
}

impl DataType {
    /// Whether values of this type can serve as a row key
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int | DataType::BigInt)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Double => "DOUBLE",
            DataType::Varchar => "VARCHAR",
            DataType::Date => "DATE",
            DataType::Geometry => "GEOMETRY",
            DataType::Blob => "BLOB",
        };
        f.write_str(name)
    }
}

/// A single field value, as produced by a driver or held in a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    String(String),
    Date(NaiveDate),
    Geometry(Vec<u8>),
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Boolean),
            Value::Int(_) => Some(DataType::Int),
            Value::BigInt(_) => Some(DataType::BigInt),
            Value::Double(_) => Some(DataType::Double),
            Value::String(_) => Some(DataType::Varchar),
            Value::Date(_) => Some(DataType::Date),
            Value::Geometry(_) => Some(DataType::Geometry),
            Value::Blob(_) => Some(DataType::Blob),
        }
    }

    /// Integer view of INT and BIGINT values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(i64::from(*n)),
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(f64::from(*n)),
            Value::BigInt(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Approximate heap and inline footprint in bytes
    pub fn estimated_size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Date(_) => 4,
            Value::BigInt(_) | Value::Double(_) => 8,
            Value::String(s) => 24 + s.len(),
            Value::Geometry(b) | Value::Blob(b) => 24 + b.len(),
        }
    }

    /// Convert a raw value into the declared column type.
    ///
    /// NULL converts to NULL for every type. Every other combination either
    /// produces a value of `target` or a [`RecordError`]; this never panics.
    pub fn coerce(self, target: DataType) -> RecordResult<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }

        match target {
            DataType::Boolean => self.to_bool().map(Value::Bool),
            DataType::Int => {
                let n = self.to_i64(target)?;
                i32::try_from(n)
                    .map(Value::Int)
                    .map_err(|_| RecordError::OutOfRange {
                        expected: target,
                        value: n.to_string(),
                    })
            }
            DataType::BigInt => self.to_i64(target).map(Value::BigInt),
            DataType::Double => self.to_f64().map(Value::Double),
            DataType::Varchar => self.into_text().map(Value::String),
            DataType::Date => self.into_date().map(Value::Date),
            DataType::Geometry => match self {
                Value::Geometry(wkb) | Value::Blob(wkb) => Ok(Value::Geometry(wkb)),
                other => Err(other.mismatch(target)),
            },
            DataType::Blob => match self {
                Value::Blob(bytes) | Value::Geometry(bytes) => Ok(Value::Blob(bytes)),
                Value::String(s) => Ok(Value::Blob(s.into_bytes())),
                other => Err(other.mismatch(target)),
            },
        }
    }

    fn mismatch(&self, expected: DataType) -> RecordError {
        RecordError::TypeMismatch {
            expected,
            actual: self
                .data_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "NULL".to_string()),
        }
    }

    fn to_bool(&self) -> RecordResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::BigInt(n) => Ok(*n != 0),
            Value::Double(d) => Ok(*d != 0.0),
            // dBase logical fields use T/F and Y/N
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(true),
                "false" | "f" | "no" | "n" | "0" => Ok(false),
                _ => Err(RecordError::InvalidLiteral {
                    expected: DataType::Boolean,
                    value: s.clone(),
                }),
            },
            other => Err(other.mismatch(DataType::Boolean)),
        }
    }

    fn to_i64(&self, target: DataType) -> RecordResult<i64> {
        match self {
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Int(n) => Ok(i64::from(*n)),
            Value::BigInt(n) => Ok(*n),
            Value::Double(d) => {
                let rounded = d.round();
                // i64::MAX is not representable as f64; 2^63 is the first value past it
                if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                    return Err(RecordError::OutOfRange {
                        expected: target,
                        value: d.to_string(),
                    });
                }
                Ok(rounded as i64)
            }
            Value::String(s) => s.trim().parse().map_err(|_| RecordError::InvalidLiteral {
                expected: target,
                value: s.clone(),
            }),
            other => Err(other.mismatch(target)),
        }
    }

    fn to_f64(&self) -> RecordResult<f64> {
        match self {
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().map_err(|_| RecordError::InvalidLiteral {
                expected: DataType::Double,
                value: s.clone(),
            }),
            other => other
                .as_f64()
                .ok_or_else(|| other.mismatch(DataType::Double)),
        }
    }

    fn into_text(self) -> RecordResult<String> {
        match self {
            Value::String(s) => Ok(s),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(n) => Ok(n.to_string()),
            Value::BigInt(n) => Ok(n.to_string()),
            Value::Double(d) => Ok(d.to_string()),
            Value::Date(d) => Ok(d.format("%Y-%m-%d").to_string()),
            other => Err(other.mismatch(DataType::Varchar)),
        }
    }

    fn into_date(self) -> RecordResult<NaiveDate> {
        match self {
            Value::Date(d) => Ok(d),
            // ISO dates, or the compact YYYYMMDD form used by dBase files
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(s.trim(), "%Y%m%d"))
                .map_err(|_| RecordError::InvalidLiteral {
                    expected: DataType::Date,
                    value: s,
                }),
            other => Err(other.mismatch(DataType::Date)),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::BigInt(_) | Value::Double(_) => 2,
            Value::String(_) => 3,
            Value::Date(_) => 4,
            Value::Geometry(_) => 5,
            Value::Blob(_) => 6,
        }
    }

    /// Total order used for index keys.
    ///
    /// NULL sorts first. Numeric variants compare by value (exactly between
    /// integers, by IEEE total order once a DOUBLE is involved). Values of
    /// unrelated types order by type.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Geometry(a), Value::Geometry(b)) | (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a.total_cmp(&b),
                    _ => self.type_rank().cmp(&other.type_rank()),
                },
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Value::Geometry(wkb) => write!(f, "<geometry {} bytes>", wkb.len()),
            Value::Blob(bytes) => write!(f, "<blob {} bytes>", bytes.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::BigInt(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
