use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use url::Url;

use super::error::{RecordError, RecordResult};
use super::value::DataType;

/// Column definition of a linked table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
        }
    }

    /// Synthetic row key column: non-nullable BIGINT primary key
    pub fn row_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::BigInt,
            nullable: false,
            primary_key: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Whether this column can carry the synthesized row key
    pub fn is_row_key(&self) -> bool {
        self.primary_key && self.data_type.is_integer()
    }
}

/// Format arguments of a linked file.
///
/// The first argument is the file location, either a plain path or a
/// `file:` URI; every argument is handed to the driver unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatOptions {
    args: Vec<String>,
}

impl FormatOptions {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Options holding only a file location
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            args: vec![path.into().to_string_lossy().into_owned()],
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolve the file location.
    ///
    /// Plain paths are taken as they are. `file:` URLs are decoded to a
    /// local path; a URL naming another host is an error. `Ok(None)` means
    /// no location was given at all.
    pub fn location(&self) -> RecordResult<Option<PathBuf>> {
        let Some(raw) = self.args.first() else {
            return Ok(None);
        };
        if !raw.starts_with("file:") {
            return Ok(Some(PathBuf::from(raw)));
        }

        let invalid = |reason: String| RecordError::InvalidLocation {
            location: raw.clone(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        let path = url
            .to_file_path()
            .map_err(|()| invalid("not a local file path".to_string()))?;
        Ok(Some(path))
    }
}

/// Request to link a file as a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub table_name: String,
    /// Explicit columns; empty means derive them from the file
    #[serde(default)]
    pub columns: Vec<Column>,
    pub options: FormatOptions,
}

impl SchemaDescriptor {
    pub fn new(table_name: impl Into<String>, options: FormatOptions) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            options,
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn is_derived(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pick a column name based on `base` that no column already uses,
/// comparing case-insensitively: `PK`, then `PK2`, `PK3`, ...
pub fn unique_column_name(base: &str, columns: &[Column]) -> String {
    let taken = |candidate: &str| {
        columns
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(candidate))
    };

    if !taken(base) {
        return base.to_string();
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
