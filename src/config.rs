//! Engine configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::btree::DEFAULT_ORDER;

/// Rows buffered per rebuild batch
pub const DEFAULT_MAX_MEMORY_ROWS: usize = 40_000;

/// Multiplier applied to driver index costs
pub const DEFAULT_COST_MULTIPLIER: f64 = 10.0;

/// Base name of the synthesized key column
pub const DEFAULT_KEY_COLUMN: &str = "PK";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings shared by every linked table of a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum rows held in memory per rebuild batch
    pub max_memory_rows: usize,
    /// Order of the B+ trees backing secondary indexes
    pub btree_order: usize,
    /// Scale of the scan and primary key index costs
    pub cost_multiplier: f64,
    /// Base name of the synthesized key column
    pub key_column_name: String,
}

impl EngineConfig {
    /// Read a JSON configuration file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_memory_rows(mut self, rows: usize) -> Self {
        self.max_memory_rows = rows;
        self
    }

    pub fn with_btree_order(mut self, order: usize) -> Self {
        self.btree_order = order;
        self
    }

    pub fn with_key_column_name(mut self, name: impl Into<String>) -> Self {
        self.key_column_name = name.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_memory_rows == 0 {
            return Err(ConfigError::Invalid("max_memory_rows must be > 0"));
        }
        if self.btree_order < 3 {
            return Err(ConfigError::Invalid("btree_order must be >= 3"));
        }
        if !(self.cost_multiplier.is_finite() && self.cost_multiplier > 0.0) {
            return Err(ConfigError::Invalid("cost_multiplier must be positive"));
        }
        if self.key_column_name.is_empty() {
            return Err(ConfigError::Invalid("key_column_name must not be empty"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_memory_rows: DEFAULT_MAX_MEMORY_ROWS,
            btree_order: DEFAULT_ORDER,
            cost_multiplier: DEFAULT_COST_MULTIPLIER,
            key_column_name: DEFAULT_KEY_COLUMN.to_string(),
        }
    }
}
