//! Linked tables
//!
//! A [`TableFactory`] turns a [`SchemaDescriptor`](crate::record::SchemaDescriptor)
//! into a [`TableAdapter`]: a [`FileTable`] reading through a driver, or an
//! [`EmptyTable`] when the file is missing.

mod error;
mod factory;
mod fallback;
mod file_table;
#[cfg(test)]
mod tests;

pub use error::{TableError, TableResult};
pub use factory::TableFactory;
pub use fallback::EmptyTable;
pub use file_table::{FileFingerprint, FileTable};

use serde::{Deserialize, Serialize};

use crate::index::{Index, IndexKind, ProgressListener};
use crate::record::{Column, Row, RowKey};

/// Whether an index request creates a new index or binds to a declared one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// Fail if an index with the same name exists
    #[default]
    Create,
    /// Return the existing index of that name, building it otherwise
    Attach,
}

/// Definition of an index to add to a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub name: String,
    pub columns: Vec<String>,
    pub kind: IndexKind,
    #[serde(skip)]
    pub mode: IndexMode,
}

impl IndexRequest {
    pub fn new(name: impl Into<String>, columns: &[&str], kind: IndexKind) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            kind,
            mode: IndexMode::Create,
        }
    }

    pub fn with_mode(mut self, mode: IndexMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Storage contract a linked table offers to the host engine.
///
/// Reads never touch the backing file beyond the driver; every write entry
/// point is either rejected or ignored.
pub trait TableAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn columns(&self) -> &[Column];

    fn row_count(&self) -> u64;

    fn row_count_approximation(&self) -> u64 {
        self.row_count()
    }

    fn get_row(&self, key: RowKey) -> TableResult<Row>;

    fn add_row(&mut self, row: &Row) -> TableResult<()>;

    fn remove_row(&mut self, row: &Row) -> TableResult<()>;

    fn truncate(&mut self) -> TableResult<()>;

    fn check_support_alter(&self) -> TableResult<()>;

    /// Add an index, filling it from the existing rows when needed.
    ///
    /// Returns `Ok(None)` when the table declines to index.
    fn add_index(
        &mut self,
        request: &IndexRequest,
        progress: Option<&mut dyn ProgressListener>,
    ) -> TableResult<Option<&dyn Index>>;

    /// Drop an index added through [`TableAdapter::add_index`]
    fn drop_index(&mut self, name: &str) -> TableResult<()>;

    fn indexes(&self) -> &[Box<dyn Index>];

    /// First index of kind Scan
    fn scan_index(&self) -> Option<&dyn Index> {
        self.indexes()
            .iter()
            .find(|index| index.kind() == IndexKind::Scan)
            .map(|index| &**index)
    }

    /// First unique index
    fn unique_index(&self) -> Option<&dyn Index> {
        self.indexes()
            .iter()
            .find(|index| index.kind().is_unique())
            .map(|index| &**index)
    }

    /// Incremented on every change of the index list
    fn modification_id(&self) -> u64;

    /// Whether the backing file changed since the table was opened
    fn is_stale(&self) -> bool;

    /// True for the stand-in used when the file is missing
    fn is_fallback(&self) -> bool {
        false
    }

    /// Release indexes and driver; calling it again does nothing
    fn close(&mut self);
}
