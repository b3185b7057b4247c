use std::path::{Path, PathBuf};

use super::error::{TableError, TableResult};
use super::{IndexRequest, TableAdapter};
use crate::index::{Index, IndexError, ProgressListener};
use crate::record::{Column, Row, RowKey};

/// Stand-in for a linked table whose file is missing.
///
/// Has no rows and no indexes, declines index creation and ignores writes,
/// so a catalog referencing it still loads.
#[derive(Debug)]
pub struct EmptyTable {
    name: String,
    columns: Vec<Column>,
    location: PathBuf,
}

impl EmptyTable {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            columns,
            location: location.into(),
        }
    }

    /// Where the missing file was expected
    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl TableAdapter for EmptyTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn row_count(&self) -> u64 {
        0
    }

    fn get_row(&self, key: RowKey) -> TableResult<Row> {
        Err(TableError::Index(IndexError::RowNotFound(key)))
    }

    fn add_row(&mut self, _row: &Row) -> TableResult<()> {
        Ok(())
    }

    fn remove_row(&mut self, _row: &Row) -> TableResult<()> {
        Ok(())
    }

    fn truncate(&mut self) -> TableResult<()> {
        Ok(())
    }

    fn check_support_alter(&self) -> TableResult<()> {
        Ok(())
    }

    fn add_index(
        &mut self,
        _request: &IndexRequest,
        _progress: Option<&mut dyn ProgressListener>,
    ) -> TableResult<Option<&dyn Index>> {
        Ok(None)
    }

    fn drop_index(&mut self, name: &str) -> TableResult<()> {
        Err(TableError::IndexNotFound(name.to_string()))
    }

    fn indexes(&self) -> &[Box<dyn Index>] {
        &[]
    }

    fn modification_id(&self) -> u64 {
        0
    }

    /// Stale once the missing file shows up
    fn is_stale(&self) -> bool {
        self.location.exists()
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn close(&mut self) {}
}
