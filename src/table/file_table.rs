use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use ahash::AHashMap;

use super::error::{TableError, TableResult};
use super::{IndexMode, IndexRequest, TableAdapter};
use crate::config::EngineConfig;
use crate::driver::DriverHandle;
use crate::index::{
    DriverIndex, Index, IndexKind, ProgressListener, RowSource, SecondaryIndex,
    SecondaryIndexBuilder,
};
use crate::record::{Column, Row, RowKey};

/// Size and modification time of a file, used to detect rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileFingerprint {
    /// Fingerprint of the file at `path`, or `None` if it cannot be read
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Read-only table over an opened driver
pub struct FileTable {
    name: String,
    columns: Vec<Column>,
    /// Lowercased column name -> position
    column_lookup: AHashMap<String, usize>,
    source: Arc<RowSource>,
    indexes: Vec<Box<dyn Index>>,
    config: EngineConfig,
    modification_id: u64,
    fingerprint: Option<FileFingerprint>,
    closed: bool,
}

impl FileTable {
    /// Create the table and attach its scan index, plus the primary key
    /// index when `key_column` is set
    pub fn open(
        name: impl Into<String>,
        driver: Arc<DriverHandle>,
        columns: Vec<Column>,
        key_column: Option<usize>,
        config: EngineConfig,
        fingerprint: Option<FileFingerprint>,
    ) -> Self {
        let name = name.into();
        let column_lookup = columns
            .iter()
            .enumerate()
            .map(|(position, column)| (column.name.to_lowercase(), position))
            .collect();
        let source = Arc::new(RowSource::new(driver, columns.clone(), key_column));

        let mut table = Self {
            name,
            columns,
            column_lookup,
            source,
            indexes: Vec::new(),
            config,
            modification_id: 0,
            fingerprint,
            closed: false,
        };
        table.init();
        table
    }

    fn init(&mut self) {
        let multiplier = self.config.cost_multiplier;
        self.indexes.push(Box::new(DriverIndex::scan(
            &self.name,
            self.source.clone(),
            multiplier,
        )));

        if let Some(key) = self.source.key_column() {
            let index_name = format!("{}.{}_INDEX_", self.name, self.columns[key].name);
            self.indexes.push(Box::new(DriverIndex::primary_key(
                index_name,
                key,
                self.source.clone(),
                multiplier,
            )));
        }
    }

    /// Position of a column, matched case-insensitively
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_lookup.get(&name.to_lowercase()).copied()
    }

    pub fn path(&self) -> &Path {
        self.source.driver().path()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn unsupported(&self, operation: &'static str) -> TableError {
        TableError::UnsupportedWrite {
            table: self.name.clone(),
            operation,
        }
    }

    fn resolve_columns(&self, request: &IndexRequest) -> TableResult<Vec<usize>> {
        if request.columns.is_empty() {
            return Err(TableError::EmptyIndex(request.name.clone()));
        }

        request
            .columns
            .iter()
            .map(|name| {
                self.column_position(name)
                    .ok_or_else(|| TableError::ColumnNotFound(name.clone()))
            })
            .collect()
    }

    fn build_index(
        &self,
        request: &IndexRequest,
        positions: Vec<usize>,
        progress: Option<&mut dyn ProgressListener>,
    ) -> TableResult<SecondaryIndex> {
        let mut index = SecondaryIndex::new(
            request.name.clone(),
            request.kind,
            positions,
            self.source.clone(),
            self.config.btree_order,
            self.config.cost_multiplier,
        )?;

        if index.needs_rebuild() && self.row_count() > 0 {
            let scan = self
                .scan_index()
                .ok_or_else(|| TableError::Closed(self.name.clone()))?;

            let mut builder = SecondaryIndexBuilder::new(&self.name, self.config.max_memory_rows);
            if let Some(listener) = progress {
                builder = builder.with_progress(listener);
            }
            builder.rebuild(scan, &mut index)?;
        }

        Ok(index)
    }
}

impl TableAdapter for FileTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn row_count(&self) -> u64 {
        self.source.row_count()
    }

    fn get_row(&self, key: RowKey) -> TableResult<Row> {
        let index = self
            .indexes
            .iter()
            .find(|index| index.kind() == IndexKind::PrimaryKey)
            .map(|index| &**index)
            .or_else(|| self.scan_index())
            .ok_or_else(|| TableError::Closed(self.name.clone()))?;
        Ok(index.get_row(key)?)
    }

    fn add_row(&mut self, _row: &Row) -> TableResult<()> {
        Err(self.unsupported("add row"))
    }

    fn remove_row(&mut self, _row: &Row) -> TableResult<()> {
        Err(self.unsupported("remove row"))
    }

    fn truncate(&mut self) -> TableResult<()> {
        Err(self.unsupported("truncate"))
    }

    fn check_support_alter(&self) -> TableResult<()> {
        Err(self.unsupported("alter"))
    }

    fn add_index(
        &mut self,
        request: &IndexRequest,
        progress: Option<&mut dyn ProgressListener>,
    ) -> TableResult<Option<&dyn Index>> {
        if self.closed {
            return Err(TableError::Closed(self.name.clone()));
        }

        if let Some(position) = self
            .indexes
            .iter()
            .position(|index| index.name().eq_ignore_ascii_case(&request.name))
        {
            return match request.mode {
                IndexMode::Create => Err(TableError::IndexExists(request.name.clone())),
                IndexMode::Attach => Ok(Some(&*self.indexes[position])),
            };
        }

        let positions = self.resolve_columns(request)?;
        match request.kind {
            IndexKind::Scan => return Err(TableError::InvalidIndexKind(request.kind)),
            IndexKind::PrimaryKey => {
                if self
                    .indexes
                    .iter()
                    .any(|index| index.kind() == IndexKind::PrimaryKey)
                {
                    return Err(TableError::PrimaryKeyExists(self.name.clone()));
                }
            }
            IndexKind::Secondary { .. } => {}
        }

        if request.kind.is_unique() {
            if let Some(&nullable) = positions.iter().find(|&&p| self.columns[p].nullable) {
                return Err(TableError::NullableKeyColumn(
                    self.columns[nullable].name.clone(),
                ));
            }
        }

        let index = self.build_index(request, positions.clone(), progress)?;

        if request.kind == IndexKind::PrimaryKey {
            for &position in &positions {
                self.columns[position].primary_key = true;
            }
        }
        tracing::info!(
            table = %self.name,
            index = %request.name,
            entries = index.row_count(),
            "Index created on linked table"
        );
        self.indexes.push(Box::new(index));
        self.modification_id += 1;

        Ok(self.indexes.last().map(|index| &**index))
    }

    fn drop_index(&mut self, name: &str) -> TableResult<()> {
        let position = self
            .indexes
            .iter()
            .position(|index| index.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| TableError::IndexNotFound(name.to_string()))?;

        if !self.indexes[position].needs_rebuild() {
            return Err(TableError::BuiltInIndex(name.to_string()));
        }

        let mut index = self.indexes.remove(position);
        if let Err(e) = index.close() {
            tracing::error!(table = %self.name, index = %name, error = %e, "Error while closing index");
        }
        self.modification_id += 1;
        Ok(())
    }

    fn indexes(&self) -> &[Box<dyn Index>] {
        &self.indexes
    }

    fn modification_id(&self) -> u64 {
        self.modification_id
    }

    fn is_stale(&self) -> bool {
        FileFingerprint::of(self.path()) != self.fingerprint
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for index in &mut self.indexes {
            if let Err(e) = index.close() {
                tracing::error!(table = %self.name, index = %index.name(), error = %e, "Error while closing index");
            }
        }

        match self.source.driver().close() {
            Ok(_) => tracing::debug!(table = %self.name, "Linked table closed"),
            Err(e) => {
                tracing::error!(table = %self.name, error = %e, "Error while closing the file driver")
            }
        }
    }
}

impl Drop for FileTable {
    fn drop(&mut self) {
        self.close();
    }
}
