use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use ahash::AHashMap;

use super::error::{DriverError, DriverResult};
use super::{DriverFactory, FileDriver};
use crate::record::{Column, FormatOptions, Value};

/// Driver over rows held in memory
#[derive(Debug, Clone)]
pub struct MemoryDriver {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl MemoryDriver {
    /// Create a driver; every row must have one value per column
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> DriverResult<Self> {
        if let Some((row_id, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DriverError::StructuralParse(format!(
                "row {} has {} fields, expected {}",
                row_id,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn row(&self, row_id: u64) -> DriverResult<&[Value]> {
        usize::try_from(row_id)
            .ok()
            .and_then(|idx| self.rows.get(idx))
            .map(Vec::as_slice)
            .ok_or(DriverError::RowOutOfRange {
                row_id,
                row_count: self.row_count(),
            })
    }
}

impl FileDriver for MemoryDriver {
    fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }

    fn field_count(&self) -> u32 {
        self.columns.len() as u32
    }

    fn estimated_row_size(&self, row_id: u64) -> u32 {
        self.row(row_id)
            .map(|row| row.iter().map(Value::estimated_size).sum::<usize>() as u32)
            .unwrap_or(0)
    }

    fn get_field(&self, row_id: u64, column_id: u32) -> DriverResult<Value> {
        let field_count = self.field_count();
        self.row(row_id)?
            .get(column_id as usize)
            .cloned()
            .ok_or(DriverError::FieldOutOfRange {
                column_id,
                field_count,
            })
    }

    fn insert_row(&mut self, values: &[Value]) -> DriverResult<()> {
        if values.len() != self.columns.len() {
            return Err(DriverError::StructuralParse(format!(
                "inserted row has {} fields, expected {}",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(values.to_vec());
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}

/// Factory handing out [`MemoryDriver`]s registered per file location.
///
/// Clones share the same registry, so content can be swapped after a
/// catalog took ownership of the factory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriverFactory {
    sources: Arc<RwLock<AHashMap<PathBuf, MemoryDriver>>>,
}

impl MemoryDriverFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the content served for `path`
    pub fn register(&self, path: impl Into<PathBuf>, driver: MemoryDriver) {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), driver);
    }
}

impl DriverFactory for MemoryDriverFactory {
    type Driver = MemoryDriver;

    fn open(&self, path: &Path, _options: &FormatOptions) -> DriverResult<MemoryDriver> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| {
                DriverError::StructuralParse(format!("no content registered for {}", path.display()))
            })
    }

    fn describe(&self, driver: &MemoryDriver) -> DriverResult<Vec<Column>> {
        Ok(driver.columns().to_vec())
    }
}
