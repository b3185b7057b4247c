use std::io;
use std::path::Path;
use std::sync::Arc;

use super::error::{TableError, TableResult};
use super::fallback::EmptyTable;
use super::file_table::{FileFingerprint, FileTable};
use super::TableAdapter;
use crate::config::EngineConfig;
use crate::driver::{DriverError, DriverFactory, DriverHandle, FileDriver};
use crate::record::{Column, SchemaDescriptor, unique_column_name};

/// Creates linked tables for the file format served by `F`
#[derive(Debug)]
pub struct TableFactory<F> {
    drivers: F,
    config: EngineConfig,
}

impl<F: DriverFactory> TableFactory<F> {
    pub fn new(drivers: F, config: EngineConfig) -> Self {
        Self { drivers, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn drivers(&self) -> &F {
        &self.drivers
    }

    /// Open the file named by `descriptor` as a table.
    ///
    /// A missing file is not an error: it is logged and an [`EmptyTable`]
    /// stands in. A descriptor without any location, a `file:` URL that
    /// does not name a local file, or a file whose structure cannot be
    /// read, fails.
    pub fn create_table(&self, descriptor: &SchemaDescriptor) -> TableResult<Box<dyn TableAdapter>> {
        let table_name = &descriptor.table_name;
        let path = descriptor
            .options
            .location()
            .map_err(|source| TableError::InvalidLocation {
                table: table_name.clone(),
                source,
            })?
            .ok_or_else(|| TableError::MissingLocation(table_name.clone()))?;

        if !path.exists() {
            return Ok(Box::new(self.fallback(descriptor, &path)));
        }

        let fingerprint = FileFingerprint::of(&path);
        let driver = match self.drivers.open(&path, &descriptor.options) {
            Ok(driver) => driver,
            Err(DriverError::FileNotFound(_)) => {
                return Ok(Box::new(self.fallback(descriptor, &path)));
            }
            // Removed between the existence check and the open
            Err(DriverError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Box::new(self.fallback(descriptor, &path)));
            }
            Err(DriverError::StructuralParse(reason)) => {
                return Err(TableError::StructuralParse {
                    table: table_name.clone(),
                    reason,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let (columns, key_column) = match self.table_columns(descriptor, &driver) {
            Ok(layout) => layout,
            Err(e) => {
                discard(table_name, driver);
                return Err(e);
            }
        };

        let handle = Arc::new(DriverHandle::new(path, Box::new(driver)));
        let table = FileTable::open(
            table_name.clone(),
            handle,
            columns,
            key_column,
            self.config.clone(),
            fingerprint,
        );
        tracing::info!(
            table = %table_name,
            path = %table.path().display(),
            rows = table.row_count(),
            columns = table.columns().len(),
            "Linked file table opened"
        );
        Ok(Box::new(table))
    }

    fn fallback(&self, descriptor: &SchemaDescriptor, path: &Path) -> EmptyTable {
        tracing::error!(
            table = %descriptor.table_name,
            path = %path.display(),
            "File not found, the table will be empty"
        );
        EmptyTable::new(
            descriptor.table_name.clone(),
            descriptor.columns.clone(),
            path,
        )
    }

    /// Final column list and key column position for a new table
    fn table_columns(
        &self,
        descriptor: &SchemaDescriptor,
        driver: &F::Driver,
    ) -> TableResult<(Vec<Column>, Option<usize>)> {
        let structural = |reason: String| TableError::StructuralParse {
            table: descriptor.table_name.clone(),
            reason,
        };

        if descriptor.is_derived() {
            let described = self
                .drivers
                .describe(driver)
                .map_err(|e| structural(e.to_string()))?;

            let key_name = unique_column_name(&self.config.key_column_name, &described);
            let mut columns = Vec::with_capacity(described.len() + 1);
            columns.push(Column::row_key(key_name));
            columns.extend(described.into_iter().map(|column| Column {
                primary_key: false,
                ..column
            }));
            return Ok((columns, Some(0)));
        }

        let columns = descriptor.columns.clone();
        let key_column = columns.first().filter(|c| c.is_row_key()).map(|_| 0);
        let data_columns = columns.len() - usize::from(key_column.is_some());
        let field_count = driver.field_count() as usize;
        if data_columns > field_count {
            return Err(structural(format!(
                "{data_columns} columns declared but the file has {field_count} fields"
            )));
        }
        Ok((columns, key_column))
    }
}

/// Close a driver that will not back a table
fn discard<D: FileDriver>(table_name: &str, mut driver: D) {
    if let Err(e) = driver.close() {
        tracing::error!(table = %table_name, error = %e, "Error while closing the file driver");
    }
}
