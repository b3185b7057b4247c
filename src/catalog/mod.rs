//! Registry of linked tables
//!
//! The [`Catalog`] owns every open table and a [`Manifest`] of how each was
//! linked, so a saved manifest reopens the same tables with the same indexes.

mod manifest;

pub use manifest::{Manifest, ManifestEntry};

use manifest::table_key;

use ahash::AHashMap;
use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::driver::DriverFactory;
use crate::index::ProgressListener;
use crate::record::SchemaDescriptor;
use crate::table::{IndexMode, IndexRequest, TableAdapter, TableError, TableFactory};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Table {0} already exists")]
    TableExists(String),

    #[error("Table {0} not found")]
    TableNotFound(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Outcome of [`Catalog::reload_stale`]
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Tables replaced by a fresh version
    pub reloaded: Vec<String>,
    /// Tables kept as they were, with the error that stopped their reload
    pub failed: Vec<(String, CatalogError)>,
}

impl ReloadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Catalog<F: DriverFactory> {
    factory: TableFactory<F>,
    /// Lowercased table name -> table
    tables: AHashMap<String, Box<dyn TableAdapter>>,
    manifest: Manifest,
}

impl<F: DriverFactory> Catalog<F> {
    pub fn new(drivers: F, config: EngineConfig) -> CatalogResult<Self> {
        config.validate()?;
        Ok(Self {
            factory: TableFactory::new(drivers, config),
            tables: AHashMap::new(),
            manifest: Manifest::new(),
        })
    }

    /// Reopen every table of `manifest` and attach its declared indexes
    pub fn open(drivers: F, config: EngineConfig, manifest: Manifest) -> CatalogResult<Self> {
        let mut catalog = Self::new(drivers, config)?;

        for entry in &manifest.tables {
            let key = table_key(entry.table_name());
            if catalog.tables.contains_key(&key) {
                return Err(CatalogError::TableExists(entry.table_name().to_string()));
            }
            let table = catalog.load_table(entry)?;
            catalog.tables.insert(key, table);
        }
        catalog.manifest = manifest;

        tracing::info!(tables = catalog.tables.len(), "Catalog opened");
        Ok(catalog)
    }

    pub fn factory(&self) -> &TableFactory<F> {
        &self.factory
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Link a file as a new table
    pub fn link(&mut self, descriptor: SchemaDescriptor) -> CatalogResult<&dyn TableAdapter> {
        let key = table_key(&descriptor.table_name);
        if self.tables.contains_key(&key) {
            return Err(CatalogError::TableExists(descriptor.table_name));
        }

        let table = self.factory.create_table(&descriptor)?;
        self.manifest.add(descriptor);
        Ok(&**self.tables.entry(key).or_insert(table))
    }

    /// Add an index to a table and record it in the manifest.
    ///
    /// Returns whether the table now has the index; a table standing in for
    /// a missing file declines and nothing is recorded.
    pub fn create_index(
        &mut self,
        table_name: &str,
        request: &IndexRequest,
        progress: Option<&mut dyn ProgressListener>,
    ) -> CatalogResult<bool> {
        let table = self.table_mut(table_name)?;
        let created = table.add_index(request, progress)?.is_some();

        if created {
            if let Some(entry) = self.manifest.entry_mut(table_name) {
                if !entry
                    .indexes
                    .iter()
                    .any(|index| index.name.eq_ignore_ascii_case(&request.name))
                {
                    entry.indexes.push(request.clone().with_mode(IndexMode::Create));
                }
            }
        }
        Ok(created)
    }

    pub fn drop_index(&mut self, table_name: &str, index_name: &str) -> CatalogResult<()> {
        self.table_mut(table_name)?.drop_index(index_name)?;
        if let Some(entry) = self.manifest.entry_mut(table_name) {
            entry
                .indexes
                .retain(|index| !index.name.eq_ignore_ascii_case(index_name));
        }
        Ok(())
    }

    /// Close a table and forget it
    pub fn drop_table(&mut self, table_name: &str) -> CatalogResult<()> {
        let mut table = self
            .tables
            .remove(&table_key(table_name))
            .ok_or_else(|| CatalogError::TableNotFound(table_name.to_string()))?;
        table.close();
        self.manifest.remove(table_name);
        tracing::info!(table = %table_name, "Linked table dropped");
        Ok(())
    }

    /// Reopen every table whose file changed since it was opened, including
    /// empty stand-ins whose file has appeared.
    ///
    /// A table is replaced only once its new version is fully built; when
    /// that fails the previous table stays in place and the failure is
    /// reported, so the next call retries it.
    pub fn reload_stale(&mut self) -> ReloadReport {
        let mut stale: Vec<String> = self
            .tables
            .iter()
            .filter(|(_, table)| table.is_stale())
            .map(|(key, _)| key.clone())
            .collect();
        stale.sort();

        let mut report = ReloadReport::default();
        for key in stale {
            let loaded = match self.manifest.entry(&key) {
                Some(entry) => self.load_table(entry),
                None => Err(CatalogError::TableNotFound(key.clone())),
            };

            match loaded {
                Ok(table) => {
                    tracing::info!(table = %table.name(), rows = table.row_count(), "Linked table reloaded");
                    report.reloaded.push(table.name().to_string());
                    if let Some(mut old) = self.tables.insert(key, table) {
                        old.close();
                    }
                }
                Err(e) => {
                    let name = self
                        .tables
                        .get(&key)
                        .map_or_else(|| key.clone(), |table| table.name().to_string());
                    tracing::error!(table = %name, error = %e, "Failed to reload linked table");
                    report.failed.push((name, e));
                }
            }
        }
        report
    }

    pub fn table(&self, table_name: &str) -> CatalogResult<&dyn TableAdapter> {
        self.tables
            .get(&table_key(table_name))
            .map(|table| &**table)
            .ok_or_else(|| CatalogError::TableNotFound(table_name.to_string()))
    }

    pub fn table_mut(&mut self, table_name: &str) -> CatalogResult<&mut dyn TableAdapter> {
        match self.tables.get_mut(&table_key(table_name)) {
            Some(table) => Ok(&mut **table),
            None => Err(CatalogError::TableNotFound(table_name.to_string())),
        }
    }

    /// Names of the linked tables, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.values().map(|table| table.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> CatalogResult<()> {
        self.manifest.save(path)
    }

    pub fn close(&mut self) {
        for table in self.tables.values_mut() {
            table.close();
        }
    }

    fn load_table(&self, entry: &ManifestEntry) -> CatalogResult<Box<dyn TableAdapter>> {
        let mut table = self.factory.create_table(&entry.descriptor)?;
        for request in &entry.indexes {
            let request = request.clone().with_mode(IndexMode::Attach);
            table.add_index(&request, None)?;
        }
        Ok(table)
    }
}

impl<F: DriverFactory> Drop for Catalog<F> {
    fn drop(&mut self) {
        self.close();
    }
}
