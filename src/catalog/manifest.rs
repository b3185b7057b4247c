use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::CatalogResult;
use crate::record::SchemaDescriptor;
use crate::table::IndexRequest;

/// Case-insensitive lookup key of a table name
pub(crate) fn table_key(name: &str) -> String {
    name.to_lowercase()
}

/// A linked table and the indexes declared on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub descriptor: SchemaDescriptor,
    #[serde(default)]
    pub indexes: Vec<IndexRequest>,
}

impl ManifestEntry {
    pub fn new(descriptor: SchemaDescriptor) -> Self {
        Self {
            descriptor,
            indexes: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.descriptor.table_name
    }
}

/// Persistent list of linked tables, stored as JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub tables: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let content = fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CatalogResult<()> {
        let content = serde_json::to_string_pretty(&self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn entry(&self, table_name: &str) -> Option<&ManifestEntry> {
        let key = table_key(table_name);
        self.tables
            .iter()
            .find(|entry| table_key(entry.table_name()) == key)
    }

    pub fn entry_mut(&mut self, table_name: &str) -> Option<&mut ManifestEntry> {
        let key = table_key(table_name);
        self.tables
            .iter_mut()
            .find(|entry| table_key(entry.table_name()) == key)
    }

    pub(crate) fn add(&mut self, descriptor: SchemaDescriptor) {
        self.tables.push(ManifestEntry::new(descriptor));
    }

    pub(crate) fn remove(&mut self, table_name: &str) -> Option<ManifestEntry> {
        let key = table_key(table_name);
        let position = self
            .tables
            .iter()
            .position(|entry| table_key(entry.table_name()) == key)?;
        Some(self.tables.remove(position))
    }
}
