//! Read-only tables over linked external files.
//!
//! A [`FileDriver`] exposes the rows and fields of one file. The
//! [`TableFactory`] wraps a driver into a [`TableAdapter`] with a synthetic
//! row key column, a scan index and a primary key index; secondary indexes
//! are built in memory from a full scan. The [`Catalog`] keeps linked
//! tables together with a JSON [`Manifest`] to reopen them.

pub mod btree;
pub mod catalog;
pub mod config;
pub mod driver;
pub mod index;
pub mod record;
pub mod table;

pub use btree::{BPlusTree, BPlusTreeError, BPlusTreeResult};
pub use catalog::{Catalog, CatalogError, CatalogResult, Manifest, ManifestEntry, ReloadReport};
pub use config::{ConfigError, EngineConfig};
pub use driver::{
    DriverError, DriverFactory, DriverHandle, DriverResult, FileDriver, MemoryDriver,
    MemoryDriverFactory,
};
pub use index::{
    Cursor, Index, IndexError, IndexKind, IndexResult, ProgressListener, SecondaryIndexBuilder,
};
pub use record::{Column, DataType, FormatOptions, RecordError, Row, RowKey, SchemaDescriptor, Value};
pub use table::{
    EmptyTable, FileTable, IndexMode, IndexRequest, TableAdapter, TableError, TableFactory,
    TableResult,
};
