//! Access to the rows of an external file
//!
//! Format readers live outside this crate and plug in through
//! [`FileDriver`] (row and field access for one opened file) and
//! [`DriverFactory`] (opening a file and describing its columns).

mod error;
mod handle;
mod memory;

pub use error::{DriverError, DriverResult};
pub use handle::DriverHandle;
pub use memory::{MemoryDriver, MemoryDriverFactory};

use std::path::Path;

use crate::record::{Column, FormatOptions, Value};

/// Row and field accessor for one opened file.
///
/// Row ids are 0-based. Implementations must allow concurrent random reads.
pub trait FileDriver: Send + Sync {
    fn row_count(&self) -> u64;

    fn field_count(&self) -> u32;

    /// Approximate size in bytes of one row, used for memory accounting
    fn estimated_row_size(&self, row_id: u64) -> u32;

    fn get_field(&self, row_id: u64, column_id: u32) -> DriverResult<Value>;

    /// Append a row; only used by export paths, never by linked tables
    fn insert_row(&mut self, values: &[Value]) -> DriverResult<()>;

    fn close(&mut self) -> DriverResult<()>;
}

/// Opens drivers for one file format
pub trait DriverFactory: Send + Sync {
    type Driver: FileDriver + 'static;

    /// Open the file at `path`; `options` carries the full format arguments
    fn open(&self, path: &Path, options: &FormatOptions) -> DriverResult<Self::Driver>;

    /// Columns found in the file header, in field order
    fn describe(&self, driver: &Self::Driver) -> DriverResult<Vec<Column>>;
}
