use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use super::FileDriver;
use super::error::{DriverError, DriverResult};
use crate::record::Value;

/// Shared handle to an opened driver.
///
/// Readers go through the read lock and may run concurrently. Closing takes
/// the driver out under the write lock, so it happens at most once; a closed
/// handle reports zero rows and fails field reads with [`DriverError::Closed`].
pub struct DriverHandle {
    path: PathBuf,
    driver: RwLock<Option<Box<dyn FileDriver>>>,
}

impl DriverHandle {
    pub fn new(path: impl Into<PathBuf>, driver: Box<dyn FileDriver>) -> Self {
        Self {
            path: path.into(),
            driver: RwLock::new(Some(driver)),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Box<dyn FileDriver>>> {
        // Drivers hold no invariant a panicking reader could break
        self.driver.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_closed(&self) -> bool {
        self.read().is_none()
    }

    pub fn row_count(&self) -> u64 {
        self.read().as_ref().map_or(0, |d| d.row_count())
    }

    pub fn field_count(&self) -> u32 {
        self.read().as_ref().map_or(0, |d| d.field_count())
    }

    pub fn estimated_row_size(&self, row_id: u64) -> u32 {
        self.read()
            .as_ref()
            .map_or(0, |d| d.estimated_row_size(row_id))
    }

    pub fn get_field(&self, row_id: u64, column_id: u32) -> DriverResult<Value> {
        let guard = self.read();
        let driver = guard.as_ref().ok_or(DriverError::Closed)?;
        driver.get_field(row_id, column_id)
    }

    /// Read several fields of one row under a single lock acquisition,
    /// along with the driver's size estimate for the row
    pub fn read_fields(&self, row_id: u64, column_ids: &[u32]) -> DriverResult<(Vec<Value>, u32)> {
        let guard = self.read();
        let driver = guard.as_ref().ok_or(DriverError::Closed)?;

        let values = column_ids
            .iter()
            .map(|&column_id| driver.get_field(row_id, column_id))
            .collect::<DriverResult<Vec<_>>>()?;
        Ok((values, driver.estimated_row_size(row_id)))
    }

    /// Close the driver. Returns `Ok(false)` when it was already closed.
    pub fn close(&self) -> DriverResult<bool> {
        let taken = self
            .driver
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match taken {
            Some(mut driver) => driver.close().map(|()| true),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverHandle")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}
