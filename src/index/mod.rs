//! Indexes over linked tables
//!
//! Every table carries a [`DriverIndex`] scan over its row keys and, when it
//! has a key column, a [`DriverIndex`] primary key view. Both read straight
//! through the driver. Other indexes are [`SecondaryIndex`]es materialized
//! in a B+ tree by the [`SecondaryIndexBuilder`].

pub mod cost;
mod driver_index;
mod error;
mod rebuild;
mod secondary;
mod source;

pub use driver_index::{DriverCursor, DriverIndex};
pub use error::{IndexError, IndexResult};
pub use rebuild::{ProgressListener, SecondaryIndexBuilder};
pub use secondary::{EntryKey, SecondaryCursor, SecondaryIndex};
pub use source::RowSource;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{Row, RowKey, Value};

/// Kind of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Scan,
    PrimaryKey,
    Secondary { unique: bool },
}

impl IndexKind {
    pub fn is_unique(&self) -> bool {
        matches!(
            self,
            IndexKind::PrimaryKey | IndexKind::Secondary { unique: true }
        )
    }
}

/// Position over the rows matched by an index lookup.
///
/// A fresh cursor sits before its first row; call [`Cursor::next`] first.
pub trait Cursor: Send {
    /// Step forward; false once exhausted
    fn next(&mut self) -> bool;

    /// Step backward; false at the first row
    fn previous(&mut self) -> bool;

    /// Key of the current row, if the cursor is on one
    fn key(&self) -> Option<RowKey>;

    /// Materialize the current row
    fn get(&self) -> IndexResult<Row>;
}

/// Read contract shared by every index of a linked table
pub trait Index: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> IndexKind;

    /// Positions of the indexed columns in the table
    fn columns(&self) -> &[usize];

    fn row_count(&self) -> u64;

    fn get_row(&self, key: RowKey) -> IndexResult<Row>;

    /// Cursor over the rows whose index key lies in `[first, last]`;
    /// a missing bound leaves that side open
    fn find(
        &self,
        first: Option<&[Value]>,
        last: Option<&[Value]>,
    ) -> IndexResult<Box<dyn Cursor>>;

    /// Cursor before the first row, or on the last row
    fn find_first_or_last(&self, first: bool) -> IndexResult<Box<dyn Cursor>>;

    /// Planner cost given one condition mask per indexed column
    /// (see [`cost`])
    fn cost(&self, masks: &[u8]) -> f64;

    fn add(&mut self, _row: &Row) -> IndexResult<()> {
        Err(IndexError::UnsupportedWrite {
            index: self.name().to_string(),
            operation: "add",
        })
    }

    fn remove(&mut self, _row: &Row) -> IndexResult<()> {
        Err(IndexError::UnsupportedWrite {
            index: self.name().to_string(),
            operation: "remove",
        })
    }

    fn truncate(&mut self) -> IndexResult<()> {
        Err(IndexError::UnsupportedWrite {
            index: self.name().to_string(),
            operation: "truncate",
        })
    }

    fn close(&mut self) -> IndexResult<()>;

    fn is_row_id_index(&self) -> bool {
        false
    }

    /// Whether the index must be filled from existing rows when created
    fn needs_rebuild(&self) -> bool;

    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering;
}
