use std::cmp::Ordering;
use std::sync::Arc;

use super::cost::range_index_cost;
use super::error::{IndexError, IndexResult};
use super::source::RowSource;
use super::{Cursor, Index, IndexKind};
use crate::record::{DataType, Row, RowKey, Value};

/// Index over the row keys of the driver itself.
///
/// The Scan variant walks every row; the PrimaryKey variant additionally
/// honors key bounds. Neither stores anything: keys are the contiguous
/// range [1, row_count].
#[derive(Debug)]
pub struct DriverIndex {
    name: String,
    kind: IndexKind,
    columns: Vec<usize>,
    source: Arc<RowSource>,
    cost_multiplier: f64,
}

impl DriverIndex {
    /// Row id index named `<table>_ROWID_`
    pub fn scan(table_name: &str, source: Arc<RowSource>, cost_multiplier: f64) -> Self {
        Self {
            name: format!("{table_name}_ROWID_"),
            kind: IndexKind::Scan,
            columns: Vec::new(),
            source,
            cost_multiplier,
        }
    }

    /// Primary key index over the key column at `column`
    pub fn primary_key(
        name: impl Into<String>,
        column: usize,
        source: Arc<RowSource>,
        cost_multiplier: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: IndexKind::PrimaryKey,
            columns: vec![column],
            source,
            cost_multiplier,
        }
    }

    /// Convert a key bound to a row key; NULL means unbounded
    fn key_bound(&self, bound: Option<&[Value]>) -> IndexResult<Option<i64>> {
        let Some(value) = bound.and_then(|values| values.first()) else {
            return Ok(None);
        };

        let column = self
            .columns
            .first()
            .and_then(|&c| self.source.columns().get(c))
            .map_or_else(|| self.name.clone(), |c| c.name.clone());

        match value.clone().coerce(DataType::BigInt) {
            Ok(Value::BigInt(key)) => Ok(Some(key)),
            Ok(_) => Ok(None),
            Err(source) => Err(IndexError::TypeCoercion { column, source }),
        }
    }
}

impl Index for DriverIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndexKind {
        self.kind
    }

    fn columns(&self) -> &[usize] {
        &self.columns
    }

    fn row_count(&self) -> u64 {
        self.source.row_count()
    }

    fn get_row(&self, key: RowKey) -> IndexResult<Row> {
        self.source.get_row(key)
    }

    fn find(
        &self,
        first: Option<&[Value]>,
        last: Option<&[Value]>,
    ) -> IndexResult<Box<dyn Cursor>> {
        if self.kind == IndexKind::Scan {
            return Ok(Box::new(DriverCursor::range(self.source.clone(), 1, None)));
        }

        let begin = self.key_bound(first)?.unwrap_or(1).max(1) as u64;
        let end = match self.key_bound(last)? {
            Some(end) => end.max(0) as u64,
            None => self.source.row_count(),
        };
        Ok(Box::new(DriverCursor::range(
            self.source.clone(),
            begin,
            Some(end),
        )))
    }

    fn find_first_or_last(&self, first: bool) -> IndexResult<Box<dyn Cursor>> {
        let position = if first { 0 } else { self.source.row_count() };
        Ok(Box::new(DriverCursor::at(self.source.clone(), position)))
    }

    fn cost(&self, masks: &[u8]) -> f64 {
        self.cost_multiplier * range_index_cost(masks, self.source.row_count(), true, true)
    }

    fn close(&mut self) -> IndexResult<()> {
        Ok(())
    }

    fn is_row_id_index(&self) -> bool {
        self.kind == IndexKind::Scan
    }

    fn needs_rebuild(&self) -> bool {
        false
    }

    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        a.key().cmp(&b.key())
    }
}

/// Cursor stepping through row keys.
///
/// The position starts one before `begin` and never exceeds the smaller of
/// `end` and the driver's current row count.
#[derive(Debug)]
pub struct DriverCursor {
    source: Arc<RowSource>,
    position: u64,
    begin: u64,
    end: Option<u64>,
}

impl DriverCursor {
    fn range(source: Arc<RowSource>, begin: u64, end: Option<u64>) -> Self {
        Self {
            source,
            position: begin - 1,
            begin,
            end,
        }
    }

    fn at(source: Arc<RowSource>, position: u64) -> Self {
        Self {
            source,
            position,
            begin: 1,
            end: None,
        }
    }
}

impl Cursor for DriverCursor {
    fn next(&mut self) -> bool {
        let limit = self
            .end
            .map_or(self.source.row_count(), |end| end.min(self.source.row_count()));

        if self.position < limit {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn previous(&mut self) -> bool {
        if self.position > self.begin {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    fn key(&self) -> Option<RowKey> {
        (self.position >= self.begin && self.position <= self.source.row_count())
            .then_some(self.position)
    }

    fn get(&self) -> IndexResult<Row> {
        let key = self.key().ok_or(IndexError::RowNotFound(self.position))?;
        self.source.get_row(key)
    }
}
