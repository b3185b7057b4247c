use std::cmp::Ordering;
use std::sync::Arc;

use super::cost::range_index_cost;
use super::error::{IndexError, IndexResult};
use super::source::RowSource;
use super::{Cursor, Index, IndexKind};
use crate::btree::{BPlusTree, Position};
use crate::record::{Row, RowKey, Value};

/// Key of a secondary index entry: the indexed values, then the row key.
///
/// Including the row key makes every entry distinct, so equal values keep
/// row order across leaf splits.
#[derive(Debug, Clone)]
pub struct EntryKey {
    values: Vec<Value>,
    row: RowKey,
}

impl EntryKey {
    pub fn new(values: Vec<Value>, row: RowKey) -> Self {
        Self { values, row }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn row(&self) -> RowKey {
        self.row
    }
}

fn compare_values(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Compare the leading `prefix.len()` values only
fn compare_prefix(values: &[Value], prefix: &[Value]) -> Ordering {
    let len = prefix.len().min(values.len());
    compare_values(&values[..len], &prefix[..len])
}

impl Ord for EntryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(&self.values, &other.values).then(self.row.cmp(&other.row))
    }
}

impl PartialOrd for EntryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EntryKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EntryKey {}

/// Index materialized in memory, ordered by the values of its columns
#[derive(Debug)]
pub struct SecondaryIndex {
    name: String,
    kind: IndexKind,
    columns: Vec<usize>,
    /// Shared with open cursors; a write while one is open copies the tree
    tree: Arc<BPlusTree<EntryKey>>,
    source: Arc<RowSource>,
    cost_multiplier: f64,
}

impl SecondaryIndex {
    pub fn new(
        name: impl Into<String>,
        kind: IndexKind,
        columns: Vec<usize>,
        source: Arc<RowSource>,
        order: usize,
        cost_multiplier: f64,
    ) -> IndexResult<Self> {
        Ok(Self {
            name: name.into(),
            kind,
            columns,
            tree: Arc::new(BPlusTree::new(order)?),
            source,
            cost_multiplier,
        })
    }

    fn entry_for(&self, row: &Row) -> EntryKey {
        let values = self
            .columns
            .iter()
            .map(|&c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        EntryKey::new(values, row.key())
    }

    /// Whether an entry with exactly these values exists
    fn contains_values(&self, values: &[Value]) -> bool {
        let start = EntryKey::new(values.to_vec(), 0);
        self.tree
            .iter_from(&start)
            .next()
            .is_some_and(|(entry, _)| compare_values(&entry.values, values) == Ordering::Equal)
    }

    fn check_unique(&self, entries: &[EntryKey]) -> IndexResult<()> {
        if !self.kind.is_unique() {
            return Ok(());
        }

        for (i, entry) in entries.iter().enumerate() {
            // NULLs never collide
            if entry.values.iter().any(Value::is_null) {
                continue;
            }
            let repeated = i > 0
                && compare_values(&entries[i - 1].values, &entry.values) == Ordering::Equal;
            if repeated || self.contains_values(&entry.values) {
                let key = entry
                    .values
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(IndexError::DuplicateKey {
                    index: self.name.clone(),
                    key,
                });
            }
        }
        Ok(())
    }

    /// Add a batch of rows sorted with [`Index::compare_rows`].
    ///
    /// The first batch builds the tree bottom-up; later batches are inserted.
    pub fn add_sorted(&mut self, rows: Vec<Row>) -> IndexResult<()> {
        let entries: Vec<EntryKey> = rows.iter().map(|row| self.entry_for(row)).collect();
        self.check_unique(&entries)?;

        let tree = Arc::make_mut(&mut self.tree);
        if tree.is_empty() {
            tree.bulk_load(entries.into_iter().map(|entry| {
                    let row = entry.row;
                    (entry, row)
                }))?;
        } else {
            for entry in entries {
                let row = entry.row;
                tree.insert(entry, row)?;
            }
        }
        Ok(())
    }

    /// Coerce bound values to the types of the indexed columns
    fn coerce_bound(&self, bound: Option<&[Value]>) -> IndexResult<Option<Vec<Value>>> {
        let Some(values) = bound else {
            return Ok(None);
        };

        let columns = self.source.columns();
        let mut coerced = Vec::with_capacity(values.len());
        for (value, &position) in values.iter().zip(&self.columns) {
            let Some(column) = columns.get(position) else {
                break;
            };
            let value = value
                .clone()
                .coerce(column.data_type)
                .map_err(|source| IndexError::TypeCoercion {
                    column: column.name.clone(),
                    source,
                })?;
            coerced.push(value);
        }
        Ok((!coerced.is_empty()).then_some(coerced))
    }
}

impl Index for SecondaryIndex {
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
        self.tree.len() as u64
    }

    fn get_row(&self, key: RowKey) -> IndexResult<Row> {
        self.source.get_row(key)
    }

    fn find(
        &self,
        first: Option<&[Value]>,
        last: Option<&[Value]>,
    ) -> IndexResult<Box<dyn Cursor>> {
        let first = self.coerce_bound(first)?;
        let last = self.coerce_bound(last)?;
        Ok(Box::new(SecondaryCursor {
            source: self.source.clone(),
            tree: self.tree.clone(),
            first,
            last,
            position: None,
        }))
    }

    fn find_first_or_last(&self, first: bool) -> IndexResult<Box<dyn Cursor>> {
        let position = if first { None } else { self.tree.last_position() };
        Ok(Box::new(SecondaryCursor {
            source: self.source.clone(),
            tree: self.tree.clone(),
            first: None,
            last: None,
            position,
        }))
    }

    fn cost(&self, masks: &[u8]) -> f64 {
        self.cost_multiplier
            * range_index_cost(masks, self.row_count(), self.kind.is_unique(), false)
    }

    fn close(&mut self) -> IndexResult<()> {
        Ok(())
    }

    fn needs_rebuild(&self) -> bool {
        true
    }

    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        self.entry_for(a).cmp(&self.entry_for(b))
    }
}

/// Cursor walking the leaves of a secondary index between two bounds.
///
/// `None` is before the first entry. Once exhausted the cursor stays on the
/// last entry it returned.
#[derive(Debug)]
pub struct SecondaryCursor {
    source: Arc<RowSource>,
    tree: Arc<BPlusTree<EntryKey>>,
    first: Option<Vec<Value>>,
    last: Option<Vec<Value>>,
    position: Option<Position>,
}

impl SecondaryCursor {
    fn values_at(&self, position: Position) -> Option<&[Value]> {
        self.tree.entry(position).map(|(entry, _)| entry.values())
    }

    fn within_last(&self, position: Position) -> bool {
        match (&self.last, self.values_at(position)) {
            (Some(last), Some(values)) => compare_prefix(values, last) != Ordering::Greater,
            (None, values) => values.is_some(),
            (Some(_), None) => false,
        }
    }

    fn within_first(&self, position: Position) -> bool {
        match (&self.first, self.values_at(position)) {
            (Some(first), Some(values)) => compare_values(values, first) != Ordering::Less,
            (None, values) => values.is_some(),
            (Some(_), None) => false,
        }
    }
}

impl Cursor for SecondaryCursor {
    fn next(&mut self) -> bool {
        let candidate = match self.position {
            Some(position) => self.tree.next_position(position),
            None => match &self.first {
                Some(first) => self.tree.lower_bound_position(&EntryKey::new(first.clone(), 0)),
                None => self.tree.first_position(),
            },
        };

        match candidate {
            Some(position) if self.within_last(position) => {
                self.position = Some(position);
                true
            }
            _ => false,
        }
    }

    fn previous(&mut self) -> bool {
        let candidate = self
            .position
            .and_then(|position| self.tree.prev_position(position));

        match candidate {
            Some(position) if self.within_first(position) => {
                self.position = Some(position);
                true
            }
            _ => false,
        }
    }

    fn key(&self) -> Option<RowKey> {
        self.tree.entry(self.position?).map(|(_, row)| row)
    }

    fn get(&self) -> IndexResult<Row> {
        let key = self.key().ok_or(IndexError::RowNotFound(0))?;
        self.source.get_row(key)
    }
}
