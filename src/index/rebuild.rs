use super::Index;
use super::error::{IndexError, IndexResult};
use super::secondary::SecondaryIndex;
use crate::record::Row;

/// Observer of index rebuild progress
pub trait ProgressListener {
    /// Called once per streamed row and once when the rebuild completes
    fn on_progress(&mut self, index: &str, processed: u64, total: u64);

    /// Called with the size of every sorted batch added to the index
    fn on_batch(&mut self, _index: &str, _rows: usize) {}
}

/// Streams every row of a table into a freshly created secondary index.
///
/// Rows are buffered in batches of at most `max_memory_rows`, sorted by the
/// index ordering and added in one go. The scan must yield exactly as many
/// rows as the table reported up front, otherwise the rebuild fails with
/// [`IndexError::RebuildConsistency`] and the index must be discarded.
pub struct SecondaryIndexBuilder<'a> {
    table_name: &'a str,
    max_memory_rows: usize,
    progress: Option<&'a mut dyn ProgressListener>,
}

impl<'a> SecondaryIndexBuilder<'a> {
    pub fn new(table_name: &'a str, max_memory_rows: usize) -> Self {
        Self {
            table_name,
            max_memory_rows: max_memory_rows.max(1),
            progress: None,
        }
    }

    pub fn with_progress(mut self, listener: &'a mut dyn ProgressListener) -> Self {
        self.progress = Some(listener);
        self
    }

    pub fn rebuild(&mut self, scan: &dyn Index, index: &mut SecondaryIndex) -> IndexResult<()> {
        let total = scan.row_count();
        let mut remaining = i64::try_from(total).unwrap_or(i64::MAX);
        let batch_size = usize::try_from(total)
            .unwrap_or(usize::MAX)
            .clamp(1, self.max_memory_rows);

        let mut cursor = scan.find(None, None)?;
        let mut buffer = Vec::with_capacity(batch_size);
        let mut processed = 0u64;

        while cursor.next() {
            buffer.push(cursor.get()?);
            processed += 1;
            if let Some(listener) = self.progress.as_deref_mut() {
                listener.on_progress(index.name(), processed, total);
            }

            if buffer.len() >= batch_size {
                self.flush(index, &mut buffer)?;
                if self.progress.is_none() {
                    tracing::trace!(
                        table = self.table_name,
                        index = index.name(),
                        processed,
                        total,
                        "Index rebuild progress"
                    );
                }
            }
            remaining -= 1;
        }
        self.flush(index, &mut buffer)?;

        if let Some(listener) = self.progress.as_deref_mut() {
            listener.on_progress(index.name(), processed, total);
        }

        if remaining != 0 {
            return Err(IndexError::RebuildConsistency {
                table: self.table_name.to_string(),
                index: index.name().to_string(),
                remaining,
            });
        }

        Ok(())
    }

    fn flush(&mut self, index: &mut SecondaryIndex, buffer: &mut Vec<Row>) -> IndexResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        if let Some(listener) = self.progress.as_deref_mut() {
            listener.on_batch(index.name(), buffer.len());
        }

        buffer.sort_by(|a, b| index.compare_rows(a, b));
        let batch = std::mem::take(buffer);
        tracing::debug!(index = index.name(), rows = batch.len(), "Flushing rebuild batch");
        index.add_sorted(batch)
    }
}
