use std::sync::Arc;

use super::error::{IndexError, IndexResult};
use crate::driver::DriverHandle;
use crate::record::{Column, Row, RowKey, Value};

/// Materializes table rows from the driver.
///
/// Shared by every index of a table. The key column, when present, is
/// synthesized from the row key; every other column maps to the driver
/// field of the same order.
#[derive(Debug)]
pub struct RowSource {
    driver: Arc<DriverHandle>,
    columns: Vec<Column>,
    key_column: Option<usize>,
    field_ids: Vec<u32>,
}

impl RowSource {
    pub fn new(driver: Arc<DriverHandle>, columns: Vec<Column>, key_column: Option<usize>) -> Self {
        let field_count = columns.len() - usize::from(key_column.is_some());
        let field_ids = (0..field_count as u32).collect();

        Self {
            driver,
            columns,
            key_column,
            field_ids,
        }
    }

    pub fn driver(&self) -> &Arc<DriverHandle> {
        &self.driver
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn key_column(&self) -> Option<usize> {
        self.key_column
    }

    pub fn row_count(&self) -> u64 {
        self.driver.row_count()
    }

    /// Read row `key` (1-based) and coerce every field to its column type
    pub fn get_row(&self, key: RowKey) -> IndexResult<Row> {
        if key == 0 || key > self.row_count() {
            return Err(IndexError::RowNotFound(key));
        }

        let (raw, payload) = self.driver.read_fields(key - 1, &self.field_ids)?;
        let mut raw = raw.into_iter();

        let mut values = Vec::with_capacity(self.columns.len());
        for (position, column) in self.columns.iter().enumerate() {
            let value = if Some(position) == self.key_column {
                Value::BigInt(key as i64)
            } else {
                raw.next().unwrap_or(Value::Null)
            };

            let value = value
                .coerce(column.data_type)
                .map_err(|source| IndexError::TypeCoercion {
                    column: column.name.clone(),
                    source,
                })?;
            values.push(value);
        }

        Ok(Row::with_payload(key, values, payload as usize))
    }
}
