use super::value::Value;

/// Row key: 1-based position of a row in the backing file
pub type RowKey = u64;

const MEMORY_ROW: usize = 40;
const MEMORY_ARRAY: usize = 24;
const MEMORY_POINTER: usize = 8;

/// A materialized row tagged with its key
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    key: RowKey,
    values: Vec<Value>,
    memory: usize,
}

impl Row {
    /// Create a row, estimating its memory from the values
    pub fn new(key: RowKey, values: Vec<Value>) -> Self {
        let payload = values.iter().map(Value::estimated_size).sum();
        Self::with_payload(key, values, payload)
    }

    /// Create a row whose payload size comes from the driver estimate
    pub fn with_payload(key: RowKey, values: Vec<Value>, payload: usize) -> Self {
        let memory = MEMORY_ROW + MEMORY_ARRAY + values.len() * MEMORY_POINTER + payload;
        Self {
            key,
            values,
            memory,
        }
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    /// Get the number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Estimated in-memory footprint in bytes
    pub fn memory(&self) -> usize {
        self.memory
    }
}
