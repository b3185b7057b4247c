use thiserror::Error;

use super::node::NodeId;

/// Errors that can occur during B+ tree operations
#[derive(Debug, Clone, Error)]
pub enum BPlusTreeError {
    #[error("Invalid tree state: {0}")]
    InvalidState(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid order: {0} (must be >= 3)")]
    InvalidOrder(usize),

    #[error("Bulk load requires an empty tree")]
    NotEmpty,

    #[error("Bulk load input is not sorted at position {0}")]
    UnsortedInput(usize),
}

pub type BPlusTreeResult<T> = Result<T, BPlusTreeError>;
