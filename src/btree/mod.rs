//! B+ Tree used to materialize secondary indexes
//!
//! This module provides a B+ tree over any totally ordered key type, with
//! row keys as values. It supports:
//! - Duplicate keys (kept in insertion order)
//! - Ordered scans from any lower bound (via linked leaf nodes)
//! - Bottom-up bulk loading of sorted input
//!
//! Linked tables are read-only, so the tree only ever grows: an index is
//! built once and dropped as a whole.

mod error;
mod node;

pub use error::{BPlusTreeError, BPlusTreeResult};
pub use node::{BPlusNode, InternalNode, LeafNode, NodeId};

use crate::record::RowKey;

/// Default B+ tree order for in-memory secondary indexes
pub const DEFAULT_ORDER: usize = 128;

/// Location of one entry: a leaf and an offset into it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    leaf: NodeId,
    idx: usize,
}

/// B+ Tree data structure
///
/// Order `m` means:
/// - Internal nodes have at most `m` children
/// - Leaf nodes have at most `m-1` entries
#[derive(Debug, Clone)]
pub struct BPlusTree<K> {
    /// Root node ID (None if tree is empty)
    root: Option<NodeId>,

    /// Tree order (max children per internal node)
    order: usize,

    /// Node storage
    nodes: Vec<BPlusNode<K>>,

    /// First leaf node (for full range scans)
    first_leaf: Option<NodeId>,

    /// Total number of entries in the tree
    entry_count: usize,
}

impl<K> BPlusTree<K> {
    /// Get the tree order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Get number of entries in the tree
    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// Get a reference to a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&BPlusNode<K>> {
        self.nodes.get(id)
    }

    fn get_node_mut(&mut self, id: NodeId) -> Option<&mut BPlusNode<K>> {
        self.nodes.get_mut(id)
    }

    fn allocate_node(&mut self, node: BPlusNode<K>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Maximum entries in a leaf node
    fn max_leaf_entries(&self) -> usize {
        self.order - 1
    }

    /// Maximum children in an internal node
    fn max_internal_children(&self) -> usize {
        self.order
    }
}

impl<K: Ord + Clone> BPlusTree<K> {
    /// Create a new empty B+ tree with the given order
    ///
    /// # Arguments
    /// * `order` - The tree order (must be >= 3)
    pub fn new(order: usize) -> BPlusTreeResult<Self> {
        if order < 3 {
            return Err(BPlusTreeError::InvalidOrder(order));
        }

        Ok(Self {
            root: None,
            order,
            nodes: Vec::new(),
            first_leaf: None,
            entry_count: 0,
        })
    }

    /// Get tree height (1 for single leaf, 2+ for internal nodes)
    pub fn height(&self) -> usize {
        let Some(root_id) = self.root else {
            return 0;
        };

        let mut height = 1;
        let mut current = root_id;
        while let Some(BPlusNode::Internal(node)) = self.get_node(current) {
            match node.children.first() {
                Some(&child_id) => {
                    current = child_id;
                    height += 1;
                }
                None => break,
            }
        }
        height
    }

    // ========== Search Operations ==========

    /// Search for a key, returning the first matching row key
    pub fn search(&self, key: &K) -> Option<RowKey> {
        let leaf_id = self.find_leaf(key)?;
        self.get_node(leaf_id)?.as_leaf()?.search(key)
    }

    /// Iterate over all entries in key order
    pub fn iter(&self) -> BPlusTreeIter<'_, K> {
        BPlusTreeIter {
            tree: self,
            current_leaf: self.first_leaf,
            current_idx: 0,
        }
    }

    /// Iterate in key order starting at the first entry >= `key`
    pub fn iter_from(&self, key: &K) -> BPlusTreeIter<'_, K> {
        let current_leaf = self.find_leaf(key);
        let current_idx = current_leaf
            .and_then(|id| self.get_node(id))
            .and_then(|n| n.as_leaf())
            .map(|leaf| leaf.lower_bound(key))
            .unwrap_or(0);

        BPlusTreeIter {
            tree: self,
            current_leaf,
            current_idx,
        }
    }

    // ========== Positions ==========

    fn leaf(&self, id: NodeId) -> Option<&LeafNode<K>> {
        self.get_node(id)?.as_leaf()
    }

    /// Step over empty leaves and past-the-end offsets, forwards
    fn settle_forward(&self, mut leaf_id: NodeId, mut idx: usize) -> Option<Position> {
        loop {
            let leaf = self.leaf(leaf_id)?;
            if idx < leaf.len() {
                return Some(Position { leaf: leaf_id, idx });
            }
            leaf_id = leaf.next?;
            idx = 0;
        }
    }

    /// Position of the first entry
    pub fn first_position(&self) -> Option<Position> {
        self.settle_forward(self.first_leaf?, 0)
    }

    /// Position of the last entry
    pub fn last_position(&self) -> Option<Position> {
        let mut current = self.root?;
        let mut leaf_id = loop {
            match self.get_node(current)? {
                BPlusNode::Leaf(_) => break current,
                BPlusNode::Internal(node) => current = *node.children.last()?,
            }
        };
        loop {
            let leaf = self.leaf(leaf_id)?;
            if let Some(idx) = leaf.len().checked_sub(1) {
                return Some(Position { leaf: leaf_id, idx });
            }
            leaf_id = leaf.prev?;
        }
    }

    /// Position of the first entry >= `key`
    pub fn lower_bound_position(&self, key: &K) -> Option<Position> {
        let leaf_id = self.find_leaf(key)?;
        let idx = self.leaf(leaf_id)?.lower_bound(key);
        self.settle_forward(leaf_id, idx)
    }

    pub fn next_position(&self, position: Position) -> Option<Position> {
        self.settle_forward(position.leaf, position.idx + 1)
    }

    pub fn prev_position(&self, position: Position) -> Option<Position> {
        if position.idx > 0 {
            return Some(Position {
                leaf: position.leaf,
                idx: position.idx - 1,
            });
        }
        let mut leaf_id = self.leaf(position.leaf)?.prev?;
        loop {
            let leaf = self.leaf(leaf_id)?;
            if let Some(idx) = leaf.len().checked_sub(1) {
                return Some(Position { leaf: leaf_id, idx });
            }
            leaf_id = leaf.prev?;
        }
    }

    /// Entry at `position`
    pub fn entry(&self, position: Position) -> Option<(&K, RowKey)> {
        let leaf = self.leaf(position.leaf)?;
        Some((leaf.keys.get(position.idx)?, *leaf.values.get(position.idx)?))
    }

    /// Find the leaf node that should contain the given key
    fn find_leaf(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root?;

        loop {
            match self.get_node(current)? {
                BPlusNode::Leaf(_) => return Some(current),
                BPlusNode::Internal(node) => {
                    current = node.children[node.find_child_index(key)];
                }
            }
        }
    }

    /// Find the leaf an insert of `key` goes to, placing it after any equal
    /// keys, and the path from root to it
    fn find_insert_leaf(&self, key: &K) -> Option<(NodeId, Vec<(NodeId, usize)>)> {
        let mut current = self.root?;
        let mut path = Vec::new();

        loop {
            match self.get_node(current)? {
                BPlusNode::Leaf(_) => return Some((current, path)),
                BPlusNode::Internal(node) => {
                    let child_idx = node.insert_child_index(key);
                    path.push((current, child_idx));
                    current = node.children[child_idx];
                }
            }
        }
    }

    // ========== Insert Operations ==========

    /// Insert a key-value pair into the tree
    pub fn insert(&mut self, key: K, value: RowKey) -> BPlusTreeResult<()> {
        if self.root.is_none() {
            let mut leaf = LeafNode::new();
            leaf.insert(key, value);
            let leaf_id = self.allocate_node(BPlusNode::Leaf(leaf));
            self.root = Some(leaf_id);
            self.first_leaf = Some(leaf_id);
            self.entry_count = 1;
            return Ok(());
        }

        let (leaf_id, path) = self
            .find_insert_leaf(&key)
            .ok_or_else(|| BPlusTreeError::InvalidState("Could not find leaf".to_string()))?;

        let leaf_len = {
            let leaf = self
                .get_node_mut(leaf_id)
                .and_then(|n| n.as_leaf_mut())
                .ok_or(BPlusTreeError::NodeNotFound(leaf_id))?;
            leaf.insert(key, value);
            leaf.len()
        };

        self.entry_count += 1;

        if leaf_len > self.max_leaf_entries() {
            self.split_leaf(leaf_id, path)
        } else {
            self.update_ancestor_keys(leaf_id, &path)
        }
    }

    /// Split an overflowing leaf node
    fn split_leaf(&mut self, leaf_id: NodeId, path: Vec<(NodeId, usize)>) -> BPlusTreeResult<()> {
        let right_id = self.nodes.len();

        let (left_max_key, right_max_key, right) = {
            let leaf = self
                .get_node_mut(leaf_id)
                .and_then(|n| n.as_leaf_mut())
                .ok_or(BPlusTreeError::NodeNotFound(leaf_id))?;

            let mut right = leaf.split();
            right.prev = Some(leaf_id);
            leaf.next = Some(right_id);

            let left_max = leaf.max_key().cloned();
            let right_max = right.max_key().cloned();
            match (left_max, right_max) {
                (Some(left_max), Some(right_max)) => (left_max, right_max, right),
                _ => {
                    return Err(BPlusTreeError::InvalidState(
                        "Leaf split produced an empty half".to_string(),
                    ));
                }
            }
        };

        let after = right.next;
        self.allocate_node(BPlusNode::Leaf(right));
        if let Some(after_id) = after {
            self.get_node_mut(after_id)
                .and_then(|n| n.as_leaf_mut())
                .ok_or(BPlusTreeError::NodeNotFound(after_id))?
                .prev = Some(right_id);
        }
        self.insert_into_parent(path, leaf_id, left_max_key, right_id, right_max_key)
    }

    /// Insert a new child into the parent after a split
    fn insert_into_parent(
        &mut self,
        path: Vec<(NodeId, usize)>,
        left_id: NodeId,
        left_key: K,
        right_id: NodeId,
        right_key: K,
    ) -> BPlusTreeResult<()> {
        let Some(&(parent_id, child_idx)) = path.last() else {
            // Split the root - create new root
            let new_root = InternalNode::new(vec![left_key, right_key], vec![left_id, right_id]);
            let new_root_id = self.allocate_node(BPlusNode::Internal(new_root));
            self.root = Some(new_root_id);
            return Ok(());
        };
        let parent_path = path[..path.len() - 1].to_vec();

        let parent_len = {
            let parent = self
                .get_node_mut(parent_id)
                .and_then(|n| n.as_internal_mut())
                .ok_or(BPlusTreeError::NodeNotFound(parent_id))?;

            parent.keys[child_idx] = left_key;
            parent.keys.insert(child_idx + 1, right_key);
            parent.children.insert(child_idx + 1, right_id);
            parent.len()
        };

        if parent_len > self.max_internal_children() {
            self.split_internal(parent_id, parent_path)
        } else {
            // The right half may carry a new maximum for the whole subtree
            self.update_ancestor_keys(parent_id, &parent_path)
        }
    }

    /// Split an overflowing internal node
    fn split_internal(
        &mut self,
        node_id: NodeId,
        path: Vec<(NodeId, usize)>,
    ) -> BPlusTreeResult<()> {
        let (left_max_key, right_max_key, right_node) = {
            let node = self
                .get_node_mut(node_id)
                .and_then(|n| n.as_internal_mut())
                .ok_or(BPlusTreeError::NodeNotFound(node_id))?;

            let mid = node.len() / 2;
            let right_keys = node.keys.split_off(mid);
            let right_children = node.children.split_off(mid);

            let left_max = node.keys.last().cloned();
            let right_max = right_keys.last().cloned();
            match (left_max, right_max) {
                (Some(left_max), Some(right_max)) => (
                    left_max,
                    right_max,
                    InternalNode::new(right_keys, right_children),
                ),
                _ => {
                    return Err(BPlusTreeError::InvalidState(
                        "Internal split produced an empty half".to_string(),
                    ));
                }
            }
        };

        let right_id = self.allocate_node(BPlusNode::Internal(right_node));
        self.insert_into_parent(path, node_id, left_max_key, right_id, right_max_key)
    }

    /// Update ancestor keys after an insertion
    fn update_ancestor_keys(
        &mut self,
        node_id: NodeId,
        path: &[(NodeId, usize)],
    ) -> BPlusTreeResult<()> {
        let mut current_node = node_id;

        for &(parent_id, child_idx) in path.iter().rev() {
            let max_key = self
                .get_node(current_node)
                .and_then(|n| n.max_key())
                .cloned()
                .ok_or(BPlusTreeError::NodeNotFound(current_node))?;

            let parent = self
                .get_node_mut(parent_id)
                .and_then(|n| n.as_internal_mut())
                .ok_or(BPlusTreeError::NodeNotFound(parent_id))?;

            if parent.keys[child_idx] == max_key {
                break;
            }
            parent.keys[child_idx] = max_key;
            current_node = parent_id;
        }

        Ok(())
    }

    // ========== Bulk Loading ==========

    /// Build the tree bottom-up from entries sorted by key
    ///
    /// Leaves are packed full and linked left to right, then each internal
    /// level is packed from the maximum keys of the level below. The tree
    /// must be empty; later entries go through [`BPlusTree::insert`].
    pub fn bulk_load<I>(&mut self, entries: I) -> BPlusTreeResult<()>
    where
        I: IntoIterator<Item = (K, RowKey)>,
    {
        if !self.is_empty() {
            return Err(BPlusTreeError::NotEmpty);
        }

        let leaf_capacity = self.max_leaf_entries();
        let fan_out = self.max_internal_children();

        let mut level: Vec<(K, NodeId)> = Vec::new();
        let mut previous_leaf = None;
        let mut keys = Vec::with_capacity(leaf_capacity);
        let mut values = Vec::with_capacity(leaf_capacity);
        let mut count = 0;

        for (position, (key, value)) in entries.into_iter().enumerate() {
            let last = keys.last().or_else(|| level.last().map(|(k, _)| k));
            if last.is_some_and(|last| &key < last) {
                return Err(BPlusTreeError::UnsortedInput(position));
            }

            keys.push(key);
            values.push(value);
            count += 1;

            if keys.len() == leaf_capacity {
                let full_keys = std::mem::replace(&mut keys, Vec::with_capacity(leaf_capacity));
                let full_values =
                    std::mem::replace(&mut values, Vec::with_capacity(leaf_capacity));
                self.push_packed_leaf(&mut level, &mut previous_leaf, full_keys, full_values)?;
            }
        }
        if !keys.is_empty() {
            self.push_packed_leaf(&mut level, &mut previous_leaf, keys, values)?;
        }

        while level.len() > 1 {
            let mut parents = Vec::with_capacity(level.len().div_ceil(fan_out));
            let mut children = level.into_iter();

            loop {
                let chunk: Vec<(K, NodeId)> = children.by_ref().take(fan_out).collect();
                let Some(max_key) = chunk.last().map(|(k, _)| k.clone()) else {
                    break;
                };
                let (child_keys, child_ids): (Vec<K>, Vec<NodeId>) = chunk.into_iter().unzip();
                let id = self.allocate_node(BPlusNode::Internal(InternalNode::new(
                    child_keys, child_ids,
                )));
                parents.push((max_key, id));
            }

            level = parents;
        }

        self.root = level.pop().map(|(_, id)| id);
        self.entry_count = count;
        Ok(())
    }

    fn push_packed_leaf(
        &mut self,
        level: &mut Vec<(K, NodeId)>,
        previous_leaf: &mut Option<NodeId>,
        keys: Vec<K>,
        values: Vec<RowKey>,
    ) -> BPlusTreeResult<()> {
        let max_key = keys
            .last()
            .cloned()
            .ok_or_else(|| BPlusTreeError::InvalidState("Packed an empty leaf".to_string()))?;
        let mut leaf = LeafNode::with_entries(keys, values);
        leaf.prev = *previous_leaf;
        let leaf_id = self.allocate_node(BPlusNode::Leaf(leaf));

        match *previous_leaf {
            Some(previous_id) => {
                let previous = self
                    .get_node_mut(previous_id)
                    .and_then(|n| n.as_leaf_mut())
                    .ok_or(BPlusTreeError::NodeNotFound(previous_id))?;
                previous.next = Some(leaf_id);
            }
            None => self.first_leaf = Some(leaf_id),
        }

        *previous_leaf = Some(leaf_id);
        level.push((max_key, leaf_id));
        Ok(())
    }
}

/// Iterator over B+ tree entries
pub struct BPlusTreeIter<'a, K> {
    tree: &'a BPlusTree<K>,
    current_leaf: Option<NodeId>,
    current_idx: usize,
}

impl<'a, K> Iterator for BPlusTreeIter<'a, K> {
    type Item = (&'a K, RowKey);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let leaf_id = self.current_leaf?;
            let BPlusNode::Leaf(leaf) = tree.get_node(leaf_id)? else {
                return None;
            };

            if self.current_idx < leaf.keys.len() {
                let item = (&leaf.keys[self.current_idx], leaf.values[self.current_idx]);
                self.current_idx += 1;
                return Some(item);
            }

            // Move to next leaf
            self.current_leaf = leaf.next;
            self.current_idx = 0;
        }
    }
}
