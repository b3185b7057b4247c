use crate::record::RowKey;

/// Node identifier (index into node storage)
pub type NodeId = usize;

/// Internal node: stores keys and child pointers
///
/// In this B+ tree variant:
/// - keys[i] is the maximum key in the subtree rooted at children[i]
/// - keys.len() == children.len()
#[derive(Debug, Clone)]
pub struct InternalNode<K> {
    /// Maximum key of each child subtree
    pub keys: Vec<K>,
    /// Child node IDs
    pub children: Vec<NodeId>,
}

impl<K: Ord> InternalNode<K> {
    /// Create a new internal node with given keys and children
    pub fn new(keys: Vec<K>, children: Vec<NodeId>) -> Self {
        debug_assert_eq!(keys.len(), children.len());
        Self { keys, children }
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the first child whose maximum key is >= `key`,
    /// or the last child when every subtree is smaller
    pub fn find_child_index(&self, key: &K) -> usize {
        let pos = self.keys.partition_point(|k| k < key);
        pos.min(self.keys.len().saturating_sub(1))
    }

    /// Index of the first child whose maximum key is > `key`, or the last
    /// child. Inserts descend here so equal keys land after the existing run.
    pub fn insert_child_index(&self, key: &K) -> usize {
        let pos = self.keys.partition_point(|k| k <= key);
        pos.min(self.keys.len().saturating_sub(1))
    }

    /// Get the maximum key in this node
    pub fn max_key(&self) -> Option<&K> {
        self.keys.last()
    }
}

/// Leaf node: stores key-value pairs, linked to next leaf
#[derive(Debug, Clone)]
pub struct LeafNode<K> {
    /// Keys (sorted)
    pub keys: Vec<K>,
    /// Row keys corresponding to keys
    pub values: Vec<RowKey>,
    /// Link to next leaf for range scans
    pub next: Option<NodeId>,
    /// Link to previous leaf for reverse scans
    pub prev: Option<NodeId>,
}

impl<K: Ord> LeafNode<K> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            next: None,
            prev: None,
        }
    }

    /// Create a leaf node with given entries
    pub fn with_entries(keys: Vec<K>, values: Vec<RowKey>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self {
            keys,
            values,
            next: None,
            prev: None,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert a key-value pair in sorted order.
    /// Equal keys keep insertion order.
    pub fn insert(&mut self, key: K, value: RowKey) {
        let pos = self.keys.partition_point(|k| k <= &key);
        self.keys.insert(pos, key);
        self.values.insert(pos, value);
    }

    /// Position of the first entry >= `key`
    pub fn lower_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Search for a key, return the first matching row key
    pub fn search(&self, key: &K) -> Option<RowKey> {
        let pos = self.lower_bound(key);
        match self.keys.get(pos) {
            Some(k) if k == key => Some(self.values[pos]),
            _ => None,
        }
    }

    /// Get the maximum key in this leaf
    pub fn max_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Get the minimum key in this leaf
    pub fn min_key(&self) -> Option<&K> {
        self.keys.first()
    }

    /// Split this leaf node, returning the new right sibling
    /// This node keeps the first half, new node gets the second half
    pub fn split(&mut self) -> LeafNode<K> {
        let mid = self.keys.len() / 2;

        let right_keys = self.keys.split_off(mid);
        let right_values = self.values.split_off(mid);

        let mut right = LeafNode::with_entries(right_keys, right_values);
        right.next = self.next.take();

        right
    }
}

impl<K: Ord> Default for LeafNode<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// B+ tree node (either internal or leaf)
#[derive(Debug, Clone)]
pub enum BPlusNode<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

impl<K: Ord> BPlusNode<K> {
    /// Get the maximum key in this node
    pub fn max_key(&self) -> Option<&K> {
        match self {
            BPlusNode::Internal(node) => node.max_key(),
            BPlusNode::Leaf(node) => node.max_key(),
        }
    }

    pub fn as_internal_mut(&mut self) -> Option<&mut InternalNode<K>> {
        match self {
            BPlusNode::Internal(node) => Some(node),
            BPlusNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode<K>> {
        match self {
            BPlusNode::Internal(_) => None,
            BPlusNode::Leaf(node) => Some(node),
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafNode<K>> {
        match self {
            BPlusNode::Internal(_) => None,
            BPlusNode::Leaf(node) => Some(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_node_insert_keeps_duplicates_in_order() {
        let mut leaf = LeafNode::new();

        leaf.insert(5, 1);
        leaf.insert(3, 2);
        leaf.insert(7, 3);
        leaf.insert(3, 4);

        assert_eq!(leaf.keys, vec![3, 3, 5, 7]);
        assert_eq!(leaf.values, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_leaf_node_search() {
        let mut leaf = LeafNode::new();

        leaf.insert(3, 10);
        leaf.insert(5, 11);
        leaf.insert(7, 12);

        assert_eq!(leaf.search(&5), Some(11));
        assert_eq!(leaf.search(&4), None);
        assert_eq!(leaf.search(&10), None);
        assert_eq!(leaf.lower_bound(&4), 1);
    }

    #[test]
    fn test_leaf_node_split() {
        let mut leaf = LeafNode::new();

        for i in 0..6 {
            leaf.insert(i, i as RowKey);
        }

        let right = leaf.split();

        assert_eq!(leaf.len(), 3);
        assert_eq!(right.len(), 3);
        assert_eq!(leaf.max_key(), Some(&2));
        assert_eq!(right.min_key(), Some(&3));
    }

    #[test]
    fn test_internal_node_find_child() {
        let node = InternalNode::new(vec![3, 7, 12], vec![0, 1, 2]);

        assert_eq!(node.find_child_index(&1), 0);
        assert_eq!(node.find_child_index(&3), 0);
        assert_eq!(node.find_child_index(&5), 1);
        assert_eq!(node.find_child_index(&7), 1);
        assert_eq!(node.find_child_index(&10), 2);
        assert_eq!(node.find_child_index(&15), 2); // > all, go to last child
    }

    #[test]
    fn test_internal_node_insert_child() {
        let node = InternalNode::new(vec![3, 7, 12], vec![0, 1, 2]);

        assert_eq!(node.insert_child_index(&1), 0);
        assert_eq!(node.insert_child_index(&3), 1);
        assert_eq!(node.insert_child_index(&7), 2);
        assert_eq!(node.insert_child_index(&12), 2);
        assert_eq!(node.insert_child_index(&15), 2);
    }
}
