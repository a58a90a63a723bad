//! B-tree node and the node-local algorithms.
//!
//! Ownership is a strict tree: every node owns its children in a `Vec` and
//! no node keeps a pointer to its parent. Repairs that involve a child and
//! its siblings (split, borrow, merge) are therefore methods on the parent,
//! which can see all of them at once.
//!
//! # Node Layout
//! ```text
//!            keys:     [ k0 | k1 | k2 ]
//!            values:   [ v0 | v1 | v2 ]
//!  children:  c0    c1    c2    c3          (internal nodes only)
//!
//!  all keys in c0 < k0 < all keys in c1 < k1 < ... < k2 < all keys in c3
//! ```
//!
//! The recursive operations may leave a node transiently out of bounds
//! (a parent one key short after a merge, a root with zero keys). The
//! [`BTree`](super::BTree) controller restores the root afterwards.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

use tracing::trace;

use crate::common::{BTreeConfig, Error, Result};
use crate::index::btree::stats::TreeStats;

/// Parameters threaded through the recursive node algorithms.
#[derive(Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub(crate) min_degree: usize,
    pub(crate) stats: &'a TreeStats,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(config: &BTreeConfig, stats: &'a TreeStats) -> Self {
        Self {
            min_degree: config.min_degree(),
            stats,
        }
    }

    #[inline]
    fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// A child can give up a key only if it holds at least `t` keys.
    #[inline]
    fn has_spare<K, V>(&self, node: &Node<K, V>) -> bool {
        node.len() >= self.min_degree
    }
}

/// Leaf or internal. Only internal nodes carry children.
#[derive(Debug)]
pub(crate) enum NodeKind<K, V> {
    Leaf,
    Internal { children: Vec<Node<K, V>> },
}

/// One node: parallel key and value arrays plus its shape.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) kind: NodeKind<K, V>,
}

impl<K, V> Node<K, V> {
    /// An empty leaf. This is the root of an empty tree.
    pub(crate) fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            kind: NodeKind::Leaf,
        }
    }

    /// An internal node with no keys yet.
    ///
    /// Used when the root grows: the old root becomes the only child and is
    /// split right away.
    pub(crate) fn with_children(children: Vec<Node<K, V>>) -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            kind: NodeKind::Internal { children },
        }
    }

    /// Number of keys.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub(crate) fn children(&self) -> Option<&[Node<K, V>]> {
        match &self.kind {
            NodeKind::Leaf => None,
            NodeKind::Internal { children } => Some(children),
        }
    }

    pub(crate) fn child(&self, i: usize) -> Option<&Node<K, V>> {
        self.children()?.get(i)
    }

    fn child_mut(&mut self, i: usize) -> Option<&mut Node<K, V>> {
        match &mut self.kind {
            NodeKind::Leaf => None,
            NodeKind::Internal { children } => children.get_mut(i),
        }
    }

    /// Detach the single child of a keyless internal node.
    ///
    /// Returns `None` for anything else, leaving the node untouched.
    pub(crate) fn take_only_child(&mut self) -> Option<Node<K, V>> {
        match &mut self.kind {
            NodeKind::Internal { children } if self.keys.is_empty() && children.len() == 1 => {
                children.pop()
            }
            _ => None,
        }
    }

    /// Smallest entry in this subtree.
    pub(crate) fn first(&self) -> Option<(&K, &V)> {
        let mut node = self;
        while let Some(child) = node.child(0) {
            node = child;
        }
        Some((node.keys.first()?, node.values.first()?))
    }

    /// Largest entry in this subtree.
    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        let mut node = self;
        while let Some(child) = node.children().and_then(|c| c.last()) {
            node = child;
        }
        Some((node.keys.last()?, node.values.last()?))
    }

    fn remove_entry_at(&mut self, idx: usize) -> (K, V) {
        (self.keys.remove(idx), self.values.remove(idx))
    }

    fn replace_entry_at(&mut self, idx: usize, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.keys[idx], key),
            mem::replace(&mut self.values[idx], value),
        )
    }
}

impl<K: Ord, V> Node<K, V> {
    // ========================================================================
    // Lookup
    // ========================================================================

    /// Smallest index `i` with `keys[i] >= key`, or `len()` if there is none.
    pub(crate) fn find_key_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.partition_point(|k| k.borrow() < key)
    }

    fn holds_at<Q>(&self, idx: usize, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.get(idx).is_some_and(|k| k.borrow() == key)
    }

    /// Find the value stored under `key` in this subtree.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self;
        loop {
            let idx = node.find_key_index(key);
            if node.holds_at(idx, key) {
                return node.values.get(idx);
            }
            // A leaf has no child to descend into: not found.
            node = node.child(idx)?;
        }
    }

    pub(crate) fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find_key_index(key);
        if self.holds_at(idx, key) {
            return self.values.get_mut(idx);
        }
        self.child_mut(idx)?.search_mut(key)
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert into a subtree whose root is not full.
    ///
    /// Full children are split on the way down, so the recursive call never
    /// lands on a full node. An existing key has its value replaced and the
    /// old value is returned.
    pub(crate) fn insert_nonfull(&mut self, key: K, value: V, cx: Ctx<'_>) -> Option<V> {
        let mut idx = self.find_key_index(&key);
        if self.holds_at(idx, &key) {
            return Some(mem::replace(&mut self.values[idx], value));
        }

        if self.is_leaf() {
            self.keys.insert(idx, key);
            self.values.insert(idx, value);
            return None;
        }

        if self.child(idx).is_some_and(|c| c.len() == cx.max_keys()) {
            self.split_child(idx, cx);
            // The promoted median now sits at keys[idx].
            match key.cmp(&self.keys[idx]) {
                Ordering::Equal => return Some(mem::replace(&mut self.values[idx], value)),
                Ordering::Greater => idx += 1,
                Ordering::Less => {}
            }
        }

        self.child_mut(idx)
            .and_then(|child| child.insert_nonfull(key, value, cx))
    }

    /// Split the full child at `i` around its median.
    ///
    /// The lower `t-1` entries stay in `children[i]`, the upper `t-1` move to
    /// a new sibling at `children[i + 1]`, and the median moves up into this
    /// node at `keys[i]`. Internal children hand their upper `t` children to
    /// the sibling.
    pub(crate) fn split_child(&mut self, i: usize, cx: Ctx<'_>) {
        let t = cx.min_degree;
        let Node { keys, values, kind } = self;
        let NodeKind::Internal { children } = kind else {
            return;
        };

        let child = &mut children[i];
        let mut upper_keys = child.keys.split_off(t - 1);
        let mut upper_values = child.values.split_off(t - 1);
        let median_key = upper_keys.remove(0);
        let median_value = upper_values.remove(0);

        let sibling_kind = match &mut child.kind {
            NodeKind::Leaf => NodeKind::Leaf,
            NodeKind::Internal { children: grandchildren } => NodeKind::Internal {
                children: grandchildren.split_off(t),
            },
        };
        let sibling = Node {
            keys: upper_keys,
            values: upper_values,
            kind: sibling_kind,
        };

        trace!(
            target: "btree_index::node",
            index = i,
            left = child.len(),
            right = sibling.len(),
            leaf = sibling.is_leaf(),
            "split full child"
        );

        keys.insert(i, median_key);
        values.insert(i, median_value);
        children.insert(i + 1, sibling);
        TreeStats::bump(&cx.stats.splits);
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove `key` from this subtree, returning the removed entry.
    ///
    /// Before descending into a child that holds only `t-1` keys the child
    /// is topped up (borrow or merge), so the node we recurse into can
    /// always afford to lose a key. That repair happens even when the key
    /// turns out to be absent.
    pub(crate) fn delete<Q>(&mut self, key: &Q, cx: Ctx<'_>) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find_key_index(key);
        let found = self.holds_at(idx, key);

        match (found, self.is_leaf()) {
            (true, true) => Some(self.remove_entry_at(idx)),
            (true, false) => self.delete_from_internal(idx, key, cx),
            (false, true) => None,
            (false, false) => {
                let idx = self.fill_child(idx, cx);
                self.child_mut(idx)?.delete(key, cx)
            }
        }
    }

    /// `keys[idx]` is the key being deleted and this node is internal.
    ///
    /// Prefers the predecessor from the left subtree, then the successor
    /// from the right subtree, and merges the two children when neither
    /// has a key to spare.
    fn delete_from_internal<Q>(&mut self, idx: usize, key: &Q, cx: Ctx<'_>) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let left_spare = self.child(idx).is_some_and(|c| cx.has_spare(c));
        let right_spare = self.child(idx + 1).is_some_and(|c| cx.has_spare(c));

        if left_spare {
            let (pred_key, pred_value) = self.child_mut(idx)?.pop_last(cx)?;
            Some(self.replace_entry_at(idx, pred_key, pred_value))
        } else if right_spare {
            let (succ_key, succ_value) = self.child_mut(idx + 1)?.pop_first(cx)?;
            Some(self.replace_entry_at(idx, succ_key, succ_value))
        } else {
            self.merge_children(idx, cx);
            self.child_mut(idx)?.delete(key, cx)
        }
    }

    /// Remove the smallest entry of this subtree.
    pub(crate) fn pop_first(&mut self, cx: Ctx<'_>) -> Option<(K, V)> {
        if self.is_leaf() {
            if self.keys.is_empty() {
                return None;
            }
            return Some(self.remove_entry_at(0));
        }
        let idx = self.fill_child(0, cx);
        self.child_mut(idx)?.pop_first(cx)
    }

    /// Remove the largest entry of this subtree.
    pub(crate) fn pop_last(&mut self, cx: Ctx<'_>) -> Option<(K, V)> {
        if self.is_leaf() {
            let key = self.keys.pop()?;
            let value = self.values.pop()?;
            return Some((key, value));
        }
        let idx = self.fill_child(self.len(), cx);
        self.child_mut(idx)?.pop_last(cx)
    }

    /// Make sure `children[idx]` holds at least `t` keys.
    ///
    /// Tries, in order: borrow from the left sibling, borrow from the right
    /// sibling, merge with the right sibling, merge with the left sibling.
    /// Returns the index of the child now covering the original key range,
    /// which moves to `idx - 1` after a merge with the left sibling.
    fn fill_child(&mut self, idx: usize, cx: Ctx<'_>) -> usize {
        let Some(children) = self.children() else {
            return idx;
        };
        if children.len() < 2 || cx.has_spare(&children[idx]) {
            return idx;
        }

        let left_spare = idx > 0 && cx.has_spare(&children[idx - 1]);
        let has_right = idx + 1 < children.len();
        let right_spare = has_right && cx.has_spare(&children[idx + 1]);

        if left_spare {
            self.borrow_from_left(idx, cx);
            idx
        } else if right_spare {
            self.borrow_from_right(idx, cx);
            idx
        } else if has_right {
            self.merge_children(idx, cx);
            idx
        } else {
            self.merge_children(idx - 1, cx);
            idx - 1
        }
    }

    /// Rotate right: the left sibling's last entry moves up into
    /// `keys[idx - 1]` and the separator it displaces moves down to the
    /// front of `children[idx]`.
    fn borrow_from_left(&mut self, idx: usize, cx: Ctx<'_>) {
        let Node { keys, values, kind } = self;
        let NodeKind::Internal { children } = kind else {
            return;
        };
        let (front, back) = children.split_at_mut(idx);
        let (Some(left), Some(child)) = (front.last_mut(), back.first_mut()) else {
            return;
        };
        let (Some(up_key), Some(up_value)) = (left.keys.pop(), left.values.pop()) else {
            return;
        };

        let down_key = mem::replace(&mut keys[idx - 1], up_key);
        let down_value = mem::replace(&mut values[idx - 1], up_value);
        child.keys.insert(0, down_key);
        child.values.insert(0, down_value);

        if let (NodeKind::Internal { children: from }, NodeKind::Internal { children: to }) =
            (&mut left.kind, &mut child.kind)
        {
            if let Some(moved) = from.pop() {
                to.insert(0, moved);
            }
        }

        trace!(
            target: "btree_index::node",
            index = idx,
            child = child.len(),
            sibling = left.len(),
            "borrowed from left sibling"
        );
        TreeStats::bump(&cx.stats.borrows_left);
    }

    /// Rotate left: the right sibling's first entry moves up into
    /// `keys[idx]` and the separator it displaces moves down to the back of
    /// `children[idx]`.
    fn borrow_from_right(&mut self, idx: usize, cx: Ctx<'_>) {
        let Node { keys, values, kind } = self;
        let NodeKind::Internal { children } = kind else {
            return;
        };
        let (front, back) = children.split_at_mut(idx + 1);
        let (Some(child), Some(right)) = (front.last_mut(), back.first_mut()) else {
            return;
        };
        if right.keys.is_empty() {
            return;
        }

        let down_key = mem::replace(&mut keys[idx], right.keys.remove(0));
        let down_value = mem::replace(&mut values[idx], right.values.remove(0));
        child.keys.push(down_key);
        child.values.push(down_value);

        if let (NodeKind::Internal { children: from }, NodeKind::Internal { children: to }) =
            (&mut right.kind, &mut child.kind)
        {
            if !from.is_empty() {
                to.push(from.remove(0));
            }
        }

        trace!(
            target: "btree_index::node",
            index = idx,
            child = child.len(),
            sibling = right.len(),
            "borrowed from right sibling"
        );
        TreeStats::bump(&cx.stats.borrows_right);
    }

    /// Fold `keys[idx]` and `children[idx + 1]` into `children[idx]`.
    ///
    /// This node loses one key and one child; the right child is dropped.
    fn merge_children(&mut self, idx: usize, cx: Ctx<'_>) {
        let Node { keys, values, kind } = self;
        let NodeKind::Internal { children } = kind else {
            return;
        };
        if idx + 1 >= children.len() {
            return;
        }

        let right = children.remove(idx + 1);
        let separator_key = keys.remove(idx);
        let separator_value = values.remove(idx);

        let left = &mut children[idx];
        left.keys.push(separator_key);
        left.values.push(separator_value);
        left.keys.extend(right.keys);
        left.values.extend(right.values);
        if let (NodeKind::Internal { children: into }, NodeKind::Internal { children: from }) =
            (&mut left.kind, right.kind)
        {
            into.extend(from);
        }

        trace!(
            target: "btree_index::node",
            index = idx,
            merged = left.len(),
            parent = keys.len(),
            "merged children"
        );
        TreeStats::bump(&cx.stats.merges);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check every structural invariant of this subtree.
    ///
    /// `bounds` are the exclusive separators inherited from the ancestors.
    /// The depth of the first leaf reached is recorded in `leaf_depth` and
    /// every later leaf must match it. Returns the number of keys in the
    /// subtree.
    pub(crate) fn validate(
        &self,
        min_degree: usize,
        bounds: (Option<&K>, Option<&K>),
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize> {
        let violation = |what: String| Err(Error::InvariantViolation(what));
        let is_root = depth == 0;

        if self.keys.len() != self.values.len() {
            return violation(format!(
                "node at depth {depth} has {} keys but {} values",
                self.keys.len(),
                self.values.len()
            ));
        }
        if self.len() > 2 * min_degree - 1 {
            return violation(format!("node at depth {depth} overflows with {} keys", self.len()));
        }
        if !is_root && self.len() < min_degree - 1 {
            return violation(format!("node at depth {depth} underflows with {} keys", self.len()));
        }
        if self.keys.windows(2).any(|w| w[0] >= w[1]) {
            return violation(format!("keys at depth {depth} are not strictly increasing"));
        }

        let (lower, upper) = bounds;
        if let (Some(lower), Some(first)) = (lower, self.keys.first()) {
            if first <= lower {
                return violation(format!("key at depth {depth} not above its left separator"));
            }
        }
        if let (Some(upper), Some(last)) = (upper, self.keys.last()) {
            if last >= upper {
                return violation(format!("key at depth {depth} not below its right separator"));
            }
        }

        let children = match &self.kind {
            NodeKind::Leaf => {
                return match *leaf_depth {
                    Some(expected) if expected != depth => violation(format!(
                        "leaf at depth {depth}, expected all leaves at depth {expected}"
                    )),
                    _ => {
                        *leaf_depth = Some(depth);
                        Ok(self.len())
                    }
                };
            }
            NodeKind::Internal { children } => children,
        };

        if children.len() != self.len() + 1 {
            return violation(format!(
                "internal node at depth {depth} has {} keys but {} children",
                self.len(),
                children.len()
            ));
        }
        if is_root && self.keys.is_empty() {
            return violation("internal root has no keys".to_string());
        }

        let mut count = self.len();
        for (i, child) in children.iter().enumerate() {
            let lower = if i == 0 { lower } else { self.keys.get(i - 1) };
            let upper = if i == self.len() { upper } else { self.keys.get(i) };
            count += child.validate(min_degree, (lower, upper), depth + 1, leaf_depth)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(keys: &[i32]) -> Node<i32, i32> {
        Node {
            keys: keys.to_vec(),
            values: keys.iter().map(|k| k * 10).collect(),
            kind: NodeKind::Leaf,
        }
    }

    fn internal(keys: &[i32], children: Vec<Node<i32, i32>>) -> Node<i32, i32> {
        Node {
            keys: keys.to_vec(),
            values: keys.iter().map(|k| k * 10).collect(),
            kind: NodeKind::Internal { children },
        }
    }

    fn child_keys(node: &Node<i32, i32>) -> Vec<Vec<i32>> {
        node.children()
            .unwrap()
            .iter()
            .map(|c| c.keys.clone())
            .collect()
    }

    #[test]
    fn test_find_key_index() {
        let node = leaf(&[10, 20, 30]);
        assert_eq!(node.find_key_index(&5), 0);
        assert_eq!(node.find_key_index(&10), 0);
        assert_eq!(node.find_key_index(&15), 1);
        assert_eq!(node.find_key_index(&30), 2);
        assert_eq!(node.find_key_index(&35), 3);
        assert_eq!(leaf(&[]).find_key_index(&1), 0);
    }

    #[test]
    fn test_search_descends() {
        let node = internal(&[10], vec![leaf(&[5]), leaf(&[20, 30])]);
        assert_eq!(node.search(&10), Some(&100));
        assert_eq!(node.search(&30), Some(&300));
        assert_eq!(node.search(&25), None);
        assert_eq!(node.search(&1), None);
    }

    #[test]
    fn test_split_leaf_child() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut parent = Node::with_children(vec![leaf(&[1, 2, 3])]);

        parent.split_child(0, cx);

        assert_eq!(parent.keys, vec![2]);
        assert_eq!(parent.values, vec![20]);
        assert_eq!(child_keys(&parent), vec![vec![1], vec![3]]);
        assert!(parent.child(1).unwrap().is_leaf());
        assert_eq!(stats.snapshot().splits, 1);
    }

    #[test]
    fn test_split_internal_child() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let full = internal(
            &[10, 20, 30],
            vec![leaf(&[5]), leaf(&[15]), leaf(&[25]), leaf(&[35])],
        );
        let mut parent = Node::with_children(vec![full]);

        parent.split_child(0, cx);

        assert_eq!(parent.keys, vec![20]);
        let left = parent.child(0).unwrap();
        let right = parent.child(1).unwrap();
        assert_eq!(left.keys, vec![10]);
        assert_eq!(child_keys(left), vec![vec![5], vec![15]]);
        assert_eq!(right.keys, vec![30]);
        assert_eq!(child_keys(right), vec![vec![25], vec![35]]);
    }

    #[test]
    fn test_insert_nonfull_splits_on_the_way_down() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[1, 2, 3]), leaf(&[20])]);

        assert_eq!(node.insert_nonfull(4, 40, cx), None);

        assert_eq!(node.keys, vec![2, 10]);
        assert_eq!(child_keys(&node), vec![vec![1], vec![3, 4], vec![20]]);
    }

    #[test]
    fn test_insert_nonfull_upserts_promoted_median() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[1, 2, 3]), leaf(&[20])]);

        assert_eq!(node.insert_nonfull(2, 99, cx), Some(20));

        assert_eq!(node.keys, vec![2, 10]);
        assert_eq!(node.values, vec![99, 100]);
    }

    #[test]
    fn test_delete_borrows_from_left() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[1, 5]), leaf(&[20])]);

        assert_eq!(node.delete(&20, cx), Some((20, 200)));

        assert_eq!(node.keys, vec![5]);
        assert_eq!(child_keys(&node), vec![vec![1], vec![10]]);
        assert_eq!(stats.snapshot().borrows_left, 1);
    }

    #[test]
    fn test_delete_borrows_from_right() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5]), leaf(&[20, 30])]);

        assert_eq!(node.delete(&5, cx), Some((5, 50)));

        assert_eq!(node.keys, vec![20]);
        assert_eq!(node.values, vec![200]);
        assert_eq!(child_keys(&node), vec![vec![10], vec![30]]);
        assert_eq!(stats.snapshot().borrows_right, 1);
    }

    #[test]
    fn test_borrow_moves_grandchild() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let left = internal(&[2, 4], vec![leaf(&[1]), leaf(&[3]), leaf(&[5])]);
        let right = internal(&[20], vec![leaf(&[15]), leaf(&[25])]);
        let mut node = internal(&[10], vec![left, right]);

        assert_eq!(node.delete(&25, cx), Some((25, 250)));

        // [5] crossed over with the rotated key, then [25] merged into [15].
        assert_eq!(node.keys, vec![4]);
        let right = node.child(1).unwrap();
        assert_eq!(right.keys, vec![10]);
        assert_eq!(child_keys(right), vec![vec![5], vec![15, 20]]);
        assert_eq!(node.child(0).unwrap().children().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_merges_with_left_when_rightmost() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5]), leaf(&[20])]);

        assert_eq!(node.delete(&20, cx), Some((20, 200)));

        assert!(node.keys.is_empty());
        assert_eq!(child_keys(&node), vec![vec![5, 10]]);
        assert_eq!(stats.snapshot().merges, 1);

        let only = node.take_only_child().unwrap();
        assert_eq!(only.keys, vec![5, 10]);
        assert_eq!(only.values, vec![50, 100]);
    }

    #[test]
    fn test_delete_merges_with_right_first() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10, 20], vec![leaf(&[5]), leaf(&[15]), leaf(&[25])]);

        assert_eq!(node.delete(&15, cx), Some((15, 150)));

        // [15] has no spare neighbour and merges with [25], not [5].
        assert_eq!(node.keys, vec![10]);
        assert_eq!(child_keys(&node), vec![vec![5], vec![20, 25]]);
    }

    #[test]
    fn test_delete_miss_still_repairs() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5]), leaf(&[20])]);

        assert_eq!(node.delete(&30, cx), None);

        assert_eq!(child_keys(&node), vec![vec![5, 10, 20]]);
    }

    #[test]
    fn test_delete_internal_uses_predecessor() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5, 7]), leaf(&[20, 30])]);

        assert_eq!(node.delete(&10, cx), Some((10, 100)));

        assert_eq!(node.keys, vec![7]);
        assert_eq!(node.values, vec![70]);
        assert_eq!(child_keys(&node), vec![vec![5], vec![20, 30]]);
    }

    #[test]
    fn test_delete_internal_uses_successor() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5]), leaf(&[20, 30])]);

        assert_eq!(node.delete(&10, cx), Some((10, 100)));

        assert_eq!(node.keys, vec![20]);
        assert_eq!(child_keys(&node), vec![vec![5], vec![30]]);
    }

    #[test]
    fn test_delete_internal_merges_minimal_children() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5]), leaf(&[20])]);

        assert_eq!(node.delete(&10, cx), Some((10, 100)));

        assert!(node.keys.is_empty());
        assert_eq!(child_keys(&node), vec![vec![5, 20]]);
    }

    #[test]
    fn test_pop_first_and_last() {
        let stats = TreeStats::new();
        let cx = Ctx { min_degree: 2, stats: &stats };
        let mut node = internal(&[10], vec![leaf(&[5, 7]), leaf(&[20, 30])]);

        assert_eq!(node.first(), Some((&5, &50)));
        assert_eq!(node.last(), Some((&30, &300)));
        assert_eq!(node.pop_first(cx), Some((5, 50)));
        assert_eq!(node.pop_last(cx), Some((30, 300)));
        assert_eq!(node.first(), Some((&7, &70)));
        assert_eq!(node.last(), Some((&20, &200)));
        assert_eq!(Node::<i32, i32>::new_leaf().pop_first(cx), None);
    }

    #[test]
    fn test_validate_detects_violations() {
        let mut depth = None;
        let ok = internal(&[10], vec![leaf(&[5]), leaf(&[20])]);
        assert_eq!(ok.validate(2, (None, None), 0, &mut depth), Ok(3));

        let mut depth = None;
        let unsorted = leaf(&[3, 1]);
        assert!(unsorted.validate(2, (None, None), 0, &mut depth).is_err());

        let mut depth = None;
        let misplaced = internal(&[10], vec![leaf(&[5]), leaf(&[8])]);
        assert!(misplaced.validate(2, (None, None), 0, &mut depth).is_err());

        let mut depth = None;
        let uneven = internal(
            &[10],
            vec![leaf(&[5]), internal(&[20], vec![leaf(&[15]), leaf(&[25])])],
        );
        assert!(uneven.validate(2, (None, None), 0, &mut depth).is_err());

        let mut depth = None;
        let underfull = internal(&[10], vec![leaf(&[]), leaf(&[20])]);
        assert!(underfull.validate(2, (None, None), 0, &mut depth).is_err());
    }
}
