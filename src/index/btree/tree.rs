//! The tree controller: owns the root and handles height changes.

use std::borrow::Borrow;
use std::mem;

use tracing::debug;

use crate::common::{BTreeConfig, Error, Result};
use crate::index::btree::iter::{Iter, Keys, Values};
use crate::index::btree::node::{Ctx, Node};
use crate::index::btree::stats::TreeStats;

/// An in-memory B-tree mapping ordered keys to values.
///
/// The minimum degree `t` fixes the capacity of every node for the life of
/// the tree: non-root nodes hold `t-1 ..= 2t-1` keys, and all leaves sit at
/// the same depth.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ BTree                                        │
/// │   config (t)   len   stats                   │
/// │   root ──▶ Node { keys, values, kind }       │
/// │              kind = Leaf                     │
/// │                   | Internal { children }    │
/// └──────────────────────────────────────────────┘
/// ```
///
/// Height grows only when a full root is split, and shrinks only when the
/// root is left as a keyless internal node after a merge. The root is never
/// absent: an empty tree is a single leaf with no keys.
///
/// # Example
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// tree.insert(10, "ten");
/// tree.insert(20, "twenty");
///
/// assert_eq!(tree.search(&10), Some(&"ten"));
/// assert_eq!(tree.delete(&10), Some("ten"));
/// assert_eq!(tree.search(&10), None);
/// assert_eq!(tree.delete(&10), None);
/// ```
#[derive(Debug)]
pub struct BTree<K, V> {
    root: Node<K, V>,
    config: BTreeConfig,
    /// Number of keys stored.
    len: usize,
    stats: TreeStats,
}

impl<K: Ord, V> BTree<K, V> {
    /// Create an empty tree with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2`
    pub fn new(min_degree: usize) -> Result<Self> {
        Ok(Self::with_config(BTreeConfig::new(min_degree)?))
    }

    /// Create an empty tree from a validated config.
    pub fn with_config(config: BTreeConfig) -> Self {
        debug!(
            target: "btree_index::tree",
            min_degree = config.min_degree(),
            "created tree"
        );
        Self {
            root: Node::new_leaf(),
            config,
            len: 0,
            stats: TreeStats::new(),
        }
    }

    // ========================================================================
    // Public API: Lookup
    // ========================================================================

    /// Get the value stored under `key`, or `None` if it is absent.
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.search(key)
    }

    /// Get a mutable reference to the value stored under `key`.
    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.search_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// The entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.first()
    }

    /// The entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root.last()
    }

    // ========================================================================
    // Public API: Mutation
    // ========================================================================

    /// Insert `value` under `key`.
    ///
    /// If the key is already present its value is replaced and the old value
    /// is returned; the key count does not change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let cx = Ctx::new(&self.config, &self.stats);

        if self.root.len() == self.config.max_keys() {
            let old_root = mem::replace(&mut self.root, Node::new_leaf());
            self.root = Node::with_children(vec![old_root]);
            self.root.split_child(0, cx);
            TreeStats::bump(&self.stats.root_splits);
            debug!(
                target: "btree_index::tree",
                height = self.height(),
                "root split"
            );
        }

        let previous = self.root.insert_nonfull(key, value, cx);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Remove `key`, returning its value if it was present.
    ///
    /// Deleting an absent key is a no-op that returns `None`.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let cx = Ctx::new(&self.config, &self.stats);
        let removed = self.root.delete(key, cx);
        self.finish_removal(removed.is_some());
        removed.map(|(_, value)| value)
    }

    /// Remove and return the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let cx = Ctx::new(&self.config, &self.stats);
        let removed = self.root.pop_first(cx);
        self.finish_removal(removed.is_some());
        removed
    }

    /// Remove and return the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let cx = Ctx::new(&self.config, &self.stats);
        let removed = self.root.pop_last(cx);
        self.finish_removal(removed.is_some());
        removed
    }

    /// Remove every entry, leaving a single empty leaf root.
    pub fn clear(&mut self) {
        self.root = Node::new_leaf();
        self.len = 0;
    }

    /// Bookkeeping after any removal attempt.
    ///
    /// Runs even on a miss: the descent may have merged the root's only two
    /// children before discovering the key was absent.
    fn finish_removal(&mut self, removed: bool) {
        if removed {
            self.len -= 1;
        }
        if let Some(child) = self.root.take_only_child() {
            self.root = child;
            TreeStats::bump(&self.stats.root_collapses);
            debug!(
                target: "btree_index::tree",
                height = self.height(),
                "root collapsed"
            );
        }
    }

    // ========================================================================
    // Public API: Iteration
    // ========================================================================

    /// Iterate over entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    // ========================================================================
    // Public API: Shape and diagnostics
    // ========================================================================

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels. A tree with only a root leaf (even an empty one)
    /// has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(child) = node.child(0) {
            height += 1;
            node = child;
        }
        height
    }

    /// The minimum degree `t` this tree was built with.
    pub fn min_degree(&self) -> usize {
        self.config.min_degree()
    }

    pub fn config(&self) -> &BTreeConfig {
        &self.config
    }

    /// Structural counters (splits, borrows, merges, height changes).
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` naming the first broken invariant
    pub fn validate(&self) -> Result<()> {
        let mut leaf_depth = None;
        let count = self
            .root
            .validate(self.config.min_degree(), (None, None), 0, &mut leaf_depth)?;
        if count != self.len {
            return Err(Error::InvariantViolation(format!(
                "tree reports {} keys but holds {}",
                self.len, count
            )));
        }
        Ok(())
    }
}

impl<K: Ord, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::with_config(BTreeConfig::default())
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a BTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: Ord, V> Extend<(K, V)> for BTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}
