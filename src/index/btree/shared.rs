//! A B-tree shareable across threads behind one coarse lock.

use std::borrow::Borrow;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BTreeConfig, Result};
use crate::index::btree::BTree;

/// A [`BTree`] guarded by a single reader-writer lock.
///
/// Every public operation takes the lock for its whole duration, so no
/// caller ever observes a node mid-split or mid-merge.
///
/// # Thread Safety
/// - `search`, `contains_key`, `len`, ...: shared lock, run in parallel
/// - `insert`, `delete`: exclusive lock, one at a time
///
/// For several reads that must see the same state, hold [`read`](Self::read)
/// across them.
///
/// # Usage
/// ```
/// use btree_index::SharedBTree;
/// use std::sync::Arc;
/// use std::thread;
///
/// let tree = Arc::new(SharedBTree::new(3).unwrap());
/// let writer = {
///     let tree = Arc::clone(&tree);
///     thread::spawn(move || {
///         for k in 0..100 {
///             tree.insert(k, k * 10);
///         }
///     })
/// };
/// writer.join().unwrap();
///
/// assert_eq!(tree.search(&42), Some(420));
/// assert_eq!(tree.len(), 100);
/// ```
#[derive(Debug)]
pub struct SharedBTree<K, V> {
    inner: RwLock<BTree<K, V>>,
}

impl<K: Ord, V> SharedBTree<K, V> {
    /// Create an empty shared tree with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2`
    pub fn new(min_degree: usize) -> Result<Self> {
        Ok(Self::from_tree(BTree::new(min_degree)?))
    }

    pub fn with_config(config: BTreeConfig) -> Self {
        Self::from_tree(BTree::with_config(config))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<K, V>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }

    // ========================================================================
    // Public API: Reads (shared lock)
    // ========================================================================

    /// Clone out the value stored under `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.inner.read().search(key).cloned()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Check every structural invariant under the shared lock.
    pub fn validate(&self) -> Result<()> {
        self.inner.read().validate()
    }

    // ========================================================================
    // Public API: Writes (exclusive lock)
    // ========================================================================

    /// Insert or replace, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    /// Remove `key`, returning its value if it was present.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().delete(key)
    }

    // ========================================================================
    // Public API: Guards
    // ========================================================================

    /// Hold the shared lock for a multi-step read.
    pub fn read(&self) -> RwLockReadGuard<'_, BTree<K, V>> {
        self.inner.read()
    }

    /// Hold the exclusive lock for a multi-step update.
    pub fn write(&self) -> RwLockWriteGuard<'_, BTree<K, V>> {
        self.inner.write()
    }

    pub fn into_inner(self) -> BTree<K, V> {
        self.inner.into_inner()
    }
}

impl<K: Ord, V> Default for SharedBTree<K, V> {
    fn default() -> Self {
        Self::from_tree(BTree::default())
    }
}
