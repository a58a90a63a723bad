//! Structural statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for structural changes made by the tree.
///
/// All fields are atomic so the counters can be bumped through a shared
/// reference from inside the recursive node algorithms, and read while a
/// [`SharedBTree`](crate::SharedBTree) is being used from several threads.
///
/// # Memory Ordering
/// `Ordering::Relaxed` everywhere. Counters are independent and only need
/// atomicity.
///
/// # Example
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// for k in 0..4 {
///     tree.insert(k, ());
/// }
/// assert_eq!(tree.stats().snapshot().root_splits, 1);
/// ```
#[derive(Debug, Default)]
pub struct TreeStats {
    /// Number of full nodes split into two (root splits included).
    pub splits: AtomicU64,

    /// Number of root splits. Each one adds a level.
    pub root_splits: AtomicU64,

    /// Number of rotations that moved an entry in from the left sibling.
    pub borrows_left: AtomicU64,

    /// Number of rotations that moved an entry in from the right sibling.
    pub borrows_right: AtomicU64,

    /// Number of sibling merges.
    pub merges: AtomicU64,

    /// Number of times an empty internal root was replaced by its child.
    /// Each one removes a level.
    pub root_collapses: AtomicU64,
}

impl TreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            splits: self.splits.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
            borrows_left: self.borrows_left.load(Ordering::Relaxed),
            borrows_right: self.borrows_right.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            root_collapses: self.root_collapses.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.splits.store(0, Ordering::Relaxed);
        self.root_splits.store(0, Ordering::Relaxed);
        self.borrows_left.store(0, Ordering::Relaxed);
        self.borrows_right.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
        self.root_collapses.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`TreeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub splits: u64,
    pub root_splits: u64,
    pub borrows_left: u64,
    pub borrows_right: u64,
    pub merges: u64,
    pub root_collapses: u64,
}

impl StatsSnapshot {
    /// Total rotations in either direction.
    pub fn borrows(&self) -> u64 {
        self.borrows_left + self.borrows_right
    }

    /// Net change in height since the counters were last reset.
    pub fn height_delta(&self) -> i64 {
        self.root_splits as i64 - self.root_collapses as i64
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {}, borrows: {}, merges: {}, height: {:+} }}",
            self.splits,
            self.borrows(),
            self.merges,
            self.height_delta()
        )
    }
}
