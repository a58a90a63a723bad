//! Configuration for the B-tree index.

use crate::common::{Error, Result};

/// Smallest legal minimum degree.
///
/// With `t = 2` every node holds 1 to 3 keys (a 2-3-4 tree).
pub const MIN_DEGREE_FLOOR: usize = 2;

/// Minimum degree used by `BTreeConfig::default()`.
///
/// Nodes hold between 5 and 11 keys.
pub const DEFAULT_MIN_DEGREE: usize = 6;

/// Capacity policy of a tree, fixed at construction.
///
/// # Capacity
/// For minimum degree `t`:
/// - every non-root node holds `t-1 ..= 2t-1` keys
/// - every internal non-root node has `t ..= 2t` children
/// - the root holds `0 ..= 2t-1` keys
///
/// # Example
/// ```
/// use btree_index::BTreeConfig;
///
/// let config = BTreeConfig::new(3).unwrap();
/// assert_eq!(config.max_keys(), 5);
/// assert_eq!(config.min_keys(), 2);
///
/// assert!(BTreeConfig::new(1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    min_degree: usize,
}

impl BTreeConfig {
    /// Create a config with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2`
    pub fn new(min_degree: usize) -> Result<Self> {
        if min_degree < MIN_DEGREE_FLOOR {
            return Err(Error::InvalidMinDegree(min_degree));
        }
        Ok(Self { min_degree })
    }

    /// The minimum degree `t`.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Most keys a node may hold (`2t-1`).
    #[inline]
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Fewest keys a non-root node may hold (`t-1`).
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// Most children an internal node may have (`2t`).
    #[inline]
    pub fn max_children(&self) -> usize {
        2 * self.min_degree
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}
