//! btree-index - An in-memory B-tree index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          btree-index                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        SharedBTree (index/btree/shared)                  │   │
//! │  │     one RwLock around every public operation             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        BTree (index/btree/tree)                          │   │
//! │  │   insert / search / delete, root split and collapse      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Node (index/btree/node)                           │   │
//! │  │   key search, split, borrow (rotate), merge              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (config, Error)
//! - [`index`] - Index structures (B-tree)
//!
//! # Quick Start
//! ```
//! use btree_index::BTree;
//!
//! // Minimum degree 2: every node holds 1 to 3 keys
//! let mut index = BTree::new(2).unwrap();
//! for (id, name) in [(10, "ten"), (20, "twenty"), (30, "thirty")] {
//!     index.insert(id, name);
//! }
//!
//! assert_eq!(index.search(&20), Some(&"twenty"));
//! index.delete(&20);
//! assert_eq!(index.search(&20), None);
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_MIN_DEGREE, MIN_DEGREE_FLOOR};
pub use common::{BTreeConfig, Error, Result};

pub use index::btree::{BTree, Iter, Keys, SharedBTree, StatsSnapshot, TreeStats, Values};
