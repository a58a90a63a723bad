//! B-tree index implementation.
//!
//! # Components
//! - [`BTree`] - The tree controller: owns the root, grows and shrinks height
//! - `node` - Node layout plus search, split, borrow and merge
//! - [`Iter`] / [`Keys`] / [`Values`] - In-order iteration
//! - [`TreeStats`] - Structural statistics
//! - [`SharedBTree`] - Coarse-locked wrapper for multi-threaded use

mod iter;
mod node;
mod shared;
mod stats;
mod tree;

pub use iter::{Iter, Keys, Values};
pub use shared::SharedBTree;
pub use stats::{StatsSnapshot, TreeStats};
pub use tree::BTree;
