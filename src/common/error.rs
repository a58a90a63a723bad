//! Error types for the B-tree index.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in the index.
///
/// Lookups and deletions of absent keys are not errors; they return `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The minimum degree is below 2.
    ///
    /// A tree with `t < 2` cannot keep its node capacity bounds, so
    /// construction is refused.
    #[error("invalid minimum degree {0}: must be at least 2")]
    InvalidMinDegree(usize),

    /// A structural invariant does not hold.
    ///
    /// Only reported by `validate()`. Seeing this indicates a bug.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}
