//! Error types for tree validation.

use thiserror::Error;

/// Result type alias using ConsistencyError.
pub type Result<T> = std::result::Result<T, ConsistencyError>;

/// Invariant violations found by [`AvlTreeMap::check_consistency`].
///
/// Depths count edges from the root, so the root node is at depth 0.
///
/// [`AvlTreeMap::check_consistency`]: crate::AvlTreeMap::check_consistency
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("Key out of order at depth {depth}")]
    Unordered { depth: usize },

    #[error("Stale height at depth {depth}: recorded {recorded}, computed {computed}")]
    HeightMismatch {
        depth: usize,
        recorded: usize,
        computed: usize,
    },

    #[error("Unbalanced node at depth {depth}: left height {left}, right height {right}")]
    Unbalanced {
        depth: usize,
        left: usize,
        right: usize,
    },

    #[error("Node count mismatch: recorded {recorded}, counted {counted}")]
    LengthMismatch { recorded: usize, counted: usize },
}
