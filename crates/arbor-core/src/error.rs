//! Error types for tree operations.
//!
//! Only [`TreeError::DepthLimitExceeded`] is meant to reach the user; the
//! editing session treats the other variants raised by mutations as silent
//! no-ops.

use thiserror::Error;

use crate::identifier::NodeId;

/// Errors raised by tree queries and mutations.
///
/// A mutation that returns an error has not changed the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node `{0}` not found")]
    NotFound(NodeId),

    #[error("maximum depth of {max_depth} levels reached (requested depth {depth})")]
    DepthLimitExceeded { depth: usize, max_depth: usize },

    #[error("root node `{0}` cannot be removed")]
    ProtectedRoot(NodeId),

    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),

    #[error("node id serials are exhausted after `{0}`")]
    IdsExhausted(NodeId),
}

/// Convenience alias for results of tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
