//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate node id in tree: {0}")]
    DuplicateId(NodeId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("invalid reorder: {0}")]
    InvalidReorder(#[from] InvalidReorder),
}

/// Reasons a drag-reorder is refused before any mutation is emitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReorder {
    #[error("cannot drop {0} onto itself")]
    OntoSelf(NodeId),

    #[error("cannot move {source_id} into its own descendant {target_id}")]
    IntoDescendant { source_id: NodeId, target_id: NodeId },

    #[error("the root node cannot be moved")]
    MoveRoot,

    #[error("the root node has no siblings")]
    SiblingOfRoot,

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("{0} is already at that position")]
    NoOp(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
