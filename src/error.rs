//! Error types for spark-menu.

use thiserror::Error;

use crate::scene::NodeId;
use crate::types::PoolRole;

/// Errors raised by pools, the attachment graph and the UI manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    /// A spawn was requested and the pool had nothing left to hand out.
    #[error("{role} pool exhausted (capacity {capacity})")]
    PoolExhausted {
        role: PoolRole,
        capacity: usize,
    },

    /// The asset source had no template for this role.
    #[error("no template bound for the {0} pool")]
    TemplateMissing(PoolRole),

    /// The node being released was never created by this pool.
    #[error("node {node} does not belong to the {role} pool")]
    NotPooled { role: PoolRole, node: NodeId },

    /// The node being released is already waiting in the pool.
    #[error("node {node} was already released to the {role} pool")]
    AlreadyReleased { role: PoolRole, node: NodeId },

    /// The node id refers to a destroyed (or never created) node.
    #[error("stale node handle {0}")]
    StaleNode(NodeId),

    /// Re-parenting would make a node its own ancestor.
    #[error("cannot attach {node} under its own descendant {parent}")]
    CyclicParent { node: NodeId, parent: NodeId },

    /// The scene or UI state was already borrowed when an event arrived
    /// (a handler re-entered, or the host held a borrow while mutating).
    #[error("UI state is busy; event dropped")]
    Busy,

    /// A UI manager is already alive on this thread.
    #[error("a UI manager is already initialized on this thread")]
    AlreadyInitialized,

    /// `enable` was called twice without a matching `disable`.
    #[error("UI manager is already enabled")]
    AlreadyActive,
}

/// Result type for spark-menu operations.
pub type Result<T> = std::result::Result<T, UiError>;
