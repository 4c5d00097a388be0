//! Error types for ring operations.

/// Errors produced by [`Ring`](crate::Ring) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// No node with this identifier is on the ring.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A key was resolved against a ring with no nodes.
    #[error("ring is empty")]
    EmptyRing,
}
