//! Host error types

use zksocial_core::TransitionError;

use crate::proof::CircuitId;

/// Failure while proving, merging or folding.
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    /// The action or merge broke a transition rule
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// Recomputed statement differs from the one the caller claimed
    #[error("{circuit} statement differs from the claimed one")]
    StatementMismatch {
        /// Circuit the statement was computed for
        circuit: CircuitId,
    },
    /// An input proof did not verify against its own statement
    #[error("{circuit} proof rejected")]
    ProofRejected {
        /// Circuit the rejected proof claims
        circuit: CircuitId,
    },
    /// The proof backend failed
    #[error("proof backend: {0}")]
    Backend(String),
    /// Statement or witness could not be encoded
    #[error("encoding failed: {0}")]
    Serialization(#[from] bincode::Error),
    /// A blocking proving task panicked or was cancelled
    #[error("proving task failed: {0}")]
    TaskFailed(String),
    /// Nothing to fold
    #[error("cannot fold an empty batch")]
    EmptyBatch,
}
