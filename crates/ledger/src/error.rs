//! Ledger error types

use zksocial_core::{BlockHeight, Hash};
use zksocial_host::CircuitId;
use zksocial_smt::short_hex;

fn root_label(root: &Option<Hash>) -> String {
    root.as_ref().map_or_else(|| "none".to_string(), short_hex)
}

/// Reason a proof was not applied. The ledger state is untouched in every
/// case; the caller has to prove again against the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Proof does not verify against its own statement
    #[error("{circuit} proof rejected")]
    ProofRejected {
        /// Circuit the proof claims
        circuit: CircuitId,
    },
    /// Proof was computed for another block
    #[error("proof for height {statement_height} cannot be applied at height {height}")]
    HeightOutOfWindow {
        /// Ambient block height
        height: BlockHeight,
        /// Height the statement is valid at
        statement_height: BlockHeight,
    },
    /// Dependency root moved since the proof was built
    #[error("dependency root is {}, proof was built against {}", root_label(.expected), root_label(.actual))]
    StaleDependency {
        /// Current primary root of the dependency
        expected: Option<Hash>,
        /// Root embedded in the statement
        actual: Option<Hash>,
    },
    /// Statement does not start at the ledger's current state
    #[error("proof is not anchored at the current {family} state")]
    StaleAnchor {
        /// Family of the ledger
        family: &'static str,
    },
}
