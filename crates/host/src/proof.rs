//! Proof system boundary and proof values

use std::fmt;

use serde::{Deserialize, Serialize};
use zksocial_core::{ActionKind, Family, RootSet, Transition};

use crate::error::ProverError;

/// Circuits a proof can be produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitId {
    /// A single action
    Action(ActionKind),
    /// Merge of two adjacent proofs of one family
    Merge(Family),
}

impl CircuitId {
    /// Family whose statements the circuit proves
    pub const fn family(&self) -> Family {
        match self {
            Self::Action(kind) => kind.family(),
            Self::Merge(family) => *family,
        }
    }

    /// Returns the string representation of the circuit
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Action(kind) => kind.as_str(),
            Self::Merge(Family::Posts) => "posts_merge",
            Self::Merge(Family::Reposts) => "reposts_merge",
            Self::Merge(Family::Comments) => "comments_merge",
        }
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque proving backend.
///
/// `prove` must fail rather than return bytes that `verify` would reject.
pub trait ProofSystem: Send + Sync {
    /// Prove that `private_witness` satisfies `circuit` for `public_input`.
    fn prove(
        &self,
        circuit: CircuitId,
        public_input: &[u8],
        private_witness: &[u8],
    ) -> Result<Vec<u8>, ProverError>;

    /// Check `proof` for `circuit` and `public_input`.
    fn verify(&self, circuit: CircuitId, public_input: &[u8], proof: &[u8]) -> bool;
}

/// Proof of exactly one transition statement.
///
/// Immutable once built; merging produces a new proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof<R> {
    circuit: CircuitId,
    statement: Transition<R>,
    bytes: Vec<u8>,
}

impl<R: RootSet> Proof<R> {
    /// Reassemble a proof received from elsewhere.
    pub const fn from_parts(circuit: CircuitId, statement: Transition<R>, bytes: Vec<u8>) -> Self {
        Self {
            circuit,
            statement,
            bytes,
        }
    }

    /// Public input handed to the proof system for a statement.
    pub fn public_input(
        circuit: CircuitId,
        statement: &Transition<R>,
    ) -> Result<Vec<u8>, ProverError> {
        Ok(bincode::serialize(&(circuit, statement))?)
    }

    /// Circuit the proof was produced for
    pub const fn circuit(&self) -> CircuitId {
        self.circuit
    }

    /// Public statement
    pub const fn statement(&self) -> &Transition<R> {
        &self.statement
    }

    /// Raw proof bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Verify the proof against its own statement.
    pub fn verify_with<P: ProofSystem + ?Sized>(&self, system: &P) -> bool {
        if self.circuit.family() != R::FAMILY {
            return false;
        }
        match Self::public_input(self.circuit, &self.statement) {
            Ok(input) => system.verify(self.circuit, &input, &self.bytes),
            Err(_) => false,
        }
    }
}
