//! Host-side logic for zksocial
//!
//! Turns checked action inputs into proofs, merges adjacent proofs and folds
//! whole batches. The proof backend is selected by `PROVER_MODE`.

pub mod config;
pub mod error;
pub mod folding;
pub mod proof;
pub mod prover;
pub mod prover_mock;
pub mod witness;

pub use config::{Config, ProverConfig, ProverMode};
pub use error::ProverError;
pub use folding::BatchFolder;
pub use proof::{CircuitId, Proof, ProofSystem};
pub use prover::TransitionProver;
pub use prover_mock::{AttestedProofSystem, DisabledProofSystem, ProofSystemBackend};
pub use witness::WitnessGenerator;
