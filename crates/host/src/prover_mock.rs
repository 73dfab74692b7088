//! Proof backends that stand in for a real proving system
//!
//! The attested backend binds each proof to the circuit, the public input and
//! a commitment to the private witness with a keyed keccak tag. Anyone holding
//! the key can verify; no one without it can forge a tag for a new statement.

use tiny_keccak::{Hasher, Keccak};
use tracing::info;
use zksocial_smt::Hash;

use crate::config::{ProverConfig, ProverMode};
use crate::error::ProverError;
use crate::proof::{CircuitId, ProofSystem};

const PROOF_LEN: usize = 64;

fn keccak(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Keyed attestation backend.
#[derive(Clone, Debug)]
pub struct AttestedProofSystem {
    key: Hash,
}

impl AttestedProofSystem {
    /// Backend with an explicit key
    pub const fn new(key: Hash) -> Self {
        Self { key }
    }

    /// Derive the key from a seed: 32 hex bytes are used as-is, anything
    /// else is hashed.
    pub fn from_seed(seed: &str) -> Self {
        let seed = seed.trim();
        let key = hex::decode(seed.trim_start_matches("0x"))
            .ok()
            .and_then(|bytes| Hash::try_from(bytes.as_slice()).ok())
            .unwrap_or_else(|| keccak(&[seed.as_bytes()]));
        Self { key }
    }

    fn tag(&self, circuit: CircuitId, public_input: &[u8], commitment: &Hash) -> Hash {
        keccak(&[
            self.key.as_slice(),
            circuit.as_str().as_bytes(),
            public_input,
            commitment.as_slice(),
        ])
    }
}

impl Default for AttestedProofSystem {
    fn default() -> Self {
        Self::from_seed("zksocial-attested")
    }
}

impl ProofSystem for AttestedProofSystem {
    fn prove(
        &self,
        circuit: CircuitId,
        public_input: &[u8],
        private_witness: &[u8],
    ) -> Result<Vec<u8>, ProverError> {
        let commitment = keccak(&[private_witness]);
        let tag = self.tag(circuit, public_input, &commitment);
        Ok([commitment, tag].concat())
    }

    fn verify(&self, circuit: CircuitId, public_input: &[u8], proof: &[u8]) -> bool {
        if proof.len() != PROOF_LEN {
            return false;
        }
        let (commitment, tag) = proof.split_at(32);
        Hash::try_from(commitment)
            .map(|commitment| self.tag(circuit, public_input, &commitment).as_slice() == tag)
            .unwrap_or(false)
    }
}

/// Backend for running with proofs turned off.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledProofSystem;

impl ProofSystem for DisabledProofSystem {
    fn prove(&self, _: CircuitId, _: &[u8], _: &[u8]) -> Result<Vec<u8>, ProverError> {
        Ok(Vec::new())
    }

    fn verify(&self, _: CircuitId, _: &[u8], _: &[u8]) -> bool {
        true
    }
}

/// Backend selected by configuration.
#[derive(Clone, Debug)]
pub enum ProofSystemBackend {
    /// Keyed attestation
    Attested(AttestedProofSystem),
    /// Proofs turned off
    Disabled(DisabledProofSystem),
}

impl ProofSystemBackend {
    /// Create the backend for `config`
    pub fn new(config: &ProverConfig) -> Self {
        match config.mode {
            ProverMode::Attested => {
                info!("Proof backend initialized in ATTESTED mode");
                Self::Attested(
                    config
                        .key_seed
                        .as_deref()
                        .map(AttestedProofSystem::from_seed)
                        .unwrap_or_default(),
                )
            }
            ProverMode::Disabled => {
                info!("Proof backend initialized in DISABLED mode (proofs always verify)");
                Self::Disabled(DisabledProofSystem)
            }
        }
    }
}

impl ProofSystem for ProofSystemBackend {
    fn prove(
        &self,
        circuit: CircuitId,
        public_input: &[u8],
        private_witness: &[u8],
    ) -> Result<Vec<u8>, ProverError> {
        match self {
            Self::Attested(system) => system.prove(circuit, public_input, private_witness),
            Self::Disabled(system) => system.prove(circuit, public_input, private_witness),
        }
    }

    fn verify(&self, circuit: CircuitId, public_input: &[u8], proof: &[u8]) -> bool {
        match self {
            Self::Attested(system) => system.verify(circuit, public_input, proof),
            Self::Disabled(system) => system.verify(circuit, public_input, proof),
        }
    }
}
