//! Transition prover and proof merger

use std::sync::Arc;

use tracing::debug;
use zksocial_core::{merge_transitions, Action, RootSet, Transition};
use zksocial_smt::short_hex;

use crate::error::ProverError;
use crate::proof::{CircuitId, Proof, ProofSystem};

/// Proves single actions and merges adjacent proofs.
///
/// Stateless per call; clones share the backend.
#[derive(Debug)]
pub struct TransitionProver<P> {
    system: Arc<P>,
}

impl<P> Clone for TransitionProver<P> {
    fn clone(&self) -> Self {
        Self {
            system: Arc::clone(&self.system),
        }
    }
}

impl<P: ProofSystem> TransitionProver<P> {
    /// Create a prover over `system`
    pub fn new(system: P) -> Self {
        Self {
            system: Arc::new(system),
        }
    }

    /// Proof backend
    pub fn system(&self) -> &P {
        &self.system
    }

    /// Check `inputs` and prove the transition they describe.
    pub fn prove<A: Action>(&self, inputs: &A) -> Result<Proof<A::Roots>, ProverError> {
        let statement = inputs.transition()?;
        self.attest(CircuitId::Action(A::KIND), statement, &bincode::serialize(inputs)?)
    }

    /// Like [`Self::prove`], but fail unless the checked transition equals
    /// the statement the caller expects.
    pub fn prove_claimed<A: Action>(
        &self,
        inputs: &A,
        claimed: &Transition<A::Roots>,
    ) -> Result<Proof<A::Roots>, ProverError> {
        let circuit = CircuitId::Action(A::KIND);
        let statement = inputs.transition()?;
        if statement != *claimed {
            return Err(ProverError::StatementMismatch { circuit });
        }
        self.attest(circuit, statement, &bincode::serialize(inputs)?)
    }

    /// Merge two proofs whose statements are adjacent, `first` before
    /// `second`. The inputs are left untouched.
    pub fn merge<R: RootSet>(
        &self,
        first: &Proof<R>,
        second: &Proof<R>,
    ) -> Result<Proof<R>, ProverError> {
        for proof in [first, second] {
            if !proof.verify_with(&*self.system) {
                return Err(ProverError::ProofRejected {
                    circuit: proof.circuit(),
                });
            }
        }

        let statement = merge_transitions(first.statement(), second.statement())?;
        let witness = bincode::serialize(&(first, second))?;
        self.attest(CircuitId::Merge(R::FAMILY), statement, &witness)
    }

    fn attest<R: RootSet>(
        &self,
        circuit: CircuitId,
        statement: Transition<R>,
        witness: &[u8],
    ) -> Result<Proof<R>, ProverError> {
        let public_input = Proof::public_input(circuit, &statement)?;
        let bytes = self.system.prove(circuit, &public_input, witness)?;
        debug!(
            "Proved {} at height {}: {} -> {}",
            circuit,
            statement.block_height,
            short_hex(&statement.initial_roots.primary()),
            short_hex(&statement.latest_roots.primary())
        );
        Ok(Proof::from_parts(circuit, statement, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prover_mock::{AttestedProofSystem, DisabledProofSystem};
    use ed25519_dalek::SigningKey;
    use rand::{rngs::StdRng, SeedableRng};
    use zksocial_core::signature::address_of;
    use zksocial_core::{
        keys, ActionKind, AdjacencyBreak, Counters, Family, PostsRoots, PostsState,
        TransitionError,
    };

    fn content(value: u64) -> [u8; 32] {
        let mut digest = [0u8; 32];
        digest[24..].copy_from_slice(&value.to_be_bytes());
        digest
    }

    fn owner() -> SigningKey {
        SigningKey::generate(&mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_publish_then_delete_merged() {
        let prover = TransitionProver::new(AttestedProofSystem::default());
        let alice = owner();
        let mut state = PostsState::new();
        let r0 = state.roots();

        let publication = state.publication(&alice, content(777), 1);
        state.apply_publication(&publication).unwrap();
        let p1 = prover.prove(&publication).unwrap();
        let r1 = state.roots();

        let deletion = state.deletion(&alice, content(777), 1).unwrap();
        state.apply_deletion(&deletion).unwrap();
        let p2 = prover.prove(&deletion).unwrap();

        assert_eq!(p1.statement().latest_roots, r1);
        assert_eq!(p2.statement().initial_counters, p2.statement().latest_counters);

        let merged = prover.merge(&p1, &p2).unwrap();
        assert_eq!(merged.circuit(), CircuitId::Merge(Family::Posts));
        assert_eq!(merged.statement().initial_roots, r0);
        assert_eq!(merged.statement().latest_roots, state.roots());
        assert_eq!(merged.statement().initial_counters, Counters::new(0));
        assert_eq!(merged.statement().latest_counters, Counters::new(1));
        assert_eq!(merged.statement().block_height, 1);
        assert!(merged.verify_with(prover.system()));

        let key = keys::entity_key(&address_of(&alice), &content(777));
        let record = state.record(&key).unwrap();
        assert!(record.deleted);
        assert_eq!(record.deleted_at_height, 1);
    }

    #[test]
    fn test_merge_in_wrong_order_fails() {
        let prover = TransitionProver::new(AttestedProofSystem::default());
        let alice = owner();
        let mut state = PostsState::new();

        let mut proofs = Vec::new();
        for value in [1, 2] {
            let inputs = state.publication(&alice, content(value), 4);
            state.apply_publication(&inputs).unwrap();
            proofs.push(prover.prove(&inputs).unwrap());
        }

        assert!(matches!(
            prover.merge(&proofs[1], &proofs[0]),
            Err(ProverError::Transition(TransitionError::NonAdjacentTransition(
                AdjacencyBreak::Roots
            )))
        ));
    }

    #[test]
    fn test_merge_rejects_tampered_proof() {
        let prover = TransitionProver::new(AttestedProofSystem::default());
        let alice = owner();
        let mut state = PostsState::new();

        let first = state.publication(&alice, content(1), 2);
        state.apply_publication(&first).unwrap();
        let second = state.publication(&alice, content(2), 2);
        let p1 = prover.prove(&first).unwrap();
        let p2 = prover.prove(&second).unwrap();

        let mut forged = *p2.statement();
        forged.latest_roots = PostsRoots {
            users_counters: [1u8; 32],
            posts: [2u8; 32],
        };
        let forged = Proof::from_parts(p2.circuit(), forged, p2.bytes().to_vec());

        assert!(matches!(
            prover.merge(&p1, &forged),
            Err(ProverError::ProofRejected { .. })
        ));
        assert!(prover.merge(&p1, &p2).is_ok());
    }

    #[test]
    fn test_proof_from_another_key_rejected() {
        let alice = owner();
        let state = PostsState::new();
        let inputs = state.publication(&alice, content(5), 1);

        let foreign = TransitionProver::new(AttestedProofSystem::from_seed("other"))
            .prove(&inputs)
            .unwrap();
        assert!(!foreign.verify_with(&AttestedProofSystem::default()));
        assert!(foreign.verify_with(&DisabledProofSystem));
    }

    #[test]
    fn test_claimed_statement_checked() {
        let prover = TransitionProver::new(DisabledProofSystem);
        let alice = owner();
        let state = PostsState::new();
        let inputs = state.publication(&alice, content(6), 1);

        let expected = inputs.transition().unwrap();
        assert!(prover.prove_claimed(&inputs, &expected).is_ok());

        let mut claimed = expected;
        claimed.block_height = 2;
        assert!(matches!(
            prover.prove_claimed(&inputs, &claimed),
            Err(ProverError::StatementMismatch {
                circuit: CircuitId::Action(ActionKind::PostPublishing)
            })
        ));
    }

    #[test]
    fn test_invalid_action_yields_no_proof() {
        let prover = TransitionProver::new(DisabledProofSystem);
        let alice = owner();
        let mut state = PostsState::new();
        let inputs = state.publication(&alice, content(7), 1);
        state.apply_publication(&inputs).unwrap();

        let duplicate = state.publication(&alice, content(7), 1);
        assert!(matches!(
            prover.prove(&duplicate),
            Err(ProverError::Transition(TransitionError::EntityAlreadyExists { .. }))
        ));
    }
}
