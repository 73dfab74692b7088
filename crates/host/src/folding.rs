//! Batch proving and folding
//!
//! A batch is an ordered list of per-action proofs. Folding pairs neighbours
//! level by level (a balanced binary tree), so a batch of N proofs always
//! takes N-1 merges and the batch order is never changed. An odd proof at the
//! end of a level is carried up unmerged.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};
use zksocial_core::{Action, RootSet};

use crate::config::DEFAULT_FOLD_PARALLELISM;
use crate::error::ProverError;
use crate::proof::{Proof, ProofSystem};
use crate::prover::TransitionProver;

/// Folds ordered batches of proofs into one.
#[derive(Debug)]
pub struct BatchFolder<P> {
    prover: TransitionProver<P>,
    parallelism: usize,
}

impl<P: ProofSystem + 'static> BatchFolder<P> {
    /// Create a folder running at most `parallelism` proving tasks at once
    pub fn new(prover: TransitionProver<P>, parallelism: usize) -> Self {
        Self {
            prover,
            parallelism: parallelism.max(1),
        }
    }

    /// Underlying prover
    pub const fn prover(&self) -> &TransitionProver<P> {
        &self.prover
    }

    /// Fold on the calling thread.
    pub fn fold<R: RootSet>(&self, proofs: Vec<Proof<R>>) -> Result<Proof<R>, ProverError> {
        let mut level = proofs;
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut proofs = level.into_iter();
            while let Some(first) = proofs.next() {
                match proofs.next() {
                    Some(second) => next.push(self.prover.merge(&first, &second)?),
                    None => next.push(first),
                }
            }
            level = next;
        }
        level.pop().ok_or(ProverError::EmptyBatch)
    }

    /// Fold with the merges of each tree level running on blocking tasks.
    ///
    /// Produces the same proof tree as [`Self::fold`].
    pub async fn fold_parallel<R: RootSet>(
        &self,
        proofs: Vec<Proof<R>>,
    ) -> Result<Proof<R>, ProverError> {
        if proofs.is_empty() {
            return Err(ProverError::EmptyBatch);
        }
        info!("Folding {} {} proofs", proofs.len(), R::FAMILY.as_str());

        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut level = proofs;
        let mut depth = 0;
        while level.len() > 1 {
            let carry = if level.len() % 2 == 1 { level.pop() } else { None };

            let mut tasks = JoinSet::new();
            let mut proofs = level.into_iter();
            let mut pairs = 0;
            while let (Some(first), Some(second)) = (proofs.next(), proofs.next()) {
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| ProverError::TaskFailed(e.to_string()))?;
                let prover = self.prover.clone();
                let index = pairs;
                tasks.spawn_blocking(move || {
                    let _permit = permit;
                    (index, prover.merge(&first, &second))
                });
                pairs += 1;
            }

            level = collect_ordered(tasks, pairs).await?;
            level.extend(carry);
            depth += 1;
            debug!("Fold level {} done, {} proofs left", depth, level.len());
        }
        level.pop().ok_or(ProverError::EmptyBatch)
    }

    /// Prove every action of a batch on blocking tasks, keeping batch order.
    pub async fn prove_batch<A: Action>(
        &self,
        inputs: Vec<A>,
    ) -> Result<Vec<Proof<A::Roots>>, ProverError> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut tasks = JoinSet::new();
        let count = inputs.len();
        for (index, action) in inputs.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ProverError::TaskFailed(e.to_string()))?;
            let prover = self.prover.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, prover.prove(&action))
            });
        }
        debug!("Proving {} {} actions", count, A::KIND.as_str());
        collect_ordered(tasks, count).await
    }

    /// Prove a batch and fold it into one proof.
    pub async fn prove_and_fold<A: Action>(
        &self,
        inputs: Vec<A>,
    ) -> Result<Proof<A::Roots>, ProverError> {
        let proofs = self.prove_batch(inputs).await?;
        self.fold_parallel(proofs).await
    }
}

impl<P: ProofSystem + 'static> From<TransitionProver<P>> for BatchFolder<P> {
    fn from(prover: TransitionProver<P>) -> Self {
        Self::new(prover, DEFAULT_FOLD_PARALLELISM)
    }
}

/// Wait for `count` indexed results and return them in index order.
async fn collect_ordered<T: Send + 'static>(
    mut tasks: JoinSet<(usize, Result<T, ProverError>)>,
    count: usize,
) -> Result<Vec<T>, ProverError> {
    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| ProverError::TaskFailed(e.to_string()))?;
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(result?);
        }
    }
    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ProverError::TaskFailed("missing task result".to_string()))
}
