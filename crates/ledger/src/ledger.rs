//! Ledger module: public state and the single `apply` transition

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zksocial_core::{BlockHeight, CommentsRoots, Counters, Hash, PostsRoots, RepostsRoots, RootSet};
use zksocial_host::{Proof, ProofSystem};
use zksocial_smt::short_hex;

use crate::error::LedgerError;

/// Public state of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState<R> {
    /// Current roots of the family's maps
    pub roots: R,
    /// Current global counters
    pub counters: Counters,
}

impl<R: RootSet> Default for LedgerState<R> {
    fn default() -> Self {
        Self {
            roots: R::empty(),
            counters: Counters::default(),
        }
    }
}

/// Read access to another module's primary root.
pub trait PrimaryRoot: Send + Sync {
    /// Current primary root
    fn primary_root(&self) -> Hash;
}

/// Holds one family's public state and commits proofs against it.
pub struct Ledger<R, P> {
    state: LedgerState<R>,
    system: P,
    dependency: Option<Arc<dyn PrimaryRoot>>,
}

impl<R: fmt::Debug, P> fmt::Debug for Ledger<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("state", &self.state)
            .field("has_dependency", &self.dependency.is_some())
            .finish_non_exhaustive()
    }
}

/// Ledger shared between a submitter and its dependents
pub type SharedLedger<R, P> = Arc<RwLock<Ledger<R, P>>>;

/// Posts module
pub type PostsLedger<P> = Ledger<PostsRoots, P>;

/// Reposts module, reads the posts root
pub type RepostsLedger<P> = Ledger<RepostsRoots, P>;

/// Comments module, reads the posts root
pub type CommentsLedger<P> = Ledger<CommentsRoots, P>;

impl<R: RootSet, P: ProofSystem> Ledger<R, P> {
    /// Ledger over empty maps, with no dependency
    pub fn new(system: P) -> Self {
        Self {
            state: LedgerState::default(),
            system,
            dependency: None,
        }
    }

    /// Ledger over empty maps whose proofs must reference `dependency`'s
    /// current primary root
    pub fn with_dependency(system: P, dependency: Arc<dyn PrimaryRoot>) -> Self {
        Self {
            dependency: Some(dependency),
            ..Self::new(system)
        }
    }

    /// Wrap the ledger for sharing
    pub fn into_shared(self) -> SharedLedger<R, P> {
        Arc::new(RwLock::new(self))
    }

    /// Current public state
    pub const fn state(&self) -> &LedgerState<R> {
        &self.state
    }

    /// Current roots
    pub const fn roots(&self) -> &R {
        &self.state.roots
    }

    /// Current counters
    pub const fn counters(&self) -> Counters {
        self.state.counters
    }

    /// Commit `proof` at the ambient `block_height`.
    ///
    /// Every check runs before the state is touched; on error nothing changes.
    pub fn apply(&mut self, proof: &Proof<R>, block_height: BlockHeight) -> Result<(), LedgerError> {
        let result = self.check(proof, block_height);
        if let Err(err) = &result {
            warn!("Rejected {} proof at height {}: {}", R::FAMILY.as_str(), block_height, err);
        }
        result?;

        let statement = proof.statement();
        self.state = LedgerState {
            roots: statement.latest_roots,
            counters: statement.latest_counters,
        };
        info!(
            "Applied {} at height {}: root {}, total {}",
            proof.circuit(),
            block_height,
            short_hex(&self.state.roots.primary()),
            self.state.counters.total
        );
        Ok(())
    }

    fn check(&self, proof: &Proof<R>, block_height: BlockHeight) -> Result<(), LedgerError> {
        if !proof.verify_with(&self.system) {
            return Err(LedgerError::ProofRejected {
                circuit: proof.circuit(),
            });
        }

        let statement = proof.statement();
        let window = statement.block_height..statement.block_height.saturating_add(1);
        if !window.contains(&block_height) {
            return Err(LedgerError::HeightOutOfWindow {
                height: block_height,
                statement_height: statement.block_height,
            });
        }

        let dependency_root = self.dependency.as_ref().map(|d| d.primary_root());
        if statement.referenced_root != dependency_root {
            return Err(LedgerError::StaleDependency {
                expected: dependency_root,
                actual: statement.referenced_root,
            });
        }

        if statement.initial_roots != self.state.roots
            || statement.initial_counters != self.state.counters
        {
            return Err(LedgerError::StaleAnchor {
                family: R::FAMILY.as_str(),
            });
        }
        Ok(())
    }
}

impl<R: RootSet, P: ProofSystem> PrimaryRoot for RwLock<Ledger<R, P>> {
    fn primary_root(&self) -> Hash {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .roots
            .primary()
    }
}
