//! Sequencer - build, prove, fold and commit batches of social actions
//!
//! Publishes a batch of posts at the start height, then a batch of reposts
//! at the next height, and commits both through the ledger modules. The
//! sequencer is the single writer of every map it mirrors.

use std::env;

use anyhow::{anyhow, bail, Result};
use ed25519_dalek::SigningKey;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use zksocial_core::{BlockHeight, Hash, RootSet};
use zksocial_host::{
    BatchFolder, Config, ProofSystemBackend, TransitionProver, WitnessGenerator,
};
use zksocial_ledger::{PostsLedger, PrimaryRoot, RepostsLedger};
use zksocial_smt::Keccak256Hasher;

/// Sequencer configuration
#[derive(Debug, Clone)]
struct SequencerConfig {
    /// Number of owners
    users: usize,
    /// Posts each owner publishes
    posts_per_user: u64,
    /// Height of the first batch
    start_height: BlockHeight,
    /// Seed for owner keys
    seed: u64,
    /// Host configuration
    host: Config,
}

impl SequencerConfig {
    fn from_env() -> Self {
        Self {
            users: env::var("SEQUENCER_USERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            posts_per_user: env::var("SEQUENCER_POSTS_PER_USER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            start_height: env::var("SEQUENCER_START_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            seed: env::var("SEQUENCER_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            host: Config::from_env(),
        }
    }
}

/// Committed state after a run
#[derive(Debug, Serialize)]
struct Summary {
    posts_root: String,
    posts_total: u64,
    reposts_root: String,
    reposts_total: u64,
}

/// Content digest of an owner's n-th post
fn post_content(owner: usize, index: u64) -> Hash {
    Keccak256Hasher::hash(&[(owner as u64).to_be_bytes(), index.to_be_bytes()].concat())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = SequencerConfig::from_env();
    if config.users == 0 || config.posts_per_user == 0 {
        bail!("SEQUENCER_USERS and SEQUENCER_POSTS_PER_USER must be positive");
    }

    info!("===========================================");
    info!("        zksocial Sequencer");
    info!("===========================================");
    info!("  Users: {}", config.users);
    info!("  Posts per user: {}", config.posts_per_user);
    info!("  Start height: {}", config.start_height);
    info!("  Prover mode: {:?}", config.host.prover.mode);
    info!("  Fold parallelism: {}", config.host.fold_parallelism);

    let system = ProofSystemBackend::new(&config.host.prover);
    let folder = BatchFolder::new(
        TransitionProver::new(system.clone()),
        config.host.fold_parallelism,
    );
    let posts = PostsLedger::new(system.clone()).into_shared();
    let mut reposts = RepostsLedger::with_dependency(system, posts.clone());
    let mut generator = WitnessGenerator::new();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let owners: Vec<SigningKey> = (0..config.users)
        .map(|_| SigningKey::generate(&mut rng))
        .collect();

    // Posts
    let height = config.start_height;
    let mut first_posts = Vec::with_capacity(owners.len());
    let mut batch = Vec::new();
    for (i, owner) in owners.iter().enumerate() {
        for n in 0..config.posts_per_user {
            let inputs = generator.publish_post(owner, post_content(i, n), height)?;
            if n == 0 {
                first_posts.push(inputs.key());
            }
            batch.push(inputs);
        }
    }
    info!("Proving {} posts at height {}", batch.len(), height);
    let proof = folder.prove_and_fold(batch).await?;
    posts
        .write()
        .map_err(|_| anyhow!("posts ledger lock poisoned"))?
        .apply(&proof, height)?;

    // Reposts: every owner reposts the next owner's first post
    let height = height + 1;
    let mut batch = Vec::with_capacity(owners.len());
    for (i, owner) in owners.iter().enumerate() {
        let target = first_posts[(i + 1) % first_posts.len()];
        batch.push(generator.repost(owner, target, height)?);
    }
    info!("Proving {} reposts at height {}", batch.len(), height);
    let proof = folder.prove_and_fold(batch).await?;
    reposts.apply(&proof, height)?;

    let posts_total = posts
        .read()
        .map_err(|_| anyhow!("posts ledger lock poisoned"))?
        .counters()
        .total;
    let summary = Summary {
        posts_root: hex::encode(posts.primary_root()),
        posts_total,
        reposts_root: hex::encode(reposts.roots().primary()),
        reposts_total: reposts.counters().total,
    };
    info!("Committed state:\n{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
