//! Sparse Merkle map used as the authenticated store for social-graph state.
//!
//! Every map (posts, reposts, comments and the counter maps) is a fixed-depth
//! (256-level) sparse Merkle tree keyed by a 32-byte digest. Key features:
//! - Fixed depth: the key bits are the path, MSB first
//! - Empty subtrees collapse to precomputed default hashes
//! - Witnesses recompute a root for a hypothetical leaf without touching the tree

mod hasher;
mod proof;
mod tree;

use std::sync::OnceLock;

pub use hasher::Keccak256Hasher;
pub use proof::{computed_root, MapWitness};
pub use tree::SparseMerkleTree;

/// 32-byte digest used for keys, values and nodes.
pub type Hash = [u8; 32];

/// SMT tree depth (256 bits for a key)
pub const TREE_DEPTH: usize = 256;

/// Value of a leaf that was never set.
pub const EMPTY_LEAF: Hash = [0u8; 32];

/// Node hash of an empty leaf (keccak256 of empty bytes)
pub const EMPTY_HASH: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c,
    0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b,
    0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Errors raised when decoding untrusted map material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmtError {
    /// A witness must carry exactly one sibling per level.
    #[error("witness has {actual} siblings, expected 256")]
    InvalidWitnessLength {
        /// Number of siblings supplied
        actual: usize,
    },
    /// A counter leaf had bytes set above the low 8.
    #[error("leaf {0} does not encode a u64 counter")]
    InvalidCounterLeaf(String),
}

/// Default hash of an empty subtree rooted at `depth` (0 = root, 256 = leaf).
pub fn default_hash(depth: usize) -> Hash {
    static DEFAULTS: OnceLock<Vec<Hash>> = OnceLock::new();
    let defaults = DEFAULTS.get_or_init(|| {
        let mut hashes = vec![EMPTY_HASH; TREE_DEPTH + 1];
        for d in (0..TREE_DEPTH).rev() {
            hashes[d] = Keccak256Hasher::hash_pair(&hashes[d + 1], &hashes[d + 1]);
        }
        hashes
    });
    defaults[depth]
}

/// Root of a map with no leaves set.
pub fn empty_root() -> Hash {
    default_hash(0)
}

/// Encode a counter as a leaf value. Zero is [`EMPTY_LEAF`], so an owner
/// that never acted reads as a zero count.
pub fn counter_leaf(count: u64) -> Hash {
    let mut leaf = EMPTY_LEAF;
    leaf[24..].copy_from_slice(&count.to_be_bytes());
    leaf
}

/// Decode a leaf written by [`counter_leaf`].
pub fn leaf_counter(leaf: &Hash) -> Result<u64, SmtError> {
    if leaf[..24].iter().any(|b| *b != 0) {
        return Err(SmtError::InvalidCounterLeaf(short_hex(leaf)));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&leaf[24..]);
    Ok(u64::from_be_bytes(bytes))
}

/// First four bytes of a digest as `0x…` hex, for logs.
pub fn short_hex(hash: &Hash) -> String {
    format!("0x{}…", hex::encode(&hash[..4]))
}
