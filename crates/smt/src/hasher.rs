//! Keccak256 hasher for SMT

use tiny_keccak::{Hasher, Keccak};

use crate::{Hash, EMPTY_HASH, EMPTY_LEAF};

/// Keccak256 hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    /// Hash two 32-byte values together
    pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
        Self::hash_parts(&[left.as_slice(), right.as_slice()])
    }

    /// Hash a single value
    pub fn hash(data: &[u8]) -> Hash {
        Self::hash_parts(&[data])
    }

    /// Hash the concatenation of several byte strings
    pub fn hash_parts(parts: &[&[u8]]) -> Hash {
        let mut hasher = Keccak::v256();
        for part in parts {
            hasher.update(part);
        }
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }

    /// Hash a key-value pair for leaf node. An empty value collapses to the
    /// default leaf so absent keys need no stored node.
    pub fn hash_leaf(key: &Hash, value: &Hash) -> Hash {
        if *value == EMPTY_LEAF {
            return EMPTY_HASH;
        }
        Self::hash_parts(&[&[0x00u8][..], key.as_slice(), value.as_slice()]) // Leaf prefix
    }
}
