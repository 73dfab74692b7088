//! SMT witness generation and verification

use serde::{Deserialize, Serialize};

use crate::{hasher::Keccak256Hasher, tree::bit, Hash, SmtError, TREE_DEPTH};

/// Path material for one key: enough to recompute the root for any leaf
/// value at that key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapWitness {
    /// The key the witness was produced for
    pub key: Hash,
    /// The value stored at the key, `None` for a non-membership witness
    pub leaf: Option<Hash>,
    /// Sibling hashes from leaf to root (256 elements)
    pub siblings: Vec<Hash>,
}

impl MapWitness {
    /// Build a witness from untrusted parts.
    pub fn new(key: Hash, leaf: Option<Hash>, siblings: Vec<Hash>) -> Result<Self, SmtError> {
        if siblings.len() != TREE_DEPTH {
            return Err(SmtError::InvalidWitnessLength { actual: siblings.len() });
        }
        Ok(Self { key, leaf, siblings })
    }

    /// Whether the witness claims the key is present.
    pub const fn is_membership(&self) -> bool {
        self.leaf.is_some()
    }

    /// Verify that `key` holds `value` under `root`.
    pub fn verify(&self, root: &Hash, key: &Hash, value: &Hash) -> bool {
        self.siblings.len() == TREE_DEPTH && computed_root(self, key, value) == *root
    }
}

/// Root implied by placing `value` at `key` along the witness path.
///
/// Pure: nothing is read from or written to a tree. The path bits come from
/// `key`, so siblings collected for another key produce a foreign root.
pub fn computed_root(witness: &MapWitness, key: &Hash, value: &Hash) -> Hash {
    let mut current_hash = Keccak256Hasher::hash_leaf(key, value);

    for (i, sibling) in witness.siblings.iter().enumerate().take(TREE_DEPTH) {
        let depth = TREE_DEPTH - 1 - i;

        let (left, right) = if bit(key, depth) {
            (*sibling, current_hash)
        } else {
            (current_hash, *sibling)
        };

        current_hash = Keccak256Hasher::hash_pair(&left, &right);
    }

    current_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SparseMerkleTree;

    #[test]
    fn test_rejects_short_witness() {
        let err = MapWitness::new([0u8; 32], None, vec![[0u8; 32]; 3]).unwrap_err();
        assert_eq!(err, SmtError::InvalidWitnessLength { actual: 3 });
    }

    #[test]
    fn test_truncated_witness_fails_verification() {
        let mut tree = SparseMerkleTree::new();
        tree.insert([3u8; 32], [4u8; 32]);
        let mut witness = tree.witness(&[3u8; 32]);
        witness.siblings.pop();
        assert!(!witness.verify(&tree.root(), &[3u8; 32], &[4u8; 32]));
    }
}
