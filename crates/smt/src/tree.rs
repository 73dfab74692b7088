//! Sparse Merkle Tree implementation

use std::collections::HashMap;

use crate::{
    default_hash, empty_root, hasher::Keccak256Hasher, proof::MapWitness, Hash, EMPTY_LEAF,
    TREE_DEPTH,
};

/// Sparse Merkle Tree with 256-level depth
///
/// Only non-default nodes are stored; every update rewrites the 256 nodes on
/// the path from the touched leaf to the root.
#[derive(Clone, Debug)]
pub struct SparseMerkleTree {
    /// Leaf nodes: key -> value
    leaves: HashMap<Hash, Hash>,
    /// Non-default nodes: (depth, key prefix masked to `depth` bits) -> hash
    nodes: HashMap<(usize, Hash), Hash>,
    /// Root hash
    root: Hash,
}

impl SparseMerkleTree {
    /// Create a new empty SMT
    pub fn new() -> Self {
        Self {
            leaves: HashMap::new(),
            nodes: HashMap::new(),
            root: empty_root(),
        }
    }

    /// Get the root hash
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Number of non-empty leaves
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether no leaf is set
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Insert a key-value pair. Inserting [`EMPTY_LEAF`] clears the key.
    pub fn insert(&mut self, key: Hash, value: Hash) {
        if value == EMPTY_LEAF {
            self.leaves.remove(&key);
        } else {
            self.leaves.insert(key, value);
        }
        self.update_path(&key, value);
    }

    /// Batch insert multiple key-value pairs
    pub fn batch_insert(&mut self, entries: Vec<(Hash, Hash)>) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    /// Get value by key
    pub fn get(&self, key: &Hash) -> Option<Hash> {
        self.leaves.get(key).copied()
    }

    /// Build the witness for a key. Absent keys yield a non-membership witness.
    pub fn witness(&self, key: &Hash) -> MapWitness {
        // Walk from leaf to root, collecting sibling hashes
        let siblings = (1..=TREE_DEPTH)
            .rev()
            .map(|depth| self.node_hash(depth, &prefix(&flip_bit(key, depth - 1), depth)))
            .collect();

        MapWitness {
            key: *key,
            leaf: self.get(key),
            siblings,
        }
    }

    /// Recompute the nodes along `key`'s path after its leaf changed.
    fn update_path(&mut self, key: &Hash, value: Hash) {
        let mut current_hash = Keccak256Hasher::hash_leaf(key, &value);
        self.store_node(TREE_DEPTH, *key, current_hash);

        for depth in (0..TREE_DEPTH).rev() {
            let sibling = prefix(&flip_bit(key, depth), depth + 1);
            let sibling_hash = self.node_hash(depth + 1, &sibling);

            let (left, right) = if bit(key, depth) {
                (sibling_hash, current_hash)
            } else {
                (current_hash, sibling_hash)
            };

            current_hash = Keccak256Hasher::hash_pair(&left, &right);
            self.store_node(depth, prefix(key, depth), current_hash);
        }

        self.root = current_hash;
    }

    fn store_node(&mut self, depth: usize, path_prefix: Hash, hash: Hash) {
        if hash == default_hash(depth) {
            self.nodes.remove(&(depth, path_prefix));
        } else {
            self.nodes.insert((depth, path_prefix), hash);
        }
    }

    /// Get node hash at a specific depth and path
    fn node_hash(&self, depth: usize, path_prefix: &Hash) -> Hash {
        self.nodes
            .get(&(depth, *path_prefix))
            .copied()
            .unwrap_or_else(|| default_hash(depth))
    }
}

impl Default for SparseMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit `index` of the key, MSB first.
pub(crate) const fn bit(key: &Hash, index: usize) -> bool {
    (key[index / 8] >> (7 - index % 8)) & 1 == 1
}

fn flip_bit(key: &Hash, index: usize) -> Hash {
    let mut flipped = *key;
    flipped[index / 8] ^= 1 << (7 - index % 8);
    flipped
}

/// Keep the first `depth` bits of the key, zeroing the rest.
fn prefix(key: &Hash, depth: usize) -> Hash {
    let mut masked = [0u8; 32];
    let full = depth / 8;
    masked[..full].copy_from_slice(&key[..full]);
    let rem = depth % 8;
    if rem != 0 {
        masked[full] = key[full] & (0xff << (8 - rem));
    }
    masked
}
