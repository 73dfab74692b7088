//! Entity record stored (hashed) under each post, repost and comment key

use serde::{Deserialize, Serialize};
use zksocial_smt::Keccak256Hasher;

use crate::types::{Address, BlockHeight, Hash};

/// State of one published entity.
///
/// Sequence numbers are assigned once at creation and survive deletion, so a
/// tombstoned record still tells when and in which order it was published.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRecord {
    /// Author of the entity
    pub owner: Address,
    /// Content digest (for reposts, the key of the reposted entity)
    pub content: Hash,
    /// Entity this one refers to, for reposts and comments
    pub target_key: Option<Hash>,
    /// Global counter value assigned at creation
    pub sequence_number: u64,
    /// Per-owner counter value assigned at creation
    pub owner_sequence: u64,
    /// Per-target counter value assigned at creation
    pub target_sequence: Option<u64>,
    /// Height the entity was published at
    pub created_at_height: BlockHeight,
    /// Tombstone flag
    pub deleted: bool,
    /// Height of deletion, zero while `deleted` is false
    pub deleted_at_height: BlockHeight,
}

impl EntityRecord {
    /// Record for a freshly published post.
    pub const fn post(
        owner: Address,
        content: Hash,
        sequence_number: u64,
        owner_sequence: u64,
        created_at_height: BlockHeight,
    ) -> Self {
        Self {
            owner,
            content,
            target_key: None,
            sequence_number,
            owner_sequence,
            target_sequence: None,
            created_at_height,
            deleted: false,
            deleted_at_height: 0,
        }
    }

    /// Record for a freshly published repost or comment on `target_key`.
    pub const fn reference(
        owner: Address,
        content: Hash,
        target_key: Hash,
        sequence_number: u64,
        owner_sequence: u64,
        target_sequence: u64,
        created_at_height: BlockHeight,
    ) -> Self {
        Self {
            owner,
            content,
            target_key: Some(target_key),
            sequence_number,
            owner_sequence,
            target_sequence: Some(target_sequence),
            created_at_height,
            deleted: false,
            deleted_at_height: 0,
        }
    }

    /// Tombstoned copy of this record.
    pub fn deleted_at(&self, height: BlockHeight) -> Self {
        Self {
            deleted: true,
            deleted_at_height: height,
            ..self.clone()
        }
    }

    /// Leaf value committed in the map: keccak256 over a fixed-width
    /// encoding of every field.
    pub fn hash(&self) -> Hash {
        let (has_target, target) = match self.target_key {
            Some(key) => (1u8, key),
            None => (0u8, [0u8; 32]),
        };
        let (has_target_seq, target_seq) = match self.target_sequence {
            Some(seq) => (1u8, seq),
            None => (0u8, 0),
        };

        Keccak256Hasher::hash_parts(&[
            self.owner.as_slice(),
            self.content.as_slice(),
            &[has_target][..],
            target.as_slice(),
            &self.sequence_number.to_be_bytes()[..],
            &self.owner_sequence.to_be_bytes()[..],
            &[has_target_seq][..],
            &target_seq.to_be_bytes()[..],
            &self.created_at_height.to_be_bytes()[..],
            &[u8::from(self.deleted)][..],
            &self.deleted_at_height.to_be_bytes()[..],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_keeps_history() {
        let record = EntityRecord::post([1u8; 32], [7u8; 32], 3, 1, 10);
        let deleted = record.deleted_at(12);

        assert!(deleted.deleted);
        assert_eq!(deleted.deleted_at_height, 12);
        assert_eq!(deleted.sequence_number, 3);
        assert_eq!(deleted.created_at_height, 10);
        assert_ne!(record.hash(), deleted.hash());
    }

    #[test]
    fn test_hash_distinguishes_absent_target() {
        let post = EntityRecord::post([1u8; 32], [7u8; 32], 1, 1, 1);
        let mut zero_target = post.clone();
        zero_target.target_key = Some([0u8; 32]);
        assert_ne!(post.hash(), zero_target.hash());
    }
}
