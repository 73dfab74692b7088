//! Repost and comment publication and deletion
//!
//! Both kinds point at a post. The post must be live in the posts map the
//! action was checked against, and that posts root travels with the
//! transition so the ledger can match it against the posts module.

use std::marker::PhantomData;

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use zksocial_smt::MapWitness;

use super::{
    check_count, check_counter_increment, check_insertion, check_membership, check_replacement,
    next_count, Action, ActionKind,
};
use crate::error::{MapId, TransitionError};
use crate::keys;
use crate::record::EntityRecord;
use crate::signature::verify_owner_signature;
use crate::transition::{Comment, Counters, ReferenceKind, ReferenceRoots, Repost, Transition};
use crate::types::{Address, BlockHeight, Hash};

/// Inputs to publish a repost or a comment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferencePublishingInputs<K> {
    /// Owner signature over the kind's publication message
    pub signature: Signature,
    /// Claimed owner
    pub owner: Address,
    /// Content digest (the target key for reposts)
    pub content: Hash,
    /// Posts root the target is checked against
    pub posts_root: Hash,
    /// Record of the target post
    pub target: EntityRecord,
    /// Witness for the target key in the posts map
    pub target_witness: MapWitness,
    /// Global counter before the publication
    pub initial_total: u64,
    /// Per-owner counters root before
    pub initial_users_counters: Hash,
    /// Per-owner counters root after
    pub latest_users_counters: Hash,
    /// Owner's count before the publication
    pub owner_count: u64,
    /// Witness for the owner in the per-owner counters map
    pub owner_counter_witness: MapWitness,
    /// Per-target counters root before
    pub initial_targets_counters: Hash,
    /// Per-target counters root after
    pub latest_targets_counters: Hash,
    /// Target's count before the publication
    pub target_count: u64,
    /// Witness for the target key in the per-target counters map
    pub target_counter_witness: MapWitness,
    /// Entity root before
    pub initial_entities: Hash,
    /// Entity root after
    pub latest_entities: Hash,
    /// Witness for the new key in the entity map
    pub entity_witness: MapWitness,
    /// New record
    pub record: EntityRecord,
    /// Reference kind marker
    #[serde(skip)]
    pub kind: PhantomData<K>,
}

/// Inputs to repost a post.
pub type RepostPublishingInputs = ReferencePublishingInputs<Repost>;

/// Inputs to comment on a post.
pub type CommentPublishingInputs = ReferencePublishingInputs<Comment>;

impl<K: ReferenceKind> ReferencePublishingInputs<K> {
    /// Key of the target post
    pub fn target_key(&self) -> Hash {
        keys::entity_key(&self.target.owner, &self.target.content)
    }

    /// Key of the new entity
    pub fn key(&self) -> Hash {
        keys::entity_key(&self.owner, &self.content)
    }
}

impl<K: ReferenceKind> Action for ReferencePublishingInputs<K> {
    type Roots = ReferenceRoots<K>;

    const KIND: ActionKind = K::PUBLISH;

    fn transition(&self) -> Result<Transition<ReferenceRoots<K>>, TransitionError> {
        let target_key = self.target_key();
        verify_owner_signature(
            &self.owner,
            &K::publication_message(&target_key, &self.content),
            &self.signature,
        )?;
        if K::CONTENT_IS_TARGET && self.content != target_key {
            return Err(TransitionError::InvalidRecord("repost content must be the target key"));
        }

        let target = &self.target;
        if target.target_key.is_some() {
            return Err(TransitionError::InvalidRecord("target is not a post"));
        }
        check_membership(
            MapId::Posts,
            &self.target_witness,
            &target_key,
            &target.hash(),
            &self.posts_root,
        )?;
        if target.deleted {
            return Err(TransitionError::AlreadyDeleted { map: MapId::Posts });
        }

        let record = &self.record;
        if record.owner != self.owner
            || record.content != self.content
            || record.target_key != Some(target_key)
        {
            return Err(TransitionError::InvalidRecord("record does not match the signed action"));
        }
        if record.deleted || record.deleted_at_height != 0 {
            return Err(TransitionError::InvalidRecord("a new entity cannot be deleted"));
        }

        check_insertion(
            K::ENTITY_MAP,
            &self.entity_witness,
            &self.key(),
            &record.hash(),
            &self.initial_entities,
            &self.latest_entities,
        )?;

        let latest_total = next_count(self.initial_total)?;
        check_count("total", latest_total, record.sequence_number)?;

        let owner_sequence = check_counter_increment(
            K::USERS_MAP,
            &self.owner_counter_witness,
            &self.owner,
            self.owner_count,
            &self.initial_users_counters,
            &self.latest_users_counters,
        )?;
        check_count("owner", owner_sequence, record.owner_sequence)?;

        let target_sequence = check_counter_increment(
            K::TARGETS_MAP,
            &self.target_counter_witness,
            &target_key,
            self.target_count,
            &self.initial_targets_counters,
            &self.latest_targets_counters,
        )?;
        check_count("target", target_sequence, record.target_sequence.unwrap_or_default())?;

        Ok(Transition {
            initial_roots: ReferenceRoots::new(
                self.initial_users_counters,
                self.initial_targets_counters,
                self.initial_entities,
            ),
            latest_roots: ReferenceRoots::new(
                self.latest_users_counters,
                self.latest_targets_counters,
                self.latest_entities,
            ),
            initial_counters: Counters::new(self.initial_total),
            latest_counters: Counters::new(latest_total),
            referenced_root: Some(self.posts_root),
            block_height: record.created_at_height,
        })
    }
}

/// Inputs to delete a repost or a comment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceDeletionInputs<K> {
    /// Owner signature over the content digest and the deletion tag
    pub signature: Signature,
    /// Claimed owner
    pub owner: Address,
    /// Content digest of the entity
    pub content: Hash,
    /// Current posts root
    pub posts_root: Hash,
    /// Current global counter
    pub total: u64,
    /// Current per-owner counters root
    pub users_counters: Hash,
    /// Current per-target counters root
    pub targets_counters: Hash,
    /// Entity root before
    pub initial_entities: Hash,
    /// Entity root after
    pub latest_entities: Hash,
    /// Witness for the entity key
    pub entity_witness: MapWitness,
    /// Record currently stored for the entity
    pub prior: EntityRecord,
    /// Height the deletion is made at
    pub deletion_height: BlockHeight,
    /// Reference kind marker
    #[serde(skip)]
    pub kind: PhantomData<K>,
}

/// Inputs to delete a repost.
pub type RepostDeletionInputs = ReferenceDeletionInputs<Repost>;

/// Inputs to delete a comment.
pub type CommentDeletionInputs = ReferenceDeletionInputs<Comment>;

impl<K: ReferenceKind> ReferenceDeletionInputs<K> {
    /// Key of the entity
    pub fn key(&self) -> Hash {
        keys::entity_key(&self.owner, &self.content)
    }
}

impl<K: ReferenceKind> Action for ReferenceDeletionInputs<K> {
    type Roots = ReferenceRoots<K>;

    const KIND: ActionKind = K::DELETE;

    fn transition(&self) -> Result<Transition<ReferenceRoots<K>>, TransitionError> {
        verify_owner_signature(
            &self.owner,
            &K::deletion_message(&self.content),
            &self.signature,
        )?;

        let prior = &self.prior;
        if prior.owner != self.owner || prior.content != self.content {
            return Err(TransitionError::InvalidRecord("record does not match the signed action"));
        }
        if prior.deleted {
            return Err(TransitionError::AlreadyDeleted { map: K::ENTITY_MAP });
        }
        if self.deletion_height < prior.created_at_height {
            return Err(TransitionError::InvalidRecord("deletion precedes publication"));
        }

        let latest = prior.deleted_at(self.deletion_height);
        check_replacement(
            K::ENTITY_MAP,
            &self.entity_witness,
            &self.key(),
            &prior.hash(),
            &latest.hash(),
            &self.initial_entities,
            &self.latest_entities,
        )?;

        let roots = |entities: Hash| {
            ReferenceRoots::<K>::new(self.users_counters, self.targets_counters, entities)
        };
        Ok(Transition {
            initial_roots: roots(self.initial_entities),
            latest_roots: roots(self.latest_entities),
            initial_counters: Counters::new(self.total),
            latest_counters: Counters::new(self.total),
            referenced_root: Some(self.posts_root),
            block_height: self.deletion_height,
        })
    }
}
