//! Post publication and deletion

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use zksocial_smt::MapWitness;

use super::{
    check_count, check_counter_increment, check_insertion, check_replacement, next_count, Action,
    ActionKind,
};
use crate::error::{MapId, TransitionError};
use crate::keys;
use crate::record::EntityRecord;
use crate::signature::verify_owner_signature;
use crate::transition::{Counters, Family, PostsRoots, Transition};
use crate::types::{Address, BlockHeight, Hash};

/// Inputs to publish a post.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostPublishingInputs {
    /// Owner signature over the content digest
    pub signature: Signature,
    /// Claimed owner
    pub owner: Address,
    /// Content digest
    pub content: Hash,
    /// Global post counter before the publication
    pub initial_total: u64,
    /// Per-owner counters root before
    pub initial_users_counters: Hash,
    /// Per-owner counters root after
    pub latest_users_counters: Hash,
    /// Owner's post count before the publication
    pub owner_count: u64,
    /// Witness for the owner in the counters map
    pub owner_counter_witness: MapWitness,
    /// Posts root before
    pub initial_posts: Hash,
    /// Posts root after
    pub latest_posts: Hash,
    /// Witness for the post key in the posts map
    pub post_witness: MapWitness,
    /// New post record
    pub record: EntityRecord,
}

impl PostPublishingInputs {
    /// Key of the post in the posts map
    pub fn key(&self) -> Hash {
        keys::entity_key(&self.owner, &self.content)
    }
}

impl Action for PostPublishingInputs {
    type Roots = PostsRoots;

    const KIND: ActionKind = ActionKind::PostPublishing;

    fn transition(&self) -> Result<Transition<PostsRoots>, TransitionError> {
        verify_owner_signature(&self.owner, &keys::post_message(&self.content), &self.signature)?;

        let record = &self.record;
        if record.owner != self.owner || record.content != self.content {
            return Err(TransitionError::InvalidRecord("record does not match the signed post"));
        }
        if record.target_key.is_some() || record.target_sequence.is_some() {
            return Err(TransitionError::InvalidRecord("a post has no target"));
        }
        if record.deleted || record.deleted_at_height != 0 {
            return Err(TransitionError::InvalidRecord("a new post cannot be deleted"));
        }

        check_insertion(
            MapId::Posts,
            &self.post_witness,
            &self.key(),
            &record.hash(),
            &self.initial_posts,
            &self.latest_posts,
        )?;

        let latest_total = next_count(self.initial_total)?;
        check_count("total", latest_total, record.sequence_number)?;

        let owner_sequence = check_counter_increment(
            MapId::UsersPostsCounters,
            &self.owner_counter_witness,
            &self.owner,
            self.owner_count,
            &self.initial_users_counters,
            &self.latest_users_counters,
        )?;
        check_count("owner", owner_sequence, record.owner_sequence)?;

        Ok(Transition {
            initial_roots: PostsRoots {
                users_counters: self.initial_users_counters,
                posts: self.initial_posts,
            },
            latest_roots: PostsRoots {
                users_counters: self.latest_users_counters,
                posts: self.latest_posts,
            },
            initial_counters: Counters::new(self.initial_total),
            latest_counters: Counters::new(latest_total),
            referenced_root: None,
            block_height: record.created_at_height,
        })
    }
}

/// Inputs to delete a post.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostDeletionInputs {
    /// Owner signature over the content digest and the deletion tag
    pub signature: Signature,
    /// Claimed owner
    pub owner: Address,
    /// Content digest of the post
    pub content: Hash,
    /// Current global post counter
    pub total: u64,
    /// Current per-owner counters root
    pub users_counters: Hash,
    /// Posts root before
    pub initial_posts: Hash,
    /// Posts root after
    pub latest_posts: Hash,
    /// Witness for the post key in the posts map
    pub post_witness: MapWitness,
    /// Record currently stored for the post
    pub prior: EntityRecord,
    /// Height the deletion is made at
    pub deletion_height: BlockHeight,
}

impl PostDeletionInputs {
    /// Key of the post in the posts map
    pub fn key(&self) -> Hash {
        keys::entity_key(&self.owner, &self.content)
    }
}

impl Action for PostDeletionInputs {
    type Roots = PostsRoots;

    const KIND: ActionKind = ActionKind::PostDeletion;

    fn transition(&self) -> Result<Transition<PostsRoots>, TransitionError> {
        verify_owner_signature(
            &self.owner,
            &keys::deletion_message(Family::Posts, &self.content),
            &self.signature,
        )?;

        let prior = &self.prior;
        if prior.owner != self.owner || prior.content != self.content {
            return Err(TransitionError::InvalidRecord("record does not match the signed post"));
        }
        if prior.deleted {
            return Err(TransitionError::AlreadyDeleted { map: MapId::Posts });
        }
        if self.deletion_height < prior.created_at_height {
            return Err(TransitionError::InvalidRecord("deletion precedes publication"));
        }

        let latest = prior.deleted_at(self.deletion_height);
        check_replacement(
            MapId::Posts,
            &self.post_witness,
            &self.key(),
            &prior.hash(),
            &latest.hash(),
            &self.initial_posts,
            &self.latest_posts,
        )?;

        Ok(Transition {
            initial_roots: PostsRoots {
                users_counters: self.users_counters,
                posts: self.initial_posts,
            },
            latest_roots: PostsRoots {
                users_counters: self.users_counters,
                posts: self.latest_posts,
            },
            initial_counters: Counters::new(self.total),
            latest_counters: Counters::new(self.total),
            referenced_root: None,
            block_height: self.deletion_height,
        })
    }
}
