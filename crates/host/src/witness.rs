//! Witness generation for action proofs
//!
//! The generator is the single sequencer of every map it mirrors: it builds
//! each action's inputs from the current snapshot, checks them and advances
//! the snapshot, so consecutive inputs are always adjacent.

use ed25519_dalek::SigningKey;
use tracing::debug;
use zksocial_core::{
    CommentDeletionInputs, CommentPublishingInputs, CommentsState, PostDeletionInputs,
    PostPublishingInputs, PostsState, RepostDeletionInputs, RepostPublishingInputs,
    RepostsState, TransitionError,
};
use zksocial_core::{BlockHeight, Hash};
use zksocial_smt::short_hex;

/// Witness generator over the posts, reposts and comments mirrors
#[derive(Clone, Debug, Default)]
pub struct WitnessGenerator {
    posts: PostsState,
    reposts: RepostsState,
    comments: CommentsState,
}

impl WitnessGenerator {
    /// Create a generator over empty maps
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts mirror
    pub const fn posts(&self) -> &PostsState {
        &self.posts
    }

    /// Reposts mirror
    pub const fn reposts(&self) -> &RepostsState {
        &self.reposts
    }

    /// Comments mirror
    pub const fn comments(&self) -> &CommentsState {
        &self.comments
    }

    /// Publish `content` as `owner`.
    pub fn publish_post(
        &mut self,
        owner: &SigningKey,
        content: Hash,
        height: BlockHeight,
    ) -> Result<PostPublishingInputs, TransitionError> {
        let inputs = self.posts.publication(owner, content, height);
        self.posts.apply_publication(&inputs)?;
        debug!("Post {} published at height {}", short_hex(&inputs.key()), height);
        Ok(inputs)
    }

    /// Delete `owner`'s post of `content`.
    pub fn delete_post(
        &mut self,
        owner: &SigningKey,
        content: Hash,
        height: BlockHeight,
    ) -> Result<PostDeletionInputs, TransitionError> {
        let inputs = self.posts.deletion(owner, content, height)?;
        self.posts.apply_deletion(&inputs)?;
        debug!("Post {} deleted at height {}", short_hex(&inputs.key()), height);
        Ok(inputs)
    }

    /// Repost the post at `target_key` as `owner`.
    pub fn repost(
        &mut self,
        owner: &SigningKey,
        target_key: Hash,
        height: BlockHeight,
    ) -> Result<RepostPublishingInputs, TransitionError> {
        let inputs = self
            .reposts
            .publication(&self.posts, owner, target_key, target_key, height)?;
        self.reposts.apply_publication(&inputs)?;
        debug!("Repost {} of {} at height {}", short_hex(&inputs.key()), short_hex(&target_key), height);
        Ok(inputs)
    }

    /// Delete `owner`'s repost of the post at `target_key`.
    pub fn delete_repost(
        &mut self,
        owner: &SigningKey,
        target_key: Hash,
        height: BlockHeight,
    ) -> Result<RepostDeletionInputs, TransitionError> {
        let inputs = self
            .reposts
            .deletion(&self.posts, owner, target_key, height)?;
        self.reposts.apply_deletion(&inputs)?;
        debug!("Repost {} deleted at height {}", short_hex(&inputs.key()), height);
        Ok(inputs)
    }

    /// Comment `content` on the post at `target_key` as `owner`.
    pub fn comment(
        &mut self,
        owner: &SigningKey,
        target_key: Hash,
        content: Hash,
        height: BlockHeight,
    ) -> Result<CommentPublishingInputs, TransitionError> {
        let inputs = self
            .comments
            .publication(&self.posts, owner, target_key, content, height)?;
        self.comments.apply_publication(&inputs)?;
        debug!("Comment {} on {} at height {}", short_hex(&inputs.key()), short_hex(&target_key), height);
        Ok(inputs)
    }

    /// Delete `owner`'s comment with `content`.
    pub fn delete_comment(
        &mut self,
        owner: &SigningKey,
        content: Hash,
        height: BlockHeight,
    ) -> Result<CommentDeletionInputs, TransitionError> {
        let inputs = self
            .comments
            .deletion(&self.posts, owner, content, height)?;
        self.comments.apply_deletion(&inputs)?;
        debug!("Comment {} deleted at height {}", short_hex(&inputs.key()), height);
        Ok(inputs)
    }
}
