//! Off-chain state mirrors
//!
//! A mirror holds the full contents of a family's maps and builds the inputs
//! for the next action from its current snapshot. Mirrors only advance
//! through `apply_*`, which re-runs the action's rule first.

use std::collections::HashMap;
use std::marker::PhantomData;

use ed25519_dalek::SigningKey;
use zksocial_smt::{computed_root, counter_leaf, leaf_counter, SparseMerkleTree};

use crate::actions::{
    Action, PostDeletionInputs, PostPublishingInputs, ReferenceDeletionInputs,
    ReferencePublishingInputs,
};
use crate::error::{MapId, TransitionError};
use crate::keys;
use crate::record::EntityRecord;
use crate::signature::{address_of, sign};
use crate::transition::{
    Comment, Counters, Family, PostsRoots, ReferenceKind, ReferenceRoots, Repost, RootSet, Transition,
};
use crate::types::{Address, BlockHeight, Hash};

fn count_at(map: &SparseMerkleTree, key: &Hash) -> u64 {
    map.get(key)
        .and_then(|leaf| leaf_counter(&leaf).ok())
        .unwrap_or(0)
}

/// Reject a transition that does not start at the mirror's current state.
/// A root mismatch names the first map whose root differs.
fn check_anchor<R: RootSet>(
    transition: &Transition<R>,
    roots: R,
    counters: Counters,
) -> Result<(), TransitionError> {
    let mismatch = transition
        .initial_roots
        .named_roots()
        .into_iter()
        .zip(roots.named_roots())
        .find(|((_, declared), (_, current))| declared != current);
    if let Some(((map, declared), (_, computed))) = mismatch {
        return Err(TransitionError::RootMismatch {
            map,
            declared,
            computed,
        });
    }
    if transition.initial_counters != counters {
        return Err(TransitionError::CounterMismatch {
            counter: "total",
            expected: counters.total,
            actual: transition.initial_counters.total,
        });
    }
    Ok(())
}

/// Contents of the posts module's maps.
#[derive(Clone, Debug, Default)]
pub struct PostsState {
    users_counters: SparseMerkleTree,
    posts: SparseMerkleTree,
    records: HashMap<Hash, EntityRecord>,
    counters: Counters,
}

impl PostsState {
    /// Create an empty mirror
    pub fn new() -> Self {
        Self::default()
    }

    /// Current roots
    pub fn roots(&self) -> PostsRoots {
        PostsRoots {
            users_counters: self.users_counters.root(),
            posts: self.posts.root(),
        }
    }

    /// Current global counters
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Record stored under a post key
    pub fn record(&self, key: &Hash) -> Option<&EntityRecord> {
        self.records.get(key)
    }

    /// Number of posts published by `owner`
    pub fn owner_count(&self, owner: &Address) -> u64 {
        count_at(&self.users_counters, owner)
    }

    /// Posts map, for membership witnesses
    pub const fn posts(&self) -> &SparseMerkleTree {
        &self.posts
    }

    /// Inputs for `signer` to publish `content` at `height`.
    pub fn publication(
        &self,
        signer: &SigningKey,
        content: Hash,
        height: BlockHeight,
    ) -> PostPublishingInputs {
        let owner = address_of(signer);
        let key = keys::entity_key(&owner, &content);
        let owner_count = self.owner_count(&owner);
        let record = EntityRecord::post(
            owner,
            content,
            self.counters.total + 1,
            owner_count + 1,
            height,
        );

        let owner_counter_witness = self.users_counters.witness(&owner);
        let post_witness = self.posts.witness(&key);
        PostPublishingInputs {
            signature: sign(signer, &keys::post_message(&content)),
            owner,
            content,
            initial_total: self.counters.total,
            initial_users_counters: self.users_counters.root(),
            latest_users_counters: computed_root(
                &owner_counter_witness,
                &owner,
                &counter_leaf(owner_count + 1),
            ),
            owner_count,
            owner_counter_witness,
            initial_posts: self.posts.root(),
            latest_posts: computed_root(&post_witness, &key, &record.hash()),
            post_witness,
            record,
        }
    }

    /// Inputs for `signer` to delete its post of `content` at `height`.
    pub fn deletion(
        &self,
        signer: &SigningKey,
        content: Hash,
        height: BlockHeight,
    ) -> Result<PostDeletionInputs, TransitionError> {
        let owner = address_of(signer);
        let key = keys::entity_key(&owner, &content);
        let prior = self
            .record(&key)
            .cloned()
            .ok_or(TransitionError::EntityNotFound { map: MapId::Posts })?;

        let post_witness = self.posts.witness(&key);
        let latest = prior.deleted_at(height);
        Ok(PostDeletionInputs {
            signature: sign(signer, &keys::deletion_message(Family::Posts, &content)),
            owner,
            content,
            total: self.counters.total,
            users_counters: self.users_counters.root(),
            initial_posts: self.posts.root(),
            latest_posts: computed_root(&post_witness, &key, &latest.hash()),
            post_witness,
            prior,
            deletion_height: height,
        })
    }

    /// Check a publication against the current state and apply it.
    pub fn apply_publication(
        &mut self,
        inputs: &PostPublishingInputs,
    ) -> Result<Transition<PostsRoots>, TransitionError> {
        let transition = inputs.transition()?;
        check_anchor(&transition, self.roots(), self.counters)?;

        let record = inputs.record.clone();
        self.users_counters
            .insert(inputs.owner, counter_leaf(record.owner_sequence));
        self.posts.insert(inputs.key(), record.hash());
        self.records.insert(inputs.key(), record);
        self.counters = transition.latest_counters;
        Ok(transition)
    }

    /// Check a deletion against the current state and apply it.
    pub fn apply_deletion(
        &mut self,
        inputs: &PostDeletionInputs,
    ) -> Result<Transition<PostsRoots>, TransitionError> {
        let transition = inputs.transition()?;
        check_anchor(&transition, self.roots(), self.counters)?;

        let latest = inputs.prior.deleted_at(inputs.deletion_height);
        self.posts.insert(inputs.key(), latest.hash());
        self.records.insert(inputs.key(), latest);
        Ok(transition)
    }
}

/// Contents of a repost or comment module's maps.
#[derive(Clone, Debug, Default)]
pub struct ReferencesState<K> {
    users_counters: SparseMerkleTree,
    targets_counters: SparseMerkleTree,
    entities: SparseMerkleTree,
    records: HashMap<Hash, EntityRecord>,
    counters: Counters,
    kind: PhantomData<K>,
}

/// Contents of the reposts module's maps.
pub type RepostsState = ReferencesState<Repost>;

/// Contents of the comments module's maps.
pub type CommentsState = ReferencesState<Comment>;

impl<K: ReferenceKind> ReferencesState<K> {
    /// Create an empty mirror
    pub fn new() -> Self {
        Self {
            users_counters: SparseMerkleTree::new(),
            targets_counters: SparseMerkleTree::new(),
            entities: SparseMerkleTree::new(),
            records: HashMap::new(),
            counters: Counters::default(),
            kind: PhantomData,
        }
    }

    /// Current roots
    pub fn roots(&self) -> ReferenceRoots<K> {
        ReferenceRoots::new(
            self.users_counters.root(),
            self.targets_counters.root(),
            self.entities.root(),
        )
    }

    /// Current global counters
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Record stored under an entity key
    pub fn record(&self, key: &Hash) -> Option<&EntityRecord> {
        self.records.get(key)
    }

    /// Number of entities published by `owner`
    pub fn owner_count(&self, owner: &Address) -> u64 {
        count_at(&self.users_counters, owner)
    }

    /// Number of entities referring to `target_key`
    pub fn target_count(&self, target_key: &Hash) -> u64 {
        count_at(&self.targets_counters, target_key)
    }

    /// Inputs for `signer` to publish `content` referring to the post at
    /// `target_key`, checked against the current contents of `posts`.
    /// Reposts pass the target key as their content.
    pub fn publication(
        &self,
        posts: &PostsState,
        signer: &SigningKey,
        target_key: Hash,
        content: Hash,
        height: BlockHeight,
    ) -> Result<ReferencePublishingInputs<K>, TransitionError> {
        let target = posts
            .record(&target_key)
            .cloned()
            .ok_or(TransitionError::EntityNotFound { map: MapId::Posts })?;

        let owner = address_of(signer);
        let key = keys::entity_key(&owner, &content);
        let owner_count = self.owner_count(&owner);
        let target_count = self.target_count(&target_key);
        let record = EntityRecord::reference(
            owner,
            content,
            target_key,
            self.counters.total + 1,
            owner_count + 1,
            target_count + 1,
            height,
        );

        let owner_counter_witness = self.users_counters.witness(&owner);
        let target_counter_witness = self.targets_counters.witness(&target_key);
        let entity_witness = self.entities.witness(&key);
        Ok(ReferencePublishingInputs {
            signature: sign(signer, &K::publication_message(&target_key, &content)),
            owner,
            content,
            posts_root: posts.roots().posts,
            target_witness: posts.posts().witness(&target_key),
            target,
            initial_total: self.counters.total,
            initial_users_counters: self.users_counters.root(),
            latest_users_counters: computed_root(
                &owner_counter_witness,
                &owner,
                &counter_leaf(owner_count + 1),
            ),
            owner_count,
            owner_counter_witness,
            initial_targets_counters: self.targets_counters.root(),
            latest_targets_counters: computed_root(
                &target_counter_witness,
                &target_key,
                &counter_leaf(target_count + 1),
            ),
            target_count,
            target_counter_witness,
            initial_entities: self.entities.root(),
            latest_entities: computed_root(&entity_witness, &key, &record.hash()),
            entity_witness,
            record,
            kind: PhantomData,
        })
    }

    /// Inputs for `signer` to delete its entity with `content` at `height`.
    pub fn deletion(
        &self,
        posts: &PostsState,
        signer: &SigningKey,
        content: Hash,
        height: BlockHeight,
    ) -> Result<ReferenceDeletionInputs<K>, TransitionError> {
        let owner = address_of(signer);
        let key = keys::entity_key(&owner, &content);
        let prior = self
            .record(&key)
            .cloned()
            .ok_or(TransitionError::EntityNotFound { map: K::ENTITY_MAP })?;

        let entity_witness = self.entities.witness(&key);
        let latest = prior.deleted_at(height);
        Ok(ReferenceDeletionInputs {
            signature: sign(signer, &K::deletion_message(&content)),
            owner,
            content,
            posts_root: posts.roots().posts,
            total: self.counters.total,
            users_counters: self.users_counters.root(),
            targets_counters: self.targets_counters.root(),
            initial_entities: self.entities.root(),
            latest_entities: computed_root(&entity_witness, &key, &latest.hash()),
            entity_witness,
            prior,
            deletion_height: height,
            kind: PhantomData,
        })
    }

    /// Check a publication against the current state and apply it.
    pub fn apply_publication(
        &mut self,
        inputs: &ReferencePublishingInputs<K>,
    ) -> Result<Transition<ReferenceRoots<K>>, TransitionError> {
        let transition = inputs.transition()?;
        check_anchor(&transition, self.roots(), self.counters)?;

        let record = inputs.record.clone();
        self.users_counters
            .insert(inputs.owner, counter_leaf(record.owner_sequence));
        self.targets_counters.insert(
            inputs.target_key(),
            counter_leaf(record.target_sequence.unwrap_or_default()),
        );
        self.entities.insert(inputs.key(), record.hash());
        self.records.insert(inputs.key(), record);
        self.counters = transition.latest_counters;
        Ok(transition)
    }

    /// Check a deletion against the current state and apply it.
    pub fn apply_deletion(
        &mut self,
        inputs: &ReferenceDeletionInputs<K>,
    ) -> Result<Transition<ReferenceRoots<K>>, TransitionError> {
        let transition = inputs.transition()?;
        check_anchor(&transition, self.roots(), self.counters)?;

        let latest = inputs.prior.deleted_at(inputs.deletion_height);
        self.entities.insert(inputs.key(), latest.hash());
        self.records.insert(inputs.key(), latest);
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdjacencyBreak;
    use crate::transition::merge_transitions;
    use rand::{rngs::StdRng, SeedableRng};
    use zksocial_smt::empty_root;

    fn content(value: u64) -> Hash {
        let mut digest = [0u8; 32];
        digest[24..].copy_from_slice(&value.to_be_bytes());
        digest
    }

    fn owners(count: usize) -> Vec<SigningKey> {
        let mut rng = StdRng::seed_from_u64(11);
        (0..count).map(|_| SigningKey::generate(&mut rng)).collect()
    }

    #[test]
    fn test_publication_advances_counters() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();

        let first = state.publication(alice, content(1), 1);
        let transition = state.apply_publication(&first).unwrap();
        assert_eq!(transition.initial_roots, PostsRoots::empty());
        assert_eq!(transition.latest_roots, state.roots());
        assert_eq!(transition.initial_counters, Counters::new(0));
        assert_eq!(transition.latest_counters, Counters::new(1));
        assert_eq!(transition.block_height, 1);

        let second = state.publication(alice, content(2), 1);
        state.apply_publication(&second).unwrap();
        assert_eq!(state.owner_count(&address_of(alice)), 2);
        assert_eq!(state.counters(), Counters::new(2));
        assert_eq!(second.record.owner_sequence, 2);
    }

    #[test]
    fn test_duplicate_publication_rejected() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        state
            .apply_publication(&state.publication(alice, content(777), 1))
            .unwrap();

        let duplicate = state.publication(alice, content(777), 1);
        assert_eq!(
            duplicate.transition(),
            Err(TransitionError::EntityAlreadyExists { map: MapId::Posts })
        );
    }

    #[test]
    fn test_publication_with_wrong_signer_rejected() {
        let signers = owners(2);
        let state = PostsState::new();
        let mut inputs = state.publication(&signers[0], content(3), 1);
        inputs.signature = sign(&signers[1], &keys::post_message(&content(3)));

        assert!(matches!(
            inputs.transition(),
            Err(TransitionError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn test_publication_signature_cannot_delete() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        let publication = state.publication(alice, content(3), 1);
        state.apply_publication(&publication).unwrap();

        let mut deletion = state.deletion(alice, content(3), 1).unwrap();
        deletion.signature = publication.signature;
        assert!(matches!(
            deletion.transition(),
            Err(TransitionError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn test_deletion_signed_by_other_owner_rejected() {
        let signers = owners(2);
        let (alice, bob) = (&signers[0], &signers[1]);
        let mut state = PostsState::new();
        state.apply_publication(&state.publication(alice, content(3), 1)).unwrap();

        let mut deletion = state.deletion(alice, content(3), 1).unwrap();
        deletion.signature = sign(bob, &keys::deletion_message(Family::Posts, &content(3)));
        assert!(matches!(
            deletion.transition(),
            Err(TransitionError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn test_repost_signature_cannot_publish_post() {
        let signers = owners(2);
        let (alice, bob) = (&signers[0], &signers[1]);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(alice, content(1), 1)).unwrap();
        let target = keys::entity_key(&address_of(alice), &content(1));
        let repost = RepostsState::new()
            .publication(&posts, bob, target, target, 2)
            .unwrap();

        let mut forged = posts.publication(bob, target, 2);
        forged.signature = repost.signature;
        assert!(matches!(
            forged.transition(),
            Err(TransitionError::SignatureInvalid { .. })
        ));
        assert!(matches!(
            posts.apply_publication(&forged),
            Err(TransitionError::SignatureInvalid { .. })
        ));
        assert_eq!(posts.owner_count(&address_of(bob)), 0);
    }

    #[test]
    fn test_post_deletion_signature_cannot_delete_comment() {
        let signers = owners(2);
        let (alice, bob) = (&signers[0], &signers[1]);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(alice, content(1), 1)).unwrap();
        let target = keys::entity_key(&address_of(alice), &content(1));
        let mut comments = CommentsState::new();
        comments
            .apply_publication(&comments.publication(&posts, bob, target, content(9), 2).unwrap())
            .unwrap();

        let mut deletion = comments.deletion(&posts, bob, content(9), 2).unwrap();
        deletion.signature = sign(bob, &keys::deletion_message(Family::Posts, &content(9)));
        assert!(matches!(
            deletion.transition(),
            Err(TransitionError::SignatureInvalid { .. })
        ));

        let publication = comments.publication(&posts, bob, target, content(9), 2).unwrap();
        deletion.signature = publication.signature;
        assert!(matches!(
            comments.apply_deletion(&deletion),
            Err(TransitionError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn test_anchor_names_first_differing_map() {
        let declared = PostsRoots {
            users_counters: [1u8; 32],
            posts: empty_root(),
        };
        let transition = Transition {
            initial_roots: declared,
            latest_roots: declared,
            initial_counters: Counters::default(),
            latest_counters: Counters::default(),
            referenced_root: None,
            block_height: 1,
        };

        assert_eq!(
            check_anchor(&transition, PostsRoots::empty(), Counters::default()),
            Err(TransitionError::RootMismatch {
                map: MapId::UsersPostsCounters,
                declared: [1u8; 32],
                computed: empty_root(),
            })
        );
    }

    #[test]
    fn test_publication_with_stale_counter_rejected() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        let mut inputs = state.publication(alice, content(4), 1);
        inputs.record.sequence_number = 5;
        inputs.latest_posts = computed_root(&inputs.post_witness, &inputs.key(), &inputs.record.hash());
        assert_eq!(
            inputs.transition(),
            Err(TransitionError::CounterMismatch {
                counter: "total",
                expected: 1,
                actual: 5,
            })
        );

        state.apply_publication(&state.publication(alice, content(5), 1)).unwrap();
        let stale = PostsState::new().publication(alice, content(6), 1);
        assert!(matches!(
            state.apply_publication(&stale),
            Err(TransitionError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_publication_with_forged_latest_root_rejected() {
        let signers = owners(1);
        let alice = &signers[0];
        let state = PostsState::new();
        let mut inputs = state.publication(alice, content(8), 1);
        inputs.latest_posts = [3u8; 32];

        assert!(matches!(
            inputs.transition(),
            Err(TransitionError::RootMismatch { map: MapId::Posts, .. })
        ));
    }

    #[test]
    fn test_deletion_keeps_counters() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        state
            .apply_publication(&state.publication(alice, content(777), 1))
            .unwrap();
        let before = state.roots();

        let deletion = state.deletion(alice, content(777), 2).unwrap();
        let transition = state.apply_deletion(&deletion).unwrap();
        assert_eq!(transition.initial_roots, before);
        assert_eq!(transition.initial_counters, transition.latest_counters);
        assert_eq!(transition.latest_roots.users_counters, before.users_counters);
        assert_ne!(transition.latest_roots.posts, before.posts);

        let key = keys::entity_key(&address_of(alice), &content(777));
        let record = state.record(&key).unwrap();
        assert!(record.deleted);
        assert_eq!(record.deleted_at_height, 2);
        assert_eq!(record.sequence_number, 1);
    }

    #[test]
    fn test_deletion_twice_rejected() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        state
            .apply_publication(&state.publication(alice, content(9), 1))
            .unwrap();
        state
            .apply_deletion(&state.deletion(alice, content(9), 1).unwrap())
            .unwrap();

        let again = state.deletion(alice, content(9), 2).unwrap();
        assert_eq!(
            again.transition(),
            Err(TransitionError::AlreadyDeleted { map: MapId::Posts })
        );
    }

    #[test]
    fn test_deletion_of_absent_post_rejected() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut published = PostsState::new();
        published
            .apply_publication(&published.publication(alice, content(10), 1))
            .unwrap();
        let inputs = published.deletion(alice, content(10), 1).unwrap();

        let mut other = PostsState::new();
        assert_eq!(
            other.apply_deletion(&PostDeletionInputs {
                initial_posts: other.roots().posts,
                post_witness: other.posts().witness(&inputs.key()),
                ..inputs
            }),
            Err(TransitionError::EntityNotFound { map: MapId::Posts })
        );
        assert_eq!(other.roots().posts, empty_root());
    }

    #[test]
    fn test_publish_then_delete_at_same_height_merges() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        let r0 = state.roots();

        let published = state
            .apply_publication(&state.publication(alice, content(777), 2))
            .unwrap();
        let deleted = state
            .apply_deletion(&state.deletion(alice, content(777), 2).unwrap())
            .unwrap();

        let merged = merge_transitions(&published, &deleted).unwrap();
        assert_eq!(merged.initial_roots, r0);
        assert_eq!(merged.latest_roots, state.roots());
        assert_eq!(merged.initial_counters, Counters::new(0));
        assert_eq!(merged.latest_counters, Counters::new(1));
        assert_eq!(merged.block_height, 2);
    }

    #[test]
    fn test_publish_then_delete_across_heights_does_not_merge() {
        let signers = owners(1);
        let alice = &signers[0];
        let mut state = PostsState::new();
        let published = state
            .apply_publication(&state.publication(alice, content(777), 1))
            .unwrap();
        let deleted = state
            .apply_deletion(&state.deletion(alice, content(777), 2).unwrap())
            .unwrap();

        assert_eq!(
            merge_transitions(&published, &deleted),
            Err(TransitionError::NonAdjacentTransition(AdjacencyBreak::BlockHeight))
        );
    }

    #[test]
    fn test_repost_advances_user_and_target_counters() {
        let signers = owners(2);
        let (alice, bob) = (&signers[0], &signers[1]);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(alice, content(1), 1)).unwrap();
        let target = keys::entity_key(&address_of(alice), &content(1));

        let mut reposts = RepostsState::new();
        let inputs = reposts.publication(&posts, bob, target, target, 2).unwrap();
        let transition = reposts.apply_publication(&inputs).unwrap();

        assert_eq!(transition.referenced_root, Some(posts.roots().posts));
        assert_eq!(transition.latest_counters, Counters::new(1));
        assert_eq!(reposts.owner_count(&address_of(bob)), 1);
        assert_eq!(reposts.target_count(&target), 1);
        assert_eq!(inputs.record.target_sequence, Some(1));

        let again = reposts.publication(&posts, bob, target, target, 2).unwrap();
        assert_eq!(
            again.transition(),
            Err(TransitionError::EntityAlreadyExists { map: MapId::Reposts })
        );
    }

    #[test]
    fn test_repost_content_must_be_target() {
        let signers = owners(2);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(&signers[0], content(1), 1)).unwrap();
        let target = keys::entity_key(&address_of(&signers[0]), &content(1));

        let inputs = RepostsState::new()
            .publication(&posts, &signers[1], target, content(5), 1)
            .unwrap();
        assert!(matches!(
            inputs.transition(),
            Err(TransitionError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_comment_on_deleted_post_rejected() {
        let signers = owners(2);
        let (alice, bob) = (&signers[0], &signers[1]);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(alice, content(1), 1)).unwrap();
        posts
            .apply_deletion(&posts.deletion(alice, content(1), 1).unwrap())
            .unwrap();
        let target = keys::entity_key(&address_of(alice), &content(1));

        let inputs = CommentsState::new()
            .publication(&posts, bob, target, content(40), 2)
            .unwrap();
        assert_eq!(
            inputs.transition(),
            Err(TransitionError::AlreadyDeleted { map: MapId::Posts })
        );
    }

    #[test]
    fn test_comment_against_stale_posts_root_rejected() {
        let signers = owners(2);
        let (alice, bob) = (&signers[0], &signers[1]);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(alice, content(1), 1)).unwrap();
        let target = keys::entity_key(&address_of(alice), &content(1));

        let mut inputs = CommentsState::new()
            .publication(&posts, bob, target, content(40), 2)
            .unwrap();
        inputs.posts_root = empty_root();
        assert_eq!(
            inputs.transition(),
            Err(TransitionError::EntityNotFound { map: MapId::Posts })
        );
    }

    #[test]
    fn test_comment_lifecycle() {
        let signers = owners(3);
        let (alice, bob, carol) = (&signers[0], &signers[1], &signers[2]);
        let mut posts = PostsState::new();
        posts.apply_publication(&posts.publication(alice, content(1), 1)).unwrap();
        let target = keys::entity_key(&address_of(alice), &content(1));

        let mut comments = CommentsState::new();
        for (signer, text) in [(bob, 50), (carol, 51), (bob, 52)] {
            let inputs = comments
                .publication(&posts, signer, target, content(text), 3)
                .unwrap();
            comments.apply_publication(&inputs).unwrap();
        }
        assert_eq!(comments.target_count(&target), 3);
        assert_eq!(comments.owner_count(&address_of(bob)), 2);
        assert_eq!(comments.counters(), Counters::new(3));

        let deletion = comments.deletion(&posts, carol, content(51), 4).unwrap();
        let transition = comments.apply_deletion(&deletion).unwrap();
        assert_eq!(transition.initial_counters, transition.latest_counters);
        assert_eq!(comments.target_count(&target), 3);

        assert_eq!(
            comments.deletion(&posts, alice, content(51), 4).unwrap_err(),
            TransitionError::EntityNotFound { map: MapId::Comments }
        );
    }
}
