//! Transition statements and the merge algebra

use std::fmt::Debug;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use zksocial_smt::{empty_root, Keccak256Hasher};

use crate::actions::ActionKind;
use crate::error::{AdjacencyBreak, MapId, TransitionError};
use crate::keys;
use crate::types::{BlockHeight, Hash};

/// Action families, one ledger module each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Posts
    Posts,
    /// Reposts of posts
    Reposts,
    /// Comments on posts
    Comments,
}

impl Family {
    /// Returns the string representation of the family
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Reposts => "reposts",
            Self::Comments => "comments",
        }
    }
}

/// Roots of the maps a family owns.
pub trait RootSet:
    Copy + Debug + Eq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Family owning these maps
    const FAMILY: Family;

    /// Roots of a family whose maps are all empty.
    fn empty() -> Self;

    /// Root of the family's entity map, read by dependent modules.
    fn primary(&self) -> Hash;

    /// Every root in a fixed order, for hashing.
    fn to_hashes(&self) -> Vec<Hash>;

    /// Every root next to the map it belongs to, in `to_hashes` order.
    fn named_roots(&self) -> Vec<(MapId, Hash)>;
}

/// Global scalar counters of a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Number of entities ever published in the family
    pub total: u64,
}

impl Counters {
    /// Counters with the given total
    pub const fn new(total: u64) -> Self {
        Self { total }
    }

    /// Counters after one more publication
    pub const fn incremented(&self) -> Self {
        Self { total: self.total + 1 }
    }
}

/// Roots owned by the posts module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsRoots {
    /// Owner address -> number of posts
    pub users_counters: Hash,
    /// Post key -> record hash
    pub posts: Hash,
}

impl RootSet for PostsRoots {
    const FAMILY: Family = Family::Posts;

    fn empty() -> Self {
        Self {
            users_counters: empty_root(),
            posts: empty_root(),
        }
    }

    fn primary(&self) -> Hash {
        self.posts
    }

    fn to_hashes(&self) -> Vec<Hash> {
        vec![self.users_counters, self.posts]
    }

    fn named_roots(&self) -> Vec<(MapId, Hash)> {
        vec![
            (MapId::UsersPostsCounters, self.users_counters),
            (MapId::Posts, self.posts),
        ]
    }
}

/// Reference-bearing entity kinds (reposts, comments). Both are validated
/// against the posts map and keep per-owner and per-target counters.
pub trait ReferenceKind:
    Copy + Debug + Default + Eq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Family of the kind
    const FAMILY: Family;
    /// Action kind for a publication
    const PUBLISH: ActionKind;
    /// Action kind for a deletion
    const DELETE: ActionKind;
    /// Map of entity records
    const ENTITY_MAP: MapId;
    /// Map of per-owner counters
    const USERS_MAP: MapId;
    /// Map of per-target counters
    const TARGETS_MAP: MapId;
    /// Whether the content digest must equal the target key
    const CONTENT_IS_TARGET: bool;

    /// Message an owner signs to publish.
    fn publication_message(target_key: &Hash, content: &Hash) -> Vec<u8>;

    /// Message an owner signs to delete.
    fn deletion_message(content: &Hash) -> Vec<u8> {
        keys::deletion_message(Self::FAMILY, content)
    }
}

/// Marker for reposts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repost;

impl ReferenceKind for Repost {
    const FAMILY: Family = Family::Reposts;
    const PUBLISH: ActionKind = ActionKind::RepostPublishing;
    const DELETE: ActionKind = ActionKind::RepostDeletion;
    const ENTITY_MAP: MapId = MapId::Reposts;
    const USERS_MAP: MapId = MapId::UsersRepostsCounters;
    const TARGETS_MAP: MapId = MapId::TargetsRepostsCounters;
    const CONTENT_IS_TARGET: bool = true;

    fn publication_message(target_key: &Hash, _content: &Hash) -> Vec<u8> {
        keys::repost_message(target_key)
    }
}

/// Marker for comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment;

impl ReferenceKind for Comment {
    const FAMILY: Family = Family::Comments;
    const PUBLISH: ActionKind = ActionKind::CommentPublishing;
    const DELETE: ActionKind = ActionKind::CommentDeletion;
    const ENTITY_MAP: MapId = MapId::Comments;
    const USERS_MAP: MapId = MapId::UsersCommentsCounters;
    const TARGETS_MAP: MapId = MapId::TargetsCommentsCounters;
    const CONTENT_IS_TARGET: bool = false;

    fn publication_message(target_key: &Hash, content: &Hash) -> Vec<u8> {
        keys::comment_message(target_key, content)
    }
}

/// Roots owned by a reference-bearing module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRoots<K> {
    /// Owner address -> number of entities
    pub users_counters: Hash,
    /// Target key -> number of entities referring to it
    pub targets_counters: Hash,
    /// Entity key -> record hash
    pub entities: Hash,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K> ReferenceRoots<K> {
    /// Roots from their parts
    pub const fn new(users_counters: Hash, targets_counters: Hash, entities: Hash) -> Self {
        Self {
            users_counters,
            targets_counters,
            entities,
            kind: PhantomData,
        }
    }
}

impl<K: ReferenceKind> RootSet for ReferenceRoots<K> {
    const FAMILY: Family = K::FAMILY;

    fn empty() -> Self {
        Self::new(empty_root(), empty_root(), empty_root())
    }

    fn primary(&self) -> Hash {
        self.entities
    }

    fn to_hashes(&self) -> Vec<Hash> {
        vec![self.users_counters, self.targets_counters, self.entities]
    }

    fn named_roots(&self) -> Vec<(MapId, Hash)> {
        vec![
            (K::USERS_MAP, self.users_counters),
            (K::TARGETS_MAP, self.targets_counters),
            (K::ENTITY_MAP, self.entities),
        ]
    }
}

/// Roots owned by the reposts module.
pub type RepostsRoots = ReferenceRoots<Repost>;

/// Roots owned by the comments module.
pub type CommentsRoots = ReferenceRoots<Comment>;

/// Claimed before/after pair of roots and counters, valid at one height.
///
/// A pure value: created once, then consumed by the merger or a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<R> {
    /// Roots before the actions
    pub initial_roots: R,
    /// Roots after the actions
    pub latest_roots: R,
    /// Counters before the actions
    pub initial_counters: Counters,
    /// Counters after the actions
    pub latest_counters: Counters,
    /// Posts root a repost or comment was checked against
    pub referenced_root: Option<Hash>,
    /// Height the transition is valid at
    pub block_height: BlockHeight,
}

impl<R: RootSet> Transition<R> {
    /// Whether the transition leaves roots and counters untouched.
    pub fn is_identity(&self) -> bool {
        self.initial_roots == self.latest_roots && self.initial_counters == self.latest_counters
    }

    /// Keccak256 commitment to the statement.
    pub fn digest(&self) -> Hash {
        let mut bytes = Vec::with_capacity(256);
        bytes.extend_from_slice(R::FAMILY.as_str().as_bytes());
        for root in self.initial_roots.to_hashes() {
            bytes.extend_from_slice(&root);
        }
        for root in self.latest_roots.to_hashes() {
            bytes.extend_from_slice(&root);
        }
        bytes.extend_from_slice(&self.initial_counters.total.to_be_bytes());
        bytes.extend_from_slice(&self.latest_counters.total.to_be_bytes());
        match self.referenced_root {
            Some(root) => {
                bytes.push(1);
                bytes.extend_from_slice(&root);
            }
            None => bytes.push(0),
        }
        bytes.extend_from_slice(&self.block_height.to_be_bytes());
        Keccak256Hasher::hash(&bytes)
    }
}

/// Concatenate two adjacent transitions.
///
/// Order matters: `first` must end exactly where `second` starts, at the
/// same height and against the same referenced root.
pub fn merge_transitions<R: RootSet>(
    first: &Transition<R>,
    second: &Transition<R>,
) -> Result<Transition<R>, TransitionError> {
    if first.latest_roots != second.initial_roots {
        return Err(TransitionError::NonAdjacentTransition(AdjacencyBreak::Roots));
    }
    if first.latest_counters != second.initial_counters {
        return Err(TransitionError::NonAdjacentTransition(AdjacencyBreak::Counters));
    }
    if first.block_height != second.block_height {
        return Err(TransitionError::NonAdjacentTransition(AdjacencyBreak::BlockHeight));
    }
    if first.referenced_root != second.referenced_root {
        return Err(TransitionError::NonAdjacentTransition(AdjacencyBreak::ReferencedRoot));
    }

    Ok(Transition {
        initial_roots: first.initial_roots,
        latest_roots: second.latest_roots,
        initial_counters: first.initial_counters,
        latest_counters: second.latest_counters,
        referenced_root: first.referenced_root,
        block_height: first.block_height,
    })
}
