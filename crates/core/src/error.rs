//! Transition error types

use std::fmt;

use zksocial_smt::short_hex;

use crate::types::Hash;

/// Authenticated maps a transition can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapId {
    /// Post records
    Posts,
    /// Per-owner post counters
    UsersPostsCounters,
    /// Repost records
    Reposts,
    /// Per-owner repost counters
    UsersRepostsCounters,
    /// Per-target repost counters
    TargetsRepostsCounters,
    /// Comment records
    Comments,
    /// Per-owner comment counters
    UsersCommentsCounters,
    /// Per-target comment counters
    TargetsCommentsCounters,
}

impl MapId {
    /// Returns the string representation of the map
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::UsersPostsCounters => "users_posts_counters",
            Self::Reposts => "reposts",
            Self::UsersRepostsCounters => "users_reposts_counters",
            Self::TargetsRepostsCounters => "targets_reposts_counters",
            Self::Comments => "comments",
            Self::UsersCommentsCounters => "users_comments_counters",
            Self::TargetsCommentsCounters => "targets_comments_counters",
        }
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which continuity condition two transitions broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacencyBreak {
    /// First latest roots differ from second initial roots
    Roots,
    /// First latest counters differ from second initial counters
    Counters,
    /// Transitions attributed to different heights
    BlockHeight,
    /// Transitions checked against different referenced roots
    ReferencedRoot,
}

impl fmt::Display for AdjacencyBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Roots => "root continuity",
            Self::Counters => "counter continuity",
            Self::BlockHeight => "block height",
            Self::ReferencedRoot => "referenced root",
        })
    }
}

/// Hard constraint violated while building or merging a transition.
///
/// None of these are retryable with the same inputs: the caller must rebuild
/// its witnesses against the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Signature does not verify under the claimed owner key
    #[error("signature invalid for owner 0x{owner}")]
    SignatureInvalid {
        /// Hex-encoded owner address
        owner: String,
    },
    /// Witness and declared root are inconsistent
    #[error("{map} root mismatch: declared {}, witness implies {}", short_hex(.declared), short_hex(.computed))]
    RootMismatch {
        /// Map whose root was checked
        map: MapId,
        /// Root the caller declared
        declared: Hash,
        /// Root recomputed from the witness
        computed: Hash,
    },
    /// Sequence discontinuity
    #[error("{counter} counter mismatch: expected {expected}, got {actual}")]
    CounterMismatch {
        /// Name of the counter
        counter: &'static str,
        /// Value implied by the committed state
        expected: u64,
        /// Value the caller claimed
        actual: u64,
    },
    /// Key already present in the map
    #[error("entity already exists in {map}")]
    EntityAlreadyExists {
        /// Map holding the entity
        map: MapId,
    },
    /// Key absent from the map
    #[error("entity not found in {map}")]
    EntityNotFound {
        /// Map expected to hold the entity
        map: MapId,
    },
    /// Entity already tombstoned
    #[error("entity in {map} is already deleted")]
    AlreadyDeleted {
        /// Map holding the entity
        map: MapId,
    },
    /// Record fields disagree with the action inputs
    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),
    /// Two transitions cannot be concatenated
    #[error("non-adjacent transitions: {0} discontinuity")]
    NonAdjacentTransition(AdjacencyBreak),
}
