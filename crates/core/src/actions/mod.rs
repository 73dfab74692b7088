//! Per-action transition rules
//!
//! Each action's inputs carry everything the rule needs: signature, declared
//! roots, witnesses and the claimed records. The rule treats the maps as a
//! pure oracle of path validity and never trusts a root it did not recompute.

mod posts;
mod references;

use serde::{Deserialize, Serialize};
use zksocial_smt::{computed_root, counter_leaf, leaf_counter, MapWitness, EMPTY_LEAF};

use crate::error::{MapId, TransitionError};
use crate::transition::{Family, RootSet, Transition};
use crate::types::Hash;

pub use posts::{PostDeletionInputs, PostPublishingInputs};
pub use references::{
    CommentDeletionInputs, CommentPublishingInputs, ReferenceDeletionInputs,
    ReferencePublishingInputs, RepostDeletionInputs, RepostPublishingInputs,
};

/// Kinds of single actions a proof can attest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Publish a post
    PostPublishing,
    /// Delete a post
    PostDeletion,
    /// Repost a post
    RepostPublishing,
    /// Delete a repost
    RepostDeletion,
    /// Comment on a post
    CommentPublishing,
    /// Delete a comment
    CommentDeletion,
}

impl ActionKind {
    /// Family whose ledger the action updates
    pub const fn family(&self) -> Family {
        match self {
            Self::PostPublishing | Self::PostDeletion => Family::Posts,
            Self::RepostPublishing | Self::RepostDeletion => Family::Reposts,
            Self::CommentPublishing | Self::CommentDeletion => Family::Comments,
        }
    }

    /// Returns the string representation of the action
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostPublishing => "post_publishing",
            Self::PostDeletion => "post_deletion",
            Self::RepostPublishing => "repost_publishing",
            Self::RepostDeletion => "repost_deletion",
            Self::CommentPublishing => "comment_publishing",
            Self::CommentDeletion => "comment_deletion",
        }
    }
}

/// Inputs of one action, checkable into a [`Transition`].
pub trait Action: Serialize + Send + Sync + 'static {
    /// Roots of the family the action updates
    type Roots: RootSet;

    /// Which action the inputs describe
    const KIND: ActionKind;

    /// Run every check of the action and return the transition it proves.
    fn transition(&self) -> Result<Transition<Self::Roots>, TransitionError>;
}

/// Counter after one more action.
fn next_count(count: u64) -> Result<u64, TransitionError> {
    count
        .checked_add(1)
        .ok_or(TransitionError::InvalidRecord("counter overflow"))
}

fn check_count(counter: &'static str, expected: u64, actual: u64) -> Result<(), TransitionError> {
    if expected != actual {
        return Err(TransitionError::CounterMismatch {
            counter,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_root(map: MapId, declared: &Hash, computed: Hash) -> Result<(), TransitionError> {
    if computed != *declared {
        return Err(TransitionError::RootMismatch {
            map,
            declared: *declared,
            computed,
        });
    }
    Ok(())
}

/// `key` holds `leaf` under `root`.
fn check_membership(
    map: MapId,
    witness: &MapWitness,
    key: &Hash,
    leaf: &Hash,
    root: &Hash,
) -> Result<(), TransitionError> {
    let computed = computed_root(witness, key, leaf);
    if computed != *root {
        if computed_root(witness, key, &EMPTY_LEAF) == *root {
            return Err(TransitionError::EntityNotFound { map });
        }
        return check_root(map, root, computed);
    }
    Ok(())
}

/// `key` is absent under `initial_root`, and setting it to `leaf` along the
/// same path yields `latest_root`.
fn check_insertion(
    map: MapId,
    witness: &MapWitness,
    key: &Hash,
    leaf: &Hash,
    initial_root: &Hash,
    latest_root: &Hash,
) -> Result<(), TransitionError> {
    let computed = computed_root(witness, key, &EMPTY_LEAF);
    if computed != *initial_root {
        if let Some(stored) = witness.leaf {
            if computed_root(witness, key, &stored) == *initial_root {
                return Err(TransitionError::EntityAlreadyExists { map });
            }
        }
        return check_root(map, initial_root, computed);
    }
    check_root(map, latest_root, computed_root(witness, key, leaf))
}

/// `key` holds `prior` under `initial_root`, and replacing it with `leaf`
/// yields `latest_root`.
fn check_replacement(
    map: MapId,
    witness: &MapWitness,
    key: &Hash,
    prior: &Hash,
    leaf: &Hash,
    initial_root: &Hash,
    latest_root: &Hash,
) -> Result<(), TransitionError> {
    check_membership(map, witness, key, prior, initial_root)?;
    check_root(map, latest_root, computed_root(witness, key, leaf))
}

/// The counter at `key` reads `claimed` under `initial_root` and
/// `claimed + 1` under `latest_root`. Returns the incremented value.
fn check_counter_increment(
    map: MapId,
    witness: &MapWitness,
    key: &Hash,
    claimed: u64,
    initial_root: &Hash,
    latest_root: &Hash,
) -> Result<u64, TransitionError> {
    let computed = computed_root(witness, key, &counter_leaf(claimed));
    if computed != *initial_root {
        let stored = witness.leaf.unwrap_or(EMPTY_LEAF);
        if computed_root(witness, key, &stored) == *initial_root {
            if let Ok(actual) = leaf_counter(&stored) {
                return Err(TransitionError::CounterMismatch {
                    counter: map.as_str(),
                    expected: actual,
                    actual: claimed,
                });
            }
        }
        return Err(TransitionError::RootMismatch {
            map,
            declared: *initial_root,
            computed,
        });
    }

    let next = next_count(claimed)?;
    check_root(map, latest_root, computed_root(witness, key, &counter_leaf(next)))?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zksocial_smt::SparseMerkleTree;

    #[test]
    fn test_counter_increment_reports_stale_claim() {
        let mut counters = SparseMerkleTree::new();
        let owner = [4u8; 32];
        counters.insert(owner, counter_leaf(3));

        let witness = counters.witness(&owner);
        let initial = counters.root();
        let latest = computed_root(&witness, &owner, &counter_leaf(4));

        assert_eq!(
            check_counter_increment(MapId::UsersPostsCounters, &witness, &owner, 3, &initial, &latest),
            Ok(4)
        );
        assert_eq!(
            check_counter_increment(MapId::UsersPostsCounters, &witness, &owner, 2, &initial, &latest),
            Err(TransitionError::CounterMismatch {
                counter: "users_posts_counters",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_counter_witness_off_root_is_root_mismatch() {
        let mut counters = SparseMerkleTree::new();
        let owner = [4u8; 32];
        counters.insert(owner, counter_leaf(3));
        let witness = counters.witness(&owner);
        let latest = computed_root(&witness, &owner, &counter_leaf(4));
        let declared = [9u8; 32];

        assert_eq!(
            check_counter_increment(MapId::UsersPostsCounters, &witness, &owner, 3, &declared, &latest),
            Err(TransitionError::RootMismatch {
                map: MapId::UsersPostsCounters,
                declared,
                computed: counters.root(),
            })
        );
    }

    #[test]
    fn test_absent_counter_reads_zero() {
        let counters = SparseMerkleTree::new();
        let owner = [4u8; 32];
        let witness = counters.witness(&owner);
        let latest = computed_root(&witness, &owner, &counter_leaf(1));

        assert_eq!(
            check_counter_increment(
                MapId::UsersPostsCounters,
                &witness,
                &owner,
                0,
                &counters.root(),
                &latest
            ),
            Ok(1)
        );
    }

    #[test]
    fn test_membership_distinguishes_absent_key() {
        let mut map = SparseMerkleTree::new();
        map.insert([1u8; 32], [1u8; 32]);
        let key = [2u8; 32];
        let witness = map.witness(&key);

        assert_eq!(
            check_membership(MapId::Posts, &witness, &key, &[5u8; 32], &map.root()),
            Err(TransitionError::EntityNotFound { map: MapId::Posts })
        );
        assert!(matches!(
            check_membership(MapId::Posts, &witness, &key, &[5u8; 32], &[0u8; 32]),
            Err(TransitionError::RootMismatch { .. })
        ));
    }
}
