//! zksocial core business logic
//!
//! This crate contains the state-transition rules that are shared between:
//! - The host (transition prover, proof merger, witness generation)
//! - The ledger modules that commit merged proofs

pub mod actions;
pub mod error;
pub mod keys;
pub mod record;
pub mod signature;
pub mod state;
pub mod transition;
pub mod types;

pub use actions::{
    Action, ActionKind, CommentDeletionInputs, CommentPublishingInputs, PostDeletionInputs,
    PostPublishingInputs, ReferenceDeletionInputs, ReferencePublishingInputs,
    RepostDeletionInputs, RepostPublishingInputs,
};
pub use error::{AdjacencyBreak, MapId, TransitionError};
pub use record::EntityRecord;
pub use state::{CommentsState, PostsState, ReferencesState, RepostsState};
pub use transition::{
    merge_transitions, Comment, CommentsRoots, Counters, Family, PostsRoots, ReferenceKind,
    ReferenceRoots, Repost, RepostsRoots, RootSet, Transition,
};
pub use types::*;
