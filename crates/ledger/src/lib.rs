//! On-chain ledger modules for zksocial
//!
//! A ledger holds a family's current roots and counters and advances them
//! only by applying a proof anchored at that exact state.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{
    CommentsLedger, Ledger, LedgerState, PostsLedger, PrimaryRoot, RepostsLedger, SharedLedger,
};
