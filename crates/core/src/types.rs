//! Common types

pub use zksocial_smt::Hash;

/// Owner address: the 32-byte ed25519 verifying key of the author
pub type Address = [u8; 32];

/// Block height type
pub type BlockHeight = u64;

/// Tag appended to a content digest when signing a deletion, so a
/// publication signature can never be replayed as a deletion.
pub const DELETE_TAG: [u8; 8] = *b"\x00DELETE\x00";
