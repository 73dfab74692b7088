//! Map keys and signed messages

use zksocial_smt::Keccak256Hasher;

use crate::transition::Family;
use crate::types::{Address, Hash, DELETE_TAG};

/// Key of an entity: `H(owner ‖ content)`.
///
/// Deterministic, so a second publication of the same content by the same
/// owner lands on an occupied key. Reposts use the reposted entity's key as
/// their content, comments use the comment's own content digest.
pub fn entity_key(owner: &Address, content: &Hash) -> Hash {
    Keccak256Hasher::hash_parts(&[owner.as_slice(), content.as_slice()])
}

/// Message signed to publish a post.
pub fn post_message(content: &Hash) -> Vec<u8> {
    tagged(b"post", &[content])
}

/// Message signed to delete an entity of `family` with the given content
/// digest.
pub fn deletion_message(family: Family, content: &Hash) -> Vec<u8> {
    [
        tagged(family.as_str().as_bytes(), &[content]).as_slice(),
        DELETE_TAG.as_slice(),
    ]
    .concat()
}

/// Message signed to repost the entity at `target_key`.
pub fn repost_message(target_key: &Hash) -> Vec<u8> {
    tagged(b"repost", &[target_key])
}

/// Message signed to comment `content` on the entity at `target_key`.
pub fn comment_message(target_key: &Hash, content: &Hash) -> Vec<u8> {
    tagged(b"comment", &[target_key, content])
}

/// `len(tag) ‖ tag ‖ parts`, so no two actions sign the same bytes.
fn tagged(tag: &[u8], parts: &[&Hash]) -> Vec<u8> {
    let mut message = Vec::with_capacity(1 + tag.len() + parts.len() * 32);
    message.push(tag.len() as u8);
    message.extend_from_slice(tag);
    for part in parts {
        message.extend_from_slice(part.as_slice());
    }
    message
}
