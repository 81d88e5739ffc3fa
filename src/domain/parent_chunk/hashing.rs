//! Content fingerprinting for parent chunk deduplication

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const CONTENT_HASH_LEN: usize = 64;

/// SHA-256 of the UTF-8 bytes of `content`, lowercase hex.
///
/// Byte-exact: no whitespace or case normalization is applied.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Length of `content` in Unicode scalar values
pub fn char_count(content: &str) -> usize {
    content.chars().count()
}

/// Whether `hash` is shaped like a [`content_hash`] output
pub fn is_valid_content_hash(hash: &str) -> bool {
    hash.len() == CONTENT_HASH_LEN
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
