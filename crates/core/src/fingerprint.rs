//! Cache key derivation.

use sha2::{Digest, Sha256};

use crate::types::Fingerprint;

/// Derive the cache key for a source URL.
///
/// SHA-256 over the exact URL bytes, lowercase hex. No normalization is
/// applied: a trailing slash, reordered query or different case is a
/// different source.
pub fn fingerprint(source_url: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(source_url.as_bytes());
    Fingerprint(format!("{:x}", hasher.finalize()))
}
