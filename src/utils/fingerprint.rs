//! Visitor fingerprinting for unique-click deduplication.

use sha2::{Digest, Sha256};

/// Computes the visitor fingerprint for a (client IP, user agent) pair.
///
/// The fingerprint keys the unique-visitor marker set: the first click from
/// a pair counts as unique, later clicks do not. Missing values hash as
/// empty strings so anonymous clients still produce a stable key.
pub fn visitor_fingerprint(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update([0u8]);
    hasher.update(user_agent.as_bytes());
    hex::encode(hasher.finalize())
}
