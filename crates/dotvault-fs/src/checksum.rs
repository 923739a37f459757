//! SHA-256 checksum utilities
//!
//! Checksums are bare lowercase hex digests. The empty string is reserved
//! to mean "no content" and is never produced by these functions.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of string content as lowercase hex.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checksum of optional content; absent content hashes to `""`.
pub fn checksum_or_empty(content: Option<&str>) -> String {
    content.map(compute_content_checksum).unwrap_or_default()
}
