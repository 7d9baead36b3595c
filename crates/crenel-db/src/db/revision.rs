//! Revision tags for stored availability documents.

use sha2::{Digest, Sha256};
use tracing_unwrap::ResultExt;

/// ## Summary
/// Computes the revision tag of a stored document: the hex-encoded SHA-256
/// of its serialized form, wrapped in double quotes.
///
/// `serde_json` maps keep their keys sorted, so equal documents serialize
/// identically and always carry the same tag.
#[must_use]
pub fn document_revision(document: &serde_json::Value) -> String {
    let canonical =
        serde_json::to_vec(document).expect_or_log("a JSON value always serializes cleanly");
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let hash = hasher.finalize();
    format!("\"{}\"", hex::encode(hash))
}
