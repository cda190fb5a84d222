//! Snapshot refresh decisions.
//!
//! Pure delta detection for the downloaded SQLite snapshot, decoupled from
//! the HTTP download and the filesystem.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Outcome of refreshing the local snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOutcome {
    /// Downloaded content matches the local file; nothing written.
    Unchanged,
    /// Local file replaced with different content.
    Updated,
    /// No local file existed before.
    Created,
}

impl SnapshotOutcome {
    /// Whether the local file has to be (re)written.
    pub fn needs_write(&self) -> bool {
        !matches!(self, SnapshotOutcome::Unchanged)
    }
}

/// Result of comparing a downloaded snapshot with the local one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshDecision {
    pub outcome: SnapshotOutcome,
    pub reason: &'static str,
}

/// Hex-encoded SHA-256 of the snapshot bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Decides what to do with freshly downloaded content.
///
/// `existing_hash` is the hash of the local file, `None` if there is none.
///
/// # Examples
///
/// ```
/// use jobscope_core::{content_hash, needs_refresh, SnapshotOutcome};
///
/// let hash = content_hash(b"snapshot");
/// assert_eq!(needs_refresh(None, &hash).outcome, SnapshotOutcome::Created);
/// assert_eq!(needs_refresh(Some(&hash), &hash).outcome, SnapshotOutcome::Unchanged);
/// ```
pub fn needs_refresh(existing_hash: Option<&str>, new_hash: &str) -> RefreshDecision {
    match existing_hash {
        Some(hash) if hash == new_hash => RefreshDecision {
            outcome: SnapshotOutcome::Unchanged,
            reason: "content hash matches",
        },
        Some(_) => RefreshDecision {
            outcome: SnapshotOutcome::Updated,
            reason: "content hash changed",
        },
        None => RefreshDecision {
            outcome: SnapshotOutcome::Created,
            reason: "no local snapshot",
        },
    }
}

/// Summary of one `fetch` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub outcome: SnapshotOutcome,
    pub bytes: usize,
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = content_hash(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }

    #[test]
    fn test_needs_refresh_unchanged() {
        let decision = needs_refresh(Some("abc123"), "abc123");
        assert_eq!(decision.outcome, SnapshotOutcome::Unchanged);
        assert_eq!(decision.reason, "content hash matches");
        assert!(!decision.outcome.needs_write());
    }

    #[test]
    fn test_needs_refresh_updated() {
        let decision = needs_refresh(Some("abc123"), "def456");
        assert_eq!(decision.outcome, SnapshotOutcome::Updated);
        assert!(decision.outcome.needs_write());
    }

    #[test]
    fn test_needs_refresh_created() {
        let decision = needs_refresh(None, "def456");
        assert_eq!(decision.outcome, SnapshotOutcome::Created);
        assert_eq!(decision.reason, "no local snapshot");
    }
}
