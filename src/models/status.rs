// file: src/models/status.rs
// description: status snapshot and error record returned by the status tool
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub active_branch: String,
    pub is_dirty: bool,
    pub untracked_files: usize,
    /// `None` while the branch has no commits yet.
    pub last_commit: Option<String>,
    pub last_commit_msg: Option<String>,
    pub remote_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub status: String,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// What the status tool hands back to its caller: either a snapshot or an
/// error record, serialized without a wrapping tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusReport {
    Snapshot(StatusSnapshot),
    Error(ErrorRecord),
}

impl StatusReport {
    pub fn is_error(&self) -> bool {
        matches!(self, StatusReport::Error(_))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"error","message":"serialization failed: {}"}}"#, e)
        })
    }
}
