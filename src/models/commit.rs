// file: src/models/commit.rs
// description: read-only view of a commit in the working copy history
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SHORT_ID_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub short_id: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub committed_at: DateTime<Utc>,
}

impl CommitRecord {
    pub fn from_commit(commit: &git2::Commit<'_>) -> Self {
        let id = commit.id().to_string();
        let author = commit.author();

        Self {
            short_id: short_id(&id),
            id,
            message: String::from_utf8_lossy(commit.message_bytes())
                .trim()
                .to_string(),
            author_name: author.name().unwrap_or("unknown").to_string(),
            author_email: author.email().unwrap_or("unknown").to_string(),
            committed_at: DateTime::from_timestamp(commit.time().seconds(), 0)
                .unwrap_or_default(),
        }
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "0123456");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_summary() {
        let record = CommitRecord {
            id: "0123456789abcdef".to_string(),
            short_id: "0123456".to_string(),
            message: "Add guide\n\nLonger body".to_string(),
            author_name: "Docs Bot".to_string(),
            author_email: "docs-bot@example.com".to_string(),
            committed_at: Utc::now(),
        };
        assert_eq!(record.summary(), "Add guide");
    }
}
