// file: src/models/outcome.rs
// description: typed results of repository initialization, pull and push
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a working copy handle came to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitOutcome {
    Cloned,
    Opened,
    /// The directory existed without valid git metadata and was initialized in place.
    Reinitialized,
    /// Cloning failed; an empty repository without a remote was created instead.
    LocalFallback { cause: String },
    /// Not even a local repository could be created.
    Unavailable { cause: String },
}

impl InitOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            InitOutcome::LocalFallback { .. } | InitOutcome::Unavailable { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PullOutcome {
    UpToDate,
    FastForwarded { commit: String },
    Merged { commit: String },
    /// The local branch had no commits and now points at the fetched one.
    Initialized { commit: String },
}

impl fmt::Display for PullOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullOutcome::UpToDate => write!(f, "already up to date"),
            PullOutcome::FastForwarded { commit } => write!(f, "fast-forwarded to {}", commit),
            PullOutcome::Merged { commit } => write!(f, "merged remote changes as {}", commit),
            PullOutcome::Initialized { commit } => write!(f, "checked out {}", commit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PushOutcome {
    NoChanges,
    Pushed { branch: String, commit: String },
}

impl fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushOutcome::NoChanges => write!(f, "No changes to commit."),
            PushOutcome::Pushed { branch, commit } => {
                write!(f, "pushed {} to {}", commit, branch)
            }
        }
    }
}
