// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository not initialized.")]
    NotInitialized,

    #[error("Remote '{0}' is not configured")]
    NoRemote(String),

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    #[error("Fetch from '{remote}' failed: {source}")]
    Fetch {
        remote: String,
        source: git2::Error,
    },

    #[error("Merge conflict in: {}", .0.join(", "))]
    MergeConflict(Vec<String>),

    #[error("Checkout failed: {0}")]
    Checkout(git2::Error),

    #[error("Staging changes failed: {0}")]
    Stage(git2::Error),

    #[error("Commit failed: {0}")]
    Commit(git2::Error),

    #[error("Push to '{remote}' failed: {source}")]
    Push {
        remote: String,
        source: git2::Error,
    },

    #[error("Push of {reference} rejected by remote: {reason}")]
    PushRejected { reference: String, reason: String },

    #[error("Publish failed for {path}: {message}")]
    Publish { path: PathBuf, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}
