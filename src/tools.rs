// file: src/tools.rs
// description: agent-facing tool functions that render synchronizer results as text or records
// reference: tool boundary between the agent runtime and the repository synchronizer

use crate::config::Config;
use crate::error::SyncError;
use crate::models::{ErrorRecord, PushOutcome, StatusReport};
use crate::repository::RepositoryHandle;
use tracing::{error, info};

pub const PULL_SUCCESS: &str = "Successfully pulled latest changes.";
pub const PUSH_SUCCESS: &str = "Successfully pushed all changes to remote.";
pub const NO_CHANGES: &str = "No changes to commit.";

/// Every tool call opens (or clones) the working copy afresh and never
/// fails: errors come back as text.
pub fn pull_repo(config: &Config) -> String {
    let handle = RepositoryHandle::ensure(config);
    match handle.pull() {
        Ok(outcome) => {
            info!("Pull finished: {}", outcome);
            format!("{} ({})", PULL_SUCCESS, outcome)
        }
        Err(SyncError::NotInitialized) => SyncError::NotInitialized.to_string(),
        Err(e) => {
            error!("Pull failed: {}", e);
            format!("Failed to pull changes: {}", e)
        }
    }
}

pub fn push_repo(config: &Config, commit_message: Option<&str>) -> String {
    let handle = RepositoryHandle::ensure(config);
    let message = commit_message.unwrap_or(&config.repository.default_commit_message);

    match handle.push(message) {
        Ok(PushOutcome::NoChanges) => NO_CHANGES.to_string(),
        Ok(PushOutcome::Pushed { .. }) => PUSH_SUCCESS.to_string(),
        Err(SyncError::NotInitialized) => SyncError::NotInitialized.to_string(),
        Err(e) => {
            error!("Push failed: {}", e);
            format!("Failed to push changes: {}", e)
        }
    }
}

pub fn get_repo_status(config: &Config) -> StatusReport {
    let handle = RepositoryHandle::ensure(config);
    match handle.status() {
        Ok(snapshot) => StatusReport::Snapshot(snapshot),
        Err(SyncError::NotInitialized) => {
            StatusReport::Error(ErrorRecord::new("Repo not initialized"))
        }
        Err(e) => StatusReport::Error(ErrorRecord::new(e.to_string())),
    }
}

/// Recent commits as pretty JSON, or an error record.
pub fn repo_history(config: &Config, limit: usize) -> String {
    let handle = RepositoryHandle::ensure(config);
    let rendered = handle
        .history(limit)
        .map_err(|e| e.to_string())
        .and_then(|commits| serde_json::to_string_pretty(&commits).map_err(|e| e.to_string()));

    match rendered {
        Ok(json) => json,
        Err(message) => StatusReport::Error(ErrorRecord::new(message)).to_json(),
    }
}
