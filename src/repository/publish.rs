// file: src/repository/publish.rs
// description: copy a file or directory into the working copy, then push it
// reference: https://docs.rs/walkdir

use crate::error::{Result, SyncError};
use crate::models::PushOutcome;
use crate::repository::RepositoryHandle;
use crate::utils::Validator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

impl RepositoryHandle {
    /// Copies `source` to `destination` (relative to the working copy,
    /// defaulting to the source's file name) and pushes the result.
    pub fn publish(
        &self,
        source: &Path,
        destination: Option<&Path>,
        commit_message: &str,
    ) -> Result<PushOutcome> {
        let workdir = self.workdir()?;

        let relative = match destination {
            Some(destination) => destination.to_path_buf(),
            None => source
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| SyncError::Publish {
                    path: source.to_path_buf(),
                    message: "source has no file name".to_string(),
                })?,
        };
        let target = Validator::resolve_within(workdir, &relative)?;

        let copied = if source.is_file() {
            copy_file(source, &target)?;
            1
        } else if source.is_dir() {
            copy_tree(source, &target)?
        } else {
            return Err(SyncError::Publish {
                path: source.to_path_buf(),
                message: "source does not exist".to_string(),
            });
        };

        info!(
            "Copied {} file(s) from {} to {}",
            copied,
            source.display(),
            target.display()
        );

        self.push(commit_message)
    }
}

fn copy_file(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target).map_err(|e| SyncError::Publish {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = entry.map_err(|e| SyncError::Publish {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| SyncError::Publish {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            debug!("Copying {}", relative.display());
            copy_file(entry.path(), &destination)?;
            copied += 1;
        }
    }

    Ok(copied)
}
