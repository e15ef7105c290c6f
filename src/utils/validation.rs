// file: src/utils/validation.rs
// description: input validation for remotes, commit messages and working copy paths
// reference: input validation patterns

use crate::error::{Result, SyncError};
use std::path::{Component, Path, PathBuf};

const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "ssh", "git", "file"];

pub struct Validator;

impl Validator {
    /// Accepts `scheme://...` URLs for the transports git speaks, scp-like
    /// `user@host:path` remotes and plain filesystem paths.
    pub fn validate_remote_url(url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SyncError::Validation("Remote URL is empty".to_string()));
        }

        if let Some((scheme, rest)) = url.split_once("://") {
            if !SUPPORTED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
                return Err(SyncError::Validation(format!(
                    "Unsupported remote scheme '{}' in {}",
                    scheme, url
                )));
            }
            if rest.is_empty() {
                return Err(SyncError::Validation(format!(
                    "Remote URL has no location: {}",
                    url
                )));
            }
            return Ok(());
        }

        if let Some((user_host, path)) = url.split_once(':') {
            if let Some((user, host)) = user_host.split_once('@') {
                if user.is_empty() || host.is_empty() || path.is_empty() {
                    return Err(SyncError::Validation(format!(
                        "Malformed scp-style remote: {}",
                        url
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn is_blank(text: &str) -> bool {
        text.trim().is_empty()
    }

    /// Joins `relative` onto `base`, refusing anything that could land outside
    /// `base` or inside its `.git` directory. Works for paths that do not
    /// exist yet.
    pub fn resolve_within(base: &Path, relative: &Path) -> Result<PathBuf> {
        let mut resolved = base.to_path_buf();
        let mut depth = 0usize;

        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    if depth == 0 && part == ".git" {
                        return Err(SyncError::Validation(format!(
                            "Refusing to write into the git directory: {}",
                            relative.display()
                        )));
                    }
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(SyncError::Validation(format!(
                        "Path escapes the working copy: {}",
                        relative.display()
                    )));
                }
            }
        }

        if depth == 0 {
            return Err(SyncError::Validation(
                "Destination must name a path inside the working copy".to_string(),
            ));
        }

        Ok(resolved)
    }
}
