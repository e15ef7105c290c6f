// file: src/repository/handle.rs
// description: working copy handle built by clone, open or in-place (re)initialization
// reference: https://docs.rs/git2

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::models::InitOutcome;
use crate::repository::remote;
use git2::{Commit, ErrorCode, Repository, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const FALLBACK_AUTHOR_NAME: &str = "docs-sync";
const FALLBACK_AUTHOR_EMAIL: &str = "docs-sync@localhost";

/// A working copy of the configured remote. Built fresh for every operation;
/// construction never fails, a degraded state is reported through
/// [`RepositoryHandle::init_outcome`] instead.
pub struct RepositoryHandle {
    config: Config,
    local_path: PathBuf,
    repo: Option<Repository>,
    init: InitOutcome,
}

impl RepositoryHandle {
    pub fn ensure(config: &Config) -> Self {
        let local_path = absolute(&config.repository.local_path);

        let (repo, init) = if local_path.exists() {
            open_or_reinit(&local_path)
        } else {
            clone_or_init(config, &local_path)
        };

        Self {
            config: config.clone(),
            local_path,
            repo,
            init,
        }
    }

    pub fn remote_url(&self) -> &str {
        &self.config.repository.remote_url
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn init_outcome(&self) -> &InitOutcome {
        &self.init
    }

    pub fn is_initialized(&self) -> bool {
        self.repo.is_some()
    }

    /// True when the working copy tracks the configured remote, false for
    /// the local-only fallback.
    pub fn is_remote_connected(&self) -> bool {
        if self.init.is_degraded() {
            return false;
        }
        self.repo
            .as_ref()
            .is_some_and(|repo| repo.find_remote(&self.config.repository.remote_name).is_ok())
    }

    pub(crate) fn repo(&self) -> Result<&Repository> {
        self.repo.as_ref().ok_or(SyncError::NotInitialized)
    }

    pub(crate) fn workdir(&self) -> Result<&Path> {
        self.repo()?.workdir().ok_or_else(|| {
            SyncError::Validation(format!(
                "{} is a bare repository without a working copy",
                self.local_path.display()
            ))
        })
    }

    pub(crate) fn remote_name(&self) -> &str {
        &self.config.repository.remote_name
    }

    /// Configured author, else the repository's git identity, else a fixed
    /// fallback so commits still work on machines without `user.name`.
    pub(crate) fn signature(&self, repo: &Repository) -> std::result::Result<Signature<'static>, git2::Error> {
        let author = &self.config.author;
        if let (Some(name), Some(email)) = (author.name.as_deref(), author.email.as_deref()) {
            return Signature::now(name, email);
        }
        repo.signature()
            .or_else(|_| Signature::now(FALLBACK_AUTHOR_NAME, FALLBACK_AUTHOR_EMAIL))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn clone_or_init(config: &Config, path: &Path) -> (Option<Repository>, InitOutcome) {
    let url = &config.repository.remote_url;
    info!("Cloning {} to {}", url, path.display());

    match clone(config, path) {
        Ok(repo) => {
            info!("Clone successful");
            (Some(repo), InitOutcome::Cloned)
        }
        Err(e) => {
            let cause = e.to_string();
            warn!(
                "Failed to clone {}: {}. Continuing with a local-only repository",
                url, cause
            );

            match fs::create_dir_all(path)
                .map_err(SyncError::from)
                .and_then(|_| Repository::init(path).map_err(SyncError::from))
            {
                Ok(repo) => (Some(repo), InitOutcome::LocalFallback { cause }),
                Err(init_err) => {
                    error!("Failed to initialize {}: {}", path.display(), init_err);
                    (
                        None,
                        InitOutcome::Unavailable {
                            cause: format!("clone failed: {}; init failed: {}", cause, init_err),
                        },
                    )
                }
            }
        }
    }
}

fn clone(config: &Config, path: &Path) -> std::result::Result<Repository, git2::Error> {
    let remote_name = config.repository.remote_name.clone();

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(remote::fetch_options(&config.credentials));
    builder.remote_create(move |repo, _name, url| repo.remote(&remote_name, url));

    if let Some(branch) = config.repository.branch.as_deref().filter(|b| !b.is_empty()) {
        builder.branch(branch);
    }

    builder.clone(&config.repository.remote_url, path)
}

fn open_or_reinit(path: &Path) -> (Option<Repository>, InitOutcome) {
    match Repository::open(path) {
        Ok(repo) => {
            info!("Opened existing repository at {}", path.display());
            (Some(repo), InitOutcome::Opened)
        }
        Err(e) => {
            warn!(
                "{} is not a valid git repository ({}). Re-initializing",
                path.display(),
                e.message()
            );
            match Repository::init(path) {
                Ok(repo) => (Some(repo), InitOutcome::Reinitialized),
                Err(init_err) => {
                    error!("Failed to initialize {}: {}", path.display(), init_err);
                    (
                        None,
                        InitOutcome::Unavailable {
                            cause: init_err.message().to_string(),
                        },
                    )
                }
            }
        }
    }
}

/// Branch HEAD points at, read from the symbolic ref so unborn branches work.
pub(crate) fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.find_reference("HEAD")?;
    match head.symbolic_target() {
        Some(target) => Ok(target.strip_prefix("refs/heads/").unwrap_or(target).to_string()),
        None => Err(SyncError::DetachedHead),
    }
}

/// `None` while the current branch has no commits.
pub(crate) fn head_commit(repo: &Repository) -> std::result::Result<Option<Commit<'_>>, git2::Error> {
    match repo.head() {
        Ok(head) => head.peel_to_commit().map(Some),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{bare_remote, test_config};
    use tempfile::TempDir;

    #[test]
    fn test_clone_from_reachable_remote() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let config = test_config(&remote, &temp.path().join("work"));

        let handle = RepositoryHandle::ensure(&config);

        assert!(handle.is_initialized());
        assert_eq!(handle.init_outcome(), &InitOutcome::Cloned);
        assert!(handle.is_remote_connected());
        assert!(handle.local_path().is_absolute());
        assert!(handle.local_path().join("README.md").exists());
    }

    #[test]
    fn test_unreachable_remote_falls_back_to_local_repo() {
        let temp = TempDir::new().unwrap();
        let config = test_config(&temp.path().join("missing.git"), &temp.path().join("work"));

        let handle = RepositoryHandle::ensure(&config);

        assert!(handle.is_initialized());
        assert!(matches!(
            handle.init_outcome(),
            InitOutcome::LocalFallback { .. }
        ));
        assert!(!handle.is_remote_connected());
        assert!(handle.local_path().join(".git").is_dir());
    }

    #[test]
    fn test_ensure_twice_reopens_same_working_copy() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let config = test_config(&remote, &temp.path().join("work"));

        let first = RepositoryHandle::ensure(&config);
        fs::write(first.local_path().join("notes.md"), "draft").unwrap();
        let first_head = head_commit(first.repo().unwrap()).unwrap().unwrap().id();

        let second = RepositoryHandle::ensure(&config);

        assert_eq!(second.init_outcome(), &InitOutcome::Opened);
        assert_eq!(second.local_path(), first.local_path());
        assert_eq!(
            head_commit(second.repo().unwrap()).unwrap().unwrap().id(),
            first_head
        );
        assert_eq!(
            fs::read_to_string(second.local_path().join("notes.md")).unwrap(),
            "draft"
        );
    }

    #[test]
    fn test_reinit_preserves_existing_files() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir_all(work.join("guides")).unwrap();
        fs::write(work.join("guides/intro.md"), "# Intro").unwrap();

        let config = test_config(&temp.path().join("missing.git"), &work);
        let handle = RepositoryHandle::ensure(&config);

        assert_eq!(handle.init_outcome(), &InitOutcome::Reinitialized);
        assert!(handle.is_initialized());
        assert_eq!(
            fs::read_to_string(work.join("guides/intro.md")).unwrap(),
            "# Intro"
        );
    }

    #[test]
    fn test_unusable_path_yields_uninitialized_handle() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "plain file").unwrap();

        let config = test_config(&temp.path().join("missing.git"), &file);
        let handle = RepositoryHandle::ensure(&config);

        assert!(!handle.is_initialized());
        assert!(matches!(
            handle.init_outcome(),
            InitOutcome::Unavailable { .. }
        ));
        assert!(matches!(handle.repo(), Err(SyncError::NotInitialized)));
    }

    #[test]
    fn test_current_branch_on_unborn_repo() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        assert!(!current_branch(&repo).unwrap().is_empty());
        assert!(head_commit(&repo).unwrap().is_none());
    }
}
