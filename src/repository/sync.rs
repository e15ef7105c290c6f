// file: src/repository/sync.rs
// description: pull (fetch + merge) and push (stage + commit + push) against the remote
// reference: https://docs.rs/git2

use crate::error::{Result, SyncError};
use crate::models::commit::short_id;
use crate::models::{PullOutcome, PushOutcome};
use crate::repository::handle::{current_branch, head_commit};
use crate::repository::{RepositoryHandle, remote};
use crate::utils::Validator;
use git2::build::CheckoutBuilder;
use git2::{IndexAddOption, Oid, PushOptions, Repository, Status, StatusOptions};
use std::cell::RefCell;
use tracing::{debug, info, warn};

impl RepositoryHandle {
    /// Fetches the current branch from the remote and integrates it the way
    /// `git pull` does. Local changes that the update would overwrite make
    /// the checkout fail instead of being discarded.
    pub fn pull(&self) -> Result<PullOutcome> {
        let repo = self.repo()?;
        let remote_name = self.remote_name();

        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|_| SyncError::NoRemote(remote_name.to_string()))?;

        let branch = current_branch(repo)?;
        let mut fetch_options = remote::fetch_options(&self.config().credentials);

        info!("Fetching {} from {}", branch, remote_name);
        remote
            .fetch(&[branch.as_str()], Some(&mut fetch_options), None)
            .map_err(|source| SyncError::Fetch {
                remote: remote_name.to_string(),
                source,
            })?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;
        let refname = format!("refs/heads/{}", branch);
        let target = fetch_commit.id();

        if analysis.is_up_to_date() {
            info!("Repository is up to date");
            Ok(PullOutcome::UpToDate)
        } else if analysis.is_unborn() {
            info!("Local branch {} has no commits, checking out remote", branch);
            checkout_commit(repo, target)?;
            repo.reference(&refname, target, false, "pull: initial checkout")?;
            repo.set_head(&refname)?;
            Ok(PullOutcome::Initialized {
                commit: short_id(&target.to_string()),
            })
        } else if analysis.is_fast_forward() {
            info!("Fast-forward merge");
            checkout_commit(repo, target)?;
            let mut reference = repo.find_reference(&refname)?;
            reference.set_target(target, "pull: fast-forward")?;
            Ok(PullOutcome::FastForwarded {
                commit: short_id(&target.to_string()),
            })
        } else {
            let merge_id = self.merge(repo, &branch, target)?;
            Ok(PullOutcome::Merged {
                commit: short_id(&merge_id.to_string()),
            })
        }
    }

    /// Merges in memory first so a conflicting pull leaves the working copy
    /// untouched.
    fn merge(&self, repo: &Repository, branch: &str, target: Oid) -> Result<Oid> {
        let local = head_commit(repo)?.ok_or(SyncError::NotInitialized)?;
        let incoming = repo.find_commit(target)?;

        let mut index = repo.merge_commits(&local, &incoming, None)?;
        if index.has_conflicts() {
            let mut paths: Vec<String> = index
                .conflicts()?
                .filter_map(|conflict| conflict.ok())
                .filter_map(|conflict| conflict.our.or(conflict.their).or(conflict.ancestor))
                .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
                .collect();
            paths.sort();
            paths.dedup();
            warn!("Pull aborted, {} conflicting path(s)", paths.len());
            return Err(SyncError::MergeConflict(paths));
        }

        let tree_id = index.write_tree_to(repo)?;
        let tree = repo.find_tree(tree_id)?;
        repo.checkout_tree(tree.as_object(), Some(CheckoutBuilder::new().safe()))
            .map_err(SyncError::Checkout)?;

        let signature = self.signature(repo).map_err(SyncError::Commit)?;
        let message = format!("Merge branch '{}' of {}", branch, self.remote_url());
        let merge_id = repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &message,
                &tree,
                &[&local, &incoming],
            )
            .map_err(SyncError::Commit)?;

        info!("Merged remote changes as {}", merge_id);
        Ok(merge_id)
    }

    /// Stages everything, commits when something changed and pushes the
    /// current branch. A commit that succeeded stays in place when the push
    /// fails.
    pub fn push(&self, commit_message: &str) -> Result<PushOutcome> {
        let repo = self.repo()?;
        let branch = current_branch(repo)?;

        stage_all(repo).map_err(SyncError::Stage)?;

        if !has_pending_changes(repo)? {
            info!("No changes to commit");
            return Ok(PushOutcome::NoChanges);
        }

        let message = if Validator::is_blank(commit_message) {
            self.config().repository.default_commit_message.as_str()
        } else {
            commit_message
        };

        let commit_id = self.commit_index(repo, message).map_err(SyncError::Commit)?;
        info!("Committed changes: {}", message);

        self.push_branch(repo, &branch)?;

        info!("Pushed {} to {}", branch, self.remote_name());
        Ok(PushOutcome::Pushed {
            branch,
            commit: short_id(&commit_id.to_string()),
        })
    }

    fn commit_index(&self, repo: &Repository, message: &str) -> std::result::Result<Oid, git2::Error> {
        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let signature = self.signature(repo)?;
        let parent = head_commit(repo)?;
        let parents: Vec<_> = parent.iter().collect();

        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
    }

    fn push_branch(&self, repo: &Repository, branch: &str) -> Result<()> {
        let remote_name = self.remote_name();
        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|_| SyncError::NoRemote(remote_name.to_string()))?;

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        let rejection: RefCell<Option<(String, String)>> = RefCell::new(None);

        let mut callbacks = remote::callbacks(&self.config().credentials);
        callbacks.push_update_reference(|reference, status| {
            if let Some(reason) = status {
                *rejection.borrow_mut() = Some((reference.to_string(), reason.to_string()));
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        debug!("Pushing {} to {}", refspec, remote_name);
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|source| SyncError::Push {
                remote: remote_name.to_string(),
                source,
            })?;
        drop(push_options);

        match rejection.into_inner() {
            Some((reference, reason)) => Err(SyncError::PushRejected { reference, reason }),
            None => Ok(()),
        }
    }
}

/// Equivalent of `git add -A`: new, modified and deleted files, ignored
/// files excluded.
fn stage_all(repo: &Repository) -> std::result::Result<(), git2::Error> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()
}

fn has_pending_changes(repo: &Repository) -> Result<bool> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut options))?;
    Ok(statuses
        .iter()
        .any(|entry| entry.status() != Status::CURRENT && !entry.status().is_ignored()))
}

fn checkout_commit(repo: &Repository, target: Oid) -> Result<()> {
    let commit = repo.find_commit(target)?;
    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))
        .map_err(SyncError::Checkout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{
        bare_remote, commit_count, commit_file, test_config,
    };
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_push_without_changes_is_noop() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));

        let before = commit_count(handle.repo().unwrap());
        let outcome = handle.push("Nothing here").unwrap();

        assert_eq!(outcome, PushOutcome::NoChanges);
        assert_eq!(commit_count(handle.repo().unwrap()), before);
    }

    #[test]
    fn test_push_new_file_adds_one_commit() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));
        let before = commit_count(handle.repo().unwrap());

        fs::write(handle.local_path().join("guide.md"), "# Guide\n").unwrap();
        let outcome = handle.push("Add guide").unwrap();

        assert!(matches!(outcome, PushOutcome::Pushed { .. }));
        assert_eq!(commit_count(handle.repo().unwrap()), before + 1);

        let status = handle.status().unwrap();
        assert!(!status.is_dirty);
        assert_eq!(status.untracked_files, 0);
        assert_eq!(status.last_commit_msg.as_deref(), Some("Add guide"));

        let bare = Repository::open_bare(&remote).unwrap();
        assert_eq!(commit_count(&bare), before + 1);
    }

    #[test]
    fn test_push_stages_deletions() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));

        fs::remove_file(handle.local_path().join("README.md")).unwrap();
        handle.push("Remove readme").unwrap();

        let head = head_commit(handle.repo().unwrap()).unwrap().unwrap();
        assert!(head.tree().unwrap().get_name("README.md").is_none());
    }

    #[test]
    fn test_blank_message_uses_default() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));

        fs::write(handle.local_path().join("a.md"), "a").unwrap();
        handle.push("   ").unwrap();

        let status = handle.status().unwrap();
        assert_eq!(status.last_commit_msg.as_deref(), Some("Agent auto-update"));
    }

    #[test]
    fn test_push_without_remote_commits_locally_and_fails() {
        let temp = TempDir::new().unwrap();
        let handle = RepositoryHandle::ensure(&test_config(
            &temp.path().join("missing.git"),
            &temp.path().join("work"),
        ));

        fs::write(handle.local_path().join("offline.md"), "offline").unwrap();
        let result = handle.push("Offline edit");

        assert!(matches!(result, Err(SyncError::NoRemote(_))));
        assert_eq!(commit_count(handle.repo().unwrap()), 1);
    }

    #[test]
    fn test_push_on_detached_head_commits_nothing() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));
        let repo = handle.repo().unwrap();

        let head = head_commit(repo).unwrap().unwrap().id();
        repo.set_head_detached(head).unwrap();
        let before = commit_count(repo);

        fs::write(handle.local_path().join("x.md"), "detached").unwrap();
        let result = handle.push("Detached");

        assert!(matches!(result, Err(SyncError::DetachedHead)));
        assert_eq!(repo.head().unwrap().target(), Some(head));
        assert_eq!(commit_count(repo), before);
    }

    #[test]
    fn test_non_fast_forward_push_is_rejected() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let ours = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("ours")));
        let theirs = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("theirs")));

        fs::write(theirs.local_path().join("theirs.md"), "theirs").unwrap();
        theirs.push("Their change").unwrap();

        fs::write(ours.local_path().join("ours.md"), "ours").unwrap();
        let result = ours.push("Our change");

        assert!(matches!(
            result,
            Err(SyncError::Push { .. }) | Err(SyncError::PushRejected { .. })
        ));
    }

    #[test]
    fn test_pull_fast_forward() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let ours = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("ours")));
        let theirs = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("theirs")));

        fs::write(theirs.local_path().join("new.md"), "fresh").unwrap();
        theirs.push("Add new page").unwrap();

        let outcome = ours.pull().unwrap();

        assert!(matches!(outcome, PullOutcome::FastForwarded { .. }));
        assert_eq!(
            fs::read_to_string(ours.local_path().join("new.md")).unwrap(),
            "fresh"
        );
        assert!(!ours.status().unwrap().is_dirty);
    }

    #[test]
    fn test_pull_into_empty_repository_checks_out_remote() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(
            &temp.path().join("missing.git"),
            &temp.path().join("work"),
        ));
        handle
            .repo()
            .unwrap()
            .remote("origin", &remote.to_string_lossy())
            .unwrap();

        let outcome = handle.pull().unwrap();

        assert!(matches!(outcome, PullOutcome::Initialized { .. }));
        assert!(handle.local_path().join("README.md").exists());
        let status = handle.status().unwrap();
        assert!(status.last_commit.is_some());
        assert_eq!(status.last_commit_msg.as_deref(), Some("Initial commit"));
        assert!(!status.is_dirty);
    }

    #[test]
    fn test_pull_up_to_date() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));

        assert_eq!(handle.pull().unwrap(), PullOutcome::UpToDate);
    }

    #[test]
    fn test_pull_merges_diverged_history() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let ours = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("ours")));
        let theirs = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("theirs")));

        fs::write(theirs.local_path().join("theirs.md"), "theirs").unwrap();
        theirs.push("Their change").unwrap();
        commit_file(ours.repo().unwrap(), "ours.md", "ours", "Our change");

        let outcome = ours.pull().unwrap();

        assert!(matches!(outcome, PullOutcome::Merged { .. }));
        let head = head_commit(ours.repo().unwrap()).unwrap().unwrap();
        assert_eq!(head.parent_count(), 2);
        assert!(ours.local_path().join("theirs.md").exists());
        assert!(ours.local_path().join("ours.md").exists());
    }

    #[test]
    fn test_pull_conflict_leaves_working_copy_untouched() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let ours = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("ours")));
        let theirs = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("theirs")));

        fs::write(theirs.local_path().join("README.md"), "their readme\n").unwrap();
        theirs.push("Their readme").unwrap();
        commit_file(ours.repo().unwrap(), "README.md", "our readme\n", "Our readme");

        let result = ours.pull();

        match result {
            Err(SyncError::MergeConflict(paths)) => assert_eq!(paths, vec!["README.md".to_string()]),
            other => panic!("expected merge conflict, got {:?}", other),
        }
        assert_eq!(
            fs::read_to_string(ours.local_path().join("README.md")).unwrap(),
            "our readme\n"
        );
    }

    #[test]
    fn test_pull_without_remote_fails_with_cause() {
        let temp = TempDir::new().unwrap();
        let handle = RepositoryHandle::ensure(&test_config(
            &temp.path().join("missing.git"),
            &temp.path().join("work"),
        ));

        let err = handle.pull().unwrap_err();
        assert!(err.to_string().contains("origin"));
    }

    #[test]
    fn test_pull_from_vanished_remote_fails_with_cause() {
        let temp = TempDir::new().unwrap();
        let remote = bare_remote(temp.path());
        let handle = RepositoryHandle::ensure(&test_config(&remote, &temp.path().join("work")));
        fs::remove_dir_all(&remote).unwrap();

        let err = handle.pull().unwrap_err();
        assert!(matches!(err, SyncError::Fetch { .. }));
        assert!(!err.to_string().is_empty());
    }
}
