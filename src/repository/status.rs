// file: src/repository/status.rs
// description: working copy status snapshot and commit history
// reference: https://docs.rs/git2

use crate::error::Result;
use crate::models::{CommitRecord, StatusSnapshot};
use crate::repository::RepositoryHandle;
use crate::repository::handle::{current_branch, head_commit};
use git2::{Repository, Sort, Status, StatusOptions};

fn tracked_changes() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
        | Status::WT_MODIFIED
        | Status::WT_DELETED
        | Status::WT_RENAMED
        | Status::WT_TYPECHANGE
        | Status::CONFLICTED
}

impl RepositoryHandle {
    pub fn status(&self) -> Result<StatusSnapshot> {
        let repo = self.repo()?;
        let active_branch = current_branch(repo)?;

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let mut is_dirty = false;
        let mut untracked_files = 0;
        for entry in repo.statuses(Some(&mut options))?.iter() {
            let status = entry.status();
            if status.is_wt_new() {
                untracked_files += 1;
            } else if status.intersects(tracked_changes()) {
                is_dirty = true;
            }
        }

        let last = head_commit(repo)?.map(|commit| CommitRecord::from_commit(&commit));

        Ok(StatusSnapshot {
            active_branch,
            is_dirty,
            untracked_files,
            last_commit: last.as_ref().map(|c| c.short_id.clone()),
            last_commit_msg: last.map(|c| c.message),
            remote_connected: self.is_remote_connected(),
        })
    }

    /// Most recent commits reachable from HEAD, newest first. Empty for a
    /// branch without commits.
    pub fn history(&self, limit: usize) -> Result<Vec<CommitRecord>> {
        let repo = self.repo()?;
        if head_commit(repo)?.is_none() {
            return Ok(Vec::new());
        }

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        let mut commits = Vec::new();
        for oid in revwalk.take(limit) {
            let commit = repo.find_commit(oid?)?;
            commits.push(CommitRecord::from_commit(&commit));
        }
        Ok(commits)
    }

    pub fn commit_count(&self) -> Result<usize> {
        count_commits(self.repo()?)
    }
}

fn count_commits(repo: &Repository) -> Result<usize> {
    if head_commit(repo)?.is_none() {
        return Ok(0);
    }
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    Ok(revwalk.count())
}
