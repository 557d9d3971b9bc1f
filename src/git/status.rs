//! Working tree inspection: staged and unstaged changes merged into one view.

use chrono::Utc;
use git2::{DiffOptions, Repository, Tree};
use tracing::debug;

use crate::error::GitError;

use super::commits::{collect_file_changes, CommitInfo, FileChange};

/// Pseudo hash used when analyzing uncommitted changes.
pub const WORKING_TREE_HASH: &str = "working-tree";

/// Every pending change in the working tree, staged and unstaged combined.
#[derive(Debug, Clone)]
pub struct WorkingTreeChange {
    pub files: Vec<FileChange>,
    pub insertions: usize,
    pub deletions: usize,
}

impl WorkingTreeChange {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Wrap the pending changes as a commit-shaped record so they can flow
    /// through classification and summarization unchanged.
    pub fn into_pseudo_commit(self, subject: &str) -> CommitInfo {
        CommitInfo {
            hash: WORKING_TREE_HASH.to_string(),
            short_hash: WORKING_TREE_HASH.to_string(),
            author: String::new(),
            date: Utc::now(),
            subject: subject.to_string(),
            body: String::new(),
            files: self.files,
            insertions: self.insertions,
            deletions: self.deletions,
        }
    }
}

/// Collect the full set of pending changes.
///
/// Staged changes are diffed HEAD-to-index, unstaged ones index-to-workdir
/// with untracked files included. When a path appears in both diffs the
/// staged entry wins.
pub fn working_tree_change(repo: &Repository) -> Result<WorkingTreeChange, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut staged_opts = DiffOptions::new();
    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut staged_opts))
        .map_err(GitError::StatusFailed)?;

    let mut unstaged_opts = DiffOptions::new();
    unstaged_opts
        .include_untracked(true)
        .recurse_untracked_dirs(true);
    let unstaged = repo
        .diff_index_to_workdir(None, Some(&mut unstaged_opts))
        .map_err(GitError::StatusFailed)?;

    let mut files = collect_file_changes(&staged, WORKING_TREE_HASH)?;
    files.extend(collect_file_changes(&unstaged, WORKING_TREE_HASH)?);

    // Stable sort keeps the staged entry first for duplicated paths.
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|b, a| a.path == b.path);

    let insertions = files.iter().map(|f| f.insertions).sum();
    let deletions = files.iter().map(|f| f.deletions).sum();
    debug!(
        files = files.len(),
        insertions, deletions, "Collected working tree changes"
    );

    Ok(WorkingTreeChange {
        files,
        insertions,
        deletions,
    })
}

/// Tree of HEAD, or None in an unborn repository.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    match repo.head() {
        Ok(head) => {
            let commit = head.peel_to_commit().map_err(GitError::ParseCommit)?;
            Ok(Some(commit.tree().map_err(GitError::ParseCommit)?))
        }
        Err(e)
            if e.code() == git2::ErrorCode::UnbornBranch
                || e.code() == git2::ErrorCode::NotFound =>
        {
            Ok(None)
        }
        Err(e) => Err(GitError::StatusFailed(e)),
    }
}
