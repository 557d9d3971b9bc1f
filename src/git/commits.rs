//! Commit collection with per-file diffs and stats.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Delta, Diff, DiffOptions, Patch, Repository};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitError;

use super::range::CommitRange;

/// Maximum bytes of unified diff text kept per file. Larger patches are cut
/// at a char boundary and marked truncated.
pub const MAX_FILE_DIFF_BYTES: usize = 8_000;

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed file within a commit or the working tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
    /// Old path for renames, None otherwise.
    pub old_path: Option<String>,
    /// Unified diff text for this file. None for binary files.
    pub diff_text: Option<String>,
    pub insertions: usize,
    pub deletions: usize,
    /// True when `diff_text` was cut at [`MAX_FILE_DIFF_BYTES`].
    pub truncated: bool,
}

/// A commit read from the repository. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub short_hash: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub subject: String,
    pub body: String,
    pub files: Vec<FileChange>,
    pub insertions: usize,
    pub deletions: usize,
}

impl CommitInfo {
    /// Subject and body joined back into the full message.
    pub fn message(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n\n{}", self.subject, self.body)
        }
    }

    /// Total changed lines across the commit.
    pub fn total_lines(&self) -> usize {
        self.insertions + self.deletions
    }
}

/// Collect commits in a range, newest first.
///
/// Walks from the range end hiding everything reachable from the range
/// start. Each commit is diffed against its first parent (the empty tree for
/// root commits) to produce per-file changes. At most `limit` commits are
/// returned.
pub fn collect_commits(
    repo: &Repository,
    range: &CommitRange,
    limit: usize,
) -> Result<Vec<CommitInfo>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(range.to).map_err(GitError::RevwalkError)?;
    if let Some(from) = range.from {
        revwalk.hide(from).map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid_result in revwalk {
        if commits.len() >= limit {
            debug!(limit, "Commit limit reached, stopping walk");
            break;
        }
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        commits.push(read_commit(repo, &commit)?);
    }

    Ok(commits)
}

/// Build a [`CommitInfo`] from a git2 commit, including its first-parent diff.
pub fn read_commit(repo: &Repository, commit: &Commit) -> Result<CommitInfo, GitError> {
    let hash = commit.id().to_string();
    let short_hash = hash.chars().take(7).collect();
    let author = commit.author().name().unwrap_or("unknown").to_string();
    let date = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    let message = commit.message().unwrap_or("");
    let mut lines = message.splitn(2, '\n');
    let subject = lines.next().unwrap_or("").trim_end().to_string();
    let body = lines.next().unwrap_or("").trim().to_string();

    let tree = commit.tree().map_err(GitError::ParseCommit)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(GitError::ParseCommit)?),
        Err(_) => None,
    };

    let mut opts = DiffOptions::new();
    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
        .map_err(|source| GitError::DiffFailed {
            hash: hash.clone(),
            source,
        })?;

    let files = collect_file_changes(&diff, &hash)?;
    let insertions = files.iter().map(|f| f.insertions).sum();
    let deletions = files.iter().map(|f| f.deletions).sum();

    Ok(CommitInfo {
        hash,
        short_hash,
        author,
        date,
        subject,
        body,
        files,
        insertions,
        deletions,
    })
}

/// Extract per-file changes (status, stats, bounded patch text) from a diff.
pub(crate) fn collect_file_changes(
    diff: &Diff<'_>,
    hash: &str,
) -> Result<Vec<FileChange>, GitError> {
    let mut files = Vec::new();

    for idx in 0..diff.deltas().len() {
        let Some(delta) = diff.get_delta(idx) else {
            continue;
        };

        let status = match delta.status() {
            Delta::Added | Delta::Untracked => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => FileStatus::Modified,
        };

        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());

        let (path, old_path) = match status {
            FileStatus::Renamed => {
                let path = new_path.or_else(|| old_path.clone()).unwrap_or_default();
                (path, old_path)
            }
            FileStatus::Deleted => (old_path.or(new_path).unwrap_or_default(), None),
            _ => (new_path.or(old_path).unwrap_or_default(), None),
        };
        if path.is_empty() {
            continue;
        }

        let mut insertions = 0;
        let mut deletions = 0;
        let mut diff_text = None;
        let mut truncated = false;

        let patch = Patch::from_diff(diff, idx).map_err(|source| GitError::DiffFailed {
            hash: hash.to_string(),
            source,
        })?;
        if let Some(mut patch) = patch {
            if let Ok((_, adds, dels)) = patch.line_stats() {
                insertions = adds;
                deletions = dels;
            }
            if let Ok(buf) = patch.to_buf()
                && let Some(text) = buf.as_str()
            {
                if text.len() > MAX_FILE_DIFF_BYTES {
                    let mut end = MAX_FILE_DIFF_BYTES;
                    while end > 0 && !text.is_char_boundary(end) {
                        end -= 1;
                    }
                    diff_text = Some(text[..end].to_string());
                    truncated = true;
                } else {
                    diff_text = Some(text.to_string());
                }
            }
        }

        files.push(FileChange {
            path,
            status,
            old_path,
            diff_text,
            insertions,
            deletions,
            truncated,
        });
    }

    Ok(files)
}
