//! Commit range resolution from user-supplied or tag-derived references.

use git2::{Oid, Repository};
use tracing::debug;

use crate::error::GitError;

use super::tags::latest_tag;

/// A resolved range of history to analyze.
///
/// `from` is exclusive and `to` inclusive, matching `from..to`. A `None`
/// start means the walk is unbounded and includes the root commit.
#[derive(Debug, Clone)]
pub struct CommitRange {
    pub from: Option<Oid>,
    pub to: Oid,
    /// Reference text the start was resolved from, for display.
    pub from_ref: Option<String>,
    /// Reference text the end was resolved from.
    pub to_ref: String,
}

impl CommitRange {
    /// Human-readable `a..b` form.
    pub fn describe(&self) -> String {
        match &self.from_ref {
            Some(from) => format!("{}..{}", from, self.to_ref),
            None => format!("..{}", self.to_ref),
        }
    }
}

/// Resolve an explicit range. When `from` is None the latest tag is used as
/// the start; a repository without tags yields an unbounded range.
pub fn resolve_range(
    repo: &Repository,
    from: Option<&str>,
    to: &str,
) -> Result<CommitRange, GitError> {
    let to_oid = resolve_ref(repo, to)?;

    let (from_oid, from_ref) = match from {
        Some(reference) => (
            Some(resolve_ref(repo, reference)?),
            Some(reference.to_string()),
        ),
        None => match latest_tag(repo)? {
            Some(tag) => {
                debug!(tag = %tag.name, "Using latest tag as range start");
                (Some(tag.target), Some(tag.name))
            }
            None => {
                debug!("No tags found, walking full history");
                (None, None)
            }
        },
    };

    Ok(CommitRange {
        from: from_oid,
        to: to_oid,
        from_ref,
        to_ref: to.to_string(),
    })
}

/// Resolve a revision string to the commit it points at.
fn resolve_ref(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    let object = repo
        .revparse_single(reference)
        .map_err(|source| GitError::ReferenceNotFound {
            reference: reference.to_string(),
            source,
        })?;
    let commit = object
        .peel_to_commit()
        .map_err(|source| GitError::ReferenceNotFound {
            reference: reference.to_string(),
            source,
        })?;
    Ok(commit.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_with_commits(n: usize) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        for i in 0..n {
            std::fs::write(dir.path().join(format!("f{i}.txt")), format!("{i}\n")).unwrap();
            let mut index = repo.index().unwrap();
            index
                .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
                .unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
            let parents: Vec<_> = parent.iter().collect();
            repo.commit(
                Some("HEAD"),
                &sig,
                &sig,
                &format!("commit {i}"),
                &tree,
                &parents,
            )
            .unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_resolve_head() {
        let (_dir, repo) = repo_with_commits(2);
        let range = resolve_range(&repo, None, "HEAD").unwrap();
        assert!(range.from.is_none());
        assert_eq!(range.to_ref, "HEAD");
        assert_eq!(range.describe(), "..HEAD");
    }

    #[test]
    fn test_unknown_reference_fails() {
        let (_dir, repo) = repo_with_commits(1);
        let err = resolve_range(&repo, Some("does-not-exist"), "HEAD").unwrap_err();
        assert!(matches!(err, GitError::ReferenceNotFound { .. }));
    }

    #[test]
    fn test_latest_tag_becomes_range_start() {
        let (_dir, repo) = repo_with_commits(3);
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        let first = head.parent(0).unwrap().parent(0).unwrap();
        repo.tag_lightweight("v0.1.0", first.as_object(), false)
            .unwrap();

        let range = resolve_range(&repo, None, "HEAD").unwrap();
        assert_eq!(range.from, Some(first.id()));
        assert_eq!(range.from_ref.as_deref(), Some("v0.1.0"));
        assert_eq!(range.describe(), "v0.1.0..HEAD");
    }

    #[test]
    fn test_explicit_range_resolves_both_ends() {
        let (_dir, repo) = repo_with_commits(2);
        let range = resolve_range(&repo, Some("HEAD~1"), "HEAD").unwrap();
        assert!(range.from.is_some());
        assert_ne!(range.from.unwrap(), range.to);
    }
}
