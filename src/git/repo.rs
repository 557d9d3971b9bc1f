//! Repository detection with an explicit, invalidatable probe.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::error::GitError;

/// Cached answer to "is this directory inside a git repository".
///
/// The probe is constructed by the caller and passed into the pipeline, so
/// the cache has a clear owner instead of living in module state. Call
/// [`invalidate`](RepoProbe::invalidate) after any operation that may change
/// repository state (the commit workflow does this).
#[derive(Debug)]
pub struct RepoProbe {
    root: PathBuf,
    cached: Option<Option<PathBuf>>,
}

impl RepoProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cached: None,
        }
    }

    /// The directory this probe inspects.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `root` is inside a git repository. Cached after the first call.
    pub fn is_repository(&mut self) -> bool {
        self.probe().is_some()
    }

    /// The resolved git directory, when `root` is inside a repository.
    pub fn git_dir(&mut self) -> Option<PathBuf> {
        self.probe().cloned()
    }

    /// Drop the cached probe result. The next query re-inspects the filesystem.
    pub fn invalidate(&mut self) {
        debug!("Invalidating repository probe cache");
        self.cached = None;
    }

    /// Open the repository, failing with [`GitError::NotARepository`] when
    /// `root` is not inside one.
    pub fn open(&mut self) -> Result<Repository, GitError> {
        if !self.is_repository() {
            return Err(GitError::NotARepository {
                path: self.root.clone(),
            });
        }
        Repository::discover(&self.root).map_err(GitError::OpenRepository)
    }

    fn probe(&mut self) -> Option<&PathBuf> {
        let root = &self.root;
        self.cached
            .get_or_insert_with(|| match Repository::discover(root) {
                Ok(repo) => {
                    let dir = repo.path().to_path_buf();
                    debug!(git_dir = %dir.display(), "Detected git repository");
                    Some(dir)
                }
                Err(e) => {
                    debug!(path = %root.display(), error = %e, "Not a git repository");
                    None
                }
            })
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_detects_repository() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let mut probe = RepoProbe::new(dir.path());
        assert!(probe.is_repository());
        assert!(probe.git_dir().is_some());
    }

    #[test]
    fn test_probe_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();

        let mut probe = RepoProbe::new(dir.path());
        assert!(!probe.is_repository());
        assert!(matches!(
            probe.open(),
            Err(GitError::NotARepository { .. })
        ));
    }

    #[test]
    fn test_invalidate_picks_up_new_repository() {
        let dir = tempfile::tempdir().unwrap();

        let mut probe = RepoProbe::new(dir.path());
        assert!(!probe.is_repository());

        // Initialize after the first probe; the cache still says no.
        Repository::init(dir.path()).unwrap();
        assert!(!probe.is_repository());

        probe.invalidate();
        assert!(probe.is_repository());
    }
}
