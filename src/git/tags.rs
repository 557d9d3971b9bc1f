//! Tag enumeration and version tag detection.

use std::collections::HashMap;

use git2::{Oid, Repository};
use semver::Version;
use tracing::{debug, warn};

use crate::error::GitError;

/// A git tag with its target commit and parsed semver version, if any.
#[derive(Debug, Clone)]
pub struct VersionTag {
    pub name: String,
    pub target: Oid,
    pub version: Option<Version>,
}

/// The most recent version tag reachable from HEAD.
///
/// Walks commits from HEAD and returns the first one carrying a tag with a
/// parseable semver version. Tags on other branches are ignored. Returns
/// None in an unborn or untagged repository.
pub fn latest_tag(repo: &Repository) -> Result<Option<VersionTag>, GitError> {
    let head_oid = match repo.head().ok().and_then(|head| head.target()) {
        Some(oid) => oid,
        None => return Ok(None),
    };

    let mut tags_by_commit: HashMap<Oid, Vec<VersionTag>> = HashMap::new();
    for tag in all_tags(repo)?
        .into_iter()
        .filter(|tag| tag.version.is_some())
    {
        tags_by_commit.entry(tag.target).or_default().push(tag);
    }

    if tags_by_commit.is_empty() {
        debug!("No version tags found in repository");
        return Ok(None);
    }

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(head_oid).map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
        .map_err(GitError::RevwalkError)?;

    for oid in revwalk {
        let oid = oid.map_err(GitError::RevwalkError)?;
        if let Some(candidates) = tags_by_commit.get(&oid) {
            let latest = candidates
                .iter()
                .max_by(|a, b| a.version.cmp(&b.version))
                .cloned();
            if let Some(tag) = latest {
                debug!(tag = %tag.name, "Found latest reachable version tag");
                return Ok(Some(tag));
            }
        }
    }

    Ok(None)
}

/// All tags in the repository, annotated tags resolved to their commits.
pub fn all_tags(repo: &Repository) -> Result<Vec<VersionTag>, GitError> {
    let mut tags = Vec::new();

    repo.tag_foreach(|oid, name_bytes| {
        if let Ok(name_str) = std::str::from_utf8(name_bytes) {
            let name = name_str
                .strip_prefix("refs/tags/")
                .unwrap_or(name_str)
                .to_string();

            let version = version_from_tag(&name);

            // Annotated tags point at a tag object, not the commit.
            let target = match repo.find_tag(oid) {
                Ok(tag_obj) => tag_obj.target_id(),
                Err(_) => oid,
            };

            tags.push(VersionTag {
                name,
                target,
                version,
            });
        } else {
            warn!("Skipping tag with OID {} - name is not valid UTF-8", oid);
        }
        true
    })
    .map_err(GitError::RevwalkError)?;

    Ok(tags)
}

/// Extract a semver version from a tag name.
/// Handles both "v1.2.3" and "1.2.3" formats.
pub fn version_from_tag(tag_name: &str) -> Option<Version> {
    let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);
    Version::parse(version_str).ok()
}
