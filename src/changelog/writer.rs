//! Persist rendered changelog sections into a changelog file.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ChangelogError;

use super::parser::{find_insertion_point, read_changelog};

/// Keep a Changelog header for freshly created files.
pub const CHANGELOG_HEADER: &str = r#"# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).

"#;

/// Write a rendered version section into the changelog at `path`.
///
/// - Creates the file with the standard header when it does not exist.
/// - Backs the existing file up to `<name>.md.bak` before touching it.
/// - Inserts after the header and any `[Unreleased]` block, keeping every
///   existing section.
/// - Replaces the file through a temp file in the same directory so a
///   failed write never leaves a half-written changelog.
pub fn write_changelog(path: &Path, rendered: &str, version: &str) -> Result<(), ChangelogError> {
    let existing = read_changelog(path)?;

    let new_content = match existing {
        Some(existing) => {
            let backup_path = path.with_extension("md.bak");
            std::fs::copy(path, &backup_path).map_err(ChangelogError::BackupFailed)?;
            debug!(backup = %backup_path.display(), "Backed up existing changelog");

            if existing.raw_content.contains(&format!("## [{version}]")) {
                warn!(version, "Changelog already has a section for this version; inserting another");
            }
            if let Some(latest) = &existing.latest_version {
                debug!(latest, version, "Inserting before latest released section");
            }

            let insertion_point = find_insertion_point(&existing.raw_content);
            let mut content = String::with_capacity(existing.raw_content.len() + rendered.len() + 1);
            content.push_str(&existing.raw_content[..insertion_point]);
            content.push_str(rendered);
            content.push('\n');
            content.push_str(&existing.raw_content[insertion_point..]);
            content
        }
        None => {
            let mut content = CHANGELOG_HEADER.to_string();
            content.push_str(rendered);
            content
        }
    };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match parent {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(ChangelogError::WriteFailed)?;

    tmp.write_all(new_content.as_bytes())
        .map_err(ChangelogError::WriteFailed)?;
    tmp.persist(path)
        .map_err(|e| ChangelogError::WriteFailed(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");

        write_changelog(&path, "## [1.0.0] - 2024-01-01\n\n- initial release\n", "1.0.0").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Changelog"));
        assert!(content.contains("## [1.0.0] - 2024-01-01"));
        assert!(content.contains("Keep a Changelog"));
    }

    #[test]
    fn test_inserts_after_unreleased_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let original =
            "# Changelog\n\n## [Unreleased]\n\n- pending\n\n## [1.0.0] - 2024-01-01\n\n- old\n";
        std::fs::write(&path, original).unwrap();

        write_changelog(&path, "## [1.1.0] - 2024-02-01\n\n- new thing\n", "1.1.0").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let unreleased = content.find("## [Unreleased]").unwrap();
        let new_section = content.find("## [1.1.0]").unwrap();
        let old_section = content.find("## [1.0.0]").unwrap();
        assert!(unreleased < new_section);
        assert!(new_section < old_section);
        assert!(content.contains("- pending"));
        assert!(content.contains("- old"));

        let backup = std::fs::read_to_string(dir.path().join("CHANGELOG.md.bak")).unwrap();
        assert_eq!(backup, original);
    }

    #[test]
    fn test_inserts_before_first_release_without_unreleased() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "# Changelog\n\n## [1.0.0] - 2024-01-01\n\n- old\n").unwrap();

        write_changelog(&path, "## [1.1.0] - 2024-02-01\n\n- new\n", "1.1.0").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let new_section = content.find("## [1.1.0]").unwrap();
        let old_section = content.find("## [1.0.0]").unwrap();
        assert!(new_section < old_section);
    }
}
