//! Read existing changelog files using parse-changelog.

use std::path::Path;

use crate::error::ChangelogError;

/// Parsed view of an existing changelog file.
#[derive(Debug)]
pub struct ParsedChangelog {
    pub has_unreleased: bool,
    /// Version string of the newest released section, brackets stripped.
    pub latest_version: Option<String>,
    pub raw_content: String,
}

/// Read and parse an existing changelog. `Ok(None)` when the file does not
/// exist; `ParseFailed` when it exists but is not a markdown changelog.
pub fn read_changelog(path: &Path) -> Result<Option<ParsedChangelog>, ChangelogError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(ChangelogError::ReadFailed)?;

    let changelog =
        parse_changelog::parse(&content).map_err(|e| ChangelogError::ParseFailed(e.to_string()))?;

    let has_unreleased =
        changelog.get("Unreleased").is_some() || changelog.get("unreleased").is_some();

    let latest_version = changelog
        .iter()
        .find(|(title, _)| {
            let t = title.to_lowercase();
            t != "unreleased" && !t.is_empty()
        })
        .map(|(title, _)| version_from_title(title));

    Ok(Some(ParsedChangelog {
        has_unreleased,
        latest_version,
        raw_content: content,
    }))
}

/// Extract the version string from a section title like
/// `[1.2.3] - 2024-01-01` or `1.2.3 - 2024-01-01`.
fn version_from_title(title: &str) -> String {
    let title = title.trim();

    if let Some(stripped) = title.strip_prefix('[')
        && let Some(end) = stripped.find(']')
    {
        return stripped[..end].to_string();
    }

    if let Some(dash) = title.find(" - ") {
        return title[..dash].trim().to_string();
    }

    title.to_string()
}

/// Byte offset where a new version section belongs: after the file header
/// and any `[Unreleased]` block, before the first released section.
pub fn find_insertion_point(content: &str) -> usize {
    let mut line_offsets = Vec::new();
    let mut offset = 0;
    for line in content.lines() {
        line_offsets.push((offset, line));
        offset += line.len() + 1;
    }

    let mut sections = line_offsets
        .iter()
        .filter(|(_, line)| line.starts_with("## "));

    match sections.next() {
        Some((_, first)) if first.to_lowercase().contains("unreleased") => sections
            .next()
            .map(|(next_offset, _)| *next_offset)
            .unwrap_or(content.len()),
        Some((first_offset, _)) => *first_offset,
        None => content.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_title_with_brackets() {
        assert_eq!(version_from_title("[1.2.3] - 2024-01-01"), "1.2.3");
    }

    #[test]
    fn test_version_from_title_without_brackets() {
        assert_eq!(version_from_title("1.2.3 - 2024-01-01"), "1.2.3");
    }

    #[test]
    fn test_insertion_point_header_only() {
        let content = "# Changelog\n\nSome header text.\n";
        assert_eq!(find_insertion_point(content), content.len());
    }

    #[test]
    fn test_insertion_point_after_unreleased() {
        let content = "# Changelog\n\n## [Unreleased]\n\n- Some change\n\n## [1.0.0] - 2024-01-01\n";
        let pos = find_insertion_point(content);
        assert!(content[pos..].starts_with("## [1.0.0]"));
    }

    #[test]
    fn test_insertion_point_before_first_release() {
        let content = "# Changelog\n\nIntro.\n\n## [0.9.0] - 2023-12-01\n\n- Old change\n";
        let pos = find_insertion_point(content);
        assert!(content[pos..].starts_with("## [0.9.0]"));
    }

    #[test]
    fn test_insertion_point_unreleased_is_last_section() {
        let content = "# Changelog\n\n## [Unreleased]\n\n- Pending change";
        assert_eq!(find_insertion_point(content), content.len());
    }
}
