//! Ordered rule tables for classification: file categories, breaking
//! signals, escalation ladders and keyword fallback.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::git::commits::{FileChange, FileStatus};

/// File categories in priority order. The first matching rule wins, so the
/// variant order here is part of the classification contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Configuration,
    Documentation,
    Tests,
    Source,
    Frontend,
    Assets,
    Build,
    Other,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Documentation => "documentation",
            Self::Tests => "tests",
            Self::Source => "source",
            Self::Frontend => "frontend",
            Self::Assets => "assets",
            Self::Build => "build",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path patterns per category, evaluated in priority order over the
/// lowercased path.
const FILE_CATEGORY_RULES: &[(FileCategory, &str)] = &[
    (
        FileCategory::Configuration,
        r"\.(toml|ya?ml|ini|conf|cfg)$|(^|/)\.env|(^|/)[^/]*config[^/]*\.(js|ts|mjs|cjs|json)$|(^|/)config(/|$)|(^|/)(package|tsconfig|composer)\.json$",
    ),
    (
        FileCategory::Documentation,
        r"\.(md|mdx|txt|rst|adoc)$|(^|/)(readme|changelog|license|contributing)(\.|$)|(^|/)docs?(/|$)",
    ),
    (
        FileCategory::Tests,
        r"(^|/)(tests?|specs?|__tests__|__mocks__)(/|$)|\.(test|spec)\.|_test\.[a-z]+$",
    ),
    (
        FileCategory::Source,
        r"\.(js|ts|mjs|cjs|rs|go|py|java|rb|php|c|h|cpp|hpp|cs|kt|swift|scala|ex|exs)$",
    ),
    (
        FileCategory::Frontend,
        r"\.(tsx|jsx|vue|svelte|css|scss|sass|less|html)$",
    ),
    (
        FileCategory::Assets,
        r"\.(png|jpe?g|gif|svg|ico|webp|woff2?|ttf|eot|otf|mp4|webm|mp3)$",
    ),
    (
        FileCategory::Build,
        r"(^|/)(dockerfile|makefile|justfile|rakefile)$|\.(lock|gradle)$|(^|/)\.github/|(^|/)(scripts|ci)(/|$)|(^|/)(go\.mod|go\.sum|pom\.xml)$",
    ),
];

/// Categorize a file by its path. Falls through to [`FileCategory::Other`].
pub fn categorize_file(path: &str) -> FileCategory {
    let lower = path.to_lowercase();
    for (category, pattern) in FILE_CATEGORY_RULES {
        let re = Regex::new(pattern).expect("Invalid file category pattern");
        if re.is_match(&lower) {
            return *category;
        }
    }
    FileCategory::Other
}

/// Path fragments that mark a change as touching critical infrastructure.
const CRITICAL_PATH_FRAGMENTS: &[&str] = &[
    "package.json",
    ".env",
    "docker",
    "migration",
    "schema",
    "config",
    "security",
    "auth",
];

pub fn is_critical_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    CRITICAL_PATH_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Phrase patterns that mark a message as breaking, matched
/// case-insensitively against subject and body.
const BREAKING_PHRASES: &[&str] = &[
    r"BREAKING CHANGE",
    r"breaking",
    r"!:",
    r"incompatible",
    r"remove.*api",
    r"drop.*support",
    r"major.*change",
];

pub fn message_has_breaking_phrase(text: &str) -> bool {
    BREAKING_PHRASES.iter().any(|phrase| {
        let re = Regex::new(&format!("(?i){}", phrase)).expect("Invalid breaking phrase");
        re.is_match(text)
    })
}

/// Paths whose deletion or interface removal signals a breaking change.
pub fn is_interface_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    ["api", "interface", "types", "schema"]
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// A removed `export` or `function` line in a diff.
pub fn has_removed_interface_line(diff_text: &str) -> bool {
    diff_text.lines().any(|line| {
        if line.starts_with("---") || !line.starts_with('-') {
            return false;
        }
        let re = Regex::new(r"\b(export|function)\b").expect("Invalid interface pattern");
        re.is_match(line)
    })
}

/// Structural breaking signal over a commit's files: deletion of an
/// interface-bearing path, or removal of an export/function line inside one.
pub fn files_have_breaking_signal(files: &[FileChange]) -> bool {
    files.iter().any(|file| {
        if !is_interface_path(&file.path) {
            return false;
        }
        if file.status == FileStatus::Deleted {
            return true;
        }
        file.diff_text
            .as_deref()
            .is_some_and(has_removed_interface_line)
    })
}

/// Coarse visibility level of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// One step up the ladder, capped at Critical.
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release impact of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Patch,
    Minor,
    Major,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword tables for messages without a parseable conventional type,
/// tested in this fixed order. First match wins.
const KEYWORD_TABLES: &[(&str, &[&str])] = &[
    (
        "feature",
        &["add", "new", "implement", "introduce", "create", "support"],
    ),
    (
        "bugfix",
        &["fix", "bug", "patch", "resolve", "correct", "repair"],
    ),
    ("documentation", &["doc", "readme", "comment", "guide"]),
    ("test", &["test", "spec", "coverage"]),
    (
        "refactor",
        &["refactor", "restructure", "rewrite", "clean up", "cleanup", "simplify"],
    ),
    (
        "performance",
        &["perf", "optimiz", "optimis", "speed", "faster"],
    ),
    ("security", &["security", "vulnerab", "cve", "harden"]),
    (
        "build",
        &["build", "ci", "pipeline", "docker", "dependenc", "bump", "upgrade"],
    ),
    ("style", &["style", "format", "lint", "whitespace"]),
];

/// Infer a category from message keywords. None when nothing matches.
///
/// Keywords match at word boundaries with prefix semantics, so `doc`
/// catches "docs" and "documentation" but `ci` does not catch "exciting".
pub fn keyword_category(message: &str) -> Option<&'static str> {
    for (category, keywords) in KEYWORD_TABLES {
        for keyword in *keywords {
            let re = Regex::new(&format!(r"(?i)\b{}", keyword)).expect("Invalid keyword pattern");
            if re.is_match(message) {
                return Some(category);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_priority_order() {
        assert_eq!(categorize_file("config/database.yml"), FileCategory::Configuration);
        assert_eq!(categorize_file("webpack.config.js"), FileCategory::Configuration);
        assert_eq!(categorize_file("README.md"), FileCategory::Documentation);
        assert_eq!(categorize_file("docs/guide.html"), FileCategory::Documentation);
        assert_eq!(categorize_file("tests/range_test.rs"), FileCategory::Tests);
        assert_eq!(categorize_file("src/Login.test.tsx"), FileCategory::Tests);
        assert_eq!(categorize_file("src/main.rs"), FileCategory::Source);
        assert_eq!(categorize_file("src/ui/Login.tsx"), FileCategory::Frontend);
        assert_eq!(categorize_file("assets/logo.svg"), FileCategory::Assets);
        assert_eq!(categorize_file("Dockerfile"), FileCategory::Build);
        assert_eq!(categorize_file("Cargo.lock"), FileCategory::Build);
        assert_eq!(categorize_file("data/fixtures.bin"), FileCategory::Other);
    }

    #[test]
    fn test_configuration_beats_build_for_workflows() {
        // Priority ordering is the contract: yaml wins before .github/.
        assert_eq!(
            categorize_file(".github/workflows/ci.yml"),
            FileCategory::Configuration
        );
    }

    #[test]
    fn test_test_named_config_is_not_configuration() {
        assert_eq!(categorize_file("tests/config_test.rs"), FileCategory::Tests);
    }

    #[test]
    fn test_critical_paths() {
        assert!(is_critical_path("package.json"));
        assert!(is_critical_path("docker-compose.yml"));
        assert!(is_critical_path("src/api/auth.js"));
        assert!(is_critical_path("db/migrations/001_init.sql"));
        assert!(!is_critical_path("src/ui/Login.tsx"));
    }

    #[test]
    fn test_breaking_phrases() {
        assert!(message_has_breaking_phrase("BREAKING CHANGE: removed"));
        assert!(message_has_breaking_phrase("this is a Breaking update"));
        assert!(message_has_breaking_phrase("fix!: something"));
        assert!(message_has_breaking_phrase("now incompatible with v1"));
        assert!(message_has_breaking_phrase("remove deprecated api"));
        assert!(message_has_breaking_phrase("drop legacy support"));
        assert!(message_has_breaking_phrase("major architecture change"));
        assert!(!message_has_breaking_phrase("feat: add login button"));
    }

    #[test]
    fn test_removed_interface_line() {
        assert!(has_removed_interface_line("-export function doThing() {"));
        assert!(has_removed_interface_line("-export const API_URL = '/v1';"));
        assert!(!has_removed_interface_line("+export function doThing() {"));
        assert!(!has_removed_interface_line("--- a/src/api/auth.js"));
        assert!(!has_removed_interface_line("-const internal = 1;"));
    }

    #[test]
    fn test_escalation_caps_at_critical() {
        assert_eq!(Importance::Low.escalate(), Importance::Medium);
        assert_eq!(Importance::High.escalate(), Importance::Critical);
        assert_eq!(Importance::Critical.escalate(), Importance::Critical);
    }

    #[test]
    fn test_keyword_fallback_order() {
        // "add" (feature) is tested before "fix" (bugfix).
        assert_eq!(keyword_category("add fix for thing"), Some("feature"));
        assert_eq!(keyword_category("resolve crash on start"), Some("bugfix"));
        assert_eq!(keyword_category("update readme"), Some("documentation"));
        assert_eq!(keyword_category("bump deps"), Some("build"));
        assert_eq!(keyword_category("misc"), None);
    }
}
