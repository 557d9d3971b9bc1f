//! Conventional commit parsing.

use serde::{Deserialize, Serialize};

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
    Merge,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Perf => "perf",
            Self::Test => "test",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Chore => "chore",
            Self::Revert => "revert",
            Self::Merge => "merge",
        }
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "perf" => Ok(Self::Perf),
            "test" => Ok(Self::Test),
            "build" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "chore" => Ok(Self::Chore),
            "revert" => Ok(Self::Revert),
            "merge" => Ok(Self::Merge),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing a subject against `type(scope)!: description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalCommit {
    /// Recognized type, None when the shape did not parse or the type is
    /// not in the closed set.
    pub commit_type: Option<CommitType>,
    /// Type text as written, kept even for unrecognized types.
    pub raw_type: Option<String>,
    pub scope: Option<String>,
    /// `!` marker or a BREAKING CHANGE footer.
    pub breaking: bool,
    pub description: String,
    pub is_conventional: bool,
    /// False when the shape parsed but the type is outside the closed set.
    pub is_valid_type: bool,
}

impl ConventionalCommit {
    fn non_conventional(subject: &str, breaking: bool) -> Self {
        Self {
            commit_type: None,
            raw_type: None,
            scope: None,
            breaking,
            description: subject.to_string(),
            is_conventional: false,
            is_valid_type: false,
        }
    }

    /// Type label for rendering: the recognized type, the raw type text, or
    /// None for non-conventional messages.
    pub fn type_label(&self) -> Option<&str> {
        match &self.commit_type {
            Some(t) => Some(t.as_str()),
            None => self.raw_type.as_deref(),
        }
    }
}

/// Parse a commit subject (with its body for footer detection).
///
/// Unrecognized types still parse the shape but carry `is_valid_type =
/// false`. A message that does not match the shape at all comes back with
/// the whole subject as description and no type or scope.
pub fn parse_conventional(subject: &str, body: &str) -> ConventionalCommit {
    let breaking_in_footer =
        body.contains("BREAKING CHANGE:") || body.contains("BREAKING-CHANGE:");

    // Pattern: type(scope)!: description, scope and ! optional
    let re = regex_lite::Regex::new(r"^(\w+)(?:\(([^)]+)\))?(!)?\s*:\s*(.*)$").unwrap();

    let Some(caps) = re.captures(subject) else {
        return ConventionalCommit::non_conventional(subject, breaking_in_footer);
    };

    let type_str = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let scope = caps.get(2).map(|m| m.as_str().to_string());
    let breaking_mark = caps.get(3).is_some();
    let description = caps.get(4).map(|m| m.as_str()).unwrap_or("").to_string();

    let commit_type = type_str.parse::<CommitType>().ok();

    ConventionalCommit {
        commit_type,
        raw_type: Some(type_str.to_string()),
        scope,
        breaking: breaking_mark || breaking_in_footer,
        description,
        is_conventional: true,
        is_valid_type: commit_type.is_some(),
    }
}
