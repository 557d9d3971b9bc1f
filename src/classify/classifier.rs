//! Rule-based commit classification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyze::analyze_diff;
use crate::git::commits::CommitInfo;

use super::conventional::{parse_conventional, CommitType, ConventionalCommit};
use super::rules::{
    categorize_file, files_have_breaking_signal, is_critical_path, keyword_category,
    message_has_breaking_phrase, FileCategory, Impact, Importance,
};

/// Changed-line threshold above which importance escalates one step.
const LARGE_CHANGE_LINES: usize = 500;
/// File-count threshold above which importance escalates one step.
const LARGE_CHANGE_FILES: usize = 20;

/// Derived categorical metadata for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Semantic change categories: the primary category plus markers for
    /// pure documentation or test changes.
    pub categories: BTreeSet<String>,
    /// Descriptive tags accumulated from diff analysis.
    pub tags: BTreeSet<String>,
    pub importance: Importance,
    pub impact: Impact,
    pub user_facing: bool,
}

impl Classification {
    /// The most visible category, by display priority. The set is small
    /// (primary plus optional docs/tests markers), so a scan is enough.
    pub fn primary_category(&self) -> &str {
        self.categories
            .iter()
            .map(String::as_str)
            .min_by_key(|category| category_rank(category))
            .unwrap_or("other")
    }
}

/// Display priority used when several categories apply. Lower ranks win.
pub(crate) fn category_rank(category: &str) -> usize {
    match category {
        "feature" => 0,
        "bugfix" => 1,
        "performance" => 2,
        "security" => 3,
        "documentation" => 4,
        "test" => 5,
        "refactor" => 6,
        "build" => 7,
        "style" => 8,
        _ => 9,
    }
}

/// Classify a commit. Never fails: ambiguous input resolves toward the
/// more visible category rather than dropping the commit.
pub fn classify(commit: &CommitInfo) -> Classification {
    let conventional = parse_conventional(&commit.subject, &commit.body);
    let message = commit.message();

    let file_categories: Vec<FileCategory> = commit
        .files
        .iter()
        .map(|file| categorize_file(&file.path))
        .collect();

    let primary = resolve_primary(&conventional, &message, &file_categories);

    let mut categories = BTreeSet::new();
    categories.insert(primary.to_string());
    if !file_categories.is_empty() {
        if file_categories
            .iter()
            .all(|c| *c == FileCategory::Documentation)
        {
            categories.insert("documentation".to_string());
        }
        if file_categories.iter().all(|c| *c == FileCategory::Tests) {
            categories.insert("test".to_string());
        }
    }

    let breaking = conventional.breaking
        || message_has_breaking_phrase(&message)
        || files_have_breaking_signal(&commit.files);

    let mut tags = BTreeSet::new();
    for file in &commit.files {
        if let Some(diff) = &file.diff_text {
            let signals = analyze_diff(diff, &file.path);
            tags.extend(signals.patterns);
            tags.extend(signals.frameworks);
        }
    }

    let mut importance = base_importance(primary);
    if commit.files.iter().any(|file| is_critical_path(&file.path)) {
        importance = importance.max(Importance::High);
    }
    if commit.total_lines() > LARGE_CHANGE_LINES || commit.files.len() > LARGE_CHANGE_FILES {
        importance = importance.escalate();
    }
    if breaking {
        importance = Importance::Critical;
    }

    let impact = if breaking {
        Impact::Major
    } else if primary == "feature" {
        Impact::Minor
    } else {
        Impact::Patch
    };

    let user_facing =
        breaking || matches!(primary, "feature" | "bugfix" | "performance" | "security");

    debug!(
        hash = %commit.short_hash,
        primary,
        importance = %importance,
        impact = %impact,
        breaking,
        "Classified commit"
    );

    Classification {
        categories,
        tags,
        importance,
        impact,
        user_facing,
    }
}

/// Whether a classification carries a breaking signal. Only breaking
/// changes produce major impact.
pub fn is_breaking(classification: &Classification) -> bool {
    classification.impact == Impact::Major
}

/// Map a recognized conventional type to its changelog category.
pub fn type_category(commit_type: CommitType) -> &'static str {
    match commit_type {
        CommitType::Feat => "feature",
        CommitType::Fix => "bugfix",
        CommitType::Docs => "documentation",
        CommitType::Style => "style",
        CommitType::Refactor => "refactor",
        CommitType::Perf => "performance",
        CommitType::Test => "test",
        CommitType::Build | CommitType::Ci => "build",
        CommitType::Chore | CommitType::Revert | CommitType::Merge => "other",
    }
}

fn resolve_primary(
    conventional: &ConventionalCommit,
    message: &str,
    file_categories: &[FileCategory],
) -> &'static str {
    if let Some(commit_type) = conventional.commit_type {
        return type_category(commit_type);
    }
    if let Some(category) = keyword_category(message) {
        return category;
    }
    if !file_categories.is_empty() {
        if file_categories
            .iter()
            .all(|c| *c == FileCategory::Documentation)
        {
            return "documentation";
        }
        if file_categories.iter().all(|c| *c == FileCategory::Tests) {
            return "test";
        }
        if file_categories
            .iter()
            .all(|c| *c == FileCategory::Configuration)
        {
            return "build";
        }
    }
    "other"
}

fn base_importance(category: &str) -> Importance {
    match category {
        "feature" | "bugfix" | "performance" => Importance::Medium,
        "security" => Importance::High,
        _ => Importance::Low,
    }
}
