//! Deterministic guards validating AI output against the commit's actual
//! size and shape.

use tracing::debug;

use crate::classify::{categorize_file, FileCategory};
use crate::git::commits::{CommitInfo, FileStatus};

use super::Summary;

/// Category correction thresholds: a "fix" touching more than this many
/// files, adding more than this many new files, or inserting more than this
/// many net lines cannot semantically be a bug fix.
const FIX_MAX_FILES: usize = 10;
const FIX_MAX_NEW_FILES: usize = 5;
const FIX_MAX_NET_INSERTIONS: usize = 1_000;

/// Impact correction thresholds.
const HUGE_CHANGE_FILES: usize = 50;
const HUGE_CHANGE_LINES: usize = 5_000;
const TINY_CHANGE_FILES: usize = 3;
const TINY_CHANGE_LINES: usize = 100;

/// Validate and correct an AI summary in place.
///
/// Applies the category correction first, then the impact correction.
/// Neither guard consults the AI's own reasoning, only the commit's
/// structural facts.
pub fn apply_guards(summary: &mut Summary, commit: &CommitInfo) {
    correct_category(summary, commit);
    correct_impact(summary, commit);
}

fn correct_category(summary: &mut Summary, commit: &CommitInfo) {
    let file_categories: Vec<FileCategory> = commit
        .files
        .iter()
        .map(|file| categorize_file(&file.path))
        .collect();

    // Pure documentation or test file sets override whatever the AI said.
    if !file_categories.is_empty() {
        if file_categories
            .iter()
            .all(|c| *c == FileCategory::Documentation)
        {
            set_category(summary, "documentation");
            return;
        }
        if file_categories.iter().all(|c| *c == FileCategory::Tests) {
            set_category(summary, "test");
            return;
        }
    }

    let is_fix = matches!(summary.category.as_deref(), Some("fix") | Some("bugfix"));
    if !is_fix {
        return;
    }

    let new_files = commit
        .files
        .iter()
        .filter(|file| file.status == FileStatus::Added)
        .count();
    let net_insertions = commit.insertions.saturating_sub(commit.deletions);

    if commit.files.len() > FIX_MAX_FILES
        || new_files > FIX_MAX_NEW_FILES
        || net_insertions > FIX_MAX_NET_INSERTIONS
    {
        let corrected = if commit.deletions >= commit.insertions {
            "refactor"
        } else {
            "feature"
        };
        set_category(summary, corrected);
    }
}

fn correct_impact(summary: &mut Summary, commit: &CommitInfo) {
    let impact = summary
        .impact
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let total_lines = commit.total_lines();
    let files = commit.files.len();

    if matches!(impact.as_str(), "minimal" | "low")
        && (files > HUGE_CHANGE_FILES || total_lines > HUGE_CHANGE_LINES)
    {
        debug!(files, total_lines, "Raising understated impact to high");
        summary.impact = Some("high".to_string());
        return;
    }

    if matches!(impact.as_str(), "critical" | "high")
        && files <= TINY_CHANGE_FILES
        && total_lines <= TINY_CHANGE_LINES
        && !has_explicit_breaking_marker(&commit.subject)
    {
        debug!(files, total_lines, "Lowering overstated impact to medium");
        summary.impact = Some("medium".to_string());
    }
}

/// Explicit breaking marker in the subject: `!:` or a BREAKING CHANGE note.
fn has_explicit_breaking_marker(subject: &str) -> bool {
    subject.contains("!:") || subject.contains("BREAKING CHANGE")
}

fn set_category(summary: &mut Summary, category: &str) {
    if summary.category.as_deref() != Some(category) {
        debug!(
            from = summary.category.as_deref().unwrap_or("none"),
            to = category,
            "Corrected AI category"
        );
        summary.category = Some(category.to_string());
    }
}
