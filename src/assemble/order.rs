//! Entry ordering and section assignment.

use crate::classify::is_breaking;

use super::ReleaseEntry;

/// Section keys and display titles, in document order.
pub const SECTIONS: &[(&str, &str)] = &[
    ("breaking", "⚠️ Breaking Changes"),
    ("feature", "✨ Features"),
    ("bugfix", "🐛 Bug Fixes"),
    ("performance", "⚡ Performance"),
    ("security", "🔒 Security"),
    ("documentation", "📝 Documentation"),
    ("test", "🧪 Tests"),
    ("refactor", "♻️ Refactoring"),
    ("build", "🔧 Build"),
    ("style", "🎨 Style"),
    ("other", "📦 Other Changes"),
];

/// Position of a section key in [`SECTIONS`]. Unknown keys sort last.
pub(crate) fn section_rank(key: &str) -> usize {
    SECTIONS
        .iter()
        .position(|(k, _)| *k == key)
        .unwrap_or(SECTIONS.len() - 1)
}

/// Which section an entry belongs to. Breaking entries always land in the
/// breaking section; otherwise the AI category wins when it maps to a known
/// key, with the rule-based primary category as fallback.
pub(crate) fn section_key(entry: &ReleaseEntry) -> &'static str {
    if entry_is_breaking(entry) {
        return "breaking";
    }
    if let Some(summary) = &entry.summary
        && let Some(category) = summary.category.as_deref()
        && let Some(key) = normalize_category(category)
    {
        return key;
    }
    normalize_category(entry.classification.primary_category()).unwrap_or("other")
}

/// Map loose category spellings onto section keys.
fn normalize_category(raw: &str) -> Option<&'static str> {
    let key = match raw.to_lowercase().as_str() {
        "feature" | "feat" => "feature",
        "bugfix" | "fix" => "bugfix",
        "performance" | "perf" => "performance",
        "security" => "security",
        "documentation" | "docs" => "documentation",
        "test" | "tests" => "test",
        "refactor" | "refactoring" => "refactor",
        "build" | "ci" => "build",
        "style" => "style",
        "other" | "chore" => "other",
        _ => return None,
    };
    Some(key)
}

/// Breaking signal from either the classification or the AI summary.
pub(crate) fn entry_is_breaking(entry: &ReleaseEntry) -> bool {
    is_breaking(&entry.classification)
        || entry.summary.as_ref().is_some_and(|s| s.breaking_changes)
}

/// Severity rank for ordering: critical 5, high 4, medium 3, low 2,
/// minimal 1, anything else 0. The AI impact label wins when present,
/// otherwise the rule-based importance maps onto the same scale.
pub(crate) fn severity_rank(entry: &ReleaseEntry) -> u8 {
    let label = match entry.summary.as_ref().and_then(|s| s.impact.as_deref()) {
        Some(impact) => impact.to_lowercase(),
        None => entry.classification.importance.as_str().to_string(),
    };
    match label.as_str() {
        "critical" => 5,
        "high" => 4,
        "medium" => 3,
        "low" => 2,
        "minimal" => 1,
        _ => 0,
    }
}

/// Strict document order: breaking entries first, then severity descending.
/// `sort_by` is stable, so equal keys keep original chronological order.
pub fn sort_entries(entries: &mut [ReleaseEntry]) {
    entries.sort_by(|a, b| {
        entry_is_breaking(b)
            .cmp(&entry_is_breaking(a))
            .then_with(|| severity_rank(b).cmp(&severity_rank(a)))
    });
}
