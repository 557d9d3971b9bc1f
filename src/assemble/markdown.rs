//! Markdown rendering for assembled documents.

use crate::classify::parse_conventional;

use super::order::{entry_is_breaking, severity_rank};
use super::{ChangelogDocument, Footer, ReleaseEntry, DEFAULT_CONFIDENCE};

/// Render a document as a Keep a Changelog style version section.
pub fn render_markdown(document: &ChangelogDocument) -> String {
    let mut out = format!(
        "## [{}] - {}\n\n",
        document.version, document.release_date
    );

    for section in &document.sections {
        out.push_str(&format!("### {}\n\n", section.title));
        for entry in &section.entries {
            out.push_str(&render_entry(entry));
        }
        out.push('\n');
    }

    if document.sections.is_empty() {
        out.push_str("_No changes in range._\n\n");
    }

    render_footer(&document.footer, document, &mut out);
    out
}

/// One entry line plus its sub-bullets.
fn render_entry(entry: &ReleaseEntry) -> String {
    let mut line = format!("- ({}) {}", type_label(entry), summary_text(entry));

    if entry_is_breaking(entry) {
        line.push_str(" ⚠️ BREAKING CHANGE");
    }
    if severity_rank(entry) >= 4 {
        line.push_str(" 🔥");
    }

    let details = technical_details(entry);
    if !details.is_empty() {
        line.push_str(&format!(" - {details}"));
    }

    let confidence = entry
        .summary
        .as_ref()
        .and_then(|s| s.confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);
    line.push_str(&format!(" ({}) ({confidence}%)\n", entry.commit.short_hash));

    if let Some(summary) = &entry.summary {
        if let Some(value) = &summary.business_value {
            line.push_str(&format!("  - {value}\n"));
        }
        for risk in &summary.risk_factors {
            line.push_str(&format!("  - Risk: {risk}\n"));
        }
        for recommendation in &summary.recommendations {
            line.push_str(&format!("  - Recommended: {recommendation}\n"));
        }
        if summary.migration_required {
            line.push_str("  - Migration required: review this change before upgrading\n");
        }
    }

    line
}

/// Label in parentheses at the start of a line: the conventional type
/// token when the subject has one, otherwise the best known category.
fn type_label(entry: &ReleaseEntry) -> String {
    let conventional = parse_conventional(&entry.commit.subject, &entry.commit.body);
    if let Some(commit_type) = conventional.commit_type {
        return commit_type.as_str().to_string();
    }
    entry
        .summary
        .as_ref()
        .and_then(|s| s.category.clone())
        .unwrap_or_else(|| entry.classification.primary_category().to_string())
}

fn summary_text(entry: &ReleaseEntry) -> String {
    if let Some(summary) = &entry.summary
        && !summary.summary.is_empty()
    {
        return summary.summary.clone();
    }
    let conventional = parse_conventional(&entry.commit.subject, &entry.commit.body);
    if conventional.description.is_empty() {
        entry.commit.subject.clone()
    } else {
        conventional.description
    }
}

fn technical_details(entry: &ReleaseEntry) -> String {
    if let Some(summary) = &entry.summary
        && !summary.technical_details.is_empty()
    {
        return summary.technical_details.clone();
    }
    format!(
        "{} files changed (+{}/-{})",
        entry.commit.files.len(),
        entry.commit.insertions,
        entry.commit.deletions
    )
}

fn render_footer(footer: &Footer, document: &ChangelogDocument, out: &mut String) {
    if footer.metrics.is_none() && footer.attribution.is_none() {
        return;
    }

    out.push_str("---\n\n");

    if let Some(metrics) = &footer.metrics {
        out.push_str(&format!(
            "**Run metrics**: {} commits, {} AI calls, {} input / {} output tokens, {} errors, {} ms\n\n",
            metrics.commits,
            metrics.api_calls,
            metrics.input_tokens,
            metrics.output_tokens,
            metrics.errors,
            metrics.duration_ms
        ));
    }

    if let Some(attribution) = &footer.attribution {
        out.push_str(&format!(
            "_{attribution} at {}_\n",
            document.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::assemble::{assemble, AssembleOptions, RunMetrics};
    use crate::classify::classify;
    use crate::git::commits::{CommitInfo, FileChange, FileStatus};
    use crate::summarize::{fallback_summary, Summary};

    use super::*;

    fn commit(subject: &str, path: &str, status: FileStatus) -> CommitInfo {
        let file = FileChange {
            path: path.to_string(),
            status,
            old_path: None,
            diff_text: None,
            insertions: 12,
            deletions: 3,
            truncated: false,
        };
        CommitInfo {
            hash: "d".repeat(40),
            short_hash: "ddddddd".to_string(),
            author: "Test".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            subject: subject.to_string(),
            body: String::new(),
            files: vec![file],
            insertions: 12,
            deletions: 3,
        }
    }

    fn entry(subject: &str, path: &str, status: FileStatus) -> ReleaseEntry {
        let commit = commit(subject, path, status);
        let classification = classify(&commit);
        let summary = fallback_summary(&commit, &classification);
        ReleaseEntry {
            commit,
            classification,
            summary: Some(summary),
        }
    }

    fn options() -> AssembleOptions {
        AssembleOptions::new(
            Some("2.0.0".to_string()),
            Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_feature_line_format() {
        let document = assemble(
            vec![entry(
                "feat: add login button",
                "src/ui/Login.tsx",
                FileStatus::Added,
            )],
            options(),
        );
        let markdown = render_markdown(&document);

        assert!(markdown.contains("## [2.0.0] - 2024-05-02"));
        assert!(markdown.contains("### ✨ Features"));
        assert!(markdown.lines().any(|l| l.starts_with("- (feat) add login button")));
        assert!(markdown.contains("(ddddddd)"));
        assert!(markdown.contains(&format!("({DEFAULT_CONFIDENCE}%)")));
    }

    #[test]
    fn test_breaking_entry_carries_markers() {
        let document = assemble(
            vec![entry(
                "fix!: remove legacy auth endpoint",
                "src/api/auth.js",
                FileStatus::Deleted,
            )],
            options(),
        );
        let markdown = render_markdown(&document);

        assert!(markdown.contains("### ⚠️ Breaking Changes"));
        assert!(markdown.contains("⚠️ BREAKING CHANGE"));
        assert!(markdown.contains("🔥"));
    }

    #[test]
    fn test_ai_confidence_overrides_default() {
        let mut e = entry("feat: add widget", "src/widget.rs", FileStatus::Added);
        if let Some(summary) = &mut e.summary {
            summary.confidence = Some(92);
        }
        let markdown = render_markdown(&assemble(vec![e], options()));
        assert!(markdown.contains("(92%)"));
        assert!(!markdown.contains(&format!("({DEFAULT_CONFIDENCE}%)")));
    }

    #[test]
    fn test_sub_bullets_for_detailed_fields() {
        let mut e = entry("feat: add billing", "src/billing.rs", FileStatus::Added);
        e.summary = Some(Summary {
            summary: "add billing flow".to_string(),
            technical_details: "new billing module".to_string(),
            business_value: Some("customers can pay invoices".to_string()),
            risk_factors: vec!["touches payment path".to_string()],
            recommendations: vec!["monitor error rates".to_string()],
            migration_required: true,
            ..Default::default()
        });
        let markdown = render_markdown(&assemble(vec![e], options()));

        assert!(markdown.contains("  - customers can pay invoices"));
        assert!(markdown.contains("  - Risk: touches payment path"));
        assert!(markdown.contains("  - Recommended: monitor error rates"));
        assert!(markdown.contains("  - Migration required"));
    }

    #[test]
    fn test_entry_without_summary_uses_commit_data() {
        let commit = commit("fix: patch hole", "src/hole.rs", FileStatus::Modified);
        let classification = classify(&commit);
        let e = ReleaseEntry {
            commit,
            classification,
            summary: None,
        };
        let markdown = render_markdown(&assemble(vec![e], options()));

        assert!(markdown.lines().any(|l| l.starts_with("- (fix) patch hole")));
        assert!(markdown.contains("1 files changed (+12/-3)"));
    }

    #[test]
    fn test_footer_metrics_and_attribution() {
        let mut opts = options();
        opts.attribution = Some("Generated by chronik v0.4.0".to_string());
        opts.metrics = Some(RunMetrics {
            commits: 3,
            duration_ms: 840,
            api_calls: 3,
            input_tokens: 1200,
            output_tokens: 340,
            errors: 1,
        });
        let markdown = render_markdown(&assemble(vec![], opts));

        assert!(markdown.contains("**Run metrics**: 3 commits, 3 AI calls"));
        assert!(markdown.contains("1200 input / 340 output tokens"));
        assert!(markdown.contains("1 errors, 840 ms"));
        assert!(markdown.contains("_Generated by chronik v0.4.0 at 2024-05-02 10:00:00 UTC_"));
    }

    #[test]
    fn test_empty_document_notes_no_changes() {
        let markdown = render_markdown(&assemble(vec![], options()));
        assert!(markdown.contains("_No changes in range._"));
    }
}
