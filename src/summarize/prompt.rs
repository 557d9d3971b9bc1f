//! Prompt construction and input sanitizing for commit summarization.

use regex_lite::Regex;

use crate::classify::{categorize_file, Classification, FileCategory};
use crate::config::AnalysisMode;
use crate::git::commits::{CommitInfo, FileStatus};

/// Most files included with diff excerpts in one prompt.
const MAX_SAMPLED_FILES: usize = 10;

/// Maximum sanitized diff excerpt per file.
const FILE_EXCERPT_CHARS: usize = 1_000;

/// Build the summarization prompt for one commit.
///
/// Small commits get every file with a diff excerpt. Larger ones get the
/// top files, modified-status and source paths first, with a note about
/// how many were left out. The analysis mode only changes which output
/// fields are requested, never the categorization rules.
pub fn build_summary_prompt(
    commit: &CommitInfo,
    classification: &Classification,
    mode: AnalysisMode,
) -> String {
    let subject = sanitize_for_prompt(&commit.subject, 200);
    let files_section = sampled_files_section(commit);
    let tags: Vec<&str> = classification.tags.iter().map(|s| s.as_str()).collect();
    let tags_line = if tags.is_empty() {
        "none".to_string()
    } else {
        tags.join(", ")
    };

    let mut dimensions = String::from(
        "- `summary`: one sentence, plain language, user perspective\n\
         - `description`: 2-3 sentences expanding on the summary\n\
         - `technical_details`: one sentence on the implementation\n\
         - `category`: one of feature, bugfix, documentation, test, refactor, performance, security, build, style, other\n\
         - `impact`: one of minimal, low, medium, high, critical\n\
         - `breaking_changes`: true only for backward-incompatible changes\n\
         - `migration_required`: true when users must act before upgrading\n\
         - `confidence`: integer 0-100, your certainty in the categorization",
    );
    let mut skeleton = String::from(
        r#"{"summary": "...", "description": "...", "technical_details": "...", "category": "feature", "impact": "medium", "breaking_changes": false, "migration_required": false, "confidence": 85"#,
    );

    if mode.wants_business_value() {
        dimensions.push_str(
            "\n- `business_value`: one sentence on why this matters to the product",
        );
        skeleton.push_str(r#", "business_value": "...""#);
    }
    if mode.wants_risk_assessment() {
        dimensions.push_str(
            "\n- `risk_factors`: list of deployment or compatibility risks (may be empty)\n\
             - `recommendations`: list of follow-up actions (may be empty)",
        );
        skeleton.push_str(r#", "risk_factors": [], "recommendations": []"#);
    }
    skeleton.push('}');

    format!(
        r#"You are writing an enriched changelog entry for a single commit.

## Commit
Subject: {subject}
Files changed: {file_count} ({insertions} additions, {deletions} deletions)

## Changed Files
{files_section}

## Detected Patterns
{tags_line}

## Task
Describe WHAT changed and WHY it matters. Be factual: describe only what the
diff shows, never invent features. Fill these fields:
{dimensions}

## Output Format
Respond with ONLY a JSON object (no markdown, no explanation):
{skeleton}"#,
        file_count = commit.files.len(),
        insertions = commit.insertions,
        deletions = commit.deletions,
    )
}

/// File list with bounded diff excerpts, sampled when the commit is large.
fn sampled_files_section(commit: &CommitInfo) -> String {
    let mut indices: Vec<usize> = (0..commit.files.len()).collect();
    let omitted = commit.files.len().saturating_sub(MAX_SAMPLED_FILES);

    if omitted > 0 {
        // Modified files explain a change better than added ones, and
        // source paths better than tests or assets.
        indices.sort_by_key(|&i| {
            let file = &commit.files[i];
            (
                file.status != FileStatus::Modified,
                categorize_file(&file.path) != FileCategory::Source,
                i,
            )
        });
        indices.truncate(MAX_SAMPLED_FILES);
        indices.sort_unstable();
    }

    let mut section = String::new();
    for &i in &indices {
        let file = &commit.files[i];
        section.push_str(&format!(
            "- {} ({}, +{}/-{})\n",
            file.path, file.status, file.insertions, file.deletions
        ));
        if let Some(diff) = &file.diff_text {
            let excerpt = sanitize_for_prompt(diff, FILE_EXCERPT_CHARS);
            if !excerpt.is_empty() {
                section.push_str("```\n");
                section.push_str(&excerpt);
                if !excerpt.ends_with('\n') {
                    section.push('\n');
                }
                section.push_str("```\n");
            }
        }
    }
    if omitted > 0 {
        section.push_str(&format!("- ... and {} more files\n", omitted));
    }
    section
}

/// Sanitize untrusted text for inclusion in a prompt.
///
/// Applies ANSI stripping, control character removal, injection pattern
/// filtering and whitespace normalization, then truncates at a char
/// boundary. ANSI sequences must go first, before the control filter
/// removes their ESC bytes.
pub fn sanitize_for_prompt(text: &str, max_len: usize) -> String {
    let mut result = remove_ansi_escapes(text);
    result = remove_control_chars(&result);
    result = filter_injection_patterns(&result);
    result = normalize_whitespace(&result);

    if result.len() > max_len {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    result
}

/// Drop control characters except newlines and tabs.
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect()
}

/// Strip ANSI escape sequences.
pub fn remove_ansi_escapes(text: &str) -> String {
    let re = Regex::new(r"\x1B\[[0-9;]*[A-Za-z]").expect("Invalid ANSI pattern");
    re.replace_all(text, "").to_string()
}

/// Known prompt injection phrases, replaced rather than removed so the
/// model sees that something was filtered.
const INJECTION_PATTERNS: &[&str] = &[
    r"ignore\s+(?:all\s+)?previous\s+instructions",
    r"disregard\s+(?:all\s+)?(?:previous|above)",
    r"you\s+are\s+now\s+",
    r"new\s+instructions\s*:",
    r"system\s*:\s*",
];

pub fn filter_injection_patterns(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in INJECTION_PATTERNS {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("Invalid injection pattern");
        result = re.replace_all(&result, "[filtered]").to_string();
    }
    result
}

/// Collapse runs of three or more newlines into two.
pub fn normalize_whitespace(text: &str) -> String {
    let re = Regex::new(r"\n{3,}").expect("Invalid whitespace pattern");
    re.replace_all(text, "\n\n").to_string()
}
