//! Draft conventional commit messages from a working-tree change, either
//! through a provider or from the classification rules alone.

use serde::Deserialize;
use tracing::debug;

use crate::classify::{is_breaking, Classification};
use crate::error::ProviderError;
use crate::git::commits::{CommitInfo, FileChange, FileStatus};
use crate::provider::json::parse_json_response;
use crate::provider::retry::{retry_with_backoff, MAX_ATTEMPTS};
use crate::provider::{CompletionOptions, Provider};
use crate::summarize::prompt::sanitize_for_prompt;

/// Most files to show diff excerpts for in the draft prompt.
const MAX_EXCERPT_FILES: usize = 10;
/// Characters of sanitized diff per file.
const EXCERPT_CHARS: usize = 800;

/// A drafted commit message, AI-produced or rule-derived.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftMessage {
    pub subject: String,
    pub body: Option<String>,
}

impl DraftMessage {
    /// Full message text for git: subject, blank line, body.
    pub fn format(&self) -> String {
        match self.body.as_deref().map(str::trim) {
            Some(body) if !body.is_empty() => format!("{}\n\n{}", self.subject, body),
            _ => self.subject.clone(),
        }
    }
}

/// Draft a message from the classification rules alone. Always produces a
/// message that passes validation.
pub fn draft_from_rules(change: &CommitInfo, classification: &Classification) -> DraftMessage {
    let commit_type = type_for_category(classification.primary_category());
    let scope = common_scope(&change.files).filter(|s| !scope_repeats_type(s, commit_type));
    let bang = if is_breaking(classification) { "!" } else { "" };
    let description = describe_change(change, scope.as_deref());

    let subject = match &scope {
        Some(scope) => format!("{commit_type}({scope}){bang}: {description}"),
        None => format!("{commit_type}{bang}: {description}"),
    };

    debug!(subject, "Drafted commit message from rules");
    DraftMessage {
        subject,
        body: None,
    }
}

/// Draft a message through a provider. Transient failures retry; the
/// caller degrades to [`draft_from_rules`] on error.
pub async fn draft_with_provider(
    provider: &dyn Provider,
    change: &CommitInfo,
    classification: &Classification,
    options: &CompletionOptions,
) -> Result<DraftMessage, ProviderError> {
    let prompt = build_draft_prompt(change, classification);

    let completion = retry_with_backoff(
        || provider.generate(&prompt, options),
        ProviderError::is_transient,
        |last| ProviderError::RetriesExhausted {
            name: provider.name().to_string(),
            attempts: MAX_ATTEMPTS,
            source: Box::new(last),
        },
    )
    .await?;

    parse_json_response(provider.name(), &completion.content)
}

/// Inverse of the category mapping: which conventional type to draft for a
/// rule-derived category.
fn type_for_category(category: &str) -> &'static str {
    match category {
        "feature" => "feat",
        "bugfix" | "security" => "fix",
        "documentation" => "docs",
        "style" => "style",
        "refactor" => "refactor",
        "performance" => "perf",
        "test" => "test",
        "build" => "build",
        _ => "chore",
    }
}

/// Shared second-level directory across all changed files, used as the
/// scope. `src/auth/login.rs` contributes `auth`; top-level files and
/// lone `src/main.rs` style paths contribute nothing.
fn common_scope(files: &[FileChange]) -> Option<String> {
    let mut shared: Option<&str> = None;
    for file in files {
        let component = scope_component(&file.path)?;
        match shared {
            None => shared = Some(component),
            Some(existing) if existing == component => {}
            Some(_) => return None,
        }
    }
    shared.map(str::to_string)
}

fn scope_component(path: &str) -> Option<&str> {
    let mut parts = path.split('/');
    let first = parts.next()?;
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return None;
    }
    if matches!(first, "src" | "lib" | "app" | "packages" | "crates") {
        // the next component is a directory only when something follows it
        if rest.len() > 1 { Some(rest[0]) } else { None }
    } else {
        Some(first)
    }
}

/// `docs(docs): ...` reads badly; drop the scope when it is just the type
/// again, singular or plural.
fn scope_repeats_type(scope: &str, commit_type: &str) -> bool {
    scope.trim_end_matches('s') == commit_type.trim_end_matches('s')
}

fn describe_change(change: &CommitInfo, scope: Option<&str>) -> String {
    let verb = if change
        .files
        .iter()
        .all(|f| f.status == FileStatus::Added)
    {
        "add"
    } else if change.files.iter().all(|f| f.status == FileStatus::Deleted) {
        "remove"
    } else {
        "update"
    };

    match change.files.len() {
        0 => format!("{verb} working tree"),
        1 => {
            let name = change.files[0]
                .path
                .rsplit('/')
                .next()
                .unwrap_or(&change.files[0].path);
            format!("{verb} {name}")
        }
        n => match scope {
            Some(scope) => format!("{verb} {scope} ({n} files)"),
            None => format!("{verb} {n} files"),
        },
    }
}

/// Prompt for AI drafting, JSON output requested.
fn build_draft_prompt(change: &CommitInfo, classification: &Classification) -> String {
    let files_section: String = change
        .files
        .iter()
        .map(|f| format!("- {} ({}, +{}/-{})", f.path, f.status, f.insertions, f.deletions))
        .collect::<Vec<_>>()
        .join("\n");

    let mut excerpts = String::new();
    for file in change
        .files
        .iter()
        .filter(|f| f.diff_text.is_some())
        .take(MAX_EXCERPT_FILES)
    {
        if let Some(diff) = &file.diff_text {
            excerpts.push_str(&format!(
                "### {}\n```\n{}\n```\n",
                file.path,
                sanitize_for_prompt(diff, EXCERPT_CHARS)
            ));
        }
    }
    if excerpts.is_empty() {
        excerpts.push_str("(no diff text available)\n");
    }

    format!(
        r#"You are generating a Git commit message following the Conventional Commits specification.

## Changed Files (+{insertions}/-{deletions})
{files_section}

## Diff Excerpts
{excerpts}
## Detected Classification
- category: {category}
- importance: {importance}
- breaking: {breaking}

## Subject Rules
- Format: `type(scope): description`
- type: one of feat, fix, docs, style, refactor, perf, test, build, ci, chore
- Scope: the primary module affected (e.g. files in `src/auth/` have scope `auth`); omit when unclear
- Description: imperative mood, lowercase after the colon, no trailing period
- HARD LIMIT: the entire subject line must be at most 72 characters
- Append `!` after the type/scope when the change is breaking

## Body Rules
- The body explains WHY the change was made, not what changed
- Wrap lines at 100 characters
- Use null for trivial changes

## Output Format
Respond with ONLY a JSON object (no markdown, no explanation):
{{"subject": "type(scope): description", "body": "why this change was made"}}"#,
        insertions = change.insertions,
        deletions = change.deletions,
        category = classification.primary_category(),
        importance = classification.importance,
        breaking = is_breaking(classification),
    )
}
