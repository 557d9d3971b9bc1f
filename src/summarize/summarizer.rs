//! Summarization driver: provider call with retry, guard application, and
//! the rule-based fallback.

use tracing::debug;

use crate::classify::{is_breaking, parse_conventional, Classification};
use crate::config::AnalysisMode;
use crate::error::ProviderError;
use crate::git::commits::CommitInfo;
use crate::provider::json::parse_json_response;
use crate::provider::retry::{retry_with_backoff, MAX_ATTEMPTS};
use crate::provider::{CompletionOptions, Provider, TokenUsage};

use super::guards::apply_guards;
use super::prompt::build_summary_prompt;
use super::Summary;

/// Summarize one commit through a provider.
///
/// Transient failures are retried with backoff; a malformed response is
/// not. The returned summary has already passed the guards. Callers are
/// expected to degrade to [`fallback_summary`] on error.
pub async fn summarize(
    provider: &dyn Provider,
    commit: &CommitInfo,
    classification: &Classification,
    mode: AnalysisMode,
    options: &CompletionOptions,
) -> Result<(Summary, TokenUsage), ProviderError> {
    let prompt = build_summary_prompt(commit, classification, mode);

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

    let mut summary: Summary = parse_json_response(provider.name(), &completion.content)?;
    apply_guards(&mut summary, commit);

    debug!(
        hash = %commit.short_hash,
        provider = provider.name(),
        category = summary.category.as_deref().unwrap_or("none"),
        "Summarized commit"
    );

    Ok((summary, completion.usage))
}

/// Rule-based summary used when no provider is available or a call failed.
///
/// Derived entirely from the classification and diff stats, so the pipeline
/// always produces some description. Confidence stays unset; the renderer
/// substitutes its default.
pub fn fallback_summary(commit: &CommitInfo, classification: &Classification) -> Summary {
    let conventional = parse_conventional(&commit.subject, &commit.body);
    let summary_text = if !conventional.description.is_empty() {
        conventional.description
    } else if !commit.subject.is_empty() {
        commit.subject.clone()
    } else {
        describe_files(commit)
    };

    Summary {
        summary: summary_text,
        description: describe_files(commit),
        technical_details: format!(
            "{} files changed (+{}/-{})",
            commit.files.len(),
            commit.insertions,
            commit.deletions
        ),
        business_value: None,
        risk_factors: Vec::new(),
        recommendations: Vec::new(),
        breaking_changes: is_breaking(classification),
        migration_required: false,
        category: Some(classification.primary_category().to_string()),
        impact: Some(classification.importance.as_str().to_string()),
        confidence: None,
    }
}

/// Short human description of what the change touches.
fn describe_files(commit: &CommitInfo) -> String {
    match commit.files.len() {
        0 => "No file changes".to_string(),
        1 => format!("Changes to {}", commit.files[0].path),
        n => {
            let shown: Vec<&str> = commit
                .files
                .iter()
                .take(3)
                .map(|f| f.path.as_str())
                .collect();
            if n > 3 {
                format!("Changes to {} and {} more files", shown.join(", "), n - 3)
            } else {
                format!("Changes to {}", shown.join(", "))
            }
        }
    }
}
