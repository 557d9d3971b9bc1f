//! Interactive commit workflow: inspect the working tree, draft a message,
//! confirm, commit.

use dialoguer::Confirm;
use git2::Oid;
use tracing::{debug, warn};

use crate::classify::{classify, Classification};
use crate::error::GitError;
use crate::git::commits::CommitInfo;
use crate::git::repo::RepoProbe;
use crate::git::status::working_tree_change;
use crate::pipeline::PipelineError;
use crate::provider::{CompletionOptions, Provider, ProviderRegistry};

use super::draft::{draft_from_rules, draft_with_provider, DraftMessage};
use super::message::{stage_and_commit, validate_message};

/// Flags controlling the commit workflow.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Skip AI drafting entirely.
    pub no_ai: bool,
    /// Commit without the confirmation prompt.
    pub assume_yes: bool,
    /// Model override passed to the provider.
    pub model: Option<String>,
}

/// How the workflow ended.
#[derive(Debug)]
pub enum CommitOutcome {
    Committed(Oid),
    Aborted,
}

/// Stage everything, draft a conventional message for the pending changes
/// and create the commit after confirmation.
///
/// AI drafting degrades to [`draft_from_rules`] when no provider is
/// available or the provider call fails. Only an explicitly requested
/// unknown provider is fatal.
pub async fn run_commit_workflow(
    probe: &mut RepoProbe,
    registry: &ProviderRegistry,
    provider_name: Option<&str>,
    options: &CommitOptions,
) -> Result<CommitOutcome, PipelineError> {
    let repo = probe.open()?;

    let change = working_tree_change(&repo)?;
    if change.is_empty() {
        return Err(GitError::NoChanges.into());
    }
    println!(
        "Found {} changed file(s) (+{}/-{})",
        change.files.len(),
        change.insertions,
        change.deletions
    );

    let pseudo = change.into_pseudo_commit("");
    let classification = classify(&pseudo);
    let draft = draft_message(registry, provider_name, &pseudo, &classification, options).await?;

    println!("\nProposed commit message:\n");
    for line in draft.format().lines() {
        println!("    {line}");
    }
    println!(
        "\n  category: {}  importance: {}  impact: {}",
        classification.primary_category(),
        classification.importance,
        classification.impact
    );

    let confirmed = options.assume_yes
        || Confirm::new()
            .with_prompt("Create this commit?")
            .default(true)
            .interact()
            .unwrap_or_else(|_| {
                warn!("No interactive terminal, aborting");
                false
            });
    if !confirmed {
        println!("[SKIP] Commit aborted");
        return Ok(CommitOutcome::Aborted);
    }

    let oid = stage_and_commit(&repo, &draft.format())?;
    probe.invalidate();
    println!("[DONE] Created commit {}", short_oid(&oid));
    Ok(CommitOutcome::Committed(oid))
}

/// Pick the draft source: rules when `--no-ai`, otherwise the requested or
/// first available provider with rule-based fallback on any failure.
async fn draft_message(
    registry: &ProviderRegistry,
    provider_name: Option<&str>,
    change: &CommitInfo,
    classification: &Classification,
    options: &CommitOptions,
) -> Result<DraftMessage, PipelineError> {
    if options.no_ai {
        return Ok(draft_from_rules(change, classification));
    }

    let provider: Option<&dyn Provider> = match provider_name {
        Some(name) => {
            let provider = registry.get(name)?;
            if provider.is_available().await {
                Some(provider)
            } else {
                warn!(
                    provider = provider.name(),
                    "Provider CLI not installed, using rule-based draft"
                );
                None
            }
        }
        None => registry.default_provider().await,
    };

    let Some(provider) = provider else {
        debug!("No provider available, using rule-based draft");
        return Ok(draft_from_rules(change, classification));
    };

    let completion_options = CompletionOptions {
        model: options.model.clone(),
    };
    match draft_with_provider(provider, change, classification, &completion_options).await {
        Ok(draft) => {
            if let Err(errors) = validate_message(&draft.format()) {
                warn!(
                    provider = provider.name(),
                    errors = errors.len(),
                    "AI draft failed validation, using rule-based draft"
                );
                Ok(draft_from_rules(change, classification))
            } else {
                Ok(draft)
            }
        }
        Err(error) => {
            warn!(provider = provider.name(), %error, "AI draft failed, using rule-based draft");
            Ok(draft_from_rules(change, classification))
        }
    }
}

fn short_oid(oid: &Oid) -> String {
    oid.to_string().chars().take(7).collect()
}
