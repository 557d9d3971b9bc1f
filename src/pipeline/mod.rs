//! Orchestration: the end-to-end changelog run, repository analysis and
//! health scoring.
//!
//! The pipeline owns the [`RepoProbe`] and the provider registry. Each
//! invocation walks a stage machine; only a missing repository (or an
//! explicitly requested unknown provider) aborts a run, everything else
//! degrades to rule-based output with a recorded warning.

pub mod health;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::assemble::{
    assemble, render_html, render_markdown, AssembleOptions, ChangelogDocument, ReleaseEntry,
    RunMetrics,
};
use crate::classify::{classify, is_breaking, parse_conventional};
use crate::commit::workflow::{run_commit_workflow, CommitOptions, CommitOutcome};
use crate::config::{AnalysisMode, OutputFormat, ProviderSettings};
use crate::git::commits::{collect_commits, CommitInfo};
use crate::git::range::resolve_range;
use crate::git::repo::RepoProbe;
use crate::git::status::working_tree_change;
use crate::provider::{CompletionOptions, Provider, ProviderRegistry};
use crate::summarize::{fallback_summary, summarize};

pub use health::{HealthComponent, HealthReport};

/// Commits examined per run unless overridden.
pub const DEFAULT_MAX_COMMITS: usize = 100;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] crate::error::GitError),
    #[error(transparent)]
    Config(#[from] crate::error::ConfigError),
    #[error("Failed to encode document as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn tips(&self) -> Vec<String> {
        match self {
            Self::Git(e) => e.tips(),
            Self::Config(e) => e.tips(),
            Self::Encode(_) => Vec::new(),
        }
    }
}

/// Where a run currently is. `Degraded` is `Done` with recorded warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Initializing,
    Collecting,
    Classifying,
    Summarizing,
    Assembling,
    Done,
    Degraded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Collecting => "collecting",
            Self::Classifying => "classifying",
            Self::Summarizing => "summarizing",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Degraded => "degraded",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = stage.as_str(), to = next.as_str(), "Stage transition");
    *stage = next;
}

/// Options for one changelog run.
#[derive(Debug, Clone)]
pub struct ChangelogOptions {
    /// Version heading, `Unreleased` when absent.
    pub version: Option<String>,
    /// Range start; latest semver tag, then root commit, when absent.
    pub from: Option<String>,
    /// Range end reference.
    pub to: String,
    pub max_commits: usize,
    pub mode: AnalysisMode,
    pub format: OutputFormat,
    /// Provider requested by name. None picks the first available one.
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Skip AI summarization entirely.
    pub no_ai: bool,
    /// Append the attribution line to the footer.
    pub attribution: bool,
    /// Prepend pending working-tree changes as a pseudo-commit.
    pub include_working_tree: bool,
}

impl Default for ChangelogOptions {
    fn default() -> Self {
        Self {
            version: None,
            from: None,
            to: "HEAD".to_string(),
            max_commits: DEFAULT_MAX_COMMITS,
            mode: AnalysisMode::default(),
            format: OutputFormat::default(),
            provider: None,
            model: None,
            no_ai: false,
            attribution: true,
            include_working_tree: false,
        }
    }
}

/// Range options for the read-only history commands.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub from: Option<String>,
    pub to: String,
    pub max_commits: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            from: None,
            to: "HEAD".to_string(),
            max_commits: DEFAULT_MAX_COMMITS,
        }
    }
}

/// Outcome of a changelog run.
#[derive(Debug)]
pub struct RunReport {
    pub document: ChangelogDocument,
    /// Document rendered in the requested format.
    pub rendered: String,
    /// `Done`, or `Degraded` when warnings were recorded.
    pub stage: Stage,
    pub warnings: Vec<String>,
    pub metrics: RunMetrics,
}

/// Aggregate statistics over a commit range.
#[derive(Debug, Clone, Serialize)]
pub struct RepoAnalysis {
    pub total_commits: usize,
    pub conventional_commits: usize,
    pub breaking_commits: usize,
    pub commits_by_category: BTreeMap<String, usize>,
    pub commits_by_type: BTreeMap<String, usize>,
    /// Most used conventional scopes, count-descending.
    pub top_scopes: Vec<(String, usize)>,
    /// Distinct commit authors.
    pub contributors: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl RepoAnalysis {
    pub fn from_commits(commits: &[CommitInfo]) -> Self {
        let mut conventional_commits = 0;
        let mut breaking_commits = 0;
        let mut commits_by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut commits_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut scopes: BTreeMap<String, usize> = BTreeMap::new();
        let mut authors: BTreeSet<&str> = BTreeSet::new();
        let mut insertions = 0;
        let mut deletions = 0;

        for commit in commits {
            let parsed = parse_conventional(&commit.subject, &commit.body);
            if parsed.is_conventional {
                conventional_commits += 1;
            }
            if let Some(raw_type) = &parsed.raw_type {
                *commits_by_type.entry(raw_type.to_lowercase()).or_default() += 1;
            }
            if let Some(scope) = parsed.scope {
                *scopes.entry(scope).or_default() += 1;
            }

            let classification = classify(commit);
            *commits_by_category
                .entry(classification.primary_category().to_string())
                .or_default() += 1;
            if is_breaking(&classification) {
                breaking_commits += 1;
            }

            authors.insert(commit.author.as_str());
            insertions += commit.insertions;
            deletions += commit.deletions;
        }

        let mut top_scopes: Vec<(String, usize)> = scopes.into_iter().collect();
        top_scopes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_scopes.truncate(5);

        Self {
            total_commits: commits.len(),
            conventional_commits,
            breaking_commits,
            commits_by_category,
            commits_by_type,
            top_scopes,
            contributors: authors.len(),
            insertions,
            deletions,
        }
    }
}

/// The orchestration facade: owns the repository probe and the provider
/// registry for the lifetime of the process.
pub struct Pipeline {
    probe: RepoProbe,
    registry: ProviderRegistry,
}

impl Pipeline {
    pub fn new(probe: RepoProbe, registry: ProviderRegistry) -> Self {
        Self { probe, registry }
    }

    /// Generate a changelog document for the configured range.
    ///
    /// Provider failures never abort the run: affected commits fall back to
    /// rule-based summaries and the report ends `Degraded`.
    pub async fn generate_changelog(
        &mut self,
        options: &ChangelogOptions,
    ) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        let generated_at = Utc::now();
        let mut stage = Stage::Idle;
        let mut warnings: Vec<String> = Vec::new();

        advance(&mut stage, Stage::Initializing);
        advance(&mut stage, Stage::Collecting);
        let commits = {
            let repo = self.probe.open()?;
            let range = resolve_range(&repo, options.from.as_deref(), &options.to)?;
            let mut commits = collect_commits(&repo, &range, options.max_commits)?;
            if options.include_working_tree {
                let change = working_tree_change(&repo)?;
                if !change.is_empty() {
                    commits.insert(0, change.into_pseudo_commit(""));
                }
            }
            debug!(
                range = %range.describe(),
                commits = commits.len(),
                "Collected commits"
            );
            commits
        };

        advance(&mut stage, Stage::Classifying);
        let classified: Vec<_> = commits
            .into_iter()
            .map(|commit| {
                let classification = classify(&commit);
                (commit, classification)
            })
            .collect();

        let provider = if options.no_ai {
            None
        } else {
            self.select_provider(options.provider.as_deref(), &mut warnings)
                .await?
        };

        let mut api_calls = 0;
        let mut input_tokens = 0;
        let mut output_tokens = 0;
        let mut errors = 0;
        let mut entries = Vec::with_capacity(classified.len());

        if let Some(provider) = provider {
            advance(&mut stage, Stage::Summarizing);
            let mut settings = ProviderSettings::new(provider.name());
            if let Some(model) = &options.model {
                settings = settings.with_model(model.clone());
            }
            settings.validate()?;
            let completion_options = CompletionOptions {
                model: settings.model,
            };
            for (commit, classification) in classified {
                api_calls += 1;
                match summarize(provider, &commit, &classification, options.mode, &completion_options)
                    .await
                {
                    Ok((summary, usage)) => {
                        input_tokens += usage.input_tokens;
                        output_tokens += usage.output_tokens;
                        entries.push(ReleaseEntry {
                            commit,
                            classification,
                            summary: Some(summary),
                        });
                    }
                    Err(error) => {
                        errors += 1;
                        let warning =
                            format!("Summarization failed for {}: {error}", commit.short_hash);
                        warn!("{warning}");
                        warnings.push(warning);
                        let summary = fallback_summary(&commit, &classification);
                        entries.push(ReleaseEntry {
                            commit,
                            classification,
                            summary: Some(summary),
                        });
                    }
                }
            }
        } else {
            for (commit, classification) in classified {
                let summary = fallback_summary(&commit, &classification);
                entries.push(ReleaseEntry {
                    commit,
                    classification,
                    summary: Some(summary),
                });
            }
        }

        advance(&mut stage, Stage::Assembling);
        let metrics = RunMetrics {
            commits: entries.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            api_calls,
            input_tokens,
            output_tokens,
            errors,
        };
        let assemble_options = AssembleOptions {
            attribution: options
                .attribution
                .then(|| format!("Generated by chronik v{}", env!("CARGO_PKG_VERSION"))),
            metrics: Some(metrics),
            ..AssembleOptions::new(options.version.clone(), generated_at)
        };
        let document = assemble(entries, assemble_options);

        let rendered = match options.format {
            OutputFormat::Markdown => render_markdown(&document),
            OutputFormat::Html => render_html(&document),
            OutputFormat::Json => serde_json::to_string_pretty(&document)?,
        };

        let terminal = if warnings.is_empty() {
            Stage::Done
        } else {
            Stage::Degraded
        };
        advance(&mut stage, terminal);

        Ok(RunReport {
            document,
            rendered,
            stage,
            warnings,
            metrics,
        })
    }

    /// Aggregate statistics for the range, no AI involved.
    pub fn analyze_repository(
        &mut self,
        options: &HistoryOptions,
    ) -> Result<RepoAnalysis, PipelineError> {
        let commits = self.collect_range(options)?;
        Ok(RepoAnalysis::from_commits(&commits))
    }

    /// Score commit hygiene for the range.
    pub fn health_report(&mut self, options: &HistoryOptions) -> Result<HealthReport, PipelineError> {
        let commits = self.collect_range(options)?;
        Ok(health::health_from_commits(&commits))
    }

    /// Run the interactive commit workflow against the probed repository.
    pub async fn commit(
        &mut self,
        provider_name: Option<&str>,
        options: &CommitOptions,
    ) -> Result<CommitOutcome, PipelineError> {
        run_commit_workflow(&mut self.probe, &self.registry, provider_name, options).await
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn collect_range(&mut self, options: &HistoryOptions) -> Result<Vec<CommitInfo>, PipelineError> {
        let repo = self.probe.open()?;
        let range = resolve_range(&repo, options.from.as_deref(), &options.to)?;
        let commits = collect_commits(&repo, &range, options.max_commits)?;
        debug!(
            range = %range.describe(),
            commits = commits.len(),
            "Collected commits"
        );
        Ok(commits)
    }

    /// Resolve the provider to summarize with. An explicitly requested
    /// unknown name is fatal; anything else degrades to `None`.
    async fn select_provider(
        &self,
        name: Option<&str>,
        warnings: &mut Vec<String>,
    ) -> Result<Option<&dyn Provider>, PipelineError> {
        match name {
            Some(name) => {
                let provider = self.registry.get(name)?;
                if provider.is_available().await {
                    Ok(Some(provider))
                } else {
                    let warning = format!(
                        "Provider '{}' is not installed, using rule-based summaries",
                        provider.name()
                    );
                    warn!("{warning}");
                    warnings.push(warning);
                    Ok(None)
                }
            }
            None => match self.registry.default_provider().await {
                Some(provider) => Ok(Some(provider)),
                None => {
                    let warning =
                        "No AI provider available, using rule-based summaries".to_string();
                    warn!("{warning}");
                    warnings.push(warning);
                    Ok(None)
                }
            },
        }
    }
}
