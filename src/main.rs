//! chronik - CLI entry point.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chronik::changelog::write_changelog;
use chronik::commit::{validate_message, CommitOptions};
use chronik::config::{AnalysisMode, OutputFormat};
use chronik::error::{ChangelogError, ConfigError, ProviderError};
use chronik::git::RepoProbe;
use chronik::pipeline::{
    ChangelogOptions, HealthReport, HistoryOptions, Pipeline, PipelineError, RepoAnalysis,
    DEFAULT_MAX_COMMITS,
};
use chronik::provider::{CompletionOptions, ProviderRegistry};

/// Generate enriched changelogs from git history.
#[derive(Parser, Debug)]
#[command(name = "chronik")]
#[command(about = "Generate enriched changelogs from git history")]
#[command(version)]
struct Cli {
    /// AI provider to use (claude, codex)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Analysis depth (standard, detailed, enterprise)
    #[arg(long, global = true, default_value = "standard")]
    mode: AnalysisMode,

    /// Log at debug level
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Show full error chains
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a changelog for a commit range
    Changelog {
        /// Explicit version heading (defaults to Unreleased)
        #[arg(long = "set-version")]
        version: Option<String>,

        /// Start of commit range (tag, commit hash, or branch)
        #[arg(long)]
        from: Option<String>,

        /// End of commit range
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Maximum commits to analyze
        #[arg(long, default_value_t = DEFAULT_MAX_COMMITS)]
        max_commits: usize,

        /// Output format (markdown, json, html)
        #[arg(long, default_value = "markdown")]
        format: OutputFormat,

        /// Update a changelog file instead of printing to stdout
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,

        /// Model identifier passed through to the provider
        #[arg(long)]
        model: Option<String>,

        /// Skip AI summarization, rule-based output only
        #[arg(long)]
        no_ai: bool,

        /// Omit the attribution line
        #[arg(long)]
        no_attribution: bool,

        /// Include pending working-tree changes as an unreleased entry
        #[arg(long)]
        working_tree: bool,
    },

    /// Summarize commit activity for a range
    Analyze {
        /// Start of commit range (tag, commit hash, or branch)
        #[arg(long)]
        from: Option<String>,

        /// End of commit range
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Maximum commits to analyze
        #[arg(long, default_value_t = DEFAULT_MAX_COMMITS)]
        max_commits: usize,
    },

    /// Score commit hygiene for a range
    Health {
        /// Start of commit range (tag, commit hash, or branch)
        #[arg(long)]
        from: Option<String>,

        /// End of commit range
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Maximum commits to analyze
        #[arg(long, default_value_t = DEFAULT_MAX_COMMITS)]
        max_commits: usize,
    },

    /// Draft a conventional commit message for pending changes and commit
    Commit {
        /// Skip AI drafting, rule-based message only
        #[arg(long)]
        no_ai: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,

        /// Model identifier passed through to the provider
        #[arg(long)]
        model: Option<String>,
    },

    /// Check a commit message against the conventional format
    Validate {
        /// The message to validate
        message: String,
    },

    /// List registered providers and their availability
    Providers {
        /// Run a live connectivity probe against one provider
        #[arg(long, value_name = "NAME")]
        check: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let debug = cli.debug;
    if let Err(error) = run(cli).await {
        render_error(&error, debug);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let probe = RepoProbe::new(".");
    let registry = ProviderRegistry::bundled();
    let mut pipeline = Pipeline::new(probe, registry);

    match cli.command {
        Command::Changelog {
            version,
            from,
            to,
            max_commits,
            format,
            write,
            model,
            no_ai,
            no_attribution,
            working_tree,
        } => {
            if write.is_some() && format != OutputFormat::Markdown {
                bail!("--write supports markdown only; drop --format or print to stdout");
            }

            let options = ChangelogOptions {
                version,
                from,
                to,
                max_commits,
                mode: cli.mode,
                format,
                provider: cli.provider,
                model,
                no_ai,
                attribution: !no_attribution,
                include_working_tree: working_tree,
            };
            let report = pipeline.generate_changelog(&options).await?;

            for warning in &report.warnings {
                eprintln!("Warning: {warning}");
            }

            match write {
                Some(path) => {
                    write_changelog(&path, &report.rendered, &report.document.version)
                        .context("Failed to write changelog")?;
                    println!(
                        "✓ Updated {} ({} commits, {} ms)",
                        path.display(),
                        report.metrics.commits,
                        report.metrics.duration_ms
                    );
                }
                None => {
                    print!("{}", report.rendered);
                    if !report.rendered.ends_with('\n') {
                        println!();
                    }
                }
            }
        }

        Command::Analyze {
            from,
            to,
            max_commits,
        } => {
            let analysis = pipeline.analyze_repository(&HistoryOptions {
                from,
                to,
                max_commits,
            })?;
            print_analysis(&analysis);
        }

        Command::Health {
            from,
            to,
            max_commits,
        } => {
            let report = pipeline.health_report(&HistoryOptions {
                from,
                to,
                max_commits,
            })?;
            print_health(&report);
        }

        Command::Commit { no_ai, yes, model } => {
            let options = CommitOptions {
                no_ai,
                assume_yes: yes,
                model,
            };
            pipeline.commit(cli.provider.as_deref(), &options).await?;
        }

        Command::Validate { message } => match validate_message(&message) {
            Ok(parsed) => {
                let type_label = parsed.raw_type.as_deref().unwrap_or("none");
                println!("✓ Valid conventional commit ({type_label})");
            }
            Err(errors) => {
                for error in &errors {
                    eprintln!("Error: {error}");
                    for tip in error.tips() {
                        eprintln!("  Tip: {tip}");
                    }
                }
                std::process::exit(1);
            }
        },

        Command::Providers { check } => match check {
            Some(name) => {
                let provider = pipeline.registry().get(&name)?;
                println!("Checking {}...", provider.name());
                let completion = provider
                    .generate(
                        "Reply with the single word: ok",
                        &CompletionOptions::default(),
                    )
                    .await?;
                println!(
                    "✓ {} responded ({} bytes)",
                    provider.name(),
                    completion.content.len()
                );
            }
            None => {
                for provider in pipeline.registry().iter() {
                    let marker = if provider.is_available().await {
                        "available"
                    } else {
                        "not installed"
                    };
                    println!("{:<10} {marker}", provider.name());
                }
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "chronik=debug" } else { "chronik=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the error, its tips, and the cause chain under --debug.
fn render_error(error: &anyhow::Error, debug: bool) {
    eprintln!("Error: {error}");

    for tip in collect_tips(error) {
        eprintln!("  Tip: {tip}");
    }

    if debug {
        for (index, cause) in error.chain().skip(1).enumerate() {
            eprintln!("  {index}: {cause}");
        }
    } else if error.chain().count() > 1 {
        eprintln!("  (re-run with --debug for the full error chain)");
    }
}

fn collect_tips(error: &anyhow::Error) -> Vec<String> {
    if let Some(e) = error.downcast_ref::<PipelineError>() {
        return e.tips();
    }
    if let Some(e) = error.downcast_ref::<ProviderError>() {
        return e.tips();
    }
    if let Some(e) = error.downcast_ref::<ConfigError>() {
        return e.tips();
    }
    if let Some(e) = error.downcast_ref::<ChangelogError>() {
        return e.tips();
    }
    Vec::new()
}

fn print_analysis(analysis: &RepoAnalysis) {
    println!("Commits analyzed: {}", analysis.total_commits);
    if analysis.total_commits > 0 {
        let rate =
            analysis.conventional_commits as f64 * 100.0 / analysis.total_commits as f64;
        println!(
            "Conventional:     {} ({rate:.0}%)",
            analysis.conventional_commits
        );
    } else {
        println!("Conventional:     0");
    }
    println!("Breaking:         {}", analysis.breaking_commits);
    println!("Contributors:     {}", analysis.contributors);
    println!(
        "Lines changed:    +{}/-{}",
        analysis.insertions, analysis.deletions
    );

    if !analysis.commits_by_category.is_empty() {
        println!("\nBy category:");
        for (category, count) in &analysis.commits_by_category {
            println!("  {category:<14} {count}");
        }
    }
    if !analysis.commits_by_type.is_empty() {
        println!("\nBy type:");
        for (commit_type, count) in &analysis.commits_by_type {
            println!("  {commit_type:<14} {count}");
        }
    }
    if !analysis.top_scopes.is_empty() {
        println!("\nTop scopes:");
        for (scope, count) in &analysis.top_scopes {
            println!("  {scope:<14} {count}");
        }
    }
}

fn print_health(report: &HealthReport) {
    println!(
        "Repository health: {}/100 (grade {})",
        report.score, report.grade
    );
    for component in &report.components {
        println!(
            "  {:<24} {:>3}/{:<3} {}",
            component.name, component.score, component.max, component.detail
        );
    }
}
