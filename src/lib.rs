//! chronik - generates enriched changelogs from git history.
//!
//! # Overview
//!
//! chronik walks a commit range, classifies each commit with ordered rule
//! tables, optionally asks an LLM provider CLI for per-commit summaries,
//! and assembles the result into markdown, JSON or HTML. It also scores
//! repository hygiene, validates conventional commit messages and drives
//! an AI-assisted commit workflow.

pub mod analyze;
pub mod assemble;
pub mod changelog;
pub mod classify;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod provider;
pub mod summarize;

// Re-export commonly used types
pub use classify::{classify, Classification};
pub use config::{AnalysisMode, OutputFormat};
pub use error::{ChangelogError, ConfigError, GitError, ProviderError, ValidationError};
pub use git::{CommitInfo, FileChange, FileStatus, RepoProbe};
pub use pipeline::{ChangelogOptions, Pipeline, RunReport};
pub use provider::{Provider, ProviderRegistry};
pub use summarize::Summary;
