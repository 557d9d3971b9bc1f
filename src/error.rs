//! Error types for chronik modules using thiserror.
//!
//! One enum per failure domain. Every kind can produce contextual hints via
//! `tips()` so the CLI prints a short message plus next steps instead of a
//! raw source chain (the chain is shown under `--debug`).

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{reference}': {source}")]
    ReferenceNotFound {
        reference: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to compute diff for {hash}: {source}")]
    DiffFailed {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to read working tree status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("No changes to commit (working tree is clean)")]
    NoChanges,

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    SignatureMissing(#[source] git2::Error),
}

impl GitError {
    /// Contextual hints for the user, keyed on the error kind.
    pub fn tips(&self) -> Vec<String> {
        match self {
            GitError::NotARepository { .. } => vec![
                "Run chronik from inside a git repository".to_string(),
                "Initialize one with: git init".to_string(),
            ],
            GitError::ReferenceNotFound { reference, .. } => vec![
                format!("Check that '{reference}' is a valid tag, branch, or commit hash"),
                "List tags with: git tag --list".to_string(),
            ],
            GitError::NoChanges => {
                vec!["Modify or add files before running the commit workflow".to_string()]
            }
            GitError::SignatureMissing(_) => vec![
                "Set your identity with: git config user.name \"Your Name\"".to_string(),
                "And: git config user.email you@example.com".to_string(),
            ],
            _ => Vec::new(),
        }
    }
}

/// Errors from AI provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider '{name}' CLI not found on PATH")]
    NotInstalled { name: String },

    #[error("Provider '{name}' failed to execute: {detail}")]
    ExecutionFailed { name: String, detail: String },

    #[error("Failed to spawn provider '{name}' process: {source}")]
    SpawnFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Provider '{name}' returned a malformed response: {detail}")]
    MalformedResponse { name: String, detail: String },

    #[error("Provider '{name}' timed out after {seconds} seconds")]
    Timeout { name: String, seconds: u64 },

    #[error("Provider '{name}' exited with code {code}: {stderr}")]
    NonZeroExit {
        name: String,
        code: i32,
        stderr: String,
    },

    #[error("Provider '{name}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        name: String,
        attempts: u32,
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// The provider this error came from.
    pub fn provider_name(&self) -> &str {
        match self {
            ProviderError::NotInstalled { name }
            | ProviderError::ExecutionFailed { name, .. }
            | ProviderError::SpawnFailed { name, .. }
            | ProviderError::MalformedResponse { name, .. }
            | ProviderError::Timeout { name, .. }
            | ProviderError::NonZeroExit { name, .. }
            | ProviderError::RetriesExhausted { name, .. } => name,
        }
    }

    /// Whether retrying the call may succeed. Only transport-level failures
    /// qualify; malformed responses and missing binaries never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout { .. }
                | ProviderError::SpawnFailed { .. }
                | ProviderError::NonZeroExit { .. }
        )
    }

    /// Contextual hints for the user, keyed on the error kind.
    pub fn tips(&self) -> Vec<String> {
        match self {
            ProviderError::NotInstalled { name } => vec![
                format!("Install the {name} CLI or pick another provider with --provider"),
                "List known providers with: chronik providers".to_string(),
            ],
            ProviderError::Timeout { .. } => vec![
                "Raise the limit via the CHRONIK_PROVIDER_TIMEOUT environment variable (seconds)"
                    .to_string(),
            ],
            ProviderError::RetriesExhausted { .. } => {
                vec!["Re-run with --no-ai to fall back to rule-based summaries".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

/// Errors from commit message validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Commit message is empty")]
    EmptyMessage,

    #[error("Subject has no conventional type prefix (expected 'type(scope): description')")]
    NotConventional,

    #[error("Unknown commit type '{found}'")]
    UnknownType { found: String },

    #[error("Description after the colon is empty")]
    EmptyDescription,

    #[error("Subject is {length} characters (limit {limit})")]
    SubjectTooLong { length: usize, limit: usize },

    #[error("Body line {line} is {length} characters (limit {limit})")]
    BodyLineTooLong {
        line: usize,
        length: usize,
        limit: usize,
    },
}

impl ValidationError {
    /// Contextual hints for the user, keyed on the error kind.
    pub fn tips(&self) -> Vec<String> {
        match self {
            ValidationError::NotConventional => {
                vec!["Example: feat(auth): add two-factor login".to_string()]
            }
            ValidationError::UnknownType { .. } => vec![
                "Valid types: feat, fix, docs, style, refactor, perf, test, build, ci, chore, revert, merge"
                    .to_string(),
            ],
            ValidationError::SubjectTooLong { limit, .. } => {
                vec![format!("Shorten the subject to at most {limit} characters")]
            }
            _ => Vec::new(),
        }
    }
}

/// Errors from configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown provider '{name}'. Known providers: {known}")]
    UnknownProvider { name: String, known: String },

    #[error("Provider '{name}' requires the {var} environment variable to be set")]
    MissingCredential { name: String, var: String },

    #[error("Invalid analysis mode '{value}' (expected standard, detailed, or enterprise)")]
    InvalidMode { value: String },

    #[error("Invalid output format '{value}' (expected markdown, json, or html)")]
    InvalidFormat { value: String },
}

impl ConfigError {
    /// Contextual hints for the user, keyed on the error kind.
    pub fn tips(&self) -> Vec<String> {
        match self {
            ConfigError::UnknownProvider { known, .. } => {
                vec![format!("Pick one of: {known}")]
            }
            ConfigError::MissingCredential { var, .. } => {
                vec![format!("Export it first: export {var}=...")]
            }
            _ => Vec::new(),
        }
    }
}

/// Errors from changelog file persistence.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to parse changelog: {0}")]
    ParseFailed(String),

    #[error("Failed to create backup: {0}")]
    BackupFailed(#[source] std::io::Error),
}

impl ChangelogError {
    /// Contextual hints for the user, keyed on the error kind.
    pub fn tips(&self) -> Vec<String> {
        match self {
            ChangelogError::ParseFailed(_) => vec![
                "The existing file does not look like a markdown changelog; move it aside or pick another --write path"
                    .to_string(),
            ],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_repository_has_tips() {
        let err = GitError::NotARepository {
            path: PathBuf::from("/tmp/nowhere"),
        };
        assert!(!err.tips().is_empty());
        assert!(err.to_string().contains("/tmp/nowhere"));
    }

    #[test]
    fn test_provider_error_name_and_transience() {
        let err = ProviderError::Timeout {
            name: "claude".to_string(),
            seconds: 120,
        };
        assert_eq!(err.provider_name(), "claude");
        assert!(err.is_transient());

        let err = ProviderError::MalformedResponse {
            name: "codex".to_string(),
            detail: "no JSON found".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::SubjectTooLong {
            length: 80,
            limit: 72,
        };
        assert!(err.to_string().contains("80"));
        assert!(err.tips()[0].contains("72"));
    }

    #[test]
    fn test_unknown_provider_lists_known() {
        let err = ConfigError::UnknownProvider {
            name: "gemini".to_string(),
            known: "claude, codex".to_string(),
        };
        assert!(err.to_string().contains("gemini"));
        assert!(err.tips()[0].contains("claude"));
    }
}
