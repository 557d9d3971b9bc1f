//! AI provider abstraction over locally installed CLI tools.

pub mod claude;
pub mod codex;
pub mod json;
pub mod registry;
pub mod retry;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ProviderError;

pub use claude::ClaudeProvider;
pub use codex::CodexProvider;
pub use registry::ProviderRegistry;

/// Default timeout for provider subprocess execution (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "CHRONIK_PROVIDER_TIMEOUT";

/// Get the configured per-call timeout.
///
/// Reads from CHRONIK_PROVIDER_TIMEOUT if set, otherwise uses the default
/// of 120 seconds. Logs a warning when the variable holds an invalid value.
pub(crate) fn provider_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Token counts reported by a provider, zero when not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A completed generation call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// Static description of what a provider can do.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Upper bound on prompt size; longer prompts should be trimmed by the
    /// caller before submission.
    pub max_prompt_bytes: usize,
    /// Whether [`Completion::usage`] carries real numbers.
    pub reports_usage: bool,
    /// Whether the provider can be asked for structured JSON output.
    pub supports_json: bool,
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Model override passed through to the CLI, provider default when None.
    pub model: Option<String>,
}

/// A text-generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable lowercase identifier used for selection.
    fn name(&self) -> &'static str;

    /// Whether the backing CLI is installed and runnable.
    async fn is_available(&self) -> bool;

    /// Run one generation call.
    async fn generate(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError>;

    fn capabilities(&self) -> Capabilities;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_timeout_default() {
        temp_env::with_var_unset(TIMEOUT_ENV_VAR, || {
            assert_eq!(provider_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_provider_timeout_from_env() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("45"), || {
            assert_eq!(provider_timeout(), Duration::from_secs(45));
        });
    }

    #[test]
    fn test_provider_timeout_invalid_env_uses_default() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
            assert_eq!(provider_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_provider_timeout_empty_env_uses_default() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some(""), || {
            assert_eq!(provider_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_token_usage_defaults_to_zero() {
        let usage = TokenUsage::default();
        assert_eq!(usage.input_tokens, 0);
        assert_eq!(usage.output_tokens, 0);
    }
}
