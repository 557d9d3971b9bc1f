//! Claude CLI provider.

use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ProviderError;

use super::{provider_timeout, Capabilities, Completion, CompletionOptions, Provider, TokenUsage};

const PROVIDER_NAME: &str = "claude";

/// Claude CLI JSON envelope when using --output-format json.
#[derive(Deserialize)]
struct CliEnvelope {
    result: String,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    usage: Option<EnvelopeUsage>,
}

#[derive(Deserialize)]
struct EnvelopeUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Provider backed by the `claude` CLI.
#[derive(Debug, Default)]
pub struct ClaudeProvider;

impl ClaudeProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for ClaudeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// True when the `claude` binary is on PATH and answers --version.
    async fn is_available(&self) -> bool {
        if which::which(PROVIDER_NAME).is_err() {
            return false;
        }
        match Command::new(PROVIDER_NAME).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    /// Runs `claude -p <prompt> --output-format json` and unwraps the CLI
    /// envelope. A response without the envelope is used as raw content.
    async fn generate(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError> {
        let timeout_duration = provider_timeout();
        let timeout_secs = timeout_duration.as_secs();

        let mut cmd = Command::new(PROVIDER_NAME);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json");
        if let Some(model) = &options.model {
            cmd.arg("--model").arg(model);
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = timeout(timeout_duration, cmd.output())
            .await
            .map_err(|_| ProviderError::Timeout {
                name: PROVIDER_NAME.to_string(),
                seconds: timeout_secs,
            })?
            .map_err(|source| ProviderError::SpawnFailed {
                name: PROVIDER_NAME.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(ProviderError::NonZeroExit {
                name: PROVIDER_NAME.to_string(),
                code,
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        parse_response(&stdout)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            max_prompt_bytes: 200_000,
            reports_usage: true,
            supports_json: true,
        }
    }
}

fn parse_response(stdout: &str) -> Result<Completion, ProviderError> {
    match serde_json::from_str::<CliEnvelope>(stdout) {
        Ok(envelope) => {
            if envelope.is_error {
                return Err(ProviderError::ExecutionFailed {
                    name: PROVIDER_NAME.to_string(),
                    detail: envelope.result,
                });
            }
            let usage = envelope
                .usage
                .map(|u| TokenUsage {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                })
                .unwrap_or_default();
            Ok(Completion {
                content: envelope.result,
                usage,
            })
        }
        Err(_) => {
            debug!("Claude response missing CLI envelope, using raw output");
            Ok(Completion {
                content: stdout.to_string(),
                usage: TokenUsage::default(),
            })
        }
    }
}
