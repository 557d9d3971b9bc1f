//! Codex CLI provider.

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::ProviderError;

use super::{provider_timeout, Capabilities, Completion, CompletionOptions, Provider, TokenUsage};

const PROVIDER_NAME: &str = "codex";

/// Provider backed by the `codex` CLI.
#[derive(Debug, Default)]
pub struct CodexProvider;

impl CodexProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for CodexProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// True when the `codex` binary is on PATH and answers --version.
    async fn is_available(&self) -> bool {
        if which::which(PROVIDER_NAME).is_err() {
            return false;
        }
        match Command::new(PROVIDER_NAME).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    /// Runs `codex exec --json <prompt>` and extracts the final agent
    /// message from the JSONL event stream.
    async fn generate(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError> {
        let timeout_duration = provider_timeout();
        let timeout_secs = timeout_duration.as_secs();

        let mut cmd = Command::new(PROVIDER_NAME);
        cmd.arg("exec").arg("--json");
        if let Some(model) = &options.model {
            cmd.arg("--model").arg(model);
        }
        cmd.arg(prompt).stdout(Stdio::piped()).stderr(Stdio::piped());

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

        let stdout = String::from_utf8_lossy(&output.stdout);
        let content = extract_agent_message(&stdout)?;
        Ok(Completion {
            content,
            usage: TokenUsage::default(),
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            max_prompt_bytes: 150_000,
            reports_usage: false,
            supports_json: true,
        }
    }
}

/// Pull the last agent message out of a Codex JSONL event stream.
///
/// Handles both event shapes emitted across CLI versions:
/// `{"msg": {"type": "agent_message", "message": ...}}` and
/// `{"item": {"type": "agent_message", "text": ...}}`.
fn extract_agent_message(stdout: &str) -> Result<String, ProviderError> {
    let mut last_message = None;

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        if let Some(msg) = event.get("msg")
            && msg.get("type").and_then(Value::as_str) == Some("agent_message")
            && let Some(text) = msg.get("message").and_then(Value::as_str)
        {
            last_message = Some(text.to_string());
        }

        if let Some(item) = event.get("item")
            && item.get("type").and_then(Value::as_str) == Some("agent_message")
            && let Some(text) = item.get("text").and_then(Value::as_str)
        {
            last_message = Some(text.to_string());
        }
    }

    last_message.ok_or_else(|| ProviderError::MalformedResponse {
        name: PROVIDER_NAME.to_string(),
        detail: "no agent message found in event stream".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_msg_shape() {
        let stdout = concat!(
            r#"{"id":"1","msg":{"type":"task_started"}}"#,
            "\n",
            r#"{"id":"2","msg":{"type":"agent_message","message":"summary here"}}"#,
            "\n",
            r#"{"id":"3","msg":{"type":"task_complete"}}"#,
        );
        assert_eq!(extract_agent_message(stdout).unwrap(), "summary here");
    }

    #[test]
    fn test_extract_item_shape() {
        let stdout = concat!(
            r#"{"type":"item.completed","item":{"type":"reasoning","text":"thinking"}}"#,
            "\n",
            r#"{"type":"item.completed","item":{"type":"agent_message","text":"final answer"}}"#,
        );
        assert_eq!(extract_agent_message(stdout).unwrap(), "final answer");
    }

    #[test]
    fn test_extract_takes_last_agent_message() {
        let stdout = concat!(
            r#"{"msg":{"type":"agent_message","message":"draft"}}"#,
            "\n",
            r#"{"msg":{"type":"agent_message","message":"revised"}}"#,
        );
        assert_eq!(extract_agent_message(stdout).unwrap(), "revised");
    }

    #[test]
    fn test_extract_skips_malformed_lines() {
        let stdout = concat!(
            "not json at all\n",
            r#"{"msg":{"type":"agent_message","message":"ok"}}"#,
        );
        assert_eq!(extract_agent_message(stdout).unwrap(), "ok");
    }

    #[test]
    fn test_extract_without_agent_message_fails() {
        let stdout = r#"{"msg":{"type":"task_started"}}"#;
        let err = extract_agent_message(stdout).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn test_capabilities_no_usage() {
        let caps = CodexProvider::new().capabilities();
        assert!(!caps.reports_usage);
    }
}
