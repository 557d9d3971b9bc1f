//! Run configuration: analysis modes, output formats, provider settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Depth of the AI analysis requested per commit.
///
/// The mode only controls how many analysis dimensions the prompt asks for.
/// Categorization rules are identical across modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Standard,
    Detailed,
    Enterprise,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Detailed => "detailed",
            Self::Enterprise => "enterprise",
        }
    }

    /// Business-value analysis is requested at detailed depth and above.
    pub fn wants_business_value(&self) -> bool {
        matches!(self, Self::Detailed | Self::Enterprise)
    }

    /// Risk factors and recommendations are requested at enterprise depth only.
    pub fn wants_risk_assessment(&self) -> bool {
        matches!(self, Self::Enterprise)
    }
}

impl Default for AnalysisMode {
    fn default() -> Self {
        Self::Standard
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "detailed" => Ok(Self::Detailed),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(ConfigError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Rendering format for the assembled changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Html,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Markdown
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            _ => Err(ConfigError::InvalidFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for one AI provider backend.
///
/// Credentials are validated for presence only. Nothing here triggers a
/// network or subprocess call.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub name: String,
    /// Model identifier passed through to the backend, when it accepts one.
    pub model: Option<String>,
    /// Environment variable holding the credential, when the backend needs one.
    pub credential_env: Option<String>,
}

impl ProviderSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            credential_env: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_credential_env(mut self, var: impl Into<String>) -> Self {
        self.credential_env = Some(var.into());
        self
    }

    /// Check that the configured credential variable is set and non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref var) = self.credential_env
            && std::env::var(var).map(|v| v.is_empty()).unwrap_or(true)
        {
            return Err(ConfigError::MissingCredential {
                name: self.name.clone(),
                var: var.clone(),
            });
        }
        Ok(())
    }
}
