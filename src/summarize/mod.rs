//! AI summarization with deterministic guard rails and rule-based fallback.

pub mod guards;
pub mod prompt;
pub mod summarizer;

use serde::{Deserialize, Serialize};

pub use guards::apply_guards;
pub use prompt::build_summary_prompt;
pub use summarizer::{fallback_summary, summarize};

/// Structured summary of one commit, AI-produced or rule-derived.
///
/// Every field except `summary` is optional on the wire so a partial
/// provider response still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technical_details: String,
    #[serde(default)]
    pub business_value: Option<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub breaking_changes: bool,
    #[serde(default)]
    pub migration_required: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    /// Certainty 0-100. None when the provider did not report one; the
    /// renderer substitutes its default.
    #[serde(default)]
    pub confidence: Option<u8>,
}
