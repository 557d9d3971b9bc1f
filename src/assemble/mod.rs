//! Changelog document assembly.
//!
//! Takes classified (and optionally summarized) commits and produces a
//! [`ChangelogDocument`]: sorted, grouped into titled sections, with footer
//! data attached. Assembly is a pure function of its inputs, including the
//! caller-supplied generation timestamp, so identical inputs render to
//! identical bytes.

pub mod html;
pub mod markdown;
pub mod order;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::git::commits::CommitInfo;
use crate::summarize::Summary;

pub use html::render_html;
pub use markdown::render_markdown;
pub use order::sort_entries;

/// Confidence percentage rendered when the AI supplied none.
pub const DEFAULT_CONFIDENCE: u8 = 75;

/// One commit prepared for rendering. `summary` is None when AI was
/// disabled; rendering then falls back to commit and classification data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub commit: CommitInfo,
    pub classification: Classification,
    pub summary: Option<Summary>,
}

/// Counters for one pipeline run, rendered into the footer when supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub commits: usize,
    pub duration_ms: u64,
    pub api_calls: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub errors: usize,
}

/// A titled group of entries sharing a section key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub category: String,
    pub title: String,
    pub entries: Vec<ReleaseEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Footer {
    pub attribution: Option<String>,
    pub metrics: Option<RunMetrics>,
}

/// Assembled changelog for one version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogDocument {
    pub version: String,
    /// Release date formatted `%Y-%m-%d`.
    pub release_date: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<Section>,
    pub footer: Footer,
}

/// Inputs that shape one assembly run.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub attribution: Option<String>,
    pub metrics: Option<RunMetrics>,
    /// Section title overrides keyed by section category. Categories absent
    /// from the map keep their default title; display order never changes.
    pub headlines: BTreeMap<String, String>,
}

impl AssembleOptions {
    pub fn new(version: Option<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            version: version.unwrap_or_else(|| "Unreleased".to_string()),
            generated_at,
            attribution: None,
            metrics: None,
            headlines: BTreeMap::new(),
        }
    }
}

/// Assemble entries into a document: sort, group into sections in display
/// order, attach footer data.
pub fn assemble(mut entries: Vec<ReleaseEntry>, options: AssembleOptions) -> ChangelogDocument {
    sort_entries(&mut entries);

    let mut grouped: BTreeMap<usize, Vec<ReleaseEntry>> = BTreeMap::new();
    for entry in entries {
        let rank = order::section_rank(order::section_key(&entry));
        grouped.entry(rank).or_default().push(entry);
    }

    let sections = grouped
        .into_iter()
        .map(|(rank, entries)| {
            let (category, title) = order::SECTIONS[rank];
            let title = options
                .headlines
                .get(category)
                .cloned()
                .unwrap_or_else(|| title.to_string());
            Section {
                category: category.to_string(),
                title,
                entries,
            }
        })
        .collect();

    ChangelogDocument {
        version: options.version,
        release_date: options.generated_at.format("%Y-%m-%d").to_string(),
        generated_at: options.generated_at,
        sections,
        footer: Footer {
            attribution: options.attribution,
            metrics: options.metrics,
        },
    }
}
