//! Semantic diff analysis: pattern, framework and identifier extraction.

use std::collections::BTreeSet;

use regex_lite::Regex;

use super::detectors::{infer_frameworks, is_dependency_manifest, DETECTORS};

/// Descriptive signals extracted from one file's diff.
///
/// Purely additive context for classification and prompt building. Never
/// influences breaking or importance decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSignals {
    pub patterns: BTreeSet<String>,
    pub frameworks: BTreeSet<String>,
    pub code_elements: BTreeSet<String>,
}

impl DiffSignals {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.frameworks.is_empty() && self.code_elements.is_empty()
    }

    /// Union another file's signals into this one.
    pub fn merge(&mut self, other: DiffSignals) {
        self.patterns.extend(other.patterns);
        self.frameworks.extend(other.frameworks);
        self.code_elements.extend(other.code_elements);
    }
}

/// Analyze a unified diff for one file.
///
/// Runs the fixed detector table over added and removed lines. Empty input
/// yields empty sets.
pub fn analyze_diff(diff_text: &str, file_path: &str) -> DiffSignals {
    let mut signals = DiffSignals::default();
    if diff_text.is_empty() {
        return signals;
    }

    for framework in infer_frameworks(file_path) {
        signals.frameworks.insert(framework.to_string());
    }

    let changed: Vec<&str> = changed_lines(diff_text).collect();
    if changed.is_empty() {
        return DiffSignals::default();
    }

    for detector in DETECTORS {
        if let Some(required) = detector.requires
            && !signals.frameworks.contains(required)
        {
            continue;
        }
        let re = Regex::new(detector.pattern).expect("Invalid detector pattern");
        for line in &changed {
            if let Some(caps) = re.captures(line) {
                signals.patterns.insert(detector.name.to_string());
                if detector.captures_elements {
                    for group in caps.iter().skip(1).flatten() {
                        signals.code_elements.insert(group.as_str().to_string());
                    }
                }
            }
        }
    }

    if is_dependency_manifest(file_path) {
        signals.patterns.insert("dependency-change".to_string());
    }

    signals
}

/// Added and removed lines of a unified diff, markers stripped.
/// Skips the `+++`/`---` file headers.
fn changed_lines(diff_text: &str) -> impl Iterator<Item = &str> {
    diff_text.lines().filter_map(|line| {
        if line.starts_with("+++") || line.starts_with("---") {
            None
        } else if let Some(rest) = line.strip_prefix('+') {
            Some(rest)
        } else {
            line.strip_prefix('-')
        }
    })
}
