//! Semantic diff analysis over changed lines.

mod analyzer;
mod detectors;

pub use analyzer::{analyze_diff, DiffSignals};
