//! Rule-based commit and file classification.

pub mod classifier;
pub mod conventional;
pub mod rules;

pub use classifier::{classify, is_breaking, type_category, Classification};
pub use conventional::{parse_conventional, CommitType, ConventionalCommit};
pub use rules::{categorize_file, FileCategory, Impact, Importance};
