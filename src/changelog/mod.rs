//! Changelog file parsing and persistence.

pub mod parser;
pub mod writer;

pub use parser::{find_insertion_point, read_changelog, ParsedChangelog};
pub use writer::{write_changelog, CHANGELOG_HEADER};
