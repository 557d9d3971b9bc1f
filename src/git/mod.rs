//! Git operations using git2-rs.

pub mod commits;
pub mod range;
pub mod repo;
pub mod status;
pub mod tags;

pub use commits::{collect_commits, CommitInfo, FileChange, FileStatus};
pub use range::{resolve_range, CommitRange};
pub use repo::RepoProbe;
pub use status::{working_tree_change, WorkingTreeChange, WORKING_TREE_HASH};
pub use tags::{latest_tag, version_from_tag, VersionTag};
