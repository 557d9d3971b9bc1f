//! Conventional commit support: validation, message drafting and the
//! interactive commit workflow.

pub mod draft;
pub mod message;
pub mod workflow;

pub use draft::{draft_from_rules, draft_with_provider, DraftMessage};
pub use message::{stage_and_commit, validate_message, BODY_LINE_LIMIT, SUBJECT_LIMIT};
pub use workflow::{run_commit_workflow, CommitOptions, CommitOutcome};
