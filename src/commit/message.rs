//! Commit message validation and git staging/commit operations.

use git2::{IndexAddOption, Oid, Repository};

use crate::classify::{parse_conventional, ConventionalCommit};
use crate::error::{GitError, ValidationError};

/// Subject line length limit, in characters.
pub const SUBJECT_LIMIT: usize = 72;
/// Body line length limit, in characters.
pub const BODY_LINE_LIMIT: usize = 100;

/// Validate a commit message against the conventional commit rules.
///
/// Collects every violation instead of stopping at the first, so the
/// caller can print a complete report.
pub fn validate_message(message: &str) -> Result<ConventionalCommit, Vec<ValidationError>> {
    if message.trim().is_empty() {
        return Err(vec![ValidationError::EmptyMessage]);
    }

    let mut parts = message.splitn(2, '\n');
    let subject = parts.next().unwrap_or_default();
    let body = parts.next().unwrap_or_default();

    let mut errors = Vec::new();
    let conventional = parse_conventional(subject, body);

    if !conventional.is_conventional {
        errors.push(ValidationError::NotConventional);
    } else if !conventional.is_valid_type {
        errors.push(ValidationError::UnknownType {
            found: conventional.raw_type.clone().unwrap_or_default(),
        });
    }

    if conventional.is_conventional && conventional.description.is_empty() {
        errors.push(ValidationError::EmptyDescription);
    }

    let subject_length = subject.chars().count();
    if subject_length > SUBJECT_LIMIT {
        errors.push(ValidationError::SubjectTooLong {
            length: subject_length,
            limit: SUBJECT_LIMIT,
        });
    }

    for (index, line) in body.lines().enumerate() {
        let length = line.chars().count();
        if length > BODY_LINE_LIMIT {
            errors.push(ValidationError::BodyLineTooLong {
                // the subject is line 1; body lines start at 2
                line: index + 2,
                length,
                limit: BODY_LINE_LIMIT,
            });
        }
    }

    if errors.is_empty() {
        Ok(conventional)
    } else {
        Err(errors)
    }
}

/// Stage all changes and create a commit on HEAD.
///
/// Uses `index.add_all()` like `git add -A`. Works on an unborn branch by
/// creating a root commit.
pub fn stage_and_commit(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::StagingFailed)?;
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .map_err(GitError::StagingFailed)?;
    index.write().map_err(GitError::StagingFailed)?;

    let tree_id = index.write_tree().map_err(GitError::StagingFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::SignatureMissing)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(_) => None,
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_message_parses() {
        let conventional = validate_message("feat(auth): add two-factor login").unwrap();
        assert_eq!(conventional.scope.as_deref(), Some("auth"));
        assert!(conventional.is_valid_type);
    }

    #[test]
    fn test_valid_message_with_body() {
        let message = "fix(parser): handle empty input\n\nThe parser crashed on empty strings\nbecause the first byte was read unconditionally.";
        assert!(validate_message(message).is_ok());
    }

    #[test]
    fn test_empty_message() {
        let errors = validate_message("   \n  ").unwrap_err();
        assert!(matches!(errors[0], ValidationError::EmptyMessage));
    }

    #[test]
    fn test_not_conventional() {
        let errors = validate_message("Added some stuff").unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::NotConventional)));
    }

    #[test]
    fn test_unknown_type() {
        let errors = validate_message("feature: add login").unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownType { found } if found == "feature")));
    }

    #[test]
    fn test_empty_description() {
        let errors = validate_message("fix: ").unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyDescription)));
    }

    #[test]
    fn test_subject_too_long() {
        let message = format!("feat: {}", "x".repeat(80));
        let errors = validate_message(&message).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SubjectTooLong { length: 86, limit: 72 })));
    }

    #[test]
    fn test_body_line_too_long_reports_line_number() {
        let message = format!("feat: ok\n\nshort line\n{}", "y".repeat(120));
        let errors = validate_message(&message).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::BodyLineTooLong { line: 4, length: 120, .. })));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let message = format!("blorp: {}", "x".repeat(80));
        let errors = validate_message(&message).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_stage_and_commit_with_parent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();

        let sig = git2::Signature::now("Test User", "test@test.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();

        std::fs::write(dir.path().join("test.txt"), "hello\n").unwrap();

        let oid = stage_and_commit(&repo, "feat: add test file").unwrap();
        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message().unwrap(), "feat: add test file");
        assert_eq!(commit.parent_count(), 1);
    }

    #[test]
    fn test_stage_and_commit_root_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();

        std::fs::write(dir.path().join("first.txt"), "first\n").unwrap();

        let oid = stage_and_commit(&repo, "chore: initial commit").unwrap();
        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.parent_count(), 0);
    }
}
