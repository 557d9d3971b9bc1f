//! Commit hygiene scoring: how disciplined is the history in a range.

use tracing::debug;

use crate::classify::{categorize_file, classify, is_breaking, parse_conventional, FileCategory};
use crate::git::commits::CommitInfo;

/// Commits at or under this many changed lines count as small.
const SMALL_COMMIT_LINES: usize = 400;
/// Breaking-change share at which the density component bottoms out.
const BREAKING_DENSITY_CEILING: f64 = 0.2;

/// One scored dimension of the report.
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub name: &'static str,
    pub score: u32,
    pub max: u32,
    pub detail: String,
}

/// Hygiene score for a commit range, 0-100 with a letter grade.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub score: u32,
    pub grade: char,
    pub components: Vec<HealthComponent>,
}

/// Score a range of commits.
///
/// Weights: conventional format 40, breaking density 20, size discipline
/// 20, documentation and test activity 10 each. An empty range scores 0.
pub fn health_from_commits(commits: &[CommitInfo]) -> HealthReport {
    if commits.is_empty() {
        return HealthReport {
            score: 0,
            grade: 'F',
            components: Vec::new(),
        };
    }

    let total = commits.len();
    let conventional = commits
        .iter()
        .filter(|c| parse_conventional(&c.subject, &c.body).is_conventional)
        .count();
    let breaking = commits.iter().filter(|c| is_breaking(&classify(c))).count();
    let docs = commits
        .iter()
        .filter(|c| touches_category(c, FileCategory::Documentation))
        .count();
    let tests = commits
        .iter()
        .filter(|c| touches_category(c, FileCategory::Tests))
        .count();
    let small = commits
        .iter()
        .filter(|c| c.total_lines() <= SMALL_COMMIT_LINES)
        .count();

    let components = vec![
        scaled(
            "conventional commits",
            conventional,
            total,
            40,
            format!("{conventional} of {total} commits follow the conventional format"),
        ),
        breaking_component(breaking, total),
        scaled(
            "commit size",
            small,
            total,
            20,
            format!("{small} of {total} commits change at most {SMALL_COMMIT_LINES} lines"),
        ),
        presence("documentation updates", docs, total, 10),
        presence("test updates", tests, total, 10),
    ];

    let score = components.iter().map(|c| c.score).sum();
    let report = HealthReport {
        score,
        grade: grade(score),
        components,
    };
    debug!(score = report.score, grade = %report.grade, "Scored commit hygiene");
    report
}

fn touches_category(commit: &CommitInfo, category: FileCategory) -> bool {
    commit
        .files
        .iter()
        .any(|file| categorize_file(&file.path) == category)
}

fn scaled(name: &'static str, count: usize, total: usize, max: u32, detail: String) -> HealthComponent {
    let score = ((count as f64 / total as f64) * f64::from(max)).round() as u32;
    HealthComponent {
        name,
        score,
        max,
        detail,
    }
}

fn breaking_component(breaking: usize, total: usize) -> HealthComponent {
    let density = breaking as f64 / total as f64;
    let score = ((1.0 - (density / BREAKING_DENSITY_CEILING).min(1.0)) * 20.0).round() as u32;
    HealthComponent {
        name: "breaking change density",
        score,
        max: 20,
        detail: format!("{breaking} breaking change(s) in {total} commits"),
    }
}

fn presence(name: &'static str, count: usize, total: usize, max: u32) -> HealthComponent {
    let (score, detail) = if count > 0 {
        (max, format!("{count} of {total} commits touch this area"))
    } else {
        (0, "no commits touch this area".to_string())
    };
    HealthComponent {
        name,
        score,
        max,
        detail,
    }
}

fn grade(score: u32) -> char {
    match score {
        90..=100 => 'A',
        80..=89 => 'B',
        70..=79 => 'C',
        60..=69 => 'D',
        _ => 'F',
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::git::commits::{FileChange, FileStatus};

    use super::*;

    fn commit(subject: &str, path: &str, insertions: usize, deletions: usize) -> CommitInfo {
        CommitInfo {
            hash: "b".repeat(40),
            short_hash: "bbbbbbb".to_string(),
            author: "Test".to_string(),
            date: Utc::now(),
            subject: subject.to_string(),
            body: String::new(),
            files: vec![FileChange {
                path: path.to_string(),
                status: FileStatus::Modified,
                old_path: None,
                diff_text: None,
                insertions,
                deletions,
                truncated: false,
            }],
            insertions,
            deletions,
        }
    }

    #[test]
    fn test_empty_range_scores_zero() {
        let report = health_from_commits(&[]);
        assert_eq!(report.score, 0);
        assert_eq!(report.grade, 'F');
        assert!(report.components.is_empty());
    }

    #[test]
    fn test_clean_history_grades_a() {
        let commits = vec![
            commit("feat: add login", "src/auth/login.rs", 40, 2),
            commit("fix: patch session", "src/auth/session.rs", 8, 3),
            commit("docs: describe login", "docs/login.md", 20, 0),
            commit("test: cover login", "tests/login_test.rs", 60, 0),
        ];

        let report = health_from_commits(&commits);
        assert_eq!(report.score, 100);
        assert_eq!(report.grade, 'A');
    }

    #[test]
    fn test_sloppy_history_grades_f() {
        let commits = vec![
            commit("stuff", "src/a.rs", 350, 300),
            commit("more stuff", "src/b.rs", 500, 100),
        ];

        let report = health_from_commits(&commits);
        // only the breaking-density component scores
        assert_eq!(report.score, 20);
        assert_eq!(report.grade, 'F');
    }

    #[test]
    fn test_score_stays_in_bounds() {
        let commits = vec![
            commit("feat!: drop old api", "src/api/mod.rs", 900, 900),
            commit("wip", "src/x.rs", 3, 1),
            commit("docs: notes", "README.md", 5, 0),
        ];

        let report = health_from_commits(&commits);
        assert!(report.score <= 100);
        for component in &report.components {
            assert!(component.score <= component.max, "{}", component.name);
        }
    }

    #[test]
    fn test_conventional_component_is_monotone() {
        let mut previous = 0;
        for conventional in 0..=6usize {
            let commits: Vec<CommitInfo> = (0..6)
                .map(|i| {
                    if i < conventional {
                        commit("feat: thing", "src/a.rs", 5, 1)
                    } else {
                        commit("random words", "src/a.rs", 5, 1)
                    }
                })
                .collect();
            let report = health_from_commits(&commits);
            let component = report
                .components
                .iter()
                .find(|c| c.name == "conventional commits")
                .unwrap();
            assert!(component.score >= previous);
            previous = component.score;
        }
    }

    #[test]
    fn test_breaking_density_bottoms_out() {
        let component = breaking_component(2, 10);
        assert_eq!(component.score, 0);
        let none = breaking_component(0, 10);
        assert_eq!(none.score, 20);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade(100), 'A');
        assert_eq!(grade(90), 'A');
        assert_eq!(grade(89), 'B');
        assert_eq!(grade(70), 'C');
        assert_eq!(grade(60), 'D');
        assert_eq!(grade(59), 'F');
    }
}
