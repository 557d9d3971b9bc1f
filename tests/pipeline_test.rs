//! End-to-end pipeline runs against real repositories.
//!
//! Every test here runs without AI so results are deterministic; provider
//! interaction is covered by unit tests with mocked providers.

mod common;

use chronik::assemble::ChangelogDocument;
use chronik::config::OutputFormat;
use chronik::git::RepoProbe;
use chronik::pipeline::{ChangelogOptions, HistoryOptions, Pipeline, PipelineError, Stage};
use chronik::provider::ProviderRegistry;
use common::TestRepo;

fn no_ai_options() -> ChangelogOptions {
    ChangelogOptions {
        no_ai: true,
        attribution: false,
        ..Default::default()
    }
}

fn pipeline_for(repo: &TestRepo) -> Pipeline {
    Pipeline::new(RepoProbe::new(repo.path()), ProviderRegistry::new())
}

#[tokio::test]
async fn test_feature_commit_renders_feature_entry() {
    let repo = TestRepo::new();
    repo.commit_files(
        "feat: add login button",
        &[("src/ui/login.tsx", "export const Login = () => null;\n")],
    );

    let mut pipeline = pipeline_for(&repo);
    let report = pipeline.generate_changelog(&no_ai_options()).await.unwrap();

    assert_eq!(report.stage, Stage::Done);
    assert!(report.warnings.is_empty());
    assert!(report.rendered.starts_with("## [Unreleased]"));
    assert!(report.rendered.contains("### ✨ Features"));
    assert!(report.rendered.contains("- (feat) add login button"));
    assert!(report.rendered.contains("(75%)"));
    assert_eq!(report.metrics.commits, 1);
    assert_eq!(report.metrics.api_calls, 0);
}

#[tokio::test]
async fn test_breaking_section_comes_first_with_markers() {
    let repo = TestRepo::new();
    repo.commit_files(
        "feat: add settings page",
        &[("src/ui/settings.tsx", "export const Settings = () => null;\n")],
    );
    repo.commit_files(
        "feat!: drop legacy login API",
        &[("src/api/login.rs", "pub fn login_v2() {}\n")],
    );

    let mut pipeline = pipeline_for(&repo);
    let report = pipeline.generate_changelog(&no_ai_options()).await.unwrap();

    let breaking = report.rendered.find("### ⚠️ Breaking Changes").unwrap();
    let features = report.rendered.find("### ✨ Features").unwrap();
    assert!(breaking < features);
    assert!(report.rendered.contains("⚠️ BREAKING CHANGE"));
    assert!(report.rendered.contains("🔥"));
}

#[tokio::test]
async fn test_working_tree_changes_render_as_pending_entry() {
    let repo = TestRepo::new();
    repo.commit_files("chore: init", &[("src/lib.rs", "pub fn lib() {}\n")]);
    repo.write_file("docs/usage.md", "# Usage\n\nRun the tool.\n");

    let mut pipeline = pipeline_for(&repo);
    let options = ChangelogOptions {
        from: Some("HEAD".to_string()),
        include_working_tree: true,
        ..no_ai_options()
    };
    let report = pipeline.generate_changelog(&options).await.unwrap();

    assert!(report.rendered.contains("### 📝 Documentation"));
    assert!(report.rendered.contains("(working-tree)"));
    assert_eq!(report.metrics.commits, 1);
}

#[tokio::test]
async fn test_empty_registry_degrades_instead_of_failing() {
    let repo = TestRepo::new();
    repo.commit_files("feat: add thing", &[("src/thing.rs", "pub fn thing() {}\n")]);

    let mut pipeline = pipeline_for(&repo);
    let options = ChangelogOptions {
        attribution: false,
        ..Default::default()
    };
    let report = pipeline.generate_changelog(&options).await.unwrap();

    assert_eq!(report.stage, Stage::Degraded);
    assert!(!report.warnings.is_empty());
    assert!(report.rendered.contains("- (feat) add thing"));
}

#[tokio::test]
async fn test_unknown_provider_name_is_fatal() {
    let repo = TestRepo::new();
    repo.commit("feat: something");

    let mut pipeline = pipeline_for(&repo);
    let options = ChangelogOptions {
        provider: Some("gemini".to_string()),
        ..Default::default()
    };
    let result = pipeline.generate_changelog(&options).await;

    assert!(matches!(result, Err(PipelineError::Config(_))));
}

#[tokio::test]
async fn test_missing_repository_is_fatal() {
    let dir = common::temp_test_dir();
    let mut pipeline = Pipeline::new(RepoProbe::new(dir.path()), ProviderRegistry::new());

    let result = pipeline.generate_changelog(&no_ai_options()).await;

    assert!(matches!(result, Err(PipelineError::Git(_))));
}

#[tokio::test]
async fn test_range_starts_at_latest_tag() {
    let repo = TestRepo::new();
    let tagged = repo.commit_files("feat: initial release", &[("src/lib.rs", "pub fn a() {}\n")]);
    repo.tag_lightweight("v1.0.0", tagged);
    repo.commit_files("fix: patch a", &[("src/lib.rs", "pub fn a() { /* fixed */ }\n")]);

    let mut pipeline = pipeline_for(&repo);
    let report = pipeline.generate_changelog(&no_ai_options()).await.unwrap();

    assert_eq!(report.metrics.commits, 1);
    assert!(report.rendered.contains("- (fix) patch a"));
    assert!(!report.rendered.contains("initial release"));
}

#[tokio::test]
async fn test_json_output_parses_back_into_document() {
    let repo = TestRepo::new();
    repo.commit_files("feat: add exporter", &[("src/export.rs", "pub fn export() {}\n")]);
    repo.commit_files(
        "fix: flush buffer on drop",
        &[("src/export.rs", "pub fn export() { flush(); }\n")],
    );

    let mut pipeline = pipeline_for(&repo);
    let options = ChangelogOptions {
        format: OutputFormat::Json,
        ..no_ai_options()
    };
    let report = pipeline.generate_changelog(&options).await.unwrap();

    let parsed: ChangelogDocument = serde_json::from_str(&report.rendered).unwrap();
    assert_eq!(parsed.version, "Unreleased");
    let categories: Vec<&str> = parsed.sections.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(categories, vec!["feature", "bugfix"]);
    assert_eq!(parsed.sections.len(), report.document.sections.len());
}

#[tokio::test]
async fn test_repeated_runs_build_identical_documents() {
    let repo = TestRepo::new();
    repo.commit_files("feat: add importer", &[("src/import.rs", "pub fn import() {}\n")]);
    repo.commit_files("docs: describe importer", &[("docs/import.md", "# Import\n")]);
    repo.commit_files(
        "fix: reject empty input",
        &[("src/import.rs", "pub fn import() { guard(); }\n")],
    );

    let mut pipeline = pipeline_for(&repo);
    let first = pipeline.generate_changelog(&no_ai_options()).await.unwrap();
    let second = pipeline.generate_changelog(&no_ai_options()).await.unwrap();

    let shape = |document: &ChangelogDocument| -> Vec<(String, Vec<String>)> {
        document
            .sections
            .iter()
            .map(|section| {
                let hashes = section
                    .entries
                    .iter()
                    .map(|entry| entry.commit.hash.clone())
                    .collect();
                (section.category.clone(), hashes)
            })
            .collect()
    };
    assert_eq!(shape(&first.document), shape(&second.document));
}

#[test]
fn test_analysis_and_health_over_clean_history() {
    let repo = TestRepo::new();
    repo.commit_files("feat(auth): add login", &[("src/auth/login.rs", "pub fn login() {}\n")]);
    repo.commit_files(
        "fix(auth): expire stale sessions",
        &[("src/auth/session.rs", "pub fn expire() {}\n")],
    );
    repo.commit_files("docs: add login guide", &[("docs/login.md", "# Login\n")]);
    repo.commit_files(
        "test: cover login flow",
        &[("tests/login_test.rs", "#[test]\nfn t() {}\n")],
    );

    let mut pipeline = pipeline_for(&repo);
    let analysis = pipeline.analyze_repository(&HistoryOptions::default()).unwrap();

    assert_eq!(analysis.total_commits, 4);
    assert_eq!(analysis.conventional_commits, 4);
    assert_eq!(analysis.breaking_commits, 0);
    assert_eq!(analysis.contributors, 1);
    assert_eq!(analysis.top_scopes[0], ("auth".to_string(), 2));

    let health = pipeline.health_report(&HistoryOptions::default()).unwrap();
    assert_eq!(health.score, 100);
    assert_eq!(health.grade, 'A');
}

#[test]
fn test_health_penalizes_sloppy_history() {
    let repo = TestRepo::new();
    let big = "fn x() {}\n".repeat(600);
    repo.commit_files("stuff", &[("src/main.rs", &big)]);
    repo.commit_files("more stuff", &[("src/main.rs", "fn main() {}\n")]);

    let mut pipeline = pipeline_for(&repo);
    let health = pipeline.health_report(&HistoryOptions::default()).unwrap();

    assert!(health.score < 60);
    assert_eq!(health.grade, 'F');
}
