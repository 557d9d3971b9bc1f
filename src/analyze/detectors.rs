//! Fixed detector and framework tables for diff analysis.

/// A named pattern detector applied to changed diff lines.
pub(crate) struct Detector {
    pub name: &'static str,
    pub pattern: &'static str,
    /// Framework gate: only runs when the file path inferred this framework.
    pub requires: Option<&'static str>,
    /// Whether capture groups contribute identifiers to `code_elements`.
    pub captures_elements: bool,
}

/// Detector table, applied in order to every added or removed line.
pub(crate) const DETECTORS: &[Detector] = &[
    Detector {
        name: "function-definition",
        pattern: r"\b(?:fn|function|def|func)\s+([A-Za-z_][A-Za-z0-9_]*)|\bconst\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:async\s*)?\(",
        requires: None,
        captures_elements: true,
    },
    Detector {
        name: "type-definition",
        pattern: r"\b(?:struct|enum|trait|interface|class)\s+([A-Za-z_][A-Za-z0-9_]*)|\btype\s+([A-Za-z_][A-Za-z0-9_]*)\s*=",
        requires: None,
        captures_elements: true,
    },
    Detector {
        name: "hook-definition",
        pattern: r"\b(use[A-Z][A-Za-z0-9_]*)",
        requires: Some("react"),
        captures_elements: true,
    },
    Detector {
        name: "error-handling",
        pattern: r"\b(?:try|catch|except|rescue|raise|throw)\b|\bmap_err\b|panic!|Result<",
        requires: None,
        captures_elements: false,
    },
    Detector {
        name: "async-operation",
        pattern: r"\basync\b|\bawait\b|\.then\(|\bPromise\b|spawn\(",
        requires: None,
        captures_elements: false,
    },
    Detector {
        name: "auth",
        pattern: r"(?i)\b(?:auth|login|logout|token|session|jwt|oauth|password|credential)",
        requires: None,
        captures_elements: false,
    },
    Detector {
        name: "caching",
        pattern: r"(?i)\b(?:cache|cached|memoiz|redis|ttl)",
        requires: None,
        captures_elements: false,
    },
    Detector {
        name: "state-management",
        pattern: r"\b(?:useState|useReducer|setState|dispatch)\b|(?i)\b(?:redux|zustand)\b",
        requires: Some("react"),
        captures_elements: false,
    },
    Detector {
        name: "routing",
        pattern: r"(?i)\b(?:router|route|navigate|redirect|endpoint)\b|\bapp\.(?:get|post|put|delete|patch)\(",
        requires: Some("api"),
        captures_elements: false,
    },
    Detector {
        name: "data-fetching",
        pattern: r"(?i)\bfetch\b|\baxios\b|\bhttp\.|\bgraphql\b|\bquery\b",
        requires: None,
        captures_elements: false,
    },
    Detector {
        name: "schema-change",
        pattern: r"(?i)\b(?:create table|alter table|drop table|add column|drop column|migration|schema)\b",
        requires: Some("database"),
        captures_elements: false,
    },
    Detector {
        name: "test-case",
        pattern: r"#\[test\]|\b(?:it|describe|test)\(|\bassert",
        requires: None,
        captures_elements: false,
    },
    Detector {
        name: "logging",
        pattern: r"\btracing::|\bconsole\.(?:log|warn|error)|\b(?:debug|info|warn|error)!\(|(?i)\blogger\b",
        requires: None,
        captures_elements: false,
    },
];

/// Manifest files whose changed lines always count as a dependency change.
pub(crate) const DEPENDENCY_MANIFESTS: &[&str] = &[
    "package.json",
    "cargo.toml",
    "go.mod",
    "requirements.txt",
    "gemfile",
    "pom.xml",
    "build.gradle",
];

/// Infer framework hints from the file path alone.
pub(crate) fn infer_frameworks(path: &str) -> Vec<&'static str> {
    let lower = path.to_lowercase();
    let mut frameworks = Vec::new();

    if lower.ends_with(".tsx") || lower.ends_with(".jsx") {
        frameworks.push("react");
    }
    if lower.contains("/api/") || lower.starts_with("api/") || lower.contains("route.") {
        frameworks.push("api");
    }
    if lower.contains("database/")
        || lower.contains("sql/")
        || lower.contains("migrations/")
        || lower.ends_with(".sql")
    {
        frameworks.push("database");
    }
    if lower.ends_with(".rs") {
        frameworks.push("rust");
    }
    if lower.ends_with(".go") {
        frameworks.push("go");
    }
    if lower.ends_with(".py") {
        frameworks.push("python");
    }

    frameworks
}

pub(crate) fn is_dependency_manifest(path: &str) -> bool {
    let lower = path.to_lowercase();
    let name = lower.rsplit('/').next().unwrap_or(&lower);
    DEPENDENCY_MANIFESTS.contains(&name) || name.ends_with(".lock")
}
