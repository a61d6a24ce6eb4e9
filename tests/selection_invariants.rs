//! Selection invariants: budget ceilings hold exactly, output paths are a
//! subset of the scan, and nothing escapes the tree root.

use std::collections::BTreeSet;
use std::fs;

use repo_context::engine::{ContextEngine, EngineConfig};
use repo_context::types::{ContextBudget, RepoId, TreeVersion};
use tempfile::tempdir;

fn engine() -> ContextEngine {
    ContextEngine::new(EngineConfig {
        timeout: None,
        ..EngineConfig::default()
    })
}

fn fixture() -> (tempfile::TempDir, BTreeSet<String>) {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("srv/api")).unwrap();
    let files = [
        ("main.py", "from srv.api.routes import router\n"),
        ("srv/api/routes.py", "ROUTES = ['login', 'logout']\n"),
        ("srv/api/auth.py", "def check(token):\n    return token\n"),
        ("srv/db.py", "POOL_SIZE = 10\n"),
        ("README.md", "# Service\nAuth and routing.\n"),
    ];
    let mut paths = BTreeSet::new();
    for (path, content) in files {
        fs::write(dir.path().join(path), content).unwrap();
        paths.insert(path.to_string());
    }
    (dir, paths)
}

#[test]
fn invariant_bundle_respects_every_ceiling() {
    let (dir, _) = fixture();
    let budgets = [
        ContextBudget { max_tokens: 10, max_files: 1, max_chars_per_file: 100, max_depth: 3 },
        ContextBudget { max_tokens: 60, max_files: 3, max_chars_per_file: 50, max_depth: 3 },
        ContextBudget { max_tokens: 10_000, max_files: 100, max_chars_per_file: 10_000, max_depth: 2 },
    ];

    for budget in budgets {
        let bundle = engine()
            .build_context(
                dir.path(),
                &RepoId::new("inv"),
                &TreeVersion::new("v1"),
                "auth token routing",
                &budget,
            )
            .unwrap();

        let token_sum: usize = bundle.files.iter().map(|f| f.tokens).sum();
        assert_eq!(token_sum, bundle.stats.tokens_used);
        assert!(bundle.stats.tokens_used <= budget.max_tokens);
        assert!(bundle.files.len() <= budget.max_files);
        for file in &bundle.files {
            assert!(file.content.len() <= budget.max_chars_per_file);
        }
    }
}

#[test]
fn invariant_paths_come_from_the_scan_and_never_traverse() {
    let (dir, known) = fixture();
    let bundle = engine()
        .build_context(
            dir.path(),
            &RepoId::new("inv"),
            &TreeVersion::new("v1"),
            "auth token routing",
            &ContextBudget::default(),
        )
        .unwrap();

    assert!(!bundle.files.is_empty());
    for file in &bundle.files {
        assert!(known.contains(&file.path), "fabricated path {}", file.path);
        assert!(!file.path.split('/').any(|seg| seg == ".."));
        assert!(!file.path.starts_with('/'));
    }
}

#[test]
fn invariant_accounting_covers_all_considered_files() {
    let (dir, _) = fixture();
    let budget = ContextBudget {
        max_tokens: 30,
        max_files: 2,
        ..ContextBudget::default()
    };
    let bundle = engine()
        .build_context(
            dir.path(),
            &RepoId::new("inv"),
            &TreeVersion::new("v1"),
            "auth token routing",
            &budget,
        )
        .unwrap();

    assert_eq!(bundle.stats.files_considered, 5);
    assert_eq!(bundle.stats.files_selected, bundle.files.len());
    assert_eq!(
        bundle.stats.files_selected + bundle.stats.files_excluded_by_budget,
        bundle.stats.files_considered
    );
}
