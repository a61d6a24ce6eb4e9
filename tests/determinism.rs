//! Identical (tree, prompt, budget) inputs must yield identical bundles,
//! byte-for-byte, across fresh engine instances.

use std::fs;

use repo_context::engine::{ContextEngine, EngineConfig};
use repo_context::types::{ContextBudget, ContextBundle, RepoId, TreeVersion};
use tempfile::tempdir;

fn fixture_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/auth")).unwrap();
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(
        dir.path().join("src/auth/login.py"),
        "from src.auth.tokens import issue\n\ndef login():\n    return issue()\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/auth/tokens.py"),
        "def issue():\n    return 'token'\n",
    )
    .unwrap();
    fs::write(dir.path().join("src/db.py"), "CONNECTIONS = {}\n").unwrap();
    fs::write(dir.path().join("docs/guide.md"), "# Guide\nLogin docs.\n").unwrap();
    fs::write(dir.path().join("main.py"), "from src.auth.login import login\n").unwrap();
    dir
}

fn run_fresh(dir: &tempfile::TempDir) -> ContextBundle {
    let engine = ContextEngine::new(EngineConfig {
        timeout: None,
        ..EngineConfig::default()
    });
    engine
        .build_context(
            dir.path(),
            &RepoId::new("fixture"),
            &TreeVersion::new("v1"),
            "fix the login token flow",
            &ContextBudget::default(),
        )
        .unwrap()
}

#[test]
fn repeated_runs_produce_identical_bundles() {
    let dir = fixture_tree();

    let first = run_fresh(&dir);
    let second = run_fresh(&dir);

    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn bundle_order_is_stable_and_score_descending() {
    let dir = fixture_tree();
    let bundle = run_fresh(&dir);

    assert!(bundle.files.len() >= 2);
    for pair in bundle.files.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].path < pair[1].path)
        );
    }
}

#[test]
fn bundle_serialization_round_trips() {
    let dir = fixture_tree();
    let bundle = run_fresh(&dir);

    let json = serde_json::to_string_pretty(&bundle).unwrap();
    let back: ContextBundle = serde_json::from_str(&json).unwrap();
    assert_eq!(bundle, back);
}
