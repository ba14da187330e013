mod common;

use std::path::{Path, PathBuf};
use std::process::Command;

fn canvas_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("canvas");
    path
}

fn run_canvas(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = canvas_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run canvas binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn init_and_ingest(config_path: &Path) {
    let (stdout, stderr, success) = run_canvas(config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    let (stdout, stderr, success) = run_canvas(config_path, &["ingest"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
}

#[test]
fn test_init_creates_database() {
    let env = common::setup_test_env();

    let (stdout, stderr, success) = run_canvas(&env.config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(env.root().join("data/canvas.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let env = common::setup_test_env();

    let (_, _, success1) = run_canvas(&env.config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_canvas(&env.config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_sources_reports_files() {
    let env = common::setup_test_env();
    std::fs::remove_file(env.root().join("data/subject_data.csv")).unwrap();

    let (stdout, _, success) = run_canvas(&env.config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("episodes"));
    assert!(stdout.contains("MISSING"));
    assert!(stdout.contains("A Walk in the Woods"));
}

#[test]
fn test_ingest_summary() {
    let env = common::setup_test_env();
    run_canvas(&env.config_path, &["init"]);

    let (stdout, stderr, success) = run_canvas(&env.config_path, &["ingest"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("episodes parsed: 5 (skipped 1)"));
    assert!(stdout.contains("subject links added: 6"));
    assert!(stdout.contains("color links added: 7"));
    assert!(stdout.contains("records dropped: 2"));
    assert!(stdout.contains("ok"));

    // Skips are logged to stderr, not mixed into the summary.
    assert!(!stdout.contains("skipping record"));
}

#[test]
fn test_ingest_idempotent_no_duplicates() {
    let env = common::setup_test_env();
    init_and_ingest(&env.config_path);

    let (stdout, _, success) = run_canvas(&env.config_path, &["ingest"]);
    assert!(success);
    assert!(stdout.contains("subject links added: 0"));
    assert!(stdout.contains("color links added: 0"));

    let (stdout, _, success) = run_canvas(&env.config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Episodes:         5"));
    assert!(stdout.contains("Color links:      7"));
}

#[test]
fn test_ingest_dry_run_writes_nothing() {
    let env = common::setup_test_env();
    run_canvas(&env.config_path, &["init"]);

    let (stdout, _, success) = run_canvas(&env.config_path, &["ingest", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("ingest (dry-run)"));
    assert!(stdout.contains("color rows parsed: 5 (skipped 1)"));

    let (stdout, _, success) = run_canvas(&env.config_path, &["query"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_query_and_or() {
    let env = common::setup_test_env();
    init_and_ingest(&env.config_path);

    let (stdout, _, success) = run_canvas(
        &env.config_path,
        &["query", "--subject", "TREE", "--subject", "MOUNTAIN"],
    );
    assert!(success);
    assert!(stdout.contains("1 episode "));
    assert!(stdout.contains("Mt. McKinley"));
    assert!(!stdout.contains("A Walk in the Woods"));

    let (stdout, _, success) = run_canvas(
        &env.config_path,
        &["query", "--subject", "TREE", "--subject", "MOUNTAIN", "--mode", "OR"],
    );
    assert!(success);
    assert!(stdout.contains("3 episodes"));
    assert!(stdout.contains("A Walk in the Woods"));
    assert!(stdout.contains("Ebony Sunset"));
}

#[test]
fn test_query_json() {
    let env = common::setup_test_env();
    init_and_ingest(&env.config_path);

    let (stdout, _, success) = run_canvas(
        &env.config_path,
        &["query", "--month", "1", "--month", "nope", "--json"],
    );
    assert!(success);
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(body["total_episodes"], 3);
    assert_eq!(body["filters"]["months"], serde_json::json!([1]));
    assert_eq!(body["filters"]["filter_type"], "AND");
    assert_eq!(body["episodes"][0]["air_date"], "1983-01-11");
}

#[test]
fn test_filters_listing() {
    let env = common::setup_test_env();
    init_and_ingest(&env.config_path);

    let (stdout, _, success) = run_canvas(&env.config_path, &["filters", "--json"]);
    assert!(success);
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(body["months"][0]["month_name"], "January");
    assert!(body["colors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["name"] == "Bright Red" && c["hex_code"] == "#DB0000"));
}

#[test]
fn test_missing_config_fails() {
    let env = common::setup_test_env();
    let missing = env.root().join("config/nope.toml");

    let (_, stderr, success) = run_canvas(&missing, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
