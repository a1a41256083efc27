//! CLI integration tests.
//!
//! Tests exercise the built binary and skip quietly when it has not been
//! built yet (e.g. `cargo test --lib` workflows).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get the path to the built binary.
fn binary_path() -> PathBuf {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let release_path = base.join("target/release/modorder");
    let debug_path = base.join("target/debug/modorder");

    if release_path.exists() {
        release_path
    } else {
        debug_path
    }
}

fn require_binary() -> bool {
    let exists = binary_path().exists();
    if !exists {
        eprintln!("Skipping CLI test: binary not found");
    }
    exists
}

fn run_cli(args: &[&str]) -> Option<Output> {
    Command::new(binary_path()).args(args).output().ok()
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn clean_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "base.py", "_name = 'm.base'\n");
    write(
        tmp.path(),
        "child.py",
        "_name = 'm.child'\n_inherit = 'm.base'\n",
    );
    tmp
}

fn cyclic_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "x.py", "_name = 'm.x'\n_inherit = 'm.y'\n");
    write(tmp.path(), "y.py", "_name = 'm.y'\n_inherit = 'm.x'\n");
    tmp
}

#[test]
fn test_resolve_prints_order() {
    if !require_binary() {
        return;
    }
    let tmp = clean_fixture();

    let out = run_cli(&["resolve", "--source-dir", tmp.path().to_str().unwrap()]).unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout
        .lines()
        .filter(|l| !l.starts_with('#'))
        .collect();
    assert_eq!(lines, vec!["base", "child"]);
}

#[test]
fn test_cycles_warn_but_exit_zero_by_default() {
    if !require_binary() {
        return;
    }
    let tmp = cyclic_fixture();

    let out = run_cli(&["resolve", "--source-dir", tmp.path().to_str().unwrap()]).unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("dependency cycle"));
}

#[test]
fn test_strict_mode_fails_on_cycles() {
    if !require_binary() {
        return;
    }
    let tmp = cyclic_fixture();

    let out = run_cli(&[
        "resolve",
        "--source-dir",
        tmp.path().to_str().unwrap(),
        "--strict",
    ])
    .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_print_cycles_is_diagnostic_only() {
    if !require_binary() {
        return;
    }
    let tmp = cyclic_fixture();

    let out = run_cli(&[
        "resolve",
        "--print-cycles",
        "--source-dir",
        tmp.path().to_str().unwrap(),
    ])
    .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("1 cycles"));
    assert!(stdout.contains("x -> y -> x"));
}

#[test]
fn test_pin_flag_moves_node_to_front() {
    if !require_binary() {
        return;
    }
    let tmp = clean_fixture();

    let out = run_cli(&[
        "resolve",
        "--source-dir",
        tmp.path().to_str().unwrap(),
        "--pin",
        "child",
    ])
    .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout
        .lines()
        .filter(|l| !l.starts_with('#'))
        .collect();
    assert_eq!(lines, vec!["child", "base"]);
}

#[test]
fn test_missing_source_dir_is_a_hard_error() {
    if !require_binary() {
        return;
    }
    let out = run_cli(&["resolve", "--source-dir", "/definitely/not/here"]).unwrap();
    assert!(!out.status.success());
}

#[test]
fn test_json_format_emits_full_result() {
    if !require_binary() {
        return;
    }
    let tmp = clean_fixture();

    let out = run_cli(&[
        "resolve",
        "--source-dir",
        tmp.path().to_str().unwrap(),
        "--format",
        "json",
    ])
    .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["order"][0], "base");
    assert_eq!(value["partial"], false);
}
