//! Shared test helpers for repohub integration tests.
//!
//! All tests use temp directories, no side effects on the real working tree.
//! The session file and any config live inside the temp dir.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// A fresh temp dir with an initialized session.
pub fn setup_session() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    repohub_ok(dir.path(), &["init"]);
    dir
}

/// Run repohub in `dir` as `alice`, isolated from the caller's env.
pub fn repohub_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_repohub"))
        .args(args)
        .current_dir(dir)
        .env("REPOHUB_USER", "alice")
        .env_remove("REPOHUB_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute repohub")
}

/// Run repohub and assert it succeeds. Returns stdout as string.
pub fn repohub_ok(dir: &Path, args: &[&str]) -> String {
    let out = repohub_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "repohub {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run repohub and assert it fails. Returns stderr as string.
pub fn repohub_fails(dir: &Path, args: &[&str]) -> String {
    let out = repohub_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected repohub {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}

/// Run repohub with `--format json` and parse stdout.
pub fn repohub_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full: Vec<&str> = vec!["--format", "json"];
    full.extend_from_slice(args);
    let stdout = repohub_ok(dir, &full);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("repohub {} printed invalid JSON ({e}):\n{stdout}", args.join(" ")))
}
