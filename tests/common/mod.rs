//! Shared integration-test helpers for running the `crispr-lab` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Runs the binary to completion with `args` and returns its output.
///
/// Environment overrides that would change command behavior are cleared.
pub fn spawn_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crispr-lab"))
        .args(args)
        .env_remove("CRISPR_LAB_CONFIG")
        .env_remove("CRISPR_LAB_SEED")
        .env_remove("CRISPR_LAB_LOG_LEVEL")
        .env_remove("CRISPR_LAB_METRICS_PORT")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run crispr-lab")
}

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Parses stdout as a single JSON document.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"))
}

/// Stderr as a string, for assertion messages.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
