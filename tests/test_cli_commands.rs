//! End-to-end tests that run the `crispr-lab` binary.

mod common;

use common::{fixture, spawn_command, stderr, stdout_json};

// ============================================================================
// version / completions
// ============================================================================

#[test]
fn version_prints_name_and_version() {
    let output = spawn_command(&["version"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("crispr-lab "));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_json() {
    let output = spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["name"], "crispr-lab");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn completions_for_bash() {
    let output = spawn_command(&["completions", "bash"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("crispr-lab"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = spawn_command(&["splice"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// traits
// ============================================================================

#[test]
fn traits_lists_builtin_catalog() {
    let output = spawn_command(&["traits", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    let entries = json.as_array().expect("array");
    assert_eq!(entries.len(), 4);

    let drought = entries
        .iter()
        .find(|e| e["id"] == "drought-tolerance")
        .expect("drought-tolerance listed");
    assert_eq!(drought["risk_gate"], "blocked");
    assert_eq!(drought["off_target_risk"], 22);

    let protein = entries
        .iter()
        .find(|e| e["id"] == "protein-production")
        .expect("protein-production listed");
    assert_eq!(protein["risk_gate"], "allowed");
}

#[test]
fn traits_detail_by_id() {
    let output = spawn_command(&["traits", "--id", "bacterial-resistance", "--format", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["id"], "bacterial-resistance");
    assert_eq!(json["success_rate"], 87);
    assert!(json["insertion"].is_string());
}

#[test]
fn traits_unknown_id_suggests() {
    let output = spawn_command(&["traits", "--id", "drought-tolerence"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("drought-tolerance"));
}

#[test]
fn traits_from_custom_config() {
    let config = fixture("lab_custom.yaml");
    let output = spawn_command(&[
        "traits",
        "--config",
        config.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"golden-rice"));
    assert!(ids.contains(&"frost-guard"));
}

// ============================================================================
// quiz
// ============================================================================

#[test]
fn quiz_perfect_score() {
    let output = spawn_command(&["quiz", "--answers", "1,1,2,2,1", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json["correct"], 5);
    assert_eq!(json["total"], 5);
    assert_eq!(json["percent"], 100);
    assert_eq!(json["medal"], "perfect");
    assert_eq!(json["review"].as_array().unwrap().len(), 5);
}

#[test]
fn quiz_partial_score() {
    let output = spawn_command(&["quiz", "--answers", "1,0,2,0,1", "--format", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["correct"], 3);
    assert_eq!(json["percent"], 60);
    assert_eq!(json["medal"], "silver");
}

#[test]
fn quiz_incomplete_answers_fail() {
    let output = spawn_command(&["quiz", "--answers", "1,1"]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn quiz_out_of_range_answer_fails() {
    let output = spawn_command(&["quiz", "--answers", "1,1,2,2,9"]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn quiz_lists_questions_without_answers() {
    let output = spawn_command(&["quiz", "--format", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json.as_array().unwrap().len(), 5);
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_low_risk_trait_reaches_result() {
    let output = spawn_command(&[
        "run",
        "--trait",
        "protein-production",
        "--fast",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json["session"]["stage"], "result");
    assert_eq!(json["session"]["markers"], 0);
    assert!((json["session"]["progress"].as_f64().unwrap() - 100.0).abs() < f64::EPSILON);
    assert_eq!(json["outcome"]["grade"], "successful");
    assert_eq!(json["outcome"]["confidence"], "high");
    assert_eq!(json["cancelled"], false);
    assert!(json.get("risk_prompt").is_none());
}

#[test]
fn run_high_risk_aborts_by_default() {
    let output = spawn_command(&["run", "--trait", "drought-tolerance", "--fast"]);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn run_high_risk_proceeds_when_told() {
    let output = spawn_command(&[
        "run",
        "--trait",
        "nitrogen-fixation",
        "--on-risk",
        "proceed",
        "--fast",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json["session"]["stage"], "result");
    assert_eq!(json["session"]["risk_acknowledged"], true);
    assert_eq!(json["risk_prompt"]["off_target_exceeded"], true);
    assert_eq!(json["risk_prompt"]["mutation_exceeded"], true);
    assert_eq!(json["outcome"]["grade"], "partial_success");
    assert_eq!(json["outcome"]["confidence"], "low");
}

#[test]
fn run_redesign_stops_in_analyze() {
    let output = spawn_command(&[
        "run",
        "--trait",
        "drought-tolerance",
        "--on-risk",
        "redesign",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["session"]["stage"], "analyze");
    assert_eq!(json["session"]["pending_confirmation"], false);
    assert!(json.get("outcome").is_none());
}

#[test]
fn run_unknown_trait_is_session_error() {
    let output = spawn_command(&["run", "--trait", "glow-in-the-dark", "--fast"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn run_is_reproducible_for_a_seed() {
    let args = [
        "run",
        "--trait",
        "bacterial-resistance",
        "--seed",
        "42",
        "--fast",
        "--format",
        "json",
    ];
    let first = stdout_json(&spawn_command(&args));
    let second = stdout_json(&spawn_command(&args));
    assert_eq!(first["markers_emitted"], second["markers_emitted"]);
}

#[test]
fn run_with_mechanism_walkthrough() {
    let output = spawn_command(&[
        "run",
        "--trait",
        "bacterial-resistance",
        "--mechanism",
        "--fast",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["session"]["mechanism_step"], 7);
    assert_eq!(json["session"]["stage"], "result");
}

#[test]
fn run_writes_event_log() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let output = spawn_command(&[
        "run",
        "--trait",
        "protein-production",
        "--fast",
        "--format",
        "json",
        "--events",
        events.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let log = std::fs::read_to_string(&events).unwrap();
    let records: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.first().unwrap()["type"], "SessionStarted");
    assert_eq!(
        records.iter().filter(|r| r["type"] == "EditCompleted").count(),
        1
    );
    assert_eq!(
        records.iter().filter(|r| r["type"] == "PhaseEntered").count(),
        6
    );
    let sequences: Vec<u64> = records.iter().map(|r| r["sequence"].as_u64().unwrap()).collect();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn run_with_custom_config() {
    let config = fixture("lab_custom.yaml");
    let output = spawn_command(&[
        "run",
        "--trait",
        "golden-rice",
        "--config",
        config.to_str().unwrap(),
        "--fast",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json["outcome"]["trait_name"], "Golden Rice");
    assert_eq!(json["outcome"]["insertion"], "PSY-CRTI-CASSETTE");
    assert_eq!(json["outcome"]["confidence"], "medium");
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_accepts_custom_config() {
    let config = fixture("lab_custom.yaml");
    let output = spawn_command(&["validate", config.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json[0]["valid"], true);
}

#[test]
fn validate_reports_every_error() {
    let config = fixture("lab_invalid.yaml");
    let output = spawn_command(&["validate", config.to_str().unwrap(), "--format", "json"]);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json[0]["valid"], false);
    assert!(json[0]["errors"].as_array().unwrap().len() >= 5);
}

#[test]
fn validate_strict_fails_on_warnings() {
    let config = fixture("lab_warnings.yaml");
    let path = config.to_str().unwrap();

    let lenient = spawn_command(&["validate", path]);
    assert!(lenient.status.success(), "stderr: {}", stderr(&lenient));

    let strict = spawn_command(&["validate", path, "--strict"]);
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn validate_malformed_yaml() {
    let config = fixture("lab_malformed.yaml");
    let output = spawn_command(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_keeps_going_after_a_failure() {
    let bad = fixture("lab_invalid.yaml");
    let good = fixture("lab_custom.yaml");
    let output = spawn_command(&[
        "validate",
        bad.to_str().unwrap(),
        good.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[1]["valid"], true);
}
