//! End-to-end tests for the sigscan binary.
//!
//! Every test passes an explicit `--config` so that configs on the host
//! (XDG, /etc) never leak in.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONFIG: &str = r#"
schema_version = "1.0.0"
description = "toy study"
luminosity_pb = 1000.0

[[samples]]
name = "sig"
title = "Signal"
role = "signal"
cross_section_pb = 1000.0

[[samples]]
name = "bkg"
role = "background"
cross_section_pb = 10.0

[working_points]
tight = ["score > 0.9"]

[sweep]
branch = "score"
cut_values = [0.5, 0.9]
working_point = "tight"
"#;

const SCORES: &str = r#"{
    "kind": "scores",
    "samples": {
        "sig": {
            "events_processed": 10,
            "branches": { "score": [0.95, 0.92, 0.6, 0.3, 0.97] }
        },
        "bkg": {
            "events_processed": 20,
            "branches": { "score": [0.1, 0.2, 0.55, 0.91, 0.3, 0.4, 0.6, 0.7] }
        }
    }
}"#;

const SUMMARY_WITHOUT_CUTS: &str = r#"{
    "kind": "summary",
    "samples": {
        "sig": { "events_processed": 10, "events_selected": 5 },
        "bkg": { "events_processed": 20, "events_selected": 8 }
    }
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("analysis.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("scores.json"), SCORES).unwrap();
        fs::write(dir.path().join("summary.json"), SUMMARY_WITHOUT_CUTS).unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("sigscan");
        cmd.env_remove("SIGSCAN_CONFIG")
            .env_remove("SIGSCAN_CONFIG_DIR")
            .env("SIGSCAN_LOG", "off")
            .arg("--config")
            .arg(self.path("analysis.toml"));
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

// ============================================================================
// Scans
// ============================================================================

#[test]
fn efficiency_json_envelope() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["efficiency", "--input", arg(&fx.path("scores.json"))])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc = stdout_json(&output);
    assert_eq!(doc["schema_version"], "1.0.0");
    assert!(doc["run_id"].as_str().unwrap().starts_with("run-"));
    assert_eq!(doc["command"], "efficiency");
    assert_eq!(doc["config"]["source"], "CLI argument");

    let result = &doc["result"];
    assert_eq!(result["kind"], "efficiency");
    assert_eq!(result["cuts"][0], "(score > 0.5)");
    assert_eq!(result["curves"][0]["sample"], "sig");
    assert_eq!(result["curves"][0]["efficiency"][0], 0.8);
    assert_eq!(result["curves"][0]["efficiency"][1], 0.6);
}

#[test]
fn efficiency_raw_uses_processed_events() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["efficiency", "--raw", "--cut-values", "0.5"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["result"]["denominator"], "processed");
    assert_eq!(doc["result"]["curves"][0]["efficiency"][0], 0.4);
}

#[test]
fn significance_markdown_reports_best_cut() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--format", "md", "significance", "--bf", "1e-3"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Significance vs score cut"))
        .stdout(predicate::str::contains("Best cut: (score > 0.9)"));
}

#[test]
fn significance_yields_table() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["-f", "md", "significance", "--yields"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signal (signal)"))
        .stdout(predicate::str::contains("bkg (background)"));
}

#[test]
fn bf_scan_explicit_grid_and_save() {
    let fx = Fixture::new();
    let saved = fx.path("out.json");
    let output = fx
        .cmd()
        .args(["bf-scan", "--bf-values", "1e-4,1e-3"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .args(["--save", arg(&saved)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc = stdout_json(&output);
    let result = &doc["result"];
    assert_eq!(result["kind"], "branching_fraction");
    assert_eq!(result["cut"], "(score > 0.9)");
    assert_eq!(result["significance"].as_array().unwrap().len(), 2);

    let file: serde_json::Value = serde_json::from_str(&fs::read_to_string(saved).unwrap()).unwrap();
    assert_eq!(file["result"], doc["result"]);
}

#[test]
fn bf_scan_default_grid_has_configured_points() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["bf-scan", "--bf-points", "5"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    let bfs = doc["result"]["branching_fractions"].as_array().unwrap();
    assert_eq!(bfs.len(), 5);
    assert!((bfs[0].as_f64().unwrap() - 1e-7).abs() < 1e-20);
}

#[test]
fn bf_scan_without_grid_flags_uses_config_grid() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .arg("bf-scan")
        .args(["--input", arg(&fx.path("scores.json"))])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    let bfs = doc["result"]["branching_fractions"].as_array().unwrap();
    assert_eq!(bfs.len(), 50);
    assert!((bfs[0].as_f64().unwrap() - 1e-7).abs() < 1e-20);
    assert!((bfs[49].as_f64().unwrap() - 1e-4).abs() < 1e-17);
}

#[test]
fn summary_format_is_one_line() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["-f", "summary", "efficiency"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("efficiency: 2 samples x 2 cuts on score"));
}

// ============================================================================
// Errors and exit codes
// ============================================================================

#[test]
fn invalid_cut_is_args_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["bf-scan", "--cut", "score >> 1"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("\"code\": 14"));
}

#[test]
fn negative_branching_fraction_is_args_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["significance", "--bf=-1"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .assert()
        .code(10);
}

#[test]
fn unknown_branch_is_config_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["-f", "md", "efficiency", "--branch", "EVT_MVA1"])
        .args(["--input", arg(&fx.path("scores.json"))])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("Unknown Cut Branch"));
}

#[test]
fn missing_cut_entry_is_data_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["efficiency", "--input", arg(&fx.path("summary.json"))])
        .assert()
        .code(12)
        .stderr(predicate::str::contains("\"suggested_action\": \"fix_input\""));
}

#[test]
fn missing_input_is_io_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["efficiency", "--input", arg(&fx.path("nope.json"))])
        .assert()
        .code(21);
}

#[test]
fn missing_config_is_args_error() {
    let fx = Fixture::new();
    cargo_bin_cmd!("sigscan")
        .env("SIGSCAN_LOG", "off")
        .args(["--config", arg(&fx.path("absent.toml"))])
        .args(["efficiency", "--input", arg(&fx.path("scores.json"))])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("Config file not found"))
        .stderr(predicate::str::contains("ERR_ARGS"));
}

#[test]
fn check_reports_missing_config_in_checks() {
    let fx = Fixture::new();
    let output = cargo_bin_cmd!("sigscan")
        .env("SIGSCAN_LOG", "off")
        .args(["--config", arg(&fx.path("absent.toml")), "check"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(10));
    assert!(output.stderr.is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Config file not found"), "{}", stdout);
}

#[test]
fn invalid_config_is_config_error() {
    let fx = Fixture::new();
    fs::write(
        fx.path("analysis.toml"),
        CONFIG.replace("role = \"signal\"", "role = \"background\""),
    )
    .unwrap();
    fx.cmd()
        .args(["efficiency", "--input", arg(&fx.path("scores.json"))])
        .assert()
        .code(11);
}

// ============================================================================
// check / version
// ============================================================================

#[test]
fn check_with_input_passes() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["check", "--input", arg(&fx.path("scores.json"))])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["status"], "ok");
    assert_eq!(doc["checks"][1]["cuts"]["tight"], "(score > 0.9)");
    assert_eq!(doc["checks"][2]["kind"], "scores");
}

#[test]
fn check_flags_missing_working_point_counts() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["-f", "summary", "check", "--input", arg(&fx.path("summary.json"))])
        .assert()
        .code(12)
        .stdout(predicate::str::contains("check: FAILED"));
}

#[test]
fn version_json() {
    cargo_bin_cmd!("sigscan")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sigscan_version\""));
}

#[test]
fn invalid_format_rejected() {
    cargo_bin_cmd!("sigscan")
        .args(["--format", "xml", "version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
