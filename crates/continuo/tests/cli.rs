//! End-to-end tests of the continuo binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("chorale_opening.musicxml")
}

#[test]
fn writes_completed_score() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("completed.musicxml");

    Command::cargo_bin("continuo")
        .unwrap()
        .arg(fixture_path())
        .arg("--output")
        .arg(&output)
        .arg("--seed")
        .arg("7")
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let completed = fs::read_to_string(&output).unwrap();
    assert!(!completed.contains("<rest/>"));
    assert!(completed.contains("<harmony placement=\"below\">"));
    assert!(completed.contains("<work-title>Chorale Opening</work-title>"));
}

#[test]
fn prints_json_harmonization() {
    Command::cargo_bin("continuo")
        .unwrap()
        .arg(fixture_path())
        .arg("--json")
        .arg("--seed")
        .arg("7")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bass_line\""))
        .stdout(predicate::str::contains("\"chords\""));
}

#[test]
fn same_seed_same_output() {
    let run = || {
        Command::cargo_bin("continuo")
            .unwrap()
            .arg(fixture_path())
            .arg("--json")
            .arg("--seed")
            .arg("42")
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn fails_on_missing_score() {
    Command::cargo_bin("continuo")
        .unwrap()
        .arg("no_such_score.musicxml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn reads_seed_from_environment() {
    let by_flag = Command::cargo_bin("continuo")
        .unwrap()
        .arg(fixture_path())
        .arg("--json")
        .arg("--seed")
        .arg("9")
        .output()
        .unwrap();
    let by_env = Command::cargo_bin("continuo")
        .unwrap()
        .env("CONTINUO_SEED", "9")
        .arg(fixture_path())
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(by_flag.stdout, by_env.stdout);
}
