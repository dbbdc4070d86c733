use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

#[test]
fn check_no_args() {
    cargo_bin_cmd!("tmplc-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn check_help() {
    cargo_bin_cmd!("tmplc-check")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type-check a JSON fixture"));
}

#[test]
fn check_nonexistent_fixture() {
    cargo_bin_cmd!("tmplc-check")
        .arg("nonexistent.json")
        .assert()
        .failure();
}

#[test]
fn identity_lambda_reports_its_type() {
    cargo_bin_cmd!("tmplc-check")
        .arg(fixture("identity_lambda.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Arrow"));
}

#[test]
fn type_mismatch_fails_with_a_unification_error() {
    cargo_bin_cmd!("tmplc-check")
        .arg(fixture("type_mismatch.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot unify"));
}

#[test]
fn batch_definitions_checked_with_mode_all() {
    cargo_bin_cmd!("tmplc-check")
        .args(["--mode", "all"])
        .arg(fixture("batch_definitions.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("two"));
}

#[test]
fn incremental_batch_resolves_against_known_types() {
    cargo_bin_cmd!("tmplc-check")
        .args(["--mode", "incremental"])
        .arg(fixture("incremental_known.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("three"));
}

#[test]
fn tree_mode_annotates_every_node() {
    cargo_bin_cmd!("tmplc-check")
        .args(["--mode", "tree"])
        .arg(fixture("identity_lambda.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("tree"));
}
