//! End-to-end tests that drive the built `vinfer` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn demo_honest_run_verifies_true() {
    cargo_bin_cmd!("vinfer")
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict=true"))
        .stdout(predicate::str::contains("reason=ok"));
}

#[test]
fn demo_tampered_merkle_fails_with_reason() {
    cargo_bin_cmd!("vinfer")
        .args(["demo", "--tamper-merkle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict=false"))
        .stdout(predicate::str::contains("reason=merkle_proof_failed"));
}

#[test]
fn demo_tampered_freivalds_fails_with_reason() {
    cargo_bin_cmd!("vinfer")
        .args(["demo", "--tamper-freivalds"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict=false"))
        .stdout(predicate::str::contains("reason=freivalds_mismatch"));
}

#[test]
fn demo_accepts_custom_job_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let job_path = temp.path().join("job.json");
    std::fs::write(
        &job_path,
        r#"{
            "job_id": "custom-job",
            "sku_id": "custom-sku",
            "shard_id": "shard-a",
            "input_matrix": [[1, 2, 3], [4, 5, 6]],
            "weights": [[[1, 0], [0, 1], [1, 1]]]
        }"#,
    )
    .expect("write job file");

    cargo_bin_cmd!("vinfer")
        .args(["demo", "--job-file", job_path.to_str().expect("utf8 path")])
        .assert()
        .success()
        .stdout(predicate::str::contains("job custom-job"))
        .stdout(predicate::str::contains("verdict=true"));
}

#[test]
fn demo_rejects_unreadable_job_file() {
    cargo_bin_cmd!("vinfer")
        .args(["demo", "--job-file", "/nonexistent/job.json"])
        .assert()
        .failure();
}

#[test]
fn bench_reports_both_timings() {
    cargo_bin_cmd!("vinfer")
        .args(["bench", "--rows", "4", "--inner", "4", "--cols", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run_job:"))
        .stdout(predicate::str::contains("verify_challenge:"))
        .stdout(predicate::str::contains("verdict=true"));
}

#[test]
fn schema_prints_every_record_type() {
    cargo_bin_cmd!("vinfer")
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Worker"))
        .stdout(predicate::str::contains("# Job"))
        .stdout(predicate::str::contains("# Receipt"))
        .stdout(predicate::str::contains("# Challenge"))
        .stdout(predicate::str::contains("# Verification"))
        .stdout(predicate::str::contains("# InferenceJob"));
}
