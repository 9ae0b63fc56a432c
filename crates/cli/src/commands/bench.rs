//! `vinfer bench`: how much cheaper is verifying a GEMM than running it.

use std::time::Instant;

use rand::Rng as _;
use vinfer_randomness::expand_r_vector;
use vinfer_verifier::VerifierNode;
use vinfer_worker::{InferenceJob, WorkerNode};

const VALUE_RANGE: std::ops::RangeInclusive<i64> = -9_i64..=9_i64;

fn random_matrix(rows: usize, cols: usize) -> Vec<Vec<i64>> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen_range(VALUE_RANGE)).collect())
        .collect()
}

/// Builds a single synthetic `rows x inner x cols` GEMM, times running it, then times
/// verifying a full-row Freivalds challenge against it, and prints both along with their
/// ratio.
///
/// # Errors
///
/// Returns an error if the synthetic shapes are inconsistent (never true: `inner`/`cols` are
/// used consistently for both matrices) or if verification itself errors.
#[allow(clippy::print_stdout, reason = "bench prints timing results to stdout")]
pub fn run(rows: usize, inner: usize, cols: usize) -> eyre::Result<()> {
    let job = InferenceJob {
        job_id: "bench-job".to_owned(),
        sku_id: "bench-sku".to_owned(),
        shard_id: "bench-shard".to_owned(),
        input_matrix: random_matrix(rows, inner),
        weights: vec![random_matrix(inner, cols)],
    };

    let mut worker = WorkerNode::new("bench-worker");
    let run_start = Instant::now();
    let (_, receipt) = worker.run_job(&job)?;
    let run_elapsed = run_start.elapsed();

    let r_vector: Vec<i64> = expand_r_vector("bench-seed", cols)
        .into_iter()
        .map(i64::from)
        .collect();
    let row_indices: Vec<usize> = (0..rows).collect();

    let verifier = VerifierNode::new("bench-verifier");
    let input_matrix = worker
        .gemm_input(0, 0)
        .ok_or_else(|| eyre::eyre!("worker never committed the gemm it just ran"))?
        .to_vec();
    let merkle_root = receipt
        .gemm_commitments
        .first()
        .ok_or_else(|| eyre::eyre!("receipt carries no gemm commitments"))?
        .merkle_root
        .clone();

    let response = worker.respond_challenge(0, 0, &r_vector, &row_indices)?;

    let verify_start = Instant::now();
    let result =
        verifier.verify_challenge(&receipt.receipt_id(), &input_matrix, &merkle_root, &response)?;
    let verify_elapsed = verify_start.elapsed();

    println!("shape: {rows}x{inner} * {inner}x{cols}");
    println!("run_job:         {run_elapsed:?}");
    println!("verify_challenge: {verify_elapsed:?} (verdict={})", result.verdict);
    print_ratio(run_elapsed, verify_elapsed);

    Ok(())
}

#[allow(clippy::print_stdout, reason = "bench prints timing results to stdout")]
#[allow(
    clippy::float_arithmetic,
    reason = "reporting-only ratio of two measured durations, not a protocol computation"
)]
fn print_ratio(run_elapsed: std::time::Duration, verify_elapsed: std::time::Duration) {
    let run_secs = run_elapsed.as_secs_f64().max(f64::EPSILON);
    let ratio = verify_elapsed.as_secs_f64() / run_secs;
    println!("verify/run ratio: {ratio:.4}");
}
