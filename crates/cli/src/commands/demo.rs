//! `vinfer demo`: registration through settlement, in one process.

use std::path::PathBuf;

use eyre::WrapErr as _;
use vinfer_core::Job;
use vinfer_ledger::Ledger;
use vinfer_randomness::expand_r_vector;
use vinfer_verifier::VerifierNode;
use vinfer_worker::{InferenceJob, WorkerNode};

const WORKER_PUBKEY: &str = "worker-1";
const VERIFIER_PUBKEY: &str = "verifier-1";

fn default_job() -> InferenceJob {
    InferenceJob {
        job_id: "job-1".to_owned(),
        sku_id: "llama3-8b-int8-batch-v1".to_owned(),
        shard_id: "shard-1".to_owned(),
        input_matrix: vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8]],
        weights: vec![
            vec![vec![1, 0, 2], vec![0, 1, 1]],
            vec![vec![2, 1], vec![1, 0], vec![0, 1]],
        ],
    }
}

fn load_job(job_file: Option<PathBuf>) -> eyre::Result<InferenceJob> {
    let Some(path) = job_file else {
        return Ok(default_job());
    };
    let contents = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("reading job file {}", path.display()))?;
    serde_json::from_str(&contents)
        .wrap_err_with(|| format!("parsing job file {}", path.display()))
}

/// Runs the full scenario: register a worker, create and run a job, submit its receipt,
/// assign a challenge, answer and verify it, then settle and print the outcome.
///
/// # Errors
///
/// Returns an error if `job_file` can't be read or doesn't parse as an `InferenceJob`, if the
/// job's GEMM chain has inconsistent shapes, or if the ledger rejects any step (none of which
/// happen on the built-in scenario).
#[allow(clippy::print_stdout, reason = "demo prints its scenario outcome to stdout")]
pub fn run(
    rounds: usize,
    sample_count: usize,
    stake: u64,
    job_file: Option<PathBuf>,
    tamper_merkle: bool,
    tamper_freivalds: bool,
) -> eyre::Result<()> {
    let job = load_job(job_file)?;

    let mut ledger = Ledger::new();
    let mut worker = WorkerNode::new(WORKER_PUBKEY);
    let verifier = VerifierNode::new(VERIFIER_PUBKEY);

    ledger.register_worker(WORKER_PUBKEY, stake, vec![job.sku_id.clone()]);
    ledger.create_job(Job {
        job_id: job.job_id.clone(),
        sku_id: job.sku_id.clone(),
        input_root: "input-root".to_owned(),
        shard_size: 4,
        payment: 10,
    });

    let (_, receipt) = worker.run_job(&job)?;
    let receipt_id = ledger.submit_receipt(receipt.clone())?;
    println!("receipt {receipt_id} submitted for job {}", job.job_id);

    let challenge =
        ledger.assign_challenge(&receipt_id, verifier.pubkey(), rounds, sample_count)?;
    let coordinate = *challenge
        .gemm_indices
        .first()
        .ok_or_else(|| eyre::eyre!("challenge sampled no GEMM coordinates"))?;
    let digest = challenge
        .random_vectors
        .first()
        .ok_or_else(|| eyre::eyre!("challenge derived no random vectors"))?;

    let weight_cols = worker
        .gemm_weight_cols(coordinate.layer, coordinate.gemm_index)
        .ok_or_else(|| eyre::eyre!("worker never committed gemm {coordinate:?}"))?;
    let r_vector: Vec<i64> = expand_r_vector(digest, weight_cols)
        .into_iter()
        .map(i64::from)
        .collect();

    let input_matrix = worker
        .gemm_input(coordinate.layer, coordinate.gemm_index)
        .ok_or_else(|| eyre::eyre!("worker never committed gemm {coordinate:?}"))?
        .to_vec();
    let row_indices: Vec<usize> = (0..input_matrix.len()).collect();

    let mut response = worker.respond_challenge(
        coordinate.layer,
        coordinate.gemm_index,
        &r_vector,
        &row_indices,
    )?;

    if tamper_merkle {
        if let Some(first) = response.row_proofs.first_mut() {
            if let Some(value) = first.row_values.first_mut() {
                *value = value.wrapping_add(1);
            }
        }
    }
    if tamper_freivalds {
        if let Some(value) = response.yr_vector.first_mut() {
            *value = value.wrapping_add(1);
        }
    }

    let merkle_root = receipt
        .gemm_commitments
        .iter()
        .find(|c| c.coordinate() == coordinate)
        .map(|c| c.merkle_root.clone())
        .ok_or_else(|| eyre::eyre!("receipt missing commitment for {coordinate:?}"))?;

    let result = verifier.verify_challenge(&receipt_id, &input_matrix, &merkle_root, &response)?;
    println!("verification: verdict={} reason={}", result.verdict, result.reason);

    let verification = verifier.build_verification(
        &receipt_id,
        challenge.gemm_indices.clone(),
        challenge.random_vectors.clone(),
        result.verdict,
    );
    ledger.submit_verification(verification)?;

    if let (Some(account), Some(record)) = (
        ledger.reward_account(WORKER_PUBKEY),
        ledger.worker(WORKER_PUBKEY),
    ) {
        println!(
            "worker {WORKER_PUBKEY}: stake={} reputation={} credits={} balance={}",
            record.stake, record.reputation_score, account.credits, account.balance
        );
    }

    Ok(())
}
