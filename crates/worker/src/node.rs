//! The worker role: runs a GEMM chain, commits it, and answers challenges against it.

use std::collections::HashMap;

use tracing::instrument;
use vinfer_core::{GemmCommitment, Receipt};
use vinfer_gemm::{FREIVALDS_MODULUS, matmul, matvec_mod_p};
use vinfer_merkle::MerkleTree;

use crate::error::WorkerError;
use crate::types::{ChallengeResponse, InferenceJob, InferenceOutput, RowProof};

/// Everything a worker keeps for one committed GEMM, so a later challenge can be answered
/// without recomputing the chain.
struct GemmState {
    input: Vec<Vec<i64>>,
    weights: Vec<Vec<i64>>,
    output: Vec<Vec<i64>>,
    tree: MerkleTree,
}

/// A worker node: runs jobs, publishes receipts, and answers the verifier's challenges.
pub struct WorkerNode {
    pubkey: String,
    gemms: HashMap<(u32, u32), GemmState>,
}

impl WorkerNode {
    /// Creates a worker identified by `pubkey`.
    #[must_use]
    pub fn new(pubkey: impl Into<String>) -> Self {
        Self {
            pubkey: pubkey.into(),
            gemms: HashMap::new(),
        }
    }

    /// This worker's public key.
    #[must_use]
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    /// Runs `job`'s GEMM chain, committing each stage's output into a Merkle tree, and
    /// produces the [`Receipt`] a verifier will later challenge.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Gemm`] if any stage's matrix shapes are inconsistent, or
    /// [`WorkerError::Merkle`] if an output row can't be committed (values out of `i32` range).
    #[instrument(skip(self, job), fields(worker = %self.pubkey, job_id = %job.job_id))]
    pub fn run_job(&mut self, job: &InferenceJob) -> Result<(InferenceOutput, Receipt), WorkerError> {
        let mut current = job.input_matrix.clone();
        let mut gemm_outputs = Vec::with_capacity(job.weights.len());
        let mut commitments = Vec::with_capacity(job.weights.len());

        for (idx, weights) in job.weights.iter().enumerate() {
            let output = matmul(&current, weights)?;
            let tree = MerkleTree::build(&output)?;
            let gemm_index = u32::try_from(idx).unwrap_or(u32::MAX);
            commitments.push(GemmCommitment {
                layer_index: 0,
                gemm_index,
                merkle_root: tree.root_hex(),
            });
            self.gemms.insert(
                (0, gemm_index),
                GemmState {
                    input: current.clone(),
                    weights: weights.clone(),
                    output: output.clone(),
                    tree,
                },
            );
            gemm_outputs.push(output.clone());
            current = output;
        }

        let output_matrix = current;
        let output_tree = MerkleTree::build(&output_matrix)?;
        let receipt = Receipt {
            worker_pubkey: self.pubkey.clone(),
            job_id: job.job_id.clone(),
            shard_id: job.shard_id.clone(),
            sku_id: job.sku_id.clone(),
            output_root: output_tree.root_hex(),
            gemm_commitments: commitments,
        };

        Ok((
            InferenceOutput {
                output_matrix,
                gemm_outputs,
            },
            receipt,
        ))
    }

    /// The matrix that was fed into the committed GEMM at `(layer_index, gemm_index)` — the
    /// job's input for GEMM 0, or the previous GEMM's output otherwise. A verifier needs this
    /// to recompute `X · wr` independently of the worker.
    #[must_use]
    pub fn gemm_input(&self, layer_index: u32, gemm_index: u32) -> Option<&[Vec<i64>]> {
        self.gemms
            .get(&(layer_index, gemm_index))
            .map(|state| state.input.as_slice())
    }

    /// The column count of the weight matrix committed at `(layer_index, gemm_index)` — the
    /// required length of the Freivalds random vector `r` for that GEMM.
    #[must_use]
    pub fn gemm_weight_cols(&self, layer_index: u32, gemm_index: u32) -> Option<usize> {
        self.gemms
            .get(&(layer_index, gemm_index))
            .and_then(|state| state.weights.first().map(Vec::len))
    }

    /// Answers a challenge against a previously committed GEMM.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::UnknownGemm`] if this worker never committed a GEMM at
    /// `(layer_index, gemm_index)`, or a kernel/Merkle error if the stored state is malformed.
    #[instrument(skip(self, r_vector, row_indices), fields(worker = %self.pubkey))]
    pub fn respond_challenge(
        &self,
        layer_index: u32,
        gemm_index: u32,
        r_vector: &[i64],
        row_indices: &[usize],
    ) -> Result<ChallengeResponse, WorkerError> {
        let state =
            self.gemms
                .get(&(layer_index, gemm_index))
                .ok_or(WorkerError::UnknownGemm {
                    layer_index,
                    gemm_index,
                })?;

        let wr_vector = matvec_mod_p(&state.weights, r_vector, FREIVALDS_MODULUS)?;
        let yr_vector = matvec_mod_p(&state.output, r_vector, FREIVALDS_MODULUS)?;

        let mut row_proofs = Vec::with_capacity(row_indices.len());
        for &row_index in row_indices {
            let row_values = state
                .output
                .get(row_index)
                .ok_or_else(|| WorkerError::UnknownGemm {
                    layer_index,
                    gemm_index,
                })?
                .clone();
            let proof = state.tree.proof(row_index)?;
            row_proofs.push(RowProof {
                row_index,
                row_values,
                proof,
            });
        }

        Ok(ChallengeResponse {
            layer_index,
            gemm_index,
            r_vector: r_vector.to_vec(),
            wr_vector,
            yr_vector,
            row_proofs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::WorkerNode;
    use crate::types::InferenceJob;

    fn sample_job() -> InferenceJob {
        InferenceJob {
            job_id: "job-1".to_owned(),
            sku_id: "sku-1".to_owned(),
            shard_id: "shard-1".to_owned(),
            input_matrix: vec![vec![1, 2], vec![3, 4]],
            weights: vec![vec![vec![1, 0, 2], vec![0, 1, 1]]],
        }
    }

    #[test]
    fn run_job_commits_every_stage() {
        let mut worker = WorkerNode::new("worker-1");
        let (output, receipt) = worker.run_job(&sample_job()).expect("well-formed job");
        assert_eq!(output.output_matrix, vec![vec![1, 2, 4], vec![3, 4, 10]]);
        assert_eq!(receipt.gemm_commitments.len(), 1);
        assert_eq!(receipt.worker_pubkey, "worker-1");
    }

    #[test]
    fn respond_challenge_matches_freivalds_s1() {
        let mut worker = WorkerNode::new("worker-1");
        worker.run_job(&sample_job()).expect("well-formed job");

        let response = worker
            .respond_challenge(0, 0, &[1, 1, 1], &[0, 1])
            .expect("committed gemm exists");
        assert_eq!(response.wr_vector, vec![3, 2]);
        assert_eq!(response.yr_vector, vec![7, 17]);
        assert_eq!(response.row_proofs.len(), 2);
    }

    #[test]
    fn respond_challenge_rejects_unknown_gemm() {
        let worker = WorkerNode::new("worker-1");
        assert!(worker.respond_challenge(0, 9, &[1], &[0]).is_err());
    }
}
