//! The verifier role: Merkle authentication followed by the Freivalds identity check.

use tracing::{instrument, warn};
use vinfer_core::{GemmCoordinate, Verification};
use vinfer_gemm::{FREIVALDS_MODULUS, matvec_mod_p};
use vinfer_merkle::verify as verify_merkle_proof;
use vinfer_worker::ChallengeResponse;

use crate::error::VerifierError;
use crate::types::{VerificationReason, VerificationResult};

/// A verifier node: audits a worker's challenge response against a committed Merkle root.
pub struct VerifierNode {
    pubkey: String,
}

impl VerifierNode {
    /// Creates a verifier identified by `pubkey`.
    #[must_use]
    pub fn new(pubkey: impl Into<String>) -> Self {
        Self {
            pubkey: pubkey.into(),
        }
    }

    /// This verifier's public key.
    #[must_use]
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    /// Audits `response` against `input_matrix` and the committed `merkle_root_hex`.
    ///
    /// Stage 1 authenticates every row in `response.row_proofs` against the root; stage 2
    /// recomputes `X · (W · r)` and compares it element-wise to `Y · r`. Either stage failing
    /// produces a `false` verdict with the corresponding reason, never an error — only a
    /// malformed *trusted* input (the root itself, or the shapes the worker's response implies
    /// against `input_matrix`) is an error.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::MalformedMerkleRoot`] if `merkle_root_hex` isn't valid 32-byte
    /// hex, or [`VerifierError::Gemm`] if `input_matrix`'s shape is inconsistent with
    /// `response.wr_vector`.
    #[instrument(skip(self, input_matrix, response), fields(verifier = %self.pubkey))]
    pub fn verify_challenge(
        &self,
        receipt_id: &str,
        input_matrix: &[Vec<i64>],
        merkle_root_hex: &str,
        response: &ChallengeResponse,
    ) -> Result<VerificationResult, VerifierError> {
        let root = decode_root(merkle_root_hex)?;

        for row_proof in &response.row_proofs {
            let authenticated = verify_merkle_proof(
                row_proof.row_index,
                &row_proof.row_values,
                &row_proof.proof,
                root,
            );
            if !authenticated {
                warn!(receipt_id, reason = "merkle_proof_failed", "verification failed");
                return Ok(self.result(receipt_id, false, VerificationReason::MerkleProofFailed));
            }
        }

        let x_wr = matvec_mod_p(input_matrix, &response.wr_vector, FREIVALDS_MODULUS)?;
        let matches = x_wr.len() == response.yr_vector.len()
            && x_wr.iter().zip(&response.yr_vector).all(|(a, b)| a == b);
        if !matches {
            warn!(receipt_id, reason = "freivalds_mismatch", "verification failed");
            return Ok(self.result(receipt_id, false, VerificationReason::FreivaldsMismatch));
        }

        Ok(self.result(receipt_id, true, VerificationReason::Ok))
    }

    fn result(
        &self,
        receipt_id: &str,
        verdict: bool,
        reason: VerificationReason,
    ) -> VerificationResult {
        VerificationResult {
            receipt_id: receipt_id.to_owned(),
            verdict,
            reason,
        }
    }

    /// Builds the on-ledger [`Verification`] record for a completed audit.
    #[must_use]
    pub fn build_verification(
        &self,
        receipt_id: &str,
        gemm_indices: Vec<GemmCoordinate>,
        random_vectors: Vec<String>,
        verdict: bool,
    ) -> Verification {
        Verification {
            receipt_id: receipt_id.to_owned(),
            verifier_pubkey: self.pubkey.clone(),
            gemm_indices,
            random_vectors,
            verdict,
        }
    }
}

fn decode_root(merkle_root_hex: &str) -> Result<[u8; 32], VerifierError> {
    let bytes = hex::decode(merkle_root_hex)
        .map_err(|_| VerifierError::MalformedMerkleRoot(merkle_root_hex.to_owned()))?;
    <[u8; 32]>::try_from(bytes)
        .map_err(|_| VerifierError::MalformedMerkleRoot(merkle_root_hex.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::VerifierNode;
    use vinfer_worker::{InferenceJob, WorkerNode};

    fn run_s1() -> (WorkerNode, vinfer_core::Receipt, Vec<Vec<i64>>) {
        let mut worker = WorkerNode::new("worker-1");
        let job = InferenceJob {
            job_id: "job-1".to_owned(),
            sku_id: "sku-1".to_owned(),
            shard_id: "shard-1".to_owned(),
            input_matrix: vec![vec![1, 2], vec![3, 4]],
            weights: vec![vec![vec![1, 0, 2], vec![0, 1, 1]]],
        };
        let (_, receipt) = worker.run_job(&job).expect("well-formed job");
        (worker, receipt, job.input_matrix)
    }

    #[test]
    fn s1_honest_response_verifies_true() {
        let (worker, receipt, input_matrix) = run_s1();
        let response = worker
            .respond_challenge(0, 0, &[1, 1, 1], &[0, 1])
            .expect("gemm committed");
        let verifier = VerifierNode::new("verifier-1");
        let merkle_root = &receipt
            .gemm_commitments
            .first()
            .expect("one gemm committed")
            .merkle_root;
        let result = verifier
            .verify_challenge(&receipt.receipt_id(), &input_matrix, merkle_root, &response)
            .expect("well-formed inputs");
        assert!(result.verdict);
        assert_eq!(result.reason.as_str(), "ok");
    }

    #[test]
    fn s2_tampered_row_value_fails_merkle() {
        let (worker, receipt, input_matrix) = run_s1();
        let mut response = worker
            .respond_challenge(0, 0, &[1, 1, 1], &[0, 1])
            .expect("gemm committed");
        if let Some(first) = response.row_proofs.first_mut() {
            if let Some(value) = first.row_values.first_mut() {
                *value = value.wrapping_add(1);
            }
        }
        let verifier = VerifierNode::new("verifier-1");
        let merkle_root = &receipt
            .gemm_commitments
            .first()
            .expect("one gemm committed")
            .merkle_root;
        let result = verifier
            .verify_challenge(&receipt.receipt_id(), &input_matrix, merkle_root, &response)
            .expect("well-formed inputs");
        assert!(!result.verdict);
        assert_eq!(result.reason.as_str(), "merkle_proof_failed");
    }

    #[test]
    fn s3_tampered_yr_vector_fails_freivalds_without_touching_rows() {
        let (worker, receipt, input_matrix) = run_s1();
        let mut response = worker
            .respond_challenge(0, 0, &[1, 1, 1], &[0, 1])
            .expect("gemm committed");
        if let Some(value) = response.yr_vector.get_mut(1) {
            *value = value.wrapping_add(1);
        }
        let verifier = VerifierNode::new("verifier-1");
        let merkle_root = &receipt
            .gemm_commitments
            .first()
            .expect("one gemm committed")
            .merkle_root;
        let result = verifier
            .verify_challenge(&receipt.receipt_id(), &input_matrix, merkle_root, &response)
            .expect("well-formed inputs");
        assert!(!result.verdict);
        assert_eq!(result.reason.as_str(), "freivalds_mismatch");
    }
}
