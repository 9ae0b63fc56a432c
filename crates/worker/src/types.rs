//! Worker-local job and response types.
//!
//! None of these are on-ledger records (see `vinfer-core`): they're the in-process payloads a
//! worker produces for a backend or a verifier to consume directly, as this protocol has no
//! network transport of its own.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vinfer_merkle::MerkleProof;

/// A job handed to a worker: an input matrix and a chain of weight matrices to multiply
/// through, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InferenceJob {
    /// Unique job identifier, matching the ledger's [`vinfer_core::Job::job_id`].
    pub job_id: String,
    /// SKU identifier the job runs under.
    pub sku_id: String,
    /// Shard identifier within the job.
    pub shard_id: String,
    /// The chain's input matrix.
    pub input_matrix: Vec<Vec<i64>>,
    /// Weight matrices to apply in order; `output[i] = output[i-1] * weights[i]`.
    pub weights: Vec<Vec<Vec<i64>>>,
}

/// The full result of running an [`InferenceJob`]: the final output matrix and every
/// intermediate GEMM's output, kept so a later challenge can be answered without
/// recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOutput {
    /// The chain's final output matrix.
    pub output_matrix: Vec<Vec<i64>>,
    /// Each GEMM's output matrix, in execution order.
    pub gemm_outputs: Vec<Vec<Vec<i64>>>,
}

/// A single authenticated row: the row's index, its values, and its Merkle proof against the
/// committing GEMM's root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowProof {
    /// The row's index within its GEMM's output.
    pub row_index: usize,
    /// The row's values.
    pub row_values: Vec<i64>,
    /// Sibling path authenticating this row against the GEMM's committed Merkle root.
    pub proof: MerkleProof,
}

/// A worker's answer to a single-GEMM challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    /// The audited GEMM's layer index.
    pub layer_index: u32,
    /// The audited GEMM's index within the layer.
    pub gemm_index: u32,
    /// The Freivalds random vector used for this response.
    pub r_vector: Vec<i64>,
    /// `W · r`, via the reduced-accumulation kernel.
    pub wr_vector: Vec<i64>,
    /// `Y · r`, via the reduced-accumulation kernel.
    pub yr_vector: Vec<i64>,
    /// Authenticated rows for every index the challenge sampled.
    pub row_proofs: Vec<RowProof>,
}
