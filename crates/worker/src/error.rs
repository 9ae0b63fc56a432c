//! Error type for [`crate::node`].

use thiserror::Error;

/// Errors raised while a [`crate::node::WorkerNode`] runs a job or answers a challenge.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A challenge referenced a `(layer, gemm_index)` this worker never ran.
    #[error("no committed GEMM at layer {layer_index}, index {gemm_index}")]
    UnknownGemm {
        /// The requested layer index.
        layer_index: u32,
        /// The requested GEMM index within the layer.
        gemm_index: u32,
    },
    /// A GEMM or matvec kernel rejected the job's matrix shapes.
    #[error(transparent)]
    Gemm(#[from] vinfer_gemm::GemmError),
    /// The output commitment tree rejected a row.
    #[error(transparent)]
    Merkle(#[from] vinfer_merkle::MerkleError),
}
