//! Error type for [`crate::node`].

use thiserror::Error;

/// Errors raised while a [`crate::node::VerifierNode`] processes a challenge response.
///
/// These are shape/encoding problems with the inputs handed to the verifier, not verification
/// outcomes — a shape-consistent response always produces a [`crate::VerificationResult`],
/// whether or not the underlying claim holds.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// A kernel rejected the response's matrix/vector shapes.
    #[error(transparent)]
    Gemm(#[from] vinfer_gemm::GemmError),
    /// The committed Merkle root wasn't valid hex, or wasn't 32 bytes.
    #[error("merkle root {0:?} is not a 32-byte hex string")]
    MalformedMerkleRoot(String),
}
