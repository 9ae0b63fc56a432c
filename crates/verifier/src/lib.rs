//! Verifier-side auditing: Merkle authentication followed by the Freivalds identity check.
//!
//! A [`VerifierNode`] takes a worker's [`vinfer_worker::ChallengeResponse`] and the committed
//! Merkle root it claims to answer, authenticates the sampled rows, then recomputes the
//! Freivalds identity with `vinfer-gemm`'s reduced-accumulation kernel. The outcome is always
//! an in-band [`VerificationResult`]; only malformed trusted inputs (not the worker's
//! response) surface as a [`VerifierError`].

pub mod error;
pub mod node;
pub mod types;

pub use error::VerifierError;
pub use node::VerifierNode;
pub use types::{VerificationReason, VerificationResult};
