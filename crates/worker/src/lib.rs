//! Worker-side execution of the integer GEMM chain and its commitments.
//!
//! A [`WorkerNode`] runs an [`InferenceJob`] end to end: it executes the chain with
//! `vinfer-gemm`, commits each stage's output rows with `vinfer-merkle`, and publishes a
//! `vinfer-core` [`vinfer_core::Receipt`]. Later, [`WorkerNode::respond_challenge`] answers a
//! verifier's audit of a single committed GEMM.

pub mod error;
pub mod node;
pub mod types;

pub use error::WorkerError;
pub use node::WorkerNode;
pub use types::{ChallengeResponse, InferenceJob, InferenceOutput, RowProof};
