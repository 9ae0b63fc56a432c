//! Error type for [`crate::state`].

use thiserror::Error;

/// Errors raised by the ledger's operations.
///
/// Every variant here is an invariant violation: a reference to state the ledger doesn't
/// have, or an attempt to write a slot that's already been written once. None of these are
/// verification outcomes — those are carried in-band on [`vinfer_core::Verification::verdict`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A receipt or challenge referenced a worker pubkey that was never registered.
    #[error("unknown worker {0:?}")]
    UnknownWorker(String),
    /// A receipt referenced a job id that was never created.
    #[error("unknown job {0:?}")]
    UnknownJob(String),
    /// A challenge or verification referenced a receipt id that was never submitted.
    #[error("unknown receipt {0:?}")]
    UnknownReceipt(String),
    /// `assign_challenge` was called twice for the same receipt id.
    #[error("receipt {0:?} already has a challenge assigned")]
    DuplicateChallenge(String),
    /// `submit_verification` was called twice for the same receipt id.
    #[error("receipt {0:?} already has a verification submitted")]
    DuplicateVerification(String),
}
