//! Shared record types for the verifiable-inference protocol.

/// On-ledger record types: workers, jobs, receipts, challenges, verifications, accounts.
pub mod types;

pub use types::{
    Challenge, GemmCommitment, GemmCoordinate, Job, Receipt, RewardAccount, Verification, Worker,
};
