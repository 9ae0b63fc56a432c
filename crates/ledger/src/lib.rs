//! The coordination ledger: the state machine that ties receipts, challenges, verifications,
//! and reward accounts together.
//!
//! [`Ledger`] exposes the six synchronous operations this protocol needs: worker/job
//! registration, receipt submission, challenge assignment (via `vinfer-randomness`), and
//! verdict submission with atomic settlement (reward or slash). Every operation is a total
//! function of prior state plus arguments — there are no suspension points.

pub mod error;
pub mod state;

pub use error::LedgerError;
pub use state::Ledger;
