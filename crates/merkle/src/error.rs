//! Error type for [`crate::tree`].

use thiserror::Error;

/// Errors raised while building or querying a [`crate::tree::MerkleTree`].
///
/// These are all invariant violations on the caller's side (an empty row set, a row value
/// that doesn't fit the wire encoding, an out-of-range leaf index) — never a verification
/// outcome. Verification outcomes (mismatches) are always a plain `bool`, per the in-band
/// error-channel rule the protocol uses throughout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    /// `build` was called with zero rows; there is no well-defined root for an empty tree.
    #[error("cannot build a Merkle tree over zero rows")]
    EmptyInput,
    /// A row index did not fit in the wire encoding's 4-byte unsigned field.
    #[error("row index {0} does not fit in a 4-byte little-endian unsigned integer")]
    RowIndexOverflow(usize),
    /// A row value did not fit in the wire encoding's 4-byte two's-complement field.
    #[error("row value {0} does not fit in a 4-byte two's-complement integer")]
    ValueOutOfRange(i64),
    /// A leaf index passed to `proof` was outside the tree's row range.
    #[error("leaf index {index} is out of range for a tree with {row_count} rows")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The tree's row count.
        row_count: usize,
    },
}
