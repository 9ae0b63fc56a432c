//! Error type for [`crate::kernels`].

use thiserror::Error;

/// Errors raised by the integer GEMM/matvec kernels.
///
/// All of these are shape or range violations on the caller's inputs; a GEMM/matvec that's
/// well-formed never fails, regardless of whether the underlying claim it's checking is true.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GemmError {
    /// The left matrix was empty (zero rows).
    #[error("left matrix has zero rows")]
    EmptyLeftMatrix,
    /// A matmul's inner dimensions didn't agree: left matrix column count vs. right matrix row
    /// count.
    #[error("inner dimension mismatch: left has {left_cols} columns, right has {right_rows} rows")]
    InnerDimensionMismatch {
        /// Column count of the left matrix.
        left_cols: usize,
        /// Row count of the right matrix.
        right_rows: usize,
    },
    /// A matrix's rows were not all the same length.
    #[error("ragged matrix: row {row} has length {actual}, expected {expected}")]
    RaggedMatrix {
        /// Index of the offending row.
        row: usize,
        /// That row's actual length.
        actual: usize,
        /// The length every row was expected to have.
        expected: usize,
    },
    /// A matvec's vector length didn't match the matrix's column count.
    #[error("vector length {vector_len} does not match matrix column count {matrix_cols}")]
    VectorLengthMismatch {
        /// The vector's actual length.
        vector_len: usize,
        /// The matrix's column count.
        matrix_cols: usize,
    },
}
