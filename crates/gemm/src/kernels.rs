//! Integer matrix kernels shared by workers and verifiers.
//!
//! [`matmul`] and [`matvec`] are the plain int32-range kernel used to run the actual GEMM
//! chain. [`matvec_mod_p`] is the same dot-product shape but accumulates in a widening
//! (128-bit) intermediate with reduction modulo a prime at every step — required whenever the
//! vector operand is a Freivalds random vector, whose entries are drawn from the full 32-bit
//! unsigned domain and would otherwise risk overflowing a 64-bit accumulator.

use crate::error::GemmError;

/// The Freivalds check's working modulus, `2⁶¹ − 1` (a Mersenne prime).
pub const FREIVALDS_MODULUS: i128 = (1_i128 << 61) - 1;

fn check_rectangular(matrix: &[Vec<i64>]) -> Result<usize, GemmError> {
    let first_len = matrix.first().map_or(0, Vec::len);
    for (row, values) in matrix.iter().enumerate() {
        if values.len() != first_len {
            return Err(GemmError::RaggedMatrix {
                row,
                actual: values.len(),
                expected: first_len,
            });
        }
    }
    Ok(first_len)
}

/// Computes `a · b` over signed 64-bit integers.
///
/// # Errors
///
/// Returns [`GemmError::EmptyLeftMatrix`] if `a` has no rows, [`GemmError::RaggedMatrix`] if
/// `a` or `b` is not rectangular, or [`GemmError::InnerDimensionMismatch`] if `a`'s column
/// count doesn't match `b`'s row count.
#[allow(
    clippy::arithmetic_side_effects,
    reason = "per spec, 64-bit accumulators are safe for i32 operands over inner dimensions up to 2^32"
)]
pub fn matmul(a: &[Vec<i64>], b: &[Vec<i64>]) -> Result<Vec<Vec<i64>>, GemmError> {
    if a.is_empty() {
        return Err(GemmError::EmptyLeftMatrix);
    }
    let inner = check_rectangular(a)?;
    let right_rows = b.len();
    if inner != right_rows {
        return Err(GemmError::InnerDimensionMismatch {
            left_cols: inner,
            right_rows,
        });
    }
    let cols = check_rectangular(b)?;

    let mut result = vec![vec![0_i64; cols]; a.len()];
    for (i, row) in a.iter().enumerate() {
        for (k, &a_ik) in row.iter().enumerate() {
            let Some(b_row) = b.get(k) else { continue };
            let Some(out_row) = result.get_mut(i) else {
                continue;
            };
            for (out_cell, &b_kj) in out_row.iter_mut().zip(b_row) {
                *out_cell += a_ik * b_kj;
            }
        }
    }
    Ok(result)
}

/// Computes `matrix · vector` over signed 64-bit integers.
///
/// # Errors
///
/// Returns [`GemmError::RaggedMatrix`] if `matrix` is not rectangular, or
/// [`GemmError::VectorLengthMismatch`] if `vector`'s length doesn't match `matrix`'s column
/// count.
#[allow(
    clippy::arithmetic_side_effects,
    reason = "per spec, 64-bit accumulators are safe for i32 operands over inner dimensions up to 2^32"
)]
pub fn matvec(matrix: &[Vec<i64>], vector: &[i64]) -> Result<Vec<i64>, GemmError> {
    let cols = check_rectangular(matrix)?;
    if vector.len() != cols {
        return Err(GemmError::VectorLengthMismatch {
            vector_len: vector.len(),
            matrix_cols: cols,
        });
    }

    Ok(matrix
        .iter()
        .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum())
        .collect())
}

/// Computes `matrix · vector mod modulus`, reducing the accumulator at every step.
///
/// Use this instead of [`matvec`] whenever `vector` is (or was derived from) a Freivalds
/// random vector: its entries span the full unsigned 32-bit domain, wide enough that a plain
/// 64-bit accumulator could overflow before the final reduction. Both the worker's `W · r` and
/// the verifier's `Y · r` and `X · (W · r)` go through this routine so the two sides reduce
/// identically at every step, not just at the final comparison.
///
/// # Errors
///
/// Returns [`GemmError::RaggedMatrix`] if `matrix` is not rectangular, or
/// [`GemmError::VectorLengthMismatch`] if `vector`'s length doesn't match `matrix`'s column
/// count.
#[allow(
    clippy::arithmetic_side_effects,
    reason = "accumulator is i128 and reduced modulo `modulus` after every term, never overflowing"
)]
pub fn matvec_mod_p(
    matrix: &[Vec<i64>],
    vector: &[i64],
    modulus: i128,
) -> Result<Vec<i64>, GemmError> {
    let cols = check_rectangular(matrix)?;
    if vector.len() != cols {
        return Err(GemmError::VectorLengthMismatch {
            vector_len: vector.len(),
            matrix_cols: cols,
        });
    }

    Ok(matrix
        .iter()
        .map(|row| {
            let mut acc: i128 = 0;
            for (&a, &b) in row.iter().zip(vector) {
                acc = (acc + i128::from(a) * i128::from(b)).rem_euclid(modulus);
            }
            mod_reduce(acc, modulus)
        })
        .collect())
}

/// Reduces `value` into `0..modulus`, as a value that fits back into `i64`.
///
/// `modulus` is expected to be small enough (the Freivalds modulus is `2⁶¹ − 1`) that the
/// reduced result always fits in 64 bits; this is an invariant of the caller's modulus choice,
/// not separately checked here.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    clippy::as_conversions,
    reason = "modulus is bounded by 2^61 - 1, so the reduced result always fits in i64"
)]
pub fn mod_reduce(value: i128, modulus: i128) -> i64 {
    value.rem_euclid(modulus) as i64
}
