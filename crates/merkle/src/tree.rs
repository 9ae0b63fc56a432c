//! Merkle tree over integer matrix rows.
//!
//! See the crate-level docs for the wire-format invariants this module implements exactly:
//! little-endian leaf encoding, pairwise SHA-256 internal nodes, and last-sibling duplication
//! on odd-cardinality levels.

use sha2::{Digest as _, Sha256};

use crate::error::MerkleError;

/// A single sibling path from a leaf up to (but excluding) the root.
pub type MerkleProof = Vec<[u8; 32]>;

/// Serializes row `row_index` with values `row_values` into the normative leaf preimage:
/// `row_index:u32_le ∥ value_0:i32_le ∥ value_1:i32_le ∥ …`.
///
/// # Errors
///
/// Returns [`MerkleError::RowIndexOverflow`] if `row_index` doesn't fit a `u32`, or
/// [`MerkleError::ValueOutOfRange`] if any value doesn't fit a signed 32-bit two's-complement
/// word.
pub fn serialize_row(row_index: usize, row_values: &[i64]) -> Result<Vec<u8>, MerkleError> {
    let index_u32 =
        u32::try_from(row_index).map_err(|_| MerkleError::RowIndexOverflow(row_index))?;
    let mut buf = Vec::with_capacity(4 + row_values.len() * 4);
    buf.extend_from_slice(&index_u32.to_le_bytes());
    for &value in row_values {
        let value_i32 = i32::try_from(value).map_err(|_| MerkleError::ValueOutOfRange(value))?;
        buf.extend_from_slice(&value_i32.to_le_bytes());
    }
    Ok(buf)
}

fn hash_leaf(row_index: usize, row_values: &[i64]) -> Result<[u8; 32], MerkleError> {
    let preimage = serialize_row(row_index, row_values)?;
    Ok(Sha256::digest(preimage).into())
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// A Merkle tree built over a fixed sequence of integer matrix rows.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    row_count: usize,
    /// Level 0 is the leaves; the last level is the single root node.
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Builds a tree over `rows`, one leaf per row in order.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::EmptyInput`] if `rows` is empty, or a row-encoding error if any
    /// row's index or values don't fit the wire format (see [`serialize_row`]).
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "level sizes are bounded by rows.len() and halve each iteration"
    )]
    pub fn build(rows: &[Vec<i64>]) -> Result<Self, MerkleError> {
        if rows.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let mut leaves = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            leaves.push(hash_leaf(idx, row)?);
        }

        let mut levels = vec![leaves];
        loop {
            let current = levels
                .last()
                .expect("levels always has at least the leaf level");
            if current.len() <= 1 {
                break;
            }
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let left = *pair
                    .first()
                    .expect("chunks(2) over a non-empty slice always yields a first element");
                let right = *pair.get(1).unwrap_or(&left);
                next.push(hash_pair(&left, &right));
            }
            levels.push(next);
        }

        Ok(Self {
            row_count: rows.len(),
            levels,
        })
    }

    /// The number of rows this tree was built over.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// The tree's 32-byte root digest.
    #[must_use]
    pub fn root(&self) -> [u8; 32] {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or([0_u8; 32])
    }

    /// The tree's root digest, hex-encoded (the on-ledger wire form).
    #[must_use]
    pub fn root_hex(&self) -> String {
        hex::encode(self.root())
    }

    /// The sibling path from leaf `index` up to (excluding) the root.
    ///
    /// At levels where `index` had no sibling (an odd-cardinality level duplicated its last
    /// node), the "sibling" pushed is the node itself, matching [`Self::build`]'s duplication
    /// rule — this keeps [`verify`] a uniform, index-driven walk with no special-casing.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::IndexOutOfRange`] if `index >= self.row_count()`.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "idx is halved or incremented within level bounds each iteration"
    )]
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.row_count {
            return Err(MerkleError::IndexOutOfRange {
                index,
                row_count: self.row_count,
            });
        }

        let mut proof = Vec::new();
        let mut idx = index;
        let levels_below_root = self.levels.len().saturating_sub(1);
        for level in self.levels.iter().take(levels_below_root) {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            let sibling = level
                .get(sibling_idx)
                .or_else(|| level.get(idx))
                .copied()
                .unwrap_or([0_u8; 32]);
            proof.push(sibling);
            idx /= 2;
        }
        Ok(proof)
    }
}

/// Verifies that `row_values` at `row_index` authenticates to `root` via `proof`.
///
/// A malformed proof (wrong length for the tree it was supposedly produced from) or a row
/// that doesn't fit the wire encoding is treated as an ordinary mismatch (`false`), never a
/// distinct error — verification outcomes are always in-band booleans.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    reason = "idx is halved each iteration, bounded by the proof's own length"
)]
pub fn verify(row_index: usize, row_values: &[i64], proof: &[[u8; 32]], root: [u8; 32]) -> bool {
    let Ok(mut computed) = hash_leaf(row_index, row_values) else {
        return false;
    };
    let mut idx = row_index;
    for sibling in proof {
        computed = if idx % 2 == 0 {
            hash_pair(&computed, sibling)
        } else {
            hash_pair(sibling, &computed)
        };
        idx /= 2;
    }
    computed == root
}
