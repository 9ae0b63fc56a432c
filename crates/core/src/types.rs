//! On-ledger record types.
//!
//! These are plain data records; the state machine that owns them lives in `vinfer-ledger`.
//! Every type here is `Serialize`/`Deserialize`/`JsonSchema` so a deployment can persist or
//! transmit them, and the records that are addressed by content hash (`Receipt`) expose a
//! canonical byte encoding that is a pure function of their fields.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// A worker, identified by an opaque public-key string.
///
/// Created by [`crate`]-external registration; mutated only by slashing. Stake and
/// reputation are unsigned so "never negative" (the protocol's invariant) is a type-level
/// guarantee rather than a runtime check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Worker {
    /// Opaque public-key identifier.
    pub pubkey: String,
    /// Staked collateral, in the ledger's currency unit.
    pub stake: u64,
    /// SKU identifiers this worker is willing to serve.
    pub supported_skus: Vec<String>,
    /// Reputation score; decremented (floored at zero) on slashing.
    pub reputation_score: u32,
}

/// An immutable job record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job identifier.
    pub job_id: String,
    /// SKU identifier (opaque model/quantization/batch profile) this job runs.
    pub sku_id: String,
    /// Opaque content address of the job's input.
    pub input_root: String,
    /// Work-unit size credited to the worker on successful verification.
    pub shard_size: u32,
    /// Currency amount paid to the worker on successful verification.
    pub payment: u64,
}

/// A GEMM coordinate within the executed chain.
///
/// The layer index is fixed at `0` by [`crate`]'s current single-layer worker; the field
/// exists so the schema doesn't need to change if a future worker executes multiple layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct GemmCoordinate {
    /// Layer index (always `0` in the current single-layer worker).
    pub layer: u32,
    /// GEMM index within the layer.
    pub gemm_index: u32,
}

impl GemmCoordinate {
    /// Build a coordinate at layer `0`.
    #[must_use]
    pub const fn layer_zero(gemm_index: u32) -> Self {
        Self {
            layer: 0,
            gemm_index,
        }
    }
}

/// One GEMM's output commitment within a [`Receipt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GemmCommitment {
    /// Layer index (always `0` in the current single-layer worker).
    pub layer_index: u32,
    /// GEMM index within the layer.
    pub gemm_index: u32,
    /// Hex-encoded Merkle root over the GEMM's output rows.
    pub merkle_root: String,
}

impl GemmCommitment {
    /// This commitment's coordinate within the chain.
    #[must_use]
    pub const fn coordinate(&self) -> GemmCoordinate {
        GemmCoordinate {
            layer: self.layer_index,
            gemm_index: self.gemm_index,
        }
    }
}

/// An immutable receipt published by a worker after running a job.
///
/// Addressed by [`Receipt::receipt_id`], a SHA-256 content hash of [`Receipt::canonical_bytes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Receipt {
    /// Pubkey of the worker that produced this receipt.
    pub worker_pubkey: String,
    /// The job this receipt is for.
    pub job_id: String,
    /// Shard identifier within the job.
    pub shard_id: String,
    /// SKU identifier the job ran under.
    pub sku_id: String,
    /// Hex-encoded Merkle root of the final output matrix.
    pub output_root: String,
    /// Per-GEMM output commitments, in execution order.
    pub gemm_commitments: Vec<GemmCommitment>,
}

/// Writes a length-prefixed (4-byte little-endian `u32` length) byte string.
fn write_length_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
}

impl Receipt {
    /// Canonical byte encoding used to derive [`Receipt::receipt_id`].
    ///
    /// A pure function of the receipt's fields: each string field is written as a 4-byte
    /// little-endian length prefix followed by its UTF-8 bytes, in field-declaration order,
    /// followed by the GEMM commitments (each as `layer:u32_le ∥ gemm_index:u32_le ∥
    /// len-prefixed merkle_root`). This replaces the non-portable "hash of a language-native
    /// dict repr" the reference implementation used.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_length_prefixed(&mut buf, self.worker_pubkey.as_bytes());
        write_length_prefixed(&mut buf, self.job_id.as_bytes());
        write_length_prefixed(&mut buf, self.shard_id.as_bytes());
        write_length_prefixed(&mut buf, self.sku_id.as_bytes());
        write_length_prefixed(&mut buf, self.output_root.as_bytes());

        let commitment_count = u32::try_from(self.gemm_commitments.len()).unwrap_or(u32::MAX);
        buf.extend_from_slice(&commitment_count.to_le_bytes());
        for commitment in &self.gemm_commitments {
            buf.extend_from_slice(&commitment.layer_index.to_le_bytes());
            buf.extend_from_slice(&commitment.gemm_index.to_le_bytes());
            write_length_prefixed(&mut buf, commitment.merkle_root.as_bytes());
        }
        buf
    }

    /// The receipt id: `hex(SHA256(canonical_bytes()))`.
    #[must_use]
    pub fn receipt_id(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_bytes()))
    }
}

/// An immutable challenge assigned to a receipt.
///
/// At most one challenge may exist per receipt id (ledger invariant 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Challenge {
    /// The receipt this challenge audits.
    pub receipt_id: String,
    /// Pubkey of the verifier this challenge was assigned to.
    pub verifier_pubkey: String,
    /// Sampled GEMM coordinates to audit, in sampling order.
    pub gemm_indices: Vec<GemmCoordinate>,
    /// Hex-encoded canonical random-vector digests, in derivation order.
    pub random_vectors: Vec<String>,
}

/// An immutable verification outcome for a receipt.
///
/// At most one verification may exist per receipt id (ledger invariant 2); submitting one
/// triggers settlement exactly once (ledger invariant 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verification {
    /// The receipt this verification is for.
    pub receipt_id: String,
    /// Pubkey of the verifier that produced this verdict.
    pub verifier_pubkey: String,
    /// The GEMM coordinates that were audited (copied from the originating challenge).
    pub gemm_indices: Vec<GemmCoordinate>,
    /// The random-vector digests that were audited (copied from the originating challenge).
    pub random_vectors: Vec<String>,
    /// `true` if the audited GEMM(s) passed Freivalds and Merkle authentication.
    pub verdict: bool,
}

/// A worker's accrued reward/credit account. Created on registration, mutated on settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RewardAccount {
    /// Units of work credited to the worker (sum of settled jobs' `shard_size`).
    pub credits: u64,
    /// Currency balance accrued (sum of settled jobs' `payment`).
    pub balance: u64,
}

#[cfg(test)]
mod tests {
    use super::{GemmCommitment, GemmCoordinate, Receipt};

    fn sample_receipt() -> Receipt {
        Receipt {
            worker_pubkey: "worker-1".to_owned(),
            job_id: "job-1".to_owned(),
            shard_id: "shard-1".to_owned(),
            sku_id: "sku-1".to_owned(),
            output_root: "aa".to_owned(),
            gemm_commitments: vec![GemmCommitment {
                layer_index: 0,
                gemm_index: 0,
                merkle_root: "bb".to_owned(),
            }],
        }
    }

    #[test]
    #[allow(
        clippy::indexing_slicing,
        reason = "test walks a manually-constructed buffer with known offsets"
    )]
    fn canonical_bytes_is_length_prefixed_and_field_ordered() {
        let receipt = sample_receipt();
        let bytes = receipt.canonical_bytes();

        let mut cursor = 0_usize;
        let mut read_field = |expected: &str| {
            let len = u32::from_le_bytes([
                bytes[cursor],
                bytes[cursor + 1],
                bytes[cursor + 2],
                bytes[cursor + 3],
            ]) as usize;
            cursor += 4;
            assert_eq!(&bytes[cursor..cursor + len], expected.as_bytes());
            cursor += len;
        };

        read_field("worker-1");
        read_field("job-1");
        read_field("shard-1");
        read_field("sku-1");
        read_field("aa");
    }

    #[test]
    fn canonical_bytes_is_pure_and_deterministic() {
        let a = sample_receipt();
        let b = sample_receipt();
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        assert_eq!(a.receipt_id(), b.receipt_id());
    }

    #[test]
    #[allow(
        clippy::indexing_slicing,
        reason = "test mutates the single known commitment entry"
    )]
    fn receipt_id_changes_when_any_field_changes() {
        let base = sample_receipt();
        let mut tweaked = sample_receipt();
        tweaked.output_root = "cc".to_owned();
        assert_ne!(base.receipt_id(), tweaked.receipt_id());

        let mut tweaked_commitment = sample_receipt();
        tweaked_commitment.gemm_commitments[0].merkle_root = "zz".to_owned();
        assert_ne!(base.receipt_id(), tweaked_commitment.receipt_id());
    }

    #[test]
    fn receipt_id_is_64_char_hex() {
        let receipt = sample_receipt();
        let id = receipt.receipt_id();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
