//! Deterministic pseudorandom oracle used to derive challenges and random vectors.
//!
//! Every function here is a pure function of its inputs — no wall-clock time, no OS entropy.
//! That's the point: a worker and a verifier who agree on a seed must derive byte-identical
//! challenges without exchanging anything beyond that seed.

use sha2::{Digest as _, Sha256};

/// Derives `count` canonical random-vector digests from `seed`.
///
/// `hex_digest_k = hex(SHA256(seed ":" k))` for `k` in `0..count`. These hex strings are what
/// gets stored on-ledger; re-expand them into integer vectors with [`expand_r_vector`].
#[must_use]
pub fn derive_vectors(seed: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|k| {
            let preimage = format!("{seed}:{k}");
            hex::encode(Sha256::digest(preimage.as_bytes()))
        })
        .collect()
}

/// Selects up to `count` distinct indices in `0..total`, deterministically from `seed`.
///
/// Builds an iterated SHA-256 chain starting at `seed`'s UTF-8 bytes; each link's low 8 bytes,
/// read little-endian, are reduced modulo `total` and accepted if not already selected.
/// Returns `min(count, total)` indices — fewer than `count` only when `total` itself is
/// smaller, which is the only way a finite chain can terminate without repeats exhausting the
/// domain. Returns an empty vector if `total == 0`.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    reason = "modulus divisor `total` is checked nonzero before use"
)]
pub fn select_indices(seed: &str, total: usize, count: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let target = count.min(total);
    let total_u64 = u64::try_from(total).unwrap_or(u64::MAX);

    let mut indices = Vec::with_capacity(target);
    let mut digest = seed.as_bytes().to_vec();
    while indices.len() < target {
        digest = Sha256::digest(&digest).to_vec();
        let Some(low8) = digest.get(0..8).and_then(|s| <[u8; 8]>::try_from(s).ok()) else {
            break;
        };
        let value = u64::from_le_bytes(low8);
        let idx_u64 = value % total_u64;
        let idx = usize::try_from(idx_u64).unwrap_or(0);
        if !indices.contains(&idx) {
            indices.push(idx);
        }
    }
    indices
}

/// Expands a canonical random-vector digest (as produced by [`derive_vectors`]) into an
/// integer vector of length `length`.
///
/// Treats `seed` as the start of a hash chain: repeatedly SHA-256-hashes and slices the
/// digest into 4-byte little-endian unsigned words until `length` words have been collected.
/// Both worker and verifier must call this with the same `seed`/`length` to agree on `r`.
#[must_use]
pub fn expand_r_vector(seed: &str, length: usize) -> Vec<u32> {
    let mut data = seed.as_bytes().to_vec();
    let mut values = Vec::with_capacity(length);
    while values.len() < length {
        data = Sha256::digest(&data).to_vec();
        for chunk in data.chunks(4) {
            if values.len() >= length {
                break;
            }
            if let Ok(word) = <[u8; 4]>::try_from(chunk) {
                values.push(u32::from_le_bytes(word));
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::{derive_vectors, expand_r_vector, select_indices};
    use proptest::prelude::*;

    #[test]
    #[allow(
        clippy::indexing_slicing,
        reason = "length just asserted to be 3"
    )]
    fn derive_vectors_is_deterministic_and_distinct_per_index() {
        let a = derive_vectors("abc", 3);
        let b = derive_vectors("abc", 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn derive_vectors_digests_are_64_char_hex() {
        for digest in derive_vectors("seed", 2) {
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn select_indices_empty_total_is_empty() {
        assert!(select_indices("abc", 0, 5).is_empty());
    }

    #[test]
    fn select_indices_caps_at_total() {
        let indices = select_indices("abc", 3, 10);
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn select_indices_is_deterministic() {
        let a = select_indices("abc:v", 5, 2);
        let b = select_indices("abc:v", 5, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn expand_r_vector_is_deterministic_and_right_length() {
        let a = expand_r_vector("some-digest", 5);
        let b = expand_r_vector("some-digest", 5);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    #[allow(
        clippy::indexing_slicing,
        reason = "long is just asserted to have length 5"
    )]
    fn expand_r_vector_different_lengths_share_prefix() {
        let short = expand_r_vector("digest", 2);
        let long = expand_r_vector("digest", 5);
        assert_eq!(&long[..2], short.as_slice());
    }

    proptest! {
        #[test]
        fn select_indices_returns_min_count_total_distinct(
            seed in "[a-z0-9]{1,12}",
            total in 0_usize..20,
            count in 0_usize..20,
        ) {
            let indices = select_indices(&seed, total, count);
            let expected_len = count.min(total);
            prop_assert_eq!(indices.len(), expected_len);

            let unique: std::collections::HashSet<_> = indices.iter().copied().collect();
            prop_assert_eq!(unique.len(), indices.len());
            prop_assert!(indices.iter().all(|&i| i < total || total == 0));
        }
    }
}
