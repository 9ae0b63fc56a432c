//! Bit-exact Merkle commitment over integer matrix rows.
//!
//! Workers commit each GEMM's output rows into a tree with [`MerkleTree::build`] and publish
//! its [`MerkleTree::root_hex`]; verifiers re-derive an individual row's authentication path
//! with [`verify`] against a [`MerkleProof`] obtained from [`MerkleTree::proof`]. The leaf and
//! node encodings are fixed byte layouts (see [`serialize_row`]), not a serde format, so every
//! implementation of this protocol hashes identical bytes for identical rows.

pub mod error;
pub mod tree;

pub use error::MerkleError;
pub use tree::{MerkleProof, MerkleTree, serialize_row, verify};
