//! Integer GEMM/matvec kernels for the verifiable-inference protocol.
//!
//! [`matmul`] runs the actual GEMM chain a worker executes; [`matvec_mod_p`] is the
//! reduced-accumulation variant both workers and verifiers use whenever a Freivalds random
//! vector is one of the operands, so the two sides never diverge bit-for-bit.

pub mod error;
pub mod kernels;

pub use error::GemmError;
pub use kernels::{FREIVALDS_MODULUS, matmul, matvec, matvec_mod_p, mod_reduce};
