//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vinfer")]
#[command(about = "Verifiable-inference protocol demo, benchmark, and schema tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Runs the end-to-end registration, job, receipt, challenge, and verification scenario.
    Demo {
        /// Number of random-vector digests the challenge derives.
        #[arg(long, env = "VINFER_ROUNDS", default_value_t = 20)]
        rounds: usize,
        /// Number of GEMM coordinates the challenge samples.
        #[arg(long, env = "VINFER_SAMPLE_COUNT", default_value_t = 2)]
        sample_count: usize,
        /// Stake the demo worker registers with.
        #[arg(long, env = "VINFER_STAKE", default_value_t = 1000)]
        stake: u64,
        /// A JSON file holding an `InferenceJob`, in place of the built-in two-GEMM scenario.
        #[arg(long, env = "VINFER_JOB_FILE")]
        job_file: Option<PathBuf>,
        /// Test hook: flips a revealed row value after the worker answers, to exercise the
        /// Merkle-proof-failure path.
        #[arg(long, hide = true)]
        tamper_merkle: bool,
        /// Test hook: flips the worker's `Y · r` vector after it answers, to exercise the
        /// Freivalds-mismatch path.
        #[arg(long, hide = true)]
        tamper_freivalds: bool,
    },
    /// Times a single synthetic GEMM's inference against its verification.
    Bench {
        /// Row count of the input matrix.
        #[arg(long, env = "VINFER_BENCH_ROWS", default_value_t = 64)]
        rows: usize,
        /// Inner (shared) dimension.
        #[arg(long, env = "VINFER_BENCH_INNER", default_value_t = 64)]
        inner: usize,
        /// Column count of the weight matrix.
        #[arg(long, env = "VINFER_BENCH_COLS", default_value_t = 64)]
        cols: usize,
    },
    /// Prints the on-ledger record types' JSON Schema.
    Schema,
}
