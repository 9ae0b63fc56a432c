//! Command-line surface for the verifiable-inference protocol: a scenario demo, a
//! worker/verifier benchmark, and a record-schema dump.

pub mod cli;
pub mod commands;
