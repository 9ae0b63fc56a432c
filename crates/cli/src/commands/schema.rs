//! `vinfer schema`: prints the JSON Schema for every on-ledger and worker-facing record type.

use schemars::schema::RootSchema;

/// Prints the JSON Schema for `Worker`, `Job`, `Receipt`, `Challenge`, `Verification`, and
/// `InferenceJob`, one block per type.
///
/// # Errors
///
/// Returns an error if a schema fails to serialize to pretty JSON (never true: every type here
/// derives `JsonSchema` over plain data fields).
pub fn run() -> eyre::Result<()> {
    print_schema("Worker", schemars::schema_for!(vinfer_core::Worker))?;
    print_schema("Job", schemars::schema_for!(vinfer_core::Job))?;
    print_schema("Receipt", schemars::schema_for!(vinfer_core::Receipt))?;
    print_schema("Challenge", schemars::schema_for!(vinfer_core::Challenge))?;
    print_schema("Verification", schemars::schema_for!(vinfer_core::Verification))?;
    print_schema("InferenceJob", schemars::schema_for!(vinfer_worker::InferenceJob))?;
    Ok(())
}

#[allow(clippy::print_stdout, reason = "prints each record type's JSON Schema to stdout")]
fn print_schema(name: &str, schema: RootSchema) -> eyre::Result<()> {
    let schema_str = serde_json::to_string_pretty(&schema)?;
    println!("# {name}\n{schema_str}\n");
    Ok(())
}
