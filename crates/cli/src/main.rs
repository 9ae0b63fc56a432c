//! vinfer command-line entry point.

use clap::Parser as _;
use vinfer_cli::cli::{Cli, Commands};
use vinfer_cli::commands::{bench, demo, schema};

fn init_tracing() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_target(false)
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize tracing: {e:?}"))?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Demo {
            rounds,
            sample_count,
            stake,
            job_file,
            tamper_merkle,
            tamper_freivalds,
        } => demo::run(
            rounds,
            sample_count,
            stake,
            job_file,
            tamper_merkle,
            tamper_freivalds,
        ),
        Commands::Bench { rows, inner, cols } => bench::run(rows, inner, cols),
        Commands::Schema => schema::run(),
    };

    if let Err(e) = res {
        tracing::error!("Error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
