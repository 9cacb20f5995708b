// ABOUTME: Main entry point for the repobridge CLI
//
// Binary: repobridge
// Usage: repobridge <COMMAND>
// - update: clone, run the update step, commit, push, open a PR
// - push-file: create or update a single file via the Contents API
// - process: run the data transform against a local checkout

#![allow(missing_docs)]

use anyhow::Result;
use clap::Parser;

mod bridge;
mod cli;
mod process;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let args = cli::Cli::parse();

    match args.command {
        cli::Commands::Update(update_args) => cli::update::execute(update_args, args.format).await,
        cli::Commands::PushFile(push_args) => {
            cli::push_file::execute(push_args, args.format).await
        }
        cli::Commands::Process(process_args) => cli::process::execute(process_args, args.format),
    }
}

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    // Logs go to stderr so stdout stays parseable under --format json
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repobridge=info".into()),
        )
        .init();
}
