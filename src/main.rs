// Mender - validate source files and repair them with a language model
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use mender::cli::{run_command, Cli};
use mender::config::{load_config, load_config_from};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    mender::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    run_command(cli.command, &config).await
}
