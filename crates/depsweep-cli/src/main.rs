// SPDX-License-Identifier: Apache-2.0

//! depsweep - dependency scanning for CI pipelines.
//!
//! Finds manifest and lock files in a project tree, uploads them for
//! vulnerability analysis and turns the backend's automation rules into an
//! exit code.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use depsweep_core::{ScanError, config};
use tracing::debug;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.output, cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet, cli.verbose);

    match run(cli, output_ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        // The rule cards already explain the failure.
        Err(e)
            if e
                .downcast_ref::<ScanError>()
                .is_some_and(ScanError::is_pipeline_failure) =>
        {
            ExitCode::FAILURE
        }
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, ctx: OutputContext) -> Result<()> {
    let config = config::load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    commands::run(cli.command, ctx, &config).await
}
