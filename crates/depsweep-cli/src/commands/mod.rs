// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the depsweep CLI.

pub mod completion;
pub mod files;
pub mod scan;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use depsweep_core::{AppConfig, exclusions};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{Commands, CompletionCommand, FilesCommand, OutputContext};
use crate::output;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        s.set_message(message.to_string());
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    } else {
        None
    }
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    // DEPSWEEP_EXCLUSION is read once, before any command runs.
    let startup_exclusions = exclusions();

    match command {
        Commands::Scan(args) => scan::run(*args, config, &startup_exclusions).await,

        Commands::Files(files_cmd) => match files_cmd {
            FilesCommand::Find {
                path,
                exclusions,
                inclusions,
                lock_file_only,
            } => {
                let result = files::find(
                    path.unwrap_or_default(),
                    exclusions,
                    &startup_exclusions,
                    &inclusions,
                    lock_file_only,
                )?;
                output::render(&result, &ctx)
            }
            FilesCommand::Fingerprint {
                path,
                exclusions,
                inclusions,
                min_content_length,
            } => {
                let spinner = maybe_spinner(&ctx, "Fingerprinting files...");
                let min_content_length =
                    min_content_length.unwrap_or(config.scan.min_fingerprint_content_length);
                let root = path.unwrap_or_default();
                let result = tokio::task::spawn_blocking(move || {
                    files::fingerprint(root, exclusions, &inclusions, min_content_length)
                })
                .await?;
                if let Some(s) = spinner {
                    s.finish_and_clear();
                }
                output::render(&result?, &ctx)
            }
        },

        Commands::Completion(CompletionCommand::Generate { shell }) => {
            completion::run_generate(shell)
        }
    }
}
