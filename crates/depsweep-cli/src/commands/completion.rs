// SPDX-License-Identifier: Apache-2.0

//! Shell completion generation.

use std::io::Write;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;

/// Writes the completion script for `shell` to `w`.
pub fn write_completions(shell: Shell, w: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, w);
    w.flush()?;
    Ok(())
}

/// Generate completion script to stdout.
pub fn run_generate(shell: Shell) -> Result<()> {
    write_completions(shell, &mut std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_mention_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut out = Vec::new();
            write_completions(shell, &mut out).unwrap();
            let script = String::from_utf8(out).unwrap();
            assert!(script.contains("depsweep"), "no binary name for {shell:?}");
            assert!(script.contains("fingerprint"), "no subcommand for {shell:?}");
        }
    }
}
