// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for depsweep.
//!
//! Uses clap's derive API for declarative CLI parsing with noun-verb
//! subcommands.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Extended help text for the generate subcommand with shell-specific examples.
const COMPLETION_GENERATE_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc or ~/.bash_profile:
      eval "$(depsweep completion generate bash)"

  zsh
    Generate completion file:
      mkdir -p ~/.zsh/completions
      depsweep completion generate zsh > ~/.zsh/completions/_depsweep

  fish
    Generate completion file:
      depsweep completion generate fish > ~/.config/fish/completions/depsweep.fish
"#;

/// Extended help text for exclusion patterns.
const EXCLUSION_HELP: &str = "Glob pattern excluding matching paths, repeatable. \
    Replaces the default exclusions (or DEPSWEEP_EXCLUSION) when given. \
    Supported terms: * (within a segment), ** (any number of segments), \
    ? (one character), [abc] (character class), {a,b} (alternation).";

/// Output format for CLI results.
#[derive(Clone, Copy, Default, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
}

/// Global output configuration passed to commands.
#[derive(Clone, Debug)]
pub struct OutputContext {
    /// Output format (text, json, yaml)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, progress)
    pub quiet: bool,
    /// Enable verbose output (debug-level logging)
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }
}

/// depsweep - dependency scanning for CI pipelines.
///
/// Finds dependency files, uploads them for vulnerability analysis and fails
/// the pipeline when an automation rule says so.
#[derive(Parser)]
#[command(name = "depsweep")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json, yaml)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (spinners, progress)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a project for vulnerable dependencies
    Scan(Box<ScanArgs>),

    /// Inspect which files a scan would use
    #[command(subcommand)]
    Files(FilesCommand),

    /// Generate shell completion scripts
    #[command(subcommand)]
    Completion(CompletionCommand),
}

/// Arguments of `depsweep scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan (defaults to the current directory)
    pub path: Option<PathBuf>,

    #[arg(long = "exclusion", short = 'e', value_name = "PATTERN", long_help = EXCLUSION_HELP)]
    pub exclusions: Vec<String>,

    /// Glob pattern whose matches are never excluded, repeatable
    #[arg(long = "inclusion", short = 'i', value_name = "PATTERN")]
    pub inclusions: Vec<String>,

    /// Fingerprint source files to detect vendored dependencies
    #[arg(long)]
    pub fingerprint: bool,

    /// Order an SBOM report in this format (CycloneDX or SPDX)
    #[arg(long, value_name = "FORMAT")]
    pub sbom: Option<String>,

    /// Where to write the SBOM report
    #[arg(long, value_name = "FILE", requires = "sbom")]
    pub sbom_output: Option<PathBuf>,

    /// Repository name, e.g. owner/repo
    #[arg(long, short = 'r')]
    pub repository: Option<String>,

    /// Commit hash or name
    #[arg(long, short = 'c')]
    pub commit: Option<String>,

    /// Branch name
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Commit author
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Repository URL
    #[arg(long, short = 'u')]
    pub repository_url: Option<String>,

    /// Integration name reported to the backend (defaults to the CI provider, or CLI)
    #[arg(long)]
    pub integration: Option<String>,

    /// Write the raw scan result to this JSON file
    #[arg(long, short = 'j', value_name = "FILE")]
    pub json_path: Option<PathBuf>,

    /// Generate a commit name when none is given or detected
    #[arg(long)]
    pub generate_commit_name: bool,

    /// Succeed when the scan result is not ready in time
    #[arg(long, short = 'p')]
    pub pass_on_timeout: bool,

    /// Seconds the backend may spend on call graph upload
    #[arg(long, value_name = "SECONDS")]
    pub callgraph_upload_timeout: Option<u64>,

    /// Files shorter than this many bytes are not fingerprinted
    #[arg(long, value_name = "BYTES")]
    pub min_fingerprint_content_length: Option<usize>,

    /// Let the backend guess versions of unresolved dependencies
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub version_hint: bool,

    /// Tag the commit as a release
    #[arg(long)]
    pub tag_commit_as_release: bool,

    /// Enable experimental backend features
    #[arg(long)]
    pub experimental: bool,

    /// Lock file regeneration level
    #[arg(long, default_value_t = 0)]
    pub regenerate: u8,

    /// Prefer npm over yarn when resolving
    #[arg(long)]
    pub prefer_npm: bool,
}

/// File inspection subcommands
#[derive(Subcommand)]
pub enum FilesCommand {
    /// List dependency file groups
    Find {
        /// Directory to search (defaults to the current directory)
        path: Option<PathBuf>,

        #[arg(long = "exclusion", short = 'e', value_name = "PATTERN", long_help = EXCLUSION_HELP)]
        exclusions: Vec<String>,

        /// Glob pattern whose matches are never excluded, repeatable
        #[arg(long = "inclusion", short = 'i', value_name = "PATTERN")]
        inclusions: Vec<String>,

        /// Only list groups that contain lock files
        #[arg(long = "lockfile", short = 'l')]
        lock_file_only: bool,
    },

    /// Fingerprint source files
    ///
    /// Writes the hashes to `depsweep.fingerprints.txt` inside the
    /// fingerprinted directory, replacing any previous file there.
    Fingerprint {
        /// Directory to fingerprint and to write depsweep.fingerprints.txt
        /// into (defaults to the current directory)
        path: Option<PathBuf>,

        /// Glob pattern excluding matching paths, repeatable. Replaces the
        /// fingerprint defaults when given
        #[arg(
            long = "exclusion-fingerprint",
            short = 'e',
            value_name = "PATTERN",
            env = "EXCLUSION_FINGERPRINT",
            value_delimiter = ','
        )]
        exclusions: Vec<String>,

        /// Glob pattern whose matches are never excluded, repeatable
        #[arg(long = "inclusion", short = 'i', value_name = "PATTERN")]
        inclusions: Vec<String>,

        /// Files shorter than this many bytes are not fingerprinted
        #[arg(long, value_name = "BYTES")]
        min_content_length: Option<usize>,
    },
}

/// Completion subcommands
#[derive(Subcommand)]
pub enum CompletionCommand {
    /// Generate completion script for a shell (output to stdout)
    #[command(after_long_help = COMPLETION_GENERATE_HELP)]
    Generate {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
