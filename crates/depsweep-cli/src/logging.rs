// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the depsweep CLI.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging to stderr,
//! keeping stdout free for scan results.
//!
//! # Examples
//!
//! ```bash
//! # Default: warnings only
//! depsweep scan
//!
//! # Debug output for troubleshooting
//! depsweep -v scan
//!
//! # Trace level, including HTTP client internals
//! RUST_LOG=depsweep=trace,reqwest=debug depsweep scan
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::OutputFormat;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "depsweep=debug,reqwest=error"
    } else {
        "depsweep=warn,reqwest=error"
    }
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence. Otherwise `verbose` raises depsweep's own
/// logs to debug level. Structured output formats never get ANSI colors on
/// stderr so piped logs stay clean.
pub fn init_logging(format: OutputFormat, verbose: bool) {
    let ansi = matches!(format, OutputFormat::Text);
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .expect("valid default filter directives");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
