// SPDX-License-Identifier: Apache-2.0

//! Error types for depsweep.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while classifying files or running a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Invalid scan options or configuration file.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// A glob pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern, verbatim.
        pattern: String,
        /// Parser error message.
        message: String,
    },

    /// The scan root could not be resolved or entered.
    #[error("Failed to set working directory to {}: {source}", path.display())]
    WorkingDirectory {
        /// Requested root.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Dependency resolution stage failed.
    #[error("Resolution failed: {message}")]
    Resolve {
        /// Error message.
        message: String,
    },

    /// Fingerprinting stage failed.
    #[error("Fingerprinting failed: {message}")]
    Fingerprint {
        /// Error message.
        message: String,
    },

    /// Call graph generation stage failed.
    #[error("Call graph generation failed: {message}")]
    CallGraph {
        /// Error message.
        message: String,
    },

    /// File discovery failed.
    #[error("File discovery failed: {message}")]
    Discovery {
        /// Error message.
        message: String,
    },

    /// Upload stage failed.
    #[error("Upload failed: {message}")]
    Upload {
        /// Error message.
        message: String,
        /// Optional HTTP status code returned by the backend.
        status: Option<u16>,
    },

    /// SBOM report stage failed.
    #[error("SBOM report failed: {message}")]
    Sbom {
        /// Error message.
        message: String,
    },

    /// Scan results were not available before the polling timeout.
    #[error("Scan result was not available within the polling timeout")]
    NoResult,

    /// File write or read error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An automation rule requested that the pipeline fail.
    ///
    /// The triggering rules have already been rendered, so callers should
    /// exit non-zero without printing this error.
    #[error("pipeline failed")]
    PipelineFailed,
}

impl ScanError {
    /// Returns true for the automation-rule verdict, which is not a runtime fault.
    #[must_use]
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(self, ScanError::PipelineFailed)
    }

    /// Returns true if this error is the upload polling timeout.
    #[must_use]
    pub fn is_no_result(&self) -> bool {
        matches!(self, ScanError::NoResult)
    }

    /// Call graph generation ran out of its time budget.
    #[must_use]
    pub fn call_graph_timeout(timeout: Duration) -> Self {
        ScanError::CallGraph {
            message: format!("timed out after {}s", timeout.as_secs()),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ScanError::Config {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        ScanError::Config {
            message: err.to_string(),
        }
    }
}
