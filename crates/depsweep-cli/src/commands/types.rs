// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! These types allow command handlers to return data instead of printing
//! directly, improving testability and separation of concerns.

use std::path::PathBuf;

use depsweep_core::{FileGroup, Fingerprints};
use serde::Serialize;

/// Result from the files find command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FilesResult {
    /// Directory that was searched.
    pub root: PathBuf,
    /// Dependency file groups, in discovery order.
    pub groups: Vec<FileGroup>,
}

/// One fingerprinted file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FingerprintEntry {
    /// Walked path.
    pub path: String,
    /// Hex-encoded SHA-256.
    pub digest: String,
    /// Content length in bytes.
    pub length: u64,
}

/// Result from the files fingerprint command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FingerprintResult {
    /// Fingerprint file that was written.
    pub output: PathBuf,
    /// Fingerprinted files, sorted by path.
    pub files: Vec<FingerprintEntry>,
}

impl FingerprintResult {
    /// Builds the result from collected fingerprints.
    pub fn new(output: PathBuf, fingerprints: &Fingerprints) -> Self {
        let files = fingerprints
            .iter()
            .map(|f| FingerprintEntry {
                path: f.path.clone(),
                digest: f.digest.clone(),
                length: f.length,
            })
            .collect();
        Self { output, files }
    }
}
