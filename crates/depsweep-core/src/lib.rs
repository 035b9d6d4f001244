// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # depsweep Core
//!
//! Core library for depsweep - dependency scanning for CI pipelines.
//!
//! This crate provides reusable components for:
//! - Glob-based file classification with exclusion and inclusion patterns
//! - Dependency file discovery and fingerprinting
//! - The scan pipeline (resolve, fingerprint, call graph, upload, SBOM)
//! - Automation rule verdicts
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use depsweep_core::{
//!     ApiClient, EnvCiService, FileFingerprinter, PatternSet, ScanOptions, Scanner, WalkFinder,
//!     exclusions, load_config,
//! };
//!
//! # async fn example() -> depsweep_core::Result<()> {
//! let config = load_config()?;
//! let client = Arc::new(ApiClient::new(&config.api, depsweep_core::token_from_env())?);
//!
//! let scanner = Scanner::builder()
//!     .finder(Arc::new(WalkFinder::new()))
//!     .uploader(client.clone())
//!     .ci_service(Arc::new(EnvCiService::from_process()))
//!     .fingerprinter(Arc::new(FileFingerprinter::new()))
//!     .build();
//!
//! let options = ScanOptions::builder()
//!     .path("services/api")
//!     .patterns(PatternSet::general(exclusions(), &[]))
//!     .repository_name("acme/shop")
//!     .commit_name("4f2a9c1")
//!     .build();
//!
//! scanner.scan(options, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`file`] - Pattern sets, classification, discovery and fingerprinting
//! - [`scan`] - Scan options and pipeline
//! - [`api`] - Backend client
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types

// ============================================================================
// Error Handling
// ============================================================================

pub use error::ScanError;

/// Convenience Result type for depsweep operations.
///
/// This is equivalent to `std::result::Result<T, ScanError>`.
pub type Result<T> = std::result::Result<T, ScanError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    ApiConfig, AppConfig, ScanConfig, TOKEN_ENV_VAR, config_dir, config_file_path, load_config,
    token_from_env,
};

// ============================================================================
// File Classification
// ============================================================================

pub use file::{
    EXCLUSION_ENV_VAR, PathClassifier, PatternSet, default_exclusions,
    default_exclusions_fingerprint, excluded, exclusions, exclusions_from, normalize_path,
};

// ============================================================================
// Discovery and Fingerprinting
// ============================================================================

pub use file::{
    FileFingerprinter, FileGroup, Finder, FinderOptions, FingerprintOptions, Fingerprinter,
    Fingerprints, OUTPUT_FILE_NAME_FINGERPRINTS, WalkFinder,
};

// ============================================================================
// Scan Pipeline
// ============================================================================

pub use scan::{
    AutomationRule, CiEnv, CiService, Clock, EnvCiService, GitMeta, ScanOptions, Scanner,
    SystemClock, UploadOptions, UploadResult, Uploader, Verdict,
};

// ============================================================================
// Backend Client
// ============================================================================

pub use api::ApiClient;

// ============================================================================
// Retry Logic
// ============================================================================

pub use retry::{is_retryable_http, is_retryable_scan_error, retry_backoff};

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod config;
pub mod error;
pub mod file;
pub mod retry;
pub mod scan;
