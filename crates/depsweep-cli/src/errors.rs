// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `ScanError` and appends a hint for the error
//! kinds a user can usually fix on their own.

use anyhow::Error;
use depsweep_core::{OUTPUT_FILE_NAME_FINGERPRINTS, ScanError, TOKEN_ENV_VAR, config_file_path};

/// Formats an error for CLI display with helpful hints.
///
/// If the error is not a `ScanError`, returns the original error message.
pub fn format_error(error: &Error) -> String {
    let Some(scan_err) = error.downcast_ref::<ScanError>() else {
        return error.to_string();
    };

    match scan_err {
        ScanError::Config { .. } => format!(
            "{scan_err}\n\nTip: Check your command-line flags and the config file at {}",
            config_file_path().display()
        ),
        ScanError::InvalidPattern { .. } => format!(
            "{scan_err}\n\nTip: Patterns use glob syntax, e.g. **/node_modules/** or **/*.lock"
        ),
        ScanError::Upload {
            status: Some(401 | 403),
            ..
        } => format!("{scan_err}\n\nTip: Set {TOKEN_ENV_VAR} to a valid API token."),
        ScanError::Network(_) => {
            format!("{scan_err}\n\nTip: Check your internet connection and try again.")
        }
        ScanError::NoResult => format!(
            "{scan_err}\n\nTip: Use --pass-on-timeout to let the pipeline continue while the scan finishes."
        ),
        ScanError::Io { path, .. }
            if path.file_name().is_some_and(|n| n == OUTPUT_FILE_NAME_FINGERPRINTS) =>
        {
            format!("{scan_err}\n\nTip: The scan root must be writable when fingerprinting.")
        }
        _ => scan_err.to_string(),
    }
}
