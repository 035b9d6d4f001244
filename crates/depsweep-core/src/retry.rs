// SPDX-License-Identifier: Apache-2.0

//! Retry logic with exponential backoff for transient failures.
//!
//! Provides helpers to detect retryable errors and configure exponential backoff
//! with jitter for backend requests.

use backon::ExponentialBuilder;

use crate::error::ScanError;

/// Determines if an HTTP status code is retryable.
///
/// Retryable status codes are:
/// - 429 (Too Many Requests / Rate Limited)
/// - 500 (Internal Server Error)
/// - 502 (Bad Gateway)
/// - 503 (Service Unavailable)
/// - 504 (Gateway Timeout)
#[must_use]
pub fn is_retryable_http(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Determines if a scan error is transient.
///
/// Network timeouts and connection failures are retried, as are upload
/// errors carrying a retryable status code. Everything else is final.
#[must_use]
pub fn is_retryable_scan_error(e: &ScanError) -> bool {
    match e {
        ScanError::Network(err) => {
            if err.is_timeout() || err.is_connect() {
                return true;
            }
            err.status()
                .is_some_and(|status| is_retryable_http(status.as_u16()))
        }
        ScanError::Upload {
            status: Some(status),
            ..
        } => is_retryable_http(*status),
        _ => false,
    }
}

/// Creates a configured exponential backoff builder for retries.
///
/// - Factor: 2
/// - Min delay: 1 second
/// - Max times: 3
/// - Jitter: enabled
#[must_use]
pub fn retry_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_factor(2.0)
        .with_min_delay(std::time::Duration::from_secs(1))
        .with_max_times(3)
        .with_jitter()
}
