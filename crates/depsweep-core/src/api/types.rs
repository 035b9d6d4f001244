// SPDX-License-Identifier: Apache-2.0

//! Wire types for the backend API.

use serde::{Deserialize, Serialize};

/// A file sent with an upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    /// File content, lossily decoded as UTF-8.
    pub content: String,
}

/// A file group as sent to the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    /// Manifest, if present.
    pub manifest_file: Option<FilePayload>,
    /// Lock files.
    pub lock_files: Vec<FilePayload>,
}

/// Body of a scan creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub repository_name: String,
    pub commit_name: String,
    pub branch_name: String,
    pub author: String,
    pub repository_url: String,
    pub integration_name: String,
    pub version_hint: bool,
    pub tag_commit_as_release: bool,
    pub experimental: bool,
    /// Seconds the backend may spend on call graph upload.
    pub call_graph_upload_timeout: u64,
    /// Project configuration file content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub file_groups: Vec<GroupPayload>,
}

/// Reply to a scan creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScanResponse {
    pub scan_id: String,
}

/// Reply to a status poll while the scan is still running.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanProgress {
    /// Completion percentage.
    pub progress: i64,
    /// The scan was queued and results will arrive later.
    pub long_queue: bool,
    /// Link to the scan in the web UI.
    pub details_url: String,
}

/// Account feature flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Features {
    pub fingerprinting: bool,
}
