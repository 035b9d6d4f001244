// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the depsweep backend.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use backon::Retryable;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{
    CreateScanResponse, Features, FilePayload, GroupPayload, ScanProgress, ScanRequest,
};
use crate::config::{ApiConfig, TOKEN_ENV_VAR};
use crate::error::ScanError;
use crate::file::{FileGroup, normalize_path};
use crate::retry::{is_retryable_scan_error, retry_backoff};
use crate::scan::{Entitlements, SbomOrder, SbomReporter, UploadOptions, UploadResult, Uploader};

const SCANS_PATH: &str = "/api/1.0/scans";
const FEATURES_PATH: &str = "/api/1.0/features";
const SBOM_PATH: &str = "/api/1.0/sbom";

/// Outcome of one status poll.
enum Poll {
    Done(UploadResult),
    Pending(ScanProgress),
}

/// Backend client implementing upload, SBOM ordering and entitlement checks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl ApiClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, token: Option<SecretString>) -> Result<Self, ScanError> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            poll_interval: config.poll_interval(),
            poll_timeout: config.poll_timeout(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Sends a request, retrying transient failures.
    async fn send(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, ScanError> {
        (|| async { check_status(build().send().await?).await })
            .retry(retry_backoff())
            .when(is_retryable_scan_error)
            .notify(|err, dur| warn!(error = %err, delay = ?dur, "Retrying after error"))
            .await
    }

    async fn create_scan(&self, body: &ScanRequest) -> Result<String, ScanError> {
        let response = self
            .send(|| self.request(Method::POST, SCANS_PATH).json(body))
            .await?;
        let created: CreateScanResponse = parse_json(response).await?;
        debug!(scan_id = %created.scan_id, "Scan created");
        Ok(created.scan_id)
    }

    async fn poll(&self, scan_id: &str) -> Result<Poll, ScanError> {
        let path = format!("{SCANS_PATH}/{scan_id}");
        let response = self.send(|| self.request(Method::GET, &path)).await?;

        if response.status() == StatusCode::ACCEPTED {
            Ok(Poll::Pending(parse_json(response).await?))
        } else {
            Ok(Poll::Done(parse_json(response).await?))
        }
    }

    async fn wait_for_result(&self, scan_id: &str) -> Result<UploadResult, ScanError> {
        let started = Instant::now();
        loop {
            match self.poll(scan_id).await? {
                Poll::Done(result) => return Ok(result),
                Poll::Pending(progress) if progress.long_queue => {
                    info!("Scan placed in the long queue");
                    return Ok(UploadResult {
                        details_url: progress.details_url,
                        long_queue: true,
                        ..UploadResult::default()
                    });
                }
                Poll::Pending(progress) => {
                    if started.elapsed() >= self.poll_timeout {
                        return Err(ScanError::NoResult);
                    }
                    debug!(progress = progress.progress, "Waiting for scan result");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

/// Maps non-success responses to errors carrying the status code.
async fn check_status(response: Response) -> Result<Response, ScanError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = if status == StatusCode::UNAUTHORIZED {
        format!("unauthorized, check the {TOKEN_ENV_VAR} environment variable")
    } else {
        let body = response.text().await.unwrap_or_default();
        format!("HTTP {}: {body}", status.as_u16())
    };
    Err(ScanError::Upload {
        message,
        status: Some(status.as_u16()),
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ScanError> {
    response.json().await.map_err(|e| ScanError::Upload {
        message: format!("invalid response body: {e}"),
        status: None,
    })
}

async fn read_payload(path: &Path) -> Result<FilePayload, ScanError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FilePayload {
        path: normalize_path(&path.to_string_lossy()).into_owned(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

async fn group_payload(group: &FileGroup) -> Result<GroupPayload, ScanError> {
    let manifest_file = match &group.manifest_file {
        Some(path) => Some(read_payload(path).await?),
        None => None,
    };
    let mut lock_files = Vec::with_capacity(group.lock_files.len());
    for path in &group.lock_files {
        lock_files.push(read_payload(path).await?);
    }
    Ok(GroupPayload {
        manifest_file,
        lock_files,
    })
}

async fn scan_request(options: &UploadOptions) -> Result<ScanRequest, ScanError> {
    let mut file_groups = Vec::with_capacity(options.file_groups.len());
    for group in &options.file_groups {
        file_groups.push(group_payload(group).await?);
    }

    let config = match &options.config_path {
        Some(path) => Some(read_payload(path).await?.content),
        None => None,
    };

    let meta = &options.git_meta;
    Ok(ScanRequest {
        repository_name: meta.repository_name.clone(),
        commit_name: meta.commit_name.clone(),
        branch_name: meta.branch_name.clone(),
        author: meta.author.clone(),
        repository_url: meta.repository_url.clone(),
        integration_name: options.integration_name.clone(),
        version_hint: options.version_hint,
        tag_commit_as_release: options.tag_commit_as_release,
        experimental: options.experimental,
        call_graph_upload_timeout: options.call_graph_upload_timeout.as_secs(),
        config,
        file_groups,
    })
}

#[async_trait]
impl Uploader for ApiClient {
    async fn upload(&self, options: &UploadOptions) -> Result<UploadResult, ScanError> {
        if options.file_groups.is_empty() {
            warn!("No dependency files found, uploading metadata only");
        }
        let body = scan_request(options).await?;
        let scan_id = self.create_scan(&body).await?;
        self.wait_for_result(&scan_id).await
    }
}

#[async_trait]
impl Entitlements for ApiClient {
    async fn fingerprinting_enabled(&self) -> bool {
        let result = async {
            let response = self
                .send(|| self.request(Method::GET, FEATURES_PATH))
                .await?;
            parse_json::<Features>(response).await
        }
        .await;

        match result {
            Ok(features) => features.fingerprinting,
            Err(e) => {
                warn!(error = %e, "Could not check fingerprinting entitlement");
                false
            }
        }
    }
}

/// Default SBOM output file for an order.
#[must_use]
pub fn default_sbom_output(order: &SbomOrder) -> PathBuf {
    PathBuf::from(format!(
        "depsweep-sbom-{}-{}.json",
        order.repository_id, order.commit_id
    ))
}

#[async_trait]
impl SbomReporter for ApiClient {
    async fn order(&self, order: &SbomOrder) -> Result<(), ScanError> {
        let sbom_err = |e: ScanError| ScanError::Sbom {
            message: e.to_string(),
        };

        let response = self
            .send(|| self.request(Method::POST, SBOM_PATH).json(order))
            .await
            .map_err(sbom_err)?;
        let report = response
            .bytes()
            .await
            .map_err(|e| sbom_err(ScanError::Network(e)))?;

        let output = order
            .output
            .clone()
            .unwrap_or_else(|| default_sbom_output(order));
        tokio::fs::write(&output, &report)
            .await
            .map_err(|source| ScanError::Io {
                path: output.clone(),
                source,
            })?;
        info!(path = %output.display(), "Wrote SBOM report");
        Ok(())
    }
}
