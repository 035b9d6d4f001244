// SPDX-License-Identifier: Apache-2.0

//! Upload types and the [`Uploader`] seam.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::options::ScanOptions;
use crate::error::ScanError;
use crate::file::FileGroup;

/// Rule action that fails the pipeline when the rule triggers.
pub const FAIL_PIPELINE_ACTION: &str = "failPipeline";

/// Repository and commit metadata attached to an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitMeta {
    /// Repository name.
    pub repository_name: String,
    /// Commit name.
    pub commit_name: String,
    /// Branch name.
    pub branch_name: String,
    /// Commit author.
    pub author: String,
    /// Repository URL.
    pub repository_url: String,
}

impl GitMeta {
    /// Builds the metadata from normalized scan options.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Config` if the repository or commit name is empty.
    pub fn from_options(options: &ScanOptions) -> Result<Self, ScanError> {
        if options.repository_name.is_empty() {
            return Err(ScanError::config(
                "repository name is required: pass --repository or run in a supported CI environment",
            ));
        }
        if options.commit_name.is_empty() {
            return Err(ScanError::config("commit name is required"));
        }

        Ok(Self {
            repository_name: options.repository_name.clone(),
            commit_name: options.commit_name.clone(),
            branch_name: options.branch_name.clone(),
            author: options.commit_author.clone(),
            repository_url: options.repository_url.clone(),
        })
    }
}

/// An automation rule evaluated by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRule {
    /// Human-readable description.
    #[serde(default)]
    pub rule_description: String,
    /// Actions the rule performs when triggered.
    #[serde(default)]
    pub rule_actions: Vec<String>,
    /// Link to the rule in the web UI.
    #[serde(default)]
    pub rule_link: String,
    /// Whether any finding triggered the rule.
    #[serde(default)]
    pub triggered: bool,
}

impl AutomationRule {
    /// Returns true if a triggered rule should fail the pipeline.
    #[must_use]
    pub fn fail_pipeline(&self) -> bool {
        self.rule_actions.iter().any(|a| a == FAIL_PIPELINE_ACTION)
    }
}

/// The backend's reply to an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Link to the scan in the web UI.
    #[serde(default)]
    pub details_url: String,
    /// Number of vulnerabilities found.
    #[serde(default)]
    pub vulnerabilities_found: u64,
    /// Rules evaluated against the scan.
    #[serde(default)]
    pub automation_rules: Vec<AutomationRule>,
    /// The scan was accepted but results will arrive later.
    #[serde(default, skip_serializing)]
    pub long_queue: bool,
}

/// Everything sent with an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Discovered file groups.
    pub file_groups: Vec<FileGroup>,
    /// Repository and commit metadata.
    pub git_meta: GitMeta,
    /// Integration name.
    pub integration_name: String,
    /// Time the backend may spend on call graph upload.
    pub call_graph_upload_timeout: Duration,
    /// Ask the backend to guess versions of unresolved dependencies.
    pub version_hint: bool,
    /// Project configuration file, if any.
    pub config_path: Option<PathBuf>,
    /// Tag the commit as a release.
    pub tag_commit_as_release: bool,
    /// Enable experimental backend features.
    pub experimental: bool,
}

/// Sends file groups for analysis and waits for the verdict.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Uploads the groups and returns the backend reply.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::NoResult` if results were not ready in time, or
    /// another error if the upload itself failed.
    async fn upload(&self, options: &UploadOptions) -> Result<UploadResult, ScanError>;
}

/// Reports whether the account may use fingerprinting.
#[async_trait]
pub trait Entitlements: Send + Sync {
    /// Returns true if fingerprints may be produced for this account.
    async fn fingerprinting_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_pipeline_action() {
        let rule = AutomationRule {
            rule_actions: vec!["sendEmail".to_string(), FAIL_PIPELINE_ACTION.to_string()],
            ..AutomationRule::default()
        };
        assert!(rule.fail_pipeline());

        let rule = AutomationRule {
            rule_actions: vec!["sendEmail".to_string()],
            ..AutomationRule::default()
        };
        assert!(!rule.fail_pipeline());
    }

    #[test]
    fn test_upload_result_deserializes_backend_reply() {
        let json = r#"{
            "detailsUrl": "https://app.example.com/repository/12/commit/34",
            "vulnerabilitiesFound": 3,
            "automationRules": [
                {"ruleDescription": "Block critical", "ruleActions": ["failPipeline"], "triggered": true}
            ],
            "unknownField": 1
        }"#;
        let result: UploadResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.vulnerabilities_found, 3);
        assert!(result.automation_rules[0].triggered);
        assert!(result.automation_rules[0].fail_pipeline());
        assert!(!result.long_queue);
    }

    #[test]
    fn test_long_queue_not_serialized() {
        let result = UploadResult {
            long_queue: true,
            ..UploadResult::default()
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("longQueue"));
    }

    #[test]
    fn test_git_meta_requires_repository() {
        let options = ScanOptions::builder().commit_name("abc").build();
        assert!(matches!(
            GitMeta::from_options(&options),
            Err(ScanError::Config { .. })
        ));

        let options = ScanOptions::builder()
            .repository_name("acme/shop")
            .commit_name("abc")
            .commit_author("dev")
            .build();
        let meta = GitMeta::from_options(&options).unwrap();
        assert_eq!(meta.repository_name, "acme/shop");
        assert_eq!(meta.author, "dev");
    }
}
