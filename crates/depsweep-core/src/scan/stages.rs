// SPDX-License-Identifier: Apache-2.0

//! Seams for the optional pre-upload stages and the SBOM report.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use crate::error::ScanError;
use crate::file::PatternSet;

/// Inputs to dependency resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Paths to resolve.
    pub paths: Vec<PathBuf>,
    /// Exclusion and inclusion patterns.
    pub patterns: PatternSet,
    /// Regeneration level for lock files.
    pub regenerate: u8,
    /// Prefer npm over yarn.
    pub npm_preferred: bool,
}

/// Produces lock files for manifests that lack them.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves dependencies in place.
    async fn resolve(&self, options: &ResolveOptions) -> Result<(), ScanError>;
}

/// Call graph configuration for one language toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallGraphConfig {
    /// Language, e.g. `java`.
    pub language: String,
    /// Extra arguments for the generator.
    pub args: Vec<String>,
    /// Extra keyword arguments for the generator.
    pub kwargs: BTreeMap<String, String>,
    /// Build the project before generating.
    pub build: bool,
    /// Package manager, e.g. `maven`.
    pub package_manager: String,
    /// Client version.
    pub version: String,
}

impl CallGraphConfig {
    /// Builds the project first and passes the package manager as `pm`.
    fn new(language: &str, package_manager: &str, version: &str) -> Self {
        Self {
            language: language.to_string(),
            args: Vec::new(),
            kwargs: BTreeMap::from([("pm".to_string(), package_manager.to_string())]),
            build: true,
            package_manager: package_manager.to_string(),
            version: version.to_string(),
        }
    }
}

/// Configurations generated by default: Java with Maven and Go with go modules.
#[must_use]
pub fn default_call_graph_configs(version: &str) -> Vec<CallGraphConfig> {
    vec![
        CallGraphConfig::new("java", "maven", version),
        CallGraphConfig::new("golang", "go", version),
    ]
}

/// Inputs to call graph generation.
#[derive(Debug, Clone, Default)]
pub struct CallGraphOptions {
    /// Paths to analyse.
    pub paths: Vec<PathBuf>,
    /// Exclusion and inclusion patterns.
    pub patterns: PatternSet,
    /// Toolchain configurations.
    pub configs: Vec<CallGraphConfig>,
    /// Time allowed for generation.
    pub timeout: Duration,
}

/// Generates reachability call graphs.
///
/// The generator owns its cancellation: the pipeline awaits it without a
/// deadline of its own.
#[async_trait]
pub trait CallGraphGenerator: Send + Sync {
    /// Generates call graphs within `options.timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::call_graph_timeout`] once the budget is spent, or
    /// `ScanError::CallGraph` for any other failure.
    async fn generate(&self, options: &CallGraphOptions) -> Result<(), ScanError>;
}

/// An SBOM report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SbomOrder {
    /// Report format.
    pub format: String,
    /// Backend repository id.
    pub repository_id: String,
    /// Backend commit id.
    pub commit_id: String,
    /// Branch name.
    pub branch: String,
    /// Include vulnerability data.
    pub vulnerabilities: bool,
    /// Include license data.
    pub licenses: bool,
    /// Output file.
    #[serde(skip)]
    pub output: Option<PathBuf>,
}

/// Orders SBOM reports.
#[async_trait]
pub trait SbomReporter: Send + Sync {
    /// Orders the report and writes it to its output.
    async fn order(&self, order: &SbomOrder) -> Result<(), ScanError>;
}

static DETAILS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/repository/(\d+)/commit/(\d+)").expect("valid details URL regex")
});

/// Extracts the repository and commit ids from a scan details URL.
///
/// # Errors
///
/// Returns `ScanError::Sbom` if the URL has no `repository/<id>/commit/<id>` segment.
pub fn parse_details_url(url: &str) -> Result<(String, String), ScanError> {
    let captures = DETAILS_URL.captures(url).ok_or_else(|| ScanError::Sbom {
        message: format!("cannot find repository and commit ids in '{url}'"),
    })?;
    Ok((captures[1].to_string(), captures[2].to_string()))
}
