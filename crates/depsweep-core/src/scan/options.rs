// SPDX-License-Identifier: Apache-2.0

//! Scan options and their normalization.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use chrono::{DateTime, Utc};

use super::ci::CiEnv;
use crate::error::ScanError;
use crate::file::PatternSet;
use crate::file::fingerprint::DEFAULT_MIN_CONTENT_LENGTH;

/// Integration name used when neither the caller nor CI supplies one.
pub const DEFAULT_INTEGRATION_NAME: &str = "CLI";

/// SBOM formats accepted by the backend.
pub const SBOM_FORMATS: &[&str] = &["CycloneDX", "SPDX"];

/// Every input of a scan.
#[derive(Debug, Clone, Builder)]
pub struct ScanOptions {
    /// Root directory. Empty means the current directory.
    #[builder(into, default)]
    pub path: PathBuf,
    /// Run dependency resolution before discovery.
    #[builder(default)]
    pub resolve: bool,
    /// Fingerprint source files before discovery.
    #[builder(default)]
    pub fingerprint: bool,
    /// Generate call graphs before upload.
    #[builder(default)]
    pub call_graph: bool,
    /// SBOM format to order after upload.
    #[builder(into)]
    pub sbom: Option<String>,
    /// Where to write the SBOM report.
    #[builder(into)]
    pub sbom_output: Option<PathBuf>,
    /// Exclusion and inclusion patterns.
    #[builder(default = PatternSet::with_defaults())]
    pub patterns: PatternSet,
    /// Regeneration level for resolved lock files.
    #[builder(default)]
    pub regenerate: u8,
    /// Ask the backend to guess versions of unresolved dependencies.
    #[builder(default = true)]
    pub version_hint: bool,
    /// Repository name, e.g. `owner/repo`.
    #[builder(into, default)]
    pub repository_name: String,
    /// Commit name.
    #[builder(into, default)]
    pub commit_name: String,
    /// Generate a commit name when none is set.
    #[builder(default)]
    pub generate_commit_name: bool,
    /// Branch name.
    #[builder(into, default)]
    pub branch_name: String,
    /// Commit author.
    #[builder(into, default)]
    pub commit_author: String,
    /// Repository URL.
    #[builder(into, default)]
    pub repository_url: String,
    /// Integration name. `None` means [`DEFAULT_INTEGRATION_NAME`].
    #[builder(into)]
    pub integration_name: Option<String>,
    /// Write the raw upload reply to this file.
    #[builder(into)]
    pub json_file_path: Option<PathBuf>,
    /// Prefer npm over yarn when resolving.
    #[builder(default)]
    pub npm_preferred: bool,
    /// Treat a polling timeout as success.
    #[builder(default)]
    pub pass_on_timeout: bool,
    /// Time the backend may spend on call graph upload.
    #[builder(default = Duration::from_secs(600))]
    pub call_graph_upload_timeout: Duration,
    /// Time allowed for call graph generation.
    #[builder(default = Duration::from_secs(3600))]
    pub call_graph_generate_timeout: Duration,
    /// Files shorter than this are not fingerprinted.
    #[builder(default = DEFAULT_MIN_CONTENT_LENGTH)]
    pub min_fingerprint_content_length: usize,
    /// Tag the commit as a release.
    #[builder(default)]
    pub tag_commit_as_release: bool,
    /// Enable experimental backend features.
    #[builder(default)]
    pub experimental: bool,
    /// Client version reported in call graph configs.
    #[builder(into, default)]
    pub version: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Generates a commit name for scans without one, `generated-<unix seconds>`.
#[must_use]
pub fn generate_commit_name_timestamp(clock: &dyn Clock) -> String {
    format!("generated-{}", clock.now().timestamp())
}

impl ScanOptions {
    /// Integration name sent to the backend.
    #[must_use]
    pub fn effective_integration_name(&self) -> &str {
        self.integration_name
            .as_deref()
            .unwrap_or(DEFAULT_INTEGRATION_NAME)
    }

    /// Fills unset fields from a detected CI environment.
    ///
    /// Explicit values always win. The path is only taken from CI when the
    /// caller left it empty.
    pub fn apply_ci_env(&mut self, env: &CiEnv) {
        fill(&mut self.repository_name, &env.repository);
        fill(&mut self.commit_name, &env.commit);
        fill(&mut self.branch_name, &env.branch);
        fill(&mut self.commit_author, &env.author);
        fill(&mut self.repository_url, &env.repository_url);

        if self.integration_name.is_none() && !env.integration.is_empty() {
            self.integration_name = Some(env.integration.clone());
        }
        if self.path.as_os_str().is_empty() && !env.filepath.is_empty() {
            self.path = PathBuf::from(&env.filepath);
        }
    }

    /// Generates a commit name if requested and none is set.
    pub fn ensure_commit_name(&mut self, clock: &dyn Clock) {
        if self.generate_commit_name && self.commit_name.is_empty() {
            self.commit_name = generate_commit_name_timestamp(clock);
            tracing::debug!(commit = %self.commit_name, "Generated commit name");
        }
    }

    /// Checks option combinations and compiles the patterns.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Config` for an unknown SBOM format or an SBOM output
    /// without a format, and `ScanError::InvalidPattern` for a malformed glob.
    pub fn validate(&self) -> Result<(), ScanError> {
        if let Some(format) = &self.sbom
            && !SBOM_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format))
        {
            return Err(ScanError::config(format!(
                "unsupported SBOM format '{format}', expected one of: {}",
                SBOM_FORMATS.join(", ")
            )));
        }
        if self.sbom.is_none() && self.sbom_output.is_some() {
            return Err(ScanError::config("an SBOM output requires an SBOM format"));
        }
        if self.call_graph && self.call_graph_generate_timeout.is_zero() {
            return Err(ScanError::config(
                "call graph generation timeout must be greater than zero",
            ));
        }
        self.patterns.compile()?;
        Ok(())
    }

    /// Makes the scan root the working directory and resets `path` to empty.
    ///
    /// Returns the absolute root.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::WorkingDirectory` if the root cannot be resolved or
    /// entered.
    pub fn set_working_directory(&mut self) -> Result<PathBuf, ScanError> {
        let absolute = absolute_root(&self.path)?;
        std::env::set_current_dir(&absolute).map_err(|source| ScanError::WorkingDirectory {
            path: absolute.clone(),
            source,
        })?;
        self.path = PathBuf::new();
        Ok(absolute)
    }
}

fn fill(field: &mut String, value: &str) {
    if field.is_empty() && !value.is_empty() {
        value.clone_into(field);
    }
}

fn absolute_root(path: &Path) -> Result<PathBuf, ScanError> {
    let result = if path.as_os_str().is_empty() {
        std::env::current_dir()
    } else {
        std::path::absolute(path)
    };
    result.map_err(|source| ScanError::WorkingDirectory {
        path: path.to_path_buf(),
        source,
    })
}
