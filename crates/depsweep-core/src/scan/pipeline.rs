// SPDX-License-Identifier: Apache-2.0

//! Scan orchestration.
//!
//! [`Scanner`] wires the collaborators together and runs one scan:
//!
//! 1. validate options and backfill them from CI
//! 2. enter the scan root
//! 3. resolve, fingerprint, generate call graphs (each optional)
//! 4. discover file groups and upload them
//! 5. order an SBOM (optional)
//! 6. write the reply, render rule cards and apply the verdict

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bon::Builder;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::ci::CiService;
use super::options::{Clock, ScanOptions, SystemClock};
use super::stages::{
    CallGraphGenerator, CallGraphOptions, ResolveOptions, Resolver, SbomOrder, SbomReporter,
    default_call_graph_configs, parse_details_url,
};
use super::upload::{Entitlements, GitMeta, UploadOptions, UploadResult, Uploader};
use super::verdict;
use crate::error::ScanError;
use crate::file::fingerprint::{
    FingerprintOptions, Fingerprinter, OUTPUT_FILE_NAME_FINGERPRINTS,
};
use crate::file::{Finder, FinderOptions, PatternSet};

/// Runs scans against a set of collaborators.
#[derive(Builder)]
pub struct Scanner {
    finder: Arc<dyn Finder>,
    uploader: Arc<dyn Uploader>,
    ci_service: Arc<dyn CiService>,
    fingerprinter: Arc<dyn Fingerprinter>,
    resolver: Option<Arc<dyn Resolver>>,
    call_graph: Option<Arc<dyn CallGraphGenerator>>,
    sbom_reporter: Option<Arc<dyn SbomReporter>>,
    entitlements: Option<Arc<dyn Entitlements>>,
    #[builder(default = Arc::new(SystemClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,
}

fn output_error(source: io::Error) -> ScanError {
    ScanError::Io {
        path: PathBuf::from("<output>"),
        source,
    }
}

impl Scanner {
    /// Runs one scan, writing user-facing progress and results to `out`.
    ///
    /// Changes the process working directory to the scan root.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::PipelineFailed` when a triggered rule fails the
    /// pipeline, or the error of the first failing stage.
    #[instrument(skip_all, fields(path = %options.path.display()))]
    pub async fn scan(
        &self,
        mut options: ScanOptions,
        out: &mut (dyn Write + Send),
    ) -> Result<(), ScanError> {
        self.check_collaborators(&options)?;
        options.validate()?;

        debug!("Finding CI environment");
        if let Some(env) = self.ci_service.find() {
            options.apply_ci_env(&env);
        }
        options.ensure_commit_name(self.clock.as_ref());

        let root = options.set_working_directory()?;
        writeln!(out, "Working directory: {}", root.display()).map_err(output_error)?;

        let git_meta = GitMeta::from_options(&options)?;

        let result = match self.run_stages(&options, git_meta).await {
            Ok(result) => result,
            Err(e) => return handle_scan_error(e, options.pass_on_timeout, out),
        };

        if result.long_queue {
            writeln!(
                out,
                "Scan is queued and results will be available later.\nFor full details, visit: {}",
                result.details_url
            )
            .map_err(output_error)?;
            return Ok(());
        }

        if let Some(path) = &options.json_file_path {
            write_api_reply_to_json_file(path, &result)?;
        }

        verdict::render_result(out, &result).map_err(output_error)?;

        let verdict = verdict::evaluate(&result.automation_rules);
        info!(
            vulnerabilities = result.vulnerabilities_found,
            triggered = verdict.triggered,
            fail_pipeline = verdict.fail_pipeline,
            "Scan complete"
        );
        verdict.into_result()
    }

    fn check_collaborators(&self, options: &ScanOptions) -> Result<(), ScanError> {
        if options.resolve && self.resolver.is_none() {
            return Err(ScanError::config(
                "dependency resolution requested but no resolver is available",
            ));
        }
        if options.call_graph && self.call_graph.is_none() {
            return Err(ScanError::config(
                "call graph generation requested but no generator is available",
            ));
        }
        if options.sbom.is_some() && self.sbom_reporter.is_none() {
            return Err(ScanError::config(
                "SBOM report requested but no reporter is available",
            ));
        }
        Ok(())
    }

    async fn run_stages(
        &self,
        options: &ScanOptions,
        git_meta: GitMeta,
    ) -> Result<UploadResult, ScanError> {
        self.scan_resolve(options).await?;
        self.scan_fingerprint(options).await?;
        self.scan_call_graph(options).await?;

        let groups = self.finder.get_groups(&FinderOptions {
            root: options.path.clone(),
            patterns: options.patterns.clone(),
            lock_file_only: false,
        })?;
        debug!(groups = groups.len(), "Discovered file groups");

        let upload_options = UploadOptions {
            file_groups: groups,
            git_meta,
            integration_name: options.effective_integration_name().to_string(),
            call_graph_upload_timeout: options.call_graph_upload_timeout,
            version_hint: options.version_hint,
            config_path: self
                .finder
                .get_config_path(&options.path, &options.patterns),
            tag_commit_as_release: options.tag_commit_as_release,
            experimental: options.experimental,
        };
        let result = self.uploader.upload(&upload_options).await?;

        self.scan_report_sbom(options, &result).await?;
        Ok(result)
    }

    async fn scan_resolve(&self, options: &ScanOptions) -> Result<(), ScanError> {
        let Some(resolver) = self.resolver.as_ref().filter(|_| options.resolve) else {
            return Ok(());
        };

        debug!("Resolving dependencies");
        resolver
            .resolve(&ResolveOptions {
                paths: vec![options.path.clone()],
                patterns: options.patterns.clone(),
                regenerate: options.regenerate,
                npm_preferred: options.npm_preferred,
            })
            .await
    }

    async fn scan_fingerprint(&self, options: &ScanOptions) -> Result<(), ScanError> {
        if !options.fingerprint {
            return Ok(());
        }
        if let Some(entitlements) = &self.entitlements
            && !entitlements.fingerprinting_enabled().await
        {
            warn!("Fingerprinting is not enabled for this account, skipping");
            return Ok(());
        }

        debug!("Fingerprinting files");
        let fingerprinter = Arc::clone(&self.fingerprinter);
        let fingerprint_options = FingerprintOptions {
            root: options.path.clone(),
            patterns: PatternSet::fingerprint(
                &options.patterns.exclusions,
                &options.patterns.inclusions,
            ),
            min_content_length: options.min_fingerprint_content_length,
        };

        let fingerprints = tokio::task::spawn_blocking(move || {
            fingerprinter.fingerprint_files(&fingerprint_options)
        })
        .await
        .map_err(|e| ScanError::Fingerprint {
            message: e.to_string(),
        })??;

        fingerprints.to_file(Path::new(OUTPUT_FILE_NAME_FINGERPRINTS))
    }

    async fn scan_call_graph(&self, options: &ScanOptions) -> Result<(), ScanError> {
        let Some(generator) = self.call_graph.as_ref().filter(|_| options.call_graph) else {
            return Ok(());
        };

        debug!("Generating call graphs");
        let root = if options.path.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            options.path.clone()
        };
        generator
            .generate(&CallGraphOptions {
                paths: vec![root],
                patterns: options.patterns.clone(),
                configs: default_call_graph_configs(&options.version),
                timeout: options.call_graph_generate_timeout,
            })
            .await
    }

    async fn scan_report_sbom(
        &self,
        options: &ScanOptions,
        result: &UploadResult,
    ) -> Result<(), ScanError> {
        let (Some(format), Some(reporter)) = (&options.sbom, &self.sbom_reporter) else {
            return Ok(());
        };

        let (repository_id, commit_id) = parse_details_url(&result.details_url)?;
        debug!(%repository_id, %commit_id, "Ordering SBOM report");
        reporter
            .order(&SbomOrder {
                format: format.clone(),
                repository_id,
                commit_id,
                branch: options.branch_name.clone(),
                vulnerabilities: true,
                licenses: true,
                output: options.sbom_output.clone(),
            })
            .await
    }
}

/// Turns a polling timeout into success when the caller allows it.
///
/// # Errors
///
/// Returns `err` unchanged unless it is `ScanError::NoResult` and
/// `pass_on_timeout` is set.
pub fn handle_scan_error(
    err: ScanError,
    pass_on_timeout: bool,
    out: &mut dyn Write,
) -> Result<(), ScanError> {
    if err.is_no_result() && pass_on_timeout {
        warn!("{err}");
        writeln!(out, "{err}").map_err(output_error)?;
        return Ok(());
    }
    Err(err)
}

/// Writes the upload reply as indented JSON, readable only by the owner.
///
/// # Errors
///
/// Returns `ScanError::Io` if the file cannot be written.
pub fn write_api_reply_to_json_file(path: &Path, result: &UploadResult) -> Result<(), ScanError> {
    let io_err = |source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    result
        .serialize(&mut serializer)
        .map_err(|e| io_err(io::Error::from(e)))?;

    let mut open = OpenOptions::new();
    open.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(0o600);
    }

    let mut file = open.open(path).map_err(io_err)?;
    file.write_all(&buf).map_err(io_err)?;
    debug!(path = %path.display(), "Wrote upload reply");
    Ok(())
}
