// SPDX-License-Identifier: Apache-2.0

//! The `scan` command: wires the backend client and filesystem collaborators
//! into a [`Scanner`] and runs it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use depsweep_core::{
    ApiClient, AppConfig, EnvCiService, FileFingerprinter, PatternSet, ScanOptions, Scanner,
    WalkFinder, token_from_env,
};
use tracing::debug;

use crate::cli::ScanArgs;

/// Builds scan options from flags, falling back to config for unset values.
///
/// Explicit `--exclusion` flags replace `startup_exclusions`.
pub fn build_options(
    args: ScanArgs,
    config: &AppConfig,
    startup_exclusions: &[String],
) -> ScanOptions {
    let exclusions = if args.exclusions.is_empty() {
        startup_exclusions.to_vec()
    } else {
        args.exclusions
    };

    let upload_timeout = args
        .callgraph_upload_timeout
        .unwrap_or(config.scan.callgraph_upload_timeout_seconds);

    ScanOptions::builder()
        .path(args.path.unwrap_or_default())
        .fingerprint(args.fingerprint)
        .maybe_sbom(args.sbom)
        .maybe_sbom_output(args.sbom_output)
        .patterns(PatternSet::general(exclusions, &args.inclusions))
        .regenerate(args.regenerate)
        .version_hint(args.version_hint)
        .repository_name(args.repository.unwrap_or_default())
        .commit_name(args.commit.unwrap_or_default())
        .generate_commit_name(args.generate_commit_name)
        .branch_name(args.branch.unwrap_or_default())
        .commit_author(args.author.unwrap_or_default())
        .repository_url(args.repository_url.unwrap_or_default())
        .maybe_integration_name(args.integration)
        .maybe_json_file_path(args.json_path)
        .npm_preferred(args.prefer_npm)
        .pass_on_timeout(args.pass_on_timeout || config.scan.pass_on_timeout)
        .call_graph_upload_timeout(Duration::from_secs(upload_timeout))
        .call_graph_generate_timeout(Duration::from_secs(
            config.scan.callgraph_generate_timeout_seconds,
        ))
        .min_fingerprint_content_length(
            args.min_fingerprint_content_length
                .unwrap_or(config.scan.min_fingerprint_content_length),
        )
        .tag_commit_as_release(args.tag_commit_as_release)
        .experimental(args.experimental)
        .version(env!("CARGO_PKG_VERSION"))
        .build()
}

/// Runs a scan against the configured backend, printing progress to stdout.
pub async fn run(args: ScanArgs, config: &AppConfig, startup_exclusions: &[String]) -> Result<()> {
    let options = build_options(args, config, startup_exclusions);

    let client = Arc::new(ApiClient::new(&config.api, token_from_env())?);
    debug!(base_url = %config.api.base_url, "Using backend");

    let scanner = Scanner::builder()
        .finder(Arc::new(WalkFinder::new()))
        .uploader(client.clone())
        .ci_service(Arc::new(EnvCiService::from_process()))
        .fingerprinter(Arc::new(FileFingerprinter::new()))
        .entitlements(client.clone())
        .sbom_reporter(client)
        .build();

    let mut stdout = std::io::stdout();
    scanner.scan(options, &mut stdout).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> ScanArgs {
        let mut argv = vec!["depsweep", "scan"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Scan(args) => *args,
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_defaults_come_from_config() {
        let mut config = AppConfig::default();
        config.scan.callgraph_upload_timeout_seconds = 42;
        config.scan.min_fingerprint_content_length = 10;
        config.scan.pass_on_timeout = true;

        let startup = vec!["**/node_modules/**".to_string()];
        let options = build_options(parse(&[]), &config, &startup);

        assert_eq!(options.call_graph_upload_timeout, Duration::from_secs(42));
        assert_eq!(options.min_fingerprint_content_length, 10);
        assert!(options.pass_on_timeout);
        assert!(options.version_hint);
        assert_eq!(options.patterns.exclusions, startup);
        assert!(options.integration_name.is_none());
        assert!(options.path.as_os_str().is_empty());
    }

    #[test]
    fn test_flags_override_config() {
        let options = build_options(
            parse(&[
                "app",
                "-e",
                "**/dist/**",
                "-i",
                "**/package.json",
                "--callgraph-upload-timeout",
                "5",
                "--integration",
                "jenkins",
                "-r",
                "acme/shop",
                "-c",
                "abc123",
            ]),
            &AppConfig::default(),
            &["**/node_modules/**".to_string()],
        );

        assert_eq!(options.patterns.exclusions, vec!["**/dist/**"]);
        assert_eq!(options.patterns.inclusions, vec!["**/package.json"]);
        assert_eq!(options.call_graph_upload_timeout, Duration::from_secs(5));
        assert_eq!(options.effective_integration_name(), "jenkins");
        assert_eq!(options.repository_name, "acme/shop");
        assert_eq!(options.commit_name, "abc123");
        assert_eq!(options.path, std::path::PathBuf::from("app"));
    }
}
