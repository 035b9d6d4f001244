// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};
use std::path::Path;

use console::style;

use crate::cli::OutputContext;
use crate::commands::types::{FilesResult, FingerprintResult};

use super::Renderable;

/// Shows `path` relative to `root` when possible.
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

impl Renderable for FilesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(
                w,
                "{}",
                style(format!(
                    "No dependency files found in {}",
                    self.root.display()
                ))
                .yellow()
            )?;
            return Ok(());
        }

        writeln!(w)?;
        writeln!(
            w,
            "{}",
            style(format!(
                "{} dependency file groups in {}:",
                self.groups.len(),
                self.root.display()
            ))
            .bold()
        )?;
        writeln!(w)?;

        for group in &self.groups {
            match &group.manifest_file {
                Some(manifest) => {
                    writeln!(w, "  {}", style(display_path(&self.root, manifest)).cyan())?;
                }
                None => writeln!(w, "  {}", style("(no manifest)").dim())?,
            }
            for lock in &group.lock_files {
                writeln!(w, "    {}", display_path(&self.root, lock))?;
            }
        }

        writeln!(w)?;
        Ok(())
    }
}

impl Renderable for FingerprintResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        if ctx.verbose {
            for file in &self.files {
                writeln!(
                    w,
                    "  {} {:>8} {}",
                    style(&file.digest[..12.min(file.digest.len())]).dim(),
                    file.length,
                    file.path
                )?;
            }
        }
        writeln!(
            w,
            "{} Fingerprinted {} files into {}",
            style("✓").green(),
            self.files.len(),
            self.output.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::commands::types::FingerprintEntry;
    use depsweep_core::FileGroup;
    use std::path::PathBuf;

    fn ctx(verbose: bool) -> OutputContext {
        OutputContext {
            format: OutputFormat::Text,
            quiet: false,
            verbose,
            is_tty: false,
        }
    }

    #[test]
    fn test_files_text_shows_relative_paths() {
        let result = FilesResult {
            root: PathBuf::from("/work/shop"),
            groups: vec![
                FileGroup {
                    manifest_file: Some(PathBuf::from("/work/shop/web/package.json")),
                    lock_files: vec![PathBuf::from("/work/shop/web/yarn.lock")],
                },
                FileGroup {
                    manifest_file: None,
                    lock_files: vec![PathBuf::from("/work/shop/go.sum")],
                },
            ],
        };

        let mut out = Vec::new();
        result.render_text(&mut out, &ctx(false)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("2 dependency file groups"));
        assert!(text.contains("web/package.json"));
        assert!(text.contains("    web/yarn.lock"));
        assert!(text.contains("(no manifest)"));
        assert!(!text.contains("/work/shop/web"));
    }

    #[test]
    fn test_files_text_empty() {
        let result = FilesResult {
            root: PathBuf::from("."),
            groups: Vec::new(),
        };
        let mut out = Vec::new();
        result.render_text(&mut out, &ctx(false)).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No dependency files"));
    }

    #[test]
    fn test_fingerprint_text_lists_files_when_verbose() {
        let result = FingerprintResult {
            output: PathBuf::from("depsweep.fingerprints.txt"),
            files: vec![FingerprintEntry {
                path: "src/main.py".to_string(),
                digest: "ab".repeat(32),
                length: 120,
            }],
        };

        let mut quiet = Vec::new();
        result.render_text(&mut quiet, &ctx(false)).unwrap();
        let quiet = String::from_utf8(quiet).unwrap();
        assert!(quiet.contains("Fingerprinted 1 files"));
        assert!(!quiet.contains("src/main.py"));

        let mut verbose = Vec::new();
        result.render_text(&mut verbose, &ctx(true)).unwrap();
        assert!(String::from_utf8(verbose).unwrap().contains("src/main.py"));
    }
}
