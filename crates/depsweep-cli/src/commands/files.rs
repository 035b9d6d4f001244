// SPDX-License-Identifier: Apache-2.0

//! File inspection commands: list dependency file groups and fingerprint
//! source files without uploading anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use depsweep_core::{
    FileFingerprinter, Finder, FinderOptions, FingerprintOptions, Fingerprinter, OUTPUT_FILE_NAME_FINGERPRINTS,
    PatternSet, WalkFinder, default_exclusions_fingerprint,
};
use tracing::debug;

use super::types::{FilesResult, FingerprintResult};

/// Lists dependency file groups under `root`.
///
/// `exclusions` replaces the startup exclusion set when non-empty.
pub fn find(
    root: PathBuf,
    exclusions: Vec<String>,
    startup_exclusions: &[String],
    inclusions: &[String],
    lock_file_only: bool,
) -> Result<FilesResult> {
    let exclusions = if exclusions.is_empty() {
        startup_exclusions.to_vec()
    } else {
        exclusions
    };
    debug!(?exclusions, ?inclusions, "Finding dependency files");

    let options = FinderOptions {
        root: root.clone(),
        patterns: PatternSet::general(exclusions, inclusions),
        lock_file_only,
    };
    let groups = WalkFinder::new().get_groups(&options)?;

    Ok(FilesResult {
        root: if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root
        },
        groups,
    })
}

/// Fingerprints source files under `root` and writes the fingerprint file
/// into `root`.
///
/// `exclusions` replaces the fingerprint defaults when non-empty.
pub fn fingerprint(
    root: PathBuf,
    exclusions: Vec<String>,
    inclusions: &[String],
    min_content_length: usize,
) -> Result<FingerprintResult> {
    let exclusions = if exclusions.is_empty() {
        default_exclusions_fingerprint()
    } else {
        exclusions
    };
    debug!(?exclusions, ?inclusions, min_content_length, "Fingerprinting files");

    let options = FingerprintOptions {
        root: root.clone(),
        patterns: PatternSet::new(exclusions, inclusions.to_vec()),
        min_content_length,
    };
    let fingerprints = FileFingerprinter::new().fingerprint_files(&options)?;

    let output = root.join(OUTPUT_FILE_NAME_FINGERPRINTS);
    fingerprints
        .to_file(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(FingerprintResult::new(output, &fingerprints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_uses_startup_exclusions_by_default() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/left-pad")).unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("node_modules/left-pad/package.json"), "{}").unwrap();

        let startup = vec!["**/node_modules/**".to_string()];
        let result = find(dir.path().to_path_buf(), Vec::new(), &startup, &[], false).unwrap();
        assert_eq!(result.groups.len(), 1);

        let result = find(
            dir.path().to_path_buf(),
            vec!["**/nothing/**".to_string()],
            &startup,
            &[],
            false,
        )
        .unwrap();
        assert_eq!(result.groups.len(), 2);
    }

    #[test]
    fn test_fingerprint_writes_into_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("main.py"),
            "print('hello from a file long enough to be fingerprinted')\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("tiny.py"), "x = 1\n").unwrap();

        let result = fingerprint(dir.path().to_path_buf(), Vec::new(), &[], 45).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("main.py"));
        let written = std::fs::read_to_string(&result.output).unwrap();
        assert!(written.starts_with("file="));
    }
}
