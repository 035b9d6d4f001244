// SPDX-License-Identifier: Apache-2.0

//! File fingerprinting for source identification.
//!
//! Hashes every non-excluded file under a root so the backend can match
//! vendored or copied third-party code against its knowledge base.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use super::classifier::{PatternSet, normalize_path};
use super::walk::walk_files;
use crate::error::ScanError;

/// Name of the file fingerprints are written to.
pub const OUTPUT_FILE_NAME_FINGERPRINTS: &str = "depsweep.fingerprints.txt";

/// Default minimum content length for a file to be fingerprinted.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 45;

/// Options for a fingerprinting run.
#[derive(Debug, Clone)]
pub struct FingerprintOptions {
    /// Root to fingerprint. Empty means the current directory.
    pub root: PathBuf,
    /// Exclusion and inclusion patterns.
    pub patterns: PatternSet,
    /// Files shorter than this many bytes are skipped.
    pub min_content_length: usize,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            patterns: PatternSet::fingerprint(&[], &[]),
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
        }
    }
}

/// Fingerprint of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    /// Path as walked, `/`-separated.
    pub path: String,
    /// Hex-encoded SHA-256 of the content.
    pub digest: String,
    /// Content length in bytes.
    pub length: u64,
}

/// Fingerprints for a tree, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprints {
    entries: Vec<FileFingerprint>,
}

impl Fingerprints {
    /// Creates a collection, sorting entries by path.
    #[must_use]
    pub fn new(mut entries: Vec<FileFingerprint>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    /// Number of fingerprinted files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no file was fingerprinted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the fingerprints.
    pub fn iter(&self) -> impl Iterator<Item = &FileFingerprint> {
        self.entries.iter()
    }

    /// Renders the fingerprint file contents, one `file=<digest>,<length>,<path>` line per entry.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "file={},{},{}", entry.digest, entry.length, entry.path);
        }
        out
    }

    /// Writes the fingerprints to `path`, replacing any existing file.
    pub fn to_file(&self, path: &Path) -> Result<(), ScanError> {
        let io_err = |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = fs::File::create(path).map_err(io_err)?;
        file.write_all(self.render().as_bytes()).map_err(io_err)?;
        tracing::info!(files = self.len(), path = %path.display(), "Wrote fingerprints");
        Ok(())
    }
}

/// Produces fingerprints for a tree.
pub trait Fingerprinter: Send + Sync {
    /// Fingerprints every non-excluded file under the configured root.
    fn fingerprint_files(&self, options: &FingerprintOptions) -> Result<Fingerprints, ScanError>;
}

/// Filesystem-backed [`Fingerprinter`] hashing files in parallel.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFingerprinter;

impl FileFingerprinter {
    /// Creates a new fingerprinter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn fingerprint_file(path: &Path, min_length: usize) -> Result<Option<FileFingerprint>, ScanError> {
    let content = fs::read(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.len() < min_length {
        return Ok(None);
    }

    Ok(Some(FileFingerprint {
        path: normalize_path(&path.to_string_lossy()).into_owned(),
        digest: hex::encode(Sha256::digest(&content)),
        length: content.len() as u64,
    }))
}

impl Fingerprinter for FileFingerprinter {
    fn fingerprint_files(&self, options: &FingerprintOptions) -> Result<Fingerprints, ScanError> {
        let classifier = options.patterns.compile()?;
        let prune = options.patterns.inclusions.is_empty();
        let files: Vec<PathBuf> = walk_files(&options.root, &classifier, prune)?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .is_none_or(|name| name != OUTPUT_FILE_NAME_FINGERPRINTS)
            })
            .collect();

        tracing::debug!(candidates = files.len(), "Fingerprinting files");

        let entries = files
            .par_iter()
            .map(|path| fingerprint_file(path, options.min_content_length))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Fingerprints::new(entries.into_iter().flatten().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LONG: &str = "This line is comfortably longer than the minimum content length.";

    fn create_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("__pycache__")).unwrap();
        fs::create_dir_all(dir.path().join("lib").join("pkg.egg-info")).unwrap();
        fs::write(dir.path().join("src").join("main.py"), LONG).unwrap();
        fs::write(dir.path().join("src").join("tiny.py"), "x = 1").unwrap();
        fs::write(dir.path().join("__pycache__").join("main.pyc"), LONG).unwrap();
        fs::write(dir.path().join("lib").join("pkg.egg-info").join("PKG-INFO"), LONG).unwrap();
        dir
    }

    #[test]
    fn test_fingerprints_skip_excluded_and_short_files() {
        let dir = create_tree();
        let options = FingerprintOptions {
            root: dir.path().to_path_buf(),
            ..FingerprintOptions::default()
        };

        let fingerprints = FileFingerprinter::new().fingerprint_files(&options).unwrap();
        assert_eq!(fingerprints.len(), 1);

        let entry = fingerprints.iter().next().unwrap();
        assert!(entry.path.ends_with("src/main.py"));
        assert_eq!(entry.length, LONG.len() as u64);
        assert_eq!(entry.digest, hex::encode(Sha256::digest(LONG.as_bytes())));
    }

    #[test]
    fn test_min_content_length_zero_keeps_small_files() {
        let dir = create_tree();
        let options = FingerprintOptions {
            root: dir.path().to_path_buf(),
            min_content_length: 0,
            ..FingerprintOptions::default()
        };

        let fingerprints = FileFingerprinter::new().fingerprint_files(&options).unwrap();
        assert_eq!(fingerprints.len(), 2);
    }

    #[test]
    fn test_fingerprints_sorted_and_rendered() {
        let fingerprints = Fingerprints::new(vec![
            FileFingerprint {
                path: "b.txt".to_string(),
                digest: "bb".to_string(),
                length: 2,
            },
            FileFingerprint {
                path: "a.txt".to_string(),
                digest: "aa".to_string(),
                length: 1,
            },
        ]);
        assert_eq!(fingerprints.render(), "file=aa,1,a.txt\nfile=bb,2,b.txt\n");
    }

    #[test]
    fn test_to_file_writes_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join(OUTPUT_FILE_NAME_FINGERPRINTS);
        let fingerprints = Fingerprints::new(vec![FileFingerprint {
            path: "a.txt".to_string(),
            digest: "aa".to_string(),
            length: 1,
        }]);
        fingerprints.to_file(&out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "file=aa,1,a.txt\n");
    }

    #[test]
    fn test_output_file_is_not_fingerprinted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(OUTPUT_FILE_NAME_FINGERPRINTS), LONG).unwrap();
        let options = FingerprintOptions {
            root: dir.path().to_path_buf(),
            ..FingerprintOptions::default()
        };
        let fingerprints = FileFingerprinter::new().fingerprint_files(&options).unwrap();
        assert!(fingerprints.is_empty());
    }
}
