// SPDX-License-Identifier: Apache-2.0

//! Directory walking with classification.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::classifier::PathClassifier;
use crate::error::ScanError;

/// Returns the directory to walk for a scan root.
///
/// The empty root means the current working directory.
#[must_use]
pub fn walk_root(root: &Path) -> PathBuf {
    if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    }
}

/// Walks `root` and returns every file the classifier does not exclude.
///
/// When `prune_dirs` is set, directories the classifier
/// [prunes](PathClassifier::prunes_dir) are not descended into. Every file
/// reached is still classified on its own path. Unreadable entries are
/// logged and skipped.
///
/// # Errors
///
/// Returns `ScanError::Discovery` if `root` is not a directory.
pub fn walk_files(
    root: &Path,
    classifier: &PathClassifier,
    prune_dirs: bool,
) -> Result<Vec<PathBuf>, ScanError> {
    let root = walk_root(root);
    if !root.is_dir() {
        return Err(ScanError::Discovery {
            message: format!("{} is not a directory", root.display()),
        });
    }

    let keep_dir = |entry: &DirEntry| {
        entry.depth() == 0
            || !prune_dirs
            || !entry.file_type().is_dir()
            || !classifier.prunes_dir(entry.path())
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_dir)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if classifier.is_excluded_path(entry.path()) {
            tracing::trace!(path = %entry.path().display(), "Excluded");
            continue;
        }

        files.push(entry.into_path());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let nm = dir.path().join("node_modules").join("left-pad");
        fs::create_dir_all(&nm).unwrap();
        fs::write(nm.join("package.json"), "{}").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("index.js"), "").unwrap();
        dir
    }

    fn classifier(exclusions: &[&str], inclusions: &[&str]) -> PathClassifier {
        let ex: Vec<String> = exclusions.iter().map(|s| (*s).to_string()).collect();
        let inc: Vec<String> = inclusions.iter().map(|s| (*s).to_string()).collect();
        PathClassifier::new(&ex, &inc).unwrap()
    }

    #[test]
    fn test_walk_excludes_node_modules() {
        let dir = create_test_dir();
        let files = walk_files(dir.path(), &classifier(&["**/node_modules/**"], &[]), true).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.to_string_lossy().contains("node_modules")));
    }

    #[test]
    fn test_walk_without_pruning_honors_inclusions() {
        let dir = create_test_dir();
        let files = walk_files(
            dir.path(),
            &classifier(&["**/node_modules/**"], &["**/package.json"]),
            false,
        )
        .unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_walk_keeps_files_below_single_star_exclusion() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("composer").join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("package.json"), "{}").unwrap();
        fs::write(dir.path().join("composer").join("installed.json"), "{}").unwrap();

        let classifier = classifier(&["**/composer/*"], &[]);
        let files = walk_files(dir.path(), &classifier, true).unwrap();

        assert_eq!(files, vec![nested.join("package.json")]);
        assert_eq!(files, walk_files(dir.path(), &classifier, false).unwrap());
    }

    #[test]
    fn test_walk_descends_into_directory_named_like_excluded_file() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("fixtures.json");
        fs::create_dir_all(&odd).unwrap();
        fs::write(odd.join("go.mod"), "module x\n").unwrap();

        let files = walk_files(dir.path(), &classifier(&["**/*.json"], &[]), true).unwrap();
        assert_eq!(files, vec![odd.join("go.mod")]);
    }

    #[test]
    fn test_walk_missing_root() {
        let dir = create_test_dir();
        let missing = dir.path().join("missing");
        let err = walk_files(&missing, &classifier(&[], &[]), true).unwrap_err();
        assert!(matches!(err, ScanError::Discovery { .. }));
    }

    #[test]
    fn test_walk_root_empty_is_current_dir() {
        assert_eq!(walk_root(Path::new("")), PathBuf::from("."));
        assert_eq!(walk_root(Path::new("a")), PathBuf::from("a"));
    }
}
