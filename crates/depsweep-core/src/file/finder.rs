// SPDX-License-Identifier: Apache-2.0

//! Dependency file discovery and grouping.
//!
//! The finder walks a root, drops excluded paths and bundles each recognised
//! manifest with the lock files next to it. One bundle is one [`FileGroup`],
//! the unit sent for analysis.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::classifier::PatternSet;
use super::walk::{walk_files, walk_root};
use crate::error::ScanError;

/// Project configuration file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".depsweep.yaml", ".depsweep.yml"];

/// A manifest and the lock files that belong to it.
struct Format {
    manifest: &'static str,
    lock_files: &'static [&'static str],
}

/// Recognised dependency file formats.
const FORMATS: &[Format] = &[
    Format {
        manifest: "package.json",
        lock_files: &["package-lock.json", "yarn.lock", "pnpm-lock.yaml"],
    },
    Format {
        manifest: "composer.json",
        lock_files: &["composer.lock"],
    },
    Format {
        manifest: "go.mod",
        lock_files: &["go.sum"],
    },
    Format {
        manifest: "Cargo.toml",
        lock_files: &["Cargo.lock"],
    },
    Format {
        manifest: "Gemfile",
        lock_files: &["Gemfile.lock"],
    },
    Format {
        manifest: "Pipfile",
        lock_files: &["Pipfile.lock"],
    },
    Format {
        manifest: "pyproject.toml",
        lock_files: &["poetry.lock"],
    },
    Format {
        manifest: "pom.xml",
        lock_files: &[],
    },
    Format {
        manifest: "build.gradle",
        lock_files: &[],
    },
    Format {
        manifest: "requirements.txt",
        lock_files: &[],
    },
];

/// One logical dependency unit: a manifest and its lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
    /// Manifest path, absent for lock files found without their manifest.
    pub manifest_file: Option<PathBuf>,
    /// Lock files found next to the manifest.
    pub lock_files: Vec<PathBuf>,
}

impl FileGroup {
    /// Returns true if this group carries at least one lock file.
    #[must_use]
    pub fn has_lock_files(&self) -> bool {
        !self.lock_files.is_empty()
    }

    /// Every file in the group, manifest first.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.manifest_file.iter().chain(self.lock_files.iter())
    }
}

/// Options for file discovery.
#[derive(Debug, Clone, Default)]
pub struct FinderOptions {
    /// Root to search. Empty means the current directory.
    pub root: PathBuf,
    /// Exclusion and inclusion patterns.
    pub patterns: PatternSet,
    /// Keep only groups that contain lock files.
    pub lock_file_only: bool,
}

/// Discovers dependency files for upload.
pub trait Finder: Send + Sync {
    /// Returns the file groups under the configured root.
    fn get_groups(&self, options: &FinderOptions) -> Result<Vec<FileGroup>, ScanError>;

    /// Returns the project configuration file, if one exists and is not excluded.
    fn get_config_path(&self, root: &Path, patterns: &PatternSet) -> Option<PathBuf>;
}

/// Filesystem-backed [`Finder`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkFinder;

impl WalkFinder {
    /// Creates a new finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Finder for WalkFinder {
    fn get_groups(&self, options: &FinderOptions) -> Result<Vec<FileGroup>, ScanError> {
        let classifier = options.patterns.compile()?;
        let prune = options.patterns.inclusions.is_empty();
        let files = walk_files(&options.root, &classifier, prune)?;

        // directory -> file name -> path
        let mut by_dir: BTreeMap<PathBuf, BTreeMap<String, PathBuf>> = BTreeMap::new();
        for file in files {
            let (Some(dir), Some(name)) = (file.parent(), file.file_name()) else {
                continue;
            };
            by_dir
                .entry(dir.to_path_buf())
                .or_default()
                .insert(name.to_string_lossy().into_owned(), file.clone());
        }

        let mut groups = Vec::new();
        for files in by_dir.values() {
            for format in FORMATS {
                let manifest = files.get(format.manifest).cloned();
                let lock_files: Vec<PathBuf> = format
                    .lock_files
                    .iter()
                    .filter_map(|name| files.get(*name).cloned())
                    .collect();

                if manifest.is_none() && lock_files.is_empty() {
                    continue;
                }

                groups.push(FileGroup {
                    manifest_file: manifest,
                    lock_files,
                });
            }
        }

        if options.lock_file_only {
            groups.retain(FileGroup::has_lock_files);
        }

        tracing::debug!(groups = groups.len(), "Matched file groups");
        Ok(groups)
    }

    fn get_config_path(&self, root: &Path, patterns: &PatternSet) -> Option<PathBuf> {
        let classifier = match patterns.compile() {
            Ok(classifier) => classifier,
            Err(e) => {
                tracing::warn!("Cannot look up project config: {e}");
                return None;
            }
        };
        let root = walk_root(root);

        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file() && !classifier.is_excluded_path(path))
    }
}
