// SPDX-License-Identifier: Apache-2.0

//! Glob-based path classification.
//!
//! A [`PatternSet`] pairs exclusion and inclusion globs. Compiling it yields a
//! [`PathClassifier`] that answers whether a path is excluded:
//!
//! 1. A path matching any inclusion is never excluded.
//! 2. Otherwise a path matching any exclusion is excluded.
//! 3. Otherwise it passes through.
//!
//! Match outcome does not depend on pattern order. The order is kept so that
//! diagnostics always report the same pattern for the same path.
//!
//! # Pattern syntax
//!
//! | Term       | Meaning                                             |
//! |------------|-----------------------------------------------------|
//! | `*`        | any run of non-separator characters                 |
//! | `**`       | zero or more whole path segments                    |
//! | `?`        | a single non-separator character                    |
//! | `[class]`  | a single non-separator character from the class     |
//! | `{a,b}`    | any of the comma-separated alternatives             |
//!
//! Patterns match the whole path. A bare `composer.json` therefore does not
//! match `sub/dir/composer.json`, while `**/composer.json` does.

use std::borrow::Cow;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use super::exclusion::{default_exclusions_fingerprint, exclusions_from};
use crate::error::ScanError;

/// Ordered exclusion and inclusion patterns for one scan or sub-operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    /// Patterns whose matches are excluded.
    pub exclusions: Vec<String>,
    /// Patterns whose matches are never excluded.
    pub inclusions: Vec<String>,
}

impl PatternSet {
    /// Creates a pattern set from explicit lists.
    #[must_use]
    pub fn new(exclusions: Vec<String>, inclusions: Vec<String>) -> Self {
        Self {
            exclusions,
            inclusions,
        }
    }

    /// General scan defaults with no inclusions.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(exclusions_from(None), Vec::new())
    }

    /// General scan patterns: `exclusions` (usually from [`exclusions`](super::exclusion::exclusions))
    /// with the caller's inclusions.
    #[must_use]
    pub fn general(exclusions: Vec<String>, inclusions: &[String]) -> Self {
        Self::new(exclusions, inclusions.to_vec())
    }

    /// Pattern set for fingerprinting.
    ///
    /// The caller's exclusions are kept first and the fingerprint defaults are
    /// appended after them.
    #[must_use]
    pub fn fingerprint(exclusions: &[String], inclusions: &[String]) -> Self {
        let mut all = exclusions.to_vec();
        all.extend(default_exclusions_fingerprint());
        Self::new(all, inclusions.to_vec())
    }

    /// Compiles the patterns into a classifier.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidPattern` for the first malformed glob.
    pub fn compile(&self) -> Result<PathClassifier, ScanError> {
        PathClassifier::new(&self.exclusions, &self.inclusions)
    }
}

/// Compiled globs plus a map from compiled glob back to its source pattern.
///
/// `recursive` holds only the globs of patterns ending in `/**`. A directory
/// matching one of them has every descendant excluded as well.
#[derive(Debug, Clone)]
struct CompiledPatterns {
    set: GlobSet,
    recursive: GlobSet,
    sources: Vec<usize>,
    patterns: Vec<String>,
}

impl CompiledPatterns {
    fn new(patterns: &[String]) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        let mut recursive = GlobSetBuilder::new();
        let mut sources = Vec::new();

        for (index, pattern) in patterns.iter().enumerate() {
            let variants = expand(pattern);
            let is_recursive = variants.len() > 1;
            for variant in variants {
                let glob = GlobBuilder::new(&variant)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| ScanError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.kind().to_string(),
                    })?;
                if is_recursive {
                    recursive.add(glob.clone());
                }
                builder.add(glob);
                sources.push(index);
            }
        }

        let build_error = |e: globset::Error| ScanError::InvalidPattern {
            pattern: patterns.join(","),
            message: e.to_string(),
        };
        let set = builder.build().map_err(build_error)?;
        let recursive = recursive.build().map_err(build_error)?;

        Ok(Self {
            set,
            recursive,
            sources,
            patterns: patterns.to_vec(),
        })
    }

    fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// First source pattern (in insertion order) matching `path`.
    fn first_match(&self, path: &str) -> Option<&str> {
        self.set
            .matches(path)
            .into_iter()
            .map(|glob| self.sources[glob])
            .min()
            .map(|index| self.patterns[index].as_str())
    }
}

/// Returns the glob variants needed to compile `pattern`.
///
/// A trailing `/**` must also match zero segments, so `**/yarn/**` matches
/// the directory `testdata/yarn` itself. The variant without the suffix
/// covers that case.
fn expand(pattern: &str) -> Vec<String> {
    let pattern = native_pattern(pattern);
    let mut variants = vec![pattern.to_string()];
    if let Some(prefix) = pattern.strip_suffix("/**")
        && !prefix.is_empty()
    {
        variants.push(prefix.to_string());
    }
    variants
}

/// Rewrites Windows separators in patterns. On Unix a backslash stays an
/// escape character.
fn native_pattern(pattern: &str) -> Cow<'_, str> {
    if cfg!(windows) && pattern.contains('\\') {
        Cow::Owned(pattern.replace('\\', "/"))
    } else {
        Cow::Borrowed(pattern)
    }
}

/// Normalizes a candidate path to the `/`-separated form patterns use.
///
/// Leading `./` segments are removed so that walking `.` produces the same
/// paths as walking the empty root.
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let mut normalized: Cow<'_, str> = if std::path::MAIN_SEPARATOR == '/' {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(path.replace(std::path::MAIN_SEPARATOR, "/"))
    };

    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = Cow::Owned(rest.to_string());
    }

    normalized
}

/// Decides whether candidate paths are excluded from a scan.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    exclusions: CompiledPatterns,
    inclusions: CompiledPatterns,
}

impl PathClassifier {
    /// Compiles exclusion and inclusion patterns.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidPattern` if any pattern is malformed.
    pub fn new(exclusions: &[String], inclusions: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            exclusions: CompiledPatterns::new(exclusions)?,
            inclusions: CompiledPatterns::new(inclusions)?,
        })
    }

    /// Returns true if `path` is excluded.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if self.inclusions.is_match(&path) {
            return false;
        }
        self.exclusions.is_match(&path)
    }

    /// Path-typed variant of [`PathClassifier::is_excluded`].
    #[must_use]
    pub fn is_excluded_path(&self, path: &Path) -> bool {
        self.is_excluded(&path.to_string_lossy())
    }

    /// Returns true if nothing under directory `path` can be kept.
    ///
    /// Only patterns ending in `/**` prove that, and only while no inclusion
    /// could rescue a descendant. A directory matching `**/composer/*` is not
    /// pruned, since `*` stops at the next separator.
    #[must_use]
    pub fn prunes_dir(&self, path: &Path) -> bool {
        if !self.inclusions.patterns.is_empty() {
            return false;
        }
        let path = path.to_string_lossy();
        let path = normalize_path(&path);
        self.exclusions.recursive.is_match(&*path)
    }

    /// Returns the exclusion pattern responsible for excluding `path`.
    ///
    /// `None` when the path is not excluded, including when an inclusion
    /// overrides a matching exclusion.
    #[must_use]
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        let path = normalize_path(path);
        if self.inclusions.is_match(&path) {
            return None;
        }
        self.exclusions.first_match(&path)
    }
}

/// Returns true if `path` is excluded by `exclusions` and not rescued by
/// `inclusions`.
///
/// Compiles the patterns on every call; build a [`PathClassifier`] when
/// classifying many paths.
///
/// # Errors
///
/// Returns `ScanError::InvalidPattern` if any pattern is malformed.
pub fn excluded(
    exclusions: &[String],
    inclusions: &[String],
    path: &str,
) -> Result<bool, ScanError> {
    Ok(PathClassifier::new(exclusions, inclusions)?.is_excluded(path))
}
