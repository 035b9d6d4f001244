// SPDX-License-Identifier: Apache-2.0

//! File classification and discovery.
//!
//! Decides which files under a project root take part in a scan, groups
//! dependency files for upload and fingerprints source files.

pub mod classifier;
pub mod exclusion;
pub mod finder;
pub mod fingerprint;
pub mod walk;

pub use classifier::{PathClassifier, PatternSet, excluded, normalize_path};
pub use exclusion::{
    EXCLUSION_ENV_VAR, default_exclusions, default_exclusions_fingerprint, exclusions,
    exclusions_from,
};
pub use finder::{FileGroup, Finder, FinderOptions, WalkFinder};
pub use fingerprint::{
    FileFingerprinter, FingerprintOptions, Fingerprinter, Fingerprints,
    OUTPUT_FILE_NAME_FINGERPRINTS,
};
