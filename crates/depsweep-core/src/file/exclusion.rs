// SPDX-License-Identifier: Apache-2.0

//! Default exclusion sets and the environment override.
//!
//! Two fixed sets exist: the general set used when grouping dependency files
//! for upload, and the fingerprint set used when hashing source content.
//! Fingerprinting walks much more of the tree, so its set also drops IDE,
//! build and Python environment directories.

/// Environment variable holding a comma-separated exclusion override.
pub const EXCLUSION_ENV_VAR: &str = "DEPSWEEP_EXCLUSION";

/// Delimiter between patterns in [`EXCLUSION_ENV_VAR`].
pub const EXCLUSION_DELIMITER: char = ',';

/// Directories excluded from every scan.
const EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor", ".git", "obj"];

/// Additional directories excluded when no override is configured.
const EXCLUDED_DIRS_EXTRA: &[&str] = &["bower_components", ".vscode-test"];

/// Directories excluded from fingerprinting.
const EXCLUDED_DIRS_FINGERPRINT: &[&str] = &[
    "nbproject",
    "nbbuild",
    "nbdist",
    "node_modules",
    "__pycache__",
    "_yardoc",
    "eggs",
    "wheels",
    "htmlcov",
    "__pypackages__",
];

/// Fingerprint exclusions that need wildcards inside the directory name.
const EXCLUDED_DIRS_FINGERPRINT_RAW: &[&str] = &["**/*.egg-info/**", "**/*venv/**"];

/// Builds a pattern excluding `dir` at any depth.
fn any_depth(dir: &str) -> String {
    format!("**/{dir}/**")
}

/// Returns the general default exclusions.
#[must_use]
pub fn default_exclusions() -> Vec<String> {
    EXCLUDED_DIRS.iter().map(|dir| any_depth(dir)).collect()
}

/// Returns the default exclusions for fingerprinting.
///
/// Directory patterns come first, followed by the raw patterns.
#[must_use]
pub fn default_exclusions_fingerprint() -> Vec<String> {
    EXCLUDED_DIRS_FINGERPRINT
        .iter()
        .map(|dir| any_depth(dir))
        .chain(EXCLUDED_DIRS_FINGERPRINT_RAW.iter().map(|p| (*p).to_string()))
        .collect()
}

/// Resolves the effective exclusion set from an override value.
///
/// A non-empty override is split on [`EXCLUSION_DELIMITER`] and each piece is
/// used verbatim, replacing the defaults entirely. `None` or an empty string
/// yields [`default_exclusions`] followed by the fixed extras.
#[must_use]
pub fn exclusions_from(override_value: Option<&str>) -> Vec<String> {
    match override_value {
        Some(value) if !value.is_empty() => value
            .split(EXCLUSION_DELIMITER)
            .map(str::to_string)
            .collect(),
        _ => {
            let mut exclusions = default_exclusions();
            exclusions.extend(EXCLUDED_DIRS_EXTRA.iter().map(|dir| any_depth(dir)));
            exclusions
        }
    }
}

/// Resolves the effective exclusion set from [`EXCLUSION_ENV_VAR`].
///
/// Reads the environment once. Call this at startup and pass the result on.
#[must_use]
pub fn exclusions() -> Vec<String> {
    let value = std::env::var(EXCLUSION_ENV_VAR).ok();
    if value.as_deref().is_some_and(|v| !v.is_empty()) {
        tracing::debug!(var = EXCLUSION_ENV_VAR, "Using exclusion override from environment");
    }
    exclusions_from(value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn expected_defaults() -> Vec<String> {
        vec![
            "**/node_modules/**".to_string(),
            "**/vendor/**".to_string(),
            "**/.git/**".to_string(),
            "**/obj/**".to_string(),
            "**/bower_components/**".to_string(),
            "**/.vscode-test/**".to_string(),
        ]
    }

    /// Restores the override variable when dropped.
    struct EnvGuard(Option<String>);

    impl EnvGuard {
        fn set(value: &str) -> Self {
            let original = std::env::var(EXCLUSION_ENV_VAR).ok();
            unsafe {
                std::env::set_var(EXCLUSION_ENV_VAR, value);
            }
            Self(original)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.0 {
                    Some(val) => std::env::set_var(EXCLUSION_ENV_VAR, val),
                    None => std::env::remove_var(EXCLUSION_ENV_VAR),
                }
            }
        }
    }

    #[test]
    fn test_default_exclusions_use_forward_slash() {
        for pattern in default_exclusions() {
            assert!(pattern.starts_with("**/"), "{pattern}");
            assert!(pattern.ends_with("/**"), "{pattern}");
            assert!(!pattern.contains('\\'), "{pattern}");
        }
    }

    #[test]
    fn test_default_exclusions_fingerprint_order() {
        let patterns = default_exclusions_fingerprint();
        assert_eq!(patterns.len(), 12);
        assert_eq!(patterns[0], "**/nbproject/**");
        assert_eq!(patterns[9], "**/__pypackages__/**");
        assert_eq!(patterns[10], "**/*.egg-info/**");
        assert_eq!(patterns[11], "**/*venv/**");
    }

    #[test]
    fn test_exclusions_from_override() {
        let exclusions = exclusions_from(Some("*/**.lock,**/node_modules/**,*\\**.ex"));
        assert_eq!(
            exclusions,
            vec!["*/**.lock", "**/node_modules/**", "*\\**.ex"]
        );
    }

    #[test]
    fn test_exclusions_from_override_is_verbatim() {
        let exclusions = exclusions_from(Some(" **/a/** ,,b"));
        assert_eq!(exclusions, vec![" **/a/** ", "", "b"]);
    }

    #[test]
    fn test_exclusions_from_empty_override_uses_defaults() {
        assert_eq!(exclusions_from(Some("")), expected_defaults());
        assert_eq!(exclusions_from(None), expected_defaults());
    }

    #[test]
    #[serial]
    fn test_exclusions_with_env_variable() {
        let _guard = EnvGuard::set("*/**.lock,**/node_modules/**,*\\**.ex");
        assert_eq!(
            exclusions(),
            vec!["*/**.lock", "**/node_modules/**", "*\\**.ex"]
        );
    }

    #[test]
    #[serial]
    fn test_exclusions_with_empty_env_variable() {
        let _guard = EnvGuard::set("");
        assert_eq!(exclusions(), expected_defaults());
    }
}
