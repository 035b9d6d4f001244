// SPDX-License-Identifier: Apache-2.0

//! CI environment detection.
//!
//! Only the fields used to backfill scan options are detected. Recognised
//! providers are GitHub Actions and GitLab CI.

use std::collections::HashMap;

/// Metadata detected from a CI environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnv {
    /// Repository name, e.g. `owner/repo`.
    pub repository: String,
    /// Commit identifier.
    pub commit: String,
    /// Branch name.
    pub branch: String,
    /// Commit author.
    pub author: String,
    /// Repository URL.
    pub repository_url: String,
    /// Integration name reported to the backend.
    pub integration: String,
    /// Path to scan, relative to the checkout.
    pub filepath: String,
}

/// Detects the CI environment the process runs in.
pub trait CiService: Send + Sync {
    /// Returns the detected environment, or `None` outside CI.
    fn find(&self) -> Option<CiEnv>;
}

/// [`CiService`] that reads well-known CI variables.
#[derive(Debug, Clone, Default)]
pub struct EnvCiService {
    vars: HashMap<String, String>,
}

impl EnvCiService {
    /// Snapshots the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds the service from explicit variables.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn get(&self, key: &str) -> String {
        self.vars.get(key).cloned().unwrap_or_default()
    }

    fn is_set(&self, key: &str) -> bool {
        self.vars.get(key).is_some_and(|v| v == "true")
    }

    fn github(&self) -> CiEnv {
        let repository = self.get("GITHUB_REPOSITORY");
        let server = self.get("GITHUB_SERVER_URL");
        let repository_url = if server.is_empty() || repository.is_empty() {
            String::new()
        } else {
            format!("{}/{repository}", server.trim_end_matches('/'))
        };
        // pull_request events expose the source branch through GITHUB_HEAD_REF
        let head_ref = self.get("GITHUB_HEAD_REF");
        let branch = if head_ref.is_empty() {
            self.get("GITHUB_REF_NAME")
        } else {
            head_ref
        };

        CiEnv {
            repository,
            commit: self.get("GITHUB_SHA"),
            branch,
            author: self.get("GITHUB_ACTOR"),
            repository_url,
            integration: "githubActions".to_string(),
            filepath: String::new(),
        }
    }

    fn gitlab(&self) -> CiEnv {
        CiEnv {
            repository: self.get("CI_PROJECT_PATH"),
            commit: self.get("CI_COMMIT_SHA"),
            branch: self.get("CI_COMMIT_REF_NAME"),
            author: self.get("CI_COMMIT_AUTHOR"),
            repository_url: self.get("CI_PROJECT_URL"),
            integration: "gitlab".to_string(),
            filepath: String::new(),
        }
    }
}

impl CiService for EnvCiService {
    fn find(&self) -> Option<CiEnv> {
        if self.is_set("GITHUB_ACTIONS") {
            tracing::debug!("Detected GitHub Actions environment");
            Some(self.github())
        } else if self.is_set("GITLAB_CI") {
            tracing::debug!("Detected GitLab CI environment");
            Some(self.gitlab())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ci_detected() {
        let service = EnvCiService::from_vars([("HOME", "/root")]);
        assert!(service.find().is_none());
    }

    #[test]
    fn test_github_actions_push() {
        let service = EnvCiService::from_vars([
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_REPOSITORY", "acme/shop"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_REF_NAME", "main"),
            ("GITHUB_HEAD_REF", ""),
            ("GITHUB_ACTOR", "octocat"),
            ("GITHUB_SERVER_URL", "https://github.com/"),
        ]);
        let env = service.find().expect("github detected");
        assert_eq!(env.repository, "acme/shop");
        assert_eq!(env.commit, "abc123");
        assert_eq!(env.branch, "main");
        assert_eq!(env.author, "octocat");
        assert_eq!(env.repository_url, "https://github.com/acme/shop");
        assert_eq!(env.integration, "githubActions");
    }

    #[test]
    fn test_github_actions_pull_request_branch() {
        let service = EnvCiService::from_vars([
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_REF_NAME", "42/merge"),
            ("GITHUB_HEAD_REF", "feature/login"),
        ]);
        assert_eq!(service.find().unwrap().branch, "feature/login");
    }

    #[test]
    fn test_gitlab_ci() {
        let service = EnvCiService::from_vars([
            ("GITLAB_CI", "true"),
            ("CI_PROJECT_PATH", "group/project"),
            ("CI_COMMIT_SHA", "def456"),
            ("CI_COMMIT_REF_NAME", "develop"),
            ("CI_PROJECT_URL", "https://gitlab.com/group/project"),
        ]);
        let env = service.find().expect("gitlab detected");
        assert_eq!(env.repository, "group/project");
        assert_eq!(env.branch, "develop");
        assert_eq!(env.integration, "gitlab");
        assert!(env.author.is_empty());
    }
}
