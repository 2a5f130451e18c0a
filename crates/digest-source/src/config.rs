//! Configuration for the GitHub diff source.

use digest_core::defaults;

/// Configuration for fetching merged-PR diffs from a GitHub repository.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL for the GitHub REST API.
    pub api_base: String,
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Personal access token (optional; raises the rate limit).
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::GITHUB_API_URL.to_string(),
            owner: defaults::SOURCE_OWNER.to_string(),
            repo: defaults::SOURCE_REPO.to_string(),
            token: None,
            timeout_seconds: defaults::SOURCE_TIMEOUT_SECS,
        }
    }
}

impl SourceConfig {
    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GITHUB_API_URL` | `https://api.github.com` |
    /// | `SOURCE_OWNER` | `rust-lang` |
    /// | `SOURCE_REPO` | `cargo` |
    /// | `GITHUB_TOKEN` | unset |
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| defaults::GITHUB_API_URL.to_string()),
            owner: std::env::var("SOURCE_OWNER")
                .unwrap_or_else(|_| defaults::SOURCE_OWNER.to_string()),
            repo: std::env::var("SOURCE_REPO")
                .unwrap_or_else(|_| defaults::SOURCE_REPO.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok(),
            timeout_seconds: defaults::SOURCE_TIMEOUT_SECS,
        }
    }

    /// Set the repository to fetch from.
    pub fn with_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.repo = repo.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert_eq!(config.api_base, defaults::GITHUB_API_URL);
        assert_eq!(config.owner, defaults::SOURCE_OWNER);
        assert_eq!(config.repo, defaults::SOURCE_REPO);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_with_repository() {
        let config = SourceConfig::default().with_repository("octocat", "hello-world");
        assert_eq!(config.owner, "octocat");
        assert_eq!(config.repo, "hello-world");
    }
}
