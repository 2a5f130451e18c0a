//! GitHub-backed diff source.
//!
//! Lists closed pull requests for a repository, keeps the merged ones,
//! and fetches the unified diff for each. One listing call plus one diff
//! call per merged PR; a failed diff fetch degrades that item to an empty
//! diff instead of failing the page.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use digest_core::{defaults, DiffItem, DiffPage, DiffSource, Error, Result};

use crate::config::SourceConfig;

/// Diff source backed by the GitHub REST API.
pub struct GitHubDiffSource {
    client: Client,
    config: SourceConfig,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    title: String,
    merged_at: Option<String>,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubErrorBody {
    message: String,
}

impl GitHubDiffSource {
    /// Create a new diff source with the given configuration.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "source",
            component = "github",
            owner = %config.owner,
            repo = %config.repo,
            authenticated = config.token.is_some(),
            "Initializing GitHub diff source"
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(SourceConfig::default())
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(SourceConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn pulls_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        )
    }

    /// Build a GET request with the mandatory User-Agent and optional auth.
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(url)
            .header("User-Agent", defaults::SOURCE_USER_AGENT);

        if let Some(ref token) = self.config.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        req
    }

    /// Fetch the unified diff for one pull request.
    async fn fetch_pull_diff(&self, number: u64) -> Result<String> {
        let url = format!("{}/{}", self.pulls_url(), number);
        let response = self
            .request(&url)
            .header("Accept", "application/vnd.github.v3.diff")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                message: format!("Diff fetch failed for PR #{}", number),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read diff body: {}", e)))
    }
}

#[async_trait]
impl DiffSource for GitHubDiffSource {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<DiffPage> {
        debug!(page, per_page, "Fetching closed PR listing");

        let response = self
            .request(&self.pulls_url())
            .header("Accept", "application/vnd.github.v3+json")
            .query(&[
                ("state", "closed".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<GithubErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                message,
            });
        }

        let pulls: Vec<PullRequest> = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse PR listing: {}", e)))?;
        let listed = pulls.len() as u32;

        let mut diffs = Vec::new();
        for pull in pulls.into_iter().filter(|p| p.merged_at.is_some()) {
            let diff = match self.fetch_pull_diff(pull.number).await {
                Ok(diff) => diff,
                Err(e) => {
                    warn!(
                        diff_id = pull.number,
                        error = %e,
                        "Diff fetch failed, emitting item with empty diff"
                    );
                    String::new()
                }
            };

            diffs.push(DiffItem {
                id: pull.number.to_string(),
                description: pull.title,
                diff,
                url: pull.html_url,
            });
        }

        // A short listing page means the closed-PR history is exhausted.
        let next_page = if listed == per_page {
            Some(page + 1)
        } else {
            None
        };

        info!(
            page,
            diff_count = diffs.len(),
            has_next = next_page.is_some(),
            "Fetched merged PR page"
        );

        Ok(DiffPage {
            diffs,
            next_page,
            current_page: page,
            per_page,
        })
    }
}
