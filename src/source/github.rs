//! GitHub API check source.

use anyhow::{Context, Result};
use async_trait::async_trait;

use checkwatch_adapters::github::GitHubAdapter;
use checkwatch_types::{PrMetadata, PullRequestRef, Snapshot};

use super::CheckSource;

/// A check source backed by the GitHub REST and GraphQL APIs.
#[derive(Debug)]
pub struct GitHubSource {
    adapter: GitHubAdapter,
    description: String,
}

impl GitHubSource {
    pub fn new(adapter: GitHubAdapter, pr: &PullRequestRef) -> Self {
        Self {
            adapter,
            description: format!("github: {}", pr),
        }
    }
}

#[async_trait]
impl CheckSource for GitHubSource {
    async fn fetch_metadata(&self, pr: &PullRequestRef) -> Result<PrMetadata> {
        self.adapter
            .fetch_metadata(pr)
            .await
            .with_context(|| format!("failed to fetch PR info for {}", pr))
    }

    async fn fetch_snapshot(&self, pr: &PullRequestRef) -> Result<Snapshot> {
        Ok(self.adapter.fetch_snapshot(pr).await?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
