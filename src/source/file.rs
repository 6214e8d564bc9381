//! File-based check source.
//!
//! Replays a recorded JSON fixture, which is handy offline and for demos.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use checkwatch_types::{CheckRun, PrMetadata, PullRequestRef, Snapshot};

use super::CheckSource;

/// GitHub's default hourly GraphQL budget, assumed when a fixture omits it.
const DEFAULT_RATE_LIMIT: u32 = 5000;

/// On-disk fixture shape.
///
/// ```json
/// {
///   "pull_request": {"number": 7, "title": "Add retries", "head_commit_at": "2024-05-01T10:00:00Z"},
///   "checks": [{"name": "build", "workflow_name": "CI", "status": "in_progress"}],
///   "rate_limit_remaining": 4999
/// }
/// ```
#[derive(Debug, Deserialize)]
struct Fixture {
    pull_request: PrMetadata,
    #[serde(default)]
    checks: Vec<CheckRun>,
    #[serde(default = "default_rate_limit")]
    rate_limit_remaining: u32,
}

fn default_rate_limit() -> u32 {
    DEFAULT_RATE_LIMIT
}

/// A check source that reads a JSON fixture from disk.
///
/// The file is re-read on every fetch, so editing it while the watcher runs
/// plays back a changing pull request.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_fixture(&self) -> Result<Fixture> {
        debug!(path = %self.path.display(), "reading fixture");
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Read error: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Parse error: {}", self.path.display()))
    }
}

#[async_trait]
impl CheckSource for FileSource {
    async fn fetch_metadata(&self, _pr: &PullRequestRef) -> Result<PrMetadata> {
        Ok(self.read_fixture().await?.pull_request)
    }

    async fn fetch_snapshot(&self, _pr: &PullRequestRef) -> Result<Snapshot> {
        let fixture = self.read_fixture().await?;
        Ok(Snapshot::new(fixture.checks, fixture.rate_limit_remaining))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
