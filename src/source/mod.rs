//! Check source abstraction for fetching pull request data.
//!
//! This module provides a trait-based abstraction over where metadata and
//! check snapshots come from: the GitHub API, a recorded JSON fixture, or an
//! in-memory channel.

mod channel;
mod file;
mod github;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use github::GitHubSource;

use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;

use checkwatch_types::{PrMetadata, PullRequestRef, Snapshot};

/// Trait for fetching pull request data from various backends.
///
/// Each call is one independent fetch; sources keep no polling state of
/// their own. The runtime calls these from spawned tasks, so implementations
/// must be shareable across threads.
///
/// # Example
///
/// ```
/// use checkwatch::{CheckSource, FileSource};
/// use checkwatch_types::PullRequestRef;
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("checks.json");
/// let pr = PullRequestRef::new("octo", "widgets", 7);
/// if let Ok(snapshot) = source.fetch_snapshot(&pr).await {
///     println!("Got {} checks", snapshot.len());
/// }
/// # });
/// ```
#[async_trait]
pub trait CheckSource: Send + Sync + Debug {
    /// Fetch pull request metadata. Called once, before polling starts.
    async fn fetch_metadata(&self, pr: &PullRequestRef) -> Result<PrMetadata>;

    /// Fetch the current checks on the pull request's head commit.
    async fn fetch_snapshot(&self, pr: &PullRequestRef) -> Result<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
