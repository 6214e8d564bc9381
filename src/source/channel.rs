//! Channel-based check source.
//!
//! Serves snapshots pushed through a tokio watch channel. This is useful
//! when checkwatch is embedded in another program that already has the check
//! data, and for driving the runtime in tests.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use checkwatch_types::{PrMetadata, PullRequestRef, Snapshot};

use super::CheckSource;

/// A check source whose snapshots are pushed through a channel.
///
/// Metadata is fixed at construction. Every fetch returns the most recently
/// sent snapshot, so a producer may send faster or slower than the poll
/// interval.
///
/// # Example
///
/// ```
/// use checkwatch::ChannelSource;
/// use checkwatch_types::PrMetadata;
///
/// let metadata = PrMetadata {
///     number: 7,
///     title: "Add retries".to_string(),
///     head_sha: String::new(),
///     created_at: None,
///     head_commit_at: None,
/// };
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create(metadata, "ci-bridge");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    metadata: PrMetadata,
    receiver: watch::Receiver<Snapshot>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `metadata` - Returned by every metadata fetch
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where snapshots come from
    pub fn new(
        metadata: PrMetadata,
        receiver: watch::Receiver<Snapshot>,
        source_description: &str,
    ) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            metadata,
            receiver,
            description,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// The source starts out serving an empty snapshot.
    pub fn create(metadata: PrMetadata, source_description: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(Snapshot::default());
        let source = Self::new(metadata, rx, source_description);
        (tx, source)
    }
}

#[async_trait]
impl CheckSource for ChannelSource {
    async fn fetch_metadata(&self, _pr: &PullRequestRef) -> Result<PrMetadata> {
        Ok(self.metadata.clone())
    }

    async fn fetch_snapshot(&self, _pr: &PullRequestRef) -> Result<Snapshot> {
        // Still serves the last value after the sender is dropped
        Ok(self.receiver.borrow().clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
