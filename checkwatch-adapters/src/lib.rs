//! # checkwatch-adapters
//!
//! Adapters that fetch pull request metadata and check snapshots from a
//! hosting service and normalise them into [`checkwatch_types`].
//!
//! ## Supported Sources
//!
//! | Source | Feature | Transport |
//! |--------|---------|-----------|
//! | GitHub | `github` | REST (metadata) + GraphQL (check rollup) |
//!
//! Everything source specific (GraphQL unions, legacy commit statuses,
//! uppercase enum values, rate limit reporting) stays inside the adapter; the
//! returned [`Snapshot`](checkwatch_types::Snapshot) is always the flat shape.
//!
//! ## Example
//!
//! ```rust,no_run
//! use checkwatch_adapters::github::GitHubAdapter;
//! use checkwatch_types::PullRequestRef;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = GitHubAdapter::builder().token("ghp_example").build()?;
//!     let pr = PullRequestRef::new("octo", "widgets", 42);
//!
//!     let metadata = adapter.fetch_metadata(&pr).await?;
//!     let snapshot = adapter.fetch_snapshot(&pr).await?;
//!
//!     println!("{}: {} checks", metadata.title, snapshot.len());
//!     Ok(())
//! }
//! ```

mod error;

#[cfg(feature = "github")]
pub mod github;

pub use error::AdapterError;
