//! # checkwatch
//!
//! A terminal watcher and library for the CI checks of a GitHub pull request.
//!
//! It polls a check source until every check has completed, backing off when
//! the API rate budget runs low, and shows queue times, durations and outcomes
//! in an interactive terminal UI or as a plain-text report.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────┐   ┌─────────┐  │
//! │  │ runtime │───▶│ scheduler │───▶│  model  │──▶│   ui    │  │
//! │  │ (loop)  │    │ (policy)  │    │ (state) │   │         │  │
//! │  └────┬────┘    └───────────┘    └─────────┘   └─────────┘  │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── GitHubSource | FileSource | ChannelSource   │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`scheduler`]**: The polling state machine. [`Scheduler::handle`] applies an
//!   [`Event`] to the [`Observation`] and returns the [`Command`]s to carry out
//! - **[`runtime`]**: Drives a scheduler against a [`CheckSource`] on tokio, with
//!   cancellation, terminal input and periodic redraws
//! - **[`source`]**: Check source abstraction with GitHub, file and channel
//!   implementations
//! - **[`data`]**: Timing, convergence and column layout calculations
//! - **[`ui`]** and **[`report`]**: Interactive and plain-text presentation
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a PR in the current repository
//! checkwatch 42
//!
//! # Watch a PR elsewhere, polling every 10 seconds
//! checkwatch 42 --repo octo/widgets --interval 10s
//!
//! # Replay a recorded fixture
//! checkwatch --file checks.json
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use checkwatch::{cancel_pair, App, ChannelSource, NullPresenter, Observation, Runtime, Scheduler, Theme};
//! use checkwatch_types::{CheckRun, Conclusion, PrMetadata, PullRequestRef, Snapshot};
//!
//! # tokio_test::block_on(async {
//! let metadata = PrMetadata {
//!     number: 42,
//!     title: "Add retries".into(),
//!     head_sha: "abc123".into(),
//!     created_at: None,
//!     head_commit_at: None,
//! };
//! let (tx, source) = ChannelSource::create(metadata, "example");
//! tx.send(Snapshot::new(
//!     vec![CheckRun::builder("build").completed(Conclusion::Success).build()],
//!     5000,
//! ))
//! .unwrap();
//!
//! let pr = PullRequestRef::new("octo", "widgets", 42);
//! let mut app = App::new(Observation::new(pr, chrono::Utc::now()), "example", Theme::dark());
//! let runtime = Runtime::new(Arc::new(source), Scheduler::new(Duration::from_millis(10)));
//! let (_cancel, token) = cancel_pair();
//!
//! let outcome = runtime.run(&mut app, &mut NullPresenter, None, token).await.unwrap();
//! assert_eq!(outcome.exit_code, 0);
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod model;
pub mod report;
pub mod runtime;
pub mod scheduler;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{ColorSettings, Settings};
pub use data::{ExitSignal, Tally};
pub use model::{Observation, PollStats};
pub use runtime::{cancel_pair, CancelHandle, CancelToken, NullPresenter, Outcome, Presenter, Runtime};
pub use scheduler::{Command, Event, Phase, Scheduler};
pub use source::{ChannelSource, CheckSource, FileSource, GitHubSource};
pub use ui::{TerminalPresenter, Theme};
