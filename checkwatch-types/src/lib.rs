//! # checkwatch-types
//!
//! Core types for observing the CI checks of a pull request. This crate
//! defines the flat schema every check source normalises into before data
//! reaches the checkwatch state machine.
//!
//! ## Design Goals
//!
//! - **Source agnostic**: GitHub check runs, legacy commit statuses and
//!   recorded fixtures all map onto the same [`CheckRun`] shape
//! - **Optional serialization**: Enable the `serde` feature for JSON fixtures
//! - **Ergonomic builders**: Fluent API for constructing checks in tests and tools
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use checkwatch_types::{CheckRun, CheckStatus, Conclusion, Snapshot};
//!
//! let snapshot = Snapshot::new(
//!     vec![
//!         CheckRun::builder("build").workflow("CI").completed(Conclusion::Success).build(),
//!         CheckRun::builder("lint").workflow("CI").status(CheckStatus::InProgress).build(),
//!     ],
//!     4_812,
//! );
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.rate_limit_remaining, 4_812);
//! ```

mod check;
mod pull_request;
mod snapshot;

pub use check::*;
pub use pull_request::*;
pub use snapshot::*;
