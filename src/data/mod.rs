//! Pure computations over check snapshots.
//!
//! Nothing in here performs I/O or reads the clock; callers pass `now`.
//!
//! ## Submodules
//!
//! - [`timing`]: Queue latency, runtime and final duration, plus duration
//!   formatting and parsing (e.g. "1h 30m", "500ms")
//! - [`aggregate`]: Convergence, exit signal ([`ExitSignal`]) and the
//!   per-outcome [`Tally`]
//! - [`layout`]: Column widths, name truncation and cell text for the table
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (from a CheckSource)
//!        │
//!        ├──▶ aggregate::is_converged() / exit_signal()   (scheduler)
//!        │
//!        └──▶ ColumnWidths::from_checks()                 (ui, report)
//!                    │
//!                    └──▶ timing::* for each cell
//! ```

pub mod aggregate;
pub mod layout;
pub mod timing;

pub use aggregate::{exit_signal, is_converged, ExitSignal, Tally};
pub use layout::ColumnWidths;
