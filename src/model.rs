//! The observation: everything known about the watched pull request.
//!
//! Only [`Scheduler::handle`](crate::scheduler::Scheduler::handle) mutates an
//! `Observation`. Once the phase is terminal every mutation is a no-op, so
//! late fetch results can be fed in without disturbing the final state.

use chrono::{DateTime, Utc};

use checkwatch_types::{PrMetadata, PullRequestRef, Snapshot};

use crate::data::ExitSignal;
use crate::scheduler::Phase;

/// Counters for how polling went, shown in the help overlay and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Snapshot fetches issued.
    pub polls: u32,
    /// Ticks skipped because the rate budget was low.
    pub backoffs: u32,
    /// Snapshots successfully applied.
    pub snapshots_applied: u32,
}

#[derive(Debug, Clone)]
pub struct Observation {
    pull_request: PullRequestRef,
    metadata: Option<PrMetadata>,
    snapshot: Option<Snapshot>,
    rate_limit_remaining: Option<u32>,
    started_at: DateTime<Utc>,
    last_update: Option<DateTime<Utc>>,
    error: Option<String>,
    phase: Phase,
    exit_signal: Option<ExitSignal>,
    stats: PollStats,
}

impl Observation {
    pub fn new(pull_request: PullRequestRef, started_at: DateTime<Utc>) -> Self {
        Self {
            pull_request,
            metadata: None,
            snapshot: None,
            rate_limit_remaining: None,
            started_at,
            last_update: None,
            error: None,
            phase: Phase::AwaitingMetadata,
            exit_signal: None,
            stats: PollStats::default(),
        }
    }

    pub fn pull_request(&self) -> &PullRequestRef {
        &self.pull_request
    }

    pub fn metadata(&self) -> Option<&PrMetadata> {
        self.metadata.as_ref()
    }

    /// The latest applied snapshot, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Last known API budget. `None` until a snapshot has been applied.
    pub fn rate_limit_remaining(&self) -> Option<u32> {
        self.rate_limit_remaining
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Most recent error: fatal when the phase is `Failed`, transient otherwise.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn exit_signal(&self) -> Option<ExitSignal> {
        self.exit_signal
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Reference point for queue latency: the head commit time, falling back
    /// to the pull request creation time.
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        let metadata = self.metadata.as_ref()?;
        metadata.head_commit_at.or(metadata.created_at)
    }

    /// Process exit code for the current state.
    pub fn exit_code(&self) -> i32 {
        match self.phase {
            Phase::Converged => self.exit_signal.map_or(0, ExitSignal::code),
            Phase::Failed => 1,
            _ => 0,
        }
    }

    pub(crate) fn record_metadata(&mut self, metadata: PrMetadata) {
        if self.is_terminal() {
            return;
        }
        self.metadata = Some(metadata);
        self.error = None;
        self.phase = Phase::Polling;
    }

    pub(crate) fn fail(&mut self, error: String) {
        if self.is_terminal() {
            return;
        }
        self.error = Some(error);
        self.phase = Phase::Failed;
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: Snapshot, now: DateTime<Utc>) {
        if self.is_terminal() {
            return;
        }
        self.rate_limit_remaining = Some(snapshot.rate_limit_remaining);
        self.snapshot = Some(snapshot);
        self.last_update = Some(now);
        self.error = None;
        self.stats.snapshots_applied += 1;
    }

    pub(crate) fn record_error(&mut self, error: String) {
        if self.is_terminal() {
            return;
        }
        self.error = Some(error);
    }

    pub(crate) fn converge(&mut self, signal: ExitSignal) {
        if self.is_terminal() {
            return;
        }
        self.exit_signal = Some(signal);
        self.phase = Phase::Converged;
    }

    pub(crate) fn cancel(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.phase = Phase::Cancelled;
    }

    pub(crate) fn note_poll(&mut self) {
        if !self.is_terminal() {
            self.stats.polls += 1;
        }
    }

    pub(crate) fn note_backoff(&mut self) {
        if !self.is_terminal() {
            self.stats.backoffs += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkwatch_types::CheckRun;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn metadata() -> PrMetadata {
        PrMetadata {
            number: 7,
            title: "Add retries".into(),
            head_sha: "abc".into(),
            created_at: Some(t0() - TimeDelta::hours(1)),
            head_commit_at: Some(t0()),
        }
    }

    fn observation() -> Observation {
        Observation::new(PullRequestRef::new("octo", "widgets", 7), t0())
    }

    #[test]
    fn test_new_observation() {
        let obs = observation();
        assert_eq!(obs.phase(), Phase::AwaitingMetadata);
        assert!(obs.snapshot().is_none());
        assert!(obs.rate_limit_remaining().is_none());
        assert!(obs.reference_time().is_none());
        assert_eq!(obs.exit_code(), 0);
    }

    #[test]
    fn test_reference_time_prefers_head_commit() {
        let mut obs = observation();
        obs.record_metadata(metadata());
        assert_eq!(obs.reference_time(), Some(t0()));

        let mut obs = observation();
        obs.record_metadata(PrMetadata {
            head_commit_at: None,
            ..metadata()
        });
        assert_eq!(obs.reference_time(), Some(t0() - TimeDelta::hours(1)));
    }

    #[test]
    fn test_apply_snapshot_clears_error() {
        let mut obs = observation();
        obs.record_metadata(metadata());
        obs.record_error("timeout".into());
        assert_eq!(obs.error(), Some("timeout"));

        obs.apply_snapshot(Snapshot::new(vec![CheckRun::builder("a").build()], 42), t0());
        assert!(obs.error().is_none());
        assert_eq!(obs.rate_limit_remaining(), Some(42));
        assert_eq!(obs.last_update(), Some(t0()));
        assert_eq!(obs.stats().snapshots_applied, 1);
    }

    #[test]
    fn test_terminal_observation_is_frozen() {
        let mut obs = observation();
        obs.record_metadata(metadata());
        obs.converge(ExitSignal::Failure);
        assert_eq!(obs.exit_code(), 1);

        obs.apply_snapshot(Snapshot::new(vec![CheckRun::builder("a").build()], 1), t0());
        obs.record_error("late".into());
        obs.cancel();
        obs.fail("late".into());
        obs.note_poll();

        assert_eq!(obs.phase(), Phase::Converged);
        assert!(obs.snapshot().is_none());
        assert!(obs.error().is_none());
        assert_eq!(obs.stats(), PollStats::default());
        assert_eq!(obs.exit_code(), 1);
    }

    #[test]
    fn test_failed_exit_code() {
        let mut obs = observation();
        obs.fail("not found".into());
        assert_eq!(obs.phase(), Phase::Failed);
        assert_eq!(obs.exit_code(), 1);
    }

    #[test]
    fn test_cancelled_exit_code() {
        let mut obs = observation();
        obs.cancel();
        assert_eq!(obs.phase(), Phase::Cancelled);
        assert_eq!(obs.exit_code(), 0);
    }
}
