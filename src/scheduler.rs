//! Poll scheduling as an explicit state machine.
//!
//! ```text
//!                 Metadata(Ok)               Checks(Ok), converged
//! AwaitingMetadata ───────────▶ Polling ──────────────────────────▶ Converged
//!        │                        │
//!        │ Metadata(Err)          │ Cancel
//!        ▼                        ▼
//!      Failed                 Cancelled   (Cancel works from any live phase)
//! ```
//!
//! [`Scheduler::handle`] applies one [`Event`] to the [`Observation`] and
//! returns the [`Command`]s the runtime must carry out. It never performs I/O
//! and never sleeps, so the whole lifecycle can be driven from tests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use checkwatch_types::{PrMetadata, Snapshot};

use crate::data::timing::format_std;
use crate::data::{exit_signal, is_converged};
use crate::model::Observation;

/// Below this many remaining API calls a tick skips its fetch.
pub const LOW_BUDGET_THRESHOLD: u32 = 10;

/// Factor applied to the base interval while backing off.
pub const BACKOFF_MULTIPLIER: u32 = 3;

/// Lifecycle phase of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for pull request metadata.
    AwaitingMetadata,
    /// Fetching snapshots on every tick.
    Polling,
    /// Every check has completed.
    Converged,
    /// Stopped by the operator.
    Cancelled,
    /// Metadata could not be fetched.
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Converged | Phase::Cancelled | Phase::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::AwaitingMetadata => "starting",
            Phase::Polling => "polling",
            Phase::Converged => "done",
            Phase::Cancelled => "cancelled",
            Phase::Failed => "failed",
        }
    }
}

/// Something that happened: a timer fired, a fetch finished, or a cancel.
#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Metadata(Result<PrMetadata, String>),
    Checks(Result<Snapshot, String>),
    Cancel,
}

/// Work the runtime must perform in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchMetadata,
    FetchSnapshot,
    /// Arm the timer to deliver a `Tick` after this delay.
    ScheduleTick(Duration),
    Stop,
}

/// What a tick does, given the last known rate budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Fetch { next: Duration },
    Backoff { next: Duration },
}

impl TickDecision {
    pub fn next(self) -> Duration {
        match self {
            TickDecision::Fetch { next } | TickDecision::Backoff { next } => next,
        }
    }
}

/// Decide whether a tick fetches and when the next tick fires.
///
/// An unknown budget (nothing fetched yet) is not treated as low.
pub fn tick_decision(rate_limit_remaining: Option<u32>, base: Duration) -> TickDecision {
    match rate_limit_remaining {
        Some(remaining) if remaining < LOW_BUDGET_THRESHOLD => TickDecision::Backoff {
            next: base * BACKOFF_MULTIPLIER,
        },
        _ => TickDecision::Fetch { next: base },
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    base_interval: Duration,
}

impl Scheduler {
    pub fn new(base_interval: Duration) -> Self {
        Self { base_interval }
    }

    pub fn base_interval(&self) -> Duration {
        self.base_interval
    }

    /// Commands to issue before the first event.
    pub fn start(&self) -> Vec<Command> {
        vec![
            Command::FetchMetadata,
            Command::ScheduleTick(self.base_interval),
        ]
    }

    /// Apply one event and return the resulting commands.
    pub fn handle(
        &self,
        observation: &mut Observation,
        event: Event,
        now: DateTime<Utc>,
    ) -> Vec<Command> {
        if observation.is_terminal() {
            debug!(?event, phase = ?observation.phase(), "ignoring event after stop");
            return Vec::new();
        }

        match event {
            Event::Cancel => {
                observation.cancel();
                info!(pr = %observation.pull_request(), "cancelled");
                vec![Command::Stop]
            }
            Event::Metadata(Ok(metadata)) => {
                info!(pr = %observation.pull_request(), title = %metadata.title, "metadata received, polling");
                observation.record_metadata(metadata);
                observation.note_poll();
                vec![Command::FetchSnapshot]
            }
            Event::Metadata(Err(error)) => {
                warn!(pr = %observation.pull_request(), %error, "metadata fetch failed");
                observation.fail(error);
                vec![Command::Stop]
            }
            Event::Tick => self.on_tick(observation),
            Event::Checks(Ok(snapshot)) => {
                let converged = is_converged(&snapshot);
                let signal = exit_signal(&snapshot);
                debug!(
                    checks = snapshot.len(),
                    rate_limit = snapshot.rate_limit_remaining,
                    "snapshot applied"
                );
                observation.apply_snapshot(snapshot, now);

                if converged {
                    observation.converge(signal);
                    info!(pr = %observation.pull_request(), ?signal, "all checks completed");
                    vec![Command::Stop]
                } else {
                    Vec::new()
                }
            }
            Event::Checks(Err(error)) => {
                warn!(%error, "snapshot fetch failed, keeping previous data");
                observation.record_error(error);
                Vec::new()
            }
        }
    }

    fn on_tick(&self, observation: &mut Observation) -> Vec<Command> {
        if observation.phase() == Phase::AwaitingMetadata {
            return vec![Command::ScheduleTick(self.base_interval)];
        }

        match tick_decision(observation.rate_limit_remaining(), self.base_interval) {
            TickDecision::Fetch { next } => {
                observation.note_poll();
                vec![Command::FetchSnapshot, Command::ScheduleTick(next)]
            }
            TickDecision::Backoff { next } => {
                observation.note_backoff();
                warn!(
                    remaining = ?observation.rate_limit_remaining(),
                    next = %format_std(next),
                    "rate limit low, backing off"
                );
                vec![Command::ScheduleTick(next)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkwatch_types::{CheckRun, CheckStatus, Conclusion, PullRequestRef};
    use chrono::{TimeDelta, TimeZone};

    const BASE: Duration = Duration::from_secs(5);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn metadata() -> PrMetadata {
        PrMetadata {
            number: 7,
            title: "Add retries".into(),
            head_sha: "abc".into(),
            created_at: None,
            head_commit_at: Some(t0()),
        }
    }

    fn setup() -> (Scheduler, Observation) {
        (
            Scheduler::new(BASE),
            Observation::new(PullRequestRef::new("octo", "widgets", 7), t0()),
        )
    }

    fn polling() -> (Scheduler, Observation) {
        let (scheduler, mut obs) = setup();
        scheduler.handle(&mut obs, Event::Metadata(Ok(metadata())), t0());
        (scheduler, obs)
    }

    fn checks(statuses: &[(&str, CheckStatus, Option<Conclusion>)], budget: u32) -> Snapshot {
        let checks = statuses
            .iter()
            .map(|(name, status, conclusion)| {
                let mut check = CheckRun::builder(*name).workflow("CI").status(status.clone()).build();
                check.conclusion = conclusion.clone();
                check
            })
            .collect();
        Snapshot::new(checks, budget)
    }

    #[test]
    fn test_tick_decision() {
        assert_eq!(tick_decision(Some(5), BASE), TickDecision::Backoff { next: BASE * 3 });
        assert_eq!(tick_decision(Some(9), BASE), TickDecision::Backoff { next: BASE * 3 });
        assert_eq!(tick_decision(Some(10), BASE), TickDecision::Fetch { next: BASE });
        assert_eq!(tick_decision(None, BASE), TickDecision::Fetch { next: BASE });
        assert_eq!(tick_decision(Some(5), BASE).next(), Duration::from_secs(15));
    }

    #[test]
    fn test_start() {
        let (scheduler, _) = setup();
        assert_eq!(
            scheduler.start(),
            vec![Command::FetchMetadata, Command::ScheduleTick(BASE)]
        );
    }

    #[test]
    fn test_tick_before_metadata_only_reschedules() {
        let (scheduler, mut obs) = setup();
        let commands = scheduler.handle(&mut obs, Event::Tick, t0());
        assert_eq!(commands, vec![Command::ScheduleTick(BASE)]);
        assert_eq!(obs.stats().polls, 0);
    }

    #[test]
    fn test_metadata_success_fetches_immediately() {
        let (scheduler, mut obs) = setup();
        let commands = scheduler.handle(&mut obs, Event::Metadata(Ok(metadata())), t0());
        assert_eq!(commands, vec![Command::FetchSnapshot]);
        assert_eq!(obs.phase(), Phase::Polling);
        assert_eq!(obs.metadata().map(|m| m.number), Some(7));
    }

    #[test]
    fn test_metadata_failure_is_fatal() {
        let (scheduler, mut obs) = setup();
        let commands =
            scheduler.handle(&mut obs, Event::Metadata(Err("404 Not Found".into())), t0());
        assert_eq!(commands, vec![Command::Stop]);
        assert_eq!(obs.phase(), Phase::Failed);
        assert_eq!(obs.error(), Some("404 Not Found"));
        assert_eq!(obs.exit_code(), 1);
    }

    #[test]
    fn test_low_budget_backs_off_without_fetch() {
        let (scheduler, mut obs) = polling();
        let snapshot = checks(&[("build", CheckStatus::InProgress, None)], 5);
        scheduler.handle(&mut obs, Event::Checks(Ok(snapshot)), t0());

        let commands = scheduler.handle(&mut obs, Event::Tick, t0());
        assert_eq!(commands, vec![Command::ScheduleTick(Duration::from_secs(15))]);
        assert!(!commands.contains(&Command::FetchSnapshot));
        assert_eq!(obs.stats().backoffs, 1);
    }

    #[test]
    fn test_healthy_budget_fetches() {
        let (scheduler, mut obs) = polling();
        let snapshot = checks(&[("build", CheckStatus::InProgress, None)], 4000);
        scheduler.handle(&mut obs, Event::Checks(Ok(snapshot)), t0());

        let commands = scheduler.handle(&mut obs, Event::Tick, t0());
        assert_eq!(commands, vec![Command::FetchSnapshot, Command::ScheduleTick(BASE)]);
    }

    #[test]
    fn test_snapshot_error_keeps_previous_snapshot() {
        let (scheduler, mut obs) = polling();
        let snapshot = checks(&[("build", CheckStatus::InProgress, None)], 4000);
        scheduler.handle(&mut obs, Event::Checks(Ok(snapshot.clone())), t0());

        let commands =
            scheduler.handle(&mut obs, Event::Checks(Err("connection reset".into())), t0());
        assert!(commands.is_empty());
        assert_eq!(obs.phase(), Phase::Polling);
        assert_eq!(obs.error(), Some("connection reset"));
        assert_eq!(obs.snapshot(), Some(&snapshot));
    }

    #[test]
    fn test_empty_snapshot_does_not_converge() {
        let (scheduler, mut obs) = polling();
        let commands = scheduler.handle(&mut obs, Event::Checks(Ok(Snapshot::new(vec![], 50))), t0());
        assert!(commands.is_empty());
        assert_eq!(obs.phase(), Phase::Polling);
    }

    #[test]
    fn test_cancel_from_any_live_phase() {
        let (scheduler, mut obs) = setup();
        assert_eq!(scheduler.handle(&mut obs, Event::Cancel, t0()), vec![Command::Stop]);
        assert_eq!(obs.phase(), Phase::Cancelled);

        let (scheduler, mut obs) = polling();
        assert_eq!(scheduler.handle(&mut obs, Event::Cancel, t0()), vec![Command::Stop]);
        assert_eq!(obs.phase(), Phase::Cancelled);
        assert_eq!(obs.exit_code(), 0);
    }

    #[test]
    fn test_events_after_stop_are_ignored() {
        let (scheduler, mut obs) = polling();
        scheduler.handle(&mut obs, Event::Cancel, t0());

        let late = checks(&[("build", CheckStatus::Completed, Some(Conclusion::Failure))], 100);
        assert!(scheduler.handle(&mut obs, Event::Checks(Ok(late)), t0()).is_empty());
        assert!(scheduler.handle(&mut obs, Event::Tick, t0()).is_empty());
        assert!(scheduler.handle(&mut obs, Event::Cancel, t0()).is_empty());
        assert_eq!(obs.phase(), Phase::Cancelled);
        assert!(obs.snapshot().is_none());
    }

    #[test]
    fn test_full_lifecycle_converges_with_failure() {
        let (scheduler, mut obs) = setup();
        let mut now = t0();

        scheduler.start();
        scheduler.handle(&mut obs, Event::Metadata(Ok(metadata())), now);

        let rounds = [
            checks(
                &[
                    ("lint", CheckStatus::Queued, None),
                    ("test", CheckStatus::Queued, None),
                    ("build", CheckStatus::Queued, None),
                ],
                4000,
            ),
            checks(
                &[
                    ("lint", CheckStatus::InProgress, None),
                    ("test", CheckStatus::InProgress, None),
                    ("build", CheckStatus::InProgress, None),
                ],
                3999,
            ),
            checks(
                &[
                    ("lint", CheckStatus::Completed, Some(Conclusion::Success)),
                    ("test", CheckStatus::Completed, Some(Conclusion::Failure)),
                    ("build", CheckStatus::InProgress, None),
                ],
                3998,
            ),
        ];

        for snapshot in rounds {
            let commands = scheduler.handle(&mut obs, Event::Checks(Ok(snapshot)), now);
            assert!(commands.is_empty());
            assert_eq!(obs.phase(), Phase::Polling);

            now += TimeDelta::seconds(5);
            let commands = scheduler.handle(&mut obs, Event::Tick, now);
            assert_eq!(commands[0], Command::FetchSnapshot);
        }

        let last = checks(
            &[
                ("lint", CheckStatus::Completed, Some(Conclusion::Success)),
                ("test", CheckStatus::Completed, Some(Conclusion::Failure)),
                ("build", CheckStatus::Completed, Some(Conclusion::Success)),
            ],
            3997,
        );
        let commands = scheduler.handle(&mut obs, Event::Checks(Ok(last)), now);

        assert_eq!(commands, vec![Command::Stop]);
        assert_eq!(obs.phase(), Phase::Converged);
        assert_eq!(obs.exit_signal(), Some(crate::data::ExitSignal::Failure));
        assert_eq!(obs.exit_code(), 1);
        assert_eq!(obs.stats().snapshots_applied, 4);
        assert_eq!(obs.stats().polls, 4);
    }
}
