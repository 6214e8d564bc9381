//! Snapshot-level verdicts: convergence, exit signal and outcome tally.

use checkwatch_types::{CheckStatus, Conclusion, Snapshot};

/// Overall result once every check has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSignal {
    Success,
    Failure,
}

impl ExitSignal {
    /// Process exit code for this signal.
    pub fn code(self) -> i32 {
        match self {
            ExitSignal::Success => 0,
            ExitSignal::Failure => 1,
        }
    }
}

/// Returns true when the snapshot has at least one check and all are completed.
///
/// An empty snapshot never converges: checks may simply not have been
/// created yet.
pub fn is_converged(snapshot: &Snapshot) -> bool {
    !snapshot.is_empty() && snapshot.iter().all(|c| c.status.is_completed())
}

/// Failure if any completed check concluded failure, timed out or needs action.
pub fn exit_signal(snapshot: &Snapshot) -> ExitSignal {
    if snapshot.iter().any(|c| c.is_failing()) {
        ExitSignal::Failure
    } else {
        ExitSignal::Success
    }
}

/// Per-outcome counts for the header line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    /// Cancelled, skipped, neutral, stale or an unrecognised conclusion.
    pub neutral: usize,
    pub running: usize,
    pub queued: usize,
}

impl Tally {
    pub fn of(snapshot: &Snapshot) -> Self {
        let mut tally = Tally::default();
        for check in snapshot.iter() {
            match (&check.status, &check.conclusion) {
                (CheckStatus::Completed, Some(Conclusion::Success)) => tally.passed += 1,
                (CheckStatus::Completed, Some(c)) if c.is_failing() => tally.failed += 1,
                (CheckStatus::Completed, _) => tally.neutral += 1,
                (CheckStatus::InProgress, _) => tally.running += 1,
                (CheckStatus::Queued, _) | (CheckStatus::Other(_), _) => tally.queued += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.neutral + self.running + self.queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkwatch_types::CheckRun;

    fn completed(name: &str, conclusion: Conclusion) -> CheckRun {
        CheckRun::builder(name).completed(conclusion).build()
    }

    fn snapshot(checks: Vec<CheckRun>) -> Snapshot {
        Snapshot::new(checks, 5000)
    }

    #[test]
    fn test_empty_snapshot_is_not_converged() {
        assert!(!is_converged(&snapshot(vec![])));
    }

    #[test]
    fn test_converged_truth_table() {
        let all_done = snapshot(vec![
            completed("a", Conclusion::Success),
            completed("b", Conclusion::Skipped),
        ]);
        assert!(is_converged(&all_done));

        let one_running = snapshot(vec![
            completed("a", Conclusion::Success),
            CheckRun::builder("b").status(CheckStatus::InProgress).build(),
        ]);
        assert!(!is_converged(&one_running));

        let one_queued = snapshot(vec![
            completed("a", Conclusion::Success),
            CheckRun::builder("b").build(),
        ]);
        assert!(!is_converged(&one_queued));

        let unknown_status = snapshot(vec![CheckRun::builder("a")
            .status(CheckStatus::Other("waiting".into()))
            .build()]);
        assert!(!is_converged(&unknown_status));
    }

    #[test]
    fn test_exit_signal_truth_table() {
        let cases = [
            (Conclusion::Success, ExitSignal::Success),
            (Conclusion::Skipped, ExitSignal::Success),
            (Conclusion::Cancelled, ExitSignal::Success),
            (Conclusion::Neutral, ExitSignal::Success),
            (Conclusion::Failure, ExitSignal::Failure),
            (Conclusion::TimedOut, ExitSignal::Failure),
            (Conclusion::ActionRequired, ExitSignal::Failure),
        ];

        for (conclusion, expected) in cases {
            let snap = snapshot(vec![
                completed("ok", Conclusion::Success),
                completed("x", conclusion.clone()),
            ]);
            assert_eq!(exit_signal(&snap), expected, "conclusion: {}", conclusion);
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitSignal::Success.code(), 0);
        assert_eq!(ExitSignal::Failure.code(), 1);
    }

    #[test]
    fn test_tally() {
        let snap = snapshot(vec![
            completed("a", Conclusion::Success),
            completed("b", Conclusion::Success),
            completed("c", Conclusion::TimedOut),
            completed("d", Conclusion::Skipped),
            CheckRun::builder("e").status(CheckStatus::InProgress).build(),
            CheckRun::builder("f").build(),
        ]);

        let tally = Tally::of(&snap);
        assert_eq!(
            tally,
            Tally {
                passed: 2,
                failed: 1,
                neutral: 1,
                running: 1,
                queued: 1,
            }
        );
        assert_eq!(tally.total(), snap.len());
    }
}
