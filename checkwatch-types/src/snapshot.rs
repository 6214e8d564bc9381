//! Snapshot - the full set of checks observed at one poll.

use crate::CheckRun;

/// The checks and remaining API budget captured atomically at one poll tick.
///
/// A snapshot is never merged with an earlier one; each poll produces a
/// wholly new snapshot that replaces the previous.
///
/// # Example
///
/// ```rust
/// use checkwatch_types::{CheckRun, Conclusion, Snapshot};
///
/// let snapshot = Snapshot::new(
///     vec![
///         CheckRun::builder("test").workflow("CI").build(),
///         CheckRun::builder("test").workflow("CI").completed(Conclusion::Success).build(),
///     ],
///     100,
/// );
///
/// // Duplicate identities collapse, last seen wins.
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(snapshot.checks[0].conclusion, Some(Conclusion::Success));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Checks in source order.
    pub checks: Vec<CheckRun>,

    /// API calls left in the operator's quota, as reported by the source.
    pub rate_limit_remaining: u32,
}

impl Snapshot {
    /// Create a snapshot, collapsing duplicate `(workflow, name)` identities.
    ///
    /// When two checks share an identity the later record replaces the earlier
    /// one, keeping the earlier one's position.
    pub fn new(checks: Vec<CheckRun>, rate_limit_remaining: u32) -> Self {
        let mut unique: Vec<CheckRun> = Vec::with_capacity(checks.len());
        for check in checks {
            match unique.iter_mut().find(|c| c.identity() == check.identity()) {
                Some(existing) => *existing = check,
                None => unique.push(check),
            }
        }
        Self {
            checks: unique,
            rate_limit_remaining,
        }
    }

    /// Check if the snapshot has no checks.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Number of checks in the snapshot.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Iterate over all checks.
    pub fn iter(&self) -> impl Iterator<Item = &CheckRun> {
        self.checks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckStatus, Conclusion};

    #[test]
    fn test_duplicates_last_seen_wins_keeps_position() {
        let snapshot = Snapshot::new(
            vec![
                CheckRun::builder("a").workflow("CI").build(),
                CheckRun::builder("b").workflow("CI").build(),
                CheckRun::builder("a")
                    .workflow("CI")
                    .completed(Conclusion::Failure)
                    .build(),
            ],
            10,
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.checks[0].name, "a");
        assert_eq!(snapshot.checks[0].status, CheckStatus::Completed);
        assert_eq!(snapshot.checks[1].name, "b");
    }

    #[test]
    fn test_same_name_different_workflow_is_distinct() {
        let snapshot = Snapshot::new(
            vec![
                CheckRun::builder("test").workflow("Linux").build(),
                CheckRun::builder("test").workflow("macOS").build(),
            ],
            10,
        );
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.checks[0].identity(), ("Linux", "test"));
        assert_eq!(snapshot.checks[1].identity(), ("macOS", "test"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "checks": [
                {"name": "build", "workflow_name": "CI", "status": "queued"},
                {"name": "ci/circleci", "status": "completed", "conclusion": "success"}
            ],
            "rate_limit_remaining": 4999
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rate_limit_remaining, 4999);
        assert_eq!(snapshot.checks[1].conclusion, Some(Conclusion::Success));
    }
}
