//! Pull request identity and metadata.

use std::fmt;

use chrono::{DateTime, Utc};

/// Which pull request to observe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Pull request metadata, fetched once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrMetadata {
    pub number: u64,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub head_sha: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: Option<DateTime<Utc>>,
    /// When the head commit was committed. Reference point for queue latency.
    #[cfg_attr(feature = "serde", serde(default))]
    pub head_commit_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_ref_display() {
        let pr = PullRequestRef::new("octo", "widgets", 42);
        assert_eq!(pr.to_string(), "octo/widgets#42");
    }
}
