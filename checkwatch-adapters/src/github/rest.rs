//! REST response shapes for pull request metadata.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use checkwatch_types::PrMetadata;

#[derive(Debug, Deserialize)]
pub(super) struct PullRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub head: Head,
}

#[derive(Debug, Deserialize)]
pub(super) struct Head {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Commit {
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitDetail {
    #[serde(default)]
    pub committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Signature {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

pub(super) fn into_metadata(number: u64, pull: PullRequest, commit: Commit) -> PrMetadata {
    PrMetadata {
        number,
        title: pull.title,
        head_sha: pull.head.sha,
        created_at: pull.created_at,
        head_commit_at: commit.commit.committer.and_then(|c| c.date),
    }
}
