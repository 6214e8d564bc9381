//! GraphQL check rollup query and normalisation into the flat check shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use checkwatch_types::{Annotation, CheckRun, CheckStatus, Conclusion, PullRequestRef, Snapshot};

/// Same selection `gh pr checks` uses: the last commit's rollup, which mixes
/// check runs and legacy commit statuses.
const CHECK_ROLLUP_QUERY: &str = r#"
query($owner: String!, $repo: String!, $prNumber: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $prNumber) {
      commits(last: 1) {
        nodes {
          commit {
            statusCheckRollup {
              contexts(first: 100) {
                nodes {
                  __typename
                  ... on CheckRun {
                    name
                    summary
                    status
                    conclusion
                    startedAt
                    completedAt
                    detailsUrl
                    annotations(first: 5) {
                      nodes {
                        message
                        path
                        title
                        annotationLevel
                        location { start { line } }
                      }
                    }
                    checkSuite { workflowRun { workflow { name } } }
                  }
                  ... on StatusContext {
                    context
                    description
                    state
                    targetUrl
                  }
                }
              }
            }
          }
        }
      }
    }
  }
  rateLimit { remaining }
}
"#;

pub(super) fn request_body(pr: &PullRequestRef) -> serde_json::Value {
    json!({
        "query": CHECK_ROLLUP_QUERY,
        "variables": {
            "owner": pr.owner,
            "repo": pr.repo,
            "prNumber": pr.number,
        }
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct Response {
    pub data: Option<RollupData>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlError {
    pub message: String,
}

/// The `data` member of the check rollup response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupData {
    repository: Option<Repository>,
    rate_limit: Option<RateLimit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    pull_request: Option<PullRequest>,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    commits: Connection<CommitNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    commit: Commit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Commit {
    status_check_rollup: Option<Rollup>,
}

#[derive(Debug, Deserialize)]
struct Rollup {
    contexts: Connection<ContextNode>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum ContextNode {
    CheckRun(CheckRunNode),
    StatusContext(StatusContextNode),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckRunNode {
    name: String,
    #[serde(default)]
    summary: Option<String>,
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    details_url: Option<String>,
    #[serde(default)]
    annotations: Option<Connection<AnnotationNode>>,
    #[serde(default)]
    check_suite: Option<CheckSuite>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckSuite {
    workflow_run: Option<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    workflow: Workflow,
}

#[derive(Debug, Deserialize)]
struct Workflow {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationNode {
    message: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    annotation_level: Option<String>,
    #[serde(default)]
    location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    start: Position,
}

#[derive(Debug, Deserialize)]
struct Position {
    line: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusContextNode {
    context: String,
    #[serde(default)]
    description: Option<String>,
    state: String,
    #[serde(default)]
    target_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RateLimit {
    remaining: u32,
}

/// Flatten a check rollup response into a [`Snapshot`].
///
/// Commit statuses map `success` to a successful completed check, `error` and
/// `failure` to a failed completed check, and anything else (`pending`,
/// `expected`) to queued. A missing pull request or rollup yields an empty
/// snapshot.
pub fn normalize_rollup(data: RollupData) -> Snapshot {
    let rate_limit_remaining = data.rate_limit.map(|r| r.remaining).unwrap_or(0);

    let contexts = data
        .repository
        .and_then(|r| r.pull_request)
        .and_then(|pr| pr.commits.nodes.into_iter().next())
        .and_then(|node| node.commit.status_check_rollup)
        .map(|rollup| rollup.contexts.nodes)
        .unwrap_or_default();

    let checks = contexts
        .into_iter()
        .filter_map(|node| match node {
            ContextNode::CheckRun(run) => Some(normalize_check_run(run)),
            ContextNode::StatusContext(status) => Some(normalize_status_context(status)),
            ContextNode::Other => None,
        })
        .collect();

    Snapshot::new(checks, rate_limit_remaining)
}

fn normalize_check_run(run: CheckRunNode) -> CheckRun {
    let status = CheckStatus::parse(&run.status.to_lowercase());
    let conclusion = run
        .conclusion
        .filter(|c| !c.is_empty())
        .map(|c| Conclusion::parse(&c.to_lowercase()));

    let keeps_annotations = matches!(
        conclusion,
        Some(Conclusion::Failure) | Some(Conclusion::TimedOut)
    );
    let annotations = match run.annotations {
        Some(connection) if keeps_annotations => connection
            .nodes
            .into_iter()
            .map(|a| Annotation {
                message: a.message,
                path: a.path,
                line: a.location.map(|l| l.start.line).unwrap_or(0),
                title: a.title.unwrap_or_default(),
                level: a.annotation_level.unwrap_or_default().to_lowercase(),
            })
            .collect(),
        _ => Vec::new(),
    };

    CheckRun {
        name: run.name,
        workflow_name: run
            .check_suite
            .and_then(|s| s.workflow_run)
            .map(|w| w.workflow.name)
            .unwrap_or_default(),
        status,
        conclusion,
        started_at: run.started_at,
        completed_at: run.completed_at,
        details_url: run.details_url.unwrap_or_default(),
        summary: run.summary.unwrap_or_default(),
        annotations,
    }
}

fn normalize_status_context(status: StatusContextNode) -> CheckRun {
    let (status_value, conclusion) = match status.state.to_lowercase().as_str() {
        "success" => (CheckStatus::Completed, Some(Conclusion::Success)),
        "error" | "failure" => (CheckStatus::Completed, Some(Conclusion::Failure)),
        _ => (CheckStatus::Queued, None),
    };

    CheckRun {
        name: status.context,
        status: status_value,
        conclusion,
        details_url: status.target_url.unwrap_or_default(),
        summary: status.description.unwrap_or_default(),
        ..CheckRun::default()
    }
}
