//! GitHub adapter using the REST and GraphQL APIs.
//!
//! Pull request metadata comes from two REST calls (the pull request, then its
//! head commit for the commit timestamp). Checks come from one GraphQL query
//! over the head commit's `statusCheckRollup`, which returns both check runs
//! (GitHub Actions and other apps) and legacy commit statuses.
//!
//! ## Rate Limiting
//!
//! The GraphQL response carries `rateLimit.remaining`, which is passed through
//! untouched as [`Snapshot::rate_limit_remaining`]. The adapter never throttles
//! itself; pacing is the caller's policy.

mod graphql;
pub mod identity;
mod rest;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use checkwatch_types::{PrMetadata, PullRequestRef, Snapshot};

use crate::AdapterError;

pub use graphql::normalize_rollup;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub adapter for fetching pull request metadata and check snapshots.
#[derive(Debug, Clone)]
pub struct GitHubAdapter {
    client: Client,
    api_url: String,
    graphql_url: String,
}

impl GitHubAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> GitHubAdapterBuilder {
        GitHubAdapterBuilder::default()
    }

    /// Fetch the pull request title, head commit and head commit timestamp.
    pub async fn fetch_metadata(&self, pr: &PullRequestRef) -> Result<PrMetadata, AdapterError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, pr.owner, pr.repo, pr.number
        );
        debug!(%pr, "fetching pull request");
        let pull: rest::PullRequest = read_json(self.client.get(&url)).await?;

        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_url, pr.owner, pr.repo, pull.head.sha
        );
        debug!(%pr, sha = %pull.head.sha, "fetching head commit");
        let commit: rest::Commit = read_json(self.client.get(&url)).await?;

        Ok(rest::into_metadata(pr.number, pull, commit))
    }

    /// Fetch all checks on the pull request's head commit.
    pub async fn fetch_snapshot(&self, pr: &PullRequestRef) -> Result<Snapshot, AdapterError> {
        let body = graphql::request_body(pr);
        debug!(%pr, "querying check rollup");
        let response: graphql::Response =
            read_json(self.client.post(&self.graphql_url).json(&body)).await?;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AdapterError::GraphQl(message));
        }

        let data = response
            .data
            .ok_or_else(|| AdapterError::Parse("response has no data".to_string()))?;
        Ok(normalize_rollup(data))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, AdapterError> {
    let response = check_status(request.send().await?)?;
    response
        .json()
        .await
        .map_err(|e| AdapterError::Parse(e.to_string()))
}

fn check_status(response: Response) -> Result<Response, AdapterError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(AdapterError::Auth("Invalid or expired token".to_string())),
        StatusCode::FORBIDDEN => Err(AdapterError::Auth(
            "Access denied (rate limit exhausted or missing scope)".to_string(),
        )),
        StatusCode::NOT_FOUND => Err(AdapterError::Http(format!(
            "Not found: {}",
            response.url().path()
        ))),
        status if !status.is_success() => {
            Err(AdapterError::Http(format!("API returned status {}", status)))
        }
        _ => Ok(response),
    }
}

/// Builder for GitHubAdapter.
#[derive(Debug, Default)]
pub struct GitHubAdapterBuilder {
    token: Option<String>,
    api_url: Option<String>,
    timeout: Option<Duration>,
}

impl GitHubAdapterBuilder {
    /// Set the access token sent as a bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API root (default: "https://api.github.com"). GraphQL is served
    /// at `{api_url}/graphql`, which also holds for GitHub Enterprise's `/api`.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the adapter.
    pub fn build(self) -> Result<GitHubAdapter, AdapterError> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AdapterError::Auth("no token provided".to_string()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| AdapterError::Auth("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("checkwatch/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .default_headers(headers)
            .build()
            .map_err(|e| AdapterError::Connection(e.to_string()))?;

        let api_url = self
            .api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let graphql_url = format!("{}/graphql", api_url);

        Ok(GitHubAdapter {
            client,
            api_url,
            graphql_url,
        })
    }
}
