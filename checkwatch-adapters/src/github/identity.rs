//! Credential and repository identity resolution.
//!
//! These run once before polling starts. Failures here are fatal for the
//! caller, so every function returns an [`AdapterError::Identity`] with a
//! message meant for the operator.

use std::process::Command;

use tracing::debug;

use crate::AdapterError;

/// Environment variables checked for a token, in order.
const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolve an API token from the environment, falling back to `gh auth token`.
pub fn resolve_token() -> Result<String, AdapterError> {
    token_from(|name| std::env::var(name).ok(), gh_auth_token)
}

fn token_from(
    env: impl Fn(&str) -> Option<String>,
    fallback: impl FnOnce() -> Option<String>,
) -> Result<String, AdapterError> {
    TOKEN_VARS
        .iter()
        .filter_map(|name| env(name))
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
        .or_else(|| fallback().filter(|t| !t.is_empty()))
        .ok_or_else(|| {
            AdapterError::Identity(
                "authentication failed: set GITHUB_TOKEN or run `gh auth login`".to_string(),
            )
        })
}

fn gh_auth_token() -> Option<String> {
    debug!("no token in environment, asking gh");
    command_output("gh", &["auth", "token"]).ok()
}

/// Detect `(owner, repo)` from the `origin` remote of the current git checkout.
pub fn detect_owner_repo() -> Result<(String, String), AdapterError> {
    let url = command_output("git", &["remote", "get-url", "origin"])
        .map_err(|e| AdapterError::Identity(format!("failed to get git remote: {}", e)))?;
    parse_owner_repo(&url)
}

/// Parse `(owner, repo)` from a GitHub remote URL.
///
/// Accepts `git@github.com:owner/repo(.git)`,
/// `ssh://git@github.com/owner/repo(.git)` and
/// `https://github.com/owner/repo(.git)(/)`.
pub fn parse_owner_repo(url: &str) -> Result<(String, String), AdapterError> {
    let url = url.trim();
    let path = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"));

    let parsed = path.and_then(|path| {
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repo) = path.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some((owner.to_string(), repo.to_string()))
    });

    parsed.ok_or_else(|| {
        AdapterError::Identity(format!(
            "unable to parse owner/repo from remote URL: {}",
            url
        ))
    })
}

/// Parse an explicit `owner/repo` argument.
pub fn parse_repo_arg(value: &str) -> Result<(String, String), AdapterError> {
    match value.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(AdapterError::Identity(format!(
            "expected OWNER/REPO, got: {}",
            value
        ))),
    }
}

/// Detect the pull request number for the current branch using `gh`.
pub fn detect_pr_number() -> Result<u64, AdapterError> {
    let output = command_output("gh", &["pr", "view", "--json", "number", "--jq", ".number"])
        .map_err(|_| {
            AdapterError::Identity("not on a PR branch or gh CLI not available".to_string())
        })?;
    output
        .parse()
        .map_err(|e| AdapterError::Identity(format!("invalid PR number {:?}: {}", output, e)))
}

/// Run a command and return its trimmed stdout, failing on a non-zero exit.
fn command_output(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("{} not runnable: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} exited with {}: {}", program, output.status, stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
