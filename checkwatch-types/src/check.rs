//! Check runs - one CI job or status context evaluated against a commit.

use std::fmt;

use chrono::{DateTime, Utc};

/// Lifecycle state of a check.
///
/// Sources must hand over lowercase API values; anything unrecognised is kept
/// verbatim in [`CheckStatus::Other`] so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum CheckStatus {
    /// Waiting for a runner.
    #[default]
    Queued,
    /// Currently executing.
    InProgress,
    /// Finished; see the conclusion.
    Completed,
    /// A status value this crate does not know about.
    Other(String),
}

impl CheckStatus {
    /// Parse a lowercase API status value.
    pub fn parse(value: &str) -> Self {
        match value {
            "queued" => CheckStatus::Queued,
            "in_progress" => CheckStatus::InProgress,
            "completed" => CheckStatus::Completed,
            other => CheckStatus::Other(other.to_string()),
        }
    }

    /// The API string for this status.
    pub fn as_str(&self) -> &str {
        match self {
            CheckStatus::Queued => "queued",
            CheckStatus::InProgress => "in_progress",
            CheckStatus::Completed => "completed",
            CheckStatus::Other(value) => value,
        }
    }

    /// Returns true once the check has reached a final state.
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckStatus::Completed)
    }
}

impl From<String> for CheckStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CheckStatus> for String {
    fn from(status: CheckStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a completed check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    /// A conclusion value this crate does not know about.
    Unknown(String),
}

impl Conclusion {
    /// Parse a lowercase API conclusion value.
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "cancelled" => Conclusion::Cancelled,
            "skipped" => Conclusion::Skipped,
            "timed_out" => Conclusion::TimedOut,
            "action_required" => Conclusion::ActionRequired,
            "neutral" => Conclusion::Neutral,
            "stale" => Conclusion::Stale,
            other => Conclusion::Unknown(other.to_string()),
        }
    }

    /// The API string for this conclusion.
    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::TimedOut => "timed_out",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Neutral => "neutral",
            Conclusion::Stale => "stale",
            Conclusion::Unknown(value) => value,
        }
    }

    /// Conclusions that make the overall result a failure.
    pub fn is_failing(&self) -> bool {
        matches!(
            self,
            Conclusion::Failure | Conclusion::TimedOut | Conclusion::ActionRequired
        )
    }
}

impl From<String> for Conclusion {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Conclusion> for String {
    fn from(conclusion: Conclusion) -> Self {
        conclusion.as_str().to_string()
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An annotation (error, warning or notice) attached to a failed check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub line: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    /// Severity, lowercased (`failure`, `warning`, `notice`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: String,
}

/// One named CI check observed at the head commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheckRun {
    /// Job identifier.
    pub name: String,

    /// Workflow the job belongs to. Empty means ungrouped (e.g. a commit status).
    #[cfg_attr(feature = "serde", serde(default))]
    pub workflow_name: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub status: CheckStatus,

    /// Only meaningful once `status` is completed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub conclusion: Option<Conclusion>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub started_at: Option<DateTime<Utc>>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub completed_at: Option<DateTime<Utc>>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub details_url: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub summary: String,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub annotations: Vec<Annotation>,
}

impl CheckRun {
    /// Create a builder for a check with the given job name.
    pub fn builder(name: impl Into<String>) -> CheckRunBuilder {
        CheckRunBuilder::new(name)
    }

    /// Identity of the check within one snapshot.
    pub fn identity(&self) -> (&str, &str) {
        (&self.workflow_name, &self.name)
    }

    /// Name as shown to the operator: `Workflow / Job` or just `Job`.
    pub fn display_name(&self) -> String {
        if self.workflow_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} / {}", self.workflow_name, self.name)
        }
    }

    /// Returns true if the check completed with a failing conclusion.
    pub fn is_failing(&self) -> bool {
        self.status.is_completed() && self.conclusion.as_ref().is_some_and(Conclusion::is_failing)
    }
}

/// Builder for constructing `CheckRun` instances.
#[derive(Debug)]
pub struct CheckRunBuilder {
    check: CheckRun,
}

impl CheckRunBuilder {
    /// Create a new builder for a queued check.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            check: CheckRun {
                name: name.into(),
                ..CheckRun::default()
            },
        }
    }

    /// Set the workflow name.
    pub fn workflow(mut self, workflow: impl Into<String>) -> Self {
        self.check.workflow_name = workflow.into();
        self
    }

    /// Set the status.
    pub fn status(mut self, status: CheckStatus) -> Self {
        self.check.status = status;
        self
    }

    /// Mark the check completed with the given conclusion.
    pub fn completed(mut self, conclusion: Conclusion) -> Self {
        self.check.status = CheckStatus::Completed;
        self.check.conclusion = Some(conclusion);
        self
    }

    /// Set the start time.
    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.check.started_at = Some(at);
        self
    }

    /// Set the completion time.
    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.check.completed_at = Some(at);
        self
    }

    /// Set the link to the check's detail page.
    pub fn details_url(mut self, url: impl Into<String>) -> Self {
        self.check.details_url = url.into();
        self
    }

    /// Set the summary text.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.check.summary = summary.into();
        self
    }

    /// Attach an annotation.
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.check.annotations.push(annotation);
        self
    }

    /// Build the check.
    pub fn build(self) -> CheckRun {
        self.check
    }
}
