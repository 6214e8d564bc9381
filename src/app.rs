//! Application state and navigation logic.

use std::time::{Duration, Instant};

use checkwatch_types::CheckRun;

use crate::model::Observation;
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
///
/// The observation is owned here so that the runtime can hand one `&mut App`
/// to both the scheduler and the presenter.
pub struct App {
    pub observation: Observation,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    /// Description of the check source, for the status bar.
    pub source_description: String,

    // Navigation state
    pub selected_check_index: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a fresh observation.
    pub fn new(observation: Observation, source_description: impl Into<String>, theme: Theme) -> Self {
        Self {
            observation,
            show_help: false,
            show_detail_overlay: false,
            source_description: source_description.into(),
            selected_check_index: 0,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current check source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Checks of the latest snapshot, in source order.
    pub fn checks(&self) -> &[CheckRun] {
        self.observation
            .snapshot()
            .map(|s| s.checks.as_slice())
            .unwrap_or_default()
    }

    /// The check under the cursor, clamped to the current snapshot.
    pub fn selected_check(&self) -> Option<&CheckRun> {
        let checks = self.checks();
        if checks.is_empty() {
            return None;
        }
        checks.get(self.selected_index())
    }

    /// Selection index clamped to the current snapshot. Snapshots can shrink
    /// between polls, so the raw index may be out of range.
    pub fn selected_index(&self) -> usize {
        self.selected_check_index
            .min(self.checks().len().saturating_sub(1))
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.checks().len().saturating_sub(1);
        self.selected_check_index = (self.selected_index() + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_check_index = self.selected_index().saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_check_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_check_index = self.checks().len().saturating_sub(1);
    }

    /// Open the detail overlay for the selected check.
    pub fn enter_detail(&mut self) {
        if self.selected_check().is_some() {
            self.show_detail_overlay = true;
        } else {
            self.set_status_message("No checks yet".to_string());
        }
    }

    /// Close any overlay. Returns false if there was nothing to close.
    pub fn go_back(&mut self) -> bool {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return true;
        }
        if self.show_help {
            self.show_help = false;
            return true;
        }
        false
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scheduler::{Event, Scheduler};
    use checkwatch_types::{PrMetadata, PullRequestRef, Snapshot};
    use chrono::Utc;

    /// An app whose observation holds the given checks.
    pub(crate) fn app_with_checks(checks: Vec<CheckRun>) -> App {
        let now = Utc::now();
        let mut observation = Observation::new(PullRequestRef::new("octo", "widgets", 7), now);
        let scheduler = Scheduler::new(Duration::from_secs(5));
        let metadata = PrMetadata {
            number: 7,
            title: "Add retries".into(),
            head_sha: "abc".into(),
            created_at: None,
            head_commit_at: Some(now),
        };
        scheduler.handle(&mut observation, Event::Metadata(Ok(metadata)), now);
        scheduler.handle(&mut observation, Event::Checks(Ok(Snapshot::new(checks, 5000))), now);
        App::new(observation, "test", Theme::dark())
    }

    fn names(n: usize) -> Vec<CheckRun> {
        (0..n).map(|i| CheckRun::builder(format!("job-{}", i)).build()).collect()
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = app_with_checks(names(3));

        app.select_prev();
        assert_eq!(app.selected_index(), 0);

        app.select_next_n(10);
        assert_eq!(app.selected_index(), 2);
        assert_eq!(app.selected_check().unwrap().name, "job-2");

        app.select_first();
        app.select_next();
        assert_eq!(app.selected_index(), 1);

        app.select_last();
        assert_eq!(app.selected_index(), 2);
    }

    #[test]
    fn test_detail_requires_a_check() {
        let mut app = app_with_checks(vec![]);
        app.enter_detail();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.get_status_message(), Some("No checks yet"));

        let mut app = app_with_checks(names(1));
        app.enter_detail();
        assert!(app.show_detail_overlay);
        assert!(app.go_back());
        assert!(!app.show_detail_overlay);
        assert!(!app.go_back());
    }
}
