//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. Check
//! state colors come from the user's settings and are the same in both.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use checkwatch_types::{CheckRun, CheckStatus, Conclusion};

use crate::config::ColorSettings;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for passed checks.
    pub success: Color,
    /// Color for failed or timed out checks.
    pub failure: Color,
    /// Color for running checks and things needing attention.
    pub running: Color,
    /// Color for queued, skipped and cancelled checks.
    pub queued: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            ..Self::with_colors(ColorSettings::default())
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            ..Self::with_colors(ColorSettings::default())
        }
    }

    fn with_colors(colors: ColorSettings) -> Self {
        Self {
            highlight: Color::Cyan,
            success: Color::Indexed(colors.success),
            failure: Color::Indexed(colors.failure),
            running: Color::Indexed(colors.running),
            queued: Color::Indexed(colors.queued),
            border: Color::Gray,
            header: Style::default(),
            selected: Style::default(),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Replace the check state colors with configured palette indexes.
    pub fn status_colors(mut self, colors: ColorSettings) -> Self {
        self.success = Color::Indexed(colors.success);
        self.failure = Color::Indexed(colors.failure);
        self.running = Color::Indexed(colors.running);
        self.queued = Color::Indexed(colors.queued);
        self
    }

    /// Get style for a check's current state
    pub fn check_style(&self, check: &CheckRun) -> Style {
        match (&check.status, &check.conclusion) {
            (CheckStatus::Completed, Some(Conclusion::Success)) => Style::default().fg(self.success),
            (CheckStatus::Completed, Some(Conclusion::Failure | Conclusion::TimedOut)) => {
                Style::default().fg(self.failure).add_modifier(Modifier::BOLD)
            }
            (CheckStatus::Completed, Some(Conclusion::ActionRequired)) => {
                Style::default().fg(self.running)
            }
            (CheckStatus::InProgress, _) => Style::default().fg(self.running),
            _ => Style::default().fg(self.queued),
        }
    }
}
