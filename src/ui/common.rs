//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::timing::format_duration;
use crate::data::Tally;
use crate::scheduler::Phase;

/// Below this budget the status bar shows the remaining API calls.
const RATE_LIMIT_WARNING: u32 = 100;

/// Render the header bar with the pull request and an outcome tally.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let observation = &app.observation;
    let pr = observation.pull_request();

    let title = match observation.metadata() {
        Some(metadata) => format!(" PR #{}: {} ", pr.number, metadata.title),
        None => format!(" {} ", pr),
    };

    let mut spans = vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];

    match observation.snapshot() {
        Some(snapshot) if !snapshot.is_empty() => {
            let tally = Tally::of(snapshot);
            let count = |n: usize, color| {
                if n > 0 {
                    Span::styled(n.to_string(), Style::default().fg(color))
                } else {
                    Span::styled("0", Style::default().add_modifier(Modifier::DIM))
                }
            };
            spans.extend([
                count(tally.passed, app.theme.success),
                Span::raw(" passed "),
                count(tally.failed, app.theme.failure),
                Span::raw(" failed "),
                count(tally.running, app.theme.running),
                Span::raw(" running "),
                count(tally.queued, app.theme.queued),
                Span::raw(" queued "),
            ]);
            if tally.neutral > 0 {
                spans.push(count(tally.neutral, app.theme.queued));
                spans.push(Span::raw(" other "));
            }
            spans.push(Span::raw("│ "));
        }
        _ => {}
    }

    let phase_style = match observation.phase() {
        Phase::Converged if observation.exit_code() == 0 => Style::default().fg(app.theme.success),
        Phase::Converged | Phase::Failed => Style::default().fg(app.theme.failure),
        _ => Style::default().fg(app.theme.running),
    };
    spans.push(Span::styled(
        observation.phase().label(),
        phase_style.add_modifier(Modifier::BOLD),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Text of the status bar: a temporary message, the last error, or the
/// time since the last update with the rate budget when it runs low.
pub fn status_text(app: &App, now: DateTime<Utc>) -> String {
    if let Some(msg) = app.get_status_message() {
        return format!(" {} ", msg);
    }

    let observation = &app.observation;
    let mut status = match observation.last_update() {
        Some(updated) => format!(" Last updated {} ago", format_duration(now - updated)),
        None => " Loading...".to_string(),
    };

    if let Some(remaining) = observation.rate_limit_remaining() {
        if remaining < RATE_LIMIT_WARNING {
            status.push_str(&format!("  [Rate limit: {} remaining]", remaining));
        }
    }

    if let Some(err) = observation.error() {
        status.push_str(&format!(" | Error: {}", err));
    }

    status.push_str(&format!(" | {} | ?:help q:quit", app.source_description()));
    status
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, now: DateTime<Utc>) {
    let style = if app.get_status_message().is_some() {
        Style::default().fg(app.theme.highlight)
    } else if app.observation.error().is_some() {
        Style::default().fg(app.theme.failure)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let paragraph = Paragraph::new(status_text(app, now)).style(style);
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the check table.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.observation.stats();
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Navigate checks"),
        Line::from("  PgUp/PgDn   Jump 10 checks"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Check detail"),
        Line::from("  Esc         Close overlay"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle help"),
        Line::from("  q Esc       Stop watching"),
        Line::from("  Ctrl-C      Stop watching"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Polling",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(format!("  Fetches     {}", stats.polls)),
        Line::from(format!("  Backoffs    {}", stats.backoffs)),
        Line::from(format!("  Updates     {}", stats.snapshots_applied)),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
