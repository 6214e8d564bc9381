//! Check table rendering.
//!
//! Shows one row per check with queue time, status icon, name and duration.
//! Before any check exists it shows a startup message instead, since GitHub
//! can take a minute or two to queue jobs after a push.

use chrono::{DateTime, TimeDelta, Utc};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::layout::{check_name, duration_text, queue_text, status_icon};
use crate::data::timing::format_duration;
use crate::data::ColumnWidths;
use crate::scheduler::Phase;

/// Wait this long before suggesting checks may be delayed.
const STARTUP_GRACE: TimeDelta = TimeDelta::minutes(2);
/// Wait this long before concluding there are no checks.
const STARTUP_LIMIT: TimeDelta = TimeDelta::minutes(3);

/// Render the check table, or the startup message when there are no checks.
pub fn render(frame: &mut Frame, app: &App, area: Rect, now: DateTime<Utc>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let checks = app.checks();
    if checks.is_empty() {
        let paragraph = Paragraph::new(startup_lines(app, now)).block(block.title(" Checks "));
        frame.render_widget(paragraph, area);
        return;
    }

    let reference = app.observation.reference_time();
    let widths = ColumnWidths::from_checks(checks, reference, now);

    let header = Row::new(vec![
        Cell::from("Startup"),
        Cell::from(""),
        Cell::from("Workflow/Job"),
        Cell::from("Duration"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = checks
        .iter()
        .map(|check| {
            let style = app.theme.check_style(check);
            Row::new(vec![
                Cell::from(Line::from(queue_text(check, reference, now)).right_aligned()),
                Cell::from(status_icon(check)).style(style),
                Cell::from(check_name(check)),
                Cell::from(Line::from(duration_text(check, now)).right_aligned()).style(style),
            ])
        })
        .collect();

    let column_widths = [
        Constraint::Length(widths.queue.max(7) as u16),
        Constraint::Length(1),
        Constraint::Length(widths.name as u16),
        Constraint::Length(widths.duration.max(8) as u16),
    ];

    let position_info = format!(" [{}/{}]", app.selected_index() + 1, checks.len());
    let title = format!(" Checks ({}){} ", checks.len(), position_info);

    let table = Table::new(rows, column_widths)
        .header(header)
        .block(block.title(title))
        .column_spacing(2)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_index()));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Message shown while no checks exist yet.
fn startup_lines(app: &App, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let elapsed = now - app.observation.started_at();
    let running = Style::default().fg(app.theme.running);

    if app.observation.phase() == Phase::AwaitingMetadata {
        return vec![Line::from(Span::styled(
            format!("Fetching pull request ({} elapsed)...", format_duration(elapsed)),
            running,
        ))];
    }

    if elapsed < STARTUP_GRACE {
        vec![
            Line::from(Span::styled(
                format!("Startup Phase ({} elapsed):", format_duration(elapsed)),
                running,
            )),
            Line::from("  ⏳ Waiting for Actions to start..."),
            Line::from("  💡 GitHub typically takes 30-90s to queue jobs after PR creation"),
        ]
    } else if elapsed < STARTUP_LIMIT {
        vec![
            Line::from(Span::styled(
                format!("Still waiting ({} elapsed)...", format_duration(elapsed)),
                running,
            )),
            Line::from("  ⏳ Checks may be delayed or not configured for this PR"),
        ]
    } else {
        vec![
            Line::from(Span::styled(
                "No checks found.",
                Style::default()
                    .fg(app.theme.queued)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(
                "  This PR may not have workflows configured, or they may have been skipped.",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with_checks;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_startup_messages_by_elapsed_time() {
        let app = app_with_checks(vec![]);
        let start = app.observation.started_at();

        let early = text(&startup_lines(&app, start + TimeDelta::seconds(30)));
        assert!(early.contains("Startup Phase (30s elapsed)"));

        let later = text(&startup_lines(&app, start + TimeDelta::seconds(150)));
        assert!(later.contains("Still waiting (2m 30s elapsed)"));

        let late = text(&startup_lines(&app, start + TimeDelta::minutes(5)));
        assert!(late.contains("No checks found."));
    }
}
