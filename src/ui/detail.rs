//! Detail overlay rendering.
//!
//! Displays a modal overlay with the selected check's timing, link, summary
//! and annotations.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use checkwatch_types::{Annotation, CheckRun};

use crate::app::App;
use crate::data::layout::{duration_text, queue_text, status_icon};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 14;

/// Render the check detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect, now: DateTime<Utc>) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(check) = app.selected_check() else {
        return;
    };

    // Width: 95% of screen, clamped to [MIN_OVERLAY_WIDTH, 110]
    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    // Height: 90% of screen, clamped to [MIN_OVERLAY_HEIGHT, 40]
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(6), // Header with check info
        Constraint::Min(4),    // Annotations
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let style = app.theme.check_style(check);
    let reference = app.observation.reference_time();
    let outcome = match &check.conclusion {
        Some(conclusion) if check.status.is_completed() => conclusion.to_string(),
        _ => check.status.to_string(),
    };

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", check.display_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(
                format!("{} {}", status_icon(check), outcome),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Startup: "),
            Span::raw(queue_text(check, reference, now)),
            Span::raw("    Duration: "),
            Span::raw(duration_text(check, now)),
        ]),
        Line::from(vec![
            Span::raw(" Link: "),
            Span::styled(
                if check.details_url.is_empty() {
                    "-".to_string()
                } else {
                    check.details_url.clone()
                },
                Style::default().fg(app.theme.highlight),
            ),
        ]),
        Line::from(format!(" {}", check.summary)),
    ];

    let header_block = Block::default()
        .title(" Check Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let header = Paragraph::new(header_lines)
        .block(header_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(header, chunks[0]);

    // ===== ANNOTATIONS SECTION =====
    let annotations_block = Block::default()
        .title(format!(" Annotations ({}) ", check.annotations.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(annotation_lines(app, check))
        .block(annotations_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(" ↑↓:switch check  Esc:close")
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[2]);
}

fn annotation_lines(app: &App, check: &CheckRun) -> Vec<Line<'static>> {
    if check.annotations.is_empty() {
        return vec![Line::from(Span::styled(
            " No annotations",
            Style::default().add_modifier(Modifier::DIM),
        ))];
    }

    check
        .annotations
        .iter()
        .flat_map(|annotation| {
            let level_style = match annotation.level.as_str() {
                "failure" => Style::default().fg(app.theme.failure),
                "warning" => Style::default().fg(app.theme.running),
                _ => Style::default().fg(app.theme.queued),
            };
            [
                Line::from(vec![
                    Span::styled(format!(" {} ", annotation.level), level_style),
                    Span::styled(
                        location(annotation),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(if annotation.title.is_empty() {
                        String::new()
                    } else {
                        format!("  {}", annotation.title)
                    }),
                ]),
                Line::from(format!("   {}", annotation.message)),
            ]
        })
        .collect()
}

/// `path:line`, or just the path when the line is unknown.
fn location(annotation: &Annotation) -> String {
    match (annotation.path.is_empty(), annotation.line) {
        (true, _) => "-".to_string(),
        (false, 0) => annotation.path.clone(),
        (false, line) => format!("{}:{}", annotation.path, line),
    }
}
