//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`checks`]: The check table, or a startup message before checks exist
//! - [`detail`]: Modal overlay showing one check's detail and annotations
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Check table (checks::render)         │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod checks;
pub mod common;
pub mod detail;
pub mod theme;

pub use theme::Theme;

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{execute, terminal::EnterAlternateScreen};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame, Terminal,
};

use crate::app::App;
use crate::runtime::Presenter;

/// Minimum terminal size for usable display
const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 8;

/// Draw the whole screen.
pub fn draw(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    let area = frame.area();

    // Check for minimum terminal size
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(
            0,
            (area.height / 2).saturating_sub(2),
            area.width,
            5.min(area.height),
        );
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(4),    // Check table
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    checks::render(frame, app, chunks[1], now);
    common::render_status_bar(frame, app, chunks[2], now);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area, now);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

/// Presents the app by drawing it to a ratatui terminal.
pub struct TerminalPresenter<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalPresenter<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<W: Write> TerminalPresenter<CrosstermBackend<W>> {
    /// Switch `writer` to the alternate screen and draw to it.
    ///
    /// `restore` runs if any step fails, so a terminal already in raw mode is
    /// never left behind.
    pub fn enter(mut writer: W, restore: impl FnOnce()) -> Result<Self> {
        let result = match execute!(writer, EnterAlternateScreen) {
            Ok(()) => Terminal::new(CrosstermBackend::new(writer)),
            Err(e) => Err(e),
        };
        match result {
            Ok(terminal) => Ok(Self::new(terminal)),
            Err(e) => {
                restore();
                Err(e.into())
            }
        }
    }
}

impl<B: Backend> Presenter for TerminalPresenter<B> {
    fn present(&mut self, app: &mut App) -> Result<()> {
        let now = Utc::now();
        self.terminal.draw(|frame| draw(frame, app, now))?;
        Ok(())
    }
}
