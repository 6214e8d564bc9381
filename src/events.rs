use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::App;

/// What the runtime should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Only the UI changed; redraw.
    None,
    /// Stop watching.
    Cancel,
}

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Read terminal events on a dedicated thread and forward them to the runtime.
///
/// crossterm's reader blocks, so it cannot live on the async runtime. The
/// thread exits once the receiver is dropped.
pub fn spawn_input_reader(tx: mpsc::Sender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        match poll_event(Duration::from_millis(100)) {
            Ok(Some(event)) => {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, "terminal input closed");
                break;
            }
        }
    })
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }

    // Ctrl-C always stops, even with an overlay open
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Cancel;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return KeyAction::None;
    }

    // If detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.go_back();
            }
            // Allow scrolling through checks while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            _ => {}
        }
        return KeyAction::None;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Cancel,

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),

        // Enter detail overlay
        KeyCode::Enter => app.enter_detail(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }

    KeyAction::None
}
