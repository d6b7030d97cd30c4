//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Meeting links are handed to the
//! platform opener.

use std::{
    io::{self, Stdout, stdout},
    process::Stdio,
    time::Instant,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use pollroom_app::{App, AppEvent, Driver, KeyInput};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The external viewer could not be launched.
    #[error("cannot launch {program}: {source}")]
    Opener {
        /// Program that failed to start.
        program: &'static str,
        /// Underlying error.
        source: io::Error,
    },
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm) and rendering (ratatui). The terminal is
/// restored when the driver is dropped.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    /// Size reported before the first real event.
    initial_size: Option<(u16, u16)>,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let size = terminal.size()?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            initial_size: Some((size.width, size.height)),
        })
    }

    /// Convert a crossterm key event to an [`AppEvent`].
    fn convert_key(key: KeyEvent) -> Option<AppEvent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c' | 'd')).then_some(AppEvent::Shutdown);
        }

        let input = match key.code {
            KeyCode::Char(c) => KeyInput::Char(c),
            KeyCode::Enter => KeyInput::Enter,
            KeyCode::Backspace => KeyInput::Backspace,
            KeyCode::Delete => KeyInput::Delete,
            KeyCode::Tab => KeyInput::Tab,
            KeyCode::Esc => KeyInput::Esc,
            KeyCode::Left => KeyInput::Left,
            KeyCode::Right => KeyInput::Right,
            KeyCode::Up => KeyInput::Up,
            KeyCode::Down => KeyInput::Down,
            KeyCode::PageUp => KeyInput::PageUp,
            KeyCode::PageDown => KeyInput::PageDown,
            KeyCode::Home => KeyInput::Home,
            KeyCode::End => KeyInput::End,
            _ => return None,
        };
        Some(AppEvent::Key(input))
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some((cols, rows)) = self.initial_size.take() {
            return Ok(Some(AppEvent::Resize(cols, rows)));
        }

        match self.event_stream.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                Ok(Self::convert_key(key))
            },
            Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
            Some(Ok(_)) => Ok(None),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            None => Ok(Some(AppEvent::Shutdown)),
        }
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn open_url(&mut self, url: &str) -> Result<(), Self::Error> {
        let mut child = tokio::process::Command::new(OPENER)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TerminalError::Opener { program: OPENER, source })?;

        tracing::info!(url, "opened in external viewer");
        tokio::spawn(async move {
            if let Err(e) = child.wait().await {
                tracing::warn!(error = %e, "external viewer did not exit cleanly");
            }
        });
        Ok(())
    }

    fn stop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_keys_map_to_input() {
        let event = TerminalDriver::convert_key(press(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(matches!(event, Some(AppEvent::Key(KeyInput::Char('x')))));

        let event = TerminalDriver::convert_key(press(KeyCode::PageUp, KeyModifiers::NONE));
        assert!(matches!(event, Some(AppEvent::Key(KeyInput::PageUp))));
    }

    #[test]
    fn ctrl_c_shuts_down() {
        let event = TerminalDriver::convert_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(event, Some(AppEvent::Shutdown)));

        let event = TerminalDriver::convert_key(press(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert!(event.is_none());
    }

    #[test]
    fn shifted_characters_are_typed() {
        let event = TerminalDriver::convert_key(press(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert!(matches!(event, Some(AppEvent::Key(KeyInput::Char('A')))));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert!(TerminalDriver::convert_key(press(KeyCode::F(5), KeyModifiers::NONE)).is_none());
    }
}
