//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the application completely decoupled from I/O and the
//! sync engine.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the input line and turns submitted lines into commands.
//! - Tracks the scroll offset of the message log in rows from the bottom,
//!   and reports every move the sync engine cannot predict (user scrolls,
//!   divider jumps, clamps) so it can classify "at bottom".
//! - Keeps the log stable while the user reads history: rows appended below
//!   push the offset up instead of moving the viewport.
//! - Holds the transient banner and the blocking alert.

use pollroom_client::Notice;
use pollroom_core::Body;

use crate::{
    AppAction, AppEvent, AttachmentKind, ChatView, Command, InputState, KeyInput, parse_command,
};

/// Terminal rows not available to the message log (header, typing line,
/// status bar, bordered input).
pub const CHROME_ROWS: u16 = 6;

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Local display name, if known.
    name: Option<String>,
    /// Line editor.
    input: InputState,
    /// View model of the active channel.
    view: ChatView,
    /// Log rows hidden below the viewport. Zero means at the bottom.
    scroll_offset: usize,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message.
    banner: Option<String>,
    /// Blocking message; swallows input until acknowledged.
    alert: Option<String>,
}

impl App {
    /// Create an App for the given display name.
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            input: InputState::new(),
            view: ChatView::default(),
            scroll_offset: 0,
            terminal_size: (80, 24),
            banner: None,
            alert: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(cols, rows) => {
                let before = self.scroll_offset;
                self.terminal_size = (cols, rows);
                self.settle(before)
            },
            AppEvent::Shutdown => vec![AppAction::Quit],
            AppEvent::Timeline(timeline) => {
                let before = self.scroll_offset;
                let anchor = self.view.entries.last().map(|e| e.message.id);
                let below_before = anchor.and_then(|id| self.view.rows_below(id));

                self.view.apply_timeline(timeline);

                // Holding a reading position: keep the same rows on screen.
                if self.scroll_offset > 0 {
                    let below_after = anchor.and_then(|id| self.view.rows_below(id));
                    if let (Some(was), Some(now)) = (below_before, below_after) {
                        self.scroll_offset += now.saturating_sub(was);
                    }
                }
                self.settle(before)
            },
            AppEvent::Unread { count } => {
                self.view.unread = count;
                vec![AppAction::Render]
            },
            AppEvent::ScrollToBottom => {
                self.scroll_offset = 0;
                vec![AppAction::Render]
            },
            AppEvent::ScrollToMessage { message_id } => {
                if let Some(below) = self.view.rows_below(message_id) {
                    // Put the message on the top row.
                    self.scroll_offset = below.saturating_sub(self.viewport_rows() - 1);
                    self.scroll_offset = self.scroll_offset.min(self.max_offset());
                }
                // Always reported: a short unread tail lands at the bottom.
                vec![self.scrolled(), AppAction::Render]
            },
            AppEvent::Typing { names } => {
                self.view.typing = names;
                vec![AppAction::Render]
            },
            AppEvent::Presence(snapshot) => {
                self.view.presence = snapshot;
                vec![AppAction::Render]
            },
            AppEvent::Channels { channels } => {
                self.view.channels = channels;
                vec![AppAction::Render]
            },
            AppEvent::ChannelActivated { channel_id, name } => {
                self.view.activate(channel_id, name);
                self.scroll_offset = 0;
                vec![AppAction::Render]
            },
            AppEvent::Notice(Notice::Banner(message)) => {
                self.banner = Some(message);
                vec![AppAction::Render]
            },
            AppEvent::Notice(Notice::Alert(message)) => {
                self.alert = Some(message);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.banner = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.alert.is_some() {
            return match key {
                KeyInput::Enter | KeyInput::Esc => {
                    self.alert = None;
                    vec![AppAction::Render]
                },
                _ => vec![],
            };
        }

        match key {
            KeyInput::Char(c) => {
                self.input.insert(c);
                self.edited()
            },
            KeyInput::Backspace => {
                if self.input.backspace() { self.edited() } else { vec![] }
            },
            KeyInput::Delete => {
                if self.input.delete() { self.edited() } else { vec![] }
            },
            KeyInput::Left => {
                self.input.left();
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.input.right();
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.input.home();
                vec![AppAction::Render]
            },
            KeyInput::Up => self.scroll_to(self.scroll_offset + 1),
            KeyInput::Down => self.scroll_to(self.scroll_offset.saturating_sub(1)),
            KeyInput::PageUp => self.scroll_to(self.scroll_offset + self.viewport_rows()),
            KeyInput::PageDown => {
                self.scroll_to(self.scroll_offset.saturating_sub(self.viewport_rows()))
            },
            KeyInput::End => {
                self.scroll_offset = 0;
                vec![AppAction::JumpToLatest, AppAction::Render]
            },
            KeyInput::Tab => match self.view.next_channel() {
                Some(channel_id) if Some(channel_id) != self.view.active_channel() => {
                    vec![AppAction::SelectChannel { channel_id }, AppAction::Render]
                },
                _ => vec![],
            },
            KeyInput::Esc => {
                if self.banner.take().is_some() {
                    vec![AppAction::Render]
                } else {
                    vec![AppAction::Quit]
                }
            },
            KeyInput::Enter => self.submit(),
        }
    }

    /// Typing signals are only sent while composing a message, not a command.
    fn edited(&self) -> Vec<AppAction> {
        if self.input.is_empty() || self.input.buffer().starts_with('/') {
            vec![AppAction::Render]
        } else {
            vec![AppAction::InputChanged, AppAction::Render]
        }
    }

    fn submit(&mut self) -> Vec<AppAction> {
        let line = self.input.take();
        if line.trim().is_empty() {
            return vec![AppAction::Render];
        }

        let action = match parse_command(&line) {
            Command::Message { text } => match Body::text(text) {
                Ok(body) => AppAction::Send { body },
                Err(e) => return self.status(e.to_string()),
            },
            Command::Join { channel_name } => AppAction::Join { channel_name },
            Command::Create { name, members } => AppAction::CreateChannel { name, members },
            Command::Leave => match self.view.active_channel() {
                Some(channel_id) => AppAction::DeleteChannel { channel_id },
                None => return self.status("No active channel"),
            },
            Command::Switch { channel_id } => AppAction::SelectChannel { channel_id },
            Command::Remove { message_id } => AppAction::DeleteMessage { message_id },
            Command::Image { path } => AppAction::SendAttachment { kind: AttachmentKind::Image, path },
            Command::Voice { path } => AppAction::SendAttachment { kind: AttachmentKind::Voice, path },
            Command::Watch { url } => match Body::watch_link(&url) {
                Ok(body) => AppAction::Send { body },
                Err(e) => return self.status(e.to_string()),
            },
            Command::Meet { url } => AppAction::StartMeeting { url },
            Command::Open => match &self.view.presence.meeting {
                Some(meeting) => AppAction::OpenUrl { url: meeting.url.clone() },
                None => return self.status("No active meeting"),
            },
            Command::Quit => return vec![AppAction::Quit],
            Command::Unknown { input } => return self.status(format!("Unknown command: {input}")),
            Command::InvalidArgs { command, error } => {
                return self.status(format!("/{command}: {error}"));
            },
        };
        vec![action, AppAction::Render]
    }

    fn status(&mut self, message: impl Into<String>) -> Vec<AppAction> {
        self.banner = Some(message.into());
        vec![AppAction::Render]
    }

    fn scroll_to(&mut self, offset: usize) -> Vec<AppAction> {
        let before = self.scroll_offset;
        self.scroll_offset = offset.min(self.max_offset());
        if self.scroll_offset == before {
            return vec![];
        }
        vec![self.scrolled(), AppAction::Render]
    }

    /// Clamp the offset after the log or the viewport changed. An offset
    /// that ends below `before` is reported, since the sync engine still
    /// holds the distance it was last told.
    fn settle(&mut self, before: usize) -> Vec<AppAction> {
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
        if self.scroll_offset < before {
            vec![self.scrolled(), AppAction::Render]
        } else {
            vec![AppAction::Render]
        }
    }

    fn scrolled(&self) -> AppAction {
        let distance_from_bottom = u32::try_from(self.scroll_offset).unwrap_or(u32::MAX);
        AppAction::Scrolled { distance_from_bottom }
    }

    fn max_offset(&self) -> usize {
        self.view.row_count().saturating_sub(self.viewport_rows())
    }

    /// Rows available to the message log.
    pub fn viewport_rows(&self) -> usize {
        usize::from(self.terminal_size.1.saturating_sub(CHROME_ROWS).max(1))
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    /// Local display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Line editor.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// View model of the active channel.
    pub fn view(&self) -> &ChatView {
        &self.view
    }

    /// Log rows hidden below the viewport.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Blocking alert awaiting acknowledgement.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }
}
