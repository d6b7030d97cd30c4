//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.
//!
//! The vertical layout matches [`pollroom_app::CHROME_ROWS`]: one header
//! row, the message log, one typing row, a bordered input line and the
//! status bar. Everything except the log is chrome.

mod channels;
mod chat;
mod input;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const HEADER_HEIGHT: u16 = 1;
    const LOG_MIN_HEIGHT: u16 = 1;
    const TYPING_HEIGHT: u16 = 1;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(LOG_MIN_HEIGHT),
            Constraint::Length(TYPING_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [header_area, main_area, typing_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    chat::render_header(frame, app, *header_area);
    render_main_area(frame, app, *main_area);
    chat::render_typing(frame, app, *typing_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);

    if let Some(alert) = app.alert() {
        status::render_alert(frame, alert);
    }
}

/// Render the main area (channels sidebar + message log).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const CHANNEL_SIDEBAR_WIDTH: u16 = 16;
    const LOG_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(CHANNEL_SIDEBAR_WIDTH), Constraint::Min(LOG_MIN_WIDTH)])
        .split(area);

    let [channels_area, log_area] = chunks.as_ref() else {
        return;
    };

    channels::render(frame, app, *channels_area);
    chat::render_log(frame, app, *log_area);
}
