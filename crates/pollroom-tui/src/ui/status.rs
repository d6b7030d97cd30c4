//! Status bar and alert popup.

use pollroom_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const ALERT_WIDTH_PERCENT: u16 = 60;
const ALERT_HEIGHT: u16 = 6;

/// Render the status bar.
///
/// A pending banner replaces the regular content until dismissed with Esc.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.banner() {
        Some(banner) => Line::from(vec![
            Span::styled(format!(" {banner}"), Style::default().fg(Color::Yellow)),
            Span::styled("  (Esc)", Style::default().fg(Color::Gray)),
        ]),
        None => {
            let identity = app.name().map_or_else(
                || Span::styled("anonymous", Style::default().fg(Color::Gray)),
                |name| {
                    Span::styled(
                        name.to_string(),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )
                },
            );
            let online = app.view().presence.online.len();
            Line::from(vec![
                Span::raw(" "),
                identity,
                Span::raw(format!(" | {online} online | Tab: next channel | /quit")),
            ])
        },
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

/// Render a blocking alert centered over everything else.
pub fn render_alert(frame: &mut Frame, message: &str) {
    let [area] = Layout::vertical([Constraint::Length(ALERT_HEIGHT)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Percentage(ALERT_WIDTH_PERCENT)])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Alert ");
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("Enter to dismiss", Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}
