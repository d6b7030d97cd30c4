//! Channels sidebar
//!
//! Displays joined channels; the active one is highlighted.

use pollroom_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const ADMIN_MARKER: &str = "*";

/// Render the channels sidebar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let active = view.active_channel();

    let items: Vec<ListItem> = view
        .channels
        .iter()
        .map(|channel| {
            let (prefix, style) = if Some(channel.id) == active {
                (ACTIVE_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                (INACTIVE_PREFIX, Style::default())
            };
            let marker = if channel.is_admin { ADMIN_MARKER } else { "" };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(format!("#{}", channel.name), style),
                Span::styled(marker, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::RIGHT).title(" Channels ");
    frame.render_widget(List::new(items).block(block), area);
}
