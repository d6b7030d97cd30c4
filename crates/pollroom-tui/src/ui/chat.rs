//! Message log, header and typing line.

use pollroom_app::{App, TimelineRow};
use pollroom_client::TimelineEntry;
use pollroom_core::Body;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const DIVIDER_TEXT: &str = "── new messages ──";

/// Render the channel header with the unread affordance and meeting.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let title = view.active.as_ref().map_or_else(|| "No channel".to_string(), |(_, name)| format!("#{name}"));

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(title, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    ];
    if view.unread > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" ↓ {} new (End) ", view.unread),
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    }
    if let Some(meeting) = &view.presence.meeting {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("● meeting by {} (/open)", meeting.started_by),
            Style::default().fg(Color::Magenta),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the visible slice of the message log.
pub fn render_log(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.view().rows();
    if rows.is_empty() {
        let hint = Span::styled("No messages yet", Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(Line::from(hint)), area);
        return;
    }

    let bottom = rows.len().saturating_sub(app.scroll_offset());
    let top = bottom.saturating_sub(usize::from(area.height));
    let lines: Vec<Line> = rows[top..bottom].iter().map(row_line).collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render who else is typing.
pub fn render_typing(frame: &mut Frame, app: &App, area: Rect) {
    let Some(text) = typing_text(&app.view().typing) else {
        return;
    };
    let line = Line::from(Span::styled(
        format!(" {text}"),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn row_line(row: &TimelineRow<'_>) -> Line<'static> {
    match row {
        TimelineRow::Divider => {
            Line::from(Span::styled(DIVIDER_TEXT, Style::default().fg(Color::Red))).centered()
        },
        TimelineRow::Entry(entry) => entry_line(entry),
    }
}

fn entry_line(entry: &TimelineEntry) -> Line<'static> {
    let author_color = if entry.is_own { Color::Yellow } else { Color::Green };
    let placeholder = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);

    let body = match &entry.body {
        Body::Text(_) => Span::raw(entry.body.display_text().replace('\n', " ")),
        Body::Image(_) => Span::styled("[image]", placeholder),
        Body::Voice(_) => Span::styled("[voice message]", placeholder),
        Body::WatchLink(url) => {
            Span::styled(format!("watch together: {url}"), Style::default().fg(Color::Cyan))
        },
        Body::MeetingStart(url) => {
            Span::styled(format!("started a meeting: {url}"), Style::default().fg(Color::Magenta))
        },
    };

    Line::from(vec![
        Span::styled(short_time(&entry.message.timestamp).to_string(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            entry.message.author.clone(),
            Style::default().fg(author_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(": "),
        body,
    ])
}

/// `HH:MM` from a service timestamp such as `2024-01-02 03:04:05`.
fn short_time(timestamp: &str) -> &str {
    let time = timestamp.rsplit(['T', ' ']).next().unwrap_or(timestamp);
    time.get(..5).unwrap_or(time)
}

fn typing_text(names: &[String]) -> Option<String> {
    match names {
        [] => None,
        [one] => Some(format!("{one} is typing…")),
        [first, second] => Some(format!("{first} and {second} are typing…")),
        [first, rest @ ..] => Some(format!("{first} and {} others are typing…", rest.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_time_accepts_both_separators() {
        assert_eq!(short_time("2024-01-02 03:04:05"), "03:04");
        assert_eq!(short_time("2024-01-02T13:14:15"), "13:14");
        assert_eq!(short_time(""), "");
    }

    #[test]
    fn typing_text_by_count() {
        let names = |n: &[&str]| n.iter().map(ToString::to_string).collect::<Vec<_>>();

        assert_eq!(typing_text(&[]), None);
        assert_eq!(typing_text(&names(&["bo"])).as_deref(), Some("bo is typing…"));
        assert_eq!(
            typing_text(&names(&["bo", "cy", "di"])).as_deref(),
            Some("bo and 2 others are typing…")
        );
    }
}
