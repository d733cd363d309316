use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

const HINTS: &[(&str, &str)] = &[
    ("Enter", "look up / pick"),
    ("↑↓", "suggestions"),
    ("Tab", "leave field"),
    ("Ctrl+S", "look up"),
    ("Esc", "close / back"),
    ("Ctrl+C", "quit"),
];

pub(crate) fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::with_capacity(HINTS.len() * 2);
    for (key, desc) in HINTS {
        spans.push(Span::styled(
            format!(" [{key}] "),
            Style::default()
                .fg(app.theme.warning())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(*desc, Style::default().fg(app.theme.muted())));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(app.theme.bg())),
        area,
    );
}

/// Page URL on the left, last message in the middle, backend on the right.
pub(crate) fn render(frame: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Min(10),
            Constraint::Percentage(25),
        ])
        .split(area);

    let bar = Style::default().bg(app.theme.bg_secondary());

    let url = app.page().url().to_string();
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {url}"),
            Style::default().fg(app.theme.path_color()),
        ))
        .style(bar),
        cols[0],
    );

    let message = match app.assistant().last_diagnostic() {
        Some(diag) => Span::styled(diag, Style::default().fg(app.theme.danger())),
        None => Span::styled(app.status_message.as_str(), Style::default().fg(app.theme.fg())),
    };
    frame.render_widget(Paragraph::new(message).style(bar), cols[1]);

    let busy = if app.is_busy() { "● " } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(busy, Style::default().fg(app.theme.warning())),
            Span::styled(app.backend_name(), Style::default().fg(app.theme.muted())),
            Span::raw(" "),
        ]))
        .right_aligned()
        .style(bar),
        cols[2],
    );
}
