use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use crate::app::App;

pub(crate) fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.warning()))
        .style(Style::default().bg(app.theme.bg()));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let line = Line::from(Span::styled(
        "Fetching serial details…",
        Style::default()
            .fg(app.theme.warning())
            .add_modifier(Modifier::BOLD),
    ))
    .centered();
    frame.render_widget(Paragraph::new(vec![Line::from(""), line]), inner);
}

/// Error dialog or alert: one message and a dismiss hint.
pub(crate) fn render_message(frame: &mut Frame, app: &App, title: &str, message: &str, area: Rect) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(app.theme.danger())
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.danger()))
        .style(Style::default().bg(app.theme.bg()));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![Line::from("")];
    lines.extend(message.lines().map(|l| {
        Line::from(Span::styled(
            format!("  {l}"),
            Style::default().fg(app.theme.fg()),
        ))
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Esc / Enter: close",
        Style::default()
            .fg(app.theme.muted())
            .add_modifier(Modifier::DIM),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
