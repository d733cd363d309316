use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use serialdesk_core::Page;

use super::truncate;
use crate::app::App;

const MAX_DROPDOWN_ROWS: usize = 6;
const LABEL_WIDTH: usize = 16;

pub(crate) fn render(frame: &mut Frame, app: &App, area: Rect) {
    let page = app.page();

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", page.title()),
            Style::default()
                .fg(app.theme.active_panel())
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border()))
        .style(Style::default().bg(app.theme.bg()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // serial input
            Constraint::Length(1),
            Constraint::Min(1), // fields / help
        ])
        .split(inner);

    render_input(frame, app, layout[0]);

    if page.is_entry_page() {
        render_help(frame, app, layout[2]);
    } else {
        render_fields(frame, app, layout[2]);
    }

    // Dropdown last so it covers the fields below the input.
    render_dropdown(frame, app, layout[0], inner);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let page = app.page();
    let focused = page.is_input_focused();

    let border = if focused {
        app.theme.active_panel()
    } else {
        app.theme.border()
    };
    let block = Block::default()
        .title(" Serial no. ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let text_area = block.inner(area);

    frame.render_widget(
        Paragraph::new(page.input()).style(Style::default().fg(app.theme.fg())).block(block),
        area,
    );

    if focused && !page.has_overlay() && !page.loading_visible() {
        let offset = u16::try_from(page.cursor()).unwrap_or(u16::MAX);
        let x = text_area
            .x
            .saturating_add(offset)
            .min(text_area.right().saturating_sub(1));
        frame.set_cursor_position((x, text_area.y));
    }
}

fn render_dropdown(frame: &mut Frame, app: &App, input: Rect, bounds: Rect) {
    let list = app.suggestions();
    if !list.is_visible() || list.is_empty() {
        return;
    }

    let rows = list.len().min(MAX_DROPDOWN_ROWS) as u16;
    let top = input.bottom();
    let height = (rows + 2).min(bounds.bottom().saturating_sub(top));
    if height < 3 {
        return;
    }
    let area = Rect {
        x: input.x,
        y: top,
        width: input.width,
        height,
    };
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = list
        .rows()
        .iter()
        .enumerate()
        .map(|(i, serial)| {
            let style = if list.hovered() == Some(i) {
                Style::default()
                    .bg(app.theme.cursor_bg())
                    .fg(app.theme.fg_white())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.fg())
            };
            ListItem::new(Span::styled(format!(" {serial} "), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border()))
        .style(Style::default().bg(app.theme.bg_secondary()));

    frame.render_widget(List::new(items).block(block), area);
}

fn render_fields(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .page()
        .fields()
        .iter()
        .map(|(id, value)| {
            let value_span = if value.is_empty() {
                Span::styled("─", Style::default().fg(app.theme.muted()))
            } else {
                Span::styled(value.as_str(), Style::default().fg(app.theme.success()))
            };
            Line::from(vec![
                Span::styled(
                    format!("  {}", truncate(field_label(id), LABEL_WIDTH)),
                    Style::default().fg(app.theme.muted()),
                ),
                value_span,
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let min = app.config.form.min_query_chars;
    let lines = vec![
        Line::from(Span::styled(
            format!("  Type at least {min} characters to see matching serial numbers."),
            Style::default().fg(app.theme.muted()),
        )),
        Line::from(Span::styled(
            "  Enter or Ctrl+S looks the serial up and opens the warranty or service form.",
            Style::default().fg(app.theme.muted()),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn field_label(id: &str) -> &str {
    match id {
        "item_name" => "Item",
        "customer" => "Customer",
        "customer_address" => "Address",
        "zonal_manager" => "Zonal manager",
        "customer_name" => "Contact name",
        "amc_type" => "AMC type",
        other => other,
    }
}
