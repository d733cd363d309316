mod form;
mod popups;
mod statusbar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // form
            Constraint::Length(1), // key hints
            Constraint::Length(1), // status bar
        ])
        .split(size);

    form::render(frame, app, main_layout[0]);
    statusbar::render_hints(frame, app, main_layout[1]);
    statusbar::render(frame, app, main_layout[2]);

    // Overlays, topmost last.
    if app.page().loading_visible() {
        popups::render_loading(frame, app, size);
    }
    if let Some(message) = app.page().dialog_message() {
        popups::render_message(frame, app, " Serial not found ", message, size);
    } else if let Some(message) = app.page().alert_message() {
        popups::render_message(frame, app, " Alert ", message, size);
    }
}

// ─── Helpers ───────────────────────────────────────────────

/// Pad or cut `s` to exactly `max` chars.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        format!("{s:<max$}")
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

/// Create a centered rectangle.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_pads_and_cuts() {
        assert_eq!(truncate("AMC", 6), "AMC   ");
        assert_eq!(truncate("Customer address", 8), "Custome…");
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }
}
