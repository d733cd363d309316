use crossterm::event::{KeyCode, KeyModifiers};
use serialdesk_core::{FormEvent, Page};

use crate::app::App;

pub(crate) fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('s') if !app.page().has_overlay() => app.send(FormEvent::Submit),
            _ => {}
        }
        return;
    }

    // Dialog and alert are modal.
    if app.page().has_overlay() {
        if matches!(code, KeyCode::Esc | KeyCode::Enter) {
            app.page_mut().dismiss_overlay();
        }
        return;
    }

    match code {
        KeyCode::Char(c) => {
            let page = app.page_mut();
            page.focus_input();
            page.insert_char(c);
            app.send(FormEvent::Input);
        }
        KeyCode::Backspace => {
            app.page_mut().focus_input();
            if app.page_mut().backspace() {
                app.send(FormEvent::Input);
            }
        }
        KeyCode::Left => app.page_mut().cursor_left(),
        KeyCode::Right => app.page_mut().cursor_right(),
        KeyCode::Down => hover_step(app, true),
        KeyCode::Up => hover_step(app, false),
        KeyCode::Enter => match app.suggestions().hovered() {
            Some(index) if app.suggestions().is_visible() => app.send(FormEvent::RowClick(index)),
            _ => app.send(FormEvent::EnterKey),
        },
        KeyCode::Tab | KeyCode::BackTab => {
            if app.page().is_input_focused() {
                app.page_mut().blur_input();
                app.send(FormEvent::Blur);
            } else {
                app.page_mut().focus_input();
            }
        }
        KeyCode::Esc => {
            if !app.page().is_entry_page() {
                app.go_home();
            } else if app.suggestions().hovered().is_some() {
                app.send(FormEvent::RowUnhover);
            }
        }
        _ => {}
    }
}

fn hover_step(app: &mut App, forward: bool) {
    if let Some(index) = app.suggestions().step_target(forward) {
        app.send(FormEvent::RowHover(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use serialdesk_client::{ClientError, SerialBackend};
    use serialdesk_core::{AppConfig, DetailsResponse, FormConfig};

    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn details_calls(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with("details:"))
                .count()
        }
    }

    #[async_trait]
    impl SerialBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search_serials(&self, query: &str) -> serialdesk_client::Result<Vec<String>> {
            self.calls.lock().unwrap().push(format!("search:{query}"));
            Ok(match query {
                "AB" => vec!["AB123".into(), "AB124".into()],
                _ => Vec::new(),
            })
        }

        async fn serial_details(&self, serial: &str) -> serialdesk_client::Result<DetailsResponse> {
            self.calls.lock().unwrap().push(format!("details:{serial}"));
            let payload = match serial {
                "XYZ999" => json!({
                    "customer": "Acme Pharma",
                    "item_name": "Dissolution Tester",
                    "maintenance_status": "Under Warranty"
                }),
                "NOPE" => json!({ "error": "Serial number not found" }),
                _ => {
                    return Err(ClientError::Status {
                        url: serial.to_string(),
                        status: 500,
                    });
                }
            };
            Ok(DetailsResponse::from_json(&payload))
        }
    }

    fn app_at(url: &str) -> (App, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        let config = AppConfig {
            form: FormConfig {
                blur_hide_delay_ms: 5,
                refire_delay_ms: 5,
                ..FormConfig::default()
            },
            ..AppConfig::default()
        };
        let app = App::new(config, backend.clone(), url).unwrap();
        (app, backend)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, code, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            app.tick();
        }
    }

    #[tokio::test]
    async fn typing_shows_suggestions() {
        let (mut app, _) = app_at("/");
        type_text(&mut app, "AB");
        settle(&mut app).await;

        assert!(app.suggestions().is_visible());
        assert_eq!(app.suggestions().rows(), ["AB123", "AB124"]);
    }

    #[tokio::test]
    async fn arrow_and_enter_select_row_without_lookup() {
        let (mut app, backend) = app_at("/");
        type_text(&mut app, "AB");
        settle(&mut app).await;

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.suggestions().hovered(), Some(1));
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.suggestions().hovered(), Some(1));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.page().input(), "AB124");
        assert!(!app.suggestions().is_visible());
        settle(&mut app).await;
        assert_eq!(backend.details_calls(), 0);
    }

    #[tokio::test]
    async fn enter_looks_up_and_follows_redirect() {
        let (mut app, _) = app_at("/");
        type_text(&mut app, "XYZ999");
        press(&mut app, KeyCode::Enter);
        assert!(app.page().loading_visible());
        settle(&mut app).await;

        let page = app.page();
        assert_eq!(page.path(), "/warranty");
        assert_eq!(page.input(), "XYZ999");
        assert!(page.fields().contains(&("customer_name", "Acme Pharma".to_string())));
        assert!(page.fields().contains(&("amc_type", "Out Of Warranty".to_string())));
        assert!(!page.loading_visible());
    }

    #[tokio::test]
    async fn not_found_on_form_page_raises_alert() {
        let (mut app, _) = app_at("/issue?serial_no=NOPE");
        settle(&mut app).await;

        assert!(app.page().alert_message().is_some());
        // Modal: typing is swallowed until the alert is dismissed.
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.page().input(), "NOPE");
        press(&mut app, KeyCode::Esc);
        assert!(!app.page().has_overlay());
        assert_eq!(app.page().path(), "/issue");
    }

    #[tokio::test]
    async fn not_found_on_entry_page_shows_dialog() {
        let (mut app, _) = app_at("/");
        type_text(&mut app, "NOPE");
        handle_key(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        settle(&mut app).await;

        assert!(app.page().dialog_message().is_some());
        assert!(app.page().alert_message().is_none());
        assert_eq!(app.page().path(), "/");
    }

    #[tokio::test]
    async fn network_failure_only_updates_diagnostic() {
        let (mut app, _) = app_at("/");
        type_text(&mut app, "BROKEN");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert!(!app.page().has_overlay());
        assert!(!app.page().loading_visible());
        assert!(app.assistant().last_diagnostic().is_some());
    }

    #[tokio::test]
    async fn esc_on_form_page_returns_to_entry() {
        let (mut app, _) = app_at("/issue");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.page().path(), "/");
    }

    #[tokio::test]
    async fn tab_blurs_and_hides_list() {
        let (mut app, _) = app_at("/");
        type_text(&mut app, "AB");
        settle(&mut app).await;

        press(&mut app, KeyCode::Tab);
        assert!(!app.page().is_input_focused());
        settle(&mut app).await;
        assert!(!app.suggestions().is_visible());
    }

    #[tokio::test]
    async fn ctrl_c_quits() {
        let (mut app, _) = app_at("/");
        handle_key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
