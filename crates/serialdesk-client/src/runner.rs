use std::sync::Arc;

use serialdesk_core::{Effect, FormAssistant, FormEvent, Page};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;
use tracing::warn;

use crate::backend::SerialBackend;

/// Executes assistant effects on the tokio runtime.
///
/// Every effect becomes one spawned task that sends exactly one event back.
/// State stays with whoever drains the runner, so the assistant and its page
/// are only ever touched from one place. Create one runner per page view:
/// dropping it drops the channel, and completions that arrive later go
/// nowhere.
pub struct FormRunner {
    backend: Arc<dyn SerialBackend>,
    tx: UnboundedSender<FormEvent>,
    rx: UnboundedReceiver<FormEvent>,
    in_flight: usize,
}

impl FormRunner {
    pub fn new(backend: Arc<dyn SerialBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Spawn one task per effect. Must be called within a tokio runtime.
    pub fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.in_flight += 1;
            let tx = self.tx.clone();

            match effect {
                Effect::FetchSuggestions { ticket, query } => {
                    let backend = Arc::clone(&self.backend);
                    tokio::spawn(async move {
                        let result = backend
                            .search_serials(&query)
                            .await
                            .map_err(|e| e.to_string());
                        let _ = tx.send(FormEvent::SuggestionsLoaded { ticket, result });
                    });
                }
                Effect::FetchDetails { ticket, serial } => {
                    let backend = Arc::clone(&self.backend);
                    tokio::spawn(async move {
                        let result = backend
                            .serial_details(&serial)
                            .await
                            .map_err(|e| e.to_string());
                        let _ = tx.send(FormEvent::DetailsLoaded {
                            ticket,
                            serial,
                            result,
                        });
                    });
                }
                Effect::Schedule { delay, event } => {
                    tokio::spawn(async move {
                        sleep(delay).await;
                        let _ = tx.send(event);
                    });
                }
            }
        }
    }

    /// Number of spawned tasks whose event has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Next completed event without waiting.
    pub fn try_next(&mut self) -> Option<FormEvent> {
        let event = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Wait for the next completed event. `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<FormEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let event = self.rx.recv().await;
        if event.is_some() {
            self.in_flight -= 1;
        } else {
            warn!("runner channel closed with work in flight");
            self.in_flight = 0;
        }
        event
    }

    /// Feed every already-completed event to the assistant. Returns how many
    /// were handled.
    pub fn pump<P: Page>(&mut self, assistant: &mut FormAssistant<P>) -> usize {
        let mut handled = 0;
        while let Some(event) = self.try_next() {
            let effects = assistant.handle(event);
            self.dispatch(effects);
            handled += 1;
        }
        handled
    }

    /// Drive the assistant until no work is in flight or the page has
    /// navigated away.
    pub async fn run_until_idle<P: Page>(&mut self, assistant: &mut FormAssistant<P>) {
        while !assistant.has_navigated() {
            let Some(event) = self.next().await else {
                break;
            };
            let effects = assistant.handle(event);
            self.dispatch(effects);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use serialdesk_core::{DetailsResponse, FormConfig, LookupOutcome, MemoryPage};

    use crate::backend::{parse_details, HttpSerialBackend};
    use crate::error::{ClientError, Result};

    /// Canned backend: suggestions per query (with an optional delay) and
    /// details payloads per serial. Unknown serials answer HTTP 404.
    #[derive(Default)]
    struct FakeBackend {
        suggestions: HashMap<String, (Vec<String>, Duration)>,
        details: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn with_suggestions(mut self, query: &str, rows: &[&str], delay_ms: u64) -> Self {
            self.suggestions.insert(
                query.to_string(),
                (
                    rows.iter().map(|s| s.to_string()).collect(),
                    Duration::from_millis(delay_ms),
                ),
            );
            self
        }

        fn with_details(mut self, serial: &str, payload: Value) -> Self {
            self.details.insert(serial.to_string(), payload);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SerialBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search_serials(&self, query: &str) -> Result<Vec<String>> {
            self.calls.lock().unwrap().push(format!("search:{query}"));
            match self.suggestions.get(query) {
                Some((rows, delay)) => {
                    sleep(*delay).await;
                    Ok(rows.clone())
                }
                None => Err(ClientError::Parse("no canned suggestions".into())),
            }
        }

        async fn serial_details(&self, serial: &str) -> Result<DetailsResponse> {
            self.calls.lock().unwrap().push(format!("details:{serial}"));
            match self.details.get(serial) {
                Some(payload) => parse_details(payload),
                None => Err(ClientError::Status {
                    url: format!("/get_serial_details?serial_no={serial}"),
                    status: 404,
                }),
            }
        }
    }

    fn fast_config() -> FormConfig {
        FormConfig {
            blur_hide_delay_ms: 10,
            refire_delay_ms: 20,
            ..FormConfig::default()
        }
    }

    fn start(
        backend: &Arc<FakeBackend>,
        page: MemoryPage,
    ) -> (FormRunner, FormAssistant<MemoryPage>) {
        let mut runner = FormRunner::new(backend.clone());
        let (assistant, effects) = FormAssistant::attach(page, fast_config()).unwrap();
        runner.dispatch(effects);
        (runner, assistant)
    }

    fn type_text(runner: &mut FormRunner, assistant: &mut FormAssistant<MemoryPage>, text: &str) {
        assistant.page_mut().set_input_value(text);
        let effects = assistant.handle(FormEvent::Input);
        runner.dispatch(effects);
    }

    #[tokio::test]
    async fn url_serial_under_warranty_redirects_once() {
        let backend = Arc::new(FakeBackend::default().with_details(
            "XYZ999",
            json!({ "customer": "Acme", "maintenance_status": "Under Warranty" }),
        ));
        let (mut runner, mut assistant) = start(&backend, MemoryPage::full("/?serial_no=XYZ999"));

        runner.run_until_idle(&mut assistant).await;

        assert_eq!(assistant.page().navigations(), ["/warranty?serial_no=XYZ999"]);
        assert_eq!(backend.calls(), ["details:XYZ999"]);
    }

    #[tokio::test]
    async fn url_serial_without_customer_shows_dialog() {
        let backend = Arc::new(
            FakeBackend::default().with_details("XYZ999", json!({ "item_name": "Tester" })),
        );
        let (mut runner, mut assistant) = start(&backend, MemoryPage::full("/?serial_no=XYZ999"));

        runner.run_until_idle(&mut assistant).await;

        let page = assistant.page();
        assert!(page.navigations().is_empty());
        assert!(page.dialog_message().is_some());
        assert!(!page.loading_visible());
        // Immediate lookup plus the delayed re-fire.
        assert_eq!(backend.calls(), ["details:XYZ999", "details:XYZ999"]);
        assert!(runner.is_idle());
    }

    #[tokio::test]
    async fn typing_renders_suggestions() {
        let backend = Arc::new(FakeBackend::default().with_suggestions("AB12", &["AB123", "AB124"], 0));
        let (mut runner, mut assistant) = start(&backend, MemoryPage::new("/"));

        type_text(&mut runner, &mut assistant, "AB12");
        runner.run_until_idle(&mut assistant).await;

        assert!(assistant.suggestions().is_visible());
        assert_eq!(assistant.suggestions().rows(), ["AB123", "AB124"]);
        assert_eq!(backend.calls(), ["search:AB12"]);
    }

    #[tokio::test]
    async fn short_query_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let (mut runner, mut assistant) = start(&backend, MemoryPage::new("/"));

        type_text(&mut runner, &mut assistant, "A");
        runner.run_until_idle(&mut assistant).await;

        assert!(backend.calls().is_empty());
        assert!(!assistant.suggestions().is_visible());
    }

    #[tokio::test]
    async fn slow_stale_suggestions_lose_to_newer_query() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_suggestions("AB", &["AB001", "AB002"], 80)
                .with_suggestions("AB12", &["AB123"], 0),
        );
        let (mut runner, mut assistant) = start(&backend, MemoryPage::new("/"));

        type_text(&mut runner, &mut assistant, "AB");
        type_text(&mut runner, &mut assistant, "AB12");
        runner.run_until_idle(&mut assistant).await;

        assert_eq!(assistant.suggestions().rows(), ["AB123"]);
        assert!(assistant.suggestions().is_visible());
    }

    #[tokio::test]
    async fn failed_suggestion_fetch_keeps_previous_rows() {
        let backend = Arc::new(FakeBackend::default().with_suggestions("AB", &["AB001"], 0));
        let (mut runner, mut assistant) = start(&backend, MemoryPage::new("/"));

        type_text(&mut runner, &mut assistant, "AB");
        runner.run_until_idle(&mut assistant).await;
        type_text(&mut runner, &mut assistant, "ABX");
        runner.run_until_idle(&mut assistant).await;

        assert_eq!(assistant.suggestions().rows(), ["AB001"]);
        assert!(assistant.last_diagnostic().is_some());
    }

    #[tokio::test]
    async fn blur_hides_list_after_delay() {
        let backend = Arc::new(FakeBackend::default().with_suggestions("AB12", &["AB123"], 0));
        let (mut runner, mut assistant) = start(&backend, MemoryPage::new("/"));

        type_text(&mut runner, &mut assistant, "AB12");
        runner.run_until_idle(&mut assistant).await;
        let effects = assistant.handle(FormEvent::Blur);
        runner.dispatch(effects);
        assert!(assistant.suggestions().is_visible());

        runner.run_until_idle(&mut assistant).await;
        assert!(!assistant.suggestions().is_visible());
    }

    #[tokio::test]
    async fn pump_handles_only_completed_events() {
        let backend = Arc::new(FakeBackend::default());
        let (mut runner, mut assistant) = start(&backend, MemoryPage::new("/"));

        runner.dispatch(vec![Effect::Schedule {
            delay: Duration::from_secs(60),
            event: FormEvent::HideSuggestions,
        }]);
        assert_eq!(runner.pump(&mut assistant), 0);
        assert_eq!(runner.in_flight(), 1);
    }

    #[tokio::test]
    async fn network_failure_on_form_page_is_silent() {
        let backend = Arc::new(FakeBackend::default());
        let (mut runner, mut assistant) = start(&backend, MemoryPage::full("/issue?serial_no=GONE"));

        runner.run_until_idle(&mut assistant).await;

        let page = assistant.page();
        assert!(page.dialog_message().is_none());
        assert!(page.alerts().is_empty());
        assert!(!page.loading_visible());
        assert!(matches!(assistant.outcome(), Some(LookupOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn unreadable_details_fail_silently_on_entry_page() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_details("X1", Value::Null)
                .with_details("X2", json!({ "customer": 4021, "maintenance_status": "Under Warranty" })),
        );

        for serial in ["X1", "X2"] {
            let url = format!("/?serial_no={serial}");
            let (mut runner, mut assistant) = start(&backend, MemoryPage::full(&url));
            runner.run_until_idle(&mut assistant).await;

            let page = assistant.page();
            assert!(page.dialog_message().is_none(), "{serial}");
            assert!(page.alerts().is_empty(), "{serial}");
            assert!(page.navigations().is_empty(), "{serial}");
            assert!(!page.loading_visible(), "{serial}");
            assert!(matches!(assistant.outcome(), Some(LookupOutcome::Failed { .. })), "{serial}");
        }
    }

    #[tokio::test]
    async fn http_backend_prefills_issue_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/get_serial_details")
            .match_query(Matcher::UrlEncoded("serial_no".into(), "AB123".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "customer": "Acme Pharma",
                    "customer_address": "Plot 12, MIDC",
                    "item_name": "Dissolution Tester",
                    "zonal_manager": "Shivam Kumar",
                    "maintenance_status": "Out of Warranty"
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let backend: Arc<dyn SerialBackend> =
            Arc::new(HttpSerialBackend::with_base_url(&server.url()).unwrap());
        let mut runner = FormRunner::new(backend);
        let (mut assistant, effects) =
            FormAssistant::attach(MemoryPage::full("/issue?serial_no=AB123"), fast_config())
                .unwrap();
        runner.dispatch(effects);

        runner.run_until_idle(&mut assistant).await;
        mock.assert_async().await;

        let page = assistant.page();
        assert_eq!(page.input_value(), "AB123");
        assert_eq!(page.field("customer"), Some("Acme Pharma"));
        assert_eq!(page.field("customer_name"), Some("Acme Pharma"));
        assert_eq!(page.field("customer_address"), Some("Plot 12, MIDC"));
        assert_eq!(page.field("item_name"), Some("Dissolution Tester"));
        assert_eq!(page.field("zonal_manager"), Some("Shivam Kumar"));
        assert_eq!(page.field("amc_type"), Some("Out Of Warranty"));
        assert!(page.navigations().is_empty());
    }
}
