use std::sync::Arc;

use anyhow::Result;
use serialdesk_client::{FormRunner, SerialBackend};
use serialdesk_core::page::ENTRY_PATH;
use serialdesk_core::{AppConfig, FormAssistant, FormEvent, SuggestionList};
use tracing::info;

use crate::page::TerminalPage;
use crate::theme::NordTheme;

/// One rendered page with its assistant and the runner executing its effects.
struct PageView {
    assistant: FormAssistant<TerminalPage>,
    runner: FormRunner,
}

/// Top-level TUI state.
///
/// Must be created and driven inside a tokio runtime: every page view
/// spawns its network calls and timers onto it.
pub struct App {
    pub config: AppConfig,
    pub theme: NordTheme,
    pub should_quit: bool,
    pub status_message: String,
    backend: Arc<dyn SerialBackend>,
    view: PageView,
}

impl App {
    pub fn new(config: AppConfig, backend: Arc<dyn SerialBackend>, url: &str) -> Result<Self> {
        let view = Self::attach(&config, &backend, url)?;
        Ok(Self {
            config,
            theme: NordTheme::default(),
            should_quit: false,
            status_message: String::new(),
            backend,
            view,
        })
    }

    fn attach(config: &AppConfig, backend: &Arc<dyn SerialBackend>, url: &str) -> Result<PageView> {
        let mut runner = FormRunner::new(Arc::clone(backend));
        let (assistant, effects) = FormAssistant::attach(TerminalPage::open(url), config.form.clone())?;
        runner.dispatch(effects);
        Ok(PageView { assistant, runner })
    }

    /// Replace the current page. Work still in flight for the old page is
    /// dropped with its runner.
    pub fn open(&mut self, url: &str) -> Result<()> {
        info!(url, "opening page");
        self.view = Self::attach(&self.config, &self.backend, url)?;
        self.status_message = format!("Opened {url}");
        Ok(())
    }

    pub fn go_home(&mut self) {
        if let Err(e) = self.open(ENTRY_PATH) {
            self.status_message = format!("Failed to open {ENTRY_PATH}: {e}");
        }
    }

    pub fn page(&self) -> &TerminalPage {
        self.view.assistant.page()
    }

    pub fn page_mut(&mut self) -> &mut TerminalPage {
        self.view.assistant.page_mut()
    }

    pub fn assistant(&self) -> &FormAssistant<TerminalPage> {
        &self.view.assistant
    }

    pub fn suggestions(&self) -> &SuggestionList {
        self.view.assistant.suggestions()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// True while a request or timer for the current page is outstanding.
    pub fn is_busy(&self) -> bool {
        !self.view.runner.is_idle()
    }

    pub fn send(&mut self, event: FormEvent) {
        let effects = self.view.assistant.handle(event);
        self.view.runner.dispatch(effects);
        self.follow_navigation();
    }

    /// Apply every completion that has arrived, then follow a redirect if
    /// the page asked for one.
    pub fn tick(&mut self) {
        let PageView { assistant, runner } = &mut self.view;
        runner.pump(assistant);
        self.follow_navigation();
    }

    fn follow_navigation(&mut self) {
        if let Some(url) = self.page_mut().take_navigation()
            && let Err(e) = self.open(&url)
        {
            self.status_message = format!("Failed to open {url}: {e}");
        }
    }
}
