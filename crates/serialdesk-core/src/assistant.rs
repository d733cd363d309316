//! FormAssistant: serial-number autocomplete and lookup for one page view.
//!
//! The assistant is a synchronous state machine. It consumes [`FormEvent`]s,
//! mutates the page it owns, and hands back [`Effect`]s (network calls and
//! timers) for a driver to execute. Completions come back as events tagged
//! with the [`Ticket`] they were issued under; only the latest ticket of each
//! kind is applied, so an overtaken response never reaches the page.
//!
//! ```ignore
//! let (mut assistant, effects) = FormAssistant::attach(page, config.form)?;
//! runner.dispatch(effects);
//!
//! // Typing.
//! assistant.page_mut().set_input_value("AB12");
//! runner.dispatch(assistant.handle(FormEvent::Input));
//!
//! // Completions.
//! while let Some(event) = runner.next().await {
//!     runner.dispatch(assistant.handle(event));
//! }
//! ```

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::FormConfig;
use crate::error::{Result, SerialDeskError};
use crate::models::{DetailsResponse, SerialDetails, SuggestionList};
use crate::page::{self, Page, FIELD_BINDINGS, ISSUE_PATH, SERIAL_PARAM, WARRANTY_PATH};

/// Monotonically increasing request number, one counter per request kind.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The input text changed.
    Input,
    /// The lookup button was clicked.
    Submit,
    /// Enter was pressed in the input.
    EnterKey,
    /// The input lost focus.
    Blur,
    /// Delayed hide scheduled by [`FormEvent::Blur`].
    HideSuggestions,
    RowHover(usize),
    RowUnhover,
    RowClick(usize),
    /// Lookup of a given serial, used by the URL-driven re-fire.
    Lookup(String),
    SuggestionsLoaded {
        ticket: Ticket,
        result: std::result::Result<Vec<String>, String>,
    },
    DetailsLoaded {
        ticket: Ticket,
        serial: String,
        result: std::result::Result<DetailsResponse, String>,
    },
}

/// Work the driver performs on the assistant's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchSuggestions { ticket: Ticket, query: String },
    FetchDetails { ticket: Ticket, serial: String },
    Schedule { delay: Duration, event: FormEvent },
}

/// How the most recent lookup ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Redirected { serial: String, url: String },
    Prefilled { serial: String, details: SerialDetails },
    NotFound { serial: String, message: String },
    Failed { serial: String, reason: String },
}

pub struct FormAssistant<P: Page> {
    page: P,
    config: FormConfig,
    suggestions: SuggestionList,
    suggestion_ticket: Ticket,
    details_ticket: Ticket,
    lookup_pending: bool,
    outcome: Option<LookupOutcome>,
    last_diagnostic: Option<String>,
    navigated: bool,
}

impl<P: Page> FormAssistant<P> {
    /// Wire the assistant onto a page.
    ///
    /// Fails when the page has no serial input. A non-empty `serial_no`
    /// query parameter fills the input and starts a lookup at once, plus a
    /// second one after `refire_delay`.
    pub fn attach(mut page: P, config: FormConfig) -> Result<(Self, Vec<Effect>)> {
        if !page.has_input() {
            error!("serial number input field not found");
            return Err(SerialDeskError::MissingInput);
        }

        let mut effects = Vec::new();
        let url_serial = page.query_param(SERIAL_PARAM).filter(|s| !s.is_empty());
        if let Some(serial) = &url_serial {
            info!(serial = %serial, "serial number found in URL");
            page.set_input_value(serial);
        }

        let mut assistant = Self {
            page,
            config,
            suggestions: SuggestionList::new(),
            suggestion_ticket: 0,
            details_ticket: 0,
            lookup_pending: false,
            outcome: None,
            last_diagnostic: None,
            navigated: false,
        };

        if let Some(serial) = url_serial {
            effects.extend(assistant.fetch_and_process(&serial));
            effects.push(Effect::Schedule {
                delay: assistant.config.refire_delay(),
                event: FormEvent::Lookup(serial),
            });
        }

        Ok((assistant, effects))
    }

    /// Feed one event through the state machine.
    ///
    /// Once the page has navigated away every further event is ignored.
    pub fn handle(&mut self, event: FormEvent) -> Vec<Effect> {
        if self.navigated {
            debug!(?event, "page already left, ignoring event");
            return Vec::new();
        }

        match event {
            FormEvent::Input => {
                let query = self.page.input_value().trim().to_string();
                self.fetch_suggestions(&query)
            }
            FormEvent::Submit => self.submit_input(),
            FormEvent::EnterKey => {
                let mut effects = self.submit_input();
                self.page.blur_input();
                self.hide_suggestions();
                effects.extend(self.on_blur());
                effects
            }
            FormEvent::Blur => self.on_blur(),
            FormEvent::HideSuggestions => {
                self.hide_suggestions();
                Vec::new()
            }
            FormEvent::RowHover(index) => {
                self.suggestions.hover(index);
                Vec::new()
            }
            FormEvent::RowUnhover => {
                self.suggestions.unhover();
                Vec::new()
            }
            FormEvent::RowClick(index) => {
                self.select_row(index);
                Vec::new()
            }
            FormEvent::Lookup(serial) => self.fetch_and_process(&serial),
            FormEvent::SuggestionsLoaded { ticket, result } => {
                self.apply_suggestions(ticket, result);
                Vec::new()
            }
            FormEvent::DetailsLoaded {
                ticket,
                serial,
                result,
            } => {
                self.apply_details(ticket, &serial, result);
                Vec::new()
            }
        }
    }

    // ─── Accessors ─────────────────────────────────────────

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    /// True while a details request is in flight.
    pub fn is_lookup_pending(&self) -> bool {
        self.lookup_pending
    }

    pub fn outcome(&self) -> Option<&LookupOutcome> {
        self.outcome.as_ref()
    }

    pub fn last_diagnostic(&self) -> Option<&str> {
        self.last_diagnostic.as_deref()
    }

    pub fn has_navigated(&self) -> bool {
        self.navigated
    }

    // ─── Suggestions ───────────────────────────────────────

    fn fetch_suggestions(&mut self, query: &str) -> Vec<Effect> {
        let ticket = self.next_suggestion_ticket();
        if query.chars().count() < self.config.min_query_chars {
            self.suggestions.hide();
            return Vec::new();
        }

        vec![Effect::FetchSuggestions {
            ticket,
            query: query.to_string(),
        }]
    }

    fn apply_suggestions(&mut self, ticket: Ticket, result: std::result::Result<Vec<String>, String>) {
        if ticket != self.suggestion_ticket {
            debug!(ticket, latest = self.suggestion_ticket, "discarding stale suggestions");
            return;
        }

        match result {
            Ok(rows) => {
                debug!(count = rows.len(), "suggestions loaded");
                self.suggestions.replace(rows);
            }
            Err(e) => self.diagnose(format!("error fetching serials: {e}")),
        }
    }

    fn select_row(&mut self, index: usize) {
        if !self.suggestions.is_visible() {
            return;
        }
        if let Some(serial) = self.suggestions.get(index).map(str::to_string) {
            // Selection only fills the input; the user submits explicitly.
            self.page.set_input_value(&serial);
            self.hide_suggestions();
        }
    }

    /// Hide the list and retire any suggestion request still in flight.
    fn hide_suggestions(&mut self) {
        self.next_suggestion_ticket();
        self.suggestions.hide();
    }

    fn on_blur(&self) -> Vec<Effect> {
        vec![Effect::Schedule {
            delay: self.config.blur_hide_delay(),
            event: FormEvent::HideSuggestions,
        }]
    }

    // ─── Lookup ────────────────────────────────────────────

    fn submit_input(&mut self) -> Vec<Effect> {
        let serial = self.page.input_value().trim().to_string();
        if serial.is_empty() {
            return Vec::new();
        }
        self.fetch_and_process(&serial)
    }

    fn fetch_and_process(&mut self, serial: &str) -> Vec<Effect> {
        if serial.is_empty() {
            self.diagnose("serial number is empty".to_string());
            return Vec::new();
        }

        self.set_loading(true);
        self.lookup_pending = true;
        self.details_ticket += 1;
        info!(serial, ticket = self.details_ticket, "looking up serial details");

        vec![Effect::FetchDetails {
            ticket: self.details_ticket,
            serial: serial.to_string(),
        }]
    }

    fn apply_details(
        &mut self,
        ticket: Ticket,
        serial: &str,
        result: std::result::Result<DetailsResponse, String>,
    ) {
        if ticket != self.details_ticket {
            debug!(ticket, latest = self.details_ticket, "discarding stale serial details");
            return;
        }
        self.lookup_pending = false;

        let details = match result {
            Ok(DetailsResponse::Found(details)) if details.has_customer() => details,
            Ok(DetailsResponse::Found(_)) => {
                warn!(serial, "serial details carry no customer");
                self.not_found(serial);
                return;
            }
            Ok(DetailsResponse::NotFound { message }) => {
                error!(serial, error = %message, "error fetching serial details");
                self.not_found(serial);
                return;
            }
            Err(reason) => {
                self.set_loading(false);
                self.diagnose(format!("fetch error: {reason}"));
                self.outcome = Some(LookupOutcome::Failed {
                    serial: serial.to_string(),
                    reason,
                });
                return;
            }
        };

        if self.page.is_entry_page() {
            self.redirect(serial, &details);
        } else {
            self.prefill(serial, details);
        }
    }

    fn redirect(&mut self, serial: &str, details: &SerialDetails) {
        let target = if details.is_under_warranty() {
            info!(serial, "redirecting to warranty page");
            WARRANTY_PATH
        } else {
            info!(serial, "redirecting to issue page");
            ISSUE_PATH
        };

        let url = page::with_query(target, SERIAL_PARAM, serial);
        self.page.navigate(&url);
        self.navigated = true;
        self.outcome = Some(LookupOutcome::Redirected {
            serial: serial.to_string(),
            url,
        });
    }

    fn prefill(&mut self, serial: &str, details: SerialDetails) {
        self.page.set_input_value(serial);
        for binding in FIELD_BINDINGS {
            if self.page.has_field(binding.element_id) {
                self.page
                    .set_field(binding.element_id, binding.resolve(&details));
            }
        }
        self.set_loading(false);
        info!(serial, "pre-filled form fields");
        self.outcome = Some(LookupOutcome::Prefilled {
            serial: serial.to_string(),
            details,
        });
    }

    fn not_found(&mut self, serial: &str) {
        self.set_loading(false);
        let message = self.config.not_found_message();
        if self.page.has_error_dialog() {
            self.page.show_error_dialog(&message);
        } else {
            self.page.alert(&message);
        }
        self.outcome = Some(LookupOutcome::NotFound {
            serial: serial.to_string(),
            message,
        });
    }

    // ─── Helpers ───────────────────────────────────────────

    fn set_loading(&mut self, visible: bool) {
        if self.page.has_loading_indicator() {
            self.page.set_loading_visible(visible);
        }
    }

    fn next_suggestion_ticket(&mut self) -> Ticket {
        self.suggestion_ticket += 1;
        self.suggestion_ticket
    }

    fn diagnose(&mut self, message: String) {
        error!("{message}");
        self.last_diagnostic = Some(message);
    }
}
