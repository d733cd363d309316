use std::collections::BTreeMap;

use super::{bound_field_ids, Page, PageUrl};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ErrorDialog {
    visible: bool,
    message: String,
}

/// In-memory page that records every side effect.
///
/// Used for headless lookups and tests. Elements exist only when added
/// through the builder methods, except the serial input which is present
/// unless [`without_input`](Self::without_input) is called.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    url: PageUrl,
    input: Option<String>,
    input_focused: bool,
    loading: Option<bool>,
    fields: BTreeMap<String, String>,
    dialog: Option<ErrorDialog>,
    alerts: Vec<String>,
    navigations: Vec<String>,
}

impl MemoryPage {
    pub fn new(url: &str) -> Self {
        Self {
            url: PageUrl::parse(url),
            input: Some(String::new()),
            input_focused: true,
            loading: None,
            fields: BTreeMap::new(),
            dialog: None,
            alerts: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// A page with the loading indicator, the error dialog and every
    /// pre-fill field present.
    pub fn full(url: &str) -> Self {
        Self::new(url)
            .with_loading_indicator()
            .with_error_dialog()
            .with_fields(bound_field_ids())
    }

    pub fn without_input(mut self) -> Self {
        self.input = None;
        self
    }

    pub fn with_loading_indicator(mut self) -> Self {
        self.loading = Some(false);
        self
    }

    pub fn with_error_dialog(mut self) -> Self {
        self.dialog = Some(ErrorDialog::default());
        self
    }

    pub fn with_fields<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.fields.entry(id.into()).or_default();
        }
        self
    }

    // ─── Inspection ────────────────────────────────────────

    pub fn url(&self) -> &PageUrl {
        &self.url
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn loading_visible(&self) -> bool {
        self.loading.unwrap_or(false)
    }

    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Message of the dialog, when it is showing.
    pub fn dialog_message(&self) -> Option<&str> {
        self.dialog
            .as_ref()
            .filter(|d| d.visible)
            .map(|d| d.message.as_str())
    }

    pub fn dismiss_dialog(&mut self) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.visible = false;
        }
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn last_navigation(&self) -> Option<&str> {
        self.navigations.last().map(String::as_str)
    }
}

impl Page for MemoryPage {
    fn path(&self) -> &str {
        &self.url.path
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.url.query_param(name).map(str::to_string)
    }

    fn has_input(&self) -> bool {
        self.input.is_some()
    }

    fn input_value(&self) -> String {
        self.input.clone().unwrap_or_default()
    }

    fn set_input_value(&mut self, value: &str) {
        if let Some(input) = self.input.as_mut() {
            *input = value.to_string();
        }
    }

    fn blur_input(&mut self) {
        self.input_focused = false;
    }

    fn has_loading_indicator(&self) -> bool {
        self.loading.is_some()
    }

    fn set_loading_visible(&mut self, visible: bool) {
        if let Some(loading) = self.loading.as_mut() {
            *loading = visible;
        }
    }

    fn has_field(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    fn set_field(&mut self, id: &str, value: &str) {
        if let Some(field) = self.fields.get_mut(id) {
            *field = value.to_string();
        }
    }

    fn has_error_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    fn show_error_dialog(&mut self, message: &str) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.message = message.to_string();
            dialog.visible = true;
        }
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}
