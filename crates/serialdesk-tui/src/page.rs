use serialdesk_core::page::{bound_field_ids, ENTRY_PATH, ISSUE_PATH, WARRANTY_PATH};
use serialdesk_core::{Page, PageUrl};

/// The page the terminal renders.
///
/// The entry page carries the error dialog and no form fields. The warranty
/// and issue pages carry every pre-fill field and no dialog, so not-found
/// messages there surface as an alert overlay instead.
#[derive(Debug, Clone)]
pub struct TerminalPage {
    url: PageUrl,
    input: String,
    /// Cursor position in chars.
    cursor: usize,
    input_focused: bool,
    loading: bool,
    fields: Vec<(&'static str, String)>,
    has_dialog: bool,
    dialog: Option<String>,
    alert: Option<String>,
    pending_navigation: Option<String>,
}

impl TerminalPage {
    pub fn open(url: &str) -> Self {
        let url = PageUrl::parse(url);
        let is_entry = url.path == ENTRY_PATH;
        let fields = if is_entry {
            Vec::new()
        } else {
            bound_field_ids().map(|id| (id, String::new())).collect()
        };

        Self {
            url,
            input: String::new(),
            cursor: 0,
            input_focused: true,
            loading: false,
            fields,
            has_dialog: is_entry,
            dialog: None,
            alert: None,
            pending_navigation: None,
        }
    }

    pub fn url(&self) -> &PageUrl {
        &self.url
    }

    pub fn title(&self) -> &str {
        match self.url.path.as_str() {
            ENTRY_PATH => "Serial lookup",
            WARRANTY_PATH => "Warranty registration",
            ISSUE_PATH => "Service request",
            other => other,
        }
    }

    // ─── Input editing ─────────────────────────────────────

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn focus_input(&mut self) {
        self.input_focused = true;
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the char before the cursor. Returns false when there is none.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.input.remove(at);
        true
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map_or(self.input.len(), |(i, _)| i)
    }

    // ─── Rendered state ────────────────────────────────────

    pub fn loading_visible(&self) -> bool {
        self.loading
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn dialog_message(&self) -> Option<&str> {
        self.dialog.as_deref()
    }

    pub fn alert_message(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn has_overlay(&self) -> bool {
        self.dialog.is_some() || self.alert.is_some()
    }

    /// Close the dialog or alert. Returns false when neither was showing.
    pub fn dismiss_overlay(&mut self) -> bool {
        self.dialog.take().is_some() | self.alert.take().is_some()
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.pending_navigation.take()
    }
}

impl Page for TerminalPage {
    fn path(&self) -> &str {
        &self.url.path
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.url.query_param(name).map(str::to_string)
    }

    fn has_input(&self) -> bool {
        true
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input = value.to_string();
        self.cursor = self.input.chars().count();
    }

    fn blur_input(&mut self) {
        self.input_focused = false;
    }

    fn has_loading_indicator(&self) -> bool {
        true
    }

    fn set_loading_visible(&mut self, visible: bool) {
        self.loading = visible;
    }

    fn has_field(&self, id: &str) -> bool {
        self.fields.iter().any(|(f, _)| *f == id)
    }

    fn set_field(&mut self, id: &str, value: &str) {
        if let Some((_, v)) = self.fields.iter_mut().find(|(f, _)| *f == id) {
            *v = value.to_string();
        }
    }

    fn has_error_dialog(&self) -> bool {
        self.has_dialog
    }

    fn show_error_dialog(&mut self, message: &str) {
        if self.has_dialog {
            self.dialog = Some(message.to_string());
        }
    }

    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    fn navigate(&mut self, url: &str) {
        self.pending_navigation = Some(url.to_string());
    }
}
