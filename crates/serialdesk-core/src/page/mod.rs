//! The page surface a [`FormAssistant`](crate::assistant::FormAssistant) drives.
//!
//! A page owns the input, the optional loading indicator, the optional
//! error dialog and whatever named form fields exist. The assistant only
//! touches elements the page reports as present.

pub mod fields;
pub mod memory;
pub mod url;

pub use fields::{bound_field_ids, FieldBinding, DEFAULT_AMC_TYPE, FIELD_BINDINGS};
pub use memory::MemoryPage;
pub use url::{with_query, PageUrl};

/// Path of the page that routes a bare lookup to the warranty or issue flow.
pub const ENTRY_PATH: &str = "/";
pub const WARRANTY_PATH: &str = "/warranty";
pub const ISSUE_PATH: &str = "/issue";

/// Query parameter carrying the serial number between pages.
pub const SERIAL_PARAM: &str = "serial_no";

pub trait Page {
    /// Path of the current page, without query string.
    fn path(&self) -> &str;
    fn query_param(&self, name: &str) -> Option<String>;

    fn has_input(&self) -> bool;
    fn input_value(&self) -> String;
    fn set_input_value(&mut self, value: &str);
    fn blur_input(&mut self);

    fn has_loading_indicator(&self) -> bool;
    fn set_loading_visible(&mut self, visible: bool);

    fn has_field(&self, id: &str) -> bool;
    fn set_field(&mut self, id: &str, value: &str);

    fn has_error_dialog(&self) -> bool;
    fn show_error_dialog(&mut self, message: &str);
    /// Blocking fallback used when the page has no dialog element.
    fn alert(&mut self, message: &str);

    fn navigate(&mut self, url: &str);

    fn is_entry_page(&self) -> bool {
        self.path() == ENTRY_PATH
    }
}
