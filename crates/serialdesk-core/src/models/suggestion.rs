/// Dropdown of serial numbers shown under the input.
///
/// Rows survive a hide; they are only replaced by the next successful fetch.
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    rows: Vec<String>,
    visible: bool,
    hovered: Option<usize>,
}

impl SuggestionList {
    /// An empty, hidden list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with a fresh result. Empty results hide the list.
    pub fn replace(&mut self, rows: Vec<String>) {
        self.rows = rows;
        self.visible = !self.rows.is_empty();
        self.hovered = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.hovered = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn hover(&mut self, index: usize) {
        if self.visible && index < self.rows.len() {
            self.hovered = Some(index);
        }
    }

    pub fn unhover(&mut self) {
        self.hovered = None;
    }

    /// Row a one-step highlight move lands on, wrapping at either end.
    /// `None` while the list is hidden or empty.
    pub fn step_target(&self, forward: bool) -> Option<usize> {
        if !self.visible || self.rows.is_empty() {
            return None;
        }
        let len = self.rows.len();
        Some(match (self.hovered, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        })
    }
}
