use ratatui::style::Color;

/// Nord palette, trimmed to the shades the form screens use.
pub struct NordTheme {
    // Polar Night
    pub nord0: Color, // panels, status bar
    pub nord1: Color, // highlighted row
    pub nord2: Color, // borders
    pub nord3: Color, // hints, inactive labels

    // Snow Storm
    pub nord4: Color, // body text
    pub nord6: Color, // cursor

    // Frost
    pub nord7: Color,  // page URL
    pub nord8: Color,  // focused input
    pub nord10: Color, // hovered suggestion

    // Aurora
    pub nord11: Color, // dialog, alert
    pub nord13: Color, // loading
    pub nord14: Color, // filled fields
}

impl Default for NordTheme {
    fn default() -> Self {
        Self {
            nord0: Color::Rgb(46, 52, 64),
            nord1: Color::Rgb(59, 66, 82),
            nord2: Color::Rgb(76, 86, 106),
            nord3: Color::Rgb(97, 110, 136),
            nord4: Color::Rgb(216, 222, 233),
            nord6: Color::Rgb(236, 239, 244),
            nord7: Color::Rgb(143, 188, 187),
            nord8: Color::Rgb(136, 192, 208),
            nord10: Color::Rgb(94, 129, 172),
            nord11: Color::Rgb(191, 97, 106),
            nord13: Color::Rgb(235, 203, 139),
            nord14: Color::Rgb(163, 190, 140),
        }
    }
}

impl NordTheme {
    pub fn bg(&self) -> Color {
        self.nord0
    }
    pub fn bg_secondary(&self) -> Color {
        self.nord1
    }
    pub fn border(&self) -> Color {
        self.nord2
    }
    pub fn muted(&self) -> Color {
        self.nord3
    }
    pub fn fg(&self) -> Color {
        self.nord4
    }
    pub fn fg_white(&self) -> Color {
        self.nord6
    }

    pub fn path_color(&self) -> Color {
        self.nord7
    }
    pub fn active_panel(&self) -> Color {
        self.nord8
    }
    pub fn cursor_bg(&self) -> Color {
        self.nord10
    }

    pub fn danger(&self) -> Color {
        self.nord11
    }
    pub fn warning(&self) -> Color {
        self.nord13
    }
    pub fn success(&self) -> Color {
        self.nord14
    }
}
