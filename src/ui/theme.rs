use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Dark,
    Light,
}

impl ThemeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeKind::Dark => ThemeKind::Light,
            ThemeKind::Light => ThemeKind::Dark,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: ThemeKind,
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub error_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub streaming_indicator_style: Style,
    pub border_style: Style,
    pub selection_highlight_style: Style,
    pub credits_style: Style,
    pub pro_badge_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_title_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            kind: ThemeKind::Dark,
            background_color: Color::Rgb(0x12, 0x12, 0x16),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default().fg(Color::DarkGray),
            error_text_style: Style::default().fg(Color::LightRed),

            title_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            streaming_indicator_style: Style::default().fg(Color::LightGreen),
            border_style: Style::default().fg(Color::Gray),
            selection_highlight_style: Style::default()
                .bg(Color::Rgb(0x33, 0x33, 0x40))
                .add_modifier(Modifier::BOLD),
            credits_style: Style::default().fg(Color::Yellow),
            pro_badge_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            input_text_style: Style::default().fg(Color::White),
            input_title_style: Style::default().fg(Color::Gray),
        }
    }

    pub fn light() -> Self {
        Theme {
            kind: ThemeKind::Light,
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            system_text_style: Style::default().fg(Color::Gray),
            error_text_style: Style::default().fg(Color::Red),

            title_style: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            streaming_indicator_style: Style::default().fg(Color::Green),
            border_style: Style::default().fg(Color::DarkGray),
            selection_highlight_style: Style::default()
                .bg(Color::Rgb(0xdd, 0xe4, 0xf0))
                .add_modifier(Modifier::BOLD),
            credits_style: Style::default().fg(Color::Rgb(0x9a, 0x67, 0x00)),
            pro_badge_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            input_text_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark_default(),
            ThemeKind::Light => Self::light(),
        }
    }

    /// Unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark_default(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.kind == ThemeKind::Dark
    }

    pub fn toggled(&self) -> Self {
        Self::from_kind(self.kind.toggled())
    }
}

/// Names accepted by `quickgpt set theme`.
pub fn is_known_theme(name: &str) -> bool {
    matches!(name.trim().to_ascii_lowercase().as_str(), "dark" | "light")
}
