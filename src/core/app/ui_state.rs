use std::time::{Duration, Instant};

use ratatui::style::{Modifier, Style};
use tui_textarea::TextArea;

use crate::core::profile::CREDIT_PACKS;
use crate::ui::theme::Theme;

/// How long a status line stays up before it is cleared.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

/// Which UI pane currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiFocus {
    /// Input bar has focus (for typing).
    Input,
    /// Session list has focus (for navigation).
    Sidebar,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub input: TextArea<'static>,
    pub login_input: TextArea<'static>,
    pub focus: UiFocus,
    pub sidebar_open: bool,
    pub sidebar_selected: usize,
    pub pricing_selected: usize,
    /// Rows scrolled up from the bottom of the transcript.
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub theme: Theme,
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    pub exit_requested: bool,
}

impl UiState {
    pub fn new(theme: Theme) -> Self {
        Self {
            input: single_line_field(&theme),
            login_input: single_line_field(&theme),
            focus: UiFocus::Input,
            sidebar_open: true,
            sidebar_selected: 0,
            pricing_selected: 0,
            scroll_offset: 0,
            auto_scroll: true,
            theme,
            status: None,
            status_set_at: None,
            exit_requested: false,
        }
    }

    pub fn input_text(&self) -> String {
        field_text(&self.input)
    }

    pub fn login_text(&self) -> String {
        field_text(&self.login_input)
    }

    pub fn clear_input(&mut self) {
        self.input = single_line_field(&self.theme);
    }

    pub fn clear_login_input(&mut self) {
        self.login_input = single_line_field(&self.theme);
    }

    pub fn is_input_focused(&self) -> bool {
        self.focus == UiFocus::Input
    }

    pub fn is_sidebar_focused(&self) -> bool {
        self.focus == UiFocus::Sidebar
    }

    pub fn focus_input(&mut self) {
        self.focus = UiFocus::Input;
    }

    pub fn focus_sidebar(&mut self) {
        self.sidebar_open = true;
        self.focus = UiFocus::Sidebar;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        if !self.sidebar_open {
            self.focus = UiFocus::Input;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_set_at = None;
    }

    /// Drop the status line once it has been visible long enough. Returns
    /// true when something was cleared.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        match self.status_set_at {
            Some(set_at) if now.duration_since(set_at) >= STATUS_TIMEOUT => {
                self.clear_status();
                true
            }
            _ => false,
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = true;
    }

    pub fn scroll_up(&mut self, lines: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max_offset);
        self.auto_scroll = self.scroll_offset == 0;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.auto_scroll = self.scroll_offset == 0;
    }

    pub fn move_sidebar_selection(&mut self, delta: isize, session_count: usize) {
        if session_count == 0 {
            self.sidebar_selected = 0;
            return;
        }
        let last = session_count - 1;
        let current = self.sidebar_selected.min(last) as isize;
        self.sidebar_selected = (current + delta).clamp(0, last as isize) as usize;
    }

    pub fn move_pricing_selection(&mut self, delta: isize) {
        let last = CREDIT_PACKS.len() as isize - 1;
        self.pricing_selected =
            (self.pricing_selected as isize + delta).clamp(0, last) as usize;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        configure_textarea(&mut self.input, &self.theme);
        configure_textarea(&mut self.login_input, &self.theme);
    }
}

fn single_line_field(theme: &Theme) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    configure_textarea(&mut textarea, theme);
    textarea
}

fn configure_textarea(textarea: &mut TextArea<'static>, theme: &Theme) {
    textarea.set_style(theme.input_text_style.bg(theme.background_color));
    textarea.set_cursor_style(theme.input_text_style.add_modifier(Modifier::REVERSED));
    textarea.set_cursor_line_style(Style::default());
}

/// Fields hold one line; stray rows are joined with spaces.
fn field_text(textarea: &TextArea<'static>) -> String {
    textarea.lines().join(" ")
}
