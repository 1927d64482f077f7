//! Key handling for the chat screen.
//!
//! Editing keys change the focused text field in place; everything else is
//! turned into [`AppAction`]s for the event loop to dispatch.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{Input as TAInput, TextArea};

use crate::core::app::{App, AppAction, AppActionContext};

/// Resolve one key press against the current screen.
pub fn handle_key(app: &mut App, key: KeyEvent, ctx: AppActionContext) -> Vec<AppAction> {
    if is_ctrl(&key, 'c') {
        return vec![AppAction::Quit];
    }

    if !app.is_logged_in() {
        return handle_login_key(app, key);
    }

    if app.conversation.show_pricing() {
        return handle_pricing_key(key);
    }

    if let Some(actions) = handle_global_key(app, &key, ctx) {
        return actions;
    }

    if app.ui.is_sidebar_focused() {
        return handle_sidebar_key(key);
    }

    handle_input_key(app, key)
}

/// Insert pasted text into whichever field has focus.
pub fn handle_paste(app: &mut App, text: &str) {
    let sanitized = sanitize_pasted_text(text);
    if sanitized.is_empty() {
        return;
    }
    if !app.is_logged_in() {
        app.ui.login_input.insert_str(sanitized);
    } else if !app.conversation.show_pricing() {
        app.ui.focus_input();
        app.ui.input.insert_str(sanitized);
    }
}

/// Single-line fields: newlines and tabs become spaces, other control
/// characters are dropped.
pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter_map(|ch| match ch {
            '\n' | '\r' | '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

fn handle_login_key(app: &mut App, key: KeyEvent) -> Vec<AppAction> {
    match key.code {
        KeyCode::Enter => {
            let name = app.ui.login_text();
            vec![AppAction::SubmitLogin { name }]
        }
        KeyCode::Esc => vec![AppAction::Quit],
        _ => {
            forward_to_textarea(&mut app.ui.login_input, key);
            Vec::new()
        }
    }
}

fn handle_pricing_key(key: KeyEvent) -> Vec<AppAction> {
    match key.code {
        KeyCode::Esc => vec![AppAction::ClosePricing],
        KeyCode::Up | KeyCode::Char('k') => vec![AppAction::PricingMoveUp],
        KeyCode::Down | KeyCode::Char('j') => vec![AppAction::PricingMoveDown],
        KeyCode::Enter => vec![AppAction::PurchaseSelectedPack],
        _ => Vec::new(),
    }
}

/// Bindings that work regardless of focus.
fn handle_global_key(app: &App, key: &KeyEvent, ctx: AppActionContext) -> Option<Vec<AppAction>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let action = match key.code {
            KeyCode::Char('n') => AppAction::NewChat,
            KeyCode::Char('t') => AppAction::ToggleTheme,
            KeyCode::Char('p') => AppAction::OpenPricing,
            KeyCode::Char('x') => AppAction::Logout,
            KeyCode::Char('b') => AppAction::ToggleSidebar,
            KeyCode::Char('s') => {
                if app.ui.is_sidebar_focused() {
                    AppAction::FocusInput
                } else {
                    AppAction::FocusSidebar
                }
            }
            _ => return None,
        };
        return Some(vec![action]);
    }

    let page = app.screen_areas(ctx).transcript.height.max(1);
    match key.code {
        KeyCode::PageUp => Some(vec![AppAction::ScrollUp { lines: page }]),
        KeyCode::PageDown => Some(vec![AppAction::ScrollDown { lines: page }]),
        KeyCode::Tab => Some(vec![AppAction::CycleModel]),
        KeyCode::Esc if app.conversation.is_loading() => Some(vec![AppAction::CancelStreaming]),
        _ => None,
    }
}

fn handle_sidebar_key(key: KeyEvent) -> Vec<AppAction> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => vec![AppAction::SidebarMoveUp],
        KeyCode::Down | KeyCode::Char('j') => vec![AppAction::SidebarMoveDown],
        KeyCode::Enter => vec![AppAction::SidebarActivate],
        KeyCode::Esc | KeyCode::Char('i') => vec![AppAction::FocusInput],
        _ => Vec::new(),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) -> Vec<AppAction> {
    match key.code {
        KeyCode::Enter => {
            let message = app.ui.input_text();
            vec![AppAction::SubmitMessage { message }]
        }
        KeyCode::Up => vec![AppAction::ScrollUp { lines: 1 }],
        KeyCode::Down => vec![AppAction::ScrollDown { lines: 1 }],
        KeyCode::Esc => Vec::new(),
        _ => {
            forward_to_textarea(&mut app.ui.input, key);
            Vec::new()
        }
    }
}

/// Everything except newline insertion goes to the textarea; the fields are
/// single-line and Enter is handled by the caller.
fn forward_to_textarea(textarea: &mut TextArea<'static>, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if matches!(key.code, KeyCode::Enter) || (ctrl && key.code == KeyCode::Char('m')) {
        return;
    }
    textarea.input(TAInput::from(key));
}
