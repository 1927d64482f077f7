use std::sync::Arc;

use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::auth::AuthManager;
use crate::core::config::data::Config;
use crate::core::controller::ConversationController;
use crate::core::gemini::GeminiClient;
use crate::core::model::ModelType;
use crate::core::profile::{FileProfileStore, MemoryProfileStore, ProfileStore};
use crate::ui::layout::{max_scroll, Layout, LayoutEngine, ScreenAreas};

pub mod actions;
pub mod ui_state;

#[cfg(test)]
mod tests;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand,
};
pub use ui_state::{UiFocus, UiState};

/// Build a conversation wired to Gemini and the on-disk profile.
///
/// A missing API key is not fatal: sends fail with the usual error reply
/// until one is configured. An unusable data directory falls back to an
/// in-memory profile.
pub fn new_conversation(config: &Config, model: Option<ModelType>) -> ConversationController {
    let api_key = match AuthManager::new().resolve_api_key() {
        Ok(Some((key, source))) => {
            info!(%source, "using API key");
            Some(key)
        }
        Ok(None) => {
            warn!("no API key found; replies will fail until one is configured");
            None
        }
        Err(e) => {
            warn!(error = %e, "could not read API key from keyring");
            None
        }
    };
    let client = GeminiClient::new(api_key, config.api_base_url.clone());

    let store: Box<dyn ProfileStore> = match FileProfileStore::at_default_location() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "profile will not be saved this session");
            Box::new(MemoryProfileStore::new())
        }
    };

    let mut conversation = ConversationController::new(Arc::new(client), store);
    conversation.set_model(model.unwrap_or_else(|| config.model_or_default()));
    conversation
}

/// Everything the interactive chat owns: the conversation and the view
/// state around it.
pub struct App {
    pub conversation: ConversationController,
    pub ui: UiState,
}

impl App {
    pub fn new(conversation: ConversationController, ui: UiState) -> Self {
        Self { conversation, ui }
    }

    pub fn is_logged_in(&self) -> bool {
        self.conversation.user().is_some()
    }

    pub fn screen_areas(&self, ctx: AppActionContext) -> ScreenAreas {
        ScreenAreas::compute(
            Rect::new(0, 0, ctx.term_width, ctx.term_height),
            self.ui.sidebar_open,
        )
    }

    pub fn transcript_layout(&self, width: usize) -> Layout {
        LayoutEngine::layout_messages(self.conversation.messages(), &self.ui.theme, width)
    }

    /// Largest scroll offset for the current terminal size.
    pub fn max_scroll_offset(&self, ctx: AppActionContext) -> u16 {
        let areas = self.screen_areas(ctx);
        let layout = self.transcript_layout(areas.transcript_text_width());
        max_scroll(layout.lines.len(), areas.transcript.height)
    }

    /// Keep the sidebar cursor on the open session.
    pub fn sync_sidebar_selection(&mut self) {
        if let Some(position) = self
            .conversation
            .active_session_id()
            .and_then(|id| self.conversation.sessions().position(id))
        {
            self.ui.sidebar_selected = position;
        }
    }
}
