use std::sync::Arc;

use crate::core::app::{App, AppActionContext, UiState};
use crate::core::chat_stream::test_support::ScriptedClient;
use crate::core::controller::ConversationController;
use crate::core::profile::{MemoryProfileStore, UserProfile};
use crate::ui::theme::Theme;

pub const TEST_CONTEXT: AppActionContext = AppActionContext {
    term_width: 100,
    term_height: 30,
};

/// App with demo sessions, nobody logged in, backed by `client`.
pub fn create_test_app_with(client: ScriptedClient, store: MemoryProfileStore) -> App {
    let conversation = ConversationController::new(Arc::new(client), Box::new(store));
    App::new(conversation, UiState::new(Theme::dark_default()))
}

pub fn create_test_app() -> App {
    create_test_app_with(ScriptedClient::default(), MemoryProfileStore::new())
}

/// App whose user "Ana" already holds `credits`.
pub fn create_logged_in_app(credits: i64) -> App {
    let profile = UserProfile {
        credits,
        ..UserProfile::new_signup("Ana")
    };
    create_test_app_with(
        ScriptedClient::default(),
        MemoryProfileStore::with_profile(profile),
    )
}
