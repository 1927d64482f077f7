use super::*;
use crate::core::message::ERROR_REPLY;
use crate::core::model::ModelType;
use crate::core::profile::{MemoryProfileStore, CREDIT_PACKS};
use crate::ui::theme::ThemeKind;
use crate::utils::test_utils::{
    create_logged_in_app, create_test_app, create_test_app_with, TEST_CONTEXT,
};

fn apply(app: &mut App, action: AppAction) -> Option<AppCommand> {
    apply_action(app, action, TEST_CONTEXT)
}

fn submit(app: &mut App, text: &str) -> Option<u64> {
    match apply(
        app,
        AppAction::SubmitMessage {
            message: text.to_string(),
        },
    ) {
        Some(AppCommand::SpawnStream(params)) => Some(params.stream_id),
        _ => None,
    }
}

#[test]
fn login_then_submit_spawns_stream_and_clears_input() {
    let mut app = create_test_app();
    apply(
        &mut app,
        AppAction::SubmitLogin {
            name: "  Ana ".to_string(),
        },
    );
    assert_eq!(app.conversation.user().map(|u| u.name.as_str()), Some("Ana"));

    app.ui.input.insert_str("Hi");
    let stream_id = submit(&mut app, "Hi").expect("stream spawned");

    assert!(app.ui.input_text().is_empty());
    assert_eq!(app.conversation.current_stream_id(), Some(stream_id));
    assert_eq!(app.conversation.messages().len(), 2);
}

#[test]
fn blank_login_and_blank_message_are_ignored() {
    let mut app = create_test_app();
    apply(
        &mut app,
        AppAction::SubmitLogin {
            name: "   ".to_string(),
        },
    );
    assert!(!app.is_logged_in());

    let mut app = create_logged_in_app(5);
    assert!(submit(&mut app, "  \n ").is_none());
    assert!(app.conversation.messages().is_empty());
}

#[test]
fn stream_actions_fill_and_finish_the_reply() {
    let mut app = create_logged_in_app(5);
    let stream_id = submit(&mut app, "Hi").expect("stream");

    for piece in ["Hel", "lo"] {
        apply(
            &mut app,
            AppAction::AppendResponseChunk {
                content: piece.to_string(),
                stream_id,
            },
        );
    }
    apply(&mut app, AppAction::StreamCompleted { stream_id });

    let reply = &app.conversation.messages()[1];
    assert_eq!(reply.text, "Hello");
    assert!(!reply.is_streaming);
    assert_eq!(app.ui.sidebar_selected, 0);
    assert_eq!(app.conversation.sessions().list()[0].title, "Hi");
}

#[test]
fn stream_error_shows_fixed_reply() {
    let mut app = create_logged_in_app(5);
    let stream_id = submit(&mut app, "Hi").expect("stream");

    apply(
        &mut app,
        AppAction::StreamErrored {
            message: "API error (500): boom\n".to_string(),
            stream_id,
        },
    );

    assert_eq!(app.conversation.messages()[1].text, ERROR_REPLY);
    assert!(!app.conversation.is_loading());
}

#[test]
fn pro_without_credits_keeps_input_and_opens_pricing() {
    let mut app = create_logged_in_app(0);
    apply(&mut app, AppAction::SelectModel { model: ModelType::Pro });
    app.ui.input.insert_str("Explain X");

    assert!(submit(&mut app, "Explain X").is_none());

    assert!(app.conversation.show_pricing());
    assert!(app.conversation.messages().is_empty());
    assert_eq!(app.ui.input_text(), "Explain X");
    assert!(app.ui.status.as_deref().unwrap_or("").contains("Pro"));
}

#[test]
fn purchasing_selected_pack_credits_and_closes_pricing() {
    let store = MemoryProfileStore::with_profile(crate::core::profile::UserProfile {
        credits: 0,
        ..crate::core::profile::UserProfile::new_signup("Ana")
    });
    let mut app = create_test_app_with(Default::default(), store.clone());
    apply(&mut app, AppAction::OpenPricing);
    apply(&mut app, AppAction::PricingMoveDown);
    apply(&mut app, AppAction::PurchaseSelectedPack);

    assert!(!app.conversation.show_pricing());
    assert_eq!(
        store.snapshot().map(|p| p.credits),
        Some(CREDIT_PACKS[1].credits)
    );
}

#[test]
fn busy_submit_sets_status_without_new_messages() {
    let mut app = create_logged_in_app(5);
    submit(&mut app, "one").expect("stream");

    assert!(submit(&mut app, "two").is_none());
    assert_eq!(app.conversation.messages().len(), 2);
    assert!(app.ui.status.is_some());
}

#[test]
fn fragments_after_new_chat_are_dropped() {
    let mut app = create_logged_in_app(5);
    let stream_id = submit(&mut app, "Hi").expect("stream");

    apply(&mut app, AppAction::NewChat);
    apply(
        &mut app,
        AppAction::AppendResponseChunk {
            content: "late".to_string(),
            stream_id,
        },
    );
    apply(&mut app, AppAction::StreamCompleted { stream_id });

    assert!(app.conversation.messages().is_empty());
    assert!(app.conversation.active_session_id().is_none());
}

#[test]
fn sidebar_activation_opens_highlighted_session() {
    let mut app = create_logged_in_app(5);
    apply(&mut app, AppAction::FocusSidebar);
    apply(&mut app, AppAction::SidebarMoveDown);
    apply(&mut app, AppAction::SidebarActivate);

    assert_eq!(app.conversation.active_session_id(), Some("2"));
    assert_eq!(app.conversation.messages().len(), 2);
    assert!(app.ui.is_input_focused());
}

#[test]
fn cycle_model_toggles_between_fast_and_pro() {
    let mut app = create_logged_in_app(5);
    apply(&mut app, AppAction::CycleModel);
    assert_eq!(app.conversation.selected_model(), ModelType::Pro);
    apply(&mut app, AppAction::CycleModel);
    assert_eq!(app.conversation.selected_model(), ModelType::Fast);
}

#[test]
fn toggle_theme_requests_persistence() {
    let mut app = create_test_app();
    match apply(&mut app, AppAction::ToggleTheme) {
        Some(AppCommand::PersistTheme(kind)) => assert_eq!(kind, ThemeKind::Light),
        _ => panic!("expected theme persistence"),
    }
    assert!(!app.ui.theme.is_dark());
}

#[test]
fn logout_returns_to_login_state() {
    let mut app = create_logged_in_app(5);
    submit(&mut app, "Hi").expect("stream");
    apply(&mut app, AppAction::Logout);

    assert!(!app.is_logged_in());
    assert!(app.conversation.messages().is_empty());
    assert!(!app.conversation.is_loading());
}

#[test]
fn scrolling_is_clamped_to_transcript_height() {
    let mut app = create_logged_in_app(5);
    apply(&mut app, AppAction::ScrollUp { lines: 10 });
    assert_eq!(app.ui.scroll_offset, 0);
    assert!(app.ui.auto_scroll);

    let stream_id = submit(&mut app, &"word ".repeat(400)).expect("stream");
    apply(&mut app, AppAction::StreamCompleted { stream_id });
    apply(&mut app, AppAction::ScrollUp { lines: 5 });
    assert_eq!(app.ui.scroll_offset, 5);
    assert!(!app.ui.auto_scroll);
    apply(&mut app, AppAction::ScrollToBottom);
    assert!(app.ui.auto_scroll);
}

#[test]
fn quit_cancels_stream_and_requests_exit() {
    let mut app = create_logged_in_app(5);
    submit(&mut app, "Hi").expect("stream");
    apply(&mut app, AppAction::Quit);
    assert!(app.ui.exit_requested);
    assert!(!app.conversation.is_loading());
}
