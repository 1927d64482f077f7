mod account;
mod navigation;
mod streaming;

use tokio::sync::mpsc;

use super::App;
use crate::core::chat_stream::StreamParams;
use crate::core::model::ModelType;
use crate::ui::theme::ThemeKind;

pub enum AppAction {
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamErrored {
        message: String,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    CancelStreaming,
    SubmitMessage {
        message: String,
    },
    SubmitLogin {
        name: String,
    },
    Logout,
    OpenPricing,
    ClosePricing,
    PricingMoveUp,
    PricingMoveDown,
    PurchaseSelectedPack,
    PurchaseCredits {
        amount: i64,
    },
    NewChat,
    SelectSession {
        id: String,
    },
    SidebarMoveUp,
    SidebarMoveDown,
    SidebarActivate,
    ToggleSidebar,
    FocusSidebar,
    FocusInput,
    SelectModel {
        model: ModelType,
    },
    CycleModel,
    ToggleTheme,
    ScrollUp {
        lines: u16,
    },
    ScrollDown {
        lines: u16,
    },
    ScrollToBottom,
    SetStatus {
        message: String,
    },
    ClearStatus,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

/// Side effects the event loop performs after applying actions.
pub enum AppCommand {
    SpawnStream(StreamParams),
    PersistTheme(ThemeKind),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::AppendResponseChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. }
        | AppAction::CancelStreaming
        | AppAction::SubmitMessage { .. } => streaming::handle_streaming_action(app, action, ctx),

        AppAction::SubmitLogin { .. }
        | AppAction::Logout
        | AppAction::OpenPricing
        | AppAction::ClosePricing
        | AppAction::PricingMoveUp
        | AppAction::PricingMoveDown
        | AppAction::PurchaseSelectedPack
        | AppAction::PurchaseCredits { .. } => account::handle_account_action(app, action),

        AppAction::NewChat
        | AppAction::SelectSession { .. }
        | AppAction::SidebarMoveUp
        | AppAction::SidebarMoveDown
        | AppAction::SidebarActivate
        | AppAction::ToggleSidebar
        | AppAction::FocusSidebar
        | AppAction::FocusInput
        | AppAction::SelectModel { .. }
        | AppAction::CycleModel
        | AppAction::ToggleTheme
        | AppAction::ScrollUp { .. }
        | AppAction::ScrollDown { .. }
        | AppAction::ScrollToBottom => navigation::handle_navigation_action(app, action, ctx),

        AppAction::SetStatus { message } => {
            app.ui.set_status(message);
            None
        }
        AppAction::ClearStatus => {
            app.ui.clear_status();
            None
        }
        AppAction::Quit => {
            app.conversation.cancel_stream();
            app.ui.exit_requested = true;
            None
        }
    }
}
