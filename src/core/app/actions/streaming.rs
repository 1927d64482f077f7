use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::controller::SendOutcome;
use tracing::debug;

pub(super) fn handle_streaming_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::AppendResponseChunk { content, stream_id } => {
            if !app.conversation.apply_fragment(stream_id, &content) {
                debug!(stream_id, "dropping fragment for stale stream");
            }
            None
        }
        AppAction::StreamErrored { message, stream_id } => {
            app.conversation.fail_stream(stream_id, message.trim());
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            if app.conversation.complete_stream(stream_id) {
                app.sync_sidebar_selection();
            }
            None
        }
        AppAction::CancelStreaming => {
            if app.conversation.cancel_stream() {
                app.ui.set_status("Reply stopped");
            }
            None
        }
        AppAction::SubmitMessage { message } => submit_message(app, message),
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

fn submit_message(app: &mut App, message: String) -> Option<AppCommand> {
    let text = message.trim();
    if text.is_empty() {
        return None;
    }

    let model = app.conversation.selected_model();
    match app.conversation.begin_send(text, model) {
        SendOutcome::Started(params) => {
            app.ui.clear_input();
            app.ui.scroll_to_bottom();
            Some(AppCommand::SpawnStream(params))
        }
        SendOutcome::NeedsCredits => {
            app.ui.pricing_selected = 0;
            app.ui.set_status(format!(
                "{} needs credits. Pick a pack to continue.",
                model.display_name()
            ));
            None
        }
        SendOutcome::Busy => {
            app.ui.set_status("Still replying. Press Esc to stop.");
            None
        }
        SendOutcome::Ignored | SendOutcome::Failed(_) => None,
    }
}
