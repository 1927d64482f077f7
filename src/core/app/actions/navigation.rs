use super::{App, AppAction, AppActionContext, AppCommand};

pub(super) fn handle_navigation_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::NewChat => {
            app.conversation.new_chat();
            app.ui.scroll_to_bottom();
            app.ui.focus_input();
            None
        }
        AppAction::SelectSession { id } => {
            open_session(app, &id);
            None
        }
        AppAction::SidebarMoveUp => {
            let count = app.conversation.sessions().len();
            app.ui.move_sidebar_selection(-1, count);
            None
        }
        AppAction::SidebarMoveDown => {
            let count = app.conversation.sessions().len();
            app.ui.move_sidebar_selection(1, count);
            None
        }
        AppAction::SidebarActivate => {
            let id = app
                .conversation
                .sessions()
                .list()
                .get(app.ui.sidebar_selected)
                .map(|session| session.id.clone())?;
            open_session(app, &id);
            None
        }
        AppAction::ToggleSidebar => {
            app.ui.toggle_sidebar();
            None
        }
        AppAction::FocusSidebar => {
            app.ui.focus_sidebar();
            None
        }
        AppAction::FocusInput => {
            app.ui.focus_input();
            None
        }
        AppAction::SelectModel { model } => {
            app.conversation.set_model(model);
            app.ui.set_status(format!("Model: {}", model.display_name()));
            None
        }
        AppAction::CycleModel => {
            let model = app.conversation.selected_model().toggled();
            app.conversation.set_model(model);
            app.ui.set_status(format!("Model: {}", model.display_name()));
            None
        }
        AppAction::ToggleTheme => {
            app.ui.toggle_theme();
            Some(AppCommand::PersistTheme(app.ui.theme.kind))
        }
        AppAction::ScrollUp { lines } => {
            let max = app.max_scroll_offset(ctx);
            app.ui.scroll_up(lines, max);
            None
        }
        AppAction::ScrollDown { lines } => {
            app.ui.scroll_down(lines);
            None
        }
        AppAction::ScrollToBottom => {
            app.ui.scroll_to_bottom();
            None
        }
        _ => unreachable!("non-navigation action routed to navigation handler"),
    }
}

fn open_session(app: &mut App, id: &str) {
    if app.conversation.select_session(id) {
        app.sync_sidebar_selection();
        app.ui.scroll_to_bottom();
        app.ui.focus_input();
    }
}
