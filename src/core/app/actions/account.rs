use super::{App, AppAction, AppCommand};
use crate::core::profile::CREDIT_PACKS;

pub(super) fn handle_account_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SubmitLogin { name } => {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            app.conversation.login(name);
            app.ui.clear_login_input();
            app.ui.focus_input();
            app.ui.set_status(format!("Welcome, {name}!"));
            None
        }
        AppAction::Logout => {
            app.conversation.logout();
            app.ui.clear_input();
            app.ui.scroll_to_bottom();
            app.ui.sidebar_selected = 0;
            app.ui.focus_input();
            app.ui.set_status("Logged out");
            None
        }
        AppAction::OpenPricing => {
            app.conversation.open_pricing();
            app.ui.pricing_selected = 0;
            None
        }
        AppAction::ClosePricing => {
            app.conversation.close_pricing();
            None
        }
        AppAction::PricingMoveUp => {
            app.ui.move_pricing_selection(-1);
            None
        }
        AppAction::PricingMoveDown => {
            app.ui.move_pricing_selection(1);
            None
        }
        AppAction::PurchaseSelectedPack => {
            let pack = CREDIT_PACKS.get(app.ui.pricing_selected)?;
            purchase(app, pack.credits);
            None
        }
        AppAction::PurchaseCredits { amount } => {
            purchase(app, amount);
            None
        }
        _ => unreachable!("non-account action routed to account handler"),
    }
}

fn purchase(app: &mut App, amount: i64) {
    if let Some(balance) = app.conversation.purchase_credits(amount) {
        app.ui
            .set_status(format!("Added {amount} credits. Balance: {balance}"));
    }
}
