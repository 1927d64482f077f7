//! Profile commands that run without the chat screen.

use crate::core::profile::{ProfileHolder, CREDIT_PACKS};

pub enum AccountCommand {
    Login { name: String },
    Logout,
    Credits,
    Buy { amount: i64 },
}

/// Apply `command` to the stored profile and return what to print.
pub fn run_account_command(
    holder: &mut ProfileHolder,
    command: AccountCommand,
) -> Result<String, String> {
    match command {
        AccountCommand::Login { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err("A display name is required: quickgpt login <name>".to_string());
            }
            let profile = holder.login(name);
            Ok(format!(
                "✅ Logged in as {} with {} credits",
                profile.name, profile.credits
            ))
        }
        AccountCommand::Logout => {
            if !holder.is_logged_in() {
                return Ok("Not logged in".to_string());
            }
            holder.logout();
            Ok("✅ Logged out".to_string())
        }
        AccountCommand::Credits => match holder.current() {
            Some(profile) => {
                let mut lines = vec![format!("{}: {} credits", profile.name, profile.credits)];
                lines.push("Credit packs:".to_string());
                lines.extend(CREDIT_PACKS.iter().map(|pack| {
                    format!("  {:>4} credits  {:<8} {}", pack.credits, pack.label, pack.price)
                }));
                Ok(lines.join("\n"))
            }
            None => Err(not_logged_in()),
        },
        AccountCommand::Buy { amount } => holder
            .purchase_credits(amount)
            .map(|balance| format!("✅ Added {amount} credits. Balance: {balance}"))
            .ok_or_else(not_logged_in),
    }
}

fn not_logged_in() -> String {
    "Not logged in. Run 'quickgpt login <name>' first.".to_string()
}
