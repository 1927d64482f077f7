//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod account;
pub mod say;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::auth::AuthManager;
use crate::cli::account::{run_account_command, AccountCommand};
use crate::cli::say::run_say;
use crate::core::config::data::Config;
use crate::core::model::ModelType;
use crate::core::profile::{FileProfileStore, ProfileHolder};
use crate::logging::{default_log_path, init_tracing, LogTarget};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "quickgpt")]
#[command(version)]
#[command(about = "A terminal chat client for Gemini with credits and saved sessions")]
#[command(
    long_about = "QuickGPT is a full-screen terminal chat client for Google's Gemini models. \
Log in with a display name, pick the Fast or Pro model, and watch replies stream in. \
Pro replies need credits; new profiles start with 5.\n\n\
Authentication:\n\
  Use 'quickgpt auth' to store a Gemini API key in your system keyring.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (API_KEY is also accepted)\n\
  QUICKGPT_LOG      Log filter, for example 'debug' or 'quickgpt=trace'\n\n\
Controls:\n\
  Enter             Send the message\n\
  Tab               Switch between Fast and Pro\n\
  Esc               Stop the current reply\n\
  Ctrl+N            Start a new chat\n\
  Ctrl+S            Move focus to the session list\n\
  Ctrl+B            Show or hide the session list\n\
  Ctrl+T            Toggle dark/light theme\n\
  Ctrl+P            Buy credits\n\
  Ctrl+X            Log out\n\
  PageUp/PageDown   Scroll the transcript\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use: fast or pro
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<ModelType>,

    /// Write logs for the chat screen to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Print a single streamed answer without opening the chat screen
    Say {
        /// Prompt text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Log in with a display name; new profiles receive starter credits
    Login {
        /// Display name
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Log out and forget the stored profile
    Logout,
    /// Show the credit balance and available packs
    Credits,
    /// Add credits to the logged-in profile
    Buy {
        /// Number of credits to add
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
    /// Store a Gemini API key in the system keyring
    Auth,
    /// Remove the stored Gemini API key
    Deauth,
    /// Set configuration values, or list them when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let interactive = matches!(args.command, None | Some(Commands::Chat));
    let target = if interactive {
        args.log
            .clone()
            .or_else(default_log_path)
            .map(LogTarget::File)
            .unwrap_or(LogTarget::Stderr)
    } else {
        LogTarget::Stderr
    };
    init_tracing(target);

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

fn run_account(command: AccountCommand) -> Result<(), Box<dyn Error>> {
    let store = FileProfileStore::at_default_location()?;
    let mut holder = ProfileHolder::load(Box::new(store));
    match run_account_command(&mut holder, command) {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(message) => {
            eprintln!("❌ {message}");
            std::process::exit(1);
        }
    }
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(args.model).await,
        Commands::Say { prompt } => run_say(prompt, args.model).await,
        Commands::Login { name } => run_account(AccountCommand::Login {
            name: name.join(" "),
        }),
        Commands::Logout => run_account(AccountCommand::Logout),
        Commands::Credits => run_account(AccountCommand::Credits),
        Commands::Buy { amount } => run_account(AccountCommand::Buy { amount }),
        Commands::Auth => {
            let auth_manager = AuthManager::new();
            if let Err(e) = auth_manager.interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            let auth_manager = AuthManager::new();
            if let Err(e) = auth_manager.interactive_deauth() {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key: None, .. } => {
            let config = Config::load()?;
            println!("Current configuration:");
            for line in settings::describe(&config) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Set {
            key: Some(key),
            value,
        } => {
            let path = Config::get_config_path()?;
            report_setting(settings::set_at(&path, &key, &value))
        }
        Commands::Unset { key } => {
            let path = Config::get_config_path()?;
            report_setting(settings::unset_at(&path, &key))
        }
    }
}

fn report_setting(result: Result<String, settings::SettingError>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}
