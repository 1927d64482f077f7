//! QuickGPT is a terminal chat client for Google's Gemini models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation controller, the user profile and its
//!   credits, saved sessions, configuration, and reply streaming.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`cli`] parses arguments and runs one-shot commands.
//! - [`auth`] resolves the Gemini API key from the environment or keyring.
//! - [`api`] defines the Gemini wire payloads.
//!
//! The binary (`src/main.rs`) calls [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
