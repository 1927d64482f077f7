//! Terminal UI layer for the interactive chat.
//!
//! - [`chat_loop`]: terminal setup and the event loop that turns input and
//!   stream output into [`crate::core::app::AppAction`]s.
//! - [`renderer`] and [`layout`]: frame composition and transcript wrapping.
//! - [`theme`]: the dark and light palettes.
//!
//! This layer presents and captures interaction state; [`crate::core`] owns
//! the conversation rules.

pub mod chat_loop;
pub mod layout;
pub mod renderer;
pub mod theme;
