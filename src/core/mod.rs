pub mod app;
pub mod chat_stream;
pub mod config;
pub mod controller;
pub mod gemini;
pub mod keyring;
pub mod message;
pub mod model;
pub mod profile;
pub mod session;
pub mod text_wrapping;
