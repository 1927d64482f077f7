//! Settings management for CLI set/unset commands.
//!
//! Each config key has a [`SettingHandler`] that validates input and edits a
//! [`Config`] in memory. The functions here load the file, run the handler,
//! and write the result back.

pub mod error;
pub mod handlers;
pub mod registry;

use std::path::Path;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the arguments given after the key. Returns the
    /// message to show on success.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Clear the value.
    fn unset(&self, config: &mut Config) -> Result<String, SettingError>;

    /// Format the current value for display in `quickgpt set` output.
    fn format(&self, config: &Config) -> String;
}

fn lookup<'a>(
    registry: &'a SettingRegistry,
    key: &str,
) -> Result<&'a dyn SettingHandler, SettingError> {
    registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
}

fn config_error(e: Box<dyn std::error::Error>) -> SettingError {
    SettingError::ConfigError(e.to_string())
}

/// Set `key` in the config file at `config_path`. The file is only written
/// when the value is accepted.
pub fn set_at(config_path: &Path, key: &str, args: &[String]) -> Result<String, SettingError> {
    let registry = SettingRegistry::new();
    let handler = lookup(&registry, key)?;

    let mut config = Config::load_from_path(config_path).map_err(config_error)?;
    let message = handler.set(args, &mut config)?;
    config.save_to_path(config_path).map_err(config_error)?;
    Ok(message)
}

/// Clear `key` in the config file at `config_path`.
pub fn unset_at(config_path: &Path, key: &str) -> Result<String, SettingError> {
    let registry = SettingRegistry::new();
    let handler = lookup(&registry, key)?;

    let mut config = Config::load_from_path(config_path).map_err(config_error)?;
    let message = handler.unset(&mut config)?;
    config.save_to_path(config_path).map_err(config_error)?;
    Ok(message)
}

/// Current values of every key, one per line.
pub fn describe(config: &Config) -> Vec<String> {
    let registry = SettingRegistry::new();
    registry
        .keys_display_order()
        .iter()
        .filter_map(|key| registry.get(key))
        .map(|handler| handler.format(config))
        .collect()
}
