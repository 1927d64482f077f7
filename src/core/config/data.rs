use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::model::ModelType;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    /// Model selected when the chat opens
    pub default_model: Option<ModelType>,
    /// Override for the Gemini API base URL
    pub api_base_url: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/quickgpt/config.toml` → `~/.config/quickgpt/config.toml`
/// - Windows: `C:\\Users\\user\\AppData\\Roaming\\quickgpt` → `C:\\Users\\user\\AppData\\Roaming\\quickgpt`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    /// Whether the dark palette should be used. Anything other than
    /// "light" falls back to dark.
    pub fn prefers_dark(&self) -> bool {
        !matches!(self.theme.as_deref(), Some(t) if t.eq_ignore_ascii_case("light"))
    }

    pub fn model_or_default(&self) -> ModelType {
        self.default_model.unwrap_or_default()
    }
}
