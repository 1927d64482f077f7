//! Tracing subscriber setup.
//!
//! The interactive chat owns the terminal, so it logs to a file. One-shot
//! commands log to stderr.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "QUICKGPT_LOG";

pub enum LogTarget {
    /// Append to this file; create it and its parent directory if needed.
    File(PathBuf),
    Stderr,
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Default log file for interactive sessions.
pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "quickgpt", "quickgpt").map(|dirs| dirs.data_dir().join("quickgpt.log"))
}

fn open_log_file(path: &Path) -> Result<fs::File, Box<dyn Error>> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber and report whether this call installed
/// it. A log file that cannot be opened leaves logging off, since the chat
/// screen owns the terminal. Calling it twice is harmless; the first
/// subscriber stays in place.
pub fn init_tracing(target: LogTarget) -> bool {
    let installed = match target {
        LogTarget::File(path) => {
            let Ok(file) = open_log_file(&path) else {
                return false;
            };
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("info"))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter("warn"))
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    installed.is_ok()
}
