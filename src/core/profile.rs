//! User profile and credit balance.
//!
//! The profile is the only durable record. It reaches disk through the
//! [`ProfileStore`] port so the controller can be driven by an in-memory
//! store in tests.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::core::config::data::path_display;

/// Credits granted when a new profile is created.
pub const SIGNUP_CREDITS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub credits: i64,
    #[serde(default)]
    pub avatar_url: String,
}

impl UserProfile {
    pub fn new_signup(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credits: SIGNUP_CREDITS,
            avatar_url: String::new(),
        }
    }
}

/// A credit pack offered in the pricing prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPack {
    pub credits: i64,
    pub label: &'static str,
    pub price: &'static str,
}

pub const CREDIT_PACKS: [CreditPack; 3] = [
    CreditPack {
        credits: 10,
        label: "Starter",
        price: "$4.99",
    },
    CreditPack {
        credits: 50,
        label: "Plus",
        price: "$19.99",
    },
    CreditPack {
        credits: 200,
        label: "Team",
        price: "$59.99",
    },
];

/// Errors raised by profile persistence backends.
#[derive(Debug)]
pub enum ProfileStoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
    Persist(tempfile::PersistError),
}

impl fmt::Display for ProfileStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileStoreError::Io { path, source } => {
                write!(f, "Profile I/O failed at {}: {}", path_display(path), source)
            }
            ProfileStoreError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse profile at {}: {}",
                    path_display(path),
                    source
                )
            }
            ProfileStoreError::Encode(source) => write!(f, "Failed to encode profile: {source}"),
            ProfileStoreError::Persist(source) => write!(f, "Failed to save profile: {source}"),
        }
    }
}

impl StdError for ProfileStoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProfileStoreError::Io { source, .. } => Some(source),
            ProfileStoreError::Parse { source, .. } => Some(source),
            ProfileStoreError::Encode(source) => Some(source),
            ProfileStoreError::Persist(source) => Some(source),
        }
    }
}

/// Persistence port for the single profile record.
pub trait ProfileStore: Send {
    fn get(&self) -> Result<Option<UserProfile>, ProfileStoreError>;
    fn put(&mut self, profile: &UserProfile) -> Result<(), ProfileStoreError>;
    fn remove(&mut self) -> Result<(), ProfileStoreError>;
}

/// Stores the profile as JSON in the platform data directory.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Result<Self, Box<dyn StdError>> {
        let proj_dirs = ProjectDirs::from("org", "quickgpt", "quickgpt")
            .ok_or("Failed to determine data directory")?;
        Ok(Self::new(proj_dirs.data_dir().join("profile.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ProfileStoreError {
        ProfileStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self) -> Result<Option<UserProfile>, ProfileStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let profile = serde_json::from_str(&contents).map_err(|source| ProfileStoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(profile))
    }

    fn put(&mut self, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_vec_pretty(profile).map_err(ProfileStoreError::Encode)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| self.io_error(e))?;
        temp_file
            .write_all(&contents)
            .map_err(|e| self.io_error(e))?;
        temp_file
            .as_file_mut()
            .sync_all()
            .map_err(|e| self.io_error(e))?;
        temp_file
            .persist(&self.path)
            .map_err(ProfileStoreError::Persist)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ProfileStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-memory store. Clones share the same record, so a test can keep a
/// handle and inspect what the holder persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    record: Arc<Mutex<Option<UserProfile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(profile))),
        }
    }

    pub fn snapshot(&self) -> Option<UserProfile> {
        self.record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, value: Option<UserProfile>) {
        *self
            .record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self) -> Result<Option<UserProfile>, ProfileStoreError> {
        Ok(self.snapshot())
    }

    fn put(&mut self, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        self.set(Some(profile.clone()));
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ProfileStoreError> {
        self.set(None);
        Ok(())
    }
}

/// Owns the current profile and writes every change through the store.
/// Persistence failures are logged and never surface to callers.
pub struct ProfileHolder {
    store: Box<dyn ProfileStore>,
    current: Option<UserProfile>,
}

impl ProfileHolder {
    pub fn new(store: Box<dyn ProfileStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Build a holder and restore whatever profile the store has.
    pub fn load(store: Box<dyn ProfileStore>) -> Self {
        let mut holder = Self::new(store);
        match holder.store.get() {
            Ok(profile) => holder.current = profile,
            Err(e) => warn!(error = %e, "ignoring unreadable stored profile"),
        }
        holder
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn credits(&self) -> Option<i64> {
        self.current.as_ref().map(|p| p.credits)
    }

    pub fn login(&mut self, name: &str) -> &UserProfile {
        info!(name, "logging in");
        let profile = UserProfile::new_signup(name);
        self.persist(&profile);
        self.current.insert(profile)
    }

    pub fn logout(&mut self) {
        info!("logging out");
        self.current = None;
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "failed to remove stored profile");
        }
    }

    /// Add `amount` credits. Returns the new balance, or `None` when nobody
    /// is logged in.
    pub fn purchase_credits(&mut self, amount: i64) -> Option<i64> {
        let mut profile = self.current.clone()?;
        profile.credits = profile.credits.saturating_add(amount);
        info!(amount, balance = profile.credits, "credits purchased");
        self.persist(&profile);
        let balance = profile.credits;
        self.current = Some(profile);
        Some(balance)
    }

    fn persist(&mut self, profile: &UserProfile) {
        if let Err(e) = self.store.put(profile) {
            warn!(error = %e, "failed to persist profile");
        }
    }
}
