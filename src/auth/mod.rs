//! API key resolution and keyring storage.

use keyring::Entry;
use tracing::debug;

use crate::core::keyring::KeyringAccessError;

mod ui;

pub use self::ui::{parse_confirmation, ConfirmationChoice, UiError};

const KEYRING_SERVICE: &str = "quickgpt";
const KEYRING_USER: &str = "gemini";

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment(&'static str),
    Keyring,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Environment(var) => write!(f, "environment ({var})"),
            KeySource::Keyring => write!(f, "system keyring"),
        }
    }
}

pub struct AuthManager {
    use_keyring: bool,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access (useful for tests)
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    /// Find an API key, preferring the environment over the keyring.
    pub fn resolve_api_key(&self) -> Result<Option<(String, KeySource)>, KeyringAccessError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_api_key_with<F>(
        &self,
        lookup_env: F,
    ) -> Result<Option<(String, KeySource)>, KeyringAccessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in API_KEY_ENV_VARS {
            if let Some(value) = lookup_env(var).filter(|v| !v.trim().is_empty()) {
                debug!(var, "using API key from environment");
                return Ok(Some((value.trim().to_string(), KeySource::Environment(var))));
            }
        }

        Ok(self.get_stored_key()?.map(|key| (key, KeySource::Keyring)))
    }

    pub fn get_stored_key(&self) -> Result<Option<String>, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(None);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store_api_key(&self, token: &str) -> Result<(), KeyringAccessError> {
        if !self.use_keyring {
            return Ok(());
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(token)?;
        Ok(())
    }

    /// Remove the stored key. Returns false when there was nothing to remove.
    pub fn remove_api_key(&self) -> Result<bool, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(false);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Interactive `auth` flow: read a key from stdin and store it.
    pub fn interactive_auth(&self) -> Result<(), Box<dyn std::error::Error>> {
        let token = ui::prompt_api_key()?;
        self.store_api_key(&token)?;
        println!("✅ API key saved to the system keyring.");
        Ok(())
    }

    /// Interactive `deauth` flow: confirm, then remove the stored key.
    pub fn interactive_deauth(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !ui::confirm("Remove the stored Gemini API key? (y/N): ")? {
            println!("Cancelled.");
            return Ok(());
        }
        if self.remove_api_key()? {
            println!("✅ API key removed from the system keyring.");
        } else {
            println!("No stored API key found.");
        }
        Ok(())
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        let auth = AuthManager::new_with_keyring(false);
        let resolved = auth
            .resolve_api_key_with(env_of(&[("API_KEY", "generic"), ("GEMINI_API_KEY", "gem")]))
            .expect("resolve");
        assert_eq!(
            resolved,
            Some(("gem".to_string(), KeySource::Environment("GEMINI_API_KEY")))
        );
    }

    #[test]
    fn blank_environment_values_are_skipped() {
        let auth = AuthManager::new_with_keyring(false);
        let resolved = auth
            .resolve_api_key_with(env_of(&[("GEMINI_API_KEY", "  "), ("API_KEY", " k ")]))
            .expect("resolve");
        assert_eq!(
            resolved,
            Some(("k".to_string(), KeySource::Environment("API_KEY")))
        );
    }

    #[test]
    fn no_key_without_keyring_or_environment() {
        let auth = AuthManager::new_with_keyring(false);
        assert_eq!(auth.resolve_api_key_with(|_| None).expect("resolve"), None);
        assert!(!auth.remove_api_key().expect("remove"));
        auth.store_api_key("ignored").expect("store is a no-op");
    }

    #[test]
    fn key_source_labels() {
        assert_eq!(
            KeySource::Environment("API_KEY").to_string(),
            "environment (API_KEY)"
        );
        assert_eq!(KeySource::Keyring.to_string(), "system keyring");
    }
}
