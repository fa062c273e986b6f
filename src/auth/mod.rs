//! Resolution and storage of the completion service credential.
//!
//! The key comes from `PONDER_API_KEY` when set, otherwise from the system
//! keyring entry written by `ponder auth`.

use std::fmt;

use keyring::Entry;
use tracing::debug;

use crate::core::keyring::KeyringAccessError;

pub mod ui;

pub const API_KEY_ENV: &str = "PONDER_API_KEY";
const KEYRING_SERVICE: &str = "ponder";
const KEYRING_USER: &str = "api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Environment => write!(f, "{API_KEY_ENV}"),
            KeySource::Keyring => write!(f, "system keyring"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub value: String,
    pub source: KeySource,
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// Neither the environment nor the keyring holds a key.
    Missing,
    Keyring(KeyringAccessError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Missing => write!(
                f,
                "No API key configured. Run `ponder auth` or set {API_KEY_ENV}."
            ),
            AuthError::Keyring(err) if err.is_recoverable() => write!(
                f,
                "Could not read the API key: {err}. Set {API_KEY_ENV} to skip the keyring."
            ),
            AuthError::Keyring(err) => write!(f, "Could not read the API key: {err}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Missing => None,
            AuthError::Keyring(err) => Some(err),
        }
    }
}

impl From<keyring::Error> for AuthError {
    fn from(err: keyring::Error) -> Self {
        AuthError::Keyring(KeyringAccessError::from(err))
    }
}

pub struct AuthManager {
    use_keyring: bool,
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access (useful for tests)
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    pub fn resolve_api_key(&self) -> Result<ApiKey, AuthError> {
        self.resolve_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_with_env(&self, env_value: Option<String>) -> Result<ApiKey, AuthError> {
        if let Some(value) = env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            debug!("using API key from environment");
            return Ok(ApiKey {
                value,
                source: KeySource::Environment,
            });
        }

        match self.get_stored_key()? {
            Some(value) => Ok(ApiKey {
                value,
                source: KeySource::Keyring,
            }),
            None => Err(AuthError::Missing),
        }
    }

    pub fn get_stored_key(&self) -> Result<Option<String>, AuthError> {
        if !self.use_keyring {
            return Ok(None);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store_key(&self, key: &str) -> Result<(), AuthError> {
        if !self.use_keyring {
            return Ok(());
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(key)?;
        debug!("stored API key in keyring");
        Ok(())
    }

    /// Remove the stored key. Returns `false` when there was nothing to remove.
    pub fn remove_key(&self) -> Result<bool, AuthError> {
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

    pub fn interactive_auth(&self) -> Result<(), Box<dyn std::error::Error>> {
        let key = ui::prompt_api_key()?;
        self.store_key(&key)?;
        println!("✅ API key saved to the system keyring");
        if std::env::var_os(API_KEY_ENV).is_some() {
            println!("💡 {API_KEY_ENV} is set and takes precedence over the stored key");
        }
        Ok(())
    }

    pub fn interactive_deauth(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.get_stored_key()?.is_none() {
            println!("No stored API key found.");
            return Ok(());
        }
        if ui::prompt_confirmation("Remove the stored API key?")? != ui::ConfirmationChoice::Yes {
            println!("Cancelled.");
            return Ok(());
        }
        if self.remove_key()? {
            println!("✅ API key removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_key_wins() {
        let auth = AuthManager::new_with_keyring(false);
        let key = auth
            .resolve_with_env(Some("  sk-test \n".to_string()))
            .expect("env key");
        assert_eq!(key.value, "sk-test");
        assert_eq!(key.source, KeySource::Environment);
    }

    #[test]
    fn blank_environment_key_is_ignored() {
        let auth = AuthManager::new_with_keyring(false);
        let err = auth.resolve_with_env(Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, AuthError::Missing));
        assert!(err.to_string().contains("ponder auth"));
    }

    #[test]
    fn disabled_keyring_stores_nothing() {
        let auth = AuthManager::new_with_keyring(false);
        auth.store_key("sk").unwrap();
        assert_eq!(auth.get_stored_key().unwrap(), None);
        assert!(!auth.remove_key().unwrap());
    }

    #[test]
    fn debug_output_redacts_key() {
        let key = ApiKey {
            value: "sk-secret".to_string(),
            source: KeySource::Keyring,
        };
        assert!(!format!("{key:?}").contains("sk-secret"));
    }
}
