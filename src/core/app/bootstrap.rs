//! Wiring shared by the interactive UI and the one-shot commands.

use std::error::Error;

use tracing::debug;

use crate::auth::AuthManager;
use crate::core::completion::HttpCompletionClient;
use crate::core::config::{CompletionConfig, Config, ConfigError};
use crate::core::persistence::{FileStore, Persistence};
use crate::core::session::SessionStore;
use crate::utils::url::validate_base_url;

/// Per-invocation overrides from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl CliOverrides {
    pub fn apply(&self, config: &Config) -> Result<CompletionConfig, String> {
        let mut completion = config.completion.clone();
        if let Some(model) = self.model.as_deref().map(str::trim) {
            if model.is_empty() {
                return Err("--model cannot be empty".to_string());
            }
            completion.model = model.to_string();
        }
        if let Some(base_url) = &self.base_url {
            completion.base_url = validate_base_url(base_url)?;
        }
        Ok(completion)
    }
}

pub fn open_session_store(config: &Config) -> Result<SessionStore<FileStore>, ConfigError> {
    let data_dir = config.resolve_data_dir()?;
    debug!(dir = %data_dir.display(), "opening chat store");
    Ok(SessionStore::open(Persistence::new(FileStore::new(data_dir))))
}

pub fn connect_client(
    completion: &CompletionConfig,
    auth: &AuthManager,
) -> Result<HttpCompletionClient, Box<dyn Error>> {
    let key = auth.resolve_api_key()?;
    debug!(source = %key.source, model = %completion.model, "API key resolved");
    Ok(HttpCompletionClient::new(completion, key.value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn overrides_replace_model_and_normalize_base_url() {
        let overrides = CliOverrides {
            model: Some("llama-3.3-70b".to_string()),
            base_url: Some("http://localhost:1234/v1/".to_string()),
        };
        let completion = overrides.apply(&Config::default()).unwrap();
        assert_eq!(completion.model, "llama-3.3-70b");
        assert_eq!(completion.base_url, "http://localhost:1234/v1");
        assert_eq!(completion.max_tokens, Config::default().completion.max_tokens);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let blank = CliOverrides {
            model: Some("  ".to_string()),
            ..CliOverrides::default()
        };
        assert!(blank.apply(&Config::default()).is_err());

        let bad_url = CliOverrides {
            base_url: Some("nonsense".to_string()),
            ..CliOverrides::default()
        };
        assert!(bad_url.apply(&Config::default()).is_err());
    }

    #[test]
    fn session_store_lives_in_configured_data_dir() {
        let temp = TempDir::new().expect("temp dir");
        let config = Config {
            data_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };

        let mut store = open_session_store(&config).unwrap();
        store.send_user_turn("hello");
        assert!(temp.path().join("ai_chats.json").exists());

        let reopened = open_session_store(&config).unwrap();
        assert_eq!(reopened.chats().len(), 1);
    }

    #[test]
    fn missing_key_fails_before_connecting() {
        let auth = AuthManager::new_with_keyring(false);
        if std::env::var_os(crate::auth::API_KEY_ENV).is_none() {
            assert!(connect_client(&CompletionConfig::default(), &auth).is_err());
        }
    }
}
