use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for the remote completion service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    /// OpenAI-compatible API root, e.g. `https://api.groq.com/openai/v1`
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,
    /// Directory holding the chat and settings records. Defaults to the
    /// platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Config keys accepted by `ponder set`.
pub const CONFIG_KEYS: [&str; 5] = ["model", "base-url", "temperature", "max-tokens", "timeout"];

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
    /// Apply a `key value` pair from the command line. Returns `Ok(false)`
    /// when `key` is not a config key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<bool, String> {
        let completion = &mut self.completion;
        match key {
            "model" => {
                let model = value.trim();
                if model.is_empty() {
                    return Err("Model name cannot be empty".to_string());
                }
                completion.model = model.to_string();
            }
            "base-url" => completion.base_url = crate::utils::url::validate_base_url(value)?,
            "temperature" => {
                let temperature: f32 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid temperature '{value}'"))?;
                if !(0.0..=2.0).contains(&temperature) {
                    return Err("Temperature must be between 0 and 2".to_string());
                }
                completion.temperature = temperature;
            }
            "max-tokens" => {
                completion.max_tokens = value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|tokens| *tokens > 0)
                    .ok_or_else(|| format!("Invalid max-tokens '{value}'"))?;
            }
            "timeout" => {
                completion.timeout_secs = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| format!("Invalid timeout '{value}'"))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Reset a config key to its default. Returns `false` for unknown keys.
    pub fn unset_value(&mut self, key: &str) -> bool {
        let defaults = CompletionConfig::default();
        let completion = &mut self.completion;
        match key {
            "model" => completion.model = defaults.model,
            "base-url" => completion.base_url = defaults.base_url,
            "temperature" => completion.temperature = defaults.temperature,
            "max-tokens" => completion.max_tokens = defaults.max_tokens,
            "timeout" => completion.timeout_secs = defaults.timeout_secs,
            _ => return false,
        }
        true
    }

    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let completion = &self.completion;
        vec![
            ("model", completion.model.clone()),
            ("base-url", completion.base_url.clone()),
            ("temperature", completion.temperature.to_string()),
            ("max-tokens", completion.max_tokens.to_string()),
            ("timeout", format!("{}s", completion.timeout_secs)),
        ]
    }
}
