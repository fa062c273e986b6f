//! `ponder set` and `ponder unset`
//!
//! Display settings live next to the chats in the data directory; the
//! completion keys live in the TOML config file. Both are reachable from
//! the same two commands.

use std::error::Error;
use std::io::{self, Write};

use crate::core::config::{Config, CONFIG_KEYS};
use crate::core::persistence::{FileStore, KeyValueStore, Persistence};
use crate::core::settings::{Settings, SettingsError, SETTING_KEYS};

/// Where an updated value ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Setting,
    Config,
}

pub fn run_set(key: Option<String>, value: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    let persistence = Persistence::new(FileStore::new(config.resolve_data_dir()?));
    let mut stdout = io::stdout().lock();

    let Some(key) = key else {
        write_all_values(&mut stdout, &persistence, &config)?;
        return Ok(());
    };

    let value = value.join(" ");
    if value.trim().is_empty() {
        let current =
            current_value(&persistence, &config, &key).ok_or_else(|| unknown_key(&key))?;
        writeln!(stdout, "{key}: {current}")?;
        return Ok(());
    }

    if apply_set(&persistence, &mut config, &key, &value)? == Applied::Config {
        config.save()?;
    }
    writeln!(stdout, "✅ Set {key} to {}", value.trim())?;
    Ok(())
}

pub fn run_unset(key: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    let persistence = Persistence::new(FileStore::new(config.resolve_data_dir()?));

    if apply_unset(&persistence, &mut config, key)? == Applied::Config {
        config.save()?;
    }
    println!("✅ Reset {key} to its default");
    Ok(())
}

/// Config keys win over setting keys; the two sets do not overlap.
pub fn apply_set<S: KeyValueStore>(
    persistence: &Persistence<S>,
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<Applied, String> {
    if config.set_value(key, value)? {
        return Ok(Applied::Config);
    }

    let mut settings = persistence.load_settings();
    settings
        .set(key, value.trim())
        .map_err(|err| match err {
            SettingsError::UnknownKey(key) => unknown_key(&key),
            other => other.to_string(),
        })?;
    save_checked(persistence, &settings)?;
    Ok(Applied::Setting)
}

pub fn apply_unset<S: KeyValueStore>(
    persistence: &Persistence<S>,
    config: &mut Config,
    key: &str,
) -> Result<Applied, String> {
    if config.unset_value(key) {
        return Ok(Applied::Config);
    }

    let default = Settings::default()
        .describe()
        .into_iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
        .ok_or_else(|| unknown_key(key))?;
    let mut settings = persistence.load_settings();
    settings.set(key, &default).map_err(|err| err.to_string())?;
    save_checked(persistence, &settings)?;
    Ok(Applied::Setting)
}

/// Saving is best-effort and only logs; read the record back so the
/// command can report a write that did not land.
fn save_checked<S: KeyValueStore>(
    persistence: &Persistence<S>,
    settings: &Settings,
) -> Result<(), String> {
    persistence.save_settings(settings);
    if persistence.load_settings() == *settings {
        Ok(())
    } else {
        Err("Failed to save settings to the data directory".to_string())
    }
}

pub fn current_value<S: KeyValueStore>(
    persistence: &Persistence<S>,
    config: &Config,
    key: &str,
) -> Option<String> {
    persistence
        .load_settings()
        .describe()
        .into_iter()
        .chain(config.describe())
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
}

pub fn write_all_values<W: Write, S: KeyValueStore>(
    out: &mut W,
    persistence: &Persistence<S>,
    config: &Config,
) -> io::Result<()> {
    writeln!(out, "Settings:")?;
    for (key, value) in persistence.load_settings().describe() {
        writeln!(out, "  {key:<16} {value}")?;
    }
    writeln!(out, "Config:")?;
    for (key, value) in config.describe() {
        writeln!(out, "  {key:<16} {value}")?;
    }
    Ok(())
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown key '{key}' (expected one of: {}, {})",
        SETTING_KEYS.join(", "),
        CONFIG_KEYS.join(", ")
    )
}
