//! User-facing display settings persisted alongside chats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub font_size: FontSize,
    pub show_timestamps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            font_size: FontSize::Medium,
            show_timestamps: true,
        }
    }
}

/// Keys accepted by [`Settings::set`].
pub const SETTING_KEYS: [&str; 3] = ["theme", "font-size", "show-timestamps"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    UnknownKey(String),
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownKey(key) => write!(
                f,
                "Unknown setting '{key}' (expected one of: {})",
                SETTING_KEYS.join(", ")
            ),
            SettingsError::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "Invalid value '{value}' for {key} (expected {expected})"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(SettingsError::InvalidValue {
                key: "theme",
                value: value.to_string(),
                expected: "light or dark",
            }),
        }
    }
}

impl FontSize {
    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }

    /// Cycle small → medium → large → small.
    pub fn next(self) -> Self {
        match self {
            FontSize::Small => FontSize::Medium,
            FontSize::Medium => FontSize::Large,
            FontSize::Large => FontSize::Small,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FontSize::Small => FontSize::Large,
            FontSize::Medium => FontSize::Small,
            FontSize::Large => FontSize::Medium,
        }
    }
}

impl FromStr for FontSize {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            _ => Err(SettingsError::InvalidValue {
                key: "font-size",
                value: value.to_string(),
                expected: "small, medium, or large",
            }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Apply a `key = value` pair as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "theme" => self.theme = value.parse()?,
            "font-size" | "font_size" | "fontSize" => self.font_size = value.parse()?,
            "show-timestamps" | "show_timestamps" | "showTimestamps" => {
                self.show_timestamps =
                    parse_bool(value).ok_or_else(|| SettingsError::InvalidValue {
                        key: "show-timestamps",
                        value: value.to_string(),
                        expected: "true or false",
                    })?;
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.as_str().to_string()),
            ("font-size", self.font_size.as_str().to_string()),
            ("show-timestamps", self.show_timestamps.to_string()),
        ]
    }
}
