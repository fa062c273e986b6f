use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ChatMessage;
use crate::core::message::Turn;
use crate::core::persistence::timestamp;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Number of characters of the first message used for an implicit title.
pub const DERIVED_TITLE_CHARS: usize = 30;

/// Opaque chat identifier, derived from the creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    #[serde(default, alias = "messages")]
    pub turns: Vec<Turn>,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: ChatId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            turns: Vec::new(),
            last_updated: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    /// Indices of user-authored turns, oldest first.
    pub fn user_turn_indices(&self) -> Vec<usize> {
        self.turns
            .iter()
            .enumerate()
            .filter(|(_, turn)| turn.is_user())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn last_assistant_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_assistant())
    }

    /// Case-insensitive substring match on the title or any turn's content.
    /// An empty query matches every chat.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .turns
                .iter()
                .any(|turn| turn.content.to_lowercase().contains(&needle))
    }

    /// Assistant turn answering the user turn at `index`, if any.
    pub fn reply_to(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index + 1).filter(|turn| turn.is_assistant())
    }

    /// Role/content history sent to the completion service.
    pub fn api_messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(Turn::to_api_message).collect()
    }
}

/// Title for a chat created implicitly by its first message.
pub fn derive_title(content: &str) -> String {
    let head: String = content.chars().take(DERIVED_TITLE_CHARS).collect();
    format!("{head}...")
}
