use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ChatMessage;
use crate::core::persistence::timestamp;

/// Author of a turn in a chat transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid turn role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// One message in a conversation.
///
/// Turns are never edited in place. Editing a past user turn truncates the
/// chat at that turn and appends a replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(with = "timestamp", alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "thinking")]
    pub reasoning: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "thinkingTime"
    )]
    pub reasoning_elapsed_ms: Option<u64>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at,
            reasoning: None,
            reasoning_elapsed_ms: None,
        }
    }

    pub fn user(content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(Role::User, content, created_at)
    }

    pub fn assistant(content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(Role::Assistant, content, created_at)
    }

    /// Attach a reasoning trace. Empty traces are stored as absent.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>, elapsed_ms: u64) -> Self {
        let reasoning = reasoning.into();
        self.reasoning = (!reasoning.is_empty()).then_some(reasoning);
        self.reasoning_elapsed_ms = Some(elapsed_ms);
        self
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref().filter(|text| !text.is_empty())
    }

    pub fn to_api_message(&self) -> ChatMessage {
        ChatMessage::new(self.role.as_str(), self.content.clone())
    }
}
