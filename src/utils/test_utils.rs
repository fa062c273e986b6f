use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::api::ChatMessage;
use crate::core::app::App;
use crate::core::clock::testing::ManualClock;
use crate::core::completion::{Completion, CompletionClient, CompletionError};
use crate::core::conversation::CompletionOutcome;
use crate::core::persistence::{MemoryStore, Persistence};
use crate::core::session::SessionStore;

/// Completion client that replays scripted results and records every
/// history it was asked to complete. With a gate, each call waits for
/// `Notify::notify_one` before answering.
pub struct ScriptedClient {
    replies: Mutex<Vec<Result<Completion, CompletionError>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<Completion, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            seen: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(replies: Vec<Result<Completion, CompletionError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(CompletionError::new("no scripted reply left"));
        }
        replies.remove(0)
    }
}

pub fn answer(text: &str, reasoning: &str, elapsed_ms: u64) -> Result<Completion, CompletionError> {
    Ok(Completion {
        answer: text.to_string(),
        reasoning: reasoning.to_string(),
        reasoning_elapsed_ms: elapsed_ms,
    })
}

pub fn create_test_store() -> SessionStore<MemoryStore> {
    SessionStore::open_with_clock(
        Persistence::new(MemoryStore::new()),
        Box::new(ManualClock::at_millis(1_700_000_000_000)),
    )
}

pub fn create_test_app(
    client: Arc<ScriptedClient>,
) -> (App<MemoryStore>, mpsc::UnboundedReceiver<CompletionOutcome>) {
    App::new(create_test_store(), client, "test-model")
}
