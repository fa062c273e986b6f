//! Drives a user turn through the completion client and back into the store.
//!
//! [`Conversation::send`] records the user turn and spawns the request on a
//! Tokio task. The result comes back as a [`CompletionOutcome`] on the
//! channel returned by [`Conversation::new`], tagged with the originating
//! chat, and the event loop feeds it to [`Conversation::receive`]. The store
//! stays usable while the request is pending.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::chat::ChatId;
use crate::core::completion::{Completion, CompletionClient, CompletionError};
use crate::core::message::Turn;
use crate::core::persistence::KeyValueStore;
use crate::core::session::{OutgoingTurns, SessionStore};

#[derive(Debug)]
pub struct CompletionOutcome {
    pub request_id: u64,
    pub chat_id: ChatId,
    pub result: Result<Completion, CompletionError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Input was empty or whitespace.
    EmptyInput,
    /// A completion is already in flight.
    Busy,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::EmptyInput => write!(f, "Nothing to send"),
            SendError::Busy => write!(f, "Still waiting for the previous answer"),
        }
    }
}

impl std::error::Error for SendError {}

/// What happened to a completion that came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Appended(ChatId),
    /// The chat was deleted while the request was pending.
    ChatGone(ChatId),
    /// The outcome does not belong to the request in flight.
    Stale,
}

#[derive(Debug, Clone)]
struct InFlight {
    request_id: u64,
    chat_id: ChatId,
}

#[derive(Clone)]
pub struct CompletionService {
    client: Arc<dyn CompletionClient>,
    tx: mpsc::UnboundedSender<CompletionOutcome>,
}

impl CompletionService {
    pub fn new(
        client: Arc<dyn CompletionClient>,
    ) -> (Self, mpsc::UnboundedReceiver<CompletionOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { client, tx }, rx)
    }

    pub fn spawn_request(&self, request_id: u64, outgoing: OutgoingTurns) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let OutgoingTurns { chat_id, messages } = outgoing;
            let result = client.complete(&messages).await;
            let outcome = CompletionOutcome {
                request_id,
                chat_id,
                result,
            };
            if tx.send(outcome).is_err() {
                debug!(request_id, "completion finished after receiver closed");
            }
        });
    }
}

pub struct Conversation {
    service: CompletionService,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

impl Conversation {
    pub fn new(
        client: Arc<dyn CompletionClient>,
    ) -> (Self, mpsc::UnboundedReceiver<CompletionOutcome>) {
        let (service, rx) = CompletionService::new(client);
        (
            Self {
                service,
                in_flight: None,
                next_request_id: 1,
            },
            rx,
        )
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn waiting_chat(&self) -> Option<&ChatId> {
        self.in_flight.as_ref().map(|in_flight| &in_flight.chat_id)
    }

    /// Record `content` as a user turn and start the completion request.
    pub fn send<S: KeyValueStore>(
        &mut self,
        store: &mut SessionStore<S>,
        content: &str,
    ) -> Result<ChatId, SendError> {
        if self.in_flight.is_some() {
            return Err(SendError::Busy);
        }
        if content.trim().is_empty() {
            return Err(SendError::EmptyInput);
        }

        let outgoing = store.send_user_turn(content);
        let chat_id = outgoing.chat_id.clone();
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        debug!(request_id, chat = %chat_id, turns = outgoing.messages.len(), "dispatching completion");
        self.in_flight = Some(InFlight {
            request_id,
            chat_id: chat_id.clone(),
        });
        self.service.spawn_request(request_id, outgoing);
        Ok(chat_id)
    }

    /// Apply a finished request. Clears the waiting state on success and on
    /// failure; a failure appends nothing.
    pub fn receive<S: KeyValueStore>(
        &mut self,
        store: &mut SessionStore<S>,
        outcome: CompletionOutcome,
    ) -> Result<Delivery, CompletionError> {
        let matches_in_flight = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.request_id == outcome.request_id);
        if !matches_in_flight {
            debug!(request_id = outcome.request_id, "ignoring stale completion");
            return Ok(Delivery::Stale);
        }
        self.in_flight = None;

        let CompletionOutcome {
            chat_id, result, ..
        } = outcome;
        let completion = result.inspect_err(|err| {
            warn!(chat = %chat_id, error = %err, "completion failed");
        })?;

        let turn = Turn::assistant(completion.answer, store.now())
            .with_reasoning(completion.reasoning, completion.reasoning_elapsed_ms);
        if store.append_assistant_turn(&chat_id, turn) {
            Ok(Delivery::Appended(chat_id))
        } else {
            Ok(Delivery::ChatGone(chat_id))
        }
    }
}
