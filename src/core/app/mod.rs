//! Interactive application state.
//!
//! [`App`] bundles the [`SessionStore`], the [`Conversation`] that carries
//! requests to the completion service, and the transient [`UiState`] the
//! renderer reads. Key handling in [`crate::ui::chat_loop`] translates
//! terminal input into [`AppAction`]s applied here, so everything below the
//! terminal is testable without one.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::completion::CompletionClient;
use crate::core::conversation::{CompletionOutcome, Conversation};
use crate::core::persistence::KeyValueStore;
use crate::core::session::SessionStore;

pub mod actions;
pub mod bootstrap;
pub mod ui_state;


pub use actions::{AppAction, LoopControl};
pub use bootstrap::CliOverrides;
pub use ui_state::{UiMode, UiState};

pub struct App<S: KeyValueStore> {
    pub store: SessionStore<S>,
    pub conversation: Conversation,
    pub ui: UiState,
    /// Shown in the title bar.
    pub model: String,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(
        store: SessionStore<S>,
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<CompletionOutcome>) {
        let (conversation, rx) = Conversation::new(client);
        let app = Self {
            store,
            conversation,
            ui: UiState::new(),
            model: model.into(),
        };
        (app, rx)
    }

    pub fn is_waiting(&self) -> bool {
        self.conversation.is_waiting()
    }

    /// Whether the pending request belongs to the chat on screen.
    pub fn is_waiting_on_selected(&self) -> bool {
        match (self.conversation.waiting_chat(), self.store.selected_chat_id()) {
            (Some(waiting), Some(selected)) => waiting == selected,
            _ => false,
        }
    }

    /// Welcome screen shows when nothing is selected or the chat is empty.
    pub fn shows_welcome(&self) -> bool {
        self.store.selected_chat().is_none_or(|chat| chat.is_empty())
    }
}
