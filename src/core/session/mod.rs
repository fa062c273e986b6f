//! In-memory owner of every chat, the current selection, and pending edits.
//!
//! All mutations go through [`SessionStore`]. Each one finishes by checking
//! that the selection still names an existing chat and that a pending edit
//! still addresses a user turn of the selected chat, then flushes the chat
//! list through the injected [`Persistence`] adapter.
//!
//! Operations that reference an unknown chat or an out-of-range turn are
//! no-ops and report `false` instead of failing.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::ChatMessage;
use crate::core::chat::{derive_title, Chat, ChatId, DEFAULT_CHAT_TITLE};
use crate::core::clock::{Clock, SystemClock};
use crate::core::message::Turn;
use crate::core::persistence::{KeyValueStore, Persistence};
use crate::core::settings::Settings;
use crate::core::stats::ChatStats;

/// History handed to the completion client after a user turn is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingTurns {
    pub chat_id: ChatId,
    pub messages: Vec<ChatMessage>,
}

pub struct SessionStore<S: KeyValueStore> {
    chats: Vec<Chat>,
    selected: Option<ChatId>,
    pending_edit: Option<usize>,
    settings: Settings,
    persistence: Persistence<S>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Load chats and settings from `persistence`. Nothing is selected.
    pub fn open(persistence: Persistence<S>) -> Self {
        Self::open_with_clock(persistence, Box::new(SystemClock))
    }

    pub fn open_with_clock(persistence: Persistence<S>, clock: Box<dyn Clock>) -> Self {
        let chats = persistence.load_chats();
        let settings = persistence.load_settings();
        debug!(chats = chats.len(), "session store opened");
        Self {
            chats,
            selected: None,
            pending_edit: None,
            settings,
            persistence,
            clock,
        }
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Chats, most recently created first.
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    /// Chats matching `query` by title or content, in sidebar order.
    pub fn search(&self, query: &str) -> Vec<&Chat> {
        self.chats.iter().filter(|chat| chat.matches(query)).collect()
    }

    pub fn chat(&self, id: &ChatId) -> Option<&Chat> {
        self.chats.iter().find(|chat| &chat.id == id)
    }

    pub fn selected_chat_id(&self) -> Option<&ChatId> {
        self.selected_chat().map(|chat| &chat.id)
    }

    /// The selected chat, looked up by id on every call.
    pub fn selected_chat(&self) -> Option<&Chat> {
        self.selected.as_ref().and_then(|id| self.chat(id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_ref()?;
        self.chats.iter().position(|chat| &chat.id == id)
    }

    pub fn pending_edit_index(&self) -> Option<usize> {
        self.pending_edit
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> ChatStats {
        ChatStats::collect(&self.chats)
    }

    pub fn create_chat(&mut self) -> &Chat {
        let now = self.clock.now();
        let id = self.allocate_id(now);
        self.chats
            .insert(0, Chat::new(id.clone(), DEFAULT_CHAT_TITLE, now));
        self.selected = Some(id.clone());
        self.pending_edit = None;
        debug!(chat = %id, "created chat");
        self.commit();
        &self.chats[0]
    }

    /// Select `id`. Unknown ids are ignored and leave the selection as is.
    pub fn select_chat(&mut self, id: &ChatId) -> bool {
        if self.chat(id).is_none() {
            debug!(chat = %id, "ignoring selection of unknown chat");
            return false;
        }
        if self.selected.as_ref() != Some(id) {
            self.pending_edit = None;
        }
        self.selected = Some(id.clone());
        self.commit();
        true
    }

    pub fn delete_chat(&mut self, id: &ChatId) -> bool {
        let Some(position) = self.chats.iter().position(|chat| &chat.id == id) else {
            return false;
        };
        self.chats.remove(position);
        if self.selected.as_ref() == Some(id) {
            self.selected = self.chats.first().map(|chat| chat.id.clone());
            self.pending_edit = None;
        }
        debug!(chat = %id, "deleted chat");
        self.commit();
        true
    }

    /// Set a chat's title. The title is stored as given.
    pub fn rename_chat(&mut self, id: &ChatId, title: impl Into<String>) -> bool {
        let Some(chat) = self.chat_mut(id) else {
            return false;
        };
        chat.title = title.into();
        self.commit();
        true
    }

    /// Mark the user turn at `index` of the selected chat for replacement by
    /// the next [`send_user_turn`](Self::send_user_turn).
    pub fn begin_edit(&mut self, index: usize) -> bool {
        let editable = self
            .selected_chat()
            .and_then(|chat| chat.turn(index))
            .is_some_and(Turn::is_user);
        if !editable {
            return false;
        }
        self.pending_edit = Some(index);
        self.commit();
        true
    }

    pub fn cancel_edit(&mut self) -> bool {
        if self.pending_edit.take().is_none() {
            return false;
        }
        self.commit();
        true
    }

    /// Record a user turn in the selected chat, creating a chat when none is
    /// selected. A pending edit first discards the edited turn and everything
    /// after it.
    pub fn send_user_turn(&mut self, content: impl Into<String>) -> OutgoingTurns {
        let content = content.into();
        let now = self.clock.now();

        let position = match self.selected_index() {
            Some(position) => position,
            None => {
                let id = self.allocate_id(now);
                debug!(chat = %id, "created chat for first message");
                self.chats
                    .insert(0, Chat::new(id.clone(), derive_title(&content), now));
                self.selected = Some(id);
                0
            }
        };

        let pending_edit = self.pending_edit.take();
        let chat = &mut self.chats[position];
        if let Some(index) = pending_edit {
            debug!(chat = %chat.id, index, "truncating history for edited turn");
            chat.turns.truncate(index);
        }
        chat.turns.push(Turn::user(content, now));
        chat.last_updated = now;
        let outgoing = OutgoingTurns {
            chat_id: chat.id.clone(),
            messages: chat.api_messages(),
        };

        self.commit();
        outgoing
    }

    /// Append an assistant reply to `chat_id`. Replies for chats deleted
    /// while the request was in flight are dropped.
    pub fn append_assistant_turn(&mut self, chat_id: &ChatId, turn: Turn) -> bool {
        if !turn.is_assistant() {
            warn!(chat = %chat_id, "refusing to append a non-assistant turn");
            return false;
        }
        let now = self.clock.now();
        let Some(chat) = self.chat_mut(chat_id) else {
            debug!(chat = %chat_id, "dropping reply for deleted chat");
            return false;
        };
        chat.turns.push(turn);
        chat.last_updated = now;
        self.commit();
        true
    }

    /// Mutate settings and persist them right away.
    pub fn update_settings(&mut self, apply: impl FnOnce(&mut Settings)) {
        apply(&mut self.settings);
        self.persistence.save_settings(&self.settings);
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn chat_mut(&mut self, id: &ChatId) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| &chat.id == id)
    }

    /// Millisecond creation time, bumped until it is unused.
    fn allocate_id(&self, now: DateTime<Utc>) -> ChatId {
        let mut candidate = now.timestamp_millis();
        loop {
            let id = ChatId::new(candidate.to_string());
            if self.chat(&id).is_none() {
                return id;
            }
            candidate += 1;
        }
    }

    fn commit(&mut self) {
        self.enforce_invariants();
        self.persistence.save_chats(&self.chats);
    }

    fn enforce_invariants(&mut self) {
        if let Some(id) = &self.selected {
            if self.chat(id).is_none() {
                debug_assert!(false, "selection points at missing chat {id}");
                self.selected = self.chats.first().map(|chat| chat.id.clone());
                self.pending_edit = None;
            }
        }

        if let Some(index) = self.pending_edit {
            let valid = self
                .selected_chat()
                .and_then(|chat| chat.turn(index))
                .is_some_and(Turn::is_user);
            if !valid {
                debug_assert!(false, "pending edit {index} is out of bounds");
                self.pending_edit = None;
            }
        }
    }
}
