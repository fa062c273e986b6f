use tracing::debug;

use super::{App, UiMode};
use crate::core::chat::ChatId;
use crate::core::conversation::{CompletionOutcome, Delivery, SendError};
use crate::core::persistence::KeyValueStore;
use crate::core::settings::SETTING_KEYS;
use crate::utils::clipboard::copy_to_clipboard;

pub enum AppAction {
    SubmitInput,
    CompletionFinished(CompletionOutcome),
    NewChat,
    SelectPreviousChat,
    SelectNextChat,
    DeleteSelectedChat,
    StartRename,
    RenameInput { ch: char },
    RenameBackspace,
    CommitRename,
    CancelRename,
    EditPreviousUserTurn,
    CancelEdit,
    ToggleThinking,
    CopyTurn,
    StartSearch,
    SearchInput { ch: char },
    SearchBackspace,
    CommitSearch,
    ClearSearch,
    OpenSettings,
    CloseSettings,
    SettingsMoveUp,
    SettingsMoveDown,
    SettingsCycle { forward: bool },
    ToggleSidebar,
    ScrollUp { lines: u16, max_offset: u16 },
    ScrollDown { lines: u16, max_offset: u16 },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

impl<S: KeyValueStore> App<S> {
    pub fn apply_action(&mut self, action: AppAction) -> LoopControl {
        match action {
            AppAction::SubmitInput => self.submit_input(),
            AppAction::CompletionFinished(outcome) => self.finish_completion(outcome),
            AppAction::NewChat => {
                self.ui.search_query.clear();
                self.store.create_chat();
                self.ui.clear_input();
                self.ui.follow_bottom();
                self.ui.status = None;
            }
            AppAction::SelectPreviousChat => self.select_relative(-1),
            AppAction::SelectNextChat => self.select_relative(1),
            AppAction::DeleteSelectedChat => self.delete_selected(),
            AppAction::StartRename => self.start_rename(),
            AppAction::RenameInput { ch } => {
                if let UiMode::Rename { buffer, .. } = &mut self.ui.mode {
                    buffer.push(ch);
                }
            }
            AppAction::RenameBackspace => {
                if let UiMode::Rename { buffer, .. } = &mut self.ui.mode {
                    buffer.pop();
                }
            }
            AppAction::CommitRename => self.commit_rename(),
            AppAction::CancelRename => {
                if matches!(self.ui.mode, UiMode::Rename { .. }) {
                    self.ui.mode = UiMode::Normal;
                }
            }
            AppAction::EditPreviousUserTurn => self.edit_previous_user_turn(),
            AppAction::CancelEdit => {
                if self.store.cancel_edit() {
                    self.ui.clear_input();
                    self.ui.set_status("Edit cancelled");
                }
            }
            AppAction::ToggleThinking => self.ui.show_thinking = !self.ui.show_thinking,
            AppAction::CopyTurn => self.copy_turn(),
            AppAction::StartSearch => self.ui.mode = UiMode::Search,
            AppAction::SearchInput { ch } => {
                if self.ui.mode == UiMode::Search {
                    self.ui.search_query.push(ch);
                }
            }
            AppAction::SearchBackspace => {
                if self.ui.mode == UiMode::Search {
                    self.ui.search_query.pop();
                }
            }
            AppAction::CommitSearch => self.commit_search(),
            AppAction::ClearSearch => {
                self.ui.search_query.clear();
                if self.ui.mode == UiMode::Search {
                    self.ui.mode = UiMode::Normal;
                }
            }
            AppAction::OpenSettings => self.ui.mode = UiMode::Settings { selected: 0 },
            AppAction::CloseSettings => {
                if matches!(self.ui.mode, UiMode::Settings { .. }) {
                    self.ui.mode = UiMode::Normal;
                }
            }
            AppAction::SettingsMoveUp => {
                if let UiMode::Settings { selected } = &mut self.ui.mode {
                    *selected = selected.saturating_sub(1);
                }
            }
            AppAction::SettingsMoveDown => {
                if let UiMode::Settings { selected } = &mut self.ui.mode {
                    *selected = (*selected + 1).min(SETTING_KEYS.len() - 1);
                }
            }
            AppAction::SettingsCycle { forward } => self.cycle_setting(forward),
            AppAction::ToggleSidebar => self.ui.show_sidebar = !self.ui.show_sidebar,
            AppAction::ScrollUp { lines, max_offset } => self.ui.scroll_up(lines, max_offset),
            AppAction::ScrollDown { lines, max_offset } => self.ui.scroll_down(lines, max_offset),
            AppAction::Quit => return LoopControl::Quit,
        }
        LoopControl::Continue
    }

    fn submit_input(&mut self) {
        let text = self.ui.input_text();
        match self.conversation.send(&mut self.store, &text) {
            Ok(chat_id) => {
                debug!(chat = %chat_id, "user turn submitted");
                self.ui.clear_input();
                self.ui.follow_bottom();
                self.ui.status = None;
            }
            Err(SendError::EmptyInput) => {}
            Err(err @ SendError::Busy) => self.ui.set_status(err.to_string()),
        }
    }

    fn finish_completion(&mut self, outcome: CompletionOutcome) {
        match self.conversation.receive(&mut self.store, outcome) {
            Ok(Delivery::Appended(chat_id)) => {
                if self.store.selected_chat_id() == Some(&chat_id) {
                    self.ui.follow_bottom();
                }
            }
            Ok(Delivery::ChatGone(_)) => {
                self.ui.set_status("Answer discarded: its chat was deleted");
            }
            Ok(Delivery::Stale) => {}
            Err(err) => self.ui.set_status(err.to_string()),
        }
    }

    /// Moves within the chats the sidebar currently shows.
    fn select_relative(&mut self, step: isize) {
        let visible = self.store.search(&self.ui.search_query);
        if visible.is_empty() {
            return;
        }
        let current = self
            .store
            .selected_chat_id()
            .and_then(|id| visible.iter().position(|chat| &chat.id == id));
        let target = match current {
            Some(index) => index.saturating_add_signed(step).min(visible.len() - 1),
            None => 0,
        };
        let id = visible[target].id.clone();
        self.open_chat(&id);
    }

    fn open_chat(&mut self, id: &ChatId) {
        if self.store.selected_chat_id() != Some(id) {
            self.store.select_chat(id);
            self.ui.clear_input();
            self.ui.follow_bottom();
            self.ui.status = None;
        }
    }

    /// Leaves search mode with the filter kept. The first match is opened
    /// unless the selected chat is already among the matches.
    fn commit_search(&mut self) {
        if self.ui.mode != UiMode::Search {
            return;
        }
        self.ui.mode = UiMode::Normal;
        let visible = self.store.search(&self.ui.search_query);
        let Some(first) = visible.first().map(|chat| chat.id.clone()) else {
            let message = format!("No chats match '{}'", self.ui.search_query);
            self.ui.set_status(message);
            return;
        };
        let selected_visible = self
            .store
            .selected_chat_id()
            .is_some_and(|id| visible.iter().any(|chat| &chat.id == id));
        if !selected_visible {
            self.open_chat(&first);
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.store.selected_chat_id().cloned() else {
            return;
        };
        if self.store.delete_chat(&id) {
            self.ui.clear_input();
            self.ui.follow_bottom();
            self.ui.set_status("Chat deleted");
        }
    }

    fn start_rename(&mut self) {
        if let Some(chat) = self.store.selected_chat() {
            self.ui.mode = UiMode::Rename {
                chat_id: chat.id.clone(),
                buffer: chat.title.clone(),
            };
        }
    }

    fn commit_rename(&mut self) {
        let UiMode::Rename { chat_id, buffer } = &self.ui.mode else {
            return;
        };
        let title = buffer.trim().to_string();
        if title.is_empty() {
            return;
        }
        let chat_id: ChatId = chat_id.clone();
        self.store.rename_chat(&chat_id, title);
        self.ui.mode = UiMode::Normal;
    }

    /// Load the user turn before the one being edited (or the latest one)
    /// into the input.
    fn edit_previous_user_turn(&mut self) {
        if self.is_waiting() {
            self.ui.set_status(SendError::Busy.to_string());
            return;
        }
        let Some(chat) = self.store.selected_chat() else {
            return;
        };
        let indices = chat.user_turn_indices();
        let target = match self.store.pending_edit_index() {
            Some(current) => indices
                .iter()
                .rev()
                .find(|index| **index < current)
                .copied()
                .unwrap_or(current),
            None => match indices.last() {
                Some(last) => *last,
                None => return,
            },
        };
        let Some(content) = chat.turn(target).map(|turn| turn.content.clone()) else {
            return;
        };
        if self.store.begin_edit(target) {
            self.ui.set_input(&content);
            self.ui.set_status("Editing an earlier message. Enter resends, Esc cancels");
        }
    }

    /// Text Ctrl+Y copies and the status shown afterwards. While an edit is
    /// pending this is the answer to the message being edited, or the
    /// message itself when it has no answer; otherwise the last answer.
    pub fn copy_target(&self) -> Option<(String, &'static str)> {
        let chat = self.store.selected_chat()?;
        let Some(index) = self.store.pending_edit_index() else {
            return chat
                .last_assistant_turn()
                .map(|turn| (turn.content.clone(), "Copied the last answer"));
        };
        match chat.reply_to(index) {
            Some(reply) => Some((reply.content.clone(), "Copied the answer to this message")),
            None => chat
                .turn(index)
                .map(|turn| (turn.content.clone(), "Copied the message being edited")),
        }
    }

    fn copy_turn(&mut self) {
        let Some((text, done)) = self.copy_target() else {
            self.ui.set_status("Nothing to copy yet");
            return;
        };
        match copy_to_clipboard(&text) {
            Ok(()) => self.ui.set_status(done),
            Err(err) => self.ui.set_status(err.to_string()),
        }
    }

    fn cycle_setting(&mut self, forward: bool) {
        let UiMode::Settings { selected } = self.ui.mode else {
            return;
        };
        let Some(key) = SETTING_KEYS.get(selected).copied() else {
            return;
        };
        self.store.update_settings(|settings| match key {
            "theme" => settings.theme = settings.theme.toggled(),
            "font-size" => {
                settings.font_size = if forward {
                    settings.font_size.next()
                } else {
                    settings.font_size.previous()
                }
            }
            _ => settings.show_timestamps = !settings.show_timestamps,
        });
    }
}
