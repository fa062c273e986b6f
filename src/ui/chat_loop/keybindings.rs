//! Mode-aware mapping from key presses to [`AppAction`]s.
//!
//! Keys that no binding claims fall through to the input textarea, unless a
//! completion is pending, in which case the input is frozen.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::{App, AppAction, UiMode};
use crate::core::persistence::KeyValueStore;

pub enum KeyResult {
    Action(AppAction),
    InsertNewline,
    /// Forward the key to the textarea.
    EditInput,
    Ignored,
}

/// Viewport numbers needed to turn page keys into scroll actions.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub max_offset: u16,
    pub page: u16,
}

pub fn resolve_key<S: KeyValueStore>(app: &App<S>, key: KeyEvent, ctx: KeyContext) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && key.code == KeyCode::Char('c') {
        return KeyResult::Action(AppAction::Quit);
    }

    match app.ui.mode {
        UiMode::Settings { .. } => resolve_settings_key(key, ctrl),
        UiMode::Rename { .. } => resolve_rename_key(key, ctrl),
        UiMode::Search => resolve_search_key(key, ctrl),
        UiMode::Normal => resolve_normal_key(app, key, ctrl, alt, ctx),
    }
}

fn resolve_settings_key(key: KeyEvent, ctrl: bool) -> KeyResult {
    let action = match key.code {
        KeyCode::Esc => AppAction::CloseSettings,
        KeyCode::Char('s') if ctrl => AppAction::CloseSettings,
        KeyCode::Up => AppAction::SettingsMoveUp,
        KeyCode::Down => AppAction::SettingsMoveDown,
        KeyCode::Left => AppAction::SettingsCycle { forward: false },
        KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => {
            AppAction::SettingsCycle { forward: true }
        }
        _ => return KeyResult::Ignored,
    };
    KeyResult::Action(action)
}

fn resolve_rename_key(key: KeyEvent, ctrl: bool) -> KeyResult {
    let action = match key.code {
        KeyCode::Enter => AppAction::CommitRename,
        KeyCode::Esc => AppAction::CancelRename,
        KeyCode::Backspace => AppAction::RenameBackspace,
        KeyCode::Char(ch) if !ctrl => AppAction::RenameInput { ch },
        _ => return KeyResult::Ignored,
    };
    KeyResult::Action(action)
}

fn resolve_search_key(key: KeyEvent, ctrl: bool) -> KeyResult {
    let action = match key.code {
        KeyCode::Enter => AppAction::CommitSearch,
        KeyCode::Esc => AppAction::ClearSearch,
        KeyCode::Backspace => AppAction::SearchBackspace,
        KeyCode::Up => AppAction::SelectPreviousChat,
        KeyCode::Down => AppAction::SelectNextChat,
        KeyCode::Char(ch) if !ctrl => AppAction::SearchInput { ch },
        _ => return KeyResult::Ignored,
    };
    KeyResult::Action(action)
}

fn resolve_normal_key<S: KeyValueStore>(
    app: &App<S>,
    key: KeyEvent,
    ctrl: bool,
    alt: bool,
    ctx: KeyContext,
) -> KeyResult {
    let action = match key.code {
        KeyCode::Enter if alt => {
            return if app.is_waiting() {
                KeyResult::Ignored
            } else {
                KeyResult::InsertNewline
            };
        }
        KeyCode::Enter => AppAction::SubmitInput,
        KeyCode::Up if alt => AppAction::SelectPreviousChat,
        KeyCode::Down if alt => AppAction::SelectNextChat,
        KeyCode::PageUp => AppAction::ScrollUp {
            lines: ctx.page,
            max_offset: ctx.max_offset,
        },
        KeyCode::PageDown => AppAction::ScrollDown {
            lines: ctx.page,
            max_offset: ctx.max_offset,
        },
        KeyCode::Esc => AppAction::CancelEdit,
        KeyCode::Char(ch) if ctrl => match ch {
            'n' => AppAction::NewChat,
            'd' => AppAction::DeleteSelectedChat,
            'r' => AppAction::StartRename,
            'e' => AppAction::EditPreviousUserTurn,
            'o' => AppAction::ToggleThinking,
            'y' => AppAction::CopyTurn,
            'f' => AppAction::StartSearch,
            's' => AppAction::OpenSettings,
            'b' => AppAction::ToggleSidebar,
            _ => return input_fallthrough(app),
        },
        _ => return input_fallthrough(app),
    };
    KeyResult::Action(action)
}

fn input_fallthrough<S: KeyValueStore>(app: &App<S>) -> KeyResult {
    if app.is_waiting() {
        KeyResult::Ignored
    } else {
        KeyResult::EditInput
    }
}
