use std::time::Instant;

use ratatui::style::{Modifier, Style};
use tui_textarea::TextArea;

use crate::core::chat::ChatId;

pub const INPUT_PLACEHOLDER: &str = "Ask anything…";

/// Which surface currently receives keystrokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    Rename { chat_id: ChatId, buffer: String },
    Settings { selected: usize },
    /// Typing edits [`UiState::search_query`].
    Search,
}

pub struct UiState {
    pub textarea: TextArea<'static>,
    pub mode: UiMode,
    pub scroll_offset: u16,
    /// Follow the bottom of the transcript until the user scrolls up.
    pub auto_scroll: bool,
    pub show_thinking: bool,
    pub show_sidebar: bool,
    pub status: Option<String>,
    pub pulse_start: Instant,
    /// Sidebar filter; empty shows every chat.
    pub search_query: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            textarea: new_textarea(),
            mode: UiMode::Normal,
            scroll_offset: 0,
            auto_scroll: true,
            show_thinking: false,
            show_sidebar: true,
            status: None,
            pulse_start: Instant::now(),
            search_query: String::new(),
        }
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.textarea = new_textarea();
    }

    pub fn set_input(&mut self, text: &str) {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let mut textarea = TextArea::new(lines);
        style_textarea(&mut textarea);
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        self.textarea = textarea;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// While following the bottom the stored offset is stale, so scrolling
    /// up starts from `max_offset`.
    pub fn scroll_up(&mut self, lines: u16, max_offset: u16) {
        if self.auto_scroll {
            self.scroll_offset = max_offset;
        }
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.min(max_offset).saturating_sub(lines);
    }

    /// Scrolling past `max_offset` re-enables following the bottom.
    pub fn scroll_down(&mut self, lines: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max_offset);
        if self.scroll_offset >= max_offset {
            self.auto_scroll = true;
        }
    }

    pub fn follow_bottom(&mut self) {
        self.auto_scroll = true;
    }

    pub fn input_line_count(&self) -> u16 {
        u16::try_from(self.textarea.lines().len()).unwrap_or(u16::MAX)
    }
}

fn new_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    style_textarea(&mut textarea);
    textarea
}

fn style_textarea(textarea: &mut TextArea<'static>) {
    textarea.set_cursor_line_style(Style::default());
    textarea.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
    textarea.set_placeholder_text(INPUT_PLACEHOLDER);
}
