use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::{App, UiMode};
use crate::core::message::Turn;
use crate::core::persistence::KeyValueStore;
use crate::core::settings::{Settings, SETTING_KEYS};
use crate::ui::theme::{pads_headers, turn_spacing, Theme};
use crate::ui::wrap::wrap_lines;

pub const THINKING_INDICATOR: &str = "Assistant is thinking…";
const SIDEBAR_WIDTH: u16 = 28;
/// Below this width the sidebar is hidden regardless of the toggle.
const SIDEBAR_MIN_TERMINAL_WIDTH: u16 = 60;
const MAX_INPUT_LINES: u16 = 6;
const DEFAULT_HINT: &str =
    "Enter send · Alt+Enter newline · Ctrl+N new · Ctrl+E edit · Ctrl+S settings · Ctrl+C quit";

struct Areas {
    title: Rect,
    sidebar: Option<Rect>,
    transcript: Rect,
    status: Rect,
    input: Rect,
}

fn split_areas<S: KeyValueStore>(area: Rect, app: &App<S>) -> Areas {
    let (sidebar, main) = if app.ui.show_sidebar && area.width >= SIDEBAR_MIN_TERMINAL_WIDTH {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);
        (Some(columns[0]), columns[1])
    } else {
        (None, area)
    };

    let input_height = app.ui.input_line_count().clamp(1, MAX_INPUT_LINES) + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(input_height),
        ])
        .split(main);

    Areas {
        title: rows[0],
        sidebar,
        transcript: rows[1],
        status: rows[2],
        input: rows[3],
    }
}

pub fn ui<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let settings = app.store.settings();
    let theme = Theme::for_setting(settings.theme);
    let areas = split_areas(f.area(), app);

    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );

    let title = format!("Ponder v{} · {}", env!("CARGO_PKG_VERSION"), app.model);
    f.render_widget(Paragraph::new(title).style(theme.title_style), areas.title);

    if let Some(sidebar) = areas.sidebar {
        render_sidebar(f, app, &theme, sidebar);
    }

    let lines = wrap_lines(&build_display_lines(app, &theme), areas.transcript.width);
    let max_offset = max_offset_for(&lines, areas.transcript);
    let scroll = if app.ui.auto_scroll {
        max_offset
    } else {
        app.ui.scroll_offset.min(max_offset)
    };
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), areas.transcript);

    f.render_widget(
        Paragraph::new(status_line(app)).style(theme.status_style),
        areas.status,
    );

    render_input(f, app, &theme, areas.input);

    if let UiMode::Settings { selected } = app.ui.mode {
        render_settings_overlay(f, settings, selected, &theme);
    }
}

/// Largest useful transcript scroll offset for a terminal of `area`.
pub fn max_scroll_offset<S: KeyValueStore>(app: &App<S>, area: Rect) -> u16 {
    let areas = split_areas(area, app);
    let theme = Theme::for_setting(app.store.settings().theme);
    let lines = wrap_lines(&build_display_lines(app, &theme), areas.transcript.width);
    max_offset_for(&lines, areas.transcript)
}

/// Height of the transcript viewport, used for page scrolling.
pub fn transcript_height<S: KeyValueStore>(app: &App<S>, area: Rect) -> u16 {
    split_areas(area, app).transcript.height
}

/// `lines` must already be wrapped to the area's width.
fn max_offset_for(lines: &[Line<'_>], area: Rect) -> u16 {
    u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_sub(area.height)
}

pub fn build_display_lines<S: KeyValueStore>(app: &App<S>, theme: &Theme) -> Vec<Line<'static>> {
    let settings = app.store.settings();
    let mut lines = Vec::new();

    match app.store.selected_chat() {
        Some(chat) if !chat.is_empty() => {
            for turn in &chat.turns {
                push_turn(&mut lines, turn, settings, app.ui.show_thinking, theme);
            }
        }
        _ => push_welcome(&mut lines, app, theme),
    }

    if app.is_waiting_on_selected() {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", pulse_symbol(app)), theme.thinking_indicator_style),
            Span::styled(THINKING_INDICATOR, theme.thinking_indicator_style),
        ]));
    }
    lines
}

fn push_turn(
    lines: &mut Vec<Line<'static>>,
    turn: &Turn,
    settings: &Settings,
    show_thinking: bool,
    theme: &Theme,
) {
    let (prefix_style, text_style) = if turn.is_user() {
        (theme.user_prefix_style, theme.user_text_style)
    } else {
        (theme.assistant_prefix_style, theme.assistant_text_style)
    };

    let mut header = vec![Span::styled(turn.role.display_name(), prefix_style)];
    if settings.show_timestamps {
        let local = turn.created_at.with_timezone(&Local);
        header.push(Span::styled(
            format!("  {}", local.format("%H:%M")),
            theme.timestamp_style,
        ));
    }
    lines.push(Line::from(header));
    if pads_headers(settings.font_size) {
        lines.push(Line::from(""));
    }

    if let Some(reasoning) = turn.reasoning() {
        let elapsed = turn.reasoning_elapsed_ms.unwrap_or_default();
        if show_thinking {
            lines.push(Line::from(Span::styled(
                format!("▾ Thinking ({elapsed} ms)"),
                theme.thinking_header_style,
            )));
            for text in reasoning.lines() {
                lines.push(Line::from(Span::styled(
                    format!("│ {text}"),
                    theme.thinking_text_style,
                )));
            }
        } else {
            lines.push(Line::from(Span::styled(
                format!("▸ Thinking ({elapsed} ms) · Ctrl+O to show"),
                theme.thinking_header_style,
            )));
        }
    }

    for text in turn.content.lines() {
        lines.push(Line::from(Span::styled(text.to_string(), text_style)));
    }
    for _ in 0..turn_spacing(settings.font_size) {
        lines.push(Line::from(""));
    }
}

fn push_welcome<S: KeyValueStore>(lines: &mut Vec<Line<'static>>, app: &App<S>, theme: &Theme) {
    let stats = app.store.stats();
    lines.push(Line::from(Span::styled(
        "Welcome to Ponder",
        theme.assistant_prefix_style,
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Chats: {}", stats.total_chats),
        theme.assistant_text_style,
    )));
    lines.push(Line::from(Span::styled(
        format!("Messages: {}", stats.total_messages),
        theme.assistant_text_style,
    )));
    lines.push(Line::from(Span::styled(
        format!("Average response: {} ms", stats.average_response_time_ms),
        theme.assistant_text_style,
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Type a message and press Enter to start.",
        theme.system_text_style,
    )));
}

fn pulse_symbol<S: KeyValueStore>(app: &App<S>) -> &'static str {
    match (app.ui.pulse_start.elapsed().as_millis() / 333) % 3 {
        0 => "○",
        1 => "◐",
        _ => "●",
    }
}

fn render_sidebar<S: KeyValueStore>(f: &mut Frame, app: &App<S>, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(theme.border_style)
        .title("Chats");
    let mut inner = block.inner(area);
    f.render_widget(block, area);

    let width = usize::from(inner.width);
    let query = &app.ui.search_query;
    let searching = app.ui.mode == UiMode::Search;
    if searching || !query.is_empty() {
        let cursor = if searching { "▏" } else { "" };
        let label = truncate_to_width(&format!("/ {query}{cursor}"), width);
        let search_row = Rect { height: 1.min(inner.height), ..inner };
        f.render_widget(
            Paragraph::new(Span::styled(label, theme.system_text_style)),
            search_row,
        );
        inner.y += search_row.height;
        inner.height -= search_row.height;
    }

    let chats = app.store.search(query);
    if chats.is_empty() && !query.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No matches", theme.system_text_style)),
            inner,
        );
        return;
    }

    let waiting = app.conversation.waiting_chat();
    let selected_id = app.store.selected_chat_id();
    let selected = selected_id.and_then(|id| chats.iter().position(|chat| &chat.id == id));
    let visible = usize::from(inner.height.max(1));
    let skip = selected.map_or(0, |index| (index + 1).saturating_sub(visible));

    let lines: Vec<Line> = chats
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(index, chat)| {
            let marker = if waiting == Some(&chat.id) { "● " } else { "  " };
            let label = truncate_to_width(&format!("{marker}{}", chat.title), width);
            let style = if selected == Some(index) {
                theme.sidebar_selected_style
            } else {
                theme.sidebar_style
            };
            Line::from(Span::styled(label, style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn status_line<S: KeyValueStore>(app: &App<S>) -> String {
    match &app.ui.mode {
        UiMode::Rename { buffer, .. } => {
            return format!("Rename: {buffer}▏  (Enter save, Esc cancel)");
        }
        UiMode::Search => {
            return format!(
                "Search: {}▏  (↑/↓ choose, Enter keep, Esc clear)",
                app.ui.search_query
            );
        }
        _ => {}
    }
    if let Some(status) = &app.ui.status {
        return status.clone();
    }
    if app.store.pending_edit_index().is_some() {
        return "Editing an earlier message. Enter resends, Esc cancels".to_string();
    }
    DEFAULT_HINT.to_string()
}

fn render_input<S: KeyValueStore>(f: &mut Frame, app: &App<S>, theme: &Theme, area: Rect) {
    let title = if app.is_waiting() {
        THINKING_INDICATOR
    } else if app.store.pending_edit_index().is_some() {
        "Edit message"
    } else {
        "Message"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(Span::styled(title, theme.title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(&app.ui.textarea, inner);
}

fn render_settings_overlay(f: &mut Frame, settings: &Settings, selected: usize, theme: &Theme) {
    let area = centered_rect(44, SETTING_KEYS.len() as u16 + 4, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .style(Style::default().bg(theme.background_color))
        .title("Settings");

    let mut lines: Vec<Line> = settings
        .describe()
        .into_iter()
        .enumerate()
        .map(|(index, (key, value))| {
            let style = if index == selected {
                theme.overlay_selected_style
            } else {
                theme.assistant_text_style
            };
            Line::from(Span::styled(format!(" {key:<16} {value}"), style))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ↑/↓ choose · ←/→ change · Esc close",
        theme.system_text_style,
    )));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
