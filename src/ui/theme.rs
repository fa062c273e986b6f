use ratatui::style::{Color, Modifier, Style};

use crate::core::settings::{self, FontSize};

#[derive(Debug, Clone)]
pub struct Theme {
    pub background_color: Color,
    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub timestamp_style: Style,
    pub thinking_header_style: Style,
    pub thinking_text_style: Style,
    pub system_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub sidebar_style: Style,
    pub sidebar_selected_style: Style,
    pub status_style: Style,
    pub thinking_indicator_style: Style,
    pub input_text_style: Style,
    pub overlay_selected_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Rgb(0x16, 0x18, 0x1d),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            timestamp_style: Style::default().fg(Color::DarkGray),
            thinking_header_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            thinking_text_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            system_text_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            border_style: Style::default().fg(Color::DarkGray),
            sidebar_style: Style::default().fg(Color::Gray),
            sidebar_selected_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(Color::Yellow),
            thinking_indicator_style: Style::default().fg(Color::Magenta),
            input_text_style: Style::default().fg(Color::White),
            overlay_selected_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Rgb(0xfa, 0xfa, 0xf7),
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            timestamp_style: Style::default().fg(Color::Gray),
            thinking_header_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            thinking_text_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            system_text_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::DarkGray),
            border_style: Style::default().fg(Color::Gray),
            sidebar_style: Style::default().fg(Color::DarkGray),
            sidebar_selected_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(Color::Red),
            thinking_indicator_style: Style::default().fg(Color::Magenta),
            input_text_style: Style::default().fg(Color::Black),
            overlay_selected_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    pub fn for_setting(theme: settings::Theme) -> Self {
        match theme {
            settings::Theme::Dark => Self::dark_default(),
            settings::Theme::Light => Self::light(),
        }
    }
}

/// Blank lines between transcript turns. A terminal cannot change glyph
/// size, so the font-size setting controls density instead.
pub fn turn_spacing(font_size: FontSize) -> usize {
    match font_size {
        FontSize::Small => 0,
        FontSize::Medium | FontSize::Large => 1,
    }
}

/// Large text also pads each speaker header with a blank line.
pub fn pads_headers(font_size: FontSize) -> bool {
    font_size == FontSize::Large
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_selects_palette() {
        assert_eq!(
            Theme::for_setting(settings::Theme::Light).background_color,
            Theme::light().background_color
        );
        assert_eq!(
            Theme::for_setting(settings::Theme::Dark).background_color,
            Theme::dark_default().background_color
        );
    }

    #[test]
    fn font_size_controls_density() {
        assert_eq!(turn_spacing(FontSize::Small), 0);
        assert_eq!(turn_spacing(FontSize::Medium), 1);
        assert!(pads_headers(FontSize::Large));
        assert!(!pads_headers(FontSize::Medium));
    }
}
