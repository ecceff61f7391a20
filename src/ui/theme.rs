//! Color theme and styling definitions using ratatui colors

use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone)]
pub struct ColorTheme {
    /// Border of the focused pane
    pub focused_border: Style,

    /// Border of unfocused panes
    pub border: Style,

    /// Cursor row in lists
    pub selection: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,

    /// Status text for transient failures (network, decode)
    pub warning_text: Color,

    /// Status text for failures that need attention (authentication)
    pub error_text: Color,

    /// Marker for the stream currently being searched
    pub active_stream: Style,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            focused_border: Style::default().fg(Color::Green),
            border: Style::default().fg(Color::DarkGray),
            selection: Style::default().fg(Color::Black).bg(Color::Green),
            status_bg: Color::Blue,
            status_fg: Color::White,
            warning_text: Color::Yellow,
            error_text: Color::Red,
            active_stream: Style::default().add_modifier(Modifier::BOLD),
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            focused_border: Style::default().add_modifier(Modifier::BOLD),
            border: Style::default(),
            selection: Style::default().add_modifier(Modifier::REVERSED),
            status_bg: Color::Black,
            status_fg: Color::White,
            warning_text: Color::White,
            error_text: Color::White,
            active_stream: Style::default().add_modifier(Modifier::BOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.status_fg, Color::White);
        assert_eq!(theme.status_bg, Color::Blue);
        assert_eq!(theme.selection.bg, Some(Color::Green));
        assert_eq!(theme.error_text, Color::Red);
    }

    #[test]
    fn test_monochrome_theme() {
        let theme = ColorTheme::monochrome();
        assert_eq!(theme.status_bg, Color::Black);
        assert_eq!(theme.selection.fg, None);
        assert!(theme.selection.add_modifier.contains(Modifier::REVERSED));
    }
}
