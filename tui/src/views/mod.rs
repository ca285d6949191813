//! Widgets that draw the page surface.

mod loading_overlay;
mod notification_stack;
mod search_panel;

pub(crate) use loading_overlay::LoadingOverlayView;
pub(crate) use loading_overlay::PromptView;
pub(crate) use notification_stack::NotificationStack;
pub(crate) use search_panel::SearchPanelView;

use edu_core::protocol::NotificationKind;
use edu_core::protocol::Theme;
use ratatui::style::Color;
use ratatui::style::Style;

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub dim: Color,
    pub accent: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                fg: Color::Black,
                bg: Color::White,
                dim: Color::DarkGray,
                accent: Color::Blue,
            },
            Theme::Dark => Palette {
                fg: Color::White,
                bg: Color::Black,
                dim: Color::Gray,
                accent: Color::Cyan,
            },
        }
    }

    pub fn base(self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn kind(self, kind: NotificationKind) -> Style {
        let color = match kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Danger => Color::Red,
            NotificationKind::Warning => Color::Yellow,
            NotificationKind::Info => self.accent,
        };
        self.base().fg(color)
    }
}

/// Glyph drawn for a named icon.
pub(crate) fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "check-circle" => "✔",
        "exclamation-triangle" => "⚠",
        "info-circle" => "ℹ",
        "moon" => "☾",
        "sun" => "☀",
        _ => "•",
    }
}

/// Rows of `buf` as plain strings.
#[cfg(test)]
pub(crate) fn buffer_lines(buf: &ratatui::buffer::Buffer) -> Vec<String> {
    let width = buf.area.width as usize;
    buf.content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}
