use edu_core::protocol::InputId;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::WidgetRef;
use ratatui::widgets::Wrap;
use unicode_width::UnicodeWidthStr;

use crate::page::Page;
use crate::slash_command::built_in_slash_commands;
use crate::views::LoadingOverlayView;
use crate::views::NotificationStack;
use crate::views::Palette;
use crate::views::PromptView;
use crate::views::SearchPanelView;
use crate::views::icon_glyph;

pub(crate) const INACTIVITY_TITLE: &str = "Still there?";
pub(crate) const INACTIVITY_BODY: &str =
    "You have been inactive for a while. Stay signed in?";
pub(crate) const INACTIVITY_HINT: &str = "y stay signed in · n log out";

/// The whole terminal: title, search input, results, status line and the
/// floating layers on top.
pub(crate) struct Screen<'a> {
    pub page: &'a Page,
    pub input: &'a str,
    pub search_input: &'a InputId,
    pub user: Option<&'a str>,
}

impl Screen<'_> {
    /// Where the terminal cursor belongs: the end of the input text.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let [_, input, _, _] = Self::layout(area);
        let x = input.x + 1 + self.input.width() as u16;
        (x.min(input.right().saturating_sub(2)), input.y + 1)
    }

    fn layout(area: Rect) -> [Rect; 4] {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area)
    }

    fn title_line(&self, palette: Palette) -> Line<'static> {
        let theme = self.page.theme;
        let who = match self.user {
            Some(user) if self.page.signed_in => user.to_string(),
            _ => "signed out".to_string(),
        };
        Line::from(vec![
            Span::styled(
                "EduPlatform",
                palette.base().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", self.page.base_url.as_deref().unwrap_or("")),
                palette.base().fg(palette.dim),
            ),
            Span::styled(
                format!("  {} {theme}", icon_glyph(theme.toggle_icon())),
                palette.base(),
            ),
            Span::styled(format!("  {who}"), palette.base().fg(palette.dim)),
        ])
    }

    fn status_line(&self, palette: Palette) -> Line<'static> {
        let mut parts = Vec::new();
        if let Some((_, query)) = &self.page.searching {
            parts.push(format!("searching \"{query}\"..."));
        }
        if let Some(control) = self.page.busy_form() {
            parts.push(format!("{}: {}", control.form, control.label));
        }
        if let Some(location) = &self.page.location {
            parts.push(format!("→ {location}"));
        }
        parts.push("Esc clear/dismiss · Ctrl+C quit".to_string());
        Line::from(Span::styled(parts.join("  |  "), palette.base().fg(palette.dim)))
    }

    fn help_lines(palette: Palette) -> Vec<Line<'static>> {
        built_in_slash_commands()
            .into_iter()
            .map(|(name, command)| {
                Line::from(vec![
                    Span::styled(format!("/{name:<9}"), palette.base().fg(palette.accent)),
                    Span::styled(command.description(), palette.base().fg(palette.dim)),
                ])
            })
            .collect()
    }
}

impl WidgetRef for Screen<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_theme(self.page.theme);
        buf.set_style(area, palette.base());
        let [title, input, body, status] = Self::layout(area);

        Paragraph::new(self.title_line(palette)).render_ref(title, buf);
        Paragraph::new(self.input.to_string())
            .style(palette.base())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Search courses · / for commands "),
            )
            .render_ref(input, buf);

        let command_mode = self.input.starts_with('/');
        match self.page.panel(self.search_input) {
            Some(panel) if !command_mode => SearchPanelView { panel, palette }.render_ref(body, buf),
            _ => Paragraph::new(Self::help_lines(palette))
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(" Commands "))
                .render_ref(body, buf),
        }
        Paragraph::new(self.status_line(palette)).render_ref(status, buf);

        let floating = Rect::new(area.x, input.y, area.width, area.height.saturating_sub(1));
        NotificationStack {
            cards: self.page.cards.as_slice(),
            palette,
        }
        .render_ref(floating, buf);

        if let Some(message) = &self.page.overlay {
            LoadingOverlayView {
                message: message.as_str(),
                palette,
            }
            .render_ref(area, buf);
        }
        if self.page.inactivity_prompt {
            PromptView {
                title: INACTIVITY_TITLE,
                body: INACTIVITY_BODY,
                hint: INACTIVITY_HINT,
                palette,
            }
            .render_ref(area, buf);
        }
    }
}
