use ratatui::buffer::Buffer;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;
use ratatui::widgets::Wrap;
use unicode_width::UnicodeWidthStr;

use super::Palette;

/// Centered box of `width` x `height` inside `area`, clamped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Full-screen dim layer with a spinner box in the middle.
pub(crate) struct LoadingOverlayView<'a> {
    pub message: &'a str,
    pub palette: Palette,
}

impl WidgetRef for LoadingOverlayView<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, self.palette.base().add_modifier(Modifier::DIM));

        let text = format!("◐ {}", self.message);
        let width = (text.width() as u16).saturating_add(6).max(20);
        let rect = centered(area, width, 3);
        Clear.render(rect, buf);
        Paragraph::new(Line::from(text))
            .alignment(Alignment::Center)
            .style(self.palette.base())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.palette.base().fg(self.palette.accent)),
            )
            .render_ref(rect, buf);
    }
}

/// Modal question with a key hint line.
pub(crate) struct PromptView<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub hint: &'a str,
    pub palette: Palette,
}

impl WidgetRef for PromptView<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let rect = centered(area, 50, 6);
        if rect.width < 4 || rect.height < 3 {
            return;
        }
        Clear.render(rect, buf);
        let lines = vec![
            Line::from(self.body.to_string()),
            Line::from(""),
            Line::from(self.hint.to_string()).style(self.palette.base().fg(self.palette.dim)),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(self.palette.base())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title))
                    .border_style(self.palette.base().fg(self.palette.accent)),
            )
            .render_ref(rect, buf);
    }
}
