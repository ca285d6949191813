use edu_core::protocol::Notification;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;
use ratatui::widgets::Wrap;

use super::Palette;
use super::icon_glyph;

const CARD_WIDTH: u16 = 42;
const CARD_HEIGHT: u16 = 3;

/// Cards stacked in the top-right corner, oldest first.
pub(crate) struct NotificationStack<'a> {
    pub cards: &'a [Notification],
    pub palette: Palette,
}

impl WidgetRef for NotificationStack<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < CARD_HEIGHT {
            return;
        }
        let width = CARD_WIDTH.min(area.width);
        let x = area.right().saturating_sub(width);
        let mut y = area.y;
        for card in self.cards {
            if y + CARD_HEIGHT > area.bottom() {
                break;
            }
            let rect = Rect::new(x, y, width, CARD_HEIGHT);
            let style = self.palette.kind(card.kind);
            let line = Line::from(vec![
                Span::styled(format!("{} ", icon_glyph(card.kind.icon())), style),
                Span::styled(card.message.clone(), self.palette.base()),
            ]);
            Clear.render(rect, buf);
            Paragraph::new(line)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(style)
                        .title(format!(" #{} ", card.id)),
                )
                .render_ref(rect, buf);
            y += CARD_HEIGHT;
        }
    }
}
