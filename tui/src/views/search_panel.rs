use edu_core::protocol::ResultsPanel;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::WidgetRef;

use super::Palette;

pub(crate) const NO_RESULTS_TEXT: &str = "No results found";

/// Dropdown of results anchored below the search input.
pub(crate) struct SearchPanelView<'a> {
    pub panel: &'a ResultsPanel,
    pub palette: Palette,
}

impl SearchPanelView<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        match self.panel {
            ResultsPanel::NoResults => vec![Line::from(Span::styled(
                NO_RESULTS_TEXT,
                self.palette.base().fg(self.palette.dim),
            ))],
            ResultsPanel::Results(results) => {
                let mut lines = Vec::with_capacity(results.len() * 2);
                for result in results {
                    lines.push(Line::from(vec![
                        Span::styled(
                            result.title.clone(),
                            self.palette.base().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", result.url),
                            self.palette.base().fg(self.palette.accent),
                        ),
                    ]));
                    if !result.description.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("  {}", result.description),
                            self.palette.base().fg(self.palette.dim),
                        )));
                    }
                }
                lines
            }
        }
    }
}

impl WidgetRef for SearchPanelView<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 {
            return;
        }
        Paragraph::new(self.lines())
            .style(self.palette.base())
            .block(Block::default().borders(Borders::ALL).title(" Results "))
            .render_ref(area, buf);
    }
}
