use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::clamp_height;
use crate::theme::THEME;

/// Internal error presentation, used when failures are not delegated.
pub struct ErrorPanel {
    pub height: u16,
}

impl ErrorPanel {
    pub fn new(height: u16) -> Self {
        Self { height }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, message: &str) {
        let area = clamp_height(area, self.height);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(THEME.error_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(2), Constraint::Fill(1)])
            .split(inner);

        let lines = vec![
            Line::from(Span::styled(
                message,
                THEME.error_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Press a to try another address",
                THEME.muted_style(),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            vertical[1],
        );
    }
}
