use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::clamp_height;
use crate::theme::THEME;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Placeholder shown while a connection is being acquired.
pub struct Loader {
    pub height: u16,
    frame_index: usize,
}

impl Loader {
    pub fn new(height: u16) -> Self {
        Self {
            height,
            frame_index: 0,
        }
    }

    /// Advance the spinner by one frame.
    pub fn tick(&mut self) {
        self.frame_index = (self.frame_index + 1) % SPINNER.len();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = clamp_height(area, self.height);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(THEME.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(1)])
            .split(inner);

        let text = Line::from(vec![
            Span::styled(SPINNER[self.frame_index], THEME.accent_style()),
            Span::styled(" Connecting to contract...", THEME.muted_style()),
        ]);
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center),
            vertical[1],
        );
    }
}
