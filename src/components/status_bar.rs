use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::data::provider::parse_address;
use crate::theme::THEME;
use crate::utils;

pub struct StatusBar {
    pub address: String,
    pub state_label: &'static str,
    /// Failure text delegated to the host instead of the error panel.
    pub error_message: Option<String>,
    pub loaded_at: Option<String>,
}

impl StatusBar {
    pub fn new(address: String) -> Self {
        Self {
            address,
            state_label: "loading",
            error_message: None,
            loaded_at: None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(64)])
            .split(area);

        // --- Left side: delegated error or key hints ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else {
            Line::from(vec![
                Span::styled(" 1/2", Style::default().fg(THEME.text_accent)),
                Span::styled(":Tab  ", THEME.muted_style()),
                Span::styled("a", Style::default().fg(THEME.text_accent)),
                Span::styled(":Address  ", THEME.muted_style()),
                Span::styled("?", Style::default().fg(THEME.text_accent)),
                Span::styled(":Help  ", THEME.muted_style()),
                Span::styled("q", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", THEME.muted_style()),
            ])
        };
        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: connection state + address ---
        let dot_color = match self.state_label {
            "ready" => THEME.success,
            "failed" => THEME.error,
            _ => THEME.warning,
        };
        let mut spans = vec![
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(self.state_label, Style::default().fg(dot_color)),
        ];
        if let Some(ref at) = self.loaded_at {
            spans.push(Span::styled(format!(" @{at}"), THEME.muted_style()));
        }
        spans.push(Span::styled(" | ", THEME.muted_style()));
        let address = parse_address(&self.address)
            .map(|a| utils::truncate_address(&a))
            .unwrap_or_else(|| self.address.clone());
        spans.push(Span::styled(format!("{address} "), THEME.address_style()));

        let right = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
