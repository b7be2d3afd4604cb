use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::view::ActiveTab;

/// Title bar with the tab strip. The strip is only drawn when `show_tabs`
/// is set, which the app clears while a connection is loading.
pub struct Header {
    pub active: ActiveTab,
    pub show_tabs: bool,
    pub contract_name: Option<String>,
}

impl Header {
    pub fn new(active: ActiveTab, contract_name: Option<String>) -> Self {
        Self {
            active,
            show_tabs: false,
            contract_name,
        }
    }
}

impl Component for Header {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        let tab = match key.code {
            KeyCode::Char('1') | KeyCode::Char('t') => ActiveTab::Timeline,
            KeyCode::Char('2') | KeyCode::Char('b') => ActiveTab::BondingCurve,
            KeyCode::Tab | KeyCode::BackTab => self.active.next(),
            _ => return None,
        };
        Some(AppEvent::SelectTab(tab))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(14), Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " curve-view",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        if self.show_tabs {
            let titles: Vec<Line> = ActiveTab::ALL
                .iter()
                .enumerate()
                .map(|(i, tab)| Line::from(format!("{} [{}]", tab.title(), i + 1)))
                .collect();
            let tabs = Tabs::new(titles)
                .select(self.active.index())
                .style(THEME.muted_style())
                .highlight_style(THEME.active_tab_style())
                .divider(Span::raw(" | "));
            frame.render_widget(tabs, chunks[1]);
        }

        if let Some(name) = &self.contract_name {
            let name = Paragraph::new(Span::styled(format!("{name} "), THEME.muted_style()))
                .alignment(Alignment::Right)
                .style(THEME.header_style());
            frame.render_widget(name, chunks[2]);
        }
    }
}
