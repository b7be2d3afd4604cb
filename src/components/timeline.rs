use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::clamp_height;
use crate::components::content::{Visualization, VisualizationError, VisualizationPayload};
use crate::data::types::TimelineData;
use crate::data::{VisualizationContext, VisualizationService};
use crate::events::{AppEvent, MountId};
use crate::theme::THEME;
use crate::utils;

/// Event activity of the contract over recent blocks.
pub struct Timeline {
    ctx: VisualizationContext,
    data: Option<TimelineData>,
    table_state: TableState,
}

impl Timeline {
    pub fn new(ctx: VisualizationContext) -> Self {
        Self {
            ctx,
            data: None,
            table_state: TableState::default(),
        }
    }

    fn recent_len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.recent.len())
    }

    fn select_next(&mut self) {
        let len = self.recent_len();
        if len == 0 {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.table_state.select(Some(i));
    }

    fn select_prev(&mut self) {
        if self.recent_len() == 0 {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(i));
    }
}

fn build_rows(data: &TimelineData) -> Vec<Row<'static>> {
    data.recent
        .iter()
        .map(|event| {
            let time = event
                .timestamp
                .map(utils::format_timestamp)
                .unwrap_or_else(|| "-".to_string());
            let tx = event
                .transaction_hash
                .as_ref()
                .map(utils::truncate_hash)
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(utils::format_number(event.block_number)).style(THEME.accent_style()),
                Cell::from(time).style(THEME.muted_style()),
                Cell::from(event.name.clone()),
                Cell::from(tx).style(THEME.address_style()),
            ])
        })
        .collect()
}

impl Visualization for Timeline {
    fn name(&self) -> &'static str {
        "timeline"
    }

    fn load(&self, mount: MountId, service: &VisualizationService) {
        service.fetch_timeline(mount, &self.ctx);
    }

    fn on_data(&mut self, payload: VisualizationPayload) -> Result<(), VisualizationError> {
        match payload {
            VisualizationPayload::Timeline(data) => {
                self.table_state
                    .select(if data.recent.is_empty() { None } else { Some(0) });
                self.data = Some(data);
                Ok(())
            }
            _ => Err(VisualizationError::UnexpectedData { view: self.name() }),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) -> Result<(), VisualizationError> {
        let area = clamp_height(area, self.ctx.height);
        let outer_block = Block::default()
            .title(" Timeline ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let Some(data) = &self.data else {
            let loading = Paragraph::new("Loading events...")
                .style(THEME.muted_style())
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
            return Ok(());
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),      // Summary
                Constraint::Percentage(45), // Activity bars
                Constraint::Min(3),         // Recent events
            ])
            .split(inner);

        // --- Summary ---
        let summary = Paragraph::new(Line::from(vec![
            Span::styled("Blocks ", THEME.muted_style()),
            Span::styled(
                format!(
                    "{} - {}",
                    utils::format_number(data.from_block),
                    utils::format_number(data.to_block)
                ),
                THEME.accent_style(),
            ),
            Span::styled("  Events ", THEME.muted_style()),
            Span::styled(
                utils::format_number(data.total_events as u64),
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
            ),
        ]));
        frame.render_widget(summary, chunks[0]);

        // --- Activity per bucket ---
        let bars: Vec<Bar> = data
            .buckets
            .iter()
            .map(|bucket| Bar::default().value(bucket.count))
            .collect();
        let bucket_count = data.buckets.len().max(1) as u16;
        let bar_width = (chunks[1].width.saturating_sub(2) / bucket_count)
            .saturating_sub(1)
            .max(1);
        let chart = BarChart::default()
            .block(
                Block::default()
                    .title(" Activity ")
                    .borders(Borders::ALL)
                    .border_style(THEME.border_style()),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(THEME.bar))
            .value_style(Style::default().fg(THEME.bg).bg(THEME.bar));
        frame.render_widget(chart, chunks[1]);

        // --- Recent events ---
        let recent_block = Block::default()
            .title(" Recent ")
            .borders(Borders::ALL)
            .border_style(THEME.border_style());
        if data.recent.is_empty() {
            let empty = Paragraph::new("No events in range")
                .style(THEME.muted_style())
                .alignment(Alignment::Center)
                .block(recent_block);
            frame.render_widget(empty, chunks[2]);
            return Ok(());
        }

        let header = Row::new(vec![
            Cell::from("Block"),
            Cell::from("Time"),
            Cell::from("Event"),
            Cell::from("Tx"),
        ])
        .style(THEME.table_header_style());
        let widths = [
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(12),
            Constraint::Length(16),
        ];
        let table = Table::new(build_rows(data), widths)
            .header(header)
            .block(recent_block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");
        frame.render_stateful_widget(table, chunks[2], &mut self.table_state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::B256;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::data::artifact::{ContractArtifact, ContractHandle};
    use crate::data::testing::{MockProvider, sample_abi_json, sample_address};
    use crate::data::types::{CurveData, TimelineBucket, TimelineEvent};

    fn timeline() -> Timeline {
        let artifact = ContractArtifact::from_json(&sample_abi_json()).unwrap();
        Timeline::new(VisualizationContext {
            provider: Arc::new(MockProvider::deployed()),
            contract: Arc::new(ContractHandle::new(artifact.abi, sample_address())),
            contract_address: sample_address().to_string(),
            height: 200,
        })
    }

    fn data() -> TimelineData {
        TimelineData {
            from_block: 100,
            to_block: 199,
            buckets: vec![
                TimelineBucket {
                    start_block: 100,
                    end_block: 149,
                    count: 2,
                },
                TimelineBucket {
                    start_block: 150,
                    end_block: 199,
                    count: 1,
                },
            ],
            recent: vec![
                TimelineEvent {
                    block_number: 180,
                    timestamp: Some(1_700_000_000),
                    name: "Minted".to_string(),
                    transaction_hash: Some(B256::repeat_byte(0x01)),
                },
                TimelineEvent {
                    block_number: 120,
                    timestamp: None,
                    name: "Burned".to_string(),
                    transaction_hash: None,
                },
            ],
            total_events: 3,
        }
    }

    fn rendered(view: &mut Timeline) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area()).unwrap())
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_loading_before_data() {
        let mut view = timeline();
        assert!(rendered(&mut view).contains("Loading events..."));
    }

    #[test]
    fn test_renders_recent_events() {
        let mut view = timeline();
        view.on_data(VisualizationPayload::Timeline(data())).unwrap();

        let text = rendered(&mut view);
        assert!(text.contains("Minted"));
        assert!(text.contains("Burned"));
        assert!(text.contains("Events 3"));
    }

    #[test]
    fn test_rejects_curve_data() {
        let mut view = timeline();
        let curve = CurveData {
            function: "priceToMint".to_string(),
            points: vec![],
            current_supply: None,
        };
        assert!(matches!(
            view.on_data(VisualizationPayload::Curve(curve)),
            Err(VisualizationError::UnexpectedData { view: "timeline" })
        ));
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut view = timeline();
        view.on_data(VisualizationPayload::Timeline(data())).unwrap();
        let down = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        let up = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);

        view.handle_key(down);
        view.handle_key(down);
        assert_eq!(view.table_state.selected(), Some(1));

        view.handle_key(up);
        view.handle_key(up);
        assert_eq!(view.table_state.selected(), Some(0));
    }
}
