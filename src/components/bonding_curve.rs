use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::clamp_height;
use crate::components::content::{Visualization, VisualizationError, VisualizationPayload};
use crate::data::types::{CurveData, CurvePoint};
use crate::data::{VisualizationContext, VisualizationService};
use crate::events::{AppEvent, MountId};
use crate::theme::THEME;
use crate::utils;

const VIEW_NAME: &str = "bonding curve";

/// Plot of the contract's pricing function against supply, with the
/// current supply marked when known.
pub struct BondingCurveChart {
    ctx: VisualizationContext,
    data: Option<CurveData>,
}

impl BondingCurveChart {
    pub fn new(ctx: VisualizationContext) -> Self {
        Self { ctx, data: None }
    }
}

/// Linear interpolation of the curve at `supply`. Points must be sorted by
/// supply; `None` outside the sampled range.
pub fn interpolate(points: &[CurvePoint], supply: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if supply < first.supply || supply > last.supply {
        return None;
    }
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if supply >= a.supply && supply <= b.supply {
            let span = b.supply - a.supply;
            if span == 0.0 {
                return Some(a.value);
            }
            let t = (supply - a.supply) / span;
            return Some(a.value + t * (b.value - a.value));
        }
    }
    Some(first.value)
}

fn axis_labels(min: f64, max: f64) -> Vec<Span<'static>> {
    let mid = min + (max - min) / 2.0;
    [min, mid, max]
        .into_iter()
        .map(|v| Span::styled(utils::format_compact(v), THEME.muted_style()))
        .collect()
}

impl Visualization for BondingCurveChart {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load(&self, mount: MountId, service: &VisualizationService) {
        service.fetch_curve(mount, &self.ctx);
    }

    fn on_data(&mut self, payload: VisualizationPayload) -> Result<(), VisualizationError> {
        match payload {
            VisualizationPayload::Curve(data) => {
                self.data = Some(data);
                Ok(())
            }
            _ => Err(VisualizationError::UnexpectedData { view: VIEW_NAME }),
        }
    }

    fn handle_key(&mut self, _key: KeyEvent) -> Option<AppEvent> {
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) -> Result<(), VisualizationError> {
        let area = clamp_height(area, self.ctx.height);

        let Some(data) = &self.data else {
            let block = Block::default()
                .title(" Bonding Curve ")
                .borders(Borders::ALL)
                .border_style(THEME.border_focused_style());
            let loading = Paragraph::new("Sampling curve...")
                .style(THEME.muted_style())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(loading, area);
            return Ok(());
        };

        let points: Vec<(f64, f64)> = data
            .points
            .iter()
            .filter(|p| p.supply.is_finite() && p.value.is_finite())
            .map(|p| (p.supply, p.value))
            .collect();
        if points.is_empty() {
            return Err(VisualizationError::Render {
                view: VIEW_NAME,
                message: format!("{} returned no points to plot", data.function),
            });
        }

        let x_max = points.iter().map(|p| p.0).fold(0.0, f64::max).max(1.0);
        let (y_min, y_max) = data.value_bounds();

        let marker: Vec<(f64, f64)> = data
            .current_supply
            .map(utils::u256_to_f64)
            .and_then(|supply| interpolate(&data.points, supply).map(|value| (supply, value)))
            .into_iter()
            .collect();

        let mut title = vec![Span::styled(
            format!(" {} ", data.function),
            THEME.accent_style().add_modifier(Modifier::BOLD),
        )];
        match (data.current_supply, marker.first()) {
            (Some(supply), Some((_, value))) => title.push(Span::styled(
                format!("supply {} = {} ", supply, utils::format_compact(*value)),
                THEME.marker_style(),
            )),
            (Some(supply), None) => title.push(Span::styled(
                format!("supply {supply} is off the sampled range "),
                THEME.muted_style(),
            )),
            (None, _) => {}
        }

        let mut datasets = vec![
            Dataset::default()
                .name(data.function.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(THEME.curve_style())
                .data(&points),
        ];
        if !marker.is_empty() {
            datasets.push(
                Dataset::default()
                    .name("current")
                    .marker(symbols::Marker::Block)
                    .graph_type(GraphType::Scatter)
                    .style(THEME.marker_style())
                    .data(&marker),
            );
        }

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(Line::from(title))
                    .borders(Borders::ALL)
                    .border_style(THEME.border_focused_style()),
            )
            .x_axis(
                Axis::default()
                    .title(Span::styled("Supply", THEME.muted_style()))
                    .style(THEME.border_style())
                    .bounds([0.0, x_max])
                    .labels(axis_labels(0.0, x_max)),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("Value", THEME.muted_style()))
                    .style(THEME.border_style())
                    .bounds([y_min, y_max])
                    .labels(axis_labels(y_min, y_max)),
            )
            .legend_position(Some(LegendPosition::TopLeft));
        frame.render_widget(chart, area);
        Ok(())
    }
}
