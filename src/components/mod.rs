pub mod address_bar;
pub mod bonding_curve;
pub mod content;
pub mod error_panel;
pub mod header;
pub mod help;
pub mod loader;
pub mod status_bar;
pub mod timeline;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::events::AppEvent;

/// Trait for interactive UI components
pub trait Component {
    /// Handle a key event, optionally returning an AppEvent
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent>;

    /// Render the component into the given area
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Limit `area` to at most `height` rows, keeping its top edge.
pub fn clamp_height(area: Rect, height: u16) -> Rect {
    Rect {
        height: area.height.min(height),
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_height() {
        let area = Rect::new(2, 3, 80, 40);
        assert_eq!(clamp_height(area, 200), area);
        assert_eq!(clamp_height(area, 10), Rect::new(2, 3, 80, 10));
    }
}
