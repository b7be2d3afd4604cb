use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// Popup for retargeting the component at another contract address.
pub struct AddressBar {
    pub active: bool,
    pub input: String,
    /// Cursor position in characters, not bytes.
    cursor_position: usize,
}

impl AddressBar {
    pub fn new() -> Self {
        Self {
            active: false,
            input: String::new(),
            cursor_position: 0,
        }
    }

    /// Open pre-filled with the current address.
    pub fn activate(&mut self, current: &str) {
        self.active = true;
        self.input = current.to_string();
        self.cursor_position = self.char_count();
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    /// Byte offset of the character at `cursor`.
    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map_or(self.input.len(), |(i, _)| i)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns the trimmed input when the user presses Enter. Esc closes the
    /// bar without submitting.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        if !self.active {
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                self.active = false;
                Some(self.input.trim().to_string())
            }
            KeyCode::Esc => {
                self.deactivate();
                None
            }
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let at = self.byte_index(self.cursor_position);
                    self.input.remove(at);
                }
                None
            }
            KeyCode::Delete => {
                if self.cursor_position < self.char_count() {
                    let at = self.byte_index(self.cursor_position);
                    self.input.remove(at);
                }
                None
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                if self.cursor_position < self.char_count() {
                    self.cursor_position += 1;
                }
                None
            }
            KeyCode::Home => {
                self.cursor_position = 0;
                None
            }
            KeyCode::End => {
                self.cursor_position = self.char_count();
                None
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'u' {
                    self.input.clear();
                    self.cursor_position = 0;
                } else if c.is_ascii() {
                    let at = self.byte_index(self.cursor_position);
                    self.input.insert(at, c);
                    self.cursor_position += 1;
                }
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }

        let width = area.width.min(60);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let popup_area = Rect::new(x, area.y + 2, width, 3);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .title(" Contract address ")
            .style(Style::default().bg(THEME.surface));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let display_text = if self.input.is_empty() {
            Span::styled("0x...", THEME.muted_style())
        } else {
            Span::styled(&self.input, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(display_text), inner);

        let cursor_x = inner.x + self.cursor_position as u16;
        if cursor_x < inner.right() {
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
}
