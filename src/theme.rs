use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub border: Color,
    pub border_focused: Color,
    pub address_color: Color,
    pub curve: Color,
    pub marker: Color,
    pub bar: Color,
}

pub const THEME: Theme = Theme {
    bg: Color::Rgb(16, 16, 28),
    surface: Color::Rgb(24, 24, 40),
    text: Color::Rgb(220, 220, 230),
    text_muted: Color::Rgb(120, 120, 140),
    text_accent: Color::Cyan,
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    border: Color::Rgb(60, 60, 80),
    border_focused: Color::Cyan,
    address_color: Color::Rgb(255, 179, 71),
    curve: Color::Rgb(98, 126, 234),
    marker: Color::Rgb(255, 179, 71),
    bar: Color::Rgb(98, 126, 234),
};

impl Theme {
    pub const fn header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub const fn border_style(&self) -> Style {
        Style::new().fg(self.border)
    }

    pub const fn border_focused_style(&self) -> Style {
        Style::new().fg(self.border_focused)
    }

    pub const fn muted_style(&self) -> Style {
        Style::new().fg(self.text_muted)
    }

    pub const fn accent_style(&self) -> Style {
        Style::new().fg(self.text_accent)
    }

    pub const fn error_style(&self) -> Style {
        Style::new().fg(self.error)
    }

    pub const fn address_style(&self) -> Style {
        Style::new().fg(self.address_color)
    }

    pub const fn curve_style(&self) -> Style {
        Style::new().fg(self.curve)
    }

    pub const fn marker_style(&self) -> Style {
        Style::new().fg(self.marker).add_modifier(Modifier::BOLD)
    }

    pub const fn selected_style(&self) -> Style {
        Style::new().bg(self.border).add_modifier(Modifier::BOLD)
    }

    pub const fn table_header_style(&self) -> Style {
        Style::new().fg(self.text_accent).add_modifier(Modifier::BOLD)
    }

    pub const fn active_tab_style(&self) -> Style {
        Style::new().fg(self.text_accent).add_modifier(Modifier::BOLD)
    }
}
