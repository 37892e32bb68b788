//! Color theme support

use ratatui::style::{Color, Modifier, Style};
use tutor_core::BlockKind;

/// Color theme for the tutor screen
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    /// Secondary text: tips, hints, placeholder
    pub dim: Color,
    /// Headings, focused borders, selected symbol
    pub accent: Color,
    pub error: Color,
    pub warning: Color,
    pub border: Color,
    /// Formula lines
    pub formula: Color,
    /// Bullet marker
    pub bullet: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
            warning: Color::Yellow,
            border: Color::DarkGray,
            formula: Color::Magenta,
            bullet: Color::Cyan,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            error: Color::Red,
            warning: Color::Rgb(180, 120, 0),
            border: Color::Gray,
            formula: Color::Magenta,
            bullet: Color::Blue,
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Text style for a classified block
    pub fn block_style(&self, kind: BlockKind) -> Style {
        match kind {
            BlockKind::Heading1 => self
                .accent_bold()
                .add_modifier(Modifier::UNDERLINED),
            BlockKind::Heading2 => self.accent_bold(),
            BlockKind::Heading3 => Style::default()
                .fg(self.fg)
                .add_modifier(Modifier::BOLD),
            BlockKind::Formula => Style::default().fg(self.formula),
            BlockKind::Bullet | BlockKind::PlainText | BlockKind::Spacer => self.base_style(),
        }
    }

    pub fn bullet_style(&self) -> Style {
        Style::default().fg(self.bullet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        let theme = Theme::dark();
        for kind in [BlockKind::Heading1, BlockKind::Heading2, BlockKind::Heading3] {
            assert!(
                theme
                    .block_style(kind)
                    .add_modifier
                    .contains(Modifier::BOLD)
            );
        }
        assert!(
            theme
                .block_style(BlockKind::Heading1)
                .add_modifier
                .contains(Modifier::UNDERLINED)
        );
    }

    #[test]
    fn test_formula_uses_formula_color() {
        let theme = Theme::light();
        assert_eq!(theme.block_style(BlockKind::Formula).fg, Some(theme.formula));
    }
}
