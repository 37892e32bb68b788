//! Quick-symbol palette

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Selection state over a fixed list of symbols
#[derive(Debug, Clone)]
pub struct SymbolPalette {
    symbols: &'static [&'static str],
    selected: usize,
}

impl SymbolPalette {
    pub fn new(symbols: &'static [&'static str]) -> Self {
        Self {
            symbols,
            selected: 0,
        }
    }

    pub fn symbols(&self) -> &'static [&'static str] {
        self.symbols
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Currently selected symbol, `None` for an empty palette
    pub fn selected(&self) -> Option<&'static str> {
        self.symbols.get(self.selected).copied()
    }

    /// Select the next symbol, wrapping around
    pub fn next(&mut self) {
        if !self.symbols.is_empty() {
            self.selected = (self.selected + 1) % self.symbols.len();
        }
    }

    /// Select the previous symbol, wrapping around
    pub fn prev(&mut self) {
        if !self.symbols.is_empty() {
            self.selected = (self.selected + self.symbols.len() - 1) % self.symbols.len();
        }
    }
}

/// One-line rendering of a [`SymbolPalette`]
pub struct SymbolBar<'a> {
    palette: &'a SymbolPalette,
    theme: &'a Theme,
}

impl<'a> SymbolBar<'a> {
    pub fn new(palette: &'a SymbolPalette, theme: &'a Theme) -> Self {
        Self { palette, theme }
    }
}

impl Widget for SymbolBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let selected_style = Style::default()
            .bg(self.theme.accent)
            .fg(self.theme.bg)
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled("Symbols ", self.theme.dim_style())];
        for (i, symbol) in self.palette.symbols().iter().enumerate() {
            let style = if i == self.palette.selected_index() {
                selected_style
            } else {
                self.theme.base_style()
            };
            spans.push(Span::styled(format!(" {} ", symbol), style));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
