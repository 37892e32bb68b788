//! Single-line expression input

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Expression input with a byte-offset cursor kept on char boundaries
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    cursor: usize,
    /// Display columns hidden on the left
    scroll: usize,
    title: String,
    placeholder: String,
    focused: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.len();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Insert text at the cursor. Line breaks become single spaces.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\r' || c == '\n' {
                if self.cursor > 0 && !self.content[..self.cursor].ends_with(' ') {
                    self.insert_char(' ');
                }
            } else {
                self.insert_char(c);
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    fn cursor_column(&self) -> usize {
        self.content[..self.cursor].width()
    }

    /// Apply an editing action. Returns whether it was consumed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let handled = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Paste(text) => {
                self.insert_str(text);
                true
            }
            Action::Backspace => match self.prev_boundary() {
                Some(prev) => {
                    self.content.drain(prev..self.cursor);
                    self.cursor = prev;
                    true
                }
                None => false,
            },
            Action::Delete => match self.next_boundary() {
                Some(next) => {
                    self.content.drain(self.cursor..next);
                    true
                }
                None => false,
            },
            Action::Left => match self.prev_boundary() {
                Some(prev) => {
                    self.cursor = prev;
                    true
                }
                None => false,
            },
            Action::Right => match self.next_boundary() {
                Some(next) => {
                    self.cursor = next;
                    true
                }
                None => false,
            },
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = self.content.len();
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            _ => false,
        };

        if handled {
            self.update_scroll(width as usize);
        }
        handled
    }

    fn update_scroll(&mut self, width: usize) {
        // Borders take two columns, keep one free for the cursor
        let visible = width.saturating_sub(3).max(1);
        let column = self.cursor_column();

        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column + 1 - visible;
        }
    }

    /// Slice of the content that fits in `width` columns after the scroll offset
    fn visible_text(&self, width: usize) -> String {
        let mut skipped = 0;
        let mut used = 0;
        let mut visible = String::new();

        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if used + w > width {
                break;
            }
            visible.push(c);
            used += w;
        }
        visible
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        if !self.title.is_empty() {
            block = block
                .title(format!(" {} ", self.title))
                .title_style(theme.accent_bold());
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let span = if self.content.is_empty() {
            Span::styled(self.placeholder.as_str(), theme.dim_style())
        } else {
            Span::styled(self.visible_text(inner.width as usize), theme.base_style())
        };
        buf.set_span(inner.x, inner.y, &span, inner.width);

        if self.focused {
            let x = self.cursor_column().saturating_sub(self.scroll);
            if x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 40);
        }
        input
    }

    #[test]
    fn test_typing_and_backspace_multibyte() {
        let mut input = typed("x²+√");
        assert_eq!(input.content(), "x²+√");

        input.handle_action(&Action::Backspace, 40);
        assert_eq!(input.content(), "x²+");

        input.handle_action(&Action::Left, 40);
        input.handle_action(&Action::Backspace, 40);
        assert_eq!(input.content(), "x+");
    }

    #[test]
    fn test_insert_symbol_at_cursor() {
        let mut input = typed("x = 4");
        input.handle_action(&Action::Home, 40);
        input.handle_action(&Action::Right, 40);
        input.insert_str("²");
        assert_eq!(input.content(), "x² = 4");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("2x + 5\r\n= 15".into()), 40);
        assert_eq!(input.content(), "2x + 5 = 15");
    }

    #[test]
    fn test_delete_at_end_is_noop() {
        let mut input = typed("12");
        assert!(!input.handle_action(&Action::Delete, 40));
        input.handle_action(&Action::Home, 40);
        assert!(input.handle_action(&Action::Delete, 40));
        assert_eq!(input.content(), "2");
    }

    #[test]
    fn test_blank_and_clear() {
        let mut input = typed("   ");
        assert!(input.is_blank());
        input.handle_action(&Action::ClearLine, 40);
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_render_placeholder_and_scroll() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 10, 3);

        let empty = InputBox::new().with_placeholder("type");
        let mut buf = Buffer::empty(area);
        empty.render(area, &mut buf, &theme);
        assert_eq!(buf[(1, 1)].symbol(), "t");

        let mut long = InputBox::new();
        for c in "0123456789abc".chars() {
            long.handle_action(&Action::Char(c), area.width);
        }
        let mut buf = Buffer::empty(area);
        long.render(area, &mut buf, &theme);
        // The tail stays visible while typing past the edge
        let row: String = (1..9).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("abc"));
    }
}
