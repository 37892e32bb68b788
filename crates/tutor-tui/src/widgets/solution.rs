//! Solution view: classified blocks rendered as styled, wrapped lines

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use tutor_core::{Block, BlockKind};

const BULLET_MARKER: &str = "• ";
const FORMULA_INDENT: &str = "    ";
const ERROR_MARKER: &str = "⚠ ";

/// Usage hints shown before the first request
pub const TIPS: &[&str] = &[
    "Use 'x' or 'y' for variables",
    "Examples: \"2x + 5 = 15\", \"x² - 4 = 0\"",
    "Works with equations, inequalities and word problems",
];

fn wrap_with(text: &str, width: usize, first: &str, rest: &str) -> Vec<String> {
    let options = textwrap::Options::new(width.max(1))
        .initial_indent(first)
        .subsequent_indent(rest);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Render blocks into display lines for a view `width` columns wide.
pub fn render_blocks(blocks: &[Block], theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for block in blocks {
        let style = theme.block_style(block.kind);
        match block.kind {
            BlockKind::Spacer => lines.push(Line::default()),
            BlockKind::Bullet => {
                let wrapped = wrap_with(&block.content, width, BULLET_MARKER, "  ");
                for (i, line) in wrapped.into_iter().enumerate() {
                    // The marker gets its own color on the first line only
                    let spans = if i == 0 && line.starts_with(BULLET_MARKER) {
                        vec![
                            Span::styled(BULLET_MARKER, theme.bullet_style()),
                            Span::styled(line[BULLET_MARKER.len()..].to_string(), style),
                        ]
                    } else {
                        vec![Span::styled(line, style)]
                    };
                    lines.push(Line::from(spans));
                }
            }
            BlockKind::Formula => {
                for line in wrap_with(&block.content, width, FORMULA_INDENT, FORMULA_INDENT) {
                    lines.push(Line::from(Span::styled(line, style)));
                }
            }
            BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3 | BlockKind::PlainText => {
                for line in wrap_with(&block.content, width, "", "") {
                    lines.push(Line::from(Span::styled(line, style)));
                }
            }
        }
    }

    lines
}

/// Number of display lines the blocks take at `width`
pub fn solution_height(blocks: &[Block], width: usize) -> usize {
    render_blocks(blocks, &Theme::default(), width).len()
}

/// Scrollable view over the current solution
pub struct SolutionView<'a> {
    blocks: &'a [Block],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> SolutionView<'a> {
    pub fn new(blocks: &'a [Block], theme: &'a Theme) -> Self {
        Self {
            blocks,
            theme,
            scroll: 0,
        }
    }

    /// Skip this many display lines from the top
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for SolutionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let visible: Vec<Line> = render_blocks(self.blocks, self.theme, area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Short message in place of a solution: an error or the usage tips
pub enum Notice<'a> {
    Error { message: &'a str, theme: &'a Theme },
    Tips { theme: &'a Theme },
}

impl<'a> Notice<'a> {
    pub fn error(message: &'a str, theme: &'a Theme) -> Self {
        Notice::Error { message, theme }
    }

    pub fn tips(theme: &'a Theme) -> Self {
        Notice::Tips { theme }
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        match self {
            Notice::Error { message, theme } => wrap_with(message, width, ERROR_MARKER, "  ")
                .into_iter()
                .map(|line| Line::from(Span::styled(line, theme.error_style())))
                .collect(),
            Notice::Tips { theme } => {
                let mut lines = vec![Line::from(Span::styled("Tips:", theme.accent_bold()))];
                for tip in TIPS {
                    for line in wrap_with(tip, width, BULLET_MARKER, "  ") {
                        lines.push(Line::from(Span::styled(line, theme.dim_style())));
                    }
                }
                lines
            }
        }
    }
}

impl Widget for Notice<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        Paragraph::new(self.lines(area.width as usize)).render(area, buf);
    }
}
