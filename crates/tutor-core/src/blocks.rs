//! Block classification for transcripts
//!
//! A transcript is plain text with a small, fixed markup dialect: `#`/`##`/`###`
//! headings, `*` bullets followed by whitespace, `$...$` formulas and `**` emphasis. Each line becomes
//! exactly one [`Block`]. Precedence is fixed, markers are removed literally and
//! nothing looks across line boundaries, so a transcript that ends mid-line
//! (while streaming) still classifies.

use serde::{Deserialize, Serialize};

const BOLD: &str = "**";
const FORMULA: char = '$';
const ESCAPE: char = '\\';
const BULLET: char = '*';

/// Kind of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Bullet,
    Formula,
    PlainText,
    Spacer,
}

impl BlockKind {
    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    fn heading_level(&self) -> Option<u8> {
        match self {
            BlockKind::Heading1 => Some(1),
            BlockKind::Heading2 => Some(2),
            BlockKind::Heading3 => Some(3),
            _ => None,
        }
    }
}

/// One classified line of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Display text with markup tokens removed; empty for spacers
    pub content: String,
    /// Heading level (1-3), `None` for every other kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl Block {
    fn new(kind: BlockKind, content: String) -> Self {
        Self {
            kind,
            content,
            level: kind.heading_level(),
        }
    }

    /// A blank separator line
    pub fn spacer() -> Self {
        Self::new(BlockKind::Spacer, String::new())
    }

    /// Rebuild a single display line for plain terminal output.
    pub fn to_line(&self) -> String {
        match self.kind {
            BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3 => {
                self.content.clone()
            }
            BlockKind::Bullet => format!("• {}", self.content),
            BlockKind::Formula => format!("    {}", self.content),
            BlockKind::PlainText => self.content.clone(),
            BlockKind::Spacer => String::new(),
        }
    }
}

/// Classify a transcript into an ordered sequence of blocks.
///
/// Pure and total: the same input always gives the same output and malformed
/// markup never fails, it just degrades to plain text.
pub fn classify(transcript: &str) -> Vec<Block> {
    transcript.lines().map(classify_line).collect()
}

fn classify_line(line: &str) -> Block {
    let line = line.trim();
    if line.is_empty() {
        return Block::spacer();
    }

    // Longest heading marker first so `###x` never reads as a level 1 heading
    for (marker, kind) in [
        ("###", BlockKind::Heading3),
        ("##", BlockKind::Heading2),
        ("#", BlockKind::Heading1),
    ] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Block::new(kind, strip_bold(rest));
        }
    }

    if let Some(rest) = bullet_body(line) {
        let content = strip_bold(rest).replace(FORMULA, "");
        return Block::new(BlockKind::Bullet, content.trim().to_string());
    }

    if line.contains(FORMULA) {
        let content: String = line.chars().filter(|&c| c != FORMULA && c != ESCAPE).collect();
        return Block::new(BlockKind::Formula, content.trim().to_string());
    }

    Block::new(BlockKind::PlainText, strip_bold(line))
}

/// Text after a `*` marker, which needs at least one whitespace character of padding.
fn bullet_body(line: &str) -> Option<&str> {
    line.strip_prefix(BULLET)
        .filter(|rest| rest.starts_with(char::is_whitespace))
}

fn strip_bold(text: &str) -> String {
    text.replace(BOLD, "").trim().to_string()
}
