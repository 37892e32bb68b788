//! Pre-flight check on raw user input.
//!
//! A cheap heuristic that keeps obviously empty or non-math submissions from
//! reaching the generation service. It is not a grammar.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// At least one digit, operator, variable `x` or common math glyph
static MATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9+\-*/=()x²³√∫∑]").unwrap());

/// Symbols offered for quick insertion in the input field
pub const QUICK_SYMBOLS: &[&str] = &["+", "-", "×", "÷", "=", "(", ")", "x", "y", "²", "³", "√"];

/// Accept or reject raw input. Returns the trimmed expression on success.
pub fn validate_input(input: &str) -> Result<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !MATH_PATTERN.is_match(trimmed) {
        tracing::debug!(input = trimmed, "input rejected by acceptance gate");
        return Err(Error::InputRejected);
    }
    Ok(trimmed)
}
