//! Greedy word wrap against a `TextMeasurer`.
//!
//! Tokens are whitespace-delimited. A token is appended to the current line while
//! `measure(line + " " + token) <= max_width`; otherwise it starts a new line. A
//! token wider than `max_width` on its own is emitted alone, unsplit. Newlines in
//! the input are hard breaks and each segment wraps independently.

use crate::layout::font_metrics::{measure_width, FontSpec, TextMeasurer};
use crate::layout::LayoutError;

/// Wraps `text` into lines no wider than `max_width` millimetres.
///
/// Blank input (or blank segments between newlines) yields no lines.
pub fn wrap(
    text: &str,
    max_width: f32,
    font: FontSpec,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<String>, LayoutError> {
    let mut lines = Vec::new();
    for segment in text.lines() {
        wrap_segment(segment, max_width, font, measurer, &mut lines)?;
    }
    Ok(lines)
}

fn wrap_segment(
    segment: &str,
    max_width: f32,
    font: FontSpec,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<String>,
) -> Result<(), LayoutError> {
    let mut current = String::new();

    for token in segment.split_whitespace() {
        if current.is_empty() {
            // Validate even when the token will sit alone on the line.
            measure_width(measurer, token, font)?;
            current.push_str(token);
            continue;
        }

        let candidate = format!("{current} {token}");
        if measure_width(measurer, &candidate, font)? <= max_width {
            current = candidate;
        } else {
            out.push(std::mem::take(&mut current));
            measure_width(measurer, token, font)?;
            current.push_str(token);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    Ok(())
}

/// Vertical space consumed by `line_count` lines.
pub fn block_height(line_count: usize, line_height: f32) -> f32 {
    line_count as f32 * line_height
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
