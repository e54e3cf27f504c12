//! Row-flow placement of skill chips.

use crate::layout::font_metrics::{measure_width, TextMeasurer};
use crate::layout::theme::ChipStyle;
use crate::layout::LayoutError;

/// Where one chip lands relative to its group: row number and left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipPlacement {
    pub item_index: usize,
    pub label: String,
    pub row: usize,
    pub x: f32,
    pub width: f32,
}

impl ChipPlacement {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Flows `items` left to right between `left` and `right`.
///
/// Chip width is the measured label plus padding on both sides. A chip that would
/// cross `right` starts the next row, unless it is already first in its row.
pub fn layout_chips(
    items: &[&str],
    left: f32,
    right: f32,
    style: &ChipStyle,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<ChipPlacement>, LayoutError> {
    let mut placements = Vec::with_capacity(items.len());
    let mut x = left;
    let mut row = 0;

    for (item_index, label) in items.iter().enumerate() {
        let width = measure_width(measurer, label, style.font)? + 2.0 * style.padding;
        if x > left && x + width > right {
            row += 1;
            x = left;
        }
        placements.push(ChipPlacement {
            item_index,
            label: label.to_string(),
            row,
            x,
            width,
        });
        x += width + style.gap;
    }

    Ok(placements)
}

/// Number of rows a placement set occupies.
pub fn row_count(placements: &[ChipPlacement]) -> usize {
    placements.last().map_or(0, |p| p.row + 1)
}
