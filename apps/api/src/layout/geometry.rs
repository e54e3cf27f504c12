//! Page geometry, the layout cursor and the page-break policy.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::LayoutError;

/// Physical page parameters, all in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub line_height: f32,
    /// Distance from the bottom edge below which no block may start.
    pub bottom_threshold: f32,
}

impl Default for PageGeometry {
    /// A4 portrait with 20mm margins and 6mm body lines.
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
            line_height: 6.0,
            bottom_threshold: 20.0,
        }
    }
}

impl PageGeometry {
    pub fn content_left(&self) -> f32 {
        self.margin
    }

    pub fn content_right(&self) -> f32 {
        self.width - self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// First baseline on a freshly allocated page.
    pub fn top(&self) -> f32 {
        self.margin
    }

    /// Lowest `y` a block may reach without triggering a page break.
    pub fn page_bottom(&self) -> f32 {
        self.height - self.bottom_threshold
    }

    pub fn body_height(&self) -> f32 {
        self.page_bottom() - self.top()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let values = [
            self.width,
            self.height,
            self.margin,
            self.line_height,
            self.bottom_threshold,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(LayoutError::InvalidGeometry(format!(
                "dimensions must be finite and non-negative: {self:?}"
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "margins ({}mm) leave no content width on a {}mm page",
                self.margin, self.width
            )));
        }
        if self.body_height() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "margins leave no body height on a {}mm page",
                self.height
            )));
        }
        Ok(())
    }
}

/// Current page index (0-based) and baseline position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutCursor {
    pub page: usize,
    pub y: f32,
}

impl LayoutCursor {
    pub fn start(geometry: &PageGeometry) -> Self {
        Self {
            page: 0,
            y: geometry.top(),
        }
    }

    pub fn advance(self, dy: f32) -> Self {
        Self {
            page: self.page,
            y: self.y + dy,
        }
    }

    /// First baseline of the next page.
    pub fn next_page(self, geometry: &PageGeometry) -> Self {
        Self {
            page: self.page + 1,
            y: geometry.top(),
        }
    }

    /// True when nothing has been placed below the top margin on this page yet.
    pub fn at_page_top(&self, geometry: &PageGeometry) -> bool {
        self.y <= geometry.top()
    }
}

/// What `ensure_space` decided for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBreak {
    /// The block fits where the cursor is.
    Fits,
    /// A new page was allocated before the block.
    NewPage,
    /// The block is taller than a whole page body; it starts at the top of a
    /// page and will run past the bottom threshold.
    Oversized,
}

/// Pre-emptive page-break policy: a block whose estimated height does not fit
/// below the cursor starts on a fresh page instead.
pub fn ensure_space(
    cursor: LayoutCursor,
    required_height: f32,
    geometry: &PageGeometry,
) -> (LayoutCursor, PageBreak) {
    let oversized = required_height > geometry.body_height();

    if cursor.y + required_height <= geometry.page_bottom() {
        return (cursor, PageBreak::Fits);
    }

    if cursor.at_page_top(geometry) {
        // A fresh page is as good as it gets; another break would loop forever.
        warn!(
            page = cursor.page,
            required_height, "block taller than a page body; drawing past bottom margin"
        );
        return (cursor, PageBreak::Oversized);
    }

    let next = cursor.next_page(geometry);
    if oversized {
        warn!(
            page = next.page,
            required_height, "block taller than a page body; drawing past bottom margin"
        );
        (next, PageBreak::Oversized)
    } else {
        (next, PageBreak::NewPage)
    }
}
