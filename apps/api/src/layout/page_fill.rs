//! Page Fill Analysis: checks how well each laid-out page uses its body.
//!
//! Page breaks are decided from estimated block heights before drawing, so the
//! engine never backtracks. The price is whitespace at the foot of a page when a
//! large entry is pushed to the next one. This module reports that cost, and any
//! block that had to run past the bottom threshold, so that the preview can show it.
//!
//! # Verdicts
//! - Lowest extent below the page bottom  → `Overflow`
//! - Non-final page filled under 60%      → `TrailingWhitespace`
//! - Anything else                        → `Acceptable`

use serde::{Deserialize, Serialize};

use crate::layout::commands::{DrawCommand, LaidOutDocument};
use crate::layout::geometry::PageGeometry;

/// Fill fraction under which a page that is followed by another page is flagged.
pub const MIN_NON_FINAL_FILL: f32 = 0.60;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFillVerdict {
    Acceptable,
    /// A page that was broken early and left a large gap at its foot.
    TrailingWhitespace,
    /// Something is drawn below the bottom threshold.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFillAnalysis {
    pub page: usize,
    /// Lowest `y` reached by body content, in millimetres.
    pub lowest_extent: f32,
    /// Share of the page body between the top margin and `lowest_extent`, clamped to [0, 1].
    pub fill_fraction: f32,
    pub verdict: PageFillVerdict,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Analyzes every page of `document` in order.
///
/// Commands placed inside the bottom band on purpose (the footer caption) are
/// not body content and are ignored.
pub fn analyze_pages(document: &LaidOutDocument, geometry: &PageGeometry) -> Vec<PageFillAnalysis> {
    let last = document.pages.len().saturating_sub(1);
    document
        .pages
        .iter()
        .map(|page| {
            let lowest_extent = page
                .commands
                .iter()
                .filter(|c| !is_footer(c, geometry))
                .map(DrawCommand::bottom)
                .fold(geometry.top(), f32::max);
            analyze_page(page.index, lowest_extent, page.index == last, geometry)
        })
        .collect()
}

fn analyze_page(
    page: usize,
    lowest_extent: f32,
    is_final: bool,
    geometry: &PageGeometry,
) -> PageFillAnalysis {
    let used = lowest_extent - geometry.top();
    let fill_fraction = (used / geometry.body_height()).clamp(0.0, 1.0);

    let verdict = if lowest_extent > geometry.page_bottom() {
        PageFillVerdict::Overflow
    } else if !is_final && fill_fraction < MIN_NON_FINAL_FILL {
        PageFillVerdict::TrailingWhitespace
    } else {
        PageFillVerdict::Acceptable
    };

    PageFillAnalysis {
        page,
        lowest_extent,
        fill_fraction,
        verdict,
    }
}

/// Text on the footer baseline, halfway into the bottom band.
fn is_footer(command: &DrawCommand, geometry: &PageGeometry) -> bool {
    let footer_y = geometry.height - geometry.bottom_threshold / 2.0;
    matches!(command, DrawCommand::Text { y, .. } if (*y - footer_y).abs() < 1e-3)
        && footer_y > geometry.page_bottom()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::commands::{Page, TextStyle};
    use crate::layout::font_metrics::FontSpec;
    use crate::layout::theme::Rgb;

    fn text_at(y: f32) -> DrawCommand {
        DrawCommand::Text {
            x: 20.0,
            y,
            content: "line".to_string(),
            style: TextStyle {
                font: FontSpec::regular(10.0),
                color: Rgb::BLACK,
            },
        }
    }

    fn document(pages: Vec<Vec<DrawCommand>>) -> LaidOutDocument {
        LaidOutDocument {
            file_name: "CV_Resume.pdf".to_string(),
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(index, commands)| Page { index, commands })
                .collect(),
        }
    }

    #[test]
    fn test_single_short_page_is_acceptable() {
        let g = PageGeometry::default();
        let analysis = analyze_pages(&document(vec![vec![text_at(80.0)]]), &g);
        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis[0].verdict, PageFillVerdict::Acceptable);
        assert!((analysis[0].fill_fraction - 60.0 / 257.0).abs() < 1e-4);
    }

    #[test]
    fn test_early_break_flags_trailing_whitespace() {
        let g = PageGeometry::default();
        let doc = document(vec![vec![text_at(100.0)], vec![text_at(40.0)]]);
        let analysis = analyze_pages(&doc, &g);
        assert_eq!(analysis[0].verdict, PageFillVerdict::TrailingWhitespace);
        assert_eq!(analysis[1].verdict, PageFillVerdict::Acceptable);
    }

    #[test]
    fn test_well_filled_non_final_page_is_acceptable() {
        let g = PageGeometry::default();
        let doc = document(vec![vec![text_at(260.0)], vec![text_at(40.0)]]);
        assert_eq!(
            analyze_pages(&doc, &g)[0].verdict,
            PageFillVerdict::Acceptable
        );
    }

    #[test]
    fn test_content_past_bottom_is_overflow() {
        let g = PageGeometry::default();
        let doc = document(vec![vec![text_at(40.0), text_at(290.0)]]);
        let analysis = analyze_pages(&doc, &g);
        assert_eq!(analysis[0].verdict, PageFillVerdict::Overflow);
        assert_eq!(analysis[0].fill_fraction, 1.0);
    }

    #[test]
    fn test_footer_caption_is_not_body_content() {
        let g = PageGeometry::default();
        let doc = document(vec![vec![text_at(60.0), text_at(287.0)]]);
        let analysis = analyze_pages(&doc, &g);
        assert_eq!(analysis[0].verdict, PageFillVerdict::Acceptable);
        assert_eq!(analysis[0].lowest_extent, 60.0);
    }

    #[test]
    fn test_empty_page_has_zero_fill() {
        let g = PageGeometry::default();
        let analysis = analyze_pages(&document(vec![vec![]]), &g);
        assert_eq!(analysis[0].fill_fraction, 0.0);
        assert_eq!(analysis[0].verdict, PageFillVerdict::Acceptable);
    }
}
