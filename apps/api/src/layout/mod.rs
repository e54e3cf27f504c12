// Paginated CV layout.
// Measures and wraps text, decides page breaks ahead of drawing, and emits
// page-tagged draw commands. CPU-bound; run inside tokio::task::spawn_blocking.

pub mod chips;
pub mod commands;
pub mod engine;
pub mod font_metrics;
pub mod geometry;
pub mod page_fill;
pub mod sections;
pub mod theme;
pub mod wrap;

use thiserror::Error;

// Re-export the public API consumed by the render and export modules.
pub use commands::Page;
pub use engine::generate_document;
pub use font_metrics::{HelveticaMetrics, TextMeasurer};
pub use geometry::PageGeometry;
pub use page_fill::{analyze_pages, PageFillAnalysis, PageFillVerdict};
pub use theme::{DateStyle, Theme, ThemeName};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("text measurement returned {width} for {text:?}")]
    Measurement { text: String, width: f32 },

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),
}
