// Replays a laid-out document onto a drawing surface.
// Layout never touches a surface directly; realize() is the only bridge.

pub mod pdf;

use thiserror::Error;

use crate::layout::commands::{DrawCommand, LaidOutDocument, Stroke};
use crate::layout::font_metrics::FontSpec;
use crate::layout::geometry::PageGeometry;
use crate::layout::theme::Rgb;

pub use pdf::PdfSurface;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("draw call before any page was added")]
    NoPage,

    #[error("document has no pages")]
    EmptyDocument,
}

/// Minimal drawing capability a layout needs. Coordinates are millimetres from
/// the top-left corner of the current page; text `y` is the baseline.
pub trait DrawingSurface {
    fn add_page(&mut self, width: f32, height: f32);
    fn set_font(&mut self, font: FontSpec);
    fn set_text_color(&mut self, color: Rgb);
    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), RenderError>;
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) -> Result<(), RenderError>;
    #[allow(clippy::too_many_arguments)]
    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    ) -> Result<(), RenderError>;
    #[allow(clippy::too_many_arguments)]
    fn draw_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    ) -> Result<(), RenderError>;
    /// Serializes everything drawn so far.
    fn finish(self) -> Result<Vec<u8>, RenderError>
    where
        Self: Sized;
}

/// Replays every page of `document`, in order, onto `surface`.
pub fn realize<S: DrawingSurface>(
    document: &LaidOutDocument,
    geometry: &PageGeometry,
    surface: &mut S,
) -> Result<(), RenderError> {
    if document.pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    for page in &document.pages {
        surface.add_page(geometry.width, geometry.height);
        for command in &page.commands {
            match command {
                DrawCommand::Text {
                    x,
                    y,
                    content,
                    style,
                } => {
                    surface.set_font(style.font);
                    surface.set_text_color(style.color);
                    surface.draw_text(*x, *y, content)?;
                }
                DrawCommand::Rect { x, y, w, h, fill } => surface.fill_rect(*x, *y, *w, *h, *fill)?,
                DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => surface.draw_line(*x1, *y1, *x2, *y2, *width, *color)?,
                DrawCommand::RoundedRect {
                    x,
                    y,
                    w,
                    h,
                    radius,
                    fill,
                    stroke,
                } => surface.draw_rounded_rect(*x, *y, *w, *h, *radius, *fill, *stroke)?,
            }
        }
    }
    Ok(())
}

/// Realizes `document` into a finished PDF byte buffer.
pub fn render_pdf(document: &LaidOutDocument, geometry: &PageGeometry) -> Result<Vec<u8>, RenderError> {
    let mut surface = PdfSurface::new();
    realize(document, geometry, &mut surface)?;
    surface.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engine::generate_document;
    use crate::layout::font_metrics::HelveticaMetrics;
    use crate::layout::theme::Theme;
    use crate::models::cv::{DocumentModel, SkillGroup};

    /// Records calls as short strings so tests can assert on the replay.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        pages: usize,
    }

    impl DrawingSurface for Recorder {
        fn add_page(&mut self, width: f32, height: f32) {
            self.pages += 1;
            self.calls.push(format!("page {width}x{height}"));
        }

        fn set_font(&mut self, font: FontSpec) {
            self.calls.push(format!("font {}", font.size_pt));
        }

        fn set_text_color(&mut self, color: Rgb) {
            self.calls.push(format!("color {},{},{}", color.r, color.g, color.b));
        }

        fn draw_text(&mut self, _x: f32, _y: f32, text: &str) -> Result<(), RenderError> {
            if self.pages == 0 {
                return Err(RenderError::NoPage);
            }
            self.calls.push(format!("text {text}"));
            Ok(())
        }

        fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _fill: Rgb) -> Result<(), RenderError> {
            self.calls.push("rect".to_string());
            Ok(())
        }

        fn draw_line(
            &mut self,
            _x1: f32,
            _y1: f32,
            _x2: f32,
            _y2: f32,
            _width: f32,
            _color: Rgb,
        ) -> Result<(), RenderError> {
            self.calls.push("line".to_string());
            Ok(())
        }

        fn draw_rounded_rect(
            &mut self,
            _x: f32,
            _y: f32,
            _w: f32,
            _h: f32,
            _radius: f32,
            _fill: Option<Rgb>,
            _stroke: Option<Stroke>,
        ) -> Result<(), RenderError> {
            self.calls.push("chip".to_string());
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, RenderError> {
            Ok(self.calls.join("\n").into_bytes())
        }
    }

    fn laid_out(model: &DocumentModel) -> LaidOutDocument {
        generate_document(
            model,
            &PageGeometry::default(),
            &Theme::banded(),
            &HelveticaMetrics,
        )
        .unwrap()
    }

    #[test]
    fn test_realize_replays_in_order() {
        let mut model = DocumentModel::default();
        model.skills.push(SkillGroup {
            id: "s".to_string(),
            category: "Tools".to_string(),
            items: vec!["Git".to_string()],
        });
        let doc = laid_out(&model);
        let mut recorder = Recorder::default();
        realize(&doc, &PageGeometry::default(), &mut recorder).unwrap();

        assert_eq!(recorder.calls[0], "page 210x297");
        assert_eq!(recorder.calls[1], "rect");
        assert_eq!(recorder.calls[2], "rect");
        let text_calls: Vec<&String> = recorder
            .calls
            .iter()
            .filter(|c| c.starts_with("text "))
            .collect();
        assert_eq!(text_calls.first().unwrap().as_str(), "text Your Name");
        assert!(recorder.calls.iter().any(|c| c == "chip"));
        assert!(recorder.calls.iter().any(|c| c == "line"));
    }

    #[test]
    fn test_realize_adds_one_surface_page_per_layout_page() {
        let doc = LaidOutDocument::assemble("x.pdf".to_string(), 3, vec![]);
        let mut recorder = Recorder::default();
        realize(&doc, &PageGeometry::default(), &mut recorder).unwrap();
        assert_eq!(recorder.pages, 3);
    }

    #[test]
    fn test_realize_rejects_empty_document() {
        let doc = LaidOutDocument {
            file_name: "x.pdf".to_string(),
            pages: vec![],
        };
        let mut recorder = Recorder::default();
        assert!(matches!(
            realize(&doc, &PageGeometry::default(), &mut recorder),
            Err(RenderError::EmptyDocument)
        ));
    }

    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let bytes = render_pdf(&laid_out(&DocumentModel::default()), &PageGeometry::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
