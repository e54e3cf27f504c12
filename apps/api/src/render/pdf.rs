//! PDF surface built on pdf-writer.
//!
//! Uses the two standard Type 1 fonts Helvetica and Helvetica-Bold, so nothing is
//! embedded and the glyph widths match `HelveticaMetrics`. Text is encoded as
//! WinAnsi; characters outside it are written as `?`.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::layout::commands::Stroke;
use crate::layout::font_metrics::{FontSpec, FontWeight, MM_PER_PT};
use crate::layout::theme::Rgb;
use crate::render::{DrawingSurface, RenderError};

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

/// Bézier control-point offset for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

fn pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

fn rgb(color: Rgb) -> (f32, f32, f32) {
    (
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
    )
}

struct PdfPage {
    width_pt: f32,
    height_pt: f32,
    content: Content,
}

impl PdfPage {
    /// Converts a top-left millimetre `y` into a bottom-left point `y`.
    fn flip(&self, y_mm: f32) -> f32 {
        self.height_pt - pt(y_mm)
    }
}

pub struct PdfSurface {
    pages: Vec<PdfPage>,
    font: FontSpec,
    text_color: Rgb,
}

impl Default for PdfSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfSurface {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            font: FontSpec::regular(11.0),
            text_color: Rgb::BLACK,
        }
    }

    fn page(&mut self) -> Result<&mut PdfPage, RenderError> {
        self.pages.last_mut().ok_or(RenderError::NoPage)
    }
}

impl DrawingSurface for PdfSurface {
    fn add_page(&mut self, width: f32, height: f32) {
        self.pages.push(PdfPage {
            width_pt: pt(width),
            height_pt: pt(height),
            content: Content::new(),
        });
    }

    fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), RenderError> {
        let font = self.font;
        let (r, g, b) = rgb(self.text_color);
        let encoded = encode_win_ansi(text);
        let page = self.page()?;
        let baseline = page.flip(y);
        let name = match font.weight {
            FontWeight::Regular => REGULAR_FONT,
            FontWeight::Bold => BOLD_FONT,
        };
        page.content.set_fill_rgb(r, g, b);
        page.content
            .begin_text()
            .set_font(name, font.size_pt)
            .next_line(pt(x), baseline)
            .show(Str(&encoded))
            .end_text();
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) -> Result<(), RenderError> {
        let (r, g, b) = rgb(fill);
        let page = self.page()?;
        let bottom = page.flip(y + h);
        page.content.set_fill_rgb(r, g, b);
        page.content.rect(pt(x), bottom, pt(w), pt(h));
        page.content.fill_nonzero();
        Ok(())
    }

    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    ) -> Result<(), RenderError> {
        let (r, g, b) = rgb(color);
        let page = self.page()?;
        let (from, to) = (page.flip(y1), page.flip(y2));
        page.content.set_stroke_rgb(r, g, b);
        page.content.set_line_width(pt(width));
        page.content.move_to(pt(x1), from);
        page.content.line_to(pt(x2), to);
        page.content.stroke();
        Ok(())
    }

    fn draw_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    ) -> Result<(), RenderError> {
        if fill.is_none() && stroke.is_none() {
            return Ok(());
        }
        let page = self.page()?;
        let (x, w, h) = (pt(x), pt(w), pt(h));
        let y = page.flip(y) - h;
        let r = pt(radius).clamp(0.0, w.min(h) / 2.0);
        let c = r * KAPPA;
        let content = &mut page.content;

        if let Some(color) = fill {
            let (cr, cg, cb) = rgb(color);
            content.set_fill_rgb(cr, cg, cb);
        }
        if let Some(stroke) = stroke {
            let (sr, sg, sb) = rgb(stroke.color);
            content.set_stroke_rgb(sr, sg, sb);
            content.set_line_width(pt(stroke.width));
        }

        content.move_to(x + r, y + h);
        content.line_to(x + w - r, y + h);
        content.cubic_to(x + w - r + c, y + h, x + w, y + h - r + c, x + w, y + h - r);
        content.line_to(x + w, y + r);
        content.cubic_to(x + w, y + r - c, x + w - r + c, y, x + w - r, y);
        content.line_to(x + r, y);
        content.cubic_to(x + r - c, y, x, y + r - c, x, y + r);
        content.line_to(x, y + h - r);
        content.cubic_to(x, y + h - r + c, x + r - c, y + h, x + r, y + h);
        content.close_path();

        match (fill.is_some(), stroke.is_some()) {
            (true, true) => content.fill_nonzero_and_stroke(),
            (true, false) => content.fill_nonzero(),
            _ => content.stroke(),
        };
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        if self.pages.is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let regular_id = Ref::new(3);
        let bold_id = Ref::new(4);
        // Each page takes two refs: the page object and its content stream.
        let page_ids: Vec<Ref> = (0..self.pages.len())
            .map(|i| Ref::new(5 + 2 * i as i32))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(self.pages.len() as i32);

        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for (page, page_id) in self.pages.into_iter().zip(page_ids) {
            let content_id = Ref::new(page_id.get() + 1);
            {
                let mut pdf_page = pdf.page(page_id);
                pdf_page
                    .media_box(Rect::new(0.0, 0.0, page.width_pt, page.height_pt))
                    .parent(page_tree_id)
                    .contents(content_id);
                let mut resources = pdf_page.resources();
                resources
                    .fonts()
                    .pair(REGULAR_FONT, regular_id)
                    .pair(BOLD_FONT, bold_id);
                resources.finish();
                pdf_page.finish();
            }
            pdf.stream(content_id, &page.content.finish());
        }

        Ok(pdf.finish())
    }
}

/// Encodes `text` as WinAnsi (Windows-1252). Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{201a}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201e}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02c6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8a,
            '\u{2039}' => 0x8b,
            '\u{0152}' => 0x8c,
            '\u{017d}' => 0x8e,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02dc}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9a,
            '\u{203a}' => 0x9b,
            '\u{0153}' => 0x9c,
            '\u{017e}' => 0x9e,
            '\u{0178}' => 0x9f,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engine::generate_document;
    use crate::layout::font_metrics::HelveticaMetrics;
    use crate::layout::geometry::PageGeometry;
    use crate::layout::theme::Theme;
    use crate::models::cv::{DocumentModel, ExperienceEntry, SkillGroup};
    use crate::render::render_pdf;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn sample_model(entries: usize) -> DocumentModel {
        let mut model = DocumentModel::default();
        model.personal_info.full_name = "Ama Mensah".to_string();
        model.experience = (0..entries)
            .map(|i| ExperienceEntry {
                id: format!("e{i}"),
                company: "Hubtel".to_string(),
                position: "Engineer".to_string(),
                start_date: "2020-01".to_string(),
                end_date: String::new(),
                current: true,
                description: "Line one.\nLine two.\nLine three.".to_string(),
            })
            .collect();
        model.skills.push(SkillGroup {
            id: "s".to_string(),
            category: "Languages".to_string(),
            items: vec!["Rust".to_string(), "Go".to_string()],
        });
        model
    }

    fn pdf_for(model: &DocumentModel, theme: &Theme) -> Vec<u8> {
        let geometry = PageGeometry::default();
        let doc = generate_document(model, &geometry, theme, &HelveticaMetrics).unwrap();
        render_pdf(&doc, &geometry).unwrap()
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Jan \u{2013} Present"), b"Jan \x96 Present");
        assert_eq!(encode_win_ansi("Caf\u{e9}"), b"Caf\xe9");
        assert_eq!(encode_win_ansi("\u{4e2d}"), b"?");
    }

    #[test]
    fn test_pdf_structure() {
        let bytes = pdf_for(&sample_model(1), &Theme::banded());
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
        assert!(contains(&bytes, b"(Ama Mensah) Tj"));
        assert!(contains(&bytes, b"/Count 1"));
    }

    #[test]
    fn test_page_count_matches_layout() {
        let model = sample_model(14);
        let geometry = PageGeometry::default();
        let doc = generate_document(&model, &geometry, &Theme::banded(), &HelveticaMetrics)
            .unwrap();
        let bytes = render_pdf(&doc, &geometry).unwrap();
        let count = format!("/Count {}", doc.pages.len());
        assert!(doc.pages.len() > 1);
        assert!(contains(&bytes, count.as_bytes()));
    }

    #[test]
    fn test_output_is_deterministic() {
        let model = sample_model(3);
        let theme = Theme::chips();
        assert_eq!(pdf_for(&model, &theme), pdf_for(&model, &theme));
    }

    #[test]
    fn test_a4_media_box_in_points() {
        let mut surface = PdfSurface::new();
        surface.add_page(210.0, 297.0);
        let page = &surface.pages[0];
        assert!((page.width_pt - 595.28).abs() < 0.01);
        assert!((page.height_pt - 841.89).abs() < 0.01);
        assert!((page.flip(0.0) - page.height_pt).abs() < 1e-3);
    }

    #[test]
    fn test_win_ansi_covers_latin_extended_names() {
        assert_eq!(encode_win_ansi("Šimić Žižek"), b"\x8aimi? \x8ei\x9eek".to_vec());
        assert_eq!(encode_win_ansi("Œuvre Ÿ œ"), b"\x8cuvre \x9f \x9c".to_vec());
        assert_eq!(
            encode_win_ansi("ƒ‰†‡‹›ˆ˜"),
            vec![0x83, 0x89, 0x86, 0x87, 0x8b, 0x9b, 0x88, 0x98]
        );
        assert_eq!(encode_win_ansi("é \u{2013} 漢"), vec![0xe9, b' ', 0x96, b' ', b'?']);
    }

    #[test]
    fn test_draw_before_page_is_an_error() {
        let mut surface = PdfSurface::new();
        assert!(matches!(
            surface.draw_text(10.0, 10.0, "x"),
            Err(RenderError::NoPage)
        ));
        assert!(matches!(
            DrawingSurface::finish(surface),
            Err(RenderError::EmptyDocument)
        ));
    }
}
