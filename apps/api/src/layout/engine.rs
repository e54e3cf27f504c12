//! Layout orchestration: threads one cursor through the section renderers in
//! document order and groups what they emit into pages.
//!
//! CPU-bound; HTTP handlers call it from `tokio::task::spawn_blocking`.

use tracing::debug;

use crate::layout::commands::{LaidOutDocument, PlacedCommand};
use crate::layout::font_metrics::TextMeasurer;
use crate::layout::geometry::{LayoutCursor, PageGeometry};
use crate::layout::sections::{
    render_education, render_experience, render_footer, render_header, render_skills,
    render_summary, LayoutContext, SectionOutput,
};
use crate::layout::theme::Theme;
use crate::layout::LayoutError;
use crate::models::cv::DocumentModel;

/// Lays out `model` on pages of `geometry` in the look of `theme`.
///
/// Pure function of its inputs: the same model, geometry, theme and measurer
/// always produce an identical document.
pub fn generate_document(
    model: &DocumentModel,
    geometry: &PageGeometry,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) -> Result<LaidOutDocument, LayoutError> {
    geometry.validate()?;
    let ctx = LayoutContext {
        geometry,
        theme,
        measurer,
    };

    let mut placed: Vec<PlacedCommand> = Vec::new();
    let mut absorb = |out: SectionOutput| -> LayoutCursor {
        placed.extend(out.commands);
        out.cursor
    };

    let cursor = LayoutCursor::start(geometry);
    let cursor = absorb(render_header(cursor, &model.personal_info, &ctx)?);
    let cursor = absorb(render_summary(cursor, &model.personal_info.summary, &ctx)?);
    let cursor = absorb(render_experience(cursor, &model.experience, &ctx)?);
    let cursor = absorb(render_education(cursor, &model.education, &ctx)?);
    let cursor = absorb(render_skills(cursor, &model.skills, &ctx)?);
    let cursor = absorb(render_footer(cursor, theme.footer.as_deref(), &ctx)?);

    let page_count = cursor.page + 1;
    let command_count = placed.len();
    let document = LaidOutDocument::assemble(model.export_file_name(), page_count, placed);
    debug!(
        pages = document.pages.len(),
        commands = command_count,
        file_name = %document.file_name,
        "layout complete"
    );
    Ok(document)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::commands::DrawCommand;
    use crate::layout::font_metrics::{FontSpec, HelveticaMetrics, MonospaceMeasurer};
    use crate::layout::page_fill::{analyze_pages, PageFillVerdict};
    use crate::layout::sections::{EXPERIENCE_TITLE, SKILLS_TITLE, SUMMARY_TITLE};
    use crate::models::cv::{EducationEntry, ExperienceEntry, PersonalInfo, SkillGroup};

    fn experience(i: usize, description: &str) -> ExperienceEntry {
        ExperienceEntry {
            id: format!("exp-{i}"),
            company: format!("Company {i}"),
            position: format!("Role {i}"),
            start_date: "2018-03".to_string(),
            end_date: "2020-11".to_string(),
            current: false,
            description: description.to_string(),
        }
    }

    fn full_model() -> DocumentModel {
        DocumentModel {
            personal_info: PersonalInfo {
                full_name: "Ama Mensah".to_string(),
                email: "ama@example.com".to_string(),
                phone: "+233 20 000 0000".to_string(),
                location: "Accra".to_string(),
                linked_in: None,
                portfolio: None,
                summary: "Backend engineer focused on payment systems.".to_string(),
            },
            education: vec![EducationEntry {
                id: "edu".to_string(),
                institution: "KNUST".to_string(),
                degree: "BSc".to_string(),
                field: "Computer Engineering".to_string(),
                start_date: "2012-09".to_string(),
                end_date: "2016-06".to_string(),
                gpa: Some("3.7".to_string()),
            }],
            experience: vec![experience(0, "Built the settlement service.")],
            skills: vec![SkillGroup {
                id: "sk".to_string(),
                category: "Languages".to_string(),
                items: vec!["Rust".to_string(), "Go".to_string(), "SQL".to_string()],
            }],
        }
    }

    fn layout(model: &DocumentModel) -> LaidOutDocument {
        generate_document(
            model,
            &PageGeometry::default(),
            &Theme::default(),
            &HelveticaMetrics,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_model_is_one_page_with_placeholder_name() {
        let doc = layout(&DocumentModel::default());
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.texts().collect::<Vec<_>>(), vec!["Your Name"]);
        assert_eq!(doc.file_name, "CV_Resume.pdf");
    }

    #[test]
    fn test_sections_appear_in_document_order() {
        let doc = layout(&full_model());
        let texts: Vec<&str> = doc.texts().collect();
        let pos = |needle: &str| texts.iter().position(|t| *t == needle).unwrap();
        assert!(pos("Ama Mensah") < pos(SUMMARY_TITLE));
        assert!(pos(SUMMARY_TITLE) < pos(EXPERIENCE_TITLE));
        assert!(pos(EXPERIENCE_TITLE) < pos("EDUCATION"));
        assert!(pos("EDUCATION") < pos(SKILLS_TITLE));
        assert!(texts.iter().any(|t| t.contains("Sep 2012 \u{2013} Jun 2016")));
        assert_eq!(doc.file_name, "Ama Mensah_Resume.pdf");
    }

    #[test]
    fn test_generation_is_idempotent() {
        let model = full_model();
        assert_eq!(layout(&model), layout(&model));
    }

    #[test]
    fn test_twenty_entries_paginate_without_splitting() {
        let description = "Owned the reconciliation pipeline end to end.\n\
                           Cut settlement latency from hours to minutes.\n\
                           Mentored four engineers.";
        let model = DocumentModel {
            experience: (0..20).map(|i| experience(i, description)).collect(),
            ..full_model()
        };
        let geometry = PageGeometry::default();
        let doc = layout(&model);
        assert!(doc.pages.len() > 1);

        // Each entry's role line and last description line share a page.
        for i in 0..20 {
            let role = format!("Role {i}");
            let page_of_role = doc
                .pages
                .iter()
                .position(|p| p.commands.iter().any(|c| c.text() == Some(role.as_str())))
                .unwrap();
            let page = &doc.pages[page_of_role];
            let role_index = page
                .commands
                .iter()
                .position(|c| c.text() == Some(role.as_str()))
                .unwrap();
            assert!(
                page.commands[role_index..]
                    .iter()
                    .any(|c| c.text() == Some("Mentored four engineers.")),
                "entry {i} was split across pages"
            );
        }

        for page in &doc.pages {
            for command in &page.commands {
                if let DrawCommand::Text { y, .. } = command {
                    assert!(*y <= geometry.page_bottom(), "text below bottom at {y}");
                }
            }
        }
    }

    #[test]
    fn test_baselines_never_move_up_within_a_page() {
        let model = DocumentModel {
            experience: (0..12)
                .map(|i| experience(i, "Line one.\nLine two."))
                .collect(),
            ..full_model()
        };
        let doc = layout(&model);
        for page in &doc.pages {
            let ys: Vec<f32> = page
                .commands
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::Text { y, .. } => Some(*y),
                    _ => None,
                })
                .collect();
            assert!(
                ys.windows(2).all(|w| w[0] <= w[1]),
                "page {} baselines out of order: {ys:?}",
                page.index
            );
        }
    }

    #[test]
    fn test_oversized_entry_does_not_loop() {
        let huge = (0..80)
            .map(|i| format!("Line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let model = DocumentModel {
            experience: vec![experience(0, "short"), experience(1, &huge)],
            ..DocumentModel::default()
        };
        let geometry = PageGeometry::default();
        let doc = layout(&model);
        assert_eq!(doc.pages.len(), 2);
        let analysis = analyze_pages(&doc, &geometry);
        assert_eq!(analysis[1].verdict, PageFillVerdict::Overflow);
    }

    #[test]
    fn test_footer_lands_on_last_page() {
        let model = DocumentModel {
            experience: (0..15).map(|i| experience(i, "One.\nTwo.\nThree.")).collect(),
            ..full_model()
        };
        let theme = Theme::default().with_footer(Some("Generated by CVForge".to_string()));
        let doc = generate_document(
            &model,
            &PageGeometry::default(),
            &theme,
            &HelveticaMetrics,
        )
        .unwrap();
        let last = doc.pages.last().unwrap();
        assert!(last
            .commands
            .iter()
            .any(|c| c.text() == Some("Generated by CVForge")));
        assert_eq!(
            doc.texts().filter(|t| *t == "Generated by CVForge").count(),
            1
        );
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let geometry = PageGeometry {
            margin: 200.0,
            ..PageGeometry::default()
        };
        let err = generate_document(
            &full_model(),
            &geometry,
            &Theme::default(),
            &HelveticaMetrics,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidGeometry(_)));
    }

    #[test]
    fn test_broken_measurer_surfaces_error() {
        struct Broken;
        impl TextMeasurer for Broken {
            fn text_width(&self, _text: &str, _font: FontSpec) -> f32 {
                f32::NAN
            }
        }
        let err = generate_document(
            &full_model(),
            &PageGeometry::default(),
            &Theme::default(),
            &Broken,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Measurement { .. }));
    }

    #[test]
    fn test_any_measurer_can_drive_layout() {
        let doc = generate_document(
            &full_model(),
            &PageGeometry::default(),
            &Theme::plain(),
            &MonospaceMeasurer::default(),
        )
        .unwrap();
        assert_eq!(doc.pages.len(), 1);
    }
}
