//! Section renderers.
//!
//! Each renderer takes the incoming cursor and its slice of the document and
//! returns the outgoing cursor together with the commands it placed. Nothing is
//! shared between renderers except what flows through the cursor, so each can be
//! exercised on its own from a synthetic starting position.
//!
//! Page breaks are decided before a block is drawn, from an estimated height
//! computed out of the block's own content (line count × line height + fixed
//! chrome). Entries are atomic; only a block taller than a whole page body runs
//! past the bottom threshold.

use chrono::NaiveDate;
use tracing::warn;

use crate::layout::chips::{layout_chips, row_count, ChipPlacement};
use crate::layout::commands::{DrawCommand, PlacedCommand, Stroke, TextStyle};
use crate::layout::font_metrics::{measure_width, FontSpec, TextMeasurer};
use crate::layout::geometry::{ensure_space, LayoutCursor, PageBreak, PageGeometry};
use crate::layout::theme::{DateStyle, HeaderTreatment, Rgb, Theme};
use crate::layout::wrap::{block_height, wrap};
use crate::layout::LayoutError;
use crate::models::cv::{present, EducationEntry, ExperienceEntry, PersonalInfo, SkillGroup};

// ────────────────────────────────────────────────────────────────────────────
// Vertical rhythm (millimetres)
// ────────────────────────────────────────────────────────────────────────────

const TITLE_ADVANCE: f32 = 12.0;
const TITLE_RULE_OFFSET: f32 = 2.0;
const SUMMARY_GAP: f32 = 10.0;

const POSITION_ADVANCE: f32 = 8.0;
const COMPANY_ADVANCE: f32 = 8.0;
const EXPERIENCE_GAP: f32 = 8.0;

const DEGREE_ADVANCE: f32 = 7.0;
const INSTITUTION_ADVANCE: f32 = 6.0;
const GPA_ADVANCE: f32 = 6.0;
const EDUCATION_GAP: f32 = 6.0;

const SKILL_LABEL_ADVANCE: f32 = 7.0;
const SKILL_GROUP_GAP: f32 = 5.0;

pub const PLACEHOLDER_NAME: &str = "Your Name";
pub const PRESENT: &str = "Present";
const RANGE_SEPARATOR: &str = " \u{2013} ";

pub const SUMMARY_TITLE: &str = "PROFESSIONAL SUMMARY";
pub const EXPERIENCE_TITLE: &str = "PROFESSIONAL EXPERIENCE";
pub const EDUCATION_TITLE: &str = "EDUCATION";
pub const SKILLS_TITLE: &str = "SKILLS";

// ────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Everything a renderer reads besides its own data. Borrowed, never mutated.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub geometry: &'a PageGeometry,
    pub theme: &'a Theme,
    pub measurer: &'a dyn TextMeasurer,
}

impl LayoutContext<'_> {
    fn width(&self, text: &str, font: FontSpec) -> Result<f32, LayoutError> {
        measure_width(self.measurer, text, font)
    }

    fn wrap_body(&self, text: &str, font: FontSpec) -> Result<Vec<String>, LayoutError> {
        wrap(text, self.geometry.content_width(), font, self.measurer)
    }
}

/// Result of one renderer: where the next one starts and what this one drew.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutput {
    pub cursor: LayoutCursor,
    pub commands: Vec<PlacedCommand>,
}

impl SectionOutput {
    fn skipped(cursor: LayoutCursor) -> Self {
        Self {
            cursor,
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SectionPhase {
    NotStarted,
    HeaderDrawn,
    BodyDrawn,
    Done,
}

/// Collects commands for one section and tracks its phase. Phases only move forward.
struct SectionWriter {
    phase: SectionPhase,
    commands: Vec<PlacedCommand>,
}

impl SectionWriter {
    fn new() -> Self {
        Self {
            phase: SectionPhase::NotStarted,
            commands: Vec::new(),
        }
    }

    fn enter(&mut self, phase: SectionPhase) {
        debug_assert!(
            phase >= self.phase,
            "section phase moved backwards: {:?} -> {phase:?}",
            self.phase
        );
        self.phase = phase;
    }

    fn push(&mut self, cursor: LayoutCursor, command: DrawCommand) {
        self.commands.push(PlacedCommand {
            page: cursor.page,
            command,
        });
    }

    fn text(&mut self, cursor: LayoutCursor, x: f32, content: &str, font: FontSpec, color: Rgb) {
        self.push(
            cursor,
            DrawCommand::Text {
                x,
                y: cursor.y,
                content: content.to_string(),
                style: TextStyle { font, color },
            },
        );
    }

    fn finish(mut self, cursor: LayoutCursor) -> SectionOutput {
        self.enter(SectionPhase::Done);
        SectionOutput {
            cursor,
            commands: self.commands,
        }
    }
}

/// Styled section heading with an underline as long as the heading text.
fn section_title(
    writer: &mut SectionWriter,
    cursor: LayoutCursor,
    title: &str,
    ctx: &LayoutContext<'_>,
) -> Result<LayoutCursor, LayoutError> {
    let theme = ctx.theme;
    let font = theme.section_title_font;
    let left = ctx.geometry.content_left();
    let width = ctx.width(title, font)?;

    writer.text(cursor, left, title, font, theme.accent);
    let rule_y = cursor.y + TITLE_RULE_OFFSET;
    writer.push(
        cursor,
        DrawCommand::Line {
            x1: left,
            y1: rule_y,
            x2: left + width,
            y2: rule_y,
            width: theme.section_rule_width,
            color: theme.accent,
        },
    );
    writer.enter(SectionPhase::HeaderDrawn);
    Ok(cursor.advance(TITLE_ADVANCE))
}

/// Draws `text` so that it ends at the content right edge.
fn right_aligned(
    writer: &mut SectionWriter,
    cursor: LayoutCursor,
    text: &str,
    font: FontSpec,
    color: Rgb,
    ctx: &LayoutContext<'_>,
) -> Result<(), LayoutError> {
    let width = ctx.width(text, font)?;
    writer.text(cursor, ctx.geometry.content_right() - width, text, font, color);
    Ok(())
}

fn lines_at(
    writer: &mut SectionWriter,
    mut cursor: LayoutCursor,
    lines: &[String],
    font: FontSpec,
    color: Rgb,
    ctx: &LayoutContext<'_>,
) -> LayoutCursor {
    let left = ctx.geometry.content_left();
    for line in lines {
        writer.text(cursor, left, line, font, color);
        cursor = cursor.advance(ctx.geometry.line_height);
    }
    cursor
}

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

/// Formats a `YYYY-MM` value per `style`. Anything that does not parse is kept verbatim.
pub fn format_date(raw: &str, style: DateStyle) -> String {
    let raw = raw.trim();
    match style {
        DateStyle::AsEntered => raw.to_string(),
        DateStyle::MonthYear => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

/// `start – end`, collapsing to whichever side is present; `None` when both are blank.
pub fn date_range(start: &str, end: Option<&str>, style: DateStyle) -> Option<String> {
    let start = present(start).map(|s| format_date(s, style));
    let end = end.map(|e| {
        if e == PRESENT {
            e.to_string()
        } else {
            format_date(e, style)
        }
    });
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s}{RANGE_SEPARATOR}{e}")),
        (Some(s), None) => Some(s),
        (None, Some(e)) => Some(e),
        (None, None) => None,
    }
}

pub fn experience_dates(entry: &ExperienceEntry, style: DateStyle) -> Option<String> {
    let end = if entry.current {
        Some(PRESENT)
    } else {
        present(&entry.end_date)
    };
    date_range(&entry.start_date, end, style)
}

pub fn education_dates(entry: &EducationEntry, style: DateStyle) -> Option<String> {
    date_range(&entry.start_date, present(&entry.end_date), style)
}

/// `"{degree} in {field}"`, or whichever half is present.
pub fn degree_line(entry: &EducationEntry) -> Option<String> {
    match (present(&entry.degree), present(&entry.field)) {
        (Some(d), Some(f)) => Some(format!("{d} in {f}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(f)) => Some(f.to_string()),
        (None, None) => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Height estimates
// ────────────────────────────────────────────────────────────────────────────

/// Space an experience entry needs below its first baseline, trailing gap excluded.
pub fn experience_entry_height(description_lines: usize, line_height: f32) -> f32 {
    POSITION_ADVANCE + COMPANY_ADVANCE + block_height(description_lines, line_height)
}

/// Space an education entry needs below its first baseline, trailing gap excluded.
pub fn education_entry_height(entry: &EducationEntry) -> f32 {
    let gpa = if entry.gpa.as_deref().and_then(present).is_some() {
        GPA_ADVANCE
    } else {
        0.0
    };
    DEGREE_ADVANCE + INSTITUTION_ADVANCE + gpa
}

/// Space the label and first chip row of a skill group need.
fn skill_group_head_height(has_label: bool, chip_height: f32) -> f32 {
    let label = if has_label { SKILL_LABEL_ADVANCE } else { 0.0 };
    label + chip_height
}

// ────────────────────────────────────────────────────────────────────────────
// Header band + contacts
// ────────────────────────────────────────────────────────────────────────────

/// Band, name and contact rows on the first page. Never repeated on later pages.
pub fn render_header(
    cursor: LayoutCursor,
    info: &PersonalInfo,
    ctx: &LayoutContext<'_>,
) -> Result<SectionOutput, LayoutError> {
    let header = &ctx.theme.header;
    let geometry = ctx.geometry;
    let left = geometry.content_left();
    let right = geometry.content_right();
    let name = present(&info.full_name).unwrap_or(PLACEHOLDER_NAME);
    let name_at = LayoutCursor {
        page: cursor.page,
        y: header.name_baseline,
    };

    // Contact rows are flowed first so the band can be sized to cover them.
    let mut contacts = Vec::new();
    let mut row = name_at.advance(header.contact_offset);
    let mut x = left;
    let mut last_baseline = name_at.y;
    for field in info.contact_fields() {
        let width = ctx.width(field, header.contact_font)?;
        if x > left && x + width > right {
            row = row.advance(header.contact_row_height);
            x = left;
        }
        contacts.push((row, x, field));
        last_baseline = row.y;
        x += width + header.contact_spacing;
    }

    let band_height = if ctx.theme.has_band() {
        header
            .band_height
            .max(last_baseline + header.contact_row_height)
    } else {
        0.0
    };

    let mut writer = SectionWriter::new();
    let band_top = LayoutCursor {
        page: cursor.page,
        y: 0.0,
    };
    match header.treatment {
        HeaderTreatment::Plain => {}
        HeaderTreatment::Solid { fill } => writer.push(
            band_top,
            DrawCommand::Rect {
                x: 0.0,
                y: 0.0,
                w: geometry.width,
                h: band_height,
                fill,
            },
        ),
        HeaderTreatment::Banded {
            fill,
            accent_fill,
            accent_fraction,
        } => {
            writer.push(
                band_top,
                DrawCommand::Rect {
                    x: 0.0,
                    y: 0.0,
                    w: geometry.width,
                    h: band_height,
                    fill,
                },
            );
            let accent_width = geometry.width * accent_fraction.clamp(0.0, 1.0);
            writer.push(
                band_top,
                DrawCommand::Rect {
                    x: geometry.width - accent_width,
                    y: 0.0,
                    w: accent_width,
                    h: band_height,
                    fill: accent_fill,
                },
            );
        }
    }
    writer.enter(SectionPhase::HeaderDrawn);

    writer.text(name_at, left, name, header.name_font, header.name_color);
    for (at, x, field) in contacts {
        writer.text(at, x, field, header.contact_font, header.contact_color);
    }
    writer.enter(SectionPhase::BodyDrawn);

    let next = LayoutCursor {
        page: cursor.page,
        y: band_height.max(last_baseline) + header.gap_after,
    };
    Ok(writer.finish(next))
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

pub fn render_summary(
    cursor: LayoutCursor,
    summary: &str,
    ctx: &LayoutContext<'_>,
) -> Result<SectionOutput, LayoutError> {
    let Some(summary) = present(summary) else {
        return Ok(SectionOutput::skipped(cursor));
    };
    let theme = ctx.theme;
    let lines = ctx.wrap_body(summary, theme.body_font)?;
    let required = TITLE_ADVANCE + block_height(lines.len(), ctx.geometry.line_height);

    let mut writer = SectionWriter::new();
    let (cursor, _) = ensure_space(cursor, required, ctx.geometry);
    let cursor = section_title(&mut writer, cursor, SUMMARY_TITLE, ctx)?;
    let cursor = lines_at(&mut writer, cursor, &lines, theme.body_font, theme.body_text, ctx);
    writer.enter(SectionPhase::BodyDrawn);
    Ok(writer.finish(cursor.advance(SUMMARY_GAP)))
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

pub fn render_experience(
    cursor: LayoutCursor,
    entries: &[ExperienceEntry],
    ctx: &LayoutContext<'_>,
) -> Result<SectionOutput, LayoutError> {
    if entries.is_empty() {
        return Ok(SectionOutput::skipped(cursor));
    }
    let theme = ctx.theme;
    let line_height = ctx.geometry.line_height;

    let descriptions = entries
        .iter()
        .map(|e| ctx.wrap_body(&e.description, theme.description_font))
        .collect::<Result<Vec<_>, _>>()?;
    let heights: Vec<f32> = descriptions
        .iter()
        .map(|lines| experience_entry_height(lines.len(), line_height))
        .collect();

    let mut writer = SectionWriter::new();
    // The heading travels with the first entry.
    let (cursor, _) = ensure_space(cursor, TITLE_ADVANCE + heights[0], ctx.geometry);
    let mut cursor = section_title(&mut writer, cursor, EXPERIENCE_TITLE, ctx)?;

    for (i, (entry, lines)) in entries.iter().zip(&descriptions).enumerate() {
        if i > 0 {
            let (next, decision) = ensure_space(cursor, heights[i], ctx.geometry);
            if decision != PageBreak::Fits {
                tracing::debug!(entry = %entry.id, page = next.page, "experience entry moved to new page");
            }
            cursor = next;
        }

        if let Some(position) = present(&entry.position) {
            writer.text(
                cursor,
                ctx.geometry.content_left(),
                position,
                theme.entry_title_font,
                theme.heading_text,
            );
        }
        cursor = cursor.advance(POSITION_ADVANCE);

        if let Some(company) = present(&entry.company) {
            writer.text(
                cursor,
                ctx.geometry.content_left(),
                company,
                theme.subtitle_font,
                theme.accent,
            );
        }
        if let Some(dates) = experience_dates(entry, theme.date_style) {
            right_aligned(&mut writer, cursor, &dates, theme.body_font, theme.muted_text, ctx)?;
        }
        cursor = cursor.advance(COMPANY_ADVANCE);

        cursor = lines_at(
            &mut writer,
            cursor,
            lines,
            theme.description_font,
            theme.body_text,
            ctx,
        );
        cursor = cursor.advance(EXPERIENCE_GAP);
        writer.enter(SectionPhase::BodyDrawn);
    }

    Ok(writer.finish(cursor))
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

pub fn render_education(
    cursor: LayoutCursor,
    entries: &[EducationEntry],
    ctx: &LayoutContext<'_>,
) -> Result<SectionOutput, LayoutError> {
    if entries.is_empty() {
        return Ok(SectionOutput::skipped(cursor));
    }
    let theme = ctx.theme;
    let left = ctx.geometry.content_left();

    let mut writer = SectionWriter::new();
    let first = education_entry_height(&entries[0]);
    let (cursor, _) = ensure_space(cursor, TITLE_ADVANCE + first, ctx.geometry);
    let mut cursor = section_title(&mut writer, cursor, EDUCATION_TITLE, ctx)?;

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            cursor = ensure_space(cursor, education_entry_height(entry), ctx.geometry).0;
        }

        if let Some(title) = degree_line(entry) {
            writer.text(
                cursor,
                left,
                &title,
                theme.education_title_font,
                theme.heading_text,
            );
        }
        cursor = cursor.advance(DEGREE_ADVANCE);

        if let Some(institution) = present(&entry.institution) {
            writer.text(cursor, left, institution, theme.subtitle_font, theme.accent);
        }
        if let Some(dates) = education_dates(entry, theme.date_style) {
            right_aligned(&mut writer, cursor, &dates, theme.body_font, theme.muted_text, ctx)?;
        }
        cursor = cursor.advance(INSTITUTION_ADVANCE);

        if let Some(gpa) = entry.gpa.as_deref().and_then(present) {
            writer.text(
                cursor,
                left,
                &format!("GPA: {gpa}"),
                theme.body_font,
                theme.body_text,
            );
            cursor = cursor.advance(GPA_ADVANCE);
        }
        cursor = cursor.advance(EDUCATION_GAP);
        writer.enter(SectionPhase::BodyDrawn);
    }

    Ok(writer.finish(cursor))
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

struct PreparedGroup {
    label: Option<String>,
    chips: Vec<ChipPlacement>,
}

pub fn render_skills(
    cursor: LayoutCursor,
    groups: &[SkillGroup],
    ctx: &LayoutContext<'_>,
) -> Result<SectionOutput, LayoutError> {
    let theme = ctx.theme;
    let chip = &theme.chip;
    let left = ctx.geometry.content_left();
    let right = ctx.geometry.content_right();

    let prepared = groups
        .iter()
        .filter_map(|group| {
            let items = group.visible_items();
            if items.is_empty() {
                return None;
            }
            Some(
                layout_chips(&items, left, right, chip, ctx.measurer).map(|chips| PreparedGroup {
                    label: present(&group.category).map(|c| format!("{c}:")),
                    chips,
                }),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = prepared.first() else {
        return Ok(SectionOutput::skipped(cursor));
    };

    let mut writer = SectionWriter::new();
    let head = skill_group_head_height(first.label.is_some(), chip.height);
    let (cursor, _) = ensure_space(cursor, TITLE_ADVANCE + head, ctx.geometry);
    let mut cursor = section_title(&mut writer, cursor, SKILLS_TITLE, ctx)?;

    // Chip rectangles sit on the text baseline with a third of their height below it.
    let above_baseline = chip.height * 2.0 / 3.0;

    for (i, group) in prepared.iter().enumerate() {
        if i > 0 {
            let head = skill_group_head_height(group.label.is_some(), chip.height);
            cursor = ensure_space(cursor, head, ctx.geometry).0;
        }

        if let Some(label) = &group.label {
            writer.text(
                cursor,
                left,
                label,
                theme.skill_label_font,
                theme.heading_text,
            );
            cursor = cursor.advance(SKILL_LABEL_ADVANCE);
        }

        let rows = row_count(&group.chips);
        let mut row_cursor = cursor;
        for row in 0..rows {
            if row > 0 {
                row_cursor = row_cursor.advance(chip.height + chip.row_gap);
                row_cursor = ensure_space(row_cursor, chip.height, ctx.geometry).0;
            }
            for placement in group.chips.iter().filter(|p| p.row == row) {
                let colors = chip.colors_for(placement.item_index);
                writer.push(
                    row_cursor,
                    DrawCommand::RoundedRect {
                        x: placement.x,
                        y: row_cursor.y - above_baseline,
                        w: placement.width,
                        h: chip.height,
                        radius: chip.radius,
                        fill: Some(colors.fill),
                        stroke: colors.border.map(|color| Stroke {
                            color,
                            width: chip.border_width,
                        }),
                    },
                );
                writer.text(
                    row_cursor,
                    placement.x + chip.padding,
                    &placement.label,
                    chip.font,
                    colors.text,
                );
            }
        }
        cursor = row_cursor.advance(chip.height + SKILL_GROUP_GAP);
        writer.enter(SectionPhase::BodyDrawn);
    }

    Ok(writer.finish(cursor))
}

// ────────────────────────────────────────────────────────────────────────────
// Footer
// ────────────────────────────────────────────────────────────────────────────

/// Centred caption at the foot of the page the cursor is on (the final page).
/// Skipped when content on that page already runs past the caption baseline.
pub fn render_footer(
    cursor: LayoutCursor,
    caption: Option<&str>,
    ctx: &LayoutContext<'_>,
) -> Result<SectionOutput, LayoutError> {
    let Some(caption) = caption.and_then(present) else {
        return Ok(SectionOutput::skipped(cursor));
    };
    let theme = ctx.theme;
    let geometry = ctx.geometry;
    let width = ctx.width(caption, theme.footer_font)?;

    let at = LayoutCursor {
        page: cursor.page,
        y: geometry.height - geometry.bottom_threshold / 2.0,
    };
    if cursor.y > at.y {
        warn!(
            page = cursor.page,
            content_end = cursor.y,
            footer = at.y,
            "footer caption skipped: overflowing content reaches the page foot"
        );
        return Ok(SectionOutput::skipped(cursor));
    }

    let mut writer = SectionWriter::new();
    writer.enter(SectionPhase::HeaderDrawn);
    writer.text(
        at,
        (geometry.width - width) / 2.0,
        caption,
        theme.footer_font,
        theme.muted_text,
    );
    writer.enter(SectionPhase::BodyDrawn);
    Ok(writer.finish(cursor))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
