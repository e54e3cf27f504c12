//! Visual parameters for a layout. A theme changes colours, sizes and the header
//! treatment; the layout algorithm is the same for every theme.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
}

/// How the name block at the top of page 1 is decorated.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderTreatment {
    /// No band; name and contacts drawn in text colours on the page.
    Plain,
    /// One full-width band.
    Solid { fill: Rgb },
    /// A full-width band with a second colour over its right-hand fraction.
    Banded {
        fill: Rgb,
        accent_fill: Rgb,
        accent_fraction: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStyle {
    pub treatment: HeaderTreatment,
    pub band_height: f32,
    pub name_font: FontSpec,
    pub name_color: Rgb,
    /// Baseline of the name, measured from the top edge.
    pub name_baseline: f32,
    pub contact_font: FontSpec,
    pub contact_color: Rgb,
    /// Gap between the name baseline and the first contact row.
    pub contact_offset: f32,
    /// Horizontal gap between contact fields.
    pub contact_spacing: f32,
    pub contact_row_height: f32,
    /// Space between the header block and the first section.
    pub gap_after: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipColors {
    pub fill: Rgb,
    pub text: Rgb,
    pub border: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChipStyle {
    pub font: FontSpec,
    pub padding: f32,
    pub height: f32,
    pub radius: f32,
    pub border_width: f32,
    /// Horizontal gap between chips in a row.
    pub gap: f32,
    /// Vertical gap between chip rows.
    pub row_gap: f32,
    /// Rotated by item index; an empty palette falls back to `FALLBACK_CHIP`.
    pub palette: Vec<ChipColors>,
}

impl ChipStyle {
    /// Colours for the chip at `item_index` within its group.
    pub fn colors_for(&self, item_index: usize) -> ChipColors {
        self.palette
            .get(palette_index(item_index, self.palette.len()))
            .copied()
            .unwrap_or(FALLBACK_CHIP)
    }
}

pub const FALLBACK_CHIP: ChipColors = ChipColors {
    fill: Rgb::new(243, 244, 246),
    text: Rgb::BLACK,
    border: None,
};

/// Deterministic colour rotation: `item_index mod palette_size`.
pub fn palette_index(item_index: usize, palette_size: usize) -> usize {
    if palette_size == 0 {
        0
    } else {
        item_index % palette_size
    }
}

/// How `YYYY-MM` dates appear in entry date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// Exactly as entered, e.g. `2023-06`.
    AsEntered,
    /// Abbreviated month and year, e.g. `Jun 2023`.
    #[default]
    MonthYear,
}

impl FromStr for DateStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "as_entered" | "raw" => Ok(DateStyle::AsEntered),
            "month_year" => Ok(DateStyle::MonthYear),
            other => Err(format!("unknown date style '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub header: HeaderStyle,
    pub accent: Rgb,
    pub heading_text: Rgb,
    pub body_text: Rgb,
    pub muted_text: Rgb,
    pub section_title_font: FontSpec,
    pub section_rule_width: f32,
    pub entry_title_font: FontSpec,
    pub education_title_font: FontSpec,
    pub subtitle_font: FontSpec,
    pub body_font: FontSpec,
    pub description_font: FontSpec,
    pub skill_label_font: FontSpec,
    pub chip: ChipStyle,
    pub date_style: DateStyle,
    /// Caption centred at the foot of the final page.
    pub footer: Option<String>,
    pub footer_font: FontSpec,
}

/// The built-in looks offered by the export dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    Plain,
    #[default]
    Banded,
    Chips,
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(ThemeName::Plain),
            "banded" => Ok(ThemeName::Banded),
            "chips" => Ok(ThemeName::Chips),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

const BLUE: Rgb = Rgb::new(59, 130, 246);
const PURPLE: Rgb = Rgb::new(147, 51, 234);
const SLATE: Rgb = Rgb::new(75, 85, 99);
const GREY: Rgb = Rgb::new(107, 114, 128);

impl Theme {
    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Plain => Self::plain(),
            ThemeName::Banded => Self::banded(),
            ThemeName::Chips => Self::chips(),
        }
    }

    /// Blue and purple header band, single light-blue chip colour.
    pub fn banded() -> Self {
        Self {
            header: HeaderStyle {
                treatment: HeaderTreatment::Banded {
                    fill: BLUE,
                    accent_fill: PURPLE,
                    accent_fraction: 0.3,
                },
                band_height: 60.0,
                name_font: FontSpec::bold(28.0),
                name_color: Rgb::WHITE,
                name_baseline: 20.0,
                contact_font: FontSpec::regular(11.0),
                contact_color: Rgb::WHITE,
                contact_offset: 15.0,
                contact_spacing: 15.0,
                contact_row_height: 8.0,
                gap_after: 15.0,
            },
            accent: BLUE,
            heading_text: Rgb::BLACK,
            body_text: SLATE,
            muted_text: GREY,
            section_title_font: FontSpec::bold(16.0),
            section_rule_width: 0.8,
            entry_title_font: FontSpec::bold(14.0),
            education_title_font: FontSpec::bold(13.0),
            subtitle_font: FontSpec::bold(11.0),
            body_font: FontSpec::regular(11.0),
            description_font: FontSpec::regular(10.0),
            skill_label_font: FontSpec::bold(12.0),
            chip: ChipStyle {
                font: FontSpec::regular(10.0),
                padding: 3.0,
                height: 6.0,
                radius: 2.0,
                border_width: 0.3,
                gap: 5.0,
                row_gap: 3.0,
                palette: vec![ChipColors {
                    fill: Rgb::new(219, 234, 254),
                    text: Rgb::new(30, 64, 175),
                    border: None,
                }],
            },
            date_style: DateStyle::MonthYear,
            footer: None,
            footer_font: FontSpec::regular(8.0),
        }
    }

    /// Text-only header, grey chips.
    pub fn plain() -> Self {
        let mut theme = Self::banded();
        theme.header.treatment = HeaderTreatment::Plain;
        theme.header.name_color = Rgb::new(17, 24, 39);
        theme.header.contact_color = SLATE;
        theme.header.band_height = 0.0;
        theme.accent = Rgb::new(31, 41, 55);
        theme.chip.palette = vec![ChipColors {
            fill: Rgb::new(243, 244, 246),
            text: Rgb::new(31, 41, 55),
            border: None,
        }];
        theme
    }

    /// Solid band and a rotating, bordered chip palette.
    pub fn chips() -> Self {
        let mut theme = Self::banded();
        theme.header.treatment = HeaderTreatment::Solid { fill: BLUE };
        theme.chip.palette = vec![
            ChipColors {
                fill: Rgb::new(219, 234, 254),
                text: Rgb::new(30, 64, 175),
                border: Some(Rgb::new(147, 197, 253)),
            },
            ChipColors {
                fill: Rgb::new(243, 232, 255),
                text: Rgb::new(107, 33, 168),
                border: Some(Rgb::new(216, 180, 254)),
            },
            ChipColors {
                fill: Rgb::new(220, 252, 231),
                text: Rgb::new(22, 101, 52),
                border: Some(Rgb::new(134, 239, 172)),
            },
            ChipColors {
                fill: Rgb::new(254, 243, 199),
                text: Rgb::new(146, 64, 14),
                border: Some(Rgb::new(252, 211, 77)),
            },
        ];
        theme
    }

    pub fn with_footer(mut self, caption: Option<String>) -> Self {
        self.footer = caption.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_date_style(mut self, date_style: DateStyle) -> Self {
        self.date_style = date_style;
        self
    }

    pub fn has_band(&self) -> bool {
        !matches!(self.header.treatment, HeaderTreatment::Plain)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::banded()
    }
}
