//! Draw commands produced by layout. Coordinates are millimetres from the top-left
//! corner of the page; text `y` is the baseline.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontSpec;
use crate::layout::theme::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Text {
        x: f32,
        y: f32,
        content: String,
        style: TextStyle,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    RoundedRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<Rgb>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stroke: Option<Stroke>,
    },
}

impl DrawCommand {
    /// Lowest point the command paints, ignoring glyph descenders.
    pub fn bottom(&self) -> f32 {
        match self {
            DrawCommand::Text { y, .. } => *y,
            DrawCommand::Rect { y, h, .. } | DrawCommand::RoundedRect { y, h, .. } => y + h,
            DrawCommand::Line { y1, y2, .. } => y1.max(*y2),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// A command tagged with the page it belongs to. Renderers emit these so that
/// page allocation stays a property of the cursor rather than of shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCommand {
    pub page: usize,
    pub command: DrawCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based.
    pub index: usize,
    pub commands: Vec<DrawCommand>,
}

/// Finished layout: every page in order plus the name the export should be saved under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutDocument {
    pub file_name: String,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    /// Groups placed commands into `page_count` pages, keeping emission order.
    pub fn assemble(file_name: String, page_count: usize, placed: Vec<PlacedCommand>) -> Self {
        let mut pages: Vec<Page> = (0..page_count)
            .map(|index| Page {
                index,
                commands: Vec::new(),
            })
            .collect();
        for PlacedCommand { page, command } in placed {
            if page >= pages.len() {
                pages.extend((pages.len()..=page).map(|index| Page {
                    index,
                    commands: Vec::new(),
                }));
            }
            pages[page].commands.push(command);
        }
        Self { file_name, pages }
    }

    /// All text runs in document order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter_map(DrawCommand::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(y: f32, content: &str) -> DrawCommand {
        DrawCommand::Text {
            x: 0.0,
            y,
            content: content.to_string(),
            style: TextStyle {
                font: FontSpec::regular(10.0),
                color: Rgb::BLACK,
            },
        }
    }

    #[test]
    fn test_assemble_groups_by_page_in_order() {
        let placed = vec![
            PlacedCommand {
                page: 0,
                command: text(10.0, "a"),
            },
            PlacedCommand {
                page: 1,
                command: text(20.0, "b"),
            },
            PlacedCommand {
                page: 0,
                command: text(30.0, "c"),
            },
        ];
        let doc = LaidOutDocument::assemble("x.pdf".into(), 1, placed);
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].commands.len(), 2);
        assert_eq!(doc.pages[1].index, 1);
        assert_eq!(doc.texts().collect::<Vec<_>>(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_assemble_keeps_empty_leading_page() {
        let doc = LaidOutDocument::assemble("x.pdf".into(), 1, vec![]);
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].commands.is_empty());
    }

    #[test]
    fn test_bottom_of_shapes() {
        let rect = DrawCommand::Rect {
            x: 0.0,
            y: 10.0,
            w: 5.0,
            h: 4.0,
            fill: Rgb::BLACK,
        };
        assert_eq!(rect.bottom(), 14.0);
        let line = DrawCommand::Line {
            x1: 0.0,
            y1: 8.0,
            x2: 5.0,
            y2: 3.0,
            width: 1.0,
            color: Rgb::BLACK,
        };
        assert_eq!(line.bottom(), 8.0);
    }

    #[test]
    fn test_serializes_with_op_tag() {
        let json = serde_json::to_value(text(5.0, "hi")).unwrap();
        assert_eq!(json["op"], "text");
        assert_eq!(json["content"], "hi");
    }
}
