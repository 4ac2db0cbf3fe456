// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marks: renderer-agnostic visual elements with stable identity.

extern crate alloc;

use alloc::string::String;

use kurbo::{BezPath, Circle, Point, Rect, Shape};
use peniko::{Brush, Color};

use crate::table::TableId;

const ROW_KEY_BITS: u32 = 48;
const ROW_KEY_MASK: u64 = (1 << ROW_KEY_BITS) - 1;

/// Stable identity of a mark across renders.
///
/// Ids produced by [`MarkId::for_row`] put the table id in the top 16 bits and the low 48 bits
/// of the row key below it. Raw ids (guides, annotations) should stay below `1 << 48` so they
/// never collide with row-bound ids (table ids start at 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Wraps a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Id for the mark bound to `row_key` in `table`.
    pub fn for_row(table: TableId, row_key: u64) -> Self {
        let table = u64::from(table.0) & 0xFFFF;
        Self((table << ROW_KEY_BITS) | (row_key & ROW_KEY_MASK))
    }

    /// Inverse of [`MarkId::for_row`]; `None` for raw ids.
    pub fn table_row(self) -> Option<(TableId, u64)> {
        let table = self.0 >> ROW_KEY_BITS;
        if table == 0 {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "the table id occupies 16 bits by construction"
        )]
        let table = TableId(table as u32);
        Some((table, self.0 & ROW_KEY_MASK))
    }
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    #[default]
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

/// Vertical text baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// The anchor point is the vertical middle of the text.
    #[default]
    Middle,
    /// The anchor point is on the alphabetic baseline.
    Alphabetic,
    /// The anchor point is at the top of the text.
    Hanging,
}

/// Unshaped text geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    /// Anchor point.
    pub pos: Point,
    /// Text content.
    pub text: String,
    /// Font size in scene units.
    pub font_size: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
    /// Rotation in degrees around `pos`.
    pub angle: f64,
}

/// Geometry of a mark.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkShape {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Circle (star glyphs, legend swatches).
    Circle(Circle),
    /// Arbitrary path (rules, areas, contours).
    Path(BezPath),
    /// Text label.
    Text(TextShape),
}

/// Coarse mark kind, mostly for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// [`MarkShape::Rect`].
    Rect,
    /// [`MarkShape::Circle`].
    Circle,
    /// [`MarkShape::Path`].
    Path,
    /// [`MarkShape::Text`].
    Text,
}

/// Paint applied to a mark.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkStyle {
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint. Ignored when `stroke_width` is zero.
    pub stroke: Brush,
    /// Stroke width in scene units.
    pub stroke_width: f64,
    /// Optional `(dash, gap)` stroke pattern.
    pub dash: Option<(f64, f64)>,
    /// Whole-mark opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            fill: Brush::default(),
            stroke: Brush::Solid(Color::TRANSPARENT),
            stroke_width: 0.0,
            dash: None,
            opacity: 1.0,
        }
    }
}

/// Everything a renderer needs to draw a mark.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkPayload {
    /// Geometry.
    pub shape: MarkShape,
    /// Paint.
    pub style: MarkStyle,
}

impl MarkPayload {
    /// Returns the mark kind.
    pub fn kind(&self) -> MarkKind {
        match self.shape {
            MarkShape::Rect(_) => MarkKind::Rect,
            MarkShape::Circle(_) => MarkKind::Circle,
            MarkShape::Path(_) => MarkKind::Path,
            MarkShape::Text(_) => MarkKind::Text,
        }
    }

    /// Geometric bounds, if known. Text has no bounds without shaping.
    pub fn bounds(&self) -> Option<Rect> {
        match &self.shape {
            MarkShape::Rect(r) => Some(*r),
            MarkShape::Circle(c) => Some(c.bounding_box()),
            MarkShape::Path(p) => {
                if p.elements().is_empty() {
                    None
                } else {
                    Some(p.bounding_box())
                }
            }
            MarkShape::Text(_) => None,
        }
    }

    /// Returns `true` if `pt` lies inside the mark's geometry.
    pub fn contains(&self, pt: Point) -> bool {
        match &self.shape {
            MarkShape::Rect(r) => r.contains(pt),
            MarkShape::Circle(c) => c.contains(pt),
            MarkShape::Path(p) => p.contains(pt),
            MarkShape::Text(_) => false,
        }
    }
}

/// A visual element with stable identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable id used for reconciliation.
    pub id: MarkId,
    /// Render order; renderers sort by `(z_index, id)`.
    pub z_index: i32,
    /// Geometry and paint.
    pub payload: MarkPayload,
}

impl Mark {
    /// Starts building a mark.
    pub fn builder(id: MarkId) -> MarkBuilder {
        MarkBuilder {
            id,
            z_index: 0,
            shape: MarkShape::Rect(Rect::ZERO),
            style: MarkStyle::default(),
        }
    }

    /// Returns the mark kind.
    pub fn kind(&self) -> MarkKind {
        self.payload.kind()
    }
}

/// Builder for [`Mark`].
#[derive(Clone, Debug)]
pub struct MarkBuilder {
    id: MarkId,
    z_index: i32,
    shape: MarkShape,
    style: MarkStyle,
}

impl MarkBuilder {
    /// Rectangle geometry.
    pub fn rect(mut self, rect: Rect) -> Self {
        self.shape = MarkShape::Rect(rect);
        self
    }

    /// Circle geometry.
    pub fn circle(mut self, center: impl Into<Point>, radius: f64) -> Self {
        self.shape = MarkShape::Circle(Circle::new(center, radius));
        self
    }

    /// Path geometry.
    pub fn path(mut self, path: BezPath) -> Self {
        self.shape = MarkShape::Path(path);
        self
    }

    /// Text geometry with default font settings (12px, start/middle, no rotation).
    pub fn text(mut self, pos: impl Into<Point>, text: impl Into<String>) -> Self {
        self.shape = MarkShape::Text(TextShape {
            pos: pos.into(),
            text: text.into(),
            font_size: 12.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Middle,
            angle: 0.0,
        });
        self
    }

    /// Font size; ignored for non-text marks.
    pub fn font_size(mut self, font_size: f64) -> Self {
        if let MarkShape::Text(t) = &mut self.shape {
            t.font_size = font_size;
        }
        self
    }

    /// Text anchor; ignored for non-text marks.
    pub fn text_anchor(mut self, anchor: TextAnchor) -> Self {
        if let MarkShape::Text(t) = &mut self.shape {
            t.anchor = anchor;
        }
        self
    }

    /// Text baseline; ignored for non-text marks.
    pub fn text_baseline(mut self, baseline: TextBaseline) -> Self {
        if let MarkShape::Text(t) = &mut self.shape {
            t.baseline = baseline;
        }
        self
    }

    /// Text rotation in degrees; ignored for non-text marks.
    pub fn angle(mut self, angle: f64) -> Self {
        if let MarkShape::Text(t) = &mut self.shape {
            t.angle = angle;
        }
        self
    }

    /// Render order.
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Fill paint.
    pub fn fill(mut self, fill: impl Into<Brush>) -> Self {
        self.style.fill = fill.into();
        self
    }

    /// Stroke paint and width.
    pub fn stroke(mut self, stroke: impl Into<Brush>, stroke_width: f64) -> Self {
        self.style.stroke = stroke.into();
        self.style.stroke_width = stroke_width;
        self
    }

    /// Dashed stroke pattern.
    pub fn dash(mut self, dash: f64, gap: f64) -> Self {
        self.style.dash = Some((dash, gap));
        self
    }

    /// Whole-mark opacity, clamped to `[0, 1]`.
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Replaces the whole style.
    pub fn style(mut self, style: MarkStyle) -> Self {
        self.style = style;
        self
    }

    /// Finishes the mark.
    pub fn build(self) -> Mark {
        Mark {
            id: self.id,
            z_index: self.z_index,
            payload: MarkPayload {
                shape: self.shape,
                style: self.style,
            },
        }
    }
}
