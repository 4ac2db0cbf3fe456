// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule mark generation.
//!
//! A "rule" is a straight stroked segment: axis domain lines, mean lines, the celestial equator
//! and regression trend lines are all rules.

use kurbo::{BezPath, Point};
use peniko::{Brush, Color};
use starviz_core::{Mark, MarkId};

use crate::z_order;

/// A rule mark spec (a stroked line segment).
#[derive(Clone, Debug)]
pub struct RuleMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Start point in scene coordinates.
    pub p0: Point,
    /// End point in scene coordinates.
    pub p1: Point,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
    /// Optional `(dash, gap)` pattern.
    pub dash: Option<(f64, f64)>,
    /// Whole-mark opacity.
    pub opacity: f64,
    /// Rendering order hint.
    pub z_index: i32,
}

impl RuleMarkSpec {
    /// Creates a new rule between two points.
    pub fn new(id: MarkId, p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self {
            id,
            p0: p0.into(),
            p1: p1.into(),
            stroke: Brush::Solid(Color::BLACK),
            stroke_width: 1.0,
            dash: None,
            opacity: 1.0,
            z_index: z_order::SERIES_STROKE,
        }
    }

    /// Creates a horizontal rule.
    pub fn horizontal(id: MarkId, y: f64, x0: f64, x1: f64) -> Self {
        Self::new(id, (x0, y), (x1, y))
    }

    /// Creates a vertical rule.
    pub fn vertical(id: MarkId, x: f64, y0: f64, y1: f64) -> Self {
        Self::new(id, (x, y0), (x, y1))
    }

    /// Sets stroke paint and width.
    pub fn with_stroke(mut self, stroke: impl Into<Brush>, stroke_width: f64) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = stroke_width;
        self
    }

    /// Sets a dashed stroke pattern.
    pub fn with_dash(mut self, dash: f64, gap: f64) -> Self {
        self.dash = Some((dash, gap));
        self
    }

    /// Sets the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates the rule mark, or `None` if an endpoint is not finite.
    pub fn mark(&self) -> Option<Mark> {
        let finite = [self.p0.x, self.p0.y, self.p1.x, self.p1.y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return None;
        }
        let mut p = BezPath::new();
        p.move_to(self.p0);
        p.line_to(self.p1);
        let mut b = Mark::builder(self.id)
            .path(p)
            .z_index(self.z_index)
            .fill(Color::TRANSPARENT)
            .stroke(self.stroke.clone(), self.stroke_width)
            .opacity(self.opacity);
        if let Some((dash, gap)) = self.dash {
            b = b.dash(dash, gap);
        }
        Some(b.build())
    }
}
