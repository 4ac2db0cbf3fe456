// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Area mark generation (density curves under a histogram, for example).

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{BezPath, Point};
use peniko::{Brush, Color};
use starviz_core::{Mark, MarkId, Table};

use crate::axis::StrokeStyle;
use crate::channel::Channel;

/// How consecutive points are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Curve {
    /// Straight segments.
    #[default]
    Linear,
    /// Uniform cubic B-spline through the control points (first and last points are hit).
    Basis,
}

impl Curve {
    /// Appends the curve through `pts` to `path`.
    ///
    /// With `connect`, the curve starts with a `line_to` instead of a `move_to`.
    pub fn extend(self, path: &mut BezPath, pts: &[Point], connect: bool) {
        let Some(&first) = pts.first() else {
            return;
        };
        if connect {
            path.line_to(first);
        } else {
            path.move_to(first);
        }
        match self {
            Self::Linear => {
                for &p in &pts[1..] {
                    path.line_to(p);
                }
            }
            Self::Basis => basis(path, pts),
        }
    }
}

fn mix(a: Point, wa: f64, b: Point, wb: f64, c: Point, wc: f64, d: f64) -> Point {
    Point::new(
        (wa * a.x + wb * b.x + wc * c.x) / d,
        (wa * a.y + wb * b.y + wc * c.y) / d,
    )
}

fn basis(path: &mut BezPath, pts: &[Point]) {
    let n = pts.len();
    if n < 3 {
        if n == 2 {
            path.line_to(pts[1]);
        }
        return;
    }
    path.line_to(mix(pts[0], 5.0, pts[1], 1.0, pts[1], 0.0, 6.0));
    for w in pts.windows(3) {
        let (a, b, c) = (w[0], w[1], w[2]);
        path.curve_to(
            mix(a, 2.0, b, 1.0, c, 0.0, 3.0),
            mix(a, 1.0, b, 2.0, c, 0.0, 3.0),
            mix(a, 1.0, b, 4.0, c, 1.0, 6.0),
        );
    }
    let (a, b) = (pts[n - 2], pts[n - 1]);
    path.curve_to(
        mix(a, 2.0, b, 1.0, b, 0.0, 3.0),
        mix(a, 1.0, b, 2.0, b, 0.0, 3.0),
        mix(a, 1.0, b, 5.0, b, 0.0, 6.0),
    );
    path.line_to(b);
}

/// An area mark derived from a table.
///
/// This generates:
/// - one filled path mark (`id_base`) between the curve and a horizontal baseline, and
/// - optionally one stroked path mark (`id_base + 1`) for the curve itself.
///
/// Records are joined in row order; records without finite `x` and `y` are skipped.
#[derive(Clone, Debug)]
pub struct AreaMarkSpec {
    /// Stable-id base for marks emitted by this mark.
    pub id_base: u64,
    /// Scene x.
    pub x: Channel,
    /// Scene y.
    pub y: Channel,
    /// Baseline in scene y.
    pub baseline: f64,
    /// Curve interpolation.
    pub curve: Curve,
    /// Fill paint for the area.
    pub fill: Brush,
    /// Opacity of the filled area.
    pub opacity: f64,
    /// Optional stroke for the curve.
    pub stroke: Option<StrokeStyle>,
    /// Rendering order hint for the filled area.
    pub z_index: i32,
}

impl AreaMarkSpec {
    /// Creates an area mark with a transparent fill and linear joins.
    pub fn new(id_base: u64, x: Channel, y: Channel, baseline: f64) -> Self {
        Self {
            id_base,
            x,
            y,
            baseline,
            curve: Curve::Linear,
            fill: Brush::Solid(Color::TRANSPARENT),
            opacity: 1.0,
            stroke: None,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the curve interpolation.
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the fill opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the outline stroke.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Sets the z-index used for render ordering.
    ///
    /// The optional stroke is drawn above the fill.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates marks for the records of `table`. Emits nothing for fewer than two points.
    pub fn marks(&self, table: &Table) -> Vec<Mark> {
        let pts: Vec<Point> = table
            .records()
            .filter_map(|rec| Some(Point::new(self.x.eval(rec)?, self.y.eval(rec)?)))
            .collect();
        let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
            return Vec::new();
        };
        if pts.len() < 2 {
            return Vec::new();
        }

        let mut area = BezPath::new();
        area.move_to((first.x, self.baseline));
        self.curve.extend(&mut area, &pts, true);
        area.line_to((last.x, self.baseline));
        area.close_path();

        let mut out = alloc::vec![
            Mark::builder(MarkId::from_raw(self.id_base))
                .path(area)
                .z_index(self.z_index)
                .fill(self.fill.clone())
                .opacity(self.opacity)
                .build()
        ];

        if let Some(stroke) = &self.stroke {
            let mut line = BezPath::new();
            self.curve.extend(&mut line, &pts, false);
            out.push(
                Mark::builder(MarkId::from_raw(self.id_base + 1))
                    .path(line)
                    .z_index(self.z_index.saturating_add(crate::z_order::SERIES_STROKE))
                    .fill(Color::TRANSPARENT)
                    .stroke(stroke.brush.clone(), stroke.stroke_width)
                    .build(),
            );
        }

        out
    }
}
