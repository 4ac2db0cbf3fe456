// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point mark generation: one glyph per record.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Point;
use peniko::{Brush, Color};
use starviz_core::{Mark, MarkId, RecordRef, Table, TableId};

use crate::channel::{Channel, ColorChannel};
use crate::symbol::Symbol;

/// What happens to records rejected by the active filters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterPolicy {
    /// Keep the glyph but draw it at this opacity.
    Dim(f64),
    /// Drop the glyph (its mark exits).
    Remove,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::Dim(0.1)
    }
}

/// A point mark derived from a table.
///
/// Each record with finite `x`, `y` and `radius` becomes one glyph whose id is
/// `MarkId::for_row(table, row_key)`, so glyphs keep their identity across reloads and reorders.
#[derive(Clone, Debug)]
pub struct PointMarkSpec {
    /// Source table id.
    pub table: TableId,
    /// Scene x.
    pub x: Channel,
    /// Scene y.
    pub y: Channel,
    /// Glyph radius in scene units.
    pub radius: Channel,
    /// Glyph fill.
    pub fill: ColorChannel,
    /// Optional outline paint and width.
    pub stroke: Option<(Brush, f64)>,
    /// Opacity of visible glyphs.
    pub opacity: f64,
    /// Glyph shape.
    pub symbol: Symbol,
    /// Treatment of filtered-out records.
    pub filter_policy: FilterPolicy,
    /// Rendering order hint.
    pub z_index: i32,
}

impl PointMarkSpec {
    /// Creates a point mark spec with a radius of 3 and a black fill.
    pub fn new(table: TableId, x: Channel, y: Channel) -> Self {
        Self {
            table,
            x,
            y,
            radius: Channel::Const(3.0),
            fill: ColorChannel::Const(Color::BLACK),
            stroke: None,
            opacity: 1.0,
            symbol: Symbol::Circle,
            filter_policy: FilterPolicy::default(),
            z_index: crate::z_order::SERIES_POINTS,
        }
    }

    /// Sets the radius channel.
    pub fn with_radius(mut self, radius: impl Into<Channel>) -> Self {
        self.radius = radius.into();
        self
    }

    /// Sets the fill channel.
    pub fn with_fill(mut self, fill: impl Into<ColorChannel>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets an outline.
    pub fn with_stroke(mut self, stroke: impl Into<Brush>, stroke_width: f64) -> Self {
        self.stroke = Some((stroke.into(), stroke_width));
        self
    }

    /// Sets the opacity of visible glyphs.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the glyph shape.
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    /// Sets the treatment of filtered-out records.
    pub fn with_filter_policy(mut self, filter_policy: FilterPolicy) -> Self {
        self.filter_policy = filter_policy;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates one mark per drawable record.
    pub fn marks(&self, table: &Table) -> Vec<Mark> {
        self.marks_filtered(table, |_| true)
    }

    /// Generates marks, applying the filter policy to records for which `visible` is false.
    pub fn marks_filtered(&self, table: &Table, visible: impl Fn(RecordRef<'_>) -> bool) -> Vec<Mark> {
        let mut out = Vec::with_capacity(table.len());
        let mut skipped = 0_usize;
        for rec in table.records() {
            let opacity = if visible(rec) {
                self.opacity
            } else {
                match self.filter_policy {
                    FilterPolicy::Dim(o) => o,
                    FilterPolicy::Remove => continue,
                }
            };
            let (Some(x), Some(y), Some(r)) =
                (self.x.eval(rec), self.y.eval(rec), self.radius.eval(rec))
            else {
                skipped += 1;
                continue;
            };
            let id = MarkId::for_row(self.table, rec.key());
            let mut b = self
                .symbol
                .apply(Mark::builder(id), Point::new(x, y), r.max(0.0))
                .z_index(self.z_index)
                .fill(self.fill.eval(rec))
                .opacity(opacity);
            if let Some((stroke, w)) = &self.stroke {
                b = b.stroke(stroke.clone(), *w);
            }
            out.push(b.build());
        }
        if skipped > 0 {
            log::debug!(
                "point marks for table {:?}: skipped {skipped} records without finite position or size",
                self.table
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::boxed::Box;
    use alloc::vec;

    use starviz_core::{ColId, MarkShape, TableData};

    use super::*;
    use crate::scale::{ScaleLinear, ScaleSqrt};

    #[derive(Debug)]
    struct Stars(Vec<[f64; 2]>);

    impl TableData for Stars {
        fn row_count(&self) -> usize {
            self.0.len()
        }

        fn f64(&self, row: usize, col: ColId) -> Option<f64> {
            self.0.get(row).and_then(|r| r.get(col.0 as usize)).copied()
        }
    }

    fn table(rows: Vec<[f64; 2]>, keys: Vec<u64>) -> Table {
        Table::with_data(TableId(1), keys, Box::new(Stars(rows)))
    }

    fn spec() -> PointMarkSpec {
        PointMarkSpec::new(
            TableId(1),
            Channel::field(ColId(0), ScaleLinear::new((0.0, 1.0), (0.0, 100.0))),
            Channel::field(ColId(1), ScaleLinear::new((0.0, 1.0), (100.0, 0.0))),
        )
    }

    #[test]
    fn points_are_keyed_by_row_key_and_skip_missing_positions() {
        let t = table(vec![[0.5, 0.5], [f64::NAN, 0.2], [1.0, 0.0]], vec![10, 11, 12]);
        let marks = spec().marks(&t);
        let ids: Vec<_> = marks.iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec![
                MarkId::for_row(TableId(1), 10),
                MarkId::for_row(TableId(1), 12)
            ]
        );
        match &marks[1].payload.shape {
            MarkShape::Circle(c) => assert_eq!((c.center.x, c.center.y, c.radius), (100.0, 100.0, 3.0)),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn sqrt_radius_makes_bright_stars_larger() {
        let t = table(vec![[-1.0, 0.0], [6.0, 0.0]], vec![0, 1]);
        let radius = Channel::field(ColId(0), ScaleSqrt::new((-1.0, 6.0), (7.0, 2.0)));
        let marks = spec().with_radius(radius).marks(&t);
        let radii: Vec<f64> = marks
            .iter()
            .map(|m| match &m.payload.shape {
                MarkShape::Circle(c) => c.radius,
                _ => 0.0,
            })
            .collect();
        assert!(radii[0] > radii[1]);
        assert!((radii[0] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn filter_policy_dims_or_removes() {
        let t = table(vec![[0.1, 0.1], [0.2, 0.2]], vec![0, 1]);
        let visible = |r: RecordRef<'_>| r.key() == 0;

        let dimmed = spec().with_opacity(0.7).marks_filtered(&t, visible);
        assert_eq!(dimmed.len(), 2);
        assert_eq!(dimmed[0].payload.style.opacity, 0.7);
        assert_eq!(dimmed[1].payload.style.opacity, 0.1);

        let removed = spec()
            .with_filter_policy(FilterPolicy::Remove)
            .marks_filtered(&t, visible);
        assert_eq!(removed.len(), 1);
    }
}
