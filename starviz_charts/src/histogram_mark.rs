// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Histogram bars bound to a bin table.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;
use peniko::{Brush, Color};
use starviz_core::{ColId, Mark, MarkId, Table, TableId};
use starviz_transforms::BinColumns;

use crate::scale::ScaleContinuous;

/// One rectangle per bin record (`x0`, `x1`, `count`), keyed by the bin's row key.
#[derive(Clone, Debug)]
pub struct HistogramMarkSpec {
    /// Bin table id.
    pub table: TableId,
    /// Bin table columns.
    pub columns: BinColumns,
    /// Column used for bar height; defaults to the count column.
    pub value: ColId,
    /// Scale for bin edges.
    pub x_scale: ScaleContinuous,
    /// Scale for bar height.
    pub y_scale: ScaleContinuous,
    /// Horizontal gap between adjacent bars, in scene units.
    pub gap: f64,
    /// Fill paint.
    pub fill: Brush,
    /// Whole-bar opacity.
    pub opacity: f64,
    /// Rendering order hint.
    pub z_index: i32,
}

impl HistogramMarkSpec {
    /// Creates a histogram spec with a 1px gap.
    pub fn new(
        table: TableId,
        columns: BinColumns,
        x_scale: impl Into<ScaleContinuous>,
        y_scale: impl Into<ScaleContinuous>,
    ) -> Self {
        Self {
            table,
            columns,
            value: columns.count,
            x_scale: x_scale.into(),
            y_scale: y_scale.into(),
            gap: 1.0,
            fill: Brush::Solid(Color::BLACK),
            opacity: 1.0,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Uses a different column for bar height (for example a normalized density).
    pub fn with_value(mut self, value: ColId) -> Self {
        self.value = value;
        self
    }

    /// Sets the gap between bars.
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Generates the bar marks.
    pub fn marks(&self, bins: &Table) -> Vec<Mark> {
        let base = self.y_scale.map(0.0);
        bins.records()
            .filter_map(|rec| {
                let x0 = self.x_scale.map(rec.finite(self.columns.x0)?);
                let x1 = self.x_scale.map(rec.finite(self.columns.x1)?);
                let y = self.y_scale.map(rec.finite(self.value)?);
                let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
                let width = (right - left - self.gap).max(0.0);
                let left = left + self.gap.min(right - left) * 0.5;
                Some(
                    Mark::builder(MarkId::for_row(self.table, rec.key()))
                        .rect(Rect::new(left, y.min(base), left + width, y.max(base)))
                        .z_index(self.z_index)
                        .fill(self.fill.clone())
                        .opacity(self.opacity)
                        .build(),
                )
            })
            .collect()
    }
}
