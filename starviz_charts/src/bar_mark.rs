// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar mark generation for categorical counts.

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use kurbo::Rect;
use peniko::Color;
use starviz_core::{ColId, Mark, MarkId, Table, TableId};

use crate::channel::ColorChannel;
use crate::scale::{ScaleBand, ScaleContinuous};

/// A vertical bar mark derived from a table.
///
/// Each record supplies a band index (`index` column) and a value; the bar spans from the
/// baseline to the value. Records whose index is missing, negative or outside the band scale are
/// skipped.
#[derive(Clone, Debug)]
pub struct BarMarkSpec {
    /// Source table id.
    pub table: TableId,
    /// Column holding the band index.
    pub index: ColId,
    /// Column holding the bar value.
    pub value: ColId,
    /// Band scale used for bar positions along x.
    pub band: ScaleBand,
    /// Scale used for bar extents along y.
    pub y_scale: ScaleContinuous,
    /// Baseline in data units (typically `0.0`).
    pub baseline: f64,
    /// Fill paint for bars.
    pub fill: ColorChannel,
    /// Rendering order hint.
    pub z_index: i32,
}

impl BarMarkSpec {
    /// Creates a bar mark spec with `baseline = 0` and a black fill.
    pub fn new(
        table: TableId,
        index: ColId,
        value: ColId,
        band: ScaleBand,
        y_scale: impl Into<ScaleContinuous>,
    ) -> Self {
        Self {
            table,
            index,
            value,
            band,
            y_scale: y_scale.into(),
            baseline: 0.0,
            fill: ColorChannel::Const(Color::BLACK),
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the baseline in data units.
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Sets the fill channel.
    pub fn with_fill(mut self, fill: impl Into<ColorChannel>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates one bar per drawable record.
    pub fn marks(&self, table: &Table) -> Vec<Mark> {
        let bw = self.band.band_width();
        let y0 = self.y_scale.map(self.baseline);
        table
            .records()
            .filter_map(|rec| {
                let index = rec.finite(self.index)?.round();
                if index < 0.0 {
                    return None;
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "index is a non-negative integral value"
                )]
                let index = index as usize;
                if index >= self.band.count() {
                    return None;
                }
                let y = self.y_scale.map(rec.finite(self.value)?);
                let x = self.band.x(index);
                Some(
                    Mark::builder(MarkId::for_row(self.table, rec.key()))
                        .rect(Rect::new(x, y.min(y0), x + bw, y.max(y0)))
                        .z_index(self.z_index)
                        .fill(self.fill.eval(rec))
                        .build(),
                )
            })
            .collect()
    }
}
