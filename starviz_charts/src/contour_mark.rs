// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Density cells bound to a `Density2d` output table.
//!
//! Each grid cell whose density reaches the first threshold band becomes one rectangle colored by
//! its band. Stacked translucent cells read as filled contour bands.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;
use starviz_core::{Mark, MarkId, Table, TableId};
use starviz_transforms::DensityColumns;

use crate::color::ColorRamp;
use crate::scale::ScaleContinuous;

/// Density cell mark spec.
#[derive(Clone, Debug)]
pub struct ContourMarkSpec {
    /// Density table id.
    pub table: TableId,
    /// Density table columns.
    pub columns: DensityColumns,
    /// Scale for cell x edges.
    pub x_scale: ScaleContinuous,
    /// Scale for cell y edges.
    pub y_scale: ScaleContinuous,
    /// Ramp evaluated at `band / max_band`.
    pub ramp: ColorRamp,
    /// Cell opacity.
    pub opacity: f64,
    /// Rendering order hint.
    pub z_index: i32,
}

impl ContourMarkSpec {
    /// Creates a density cell spec.
    pub fn new(
        table: TableId,
        columns: DensityColumns,
        x_scale: impl Into<ScaleContinuous>,
        y_scale: impl Into<ScaleContinuous>,
        ramp: ColorRamp,
    ) -> Self {
        Self {
            table,
            columns,
            x_scale: x_scale.into(),
            y_scale: y_scale.into(),
            ramp,
            opacity: 0.3,
            z_index: crate::z_order::DENSITY,
        }
    }

    /// Sets the cell opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Generates one rectangle per cell in band 1 or above.
    pub fn marks(&self, cells: &Table) -> Vec<Mark> {
        let max_band = cells
            .records()
            .filter_map(|r| r.finite(self.columns.band))
            .fold(0.0_f64, f64::max);
        if max_band < 1.0 {
            return Vec::new();
        }
        let c = self.columns;
        cells
            .records()
            .filter_map(|rec| {
                let band = rec.finite(c.band)?;
                if band < 1.0 {
                    return None;
                }
                let x0 = self.x_scale.map(rec.finite(c.x0)?);
                let x1 = self.x_scale.map(rec.finite(c.x1)?);
                let y0 = self.y_scale.map(rec.finite(c.y0)?);
                let y1 = self.y_scale.map(rec.finite(c.y1)?);
                Some(
                    Mark::builder(MarkId::for_row(self.table, rec.key()))
                        .rect(Rect::new(x0, y0, x1, y1).abs())
                        .z_index(self.z_index)
                        .fill(self.ramp.eval(band / max_band))
                        .opacity(self.opacity)
                        .build(),
                )
            })
            .collect()
    }
}
