// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart-generated marks.
//!
//! Renderers sort by `(z_index, MarkId)`, so equal layers still paint deterministically.

/// Plot background/frame fills.
pub const PLOT_BACKGROUND: i32 = -100;
/// Gridlines drawn behind series.
pub const GRID_LINES: i32 = -50;
/// Density cells drawn under everything else in the plot.
pub const DENSITY: i32 = -20;

/// Filled series marks (bars, areas).
pub const SERIES_FILL: i32 = 0;
/// Stroked series marks (lines, rules).
pub const SERIES_STROKE: i32 = 10;
/// Star glyphs, drawn above lines.
pub const SERIES_POINTS: i32 = 20;

/// Axis domain line and tick marks.
pub const AXIS_RULES: i32 = 30;
/// Axis tick labels.
pub const AXIS_LABELS: i32 = 40;
/// Axis title labels.
pub const AXIS_TITLES: i32 = 50;

/// Legend swatches.
pub const LEGEND_SWATCHES: i32 = 60;
/// Legend labels.
pub const LEGEND_LABELS: i32 = 70;
/// Chart-level titles, annotations and error messages.
pub const TITLES: i32 = 80;
/// Hover tooltip, above everything.
pub const TOOLTIP: i32 = 90;
