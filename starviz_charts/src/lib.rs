// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart building blocks for star-catalog visualizations.
//!
//! This crate is the reusable layer between loaded tables and rendered marks:
//! - **Scales** map data values into scene coordinates or colors ([`ScaleLinearSpec`],
//!   [`ScaleSqrtSpec`], [`ScaleSequential`], [`ScaleOrdinal`], [`ScaleBand`]).
//! - **Layout** turns a view size and margins into a validated [`PlotFrame`].
//! - **Mark specs** bind records (or transform buckets) to marks with stable ids.
//! - **Guides** (axes, legends, text) are marks too.
//! - **Interaction** drives hover, tooltip and legend filtering headlessly.
//! - A [`ChartInstance`] ties one frame, one scene and one data load together.
//!
//! Text shaping is out of scope; text marks store unshaped strings.

#![no_std]

extern crate alloc;

mod area_mark;
mod axis;
mod bar_mark;
mod channel;
mod chart;
#[cfg(test)]
mod chart_tests;
mod color;
mod contour_mark;
mod filter;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod histogram_mark;
mod interaction;
mod layout;
mod legend;
mod point_mark;
mod rule_mark;
mod scale;
mod symbol;
mod text_mark;
mod z_order;

pub use area_mark::{AreaMarkSpec, Curve};
pub use axis::{AxisOrient, AxisSpec, AxisStyle, StrokeStyle, estimate_text_width};
pub use bar_mark::BarMarkSpec;
pub use channel::{Channel, ColorChannel};
pub use chart::{
    ChartInstance, ChartSeries, ERROR_MARK_ID, LoadOutcome, LoadState, LoadTicket, RenderCtx,
    TOOLTIP_BACKDROP_ID, TOOLTIP_MARK_ID,
};
pub use color::{ColorRamp, ColorRampError, ScaleOrdinal, ScaleSequential};
pub use contour_mark::ContourMarkSpec;
pub use filter::{FilterState, Predicate, PredicateId};
pub use format::{decimals_for_step, format_tick};
pub use histogram_mark::HistogramMarkSpec;
pub use interaction::{
    Highlight, Highlights, HoverCtx, HoverHandler, HoverTarget, InteractionController,
    TOOLTIP_OFFSET, Tooltip,
};
pub use layout::{ConfigError, FrameSpec, Margin, PlotFrame};
pub use legend::{LegendItem, LegendSwatches};
pub use point_mark::{FilterPolicy, PointMarkSpec};
pub use rule_mark::RuleMarkSpec;
pub use scale::{
    DEFAULT_TICK_COUNT, ScaleBand, ScaleBandSpec, ScaleContinuous, ScaleLinear, ScaleLinearSpec,
    ScaleSpec, ScaleSqrt, ScaleSqrtSpec, extent_of, infer_domain_f64,
};
pub use symbol::Symbol;
pub use text_mark::TextMarkSpec;
pub use z_order::*;
