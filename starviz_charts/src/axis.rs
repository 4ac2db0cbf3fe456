// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis mark generation.
//!
//! An axis is a single [`AxisSpec`] with an orientation (`top`, `bottom`, `left`, `right`). It
//! owns its scale spec so the axis and the marks it describes always agree on ticks and nicing.
//!
//! Generated ids are offsets from `id_base`: the domain line uses `id_base`, tick `i` uses
//! `id_base + 1 + i`, label `i` uses `id_base + 1000 + i`, the title uses `id_base + 9000` and
//! gridline `i` uses `id_base - 5000 + i`.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use peniko::Brush;
use peniko::color::palette::css;
use starviz_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::format::format_tick;
use crate::rule_mark::RuleMarkSpec;
use crate::scale::{ScaleBand, ScaleContinuous, ScaleSpec};
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// A paint + width pair for stroked paths (domain lines, ticks, gridlines).
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(css::BLACK, 1.0)
    }
}

/// Axis styling defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Style for the axis domain line and tick marks.
    pub rule: StrokeStyle,
    /// Fill paint for tick labels.
    pub label_fill: Brush,
    /// Font size for tick labels.
    pub label_font_size: f64,
    /// Fill paint for the axis title.
    pub title_fill: Brush,
    /// Font size for the axis title.
    pub title_font_size: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        let rule = StrokeStyle::default();
        Self {
            rule: rule.clone(),
            label_fill: rule.brush.clone(),
            label_font_size: 10.0,
            title_fill: rule.brush,
            title_font_size: 12.0,
        }
    }
}

/// Axis orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// A horizontal axis placed above the plot area.
    Top,
    /// A horizontal axis placed below the plot area.
    Bottom,
    /// A vertical axis placed to the left of the plot area.
    Left,
    /// A vertical axis placed to the right of the plot area.
    Right,
}

impl AxisOrient {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// An axis specification.
#[derive(Clone)]
pub struct AxisSpec {
    /// Stable-id base; each generated mark uses a deterministic offset from this base.
    pub id_base: u64,
    /// The axis scale specification.
    pub scale: ScaleSpec,
    /// Axis placement relative to the plot.
    pub orient: AxisOrient,
    /// Approximate number of ticks.
    pub tick_count: usize,
    /// Tick line length.
    pub tick_size: f64,
    /// Whether to draw tick marks.
    pub ticks: bool,
    /// Whether to draw tick labels.
    pub labels: bool,
    /// Whether to draw the axis domain line.
    pub show_domain: bool,
    /// Gap between the tick end and the tick label.
    pub tick_padding: f64,
    /// Axis styling.
    pub style: AxisStyle,
    /// Gridline stroke; `None` disables gridlines.
    pub grid: Option<StrokeStyle>,
    /// Optional axis title text.
    pub title: Option<String>,
    /// Distance from the plot edge to the title.
    pub title_offset: f64,
    /// Labels for band axes, by band index.
    pub categories: Vec<String>,
    /// Optional tick label formatter, called with `(value, step)`.
    pub tick_formatter: Option<Arc<dyn Fn(f64, f64) -> String>>,
}

impl core::fmt::Debug for AxisSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AxisSpec")
            .field("id_base", &self.id_base)
            .field("scale", &self.scale)
            .field("orient", &self.orient)
            .field("tick_count", &self.tick_count)
            .field("tick_size", &self.tick_size)
            .field("ticks", &self.ticks)
            .field("labels", &self.labels)
            .field("show_domain", &self.show_domain)
            .field("tick_padding", &self.tick_padding)
            .field("style", &self.style)
            .field("grid", &self.grid)
            .field("title", &self.title)
            .field("title_offset", &self.title_offset)
            .field("categories", &self.categories)
            .field("tick_formatter", &self.tick_formatter.is_some())
            .finish()
    }
}

impl AxisSpec {
    /// Creates a new axis specification.
    ///
    /// The returned axis has ten ticks of size 6, a 3px label gap, no title and no grid.
    pub fn new(id_base: u64, scale: impl Into<ScaleSpec>, orient: AxisOrient) -> Self {
        let title_offset = if orient.is_horizontal() { 40.0 } else { 45.0 };
        Self {
            id_base,
            scale: scale.into(),
            orient,
            tick_count: 10,
            tick_size: 6.0,
            ticks: true,
            labels: true,
            show_domain: true,
            tick_padding: 3.0,
            style: AxisStyle::default(),
            grid: None,
            title: None,
            title_offset,
            categories: Vec::new(),
            tick_formatter: None,
        }
    }

    /// Convenience constructor for a `bottom` axis.
    pub fn bottom(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Bottom)
    }

    /// Convenience constructor for a `top` axis.
    pub fn top(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Top)
    }

    /// Convenience constructor for a `left` axis.
    pub fn left(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Left)
    }

    /// Convenience constructor for a `right` axis.
    pub fn right(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Right)
    }

    /// Sets the approximate tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Sets tick size in scene coordinates.
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Enables or disables tick marks.
    pub fn with_ticks(mut self, ticks: bool) -> Self {
        self.ticks = ticks;
        self
    }

    /// Enables or disables tick labels.
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    /// Enables or disables the axis domain line.
    pub fn with_domain(mut self, domain: bool) -> Self {
        self.show_domain = domain;
        self
    }

    /// Sets the axis style.
    pub fn with_style(mut self, style: AxisStyle) -> Self {
        self.style = style;
        self
    }

    /// Enables gridlines.
    pub fn with_grid(mut self, grid: StrokeStyle) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Sets the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the distance from the plot edge to the title.
    pub fn with_title_offset(mut self, title_offset: f64) -> Self {
        self.title_offset = title_offset;
        self
    }

    /// Sets band labels, one per band index.
    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a custom tick label formatter.
    pub fn with_tick_formatter(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.tick_formatter = Some(Arc::new(f));
        self
    }

    fn range(&self, plot: Rect) -> (f64, f64) {
        if self.orient.is_horizontal() {
            (plot.x0, plot.x1)
        } else {
            (plot.y1, plot.y0)
        }
    }

    /// Returns the continuous scale this axis draws, or `None` for band axes.
    pub fn scale_continuous(&self, plot: Rect) -> Option<ScaleContinuous> {
        let range = self.range(plot);
        match self.scale {
            ScaleSpec::Linear(s) => Some(s.instantiate_resolved(range, self.tick_count).into()),
            ScaleSpec::Sqrt(s) => Some(s.instantiate(range).into()),
            ScaleSpec::Band(_) => None,
        }
    }

    /// Returns the band scale this axis draws, or `None` for continuous axes.
    pub fn scale_band(&self, plot: Rect) -> Option<ScaleBand> {
        match self.scale {
            ScaleSpec::Band(s) => Some(s.instantiate(self.range(plot))),
            _ => None,
        }
    }

    /// Tick positions along the axis paired with their labels.
    fn tick_positions(&self, plot: Rect) -> Vec<(f64, String)> {
        if let Some(band) = self.scale_band(plot) {
            return (0..band.count())
                .map(|i| {
                    let label = self.categories.get(i).cloned().unwrap_or_default();
                    (band.center(i), label)
                })
                .collect();
        }
        let Some(scale) = self.scale_continuous(plot) else {
            return Vec::new();
        };
        let step = scale.tick_step(self.tick_count);
        scale
            .ticks(self.tick_count)
            .map(|v| (scale.map(v), self.format_label(v, step)))
            .collect()
    }

    fn format_label(&self, v: f64, step: f64) -> String {
        match &self.tick_formatter {
            Some(f) => f(v, step),
            None => format_tick(v, step),
        }
    }

    /// Generates axis marks for the given plot rectangle.
    pub fn marks(&self, plot: Rect) -> Vec<Mark> {
        let eps = 1.0e-9;
        let horizontal = self.orient.is_horizontal();
        let (lo, hi) = if horizontal {
            (plot.x0, plot.x1)
        } else {
            (plot.y0, plot.y1)
        };
        let ticks: Vec<(f64, String)> = self
            .tick_positions(plot)
            .into_iter()
            .filter(|(p, _)| *p >= lo - eps && *p <= hi + eps)
            .collect();

        // Axis line position and the outward direction of ticks.
        let (edge, outward) = match self.orient {
            AxisOrient::Bottom => (plot.y1, 1.0),
            AxisOrient::Top => (plot.y0, -1.0),
            AxisOrient::Left => (plot.x0, -1.0),
            AxisOrient::Right => (plot.x1, 1.0),
        };
        let along = |p: f64, offset: f64| -> Point {
            if horizontal {
                Point::new(p, edge + outward * offset)
            } else {
                Point::new(edge + outward * offset, p)
            }
        };

        let mut out = Vec::new();

        if let Some(grid) = &self.grid {
            let base = self.id_base.wrapping_sub(5_000);
            for (i, (p, _)) in ticks.iter().enumerate() {
                let rule = if horizontal {
                    RuleMarkSpec::vertical(MarkId::from_raw(base + i as u64), *p, plot.y0, plot.y1)
                } else {
                    RuleMarkSpec::horizontal(MarkId::from_raw(base + i as u64), *p, plot.x0, plot.x1)
                };
                out.extend(
                    rule.with_stroke(grid.brush.clone(), grid.stroke_width)
                        .with_z_index(z_order::GRID_LINES)
                        .mark(),
                );
            }
        }

        if self.show_domain {
            out.extend(
                RuleMarkSpec::new(MarkId::from_raw(self.id_base), along(lo, 0.0), along(hi, 0.0))
                    .with_stroke(self.style.rule.brush.clone(), self.style.rule.stroke_width)
                    .with_z_index(z_order::AXIS_RULES)
                    .mark(),
            );
        }

        let tick_size = self.tick_size.abs();
        let tick_extent = if self.ticks { tick_size } else { 0.0 };
        let (anchor, baseline) = match self.orient {
            AxisOrient::Bottom => (TextAnchor::Middle, TextBaseline::Hanging),
            AxisOrient::Top => (TextAnchor::Middle, TextBaseline::Alphabetic),
            AxisOrient::Left => (TextAnchor::End, TextBaseline::Middle),
            AxisOrient::Right => (TextAnchor::Start, TextBaseline::Middle),
        };
        for (i, (p, label)) in ticks.into_iter().enumerate() {
            let i = i as u64;
            if self.ticks {
                out.extend(
                    RuleMarkSpec::new(
                        MarkId::from_raw(self.id_base + 1 + i),
                        along(p, 0.0),
                        along(p, tick_size),
                    )
                    .with_stroke(self.style.rule.brush.clone(), self.style.rule.stroke_width)
                    .with_z_index(z_order::AXIS_RULES)
                    .mark(),
                );
            }
            if self.labels && !label.is_empty() {
                out.push(
                    TextMarkSpec::new(
                        MarkId::from_raw(self.id_base + 1000 + i),
                        along(p, tick_extent + self.tick_padding.max(0.0)),
                        label,
                    )
                    .with_anchor(anchor)
                    .with_baseline(baseline)
                    .with_font_size(self.style.label_font_size)
                    .with_fill(self.style.label_fill.clone())
                    .with_z_index(z_order::AXIS_LABELS)
                    .mark(),
                );
            }
        }

        if let Some(title) = &self.title {
            let mid = (lo + hi) * 0.5;
            let angle = if horizontal { 0.0 } else { -90.0 };
            out.push(
                TextMarkSpec::new(
                    MarkId::from_raw(self.id_base + 9000),
                    along(mid, self.title_offset),
                    title.clone(),
                )
                .with_anchor(TextAnchor::Middle)
                .with_angle(angle)
                .with_font_size(self.style.title_font_size)
                .with_fill(self.style.title_fill.clone())
                .with_z_index(z_order::AXIS_TITLES)
                .mark(),
            );
        }

        out
    }
}

/// Rough label width (~0.6em per glyph) for layout without shaped text.
#[allow(clippy::cast_precision_loss, reason = "label lengths are tiny")]
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    0.6 * font_size * text.chars().count() as f64
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use starviz_core::{MarkKind, MarkShape};

    use super::*;
    use crate::scale::{ScaleBandSpec, ScaleLinearSpec};

    fn labels(marks: &[Mark]) -> Vec<String> {
        let mut out: Vec<(u64, String)> = marks
            .iter()
            .filter_map(|m| match &m.payload.shape {
                MarkShape::Text(t) if m.z_index == z_order::AXIS_LABELS => {
                    Some((m.id.0, t.text.clone()))
                }
                _ => None,
            })
            .collect();
        out.sort();
        out.into_iter().map(|(_, s)| s).collect()
    }

    #[test]
    fn bottom_axis_labels_nice_ticks() {
        let plot = Rect::new(50.0, 20.0, 550.0, 420.0);
        let axis = AxisSpec::bottom(100, ScaleLinearSpec::new((-0.4, 1.9)).with_nice(true))
            .with_tick_count(5)
            .with_title("B-V Color Index");
        let marks = axis.marks(plot);
        assert_eq!(
            labels(&marks),
            vec!["-0.5", "0.0", "0.5", "1.0", "1.5", "2.0"]
        );
        let title = marks.iter().find(|m| m.id == MarkId(9100)).unwrap();
        assert_eq!(title.z_index, z_order::AXIS_TITLES);
        let domain = marks.iter().find(|m| m.id == MarkId(100)).unwrap();
        assert_eq!(domain.kind(), MarkKind::Path);
        assert_eq!(domain.payload.bounds().unwrap().y0, 420.0);
    }

    #[test]
    fn reversed_left_axis_puts_small_values_on_top() {
        let plot = Rect::new(0.0, 0.0, 100.0, 200.0);
        let axis = AxisSpec::left(
            200,
            ScaleLinearSpec::new((0.0, 6.0)).with_reversed_range(true),
        )
        .with_tick_count(3);
        let marks = axis.marks(plot);
        let first_label = marks.iter().find(|m| m.id == MarkId(1200)).unwrap();
        match &first_label.payload.shape {
            MarkShape::Text(t) => {
                assert_eq!(t.text, "0");
                assert_eq!(t.pos.y, 0.0);
                assert_eq!(t.anchor, TextAnchor::End);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn band_axis_uses_category_labels() {
        let plot = Rect::new(0.0, 0.0, 70.0, 50.0);
        let axis = AxisSpec::bottom(300, ScaleBandSpec::new(3)).with_categories(["O", "B", "A"]);
        assert_eq!(labels(&axis.marks(plot)), vec!["O", "B", "A"]);
        assert!(axis.scale_continuous(plot).is_none());
    }

    #[test]
    fn grid_lines_sit_behind_series() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let axis = AxisSpec::left(400, ScaleLinearSpec::new((0.0, 1.0)))
            .with_tick_count(2)
            .with_grid(StrokeStyle::solid(css::LIGHT_GRAY, 0.5));
        let grid: Vec<_> = axis
            .marks(plot)
            .into_iter()
            .filter(|m| m.z_index == z_order::GRID_LINES)
            .collect();
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|m| m.payload.bounds().unwrap().width() == 100.0));
    }

    #[test]
    fn text_width_estimate_scales_with_length() {
        assert_eq!(estimate_text_width("", 10.0), 0.0);
        assert!(estimate_text_width("Sirius", 12.0) > estimate_text_width("Vega", 12.0));
    }
}
