// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend mark generation.
//!
//! A vertical list of circular swatches with labels. Items may be tied to a filter predicate;
//! the swatch of an active filter is drawn faded.
//!
//! Ids: swatch `i` uses `id_base + i`, label `i` uses `id_base + 1000 + i` and the transparent
//! click target covering the row uses `id_base + 2000 + i`.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use peniko::color::palette::css;
use peniko::{Brush, Color};
use starviz_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::axis::estimate_text_width;
use crate::filter::{FilterState, PredicateId};
use crate::z_order;

/// A legend row.
#[derive(Clone, Debug)]
pub struct LegendItem {
    /// The label shown next to the swatch.
    pub label: String,
    /// The swatch color.
    pub color: Color,
    /// Predicate toggled by clicking this row.
    pub toggle: Option<PredicateId>,
}

impl LegendItem {
    /// A plain row.
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
            toggle: None,
        }
    }

    /// Ties this row to a filter predicate.
    pub fn with_toggle(mut self, predicate: PredicateId) -> Self {
        self.toggle = Some(predicate);
        self
    }
}

/// A vertical legend of circular swatches.
#[derive(Clone, Debug)]
pub struct LegendSwatches {
    /// Stable-id base.
    pub id_base: u64,
    /// Top-left corner.
    pub origin: Point,
    /// Swatch radius.
    pub radius: f64,
    /// Distance between row centers.
    pub row_height: f64,
    /// Gap between swatch edge and label.
    pub label_dx: f64,
    /// Label font size.
    pub font_size: f64,
    /// Label color.
    pub text_fill: Brush,
    /// Swatch opacity for inactive rows.
    pub opacity: f64,
    /// Swatch opacity while the row's filter is active.
    pub active_opacity: f64,
    /// Rows in display order.
    pub items: Vec<LegendItem>,
}

impl LegendSwatches {
    /// Creates a legend at `origin` with 6px swatches on a 20px pitch.
    pub fn new(id_base: u64, origin: Point, items: impl IntoIterator<Item = LegendItem>) -> Self {
        Self {
            id_base,
            origin,
            radius: 6.0,
            row_height: 20.0,
            label_dx: 9.0,
            font_size: 12.0,
            text_fill: Brush::Solid(css::BLACK),
            opacity: 0.9,
            active_opacity: 0.3,
            items: items.into_iter().collect(),
        }
    }

    /// Sets the label color.
    pub fn with_text_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.text_fill = fill.into();
        self
    }

    /// Id of the swatch for row `i`.
    pub fn swatch_id(&self, i: usize) -> MarkId {
        MarkId::from_raw(self.id_base + i as u64)
    }

    /// Id of the label for row `i`.
    pub fn label_id(&self, i: usize) -> MarkId {
        MarkId::from_raw(self.id_base + 1000 + i as u64)
    }

    /// Id of the click target for row `i`.
    pub fn target_id(&self, i: usize) -> MarkId {
        MarkId::from_raw(self.id_base + 2000 + i as u64)
    }

    /// Marks that toggle row `i` when clicked.
    pub fn toggle_marks(&self, i: usize) -> [MarkId; 2] {
        [self.swatch_id(i), self.target_id(i)]
    }

    #[allow(clippy::cast_precision_loss, reason = "legend rows are few")]
    fn row_center(&self, i: usize) -> Point {
        Point::new(
            self.origin.x + self.radius,
            self.origin.y + self.radius + self.row_height * i as f64,
        )
    }

    /// Generates legend marks, fading rows whose filter is active in `filters`.
    pub fn marks(&self, filters: &FilterState) -> Vec<Mark> {
        let mut out = Vec::with_capacity(self.items.len() * 3);
        for (i, item) in self.items.iter().enumerate() {
            let center = self.row_center(i);
            let active = item.toggle.is_some_and(|p| filters.is_active(p));
            let opacity = if active {
                self.active_opacity
            } else {
                self.opacity
            };
            out.push(
                Mark::builder(self.swatch_id(i))
                    .circle(center, self.radius)
                    .z_index(z_order::LEGEND_SWATCHES)
                    .fill(item.color)
                    .stroke(css::WHITE, 1.0)
                    .opacity(opacity)
                    .build(),
            );
            let label_x = center.x + self.radius + self.label_dx;
            out.push(
                Mark::builder(self.label_id(i))
                    .text((label_x, center.y), item.label.clone())
                    .z_index(z_order::LEGEND_LABELS)
                    .font_size(self.font_size)
                    .text_anchor(TextAnchor::Start)
                    .text_baseline(TextBaseline::Middle)
                    .fill(self.text_fill.clone())
                    .build(),
            );
            if item.toggle.is_some() {
                let w = label_x - self.origin.x + estimate_text_width(&item.label, self.font_size);
                let half = self.row_height * 0.5;
                out.push(
                    Mark::builder(self.target_id(i))
                        .rect(Rect::new(
                            self.origin.x,
                            center.y - half,
                            self.origin.x + w,
                            center.y + half,
                        ))
                        .z_index(z_order::LEGEND_SWATCHES - 1)
                        .fill(Color::TRANSPARENT)
                        .build(),
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn legend() -> LegendSwatches {
        LegendSwatches::new(
            500,
            Point::new(700.0, 30.0),
            [
                LegendItem::new("O", css::BLUE),
                LegendItem::new("T", css::GRAY).with_toggle(PredicateId(0)),
            ],
        )
    }

    #[test]
    fn active_filters_fade_their_swatch() {
        let legend = legend();
        let mut filters = FilterState::new();
        filters.register(PredicateId(0), |_| true);

        let idle = legend.marks(&filters);
        let swatch = |marks: &[Mark]| {
            marks
                .iter()
                .find(|m| m.id == legend.swatch_id(1))
                .map(|m| m.payload.style.opacity)
        };
        assert_eq!(swatch(&idle), Some(0.9));

        filters.toggle(PredicateId(0));
        assert_eq!(swatch(&legend.marks(&filters)), Some(0.3));
    }

    #[test]
    fn only_toggle_rows_get_click_targets() {
        let legend = legend();
        let marks = legend.marks(&FilterState::new());
        assert_eq!(marks.len(), 5);
        let target = marks.iter().find(|m| m.id == legend.target_id(1)).unwrap();
        let b = target.payload.bounds().unwrap();
        assert!(b.contains(Point::new(706.0, 56.0)));
        assert!(!marks.iter().any(|m| m.id == legend.target_id(0)));
    }
}
