// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text marks: free labels, the hover tooltip and the inline load-error message.
//!
//! Text is never shaped. Multi-line text is split on `\n` and renderers advance
//! [`LINE_HEIGHT`] em per line; [`TextMarkSpec::estimated_bounds`] uses the same metric so a
//! backdrop drawn behind the text roughly fits it.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use kurbo::{Point, Rect};
use peniko::color::palette::css;
use peniko::{Brush, Color};
use starviz_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::axis::estimate_text_width;
use crate::z_order;

/// Distance between consecutive baselines, in em.
pub const LINE_HEIGHT: f64 = 1.2;

/// A text mark spec.
#[derive(Clone, Debug)]
pub struct TextMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content; `\n` starts a new line.
    pub text: String,
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Rotation in degrees around `pos`.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline of the first line.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
    /// Rendering order hint.
    pub z_index: i32,
}

impl TextMarkSpec {
    /// A 12px black label at `pos`, drawn with the chart titles.
    pub fn new(id: MarkId, pos: impl Into<Point>, text: impl Into<String>) -> Self {
        Self {
            id,
            pos: pos.into(),
            text: text.into(),
            font_size: 12.0,
            angle: 0.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Middle,
            fill: Brush::Solid(Color::BLACK),
            z_index: z_order::TITLES,
        }
    }

    /// The message a chart shows in place of its data when loading fails.
    pub fn load_error(id: MarkId, center: impl Into<Point>, message: &str) -> Self {
        Self::new(id, center, format!("Error loading data: {message}"))
            .with_anchor(TextAnchor::Middle)
            .with_fill(css::RED)
    }

    /// Tooltip text hanging below and right of `pos`, above every other mark.
    pub fn tooltip(id: MarkId, pos: impl Into<Point>, text: impl Into<String>) -> Self {
        Self::new(id, pos, text)
            .with_baseline(TextBaseline::Hanging)
            .with_z_index(z_order::TOOLTIP)
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the text anchor.
    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the text baseline.
    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Sets the text rotation angle (degrees).
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// The lines of the text.
    pub fn lines(&self) -> core::str::Split<'_, char> {
        self.text.split('\n')
    }

    /// Approximate extent of the unrotated text.
    pub fn estimated_bounds(&self) -> Rect {
        let width = self
            .lines()
            .map(|line| estimate_text_width(line, self.font_size))
            .fold(0.0, f64::max);
        #[allow(clippy::cast_precision_loss, reason = "line counts are tiny")]
        let extra_lines = (self.lines().count() - 1) as f64;
        let height = self.font_size * (1.0 + LINE_HEIGHT * extra_lines);
        let x0 = match self.anchor {
            TextAnchor::Start => self.pos.x,
            TextAnchor::Middle => self.pos.x - 0.5 * width,
            TextAnchor::End => self.pos.x - width,
        };
        let y0 = match self.baseline {
            TextBaseline::Hanging => self.pos.y,
            TextBaseline::Middle => self.pos.y - 0.5 * self.font_size,
            TextBaseline::Alphabetic => self.pos.y - 0.8 * self.font_size,
        };
        Rect::new(x0, y0, x0 + width, y0 + height)
    }

    /// A panel behind the text, padded by `pad` on every side, drawn just below it.
    pub fn backdrop(&self, id: MarkId, fill: impl Into<Brush>, pad: f64) -> Mark {
        Mark::builder(id)
            .rect(self.estimated_bounds().inflate(pad, pad))
            .z_index(self.z_index - 1)
            .fill(fill)
            .stroke(css::GRAY, 1.0)
            .build()
    }

    /// Generates the mark.
    pub fn mark(&self) -> Mark {
        Mark::builder(self.id)
            .text(self.pos, self.text.clone())
            .z_index(self.z_index)
            .font_size(self.font_size)
            .text_anchor(self.anchor)
            .text_baseline(self.baseline)
            .angle(self.angle)
            .fill(self.fill.clone())
            .build()
    }
}
