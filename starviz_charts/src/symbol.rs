// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Symbol helpers for point-like marks.

use kurbo::{Point, Rect};
use starviz_core::MarkBuilder;

/// A small set of symbol shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A circle.
    #[default]
    Circle,
    /// An axis-aligned square.
    Square,
}

impl Symbol {
    /// Applies this symbol's geometry to `builder`, centered at `center`.
    ///
    /// `radius` is the circle radius or half the square side.
    pub fn apply(self, builder: MarkBuilder, center: Point, radius: f64) -> MarkBuilder {
        match self {
            Self::Circle => builder.circle(center, radius),
            Self::Square => builder.rect(Rect::from_center_size(
                center,
                (2.0 * radius, 2.0 * radius),
            )),
        }
    }
}
