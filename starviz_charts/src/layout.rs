// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart frame planning.
//!
//! A chart is a fixed `width × height` view with a margin on each side. The inner rectangle is
//! where data is drawn; the margins hold axes and the legend.

use core::fmt;

use kurbo::{Point, Rect};

/// Space reserved around the plot rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margin {
    /// Top margin.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
}

impl Margin {
    /// Creates a margin in CSS order (top, right, bottom, left).
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same margin on every side.
    pub fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }
}

/// Errors returned by [`FrameSpec::plan`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A dimension or margin is NaN or infinite.
    NonFinite,
    /// A margin is negative.
    NegativeMargin,
    /// The margins leave no room for the plot.
    DegenerateFrame {
        /// Width left for the plot.
        inner_width: f64,
        /// Height left for the plot.
        inner_height: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => f.write_str("chart dimensions must be finite"),
            Self::NegativeMargin => f.write_str("chart margins must not be negative"),
            Self::DegenerateFrame {
                inner_width,
                inner_height,
            } => write!(
                f,
                "margins leave a {inner_width} x {inner_height} plot area; both sides must be positive"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Outer chart size plus margins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSpec {
    /// View width.
    pub width: f64,
    /// View height.
    pub height: f64,
    /// Margins around the plot.
    pub margin: Margin,
}

impl FrameSpec {
    /// Creates a frame with no margins.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin::default(),
        }
    }

    /// Sets the margins.
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    /// Validates the frame and computes the plot rectangle.
    pub fn plan(&self) -> Result<PlotFrame, ConfigError> {
        let Margin {
            top,
            right,
            bottom,
            left,
        } = self.margin;
        let all = [self.width, self.height, top, right, bottom, left];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite);
        }
        if [top, right, bottom, left].iter().any(|&v| v < 0.0) {
            return Err(ConfigError::NegativeMargin);
        }
        let inner_width = self.width - left - right;
        let inner_height = self.height - top - bottom;
        if inner_width <= 0.0 || inner_height <= 0.0 {
            return Err(ConfigError::DegenerateFrame {
                inner_width,
                inner_height,
            });
        }
        Ok(PlotFrame {
            view: Rect::new(0.0, 0.0, self.width, self.height),
            plot: Rect::new(left, top, left + inner_width, top + inner_height),
            margin: self.margin,
        })
    }
}

/// A validated frame: the view and the plot rectangle inside it.
///
/// Scene y grows downward; [`PlotFrame::y_range`] is ordered bottom-to-top so that larger data
/// values are drawn higher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotFrame {
    view: Rect,
    plot: Rect,
    margin: Margin,
}

impl PlotFrame {
    /// The whole view.
    pub fn view(&self) -> Rect {
        self.view
    }

    /// The plot rectangle.
    pub fn plot(&self) -> Rect {
        self.plot
    }

    /// The margins.
    pub fn margin(&self) -> Margin {
        self.margin
    }

    /// Plot width.
    pub fn inner_width(&self) -> f64 {
        self.plot.width()
    }

    /// Plot height.
    pub fn inner_height(&self) -> f64 {
        self.plot.height()
    }

    /// Left edge of the plot.
    pub fn origin_x(&self) -> f64 {
        self.plot.x0
    }

    /// Top edge of the plot.
    pub fn origin_y(&self) -> f64 {
        self.plot.y0
    }

    /// Horizontal range, left to right.
    pub fn x_range(&self) -> (f64, f64) {
        (self.plot.x0, self.plot.x1)
    }

    /// Vertical range, bottom to top.
    pub fn y_range(&self) -> (f64, f64) {
        (self.plot.y1, self.plot.y0)
    }

    /// Top-left corner of the legend column in the right margin.
    pub fn legend_origin(&self) -> Point {
        Point::new(self.plot.x1 + 20.0, self.plot.y0 + 30.0)
    }

    /// Center of the plot.
    pub fn center(&self) -> Point {
        self.plot.center()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn plot_rect_is_view_minus_margins() {
        let frame = FrameSpec::new(1000.0, 600.0)
            .with_margin(Margin::new(40.0, 180.0, 60.0, 70.0))
            .plan()
            .unwrap();
        assert_eq!(frame.inner_width(), 750.0);
        assert_eq!(frame.inner_height(), 500.0);
        assert_eq!((frame.origin_x(), frame.origin_y()), (70.0, 40.0));
        assert_eq!(frame.x_range(), (70.0, 820.0));
        assert_eq!(frame.y_range(), (540.0, 40.0));
        assert!(frame.legend_origin().x > frame.plot().x1);
    }

    #[test]
    fn oversized_margins_are_rejected() {
        let err = FrameSpec::new(100.0, 100.0)
            .with_margin(Margin::new(10.0, 60.0, 10.0, 40.0))
            .plan()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DegenerateFrame {
                inner_width: 0.0,
                inner_height: 80.0
            }
        );
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert_eq!(
            FrameSpec::new(f64::NAN, 10.0).plan().unwrap_err(),
            ConfigError::NonFinite
        );
        assert_eq!(
            FrameSpec::new(10.0, 10.0)
                .with_margin(Margin::new(-1.0, 0.0, 0.0, 0.0))
                .plan()
                .unwrap_err(),
            ConfigError::NegativeMargin
        );
    }
}
