// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color scales: sequential ramps and categorical lookups.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use peniko::Color;

/// Errors returned when building a [`ColorRamp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorRampError {
    /// No stops were given.
    Empty,
    /// A stop offset is NaN or infinite.
    NonFiniteOffset,
    /// Stop offsets are not in ascending order.
    Unsorted,
}

impl fmt::Display for ColorRampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "a color ramp needs at least one stop",
            Self::NonFiniteOffset => "color ramp offsets must be finite",
            Self::Unsorted => "color ramp offsets must be ascending",
        })
    }
}

impl core::error::Error for ColorRampError {}

/// A piecewise-linear color ramp over `t`.
///
/// Segment `i` covers `[offset_i, offset_{i+1})`; the final stop is inclusive. Inputs below the
/// first stop take the first color, inputs above the last stop take the last color. Colors are
/// interpolated per channel on their sRGB components.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f64, Color)>,
}

impl ColorRamp {
    /// Creates a ramp from `(offset, color)` stops in ascending offset order.
    pub fn new(stops: impl IntoIterator<Item = (f64, Color)>) -> Result<Self, ColorRampError> {
        let stops: Vec<(f64, Color)> = stops.into_iter().collect();
        if stops.is_empty() {
            return Err(ColorRampError::Empty);
        }
        if stops.iter().any(|(o, _)| !o.is_finite()) {
            return Err(ColorRampError::NonFiniteOffset);
        }
        if stops.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(ColorRampError::Unsorted);
        }
        Ok(Self { stops })
    }

    /// Creates a ramp with stops at `i / (n - 1)`.
    #[allow(clippy::cast_precision_loss, reason = "ramps have a handful of stops")]
    pub fn evenly_spaced(colors: &[Color]) -> Result<Self, ColorRampError> {
        let last = colors.len().saturating_sub(1).max(1);
        Self::new(
            colors
                .iter()
                .enumerate()
                .map(|(i, &c)| (i as f64 / last as f64, c)),
        )
    }

    /// The stops, in ascending offset order.
    pub fn stops(&self) -> &[(f64, Color)] {
        &self.stops
    }

    /// Evaluates the ramp at `t`.
    pub fn eval(&self, t: f64) -> Color {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t.is_nan() || t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        // First stop strictly above `t`; `t` lies in `[stops[i - 1], stops[i])`.
        let i = self.stops.partition_point(|(o, _)| *o <= t);
        let (o0, c0) = self.stops[i - 1];
        let (o1, c1) = self.stops[i];
        let span = o1 - o0;
        if span <= 0.0 {
            return c1;
        }
        lerp_srgb(c0, c1, (t - o0) / span)
    }
}

fn lerp_srgb(a: Color, b: Color, t: f64) -> Color {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "color components are f32"
    )]
    let t = t as f32;
    let mut out = [0.0_f32; 4];
    for (o, (x, y)) in out.iter_mut().zip(a.components.iter().zip(b.components.iter())) {
        *o = x + (y - x) * t;
    }
    Color::new(out)
}

/// A sequential color scale: a continuous domain mapped through a [`ColorRamp`].
///
/// Inputs are normalized to `t` in `[0, 1]` and clamped. Non-finite inputs map to the `unknown`
/// color.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSequential {
    /// Domain in data units.
    pub domain: (f64, f64),
    /// Color ramp over `t`.
    pub ramp: ColorRamp,
    /// Color for missing values.
    pub unknown: Color,
}

impl ScaleSequential {
    /// Creates a sequential scale with a neutral grey `unknown` color.
    pub fn new(domain: (f64, f64), ramp: ColorRamp) -> Self {
        Self {
            domain,
            ramp,
            unknown: Color::from_rgb8(0xcc, 0xcc, 0xcc),
        }
    }

    /// Sets the color used for missing values.
    pub fn with_unknown(mut self, unknown: Color) -> Self {
        self.unknown = unknown;
        self
    }

    /// Maps a value to a color.
    pub fn map(&self, x: f64) -> Color {
        if !x.is_finite() {
            return self.unknown;
        }
        let (d0, d1) = self.domain;
        let denom = d1 - d0;
        let t = if denom == 0.0 { 0.5 } else { (x - d0) / denom };
        self.ramp.eval(t.clamp(0.0, 1.0))
    }
}

/// A categorical color scale: exact string lookups with a fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleOrdinal {
    entries: Vec<(String, Color)>,
    /// Color for categories not in the domain.
    pub unknown: Color,
}

impl ScaleOrdinal {
    /// Creates a scale from `(category, color)` pairs.
    ///
    /// Later duplicates of a category are ignored.
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, Color)>) -> Self {
        let mut out: Vec<(String, Color)> = Vec::new();
        for (k, c) in entries {
            let k = k.into();
            if out.iter().all(|(existing, _)| *existing != k) {
                out.push((k, c));
            }
        }
        Self {
            entries: out,
            unknown: Color::from_rgb8(0xcc, 0xcc, 0xcc),
        }
    }

    /// Sets the fallback color.
    pub fn with_unknown(mut self, unknown: Color) -> Self {
        self.unknown = unknown;
        self
    }

    /// Maps a category to its color.
    pub fn map(&self, category: &str) -> Color {
        self.entries
            .iter()
            .find(|(k, _)| k == category)
            .map_or(self.unknown, |(_, c)| *c)
    }

    /// Categories in insertion order.
    pub fn domain(&self) -> impl ExactSizeIterator<Item = &str> + Clone {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(category, color)` pairs in insertion order.
    pub fn entries(&self) -> &[(String, Color)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn close(a: Color, b: Color) -> bool {
        a.components
            .iter()
            .zip(b.components.iter())
            .all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn ramp_endpoints_and_clamping() {
        let blue = Color::from_rgb8(0x9b, 0xb3, 0xff);
        let orange = Color::from_rgb8(0xff, 0xcc, 0x6f);
        let ramp = ColorRamp::evenly_spaced(&[blue, orange]).unwrap();
        assert_eq!(ramp.eval(0.0), blue);
        assert_eq!(ramp.eval(1.0), orange);
        assert_eq!(ramp.eval(-3.0), blue);
        assert_eq!(ramp.eval(7.0), orange);
    }

    #[test]
    fn ramp_interpolates_per_channel() {
        let ramp = ColorRamp::new([
            (0.0, Color::from_rgb8(0, 0, 0)),
            (1.0, Color::from_rgb8(255, 255, 255)),
        ])
        .unwrap();
        let mid = ramp.eval(0.5);
        assert!(close(mid, Color::new([0.5, 0.5, 0.5, 1.0])));
    }

    #[test]
    fn interior_stop_starts_its_segment() {
        let a = Color::from_rgb8(255, 0, 0);
        let b = Color::from_rgb8(0, 255, 0);
        let c = Color::from_rgb8(0, 0, 255);
        let ramp = ColorRamp::new([(0.0, a), (0.5, b), (1.0, c)]).unwrap();
        assert_eq!(ramp.eval(0.5), b);
        assert!(close(ramp.eval(0.75), Color::new([0.0, 0.5, 0.5, 1.0])));
    }

    #[test]
    fn ramp_rejects_bad_stops() {
        assert_eq!(ColorRamp::new([]), Err(ColorRampError::Empty));
        let c = Color::WHITE;
        assert_eq!(
            ColorRamp::new([(0.5, c), (0.1, c)]),
            Err(ColorRampError::Unsorted)
        );
        assert_eq!(
            ColorRamp::new([(f64::NAN, c)]),
            Err(ColorRampError::NonFiniteOffset)
        );
    }

    #[test]
    fn sequential_scale_clamps_and_handles_missing() {
        let blue = Color::from_rgb8(0x9b, 0xb3, 0xff);
        let orange = Color::from_rgb8(0xff, 0xcc, 0x6f);
        let ramp = ColorRamp::evenly_spaced(&[blue, orange]).unwrap();
        let s = ScaleSequential::new((-0.5, 2.0), ramp).with_unknown(Color::BLACK);
        assert_eq!(s.map(-0.5), blue);
        assert_eq!(s.map(2.0), orange);
        assert_eq!(s.map(-9.0), blue);
        assert_eq!(s.map(9.0), orange);
        assert_eq!(s.map(f64::NAN), Color::BLACK);
    }

    #[test]
    fn ordinal_scale_falls_back_to_unknown() {
        let s = ScaleOrdinal::new(vec![
            ("O", Color::from_rgb8(0x9b, 0xb3, 0xff)),
            ("M", Color::from_rgb8(0xff, 0xcc, 0x6f)),
            ("O", Color::BLACK),
        ]);
        assert_eq!(s.map("M"), Color::from_rgb8(0xff, 0xcc, 0x6f));
        assert_eq!(s.map("O"), Color::from_rgb8(0x9b, 0xb3, 0xff));
        assert_eq!(s.map("W"), s.unknown);
        assert_eq!(s.domain().len(), 2);
    }
}
