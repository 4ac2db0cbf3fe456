// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous and band scales.
//!
//! A scale is a pure function from a data domain to a visual range. Specs hold the domain and
//! options; `instantiate` binds them to a concrete range once the frame is known.

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use starviz_core::{ColId, TableData};
use starviz_transforms::{Ticks, nice, tick_step, ticks};

/// Tick count used when a spec is instantiated without an explicit count.
pub const DEFAULT_TICK_COUNT: usize = 10;

/// A scale specification (domain + options, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleSpec {
    /// Continuous linear scale.
    Linear(ScaleLinearSpec),
    /// Continuous square-root scale.
    Sqrt(ScaleSqrtSpec),
    /// Discrete band scale.
    Band(ScaleBandSpec),
}

impl From<ScaleLinearSpec> for ScaleSpec {
    fn from(value: ScaleLinearSpec) -> Self {
        Self::Linear(value)
    }
}

impl From<ScaleSqrtSpec> for ScaleSpec {
    fn from(value: ScaleSqrtSpec) -> Self {
        Self::Sqrt(value)
    }
}

impl From<ScaleBandSpec> for ScaleSpec {
    fn from(value: ScaleBandSpec) -> Self {
        Self::Band(value)
    }
}

/// A continuous scale instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleContinuous {
    /// Linear scale.
    Linear(ScaleLinear),
    /// Square-root scale.
    Sqrt(ScaleSqrt),
}

impl From<ScaleLinear> for ScaleContinuous {
    fn from(value: ScaleLinear) -> Self {
        Self::Linear(value)
    }
}

impl From<ScaleSqrt> for ScaleContinuous {
    fn from(value: ScaleSqrt) -> Self {
        Self::Sqrt(value)
    }
}

impl ScaleContinuous {
    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        match self {
            Self::Linear(s) => s.map(x),
            Self::Sqrt(s) => s.map(x),
        }
    }

    /// Returns nice tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Ticks {
        let (d0, d1) = self.domain();
        ticks(d0, d1, count)
    }

    /// Returns the spacing between the values of [`ScaleContinuous::ticks`].
    pub fn tick_step(&self, count: usize) -> f64 {
        let (d0, d1) = self.domain();
        tick_step(d0, d1, count).abs()
    }

    /// Returns the domain as configured (after nicing).
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.domain,
            Self::Sqrt(s) => s.domain,
        }
    }

    /// Returns the output range.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.range,
            Self::Sqrt(s) => s.range,
        }
    }
}

// Exact at both ends: `t == 0` yields `range.0` and `t == 1` yields `range.1`.
fn interpolate(t: f64, range: (f64, f64), clamp: bool) -> f64 {
    let t = if clamp { t.clamp(0.0, 1.0) } else { t };
    (1.0 - t) * range.0 + t * range.1
}

fn midpoint(range: (f64, f64)) -> f64 {
    (range.0 + range.1) * 0.5
}

/// A linear mapping from a continuous domain to a continuous range.
///
/// Out-of-domain inputs extrapolate unless clamping is enabled. A zero-width domain maps every
/// input to the middle of the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    /// Enables or disables clamping to the range.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let denom = d1 - d0;
        if denom == 0.0 {
            return midpoint(self.range);
        }
        interpolate((x - d0) / denom, self.range, self.clamp)
    }

    /// Maps a range value back into the domain.
    pub fn invert(&self, y: f64) -> f64 {
        let (r0, r1) = self.range;
        let denom = r1 - r0;
        if denom == 0.0 {
            return midpoint(self.domain);
        }
        interpolate((y - r0) / denom, self.domain, self.clamp)
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns nice tick values for the domain.
    pub fn ticks(&self, count: usize) -> Ticks {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Specification for a linear scale (domain + options, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinearSpec {
    /// Domain in data units.
    pub domain: (f64, f64),
    /// Whether to extend the domain to nice tick bounds.
    pub nice: bool,
    /// Whether outputs are clamped to the range.
    pub clamp: bool,
    /// Whether the range is applied end-to-start.
    pub reverse: bool,
}

impl ScaleLinearSpec {
    /// Creates a new linear scale spec.
    pub fn new(domain: (f64, f64)) -> Self {
        Self {
            domain,
            nice: false,
            clamp: false,
            reverse: false,
        }
    }

    /// Enables or disables nice-domain behavior.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    /// Enables or disables clamping.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Maps the domain onto the range backwards: the domain minimum lands on the range end.
    ///
    /// Use this for magnitude axes (bright stars on top) and hot-on-the-left color axes.
    pub fn with_reversed_range(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Returns the effective domain after applying `nice` (if enabled).
    pub fn resolved_domain(&self, tick_count: usize) -> (f64, f64) {
        if self.nice {
            nice(self.domain.0, self.domain.1, tick_count)
        } else {
            self.domain
        }
    }

    /// Instantiates a concrete scale for `range`, nicing with [`DEFAULT_TICK_COUNT`].
    pub fn instantiate(&self, range: (f64, f64)) -> ScaleLinear {
        self.instantiate_resolved(range, DEFAULT_TICK_COUNT)
    }

    /// Instantiates a concrete scale, nicing for `tick_count` ticks.
    pub fn instantiate_resolved(&self, range: (f64, f64), tick_count: usize) -> ScaleLinear {
        let range = if self.reverse {
            (range.1, range.0)
        } else {
            range
        };
        ScaleLinear::new(self.resolved_domain(tick_count), range).with_clamp(self.clamp)
    }
}

/// Sign-preserving square root: `sign(x) * sqrt(|x|)`.
fn sqrt_warp(x: f64) -> f64 {
    if x < 0.0 { -(-x).sqrt() } else { x.sqrt() }
}

/// A square-root mapping, used to turn magnitudes or counts into glyph radii.
///
/// The warp is applied to both the domain and the input before interpolating, so the scale
/// stays monotonic for negative domains as well.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSqrt {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl ScaleSqrt {
    /// Creates a new square-root scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    /// Enables or disables clamping to the range.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let w0 = sqrt_warp(self.domain.0);
        let w1 = sqrt_warp(self.domain.1);
        let denom = w1 - w0;
        if denom == 0.0 {
            return midpoint(self.range);
        }
        interpolate((sqrt_warp(x) - w0) / denom, self.range, self.clamp)
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Specification for a square-root scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSqrtSpec {
    /// Domain in data units.
    pub domain: (f64, f64),
    /// Whether to extend the domain to nice tick bounds.
    pub nice: bool,
    /// Whether outputs are clamped to the range.
    pub clamp: bool,
    /// Whether the range is applied end-to-start.
    pub reverse: bool,
}

impl ScaleSqrtSpec {
    /// Creates a new square-root scale spec.
    pub fn new(domain: (f64, f64)) -> Self {
        Self {
            domain,
            nice: false,
            clamp: false,
            reverse: false,
        }
    }

    /// Enables or disables nice-domain behavior.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    /// Enables or disables clamping.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Maps the domain onto the range backwards.
    pub fn with_reversed_range(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Instantiates a concrete scale for `range`.
    pub fn instantiate(&self, range: (f64, f64)) -> ScaleSqrt {
        let range = if self.reverse {
            (range.1, range.0)
        } else {
            range
        };
        let domain = if self.nice {
            nice(self.domain.0, self.domain.1, DEFAULT_TICK_COUNT)
        } else {
            self.domain
        };
        ScaleSqrt::new(domain, range).with_clamp(self.clamp)
    }
}

/// A discrete band scale for categorical charts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    #[allow(clippy::cast_precision_loss, reason = "band counts are small")]
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the number of bands.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the start position of the band at `index`.
    #[allow(clippy::cast_precision_loss, reason = "band indices are small")]
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        let start = if r1 >= r0 { r0 } else { r1 };
        start + bw * self.padding_outer + step * index as f64
    }

    /// Returns the center position of the band at `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.x(index) + 0.5 * self.band_width()
    }
}

/// Specification for a band scale (count + padding, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBandSpec {
    /// Number of bands.
    pub count: usize,
    /// Inner padding in band units.
    pub padding_inner: f64,
    /// Outer padding in band units.
    pub padding_outer: f64,
}

impl ScaleBandSpec {
    /// Creates a new band scale spec with default padding.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Instantiates a concrete scale for a given output range.
    pub fn instantiate(&self, range: (f64, f64)) -> ScaleBand {
        ScaleBand::new(range, self.count).with_padding(self.padding_inner, self.padding_outer)
    }
}

/// Infers a `(min, max)` domain for a numeric column.
///
/// Non-finite values are ignored. Returns `None` if no finite values are present.
pub fn infer_domain_f64(data: &dyn TableData, col: ColId) -> Option<(f64, f64)> {
    extent_of(0..data.row_count(), |row| data.f64(row, col))
}

/// Computes the `(min, max)` of `accessor` over `items`, ignoring missing and non-finite values.
pub fn extent_of<T>(
    items: impl IntoIterator<Item = T>,
    mut accessor: impl FnMut(T) -> Option<f64>,
) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for item in items {
        let Some(v) = accessor(item) else {
            continue;
        };
        if !v.is_finite() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn linear_maps_and_extrapolates() {
        let s = ScaleLinear::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(s.map(5.0), 50.0);
        assert_eq!(s.map(12.0), 120.0);
        assert_eq!(s.with_clamp(true).map(12.0), 100.0);
        assert_eq!(s.invert(25.0), 2.5);
    }

    #[test]
    fn domain_ends_land_exactly_on_range_ends() {
        let domains = [(0.0, 1.0), (-1.46, 6.5), (-0.1, 0.2), (3.0, 0.1), (1e16, 1.0)];
        let ranges = [
            (0.7, 0.1),
            (3.0, 0.1),
            (-0.1, 0.2),
            (1e16, 1.0),
            (420.0, 20.0),
            (50.0, 550.0),
        ];
        for (a, b) in domains {
            for (p, q) in ranges {
                let s = ScaleLinear::new((a, b), (p, q));
                assert_eq!(s.map(a), p, "linear {a}..{b} -> {p}..{q}");
                assert_eq!(s.map(b), q, "linear {a}..{b} -> {p}..{q}");
                assert_eq!(s.invert(p), a, "invert {a}..{b} -> {p}..{q}");
                assert_eq!(s.invert(q), b, "invert {a}..{b} -> {p}..{q}");

                let r = ScaleSqrt::new((a, b), (p, q));
                assert_eq!(r.map(a), p, "sqrt {a}..{b} -> {p}..{q}");
                assert_eq!(r.map(b), q, "sqrt {a}..{b} -> {p}..{q}");
            }
        }

        // Reversed magnitude axis inside a plot that does not start at zero.
        let y = ScaleLinearSpec::new((-1.46, 6.5))
            .with_reversed_range(true)
            .instantiate((420.0, 20.0));
        assert_eq!(y.map(-1.46), 20.0);
        assert_eq!(y.map(6.5), 420.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_midpoint() {
        let s = ScaleLinear::new((3.0, 3.0), (0.0, 100.0));
        assert_eq!(s.map(3.0), 50.0);
        assert_eq!(s.map(-7.0), 50.0);
        let q = ScaleSqrt::new((4.0, 4.0), (7.0, 2.0));
        assert_eq!(q.map(4.0), 4.5);
    }

    #[test]
    fn reversed_range_is_a_named_option() {
        let spec = ScaleLinearSpec::new((-1.5, 15.0)).with_reversed_range(true);
        let s = spec.instantiate((0.0, 400.0));
        assert_eq!(s.map(-1.5), 400.0);
        assert_eq!(s.map(15.0), 0.0);
        assert_eq!(s.range(), (400.0, 0.0));
    }

    #[test]
    fn nice_domain_covers_data_and_is_stable() {
        let spec = ScaleLinearSpec::new((-0.43, 1.97)).with_nice(true);
        let d = spec.resolved_domain(10);
        assert!(d.0 <= -0.43 && d.1 >= 1.97);
        let again = ScaleLinearSpec::new(d).with_nice(true).resolved_domain(10);
        assert_eq!(again, d);
    }

    #[test]
    fn linear_scale_is_monotonic() {
        let s = ScaleLinearSpec::new((-0.5, 2.0))
            .with_nice(true)
            .instantiate((0.0, 600.0));
        let xs: Vec<f64> = (0..50).map(|i| -0.5 + f64::from(i) * 0.05).collect();
        for w in xs.windows(2) {
            assert!(s.map(w[0]) < s.map(w[1]));
        }
    }

    #[test]
    fn sqrt_preserves_sign_and_order() {
        let s = ScaleSqrt::new((-4.0, 4.0), (0.0, 4.0));
        assert_eq!(s.map(-4.0), 0.0);
        assert_eq!(s.map(0.0), 2.0);
        assert_eq!(s.map(4.0), 4.0);
        assert!(s.map(-1.0) < s.map(1.0));

        // Brighter stars (smaller magnitude) get larger radii.
        let r = ScaleSqrtSpec::new((-1.46, 6.5)).instantiate((7.0, 2.0));
        assert!(r.map(-1.46) > r.map(3.0));
        assert!((r.map(6.5) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn ticks_are_restartable() {
        let s = ScaleContinuous::from(ScaleLinear::new((0.0, 360.0), (0.0, 800.0)));
        let a: Vec<f64> = s.ticks(6).collect();
        let b: Vec<f64> = s.ticks(6).collect();
        assert_eq!(a, b);
        assert_eq!(a, vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0]);
        assert_eq!(s.tick_step(6), 50.0);
    }

    #[test]
    fn band_scale_spaces_bands_evenly() {
        let b = ScaleBandSpec::new(7).instantiate((0.0, 700.0));
        let w = b.band_width();
        assert!(w > 0.0);
        assert!((b.x(1) - b.x(0) - w * 1.1).abs() < 1e-9);
        assert!(b.x(6) + w <= 700.0 + 1e-9);
    }

    #[test]
    fn extents_skip_missing_values() {
        let values = [f64::NAN, 3.0, -1.0, f64::INFINITY];
        assert_eq!(extent_of(values, Some), Some((-1.0, 3.0)));
        assert_eq!(extent_of([f64::NAN], Some), None);
    }
}
