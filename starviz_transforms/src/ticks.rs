// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nice tick arithmetic shared by scales and bin thresholds.
//!
//! Steps are always `1`, `2`, `5` or `10` times a power of ten. Sub-unit steps are carried as an
//! integer inverse (`-k` meaning `1 / k`) so tick values come out as `i / k` rather than
//! `i * 0.1`, which keeps them bit-reproducible.

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

const MAX_TICKS: usize = 10_000;

fn nice_factor(error: f64) -> f64 {
    if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    }
}

/// Returns the tick increment for roughly `count` intervals over `[start, stop]`.
///
/// A positive result is the step itself. A negative result `-k` means a step of `1 / k`.
/// Returns `0.0` when no step exists (empty or non-finite span, `count == 0`).
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "tick counts are small"
    )]
    let step = (stop - start) / count as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / pow10(power);
    let factor = nice_factor(error);
    if power >= 0.0 {
        factor * pow10(power)
    } else {
        -pow10(-power) / factor
    }
}

/// Returns the signed tick step for `[start, stop]`, accepting reversed bounds.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (lo, hi, reverse) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };
    let inc = tick_increment(lo, hi, count);
    let step = if inc < 0.0 { -1.0 / inc } else { inc };
    if reverse { -step } else { step }
}

fn pow10(power: f64) -> f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "power is a small integral exponent"
    )]
    let p = power as i32;
    10.0_f64.powi(p)
}

/// Extends `[start, stop]` outward so both ends are multiples of the tick step.
///
/// The step is recomputed until it stops changing (at most ten rounds), so the result is
/// idempotent: `nice(nice(d)) == nice(d)`. Reversed domains stay reversed.
pub fn nice(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !start.is_finite() || !stop.is_finite() || start == stop {
        return (start, stop);
    }
    let reverse = stop < start;
    let (mut lo, mut hi) = if reverse { (stop, start) } else { (start, stop) };
    let mut prestep: Option<f64> = None;
    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if step == 0.0 || prestep == Some(step) {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        }
        prestep = Some(step);
    }
    if reverse { (hi, lo) } else { (lo, hi) }
}

/// Returns nice tick values covering `[start, stop]` (inclusive), in the order of the inputs.
pub fn ticks(start: f64, stop: f64, count: usize) -> Ticks {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Ticks::EMPTY;
    }
    if start == stop {
        return Ticks {
            constant: Some(start),
            len: 1,
            ..Ticks::EMPTY
        };
    }
    let descending = stop < start;
    let (lo, hi) = if descending { (stop, start) } else { (start, stop) };
    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 {
        return Ticks::EMPTY;
    }

    let (inverse, step) = if inc < 0.0 { (true, -inc) } else { (false, inc) };
    let at = |i: f64| if inverse { i / step } else { i * step };
    let (mut i0, mut i1) = if inverse {
        ((lo * step).round(), (hi * step).round())
    } else {
        ((lo / step).round(), (hi / step).round())
    };
    if at(i0) < lo {
        i0 += 1.0;
    }
    if at(i1) > hi {
        i1 -= 1.0;
    }
    if i1 < i0 {
        return Ticks::EMPTY;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "i1 >= i0 and both are integral; the count is capped below"
    )]
    let total = (i1 - i0) as usize + 1;
    let len = total.min(MAX_TICKS);
    if total > len {
        log::warn!("ticks: {total} ticks over [{start}, {stop}], keeping the {len} nearest {start}");
        // Keep the run that starts at `start`; descending ticks count down from the top.
        if descending {
            #[allow(clippy::cast_precision_loss, reason = "len is capped")]
            let kept = (len - 1) as f64;
            i0 = i1 - kept;
        }
    }
    Ticks {
        first: i0,
        step,
        inverse,
        descending,
        constant: None,
        len,
        pos: 0,
    }
}

/// Iterator over nice tick values.
///
/// Ticks are finite and restartable: cloning the iterator (or asking the scale again) yields the
/// same values.
#[derive(Clone, Debug, PartialEq)]
pub struct Ticks {
    first: f64,
    step: f64,
    inverse: bool,
    descending: bool,
    constant: Option<f64>,
    len: usize,
    pos: usize,
}

impl Ticks {
    const EMPTY: Self = Self {
        first: 0.0,
        step: 1.0,
        inverse: false,
        descending: false,
        constant: None,
        len: 0,
        pos: 0,
    };

    fn value_at(&self, k: usize) -> f64 {
        if let Some(c) = self.constant {
            return c;
        }
        let idx = if self.descending { self.len - 1 - k } else { k };
        #[allow(
            clippy::cast_precision_loss,
            reason = "tick counts are capped"
        )]
        let i = self.first + idx as f64;
        if self.inverse {
            i / self.step
        } else {
            i * self.step
        }
    }
}

impl Iterator for Ticks {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.pos >= self.len {
            return None;
        }
        let v = self.value_at(self.pos);
        self.pos += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.pos;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ticks {}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn increments_snap_to_one_two_five() {
        assert_eq!(tick_increment(0.0, 10.0, 10), 1.0);
        assert_eq!(tick_increment(0.0, 100.0, 5), 20.0);
        assert_eq!(tick_increment(0.0, 1.0, 5), -5.0);
        assert_eq!(tick_increment(0.0, 1.0, 10), -10.0);
        assert_eq!(tick_step(0.0, 1.0, 2), 0.5);
        assert_eq!(tick_step(1.0, 0.0, 2), -0.5);
        assert_eq!(tick_increment(0.0, 0.0, 10), 0.0);
    }

    #[test]
    fn nice_extends_and_is_idempotent() {
        assert_eq!(nice(0.12, 9.7, 10), (0.0, 10.0));
        assert_eq!(nice(-1.44, 7.96, 5), (-2.0, 8.0));
        let once = nice(-0.31, 1.87, 5);
        assert_eq!(nice(once.0, once.1, 5), once);
        assert_eq!(nice(9.7, 0.12, 10), (10.0, 0.0));
        assert_eq!(nice(3.0, 3.0, 10), (3.0, 3.0));
    }

    #[test]
    fn ticks_cover_the_domain() {
        let t: Vec<f64> = ticks(0.0, 1.0, 5).collect();
        assert_eq!(t, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let t: Vec<f64> = ticks(-0.5, 2.0, 5).collect();
        assert_eq!(t, vec![-0.5, 0.0, 0.5, 1.0, 1.5, 2.0]);

        let rev: Vec<f64> = ticks(10.0, 0.0, 2).collect();
        assert_eq!(rev, vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn ticks_are_restartable_and_exact_size() {
        let t = ticks(0.0, 360.0, 8);
        assert_eq!(t.len(), 8);
        let a: Vec<f64> = t.clone().collect();
        let b: Vec<f64> = t.collect();
        assert_eq!(a, b);
        assert_eq!(a.first(), Some(&0.0));
        assert_eq!(a.last(), Some(&350.0));
    }

    #[test]
    fn oversized_tick_runs_keep_the_start_end() {
        let up = ticks(0.0, 20_000.0, 20_000);
        assert_eq!(up.len(), MAX_TICKS);
        let up: Vec<f64> = up.collect();
        assert_eq!(up.first(), Some(&0.0));
        assert_eq!(up.last(), Some(&9_999.0));

        let down: Vec<f64> = ticks(20_000.0, 0.0, 20_000).collect();
        assert_eq!(down.len(), MAX_TICKS);
        assert_eq!(down.first(), Some(&20_000.0));
        assert_eq!(down.last(), Some(&10_001.0));
        assert!(down.windows(2).all(|w| w[1] == w[0] - 1.0));
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(ticks(2.0, 2.0, 5).collect::<Vec<_>>(), vec![2.0]);
        assert_eq!(ticks(0.0, 1.0, 0).count(), 0);
        assert_eq!(ticks(f64::NAN, 1.0, 5).count(), 0);
    }
}
