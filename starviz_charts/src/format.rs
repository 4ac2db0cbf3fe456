// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick label formatting.

extern crate alloc;

use alloc::format;
use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

const MAX_DECIMALS: usize = 10;

/// Number of decimals needed to print every multiple of `step` exactly.
pub fn decimals_for_step(step: f64) -> usize {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 {
        return 0;
    }
    let mut scale = 1.0_f64;
    for d in 0..MAX_DECIMALS {
        let scaled = step * scale;
        if (scaled - scaled.round()).abs() <= 1e-9 * scaled.max(1.0) {
            return d;
        }
        scale *= 10.0;
    }
    MAX_DECIMALS
}

/// Formats a tick value with as many decimals as its step needs.
///
/// `-0` prints as `0`. A zero or non-finite step falls back to two decimals for fractional
/// values.
pub fn format_tick(value: f64, step: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let decimals = if step.is_finite() && step != 0.0 {
        decimals_for_step(step)
    } else if value == value.floor() {
        0
    } else {
        2
    };
    let s = format!("{value:.decimals$}");
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        return String::from(&s[1..]);
    }
    s
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn decimals_follow_the_step() {
        assert_eq!(format_tick(40.0, 20.0), "40");
        assert_eq!(format_tick(0.5, 0.5), "0.5");
        assert_eq!(format_tick(1.0, 0.5), "1.0");
        assert_eq!(format_tick(0.75, 0.25), "0.75");
        assert_eq!(format_tick(0.30000000000000004, 0.1), "0.3");
    }

    #[test]
    fn negative_zero_is_printed_as_zero() {
        assert_eq!(format_tick(-0.0, 1.0), "0");
        assert_eq!(format_tick(-0.00001, 0.5), "0.0");
    }

    #[test]
    fn missing_step_uses_value_shape() {
        assert_eq!(format_tick(3.0, 0.0), "3");
        assert_eq!(format_tick(3.14159, f64::NAN), "3.14");
    }
}
