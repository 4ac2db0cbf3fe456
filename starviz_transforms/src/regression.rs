// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Least-squares trend lines.

extern crate alloc;

use alloc::vec;

use crate::program::ExecutionError;
use crate::table::TableFrame;
use crate::transform::RegressionColumns;

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope.
    pub slope: f64,
    /// Intercept.
    pub intercept: f64,
    /// Coefficient of determination in `[0, 1]`.
    pub r_squared: f64,
    /// Smallest fitted x.
    pub x_min: f64,
    /// Largest fitted x.
    pub x_max: f64,
}

impl LinearFit {
    /// Evaluates the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a least-squares line through the pairs where both values are finite.
///
/// Returns `None` for fewer than two points or when every x is the same.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let pairs = || {
        xs.iter()
            .zip(ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
    };
    let mut n = 0_usize;
    let (mut sx, mut sy) = (0.0, 0.0);
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in pairs() {
        n += 1;
        sx += x;
        sy += y;
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }
    if n < 2 {
        return None;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "row counts are far below 2^53"
    )]
    let nf = n as f64;
    let (mx, my) = (sx / nf, sy / nf);

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs() {
        let (dx, dy) = (x - mx, y - my);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    // A flat response is fitted exactly by a flat line.
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    };
    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        x_min,
        x_max,
    })
}

pub(crate) fn regression(
    xs: &[f64],
    ys: &[f64],
    columns: RegressionColumns,
) -> Result<TableFrame, ExecutionError> {
    let mut out = TableFrame::new(vec![
        columns.x,
        columns.y,
        columns.slope,
        columns.intercept,
        columns.r_squared,
    ])?;
    let Some(fit) = linear_fit(xs, ys) else {
        log::debug!("regression: not enough spread to fit a line");
        return Ok(out);
    };
    for (key, x) in [(0, fit.x_min), (1, fit.x_max)] {
        out.push_row(
            key,
            &[x, fit.predict(x), fit.slope, fit.intercept, fit.r_squared],
        )?;
    }
    Ok(out)
}
