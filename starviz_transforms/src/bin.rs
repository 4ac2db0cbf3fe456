// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Histogram binning.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::program::ExecutionError;
use crate::table::TableFrame;
use crate::ticks::{nice, ticks};
use crate::transform::BinColumns;

/// Returns the finite `(min, max)` of `values`, or `None` if there is no finite value.
pub fn finite_extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Returns the bin edges for `[lo, hi]`: `lo`, every nice tick strictly inside, then `hi`.
///
/// A zero-width domain yields a single bin `[lo, lo]`.
pub fn bin_edges(lo: f64, hi: f64, thresholds: usize) -> Vec<f64> {
    let (lo, hi) = if hi < lo { (hi, lo) } else { (lo, hi) };
    let mut edges = vec![lo];
    edges.extend(ticks(lo, hi, thresholds).filter(|&t| t > lo && t < hi));
    edges.push(hi);
    edges
}

pub(crate) fn bin(
    values: &[f64],
    extent: Option<(f64, f64)>,
    thresholds: usize,
    columns: BinColumns,
) -> Result<TableFrame, ExecutionError> {
    if thresholds == 0 {
        return Err(ExecutionError::InvalidParameter(
            "bin thresholds must be positive",
        ));
    }
    let mut out = TableFrame::new(vec![columns.x0, columns.x1, columns.count])?;
    let (lo, hi) = match extent {
        Some((a, b)) if a.is_finite() && b.is_finite() => (a.min(b), a.max(b)),
        Some(_) => {
            return Err(ExecutionError::InvalidParameter(
                "bin extent must be finite",
            ));
        }
        None => match finite_extent(values.iter().copied()) {
            Some((lo, hi)) => nice(lo, hi, thresholds),
            None => return Ok(out),
        },
    };

    let edges = bin_edges(lo, hi, thresholds);
    let inner = &edges[1..edges.len() - 1];
    let mut counts = vec![0_u64; edges.len() - 1];
    let mut skipped = 0_usize;
    for &v in values {
        if !v.is_finite() || v < lo || v > hi {
            skipped += 1;
            continue;
        }
        let idx = inner.partition_point(|&e| e <= v);
        counts[idx] += 1;
    }
    if skipped > 0 {
        log::debug!("bin: {skipped} values outside [{lo}, {hi}] or non-finite");
    }

    for (i, (pair, &count)) in edges.windows(2).zip(&counts).enumerate() {
        #[allow(
            clippy::cast_precision_loss,
            reason = "counts are far below 2^53"
        )]
        let count = count as f64;
        out.push_row(i as u64, &[pair[0], pair[1], count])?;
    }
    Ok(out)
}
