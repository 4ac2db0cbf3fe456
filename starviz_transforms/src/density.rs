// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2-D kernel density estimation on a regular grid.
//!
//! Points are counted into grid cells, the counts are blurred with a separable Gaussian kernel,
//! and each cell is assigned a band: how many density thresholds it reaches. Bands play the role
//! of contour levels; a renderer draws the cells of band `k` with the `k`-th color.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::program::ExecutionError;
use crate::table::TableFrame;
use crate::ticks::ticks;
use crate::transform::DensityColumns;

const MAX_CELLS: usize = 1 << 20;

/// Grid geometry and parameters for [`density_grid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityParams {
    /// Grid x domain.
    pub x_extent: (f64, f64),
    /// Grid y domain.
    pub y_extent: (f64, f64),
    /// Cell edge length in data units.
    pub cell_size: f64,
    /// Kernel standard deviation in data units. Zero disables smoothing.
    pub bandwidth: f64,
    /// Target number of thresholds.
    pub thresholds: usize,
}

/// Result of [`density_grid`].
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    /// Cells per row.
    pub nx: usize,
    /// Rows of cells.
    pub ny: usize,
    /// Lower-left corner of the grid.
    pub origin: (f64, f64),
    /// Cell edge length.
    pub cell_size: f64,
    /// Density per cell, row-major from the bottom row.
    pub values: Vec<f64>,
    /// Ascending positive density thresholds.
    pub levels: Vec<f64>,
}

impl DensityGrid {
    /// Number of thresholds `value` reaches.
    pub fn band(&self, value: f64) -> usize {
        self.levels.partition_point(|&l| l <= value)
    }
}

/// Estimates the density of the finite points `(xs[i], ys[i])` that fall inside the grid.
pub fn density_grid(
    xs: &[f64],
    ys: &[f64],
    params: &DensityParams,
) -> Result<DensityGrid, ExecutionError> {
    let DensityParams {
        x_extent,
        y_extent,
        cell_size,
        bandwidth,
        thresholds,
    } = *params;
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(ExecutionError::InvalidParameter(
            "density cell size must be positive",
        ));
    }
    if !(bandwidth.is_finite() && bandwidth >= 0.0) {
        return Err(ExecutionError::InvalidParameter(
            "density bandwidth must be non-negative",
        ));
    }
    let (x0, x1) = ordered(x_extent)?;
    let (y0, y1) = ordered(y_extent)?;
    let nx = cells(x1 - x0, cell_size);
    let ny = cells(y1 - y0, cell_size);
    if nx.saturating_mul(ny) > MAX_CELLS {
        return Err(ExecutionError::InvalidParameter(
            "density grid is too fine for its extent",
        ));
    }

    let mut grid = vec![0.0; nx * ny];
    for (&x, &y) in xs.iter().zip(ys) {
        if !(x.is_finite() && y.is_finite()) || x < x0 || x > x1 || y < y0 || y > y1 {
            continue;
        }
        let ix = index((x - x0) / cell_size, nx);
        let iy = index((y - y0) / cell_size, ny);
        grid[iy * nx + ix] += 1.0;
    }

    let sigma = bandwidth / cell_size;
    if sigma > 0.0 {
        let kernel = gaussian_kernel(sigma);
        grid = blur_rows(&grid, nx, ny, &kernel);
        grid = blur_columns(&grid, nx, ny, &kernel);
    }
    let area = cell_size * cell_size;
    for v in &mut grid {
        *v /= area;
    }

    let peak = grid.iter().copied().fold(0.0, f64::max);
    let levels: Vec<f64> = if peak > 0.0 {
        ticks(0.0, peak, thresholds.max(1))
            .filter(|&t| t > 0.0)
            .collect()
    } else {
        Vec::new()
    };
    log::debug!(
        "density: {nx}x{ny} cells, peak {peak:.4}, {} levels",
        levels.len()
    );

    Ok(DensityGrid {
        nx,
        ny,
        origin: (x0, y0),
        cell_size,
        values: grid,
        levels,
    })
}

fn ordered((a, b): (f64, f64)) -> Result<(f64, f64), ExecutionError> {
    if !(a.is_finite() && b.is_finite()) || a == b {
        return Err(ExecutionError::InvalidParameter(
            "density extent must be finite and non-empty",
        ));
    }
    Ok((a.min(b), a.max(b)))
}

fn cells(span: f64, cell_size: f64) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "span and cell size are positive and the product is bounded by MAX_CELLS"
    )]
    let n = (span / cell_size).ceil().min(MAX_CELLS as f64) as usize;
    n.max(1)
}

fn index(pos: f64, n: usize) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "pos is non-negative and clamped to the grid"
    )]
    let i = pos.floor() as usize;
    i.min(n - 1)
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "radius is a small positive integer"
    )]
    let radius = (3.0 * sigma).ceil().min(256.0) as usize;
    let two_s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            #[allow(
                clippy::cast_precision_loss,
                reason = "kernel offsets are tiny"
            )]
            let d = i as f64 - radius as f64;
            (-(d * d) / two_s2).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

fn blur_rows(src: &[f64], nx: usize, ny: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = kernel.len() / 2;
    let mut out = vec![0.0; src.len()];
    for row in 0..ny {
        let line = &src[row * nx..(row + 1) * nx];
        for (i, &v) in line.iter().enumerate() {
            if v == 0.0 {
                continue;
            }
            for (k, &w) in kernel.iter().enumerate() {
                let Some(j) = (i + k).checked_sub(radius) else {
                    continue;
                };
                if j < nx {
                    out[row * nx + j] += v * w;
                }
            }
        }
    }
    out
}

fn blur_columns(src: &[f64], nx: usize, ny: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = kernel.len() / 2;
    let mut out = vec![0.0; src.len()];
    for col in 0..nx {
        for i in 0..ny {
            let v = src[i * nx + col];
            if v == 0.0 {
                continue;
            }
            for (k, &w) in kernel.iter().enumerate() {
                let Some(j) = (i + k).checked_sub(radius) else {
                    continue;
                };
                if j < ny {
                    out[j * nx + col] += v * w;
                }
            }
        }
    }
    out
}

pub(crate) fn density(
    xs: &[f64],
    ys: &[f64],
    params: &DensityParams,
    columns: DensityColumns,
) -> Result<TableFrame, ExecutionError> {
    let grid = density_grid(xs, ys, params)?;
    let x_max = params.x_extent.0.max(params.x_extent.1);
    let y_max = params.y_extent.0.max(params.y_extent.1);
    let mut out = TableFrame::new(vec![
        columns.x0,
        columns.y0,
        columns.x1,
        columns.y1,
        columns.density,
        columns.band,
    ])?;
    for iy in 0..grid.ny {
        for ix in 0..grid.nx {
            let v = grid.values[iy * grid.nx + ix];
            #[allow(
                clippy::cast_precision_loss,
                reason = "grid indices are bounded by MAX_CELLS"
            )]
            let (cx0, cy0) = (
                grid.origin.0 + ix as f64 * grid.cell_size,
                grid.origin.1 + iy as f64 * grid.cell_size,
            );
            #[allow(
                clippy::cast_precision_loss,
                reason = "band counts are tiny"
            )]
            let band = grid.band(v) as f64;
            out.push_row(
                (iy * grid.nx + ix) as u64,
                &[
                    cx0,
                    cy0,
                    (cx0 + grid.cell_size).min(x_max),
                    (cy0 + grid.cell_size).min(y_max),
                    v,
                    band,
                ],
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn params(bandwidth: f64) -> DensityParams {
        DensityParams {
            x_extent: (0.0, 10.0),
            y_extent: (0.0, 10.0),
            cell_size: 1.0,
            bandwidth,
            thresholds: 5,
        }
    }

    #[test]
    fn unsmoothed_grid_counts_points_per_cell() {
        let xs = [0.5, 0.7, 9.9, 10.0, 42.0];
        let ys = [0.5, 0.2, 9.9, 10.0, 1.0];
        let g = density_grid(&xs, &ys, &params(0.0)).unwrap();
        assert_eq!((g.nx, g.ny), (10, 10));
        assert_eq!(g.values[0], 2.0);
        // The upper edge is clamped into the last cell.
        assert_eq!(g.values[99], 2.0);
        assert_eq!(g.values.iter().sum::<f64>(), 4.0);
    }

    #[test]
    fn smoothing_keeps_mass_away_from_edges() {
        let xs = [5.5; 20];
        let ys = [5.5; 20];
        let g = density_grid(&xs, &ys, &params(1.0)).unwrap();
        let total: f64 = g.values.iter().sum();
        assert!((total - 20.0).abs() < 1e-6, "total = {total}");
        let center = g.values[5 * 10 + 5];
        assert!(center < 20.0 && center > g.values[5 * 10 + 7]);
        assert_eq!(g.band(center), g.levels.len());
        assert_eq!(g.band(0.0), 0);
    }

    #[test]
    fn frame_has_one_row_per_cell() {
        let f = density(&[1.0], &[1.0], &params(1.0), DensityColumns::default()).unwrap();
        assert_eq!(f.row_count(), 100);
        let c = DensityColumns::default();
        assert_eq!(f.f64(11, c.x0), Some(1.0));
        assert_eq!(f.f64(11, c.y1), Some(2.0));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut p = params(1.0);
        p.cell_size = 0.0;
        assert!(density_grid(&[], &[], &p).is_err());
        let mut p = params(1.0);
        p.x_extent = (1.0, 1.0);
        assert!(density_grid(&[], &[], &p).is_err());
        let p = params(f64::NAN);
        assert!(density_grid(&[], &[], &p).is_err());
    }
}
