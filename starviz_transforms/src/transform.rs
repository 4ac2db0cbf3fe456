// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR types.

extern crate alloc;

use alloc::vec::Vec;

use starviz_core::{ColId, TableId};

/// Aggregation operation for [`Transform::Aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Count rows.
    Count,
    /// Sum values (skips non-finite).
    Sum,
    /// Minimum value (skips non-finite).
    Min,
    /// Maximum value (skips non-finite).
    Max,
    /// Mean value (skips non-finite).
    Mean,
}

/// A single aggregated output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateField {
    /// Operation to apply.
    pub op: AggregateOp,
    /// Input column.
    pub input: ColId,
    /// Output column id.
    pub output: ColId,
}

/// Sorting order for [`Transform::Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Comparison operators for numeric predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==` (exact float equality)
    Eq,
    /// `!=` (exact float inequality)
    Ne,
    /// The value is finite; the right-hand constant is ignored.
    IsFinite,
}

/// A row predicate used by [`Transform::Filter`]: a single numeric comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column to read.
    pub col: ColId,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand constant.
    pub value: f64,
}

impl Predicate {
    /// Keeps rows whose `col` is finite.
    pub fn is_finite(col: ColId) -> Self {
        Self {
            col,
            op: CompareOp::IsFinite,
            value: 0.0,
        }
    }

    /// Evaluate the predicate for a given numeric value.
    pub fn eval(&self, v: f64) -> bool {
        match self.op {
            CompareOp::Lt => v < self.value,
            CompareOp::Le => v <= self.value,
            CompareOp::Gt => v > self.value,
            CompareOp::Ge => v >= self.value,
            CompareOp::Eq => v == self.value,
            CompareOp::Ne => v != self.value,
            CompareOp::IsFinite => v.is_finite(),
        }
    }
}

/// Output columns written by [`Transform::Bin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinColumns {
    /// Inclusive lower edge.
    pub x0: ColId,
    /// Upper edge (exclusive, except for the last bin).
    pub x1: ColId,
    /// Number of values in the bin.
    pub count: ColId,
}

impl Default for BinColumns {
    fn default() -> Self {
        Self {
            x0: ColId(0),
            x1: ColId(1),
            count: ColId(2),
        }
    }
}

/// Output columns written by [`Transform::Density2d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityColumns {
    /// Cell left edge.
    pub x0: ColId,
    /// Cell bottom edge.
    pub y0: ColId,
    /// Cell right edge.
    pub x1: ColId,
    /// Cell top edge.
    pub y1: ColId,
    /// Estimated density (points per unit area).
    pub density: ColId,
    /// Index of the highest threshold reached; `0` means below every threshold.
    pub band: ColId,
}

impl Default for DensityColumns {
    fn default() -> Self {
        Self {
            x0: ColId(0),
            y0: ColId(1),
            x1: ColId(2),
            y1: ColId(3),
            density: ColId(4),
            band: ColId(5),
        }
    }
}

/// Output columns written by [`Transform::Regression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegressionColumns {
    /// Endpoint x.
    pub x: ColId,
    /// Fitted y at `x`.
    pub y: ColId,
    /// Fitted slope (same on both rows).
    pub slope: ColId,
    /// Fitted intercept (same on both rows).
    pub intercept: ColId,
    /// Coefficient of determination (same on both rows).
    pub r_squared: ColId,
}

impl Default for RegressionColumns {
    fn default() -> Self {
        Self {
            x: ColId(0),
            y: ColId(1),
            slope: ColId(2),
            intercept: ColId(3),
            r_squared: ColId(4),
        }
    }
}

/// A table transform from an input table to an output table.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Keep only rows that satisfy a predicate.
    Filter {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Predicate to apply per row.
        predicate: Predicate,
        /// Columns to carry through to the output table.
        columns: Vec<ColId>,
    },
    /// Select a subset of columns.
    Project {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Columns to include in the output table.
        columns: Vec<ColId>,
    },
    /// Reorder rows by a numeric key column. Non-finite keys sort last; ties keep input order.
    Sort {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Column used as the sort key.
        by: ColId,
        /// Sort order.
        order: SortOrder,
        /// Columns to carry through to the output table.
        columns: Vec<ColId>,
    },
    /// Group rows by one or more key columns and compute aggregates.
    ///
    /// Output columns are `group_by` (in order) followed by the `fields` outputs (in order).
    /// Groups appear in order of first occurrence; the output row key is the group index.
    Aggregate {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Group-by key columns.
        group_by: Vec<ColId>,
        /// Aggregated fields.
        fields: Vec<AggregateField>,
    },
    /// Count values of a numeric column into contiguous bins.
    ///
    /// Thresholds are the nice ticks of the domain for `thresholds` intervals. Each bin is
    /// `[x0, x1)`, except the last which also includes its upper edge. Non-finite values and
    /// values outside the domain are not counted. The output has one row per bin, keyed by bin
    /// index.
    Bin {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Input column to bin.
        input_col: ColId,
        /// Fixed domain. When `None`, the data extent is used, extended to nice bounds.
        extent: Option<(f64, f64)>,
        /// Target number of bins.
        thresholds: usize,
        /// Output columns.
        columns: BinColumns,
    },
    /// Gaussian kernel density estimate of 2-D points on a regular grid.
    ///
    /// The grid covers `x_extent` × `y_extent` in cells of `cell_size` data units. Each cell's
    /// `band` is the number of density thresholds (nice ticks up to the peak density, roughly
    /// `thresholds` of them) it reaches. The output has one row per cell, keyed by
    /// `row * columns + column`.
    Density2d {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Point x column.
        x_col: ColId,
        /// Point y column.
        y_col: ColId,
        /// Grid x domain.
        x_extent: (f64, f64),
        /// Grid y domain.
        y_extent: (f64, f64),
        /// Cell edge length in data units.
        cell_size: f64,
        /// Kernel standard deviation in data units.
        bandwidth: f64,
        /// Target number of density thresholds.
        thresholds: usize,
        /// Output columns.
        columns: DensityColumns,
    },
    /// Least-squares linear fit `y = slope * x + intercept` over rows with finite x and y.
    ///
    /// The output has two rows (keys `0` and `1`) at the smallest and largest x. Fewer than two
    /// points, or no spread in x, produce an empty table.
    Regression {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Predictor column.
        x_col: ColId,
        /// Response column.
        y_col: ColId,
        /// Output columns.
        columns: RegressionColumns,
    },
}

impl Transform {
    /// The table this transform reads.
    pub fn input(&self) -> TableId {
        match self {
            Self::Filter { input, .. }
            | Self::Project { input, .. }
            | Self::Sort { input, .. }
            | Self::Aggregate { input, .. }
            | Self::Bin { input, .. }
            | Self::Density2d { input, .. }
            | Self::Regression { input, .. } => *input,
        }
    }

    /// The table this transform writes.
    pub fn output(&self) -> TableId {
        match self {
            Self::Filter { output, .. }
            | Self::Project { output, .. }
            | Self::Sort { output, .. }
            | Self::Aggregate { output, .. }
            | Self::Bin { output, .. }
            | Self::Density2d { output, .. }
            | Self::Regression { output, .. } => *output,
        }
    }

    /// Input columns this transform reads.
    pub fn input_columns(&self) -> Vec<ColId> {
        let mut cols = Vec::new();
        match self {
            Self::Filter {
                predicate, columns, ..
            } => {
                cols.extend_from_slice(columns);
                cols.push(predicate.col);
            }
            Self::Project { columns, .. } => cols.extend_from_slice(columns),
            Self::Sort { by, columns, .. } => {
                cols.extend_from_slice(columns);
                cols.push(*by);
            }
            Self::Aggregate {
                group_by, fields, ..
            } => {
                cols.extend_from_slice(group_by);
                cols.extend(fields.iter().map(|f| f.input));
            }
            Self::Bin { input_col, .. } => cols.push(*input_col),
            Self::Density2d { x_col, y_col, .. } | Self::Regression { x_col, y_col, .. } => {
                cols.push(*x_col);
                cols.push(*y_col);
            }
        }
        cols
    }
}
