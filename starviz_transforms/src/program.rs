// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full-recompute execution of a list of transforms.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use hashbrown::HashMap;
use starviz_core::{ColId, TableId};

use crate::bin::bin;
use crate::density::{DensityParams, density};
use crate::regression::regression;
use crate::table::{TableFrame, TableFrameError};
use crate::transform::{AggregateField, AggregateOp, SortOrder, Transform};

/// Errors returned by [`Program::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A transform reads a table that is neither an input nor produced earlier.
    MissingInput(TableId),
    /// A transform reads a column its input does not carry.
    MissingColumn {
        /// Table being read.
        table: TableId,
        /// Missing column.
        col: ColId,
    },
    /// A transform parameter is out of range.
    InvalidParameter(&'static str),
    /// Building an output frame failed.
    Frame(TableFrameError),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(id) => write!(f, "missing input table {}", id.0),
            Self::MissingColumn { table, col } => {
                write!(f, "table {} has no column {}", table.0, col.0)
            }
            Self::InvalidParameter(msg) => f.write_str(msg),
            Self::Frame(err) => write!(f, "invalid frame: {err:?}"),
        }
    }
}

impl core::error::Error for ExecutionError {}

impl From<TableFrameError> for ExecutionError {
    fn from(err: TableFrameError) -> Self {
        Self::Frame(err)
    }
}

/// Output tables produced by [`Program::execute`], keyed by output id.
#[derive(Debug, Clone, Default)]
pub struct ProgramOutput {
    /// Output tables.
    pub tables: HashMap<TableId, TableFrame>,
}

/// An ordered list of transforms.
///
/// Later transforms may read the outputs of earlier ones.
#[derive(Debug, Clone, Default)]
pub struct Program {
    transforms: Vec<Transform>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Builder-style [`Program::push`].
    #[must_use]
    pub fn with(mut self, transform: Transform) -> Self {
        self.push(transform);
        self
    }

    /// The transforms, in execution order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Runs every transform against `inputs`, recomputing all outputs.
    pub fn execute(
        &self,
        inputs: &HashMap<TableId, TableFrame>,
    ) -> Result<ProgramOutput, ExecutionError> {
        let mut out = ProgramOutput::default();
        for t in &self.transforms {
            let input_id = t.input();
            let input = out
                .tables
                .get(&input_id)
                .or_else(|| inputs.get(&input_id))
                .ok_or(ExecutionError::MissingInput(input_id))?;
            let frame = run(t, input_id, input)?;
            log::trace!(
                "transform {:?} -> {:?}: {} rows",
                input_id,
                t.output(),
                frame.row_count()
            );
            out.tables.insert(t.output(), frame);
        }
        Ok(out)
    }
}

fn column(frame: &TableFrame, table: TableId, col: ColId) -> Result<&[f64], ExecutionError> {
    frame
        .column(col)
        .ok_or(ExecutionError::MissingColumn { table, col })
}

fn select_rows(
    frame: &TableFrame,
    table: TableId,
    rows: &[usize],
    columns: &[ColId],
) -> Result<TableFrame, ExecutionError> {
    let mut data = Vec::with_capacity(columns.len());
    for &col in columns {
        let src = column(frame, table, col)?;
        data.push(rows.iter().map(|&r| src[r]).collect());
    }
    if columns.is_empty() {
        return Err(TableFrameError::EmptyColumns.into());
    }
    Ok(TableFrame {
        row_keys: rows.iter().map(|&r| frame.row_keys[r]).collect(),
        columns: columns.to_vec(),
        data,
    })
}

fn run(t: &Transform, id: TableId, input: &TableFrame) -> Result<TableFrame, ExecutionError> {
    let all_rows = || (0..input.row_count()).collect::<Vec<_>>();
    match t {
        Transform::Filter {
            predicate, columns, ..
        } => {
            let key = column(input, id, predicate.col)?;
            let rows: Vec<usize> = (0..input.row_count())
                .filter(|&r| predicate.eval(key[r]))
                .collect();
            select_rows(input, id, &rows, columns)
        }
        Transform::Project { columns, .. } => select_rows(input, id, &all_rows(), columns),
        Transform::Sort {
            by, order, columns, ..
        } => {
            let key = column(input, id, *by)?;
            let mut rows = all_rows();
            rows.sort_by(|&a, &b| compare_keys(key[a], key[b], *order));
            select_rows(input, id, &rows, columns)
        }
        Transform::Aggregate {
            group_by, fields, ..
        } => aggregate(input, id, group_by, fields),
        Transform::Bin {
            input_col,
            extent,
            thresholds,
            columns,
            ..
        } => bin(column(input, id, *input_col)?, *extent, *thresholds, *columns),
        Transform::Density2d {
            x_col,
            y_col,
            x_extent,
            y_extent,
            cell_size,
            bandwidth,
            thresholds,
            columns,
            ..
        } => density(
            column(input, id, *x_col)?,
            column(input, id, *y_col)?,
            &DensityParams {
                x_extent: *x_extent,
                y_extent: *y_extent,
                cell_size: *cell_size,
                bandwidth: *bandwidth,
                thresholds: *thresholds,
            },
            *columns,
        ),
        Transform::Regression {
            x_col,
            y_col,
            columns,
            ..
        } => regression(
            column(input, id, *x_col)?,
            column(input, id, *y_col)?,
            *columns,
        ),
    }
}

/// Non-finite keys sort last regardless of `order`.
fn compare_keys(a: f64, b: f64, order: SortOrder) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => {
            let o = a.total_cmp(&b);
            match order {
                SortOrder::Asc => o,
                SortOrder::Desc => o.reverse(),
            }
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

fn group_key(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

#[derive(Clone, Copy)]
struct Acc {
    rows: usize,
    n: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Acc {
    const EMPTY: Self = Self {
        rows: 0,
        n: 0,
        sum: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn add(&mut self, v: f64) {
        self.rows += 1;
        if v.is_finite() {
            self.n += 1;
            self.sum += v;
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "row counts are far below 2^53"
    )]
    fn finish(&self, op: AggregateOp) -> f64 {
        match op {
            AggregateOp::Count => self.rows as f64,
            AggregateOp::Sum => self.sum,
            _ if self.n == 0 => f64::NAN,
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
            AggregateOp::Mean => self.sum / self.n as f64,
        }
    }
}

fn aggregate(
    input: &TableFrame,
    id: TableId,
    group_by: &[ColId],
    fields: &[AggregateField],
) -> Result<TableFrame, ExecutionError> {
    let keys: Vec<&[f64]> = group_by
        .iter()
        .map(|&c| column(input, id, c))
        .collect::<Result<_, _>>()?;
    let values: Vec<&[f64]> = fields
        .iter()
        .map(|f| column(input, id, f.input))
        .collect::<Result<_, _>>()?;

    let mut index: HashMap<Vec<u64>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<f64>, Vec<Acc>)> = Vec::new();
    for row in 0..input.row_count() {
        let key: Vec<u64> = keys.iter().map(|k| group_key(k[row])).collect();
        let g = *index.entry(key).or_insert_with(|| {
            groups.push((
                keys.iter().map(|k| k[row]).collect(),
                alloc::vec![Acc::EMPTY; fields.len()],
            ));
            groups.len() - 1
        });
        for (acc, v) in groups[g].1.iter_mut().zip(&values) {
            acc.add(v[row]);
        }
    }

    let mut columns: Vec<ColId> = group_by.to_vec();
    columns.extend(fields.iter().map(|f| f.output));
    let mut out = TableFrame::new(columns)?;
    for (g, (key, accs)) in groups.iter().enumerate() {
        let mut row = key.clone();
        row.extend(accs.iter().zip(fields).map(|(a, f)| a.finish(f.op)));
        out.push_row(g as u64, &row)?;
    }
    Ok(out)
}
