// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned numeric table used by the transform executor.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use starviz_core::{ColId, Table, TableData, TableId};

/// Errors returned when building or using a [`TableFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFrameError {
    /// The requested column list is empty.
    EmptyColumns,
    /// The input table does not have a data accessor.
    MissingData,
    /// A row has a different number of values than the frame has columns.
    RowWidth {
        /// Columns in the frame.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },
}

/// An owned numeric table: stable `row_keys` plus a fixed set of `f64` columns.
///
/// Text fields never enter a frame. Missing values are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFrame {
    /// Stable keys for each row.
    pub row_keys: Vec<u64>,
    /// Column ids carried by this frame.
    pub columns: Vec<ColId>,
    /// Columnar numeric data, aligned to `columns`.
    pub data: Vec<Vec<f64>>,
}

impl TableFrame {
    /// Creates an empty frame.
    pub fn new(columns: Vec<ColId>) -> Result<Self, TableFrameError> {
        if columns.is_empty() {
            return Err(TableFrameError::EmptyColumns);
        }
        let data = vec![Vec::new(); columns.len()];
        Ok(Self {
            row_keys: Vec::new(),
            columns,
            data,
        })
    }

    /// Extracts a numeric frame from a `starviz_core` table.
    pub fn from_table(table: &Table, columns: Vec<ColId>) -> Result<Self, TableFrameError> {
        if columns.is_empty() {
            return Err(TableFrameError::EmptyColumns);
        }
        let Some(data) = table.data.as_deref() else {
            return Err(TableFrameError::MissingData);
        };
        let n = table.row_keys.len();
        let cols = columns
            .iter()
            .map(|&col| {
                (0..n)
                    .map(|row| data.f64(row, col).unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        Ok(Self {
            row_keys: table.row_keys.clone(),
            columns,
            data: cols,
        })
    }

    /// Appends a row. `values` must be aligned to `columns`.
    pub fn push_row(&mut self, key: u64, values: &[f64]) -> Result<(), TableFrameError> {
        if values.len() != self.columns.len() {
            return Err(TableFrameError::RowWidth {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.row_keys.push(key);
        for (col, &v) in self.data.iter_mut().zip(values) {
            col.push(v);
        }
        Ok(())
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    /// Returns a column index for a `ColId`, if present.
    pub fn column_index(&self, col: ColId) -> Option<usize> {
        self.columns.iter().position(|&c| c == col)
    }

    /// Returns a whole column.
    pub fn column(&self, col: ColId) -> Option<&[f64]> {
        let ci = self.column_index(col)?;
        self.data.get(ci).map(Vec::as_slice)
    }

    /// Gets a numeric value for a row/col if both exist.
    pub fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        self.column(col)?.get(row).copied()
    }

    /// Converts this frame into a `starviz_core::Table` with an owned `TableData` accessor.
    pub fn into_table(self, id: TableId) -> Table {
        Table::with_data(
            id,
            self.row_keys,
            Box::new(FrameData {
                columns: self.columns,
                data: self.data,
            }),
        )
    }
}

#[derive(Debug)]
struct FrameData {
    columns: Vec<ColId>,
    data: Vec<Vec<f64>>,
}

impl TableData for FrameData {
    fn row_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        let idx = self.columns.iter().position(|&c| c == col)?;
        self.data.get(idx)?.get(row).copied()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn push_row_checks_width() {
        let mut f = TableFrame::new(vec![ColId(0), ColId(1)]).unwrap();
        f.push_row(5, &[1.0, 2.0]).unwrap();
        assert_eq!(
            f.push_row(6, &[1.0]),
            Err(TableFrameError::RowWidth {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(f.row_count(), 1);
        assert_eq!(f.f64(0, ColId(1)), Some(2.0));
    }

    #[test]
    fn frame_round_trips_through_a_table() {
        let mut f = TableFrame::new(vec![ColId(3)]).unwrap();
        f.push_row(9, &[4.5]).unwrap();
        let table = f.clone().into_table(TableId(2));
        assert_eq!(table.row_keys, vec![9]);
        let back = TableFrame::from_table(&table, vec![ColId(3)]).unwrap();
        assert_eq!(back, f);
        assert_eq!(
            TableFrame::new(Vec::new()),
            Err(TableFrameError::EmptyColumns)
        );
    }
}
