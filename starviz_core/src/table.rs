// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tables of records.
//!
//! A [`Table`] pairs a list of stable row keys with a column accessor ([`TableData`]).
//! Row keys are the identity used for mark reconciliation, so they must stay the same for the
//! same logical record across reloads and filters.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

/// Identifies a table within a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

/// Identifies a column within a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColId(pub u32);

/// Column accessor for a table.
///
/// Numeric fields are read with [`TableData::f64`]; text fields with [`TableData::text`].
/// A missing numeric value is reported as `None` or `NaN`; callers treat both the same way.
pub trait TableData: Debug {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Reads a numeric value.
    fn f64(&self, row: usize, col: ColId) -> Option<f64>;

    /// Reads a text value.
    fn text(&self, row: usize, col: ColId) -> Option<&str> {
        let _ = (row, col);
        None
    }
}

/// A table: stable row keys plus an optional data accessor.
#[derive(Debug)]
pub struct Table {
    /// Table id.
    pub id: TableId,
    /// Bumped whenever `row_keys` or `data` are replaced.
    pub version: u64,
    /// Stable keys, one per row, in row order.
    pub row_keys: Vec<u64>,
    /// Column accessor. `None` until data has been loaded.
    pub data: Option<Box<dyn TableData>>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            version: 1,
            row_keys: Vec::new(),
            data: None,
        }
    }

    /// Creates a table from row keys and a data accessor.
    pub fn with_data(id: TableId, row_keys: Vec<u64>, data: Box<dyn TableData>) -> Self {
        Self {
            id,
            version: 1,
            row_keys,
            data: Some(data),
        }
    }

    /// Marks the table as changed.
    pub fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Number of rows (the number of row keys).
    pub fn len(&self) -> usize {
        self.row_keys.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }

    /// Returns the record at `row`, if the table has data and the row exists.
    pub fn record(&self, row: usize) -> Option<RecordRef<'_>> {
        let data = self.data.as_deref()?;
        let key = *self.row_keys.get(row)?;
        Some(RecordRef { data, row, key })
    }

    /// Returns the row index for a row key.
    pub fn row_of_key(&self, key: u64) -> Option<usize> {
        self.row_keys.iter().position(|&k| k == key)
    }

    /// Iterates over all records in row order.
    ///
    /// Yields nothing if the table has no data accessor.
    pub fn records(&self) -> RecordIter<'_> {
        RecordIter {
            data: self.data.as_deref(),
            keys: &self.row_keys,
            row: 0,
        }
    }
}

/// A borrowed view of a single record.
#[derive(Clone, Copy, Debug)]
pub struct RecordRef<'a> {
    data: &'a dyn TableData,
    row: usize,
    key: u64,
}

impl<'a> RecordRef<'a> {
    /// Creates a record view. `row` must be a valid row of `data`.
    pub fn new(data: &'a dyn TableData, row: usize, key: u64) -> Self {
        Self { data, row, key }
    }

    /// Row index within the table.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Stable row key.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Reads a numeric field. Missing values come back as `None`, never `NaN`.
    pub fn f64(&self, col: ColId) -> Option<f64> {
        self.data.f64(self.row, col).filter(|v| !v.is_nan())
    }

    /// Reads a numeric field and requires it to be finite.
    pub fn finite(&self, col: ColId) -> Option<f64> {
        self.f64(col).filter(|v| v.is_finite())
    }

    /// Reads a text field.
    pub fn text(&self, col: ColId) -> Option<&'a str> {
        self.data.text(self.row, col)
    }
}

/// Iterator over the records of a [`Table`].
#[derive(Clone, Debug)]
pub struct RecordIter<'a> {
    data: Option<&'a dyn TableData>,
    keys: &'a [u64],
    row: usize,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = RecordRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data?;
        let key = *self.keys.get(self.row)?;
        let row = self.row;
        self.row += 1;
        Some(RecordRef { data, row, key })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match self.data {
            Some(_) => self.keys.len().saturating_sub(self.row),
            None => 0,
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for RecordIter<'_> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::String;
    use alloc::vec;

    use super::*;

    #[derive(Debug)]
    struct Stars {
        vmag: Vec<f64>,
        name: Vec<String>,
    }

    impl TableData for Stars {
        fn row_count(&self) -> usize {
            self.vmag.len()
        }

        fn f64(&self, row: usize, col: ColId) -> Option<f64> {
            match col {
                ColId(0) => self.vmag.get(row).copied(),
                _ => None,
            }
        }

        fn text(&self, row: usize, col: ColId) -> Option<&str> {
            match col {
                ColId(1) => self.name.get(row).map(String::as_str),
                _ => None,
            }
        }
    }

    fn table() -> Table {
        Table::with_data(
            TableId(1),
            vec![7, 3, 9],
            Box::new(Stars {
                vmag: vec![1.0, f64::NAN, -0.5],
                name: vec!["Vega".into(), "Mira".into(), "Sirius".into()],
            }),
        )
    }

    #[test]
    fn records_carry_row_keys_and_fields() {
        let t = table();
        let keys: Vec<u64> = t.records().map(|r| r.key()).collect();
        assert_eq!(keys, vec![7, 3, 9]);

        let mira = t.record(1).unwrap();
        assert_eq!(mira.text(ColId(1)), Some("Mira"));
        assert_eq!(mira.f64(ColId(0)), None, "NaN reads as missing");
        assert_eq!(t.row_of_key(9), Some(2));
    }

    #[test]
    fn table_without_data_has_no_records() {
        let mut t = Table::new(TableId(2));
        t.row_keys = vec![1, 2];
        assert_eq!(t.records().count(), 0);
        assert!(t.record(0).is_none());
    }
}
