// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loaded records and cleaning.

use std::io;

use starviz_core::{ColId, RecordRef, Table, TableData, TableId};

use crate::error::LoadError;
use crate::loader::RecordStream;
use crate::schema::{Field, FieldKind};

#[derive(Clone, Debug)]
enum Column {
    Number(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    fn push(&mut self, cell: String) {
        match self {
            Self::Number(v) => v.push(crate::loader::coerce_number(&cell)),
            Self::Text(v) => v.push(cell),
        }
    }

    fn retain(&mut self, keep: &[bool]) {
        match self {
            Self::Number(v) => retain_mask(v, keep),
            Self::Text(v) => retain_mask(v, keep),
        }
    }
}

fn retain_mask<T>(v: &mut Vec<T>, keep: &[bool]) {
    let mut keep = keep.iter();
    v.retain(|_| keep.next().copied().unwrap_or(true));
}

/// Column-oriented records with stable row keys.
///
/// Implements [`TableData`]: numeric fields read through [`TableData::f64`] (missing values are
/// `NaN`), text fields through [`TableData::text`].
#[derive(Clone, Debug)]
pub struct Records {
    table: TableId,
    fields: Vec<Field>,
    columns: Vec<Column>,
    keys: Vec<u64>,
}

impl Records {
    /// Drains a stream, stopping at the first error.
    pub fn from_stream<R: io::Read>(stream: RecordStream<R>) -> Result<Self, LoadError> {
        let table = stream.table();
        let fields = stream.fields().to_vec();
        let mut columns: Vec<Column> = fields
            .iter()
            .map(|f| match f.kind {
                FieldKind::Number => Column::Number(Vec::new()),
                FieldKind::Text => Column::Text(Vec::new()),
            })
            .collect();
        let mut keys = Vec::new();
        for rec in stream {
            let rec = rec?;
            keys.push(rec.key());
            for (col, cell) in columns.iter_mut().zip(rec.into_cells()) {
                col.push(cell);
            }
        }
        Ok(Self {
            table,
            fields,
            columns,
            keys,
        })
    }

    /// Destination table id.
    pub fn table_id(&self) -> TableId {
        self.table
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Fields in column-id order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Column id of a field.
    pub fn col(&self, name: &str) -> Option<ColId> {
        let i = self.fields.iter().position(|f| f.name == name)?;
        u32::try_from(i).ok().map(ColId)
    }

    /// Row keys in row order.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// The record at `row`.
    pub fn record(&self, row: usize) -> Option<RecordRef<'_>> {
        let key = *self.keys.get(row)?;
        Some(RecordRef::new(self, row, key))
    }

    /// Iterates over records in row order.
    pub fn iter(&self) -> impl Iterator<Item = RecordRef<'_>> {
        self.keys
            .iter()
            .enumerate()
            .map(|(row, &key)| RecordRef::new(self, row, key))
    }

    /// Keeps only records for which `keep` returns `true`. Returns the number dropped.
    ///
    /// Surviving records keep their row keys.
    pub fn keep_if(&mut self, keep: impl Fn(RecordRef<'_>) -> bool) -> usize {
        let mask: Vec<bool> = self.iter().map(&keep).collect();
        let dropped = mask.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return 0;
        }
        retain_mask(&mut self.keys, &mask);
        for col in &mut self.columns {
            col.retain(&mask);
        }
        log::debug!(
            "table {:?}: dropped {dropped} records, {} remain",
            self.table,
            self.keys.len()
        );
        dropped
    }

    /// Drops records where any of `fields` is missing or non-finite.
    ///
    /// Every name must be a numeric field.
    pub fn keep_finite(&mut self, fields: &[&str]) -> Result<usize, LoadError> {
        let cols = fields
            .iter()
            .map(|name| {
                self.col(name)
                    .filter(|c| matches!(self.column(*c), Some(Column::Number(_))))
                    .ok_or_else(|| LoadError::UnknownField((*name).to_owned()))
            })
            .collect::<Result<Vec<ColId>, _>>()?;
        Ok(self.keep_if(|r| cols.iter().all(|c| r.finite(*c).is_some())))
    }

    /// Drops records where any numeric field is missing or non-finite.
    pub fn keep_complete(&mut self) -> usize {
        let cols: Vec<ColId> = (0..self.columns.len())
            .filter_map(|i| u32::try_from(i).ok().map(ColId))
            .filter(|c| matches!(self.column(*c), Some(Column::Number(_))))
            .collect();
        self.keep_if(|r| cols.iter().all(|c| r.finite(*c).is_some()))
    }

    /// Converts into a table with the same row keys.
    pub fn into_table(self) -> Table {
        let keys = self.keys.clone();
        Table::with_data(self.table, keys, Box::new(self))
    }

    fn column(&self, col: ColId) -> Option<&Column> {
        self.columns.get(usize::try_from(col.0).ok()?)
    }
}

impl TableData for Records {
    fn row_count(&self) -> usize {
        self.keys.len()
    }

    fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        match self.column(col)? {
            Column::Number(v) => v.get(row).copied(),
            Column::Text(_) => None,
        }
    }

    fn text(&self, row: usize, col: ColId) -> Option<&str> {
        match self.column(col)? {
            Column::Text(v) => v.get(row).map(String::as_str),
            Column::Number(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordLoader, Schema};

    fn stars() -> Records {
        let csv = "\
name,bv_color,vmag,spectral_type
Sirius,0.00,-1.46,A1V
Betelgeuse,1.85,0.42,M1-2Ia-Iab
Nova,,5.1,
Polaris,0.60,1.98,F7Ib
";
        RecordLoader::new(
            TableId(4),
            Schema::new().text("name").number("bv_color").number("vmag"),
        )
        .load_str(csv)
        .unwrap()
    }

    #[test]
    fn undeclared_columns_load_as_text() {
        let r = stars();
        let st = r.col("spectral_type").unwrap();
        assert_eq!(st, ColId(3));
        assert_eq!(r.record(1).unwrap().text(st), Some("M1-2Ia-Iab"));
        assert_eq!(r.record(1).unwrap().f64(st), None);
    }

    #[test]
    fn keep_finite_drops_missing_and_keeps_keys() {
        let mut r = stars();
        assert_eq!(r.keep_finite(&["bv_color"]).unwrap(), 1);
        assert_eq!(r.keys(), &[0, 1, 3]);
        let bv = r.col("bv_color").unwrap();
        let values: Vec<f64> = r.iter().filter_map(|rec| rec.f64(bv)).collect();
        assert_eq!(values, vec![0.0, 1.85, 0.6]);
    }

    #[test]
    fn keep_finite_rejects_text_and_unknown_fields() {
        let mut r = stars();
        assert!(matches!(
            r.keep_finite(&["name"]),
            Err(LoadError::UnknownField(ref f)) if f == "name"
        ));
        assert!(r.keep_finite(&["parallax"]).is_err());
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn table_conversion_keeps_row_keys() {
        let mut r = stars();
        r.keep_complete();
        let vmag = r.col("vmag").unwrap();
        let t = r.into_table();
        assert_eq!(t.id, TableId(4));
        assert_eq!(t.row_keys, vec![0, 1, 3]);
        assert_eq!(t.record(2).unwrap().f64(vmag), Some(1.98));
    }
}
