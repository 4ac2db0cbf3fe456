// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSV reading.

use std::collections::HashSet;
use std::fs::File;
use std::fmt;
use std::io;
use std::path::Path;

use starviz_core::{ColId, TableId};

use crate::error::LoadError;
use crate::records::Records;
use crate::schema::{Field, FieldKind, Schema};

/// Row keys are truncated to the width `MarkId::for_row` keeps.
const ROW_KEY_MASK: u64 = (1 << 48) - 1;

/// Parses a numeric cell.
///
/// Surrounding whitespace is ignored. Empty, non-numeric (`N/A`, `--`) and non-finite text all
/// become `NaN`, the single missing-value marker downstream code checks for.
pub fn coerce_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

/// 64-bit FNV-1a, truncated to a row key.
fn key_hash(text: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in text.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    h & ROW_KEY_MASK
}

/// Reads CSV sources into [`Records`].
#[derive(Clone, Debug)]
pub struct RecordLoader {
    table: TableId,
    schema: Schema,
    key_field: Option<String>,
    delimiter: u8,
}

impl RecordLoader {
    /// Creates a comma-separated loader keyed by row position.
    pub fn new(table: TableId, schema: Schema) -> Self {
        Self {
            table,
            schema,
            key_field: None,
            delimiter: b',',
        }
    }

    /// Derives row keys from a field instead of the row position.
    ///
    /// Keys are a 48-bit hash of the trimmed field text, so the same star keeps its marks across
    /// reloads even when rows move. Empty or repeated values are errors.
    pub fn with_key_field(mut self, name: impl Into<String>) -> Self {
        self.key_field = Some(name.into());
        self
    }

    /// Sets the field delimiter (catalog exports are often `|`-separated).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Reads the header and returns a lazy iterator over the rows.
    pub fn stream<R: io::Read>(&self, reader: R) -> Result<RecordStream<R>, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            return Err(LoadError::EmptyHeader);
        }

        let declared = self.schema.fields().len();
        let mut fields: Vec<Field> = self.schema.fields().to_vec();
        let mut found = vec![false; declared];
        let mut header_cols = Vec::with_capacity(headers.len());
        for name in &headers {
            if name.is_empty() {
                header_cols.push(None);
                continue;
            }
            let col = match self.schema.position(name) {
                Some(i) if !found[i] => {
                    found[i] = true;
                    Some(i)
                }
                Some(_) => None,
                None if fields[declared..].iter().any(|f| f.name == name) => None,
                None => {
                    fields.push(Field {
                        name: name.to_owned(),
                        kind: FieldKind::Text,
                    });
                    Some(fields.len() - 1)
                }
            };
            if col.is_none() {
                log::warn!("ignoring repeated column `{name}`");
            }
            header_cols.push(col);
        }
        if let Some(missing) = self.schema.fields().iter().zip(&found).find(|(_, f)| !**f) {
            return Err(LoadError::MissingField(missing.0.name.clone()));
        }

        let key = match &self.key_field {
            None => None,
            Some(field) => {
                let header = headers
                    .iter()
                    .position(|h| h == field.as_str())
                    .ok_or_else(|| LoadError::MissingField(field.clone()))?;
                Some((field.clone(), header))
            }
        };

        Ok(RecordStream {
            table: self.table,
            rows: rdr.into_records(),
            fields,
            header_cols,
            key,
            seen: HashSet::new(),
            next_row: 0,
        })
    }

    /// Loads every row from `reader`.
    pub fn load_reader<R: io::Read>(&self, reader: R) -> Result<Records, LoadError> {
        Records::from_stream(self.stream(reader)?)
    }

    /// Loads every row from CSV text.
    pub fn load_str(&self, text: &str) -> Result<Records, LoadError> {
        self.load_reader(text.as_bytes())
    }

    /// Loads every row from a file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Records, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = self.load_reader(file)?;
        log::info!("loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }
}

/// One CSV row, before numeric coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    line: u64,
    key: u64,
    cells: Vec<String>,
}

impl RawRecord {
    /// 1-based line number in the source.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Row key.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Raw cell text. Cells absent from a short row read as empty.
    pub fn text(&self, col: ColId) -> Option<&str> {
        let i = usize::try_from(col.0).ok()?;
        self.cells.get(i).map(String::as_str)
    }

    /// Cell coerced with [`coerce_number`].
    pub fn number(&self, col: ColId) -> Option<f64> {
        self.text(col).map(coerce_number)
    }

    pub(crate) fn into_cells(self) -> Vec<String> {
        self.cells
    }
}

/// Lazy iterator over the rows of a CSV source, from [`RecordLoader::stream`].
pub struct RecordStream<R> {
    table: TableId,
    rows: csv::StringRecordsIntoIter<R>,
    fields: Vec<Field>,
    header_cols: Vec<Option<usize>>,
    key: Option<(String, usize)>,
    seen: HashSet<u64>,
    next_row: u64,
}

impl<R> fmt::Debug for RecordStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("table", &self.table)
            .field("fields", &self.fields)
            .field("header_cols", &self.header_cols)
            .field("key", &self.key)
            .field("seen", &self.seen)
            .field("next_row", &self.next_row)
            .finish_non_exhaustive()
    }
}

impl<R: io::Read> RecordStream<R> {
    /// The table the records are destined for.
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Fields in column-id order: the declared ones, then undeclared text columns.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn decode(&mut self, row: &csv::StringRecord, index: u64) -> Result<RawRecord, LoadError> {
        let line = row.position().map_or(index + 2, csv::Position::line);
        let mut cells = vec![String::new(); self.fields.len()];
        for (cell, col) in row.iter().zip(&self.header_cols) {
            if let Some(col) = *col {
                cells[col] = cell.to_owned();
            }
        }
        let key = match &self.key {
            None => index,
            Some((field, header)) => {
                let text = row.get(*header).unwrap_or_default().trim();
                if text.is_empty() {
                    return Err(LoadError::EmptyKey {
                        field: field.clone(),
                        line,
                    });
                }
                let key = key_hash(text);
                if !self.seen.insert(key) {
                    return Err(LoadError::DuplicateKey {
                        field: field.clone(),
                        value: text.to_owned(),
                    });
                }
                key
            }
        };
        Ok(RawRecord { line, key, cells })
    }
}

impl<R: io::Read> Iterator for RecordStream<R> {
    type Item = Result<RawRecord, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(err) => return Some(Err(err.into())),
        };
        let index = self.next_row;
        self.next_row += 1;
        Some(self.decode(&row, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_maps_junk_to_nan() {
        assert_eq!(coerce_number(" 1.25 "), 1.25);
        assert_eq!(coerce_number("-0.3"), -0.3);
        for junk in ["", "  ", "N/A", "--", "inf", "NaN", "1.2.3"] {
            assert!(coerce_number(junk).is_nan(), "{junk:?} should be missing");
        }
    }

    #[test]
    fn stream_is_lazy_and_reports_lines() {
        let loader = RecordLoader::new(TableId(1), Schema::new().number("vmag"));
        let csv = "name,vmag\nVega,0.03\nDeneb,1.25\n";
        let mut stream = loader.stream(csv.as_bytes()).unwrap();
        assert_eq!(stream.fields().len(), 2);
        let first = stream.next().unwrap().unwrap();
        assert_eq!(first.line(), 2);
        assert_eq!(first.key(), 0);
        assert_eq!(first.number(ColId(0)), Some(0.03));
        assert_eq!(first.text(ColId(1)), Some("Vega"));
        let second = stream.next().unwrap().unwrap();
        assert_eq!(second.key(), 1);
        assert!(stream.next().is_none());
    }

    #[test]
    fn key_field_hashes_are_stable_and_unique() {
        let loader = RecordLoader::new(TableId(1), Schema::new()).with_key_field("name");
        let a: Vec<u64> = loader
            .stream("name\nVega\nDeneb\n".as_bytes())
            .unwrap()
            .map(|r| r.unwrap().key())
            .collect();
        let b: Vec<u64> = loader
            .stream("name\nDeneb\nVega\n".as_bytes())
            .unwrap()
            .map(|r| r.unwrap().key())
            .collect();
        assert_eq!(a, vec![b[1], b[0]]);
        assert!(a.iter().all(|k| *k <= ROW_KEY_MASK));

        let dup: Vec<_> = loader.stream("name\nVega\nVega\n".as_bytes()).unwrap().collect();
        assert!(matches!(dup[1], Err(LoadError::DuplicateKey { ref value, .. }) if value == "Vega"));
    }

    #[test]
    fn missing_declared_field_is_an_error() {
        let loader = RecordLoader::new(TableId(1), Schema::new().number("parallax"));
        let err = loader.stream("name,vmag\nVega,0.03\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingField(ref f) if f == "parallax"));
        let err = loader.stream("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyHeader));
    }
}
