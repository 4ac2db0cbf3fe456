// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading records.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A declared field (or the key field) is not in the header.
    #[error("missing field `{0}`")]
    MissingField(String),

    /// The header row is absent or has no named columns.
    #[error("empty header")]
    EmptyHeader,

    /// Two rows share a value of the key field.
    #[error("duplicate key `{value}` in field `{field}`")]
    DuplicateKey {
        /// Key field name.
        field: String,
        /// The repeated value.
        value: String,
    },

    /// A row has an empty key field.
    #[error("empty key field `{field}` on line {line}")]
    EmptyKey {
        /// Key field name.
        field: String,
        /// 1-based line number.
        line: u64,
    },

    /// A field named by the caller is not a numeric field of these records.
    #[error("unknown numeric field `{0}`")]
    UnknownField(String),
}
