// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading star catalogs into starviz tables.
//!
//! A [`RecordLoader`] reads CSV text against a [`Schema`]: declared numeric fields are coerced to
//! `f64` (anything unparseable becomes `NaN`), everything else stays text. The result is a set of
//! [`Records`] that can be cleaned with [`Records::keep_if`] and friends and then turned into a
//! [`starviz_core::Table`].
//!
//! ```
//! use starviz_core::TableId;
//! use starviz_loader::{RecordLoader, Schema};
//!
//! let csv = "name,vmag\nSirius,-1.46\nMystery,N/A\n";
//! let mut records = RecordLoader::new(TableId(1), Schema::new().number("vmag"))
//!     .load_str(csv)
//!     .unwrap();
//! assert_eq!(records.keep_complete(), 1);
//! assert_eq!(records.len(), 1);
//! ```
//!
//! The [`catalog`] module has the unit conversions used when cleaning raw catalog exports.

pub mod catalog;
mod error;
mod loader;
mod records;
mod schema;

pub use catalog::BrightnessClass;
pub use error::LoadError;
pub use loader::{RawRecord, RecordLoader, RecordStream, coerce_number};
pub use records::Records;
pub use schema::{Field, FieldKind, Schema};
