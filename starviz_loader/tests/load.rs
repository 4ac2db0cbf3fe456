// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end loading: CSV text and files through cleaning into tables.

use std::path::PathBuf;

use starviz_core::TableId;
use starviz_loader::catalog::{self, fields};
use starviz_loader::{BrightnessClass, LoadError, RecordLoader, Schema};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../starviz_demo/data/bright_star_sample.csv")
}

#[test]
fn unparseable_numbers_are_dropped_by_cleaning() {
    let csv = "bv_color,vmag\n0.5,1.0\nN/A,2.0\n1.2,-0.3\n";
    let mut records = RecordLoader::new(TableId(1), Schema::new().number("bv_color").number("vmag"))
        .load_str(csv)
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records.keep_complete(), 1);
    assert_eq!(records.len(), 2);

    let table = records.into_table();
    let bv: Vec<f64> = table
        .records()
        .filter_map(|r| r.f64(starviz_core::ColId(0)))
        .collect();
    assert_eq!(bv, vec![0.5, 1.2]);
    assert_eq!(table.row_keys, vec![0, 2]);
}

#[test]
fn pipe_separated_exports_with_blank_columns() {
    let raw = "name|ra|dec|vmag|\nSirius|06 45 08.9|-16 42 58|-1.46|\nCanopus|06 23 57.1|-52 41 44|-0.74|\n";
    let records = RecordLoader::new(TableId(2), Schema::new().number("vmag"))
        .with_delimiter(b'|')
        .load_str(raw)
        .unwrap();
    assert_eq!(records.fields().len(), 4, "the unnamed trailing column is skipped");
    let ra = records.col("ra").unwrap();
    let dec = records.col("dec").unwrap();
    let sirius = records.record(0).unwrap();
    let ra = catalog::parse_ra_hms(sirius.text(ra).unwrap()).unwrap();
    let dec = catalog::parse_dec_dms(sirius.text(dec).unwrap()).unwrap();
    assert!((ra - 101.287).abs() < 1e-3);
    assert!((dec + 16.716).abs() < 1e-3);
}

#[test]
fn bundled_sample_loads_cleanly() {
    let mut records = RecordLoader::new(TableId(1), catalog::bright_star_schema())
        .with_key_field(fields::NAME)
        .load_path(sample_path())
        .unwrap();
    assert!(records.len() >= 30);
    records
        .keep_finite(&[fields::BV_COLOR, fields::VMAG])
        .unwrap();
    let vmag = records.col(fields::VMAG).unwrap();
    let spectral = records.col(fields::SPECTRAL_TYPE).unwrap();
    for rec in records.iter() {
        let v = rec.f64(vmag).unwrap();
        assert!(BrightnessClass::from_vmag(v).is_some(), "{v}");
        let st = rec.text(spectral).unwrap_or_default();
        assert!(catalog::spectral_class(st).is_some(), "{st:?}");
    }
}

#[test]
fn reloading_by_name_keeps_keys() {
    let schema = Schema::new().number("vmag");
    let loader = RecordLoader::new(TableId(1), schema).with_key_field("name");
    let a = loader.load_str("name,vmag\nVega,0.03\nRigel,0.13\n").unwrap();
    let b = loader.load_str("name,vmag\nRigel,0.13\nAltair,0.76\nVega,0.03\n").unwrap();
    assert_eq!(a.keys()[0], b.keys()[2]);
    assert_eq!(a.keys()[1], b.keys()[0]);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = RecordLoader::new(TableId(1), Schema::new())
        .load_path("definitely/not/here.csv")
        .unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().starts_with("cannot read definitely/not/here.csv"));
}

#[test]
fn empty_key_is_reported_with_its_line() {
    let err = RecordLoader::new(TableId(1), Schema::new())
        .with_key_field("name")
        .load_str("name,vmag\nVega,0.03\n,1.0\n")
        .unwrap_err();
    assert!(matches!(err, LoadError::EmptyKey { line: 3, .. }), "{err:?}");
}
