// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The star table every demo chart reads, plus its palettes.

use std::path::Path;

use peniko::Color;
use starviz_charts::{ColorRamp, ColorRampError, ScaleSequential};
use starviz_core::{ColId, RecordRef, Table, TableData, TableId};
use starviz_loader::catalog::{self, fields};
use starviz_loader::{LoadError, RecordLoader, Records};

pub(crate) const STARS: TableId = TableId(1);

// Column ids follow `catalog::bright_star_schema`.
pub(crate) const NAME: ColId = ColId(0);
pub(crate) const SPECTRAL_TYPE: ColId = ColId(1);
pub(crate) const BV: ColId = ColId(2);
pub(crate) const VMAG: ColId = ColId(3);
pub(crate) const RA: ColId = ColId(4);
pub(crate) const DEC: ColId = ColId(5);
pub(crate) const DISTANCE_LY: ColId = ColId(6);
/// Position of the main spectral class in [`SPECTRAL_CLASSES`], derived at load.
pub(crate) const CLASS_INDEX: ColId = ColId(100);

pub(crate) const SPECTRAL_CLASSES: [char; 7] = ['O', 'B', 'A', 'F', 'G', 'K', 'M'];

pub(crate) const UNKNOWN: Color = Color::from_rgb8(0xcc, 0xcc, 0xcc);

/// Cleaned catalog records plus the derived class index column.
#[derive(Debug)]
pub(crate) struct StarTable {
    records: Records,
    class_index: Vec<f64>,
}

impl StarTable {
    pub(crate) fn new(records: Records) -> Self {
        let class_index = records
            .iter()
            .map(|r| class_of(r).map_or(f64::NAN, class_position))
            .collect();
        Self {
            records,
            class_index,
        }
    }

    pub(crate) fn into_table(self) -> Table {
        let keys = self.records.keys().to_vec();
        Table::with_data(self.records.table_id(), keys, Box::new(self))
    }
}

impl TableData for StarTable {
    fn row_count(&self) -> usize {
        self.records.len()
    }

    fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        if col == CLASS_INDEX {
            self.class_index.get(row).copied()
        } else {
            self.records.f64(row, col)
        }
    }

    fn text(&self, row: usize, col: ColId) -> Option<&str> {
        self.records.text(row, col)
    }
}

fn class_position(class: char) -> f64 {
    SPECTRAL_CLASSES
        .iter()
        .position(|c| *c == class)
        .map_or(f64::NAN, |i| i as f64)
}

/// Inverse of the derived class index column.
pub(crate) fn class_at(index: f64) -> Option<char> {
    if index.is_nan() || index < 0.0 {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "class indices are small non-negative integers"
    )]
    let i = index as usize;
    SPECTRAL_CLASSES.get(i).copied()
}

/// Main spectral class of a star record.
pub(crate) fn class_of(rec: RecordRef<'_>) -> Option<char> {
    rec.text(SPECTRAL_TYPE).and_then(catalog::spectral_class)
}

/// Loads and cleans a bright-star CSV, keyed by star name.
pub(crate) fn load(path: &Path) -> Result<Table, LoadError> {
    let mut records = RecordLoader::new(STARS, catalog::bright_star_schema())
        .with_key_field(fields::NAME)
        .load_path(path)?;
    let dropped = records.keep_finite(&[fields::BV_COLOR, fields::VMAG])?;
    if dropped > 0 {
        log::info!("dropped {dropped} stars without a color index or magnitude");
    }
    Ok(StarTable::new(records).into_table())
}

/// Tooltip text for a star.
pub(crate) fn describe(rec: RecordRef<'_>) -> String {
    let name = rec.text(NAME).unwrap_or("?");
    let mut out = format!(
        "{name}\nType: {}",
        rec.text(SPECTRAL_TYPE).unwrap_or("unknown")
    );
    if let Some(bv) = rec.finite(BV) {
        out.push_str(&format!("\nB-V: {bv:.2}"));
    }
    if let Some(vmag) = rec.finite(VMAG) {
        out.push_str(&format!("\nMagnitude: {vmag:.2}"));
    }
    if let Some(ly) = rec.finite(DISTANCE_LY) {
        out.push_str(&format!("\nDistance: {ly:.0} ly"));
    }
    out
}

pub(crate) fn spectral_color(class: char) -> Color {
    match class {
        'O' => Color::from_rgb8(0x9b, 0xb3, 0xff),
        'B' => Color::from_rgb8(0xaa, 0xbf, 0xff),
        'A' => Color::from_rgb8(0xca, 0xd7, 0xff),
        'F' => Color::from_rgb8(0xf8, 0xf7, 0xff),
        'G' => Color::from_rgb8(0xff, 0xf4, 0xea),
        'K' => Color::from_rgb8(0xff, 0xd2, 0xa1),
        'M' => Color::from_rgb8(0xff, 0xcc, 0x6f),
        _ => UNKNOWN,
    }
}

pub(crate) fn record_color(rec: RecordRef<'_>) -> Color {
    class_of(rec).map_or(UNKNOWN, spectral_color)
}

/// B−V color index to star color, blue-white through orange.
pub(crate) fn bv_scale() -> Result<ScaleSequential, ColorRampError> {
    let ramp = ColorRamp::new([
        (0.0, Color::from_rgb8(0x9b, 0xb3, 0xff)),
        (0.33, Color::from_rgb8(0xff, 0xff, 0xff)),
        (0.67, Color::from_rgb8(0xff, 0xd2, 0xa1)),
        (1.0, Color::from_rgb8(0xff, 0xcc, 0x6f)),
    ])?;
    Ok(ScaleSequential::new((-0.5, 2.0), ramp).with_unknown(UNKNOWN))
}

/// Yellow-orange-red ramp for density bands.
pub(crate) fn density_ramp() -> Result<ColorRamp, ColorRampError> {
    ColorRamp::evenly_spaced(&[
        Color::from_rgb8(0xff, 0xff, 0xcc),
        Color::from_rgb8(0xff, 0xed, 0xa0),
        Color::from_rgb8(0xfe, 0xd9, 0x76),
        Color::from_rgb8(0xfe, 0xb2, 0x4c),
        Color::from_rgb8(0xfd, 0x8d, 0x3c),
        Color::from_rgb8(0xfc, 0x4e, 0x2a),
        Color::from_rgb8(0xe3, 0x1a, 0x1c),
        Color::from_rgb8(0xbd, 0x00, 0x26),
        Color::from_rgb8(0x80, 0x00, 0x26),
    ])
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn sample() -> Table {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/bright_star_sample.csv");
        load(&path).unwrap()
    }

    #[test]
    fn sample_has_every_spectral_class() {
        let t = sample();
        for (i, class) in SPECTRAL_CLASSES.iter().enumerate() {
            assert!(
                t.records().any(|r| r.f64(CLASS_INDEX) == Some(i as f64)),
                "no {class}-type star in the sample"
            );
        }
    }

    #[test]
    fn tooltip_lists_known_fields() {
        let t = sample();
        let sirius = t
            .records()
            .find(|r| r.text(NAME) == Some("Sirius"))
            .unwrap();
        let text = describe(sirius);
        assert!(text.starts_with("Sirius\nType: A1V\nB-V: 0.00\nMagnitude: -1.46"), "{text}");
        assert_eq!(record_color(sirius), spectral_color('A'));
    }
}
