// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions used when cleaning raw catalog exports.
//!
//! Positions arrive as sexagesimal text (`"06 45 08.9"`, `"-16 42 58"`) and distances as
//! parallaxes in milliarcseconds.

use core::fmt;

use crate::schema::Schema;

/// Light years per parsec.
pub const LY_PER_PC: f64 = 3.26156;

/// Field names of a cleaned bright-star CSV.
pub mod fields {
    /// Star name.
    pub const NAME: &str = "name";
    /// Spectral type, e.g. `A1V`.
    pub const SPECTRAL_TYPE: &str = "spectral_type";
    /// B−V color index.
    pub const BV_COLOR: &str = "bv_color";
    /// Apparent visual magnitude.
    pub const VMAG: &str = "vmag";
    /// Right ascension in degrees.
    pub const RA_DEG: &str = "ra_deg";
    /// Declination in degrees.
    pub const DEC_DEG: &str = "dec_deg";
    /// Distance in light years.
    pub const DISTANCE_LY: &str = "distance_ly";
}

/// Schema of a cleaned bright-star CSV.
///
/// Column ids follow declaration order: `name` is `ColId(0)`, `spectral_type` `ColId(1)`, and so
/// on through `distance_ly` at `ColId(6)`.
pub fn bright_star_schema() -> Schema {
    Schema::new()
        .text(fields::NAME)
        .text(fields::SPECTRAL_TYPE)
        .number(fields::BV_COLOR)
        .number(fields::VMAG)
        .number(fields::RA_DEG)
        .number(fields::DEC_DEG)
        .number(fields::DISTANCE_LY)
}

fn sexagesimal(text: &str) -> Option<(f64, f64, f64)> {
    let mut parts = text
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|p| !p.is_empty())
        .map(str::parse::<f64>);
    let a = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    let c = parts.next()?.ok()?;
    if parts.next().is_some() || ![a, b, c].iter().all(|v| v.is_finite()) {
        return None;
    }
    Some((a, b, c))
}

/// Right ascension `"hh mm ss.s"` to degrees.
pub fn parse_ra_hms(text: &str) -> Option<f64> {
    let (h, m, s) = sexagesimal(text)?;
    Some((h + m / 60.0 + s / 3600.0) * 15.0)
}

/// Declination `"±dd mm ss"` to degrees.
///
/// The sign comes from the text, so `"-00 30 00"` is `-0.5`.
pub fn parse_dec_dms(text: &str) -> Option<f64> {
    let (d, m, s) = sexagesimal(text)?;
    let sign = if text.trim_start().starts_with('-') {
        -1.0
    } else {
        1.0
    };
    Some(sign * (d.abs() + m / 60.0 + s / 3600.0))
}

/// Distance in parsecs for a parallax in milliarcseconds. `None` unless the parallax is positive.
pub fn distance_pc_from_parallax(parallax_mas: f64) -> Option<f64> {
    (parallax_mas.is_finite() && parallax_mas > 0.0).then(|| 1000.0 / parallax_mas)
}

/// Distance in light years for a parallax in milliarcseconds.
pub fn distance_ly_from_parallax(parallax_mas: f64) -> Option<f64> {
    distance_pc_from_parallax(parallax_mas).map(|pc| pc * LY_PER_PC)
}

/// Equatorial position to heliocentric cartesian `[x, y, z]` in the units of `distance`.
pub fn cartesian_pc(ra_deg: f64, dec_deg: f64, distance: f64) -> [f64; 3] {
    let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
    [
        distance * dec.cos() * ra.cos(),
        distance * dec.cos() * ra.sin(),
        distance * dec.sin(),
    ]
}

/// Coarse apparent-brightness bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BrightnessClass {
    /// `(-10, 2]`
    VeryBright,
    /// `(2, 4]`
    Bright,
    /// `(4, 6]`
    Moderate,
    /// `(6, 8]`
    Faint,
    /// `(8, 20]`
    VeryFaint,
}

impl BrightnessClass {
    /// All classes, brightest first.
    pub const ALL: [Self; 5] = [
        Self::VeryBright,
        Self::Bright,
        Self::Moderate,
        Self::Faint,
        Self::VeryFaint,
    ];

    /// Buckets a visual magnitude. Bins are closed on the right; `None` outside `(-10, 20]`.
    pub fn from_vmag(vmag: f64) -> Option<Self> {
        const UPPER: [f64; 5] = [2.0, 4.0, 6.0, 8.0, 20.0];
        if !(vmag > -10.0 && vmag <= 20.0) {
            return None;
        }
        UPPER
            .iter()
            .position(|&hi| vmag <= hi)
            .map(|i| Self::ALL[i])
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryBright => "Very bright",
            Self::Bright => "Bright",
            Self::Moderate => "Moderate",
            Self::Faint => "Faint",
            Self::VeryFaint => "Very faint",
        }
    }
}

impl fmt::Display for BrightnessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main spectral class letter of a spectral type (`"K0III"` → `'K'`).
pub fn spectral_class(spectral_type: &str) -> Option<char> {
    spectral_type
        .trim()
        .chars()
        .next()
        .filter(|c| "OBAFGKM".contains(*c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn sexagesimal_positions() {
        let ra = parse_ra_hms("06 45 08.9").unwrap();
        assert!(close(ra, 101.287_083), "{ra}");
        let dec = parse_dec_dms("-16 42 58").unwrap();
        assert!(close(dec, -16.716_111), "{dec}");
        assert!(close(parse_dec_dms("-00 30 00").unwrap(), -0.5));
        assert!(close(parse_dec_dms("+89 15 51").unwrap(), 89.264_167), "north");
        assert_eq!(parse_ra_hms("06 45"), None);
        assert_eq!(parse_ra_hms("aa bb cc"), None);
    }

    #[test]
    fn parallax_distances() {
        assert!(close(distance_pc_from_parallax(379.21).unwrap(), 2.637_061));
        assert!(close(distance_ly_from_parallax(1000.0).unwrap(), LY_PER_PC));
        assert_eq!(distance_ly_from_parallax(0.0), None);
        assert_eq!(distance_ly_from_parallax(-3.0), None);
        assert_eq!(distance_ly_from_parallax(f64::NAN), None);
    }

    #[test]
    fn cartesian_axes() {
        let [x, y, z] = cartesian_pc(0.0, 0.0, 10.0);
        assert!(close(x, 10.0) && close(y, 0.0) && close(z, 0.0));
        let [x, y, z] = cartesian_pc(90.0, 0.0, 2.0);
        assert!(close(x, 0.0) && close(y, 2.0) && close(z, 0.0));
        let [_, _, z] = cartesian_pc(123.0, 90.0, 5.0);
        assert!(close(z, 5.0));
    }

    #[test]
    fn brightness_bins_are_right_inclusive() {
        assert_eq!(BrightnessClass::from_vmag(2.0), Some(BrightnessClass::VeryBright));
        assert_eq!(BrightnessClass::from_vmag(2.01), Some(BrightnessClass::Bright));
        assert_eq!(BrightnessClass::from_vmag(-1.46), Some(BrightnessClass::VeryBright));
        assert_eq!(BrightnessClass::from_vmag(20.0), Some(BrightnessClass::VeryFaint));
        assert_eq!(BrightnessClass::from_vmag(-10.0), None);
        assert_eq!(BrightnessClass::from_vmag(f64::NAN), None);
        assert_eq!(BrightnessClass::Moderate.to_string(), "Moderate");
    }

    #[test]
    fn spectral_letters() {
        assert_eq!(spectral_class(" K0III"), Some('K'));
        assert_eq!(spectral_class("A1V"), Some('A'));
        assert_eq!(spectral_class("DA2"), None);
        assert_eq!(spectral_class(""), None);
    }
}
