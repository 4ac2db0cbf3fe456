// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoding channels: how a record turns into a position, a size or a color.
//!
//! Numeric channels produce scene units. A channel that cannot produce a finite value for a
//! record (missing field, non-finite compute result) yields `None`, and binders skip the record.

extern crate alloc;

use alloc::sync::Arc;
use core::fmt;

use peniko::Color;
use starviz_core::{ColId, RecordRef};

use crate::color::{ScaleOrdinal, ScaleSequential};
use crate::scale::ScaleContinuous;

/// A numeric encoding channel.
#[derive(Clone)]
pub enum Channel {
    /// The same value for every record.
    Const(f64),
    /// A field read through a scale.
    Field {
        /// Source column.
        col: ColId,
        /// Scale applied to the field value.
        scale: ScaleContinuous,
    },
    /// An arbitrary accessor returning scene units.
    Compute(Arc<dyn Fn(RecordRef<'_>) -> Option<f64>>),
}

impl Channel {
    /// A field channel.
    pub fn field(col: ColId, scale: impl Into<ScaleContinuous>) -> Self {
        Self::Field {
            col,
            scale: scale.into(),
        }
    }

    /// A computed channel.
    pub fn compute(f: impl Fn(RecordRef<'_>) -> Option<f64> + 'static) -> Self {
        Self::Compute(Arc::new(f))
    }

    /// Evaluates the channel for a record.
    pub fn eval(&self, rec: RecordRef<'_>) -> Option<f64> {
        let v = match self {
            Self::Const(v) => Some(*v),
            Self::Field { col, scale } => rec.finite(*col).map(|v| scale.map(v)),
            Self::Compute(f) => f(rec),
        };
        v.filter(|v| v.is_finite())
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Self::Field { col, scale } => f
                .debug_struct("Field")
                .field("col", col)
                .field("scale", scale)
                .finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl From<f64> for Channel {
    fn from(value: f64) -> Self {
        Self::Const(value)
    }
}

/// A color encoding channel.
#[derive(Clone)]
pub enum ColorChannel {
    /// The same color for every record.
    Const(Color),
    /// A numeric field through a sequential scale.
    Sequential {
        /// Source column.
        col: ColId,
        /// Color scale.
        scale: ScaleSequential,
    },
    /// A text field through an ordinal scale.
    Ordinal {
        /// Source column.
        col: ColId,
        /// Color scale.
        scale: ScaleOrdinal,
    },
    /// An arbitrary accessor.
    Compute(Arc<dyn Fn(RecordRef<'_>) -> Color>),
}

impl ColorChannel {
    /// A computed color channel.
    pub fn compute(f: impl Fn(RecordRef<'_>) -> Color + 'static) -> Self {
        Self::Compute(Arc::new(f))
    }

    /// Evaluates the channel. Missing fields map to the scale's `unknown` color.
    pub fn eval(&self, rec: RecordRef<'_>) -> Color {
        match self {
            Self::Const(c) => *c,
            Self::Sequential { col, scale } => scale.map(rec.f64(*col).unwrap_or(f64::NAN)),
            Self::Ordinal { col, scale } => match rec.text(*col) {
                Some(s) => scale.map(s),
                None => scale.unknown,
            },
            Self::Compute(f) => f(rec),
        }
    }
}

impl fmt::Debug for ColorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(c) => f.debug_tuple("Const").field(c).finish(),
            Self::Sequential { col, scale } => f
                .debug_struct("Sequential")
                .field("col", col)
                .field("scale", scale)
                .finish(),
            Self::Ordinal { col, scale } => f
                .debug_struct("Ordinal")
                .field("col", col)
                .field("scale", scale)
                .finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl From<Color> for ColorChannel {
    fn from(value: Color) -> Self {
        Self::Const(value)
    }
}
