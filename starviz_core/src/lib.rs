// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal record/mark runtime for starviz charts.
//!
//! This crate owns the pieces every chart needs regardless of how it looks:
//! - **Tables** of records with stable row keys ([`Table`], [`TableData`], [`RecordRef`]).
//! - **Marks**: renderer-agnostic visual elements with stable identity ([`Mark`], [`MarkId`]).
//! - **Reconciliation**: a [`Scene`] that diffs successive mark sets by identity and reports
//!   [`MarkDiff::Enter`], [`MarkDiff::Update`] and [`MarkDiff::Exit`].
//!
//! Renderers consume diffs; they never see the tables directly.

#![no_std]

extern crate alloc;

mod mark;
mod scene;
mod table;

pub use mark::{
    Mark, MarkBuilder, MarkId, MarkKind, MarkPayload, MarkShape, MarkStyle, TextAnchor,
    TextBaseline, TextShape,
};
pub use scene::{MarkDiff, Scene};
pub use table::{ColId, RecordIter, RecordRef, Table, TableData, TableId};
