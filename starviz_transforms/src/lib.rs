// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table transforms for star-catalog charts.
//!
//! This crate provides:
//! - a small transform IR that models `TableId -> TableId` operators (filter, project, sort,
//!   aggregate, histogram bins, 2-D density, linear regression),
//! - a full-recompute executor over owned numeric frames, and
//! - the nice tick arithmetic that scales and bins share ([`ticks`], [`nice`]).
//!
//! Row-preserving transforms keep upstream `row_keys` as stable identity for per-row marks.
//! Aggregating transforms key their output rows by bucket index.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bin;
mod density;
#[cfg(not(feature = "std"))]
mod float;
mod program;
mod regression;
mod scene;
mod table;
mod ticks;
mod transform;

pub use bin::{bin_edges, finite_extent};
pub use density::{DensityGrid, DensityParams, density_grid};
pub use program::{ExecutionError, Program, ProgramOutput};
pub use regression::{LinearFit, linear_fit};
pub use scene::SceneExecutionError;
pub use table::{TableFrame, TableFrameError};
pub use ticks::{Ticks, nice, tick_increment, tick_step, ticks};
pub use transform::{
    AggregateField, AggregateOp, BinColumns, CompareOp, DensityColumns, Predicate,
    RegressionColumns, SortOrder, Transform,
};
