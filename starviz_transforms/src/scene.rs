// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running transforms against a `starviz_core::Scene`.
//!
//! Chart code shouldn't have to extract `TableFrame`s, run `Program::execute`, and re-insert the
//! output tables by hand.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use starviz_core::{ColId, Scene, Table, TableId};

use crate::Program;
use crate::program::{ExecutionError, ProgramOutput};
use crate::table::{TableFrame, TableFrameError};
use crate::transform::Transform;

/// Errors returned when executing a [`Program`] against a [`Scene`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneExecutionError {
    /// The referenced input table does not exist in the scene.
    MissingInput(TableId),
    /// The referenced input table exists, but has no data accessor.
    MissingData(TableId),
    /// Failed to extract a numeric frame from an input table.
    FrameError {
        /// The table id that failed frame extraction.
        table: TableId,
        /// The underlying extraction error.
        err: TableFrameError,
    },
    /// Failed while executing the program.
    Execution(ExecutionError),
}

impl fmt::Display for SceneExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(id) => write!(f, "scene has no table {}", id.0),
            Self::MissingData(id) => write!(f, "table {} has no data", id.0),
            Self::FrameError { table, err } => {
                write!(f, "cannot read table {}: {err:?}", table.0)
            }
            Self::Execution(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for SceneExecutionError {}

impl Program {
    /// Executes this program using tables from the given scene.
    ///
    /// Only the numeric columns the program reads are extracted from each source table.
    pub fn execute_on_scene(&self, scene: &Scene) -> Result<ProgramOutput, SceneExecutionError> {
        let required = required_input_columns(self.transforms());
        let mut inputs: HashMap<TableId, TableFrame> = HashMap::new();

        for (table_id, cols) in required {
            let Some(table) = scene.tables.get(&table_id) else {
                return Err(SceneExecutionError::MissingInput(table_id));
            };
            if table.data.is_none() {
                return Err(SceneExecutionError::MissingData(table_id));
            }
            let mut columns: Vec<ColId> = cols.into_iter().collect();
            columns.sort_by_key(|c| c.0);
            let frame = TableFrame::from_table(table, columns).map_err(|err| {
                SceneExecutionError::FrameError {
                    table: table_id,
                    err,
                }
            })?;
            inputs.insert(table_id, frame);
        }

        self.execute(&inputs)
            .map_err(SceneExecutionError::Execution)
    }

    /// Executes this program against the scene, inserting or updating output tables.
    ///
    /// Existing output tables keep their id; their `row_keys` and `data` are replaced and their
    /// version is bumped once.
    pub fn apply_to_scene(&self, scene: &mut Scene) -> Result<ProgramOutput, SceneExecutionError> {
        let out = self.execute_on_scene(scene)?;
        for (id, frame) in &out.tables {
            upsert_frame_as_table(scene, *id, frame.clone());
        }
        Ok(out)
    }
}

fn required_input_columns(transforms: &[Transform]) -> HashMap<TableId, HashSet<ColId>> {
    let mut out: HashMap<TableId, HashSet<ColId>> = HashMap::new();
    let mut produced: HashSet<TableId> = HashSet::new();

    for t in transforms {
        let input = t.input();
        if !produced.contains(&input) {
            out.entry(input).or_default().extend(t.input_columns());
        }
        produced.insert(t.output());
    }

    out
}

fn upsert_frame_as_table(scene: &mut Scene, id: TableId, frame: TableFrame) {
    match scene.tables.entry(id) {
        Entry::Occupied(mut e) => {
            let Table { data, row_keys, .. } = frame.into_table(id);
            let existing = e.get_mut();
            existing.row_keys = row_keys;
            existing.data = data;
            existing.bump();
        }
        Entry::Vacant(e) => {
            e.insert(frame.into_table(id));
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use starviz_core::{ColId, Scene, Table, TableData, TableId};

    use super::*;
    use crate::transform::{BinColumns, Transform};

    #[derive(Debug)]
    struct Magnitudes {
        vmag: Vec<f64>,
    }

    impl TableData for Magnitudes {
        fn row_count(&self) -> usize {
            self.vmag.len()
        }

        fn f64(&self, row: usize, col: ColId) -> Option<f64> {
            match col {
                ColId(0) => self.vmag.get(row).copied(),
                _ => None,
            }
        }
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.insert_table(Table::with_data(
            TableId(1),
            vec![10, 11, 12],
            Box::new(Magnitudes {
                vmag: vec![0.5, 2.5, 4.5],
            }),
        ));
        scene
    }

    #[test]
    fn apply_to_scene_inserts_output_table_and_bumps_on_update() {
        let mut scene = scene();
        let p = Program::new().with(Transform::Bin {
            input: TableId(1),
            output: TableId(2),
            input_col: ColId(0),
            extent: Some((0.0, 6.0)),
            thresholds: 3,
            columns: BinColumns::default(),
        });

        p.apply_to_scene(&mut scene).unwrap();
        let v1 = scene.tables[&TableId(2)].version;
        assert_eq!(scene.tables[&TableId(2)].row_keys, vec![0, 1, 2]);

        p.apply_to_scene(&mut scene).unwrap();
        let v2 = scene.tables[&TableId(2)].version;
        assert_ne!(v1, v2);
    }

    #[test]
    fn missing_scene_tables_are_reported() {
        let p = Program::new().with(Transform::Project {
            input: TableId(7),
            output: TableId(8),
            columns: vec![ColId(0)],
        });
        assert_eq!(
            p.execute_on_scene(&scene()).unwrap_err(),
            SceneExecutionError::MissingInput(TableId(7))
        );

        let mut s = scene();
        s.insert_table(Table::new(TableId(7)));
        assert_eq!(
            p.execute_on_scene(&s).unwrap_err(),
            SceneExecutionError::MissingData(TableId(7))
        );
    }
}
