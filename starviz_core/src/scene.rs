// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene state and enter/update/exit reconciliation.
//!
//! Each call to [`Scene::tick`] receives the complete set of marks for the next frame. Marks are
//! matched to the previous frame **by id**, never by position, so reordering the input never
//! destroys or recreates a surviving mark.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::mark::{Mark, MarkId, MarkKind, MarkPayload};
use crate::table::{Table, TableId};

/// A change to the rendered mark set.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkDiff {
    /// A mark id appeared.
    Enter {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Render order.
        z_index: i32,
        /// Bounds of the new geometry, if known.
        bounds: Option<Rect>,
        /// New payload.
        new: Box<MarkPayload>,
    },
    /// A surviving mark changed geometry, paint, or render order.
    Update {
        /// Mark id.
        id: MarkId,
        /// Mark kind after the update.
        kind: MarkKind,
        /// Previous render order.
        old_z_index: i32,
        /// New render order.
        new_z_index: i32,
        /// Previous bounds.
        old_bounds: Option<Rect>,
        /// New bounds.
        new_bounds: Option<Rect>,
        /// Previous payload.
        old: Box<MarkPayload>,
        /// New payload.
        new: Box<MarkPayload>,
    },
    /// A mark id disappeared.
    Exit {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Bounds of the removed geometry.
        bounds: Option<Rect>,
    },
}

impl MarkDiff {
    /// The mark id this diff refers to.
    pub fn id(&self) -> MarkId {
        match self {
            Self::Enter { id, .. } | Self::Update { id, .. } | Self::Exit { id, .. } => *id,
        }
    }

    /// Returns `true` for [`MarkDiff::Exit`].
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }
}

#[derive(Clone, Debug)]
struct LiveMark {
    z_index: i32,
    payload: MarkPayload,
    entered_at: u64,
}

/// Tables plus the currently rendered marks.
#[derive(Debug, Default)]
pub struct Scene {
    /// Tables by id.
    pub tables: HashMap<TableId, Table>,
    marks: HashMap<MarkId, LiveMark>,
    tick: u64,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a table.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.id, table);
    }

    /// Replaces the row keys of a table, creating it if needed.
    pub fn set_table_row_keys(&mut self, id: TableId, row_keys: Vec<u64>) {
        let table = self.tables.entry(id).or_insert_with(|| Table::new(id));
        table.row_keys = row_keys;
        table.bump();
    }

    /// Number of ticks processed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Number of live marks.
    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if a mark with this id is live.
    pub fn contains(&self, id: MarkId) -> bool {
        self.marks.contains_key(&id)
    }

    /// Returns the live payload and z-index of a mark.
    pub fn mark(&self, id: MarkId) -> Option<(i32, &MarkPayload)> {
        self.marks.get(&id).map(|m| (m.z_index, &m.payload))
    }

    /// The tick in which a live mark entered.
    ///
    /// A mark that survives updates keeps its original value, which makes identity preservation
    /// observable.
    pub fn entered_at(&self, id: MarkId) -> Option<u64> {
        self.marks.get(&id).map(|m| m.entered_at)
    }

    /// Iterates over live marks in render order `(z_index, id)`.
    pub fn sorted_marks(&self) -> Vec<(MarkId, i32, &MarkPayload)> {
        let mut out: Vec<_> = self
            .marks
            .iter()
            .map(|(id, m)| (*id, m.z_index, &m.payload))
            .collect();
        out.sort_by_key(|(id, z, _)| (*z, id.0));
        out
    }

    /// Reconciles the live marks with `marks` and returns the resulting diffs.
    ///
    /// Diffs are ordered as: enters and updates in input order, then exits by ascending id.
    /// If the same id appears more than once, the last occurrence wins.
    pub fn tick(&mut self, marks: impl IntoIterator<Item = Mark>) -> Vec<MarkDiff> {
        self.tick += 1;
        let tick = self.tick;

        let mut incoming: Vec<Mark> = Vec::new();
        let mut index: HashMap<MarkId, usize> = HashMap::new();
        for mark in marks {
            match index.entry(mark.id) {
                Entry::Occupied(e) => {
                    log::warn!("duplicate mark id {:?} in one tick; keeping the last", mark.id);
                    incoming[*e.get()] = mark;
                }
                Entry::Vacant(e) => {
                    e.insert(incoming.len());
                    incoming.push(mark);
                }
            }
        }

        let mut diffs = Vec::new();
        for mark in incoming {
            match self.marks.entry(mark.id) {
                Entry::Occupied(mut e) => {
                    let live = e.get_mut();
                    if live.z_index == mark.z_index && live.payload == mark.payload {
                        continue;
                    }
                    let old = core::mem::replace(&mut live.payload, mark.payload);
                    let old_z_index = live.z_index;
                    live.z_index = mark.z_index;
                    diffs.push(MarkDiff::Update {
                        id: mark.id,
                        kind: live.payload.kind(),
                        old_z_index,
                        new_z_index: live.z_index,
                        old_bounds: old.bounds(),
                        new_bounds: live.payload.bounds(),
                        old: Box::new(old),
                        new: Box::new(live.payload.clone()),
                    });
                }
                Entry::Vacant(e) => {
                    diffs.push(MarkDiff::Enter {
                        id: mark.id,
                        kind: mark.payload.kind(),
                        z_index: mark.z_index,
                        bounds: mark.payload.bounds(),
                        new: Box::new(mark.payload.clone()),
                    });
                    e.insert(LiveMark {
                        z_index: mark.z_index,
                        payload: mark.payload,
                        entered_at: tick,
                    });
                }
            }
        }

        let mut gone: SmallVec<[MarkId; 16]> = self
            .marks
            .keys()
            .copied()
            .filter(|id| !index.contains_key(id))
            .collect();
        gone.sort_unstable();
        for id in gone {
            if let Some(live) = self.marks.remove(&id) {
                diffs.push(MarkDiff::Exit {
                    id,
                    kind: live.payload.kind(),
                    bounds: live.payload.bounds(),
                });
            }
        }

        diffs
    }

    /// Removes every live mark, returning one exit per mark.
    pub fn clear(&mut self) -> Vec<MarkDiff> {
        self.tick(core::iter::empty())
    }

    /// Returns the topmost live mark containing `pt` among those accepted by `filter`.
    ///
    /// "Topmost" is the greatest `(z_index, id)`, matching render order.
    pub fn hit_test(&self, pt: Point, filter: impl Fn(MarkId) -> bool) -> Option<MarkId> {
        self.marks
            .iter()
            .filter(|(id, live)| filter(**id) && live.payload.contains(pt))
            .max_by_key(|(id, live)| (live.z_index, id.0))
            .map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn star(id: u64, x: f64) -> Mark {
        Mark::builder(MarkId(id)).circle((x, 0.0), 2.0).build()
    }

    #[test]
    fn reordered_rebind_preserves_identity_and_exits_once() {
        let (a, b, c) = (1, 2, 3);
        let mut scene = Scene::new();
        let diffs = scene.tick(vec![star(a, 0.0), star(b, 1.0), star(c, 2.0)]);
        assert_eq!(diffs.len(), 3);
        assert!(diffs.iter().all(|d| matches!(d, MarkDiff::Enter { .. })));

        let diffs = scene.tick(vec![star(c, 2.0), star(a, 0.0)]);
        assert_eq!(diffs.len(), 1, "only B should change: {diffs:?}");
        assert!(matches!(diffs[0], MarkDiff::Exit { id, .. } if id == MarkId(b)));
        assert_eq!(scene.entered_at(MarkId(a)), Some(1));
        assert_eq!(scene.entered_at(MarkId(c)), Some(1));

        // B is gone for good; a further tick reports nothing.
        assert!(scene.tick(vec![star(a, 0.0), star(c, 2.0)]).is_empty());
    }

    #[test]
    fn changed_payload_updates_in_place() {
        let mut scene = Scene::new();
        scene.tick(vec![star(1, 0.0)]);
        let diffs = scene.tick(vec![star(1, 5.0)]);
        match &diffs[..] {
            [MarkDiff::Update { id, old, new, .. }] => {
                assert_eq!(*id, MarkId(1));
                assert_ne!(old, new);
            }
            other => panic!("expected one update, got {other:?}"),
        }
        assert_eq!(scene.entered_at(MarkId(1)), Some(1));
    }

    #[test]
    fn duplicate_ids_keep_the_last_mark() {
        let mut scene = Scene::new();
        let diffs = scene.tick(vec![star(1, 0.0), star(1, 9.0)]);
        assert_eq!(diffs.len(), 1);
        let (_, payload) = scene.mark(MarkId(1)).unwrap();
        assert_eq!(payload.bounds().unwrap().center().x, 9.0);
    }

    #[test]
    fn hit_test_prefers_higher_z() {
        let mut scene = Scene::new();
        let low = Mark::builder(MarkId(1)).circle((0.0, 0.0), 5.0).z_index(0).build();
        let high = Mark::builder(MarkId(2)).circle((1.0, 0.0), 5.0).z_index(10).build();
        scene.tick(vec![high, low]);
        assert_eq!(scene.hit_test(Point::new(0.5, 0.0), |_| true), Some(MarkId(2)));
        assert_eq!(
            scene.hit_test(Point::new(0.5, 0.0), |id| id == MarkId(1)),
            Some(MarkId(1))
        );
        assert_eq!(scene.hit_test(Point::new(50.0, 0.0), |_| true), None);
    }

    #[test]
    fn clear_exits_everything() {
        let mut scene = Scene::new();
        scene.tick(vec![star(2, 0.0), star(1, 0.0)]);
        let diffs = scene.clear();
        let ids: Vec<_> = diffs.iter().map(MarkDiff::id).collect();
        assert_eq!(ids, vec![MarkId(1), MarkId(2)]);
        assert_eq!(scene.mark_count(), 0);
    }
}
