// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter state: registered record predicates and the subset that is active.
//!
//! A predicate answers "should this record stay visible". A record is visible when every active
//! predicate accepts it; with nothing active, everything is visible.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use starviz_core::RecordRef;

/// Identifies a registered predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateId(pub u32);

/// A record predicate.
pub type Predicate = Arc<dyn Fn(RecordRef<'_>) -> bool>;

/// Registered predicates plus the active subset, owned by one chart.
#[derive(Clone, Default)]
pub struct FilterState {
    predicates: Vec<(PredicateId, Predicate)>,
    active: SmallVec<[PredicateId; 8]>,
}

impl fmt::Debug for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: SmallVec<[PredicateId; 8]> = self.predicates.iter().map(|(id, _)| *id).collect();
        f.debug_struct("FilterState")
            .field("registered", &ids)
            .field("active", &self.active)
            .finish()
    }
}

impl FilterState {
    /// Creates an empty filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a predicate. Registration does not activate it.
    pub fn register(&mut self, id: PredicateId, predicate: impl Fn(RecordRef<'_>) -> bool + 'static) {
        let predicate: Predicate = Arc::new(predicate);
        match self.predicates.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = predicate,
            None => self.predicates.push((id, predicate)),
        }
    }

    /// Returns `true` if `id` has been registered.
    pub fn is_registered(&self, id: PredicateId) -> bool {
        self.predicates.iter().any(|(existing, _)| *existing == id)
    }

    /// Flips a predicate and returns its new state, or `None` if it is not registered.
    pub fn toggle(&mut self, id: PredicateId) -> Option<bool> {
        let now = !self.is_active(id);
        self.set_active(id, now).then_some(now)
    }

    /// Activates or deactivates a predicate. Returns `false` if it is not registered.
    pub fn set_active(&mut self, id: PredicateId, active: bool) -> bool {
        if !self.is_registered(id) {
            log::warn!("filter predicate {id:?} is not registered");
            return false;
        }
        let pos = self.active.iter().position(|a| *a == id);
        match (active, pos) {
            (true, None) => {
                self.active.push(id);
                self.active.sort_unstable();
            }
            (false, Some(i)) => {
                self.active.remove(i);
            }
            _ => {}
        }
        true
    }

    /// Returns `true` if `id` is active.
    pub fn is_active(&self, id: PredicateId) -> bool {
        self.active.contains(&id)
    }

    /// Active predicate ids in ascending order.
    pub fn active(&self) -> &[PredicateId] {
        &self.active
    }

    /// Deactivates every predicate.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Returns `true` if every active predicate accepts `rec`.
    pub fn passes(&self, rec: RecordRef<'_>) -> bool {
        self.active.iter().all(|id| {
            self.predicates
                .iter()
                .find(|(existing, _)| existing == id)
                .is_none_or(|(_, p)| p(rec))
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::String;
    use alloc::vec;

    use starviz_core::{ColId, TableData};

    use super::*;

    #[derive(Debug)]
    struct Classes(Vec<String>);

    impl TableData for Classes {
        fn row_count(&self) -> usize {
            self.0.len()
        }

        fn f64(&self, _row: usize, _col: ColId) -> Option<f64> {
            None
        }

        fn text(&self, row: usize, _col: ColId) -> Option<&str> {
            self.0.get(row).map(String::as_str)
        }
    }

    fn hide(class: &'static str) -> impl Fn(RecordRef<'_>) -> bool {
        move |r: RecordRef<'_>| r.text(ColId(0)) != Some(class)
    }

    fn visible(state: &FilterState, data: &Classes) -> Vec<bool> {
        (0..data.0.len())
            .map(|row| state.passes(RecordRef::new(data, row, row as u64)))
            .collect()
    }

    #[test]
    fn toggling_twice_restores_visibility() {
        let data = Classes(vec!["G".into(), "T".into(), "M".into()]);
        let mut state = FilterState::new();
        state.register(PredicateId(0), hide("T"));
        let before = visible(&state, &data);
        assert_eq!(before, vec![true, true, true]);

        assert_eq!(state.toggle(PredicateId(0)), Some(true));
        assert_eq!(visible(&state, &data), vec![true, false, true]);
        assert_eq!(state.toggle(PredicateId(0)), Some(false));
        assert_eq!(visible(&state, &data), before);
        assert!(state.active().is_empty());
    }

    #[test]
    fn active_predicates_combine_with_and() {
        let data = Classes(vec!["G".into(), "T".into(), "M".into()]);
        let mut state = FilterState::new();
        state.register(PredicateId(0), hide("T"));
        state.register(PredicateId(1), hide("M"));
        state.set_active(PredicateId(1), true);
        state.set_active(PredicateId(0), true);
        assert_eq!(state.active(), &[PredicateId(0), PredicateId(1)]);
        assert_eq!(visible(&state, &data), vec![true, false, false]);
    }

    #[test]
    fn unknown_predicates_are_rejected() {
        let mut state = FilterState::new();
        assert_eq!(state.toggle(PredicateId(9)), None);
        assert!(!state.is_active(PredicateId(9)));
    }
}
