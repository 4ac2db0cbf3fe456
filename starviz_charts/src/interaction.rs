// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless pointer interaction: hover enter/leave, tooltip and legend filter toggles.
//!
//! The controller never touches a renderer. Hosts feed it pointer positions and clicks; it hit
//! tests the live [`Scene`], runs handlers and records the resulting tooltip and highlight
//! state, which the chart folds into its next render via [`InteractionController::apply`].
//!
//! Every hover enter is paired with exactly one leave. A leave fires when the pointer moves to
//! another mark or to empty space, on [`InteractionController::pointer_leave`], when the hovered
//! mark disappears ([`InteractionController::reconcile`]) and on teardown. After a leave handler
//! runs, the tooltip is hidden and all highlights are dropped, so nothing stays highlighted.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use peniko::Brush;
use smallvec::SmallVec;
use starviz_core::{Mark, MarkId, MarkShape, RecordRef, Scene, TableId};

use crate::filter::{FilterState, PredicateId};

/// Offset of the tooltip anchor from the pointer.
pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, -10.0);

/// Which marks a hover binding applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoverTarget {
    /// A single mark.
    Mark(MarkId),
    /// Every mark bound to a row of this table.
    Table(TableId),
}

impl HoverTarget {
    fn matches(self, id: MarkId) -> bool {
        match self {
            Self::Mark(m) => m == id,
            Self::Table(t) => id.table_row().is_some_and(|(table, _)| table == t),
        }
    }
}

/// Floating tooltip state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    /// Whether the tooltip is shown.
    pub visible: bool,
    /// Anchor position (pointer plus [`TOOLTIP_OFFSET`]).
    pub pos: Point,
    /// Tooltip text; lines are separated by `\n`.
    pub text: String,
}

impl Tooltip {
    /// Shows the tooltip with `text`.
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.visible = true;
    }

    /// Hides the tooltip.
    pub fn hide(&mut self) {
        self.visible = false;
        self.text.clear();
    }
}

/// Visual overrides for one mark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlight {
    /// Replacement circle radius.
    pub radius: Option<f64>,
    /// Replacement opacity.
    pub opacity: Option<f64>,
    /// Replacement stroke paint and width.
    pub stroke: Option<(Brush, f64)>,
}

/// Highlight state produced by hover handlers.
#[derive(Clone, Debug, Default)]
pub struct Highlights {
    /// Per-mark overrides.
    pub overrides: HashMap<MarkId, Highlight>,
    /// If set, every other hoverable mark is drawn no more opaque than this.
    pub dim_others: Option<f64>,
}

impl Highlights {
    /// Returns `true` if nothing is highlighted.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.dim_others.is_none()
    }

    /// Drops every highlight.
    pub fn clear(&mut self) {
        self.overrides.clear();
        self.dim_others = None;
    }
}

/// Context passed to hover handlers.
pub struct HoverCtx<'a> {
    /// The hovered mark.
    pub id: MarkId,
    /// Pointer position that caused the event.
    pub pointer: Point,
    /// The record bound to the mark, if it is row-bound and still present.
    pub record: Option<RecordRef<'a>>,
    /// Tooltip state.
    pub tooltip: &'a mut Tooltip,
    /// Highlight state.
    pub highlights: &'a mut Highlights,
}

impl fmt::Debug for HoverCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverCtx")
            .field("id", &self.id)
            .field("pointer", &self.pointer)
            .field("record", &self.record.map(|r| r.key()))
            .field("tooltip", &self.tooltip)
            .finish_non_exhaustive()
    }
}

/// A hover enter or leave handler.
pub type HoverHandler = Box<dyn FnMut(&mut HoverCtx<'_>)>;

struct HoverBinding {
    target: HoverTarget,
    on_enter: HoverHandler,
    on_leave: HoverHandler,
}

#[derive(Clone, Debug)]
struct FilterToggle {
    predicate: PredicateId,
    marks: SmallVec<[MarkId; 4]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Hovered {
    id: MarkId,
    binding: usize,
}

/// Hover, tooltip and filter-toggle state for one chart.
#[derive(Default)]
pub struct InteractionController {
    bindings: Vec<HoverBinding>,
    toggles: Vec<FilterToggle>,
    filters: FilterState,
    hovered: Option<Hovered>,
    tooltip: Tooltip,
    highlights: Highlights,
}

impl fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets: Vec<HoverTarget> = self.bindings.iter().map(|b| b.target).collect();
        f.debug_struct("InteractionController")
            .field("bindings", &targets)
            .field("toggles", &self.toggles)
            .field("filters", &self.filters)
            .field("hovered", &self.hovered.map(|h| h.id))
            .field("tooltip", &self.tooltip)
            .field("highlights", &self.highlights)
            .finish()
    }
}

fn record_for(scene: &Scene, id: MarkId) -> Option<RecordRef<'_>> {
    let (table, key) = id.table_row()?;
    let table = scene.tables.get(&table)?;
    table.record(table.row_of_key(key)?)
}

impl InteractionController {
    /// Creates a controller with no bindings and an empty filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers hover behavior for `target`.
    ///
    /// When several bindings match a mark, the first registered wins.
    pub fn on_hover(
        &mut self,
        target: HoverTarget,
        on_enter: impl FnMut(&mut HoverCtx<'_>) + 'static,
        on_leave: impl FnMut(&mut HoverCtx<'_>) + 'static,
    ) {
        self.bindings.push(HoverBinding {
            target,
            on_enter: Box::new(on_enter),
            on_leave: Box::new(on_leave),
        });
    }

    /// Registers a filter predicate toggled by clicking any of `marks`.
    ///
    /// The predicate starts inactive.
    pub fn register_filter_toggle(
        &mut self,
        predicate_id: PredicateId,
        marks: impl IntoIterator<Item = MarkId>,
        predicate: impl Fn(RecordRef<'_>) -> bool + 'static,
    ) {
        self.filters.register(predicate_id, predicate);
        let marks: SmallVec<[MarkId; 4]> = marks.into_iter().collect();
        match self.toggles.iter_mut().find(|t| t.predicate == predicate_id) {
            Some(t) => t.marks = marks,
            None => self.toggles.push(FilterToggle {
                predicate: predicate_id,
                marks,
            }),
        }
    }

    /// The filter state.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Mutable filter state, for programmatic filtering.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// The tooltip state.
    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// The highlight state.
    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    /// The currently hovered mark.
    pub fn hovered(&self) -> Option<MarkId> {
        self.hovered.map(|h| h.id)
    }

    fn binding_for(&self, id: MarkId) -> Option<usize> {
        self.bindings.iter().position(|b| b.target.matches(id))
    }

    fn fire(&mut self, scene: &Scene, hovered: Hovered, pointer: Point, enter: bool) {
        let record = record_for(scene, hovered.id);
        let Some(binding) = self.bindings.get_mut(hovered.binding) else {
            return;
        };
        let mut ctx = HoverCtx {
            id: hovered.id,
            pointer,
            record,
            tooltip: &mut self.tooltip,
            highlights: &mut self.highlights,
        };
        if enter {
            (binding.on_enter)(&mut ctx);
        } else {
            (binding.on_leave)(&mut ctx);
        }
    }

    fn leave(&mut self, scene: &Scene, pointer: Point) -> bool {
        let Some(h) = self.hovered.take() else {
            return false;
        };
        log::trace!("hover leave {:?}", h.id);
        self.fire(scene, h, pointer, false);
        self.tooltip.hide();
        self.highlights.clear();
        true
    }

    /// Handles pointer movement. Returns `true` if tooltip or highlight state changed.
    pub fn pointer_move(&mut self, scene: &Scene, pointer: Point) -> bool {
        let hit = scene.hit_test(pointer, |id| self.binding_for(id).is_some());
        if let (Some(h), Some(id)) = (self.hovered, hit) {
            if h.id == id {
                self.tooltip.pos = pointer + TOOLTIP_OFFSET;
                return self.tooltip.visible;
            }
        }
        let mut changed = self.leave(scene, pointer);
        if let Some(id) = hit {
            if let Some(binding) = self.binding_for(id) {
                log::trace!("hover enter {id:?}");
                let h = Hovered { id, binding };
                self.hovered = Some(h);
                self.tooltip.pos = pointer + TOOLTIP_OFFSET;
                self.fire(scene, h, pointer, true);
                changed = true;
            }
        }
        changed
    }

    /// Handles the pointer leaving the chart.
    pub fn pointer_leave(&mut self, scene: &Scene) -> bool {
        let pointer = self.tooltip.pos - TOOLTIP_OFFSET;
        self.leave(scene, pointer)
    }

    /// Handles a click. Returns the toggled predicate and its new state.
    pub fn click(&mut self, scene: &Scene, pointer: Point) -> Option<(PredicateId, bool)> {
        let hit = scene.hit_test(pointer, |id| {
            self.toggles.iter().any(|t| t.marks.contains(&id))
        })?;
        let predicate = self.toggles.iter().find(|t| t.marks.contains(&hit))?.predicate;
        let active = self.filters.toggle(predicate)?;
        log::debug!("filter {predicate:?} is now {}", if active { "on" } else { "off" });
        Some((predicate, active))
    }

    /// Fires an implicit leave if the hovered mark is no longer `present`.
    ///
    /// Charts call this with the next frame's mark set before reconciling, so a removed mark
    /// never stays highlighted.
    pub fn reconcile(&mut self, scene: &Scene, present: impl Fn(MarkId) -> bool) -> bool {
        match self.hovered {
            Some(h) if !present(h.id) => {
                log::debug!("hovered mark {:?} removed; firing leave", h.id);
                let pointer = self.tooltip.pos - TOOLTIP_OFFSET;
                self.leave(scene, pointer)
            }
            _ => false,
        }
    }

    /// Fires any pending leave and drops every binding, toggle and filter.
    pub fn teardown(&mut self, scene: &Scene) {
        self.pointer_leave(scene);
        self.bindings.clear();
        self.toggles.clear();
        self.filters = FilterState::new();
    }

    /// Applies highlight overrides and dimming to a frame's marks.
    pub fn apply(&self, marks: &mut [Mark]) {
        if self.highlights.is_empty() {
            return;
        }
        for m in marks {
            if let Some(h) = self.highlights.overrides.get(&m.id) {
                if let (Some(r), MarkShape::Circle(c)) = (h.radius, &mut m.payload.shape) {
                    c.radius = r;
                }
                if let Some(o) = h.opacity {
                    m.payload.style.opacity = o.clamp(0.0, 1.0);
                }
                if let Some((brush, width)) = &h.stroke {
                    m.payload.style.stroke = brush.clone();
                    m.payload.style.stroke_width = *width;
                }
            } else if let Some(dim) = self.highlights.dim_others {
                if self.binding_for(m.id).is_some() {
                    m.payload.style.opacity = m.payload.style.opacity.min(dim);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    fn star(id: u64, x: f64) -> Mark {
        Mark::builder(MarkId::for_row(TableId(1), id))
            .circle((x, 0.0), 5.0)
            .build()
    }

    fn logged(ctl: &mut InteractionController) -> Rc<RefCell<Vec<(char, MarkId)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (enter, leave) = (log.clone(), log.clone());
        ctl.on_hover(
            HoverTarget::Table(TableId(1)),
            move |cx| {
                enter.borrow_mut().push(('+', cx.id));
                cx.tooltip.show("star");
                cx.highlights.overrides.insert(
                    cx.id,
                    Highlight {
                        radius: Some(9.0),
                        ..Highlight::default()
                    },
                );
                cx.highlights.dim_others = Some(0.2);
            },
            move |cx| leave.borrow_mut().push(('-', cx.id)),
        );
        log
    }

    #[test]
    fn moving_between_marks_pairs_enters_and_leaves() {
        let mut scene = Scene::new();
        scene.tick(vec![star(1, 0.0), star(2, 20.0)]);
        let mut ctl = InteractionController::new();
        let log = logged(&mut ctl);

        assert!(ctl.pointer_move(&scene, Point::new(1.0, 0.0)));
        assert_eq!(ctl.tooltip().pos, Point::new(11.0, -10.0));
        // Moving within the same mark only moves the tooltip.
        assert!(ctl.pointer_move(&scene, Point::new(2.0, 1.0)));
        assert_eq!(ctl.tooltip().pos, Point::new(12.0, -9.0));
        assert!(ctl.pointer_move(&scene, Point::new(20.0, 0.0)));
        assert!(ctl.pointer_move(&scene, Point::new(100.0, 0.0)));
        assert!(!ctl.pointer_move(&scene, Point::new(101.0, 0.0)));

        let a = MarkId::for_row(TableId(1), 1);
        let b = MarkId::for_row(TableId(1), 2);
        assert_eq!(*log.borrow(), vec![('+', a), ('-', a), ('+', b), ('-', b)]);
        assert!(!ctl.tooltip().visible);
        assert!(ctl.highlights().is_empty());
    }

    #[test]
    fn highlights_override_hovered_and_dim_others() {
        let mut scene = Scene::new();
        scene.tick(vec![star(1, 0.0), star(2, 20.0)]);
        let mut ctl = InteractionController::new();
        let _log = logged(&mut ctl);
        ctl.pointer_move(&scene, Point::new(0.0, 0.0));

        let mut marks = vec![star(1, 0.0), star(2, 20.0)];
        ctl.apply(&mut marks);
        match &marks[0].payload.shape {
            MarkShape::Circle(c) => assert_eq!(c.radius, 9.0),
            other => panic!("expected circle, got {other:?}"),
        }
        assert_eq!(marks[1].payload.style.opacity, 0.2);
    }

    #[test]
    fn removal_and_teardown_fire_leave_once() {
        let mut scene = Scene::new();
        scene.tick(vec![star(1, 0.0)]);
        let mut ctl = InteractionController::new();
        let log = logged(&mut ctl);
        ctl.pointer_move(&scene, Point::new(0.0, 0.0));

        assert!(ctl.reconcile(&scene, |_| false));
        assert!(!ctl.reconcile(&scene, |_| false));
        ctl.teardown(&scene);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(ctl.hovered(), None);
    }

    #[test]
    fn clicking_a_toggle_mark_flips_its_predicate() {
        let swatch = Mark::builder(MarkId(7)).circle((0.0, 0.0), 6.0).build();
        let mut scene = Scene::new();
        scene.tick(vec![swatch]);
        let mut ctl = InteractionController::new();
        ctl.register_filter_toggle(PredicateId(3), [MarkId(7)], |_| false);

        assert_eq!(ctl.click(&scene, Point::new(1.0, 1.0)), Some((PredicateId(3), true)));
        assert!(ctl.filters().is_active(PredicateId(3)));
        assert_eq!(ctl.click(&scene, Point::new(1.0, 1.0)), Some((PredicateId(3), false)));
        assert_eq!(ctl.click(&scene, Point::new(50.0, 1.0)), None);
    }
}
