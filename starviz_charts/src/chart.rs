// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart instances: one frame, one scene, one interaction controller, one data load.
//!
//! A [`ChartInstance`] owns everything a chart mutates, so several charts can live side by side
//! and be disposed independently. Data arrives asynchronously: the host calls
//! [`ChartInstance::begin_load`], fetches, then hands the result to
//! [`ChartInstance::complete_load`]. Results for a superseded ticket, or arriving after
//! [`ChartInstance::teardown`], are discarded without rendering.

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use kurbo::Point;
use peniko::color::palette::css;
use starviz_core::{Mark, MarkDiff, MarkId, RecordRef, Scene, Table, TableId};
use starviz_transforms::Program;

use crate::filter::FilterState;
use crate::interaction::{HoverCtx, HoverTarget, InteractionController};
use crate::layout::{ConfigError, FrameSpec, PlotFrame};
use crate::legend::LegendSwatches;
use crate::text_mark::TextMarkSpec;

/// Raw id of the inline error message.
pub const ERROR_MARK_ID: MarkId = MarkId::from_raw(0xE_0000);
/// Raw id of the tooltip text.
pub const TOOLTIP_MARK_ID: MarkId = MarkId::from_raw(0xE_0001);
/// Raw id of the panel behind the tooltip text.
pub const TOOLTIP_BACKDROP_ID: MarkId = MarkId::from_raw(0xE_0002);

/// What a series sees while rendering.
#[derive(Debug)]
pub struct RenderCtx<'a> {
    /// The planned frame.
    pub frame: &'a PlotFrame,
    /// The chart's source table id.
    pub source: TableId,
    scene: &'a Scene,
    filters: &'a FilterState,
}

impl<'a> RenderCtx<'a> {
    /// Looks up a table (the source table or a transform output).
    pub fn table(&self, id: TableId) -> Option<&'a Table> {
        self.scene.tables.get(&id)
    }

    /// The loaded source table.
    pub fn source_table(&self) -> Option<&'a Table> {
        self.table(self.source)
    }

    /// The chart's filter state.
    pub fn filters(&self) -> &'a FilterState {
        self.filters
    }

    /// Returns `true` if `rec` passes every active filter.
    pub fn visible(&self, rec: RecordRef<'_>) -> bool {
        self.filters.passes(rec)
    }
}

/// A producer of marks for one render.
pub trait ChartSeries {
    /// Generates this series' marks.
    fn marks(&self, cx: &RenderCtx<'_>) -> Vec<Mark>;
}

impl<F> ChartSeries for F
where
    F: Fn(&RenderCtx<'_>) -> Vec<Mark>,
{
    fn marks(&self, cx: &RenderCtx<'_>) -> Vec<Mark> {
        self(cx)
    }
}

/// Identifies one data load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Where a chart is in its data lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// No load started.
    Idle,
    /// A load is outstanding.
    Loading,
    /// Data is loaded and rendered.
    Ready,
    /// The last load failed; the message is rendered inline.
    Failed(String),
    /// The chart has been torn down.
    TornDown,
}

/// Result of [`ChartInstance::complete_load`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// The data was rendered.
    Rendered(Vec<MarkDiff>),
    /// The load failed and the error message was rendered.
    Failed(Vec<MarkDiff>),
    /// The result was stale or arrived after teardown; nothing changed.
    Discarded,
}

/// One chart: frame, scene, interaction state and series.
pub struct ChartInstance {
    source: TableId,
    frame: PlotFrame,
    scene: Scene,
    interaction: InteractionController,
    program: Option<Program>,
    series: Vec<Box<dyn ChartSeries>>,
    legend: Option<LegendSwatches>,
    state: LoadState,
    generation: u64,
}

impl fmt::Debug for ChartInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartInstance")
            .field("source", &self.source)
            .field("frame", &self.frame)
            .field("marks", &self.scene.mark_count())
            .field("interaction", &self.interaction)
            .field("program", &self.program)
            .field("series", &self.series.len())
            .field("legend", &self.legend)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}

impl ChartInstance {
    /// Creates a chart reading `source`. Fails if the frame is degenerate.
    pub fn new(frame: FrameSpec, source: TableId) -> Result<Self, ConfigError> {
        Ok(Self {
            source,
            frame: frame.plan()?,
            scene: Scene::new(),
            interaction: InteractionController::new(),
            program: None,
            series: Vec::new(),
            legend: None,
            state: LoadState::Idle,
            generation: 0,
        })
    }

    /// Runs `program` against the scene after each successful load.
    pub fn with_program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    /// Adds a series. Series render in insertion order; z-index decides paint order.
    pub fn with_series(mut self, series: impl ChartSeries + 'static) -> Self {
        self.series.push(Box::new(series));
        self
    }

    /// Adds a legend whose toggle rows are wired to the filter state.
    ///
    /// Register each row's predicate with [`ChartInstance::register_filter_toggle`] using
    /// [`LegendSwatches::toggle_marks`].
    pub fn with_legend(mut self, legend: LegendSwatches) -> Self {
        self.legend = Some(legend);
        self
    }

    /// The planned frame.
    pub fn frame(&self) -> &PlotFrame {
        &self.frame
    }

    /// The chart's scene (tables and live marks).
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The interaction controller.
    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Mutable interaction controller, for programmatic filtering.
    pub fn interaction_mut(&mut self) -> &mut InteractionController {
        &mut self.interaction
    }

    /// The legend, if any.
    pub fn legend(&self) -> Option<&LegendSwatches> {
        self.legend.as_ref()
    }

    /// The load state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Registers hover behavior.
    pub fn on_hover(
        &mut self,
        target: HoverTarget,
        on_enter: impl FnMut(&mut HoverCtx<'_>) + 'static,
        on_leave: impl FnMut(&mut HoverCtx<'_>) + 'static,
    ) {
        self.interaction.on_hover(target, on_enter, on_leave);
    }

    /// Registers a click-toggled filter predicate.
    pub fn register_filter_toggle(
        &mut self,
        predicate_id: crate::filter::PredicateId,
        marks: impl IntoIterator<Item = MarkId>,
        predicate: impl Fn(RecordRef<'_>) -> bool + 'static,
    ) {
        self.interaction
            .register_filter_toggle(predicate_id, marks, predicate);
    }

    /// Starts a load, superseding any outstanding one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        if self.state != LoadState::TornDown {
            self.state = LoadState::Loading;
        }
        LoadTicket(self.generation)
    }

    /// Delivers the result of the load identified by `ticket`.
    pub fn complete_load<E: fmt::Display>(
        &mut self,
        ticket: LoadTicket,
        result: Result<Table, E>,
    ) -> LoadOutcome {
        if self.state == LoadState::TornDown {
            log::debug!("discarding load {ticket:?}: chart was torn down");
            return LoadOutcome::Discarded;
        }
        if ticket.0 != self.generation {
            log::debug!("discarding stale load {ticket:?}");
            return LoadOutcome::Discarded;
        }
        let mut table = match result {
            Ok(table) => table,
            Err(err) => return LoadOutcome::Failed(self.fail(format!("{err}"))),
        };
        table.id = self.source;
        log::info!("chart table {:?} loaded with {} rows", self.source, table.len());
        self.scene.insert_table(table);
        if let Some(program) = &self.program {
            if let Err(err) = program.apply_to_scene(&mut self.scene) {
                return LoadOutcome::Failed(self.fail(format!("{err}")));
            }
        }
        self.state = LoadState::Ready;
        LoadOutcome::Rendered(self.render())
    }

    fn fail(&mut self, message: String) -> Vec<MarkDiff> {
        log::warn!("chart table {:?} failed to load: {message}", self.source);
        self.state = LoadState::Failed(message);
        self.render()
    }

    fn frame_marks(&self) -> Vec<Mark> {
        match &self.state {
            LoadState::Idle | LoadState::Loading | LoadState::TornDown => Vec::new(),
            LoadState::Failed(message) => {
                let c = self.frame.center();
                alloc::vec![TextMarkSpec::load_error(ERROR_MARK_ID, c, message).mark()]
            }
            LoadState::Ready => {
                let cx = RenderCtx {
                    frame: &self.frame,
                    source: self.source,
                    scene: &self.scene,
                    filters: self.interaction.filters(),
                };
                let mut marks: Vec<Mark> = self.series.iter().flat_map(|s| s.marks(&cx)).collect();
                if let Some(legend) = &self.legend {
                    marks.extend(legend.marks(self.interaction.filters()));
                }
                marks
            }
        }
    }

    /// Recomputes every mark and reconciles the scene.
    pub fn render(&mut self) -> Vec<MarkDiff> {
        let mut marks = self.frame_marks();
        let present: HashSet<MarkId> = marks.iter().map(|m| m.id).collect();
        self.interaction
            .reconcile(&self.scene, |id| present.contains(&id));
        self.interaction.apply(&mut marks);
        let tooltip = self.interaction.tooltip();
        if tooltip.visible {
            let text = TextMarkSpec::tooltip(TOOLTIP_MARK_ID, tooltip.pos, tooltip.text.clone());
            marks.push(text.backdrop(TOOLTIP_BACKDROP_ID, css::WHITE, 4.0));
            marks.push(text.mark());
        }
        let diffs = self.scene.tick(marks);
        log::debug!("chart {:?} rendered: {} diffs", self.source, diffs.len());
        diffs
    }

    /// Feeds a pointer position. Re-renders if hover state changed.
    pub fn pointer_move(&mut self, pointer: Point) -> Vec<MarkDiff> {
        if self.state == LoadState::TornDown {
            return Vec::new();
        }
        if self.interaction.pointer_move(&self.scene, pointer) {
            self.render()
        } else {
            Vec::new()
        }
    }

    /// Notifies that the pointer left the chart.
    pub fn pointer_leave(&mut self) -> Vec<MarkDiff> {
        if self.interaction.pointer_leave(&self.scene) {
            self.render()
        } else {
            Vec::new()
        }
    }

    /// Feeds a click. Toggling a filter re-renders every element.
    pub fn click(&mut self, pointer: Point) -> Vec<MarkDiff> {
        if self.state == LoadState::TornDown {
            return Vec::new();
        }
        match self.interaction.click(&self.scene, pointer) {
            Some(_) => self.render(),
            None => Vec::new(),
        }
    }

    /// Disposes the chart: fires pending leaves, removes every mark and drops all tables.
    ///
    /// Any load still outstanding will be discarded on completion.
    pub fn teardown(&mut self) -> Vec<MarkDiff> {
        self.interaction.teardown(&self.scene);
        self.state = LoadState::TornDown;
        let diffs = self.scene.clear();
        self.scene.tables.clear();
        log::debug!("chart {:?} torn down: {} marks removed", self.source, diffs.len());
        diffs
    }
}
