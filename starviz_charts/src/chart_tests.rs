// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;

use alloc::rc::Rc;
use kurbo::Point;
use peniko::color::palette::css;
use starviz_core::{
    ColId, Mark, MarkDiff, MarkId, MarkPayload, MarkShape, Table, TableData, TableId,
};
use starviz_transforms::{BinColumns, Program, Transform};

use crate::{
    Channel, ChartInstance, ERROR_MARK_ID, FilterPolicy, FrameSpec, Highlight, HistogramMarkSpec,
    HoverTarget, LegendItem, LegendSwatches, LoadOutcome, LoadState, Margin, PointMarkSpec,
    PredicateId, RenderCtx, ScaleLinear, TOOLTIP_BACKDROP_ID, TOOLTIP_MARK_ID,
};

const STARS: TableId = TableId(1);
const BV: ColId = ColId(0);
const VMAG: ColId = ColId(1);
const CLASS: ColId = ColId(2);

#[derive(Debug)]
struct Stars {
    bv: Vec<f64>,
    vmag: Vec<f64>,
    class: Vec<String>,
}

impl TableData for Stars {
    fn row_count(&self) -> usize {
        self.bv.len()
    }

    fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        match col {
            BV => self.bv.get(row).copied(),
            VMAG => self.vmag.get(row).copied(),
            _ => None,
        }
    }

    fn text(&self, row: usize, col: ColId) -> Option<&str> {
        match col {
            CLASS => self.class.get(row).map(String::as_str),
            _ => None,
        }
    }
}

/// `(key, bv, vmag, class)` rows.
fn stars(rows: &[(u64, f64, f64, &str)]) -> Table {
    Table::with_data(
        STARS,
        rows.iter().map(|r| r.0).collect(),
        Box::new(Stars {
            bv: rows.iter().map(|r| r.1).collect(),
            vmag: rows.iter().map(|r| r.2).collect(),
            class: rows.iter().map(|r| r.3.to_string()).collect(),
        }),
    )
}

const A: (u64, f64, f64, &str) = (0, 0.0, 0.0, "G");
const B: (u64, f64, f64, &str) = (1, 1.0, 2.0, "T");
const C: (u64, f64, f64, &str) = (2, 2.0, 4.0, "M");

fn frame() -> FrameSpec {
    FrameSpec::new(400.0, 300.0).with_margin(Margin::new(10.0, 100.0, 40.0, 50.0))
}

/// Fixed scales so moving data never moves surviving glyphs.
fn scatter(cx: &RenderCtx<'_>) -> Vec<Mark> {
    let plot = cx.frame.plot();
    let Some(table) = cx.source_table() else {
        return Vec::new();
    };
    PointMarkSpec::new(
        STARS,
        Channel::field(BV, ScaleLinear::new((0.0, 2.0), (plot.x0, plot.x1))),
        Channel::field(VMAG, ScaleLinear::new((0.0, 4.0), (plot.y0, plot.y1))),
    )
    .with_radius(5.0)
    .with_fill(css::ORANGE)
    .with_opacity(0.7)
    .marks_filtered(table, |r| cx.visible(r))
}

fn chart() -> ChartInstance {
    ChartInstance::new(frame(), STARS)
        .unwrap()
        .with_series(scatter)
}

fn load(chart: &mut ChartInstance, rows: &[(u64, f64, f64, &str)]) -> Vec<MarkDiff> {
    let ticket = chart.begin_load();
    match chart.complete_load(ticket, Ok::<_, String>(stars(rows))) {
        LoadOutcome::Rendered(diffs) => diffs,
        other => panic!("expected a render, got {other:?}"),
    }
}

fn snapshot(chart: &ChartInstance) -> Vec<(MarkId, i32, MarkPayload)> {
    chart
        .scene()
        .sorted_marks()
        .into_iter()
        .map(|(id, z, p)| (id, z, p.clone()))
        .collect()
}

fn star_center(chart: &ChartInstance, key: u64) -> Point {
    match chart.scene().mark(MarkId::for_row(STARS, key)) {
        Some((_, MarkPayload { shape: MarkShape::Circle(c), .. })) => c.center,
        other => panic!("star {key} is not a live circle: {other:?}"),
    }
}

#[test]
fn reload_with_reordered_subset_keeps_identity_and_exits_removed_once() {
    let mut chart = chart();
    let diffs = load(&mut chart, &[A, B, C]);
    assert_eq!(diffs.len(), 3);

    let diffs = load(&mut chart, &[C, A]);
    assert_eq!(diffs.len(), 1, "only B should exit: {diffs:?}");
    assert!(matches!(diffs[0], MarkDiff::Exit { id, .. } if id == MarkId::for_row(STARS, 1)));
    assert_eq!(chart.scene().entered_at(MarkId::for_row(STARS, 0)), Some(1));
    assert_eq!(chart.scene().entered_at(MarkId::for_row(STARS, 2)), Some(1));

    assert!(load(&mut chart, &[C, A]).is_empty());
}

#[test]
fn legend_toggle_twice_restores_every_mark() {
    let legend = LegendSwatches::new(
        900,
        Point::new(310.0, 20.0),
        [LegendItem::new("T", css::GRAY).with_toggle(PredicateId(0))],
    );
    let toggle = legend.toggle_marks(0);
    let swatch = legend.swatch_id(0);
    let mut chart = chart().with_legend(legend);
    chart.register_filter_toggle(PredicateId(0), toggle, |r| r.text(CLASS) != Some("T"));
    load(&mut chart, &[A, B, C]);
    let before = snapshot(&chart);

    let click_at = match chart.scene().mark(swatch) {
        Some((_, MarkPayload { shape: MarkShape::Circle(c), .. })) => c.center,
        other => panic!("missing legend swatch: {other:?}"),
    };

    let diffs = chart.click(click_at);
    let updated: Vec<MarkId> = diffs.iter().map(MarkDiff::id).collect();
    assert_eq!(updated, vec![MarkId::for_row(STARS, 1), swatch]);
    let dimmed = chart.scene().mark(MarkId::for_row(STARS, 1)).unwrap().1;
    assert_eq!(dimmed.style.opacity, 0.1);

    chart.click(click_at);
    assert_eq!(snapshot(&chart), before);
    assert!(chart.interaction().filters().active().is_empty());
}

#[test]
fn removed_filter_policy_exits_and_reenters() {
    let mut chart = ChartInstance::new(frame(), STARS)
        .unwrap()
        .with_series(|cx: &RenderCtx<'_>| {
            let plot = cx.frame.plot();
            cx.source_table().map_or_else(Vec::new, |t| {
                PointMarkSpec::new(
                    STARS,
                    Channel::field(BV, ScaleLinear::new((0.0, 2.0), (plot.x0, plot.x1))),
                    Channel::field(VMAG, ScaleLinear::new((0.0, 4.0), (plot.y0, plot.y1))),
                )
                .with_filter_policy(FilterPolicy::Remove)
                .marks_filtered(t, |r| cx.visible(r))
            })
        });
    chart.register_filter_toggle(PredicateId(1), core::iter::empty(), |r| r.text(CLASS) != Some("M"));
    load(&mut chart, &[A, B, C]);
    assert_eq!(chart.scene().mark_count(), 3);

    // No click target was registered; drive the filter directly and re-render.
    assert!(chart.interaction_mut().filters_mut().set_active(PredicateId(1), true));
    let diffs = chart.render();
    assert!(matches!(&diffs[..], [MarkDiff::Exit { id, .. }] if *id == MarkId::for_row(STARS, 2)));
    chart.interaction_mut().filters_mut().set_active(PredicateId(1), false);
    let diffs = chart.render();
    assert!(matches!(&diffs[..], [MarkDiff::Enter { id, .. }] if *id == MarkId::for_row(STARS, 2)));
}

#[test]
fn hover_shows_tooltip_and_removal_fires_leave_once() {
    let mut chart = chart();
    let leaves = Rc::new(Cell::new(0_u32));
    let counter = leaves.clone();
    chart.on_hover(
        HoverTarget::Table(STARS),
        |cx| {
            let mag = cx.record.and_then(|r| r.f64(VMAG)).unwrap_or(f64::NAN);
            cx.tooltip.show(alloc::format!("mag {mag}"));
            cx.highlights.overrides.insert(
                cx.id,
                Highlight {
                    radius: Some(9.0),
                    ..Highlight::default()
                },
            );
            cx.highlights.dim_others = Some(0.2);
        },
        move |_| counter.set(counter.get() + 1),
    );
    load(&mut chart, &[A, B, C]);

    let b = star_center(&chart, 1);
    let diffs = chart.pointer_move(b);
    assert!(diffs.iter().any(|d| d.id() == TOOLTIP_MARK_ID));
    match chart.scene().mark(TOOLTIP_MARK_ID) {
        Some((_, MarkPayload { shape: MarkShape::Text(t), .. })) => {
            assert_eq!(t.text, "mag 2");
            assert_eq!(t.pos, b + crate::TOOLTIP_OFFSET);
        }
        other => panic!("missing tooltip: {other:?}"),
    }
    let (z, panel) = chart.scene().mark(TOOLTIP_BACKDROP_ID).unwrap();
    assert_eq!(z, crate::z_order::TOOLTIP - 1);
    assert!(panel.contains(b + crate::TOOLTIP_OFFSET));
    let others = chart.scene().mark(MarkId::for_row(STARS, 0)).unwrap().1;
    assert_eq!(others.style.opacity, 0.2);

    // B disappears while hovered: one implicit leave, nothing left highlighted.
    load(&mut chart, &[A, C]);
    assert_eq!(leaves.get(), 1);
    assert!(!chart.scene().contains(TOOLTIP_MARK_ID));
    assert!(!chart.scene().contains(TOOLTIP_BACKDROP_ID));
    let a = chart.scene().mark(MarkId::for_row(STARS, 0)).unwrap().1;
    assert_eq!(a.style.opacity, 0.7);

    chart.pointer_leave();
    chart.teardown();
    assert_eq!(leaves.get(), 1);
}

#[test]
fn completion_after_teardown_is_discarded() {
    let mut chart = chart();
    let ticket = chart.begin_load();
    let exits = chart.teardown();
    assert!(exits.is_empty());
    let outcome = chart.complete_load(ticket, Ok::<_, String>(stars(&[A, B])));
    assert_eq!(outcome, LoadOutcome::Discarded);
    assert_eq!(chart.scene().mark_count(), 0);
    assert!(chart.scene().tables.is_empty());
    assert_eq!(*chart.state(), LoadState::TornDown);
}

#[test]
fn superseded_load_is_discarded() {
    let mut chart = chart();
    let first = chart.begin_load();
    let second = chart.begin_load();
    assert_eq!(
        chart.complete_load(first, Ok::<_, String>(stars(&[A]))),
        LoadOutcome::Discarded
    );
    assert!(matches!(
        chart.complete_load(second, Ok::<_, String>(stars(&[A, B]))),
        LoadOutcome::Rendered(d) if d.len() == 2
    ));
}

#[test]
fn teardown_exits_every_mark() {
    let mut chart = chart();
    load(&mut chart, &[A, B, C]);
    let diffs = chart.teardown();
    assert_eq!(diffs.len(), 3);
    assert!(diffs.iter().all(MarkDiff::is_exit));
    assert!(chart.pointer_move(Point::new(0.0, 0.0)).is_empty());
}

#[test]
fn load_failure_renders_inline_message() {
    let mut chart = chart();
    let ticket = chart.begin_load();
    let outcome = chart.complete_load(ticket, Err::<Table, _>("no such file: stars.csv"));
    let LoadOutcome::Failed(diffs) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(diffs.len(), 1);
    match chart.scene().mark(ERROR_MARK_ID) {
        Some((_, MarkPayload { shape: MarkShape::Text(t), .. })) => assert_eq!(t.text, "Error loading data: no such file: stars.csv"),
        other => panic!("missing error text: {other:?}"),
    }
    assert!(matches!(chart.state(), LoadState::Failed(_)));
}

#[test]
fn degenerate_frame_is_a_config_error() {
    let frame = FrameSpec::new(100.0, 100.0).with_margin(Margin::uniform(60.0));
    assert!(ChartInstance::new(frame, STARS).is_err());
}

#[test]
fn program_outputs_feed_histogram_series() {
    const BINS: TableId = TableId(2);
    let program = Program::new().with(Transform::Bin {
        input: STARS,
        output: BINS,
        input_col: VMAG,
        extent: Some((0.0, 6.0)),
        thresholds: 3,
        columns: BinColumns::default(),
    });
    let mut chart = ChartInstance::new(frame(), STARS)
        .unwrap()
        .with_program(program)
        .with_series(|cx: &RenderCtx<'_>| {
            let plot = cx.frame.plot();
            cx.table(BINS).map_or_else(Vec::new, |bins| {
                HistogramMarkSpec::new(
                    BINS,
                    BinColumns::default(),
                    ScaleLinear::new((0.0, 6.0), (plot.x0, plot.x1)),
                    ScaleLinear::new((0.0, 3.0), (plot.y1, plot.y0)),
                )
                .marks(bins)
            })
        });
    let diffs = load(&mut chart, &[A, B, C]);
    assert_eq!(diffs.len(), 3);
    let ids: Vec<MarkId> = diffs.iter().map(MarkDiff::id).collect();
    assert_eq!(
        ids,
        vec![
            MarkId::for_row(BINS, 0),
            MarkId::for_row(BINS, 1),
            MarkId::for_row(BINS, 2)
        ]
    );
    // One star per bin: every bar has the same height.
    let heights: Vec<f64> = diffs
        .iter()
        .filter_map(|d| match d {
            MarkDiff::Enter { bounds, .. } => bounds.map(|b| b.height()),
            _ => None,
        })
        .collect();
    assert!(heights.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-9));
}
