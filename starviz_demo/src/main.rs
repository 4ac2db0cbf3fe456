// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Star-catalog chart demos.
//!
//! Each chart loads the catalog through its own [`ChartInstance`], replays the resulting diffs
//! into an SVG replica, and drives a few interactions. The report shows a snapshot after each
//! step.

mod html;
mod stars;
mod svg;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use kurbo::Point;
use peniko::color::palette::css;
use peniko::{Brush, Color};
use starviz_charts::{
    AreaMarkSpec, AxisSpec, AxisStyle, BarMarkSpec, Channel, ChartInstance, ColorChannel,
    ColorRamp, ContourMarkSpec, Curve, FrameSpec, GRID_LINES, Highlight, HistogramMarkSpec,
    HoverCtx, HoverTarget, LegendItem, LegendSwatches, LoadOutcome, LoadState, Margin, PlotFrame,
    PointMarkSpec, PredicateId, RenderCtx, RuleMarkSpec, SERIES_POINTS, SERIES_STROKE,
    ScaleBandSpec, ScaleLinearSpec, ScaleSequential, ScaleSqrt, StrokeStyle, TextMarkSpec,
    extent_of,
};
use starviz_core::{ColId, Mark, MarkDiff, MarkId, TableId, TextAnchor};
use starviz_transforms::{
    AggregateField, AggregateOp, BinColumns, DensityColumns, Program, RegressionColumns,
    Transform,
};

use crate::html::HtmlSection;
use crate::stars::{BV, CLASS_INDEX, DEC, NAME, RA, SPECTRAL_CLASSES, STARS, VMAG};
use crate::svg::SvgScene;

const DENSITY: TableId = TableId(2);
const BINS: TableId = TableId(3);
const COUNTS: TableId = TableId(4);
const FIT: TableId = TableId(5);

const COUNT: ColId = ColId(1);

const X_AXIS: u64 = 0x1_0000;
const Y_AXIS: u64 = 0x2_0000;
const LEGEND: u64 = 0x3_0000;
const TITLE: u64 = 0xF_0000;

const HOVER_STROKE: Color = Color::from_rgb8(0xf6, 0xe0, 0x5e);

#[derive(Parser, Debug)]
#[command(name = "starviz_demo", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[arg(short, long)]
    verbose: bool,

    /// Where to write the HTML report.
    #[arg(short, long, default_value = "starviz_demo.html")]
    output: PathBuf,

    /// Cleaned bright-star CSV. Defaults to the bundled sample.
    data: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })?;

    let data = args.data.unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/bright_star_sample.csv")
    });
    log::info!("reading stars from {}", data.display());

    let sections = vec![
        hr_diagram(&data)?,
        sky_map(&data)?,
        magnitude_histogram(&data)?,
        spectral_counts(&data)?,
        color_magnitude_fit(&data)?,
        load_error(&data)?,
    ];

    let html = html::render_report("starviz: bright star catalog", &sections);
    std::fs::write(&args.output, html)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("wrote {}", args.output.display());
    Ok(())
}

/// A chart plus the SVG replica its diffs are replayed into.
struct Stage {
    chart: ChartInstance,
    svg: SvgScene,
}

impl Stage {
    fn new(chart: ChartInstance) -> Self {
        let svg = SvgScene::new(chart.frame().view());
        Self { chart, svg }
    }

    /// Loads the catalog and replays the outcome. Returns the number of diffs.
    fn load(&mut self, path: &Path) -> usize {
        let ticket = self.chart.begin_load();
        match self.chart.complete_load(ticket, stars::load(path)) {
            LoadOutcome::Rendered(diffs) | LoadOutcome::Failed(diffs) => self.replay(&diffs),
            LoadOutcome::Discarded => 0,
        }
    }

    fn replay(&mut self, diffs: &[MarkDiff]) -> usize {
        self.svg.apply_diffs(diffs);
        diffs.len()
    }

    fn pointer_move(&mut self, pointer: Point) -> usize {
        let diffs = self.chart.pointer_move(pointer);
        self.replay(&diffs)
    }

    fn pointer_leave(&mut self) -> usize {
        let diffs = self.chart.pointer_leave();
        self.replay(&diffs)
    }

    fn click(&mut self, pointer: Point) -> usize {
        let diffs = self.chart.click(pointer);
        self.replay(&diffs)
    }

    fn teardown(&mut self) -> usize {
        let diffs = self.chart.teardown();
        self.replay(&diffs)
    }

    fn snapshot(&self, section: &mut HtmlSection, caption: impl Into<String>) {
        section.snapshot(caption, self.svg.to_svg_string());
    }

    fn center_of(&self, id: MarkId) -> Option<Point> {
        let (_, payload) = self.chart.scene().mark(id)?;
        payload.bounds().map(|b| b.center())
    }

    fn star(&self, name: &str) -> Option<MarkId> {
        let table = self.chart.scene().tables.get(&STARS)?;
        let rec = table.records().find(|r| r.text(NAME) == Some(name))?;
        Some(MarkId::for_row(STARS, rec.key()))
    }
}

fn axis_style() -> AxisStyle {
    AxisStyle {
        rule: StrokeStyle::solid(css::GRAY, 1.0),
        label_fill: css::LIGHT_GRAY.into(),
        label_font_size: 10.0,
        title_fill: css::WHITE.into(),
        title_font_size: 12.0,
    }
}

fn grid() -> StrokeStyle {
    StrokeStyle::solid(Color::from_rgba8(0xff, 0xff, 0xff, 0x1a), 1.0)
}

fn titles(frame: &PlotFrame, title: &str, subtitle: &str) -> Vec<Mark> {
    let x = frame.view().center().x;
    vec![
        TextMarkSpec::new(MarkId::from_raw(TITLE), (x, 24.0), title)
            .with_font_size(20.0)
            .with_anchor(TextAnchor::Middle)
            .with_fill(css::WHITE)
            .mark(),
        TextMarkSpec::new(MarkId::from_raw(TITLE + 1), (x, 46.0), subtitle)
            .with_font_size(12.0)
            .with_anchor(TextAnchor::Middle)
            .with_fill(css::LIGHT_GRAY)
            .mark(),
    ]
}

fn show_star(cx: &mut HoverCtx<'_>) {
    let Some(rec) = cx.record else {
        return;
    };
    cx.tooltip.show(stars::describe(rec));
    cx.highlights.overrides.insert(
        cx.id,
        Highlight {
            radius: Some(9.0),
            opacity: Some(1.0),
            stroke: Some((Brush::Solid(HOVER_STROKE), 2.0)),
        },
    );
    cx.highlights.dim_others = Some(0.2);
}

fn hr_marks(cx: &RenderCtx<'_>) -> Vec<Mark> {
    let Some(table) = cx.source_table() else {
        return Vec::new();
    };
    let (Some(bv), Some(vmag)) = (
        extent_of(table.records(), |r| r.f64(BV)),
        extent_of(table.records(), |r| r.f64(VMAG)),
    ) else {
        return Vec::new();
    };
    let plot = cx.frame.plot();
    let x_axis = AxisSpec::bottom(X_AXIS, ScaleLinearSpec::new(bv).with_nice(true))
        .with_title("B-V Color Index (← Hotter | Cooler →)")
        .with_style(axis_style())
        .with_grid(grid());
    let y_axis = AxisSpec::left(
        Y_AXIS,
        ScaleLinearSpec::new(vmag)
            .with_nice(true)
            .with_reversed_range(true),
    )
    .with_title("Apparent Magnitude (↑ Brighter)")
    .with_style(axis_style())
    .with_grid(grid());
    let (Some(x), Some(y)) = (x_axis.scale_continuous(plot), y_axis.scale_continuous(plot)) else {
        return Vec::new();
    };

    let mut marks = titles(
        cx.frame,
        "Hertzsprung-Russell Diagram",
        "Stellar classification: temperature vs brightness",
    );
    marks.extend(x_axis.marks(plot));
    marks.extend(y_axis.marks(plot));
    marks.extend(
        PointMarkSpec::new(STARS, Channel::field(BV, x), Channel::field(VMAG, y))
            .with_radius(4.0)
            .with_fill(ColorChannel::compute(stars::record_color))
            .with_opacity(0.7)
            .marks_filtered(table, |r| cx.visible(r)),
    );
    marks.push(
        TextMarkSpec::new(
            MarkId::from_raw(TITLE + 2),
            (x.map(0.1), y.map(3.0)),
            "Main Sequence",
        )
        .with_font_size(11.0)
        .with_angle(25.0)
        .with_fill(css::GRAY)
        .mark(),
    );
    let legend = cx.frame.legend_origin();
    #[allow(clippy::cast_precision_loss, reason = "seven legend rows")]
    let below_legend = legend.y + 20.0 * SPECTRAL_CLASSES.len() as f64 + 10.0;
    marks.push(
        TextMarkSpec::new(
            MarkId::from_raw(TITLE + 3),
            (legend.x, below_legend),
            "Click legend to filter",
        )
        .with_font_size(10.0)
        .with_fill(css::GRAY)
        .mark(),
    );
    marks
}

fn hr_diagram(data: &Path) -> Result<HtmlSection> {
    let frame = FrameSpec::new(900.0, 560.0).with_margin(Margin::new(70.0, 140.0, 60.0, 70.0));
    let chart = ChartInstance::new(frame, STARS)?.with_series(hr_marks);
    let legend = LegendSwatches::new(
        LEGEND,
        chart.frame().legend_origin(),
        SPECTRAL_CLASSES.iter().zip(0_u32..).map(|(&class, i)| {
            LegendItem::new(format!("{class}-type"), stars::spectral_color(class))
                .with_toggle(PredicateId(i))
        }),
    )
    .with_text_fill(css::WHITE);
    let toggles: Vec<[MarkId; 2]> = (0..SPECTRAL_CLASSES.len())
        .map(|i| legend.toggle_marks(i))
        .collect();
    let m_swatch = legend.swatch_id(SPECTRAL_CLASSES.len() - 1);

    let mut chart = chart.with_legend(legend);
    for ((&class, marks), i) in SPECTRAL_CLASSES.iter().zip(toggles).zip(0_u32..) {
        chart.register_filter_toggle(PredicateId(i), marks, move |r| {
            stars::class_of(r) != Some(class)
        });
    }
    chart.on_hover(HoverTarget::Table(STARS), show_star, |cx| {
        log::debug!("left star {:?}", cx.id);
    });

    let mut stage = Stage::new(chart);
    let mut section = HtmlSection::new("Hertzsprung-Russell diagram");

    let stale = stage.chart.begin_load();
    let entered = stage.load(data);
    let late = stage.chart.complete_load(stale, stars::load(data));
    section.note(format!(
        "Initial load entered {entered} marks. A superseded load that finished afterwards was {}.",
        if late == LoadOutcome::Discarded {
            "discarded"
        } else {
            "rendered"
        }
    ));
    stage.snapshot(&mut section, "Loaded");

    if let Some(center) = stage.star("Betelgeuse").and_then(|id| stage.center_of(id)) {
        let n = stage.pointer_move(center);
        section.note(format!(
            "Hovering Betelgeuse changed {n} marks: the highlight, every dimmed star, and the tooltip."
        ));
        stage.snapshot(&mut section, "Hovering Betelgeuse");
        let n = stage.pointer_leave();
        section.note(format!("Leaving restored {n} marks."));
    }

    if let Some(center) = stage.center_of(m_swatch) {
        let n = stage.click(center);
        section.note(format!("Clicking the M-type swatch dimmed M stars ({n} diffs)."));
        stage.snapshot(&mut section, "M-type stars filtered");
        let n = stage.click(center);
        section.note(format!("Clicking again restored them ({n} diffs)."));
    }

    let n = stage.teardown();
    section.note(format!(
        "Teardown removed {n} marks; {} diffs were replayed over the chart's life.",
        stage.svg.applied()
    ));
    Ok(section)
}

fn sky_marks(cx: &RenderCtx<'_>, colors: &ScaleSequential, ramp: &ColorRamp) -> Vec<Mark> {
    let Some(table) = cx.source_table() else {
        return Vec::new();
    };
    let Some(vmag) = extent_of(table.records(), |r| r.f64(VMAG)) else {
        return Vec::new();
    };
    let plot = cx.frame.plot();
    let x_axis = AxisSpec::bottom(X_AXIS, ScaleLinearSpec::new((0.0, 360.0)))
        .with_tick_count(12)
        .with_title("Right Ascension (degrees)")
        .with_style(axis_style())
        .with_grid(grid());
    let y_axis = AxisSpec::left(Y_AXIS, ScaleLinearSpec::new((-90.0, 90.0)))
        .with_tick_count(6)
        .with_title("Declination (degrees)")
        .with_style(axis_style())
        .with_grid(grid());
    let (Some(x), Some(y)) = (x_axis.scale_continuous(plot), y_axis.scale_continuous(plot)) else {
        return Vec::new();
    };
    let size = ScaleSqrt::new(vmag, (7.0, 2.0));

    let mut marks = titles(
        cx.frame,
        "Celestial Sky Map",
        "Right ascension vs declination; size is brightness, color is temperature",
    );
    marks.extend(x_axis.marks(plot));
    marks.extend(y_axis.marks(plot));
    if let Some(cells) = cx.table(DENSITY) {
        marks.extend(
            ContourMarkSpec::new(DENSITY, DensityColumns::default(), x, y, ramp.clone())
                .marks(cells),
        );
    }
    let equator = y.map(0.0);
    marks.extend(
        RuleMarkSpec::horizontal(MarkId::from_raw(TITLE + 2), equator, plot.x0, plot.x1)
            .with_stroke(Color::from_rgb8(0x4a, 0x55, 0x68), 1.0)
            .with_dash(5.0, 5.0)
            .with_z_index(GRID_LINES + 1)
            .mark(),
    );
    marks.push(
        TextMarkSpec::new(
            MarkId::from_raw(TITLE + 3),
            (plot.x1 - 6.0, equator - 8.0),
            "Celestial Equator",
        )
        .with_anchor(TextAnchor::End)
        .with_font_size(10.0)
        .with_fill(css::GRAY)
        .mark(),
    );
    marks.extend(
        PointMarkSpec::new(STARS, Channel::field(RA, x), Channel::field(DEC, y))
            .with_radius(Channel::field(VMAG, size))
            .with_fill(ColorChannel::Sequential {
                col: BV,
                scale: colors.clone(),
            })
            .with_opacity(0.8)
            .marks_filtered(table, |r| cx.visible(r)),
    );
    marks
}

fn sky_map(data: &Path) -> Result<HtmlSection> {
    let frame = FrameSpec::new(900.0, 520.0).with_margin(Margin::new(70.0, 140.0, 60.0, 70.0));
    let program = Program::new().with(Transform::Density2d {
        input: STARS,
        output: DENSITY,
        x_col: RA,
        y_col: DEC,
        x_extent: (0.0, 360.0),
        y_extent: (-90.0, 90.0),
        cell_size: 5.0,
        bandwidth: 9.0,
        thresholds: 15,
        columns: DensityColumns::default(),
    });
    let colors = stars::bv_scale()?;
    let ramp = stars::density_ramp()?;
    let legend_colors = colors.clone();
    let chart = ChartInstance::new(frame, STARS)?
        .with_program(program)
        .with_series(move |cx: &RenderCtx<'_>| sky_marks(cx, &colors, &ramp));
    let legend = LegendSwatches::new(
        LEGEND,
        chart.frame().legend_origin(),
        [
            ("Blue-white", -0.3),
            ("White", 0.3),
            ("Yellow-orange", 1.1),
            ("Orange", 1.9),
        ]
        .map(|(label, bv)| LegendItem::new(label, legend_colors.map(bv))),
    )
    .with_text_fill(css::WHITE);
    let mut chart = chart.with_legend(legend);
    chart.on_hover(HoverTarget::Table(STARS), show_star, |_| {});

    let mut stage = Stage::new(chart);
    let mut section = HtmlSection::new("Sky map");
    let entered = stage.load(data);
    let reloaded = stage.load(data);
    section.note(format!(
        "Initial load entered {entered} marks; reloading the same catalog changed {reloaded}."
    ));
    stage.snapshot(&mut section, "Stars over kernel density");

    if let Some(center) = stage.star("Sirius").and_then(|id| stage.center_of(id)) {
        stage.pointer_move(center);
        stage.snapshot(&mut section, "Hovering Sirius");
    }
    Ok(section)
}

fn histogram_marks(cx: &RenderCtx<'_>) -> Vec<Mark> {
    let (Some(table), Some(bins)) = (cx.source_table(), cx.table(BINS)) else {
        return Vec::new();
    };
    let cols = BinColumns::default();
    let (Some(x_domain), Some((_, max_count))) = (
        extent_of(
            bins.records().flat_map(|r| [r.f64(cols.x0), r.f64(cols.x1)]),
            |v| v,
        ),
        extent_of(bins.records(), |r| r.f64(cols.count)),
    ) else {
        return Vec::new();
    };
    let plot = cx.frame.plot();
    let x_axis = AxisSpec::bottom(X_AXIS, ScaleLinearSpec::new(x_domain))
        .with_title("Apparent Magnitude (V)")
        .with_style(axis_style());
    let y_axis = AxisSpec::left(Y_AXIS, ScaleLinearSpec::new((0.0, max_count)).with_nice(true))
        .with_tick_count(5)
        .with_title("Number of stars")
        .with_style(axis_style())
        .with_grid(grid());
    let (Some(x), Some(y)) = (x_axis.scale_continuous(plot), y_axis.scale_continuous(plot)) else {
        return Vec::new();
    };

    let mut marks = titles(
        cx.frame,
        "Magnitude Distribution",
        "Histogram with a smoothed outline and the mean magnitude",
    );
    marks.extend(x_axis.marks(plot));
    marks.extend(y_axis.marks(plot));
    marks.extend(
        HistogramMarkSpec::new(BINS, cols, x, y)
            .with_fill(css::STEEL_BLUE)
            .with_opacity(0.8)
            .marks(bins),
    );
    let center = Channel::compute(move |r| Some(x.map(0.5 * (r.f64(cols.x0)? + r.f64(cols.x1)?))));
    marks.extend(
        AreaMarkSpec::new(X_AXIS + 0x8000, center, Channel::field(cols.count, y), y.map(0.0))
            .with_curve(Curve::Basis)
            .with_fill(css::GOLD)
            .with_opacity(0.15)
            .with_stroke(StrokeStyle::solid(css::GOLD, 1.5))
            .with_z_index(SERIES_STROKE)
            .marks(bins),
    );

    let (sum, n) = table
        .records()
        .filter_map(|r| r.finite(VMAG))
        .fold((0.0, 0_u32), |(s, n), v| (s + v, n + 1));
    if n > 0 {
        let mean = sum / f64::from(n);
        let mx = x.map(mean);
        marks.extend(
            RuleMarkSpec::vertical(MarkId::from_raw(TITLE + 2), mx, plot.y0, plot.y1)
                .with_stroke(css::TOMATO, 2.0)
                .with_dash(4.0, 4.0)
                .with_z_index(SERIES_POINTS)
                .mark(),
        );
        marks.push(
            TextMarkSpec::new(
                MarkId::from_raw(TITLE + 3),
                (mx + 4.0, plot.y0 + 12.0),
                format!("mean {mean:.2}"),
            )
            .with_font_size(11.0)
            .with_fill(css::TOMATO)
            .mark(),
        );
    }
    marks
}

fn magnitude_histogram(data: &Path) -> Result<HtmlSection> {
    let frame = FrameSpec::new(900.0, 420.0).with_margin(Margin::new(70.0, 40.0, 60.0, 70.0));
    let program = Program::new().with(Transform::Bin {
        input: STARS,
        output: BINS,
        input_col: VMAG,
        extent: None,
        thresholds: 50,
        columns: BinColumns::default(),
    });
    let chart = ChartInstance::new(frame, STARS)?
        .with_program(program)
        .with_series(histogram_marks);
    let mut stage = Stage::new(chart);
    let mut section = HtmlSection::new("Magnitude histogram");
    let entered = stage.load(data);
    section.note(format!("{entered} marks: one bar per bin, the outline, and the mean rule."));
    stage.snapshot(&mut section, "Histogram");
    Ok(section)
}

fn count_marks(cx: &RenderCtx<'_>) -> Vec<Mark> {
    let Some(counts) = cx.table(COUNTS) else {
        return Vec::new();
    };
    let max = extent_of(counts.records(), |r| r.f64(COUNT)).map_or(1.0, |(_, hi)| hi);
    let plot = cx.frame.plot();
    let x_axis = AxisSpec::bottom(
        X_AXIS,
        ScaleBandSpec::new(SPECTRAL_CLASSES.len()).with_padding(0.2, 0.1),
    )
    .with_categories(SPECTRAL_CLASSES.iter().map(char::to_string))
    .with_title("Spectral class")
    .with_style(axis_style());
    let y_axis = AxisSpec::left(Y_AXIS, ScaleLinearSpec::new((0.0, max)).with_nice(true))
        .with_tick_count(5)
        .with_title("Stars")
        .with_style(axis_style())
        .with_grid(grid());
    let (Some(band), Some(y)) = (x_axis.scale_band(plot), y_axis.scale_continuous(plot)) else {
        return Vec::new();
    };

    let mut marks = titles(cx.frame, "Spectral Classes", "Stars per main spectral class");
    marks.extend(x_axis.marks(plot));
    marks.extend(y_axis.marks(plot));
    marks.extend(
        BarMarkSpec::new(COUNTS, CLASS_INDEX, COUNT, band, y)
            .with_fill(ColorChannel::compute(|r| {
                r.f64(CLASS_INDEX)
                    .and_then(stars::class_at)
                    .map_or(stars::UNKNOWN, stars::spectral_color)
            }))
            .marks(counts),
    );
    for rec in counts.records() {
        let (Some(class), Some(count)) = (
            rec.f64(CLASS_INDEX).and_then(stars::class_at),
            rec.f64(COUNT),
        ) else {
            continue;
        };
        let Some(i) = SPECTRAL_CLASSES.iter().position(|c| *c == class) else {
            continue;
        };
        marks.push(
            TextMarkSpec::new(
                MarkId::from_raw(TITLE + 0x100 + rec.key()),
                (band.center(i), y.map(count) - 8.0),
                format!("{count:.0}"),
            )
            .with_anchor(TextAnchor::Middle)
            .with_font_size(11.0)
            .with_fill(css::WHITE)
            .mark(),
        );
    }
    marks
}

fn spectral_counts(data: &Path) -> Result<HtmlSection> {
    let frame = FrameSpec::new(600.0, 400.0).with_margin(Margin::new(70.0, 30.0, 60.0, 70.0));
    let program = Program::new().with(Transform::Aggregate {
        input: STARS,
        output: COUNTS,
        group_by: vec![CLASS_INDEX],
        fields: vec![AggregateField {
            op: AggregateOp::Count,
            input: VMAG,
            output: COUNT,
        }],
    });
    let chart = ChartInstance::new(frame, STARS)?
        .with_program(program)
        .with_series(count_marks);
    let mut stage = Stage::new(chart);
    let mut section = HtmlSection::new("Spectral classes");
    stage.load(data);
    stage.snapshot(&mut section, "Counts");
    Ok(section)
}

fn fit_marks(cx: &RenderCtx<'_>, colors: &ScaleSequential) -> Vec<Mark> {
    let Some(table) = cx.source_table() else {
        return Vec::new();
    };
    let (Some(bv), Some(vmag)) = (
        extent_of(table.records(), |r| r.f64(BV)),
        extent_of(table.records(), |r| r.f64(VMAG)),
    ) else {
        return Vec::new();
    };
    let plot = cx.frame.plot();
    let x_axis = AxisSpec::bottom(X_AXIS, ScaleLinearSpec::new(bv).with_nice(true))
        .with_title("B-V Color Index")
        .with_style(axis_style());
    let y_axis = AxisSpec::left(
        Y_AXIS,
        ScaleLinearSpec::new(vmag)
            .with_nice(true)
            .with_reversed_range(true),
    )
    .with_title("Apparent Magnitude")
    .with_style(axis_style())
    .with_grid(grid());
    let (Some(x), Some(y)) = (x_axis.scale_continuous(plot), y_axis.scale_continuous(plot)) else {
        return Vec::new();
    };

    let mut marks = titles(
        cx.frame,
        "Star Brightness vs Color",
        "Least-squares fit of magnitude on B-V",
    );
    marks.extend(x_axis.marks(plot));
    marks.extend(y_axis.marks(plot));
    marks.extend(
        PointMarkSpec::new(STARS, Channel::field(BV, x), Channel::field(VMAG, y))
            .with_radius(3.0)
            .with_fill(ColorChannel::Sequential {
                col: BV,
                scale: colors.clone(),
            })
            .with_opacity(0.8)
            .marks(table),
    );

    let cols = RegressionColumns::default();
    let Some(fit) = cx.table(FIT) else {
        return marks;
    };
    let ends: Vec<Point> = fit
        .records()
        .filter_map(|r| Some(Point::new(x.map(r.f64(cols.x)?), y.map(r.f64(cols.y)?))))
        .collect();
    if let [p0, p1] = ends[..] {
        marks.extend(
            RuleMarkSpec::new(MarkId::from_raw(TITLE + 2), p0, p1)
                .with_stroke(css::TOMATO, 2.0)
                .with_z_index(SERIES_STROKE)
                .mark(),
        );
    }
    if let Some(r) = fit.record(0) {
        let (Some(slope), Some(intercept), Some(r2)) = (
            r.f64(cols.slope),
            r.f64(cols.intercept),
            r.f64(cols.r_squared),
        ) else {
            return marks;
        };
        marks.push(
            TextMarkSpec::new(
                MarkId::from_raw(TITLE + 3),
                (plot.x0 + 10.0, plot.y0 + 14.0),
                format!("V = {slope:.2} (B-V) + {intercept:.2}, r² = {r2:.2}"),
            )
            .with_font_size(11.0)
            .with_fill(css::TOMATO)
            .mark(),
        );
    }
    marks
}

fn color_magnitude_fit(data: &Path) -> Result<HtmlSection> {
    let frame = FrameSpec::new(700.0, 460.0).with_margin(Margin::new(70.0, 40.0, 60.0, 70.0));
    let program = Program::new().with(Transform::Regression {
        input: STARS,
        output: FIT,
        x_col: BV,
        y_col: VMAG,
        columns: RegressionColumns::default(),
    });
    let colors = stars::bv_scale()?;
    let chart = ChartInstance::new(frame, STARS)?
        .with_program(program)
        .with_series(move |cx: &RenderCtx<'_>| fit_marks(cx, &colors));
    let mut stage = Stage::new(chart);
    let mut section = HtmlSection::new("Color-magnitude trend");
    stage.load(data);
    stage.snapshot(&mut section, "Scatter with fitted line");
    Ok(section)
}

fn load_error(data: &Path) -> Result<HtmlSection> {
    let mut section = HtmlSection::new("Failure handling");

    let cramped = FrameSpec::new(100.0, 100.0).with_margin(Margin::uniform(60.0));
    if let Err(err) = ChartInstance::new(cramped, STARS) {
        section.note(format!("A 100x100 chart with 60px margins is rejected: {err}."));
    }

    let missing = data.with_file_name("no_such_catalog.csv");
    let frame = FrameSpec::new(600.0, 200.0).with_margin(Margin::uniform(40.0));
    let mut stage = Stage::new(ChartInstance::new(frame, STARS)?.with_series(hr_marks));
    stage.load(&missing);
    if let LoadState::Failed(message) = stage.chart.state() {
        section.note(format!("Loading {} failed: {message}", missing.display()));
    }
    stage.snapshot(&mut section, "Inline error message");
    Ok(section)
}
