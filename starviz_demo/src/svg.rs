// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG output: replays mark diffs into a retained mark set and serializes it.

use std::collections::HashMap;
use std::fmt::Write as _;

use kurbo::Rect;
use peniko::Brush;
use starviz_core::{MarkDiff, MarkId, MarkPayload, MarkShape, MarkStyle, TextAnchor, TextBaseline};

/// A retained copy of a chart's marks, kept current by [`SvgScene::apply_diffs`].
#[derive(Debug, Default)]
pub(crate) struct SvgScene {
    marks: HashMap<MarkId, (i32, MarkPayload)>,
    view_box: Option<Rect>,
    applied: usize,
}

impl SvgScene {
    pub(crate) fn new(view_box: Rect) -> Self {
        Self {
            view_box: Some(view_box),
            ..Self::default()
        }
    }

    /// Number of diffs replayed so far.
    pub(crate) fn applied(&self) -> usize {
        self.applied
    }

    pub(crate) fn apply_diffs(&mut self, diffs: &[MarkDiff]) {
        self.applied += diffs.len();
        for diff in diffs {
            match diff {
                MarkDiff::Enter {
                    id, z_index, new, ..
                } => {
                    self.marks.insert(*id, (*z_index, (**new).clone()));
                }
                MarkDiff::Update {
                    id,
                    new_z_index,
                    new,
                    ..
                } => {
                    self.marks.insert(*id, (*new_z_index, (**new).clone()));
                }
                MarkDiff::Exit { id, .. } => {
                    self.marks.remove(id);
                }
            }
        }
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let view_box = self
            .view_box
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut out = String::new();

        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        let _ = writeln!(
            out,
            r#"viewBox="{} {} {} {}" width="{}" height="{}" font-family="sans-serif">"#,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        );
        let _ = writeln!(
            out,
            r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#0b1021"/>"##,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height()
        );

        let mut marks: Vec<_> = self.marks.iter().collect();
        marks.sort_by_key(|(id, (z, _))| (*z, id.0));

        for (_, (_, payload)) in marks {
            write_mark(&mut out, payload);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn write_mark(out: &mut String, payload: &MarkPayload) {
    let style = &payload.style;
    match &payload.shape {
        MarkShape::Rect(r) => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                r.x0,
                r.y0,
                r.width(),
                r.height(),
            );
            write_style(out, style);
            out.push_str("/>\n");
        }
        MarkShape::Circle(c) => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}""#,
                c.center.x, c.center.y, c.radius
            );
            write_style(out, style);
            out.push_str("/>\n");
        }
        MarkShape::Path(p) => {
            let _ = write!(out, r#"<path d="{}""#, p.to_svg());
            write_style(out, style);
            out.push_str("/>\n");
        }
        MarkShape::Text(t) => {
            let baseline = match t.baseline {
                TextBaseline::Middle => "middle",
                TextBaseline::Alphabetic => "alphabetic",
                TextBaseline::Hanging => "hanging",
            };
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="{}""#,
                t.pos.x, t.pos.y, t.font_size, baseline
            );
            if t.angle != 0.0 {
                let _ = write!(
                    out,
                    r#" transform="rotate({} {} {})""#,
                    t.angle, t.pos.x, t.pos.y
                );
            }
            out.push_str(match t.anchor {
                TextAnchor::Start => r#" text-anchor="start""#,
                TextAnchor::Middle => r#" text-anchor="middle""#,
                TextAnchor::End => r#" text-anchor="end""#,
            });
            write_paint_attr(out, "fill", &style.fill);
            write_opacity(out, style.opacity);
            out.push('>');
            let mut lines = t.text.split('\n');
            if let Some(first) = lines.next() {
                out.push_str(&escape_xml(first));
            }
            for line in lines {
                let _ = write!(
                    out,
                    r#"<tspan x="{}" dy="1.2em">{}</tspan>"#,
                    t.pos.x,
                    escape_xml(line)
                );
            }
            out.push_str("</text>\n");
        }
    }
}

fn write_style(out: &mut String, style: &MarkStyle) {
    write_paint_attr(out, "fill", &style.fill);
    if style.stroke_width > 0.0 {
        write_paint_attr(out, "stroke", &style.stroke);
        let _ = write!(out, r#" stroke-width="{}""#, style.stroke_width);
        if let Some((dash, gap)) = style.dash {
            let _ = write!(out, r#" stroke-dasharray="{dash} {gap}""#);
        }
    }
    write_opacity(out, style.opacity);
}

fn write_opacity(out: &mut String, opacity: f64) {
    if opacity < 1.0 {
        let _ = write!(out, r#" opacity="{opacity}""#);
    }
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let fill_opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, fill_opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use peniko::color::palette::css;
    use starviz_core::{Mark, Scene};

    use super::*;

    #[test]
    fn replays_enters_and_exits() {
        let mut scene = Scene::new();
        let mut svg = SvgScene::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let star = Mark::builder(MarkId(1))
            .circle(Point::new(10.0, 10.0), 3.0)
            .fill(css::WHITE)
            .opacity(0.7)
            .build();
        svg.apply_diffs(&scene.tick(vec![star]));
        let s = svg.to_svg_string();
        assert!(s.contains(r##"<circle cx="10" cy="10" r="3" fill="#ffffff" opacity="0.7"/>"##), "{s}");

        svg.apply_diffs(&scene.tick(Vec::new()));
        assert!(!svg.to_svg_string().contains("<circle"));
        assert_eq!(svg.applied(), 2);
    }

    #[test]
    fn multiline_text_uses_tspans() {
        let mut scene = Scene::new();
        let mut svg = SvgScene::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let tip = Mark::builder(MarkId(2))
            .text((5.0, 5.0), "Sirius\nA1V & bright")
            .build();
        svg.apply_diffs(&scene.tick(vec![tip]));
        let s = svg.to_svg_string();
        assert!(s.contains(r#">Sirius<tspan x="5" dy="1.2em">A1V &amp; bright</tspan></text>"#), "{s}");
    }
}
