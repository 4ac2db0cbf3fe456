// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-file HTML report of SVG snapshots.

use std::fmt::Write as _;

use crate::svg::escape_xml;

/// One SVG captured at a point in a chart's lifecycle.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub(crate) caption: String,
    pub(crate) svg: String,
}

/// One chart: a heading, a few lines of commentary, and its snapshots in order.
#[derive(Debug, Default)]
pub(crate) struct HtmlSection {
    pub(crate) title: String,
    pub(crate) notes: Vec<String>,
    pub(crate) snapshots: Vec<Snapshot>,
}

impl HtmlSection {
    pub(crate) fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub(crate) fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub(crate) fn snapshot(&mut self, caption: impl Into<String>, svg: String) {
        self.snapshots.push(Snapshot {
            caption: caption.into(),
            svg,
        });
    }
}

pub(crate) fn render_report(title: &str, sections: &[HtmlSection]) -> String {
    let mut out = String::new();
    let title = escape_xml(title);
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ background: #05070f; color: #e2e8f0; font-family: sans-serif; margin: 2em; }}
section {{ margin-bottom: 3em; }}
figure {{ display: inline-block; margin: 0 1em 1em 0; vertical-align: top; }}
figcaption {{ color: #a0aec0; font-size: 0.9em; }}
</style>
</head>
<body>
<h1>{title}</h1>
"#
    );
    for section in sections {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape_xml(&section.title));
        for note in &section.notes {
            let _ = writeln!(out, "<p>{}</p>", escape_xml(note));
        }
        for snap in &section.snapshots {
            let _ = write!(
                out,
                "<figure>\n{}<figcaption>{}</figcaption>\n</figure>\n",
                snap.svg,
                escape_xml(&snap.caption)
            );
        }
        out.push_str("</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_escaped_and_ordered() {
        let mut a = HtmlSection::new("Sky <map>");
        a.note("RA & Dec");
        a.snapshot("loaded", "<svg/>".to_string());
        let b = HtmlSection::new("Histogram");
        let html = render_report("Stars", &[a, b]);
        assert!(html.contains("<h2>Sky &lt;map&gt;</h2>"));
        assert!(html.contains("<p>RA &amp; Dec</p>"));
        assert!(html.contains("<svg/><figcaption>loaded</figcaption>"));
        let sky = html.find("Sky &lt;map").unwrap();
        let hist = html.find("<h2>Histogram").unwrap();
        assert!(sky < hist);
    }
}
