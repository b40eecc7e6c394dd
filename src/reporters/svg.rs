//! SVG radar chart reporter
//!
//! Draws one axis per category, counter-clockwise from three o'clock, with
//! concentric rings at 0.2 steps. The score polygon is coloured by the
//! overall score band. Output is a standalone SVG document.

use crate::models::{Category, ComplianceReport};
use anyhow::Result;
use std::f64::consts::PI;

const SIZE: f64 = 640.0;
const CENTER_X: f64 = SIZE / 2.0;
const CENTER_Y: f64 = SIZE / 2.0 + 20.0;
const RADIUS: f64 = 220.0;
const RINGS: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];
/// Values at or below this get no label
const LABEL_MIN: f64 = 0.05;
/// Radial offset of value labels beyond their vertex
const LABEL_OFFSET: f64 = 0.08;
/// Radial position of axis labels
const AXIS_LABEL_RADIUS: f64 = 1.2;

/// Render the report as a radar chart
pub fn render(report: &ComplianceReport) -> Result<String> {
    let values: Vec<f64> = report.category_scores().iter().map(|s| s.value).collect();
    let color = band_color(report.overall);
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{height}" viewBox="0 0 {size} {height}" font-family="Helvetica, Arial, sans-serif">
<rect width="100%" height="100%" fill="white"/>
<text x="{cx}" y="36" text-anchor="middle" font-size="20" font-weight="bold">Reproducibility Assessment ({pct:.1}%)</text>
"#,
        size = SIZE,
        height = SIZE + 40.0,
        cx = CENTER_X,
        pct = report.overall * 100.0
    ));

    svg.push_str(&render_grid());
    svg.push_str(&render_axis_labels());
    svg.push_str(&render_polygon(&values, color));
    svg.push_str(&render_value_labels(&values));

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Polygon colour for an overall score
pub fn band_color(overall: f64) -> &'static str {
    if overall >= 0.8 {
        "#2ecc71" // Green
    } else if overall >= 0.6 {
        "#f39c12" // Orange
    } else if overall >= 0.4 {
        "#e74c3c" // Red
    } else {
        "#95a5a6" // Gray
    }
}

fn angle(index: usize) -> f64 {
    2.0 * PI * index as f64 / Category::ALL.len() as f64
}

/// Screen coordinates of radius `r` (in score units) on axis `index`
fn point(index: usize, r: f64) -> (f64, f64) {
    let theta = angle(index);
    (
        CENTER_X + r * RADIUS * theta.cos(),
        CENTER_Y - r * RADIUS * theta.sin(),
    )
}

fn render_grid() -> String {
    let mut svg = String::from("<g stroke=\"#cccccc\" fill=\"none\">\n");
    for ring in RINGS {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\"/>\n",
            CENTER_X,
            CENTER_Y,
            ring * RADIUS
        ));
    }
    for i in 0..Category::ALL.len() {
        let (x, y) = point(i, 1.0);
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>\n",
            CENTER_X, CENTER_Y, x, y
        ));
    }
    svg.push_str("</g>\n");

    svg.push_str("<g font-size=\"10\" fill=\"#888888\">\n");
    for ring in RINGS {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\">{:.1}</text>\n",
            CENTER_X + 3.0,
            CENTER_Y - ring * RADIUS - 2.0,
            ring
        ));
    }
    svg.push_str("</g>\n");
    svg
}

fn render_axis_labels() -> String {
    let mut svg = String::from("<g font-size=\"13\" font-weight=\"bold\" fill=\"#333333\">\n");
    for (i, category) in Category::ALL.iter().enumerate() {
        let (x, y) = point(i, AXIS_LABEL_RADIUS);
        let cos = angle(i).cos();
        let anchor = if cos > 0.1 {
            "start"
        } else if cos < -0.1 {
            "end"
        } else {
            "middle"
        };
        let lines: Vec<&str> = category
            .axis_label()
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect();
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\">",
            x,
            y - 7.0 * (lines.len() as f64 - 1.0),
            anchor
        ));
        for (n, line) in lines.iter().enumerate() {
            let dy = if n == 0 { "0" } else { "1.1em" };
            svg.push_str(&format!(
                "<tspan x=\"{:.2}\" dy=\"{}\">{}</tspan>",
                x,
                dy,
                xml_escape(line)
            ));
        }
        svg.push_str("</text>\n");
    }
    svg.push_str("</g>\n");
    svg
}

fn render_polygon(values: &[f64], color: &str) -> String {
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let (x, y) = point(i, *v);
            format!("{:.2},{:.2}", x, y)
        })
        .collect();

    let mut svg = format!(
        "<polygon points=\"{}\" fill=\"{color}\" fill-opacity=\"0.25\" stroke=\"{color}\" stroke-width=\"3\"/>\n",
        points.join(" ")
    );
    for (i, v) in values.iter().enumerate() {
        let (x, y) = point(i, *v);
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"4\" fill=\"{color}\"/>\n",
            x, y
        ));
    }
    svg
}

fn render_value_labels(values: &[f64]) -> String {
    let mut svg = String::from("<g font-size=\"11\" font-weight=\"bold\" text-anchor=\"middle\">\n");
    for (i, v) in values.iter().enumerate() {
        if *v <= LABEL_MIN {
            continue;
        }
        let (x, y) = point(i, v + LABEL_OFFSET);
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\">{:.2}</text>\n",
            x, y, v
        ));
    }
    svg.push_str("</g>\n");
    svg
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
