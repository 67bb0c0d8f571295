use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Write;

use super::traits::ChartRenderer;
use crate::errors::CoreError;
use crate::models::chart::{EncodedChart, PieChart};

pub const SVG_MIME_TYPE: &str = "image/svg+xml";

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const RADIUS: f64 = 200.0;
const CENTER_X: f64 = WIDTH / 2.0;
const CENTER_Y: f64 = HEIGHT / 2.0 + 20.0;
const START_ANGLE_DEG: f64 = 90.0;
const EXPLODE_FRACTION: f64 = 0.1;

const BACKGROUND: &str = "#1F2937";
const TEXT_COLOR: &str = "white";
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Dark-themed SVG pie charts, base64 encoded.
///
/// Wedges start at twelve o'clock and run counter-clockwise; each carries a
/// one-decimal percent label, and exploded wedges are pulled out by a tenth
/// of the radius.
#[derive(Debug, Clone, Default)]
pub struct SvgPieRenderer;

impl SvgPieRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the chart as an SVG document.
    pub fn to_svg(&self, chart: &PieChart) -> Result<String, CoreError> {
        let total = chart.total();
        if !(total.is_finite() && total > 0.0) {
            return Err(CoreError::Render(format!(
                "chart '{}' has no positive total",
                chart.title
            )));
        }

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        );
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{BACKGROUND}"/>"#
        );
        let _ = write!(
            svg,
            r#"<text x="{CENTER_X}" y="50" fill="{TEXT_COLOR}" font-family="sans-serif" font-size="20" text-anchor="middle">{}</text>"#,
            escape_xml(&chart.title)
        );

        let mut start = START_ANGLE_DEG;
        for (idx, slice) in chart.slices.iter().enumerate() {
            let fraction = slice.amount / total;
            let sweep = fraction * 360.0;
            let mid = (start + sweep / 2.0).to_radians();
            let color = PALETTE[idx % PALETTE.len()];

            let (cx, cy) = if slice.exploded {
                polar(CENTER_X, CENTER_Y, RADIUS * EXPLODE_FRACTION, mid)
            } else {
                (CENTER_X, CENTER_Y)
            };

            if fraction >= 0.999_999 {
                let _ = write!(
                    svg,
                    r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{RADIUS}" fill="{color}"/>"#
                );
            } else {
                let (x0, y0) = polar(cx, cy, RADIUS, start.to_radians());
                let (x1, y1) = polar(cx, cy, RADIUS, (start + sweep).to_radians());
                let large_arc = u8::from(sweep > 180.0);
                // sweep-flag 0: counter-clockwise on screen
                let _ = write!(
                    svg,
                    r#"<path d="M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {RADIUS} {RADIUS} 0 {large_arc} 0 {x1:.2} {y1:.2} Z" fill="{color}"/>"#
                );
            }

            let (lx, ly) = polar(cx, cy, RADIUS * 1.1, mid);
            let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
            let _ = write!(
                svg,
                r#"<text x="{lx:.2}" y="{ly:.2}" fill="{TEXT_COLOR}" font-family="sans-serif" font-size="13" text-anchor="{anchor}">{}</text>"#,
                escape_xml(&slice.label)
            );

            let (px, py) = polar(cx, cy, RADIUS * 0.6, mid);
            let _ = write!(
                svg,
                r#"<text x="{px:.2}" y="{py:.2}" fill="{TEXT_COLOR}" font-family="sans-serif" font-size="12" text-anchor="middle">{:.1}%</text>"#,
                slice.percent
            );

            start += sweep;
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

impl ChartRenderer for SvgPieRenderer {
    fn render(&self, chart: &PieChart) -> Result<EncodedChart, CoreError> {
        let svg = self.to_svg(chart)?;
        Ok(EncodedChart {
            mime_type: SVG_MIME_TYPE.to_string(),
            data: STANDARD.encode(svg.as_bytes()),
        })
    }
}

/// Point at `angle` radians (counter-clockwise from three o'clock) in SVG's
/// y-down coordinate space.
fn polar(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy - r * angle.sin())
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
