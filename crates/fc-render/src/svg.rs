//! Flowchart → SVG markup.
//!
//! Pure presentation: reads the graph and the viewport, never mutates
//! anything. The `viewBox` is the viewport's logical rectangle, so the host
//! only has to drop the string into the page.
//!
//! Paint order matches hit testing: edges, then the rubber band, then nodes
//! with their connector handles.

use crate::hit::{HitTolerance, edge_segment};
use fc_core::{EdgeId, FlowGraph, FlowNode, Line, Viewport};
use std::fmt::Write;

pub const EDGE_COLOR: &str = "#6366f1";
pub const SELECTED_EDGE_COLOR: &str = "#f472b6";
pub const RUBBER_BAND_COLOR: &str = "#a78bfa";
pub const CONNECTOR_COLOR: &str = "#cbd5e1";

/// Longest label line, in characters, before wrapping kicks in.
const WRAP_WIDTH: usize = 20;

/// Transient state drawn on top of the model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlay {
    pub selected_edge: Option<EdgeId>,
    /// Line from the connector being dragged to the pointer.
    pub rubber_band: Option<Line>,
    /// Handle radius and edge band, so what is drawn matches what hits.
    pub tolerance: HitTolerance,
}

/// Render the whole canvas.
pub fn render_svg(graph: &FlowGraph, viewport: &Viewport, overlay: &Overlay) -> String {
    let mut out = String::with_capacity(512 + graph.node_count() * 512);
    let surface = viewport.surface();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        num(surface.width),
        num(surface.height),
        num(viewport.x),
        num(viewport.y),
        num(viewport.width),
        num(viewport.height),
    );
    out.push('\n');
    write_defs(&mut out);

    for edge in graph.edges() {
        let Some(line) = edge_segment(graph, edge) else {
            continue;
        };
        let selected = overlay.selected_edge == Some(edge.id);
        let (color, width, marker) = if selected {
            (SELECTED_EDGE_COLOR, 3, "arrowhead-selected")
        } else {
            (EDGE_COLOR, 2, "arrowhead")
        };
        let _ = writeln!(
            out,
            r#"  <g class="edge" data-id="{}">"#,
            escape(edge.id.as_str())
        );
        let _ = writeln!(
            out,
            r#"    <path d="{}" stroke="transparent" stroke-width="{}" fill="none"/>"#,
            path_data(line),
            num(overlay.tolerance.edge_band * 2.0)
        );
        let _ = writeln!(
            out,
            r#"    <path d="{}" stroke="{color}" stroke-width="{width}" fill="none" marker-end="url(#{marker})"/>"#,
            path_data(line)
        );
        if let Some(label) = &edge.label {
            let mid = line.p0.midpoint(line.p1);
            let _ = writeln!(
                out,
                r#"    <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-size="12" fill="white">{}</text>"#,
                num(mid.x),
                num(mid.y),
                escape(label)
            );
        }
        out.push_str("  </g>\n");
    }

    if let Some(band) = overlay.rubber_band {
        let _ = writeln!(
            out,
            r#"  <path d="{}" stroke="{RUBBER_BAND_COLOR}" stroke-width="2" stroke-dasharray="5,5" fill="none"/>"#,
            path_data(band)
        );
    }

    for node in graph.nodes() {
        write_node(&mut out, node, overlay.tolerance.connector_radius);
    }

    out.push_str("</svg>\n");
    out
}

fn write_defs(out: &mut String) {
    out.push_str("  <defs>\n");
    for (id, color) in [
        ("arrowhead", EDGE_COLOR),
        ("arrowhead-selected", SELECTED_EDGE_COLOR),
    ] {
        let _ = writeln!(
            out,
            r#"    <marker id="{id}" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{color}"/></marker>"#
        );
    }
    out.push_str("  </defs>\n");
}

fn write_node(out: &mut String, node: &FlowNode, connector_radius: f64) {
    let style = node.kind.style();
    let b = node.bounds();
    let _ = writeln!(
        out,
        r#"  <g class="node {}" data-id="{}">"#,
        node.kind.as_str(),
        escape(node.id.as_str())
    );
    let _ = writeln!(
        out,
        r##"    <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="#9ca3af" stroke-width="2"/>"##,
        num(b.x0),
        num(b.y0),
        num(b.width()),
        num(b.height()),
        num(style.corner_radius),
        style.fill
    );

    let lines = wrap_label(&node.label);
    if !lines.is_empty() {
        let c = node.center();
        // Centre the block of lines vertically on the node.
        let line_height = 16.0;
        let first_y = c.y - line_height * (lines.len() as f64 - 1.0) / 2.0;
        let _ = write!(
            out,
            r#"    <text x="{}" text-anchor="middle" dominant-baseline="middle" font-size="14" font-weight="600" fill="white">"#,
            num(c.x)
        );
        for (i, line) in lines.iter().enumerate() {
            let _ = write!(
                out,
                r#"<tspan x="{}" y="{}">{}</tspan>"#,
                num(c.x),
                num(first_y + line_height * i as f64),
                escape(line)
            );
        }
        out.push_str("</text>\n");
    }

    for (_, p) in node.connectors() {
        let _ = writeln!(
            out,
            r#"    <circle class="connector" cx="{}" cy="{}" r="{}" fill="{CONNECTOR_COLOR}"/>"#,
            num(p.x),
            num(p.y),
            num(connector_radius)
        );
    }
    out.push_str("  </g>\n");
}

/// Greedy word wrap: a word joins the current line while the line plus the
/// word stays under [`WRAP_WIDTH`] characters. Empty lines are dropped.
pub fn wrap_label(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        if current.chars().count() + word.chars().count() < WRAP_WIDTH {
            current.push(' ');
            current.push_str(word);
        } else {
            push_trimmed(&mut lines, &current);
            current = word.to_string();
        }
    }
    push_trimmed(&mut lines, &current);
    lines
}

fn push_trimmed(lines: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}

fn path_data(line: Line) -> String {
    format!(
        "M {},{} L {},{}",
        num(line.p0.x),
        num(line.p0.y),
        num(line.p1.x),
        num(line.p1.y)
    )
}

/// Format a coordinate without trailing `.0` noise.
fn num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
