//! Hit testing: logical point → what is under it.
//!
//! Paint order is edges first, then nodes in graph order, each node drawn
//! with its connector handles on top of its body. Hit testing walks that
//! order back to front, so the topmost thing under the pointer wins.

use fc_core::{EdgeId, FlowEdge, FlowGraph, FlowNode, NodeId};
use kurbo::{Line, ParamCurveNearest, Point};

/// Radii used to decide what counts as "on" a handle or an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    /// Connector handles are circles of this radius (logical units).
    pub connector_radius: f64,
    /// Half-width of the clickable band around an edge's segment.
    pub edge_band: f64,
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            connector_radius: 6.0,
            edge_band: 7.5,
        }
    }
}

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    /// A connector handle of `node`; `anchor` is the handle's centre.
    Connector { node: NodeId, anchor: Point },
    /// A node body.
    Node(NodeId),
    /// The tolerance band around an edge.
    Edge(EdgeId),
    /// Empty canvas.
    Background,
}

/// Classify a logical point.
pub fn hit_test(graph: &FlowGraph, p: Point, tolerance: &HitTolerance) -> Hit {
    let nodes: Vec<&FlowNode> = graph.nodes().collect();
    for node in nodes.iter().rev() {
        if let Some(anchor) = connector_at(node, p, tolerance.connector_radius) {
            return Hit::Connector {
                node: node.id,
                anchor,
            };
        }
        if node.bounds().contains(p) {
            return Hit::Node(node.id);
        }
    }
    match hit_edge(graph, p, tolerance.edge_band) {
        Some(id) => Hit::Edge(id),
        None => Hit::Background,
    }
}

/// Topmost node whose body contains `p`. Connector handles are ignored.
pub fn hit_node(graph: &FlowGraph, p: Point) -> Option<NodeId> {
    let nodes: Vec<&FlowNode> = graph.nodes().collect();
    nodes
        .iter()
        .rev()
        .find(|node| node.bounds().contains(p))
        .map(|node| node.id)
}

/// Topmost edge whose band contains `p`.
pub fn hit_edge(graph: &FlowGraph, p: Point, band: f64) -> Option<EdgeId> {
    let band_sq = band * band;
    let edges: Vec<&FlowEdge> = graph.edges().collect();
    edges
        .iter()
        .rev()
        .find(|edge| {
            edge_segment(graph, edge)
                .is_some_and(|line| line.nearest(p, 1e-6).distance_sq <= band_sq)
        })
        .map(|edge| edge.id)
}

/// The drawn segment of an edge: centre of source to centre of target.
/// `None` if either endpoint is gone.
pub fn edge_segment(graph: &FlowGraph, edge: &FlowEdge) -> Option<Line> {
    let source = graph.node(edge.source)?;
    let target = graph.node(edge.target)?;
    Some(Line::new(source.center(), target.center()))
}

fn connector_at(node: &FlowNode, p: Point, radius: f64) -> Option<Point> {
    node.connectors()
        .into_iter()
        .map(|(_, anchor)| anchor)
        .find(|anchor| anchor.distance(p) <= radius)
}
