//! Wire schema shared with the generation service.
//!
//! Node shape: `{"id", "type", "text", "position": {"x", "y"}}` with integer
//! coordinates. A generation reply is `{"nodes": [...]}`; a layout reply is a
//! bare array of nodes; a graph snapshot is `{"nodes": [...], "edges": [...]}`.
//! Parsing is strict: a reply that does not match its shape is rejected as a
//! whole.

use crate::id::NodeId;
use crate::model::{FlowGraph, FlowNode, NodeKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Reasons an adapter reply was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("reply does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("node at index {0} has an empty id")]
    EmptyId(usize),
    #[error("node id `{0}` appears more than once")]
    DuplicateId(String),
}

/// Integer position on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: i64,
    pub y: i64,
}

impl WirePoint {
    /// Round a logical point to the integer grid.
    pub fn from_point(p: Point) -> Self {
        Self {
            x: p.x.round() as i64,
            y: p.y.round() as i64,
        }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub text: String,
    pub position: WirePoint,
}

impl WireNode {
    pub fn from_node(node: &FlowNode) -> Self {
        Self {
            id: node.id.as_str().to_string(),
            kind: node.kind,
            text: node.label.clone(),
            position: WirePoint::from_point(node.position),
        }
    }

    pub fn into_node(self) -> FlowNode {
        FlowNode::new(
            NodeId::intern(&self.id),
            self.kind,
            self.text,
            self.position.to_point(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Reply to a description → flowchart request.
#[derive(Debug, Clone, Deserialize)]
struct GenerationReply {
    nodes: Vec<WireNode>,
}

/// One entry of a layout reply. Only `id` and `position` are used; the rest
/// must be present but is not trusted.
#[derive(Debug, Clone, Deserialize)]
struct LayoutEntry {
    id: String,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    #[allow(dead_code)]
    text: String,
    position: WirePoint,
}

/// A position update from a relayout reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutUpdate {
    pub id: NodeId,
    pub position: Point,
}

/// Full graph snapshot sent with a relayout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<WireNode>,
    pub edges: Vec<WireEdge>,
}

impl GraphSnapshot {
    pub fn capture(graph: &FlowGraph) -> Self {
        Self {
            nodes: graph.nodes().map(WireNode::from_node).collect(),
            edges: graph
                .edges()
                .map(|e| WireEdge {
                    id: e.id.as_str().to_string(),
                    source: e.source.as_str().to_string(),
                    target: e.target.as_str().to_string(),
                    label: e.label.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse and validate a generation reply into nodes, in reply order.
pub fn parse_generated_nodes(json: &str) -> Result<Vec<FlowNode>, SchemaError> {
    let reply: GenerationReply = serde_json::from_str(json)?;
    validate_generated(reply.nodes)
}

/// Validate already-decoded wire nodes (ids non-empty and unique).
pub fn validate_generated(nodes: Vec<WireNode>) -> Result<Vec<FlowNode>, SchemaError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if node.id.trim().is_empty() {
            return Err(SchemaError::EmptyId(i));
        }
        if !seen.insert(node.id.as_str()) {
            return Err(SchemaError::DuplicateId(node.id.clone()));
        }
    }
    Ok(nodes.into_iter().map(WireNode::into_node).collect())
}

/// Parse a layout reply into position updates.
///
/// Unknown or repeated ids are not an error here; the merge decides what to
/// do with them.
pub fn parse_layout(json: &str) -> Result<Vec<LayoutUpdate>, SchemaError> {
    let entries: Vec<LayoutEntry> = serde_json::from_str(json)?;
    let mut updates = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        if entry.id.trim().is_empty() {
            return Err(SchemaError::EmptyId(i));
        }
        updates.push(LayoutUpdate {
            id: NodeId::intern(&entry.id),
            position: entry.position.to_point(),
        });
    }
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_generation_reply() {
        let json = r#"{"nodes":[
            {"id":"n1","type":"creative","text":"Login","position":{"x":0,"y":0}},
            {"id":"n2","type":"general_affairs","text":"Dashboard","position":{"x":200,"y":0}}
        ]}"#;
        let nodes = parse_generated_nodes(json).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, NodeId::intern("n1"));
        assert_eq!(nodes[0].kind, NodeKind::Creative);
        assert_eq!(nodes[1].label, "Dashboard");
        assert_eq!(nodes[1].position, Point::new(200.0, 0.0));
    }

    #[test]
    fn rejects_malformed_generation_replies() {
        let cases = [
            // missing nodes
            r#"{}"#,
            // unknown kind
            r#"{"nodes":[{"id":"a","type":"decision","text":"x","position":{"x":0,"y":0}}]}"#,
            // missing position
            r#"{"nodes":[{"id":"a","type":"creative","text":"x"}]}"#,
            // fractional coordinate
            r#"{"nodes":[{"id":"a","type":"creative","text":"x","position":{"x":0.5,"y":0}}]}"#,
            // not JSON
            "nodes: []",
        ];
        for json in cases {
            assert!(
                matches!(parse_generated_nodes(json), Err(SchemaError::Shape(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn rejects_empty_and_duplicate_ids() {
        let empty = r#"{"nodes":[{"id":" ","type":"creative","text":"x","position":{"x":0,"y":0}}]}"#;
        assert!(matches!(
            parse_generated_nodes(empty),
            Err(SchemaError::EmptyId(0))
        ));

        let dup = r#"{"nodes":[
            {"id":"a","type":"creative","text":"x","position":{"x":0,"y":0}},
            {"id":"a","type":"creative","text":"y","position":{"x":1,"y":1}}
        ]}"#;
        match parse_generated_nodes(dup) {
            Err(SchemaError::DuplicateId(id)) => assert_eq!(id, "a"),
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn layout_reply_accepts_any_type_string() {
        let json = r#"[
            {"id":"A","type":"whatever","text":"t","position":{"x":10,"y":20}},
            {"id":"D","type":"creative","text":"t","position":{"x":1,"y":2}}
        ]"#;
        let updates = parse_layout(json).unwrap();
        assert_eq!(
            updates,
            vec![
                LayoutUpdate {
                    id: NodeId::intern("A"),
                    position: Point::new(10.0, 20.0)
                },
                LayoutUpdate {
                    id: NodeId::intern("D"),
                    position: Point::new(1.0, 2.0)
                },
            ]
        );
        assert!(parse_layout(r#"{"nodes":[]}"#).is_err());
        assert!(parse_layout(r#"[{"id":"A","position":{"x":1,"y":2}}]"#).is_err());
    }

    #[test]
    fn snapshot_rounds_positions_and_omits_missing_labels() {
        let mut g = FlowGraph::new();
        let a = g.add_node(NodeKind::Creative, Point::new(10.4, 19.6), "A");
        let b = g.add_node(NodeKind::GeneralAffairs, Point::new(-3.5, 0.0), "B");
        g.add_edge(a, b, None).unwrap();

        let snap = GraphSnapshot::capture(&g);
        assert_eq!(snap.nodes[0].position, WirePoint { x: 10, y: 20 });
        assert_eq!(snap.nodes[1].position, WirePoint { x: -4, y: 0 });
        assert_eq!(snap.edges[0].source, a.as_str());

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"type\": \"general_affairs\""));
        assert!(!json.contains("label"));
    }
}
