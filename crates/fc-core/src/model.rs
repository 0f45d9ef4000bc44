//! Core flowchart data model.
//!
//! A flowchart is a directed graph: nodes are typed boxes placed on an
//! unbounded logical plane, edges are labeled connections between them.
//! The graph owns every node and edge record; everything else refers to them
//! by id, and every lookup tolerates the id having gone away.
//!
//! Invariants held by [`FlowGraph`] after every operation:
//!
//! - node ids and edge ids are unique;
//! - every edge's source and target are existing nodes;
//! - no two edges share the same ordered (source, target) pair;
//! - no edge connects a node to itself.

use crate::id::{EdgeId, NodeId};
use kurbo::{Point, Rect, Vec2};
use petgraph::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The closed set of node kinds. Wire names are snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Brainstorming, design, strategy.
    Creative,
    /// Administration, logistics, procedures.
    GeneralAffairs,
}

/// Per-kind dimensions and paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStyle {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub fill: &'static str,
    /// Label given to nodes added from the toolbar.
    pub default_label: &'static str,
}

const CREATIVE_STYLE: KindStyle = KindStyle {
    width: 150.0,
    height: 70.0,
    corner_radius: 8.0,
    fill: "#a855f7",
    default_label: "Creative task",
};

const GENERAL_AFFAIRS_STYLE: KindStyle = KindStyle {
    width: 150.0,
    height: 70.0,
    corner_radius: 8.0,
    fill: "#3b82f6",
    default_label: "General affairs task",
};

impl NodeKind {
    pub const ALL: [NodeKind; 2] = [NodeKind::Creative, NodeKind::GeneralAffairs];

    /// Dimension/style lookup.
    pub fn style(self) -> &'static KindStyle {
        match self {
            NodeKind::Creative => &CREATIVE_STYLE,
            NodeKind::GeneralAffairs => &GENERAL_AFFAIRS_STYLE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Creative => "creative",
            NodeKind::GeneralAffairs => "general_affairs",
        }
    }

    /// Parse a wire name (`"creative"`, `"general_affairs"`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Which side of a node a connector handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl ConnectorSide {
    pub const ALL: [ConnectorSide; 4] = [
        ConnectorSide::Top,
        ConnectorSide::Bottom,
        ConnectorSide::Left,
        ConnectorSide::Right,
    ];
}

/// A node in the flowchart.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    /// Top-left corner in logical coordinates.
    pub position: Point,
}

impl FlowNode {
    pub fn new(id: NodeId, kind: NodeKind, label: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            position,
        }
    }

    /// Body rectangle in logical coordinates.
    pub fn bounds(&self) -> Rect {
        let style = self.kind.style();
        Rect::from_origin_size(self.position, (style.width, style.height))
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Logical position of a connector handle (midpoint of a side).
    pub fn connector(&self, side: ConnectorSide) -> Point {
        let b = self.bounds();
        let c = b.center();
        match side {
            ConnectorSide::Top => Point::new(c.x, b.y0),
            ConnectorSide::Bottom => Point::new(c.x, b.y1),
            ConnectorSide::Left => Point::new(b.x0, c.y),
            ConnectorSide::Right => Point::new(b.x1, c.y),
        }
    }

    /// All four connector handles, in `ConnectorSide::ALL` order.
    pub fn connectors(&self) -> [(ConnectorSide, Point); 4] {
        ConnectorSide::ALL.map(|side| (side, self.connector(side)))
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A directed, optionally labeled connection.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub label: Option<String>,
}

/// Why `add_edge` refused to create an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRejection {
    MissingSource,
    MissingTarget,
    SelfLoop,
    /// An edge with the same ordered (source, target) pair exists.
    Duplicate(EdgeId),
}

/// Drop `idx` from an insertion-order list, keeping the rest in order.
fn forget<T: PartialEq>(order: &mut Vec<T>, idx: T) {
    if let Some(pos) = order.iter().position(|i| *i == idx) {
        order.remove(pos);
    }
}

// ─── Graph ───────────────────────────────────────────────────────────────

/// The node and edge store.
///
/// Backed by a `StableDiGraph` so indices survive removals; the id maps are
/// kept in lockstep with it by every mutating method. The graph reuses
/// freed slots, so insertion order is tracked separately.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    graph: StableDiGraph<FlowNode, FlowEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    node_order: Vec<NodeIndex>,
    edge_order: Vec<EdgeIndex>,
}

impl FlowGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&FlowEdge> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    /// Nodes in insertion order, which is paint order: the most recently
    /// added node is drawn on top.
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> + '_ {
        self.node_order.iter().map(move |idx| &self.graph[*idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.edge_order.iter().map(move |idx| &self.graph[*idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// The edge running from `source` to `target`, if any. Direction matters.
    pub fn edge_between(&self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        let s = self.node_index.get(&source)?;
        let t = self.node_index.get(&target)?;
        self.graph.find_edge(*s, *t).map(|e| self.graph[e].id)
    }

    /// Every edge that has `id` as source or target.
    pub fn edges_touching(&self, id: NodeId) -> Vec<EdgeId> {
        self.incident_edges(id)
            .into_iter()
            .map(|e| self.graph[e].id)
            .collect()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Create a node with a freshly minted id.
    pub fn add_node(&mut self, kind: NodeKind, position: Point, label: impl Into<String>) -> NodeId {
        // Minted ids can collide with ids the generation service chose.
        let id = loop {
            let candidate = NodeId::with_prefix("node");
            if !self.node_index.contains_key(&candidate) {
                break candidate;
            }
        };
        self.insert_index(FlowNode::new(id, kind, label, position));
        log::debug!("added {kind:?} node {id} at ({}, {})", position.x, position.y);
        id
    }

    /// Insert a node that already carries its id.
    /// Returns `false` (and leaves the graph untouched) if the id is taken.
    pub fn insert_node(&mut self, node: FlowNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            log::trace!("insert_node: id {} already present", node.id);
            return false;
        }
        self.insert_index(node);
        true
    }

    fn insert_index(&mut self, node: FlowNode) {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.push(idx);
    }

    /// Connect `source` → `target`.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        label: Option<String>,
    ) -> Result<EdgeId, EdgeRejection> {
        let s = *self
            .node_index
            .get(&source)
            .ok_or(EdgeRejection::MissingSource)?;
        let t = *self
            .node_index
            .get(&target)
            .ok_or(EdgeRejection::MissingTarget)?;
        if s == t {
            return Err(EdgeRejection::SelfLoop);
        }
        if let Some(existing) = self.graph.find_edge(s, t) {
            return Err(EdgeRejection::Duplicate(self.graph[existing].id));
        }

        let id = loop {
            let candidate = EdgeId::with_prefix(&format!("edge_{source}_{target}"));
            if !self.edge_index.contains_key(&candidate) {
                break candidate;
            }
        };
        let label = label.filter(|l| !l.trim().is_empty());
        let idx = self.graph.add_edge(
            s,
            t,
            FlowEdge {
                id,
                source,
                target,
                label,
            },
        );
        self.edge_index.insert(id, idx);
        self.edge_order.push(idx);
        log::debug!("connected {source} -> {target} as {id}");
        Ok(id)
    }

    /// Move a node's top-left corner. Returns `true` if the node exists.
    pub fn update_node_position(&mut self, id: NodeId, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn update_node_label(&mut self, id: NodeId, label: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Set an edge label. Blank text clears it.
    pub fn update_edge_label(&mut self, id: EdgeId, label: impl Into<String>) -> bool {
        let Some(idx) = self.edge_index.get(&id).copied() else {
            log::trace!("update_edge_label: no edge {id}");
            return false;
        };
        let label = label.into();
        self.graph[idx].label = if label.trim().is_empty() {
            None
        } else {
            Some(label)
        };
        true
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<FlowEdge> {
        let idx = self.edge_index.remove(&id)?;
        forget(&mut self.edge_order, idx);
        let removed = self.graph.remove_edge(idx);
        if removed.is_some() {
            log::debug!("removed edge {id}");
        }
        removed
    }

    /// Remove a node together with every edge that references it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<FlowNode> {
        let incident = self.incident_edges(id);
        let idx = self.node_index.remove(&id)?;
        for e in incident {
            if let Some(edge) = self.graph.remove_edge(e) {
                self.edge_index.remove(&edge.id);
                forget(&mut self.edge_order, e);
            }
        }
        forget(&mut self.node_order, idx);
        let removed = self.graph.remove_node(idx);
        log::debug!("removed node {id}");
        removed
    }

    /// Replace the whole node set. Every edge is dropped.
    ///
    /// The replacement is atomic: if `nodes` contains a repeated id the graph
    /// is left as it was and the offending id is returned.
    pub fn replace_nodes(&mut self, nodes: Vec<FlowNode>) -> Result<(), NodeId> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id) {
                return Err(node.id);
            }
        }
        self.clear();
        for node in nodes {
            self.insert_index(node);
        }
        Ok(())
    }

    /// Defensive position merge: each update whose id is a current node
    /// moves that node; unknown ids are skipped; nodes without an update keep
    /// their position. Returns how many nodes moved.
    pub fn apply_positions(&mut self, updates: impl IntoIterator<Item = (NodeId, Point)>) -> usize {
        let mut applied = 0;
        for (id, position) in updates {
            if self.update_node_position(id, position) {
                applied += 1;
            } else {
                log::trace!("apply_positions: ignoring unknown node {id}");
            }
        }
        applied
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.node_order.clear();
        self.edge_order.clear();
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn node_mut(&mut self, id: NodeId) -> Option<&mut FlowNode> {
        match self.node_index.get(&id).copied() {
            Some(idx) => Some(&mut self.graph[idx]),
            None => {
                log::trace!("no node {id}");
                None
            }
        }
    }

    fn incident_edges(&self, id: NodeId) -> Vec<EdgeIndex> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.id())
            .collect()
    }
}

/// Offset between a logical point and a node's top-left corner.
pub fn grab_offset(node: &FlowNode, pointer: Point) -> Vec2 {
    pointer - node.position
}
