//! The document: graph, viewport and edge selection in one explicit context.
//!
//! Everything that changes the diagram goes through [`Document::apply_mutation`]
//! or the bulk adapter operations here, so the selection can never point at
//! an edge that no longer exists.

use fc_core::{
    EdgeId, FlowGraph, FlowNode, LayoutUpdate, NodeId, Point, Size, Viewport,
};

/// A single edit to the graph, produced by the interaction controller or an
/// edit session.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Set a node's top-left corner.
    MoveNode { id: NodeId, position: Point },
    /// Add an edge `source → target`.
    Connect { source: NodeId, target: NodeId },
    RemoveEdge { id: EdgeId },
    /// Remove a node and every edge touching it.
    RemoveNode { id: NodeId },
    SetNodeLabel { id: NodeId, label: String },
    /// Blank text clears the label.
    SetEdgeLabel { id: EdgeId, label: String },
}

/// Mutable editing context handed to the controller and its effects.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub graph: FlowGraph,
    pub viewport: Viewport,
    selected_edge: Option<EdgeId>,
}

impl Document {
    pub fn new(surface: Size) -> Self {
        Self {
            graph: FlowGraph::new(),
            viewport: Viewport::new(surface),
            selected_edge: None,
        }
    }

    pub fn selected_edge(&self) -> Option<EdgeId> {
        self.selected_edge
    }

    /// Make `id` the sole selected edge, or clear the selection with `None`.
    /// Selecting an edge that does not exist clears the selection.
    /// Returns `true` if the selection changed.
    pub fn select_edge(&mut self, id: Option<EdgeId>) -> bool {
        let next = id.filter(|e| self.graph.contains_edge(*e));
        if next != id {
            log::trace!("select_edge: no edge {id:?}");
        }
        let changed = next != self.selected_edge;
        self.selected_edge = next;
        changed
    }

    /// Apply one mutation. Mutations naming missing ids are silent no-ops.
    /// Returns `true` if the graph changed.
    pub fn apply_mutation(&mut self, mutation: GraphMutation) -> bool {
        let changed = match mutation {
            GraphMutation::MoveNode { id, position } => {
                self.graph.update_node_position(id, position)
            }
            GraphMutation::Connect { source, target } => {
                match self.graph.add_edge(source, target, None) {
                    Ok(_) => true,
                    Err(rejection) => {
                        log::debug!("connect {source} -> {target} rejected: {rejection:?}");
                        false
                    }
                }
            }
            GraphMutation::RemoveEdge { id } => self.graph.remove_edge(id).is_some(),
            GraphMutation::RemoveNode { id } => self.graph.remove_node(id).is_some(),
            GraphMutation::SetNodeLabel { id, label } => self.graph.update_node_label(id, label),
            GraphMutation::SetEdgeLabel { id, label } => self.graph.update_edge_label(id, label),
        };
        self.prune_selection();
        changed
    }

    /// Remove the selected edge and clear the selection.
    /// No-op (returns `false`) when nothing is selected.
    pub fn delete_selected_edge(&mut self) -> bool {
        match self.selected_edge.take() {
            Some(id) => self.graph.remove_edge(id).is_some(),
            None => false,
        }
    }

    /// Replace the node set with a generation result. All edges go.
    pub fn replace_nodes(&mut self, nodes: Vec<FlowNode>) -> Result<(), NodeId> {
        self.graph.replace_nodes(nodes)?;
        self.prune_selection();
        Ok(())
    }

    /// Merge relayout positions by id. Returns how many nodes moved.
    pub fn apply_layout(&mut self, updates: &[LayoutUpdate]) -> usize {
        self.graph.apply_positions(updates.iter().map(|u| (u.id, u.position)))
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected_edge {
            if !self.graph.contains_edge(id) {
                log::debug!("selected edge {id} is gone, clearing selection");
                self.selected_edge = None;
            }
        }
    }
}
