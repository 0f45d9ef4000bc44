//! Edit sessions: renaming a node or labelling an edge.
//!
//! The host shows its own dialog; the session only tracks what is being
//! edited and the draft text, and turns the result into a mutation.

use crate::document::GraphMutation;
use fc_core::{EdgeId, FlowGraph, NodeId};

/// What a double-click asked to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Node(NodeId),
    Edge(EdgeId),
}

impl EditTarget {
    /// Current text of the target, `None` if it no longer exists.
    /// An unlabeled edge edits as the empty string.
    pub fn current_text(&self, graph: &FlowGraph) -> Option<String> {
        match *self {
            EditTarget::Node(id) => graph.node(id).map(|n| n.label.clone()),
            EditTarget::Edge(id) => graph
                .edge(id)
                .map(|e| e.label.clone().unwrap_or_default()),
        }
    }
}

/// Sent to the host when an edit dialog should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub target: EditTarget,
    pub current_text: String,
}

impl EditRequest {
    pub fn for_target(target: EditTarget, graph: &FlowGraph) -> Option<Self> {
        let current_text = target.current_text(graph)?;
        Some(Self {
            target,
            current_text,
        })
    }
}

/// How an edit dialog closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Commit(String),
    Cancel,
}

impl EditOutcome {
    /// The mutation a committed edit applies. Cancel applies nothing.
    pub fn into_mutation(self, target: EditTarget) -> Option<GraphMutation> {
        let EditOutcome::Commit(text) = self else {
            return None;
        };
        Some(match target {
            EditTarget::Node(id) => GraphMutation::SetNodeLabel { id, label: text },
            EditTarget::Edge(id) => GraphMutation::SetEdgeLabel { id, label: text },
        })
    }
}

/// An open edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    request: EditRequest,
    draft: String,
}

impl EditSession {
    pub fn open(request: EditRequest) -> Self {
        let draft = request.current_text.clone();
        Self { request, draft }
    }

    pub fn target(&self) -> EditTarget {
        self.request.target
    }

    pub fn request(&self) -> &EditRequest {
        &self.request
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Keys typed while the dialog is open. `Escape` closes it unapplied;
    /// every other key belongs to the host's text field.
    pub fn handle_key(&self, key: &str) -> Option<EditOutcome> {
        (key == "Escape").then_some(EditOutcome::Cancel)
    }

    /// Close with the current draft.
    pub fn commit(self) -> EditOutcome {
        EditOutcome::Commit(self.draft)
    }
}
