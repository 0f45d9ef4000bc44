//! The editor facade: document + controller + edit session + request
//! tracking. Hosts talk only to this.

use crate::document::{Document, GraphMutation};
use crate::edit::{EditOutcome, EditRequest, EditSession, EditTarget};
use crate::generate::{AdapterError, GenerationOutcome, RequestKind};
use crate::input::InputEvent;
use crate::interaction::{Controller, Effect, InteractionConfig};
use fc_core::{
    EdgeId, FlowGraph, GraphSnapshot, NodeId, NodeKind, Point, SchemaError, Size, Viewport,
};
use fc_render::svg::{Overlay, render_svg};

/// Where toolbar-added nodes appear.
pub const NEW_NODE_POSITION: Point = Point::new(150.0, 150.0);

/// What an event did, for the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Something visible changed; re-render.
    pub changed: bool,
    /// A double-click opened an edit session.
    pub edit_requested: Option<EditRequest>,
}

#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    controller: Controller,
    session: Option<EditSession>,
    /// Outstanding adapter requests, oldest first.
    pending: Vec<RequestKind>,
    /// Failure notice from the last request that failed.
    notice: Option<String>,
}

impl Editor {
    pub fn new(surface: Size) -> Self {
        Self::with_config(surface, InteractionConfig::default())
    }

    pub fn with_config(surface: Size, config: InteractionConfig) -> Self {
        Self {
            document: Document::new(surface),
            controller: Controller::new(config),
            session: None,
            pending: Vec::new(),
            notice: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.document.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.document.viewport
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn selected_edge(&self) -> Option<EdgeId> {
        self.document.selected_edge()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event through the controller and apply its effects.
    pub fn handle_event(&mut self, event: &InputEvent) -> Response {
        if let (Some(session), InputEvent::Key { key, .. }) = (&self.session, event) {
            return match session.handle_key(key) {
                Some(outcome) => Response {
                    changed: self.finish_edit(outcome),
                    edit_requested: None,
                },
                None => Response::default(),
            };
        }

        let drawing_before = self.controller.rubber_band().is_some();
        let effects = self.controller.handle(event, &self.document);
        let mut response = Response {
            // The rubber band follows the pointer without touching the model.
            changed: drawing_before || self.controller.rubber_band().is_some(),
            edit_requested: None,
        };
        for effect in effects {
            match effect {
                Effect::Mutate(mutation) => {
                    response.changed |= self.document.apply_mutation(mutation);
                }
                Effect::Pan(delta) => {
                    self.document.viewport.pan(delta);
                    response.changed = true;
                }
                Effect::Zoom {
                    anchor,
                    direction,
                    factor,
                } => {
                    self.document.viewport.zoom(anchor, direction, factor);
                    log::debug!("zoom {direction:?} at ({}, {})", anchor.x, anchor.y);
                    response.changed = true;
                }
                Effect::Select(id) => {
                    response.changed |= self.document.select_edge(id);
                }
                Effect::EditRequested(target) => {
                    response.edit_requested = self.open_edit(target);
                }
            }
        }
        response
    }

    /// Track a new surface size.
    pub fn resize(&mut self, surface: Size) {
        self.document.viewport.resize(surface);
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    /// Add a node of `kind` with its default label at the fixed toolbar
    /// position.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.document
            .graph
            .add_node(kind, NEW_NODE_POSITION, kind.style().default_label)
    }

    pub fn delete_selected_edge(&mut self) -> bool {
        self.document.delete_selected_edge()
    }

    /// Relayout needs at least two nodes to be worth a request.
    pub fn can_relayout(&self) -> bool {
        self.document.graph.node_count() >= 2
    }

    pub fn apply_mutation(&mut self, mutation: GraphMutation) -> bool {
        self.document.apply_mutation(mutation)
    }

    // ─── Edit sessions ───────────────────────────────────────────────────

    /// Open an edit session on `target`. Fails if the target is gone or a
    /// session is already open.
    pub fn open_edit(&mut self, target: EditTarget) -> Option<EditRequest> {
        if self.session.is_some() {
            log::trace!("edit already open, ignoring request for {target:?}");
            return None;
        }
        let request = EditRequest::for_target(target, &self.document.graph)?;
        self.session = Some(EditSession::open(request.clone()));
        self.controller.reset();
        Some(request)
    }

    pub fn set_edit_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = &mut self.session {
            session.set_draft(text);
        }
    }

    /// Commit the open session with `text`. Returns `false` if no session
    /// was open.
    pub fn commit_edit(&mut self, text: impl Into<String>) -> bool {
        self.finish_edit(EditOutcome::Commit(text.into()))
    }

    /// Close the open session without applying it.
    pub fn cancel_edit(&mut self) -> bool {
        self.finish_edit(EditOutcome::Cancel)
    }

    fn finish_edit(&mut self, outcome: EditOutcome) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        // A target deleted meanwhile is a no-op; the dialog still closes.
        if let Some(mutation) = outcome.into_mutation(session.target()) {
            self.document.apply_mutation(mutation);
        }
        true
    }

    // ─── Adapter requests ────────────────────────────────────────────────

    pub fn begin_request(&mut self, kind: RequestKind) {
        self.pending.push(kind);
        self.notice = None;
        log::debug!("{kind:?} request started ({} pending)", self.pending.len());
    }

    /// Apply a finished request against the current model.
    ///
    /// Generation replaces every node and drops every edge; relayout moves
    /// known nodes only. On failure the model is untouched, the error is
    /// returned, and a notice is kept for the host.
    pub fn finish_request(&mut self, outcome: GenerationOutcome) -> Result<usize, AdapterError> {
        let kind = outcome.kind();
        if let Some(i) = self.pending.iter().position(|k| *k == kind) {
            self.pending.remove(i);
        }
        let result: Result<usize, AdapterError> = match outcome {
            GenerationOutcome::Generated(nodes) => {
                let count = nodes.len();
                self.document
                    .replace_nodes(nodes)
                    .map(|()| count)
                    .map_err(|id| SchemaError::DuplicateId(id.as_str().to_string()).into())
            }
            GenerationOutcome::Relaid(updates) => Ok(self.document.apply_layout(&updates)),
            GenerationOutcome::Failed { error, .. } => Err(error),
        };
        match &result {
            Ok(n) => log::debug!("{kind:?} applied ({n} nodes)"),
            Err(err) => {
                log::warn!("{kind:?} failed: {err}");
                self.notice = Some(kind.failure_message().to_string());
            }
        }
        result
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Message for the most recent outstanding request.
    pub fn busy_message(&self) -> Option<&'static str> {
        self.pending.last().map(|k| k.busy_message())
    }

    /// Failure notice for the host to show, if the last request failed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.document.graph)
    }

    // ─── Presentation ────────────────────────────────────────────────────

    pub fn overlay(&self) -> Overlay {
        Overlay {
            selected_edge: self.document.selected_edge(),
            rubber_band: self.controller.rubber_band(),
            tolerance: self.controller.config().tolerance(),
        }
    }

    pub fn render_svg(&self) -> String {
        render_svg(&self.document.graph, &self.document.viewport, &self.overlay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_node_uses_toolbar_defaults() {
        let mut ed = Editor::new(Size::new(800.0, 600.0));
        let id = ed.add_node(NodeKind::GeneralAffairs);
        let node = ed.graph().node(id).unwrap();
        assert_eq!(node.position, Point::new(150.0, 150.0));
        assert_eq!(node.label, "General affairs task");
        assert!(!ed.can_relayout());
        ed.add_node(NodeKind::Creative);
        assert!(ed.can_relayout());
    }

    #[test]
    fn keys_go_to_open_session() {
        let mut ed = Editor::new(Size::new(800.0, 600.0));
        let a = ed.add_node(NodeKind::Creative);
        let b = ed.graph().node(a).map(|n| n.label.clone()).unwrap();
        let req = ed.open_edit(EditTarget::Node(a)).unwrap();
        assert_eq!(req.current_text, b);

        // Delete is typing, not a canvas shortcut.
        let r = ed.handle_event(&InputEvent::key("Delete"));
        assert_eq!(r, Response::default());
        assert!(ed.edit_session().is_some());

        let r = ed.handle_event(&InputEvent::key("Escape"));
        assert!(r.changed);
        assert!(ed.edit_session().is_none());
        assert_eq!(ed.graph().node(a).unwrap().label, b);
    }

    #[test]
    fn commit_renames_and_vanished_target_is_noop() {
        let mut ed = Editor::new(Size::new(800.0, 600.0));
        let a = ed.add_node(NodeKind::Creative);
        ed.open_edit(EditTarget::Node(a));
        assert!(ed.commit_edit("Brainstorm"));
        assert_eq!(ed.graph().node(a).unwrap().label, "Brainstorm");

        ed.open_edit(EditTarget::Node(a));
        ed.apply_mutation(GraphMutation::RemoveNode { id: a });
        ed.commit_edit("ghost");
        assert!(ed.edit_session().is_none());
        assert!(ed.graph().is_empty());
    }

    #[test]
    fn busy_tracking() {
        let mut ed = Editor::new(Size::new(800.0, 600.0));
        assert!(!ed.is_busy());
        ed.begin_request(RequestKind::Relayout);
        assert_eq!(ed.busy_message(), Some("Optimizing flowchart layout..."));
        let err = ed
            .finish_request(GenerationOutcome::Failed {
                kind: RequestKind::Relayout,
                error: AdapterError::EmptyReply,
            })
            .unwrap_err();
        assert!(matches!(err, AdapterError::EmptyReply));
        assert!(!ed.is_busy());
        assert!(ed.notice().is_some());
    }

    #[test]
    fn rendered_handles_follow_configured_radius() {
        let config = InteractionConfig {
            connector_radius: 10.0,
            ..InteractionConfig::default()
        };
        let mut ed = Editor::with_config(Size::new(800.0, 600.0), config);
        ed.add_node(NodeKind::Creative);
        let svg = ed.render_svg();
        assert_eq!(svg.matches(r#" r="10" fill="#).count(), 4);
        assert!(!svg.contains(r#" r="6" fill="#));
    }
}
