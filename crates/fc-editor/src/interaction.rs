//! Pointer interaction state machine.
//!
//! ```text
//!            pointer-down on body        pointer-down on connector
//!   ┌────────────────────────┐        ┌───────────────────────────┐
//!   ▼                        │        │                           ▼
//! DraggingNode ◄───────── Idle ──────────────────────► DrawingConnection
//!   │  move: MoveNode        │  ▲                          │  move: rubber band
//!   │                        │  │ up / leave               │  up on other node: Connect
//!   └──── up / leave ───────►│  │                          │
//!                            ▼  │                          │
//!                          Panning ◄───────────────────────┘ (up / leave → Idle)
//!                      move: Pan(delta)
//! ```
//!
//! The controller never touches the document. [`Controller::handle`] reads
//! it for hit testing and returns [`Effect`]s for the owner to apply, so each
//! transition is `(state, event) → (state, effects)`.

use crate::document::{Document, GraphMutation};
use crate::edit::EditTarget;
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use fc_core::{EdgeId, Line, NodeId, Point, Vec2, ZoomDirection, grab_offset};
use fc_render::hit::{Hit, HitTolerance, hit_node, hit_test};
use smallvec::{SmallVec, smallvec};

/// Tunables for pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Multiplicative zoom step per wheel notch.
    pub zoom_factor: f64,
    pub connector_radius: f64,
    /// Half-width of the clickable band around an edge.
    pub edge_band: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.1,
            connector_radius: 6.0,
            edge_band: 7.5,
        }
    }
}

impl InteractionConfig {
    pub fn tolerance(&self) -> HitTolerance {
        HitTolerance {
            connector_radius: self.connector_radius,
            edge_band: self.edge_band,
        }
    }
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Moving `node`; `grab_offset` is pointer minus the node's corner at
    /// grab time, in logical units.
    DraggingNode { node: NodeId, grab_offset: Vec2 },
    /// Dragging a new edge out of `source`'s connector at `origin`.
    DrawingConnection { source: NodeId, origin: Point },
    /// Panning; `origin` is the last screen position seen.
    Panning { origin: Point },
}

/// Something the document owner must do in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Mutate(GraphMutation),
    /// Pan by a screen-pixel delta.
    Pan(Vec2),
    Zoom {
        anchor: Point,
        direction: ZoomDirection,
        factor: f64,
    },
    /// Replace the edge selection.
    Select(Option<EdgeId>),
    EditRequested(EditTarget),
}

pub type Effects = SmallVec<[Effect; 2]>;

/// The interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    state: InteractionState,
    /// Last pointer position, logical.
    pointer: Point,
    config: InteractionConfig,
}

impl Controller {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            pointer: Point::ORIGIN,
            config,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Last pointer position in logical coordinates.
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Line from the connection origin to the pointer while drawing.
    pub fn rubber_band(&self) -> Option<Line> {
        match self.state {
            InteractionState::DrawingConnection { origin, .. } => {
                Some(Line::new(origin, self.pointer))
            }
            _ => None,
        }
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        if self.state != InteractionState::Idle {
            log::trace!("interaction reset from {:?}", self.state);
        }
        self.state = InteractionState::Idle;
    }

    /// Feed one event. Reads `doc` for hit testing; never mutates it.
    pub fn handle(&mut self, event: &InputEvent, doc: &Document) -> Effects {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(*x, *y), doc),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y), doc),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y), doc),
            InputEvent::PointerLeave => {
                self.reset();
                smallvec![]
            }
            InputEvent::Wheel { x, y, delta_y } => self.wheel(Point::new(*x, *y), *delta_y),
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y), doc),
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(ShortcutAction::DeleteSelection) => match doc.selected_edge() {
                    Some(id) => smallvec![
                        Effect::Mutate(GraphMutation::RemoveEdge { id }),
                        Effect::Select(None)
                    ],
                    None => smallvec![],
                },
                // Escape belongs to the edit session.
                Some(ShortcutAction::CancelEdit) | None => smallvec![],
            },
        }
    }

    fn pointer_down(&mut self, screen: Point, doc: &Document) -> Effects {
        // A down without a matching up (button released off-surface)
        // abandons the old gesture.
        self.reset();
        let logical = doc.viewport.screen_to_logical(screen);
        self.pointer = logical;

        let clear_selection = || -> Effects {
            if doc.selected_edge().is_some() {
                smallvec![Effect::Select(None)]
            } else {
                smallvec![]
            }
        };

        match hit_test(&doc.graph, logical, &self.config.tolerance()) {
            Hit::Connector { node, anchor } => {
                self.state = InteractionState::DrawingConnection {
                    source: node,
                    origin: anchor,
                };
                smallvec![]
            }
            Hit::Node(id) => {
                let Some(node) = doc.graph.node(id) else {
                    return smallvec![];
                };
                self.state = InteractionState::DraggingNode {
                    node: id,
                    grab_offset: grab_offset(node, logical),
                };
                clear_selection()
            }
            Hit::Edge(id) => smallvec![Effect::Select(Some(id))],
            Hit::Background => {
                self.state = InteractionState::Panning { origin: screen };
                clear_selection()
            }
        }
    }

    fn pointer_move(&mut self, screen: Point, doc: &Document) -> Effects {
        self.pointer = doc.viewport.screen_to_logical(screen);
        match self.state {
            InteractionState::DraggingNode { node, grab_offset } => {
                if !doc.graph.contains_node(node) {
                    log::trace!("dragged node {node} is gone");
                    return smallvec![];
                }
                smallvec![Effect::Mutate(GraphMutation::MoveNode {
                    id: node,
                    position: self.pointer - grab_offset,
                })]
            }
            InteractionState::Panning { origin } => {
                self.state = InteractionState::Panning { origin: screen };
                let delta = screen - origin;
                if delta == Vec2::ZERO {
                    smallvec![]
                } else {
                    smallvec![Effect::Pan(delta)]
                }
            }
            InteractionState::DrawingConnection { .. } | InteractionState::Idle => smallvec![],
        }
    }

    fn pointer_up(&mut self, screen: Point, doc: &Document) -> Effects {
        let state = self.state;
        self.state = InteractionState::Idle;
        let InteractionState::DrawingConnection { source, .. } = state else {
            return smallvec![];
        };
        let logical = doc.viewport.screen_to_logical(screen);
        self.pointer = logical;
        match hit_node(&doc.graph, logical) {
            Some(target) if target != source => {
                smallvec![Effect::Mutate(GraphMutation::Connect { source, target })]
            }
            _ => smallvec![],
        }
    }

    fn wheel(&mut self, screen: Point, delta_y: f64) -> Effects {
        if self.state != InteractionState::Idle {
            return smallvec![];
        }
        match ZoomDirection::from_wheel(delta_y) {
            Some(direction) => smallvec![Effect::Zoom {
                anchor: screen,
                direction,
                factor: self.config.zoom_factor,
            }],
            None => smallvec![],
        }
    }

    fn double_click(&mut self, screen: Point, doc: &Document) -> Effects {
        let logical = doc.viewport.screen_to_logical(screen);
        match hit_test(&doc.graph, logical, &self.config.tolerance()) {
            Hit::Node(id) => smallvec![Effect::EditRequested(EditTarget::Node(id))],
            Hit::Edge(id) => smallvec![Effect::EditRequested(EditTarget::Edge(id))],
            Hit::Connector { .. } | Hit::Background => smallvec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{NodeKind, Size};
    use pretty_assertions::assert_eq;

    /// a at (0,0), b at (300,0), edge a→b along y = 35.
    fn doc() -> (Document, NodeId, NodeId, EdgeId) {
        let mut doc = Document::new(Size::new(800.0, 600.0));
        let a = doc.graph.add_node(NodeKind::Creative, Point::new(0.0, 0.0), "A");
        let b = doc.graph.add_node(NodeKind::GeneralAffairs, Point::new(300.0, 0.0), "B");
        let e = doc.graph.add_edge(a, b, None).unwrap();
        (doc, a, b, e)
    }

    #[test]
    fn body_press_starts_drag_with_grab_offset() {
        let (doc, a, _, _) = doc();
        let mut c = Controller::default();
        let fx = c.handle(&InputEvent::pointer_down(30.0, 20.0), &doc);
        assert!(fx.is_empty());
        assert_eq!(
            c.state(),
            InteractionState::DraggingNode {
                node: a,
                grab_offset: Vec2::new(30.0, 20.0)
            }
        );

        let fx = c.handle(&InputEvent::pointer_move(80.0, 70.0), &doc);
        assert_eq!(
            fx.as_slice(),
            &[Effect::Mutate(GraphMutation::MoveNode {
                id: a,
                position: Point::new(50.0, 50.0)
            })]
        );
    }

    #[test]
    fn background_press_pans_incrementally() {
        let (doc, _, _, _) = doc();
        let mut c = Controller::default();
        c.handle(&InputEvent::pointer_down(500.0, 400.0), &doc);
        assert_eq!(
            c.state(),
            InteractionState::Panning {
                origin: Point::new(500.0, 400.0)
            }
        );
        let fx = c.handle(&InputEvent::pointer_move(510.0, 395.0), &doc);
        assert_eq!(fx.as_slice(), &[Effect::Pan(Vec2::new(10.0, -5.0))]);
        let fx = c.handle(&InputEvent::pointer_move(512.0, 395.0), &doc);
        assert_eq!(fx.as_slice(), &[Effect::Pan(Vec2::new(2.0, 0.0))]);
    }

    #[test]
    fn background_press_clears_selection() {
        let (mut doc, _, _, e) = doc();
        doc.select_edge(Some(e));
        let mut c = Controller::default();
        let fx = c.handle(&InputEvent::pointer_down(500.0, 400.0), &doc);
        assert_eq!(fx.as_slice(), &[Effect::Select(None)]);
    }

    #[test]
    fn edge_press_selects_and_stays_idle() {
        let (doc, _, _, e) = doc();
        let mut c = Controller::default();
        let fx = c.handle(&InputEvent::pointer_down(225.0, 38.0), &doc);
        assert_eq!(fx.as_slice(), &[Effect::Select(Some(e))]);
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn connector_drag_connects_on_other_node() {
        let (mut doc, a, b, e) = doc();
        doc.graph.remove_edge(e);
        let mut c = Controller::default();
        // Right-hand connector of `a`.
        c.handle(&InputEvent::pointer_down(150.0, 35.0), &doc);
        assert_eq!(
            c.state(),
            InteractionState::DrawingConnection {
                source: a,
                origin: Point::new(150.0, 35.0)
            }
        );
        c.handle(&InputEvent::pointer_move(250.0, 50.0), &doc);
        assert_eq!(
            c.rubber_band(),
            Some(Line::new((150.0, 35.0), (250.0, 50.0)))
        );
        let fx = c.handle(&InputEvent::pointer_up(340.0, 40.0), &doc);
        assert_eq!(
            fx.as_slice(),
            &[Effect::Mutate(GraphMutation::Connect {
                source: a,
                target: b
            })]
        );
        assert_eq!(c.state(), InteractionState::Idle);
        assert_eq!(c.rubber_band(), None);
    }

    #[test]
    fn connector_released_on_source_or_background_does_nothing() {
        let (doc, _, _, _) = doc();
        let mut c = Controller::default();
        c.handle(&InputEvent::pointer_down(150.0, 35.0), &doc);
        assert!(c.handle(&InputEvent::pointer_up(60.0, 30.0), &doc).is_empty());
        assert_eq!(c.state(), InteractionState::Idle);

        c.handle(&InputEvent::pointer_down(150.0, 35.0), &doc);
        assert!(c.handle(&InputEvent::pointer_up(600.0, 500.0), &doc).is_empty());
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn leave_resets_any_gesture() {
        let (doc, _, _, _) = doc();
        let mut c = Controller::default();
        for (x, y) in [(30.0, 20.0), (150.0, 35.0), (600.0, 500.0)] {
            c.handle(&InputEvent::pointer_down(x, y), &doc);
            assert_ne!(c.state(), InteractionState::Idle);
            assert!(c.handle(&InputEvent::PointerLeave, &doc).is_empty());
            assert_eq!(c.state(), InteractionState::Idle);
            // Moving afterwards has no effect.
            assert!(c.handle(&InputEvent::pointer_move(x + 40.0, y), &doc).is_empty());
        }
    }

    #[test]
    fn wheel_zooms_only_when_idle() {
        let (doc, _, _, _) = doc();
        let mut c = Controller::default();
        let fx = c.handle(&InputEvent::wheel(100.0, 50.0, -120.0), &doc);
        assert_eq!(
            fx.as_slice(),
            &[Effect::Zoom {
                anchor: Point::new(100.0, 50.0),
                direction: ZoomDirection::In,
                factor: 1.1
            }]
        );
        assert!(c.handle(&InputEvent::wheel(100.0, 50.0, 0.0), &doc).is_empty());

        c.handle(&InputEvent::pointer_down(600.0, 500.0), &doc);
        assert!(c.handle(&InputEvent::wheel(100.0, 50.0, 120.0), &doc).is_empty());
    }

    #[test]
    fn double_click_requests_edit() {
        let (doc, a, _, e) = doc();
        let mut c = Controller::default();
        assert_eq!(
            c.handle(&InputEvent::double_click(60.0, 30.0), &doc).as_slice(),
            &[Effect::EditRequested(EditTarget::Node(a))]
        );
        assert_eq!(
            c.handle(&InputEvent::double_click(225.0, 35.0), &doc).as_slice(),
            &[Effect::EditRequested(EditTarget::Edge(e))]
        );
        assert!(c.handle(&InputEvent::double_click(600.0, 500.0), &doc).is_empty());
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn delete_key_with_and_without_selection() {
        let (mut doc, _, _, e) = doc();
        let mut c = Controller::default();
        assert!(c.handle(&InputEvent::key("Delete"), &doc).is_empty());
        doc.select_edge(Some(e));
        assert_eq!(
            c.handle(&InputEvent::key("Backspace"), &doc).as_slice(),
            &[
                Effect::Mutate(GraphMutation::RemoveEdge { id: e }),
                Effect::Select(None)
            ]
        );
    }

    #[test]
    fn drag_of_vanished_node_is_noop() {
        let (mut doc, a, _, _) = doc();
        let mut c = Controller::default();
        c.handle(&InputEvent::pointer_down(30.0, 20.0), &doc);
        doc.graph.remove_node(a);
        assert!(c.handle(&InputEvent::pointer_move(90.0, 90.0), &doc).is_empty());
    }

    #[test]
    fn drag_respects_zoom() {
        let (mut doc, a, _, _) = doc();
        doc.viewport.zoom(Point::new(0.0, 0.0), ZoomDirection::In, 2.0);
        let mut c = Controller::default();
        // Screen (20, 10) is logical (10, 5), inside `a`.
        c.handle(&InputEvent::pointer_down(20.0, 10.0), &doc);
        let fx = c.handle(&InputEvent::pointer_move(120.0, 110.0), &doc);
        assert_eq!(
            fx.as_slice(),
            &[Effect::Mutate(GraphMutation::MoveNode {
                id: a,
                position: Point::new(50.0, 50.0)
            })]
        );
    }
}
