//! WASM bridge for Flowchart AI: exposes the editor to the browser page.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards DOM
//! events, draws the SVG it gets back, and performs the model calls itself,
//! handing raw reply JSON to [`FcCanvas::apply_generation_json`] and
//! [`FcCanvas::apply_layout_json`].

use fc_core::wire::{parse_generated_nodes, parse_layout};
use fc_core::{NodeKind, Point, Size};
use fc_editor::{
    AdapterError, EditRequest, EditTarget, Editor, GenerationOutcome, InputEvent, Modifiers,
    RequestKind,
};
use fc_render::{Hit, hit_test};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The WASM-facing canvas controller.
///
/// Owns the editor; every interaction from page JS goes through here.
#[wasm_bindgen]
pub struct FcCanvas {
    editor: Editor,
}

/// `{"ok":true,"count":n}` or `{"ok":false,"error":"..."}`.
#[derive(Serialize)]
struct ApplyResult {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApplyResult {
    fn from_result(result: Result<usize, AdapterError>) -> Self {
        match result {
            Ok(count) => Self {
                ok: true,
                count: Some(count),
                error: None,
            },
            Err(err) => Self {
                ok: false,
                count: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct EditJson<'a> {
    target: &'static str,
    id: &'a str,
    text: &'a str,
}

impl<'a> EditJson<'a> {
    fn new(request: &'a EditRequest) -> Self {
        let (target, id) = match &request.target {
            EditTarget::Node(id) => ("node", id.as_str()),
            EditTarget::Edge(id) => ("edge", id.as_str()),
        };
        Self {
            target,
            id,
            text: &request.current_text,
        }
    }
}

#[derive(Serialize)]
struct EventResult<'a> {
    changed: bool,
    edit: Option<EditJson<'a>>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::error!("bridge result not serializable: {err}");
        r#"{"ok":false}"#.to_string()
    })
}

fn request_kind(name: &str) -> Option<RequestKind> {
    match name {
        "generate" => Some(RequestKind::Generate),
        "relayout" => Some(RequestKind::Relayout),
        _ => None,
    }
}

#[wasm_bindgen]
impl FcCanvas {
    /// Create a canvas controller for a surface of the given pixel size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self {
            editor: Editor::new(Size::new(width, height)),
        }
    }

    /// Surface resized; the logical origin stays put.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.resize(Size::new(width, height));
    }

    // ─── Pointer / wheel ─────────────────────────────────────────────────

    /// Returns true if the page should re-render.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.editor
            .handle_event(&InputEvent::pointer_down(x, y))
            .changed
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.editor
            .handle_event(&InputEvent::pointer_move(x, y))
            .changed
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.editor.handle_event(&InputEvent::pointer_up(x, y)).changed
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.editor.handle_event(&InputEvent::PointerLeave).changed
    }

    /// `delta_y` is `WheelEvent.deltaY`; the page should `preventDefault`.
    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.editor
            .handle_event(&InputEvent::wheel(x, y, delta_y))
            .changed
    }

    /// Returns `{"changed":bool,"edit":null}` or, when an edit dialog
    /// should open, `"edit":{"target":"node"|"edge","id":"...","text":"..."}`.
    pub fn handle_double_click(&mut self, x: f64, y: f64) -> String {
        let response = self.editor.handle_event(&InputEvent::double_click(x, y));
        to_json(&EventResult {
            changed: response.changed,
            edit: response.edit_requested.as_ref().map(EditJson::new),
        })
    }

    /// CSS cursor for the pointer at screen `(x, y)` while idle.
    pub fn cursor_at(&self, x: f64, y: f64) -> String {
        let p = self.editor.viewport().screen_to_logical(Point::new(x, y));
        let tolerance = self.editor.controller().config().tolerance();
        match hit_test(self.editor.graph(), p, &tolerance) {
            Hit::Connector { .. } => "crosshair",
            Hit::Node(_) => "move",
            Hit::Edge(_) => "pointer",
            Hit::Background => "grab",
        }
        .to_string()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. Returns `{"changed":bool,"editing":bool}`;
    /// `editing` turns false when Escape closed the edit dialog.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let event = InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        let changed = self.editor.handle_event(&event).changed;
        let editing = self.is_editing();
        format!(r#"{{"changed":{changed},"editing":{editing}}}"#)
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    /// Add a node by kind name (`"creative"`, `"general_affairs"`).
    /// Returns the new node's id, or an empty string for an unknown kind.
    pub fn add_node(&mut self, kind: &str) -> String {
        match NodeKind::from_name(kind) {
            Some(kind) => self.editor.add_node(kind).as_str().to_string(),
            None => {
                log::warn!("unknown node kind {kind:?}");
                String::new()
            }
        }
    }

    pub fn delete_selected_edge(&mut self) -> bool {
        self.editor.delete_selected_edge()
    }

    /// Selected edge id, or empty.
    pub fn selected_edge(&self) -> String {
        self.editor
            .selected_edge()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn can_relayout(&self) -> bool {
        self.editor.can_relayout()
    }

    // ─── Edit dialog ─────────────────────────────────────────────────────

    pub fn is_editing(&self) -> bool {
        self.editor.edit_session().is_some()
    }

    pub fn set_edit_draft(&mut self, text: &str) {
        self.editor.set_edit_draft(text);
    }

    /// Apply `text` to the edited node or edge and close the dialog.
    pub fn commit_edit(&mut self, text: &str) -> bool {
        self.editor.commit_edit(text)
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editor.cancel_edit()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render_svg(&self) -> String {
        self.editor.render_svg()
    }

    // ─── Model requests ──────────────────────────────────────────────────

    /// Graph snapshot to embed in a relayout prompt.
    pub fn snapshot_json(&self) -> String {
        self.editor.snapshot().to_json().unwrap_or_else(|err| {
            log::error!("snapshot failed: {err}");
            r#"{"nodes":[],"edges":[]}"#.to_string()
        })
    }

    /// Mark a `"generate"` or `"relayout"` request as in flight.
    pub fn begin_request(&mut self, kind: &str) -> bool {
        match request_kind(kind) {
            Some(kind) => {
                self.editor.begin_request(kind);
                true
            }
            None => false,
        }
    }

    /// Apply the model's generation reply text, replacing every node.
    pub fn apply_generation_json(&mut self, json: &str) -> String {
        let outcome = match parse_generated_nodes(json) {
            Ok(nodes) => GenerationOutcome::Generated(nodes),
            Err(err) => GenerationOutcome::Failed {
                kind: RequestKind::Generate,
                error: err.into(),
            },
        };
        to_json(&ApplyResult::from_result(self.editor.finish_request(outcome)))
    }

    /// Apply the model's relayout reply text to the current nodes.
    pub fn apply_layout_json(&mut self, json: &str) -> String {
        let outcome = match parse_layout(json) {
            Ok(updates) => GenerationOutcome::Relaid(updates),
            Err(err) => GenerationOutcome::Failed {
                kind: RequestKind::Relayout,
                error: err.into(),
            },
        };
        to_json(&ApplyResult::from_result(self.editor.finish_request(outcome)))
    }

    /// The page's own request failed (network, HTTP status).
    pub fn fail_request(&mut self, kind: &str, message: &str) -> bool {
        let Some(kind) = request_kind(kind) else {
            return false;
        };
        let _ = self.editor.finish_request(GenerationOutcome::Failed {
            kind,
            error: AdapterError::Transport(message.to_string()),
        });
        true
    }

    /// Loading text for the overlay, empty when idle.
    pub fn busy_message(&self) -> String {
        self.editor.busy_message().unwrap_or_default().to_string()
    }

    /// Failure notice to show, empty when none.
    pub fn notice(&self) -> String {
        self.editor.notice().unwrap_or_default().to_string()
    }

    pub fn dismiss_notice(&mut self) {
        self.editor.dismiss_notice();
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Flowchart WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Check a generation reply without applying it.
/// Returns `{"ok":true,"count":n}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_generation(json: &str) -> String {
    let result = parse_generated_nodes(json)
        .map(|nodes| nodes.len())
        .map_err(AdapterError::from);
    to_json(&ApplyResult::from_result(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const TWO_NODES: &str = r#"{"nodes":[
        {"id":"w1","type":"creative","text":"Plan","position":{"x":0,"y":0}},
        {"id":"w2","type":"general_affairs","text":"File","position":{"x":300,"y":0}}
    ]}"#;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn add_node_by_name() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        assert!(!canvas.add_node("creative").is_empty());
        assert!(canvas.add_node("decision").is_empty());
        assert!(!canvas.can_relayout());
        canvas.add_node("general_affairs");
        assert!(canvas.can_relayout());
        assert!(canvas.render_svg().contains("General affairs"));
    }

    #[test]
    fn cursor_follows_hit() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        canvas.add_node("creative");
        // Node at (150, 150), 150 x 70.
        assert_eq!(canvas.cursor_at(200.0, 180.0), "move");
        assert_eq!(canvas.cursor_at(225.0, 150.0), "crosshair");
        assert_eq!(canvas.cursor_at(600.0, 500.0), "grab");
    }

    #[test]
    fn generation_then_layout() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        assert!(canvas.begin_request("generate"));
        assert_eq!(canvas.busy_message(), RequestKind::Generate.busy_message());
        assert_eq!(
            parse(&canvas.apply_generation_json(TWO_NODES)),
            serde_json::json!({ "ok": true, "count": 2 })
        );
        assert_eq!(canvas.busy_message(), "");

        let snapshot = parse(&canvas.snapshot_json());
        assert_eq!(snapshot["nodes"].as_array().unwrap().len(), 2);

        canvas.begin_request("relayout");
        let layout = r#"[{"id":"w2","type":"general_affairs","text":"File","position":{"x":0,"y":200}}]"#;
        assert_eq!(
            parse(&canvas.apply_layout_json(layout)),
            serde_json::json!({ "ok": true, "count": 1 })
        );
        assert!(canvas.render_svg().contains("Plan"));
    }

    #[test]
    fn malformed_reply_sets_notice() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        canvas.add_node("creative");
        canvas.begin_request("generate");
        let result = parse(&canvas.apply_generation_json("not json"));
        assert_eq!(result["ok"], false);
        assert!(result["error"].is_string());
        assert_eq!(canvas.notice(), RequestKind::Generate.failure_message());
        assert_eq!(canvas.busy_message(), "");
        assert_eq!(canvas.editor.graph().node_count(), 1);

        canvas.dismiss_notice();
        assert_eq!(canvas.notice(), "");
    }

    #[test]
    fn page_side_failure() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        canvas.begin_request("relayout");
        assert!(canvas.fail_request("relayout", "HTTP 500"));
        assert!(!canvas.fail_request("teleport", "?"));
        assert_eq!(canvas.notice(), RequestKind::Relayout.failure_message());
    }

    #[test]
    fn double_click_opens_and_escape_closes() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        let id = canvas.add_node("creative");
        let result = parse(&canvas.handle_double_click(200.0, 180.0));
        assert_eq!(
            result["edit"],
            serde_json::json!({ "target": "node", "id": id, "text": "Creative task" })
        );
        assert!(canvas.is_editing());

        let key = parse(&canvas.handle_key("Escape", false, false, false, false));
        assert_eq!(key["editing"], false);
        assert!(!canvas.is_editing());

        assert_eq!(
            parse(&canvas.handle_double_click(700.0, 500.0))["edit"],
            Value::Null
        );
    }

    #[test]
    fn commit_renames() {
        let mut canvas = FcCanvas::new(800.0, 600.0);
        canvas.add_node("creative");
        canvas.handle_double_click(200.0, 180.0);
        assert!(canvas.commit_edit("Sketch ideas"));
        assert!(!canvas.commit_edit("again"));
        assert!(canvas.render_svg().contains("Sketch ideas"));
    }

    #[test]
    fn validate_without_canvas() {
        assert_eq!(parse(&validate_generation(TWO_NODES))["count"], 2);
        assert_eq!(parse(&validate_generation(r#"{"nodes":7}"#))["ok"], false);
    }
}
