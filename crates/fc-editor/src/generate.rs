//! Boundary to the generative service.
//!
//! Two requests cross it: description → node set, and graph snapshot → new
//! positions. Both are async and may resolve long after the user has kept
//! editing; their results are applied against whatever the model is at
//! completion time, never against the state at request time.

use crate::editor::Editor;
use async_trait::async_trait;
use fc_core::{FlowNode, GraphSnapshot, LayoutUpdate, SchemaError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Why a generation or relayout request failed.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed reply: {0}")]
    Schema(#[from] SchemaError),
    #[error("the service returned no content")]
    EmptyReply,
    #[error("description is empty")]
    BlankDescription,
}

/// A generative layout service.
#[async_trait]
pub trait GenerationAdapter: Send + Sync {
    /// Produce a node set (with ids, kinds, labels and positions) from a
    /// natural-language description.
    async fn generate_from_description(&self, description: &str)
    -> Result<Vec<FlowNode>, AdapterError>;

    /// Propose new positions for the nodes of `snapshot`.
    async fn relayout(&self, snapshot: &GraphSnapshot) -> Result<Vec<LayoutUpdate>, AdapterError>;
}

/// Which request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Generate,
    Relayout,
}

impl RequestKind {
    /// Text for the busy indicator.
    pub fn busy_message(self) -> &'static str {
        match self {
            RequestKind::Generate => "Generating flowchart from description...",
            RequestKind::Relayout => "Optimizing flowchart layout...",
        }
    }

    /// Text for the failure notice.
    pub fn failure_message(self) -> &'static str {
        match self {
            RequestKind::Generate => {
                "Sorry, a flowchart could not be generated from that description. Try phrasing it differently."
            }
            RequestKind::Relayout => "Sorry, the flowchart could not be laid out. Please try again.",
        }
    }
}

/// Result of one adapter round-trip, ready to apply.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated(Vec<FlowNode>),
    Relaid(Vec<LayoutUpdate>),
    Failed {
        kind: RequestKind,
        error: AdapterError,
    },
}

impl GenerationOutcome {
    pub fn kind(&self) -> RequestKind {
        match self {
            GenerationOutcome::Generated(_) => RequestKind::Generate,
            GenerationOutcome::Relaid(_) => RequestKind::Relayout,
            GenerationOutcome::Failed { kind, .. } => *kind,
        }
    }
}

/// Run a generation request. Blank descriptions fail without a request.
pub async fn run_generate(adapter: &dyn GenerationAdapter, description: &str) -> GenerationOutcome {
    let description = description.trim();
    if description.is_empty() {
        return GenerationOutcome::Failed {
            kind: RequestKind::Generate,
            error: AdapterError::BlankDescription,
        };
    }
    match adapter.generate_from_description(description).await {
        Ok(nodes) => GenerationOutcome::Generated(nodes),
        Err(error) => GenerationOutcome::Failed {
            kind: RequestKind::Generate,
            error,
        },
    }
}

pub async fn run_relayout(adapter: &dyn GenerationAdapter, snapshot: &GraphSnapshot) -> GenerationOutcome {
    match adapter.relayout(snapshot).await {
        Ok(updates) => GenerationOutcome::Relaid(updates),
        Err(error) => GenerationOutcome::Failed {
            kind: RequestKind::Relayout,
            error,
        },
    }
}

// ─── Shared editor ───────────────────────────────────────────────────────

/// An editor shared between the UI and in-flight adapter requests.
pub type SharedEditor = Arc<Mutex<Editor>>;

fn lock(editor: &SharedEditor) -> MutexGuard<'_, Editor> {
    editor.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Generate into a shared editor. The lock is held only to mark the request
/// and to apply its result, never across the await.
///
/// A blank description returns `BlankDescription` without starting a
/// request or setting a notice. Otherwise returns the number of nodes in
/// the new graph.
pub async fn generate_shared(
    editor: &SharedEditor,
    adapter: &dyn GenerationAdapter,
    description: &str,
) -> Result<usize, AdapterError> {
    if description.trim().is_empty() {
        log::debug!("generation skipped: blank description");
        return Err(AdapterError::BlankDescription);
    }
    lock(editor).begin_request(RequestKind::Generate);
    let outcome = run_generate(adapter, description).await;
    lock(editor).finish_request(outcome)
}

/// Relayout a shared editor. An empty graph is skipped without a request
/// (`Ok(0)`). Returns how many nodes moved.
pub async fn relayout_shared(
    editor: &SharedEditor,
    adapter: &dyn GenerationAdapter,
) -> Result<usize, AdapterError> {
    let snapshot = {
        let mut ed = lock(editor);
        if ed.graph().is_empty() {
            log::debug!("relayout skipped: graph is empty");
            return Ok(0);
        }
        ed.begin_request(RequestKind::Relayout);
        ed.snapshot()
    };
    let outcome = run_relayout(adapter, &snapshot).await;
    lock(editor).finish_request(outcome)
}
