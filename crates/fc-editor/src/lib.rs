//! Flowchart editing engine.
//!
//! Input events go through the [`interaction::Controller`] state machine,
//! which reads the [`document::Document`] and returns effects; the
//! [`editor::Editor`] facade applies them, tracks edit sessions, and applies
//! generation adapter results.

pub mod document;
pub mod edit;
pub mod editor;
pub mod generate;
pub mod input;
pub mod interaction;
pub mod shortcuts;

pub use document::{Document, GraphMutation};
pub use edit::{EditOutcome, EditRequest, EditSession, EditTarget};
pub use editor::{Editor, Response};
pub use generate::{
    AdapterError, GenerationAdapter, GenerationOutcome, RequestKind, SharedEditor,
};
pub use input::{InputEvent, Modifiers};
pub use interaction::{Controller, Effect, InteractionConfig, InteractionState};
