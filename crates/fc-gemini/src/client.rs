//! The Gemini-backed [`GenerationAdapter`].
//!
//! HTTP is the host's business: a browser host posts with `fetch`, a native
//! host with whatever client it already has. The adapter only builds request
//! bodies, hands them to a [`Transport`], and validates what comes back.

use crate::config::GeminiConfig;
use crate::prompt;
use async_trait::async_trait;
use fc_core::wire::{parse_generated_nodes, parse_layout};
use fc_core::{FlowNode, GraphSnapshot, LayoutUpdate, SchemaError};
use fc_editor::{AdapterError, GenerationAdapter};
use serde::Deserialize;
use serde_json::Value;

/// A failed HTTP round-trip.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Io(String),
}

impl From<TransportError> for AdapterError {
    fn from(err: TransportError) -> Self {
        AdapterError::Transport(err.to_string())
    }
}

/// Sends a JSON body and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST url` with `body` as JSON and `api_key` in the
    /// `x-goog-api-key` header.
    async fn post_json(&self, url: &str, api_key: &str, body: &Value)
    -> Result<String, TransportError>;
}

// Just the parts of a generateContent response we read.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Extract the model's text from a raw `generateContent` response:
/// every text part of the first candidate, joined and trimmed.
pub fn reply_text(raw: &str) -> Result<String, AdapterError> {
    let response: GenerateContentResponse =
        serde_json::from_str(raw).map_err(SchemaError::from)?;
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        log::warn!("prompt blocked: {reason}");
    }
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(AdapterError::EmptyReply);
    }
    Ok(text.to_string())
}

pub struct GeminiAdapter<T> {
    config: GeminiConfig,
    transport: T,
}

impl<T: Transport> GeminiAdapter<T> {
    pub fn new(config: GeminiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn complete(&self, body: &Value) -> Result<String, AdapterError> {
        let url = self.config.generate_content_url();
        let raw = self
            .transport
            .post_json(&url, &self.config.api_key, body)
            .await
            .inspect_err(|err| log::warn!("gemini request failed: {err}"))?;
        reply_text(&raw)
    }
}

#[async_trait]
impl<T: Transport> GenerationAdapter for GeminiAdapter<T> {
    async fn generate_from_description(
        &self,
        description: &str,
    ) -> Result<Vec<FlowNode>, AdapterError> {
        let text = self.complete(&prompt::generation_request(description)).await?;
        let nodes = parse_generated_nodes(&text)?;
        log::debug!("gemini generated {} nodes", nodes.len());
        Ok(nodes)
    }

    async fn relayout(&self, snapshot: &GraphSnapshot) -> Result<Vec<LayoutUpdate>, AdapterError> {
        let graph_json = snapshot.to_json()?;
        let text = self.complete(&prompt::layout_request(&graph_json)).await?;
        let updates = parse_layout(&text)?;
        log::debug!("gemini proposed {} positions", updates.len());
        Ok(updates)
    }
}
