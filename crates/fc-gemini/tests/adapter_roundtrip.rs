//! Integration tests: the Gemini adapter over a recording stub transport,
//! driving a shared editor end to end.

use async_trait::async_trait;
use fc_core::{NodeId, NodeKind, Point, Size};
use fc_editor::generate::{generate_shared, relayout_shared};
use fc_editor::{AdapterError, Editor, GenerationAdapter};
use fc_gemini::{GeminiAdapter, GeminiConfig, Transport, TransportError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    url: String,
    api_key: String,
    body: Value,
}

/// Replies with the queued bodies in order and records every request.
struct StubTransport {
    replies: Mutex<Vec<Result<String, TransportError>>>,
    seen: Mutex<Vec<Recorded>>,
}

impl StubTransport {
    fn replying(replies: Vec<Result<String, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            seen: Mutex::default(),
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<String, TransportError> {
        self.seen.lock().unwrap().push(Recorded {
            url: url.to_string(),
            api_key: api_key.to_string(),
            body: body.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(TransportError::Io("no reply queued".into())))
    }
}

/// Wrap model text in a generateContent envelope.
fn envelope(text: &str) -> Result<String, TransportError> {
    Ok(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
    .to_string())
}

fn adapter(replies: Vec<Result<String, TransportError>>) -> GeminiAdapter<StubTransport> {
    let _ = env_logger::builder().is_test(true).try_init();
    GeminiAdapter::new(GeminiConfig::new("test-key"), StubTransport::replying(replies))
}

fn seen(adapter: &GeminiAdapter<StubTransport>) -> Vec<Recorded> {
    adapter.transport().seen.lock().unwrap().clone()
}

#[tokio::test]
async fn generate_then_relayout() {
    let generation = r#"{"nodes":[
        {"id":"g1","type":"creative","text":"Login","position":{"x":0,"y":0}},
        {"id":"g2","type":"general_affairs","text":"Dashboard","position":{"x":200,"y":0}}
    ]}"#;
    let layout = r#"[
        {"id":"g1","type":"creative","text":"Login","position":{"x":40,"y":60}},
        {"id":"g2","type":"general_affairs","text":"Dashboard","position":{"x":40,"y":220}}
    ]"#;
    let adapter = adapter(vec![envelope(generation), envelope(layout)]);
    let editor = Arc::new(Mutex::new(Editor::new(Size::new(800.0, 600.0))));

    assert_eq!(
        generate_shared(&editor, &adapter, "login, then dashboard")
            .await
            .unwrap(),
        2
    );
    assert_eq!(relayout_shared(&editor, &adapter).await.unwrap(), 2);

    {
        let ed = editor.lock().unwrap();
        let g = ed.graph();
        assert_eq!(g.edge_count(), 0);
        assert_eq!(
            g.node(NodeId::intern("g1")).unwrap().position,
            Point::new(40.0, 60.0)
        );
        assert_eq!(
            g.node(NodeId::intern("g2")).unwrap().kind,
            NodeKind::GeneralAffairs
        );
    }

    let requests = seen(&adapter);
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.ends_with("/models/gemini-2.5-flash:generateContent"));
    assert_eq!(requests[0].api_key, "test-key");
    assert_eq!(
        requests[0].body["contents"][0]["parts"][0]["text"],
        "login, then dashboard"
    );
    // The layout prompt carries the snapshot of the generated graph.
    let layout_prompt = requests[1].body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(layout_prompt.contains("\"id\": \"g1\""));
    assert!(layout_prompt.contains("\"edges\": []"));
}

#[tokio::test]
async fn transport_failure_is_adapter_failure() {
    let adapter = adapter(vec![Err(TransportError::Status {
        status: 503,
        body: "unavailable".into(),
    })]);
    let err = adapter.generate_from_description("anything").await.unwrap_err();
    assert!(matches!(err, AdapterError::Transport(msg) if msg.contains("503")));
}

#[tokio::test]
async fn model_text_outside_schema_is_rejected() {
    let adapter = adapter(vec![
        envelope(r#"{"nodes":[{"id":"x","type":"decision","text":"?","position":{"x":0,"y":0}}]}"#),
        envelope("Sure! Here is your flowchart."),
        Ok(json!({ "candidates": [] }).to_string()),
    ]);
    for _ in 0..2 {
        let err = adapter.generate_from_description("x").await.unwrap_err();
        assert!(matches!(err, AdapterError::Schema(_)), "{err}");
    }
    let err = adapter.generate_from_description("x").await.unwrap_err();
    assert!(matches!(err, AdapterError::EmptyReply));
}
