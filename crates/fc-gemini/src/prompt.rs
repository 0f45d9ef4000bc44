//! Request bodies for the two flowchart calls.
//!
//! Both calls ask for JSON output constrained by a `responseSchema`, so the
//! reply text parses straight into the `fc_core::wire` shapes.

use serde_json::{Value, json};

const GENERATION_INSTRUCTION: &str = "You are an expert at turning text descriptions into \
flowchart data structures. Analyze the user's text and convert it into a JSON object containing \
an array of nodes. Do not generate edges (lines). The origin (0,0) is the top-left corner of the \
canvas. Place the nodes in a logical, clean and visually appealing layout with generous spacing. \
Give each node a short, concise text label. Use the 'creative' type for creative tasks such as \
brainstorming, design and strategy, and the 'general_affairs' type for administrative tasks such \
as management, logistics and procedures.";

const LAYOUT_INSTRUCTION: &str = "You are an expert in graph layout algorithms. Your task is to \
rearrange the 'position' of flowchart nodes to produce a clean, organized and readable diagram.";

fn position_schema(x_description: &str, y_description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "x": { "type": "INTEGER", "description": x_description },
            "y": { "type": "INTEGER", "description": y_description },
        },
        "required": ["x", "y"],
    })
}

/// `{ nodes: [node] }` with the node kind restricted to the known names.
pub fn generation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "nodes": {
                "type": "ARRAY",
                "description": "Array of flowchart node objects.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING", "description": "Unique node identifier, e.g. 'node1'." },
                        "type": {
                            "type": "STRING",
                            "description": "Node kind.",
                            "enum": ["creative", "general_affairs"],
                        },
                        "text": { "type": "STRING", "description": "Text shown inside the node." },
                        "position": position_schema("X of the top-left corner.", "Y of the top-left corner."),
                    },
                    "required": ["id", "type", "text", "position"],
                },
            },
        },
        "required": ["nodes"],
    })
}

/// A bare array of nodes with updated positions.
pub fn layout_schema() -> Value {
    json!({
        "type": "ARRAY",
        "description": "Array of flowchart node objects with updated positions.",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING", "description": "Unique node identifier." },
                "type": { "type": "STRING", "description": "Node kind." },
                "text": { "type": "STRING", "description": "Node text." },
                "position": position_schema("Updated X coordinate.", "Updated Y coordinate."),
            },
            "required": ["id", "type", "text", "position"],
        },
    })
}

fn request(instruction: &str, user_text: &str, schema: Value) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": user_text }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        },
    })
}

/// Body for description → node set.
pub fn generation_request(description: &str) -> Value {
    request(GENERATION_INSTRUCTION, description, generation_schema())
}

/// Body for relayout; `graph_json` is the serialized graph snapshot.
pub fn layout_request(graph_json: &str) -> Value {
    let text = format!(
        "Here is the current flowchart data: {graph_json}. Provide only the updated array of \
         nodes with optimized positions so the layout is clean, organized and easy to read. Do \
         not change any other property such as ids, text or connections (edges). The origin \
         (0,0) is the top-left. Make sure nodes do not overlap and keep adequate spacing."
    );
    request(LAYOUT_INSTRUCTION, &text, layout_schema())
}
