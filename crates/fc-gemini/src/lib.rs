//! Gemini `generateContent` adapter for flowchart generation and relayout.

pub mod client;
pub mod config;
pub mod prompt;

pub use client::{GeminiAdapter, Transport, TransportError, reply_text};
pub use config::{ConfigError, GeminiConfig};
