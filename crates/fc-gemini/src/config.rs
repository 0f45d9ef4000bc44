//! Adapter configuration.

use std::fmt;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key: set GEMINI_API_KEY or API_KEY")]
    MissingApiKey,
    #[error("{name} is set but empty")]
    Empty { name: &'static str },
}

/// Where and how to reach the model.
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL up to and including the API version.
    pub endpoint: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Read `GEMINI_API_KEY` (falling back to `API_KEY`), `GEMINI_MODEL` and
    /// `GEMINI_ENDPOINT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let mut config = Self::new(api_key.trim());
        if let Some(model) = lookup("GEMINI_MODEL") {
            if model.trim().is_empty() {
                return Err(ConfigError::Empty {
                    name: "GEMINI_MODEL",
                });
            }
            config.model = model.trim().to_string();
        }
        if let Some(endpoint) = lookup("GEMINI_ENDPOINT") {
            if endpoint.trim().is_empty() {
                return Err(ConfigError::Empty {
                    name: "GEMINI_ENDPOINT",
                });
            }
            config.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        log::debug!("gemini config: model {} at {}", config.model, config.endpoint);
        Ok(config)
    }

    /// `POST` target for a `generateContent` call.
    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}
