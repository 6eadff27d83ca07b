//! Ollama API client and the `/api/chat` wire format.

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, GeneratorError, Result};
use crate::generate::GenerateRequest;

use super::config::OllamaConfig;

/// Body of a non-streaming `/api/chat` call.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatBody {
    pub model: String,
    pub messages: [ChatMessage; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    pub options: SamplingOptions,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

/// The subset of Ollama's `options` object this client sets.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct SamplingOptions {
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// `{"error": "..."}` body returned on failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Ollama chat client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) config: Arc<OllamaConfig>,
    pub(crate) http_client: Client,
}

impl Ollama {
    /// Create a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http_client = builder.build().map_err(|e| {
            Error::from(
                GeneratorError::internal(format!("Failed to create HTTP client: {e}"))
                    .with_provider("ollama"),
            )
        })?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// Create a client for a local server with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OllamaConfig::default())
    }

    /// Create a client configured from `OLLAMA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env())
    }

    /// Server root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Model used when a request names none.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the request body. The prompt travels as a single user message.
    pub(crate) fn build_body(&self, request: &GenerateRequest) -> ChatBody {
        let model = if request.model.is_empty() {
            &self.config.model
        } else {
            &request.model
        };

        ChatBody {
            model: model.clone(),
            messages: [ChatMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            format: request.format.clone(),
            options: SamplingOptions {
                temperature: request.temperature,
            },
            stream: false,
            keep_alive: self.config.keep_alive.clone(),
        }
    }

    /// Map a non-success response to a [`GeneratorError`].
    pub(crate) fn parse_error(status: u16, body: &str) -> GeneratorError {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { error }) => GeneratorError::provider("ollama", error),
            Err(_) => GeneratorError::http_status(status, body).with_provider("ollama"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GeneratorErrorKind;

    #[test]
    fn client_exposes_config() {
        let client = Ollama::new(
            OllamaConfig::new()
                .base_url("http://custom:11434")
                .model("llama3"),
        )
        .unwrap();

        assert_eq!(client.base_url(), "http://custom:11434");
        assert_eq!(client.model(), "llama3");
        assert_eq!(
            Ollama::with_defaults().unwrap().model(),
            OllamaConfig::DEFAULT_MODEL
        );
    }

    #[test]
    fn body_falls_back_to_default_model() {
        let client = Ollama::new(OllamaConfig::with_model("qwen3")).unwrap();
        let json = serde_json::to_value(client.build_body(&GenerateRequest::new("hello"))).unwrap();

        assert_eq!(json["model"], "qwen3");
        assert_eq!(
            json["messages"],
            serde_json::json!([{"role": "user", "content": "hello"}])
        );
        assert_eq!(json["stream"], false);
        assert!(json.get("format").is_none());
    }

    #[test]
    fn body_uses_request_model_and_format() {
        let client = Ollama::new(OllamaConfig::new().keep_alive("0")).unwrap();
        let request = GenerateRequest::new("hi")
            .model("mistral")
            .temperature(0.5)
            .format(serde_json::json!({"type": "object"}));
        let json = serde_json::to_value(client.build_body(&request)).unwrap();

        assert_eq!(json["model"], "mistral");
        assert_eq!(json["format"]["type"], "object");
        assert_eq!(json["options"]["temperature"], 0.5);
        assert_eq!(json["keep_alive"], "0");
    }

    #[test]
    fn error_body_becomes_provider_error() {
        let err = Ollama::parse_error(404, r#"{"error": "model 'x' not found"}"#);
        assert_eq!(err.kind, GeneratorErrorKind::Provider);
        assert!(err.to_string().contains("model 'x' not found"));
    }

    #[test]
    fn raw_body_becomes_http_status_error() {
        let err = Ollama::parse_error(502, "bad gateway");
        assert_eq!(err.kind, GeneratorErrorKind::HttpStatus);
        assert_eq!(err.code.as_deref(), Some("502"));
    }
}
