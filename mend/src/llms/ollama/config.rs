//! Ollama connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how to reach an Ollama server.
///
/// Deserializes from a partial table; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Server root, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model used when a request does not name one.
    pub model: String,
    /// HTTP timeout for a whole request, in seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,
    /// How long the server keeps the model loaded ("5m", "0", ...).
    pub keep_alive: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
            keep_alive: None,
        }
    }
}

impl OllamaConfig {
    /// Local server on the standard port.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    /// Small general-purpose model.
    pub const DEFAULT_MODEL: &'static str = "llama3.2";
    /// Generous enough for a cold model load.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `model` as the default model.
    #[must_use]
    pub fn with_model(model: impl Into<String>) -> Self {
        Self::new().model(model)
    }

    /// Defaults overridden by `OLLAMA_BASE_URL`, `OLLAMA_MODEL` and
    /// `OLLAMA_KEEP_ALIVE` when set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().overlay(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup. Empty values are ignored.
    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("OLLAMA_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.model = model;
        }
        if let Some(keep_alive) = get("OLLAMA_KEEP_ALIVE") {
            self.keep_alive = Some(keep_alive);
        }
        self
    }

    /// Set the server root.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the HTTP timeout in seconds.
    #[must_use]
    pub const fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the keep-alive duration.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Chat endpoint. A trailing slash on the base URL is tolerated.
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}
