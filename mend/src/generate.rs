//! The text generator collaborator.
//!
//! This module provides:
//! - [`GenerateRequest`]: prompt, model and sampling temperature
//! - [`TextGenerator`]: the capability the repair loop drives
//!
//! The repair loop makes no assumption about transport; a generator may
//! talk HTTP, spawn a process or return canned text.
//!
//! # Example
//!
//! ```rust,ignore
//! use mend::prelude::*;
//!
//! let request = GenerateRequest::new("What is the capital of France?")
//!     .model("llama3.2")
//!     .temperature(0.1);
//!
//! let text = generator.generate(&request).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GeneratorError;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A single text generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The full prompt.
    pub prompt: String,

    /// Model identifier. Empty means the generator's default.
    #[serde(default)]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional JSON Schema constraining the output, for backends that
    /// support constrained decoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

const fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl GenerateRequest {
    /// Creates a request for `prompt` with default model and temperature.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            format: None,
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the output format schema.
    #[must_use]
    pub fn format(mut self, schema: Value) -> Self {
        self.format = Some(schema);
        self
    }
}

/// Core trait for text generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeneratorError`] if the backend is unreachable or reports
    /// a failure.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeneratorError>;

    /// Provider name for logs (e.g., "ollama").
    fn provider_name(&self) -> &'static str;
}

/// A shared, thread-safe generator.
pub type SharedGenerator = Arc<dyn TextGenerator>;

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeneratorError> {
        (**self).generate(request).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builder_sets_fields() {
        let req = GenerateRequest::new("hi")
            .model("llama3.2")
            .temperature(0.7)
            .format(json!({"type": "object"}));
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.model, "llama3.2");
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.format.is_some());
    }

    #[test]
    fn defaults_apply_on_deserialize() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"prompt": "hi"}"#).expect("valid request");
        assert!(req.model.is_empty());
        assert!((req.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        assert!(req.format.is_none());
    }
}
