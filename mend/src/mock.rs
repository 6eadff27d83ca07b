//! Scripted generator for testing.
//!
//! [`MockGenerator`] replays predefined outcomes in order and records every
//! prompt it was given, so tests can assert on call counts and on the
//! corrective feedback the repair loop appended.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GeneratorError;
use crate::generate::{GenerateRequest, TextGenerator};

/// A generator that returns scripted responses.
///
/// Outcomes are returned in sequence; once the script is used up the last
/// outcome repeats.
///
/// # Example
///
/// ```rust,ignore
/// use mend::mock::MockGenerator;
///
/// let generator = MockGenerator::new()
///     .respond(r#"{"answer": "Paris",}"#)
///     .respond(r#"{"answer": "Paris"}"#);
/// ```
#[derive(Debug, Default)]
pub struct MockGenerator {
    script: Vec<Result<String, GeneratorError>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockGenerator {
    /// Create a generator with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that always returns `text`.
    #[must_use]
    pub fn always(text: impl Into<String>) -> Self {
        Self::new().respond(text)
    }

    /// Append a successful response to the script.
    #[must_use]
    pub fn respond(mut self, text: impl Into<String>) -> Self {
        self.script.push(Ok(text.into()));
        self
    }

    /// Append a failure to the script.
    #[must_use]
    pub fn fail(mut self, error: GeneratorError) -> Self {
        self.script.push(Err(error));
        self
    }

    /// Sleep for `delay` before answering each call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeneratorError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Err(GeneratorError::internal("mock script is empty")))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
