//! The repair loop: bounded generate, extract, parse, validate cycles.
//!
//! [`RepairLoop`] drives a [`TextGenerator`] until its output validates:
//!
//! 1. Generate text from the accumulated prompt
//! 2. Extract the likely payload ([`crate::extract::extract`])
//! 3. Parse it as JSON
//! 4. Validate it against the injected [`Validator`]
//! 5. On failure, append corrective feedback naming the error and retry
//!
//! The loop stops on the first valid value, after `max_attempts` failed
//! attempts ([`Error::Exhausted`]), on the first generator failure
//! ([`Error::Generator`], never retried) or when cancelled
//! ([`Error::Cancelled`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use mend::prelude::*;
//!
//! let generator = Ollama::from_env()?;
//! let schema = mend::qa::schema();
//!
//! let validated = RepairLoop::new(&generator, &schema)
//!     .max_attempts(3)
//!     .resolve(mend::qa::build_prompt(context, question))
//!     .await?;
//! let answer: QaResponse = validated.deserialize()?;
//! ```

mod cancel;

pub use cancel::CancelSignal;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::{Error, Result};
use crate::extract::extract;
use crate::generate::{DEFAULT_TEMPERATURE, GenerateRequest, TextGenerator};
use crate::prompt::append_feedback;
use crate::schema::Schema;
use crate::validate::{Validated, ValidationFailure, Validator};

/// Default number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Settings for a repair run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Maximum number of generator calls. Must be at least 1.
    pub max_attempts: usize,
    /// Model identifier passed to the generator. Empty means its default.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-call time limit, in seconds. Elapsing aborts the whole run.
    pub timeout_secs: Option<u64>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: None,
        }
    }
}

/// What one attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Parsed and validated.
    Valid,
    /// The extracted text was not valid JSON.
    Malformed(String),
    /// Valid JSON that violates the schema.
    Invalid(ValidationFailure),
}

impl AttemptOutcome {
    /// The error fed back to the model, if the attempt failed.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Valid => None,
            Self::Malformed(msg) => Some(format!("JSON decode error: {msg}")),
            Self::Invalid(failure) => Some(format!("Schema validation error: {failure}")),
        }
    }
}

/// Record of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub index: usize,
    /// Raw generator output.
    pub raw_output: String,
    /// Text handed to the JSON parser.
    pub extracted: String,
    /// Result of parsing and validation.
    pub outcome: AttemptOutcome,
}

/// A successful run: the validated value plus every attempt that led to it.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The validated value.
    pub value: Validated,
    /// Attempts in order; the last one is the successful one.
    pub attempts: Vec<AttemptRecord>,
}

/// Bounded self-correcting structured output loop.
#[derive(Clone, Copy)]
pub struct RepairLoop<'a> {
    generator: &'a dyn TextGenerator,
    validator: &'a dyn Validator,
    format: Option<&'a Value>,
    max_attempts: usize,
    temperature: f32,
    timeout: Option<Duration>,
    model: &'a str,
}

impl std::fmt::Debug for RepairLoop<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepairLoop")
            .field("provider", &self.generator.provider_name())
            .field("validator", &self.validator.name())
            .field("max_attempts", &self.max_attempts)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("has_format", &self.format.is_some())
            .finish()
    }
}

impl<'a> RepairLoop<'a> {
    /// Create a loop with default settings.
    #[must_use]
    pub fn new(generator: &'a dyn TextGenerator, validator: &'a dyn Validator) -> Self {
        Self {
            generator,
            validator,
            format: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
            model: "",
        }
    }

    /// Apply every setting from `config`.
    #[must_use]
    pub fn config(mut self, config: &'a RepairConfig) -> Self {
        self.max_attempts = config.max_attempts;
        self.model = &config.model;
        self.temperature = config.temperature;
        self.timeout = config.timeout_secs.map(Duration::from_secs);
        self
    }

    /// Set the maximum number of generator calls.
    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub const fn model(mut self, model: &'a str) -> Self {
        self.model = model;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Limit each generator call to `timeout`.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Pass a JSON Schema to generators that support constrained output.
    #[must_use]
    pub const fn format(mut self, schema: &'a Value) -> Self {
        self.format = Some(schema);
        self
    }

    /// Run until the output validates.
    ///
    /// # Errors
    ///
    /// See [`RepairLoop::resolve_with_report`].
    pub async fn resolve(&self, prompt: impl Into<String>) -> Result<Validated> {
        self.resolve_with_cancel(prompt, &CancelSignal::new()).await
    }

    /// Run until the output validates or `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`RepairLoop::resolve_with_report`].
    pub async fn resolve_with_cancel(
        &self,
        prompt: impl Into<String>,
        cancel: &CancelSignal,
    ) -> Result<Validated> {
        self.resolve_with_report(prompt, cancel)
            .await
            .map(|resolution| resolution.value)
    }

    /// Run and return the validated value together with the attempt history.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `max_attempts` is zero
    /// - [`Error::Generator`] on the first generator failure
    /// - [`Error::Cancelled`] if `cancel` fires or a call times out
    /// - [`Error::Exhausted`] after `max_attempts` unusable outputs
    pub async fn resolve_with_report(
        &self,
        prompt: impl Into<String>,
        cancel: &CancelSignal,
    ) -> Result<Resolution> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config("max_attempts must be at least 1"));
        }

        let span = info_span!(
            "repair",
            validator = self.validator.name(),
            provider = self.generator.provider_name(),
            max_attempts = self.max_attempts,
        );

        self.run(prompt.into(), cancel).instrument(span).await
    }

    async fn run(&self, mut prompt: String, cancel: &CancelSignal) -> Result<Resolution> {
        let mut attempts = Vec::with_capacity(self.max_attempts);
        let mut last_error = String::new();

        for index in 1..=self.max_attempts {
            debug!(attempt = index, prompt_len = prompt.len(), "generating");
            let raw_output = self.call_generator(&prompt, cancel).await?;
            let extracted = extract(&raw_output).to_owned();

            let outcome = match self.evaluate(&extracted) {
                Ok(value) => {
                    info!(attempt = index, "output validated");
                    attempts.push(AttemptRecord {
                        index,
                        raw_output,
                        extracted,
                        outcome: AttemptOutcome::Valid,
                    });
                    return Ok(Resolution { value, attempts });
                }
                Err(outcome) => outcome,
            };

            last_error = outcome.error_message().unwrap_or_default();
            attempts.push(AttemptRecord {
                index,
                raw_output,
                extracted,
                outcome,
            });

            if index < self.max_attempts {
                warn!(
                    attempt = index,
                    error = %last_error,
                    "invalid output, retrying with feedback"
                );
                append_feedback(&mut prompt, &last_error);
            }
        }

        error!(attempts = self.max_attempts, error = %last_error, "repair attempts exhausted");
        Err(Error::exhausted(self.max_attempts, last_error))
    }

    /// Parse and validate one extracted payload.
    fn evaluate(&self, extracted: &str) -> std::result::Result<Validated, AttemptOutcome> {
        let candidate: Value = serde_json::from_str(extracted)
            .map_err(|e| AttemptOutcome::Malformed(e.to_string()))?;
        self.validator
            .validate(&candidate)
            .map_err(AttemptOutcome::Invalid)
    }

    /// One generator call, raced against cancellation and the time limit.
    async fn call_generator(&self, prompt: &str, cancel: &CancelSignal) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled(cancel.reason()));
        }

        let mut request = GenerateRequest::new(prompt)
            .model(self.model)
            .temperature(self.temperature);
        if let Some(schema) = self.format {
            request = request.format(schema.clone());
        }

        let call = async {
            match self.timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, self.generator.generate(&request)).await {
                        Ok(result) => result.map_err(Error::from),
                        Err(_) => Err(Error::cancelled(format!(
                            "generator call timed out after {limit:?}"
                        ))),
                    }
                }
                None => self.generator.generate(&request).await.map_err(Error::from),
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!(reason = cancel.reason(), "generator call cancelled");
                Err(Error::cancelled(cancel.reason()))
            }
            result = call => result,
        }
    }
}

/// Resolve `prompt` against `schema` with at most `max_attempts` calls.
///
/// Convenience wrapper over [`RepairLoop`] with default model and
/// temperature.
///
/// # Errors
///
/// See [`RepairLoop::resolve_with_report`].
pub async fn resolve(
    prompt: impl Into<String>,
    schema: &Schema,
    generator: &dyn TextGenerator,
    max_attempts: usize,
) -> Result<Validated> {
    RepairLoop::new(generator, schema)
        .max_attempts(max_attempts)
        .resolve(prompt)
        .await
}
