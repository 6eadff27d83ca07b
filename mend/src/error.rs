//! Error types for the mend crate.
//!
//! The hierarchy separates the failure kinds a caller has to tell apart:
//! - [`GeneratorError`]: the text generator itself failed (transport, backend)
//! - [`Error::Exhausted`]: every repair attempt produced unusable output
//! - [`Error::Cancelled`]: the run was cancelled or timed out mid-call

use std::fmt;

/// Result type alias for mend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the mend crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The text generator failed. Never retried by the repair loop.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// All attempts produced malformed or schema-violating output.
    #[error("Failed after {attempts} attempt{}. Last error: {last_error}", plural(.attempts))]
    Exhausted {
        /// Number of generator calls made.
        attempts: usize,
        /// The last concrete parse or validation error.
        last_error: String,
    },

    /// A generator call was cancelled or timed out.
    #[error("Cancelled: {reason}")]
    Cancelled {
        /// Why the run stopped.
        reason: String,
    },

    /// Invalid loop or client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

impl Error {
    /// Create a retry exhaustion error.
    #[must_use]
    pub fn exhausted(attempts: usize, last_error: impl Into<String>) -> Self {
        Self::Exhausted {
            attempts,
            last_error: last_error.into(),
        }
    }

    /// Create a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the repair loop ran out of attempts.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Whether the generator failed.
    #[must_use]
    pub const fn is_generator(&self) -> bool {
        matches!(self, Self::Generator(_))
    }

    /// Whether the run was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Short label naming the failure kind, for user-facing reports.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Generator(_) => "generator failure",
            Self::Exhausted { .. } => "retry exhaustion",
            Self::Cancelled { .. } => "cancelled",
            Self::InvalidConfig(_) => "invalid configuration",
            Self::Json(_) => "serialization failure",
        }
    }
}

/// Error type for text generator operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GeneratorError {
    /// The error kind.
    pub kind: GeneratorErrorKind,
    /// The provider name (e.g., "ollama").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of generator errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorErrorKind {
    /// Network or connection error.
    Network,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
    /// The backend answered with something that is not a generation response.
    ResponseFormat,
    /// Internal error.
    Internal,
}

impl GeneratorError {
    fn new(kind: GeneratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            provider: None,
            message: message.into(),
            code: None,
        }
    }

    /// The backend could not be reached or the transfer broke off.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Network, message)
    }

    /// Non-success HTTP status with an unstructured body.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let mut err = Self::new(
            GeneratorErrorKind::HttpStatus,
            format!("HTTP {status}: {}", body.into()),
        );
        err.code = Some(status.to_string());
        err
    }

    /// Failure reported by the backend itself (unknown model, overload).
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Provider, message).with_provider(provider)
    }

    /// Response body that is not the expected envelope.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::new(
            GeneratorErrorKind::ResponseFormat,
            format!("Expected {}, got {}", expected.into(), got.into()),
        )
    }

    /// Client-side failure unrelated to the backend.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Internal, message)
    }

    /// Attach the provider name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for GeneratorError {}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}
