//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mend::prelude::*;
//! ```

pub use crate::error::{Error, GeneratorError, GeneratorErrorKind, Result};
pub use crate::extract::extract;
pub use crate::generate::{GenerateRequest, SharedGenerator, TextGenerator};
pub use crate::llms::{Ollama, OllamaConfig};
pub use crate::mock::MockGenerator;
pub use crate::qa::{Citation, QaResponse};
pub use crate::repair::{
    AttemptOutcome, AttemptRecord, CancelSignal, RepairConfig, RepairLoop, Resolution, resolve,
};
pub use crate::schema::{Field, FieldKind, Kind, Schema};
pub use crate::validate::{Validated, ValidationFailure, Validator, Violation, validate};
