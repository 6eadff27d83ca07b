//! Mend - self-correcting structured output for language models
//!
//! This crate turns free-form model output into values that satisfy a
//! declared [`schema::Schema`]. Each attempt extracts the likely JSON
//! payload, parses it, validates it, and on failure feeds the concrete
//! error back to the model for another bounded try.
//!
//! The building blocks are:
//!
//! - [`schema`] / [`validate`]: field-level structural validation
//! - [`extract`]: best-effort payload extraction from fenced replies
//! - [`generate`]: the [`generate::TextGenerator`] seam and its request type
//! - [`llms`]: an Ollama chat client implementing that seam
//! - [`repair`]: the retry loop with cancellation and time limits
//! - [`qa`]: the cited-answer schema and prompt used by the CLI

pub mod error;
pub mod extract;
pub mod generate;
pub mod llms;
pub mod mock;
pub mod prelude;
pub mod prompt;
pub mod qa;
pub mod repair;
pub mod schema;
pub mod validate;

pub use error::{Error, GeneratorError, Result};
