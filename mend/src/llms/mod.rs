//! Text generator backends.
//!
//! Each backend is organized into its own submodule.
//!
//! # Available Backends
//!
//! - [`ollama`] - Ollama local LLM server

pub mod ollama;

pub use ollama::{Ollama, OllamaConfig};
