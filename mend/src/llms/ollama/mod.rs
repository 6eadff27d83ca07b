//! Ollama API client implementation.
//!
//! This module provides a [`TextGenerator`](crate::generate::TextGenerator)
//! backed by the Ollama local LLM server's chat endpoint.

mod chat;
mod client;
mod config;

pub use client::Ollama;
pub use config::OllamaConfig;
