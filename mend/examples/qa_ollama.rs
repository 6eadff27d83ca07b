//! Cited question answering against a local Ollama server.
//!
//! ```bash
//! ollama pull llama3.2
//! cargo run --example qa_ollama
//! ```

#![allow(clippy::print_stdout)]

use mend::prelude::*;
use mend::qa;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let client = Ollama::from_env()?;
    let schema = qa::schema();
    let format = schema.json_schema();

    let validated = RepairLoop::new(&client, &schema)
        .max_attempts(3)
        .format(&format)
        .resolve(qa::build_prompt(qa::DEMO_CONTEXT, qa::DEMO_QUESTION))
        .await?;

    let response: QaResponse = validated.deserialize()?;
    println!("{}", response.answer);
    for citation in &response.citations {
        println!("  [{}] {}", citation.source_id, citation.quote);
    }

    Ok(())
}
