//! Watch the repair loop fix a broken reply, no model required.
//!
//! ```bash
//! RUST_LOG=mend=debug cargo run --example repair_mock
//! ```

#![allow(clippy::print_stdout)]

use mend::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let schema = Schema::new("Country")
        .field(Field::required("name", FieldKind::Text))
        .field(Field::required("capital", FieldKind::Text))
        .field(Field::required("population", FieldKind::Number));

    let generator = MockGenerator::new()
        .respond("France's capital is Paris.")
        .respond(r#"{"name": "France", "capital": "Paris",}"#)
        .respond("```json\n{\"name\": \"France\", \"capital\": \"Paris\", \"population\": 68000000}\n```");

    let resolution = RepairLoop::new(&generator, &schema)
        .max_attempts(3)
        .resolve_with_report("Tell me about France.", &CancelSignal::new())
        .await?;

    for attempt in &resolution.attempts {
        match attempt.outcome.error_message() {
            Some(error) => println!("attempt {}: {error}", attempt.index),
            None => println!("attempt {}: ok", attempt.index),
        }
    }
    println!("{}", resolution.value.to_pretty_json()?);

    Ok(())
}
