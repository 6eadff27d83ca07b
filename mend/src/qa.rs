//! Question answering over a context document with cited sources.
//!
//! Provides the "answer + citations" [`Schema`], its typed counterpart
//! [`QaResponse`] and the prompt that asks a model to fill it in.

use serde::{Deserialize, Serialize};

use crate::schema::{Field, FieldKind, Schema};

/// Instructions prepended to every question.
pub const SYSTEM_INSTRUCTIONS: &str = r#"You are a financial analysis assistant.
Read the given context and answer the user's question.
You MUST respond ONLY as a JSON object matching this schema:
{
  "answer": "string",
  "citations": [
    {
      "source_id": "string",
      "quote": "string"
    }
  ]
}
- 'answer' should be concise but complete.
- 'citations' should include at least 1 exact quote from the context.
Return ONLY valid JSON. No markdown, no explanation, no code block."#;

/// Context used by demo mode.
pub const DEMO_CONTEXT: &str = r#"
Document A (id: doc_001): The company reported revenue of $50M in Q3, up 15% YoY.
Document B (id: doc_002): Operating margin improved to 22% due to cost savings.
Document C (id: doc_003): CEO stated: "We expect strong growth in fiscal 2025."
"#;

/// Question used by demo mode.
pub const DEMO_QUESTION: &str = "What was the revenue and growth in Q3?";

/// A quote supporting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// ID of the source chunk or document.
    pub source_id: String,
    /// Exact short quote from the source.
    pub quote: String,
}

/// A cited answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaResponse {
    /// Natural language answer to the question.
    pub answer: String,
    /// Citations that support the answer.
    pub citations: Vec<Citation>,
}

/// Schema of a single citation.
#[must_use]
pub fn citation_schema() -> Schema {
    Schema::new("Citation")
        .field(
            Field::required("source_id", FieldKind::Text)
                .describe("ID of the source chunk or document"),
        )
        .field(
            Field::required("quote", FieldKind::Text).describe("Exact short quote from the source"),
        )
}

/// Schema of a cited answer: required text plus at least one citation.
#[must_use]
pub fn schema() -> Schema {
    Schema::new("QaResponse")
        .field(
            Field::required("answer", FieldKind::Text)
                .describe("Natural language answer to the question"),
        )
        .field(
            Field::required("citations", FieldKind::list_of(citation_schema()).min_items(1))
                .describe("List of citations that support the answer"),
        )
}

/// Build the full prompt for `question` over `context`.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "{SYSTEM_INSTRUCTIONS}\n\nContext:\n{context}\n\nQuestion:\n{question}\n\nReturn ONLY JSON."
    )
}
