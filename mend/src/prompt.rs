//! Prompt fragments used by the repair loop.

/// Separator placed before each block of corrective feedback.
pub const FEEDBACK_SEPARATOR: &str = "---";

/// Build the feedback block appended to the prompt after a failed attempt.
///
/// The block quotes the concrete error so the model can see exactly what
/// it got wrong.
#[must_use]
pub fn corrective_feedback(error: &str) -> String {
    format!(
        "\n{FEEDBACK_SEPARATOR}\n\
         Your previous response was invalid:\n\
         {error}\n\n\
         Please fix the JSON and return ONLY valid JSON matching the schema. No other text.\n"
    )
}

/// Append feedback for `error` to `prompt`.
///
/// Earlier feedback is never removed, so the model sees the full history of
/// its mistakes.
pub fn append_feedback(prompt: &mut String, error: &str) {
    prompt.push_str(&corrective_feedback(error));
}
