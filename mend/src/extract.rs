//! Payload extraction from free-form model output.
//!
//! Models asked for JSON frequently wrap it in a fenced block or surround it
//! with prose. [`extract`] isolates the substring most likely to be the
//! payload. It never fails; rejecting garbage is the parser's job.

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Isolate the likely structured payload in `raw`.
///
/// 1. Trim surrounding whitespace.
/// 2. If a ```` ```json ```` block is closed, return its trimmed contents.
/// 3. Otherwise, if any ```` ``` ```` pair exists, return the trimmed contents
///    of the first one (skipping a one-word info string such as `text`).
/// 4. Otherwise return the trimmed input.
///
/// Unterminated fences never produce a fragment; they fall through to the
/// next step.
#[must_use]
pub fn extract(raw: &str) -> &str {
    let text = raw.trim();

    if let Some(inner) = tagged_block(text) {
        return inner;
    }
    if let Some(inner) = generic_block(text) {
        return inner;
    }
    text
}

fn tagged_block(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

fn generic_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    let inner = skip_info_string(&rest[..end]);
    Some(inner.trim())
}

/// Drop a language tag on the opening fence line, if present.
///
/// A tag is one word starting with a letter. JSON literals (`true`, `false`,
/// `null`) and numbers on that line are payload, not tags.
fn skip_info_string(block: &str) -> &str {
    let Some(newline) = block.find('\n') else {
        return block;
    };
    let first_line = block[..newline].trim_end_matches('\r');
    let is_tag = first_line.starts_with(|c: char| c.is_ascii_alphabetic())
        && !matches!(first_line, "true" | "false" | "null")
        && first_line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'));
    if is_tag { &block[newline + 1..] } else { block }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_payload_is_trimmed() {
        assert_eq!(extract("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(extract(""), "");
        assert_eq!(extract(" \n\t "), "");
    }

    #[test]
    fn tagged_block_wins_over_prose() {
        let raw = "Sure! Here is the answer you asked for:\n\n```json\n{\"answer\": \"Paris\"}\n```\n\nLet me know if you need more.";
        assert_eq!(extract(raw), "{\"answer\": \"Paris\"}");
    }

    #[test]
    fn tagged_block_preferred_over_earlier_generic_block() {
        let raw = "```\nnot this\n```\nthen\n```json\n{\"x\": true}\n```";
        assert_eq!(extract(raw), "{\"x\": true}");
    }

    #[test]
    fn first_tagged_block_is_used() {
        let raw = "```json\n{\"n\": 1}\n```\n```json\n{\"n\": 2}\n```";
        assert_eq!(extract(raw), "{\"n\": 1}");
    }

    #[test]
    fn unterminated_tagged_block_falls_through() {
        let raw = "```json\n{\"answer\": \"Paris\"}";
        assert_eq!(extract(raw), raw);
    }

    #[test]
    fn unterminated_tagged_block_falls_back_to_generic() {
        let raw = "```\n{\"a\": 1}\n```\ntrailing ```json {";
        assert_eq!(extract(raw), "{\"a\": 1}");
    }

    #[test]
    fn generic_block_is_used_without_tag() {
        let raw = "Result:\n```\n[1, 2, 3]\n```";
        assert_eq!(extract(raw), "[1, 2, 3]");
    }

    #[test]
    fn generic_block_skips_other_info_string() {
        let raw = "```text\n{\"a\": 1}\n```";
        assert_eq!(extract(raw), "{\"a\": 1}");
    }

    #[test]
    fn json_literal_on_fence_line_is_payload() {
        assert_eq!(extract("```true\n```"), "true");
        assert_eq!(extract("```null\n```"), "null");
        assert_eq!(extract("```42\n```"), "42");
    }

    #[test]
    fn inline_generic_block_keeps_content() {
        assert_eq!(extract("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn extraction_is_idempotent_on_unfenced_text() {
        for raw in ["{\"a\": 1}", "  plain prose  ", "", "{\"answer\": \"Paris\",}"] {
            let once = extract(raw);
            assert_eq!(extract(once), once);
        }
    }

    #[test]
    fn extraction_is_idempotent_on_fenced_text() {
        let raw = "intro\n```json\n  {\"a\": [1, 2]}  \n```\noutro";
        let once = extract(raw);
        assert_eq!(extract(once), once);
    }

    #[test]
    fn fenced_precedence_regardless_of_prose_length() {
        let payload = "{\"answer\": \"Paris\", \"citations\": []}";
        let long = "lorem ipsum { not json } ".repeat(200);
        for prose in ["", "ok", long.as_str()] {
            let raw = format!("{prose}\n```json\n{payload}\n```\n{prose}");
            assert_eq!(extract(&raw), payload);
        }
    }
}
