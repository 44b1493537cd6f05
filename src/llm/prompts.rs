/// System prompt for review summarization
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You summarize customer reviews of a local service contractor.

RULES:
1. Only use information present in the provided text.
2. Identify recurring positive themes and recurring negative themes as short phrases.
3. Choose overall_sentiment from exactly: Positive, Mixed, Negative, Unknown.
4. Use Unknown when the text contains no real customer feedback.
5. Return the result by calling the submit_review_summary tool. Do not answer in prose."#;

/// Name of the tool the model must call
pub const SUMMARY_TOOL_NAME: &str = "submit_review_summary";

/// Build the user prompt for summarization
///
/// Returns the prompt and whether the review text had to be truncated.
pub fn build_summary_prompt(reviews_text: &str, max_chars: usize) -> (String, bool) {
    let (text, truncated) = truncate_chars(reviews_text.trim(), max_chars);
    (format!("Reviews:\n{}", text), truncated)
}

/// Truncate to at most `max_chars` characters without splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// JSON schema for the summary tool input
pub fn summary_tool_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "positive_themes": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Key positive themes from reviews"
            },
            "negative_themes": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Key negative themes from reviews"
            },
            "overall_sentiment": {
                "type": "string",
                "enum": ["Positive", "Mixed", "Negative", "Unknown"]
            }
        },
        "required": ["positive_themes", "negative_themes", "overall_sentiment"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), ("hé", true));
        assert_eq!(truncate_chars("abc", 3), ("abc", false));
        assert_eq!(truncate_chars("", 5), ("", false));
    }

    #[test]
    fn test_build_summary_prompt() {
        let (prompt, truncated) = build_summary_prompt("  Great job!  ", 100);
        assert_eq!(prompt, "Reviews:\nGreat job!");
        assert!(!truncated);

        let long = "x".repeat(50);
        let (prompt, truncated) = build_summary_prompt(&long, 10);
        assert!(truncated);
        assert_eq!(prompt.len(), "Reviews:\n".len() + 10);
    }
}
