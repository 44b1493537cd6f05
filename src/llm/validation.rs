use std::collections::HashSet;

use crate::models::{ReviewSummary, CANONICAL_SENTIMENTS, SENTIMENT_UNKNOWN};

/// Configuration for summary validation
#[derive(Debug, Clone)]
pub struct SummaryValidationConfig {
    /// Maximum themes kept per side
    pub max_themes: usize,
    /// Maximum characters per theme
    pub max_theme_chars: usize,
}

impl Default for SummaryValidationConfig {
    fn default() -> Self {
        Self {
            max_themes: 8,
            max_theme_chars: 120,
        }
    }
}

/// Clean up a model-produced summary
///
/// 1. Trim themes, drop blanks, and dedupe case-insensitively
/// 2. Cap theme count and length
/// 3. Canonicalize the conventional sentiment labels; other labels are kept
///    verbatim, a blank label becomes "Unknown"
pub fn validate_summary(summary: ReviewSummary, config: &SummaryValidationConfig) -> ReviewSummary {
    ReviewSummary {
        positive_themes: clean_themes(summary.positive_themes, config),
        negative_themes: clean_themes(summary.negative_themes, config),
        overall_sentiment: canonical_sentiment(&summary.overall_sentiment),
    }
}

/// Canonical casing for conventional labels
pub fn canonical_sentiment(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return SENTIMENT_UNKNOWN.to_string();
    }

    CANONICAL_SENTIMENTS
        .iter()
        .find(|canonical| canonical.eq_ignore_ascii_case(trimmed))
        .map(|canonical| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn clean_themes(themes: Vec<String>, config: &SummaryValidationConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    themes
        .into_iter()
        .map(|theme| {
            let trimmed = theme.trim();
            trimmed.chars().take(config.max_theme_chars).collect::<String>()
        })
        .filter(|theme| !theme.is_empty())
        .filter(|theme| seen.insert(theme.to_lowercase()))
        .take(config.max_themes)
        .collect()
}
