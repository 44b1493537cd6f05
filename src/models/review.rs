use serde::{Deserialize, Serialize};

/// Sentinel used when no sentiment could be produced
pub const SENTIMENT_UNKNOWN: &str = "Unknown";

/// Conventional sentiment labels, in canonical casing
pub const CANONICAL_SENTIMENTS: [&str; 4] = ["Positive", "Mixed", "Negative", SENTIMENT_UNKNOWN];

/// Structured sentiment summary of a contractor's reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    #[serde(default)]
    pub positive_themes: Vec<String>,
    #[serde(default)]
    pub negative_themes: Vec<String>,
    /// Open enumeration, conventionally Positive | Mixed | Negative | Unknown
    #[serde(default = "unknown_sentiment")]
    pub overall_sentiment: String,
}

impl ReviewSummary {
    /// Summary with no themes and the "Unknown" sentinel
    pub fn unknown() -> Self {
        Self {
            positive_themes: Vec::new(),
            negative_themes: Vec::new(),
            overall_sentiment: SENTIMENT_UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.overall_sentiment == SENTIMENT_UNKNOWN
    }
}

impl Default for ReviewSummary {
    fn default() -> Self {
        Self::unknown()
    }
}

fn unknown_sentiment() -> String {
    SENTIMENT_UNKNOWN.to_string()
}
