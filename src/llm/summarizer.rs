use async_trait::async_trait;
use tracing::{error, info, warn};

use super::client::{AnthropicClient, AnthropicConfig, Tool};
use super::prompts::{
    build_summary_prompt, summary_tool_schema, SUMMARY_SYSTEM_PROMPT, SUMMARY_TOOL_NAME,
};
use super::validation::{validate_summary, SummaryValidationConfig};
use crate::models::ReviewSummary;

/// "Summarize text to structured sentiment" capability
///
/// Never fails: empty input, a missing client, or any fault yields
/// [`ReviewSummary::unknown`].
#[async_trait]
pub trait SentimentSummarizer: Send + Sync {
    async fn summarize_sentiment(&self, text: &str) -> ReviewSummary;
}

/// Configuration for the LLM summarizer
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Review text beyond this many characters is truncated before sending
    pub max_chars: usize,
    pub validation: SummaryValidationConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_chars: 12_000,
            validation: SummaryValidationConfig::default(),
        }
    }
}

/// Summarizer backed by the Anthropic Messages API
pub struct LlmSummarizer {
    client: Option<AnthropicClient>,
    config: SummarizerConfig,
}

impl LlmSummarizer {
    pub fn new(client: AnthropicClient, config: SummarizerConfig) -> Self {
        Self {
            client: Some(client),
            config,
        }
    }

    /// Build from optional API settings; without them every summary is "Unknown"
    pub fn from_config(api: Option<AnthropicConfig>, config: SummarizerConfig) -> Self {
        Self {
            client: api.map(AnthropicClient::new),
            config,
        }
    }

    /// A summarizer with no client configured
    pub fn unconfigured() -> Self {
        Self::from_config(None, SummarizerConfig::default())
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl SentimentSummarizer for LlmSummarizer {
    async fn summarize_sentiment(&self, text: &str) -> ReviewSummary {
        let clean_text = text.trim();
        if clean_text.is_empty() {
            warn!("Skipping review summarization because the review text is empty");
            return ReviewSummary::unknown();
        }

        let Some(client) = &self.client else {
            warn!("Skipping review summarization because ANTHROPIC_API_KEY is not configured");
            return ReviewSummary::unknown();
        };

        let (prompt, truncated) = build_summary_prompt(clean_text, self.config.max_chars);
        if truncated {
            warn!(
                chars = clean_text.chars().count(),
                max = self.config.max_chars,
                "Review text exceeds the limit; truncating before summarization"
            );
        }

        let tool = Tool {
            name: SUMMARY_TOOL_NAME.to_string(),
            description: "Submit the structured review summary".to_string(),
            input_schema: summary_tool_schema(),
        };

        info!(model = client.model(), "Starting review summarization");
        match client
            .send_with_tool::<ReviewSummary>(SUMMARY_SYSTEM_PROMPT, &prompt, tool)
            .await
        {
            Ok(summary) => {
                info!("Review summarization complete");
                validate_summary(summary, &self.config.validation)
            }
            Err(e) => {
                error!("Review summarization failed: {:#}", e);
                ReviewSummary::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_text_is_unknown() {
        let summarizer = LlmSummarizer::from_config(
            Some(AnthropicConfig::new("sk-test".to_string(), "m".to_string())),
            SummarizerConfig::default(),
        );
        assert!(summarizer.is_configured());

        let summary = summarizer.summarize_sentiment("   \n ").await;
        assert!(summary.is_unknown());
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_unknown() {
        let summarizer = LlmSummarizer::unconfigured();
        assert!(!summarizer.is_configured());

        let summary = summarizer.summarize_sentiment("Great crew, fast work").await;
        assert_eq!(summary, ReviewSummary::unknown());
    }

    #[test]
    fn test_summarizer_config_default() {
        assert_eq!(SummarizerConfig::default().max_chars, 12_000);
    }
}
