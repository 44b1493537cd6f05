use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SummaryConfig;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Build from loaded summary settings; `None` when no API key is configured
    pub fn from_summary_config(config: &SummaryConfig) -> Option<Self> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.model.clone()))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 2048,
        }
    }
}

/// A tool the model is forced to call; its input is the structured output
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a message with forced tool use and decode the tool input as `T`
    pub async fn send_with_tool<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        tool: Tool,
    ) -> Result<T> {
        let tool_name = tool.name.clone();
        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![tool],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: tool_name.clone(),
            }),
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        extract_tool_input(response, &tool_name)
    }
}

/// Find the forced tool call in a response and decode its input
fn extract_tool_input<T: DeserializeOwned>(response: AnthropicResponse, tool_name: &str) -> Result<T> {
    for content in response.content {
        if content.content_type == "tool_use" && content.name.as_deref() == Some(tool_name) {
            if let Some(input) = content.input {
                return serde_json::from_value(input)
                    .with_context(|| format!("Failed to parse {} tool input", tool_name));
            }
        }
    }

    anyhow::bail!("No tool_use response found for {}", tool_name)
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewSummary;

    #[test]
    fn test_extract_tool_input() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Here is the summary"},
                {"type": "tool_use", "name": "submit_review_summary", "input": {
                    "positive_themes": ["punctual"],
                    "negative_themes": [],
                    "overall_sentiment": "Positive"
                }}
            ]
        }))
        .unwrap();

        let summary: ReviewSummary = extract_tool_input(response, "submit_review_summary").unwrap();
        assert_eq!(summary.overall_sentiment, "Positive");
        assert_eq!(summary.positive_themes, vec!["punctual"]);
    }

    #[test]
    fn test_missing_tool_call_is_an_error() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "no tool"}]
        }))
        .unwrap();

        let result: Result<ReviewSummary> = extract_tool_input(response, "submit_review_summary");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_summary_settings() {
        let missing = SummaryConfig {
            api_key: None,
            model: "m".to_string(),
        };
        assert!(AnthropicConfig::from_summary_config(&missing).is_none());

        let present = SummaryConfig {
            api_key: Some("sk-test".to_string()),
            model: "m".to_string(),
        };
        let config = AnthropicConfig::from_summary_config(&present).unwrap();
        assert_eq!(config.model, "m");
        assert_eq!(config.temperature, 0.1);
    }
}
