use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TARGET_CONTRACTOR_COUNT: usize = 5;
pub const DEFAULT_SERVICE_TYPE: &str = "home improvement";
pub const DEFAULT_FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";
pub const DEFAULT_SUMMARY_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Knobs for the pipeline stages
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidate count used when the request gives none or a non-positive one
    pub default_target_count: usize,
    /// Service type used when the request leaves it blank
    pub default_service_type: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_target_count: DEFAULT_TARGET_CONTRACTOR_COUNT,
            default_service_type: DEFAULT_SERVICE_TYPE.to_string(),
        }
    }
}

/// Firecrawl connection settings
#[derive(Debug, Clone)]
pub struct FirecrawlConfig {
    pub api_key: String,
    pub api_url: String,
    pub timeout: Duration,
}

/// Summarizer settings; no API key means summaries fall back to "Unknown"
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub api_key: Option<String>,
    pub model: String,
}

/// Everything the binary needs, loaded from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct VettingConfig {
    pub firecrawl: FirecrawlConfig,
    pub summary: SummaryConfig,
    pub pipeline: PipelineConfig,
}

impl VettingConfig {
    /// Load configuration from environment variables
    ///
    /// `FIRECRAWL_API_KEY` is required. `ANTHROPIC_API_KEY` is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let firecrawl_key = env::var("FIRECRAWL_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingVar("FIRECRAWL_API_KEY"))?;

        let api_url = env::var("FIRECRAWL_API_URL")
            .unwrap_or_else(|_| DEFAULT_FIRECRAWL_API_URL.to_string());

        let timeout_secs = match env::var("VETTING_HTTP_TIMEOUT_SECS") {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let summary_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let model = env::var("VETTING_SUMMARY_MODEL")
            .unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.to_string());

        Ok(Self {
            firecrawl: FirecrawlConfig {
                api_key: firecrawl_key,
                api_url: api_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(timeout_secs),
            },
            summary: SummaryConfig {
                api_key: summary_key,
                model,
            },
            pipeline: PipelineConfig::default(),
        })
    }
}

/// Log filter used when `RUST_LOG` is unset
pub fn log_filter(verbose: bool) -> String {
    env::var("VETTING_LOG_LEVEL")
        .ok()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| if verbose { "debug" } else { "info" }.to_string())
}

fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            name: "VETTING_HTTP_TIMEOUT_SECS",
            value: value.to_string(),
        })
}
