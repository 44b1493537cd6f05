pub mod config;
pub mod connectors;
pub mod error;
pub mod io;
pub mod jobs;
pub mod llm;
pub mod matcher;
pub mod models;
pub mod stages;

pub use config::{PipelineConfig, VettingConfig};
pub use connectors::{Collaborators, FirecrawlConnector};
pub use error::{ConfigError, ConnectorError, RequestError};
pub use io::{load_requests_file, write_json, HumanReport};
pub use jobs::{DiscoveryJobRequest, DiscoveryResult, JobRegistry, JobStatus};
pub use llm::{AnthropicClient, AnthropicConfig, LlmSummarizer, SentimentSummarizer};
pub use matcher::match_listing_block;
pub use models::{Candidate, ConsolidatedReport, PipelineState, ReviewSummary, WebsiteInfo};
pub use stages::{run, Stage, VettingPipeline, STAGES};
