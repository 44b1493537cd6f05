//! External source connectors.
//!
//! Each trait is one independent lookup the pipeline performs. Implementations
//! normalize their upstream response into plain text or a typed partial
//! record. Faults are returned as [`ConnectorError`] and handled by the stage
//! that made the call.

pub mod firecrawl;
pub mod urls;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ConnectorResult;
use crate::llm::SentimentSummarizer;
use crate::models::{SearchResult, WebsiteInfo};

pub use firecrawl::FirecrawlConnector;

/// Parameters for a reviews lookup
///
/// Phone and address come from the selected candidate and drive the
/// identity matcher.
#[derive(Debug, Clone, Copy)]
pub struct ReviewQuery<'a> {
    pub contractor_name: &'a str,
    pub zip_code: &'a str,
    pub service_type: Option<&'a str>,
    pub expected_phone: Option<&'a str>,
    pub expected_address: Option<&'a str>,
}

/// Ranked business-listing search
#[async_trait]
pub trait ListingSearch: Send + Sync {
    async fn search_listings(&self, service_type: &str, zip_code: &str)
    -> ConnectorResult<SearchResult>;
}

/// Maps/reviews page text for one business
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Returns an empty string when nothing was found
    async fn fetch_reviews_text(&self, query: ReviewQuery<'_>) -> ConnectorResult<String>;
}

/// Business-accreditation registry text for one business
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Returns an empty string when nothing was found
    async fn fetch_registry_text(
        &self,
        contractor_name: &str,
        zip_code: &str,
        service_type: Option<&str>,
    ) -> ConnectorResult<String>;
}

/// Structured facts from a contractor's own website
#[async_trait]
pub trait WebsiteSource: Send + Sync {
    /// May return a mostly-empty record
    async fn fetch_website_info(
        &self,
        url: &str,
        service_type: Option<&str>,
    ) -> ConnectorResult<WebsiteInfo>;
}

/// Every collaborator a pipeline run consumes
#[derive(Clone)]
pub struct Collaborators {
    pub listings: Arc<dyn ListingSearch>,
    pub reviews: Arc<dyn ReviewSource>,
    pub registry: Arc<dyn RegistrySource>,
    pub website: Arc<dyn WebsiteSource>,
    pub summarizer: Arc<dyn SentimentSummarizer>,
}

impl Collaborators {
    /// Use one connector for all four lookups
    pub fn from_connector<C>(connector: Arc<C>, summarizer: Arc<dyn SentimentSummarizer>) -> Self
    where
        C: ListingSearch + ReviewSource + RegistrySource + WebsiteSource + 'static,
    {
        Self {
            listings: connector.clone(),
            reviews: connector.clone(),
            registry: connector.clone(),
            website: connector,
            summarizer,
        }
    }
}
