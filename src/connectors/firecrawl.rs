//! Firecrawl-backed implementation of all four source connectors.
//!
//! Listing search and website analysis use the `/extract` endpoint with a JSON
//! schema; reviews and registry lookups use `/scrape` and return page text.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::urls::{self, LISTING_DOMAIN};
use super::{ListingSearch, RegistrySource, ReviewQuery, ReviewSource, WebsiteSource};
use crate::config::{FirecrawlConfig, DEFAULT_SERVICE_TYPE};
use crate::error::{ConnectorError, ConnectorResult};
use crate::matcher::match_listing_block;
use crate::models::{Candidate, SearchResult, WebsiteInfo};

/// Firecrawl API client implementing every source connector
pub struct FirecrawlConnector {
    client: Client,
    api_key: String,
    api_url: String,
    /// How long to wait for an asynchronous extract job
    poll_timeout: Duration,
    /// Interval between extract status polls
    poll_interval: Duration,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize, Default)]
struct ScrapeData {
    content: Option<String>,
    markdown: Option<String>,
    summary: Option<String>,
    html: Option<String>,
}

impl ScrapeData {
    /// First non-blank representation, in preference order
    fn into_text(self) -> String {
        [self.content, self.markdown, self.summary, self.html]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default()
    }
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    urls: Vec<&'a str>,
    prompt: String,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    status: Option<String>,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ContractorList {
    #[serde(default)]
    contractors: Vec<Candidate>,
}

impl FirecrawlConnector {
    pub fn new(config: &FirecrawlConfig) -> ConnectorResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            poll_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
        })
    }

    /// Set how long to wait for an asynchronous extract job
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the interval between extract status polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn post<T: Serialize, R: DeserializeOwned>(&self, endpoint: &str, body: &T) -> ConnectorResult<R> {
        let url = format!("{}{}", self.api_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> ConnectorResult<R> {
        let url = format!("{}{}", self.api_url, endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> ConnectorResult<R> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Api {
                service: "Firecrawl",
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Scrape one page as markdown; empty string when the page had no content
    async fn scrape_text(&self, url: &str) -> ConnectorResult<String> {
        debug!(url, "Firecrawl scrape");
        let request = ScrapeRequest {
            url,
            formats: vec!["markdown"],
            only_main_content: true,
        };

        let response: ScrapeResponse = self.post("/scrape", &request).await?;
        if !response.success {
            return Err(ConnectorError::Extraction(
                response
                    .error
                    .unwrap_or_else(|| format!("scrape of {} was not successful", url)),
            ));
        }

        Ok(response.data.unwrap_or_default().into_text())
    }

    /// Run a schema-driven extraction
    ///
    /// Returns `None` when Firecrawl reports the extraction as unsuccessful.
    /// Asynchronous jobs are polled until they finish or the poll timeout hits.
    async fn extract(
        &self,
        url: &str,
        prompt: String,
        schema: serde_json::Value,
    ) -> ConnectorResult<Option<serde_json::Value>> {
        debug!(url, "Firecrawl extract");
        let request = ExtractRequest {
            urls: vec![url],
            prompt,
            schema,
        };

        let started: ExtractResponse = self.post("/extract", &request).await?;
        if !started.success {
            warn!(
                url,
                error = started.error.as_deref().unwrap_or("unknown error"),
                "Firecrawl extraction was not successful"
            );
            return Ok(None);
        }

        if started.data.is_some() && started.status.as_deref().is_none_or(|s| s == "completed") {
            return Ok(started.data);
        }

        let Some(job_id) = started.id else {
            return Ok(started.data);
        };

        self.poll_extract(&job_id).await
    }

    async fn poll_extract(&self, job_id: &str) -> ConnectorResult<Option<serde_json::Value>> {
        let deadline = Instant::now() + self.poll_timeout;

        loop {
            tokio::time::sleep(self.poll_interval).await;

            let status: ExtractResponse = self.get(&format!("/extract/{}", job_id)).await?;
            match status.status.as_deref() {
                Some("completed") => return Ok(status.data),
                Some("failed") | Some("cancelled") => {
                    warn!(
                        job_id,
                        error = status.error.as_deref().unwrap_or("unknown error"),
                        "Firecrawl extract job did not complete"
                    );
                    return Ok(None);
                }
                _ => {}
            }

            if Instant::now() >= deadline {
                return Err(ConnectorError::Extraction(format!(
                    "extract job {} timed out after {:?}",
                    job_id, self.poll_timeout
                )));
            }
        }
    }
}

#[async_trait]
impl ListingSearch for FirecrawlConnector {
    async fn search_listings(
        &self,
        service_type: &str,
        zip_code: &str,
    ) -> ConnectorResult<SearchResult> {
        info!(service = service_type, zip = zip_code, "Searching listings");
        let url = urls::listing_search_url(service_type, zip_code);

        let Some(data) = self
            .extract(&url, listing_prompt(service_type), contractor_list_schema())
            .await?
        else {
            return Ok(SearchResult::empty(url, service_type, zip_code));
        };

        let list: ContractorList = serde_json::from_value(data)?;
        let candidates = list
            .contractors
            .into_iter()
            .map(|c| c.normalize_urls(LISTING_DOMAIN))
            .filter(|c| !c.name.trim().is_empty())
            .collect();

        Ok(SearchResult {
            source_url: url,
            service_type: service_type.to_string(),
            zip_code: zip_code.to_string(),
            candidates,
        })
    }
}

#[async_trait]
impl ReviewSource for FirecrawlConnector {
    async fn fetch_reviews_text(&self, query: ReviewQuery<'_>) -> ConnectorResult<String> {
        let name = query.contractor_name.trim();
        let zip = query.zip_code.trim();
        if name.is_empty() || zip.is_empty() {
            warn!("Missing contractor_name or zip_code for review lookup");
            return Ok(String::new());
        }

        info!(contractor = name, zip, service = ?query.service_type, "Fetching review content");
        let url = urls::maps_search_url(name, zip, query.service_type);

        let content = self.scrape_text(&url).await?;
        if content.is_empty() {
            warn!(contractor = name, zip, "No review content returned");
            return Ok(String::new());
        }

        Ok(select_review_text(content, &query))
    }
}

/// Narrow a maps results page to the contractor's listing block, or keep the
/// whole page when no block matches
fn select_review_text(content: String, query: &ReviewQuery<'_>) -> String {
    let name = query.contractor_name.trim();
    let filtered =
        match_listing_block(&content, name, query.expected_phone, query.expected_address);
    if !filtered.is_empty() {
        info!(contractor = name, "Filtered review content to the matching listing");
        return filtered;
    }

    warn!(
        contractor = name,
        "Could not confidently isolate the matching listing; using raw content"
    );
    content
}

#[async_trait]
impl RegistrySource for FirecrawlConnector {
    async fn fetch_registry_text(
        &self,
        contractor_name: &str,
        zip_code: &str,
        service_type: Option<&str>,
    ) -> ConnectorResult<String> {
        let name = contractor_name.trim();
        let zip = zip_code.trim();
        if name.is_empty() || zip.is_empty() {
            warn!("Missing contractor_name or zip_code for registry lookup");
            return Ok(String::new());
        }

        info!(contractor = name, zip, service = ?service_type, "Fetching registry content");
        let url = urls::registry_search_url(name, zip, service_type);

        let content = self.scrape_text(&url).await?;
        if content.is_empty() {
            warn!(contractor = name, zip, "No registry content returned");
        }
        Ok(content)
    }
}

#[async_trait]
impl WebsiteSource for FirecrawlConnector {
    async fn fetch_website_info(
        &self,
        url: &str,
        service_type: Option<&str>,
    ) -> ConnectorResult<WebsiteInfo> {
        let clean_url = url.trim();
        if clean_url.is_empty() {
            warn!("Skipping website analysis because the URL is missing");
            return Ok(WebsiteInfo::default());
        }

        let service = service_type
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVICE_TYPE);
        info!(url = clean_url, service, "Analyzing contractor website");

        let Some(data) = self
            .extract(clean_url, website_prompt(service), website_info_schema())
            .await?
        else {
            return Ok(WebsiteInfo::for_url(clean_url));
        };

        let info: WebsiteInfo = serde_json::from_value(data)?;
        Ok(info.normalized(clean_url))
    }
}

fn listing_prompt(service_type: &str) -> String {
    format!(
        "Find the top 5 {} companies with their ratings, review counts, \
         website URL, phone number, and address where available.",
        service_type
    )
}

fn website_prompt(service_type: &str) -> String {
    format!(
        "Extract services offered relevant to {}, contractor license number, \
         and years in business. Return structured output only.",
        service_type
    )
}

fn contractor_list_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "contractors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "The name of the company"},
                        "rating": {"type": "number", "description": "The listing star rating"},
                        "reviews_count": {"type": "integer", "description": "Number of reviews"},
                        "website": {"type": ["string", "null"], "description": "The company's own website"},
                        "yelp_profile_url": {"type": ["string", "null"], "description": "The listing profile page"},
                        "phone": {"type": ["string", "null"]},
                        "address": {"type": ["string", "null"]}
                    },
                    "required": ["name", "rating", "reviews_count"]
                }
            }
        },
        "required": ["contractors"]
    })
}

fn website_info_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "source_url": {"type": ["string", "null"]},
            "services_offered": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Specific services offered (e.g., 'TPO', 'Shingle', 'Repair')"
            },
            "license_number": {"type": ["string", "null"]},
            "years_in_business": {"type": ["integer", "null"]}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps_listing(name: &str, slug: &str, phone: &str) -> String {
        let mut lines = vec![
            format!("[{name}](https://www.google.com/maps/place/{slug})"),
            "4.5(40)".to_string(),
            phone.to_string(),
            format!("\"{name} did solid work\""),
        ];
        lines.resize(14, String::new());
        lines.join("\n") + "\n"
    }

    fn review_query(name: &str) -> ReviewQuery<'_> {
        ReviewQuery {
            contractor_name: name,
            zip_code: "78701",
            service_type: Some("roofing"),
            expected_phone: Some("(512) 555-0100"),
            expected_address: None,
        }
    }

    #[test]
    fn test_select_review_text_keeps_matching_listing() {
        let page = maps_listing("Summit Roof Co", "summit", "(512) 555-0111")
            + &maps_listing("Acme Roofing", "acme", "(512) 555-0100");

        let text = select_review_text(page.clone(), &review_query("Acme Roofing"));

        assert!(text.contains("Acme Roofing did solid work"));
        assert!(!text.contains("Summit Roof Co"));
        assert!(text.len() < page.len());
    }

    #[test]
    fn test_select_review_text_falls_back_to_raw_page() {
        let page = maps_listing("Summit Roof Co", "summit", "(512) 555-0111");

        let text = select_review_text(page.clone(), &review_query("Blue Ridge Roofing"));

        assert_eq!(text, page);
    }

    #[test]
    fn test_scrape_data_prefers_content_then_markdown() {
        let data = ScrapeData {
            content: Some("  ".to_string()),
            markdown: Some("# Acme".to_string()),
            summary: Some("summary".to_string()),
            html: None,
        };
        assert_eq!(data.into_text(), "# Acme");

        assert_eq!(ScrapeData::default().into_text(), "");
    }

    #[test]
    fn test_contractor_list_decodes_extraction_payload() {
        let data = serde_json::json!({
            "contractors": [
                {"name": "Acme Roofing", "rating": 4.7, "reviews_count": 88,
                 "website": "https://www.yelp.com/biz/acme"},
                {"name": "Summit Roof Co", "rating": 4.2, "reviews_count": 12}
            ]
        });

        let list: ContractorList = serde_json::from_value(data).unwrap();
        let first = list.contractors[0].clone().normalize_urls(LISTING_DOMAIN);

        assert_eq!(list.contractors.len(), 2);
        assert_eq!(first.website, None);
        assert_eq!(first.profile_url.as_deref(), Some("https://www.yelp.com/biz/acme"));
    }

    #[test]
    fn test_connector_builds_from_config() {
        let config = FirecrawlConfig {
            api_key: "fc-test".to_string(),
            api_url: "https://api.firecrawl.dev/v1/".to_string(),
            timeout: Duration::from_secs(5),
        };
        let connector = FirecrawlConnector::new(&config)
            .unwrap()
            .with_poll_interval(Duration::from_millis(10));

        assert_eq!(connector.api_url, "https://api.firecrawl.dev/v1");
        assert_eq!(connector.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_prompts_mention_service() {
        assert!(listing_prompt("roofing").contains("top 5 roofing companies"));
        assert!(website_prompt("plumbing").contains("relevant to plumbing"));
    }
}
