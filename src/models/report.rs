use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Candidate, ReviewSummary, WebsiteInfo};

/// Website stage output as it appears in the report
///
/// `Parsed` when the stored output is a valid record, otherwise the raw text
/// is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebsiteDetails {
    Parsed(WebsiteInfo),
    Raw(String),
}

impl WebsiteDetails {
    /// Interpret the website stage's stored output
    pub fn from_raw(raw: &str) -> Self {
        match serde_json::from_str::<WebsiteInfo>(raw) {
            Ok(info) => WebsiteDetails::Parsed(info),
            Err(_) => WebsiteDetails::Raw(raw.to_string()),
        }
    }

    pub fn as_parsed(&self) -> Option<&WebsiteInfo> {
        match self {
            WebsiteDetails::Parsed(info) => Some(info),
            WebsiteDetails::Raw(_) => None,
        }
    }
}

/// Final merged output of one complete pipeline run
///
/// Field order is the serialization order. Nothing is skipped when empty so
/// consumers can tell "not attempted" (null) from "attempted and empty".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub contractor_name: String,
    pub service_type: String,
    pub zip_code: String,
    pub selected_contractor_index: Option<usize>,
    /// Snapshot of the selected listing candidate
    pub selected_candidate: Option<Candidate>,
    pub listing_source_url: Option<String>,
    pub raw_reviews_data: Option<String>,
    pub raw_registry_data: Option<String>,
    pub website: Option<WebsiteDetails>,
    pub review_summary: ReviewSummary,
    pub flags: Vec<String>,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
}
