//! In-process registry of discovery jobs.
//!
//! Each submitted request runs the full pipeline on its own task with its
//! own state. The job table is the only thing shared between runs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::DEFAULT_TARGET_CONTRACTOR_COUNT;
use crate::error::RequestError;
use crate::models::PipelineState;
use crate::stages::VettingPipeline;

pub const MIN_ZIP_CODE_LEN: usize = 3;
pub const MIN_TARGET_CONTRACTOR_COUNT: i64 = 1;
pub const MAX_TARGET_CONTRACTOR_COUNT: i64 = 20;

fn default_target_count() -> i64 {
    DEFAULT_TARGET_CONTRACTOR_COUNT as i64
}

/// A request to discover and vet contractors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryJobRequest {
    pub service_type: String,
    pub zip_code: String,
    #[serde(default = "default_target_count")]
    pub target_contractor_count: i64,
    #[serde(default)]
    pub selected_contractor_index: usize,
    /// Caller override used when no listing candidate resolves
    #[serde(default)]
    pub contractor_name: Option<String>,
    #[serde(default)]
    pub contractor_website: Option<String>,
}

impl DiscoveryJobRequest {
    pub fn new(service_type: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            zip_code: zip_code.into(),
            target_contractor_count: default_target_count(),
            selected_contractor_index: 0,
            contractor_name: None,
            contractor_website: None,
        }
    }

    /// Check the request and build the initial pipeline state
    pub fn validate(&self) -> Result<PipelineState, RequestError> {
        let service = self.service_type.trim();
        if service.is_empty() {
            return Err(RequestError::BlankServiceType);
        }

        let zip = self.zip_code.trim();
        if zip.chars().count() < MIN_ZIP_CODE_LEN {
            return Err(RequestError::ZipTooShort {
                zip_code: zip.to_string(),
                min: MIN_ZIP_CODE_LEN,
            });
        }

        let range = MIN_TARGET_CONTRACTOR_COUNT..=MAX_TARGET_CONTRACTOR_COUNT;
        if !range.contains(&self.target_contractor_count) {
            return Err(RequestError::TargetOutOfRange {
                value: self.target_contractor_count,
                min: MIN_TARGET_CONTRACTOR_COUNT,
                max: MAX_TARGET_CONTRACTOR_COUNT,
            });
        }

        let mut state = PipelineState::new(service, zip)
            .with_target_count(self.target_contractor_count)
            .with_selected_index(self.selected_contractor_index);
        state.contractor_name = self.contractor_name.clone();
        state.contractor_website = self.contractor_website.clone();
        Ok(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Outcome of a finished run, as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// The report as a JSON value, absent when synthesis was skipped
    pub consolidated_summary: Option<serde_json::Value>,
    pub flags: Vec<String>,
    pub selected_contractor_name: Option<String>,
    pub selected_contractor_index: Option<usize>,
    pub candidate_count: usize,
}

impl DiscoveryResult {
    pub fn from_state(state: &PipelineState) -> Self {
        let raw = state.raw_synthesis_data.as_deref().unwrap_or_default().trim();
        let consolidated_summary = if raw.is_empty() {
            None
        } else {
            match serde_json::from_str(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(error = %e, "Synthesis payload was not valid JSON");
                    None
                }
            }
        };

        Self {
            consolidated_summary,
            flags: state.flags.clone(),
            selected_contractor_name: state.contractor_name.clone(),
            selected_contractor_index: state.selected_contractor_index,
            candidate_count: state.candidates.len(),
        }
    }
}

/// One job's lifecycle record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request: DiscoveryJobRequest,
    pub result: Option<DiscoveryResult>,
    pub error: Option<String>,
}

/// Tracks submitted jobs and runs them on background tasks
#[derive(Clone)]
pub struct JobRegistry {
    pipeline: Arc<VettingPipeline>,
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
    /// Signalled whenever any job reaches a terminal status
    finished: Arc<Notify>,
}

impl JobRegistry {
    pub fn new(pipeline: VettingPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            finished: Arc::new(Notify::new()),
        }
    }

    /// Validate and queue a request; the run starts immediately on its own task
    pub async fn submit(&self, request: DiscoveryJobRequest) -> Result<Uuid, RequestError> {
        let state = request.validate()?;
        let job_id = Uuid::new_v4();
        let now = Utc::now();

        self.jobs.write().await.insert(
            job_id,
            JobRecord {
                job_id,
                status: JobStatus::Queued,
                created_at: now,
                updated_at: now,
                request,
                result: None,
                error: None,
            },
        );
        info!(job_id = %job_id, "Discovery job queued");

        let jobs = self.jobs.clone();
        let pipeline = self.pipeline.clone();
        let finished = self.finished.clone();
        tokio::spawn(async move {
            set_status(&jobs, job_id, JobStatus::Running).await;

            // Inner task so a panicking run is recorded as a failure
            let run = tokio::spawn(async move { pipeline.run(state).await }).await;

            if let Some(record) = jobs.write().await.get_mut(&job_id) {
                record.updated_at = Utc::now();
                match run {
                    Ok(state) => {
                        record.status = JobStatus::Completed;
                        record.result = Some(DiscoveryResult::from_state(&state));
                        info!(job_id = %job_id, flags = state.flags.len(), "Discovery job completed");
                    }
                    Err(e) => {
                        record.status = JobStatus::Failed;
                        record.error = Some(e.to_string());
                        error!(job_id = %job_id, error = %e, "Discovery job failed");
                    }
                }
            }
            finished.notify_waiters();
        });

        Ok(job_id)
    }

    pub async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&job_id).cloned()
    }

    /// All jobs, oldest first
    pub async fn list(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<_> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by_key(|j| j.created_at);
        jobs
    }

    /// Wait until a job reaches a terminal status and return its final record
    ///
    /// Any number of callers may wait on the same job. Returns `None` for an
    /// unknown job id.
    pub async fn wait(&self, job_id: Uuid) -> Option<JobRecord> {
        loop {
            // Register before checking so a completion in between is not missed
            let notified = self.finished.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let record = self.get(job_id).await?;
            if record.status.is_terminal() {
                return Some(record);
            }
            notified.await;
        }
    }
}

async fn set_status(jobs: &RwLock<HashMap<Uuid, JobRecord>>, job_id: Uuid, status: JobStatus) {
    if let Some(record) = jobs.write().await.get_mut(&job_id) {
        record.status = status;
        record.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::connectors::{
        Collaborators, ListingSearch, RegistrySource, ReviewQuery, ReviewSource, WebsiteSource,
    };
    use crate::error::ConnectorResult;
    use crate::llm::LlmSummarizer;
    use crate::models::{Candidate, SearchResult, WebsiteInfo};
    use async_trait::async_trait;

    struct FixedSources;

    #[async_trait]
    impl ListingSearch for FixedSources {
        async fn search_listings(
            &self,
            service_type: &str,
            zip_code: &str,
        ) -> ConnectorResult<SearchResult> {
            let mut result = SearchResult::empty("https://listing.test", service_type, zip_code);
            result.candidates = vec![
                Candidate::new("Acme Roofing", 4.5, 120),
                Candidate::new("Summit Roof Co", 4.0, 8),
            ];
            Ok(result)
        }
    }

    #[async_trait]
    impl ReviewSource for FixedSources {
        async fn fetch_reviews_text(&self, _query: ReviewQuery<'_>) -> ConnectorResult<String> {
            Ok("Great crew".to_string())
        }
    }

    #[async_trait]
    impl RegistrySource for FixedSources {
        async fn fetch_registry_text(
            &self,
            _name: &str,
            _zip: &str,
            _service: Option<&str>,
        ) -> ConnectorResult<String> {
            Ok("A+ accredited".to_string())
        }
    }

    #[async_trait]
    impl WebsiteSource for FixedSources {
        async fn fetch_website_info(
            &self,
            url: &str,
            _service: Option<&str>,
        ) -> ConnectorResult<WebsiteInfo> {
            Ok(WebsiteInfo::for_url(url))
        }
    }

    fn registry() -> JobRegistry {
        let collaborators = Collaborators::from_connector(
            Arc::new(FixedSources),
            Arc::new(LlmSummarizer::unconfigured()),
        );
        JobRegistry::new(VettingPipeline::new(collaborators, PipelineConfig::default()))
    }

    #[test]
    fn test_validate_rejects_bad_requests() {
        let blank = DiscoveryJobRequest::new("  ", "78701");
        assert_eq!(blank.validate(), Err(RequestError::BlankServiceType));

        let short_zip = DiscoveryJobRequest::new("roofing", " 78 ");
        assert_eq!(
            short_zip.validate(),
            Err(RequestError::ZipTooShort {
                zip_code: "78".to_string(),
                min: 3
            })
        );

        let mut too_many = DiscoveryJobRequest::new("roofing", "78701");
        too_many.target_contractor_count = 21;
        assert!(matches!(
            too_many.validate(),
            Err(RequestError::TargetOutOfRange { value: 21, .. })
        ));
    }

    #[test]
    fn test_validate_builds_trimmed_state() {
        let mut request = DiscoveryJobRequest::new(" roofing ", " 78701 ");
        request.selected_contractor_index = 2;

        let state = request.validate().unwrap();

        assert_eq!(state.service_type, "roofing");
        assert_eq!(state.zip_code, "78701");
        assert_eq!(state.target_contractor_count, Some(5));
        assert_eq!(state.selected_contractor_index, Some(2));
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: DiscoveryJobRequest =
            serde_json::from_str(r#"{"service_type":"roofing","zip_code":"78701"}"#).unwrap();
        assert_eq!(request, DiscoveryJobRequest::new("roofing", "78701"));
    }

    #[tokio::test]
    async fn test_submitted_job_completes() {
        let registry = registry();
        let mut request = DiscoveryJobRequest::new("roofing", "78701");
        request.selected_contractor_index = 1;

        let job_id = registry.submit(request).await.unwrap();
        let record = registry.wait(job_id).await.unwrap();

        assert_eq!(record.status, JobStatus::Completed);
        assert!(record.updated_at >= record.created_at);
        let result = record.result.unwrap();
        assert_eq!(result.candidate_count, 2);
        assert_eq!(result.selected_contractor_name.as_deref(), Some("Summit Roof Co"));
        assert_eq!(result.selected_contractor_index, Some(1));
        let summary = result.consolidated_summary.unwrap();
        assert_eq!(summary["contractor_name"], "Summit Roof Co");
        assert_eq!(summary["review_summary"]["overall_sentiment"], "Unknown");
    }

    #[tokio::test]
    async fn test_jobs_finish_without_being_awaited() {
        let registry = registry();
        let job_id = registry
            .submit(DiscoveryJobRequest::new("roofing", "78701"))
            .await
            .unwrap();

        let mut status = JobStatus::Queued;
        for _ in 0..200 {
            status = registry.get(job_id).await.unwrap().status;
            if status.is_terminal() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(status, JobStatus::Completed);

        // Waiting after completion still returns the record
        let record = registry.wait(job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_concurrent_waiters_see_final_record() {
        let registry = registry();
        let job_id = registry
            .submit(DiscoveryJobRequest::new("roofing", "78701"))
            .await
            .unwrap();

        let (first, second) = tokio::join!(registry.wait(job_id), registry.wait(job_id));

        assert_eq!(first.unwrap().status, JobStatus::Completed);
        assert_eq!(second.unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_registered() {
        let registry = registry();
        let result = registry.submit(DiscoveryJobRequest::new("roofing", "7")).await;
        assert!(result.is_err());
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let registry = registry();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
        assert!(registry.wait(Uuid::new_v4()).await.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&JobStatus::Queued).unwrap(), "\"queued\"");
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }
}
