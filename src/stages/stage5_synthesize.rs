use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::selection::resolve_selected;
use crate::llm::SentimentSummarizer;
use crate::models::{ConsolidatedReport, PipelineState, WebsiteDetails};

/// Execute Stage 5: Synthesize
///
/// Merges the outputs of the earlier stages into one report. The selection
/// is re-resolved without flagging again; earlier stages already reported an
/// invalid index.
pub async fn execute_synthesize(
    mut state: PipelineState,
    summarizer: &dyn SentimentSummarizer,
) -> PipelineState {
    let selected = resolve_selected(&state).candidate().cloned();

    let name = selected
        .as_ref()
        .map(|c| c.name.trim())
        .filter(|n| !n.is_empty())
        .or_else(|| state.contractor_name())
        .map(str::to_string);

    let Some(name) = name else {
        warn!(
            service = %state.service_type,
            zip = %state.zip_code,
            "No contractor identity to synthesize"
        );
        state.flag("Missing contractor identity; skipping synthesis.");
        state.raw_synthesis_data = Some(String::new());
        state.report = None;
        return state;
    };

    info!(contractor = %name, "Starting synthesis");

    let merged = merge_sources(
        state.raw_reviews_data.as_deref(),
        state.raw_registry_data.as_deref(),
    );
    let review_summary = summarizer.summarize_sentiment(&merged).await;

    let website = state.raw_website_data.as_deref().map(WebsiteDetails::from_raw);

    let report = ConsolidatedReport {
        contractor_name: name.clone(),
        service_type: state.service_type.clone(),
        zip_code: state.zip_code.clone(),
        selected_contractor_index: state.selected_contractor_index,
        selected_candidate: selected,
        listing_source_url: state.listing_source_url.clone(),
        raw_reviews_data: state.raw_reviews_data.clone(),
        raw_registry_data: state.raw_registry_data.clone(),
        website,
        review_summary,
        flags: state.flags.clone(),
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => state.raw_synthesis_data = Some(json),
        Err(e) => {
            error!(contractor = %name, error = %e, "Failed to serialize report");
            state.flag(format!(
                "Report serialization failed for contractor='{}'.",
                name
            ));
            state.raw_synthesis_data = Some(String::new());
        }
    }

    info!(
        contractor = %name,
        sentiment = %report.review_summary.overall_sentiment,
        flags = report.flags.len(),
        "Synthesis complete"
    );
    state.report = Some(report);
    state
}

/// Join review and registry text into labelled sections, skipping empty ones
fn merge_sources(reviews: Option<&str>, registry: Option<&str>) -> String {
    [("Maps reviews", reviews), ("Registry", registry)]
        .into_iter()
        .filter_map(|(label, text)| {
            let text = text.map(str::trim).filter(|t| !t.is_empty())?;
            Some(format!("{}:\n{}", label, text))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
