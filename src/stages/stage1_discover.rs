use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::connectors::ListingSearch;
use crate::models::{Candidate, PipelineState};

/// Execute Stage 1: Discover
///
/// 1. Normalize the service type and zip code; a missing zip stops here
/// 2. Resolve the target candidate count (non-positive falls back to the default)
/// 3. Search listings and keep the top candidates in ranked order
/// 4. Default the selection to the top candidate and adopt its name when the
///    caller did not provide one
pub async fn execute_discover(
    mut state: PipelineState,
    listings: &dyn ListingSearch,
    config: &PipelineConfig,
) -> PipelineState {
    let service = state
        .service()
        .unwrap_or(config.default_service_type.as_str())
        .to_string();
    let zip = state.zip().to_string();
    state.service_type = service.clone();
    state.zip_code = zip.clone();

    if zip.is_empty() {
        warn!(service = %service, "Skipping listing discovery because zip_code is missing");
        state.flag("Missing zip_code for listing discovery.");
        state.raw_listing_data = Some(String::new());
        return state;
    }

    let target = resolve_target_count(&mut state, config.default_target_count);

    info!(service = %service, zip = %zip, target, "Starting listing discovery");

    let result = listings.search_listings(&service, &zip).await;
    let search = match result {
        Ok(search) => search,
        Err(e) => {
            error!(service = %service, zip = %zip, error = %e, "Listing discovery failed");
            state.flag(format!(
                "Listing discovery failed for service='{}' in zip='{}'.",
                service, zip
            ));
            state.raw_listing_data = Some(String::new());
            return state;
        }
    };

    state.listing_source_url = Some(search.source_url);

    let mut candidates = search.candidates;
    if candidates.is_empty() {
        warn!(service = %service, zip = %zip, "No listing contractors found");
        state.flag(format!(
            "No listing contractors found for service='{}' in zip='{}'.",
            service, zip
        ));
        state.raw_listing_data = Some(String::new());
        return state;
    }

    candidates.truncate(target);
    if candidates.len() < target {
        warn!(found = candidates.len(), target, "Fewer contractors than requested");
        state.flag(format!(
            "Only {} contractors found; target was {}.",
            candidates.len(),
            target
        ));
    }

    if state.selected_contractor_index.is_none() {
        state.selected_contractor_index = Some(0);
    }
    if state.contractor_name().is_none() {
        state.contractor_name = Some(candidates[0].name.trim().to_string());
    }

    state.raw_listing_data = Some(format_candidates(&candidates));
    state.candidates = candidates;

    info!(
        service = %service,
        zip = %zip,
        candidates = state.candidates.len(),
        "Listing discovery complete"
    );
    state
}

/// Resolve the requested candidate count, flagging invalid values
fn resolve_target_count(state: &mut PipelineState, default: usize) -> usize {
    match state.target_contractor_count {
        None => {
            state.target_contractor_count = Some(default as i64);
            default
        }
        Some(n) if n > 0 => n as usize,
        Some(n) => {
            warn!(requested = n, default, "Invalid target contractor count");
            state.flag(format!(
                "Invalid target_contractor_count={}; defaulting to {}.",
                n, default
            ));
            state.target_contractor_count = Some(default as i64);
            default
        }
    }
}

/// One line per candidate, 1-based
fn format_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. {} | rating={} | reviews={}",
                i + 1,
                c.name,
                c.rating,
                c.review_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
